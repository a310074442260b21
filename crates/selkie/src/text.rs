use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: f64,
    pub font_weight: Option<String>,
    pub font_style: Option<String>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: 16.0,
            font_weight: None,
            font_style: None,
        }
    }
}

impl TextStyle {
    /// Applies `font-*` declarations from an inline CSS string (`font-size: 20px; ...`).
    pub fn with_css(mut self, css: &str) -> Self {
        for decl in css.split(';') {
            let Some((key, value)) = decl.split_once(':') else {
                continue;
            };
            let value = value.trim().trim_end_matches("!important").trim();
            match key.trim() {
                "font-size" => {
                    if let Ok(px) = value.trim_end_matches("px").trim().parse::<f64>() {
                        self.font_size = px;
                    }
                }
                "font-family" => self.font_family = Some(value.to_string()),
                "font-weight" => self.font_weight = Some(value.to_string()),
                "font-style" => self.font_style = Some(value.to_string()),
                _ => {}
            }
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;
}

impl<M: TextMeasurer + ?Sized> TextMeasurer for &M {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        (**self).measure(text, style)
    }
}

/// Font-free measurer: every column is `font_size * char_width_factor` wide.
///
/// Column counts come from `unicode-width`, so CJK and other wide glyphs take two columns.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl DeterministicTextMeasurer {
    pub fn normalized_text_lines(text: &str) -> Vec<String> {
        let t = text
            .replace("<br/>", "\n")
            .replace("<br />", "\n")
            .replace("<br>", "\n");
        let out = t.split('\n').map(|s| s.trim_end().to_string()).collect::<Vec<_>>();
        if out.is_empty() {
            return vec!["".to_string()];
        }
        out
    }

    pub fn line_height(&self, style: &TextStyle) -> f64 {
        let line_height_factor = if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        };
        style.font_size.max(1.0) * line_height_factor
    }
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let char_width_factor = if self.char_width_factor == 0.0 {
            0.6
        } else {
            self.char_width_factor
        };

        let lines = Self::normalized_text_lines(text);
        let font_size = style.font_size.max(1.0);
        let max_cols = lines
            .iter()
            .map(|line| UnicodeWidthStr::width(line.as_str()))
            .max()
            .unwrap_or(0);

        TextMetrics {
            width: max_cols as f64 * font_size * char_width_factor,
            height: lines.len() as f64 * self.line_height(style),
            line_count: lines.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn br_variants_split_lines() {
        let lines = DeterministicTextMeasurer::normalized_text_lines("a<br>bb<br/>c <br />d");
        assert_eq!(lines, vec!["a", "bb", "c", "d"]);
    }

    #[test]
    fn deterministic_measure_uses_widest_line() {
        let m = DeterministicTextMeasurer::default();
        let metrics = m.measure("Hello<br>Hi", &TextStyle::default());
        assert_eq!(metrics.line_count, 2);
        assert!((metrics.width - 5.0 * 16.0 * 0.6).abs() < 1e-9);
        assert!((metrics.height - 2.0 * 16.0 * 1.2).abs() < 1e-9);
    }

    #[test]
    fn wide_glyphs_take_two_columns() {
        let m = DeterministicTextMeasurer {
            char_width_factor: 0.5,
            line_height_factor: 1.0,
        };
        let metrics = m.measure("漢字", &TextStyle::default());
        assert_eq!(metrics.width, 32.0);
    }

    #[test]
    fn css_font_size_overrides_default() {
        let style = TextStyle::default().with_css("color: red; font-size: 20px; font-weight: bold");
        assert_eq!(style.font_size, 20.0);
        assert_eq!(style.font_weight.as_deref(), Some("bold"));
    }
}
