//! Node style compilation (`key: value` declarations into node/label style strings).

use rustc_hash::FxHashMap;
use std::fmt::Write as _;

pub(crate) fn parse_style_decl(s: &str) -> Option<(&str, &str)> {
    let s = s.trim().trim_end_matches(';').trim();
    if s.is_empty() {
        return None;
    }
    let (k, v) = s.split_once(':')?;
    let k = k.trim();
    let v = v.trim();
    if k.is_empty() || v.is_empty() {
        return None;
    }
    Some((k, v))
}

/// Keys that style the label text rather than the container.
pub fn is_label_style_key(key: &str) -> bool {
    matches!(
        key,
        "color"
            | "line-height"
            | "letter-spacing"
            | "white-space"
            | "overflow-wrap"
            | "hyphens"
    ) || key.starts_with("font-")
        || key.starts_with("text-")
        || key.starts_with("word-")
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledStyles {
    pub node_style: String,
    pub label_style: String,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<String>,
    pub stroke_dasharray: Option<String>,
}

impl CompiledStyles {
    /// `stroke-width` as a number, tolerating a `px` suffix.
    pub fn stroke_width_px(&self) -> Option<f32> {
        self.stroke_width
            .as_deref()
            .and_then(|v| v.trim().trim_end_matches("px").trim().parse::<f32>().ok())
    }

    /// `stroke-dasharray` as numbers; a single value is used for both dash and gap.
    pub fn stroke_dash(&self) -> Vec<f64> {
        let Some(raw) = self.stroke_dasharray.as_deref() else {
            return Vec::new();
        };
        let raw = raw.replace(',', " ");
        let nums: Vec<f64> = raw
            .split_whitespace()
            .filter_map(|t| t.trim_end_matches("px").parse::<f64>().ok())
            .collect();
        match nums.as_slice() {
            [a] => vec![*a, *a],
            [a, b, ..] => vec![*a, *b],
            _ => Vec::new(),
        }
    }
}

/// Splits declarations into node and label style strings.
///
/// The first occurrence of a key fixes its position; later occurrences override the value.
pub fn compile_styles<S: AsRef<str>>(declarations: &[S]) -> CompiledStyles {
    #[derive(Default)]
    struct OrderedMap<'a> {
        order: Vec<(&'a str, &'a str)>,
        idx: FxHashMap<&'a str, usize>,
    }
    impl<'a> OrderedMap<'a> {
        fn set(&mut self, k: &'a str, v: &'a str) {
            if let Some(&i) = self.idx.get(k) {
                self.order[i].1 = v;
                return;
            }
            self.idx.insert(k, self.order.len());
            self.order.push((k, v));
        }
    }

    let mut m: OrderedMap<'_> = OrderedMap::default();
    for d in declarations {
        // A single entry may carry several `;`-separated declarations.
        for part in d.as_ref().split(';') {
            if let Some((k, v)) = parse_style_decl(part) {
                m.set(k, v);
            }
        }
    }

    let mut out = CompiledStyles::default();
    for (k, v) in &m.order {
        let (k, v) = (*k, *v);
        let target = if is_label_style_key(k) {
            &mut out.label_style
        } else {
            &mut out.node_style
        };
        if !target.is_empty() {
            target.push(';');
        }
        let _ = write!(target, "{k}:{v} !important");

        match k {
            "fill" => out.fill = Some(v.to_string()),
            "stroke" => out.stroke = Some(v.to_string()),
            "stroke-width" => out.stroke_width = Some(v.to_string()),
            "stroke-dasharray" => out.stroke_dasharray = Some(v.to_string()),
            _ => {}
        }
    }
    out
}
