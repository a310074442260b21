//! Title label construction.
//!
//! Cluster shapes only need a label element they can measure and translate; how it is built is
//! behind [`LabelBuilder`], an async boundary so callers can plug in a measurer backed by a real
//! font engine.

use crate::model::{Bounds, ClusterNode, LabelType};
use crate::surface::{ElementId, Surface};
use crate::text::{DeterministicTextMeasurer, TextMeasurer, TextStyle};
use crate::Result;

const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";
const HTML_LABEL_DIV_STYLE: &str = "display: table-cell; white-space: nowrap; line-height: 1.5; max-width: 200px; text-align: center;";

/// What to build: the text, how to interpret it and where it will live.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelRequest<'a> {
    pub id: &'a str,
    pub text: &'a str,
    pub label_type: LabelType,
    /// Inline CSS for the label text (`color`, `font-*`, ...).
    pub style: &'a str,
    /// `true` builds a `foreignObject` HTML label, `false` an SVG `<text>` label.
    pub html: bool,
}

impl<'a> LabelRequest<'a> {
    pub fn for_node(node: &'a ClusterNode, style: &'a str, html: bool) -> Self {
        Self {
            id: &node.id,
            text: &node.label,
            label_type: node.label_type,
            style,
            html,
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait LabelBuilder {
    /// Builds the label under `parent` and returns its root element, whose bounding box is the
    /// label's laid-out size.
    async fn build(
        &self,
        surface: &mut Surface,
        parent: ElementId,
        request: &LabelRequest<'_>,
    ) -> Result<ElementId>;
}

impl<B: LabelBuilder + ?Sized> LabelBuilder for &B {
    async fn build(
        &self,
        surface: &mut Surface,
        parent: ElementId,
        request: &LabelRequest<'_>,
    ) -> Result<ElementId> {
        (**self).build(surface, parent, request).await
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Run {
    text: String,
    strong: bool,
    em: bool,
}

fn plain_lines(text: &str) -> Vec<Vec<Run>> {
    DeterministicTextMeasurer::normalized_text_lines(&text.replace("\r\n", "\n"))
        .into_iter()
        .map(|line| {
            if line.is_empty() {
                Vec::new()
            } else {
                vec![Run {
                    text: line,
                    ..Run::default()
                }]
            }
        })
        .collect()
}

/// Flattens markdown into styled runs per line. Paragraphs and breaks start new lines.
fn markdown_lines(markdown: &str) -> Vec<Vec<Run>> {
    use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

    let parser = Parser::new_ext(
        markdown,
        Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS,
    );

    let mut lines: Vec<Vec<Run>> = vec![Vec::new()];
    let mut strong_depth = 0usize;
    let mut em_depth = 0usize;

    fn push_text(lines: &mut Vec<Vec<Run>>, text: &str, strong: bool, em: bool) {
        let Some(line) = lines.last_mut() else {
            return;
        };
        match line.last_mut() {
            Some(run) if run.strong == strong && run.em == em => run.text.push_str(text),
            _ => line.push(Run {
                text: text.to_string(),
                strong,
                em,
            }),
        }
    }

    for ev in parser {
        match ev {
            Event::Start(Tag::Strong) => strong_depth += 1,
            Event::Start(Tag::Emphasis) => em_depth += 1,
            Event::End(TagEnd::Strong) => strong_depth = strong_depth.saturating_sub(1),
            Event::End(TagEnd::Emphasis) => em_depth = em_depth.saturating_sub(1),
            Event::End(TagEnd::Paragraph) | Event::SoftBreak | Event::HardBreak => {
                lines.push(Vec::new());
            }
            Event::Html(t) | Event::InlineHtml(t)
                if matches!(t.trim(), "<br>" | "<br/>" | "<br />") =>
            {
                lines.push(Vec::new());
            }
            Event::Text(t) | Event::Code(t) | Event::Html(t) | Event::InlineHtml(t) => {
                push_text(&mut lines, &t, strong_depth > 0, em_depth > 0);
            }
            _ => {}
        }
    }

    while lines.len() > 1 && lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

#[derive(Debug, Clone, Copy)]
struct Measured {
    width: f64,
    height: f64,
    line_height: f64,
}

fn line_text(line: &[Run]) -> String {
    line.iter().map(|r| r.text.as_str()).collect()
}

/// Builds labels with a [`TextMeasurer`] instead of a browser layout pass.
#[derive(Debug, Clone, Default)]
pub struct MeasuredLabelBuilder<M = DeterministicTextMeasurer> {
    pub measurer: M,
    pub style: TextStyle,
}

impl<M: TextMeasurer> MeasuredLabelBuilder<M> {
    pub fn new(measurer: M, style: TextStyle) -> Self {
        Self { measurer, style }
    }

    fn build_html(
        &self,
        surface: &mut Surface,
        parent: ElementId,
        request: &LabelRequest<'_>,
        lines: &[Vec<Run>],
        size: Measured,
    ) -> Result<ElementId> {
        let fo = surface.append(parent, "foreignObject")?;
        surface.set_num_attr(fo, "width", size.width)?;
        surface.set_num_attr(fo, "height", size.height)?;
        let div = surface.append(fo, "div")?;
        surface.set_attr(div, "xmlns", XHTML_NS)?;
        surface.set_attr(div, "style", HTML_LABEL_DIV_STYLE)?;
        let span = surface.append(div, "span")?;
        surface.set_attr(span, "class", "nodeLabel")?;
        if !request.style.is_empty() {
            surface.set_attr(span, "style", request.style)?;
        }

        for (idx, line) in lines.iter().enumerate() {
            if idx > 0 {
                surface.append(span, "br")?;
            }
            for run in line {
                let tag = match (run.strong, run.em) {
                    (true, _) => "strong",
                    (false, true) => "em",
                    (false, false) => "span",
                };
                let el = surface.append(span, tag)?;
                if run.strong && run.em {
                    let inner = surface.append(el, "em")?;
                    surface.set_text(inner, run.text.as_str())?;
                } else {
                    surface.set_text(el, run.text.as_str())?;
                }
            }
        }
        Ok(fo)
    }

    fn build_svg(
        &self,
        surface: &mut Surface,
        parent: ElementId,
        request: &LabelRequest<'_>,
        lines: &[Vec<Run>],
        size: Measured,
    ) -> Result<ElementId> {
        let g = surface.append(parent, "g")?;
        let bg = surface.append(g, "rect")?;
        surface.set_attr(bg, "class", "background")?;
        surface.set_attr(bg, "style", "stroke: none")?;

        let text = surface.append(g, "text")?;
        surface.set_attr(text, "text-anchor", "middle")?;
        if !request.style.is_empty() {
            surface.set_attr(text, "style", request.style)?;
        }
        for (idx, line) in lines.iter().enumerate() {
            let row = surface.append(text, "tspan")?;
            surface.set_attr(row, "class", "text-outer-tspan")?;
            surface.set_num_attr(row, "x", 0.0)?;
            surface.set_num_attr(row, "y", (idx as f64 + 1.0) * size.line_height)?;
            for run in line {
                let word = surface.append(row, "tspan")?;
                surface.set_attr(word, "class", "text-inner-tspan")?;
                if run.strong {
                    surface.set_attr(word, "font-weight", "bold")?;
                }
                if run.em {
                    surface.set_attr(word, "font-style", "italic")?;
                }
                surface.set_text(word, run.text.as_str())?;
            }
        }
        surface.set_intrinsic_bounds(
            text,
            Bounds::from_rect(-size.width / 2.0, 0.0, size.width, size.height),
        )?;
        Ok(g)
    }
}

impl<M: TextMeasurer> LabelBuilder for MeasuredLabelBuilder<M> {
    async fn build(
        &self,
        surface: &mut Surface,
        parent: ElementId,
        request: &LabelRequest<'_>,
    ) -> Result<ElementId> {
        let lines = match request.label_type {
            LabelType::Markdown => markdown_lines(request.text),
            LabelType::Text => plain_lines(request.text),
        };
        let style = self.style.clone().with_css(request.style);
        let joined = lines.iter().map(|l| line_text(l)).collect::<Vec<_>>().join("\n");
        let metrics = self.measurer.measure(&joined, &style);
        // An empty title still occupies one line.
        let line_height = metrics.height / metrics.line_count.max(1) as f64;
        let (width, height) = if joined.trim().is_empty() {
            (0.0, 0.0)
        } else {
            (metrics.width, metrics.height)
        };
        tracing::trace!(id = request.id, width, height, html = request.html, "label measured");

        let size = Measured {
            width,
            height,
            line_height,
        };
        if request.html {
            self.build_html(surface, parent, request, &lines, size)
        } else {
            self.build_svg(surface, parent, request, &lines, size)
        }
    }
}
