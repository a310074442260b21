//! Site configuration consumed by the cluster renderer.
//!
//! Values are read from a Mermaid-style JSON config (`themeVariables`, `flowchart.*`, `look`,
//! `handDrawnSeed`). Missing keys fall back to the default theme.

use crate::Result;
use crate::model::Look;
use serde_json::Value;

const DEFAULT_CLUSTER_BKG: &str = "#ffffde";
const DEFAULT_CLUSTER_BORDER: &str = "#aaaa33";
const DEFAULT_ALT_BACKGROUND: &str = "#f0f0f0";
const DEFAULT_COMPOSITE_BACKGROUND: &str = "#ffffff";
const DEFAULT_COMPOSITE_TITLE_BACKGROUND: &str = "#ececff";
const DEFAULT_NODE_BORDER: &str = "#9370db";

fn json_f64(v: &Value) -> Option<f64> {
    v.as_f64()
        .or_else(|| v.as_i64().map(|n| n as f64))
        .or_else(|| v.as_u64().map(|n| n as f64))
}

fn json_bool(v: &Value) -> Option<bool> {
    v.as_bool()
        .or_else(|| v.as_i64().map(|n| n != 0))
        .or_else(|| v.as_u64().map(|n| n != 0))
        .or_else(|| {
            v.as_str()
                .and_then(|s| match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "yes" | "on" | "1" => Some(true),
                    "false" | "no" | "off" | "0" => Some(false),
                    _ => None,
                })
        })
}

fn config_value<'a>(cfg: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = cfg;
    for key in path {
        cur = cur.get(*key)?;
    }
    Some(cur)
}

fn config_f64(cfg: &Value, path: &[&str]) -> Option<f64> {
    config_value(cfg, path).and_then(json_f64)
}

fn config_bool(cfg: &Value, path: &[&str]) -> Option<bool> {
    config_value(cfg, path).and_then(json_bool)
}

fn config_string(cfg: &Value, path: &[&str]) -> Option<String> {
    config_value(cfg, path)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn theme_color(cfg: &Value, key: &str, fallback: &str) -> String {
    config_string(cfg, &["themeVariables", key]).unwrap_or_else(|| fallback.to_string())
}

/// Theme colours used by the container shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeColors {
    pub cluster_bkg: String,
    pub cluster_border: String,
    pub alt_background: String,
    pub composite_background: String,
    pub composite_title_background: String,
    pub node_border: String,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            cluster_bkg: DEFAULT_CLUSTER_BKG.to_string(),
            cluster_border: DEFAULT_CLUSTER_BORDER.to_string(),
            alt_background: DEFAULT_ALT_BACKGROUND.to_string(),
            composite_background: DEFAULT_COMPOSITE_BACKGROUND.to_string(),
            composite_title_background: DEFAULT_COMPOSITE_TITLE_BACKGROUND.to_string(),
            node_border: DEFAULT_NODE_BORDER.to_string(),
        }
    }
}

impl ThemeColors {
    fn from_value(cfg: &Value) -> Self {
        let d = Self::default();
        Self {
            cluster_bkg: theme_color(cfg, "clusterBkg", &d.cluster_bkg),
            cluster_border: theme_color(cfg, "clusterBorder", &d.cluster_border),
            alt_background: theme_color(cfg, "altBackground", &d.alt_background),
            composite_background: theme_color(
                cfg,
                "compositeBackground",
                &d.composite_background,
            ),
            composite_title_background: theme_color(
                cfg,
                "compositeTitleBackground",
                &d.composite_title_background,
            ),
            node_border: theme_color(cfg, "nodeBorder", &d.node_border),
        }
    }
}

/// `flowchart.subGraphTitleMargin`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SubGraphTitleMargins {
    pub top: f64,
    pub bottom: f64,
}

impl SubGraphTitleMargins {
    pub fn total(&self) -> f64 {
        self.top + self.bottom
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterConfig {
    pub html_labels: bool,
    pub look: Look,
    pub hand_drawn_seed: u64,
    pub title_margins: SubGraphTitleMargins,
    pub theme: ThemeColors,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            html_labels: true,
            look: Look::Classic,
            hand_drawn_seed: 0,
            title_margins: SubGraphTitleMargins::default(),
            theme: ThemeColors::default(),
        }
    }
}

impl ClusterConfig {
    pub fn from_value(cfg: &Value) -> Self {
        // `flowchart.htmlLabels` wins over the root key, mirroring how Mermaid resolves it for
        // subgraph titles.
        let html_labels = config_bool(cfg, &["flowchart", "htmlLabels"])
            .or_else(|| config_bool(cfg, &["htmlLabels"]))
            .unwrap_or(true);
        let look = config_value(cfg, &["look"])
            .and_then(|v| serde_json::from_value::<Look>(v.clone()).ok())
            .unwrap_or_default();
        let hand_drawn_seed = config_f64(cfg, &["handDrawnSeed"])
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v as u64)
            .unwrap_or(0);
        let title_margins = SubGraphTitleMargins {
            top: config_f64(cfg, &["flowchart", "subGraphTitleMargin", "top"]).unwrap_or(0.0),
            bottom: config_f64(cfg, &["flowchart", "subGraphTitleMargin", "bottom"])
                .unwrap_or(0.0),
        };

        Self {
            html_labels,
            look,
            hand_drawn_seed,
            title_margins,
            theme: ThemeColors::from_value(cfg),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(&value))
    }
}
