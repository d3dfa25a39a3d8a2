use crate::error::{NomError, NomResult};
use crate::geometry::arrow::DEFAULT_ARROW_TIP;
use crate::model::{Color, Vec2};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub node_fill: Color,
    pub node_border: Color,
    pub node_border_width: f64,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            node_fill: Color::rgba(255, 204, 153, 200),
            node_border: Color::rgba(255, 108, 9, 255),
            node_border_width: 2.0,
        }
    }
}

/// Editor tunables; every field falls back to its default when absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub curve_slack: f64,      // half-width of the curve hit band before thickness
    pub handle_radius: f64,
    pub handle_buffer: f64,
    pub node_edge_gap: f64,    // padding between a node and where its arc starts
    pub tip_displacement: f64,
    pub arrow_tip: [Vec2; 4],
    pub theme: Theme,
    pub max_undo_depth: Option<usize>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            curve_slack: 5.0,
            handle_radius: 3.0,
            handle_buffer: 2.0,
            node_edge_gap: 4.0,
            tip_displacement: 4.0,
            arrow_tip: DEFAULT_ARROW_TIP,
            theme: Theme::default(),
            max_undo_depth: None,
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(s: &str) -> NomResult<Self> {
        serde_json::from_str(s).map_err(|e| NomError::Json(e.to_string()).into())
    }

    /// Half-side of the square handle hit box.
    pub fn handle_hit_radius(&self) -> f64 {
        self.handle_radius + self.handle_buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let c = EditorConfig::from_json_str(r#"{"curve_slack": 8, "theme": {"node_border_width": 3}}"#).unwrap();
        assert_eq!(c.curve_slack, 8.0);
        assert_eq!(c.handle_hit_radius(), 5.0);
        assert_eq!(c.theme.node_border_width, 3.0);
        assert_eq!(c.theme.node_fill, Theme::default().node_fill);
        assert_eq!(c.max_undo_depth, None);
    }

    #[test]
    fn bad_json_is_json_error() {
        let e = EditorConfig::from_json_str("{curve_slack").unwrap_err();
        assert_eq!(e.code(), -10);
    }
}
