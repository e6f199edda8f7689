/// Per-run style overrides. Unset fields fall back to the node's style.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextFormat {
    pub text_color: Option<u32>,
    pub stroke_color: Option<u32>,
    pub size: Option<f64>,
    pub stroke: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub font_family: Option<String>,
}

/// One line of text queued for this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TextDraw {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub format: TextFormat,
}

/// Text node. The style fields persist across frames; only the queued
/// lines are dropped on frame reset.
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub text_color: u32,
    pub stroke_color: u32,
    pub size: f64,
    pub stroke: f64,
    pub bold: bool,
    pub italic: bool,
    pub font_family: String,
    pub draws: Vec<TextDraw>,
}

impl Default for TextNode {
    fn default() -> Self {
        Self {
            text_color: 0xFFFFFF,
            stroke_color: 0x000000,
            size: 30.0,
            stroke: 0.0,
            bold: false,
            italic: false,
            font_family: "Arial".to_string(),
            draws: Vec::new(),
        }
    }
}

impl TextNode {
    /// Style for one queued line: the node's style with the run's
    /// overrides applied.
    pub fn resolve(&self, format: &TextFormat) -> TextFormat {
        TextFormat {
            text_color: Some(format.text_color.unwrap_or(self.text_color)),
            stroke_color: Some(format.stroke_color.unwrap_or(self.stroke_color)),
            size: Some(format.size.unwrap_or(self.size)),
            stroke: Some(format.stroke.unwrap_or(self.stroke)),
            bold: Some(format.bold.unwrap_or(self.bold)),
            italic: Some(format.italic.unwrap_or(self.italic)),
            font_family: Some(
                format
                    .font_family
                    .clone()
                    .unwrap_or_else(|| self.font_family.clone()),
            ),
        }
    }

    pub(crate) fn clean_before_render(&mut self) {
        self.draws.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::RenderNode;

    #[test]
    fn test_defaults() {
        let node = TextNode::default();
        assert_eq!(node.text_color, 0xFFFFFF);
        assert_eq!(node.stroke_color, 0);
        assert_eq!(node.size, 30.0);
        assert_eq!(node.font_family, "Arial");
        assert!(!node.bold && !node.italic);
    }

    #[test]
    fn test_style_survives_frame_reset() {
        let mut node = RenderNode::text();
        {
            let text = node.as_text_mut().unwrap();
            text.size = 12.0;
            text.font_family = "Courier".to_string();
        }
        node.draw_text(1.0, 2.0, "first", TextFormat::default());
        node.draw_text(1.0, 20.0, "second", TextFormat::default());
        assert_eq!(node.render_count(), 2);

        node.clean_before_render();
        node.clean_before_render();
        let text = node.as_text().unwrap();
        assert!(text.draws.is_empty());
        assert_eq!(text.size, 12.0);
        assert_eq!(text.font_family, "Courier");
    }

    #[test]
    fn test_resolve_prefers_run_overrides() {
        let node = TextNode::default();
        let format = TextFormat {
            size: Some(14.0),
            bold: Some(true),
            ..Default::default()
        };
        let resolved = node.resolve(&format);
        assert_eq!(resolved.size, Some(14.0));
        assert_eq!(resolved.bold, Some(true));
        assert_eq!(resolved.text_color, Some(0xFFFFFF));
        assert_eq!(resolved.font_family.as_deref(), Some("Arial"));
    }
}
