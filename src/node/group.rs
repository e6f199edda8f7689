use std::fmt;

use super::RenderNodeRef;
use crate::transform::Transform;

/// Ordered child nodes drawn as one unit.
#[derive(Clone, Default)]
pub struct GroupNode {
    pub children: Vec<RenderNodeRef>,
}

impl fmt::Debug for GroupNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Children may be shared with other groups; print types only.
        let types: Vec<_> = self
            .children
            .iter()
            .map(|child| match child.try_borrow() {
                Ok(node) => format!("{:?}", node.node_type()),
                Err(_) => "<borrowed>".to_string(),
            })
            .collect();
        f.debug_struct("GroupNode").field("children", &types).finish()
    }
}

impl GroupNode {
    pub(crate) fn clean_before_render(&mut self) {
        self.children.clear();
    }
}

/// Transforms applied to the sibling nodes drawn after this one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetTransformNode {
    pub transforms: Vec<Transform>,
}

impl SetTransformNode {
    /// All transforms queued this frame, composed in order.
    pub fn combined(&self) -> Transform {
        self.transforms
            .iter()
            .fold(Transform::IDENTITY, |acc, t| t.then(&acc))
    }

    pub(crate) fn clean_before_render(&mut self) {
        self.transforms.clear();
    }
}

/// Alpha applied to the sibling nodes drawn after this one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetAlphaNode {
    pub alpha: Option<f64>,
}

impl SetAlphaNode {
    pub(crate) fn clean_before_render(&mut self) {
        self.alpha = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::RenderNode;

    #[test]
    fn test_set_alpha_replaces_earlier_value() {
        let mut node = RenderNode::set_alpha_node();
        node.set_alpha(0.5);
        node.set_alpha(0.25);
        assert_eq!(node.render_count(), 1);
        match node.kind() {
            crate::node::NodeKind::SetAlpha(n) => assert_eq!(n.alpha, Some(0.25)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_group_keeps_child_order() {
        let mut group = RenderNode::group();
        group.add_node(RenderNode::text().into_ref());
        group.add_node(RenderNode::bitmap().into_ref());
        let children = &group.as_group().unwrap().children;
        assert_eq!(children.len(), 2);
        assert_eq!(children[1].borrow().node_type(), crate::node::RenderNodeType::Bitmap);
        assert_eq!(group.render_count(), 2);
    }

    #[test]
    fn test_combined_transform() {
        let node = SetTransformNode {
            transforms: vec![Transform::translate(10.0, 0.0), Transform::scale(2.0)],
        };
        // Translate first, then scale.
        let (x, y) = node.combined().transform_point(1.0, 1.0);
        assert_eq!((x, y), (22.0, 2.0));
    }
}
