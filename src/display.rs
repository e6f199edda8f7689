//! Display targets for the drawing facade.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::error::Result;
use crate::geometry::Rect;
use crate::graphics::Graphics;
use crate::node::RenderNodeRef;
use crate::number::IntoNumber;
use crate::transform::Transform;

/// A display object that a [`Graphics`] can draw into.
///
/// The target owns the render node it is handed. Methods take `&self`
/// because the facade calls back into the target while it is shared.
pub trait DisplayTarget {
    /// Install (or with `None`, remove) the node drawn for this target.
    fn set_render_node(&self, node: Option<RenderNodeRef>);

    /// The drawn content's bounds changed.
    fn invalidate_content_bounds(&self);

    /// Maps stage coordinates into this target's local space.
    fn inverted_concatenated_transform(&self) -> Transform;
}

/// A display object whose content is a single [`Graphics`].
pub struct Shape {
    graphics: RefCell<Graphics>,
    render_node: RefCell<Option<RenderNodeRef>>,
    matrix: Cell<Transform>,
    invalidations: Cell<usize>,
}

impl Shape {
    pub fn new() -> Rc<Self> {
        let shape = Rc::new(Self {
            graphics: RefCell::new(Graphics::new()),
            render_node: RefCell::new(None),
            matrix: Cell::new(Transform::IDENTITY),
            invalidations: Cell::new(0),
        });
        shape.graphics.borrow_mut().set_target(&shape);
        shape
    }

    pub fn graphics(&self) -> Ref<'_, Graphics> {
        self.graphics.borrow()
    }

    pub fn graphics_mut(&self) -> RefMut<'_, Graphics> {
        self.graphics.borrow_mut()
    }

    /// Stage transform of this shape.
    pub fn matrix(&self) -> Transform {
        self.matrix.get()
    }

    pub fn set_matrix(&self, matrix: Transform) {
        self.matrix.set(matrix);
        if let Some(node) = self.render_node() {
            let mut node = node.borrow_mut();
            node.moved = true;
            node.need_redraw = true;
        }
    }

    pub fn render_node(&self) -> Option<RenderNodeRef> {
        self.render_node.borrow().clone()
    }

    /// How many times the content bounds were invalidated.
    pub fn content_invalidations(&self) -> usize {
        self.invalidations.get()
    }

    pub fn measure_content_bounds(&self) -> Option<Rect> {
        self.graphics.borrow().measure_content_bounds()
    }

    /// Whether the stage point lands on drawn pixels.
    pub fn hit_test(&self, stage_x: impl IntoNumber, stage_y: impl IntoNumber) -> Result<bool> {
        let hit = self.graphics.borrow().hit_test(stage_x, stage_y)?;
        Ok(hit.is_some())
    }
}

impl DisplayTarget for Shape {
    fn set_render_node(&self, node: Option<RenderNodeRef>) {
        *self.render_node.borrow_mut() = node;
    }

    fn invalidate_content_bounds(&self) {
        self.invalidations.set(self.invalidations.get() + 1);
        if let Some(node) = self.render_node() {
            node.borrow_mut().need_redraw = true;
        }
    }

    fn inverted_concatenated_transform(&self) -> Transform {
        self.matrix.get().inverse()
    }
}
