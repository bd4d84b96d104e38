//! Scrim painting between children
//!
//! The coordinator draws nothing itself. A behavior reporting a positive scrim
//! opacity gets the padded content area dimmed right before its child is
//! drawn, covering every child drawn earlier.

use tether_core::{Color, Rect};

use crate::coordinator::Coordinator;
use crate::tree::{NodeId, Visibility};

/// Drawing surface the host supplies for scrims
pub trait ScrimCanvas {
    fn fill_rect(&mut self, rect: Rect, color: Color);
}

impl Coordinator {
    /// Scrim color for a child, with the behavior's opacity applied to alpha
    ///
    /// `None` when the child has no behavior or its opacity is not positive.
    pub fn scrim_for(&self, child: NodeId) -> Option<Color> {
        let behavior = self.behavior(child)?;
        let opacity = behavior.scrim_opacity(self, child);
        if opacity <= 0.0 {
            return None;
        }
        let color = behavior.scrim_color(self, child);
        Some(color.with_alpha(color.a * opacity.min(1.0)))
    }

    /// Draw visible children in order, painting scrims where behaviors ask for them
    pub fn draw_children<C: ScrimCanvas>(
        &self,
        canvas: &mut C,
        mut draw_child: impl FnMut(&mut C, NodeId),
    ) {
        let content = self.content_rect();
        for &child in self.children() {
            let visible = self
                .tree
                .node(child)
                .is_some_and(|node| node.get_visibility() == Visibility::Visible);
            if !visible {
                continue;
            }
            if let Some(color) = self.scrim_for(child) {
                canvas.fill_rect(content, color);
            }
            draw_child(canvas, child);
        }
    }
}
