//! Measure and layout passes
//!
//! Both passes walk the children in dependency order, so an anchor (or any
//! sibling a behavior depends on) is always sized and placed before the child
//! that refers to it. Each child's behavior gets the first chance to measure or
//! position it; declining falls back to the default implementations here.
//!
//! Placement priority for the default layout:
//!
//! 1. **Anchor**: next to the anchor's bounds, by anchor gravity and child gravity
//! 2. **Keyline**: horizontally against a keyline, vertically against the edges
//! 3. **Plain**: gravity inside the padded content area

use tether_core::{
    AbsoluteHorizontal, Gravity, LayoutDirection, MeasureSpec, Rect, Size, VerticalGravity,
};
use tracing::trace;

use crate::coordinator::Coordinator;
use crate::error::{CoordinatorError, Result};
use crate::tree::{NodeId, Visibility};

/// Shift applied by child gravity to a box of `extent` already aligned to its target
///
/// Left (or unspecified) keeps the box in place; right moves it a full
/// extent over, center half of one.
fn horizontal_shift(extent: f32, side: Option<AbsoluteHorizontal>) -> f32 {
    match side {
        Some(AbsoluteHorizontal::Left) | None => 0.0,
        Some(AbsoluteHorizontal::Center) => extent / 2.0,
        Some(AbsoluteHorizontal::Right) => extent,
    }
}

fn vertical_shift(extent: f32, side: Option<VerticalGravity>) -> f32 {
    match side {
        Some(VerticalGravity::Top) | None => 0.0,
        Some(VerticalGravity::Center) => extent / 2.0,
        Some(VerticalGravity::Bottom) => extent,
    }
}

fn horizontal_side(gravity: Gravity, direction: LayoutDirection) -> Option<AbsoluteHorizontal> {
    gravity
        .horizontal
        .map(|_| gravity.absolute_horizontal(direction))
}

impl Coordinator {
    // =========================================================================
    // Measure
    // =========================================================================

    /// Measure all children and resolve the container's own size
    ///
    /// Resolves anchors and re-sorts children first, so configuration errors
    /// surface here.
    pub fn measure(&mut self, width_spec: MeasureSpec, height_spec: MeasureSpec) -> Result<Size> {
        self.prepare_children()?;

        let padding = self.config.padding;
        let mut width_used = padding.horizontal();
        let mut height_used = padding.vertical();

        let order = self.dependency_order.clone();
        for child in order {
            if self.is_gone(child) {
                continue;
            }

            let keyline_width_used = self.keyline_width_used(child, width_spec);
            let handled = self
                .with_behavior(child, |behavior, parent| {
                    behavior.on_measure_child(
                        parent,
                        child,
                        width_spec,
                        keyline_width_used,
                        height_spec,
                        0.0,
                    )
                })
                .unwrap_or(false);
            if !handled {
                self.on_measure_child(child, width_spec, keyline_width_used, height_spec, 0.0);
            }

            let measured = self.tree.measured(child);
            let margins = self
                .layout_params(child)
                .map(|params| params.margins)
                .unwrap_or_default();
            width_used =
                width_used.max(padding.horizontal() + measured.width + margins.horizontal());
            height_used =
                height_used.max(padding.vertical() + measured.height + margins.vertical());
        }

        let size = Size::new(width_spec.resolve(width_used), height_spec.resolve(height_used));
        trace!(width = size.width, height = size.height, "coordinator measured");
        self.measured = size;
        Ok(size)
    }

    /// Default measurement of one child
    ///
    /// `width_used` and `height_used` are subtracted from the available space
    /// on top of padding and margins.
    pub fn on_measure_child(
        &mut self,
        child: NodeId,
        width_spec: MeasureSpec,
        width_used: f32,
        height_spec: MeasureSpec,
        height_used: f32,
    ) {
        let Some(params) = self.layout_params(child) else {
            return;
        };
        let padding = self.config.padding;
        let child_width = width_spec.child_spec(
            padding.horizontal() + params.margins.horizontal() + width_used,
            params.width,
        );
        let child_height = height_spec.child_spec(
            padding.vertical() + params.margins.vertical() + height_used,
            params.height,
        );

        let content = self
            .tree
            .node(child)
            .map(|node| node.get_content_size())
            .unwrap_or_default();
        let measured = Size::new(
            child_width.resolve(content.width),
            child_height.resolve(content.height),
        );
        self.tree.set_measured(child, measured);
    }

    /// Width taken away from a keyline child by the side of the keyline it sits on
    fn keyline_width_used(&self, child: NodeId, width_spec: MeasureSpec) -> f32 {
        let Some(params) = self.layout_params(child) else {
            return 0.0;
        };
        let Some(index) = params.keyline else {
            return 0.0;
        };
        if width_spec.is_unspecified() {
            return 0.0;
        }

        let width = width_spec.size();
        let padding = self.config.padding;
        let position = self.keyline_position(index, width);
        let gravity = params.gravity.or(Gravity::END | Gravity::TOP);

        match horizontal_side(gravity, self.layout_direction()) {
            Some(AbsoluteHorizontal::Left) | None => (width - padding.right - position).max(0.0),
            Some(AbsoluteHorizontal::Right) => (position - padding.left).max(0.0),
            Some(AbsoluteHorizontal::Center) => 0.0,
        }
    }

    /// Keyline offset from the left edge of a container `width` wide
    pub fn keyline_position(&self, index: usize, width: f32) -> f32 {
        let keyline = self.keyline(index);
        match self.layout_direction() {
            LayoutDirection::Ltr => keyline,
            LayoutDirection::Rtl => width - keyline,
        }
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Position all children inside a container of `size`
    ///
    /// On error every child's previous frame is restored and marked as
    /// awaiting layout.
    pub fn layout(&mut self, size: Size) -> Result<()> {
        let root = self.tree.root();
        let snapshot: Vec<(NodeId, Rect)> = std::iter::once(root)
            .chain(self.children().iter().copied())
            .map(|node| (node, self.tree.frame(node)))
            .collect();

        self.tree.set_frame(root, size.to_rect());
        let direction = self.layout_direction();

        let order = self.dependency_order.clone();
        for child in order {
            if self.is_gone(child) {
                continue;
            }
            if let Err(err) = self.layout_one(child, direction) {
                for &(node, frame) in &snapshot {
                    self.tree.set_frame(node, frame);
                    self.tree.request_layout(node);
                }
                return Err(err);
            }
        }
        Ok(())
    }

    /// Measure with the given constraints, then lay out at the measured size
    pub fn compute_layout(
        &mut self,
        width_spec: MeasureSpec,
        height_spec: MeasureSpec,
    ) -> Result<()> {
        let size = self.measure(width_spec, height_spec)?;
        self.layout(size)
    }

    fn layout_one(&mut self, child: NodeId, direction: LayoutDirection) -> Result<()> {
        self.check_anchor_unchanged(child)?;

        let handled = self.with_behavior(child, |behavior, parent| {
            behavior.on_layout_child(parent, child, direction)
        });
        match handled {
            Some(Ok(true)) => Ok(()),
            Some(Err(err)) => Err(err),
            Some(Ok(false)) | None => self.on_layout_child(child, direction),
        }
    }

    fn check_anchor_unchanged(&self, child: NodeId) -> Result<()> {
        let record = self
            .records
            .get(child)
            .ok_or(CoordinatorError::NotAChild(child))?;
        if record.anchor_changed() {
            return Err(CoordinatorError::StaleAnchor { child });
        }
        Ok(())
    }

    /// Default positioning of one child: anchor, then keyline, then gravity
    pub fn on_layout_child(&mut self, child: NodeId, direction: LayoutDirection) -> Result<()> {
        self.check_anchor_unchanged(child)?;
        let Some(record) = self.records.get(child) else {
            return Err(CoordinatorError::NotAChild(child));
        };

        let rect = if let Some(resolved) = record.resolved_anchor() {
            let anchor_rect = self.tree.descendant_rect(resolved.anchor, false);
            self.desired_anchored_child_rect(child, anchor_rect, direction)
        } else if let Some(index) = record.params.keyline {
            self.keyline_child_rect(child, index, direction)
        } else {
            self.plain_child_rect(child, direction)
        };

        trace!(child = ?child, ?rect, "child laid out");
        self.tree.set_frame(child, rect);
        Ok(())
    }

    /// Where an anchored child belongs given its anchor's bounds
    ///
    /// Anchor gravity first aligns the child's box with the anchor's edges
    /// (default start | top): left flush with the anchor's left, right flush
    /// with its right, center centered on it. Child gravity then shifts the box
    /// by its own size (default center): right or bottom by a full width or
    /// height, center by half. The result is kept inside the padded area minus
    /// margins.
    pub fn desired_anchored_child_rect(
        &self,
        child: NodeId,
        anchor_rect: Rect,
        direction: LayoutDirection,
    ) -> Rect {
        let Some(params) = self.layout_params(child) else {
            return Rect::ZERO;
        };
        let measured = self.tree.measured(child);
        let gravity = params.gravity.or(Gravity::CENTER);
        let anchor_gravity = params.anchor_gravity.or(Gravity::START | Gravity::TOP);

        let aligned_left = match anchor_gravity.absolute_horizontal(direction) {
            AbsoluteHorizontal::Left => anchor_rect.left(),
            AbsoluteHorizontal::Right => anchor_rect.right() - measured.width,
            AbsoluteHorizontal::Center => {
                anchor_rect.left() + (anchor_rect.width() - measured.width) / 2.0
            }
        };
        let aligned_top = match anchor_gravity.vertical_or_top() {
            VerticalGravity::Top => anchor_rect.top(),
            VerticalGravity::Bottom => anchor_rect.bottom() - measured.height,
            VerticalGravity::Center => {
                anchor_rect.top() + (anchor_rect.height() - measured.height) / 2.0
            }
        };

        let left = aligned_left
            + horizontal_shift(measured.width, horizontal_side(gravity, direction));
        let top = aligned_top + vertical_shift(measured.height, gravity.vertical);
        self.clamp_to_content(child, left, top, measured)
    }

    fn keyline_child_rect(&self, child: NodeId, index: usize, direction: LayoutDirection) -> Rect {
        let Some(params) = self.layout_params(child) else {
            return Rect::ZERO;
        };
        let measured = self.tree.measured(child);
        let container = self.size();
        let gravity = params.gravity.or(Gravity::END | Gravity::TOP);

        let position = self.keyline_position(index, container.width);
        let left = position - measured.width
            + horizontal_shift(measured.width, horizontal_side(gravity, direction));
        let top = match gravity.vertical_or_top() {
            VerticalGravity::Top => 0.0,
            VerticalGravity::Bottom => container.height - measured.height,
            VerticalGravity::Center => (container.height - measured.height) / 2.0,
        };
        self.clamp_to_content(child, left, top, measured)
    }

    fn plain_child_rect(&self, child: NodeId, direction: LayoutDirection) -> Rect {
        let Some(params) = self.layout_params(child) else {
            return Rect::ZERO;
        };
        let measured = self.tree.measured(child);
        let container = self.size();
        let padding = self.config.padding;
        let margins = params.margins;

        let area = Rect::from_ltrb(
            padding.left + margins.left,
            padding.top + margins.top,
            container.width - padding.right - margins.right,
            container.height - padding.bottom - margins.bottom,
        );
        params
            .gravity
            .or(Gravity::START | Gravity::TOP)
            .apply(measured.width, measured.height, area, direction)
    }

    /// Keep a box inside the padded content area minus the child's margins
    ///
    /// The leading edge wins when the box does not fit.
    fn clamp_to_content(&self, child: NodeId, left: f32, top: f32, measured: Size) -> Rect {
        let container = self.size();
        let padding = self.config.padding;
        let margins = self
            .layout_params(child)
            .map(|params| params.margins)
            .unwrap_or_default();

        let left = left
            .min(container.width - padding.right - measured.width - margins.right)
            .max(padding.left + margins.left);
        let top = top
            .min(container.height - padding.bottom - measured.height - margins.bottom)
            .max(padding.top + margins.top);
        Rect::new(left, top, measured.width, measured.height)
    }

    fn is_gone(&self, node: NodeId) -> bool {
        self.tree
            .node(node)
            .map_or(true, |node| node.get_visibility() == Visibility::Gone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoordinatorConfig;
    use crate::params::LayoutParams;
    use crate::tree::{Node, ViewId};
    use crate::behavior::BehaviorRegistry;
    use std::rc::Rc;
    use tether_core::{Dimension, Insets};

    fn with_keylines(keylines: Vec<f32>, direction: LayoutDirection) -> Coordinator {
        let config = CoordinatorConfig {
            keylines,
            layout_direction: direction,
            ..Default::default()
        };
        Coordinator::new(config, Rc::new(BehaviorRegistry::new()))
    }

    fn exactly(width: f32, height: f32) -> (MeasureSpec, MeasureSpec) {
        (MeasureSpec::Exactly(width), MeasureSpec::Exactly(height))
    }

    #[test]
    fn test_center_gravity() {
        let mut coordinator = Coordinator::default();
        let child = coordinator.add_child(
            Node::new().content_size(50.0, 20.0),
            LayoutParams::new().gravity(Gravity::CENTER),
        );

        let (w, h) = exactly(200.0, 100.0);
        coordinator.compute_layout(w, h).unwrap();
        assert_eq!(coordinator.tree().frame(child), Rect::from_ltrb(75.0, 40.0, 125.0, 60.0));
    }

    #[test]
    fn test_plain_default_is_start_top_inside_padding_and_margins() {
        let mut coordinator = Coordinator::default();
        coordinator.set_padding(Insets::uniform(10.0));
        let child = coordinator.add_child(
            Node::new().content_size(30.0, 30.0),
            LayoutParams::new().margins(Insets::new(5.0, 2.0, 0.0, 0.0)),
        );

        let (w, h) = exactly(200.0, 100.0);
        coordinator.compute_layout(w, h).unwrap();
        assert_eq!(coordinator.tree().frame(child), Rect::new(15.0, 12.0, 30.0, 30.0));
    }

    #[test]
    fn test_wrap_content_container_size() {
        let mut coordinator = Coordinator::default();
        coordinator.set_padding(Insets::uniform(4.0));
        coordinator.add_child(Node::new().content_size(50.0, 20.0), LayoutParams::new());
        coordinator.add_child(
            Node::new().content_size(10.0, 60.0),
            LayoutParams::new().margins(Insets::new(0.0, 0.0, 0.0, 6.0)),
        );

        let size = coordinator
            .measure(MeasureSpec::AtMost(500.0), MeasureSpec::Unspecified)
            .unwrap();
        assert_eq!(size, Size::new(58.0, 74.0));
    }

    #[test]
    fn test_match_parent_child() {
        let mut coordinator = Coordinator::default();
        coordinator.set_padding(Insets::uniform(10.0));
        let child = coordinator.add_child(
            Node::new(),
            LayoutParams::new().size(Dimension::MatchParent, Dimension::Fixed(40.0)),
        );

        let (w, h) = exactly(200.0, 100.0);
        coordinator.compute_layout(w, h).unwrap();
        assert_eq!(coordinator.tree().frame(child), Rect::new(10.0, 10.0, 180.0, 40.0));
    }

    #[test]
    fn test_anchored_bottom_end_of_anchor() {
        let mut coordinator = Coordinator::default();
        let bar = coordinator.add_child(
            Node::new().view_id(ViewId(1)).content_size(200.0, 50.0),
            LayoutParams::new(),
        );
        let fab = coordinator.add_child(
            Node::new().content_size(20.0, 20.0),
            LayoutParams::new()
                .anchor(ViewId(1))
                .anchor_gravity(Gravity::BOTTOM | Gravity::END)
                .gravity(Gravity::CENTER_VERTICAL | Gravity::LEFT),
        );

        let (w, h) = exactly(200.0, 200.0);
        coordinator.compute_layout(w, h).unwrap();
        assert_eq!(coordinator.tree().frame(bar), Rect::new(0.0, 0.0, 200.0, 50.0));
        assert_eq!(coordinator.tree().frame(fab), Rect::new(180.0, 40.0, 20.0, 20.0));
    }

    #[test]
    fn test_anchored_default_shifts_half_a_box_from_anchor_origin() {
        let mut coordinator = Coordinator::default();
        coordinator.add_child(
            Node::new().view_id(ViewId(1)).content_size(100.0, 100.0),
            LayoutParams::new().gravity(Gravity::CENTER),
        );
        let badge = coordinator.add_child(
            Node::new().content_size(20.0, 20.0),
            LayoutParams::new().anchor(ViewId(1)),
        );
        let (w, h) = exactly(200.0, 200.0);
        coordinator.compute_layout(w, h).unwrap();
        assert_eq!(coordinator.tree().frame(badge), Rect::new(60.0, 60.0, 20.0, 20.0));
    }

    #[test]
    fn test_anchored_top_left_sits_flush_with_anchor() {
        let mut coordinator = Coordinator::default();
        coordinator.add_child(
            Node::new().view_id(ViewId(1)).content_size(100.0, 40.0),
            LayoutParams::new().margins(Insets::new(50.0, 80.0, 0.0, 0.0)),
        );
        let badge = coordinator.add_child(
            Node::new().content_size(20.0, 20.0),
            LayoutParams::new()
                .anchor(ViewId(1))
                .anchor_gravity(Gravity::TOP | Gravity::LEFT)
                .gravity(Gravity::TOP | Gravity::LEFT),
        );

        let (w, h) = exactly(300.0, 300.0);
        coordinator.compute_layout(w, h).unwrap();
        assert_eq!(coordinator.tree().frame(badge), Rect::new(50.0, 80.0, 20.0, 20.0));
    }

    #[test]
    fn test_anchored_child_is_clamped_to_padding() {
        let mut coordinator = Coordinator::default();
        coordinator.set_padding(Insets::uniform(45.0));
        coordinator.add_child(
            Node::new().view_id(ViewId(1)).content_size(100.0, 100.0),
            LayoutParams::new().gravity(Gravity::CENTER),
        );
        let badge = coordinator.add_child(
            Node::new().content_size(20.0, 20.0),
            LayoutParams::new()
                .anchor(ViewId(1))
                .anchor_gravity(Gravity::BOTTOM | Gravity::RIGHT),
        );

        let (w, h) = exactly(200.0, 200.0);
        coordinator.compute_layout(w, h).unwrap();
        // Unclamped the badge would sit at (140, 140), past the padded edge at 155
        assert_eq!(coordinator.tree().frame(badge), Rect::new(135.0, 135.0, 20.0, 20.0));
    }

    #[test]
    fn test_keyline_placement_ltr_and_rtl() {
        let mut coordinator = with_keylines(vec![16.0, 72.0], LayoutDirection::Ltr);
        let child = coordinator.add_child(
            Node::new().content_size(20.0, 10.0),
            LayoutParams::new().keyline(1),
        );
        let (w, h) = exactly(200.0, 100.0);
        coordinator.compute_layout(w, h).unwrap();
        assert_eq!(coordinator.tree().frame(child), Rect::new(72.0, 0.0, 20.0, 10.0));

        coordinator.set_layout_direction(LayoutDirection::Rtl);
        coordinator.compute_layout(w, h).unwrap();
        // end | top in RTL sits to the left of the mirrored keyline at 128
        assert_eq!(coordinator.tree().frame(child), Rect::new(108.0, 0.0, 20.0, 10.0));
    }

    #[test]
    fn test_keyline_narrows_measured_width() {
        let mut coordinator = with_keylines(vec![72.0], LayoutDirection::Ltr);
        let child = coordinator.add_child(
            Node::new().content_size(500.0, 10.0),
            LayoutParams::new().keyline(0).gravity(Gravity::BOTTOM | Gravity::LEFT),
        );

        let (w, h) = exactly(200.0, 100.0);
        coordinator.compute_layout(w, h).unwrap();
        assert_eq!(coordinator.tree().frame(child), Rect::new(0.0, 90.0, 72.0, 10.0));
    }

    #[test]
    fn test_missing_keyline_resolves_to_zero() {
        let mut coordinator = Coordinator::default();
        let child = coordinator.add_child(
            Node::new().content_size(20.0, 10.0),
            LayoutParams::new().keyline(2).gravity(Gravity::RIGHT),
        );

        let (w, h) = exactly(200.0, 100.0);
        coordinator.compute_layout(w, h).unwrap();
        assert_eq!(coordinator.tree().frame(child).origin.x, 0.0);
    }

    #[test]
    fn test_stale_anchor_restores_frames() {
        let mut coordinator = Coordinator::default();
        let target = coordinator.add_child(
            Node::new().view_id(ViewId(1)).content_size(50.0, 50.0),
            LayoutParams::new(),
        );
        let fab = coordinator.add_child(
            Node::new().content_size(10.0, 10.0),
            LayoutParams::new().anchor(ViewId(1)),
        );
        let (w, h) = exactly(200.0, 200.0);
        let size = coordinator.measure(w, h).unwrap();

        coordinator.set_anchor(fab, Some(ViewId(1))).unwrap();
        assert_eq!(
            coordinator.layout(size),
            Err(CoordinatorError::StaleAnchor { child: fab })
        );
        assert!(coordinator.tree().is_layout_requested(target));
        assert_eq!(coordinator.child_rect(target, false), Rect::ZERO);
    }

    #[test]
    fn test_gone_children_are_skipped() {
        let mut coordinator = Coordinator::default();
        coordinator.add_child(
            Node::new().content_size(80.0, 80.0).visibility(Visibility::Gone),
            LayoutParams::new(),
        );
        let size = coordinator
            .measure(MeasureSpec::AtMost(200.0), MeasureSpec::AtMost(200.0))
            .unwrap();
        assert_eq!(size, Size::ZERO);
    }
}
