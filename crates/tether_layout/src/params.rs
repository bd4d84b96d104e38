//! Per-child layout parameters and the coordinator's record for each child

use std::any::Any;

use tether_core::{Dimension, Gravity, Insets, Rect};

use crate::behavior::Behavior;
use crate::tree::{NodeId, ViewId};

/// Typed placement parameters for a direct child
///
/// Placement priority is anchor, then keyline, then plain gravity.
///
/// ```rust
/// use tether_layout::params::LayoutParams;
/// use tether_layout::tree::ViewId;
/// use tether_core::Gravity;
///
/// let params = LayoutParams::new()
///     .anchor(ViewId(3))
///     .anchor_gravity(Gravity::BOTTOM | Gravity::END)
///     .gravity(Gravity::CENTER);
/// assert_eq!(params.anchor, Some(ViewId(3)));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutParams {
    pub width: Dimension,
    pub height: Dimension,
    pub margins: Insets,
    /// Alignment of the child; meaning depends on the placement mode
    pub gravity: Gravity,
    /// Which point of the anchor the child aligns to
    pub anchor_gravity: Gravity,
    /// Index into the coordinator's keylines
    pub keyline: Option<usize>,
    /// Descendant the child is positioned relative to
    pub anchor: Option<ViewId>,
    /// Name of the behavior to construct through the registry
    pub behavior: Option<String>,
}

impl LayoutParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(mut self, width: Dimension, height: Dimension) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn width(mut self, width: Dimension) -> Self {
        self.width = width;
        self
    }

    pub fn height(mut self, height: Dimension) -> Self {
        self.height = height;
        self
    }

    pub fn margins(mut self, margins: Insets) -> Self {
        self.margins = margins;
        self
    }

    pub fn gravity(mut self, gravity: Gravity) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn anchor(mut self, anchor: ViewId) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn anchor_gravity(mut self, gravity: Gravity) -> Self {
        self.anchor_gravity = gravity;
        self
    }

    pub fn keyline(mut self, index: usize) -> Self {
        self.keyline = Some(index);
        self
    }

    pub fn behavior(mut self, name: impl Into<String>) -> Self {
        self.behavior = Some(name.into());
        self
    }
}

/// A resolved anchor and the direct child of the container that contains it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedAnchor {
    pub anchor: NodeId,
    /// Topmost ancestor of `anchor` below the container; the ordering key
    pub direct_child: NodeId,
}

/// Cached anchor resolution
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AnchorState {
    /// No anchor reference
    Unset,
    /// Reference set or changed since the last prepare
    Invalidated,
    Resolved(ResolvedAnchor),
    /// Resolution failed in preview mode; placed as if unanchored
    Degraded,
}

/// Coordinator-owned state for one direct child
pub struct ChildRecord {
    pub(crate) params: LayoutParams,
    pub(crate) behavior: Option<Box<dyn Behavior>>,
    /// Bumped on every assignment so a detached behavior is not restored over a replacement
    pub(crate) behavior_generation: u64,
    pub(crate) behavior_resolved: bool,
    pub(crate) behavior_tag: Option<Box<dyn Any>>,
    pub(crate) anchor_state: AnchorState,
    pub(crate) last_child_rect: Rect,
    pub(crate) did_block_interaction: bool,
    /// Offered an event during the current gesture stream
    pub(crate) touch_offered: bool,
    /// Received its synthesized cancel during the current gesture stream
    pub(crate) touch_cancelled: bool,
}

impl ChildRecord {
    pub(crate) fn new(params: LayoutParams) -> Self {
        let anchor_state = if params.anchor.is_some() {
            AnchorState::Invalidated
        } else {
            AnchorState::Unset
        };
        Self {
            params,
            behavior: None,
            behavior_generation: 0,
            behavior_resolved: false,
            behavior_tag: None,
            anchor_state,
            last_child_rect: Rect::ZERO,
            did_block_interaction: false,
            touch_offered: false,
            touch_cancelled: false,
        }
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    pub fn behavior(&self) -> Option<&dyn Behavior> {
        self.behavior.as_deref()
    }

    pub fn has_behavior(&self) -> bool {
        self.behavior.is_some()
    }

    pub fn is_behavior_resolved(&self) -> bool {
        self.behavior_resolved
    }

    pub fn last_child_rect(&self) -> Rect {
        self.last_child_rect
    }

    pub fn did_block_interaction(&self) -> bool {
        self.did_block_interaction
    }

    /// The resolved anchor, if resolution succeeded during the last prepare
    pub fn resolved_anchor(&self) -> Option<ResolvedAnchor> {
        match self.anchor_state {
            AnchorState::Resolved(resolved) => Some(resolved),
            _ => None,
        }
    }

    pub(crate) fn anchor_direct_child(&self) -> Option<NodeId> {
        self.resolved_anchor().map(|resolved| resolved.direct_child)
    }

    /// Replace the behavior, clearing the tag slot
    pub(crate) fn set_behavior(&mut self, behavior: Option<Box<dyn Behavior>>) {
        self.behavior = behavior;
        self.behavior_tag = None;
        self.behavior_resolved = true;
        self.behavior_generation += 1;
    }

    pub(crate) fn set_anchor(&mut self, anchor: Option<ViewId>) {
        self.params.anchor = anchor;
        self.invalidate_anchor();
    }

    pub(crate) fn invalidate_anchor(&mut self) {
        self.anchor_state = if self.params.anchor.is_some() {
            AnchorState::Invalidated
        } else {
            AnchorState::Unset
        };
    }

    /// True when an anchor is referenced but was invalidated after the last prepare
    pub(crate) fn anchor_changed(&self) -> bool {
        self.anchor_state == AnchorState::Invalidated
    }

    pub(crate) fn reset_touch_tracking(&mut self) {
        self.did_block_interaction = false;
        self.touch_offered = false;
        self.touch_cancelled = false;
    }
}
