//! The coordination container
//!
//! A [`Coordinator`] owns a [`NodeTree`] whose root is the container, plus one
//! [`ChildRecord`] per direct child. Layout, touch routing and reconciliation
//! are implemented as `impl Coordinator` blocks in their own modules; this
//! module holds the state and the child-management surface.
//!
//! # Example
//!
//! ```rust
//! use tether_layout::prelude::*;
//!
//! let mut coordinator = Coordinator::default();
//! let child = coordinator.add_child(
//!     Node::new().content_size(50.0, 20.0),
//!     LayoutParams::new().gravity(Gravity::CENTER),
//! );
//!
//! coordinator
//!     .compute_layout(MeasureSpec::Exactly(200.0), MeasureSpec::Exactly(100.0))
//!     .unwrap();
//! assert_eq!(coordinator.tree().frame(child), Rect::from_ltrb(75.0, 40.0, 125.0, 60.0));
//! ```

use std::any::Any;
use std::rc::Rc;

use slotmap::SecondaryMap;
use tether_core::{Insets, LayoutDirection, Point, Rect, Size};
use tracing::{debug, error, warn};

use crate::behavior::{Behavior, BehaviorRegistry};
use crate::config::CoordinatorConfig;
use crate::error::{CoordinatorError, Result};
use crate::params::{ChildRecord, LayoutParams};
use crate::touch::TouchState;
use crate::tree::{Node, NodeId, NodeTree, ViewId, Visibility};

/// Container that lays out and coordinates children through their behaviors
pub struct Coordinator {
    pub(crate) tree: NodeTree,
    pub(crate) records: SecondaryMap<NodeId, ChildRecord>,
    /// Children in dependency order, recomputed by `prepare_children`
    pub(crate) dependency_order: Vec<NodeId>,
    /// Structure or anchors changed since the last sort
    pub(crate) order_stale: bool,
    pub(crate) config: CoordinatorConfig,
    /// Keylines in logical pixels
    pub(crate) keylines: Vec<f32>,
    pub(crate) registry: Rc<BehaviorRegistry>,
    pub(crate) touch: TouchState,
    pub(crate) attached: bool,
    /// At least one child has a live dependency
    pub(crate) needs_pre_draw: bool,
    pub(crate) measured: Size,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new(CoordinatorConfig::default(), Rc::new(BehaviorRegistry::new()))
    }
}

impl Coordinator {
    /// Create an empty coordinator
    ///
    /// The registry is shared; build it once and hand the same `Rc` to every
    /// coordinator.
    pub fn new(config: CoordinatorConfig, registry: Rc<BehaviorRegistry>) -> Self {
        Self {
            tree: NodeTree::default(),
            records: SecondaryMap::new(),
            dependency_order: Vec::new(),
            order_stale: true,
            keylines: config.scaled_keylines(),
            config,
            registry,
            touch: TouchState::Idle,
            attached: false,
            needs_pre_draw: false,
            measured: Size::ZERO,
        }
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    /// Mutable access for host-managed descendants
    ///
    /// Only nodes below the direct children can be added or removed here; the
    /// direct children themselves go through `add_child` and `remove_child`.
    /// Anchor caches are re-validated lazily, so restructuring descendants is
    /// picked up by the next measure pass.
    pub fn tree_mut(&mut self) -> &mut NodeTree {
        &mut self.tree
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn registry(&self) -> &Rc<BehaviorRegistry> {
        &self.registry
    }

    pub fn layout_direction(&self) -> LayoutDirection {
        self.config.layout_direction
    }

    pub fn set_layout_direction(&mut self, direction: LayoutDirection) {
        self.config.layout_direction = direction;
        self.tree.request_layout(self.tree.root());
    }

    pub fn padding(&self) -> Insets {
        self.config.padding
    }

    pub fn set_padding(&mut self, padding: Insets) {
        self.config.padding = padding;
        self.tree.request_layout(self.tree.root());
    }

    /// Size computed by the last measure pass
    pub fn measured_size(&self) -> Size {
        self.measured
    }

    /// Size assigned by the last layout pass
    pub fn size(&self) -> Size {
        self.tree.frame(self.tree.root()).size
    }

    /// Direct children in draw order
    pub fn children(&self) -> &[NodeId] {
        self.tree.children(self.tree.root())
    }

    /// Direct children in the order of the last dependency sort
    pub fn dependency_sorted_children(&self) -> &[NodeId] {
        &self.dependency_order
    }

    pub fn is_child(&self, node: NodeId) -> bool {
        self.records.contains_key(node)
    }

    // =========================================================================
    // Child Management
    // =========================================================================

    /// Add a direct child
    ///
    /// A behavior named in `params` is constructed through the registry. If that
    /// fails the error is logged and the child proceeds without a behavior.
    pub fn add_child(&mut self, node: Node, params: LayoutParams) -> NodeId {
        let id = self.tree.append_to_root(node);
        let mut record = ChildRecord::new(params);

        if let Some(name) = record.params.behavior.clone() {
            match self.registry.create(&name) {
                Ok(behavior) => record.set_behavior(Some(behavior)),
                Err(err) => {
                    warn!(%err, child = ?id, "child proceeds without a behavior");
                    record.behavior_resolved = true;
                }
            }
        }

        self.records.insert(id, record);
        self.order_stale = true;
        id
    }

    /// Remove a direct child and its subtree
    pub fn remove_child(&mut self, child: NodeId) -> Result<()> {
        if !self.records.contains_key(child) {
            return Err(CoordinatorError::NotAChild(child));
        }
        if self.touch == TouchState::Intercepted(child) {
            self.reset_touch_behaviors(true);
        }
        self.records.remove(child);
        self.tree.remove_subtree(child);
        self.dependency_order.retain(|&c| c != child);
        self.order_stale = true;
        Ok(())
    }

    /// Move a direct child to `index` in draw order
    pub fn reorder_child(&mut self, child: NodeId, index: usize) -> Result<()> {
        if !self.records.contains_key(child) || !self.tree.reorder(child, index) {
            return Err(CoordinatorError::NotAChild(child));
        }
        self.order_stale = true;
        Ok(())
    }

    pub fn record(&self, child: NodeId) -> Option<&ChildRecord> {
        self.records.get(child)
    }

    pub fn layout_params(&self, child: NodeId) -> Option<&LayoutParams> {
        self.records.get(child).map(|record| &record.params)
    }

    fn record_mut(&mut self, child: NodeId) -> Result<&mut ChildRecord> {
        self.records
            .get_mut(child)
            .ok_or(CoordinatorError::NotAChild(child))
    }

    /// Change the anchor reference; the cached resolution is dropped and
    /// re-resolved on the next measure pass
    pub fn set_anchor(&mut self, child: NodeId, anchor: Option<ViewId>) -> Result<()> {
        self.record_mut(child)?.set_anchor(anchor);
        self.order_stale = true;
        self.tree.request_layout(child);
        Ok(())
    }

    /// Edit the layout params in place
    ///
    /// Changing the anchor through this method invalidates the cached
    /// resolution just like [`set_anchor`](Self::set_anchor).
    pub fn update_layout_params(
        &mut self,
        child: NodeId,
        update: impl FnOnce(&mut LayoutParams),
    ) -> Result<()> {
        let record = self.record_mut(child)?;
        let previous_anchor = record.params.anchor;
        update(&mut record.params);
        if record.params.anchor != previous_anchor {
            record.invalidate_anchor();
            self.order_stale = true;
        }
        self.tree.request_layout(child);
        Ok(())
    }

    /// Replace the behavior of a child
    ///
    /// Clears the behavior tag and overrides any default behavior of the
    /// node's kind.
    pub fn set_behavior(
        &mut self,
        child: NodeId,
        behavior: Option<Box<dyn Behavior>>,
    ) -> Result<()> {
        self.record_mut(child)?.set_behavior(behavior);
        self.order_stale = true;
        Ok(())
    }

    pub fn behavior(&self, child: NodeId) -> Option<&dyn Behavior> {
        self.records.get(child).and_then(|record| record.behavior())
    }

    /// Opaque per-child slot a behavior may use for its own bookkeeping
    pub fn behavior_tag(&self, child: NodeId) -> Option<&dyn Any> {
        self.records
            .get(child)
            .and_then(|record| record.behavior_tag.as_deref())
    }

    pub fn behavior_tag_mut(&mut self, child: NodeId) -> Option<&mut dyn Any> {
        self.records
            .get_mut(child)
            .and_then(|record| record.behavior_tag.as_deref_mut())
    }

    pub fn set_behavior_tag(&mut self, child: NodeId, tag: Option<Box<dyn Any>>) -> Result<()> {
        self.record_mut(child)?.behavior_tag = tag;
        Ok(())
    }

    /// Apply the default behavior of the node's kind, once
    pub(crate) fn ensure_behavior_resolved(&mut self, child: NodeId) {
        let Some(record) = self.records.get(child) else {
            return;
        };
        if record.behavior_resolved {
            return;
        }

        let created = self
            .tree
            .node(child)
            .and_then(|node| node.get_kind())
            .and_then(|kind| self.registry.create_default(kind));

        let Some(record) = self.records.get_mut(child) else {
            return;
        };
        match created {
            Some(Ok(behavior)) => record.set_behavior(Some(behavior)),
            Some(Err(err)) => {
                warn!(%err, child = ?child, "default behavior could not be instantiated")
            }
            None => {}
        }
        record.behavior_resolved = true;
    }

    /// Run `f` with the child's behavior detached from its record
    ///
    /// Returns `None` when the child has no behavior. If the hook replaced the
    /// behavior through the coordinator, the replacement is kept.
    pub(crate) fn with_behavior<R>(
        &mut self,
        child: NodeId,
        f: impl FnOnce(&mut dyn Behavior, &mut Coordinator) -> R,
    ) -> Option<R> {
        let record = self.records.get_mut(child)?;
        let mut behavior = record.behavior.take()?;
        let generation = record.behavior_generation;

        let result = f(behavior.as_mut(), self);

        if let Some(record) = self.records.get_mut(child) {
            if record.behavior_generation == generation && record.behavior.is_none() {
                record.behavior = Some(behavior);
            }
        }
        Some(result)
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// Move a child's layout box outside of a layout pass (e.g. animation)
    pub fn offset_child(&mut self, child: NodeId, dx: f32, dy: f32) {
        self.tree.offset(child, dx, dy);
    }

    /// Set the transient visual translation of a node
    pub fn set_translation(&mut self, node: NodeId, translation: Point) {
        self.tree.set_translation(node, translation);
    }

    pub fn set_elevation(&mut self, node: NodeId, elevation: f32) {
        if let Some(node) = self.tree.node_mut(node) {
            *node = std::mem::take(node).elevation(elevation);
        }
    }

    pub fn set_visibility(&mut self, node: NodeId, visibility: Visibility) {
        if let Some(data) = self.tree.node_mut(node) {
            *data = std::mem::take(data).visibility(visibility);
        }
        self.tree.request_layout(node);
    }

    /// Position of a direct child
    ///
    /// Children that are gone or awaiting layout report an empty rect. With
    /// `transformed`, the child's translation is included.
    pub fn child_rect(&self, child: NodeId, transformed: bool) -> Rect {
        let gone = self
            .tree
            .node(child)
            .map_or(true, |node| node.get_visibility() == Visibility::Gone);
        if gone || self.tree.is_layout_requested(child) {
            return Rect::ZERO;
        }
        self.tree.descendant_rect(child, transformed)
    }

    /// On-screen bounds of any descendant in container coordinates
    pub fn descendant_rect(&self, node: NodeId) -> Rect {
        self.tree.descendant_rect(node, true)
    }

    /// Whether a point in container coordinates lies inside a child's
    /// on-screen bounds
    pub fn is_point_in_child_bounds(&self, child: NodeId, x: f32, y: f32) -> bool {
        self.descendant_rect(child).contains(Point::new(x, y))
    }

    /// Padded content area of the container
    pub fn content_rect(&self) -> Rect {
        self.size().to_rect().inset_by(self.config.padding)
    }

    /// Keyline offset in logical pixels
    ///
    /// A missing keyline is a configuration mistake that is logged and treated
    /// as offset 0.
    pub fn keyline(&self, index: usize) -> f32 {
        if self.keylines.is_empty() {
            error!(index, "no keylines defined for coordinator");
            return 0.0;
        }
        match self.keylines.get(index) {
            Some(&keyline) => keyline,
            None => {
                error!(index, count = self.keylines.len(), "keyline index out of range");
                0.0
            }
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// The container was attached to a window
    pub fn on_attached(&mut self) {
        self.reset_touch_behaviors(true);
        self.attached = true;
        debug!(
            reconciliation = self.needs_pre_draw,
            "coordinator attached"
        );
    }

    /// The container was detached from its window
    pub fn on_detached(&mut self) {
        self.reset_touch_behaviors(true);
        self.attached = false;
        debug!("coordinator detached");
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Whether the per-frame reconciliation callback is currently registered
    pub fn is_reconciliation_registered(&self) -> bool {
        self.attached && self.needs_pre_draw
    }

    /// Whether a child depends on its anchor or on any sibling
    pub fn has_dependencies(&self, child: NodeId) -> bool {
        let Some(record) = self.records.get(child) else {
            return false;
        };
        if record.resolved_anchor().is_some() {
            return true;
        }
        self.children()
            .iter()
            .any(|&other| other != child && self.depends_on(child, other))
    }

    /// Register or drop the reconciliation callback to match current dependencies
    pub(crate) fn ensure_pre_draw_listener(&mut self) {
        let needed = self
            .children()
            .iter()
            .any(|&child| self.has_dependencies(child));

        if needed != self.needs_pre_draw {
            debug!(needed, attached = self.attached, "reconciliation callback changed");
            self.needs_pre_draw = needed;
        }
    }
}
