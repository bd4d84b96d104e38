//! Anchor resolution
//!
//! A child may be positioned relative to any descendant of the container
//! (not only a sibling), referenced by [`ViewId`]. Resolution finds the node,
//! rejects anchors that live inside the anchored child, and caches the direct
//! child of the container that contains the anchor. That direct child is what
//! dependency ordering sorts against.
//!
//! Caches are checked lazily on every prepare and re-resolved when stale.

use tracing::{trace, warn};

use crate::coordinator::Coordinator;
use crate::error::{CoordinatorError, Result};
use crate::params::{AnchorState, ResolvedAnchor};
use crate::tree::{NodeId, ViewId};

/// Outcome of walking from an anchor up to the container
enum AnchorPath {
    /// Reached the container through this direct child
    DirectChild(NodeId),
    /// Passed through the anchored child itself
    ThroughChild,
    /// Fell off the tree before reaching the container
    Detached,
}

impl Coordinator {
    fn walk_to_container(&self, anchor: NodeId, child: NodeId) -> AnchorPath {
        let root = self.tree.root();
        let mut direct = anchor;

        if anchor == child {
            return AnchorPath::ThroughChild;
        }
        for ancestor in self.tree.ancestors(anchor) {
            if ancestor == child {
                return AnchorPath::ThroughChild;
            }
            if ancestor == root {
                return AnchorPath::DirectChild(direct);
            }
            direct = ancestor;
        }
        AnchorPath::Detached
    }

    fn resolve_anchor(&self, child: NodeId, view_id: ViewId) -> Result<ResolvedAnchor> {
        let root = self.tree.root();
        let anchor = self
            .tree
            .find_by_view_id(root, view_id)
            .ok_or(CoordinatorError::AnchorNotFound {
                anchor: view_id,
                child,
            })?;

        match self.walk_to_container(anchor, child) {
            AnchorPath::DirectChild(direct_child) => Ok(ResolvedAnchor {
                anchor,
                direct_child,
            }),
            AnchorPath::ThroughChild => Err(CoordinatorError::CyclicAnchor {
                anchor: view_id,
                child,
            }),
            AnchorPath::Detached => Err(CoordinatorError::AnchorNotFound {
                anchor: view_id,
                child,
            }),
        }
    }

    /// Re-check a cached resolution; returns the refreshed value if still valid
    fn verify_anchor(
        &self,
        child: NodeId,
        view_id: ViewId,
        cached: ResolvedAnchor,
    ) -> Option<ResolvedAnchor> {
        let carries_id = self
            .tree
            .node(cached.anchor)
            .is_some_and(|node| node.get_view_id() == Some(view_id));
        if !carries_id {
            return None;
        }
        match self.walk_to_container(cached.anchor, child) {
            AnchorPath::DirectChild(direct_child) => Some(ResolvedAnchor {
                anchor: cached.anchor,
                direct_child,
            }),
            AnchorPath::ThroughChild | AnchorPath::Detached => None,
        }
    }

    /// Resolve or re-validate the anchor of a direct child
    ///
    /// Returns the anchor node, or `None` when the child has no anchor or the
    /// failure was degraded in preview mode.
    pub(crate) fn find_anchor(&mut self, child: NodeId) -> Result<Option<NodeId>> {
        let Some(record) = self.records.get(child) else {
            return Err(CoordinatorError::NotAChild(child));
        };
        let Some(view_id) = record.params.anchor else {
            if let Some(record) = self.records.get_mut(child) {
                record.anchor_state = AnchorState::Unset;
            }
            return Ok(None);
        };

        let cached = match record.anchor_state {
            AnchorState::Resolved(cached) => self.verify_anchor(child, view_id, cached),
            _ => None,
        };

        let resolved = match cached {
            Some(resolved) => Ok(resolved),
            None => self.resolve_anchor(child, view_id),
        };

        let preview_mode = self.config.preview_mode;
        let Some(record) = self.records.get_mut(child) else {
            return Err(CoordinatorError::NotAChild(child));
        };
        match resolved {
            Ok(resolved) => {
                trace!(child = ?child, anchor = %view_id, "anchor resolved");
                record.anchor_state = AnchorState::Resolved(resolved);
                Ok(Some(resolved.anchor))
            }
            Err(err) if preview_mode => {
                warn!(%err, "anchor ignored in preview mode");
                record.anchor_state = AnchorState::Degraded;
                Ok(None)
            }
            Err(err) => {
                record.anchor_state = AnchorState::Invalidated;
                Err(err)
            }
        }
    }

    /// Anchor node resolved during the last prepare
    pub fn anchor_of(&self, child: NodeId) -> Option<NodeId> {
        self.records
            .get(child)
            .and_then(|record| record.resolved_anchor())
            .map(|resolved| resolved.anchor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoordinatorConfig;
    use crate::params::LayoutParams;
    use crate::tree::Node;
    use std::rc::Rc;

    use crate::behavior::BehaviorRegistry;

    fn preview() -> Coordinator {
        let config = CoordinatorConfig {
            preview_mode: true,
            ..Default::default()
        };
        Coordinator::new(config, Rc::new(BehaviorRegistry::new()))
    }

    #[test]
    fn test_resolves_nested_anchor_to_direct_child() {
        let mut coordinator = Coordinator::default();
        let panel = coordinator.add_child(Node::new(), LayoutParams::new());
        let title = coordinator
            .tree_mut()
            .append(panel, Node::new().view_id(ViewId(5)))
            .unwrap();
        let fab = coordinator.add_child(Node::new(), LayoutParams::new().anchor(ViewId(5)));

        assert_eq!(coordinator.find_anchor(fab), Ok(Some(title)));
        let resolved = coordinator.record(fab).unwrap().resolved_anchor().unwrap();
        assert_eq!(resolved.direct_child, panel);
        assert_eq!(coordinator.anchor_of(fab), Some(title));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut coordinator = Coordinator::default();
        let target = coordinator.add_child(Node::new().view_id(ViewId(1)), LayoutParams::new());
        let fab = coordinator.add_child(Node::new(), LayoutParams::new().anchor(ViewId(1)));

        let first = coordinator.find_anchor(fab).unwrap();
        let second = coordinator.find_anchor(fab).unwrap();
        assert_eq!(first, Some(target));
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_anchor_is_not_found() {
        let mut coordinator = Coordinator::default();
        let fab = coordinator.add_child(Node::new(), LayoutParams::new().anchor(ViewId(9)));

        assert_eq!(
            coordinator.find_anchor(fab),
            Err(CoordinatorError::AnchorNotFound {
                anchor: ViewId(9),
                child: fab
            })
        );
    }

    #[test]
    fn test_anchor_to_self_or_descendant_is_cyclic() {
        let mut coordinator = Coordinator::default();
        let sheet = coordinator.add_child(
            Node::new().view_id(ViewId(2)),
            LayoutParams::new().anchor(ViewId(3)),
        );
        coordinator
            .tree_mut()
            .append(sheet, Node::new().view_id(ViewId(3)))
            .unwrap();

        assert!(matches!(
            coordinator.find_anchor(sheet),
            Err(CoordinatorError::CyclicAnchor { .. })
        ));

        coordinator.set_anchor(sheet, Some(ViewId(2))).unwrap();
        assert!(matches!(
            coordinator.find_anchor(sheet),
            Err(CoordinatorError::CyclicAnchor { .. })
        ));
    }

    #[test]
    fn test_preview_mode_degrades_to_no_anchor() {
        let mut coordinator = preview();
        let fab = coordinator.add_child(Node::new(), LayoutParams::new().anchor(ViewId(9)));

        assert_eq!(coordinator.find_anchor(fab), Ok(None));
        assert!(!coordinator.record(fab).unwrap().anchor_changed());
    }

    #[test]
    fn test_stale_cache_is_re_resolved() {
        let mut coordinator = Coordinator::default();
        let first = coordinator.add_child(Node::new().view_id(ViewId(1)), LayoutParams::new());
        let fab = coordinator.add_child(Node::new(), LayoutParams::new().anchor(ViewId(1)));
        assert_eq!(coordinator.find_anchor(fab).unwrap(), Some(first));

        coordinator.remove_child(first).unwrap();
        let second = coordinator.add_child(Node::new().view_id(ViewId(1)), LayoutParams::new());
        assert_eq!(coordinator.find_anchor(fab).unwrap(), Some(second));
    }
}
