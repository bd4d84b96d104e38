//! Per-frame reconciliation of dependent children
//!
//! Layout places every child once, but dependencies can move afterwards
//! (an animated translation, a behavior offsetting its child). Before each
//! frame is drawn, this pass walks the children in dependency order, snaps
//! anchored children back to their anchors and tells dependents about every
//! child whose on-screen rect changed.

use tracing::trace;

use crate::coordinator::Coordinator;
use crate::tree::NodeId;

/// What a reconciliation pass changed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Children whose rect differed from the last recorded one, in dependency order
    pub moved: Vec<NodeId>,
    /// Number of `on_dependent_view_changed` calls made
    pub notified: usize,
}

impl ReconcileReport {
    /// True when nothing moved; the host has nothing to invalidate
    pub fn is_empty(&self) -> bool {
        self.moved.is_empty()
    }
}

impl Coordinator {
    /// Frame callback; runs reconciliation only while registered
    ///
    /// Returns `None` when the container is detached or no child has a live
    /// dependency.
    pub fn on_pre_draw(&mut self) -> Option<ReconcileReport> {
        if !self.is_reconciliation_registered() {
            return None;
        }
        Some(self.reconcile())
    }

    /// Re-derive dependent positions and notify behaviors of moved dependencies
    ///
    /// Running it again without external movement in between is a no-op.
    pub fn reconcile(&mut self) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let order = self.dependency_order.clone();

        for (index, &child) in order.iter().enumerate() {
            let anchor_laid_out = self
                .records
                .get(child)
                .and_then(|record| record.anchor_direct_child())
                .is_some_and(|direct| order[..index].contains(&direct));
            if anchor_laid_out {
                self.offset_child_to_anchor(child);
            }

            let rect = self.child_rect(child, true);
            let Some(record) = self.records.get_mut(child) else {
                continue;
            };
            if record.last_child_rect == rect {
                continue;
            }
            record.last_child_rect = rect;
            report.moved.push(child);
            trace!(child = ?child, ?rect, "child moved");

            for &dependent in &order[index + 1..] {
                let depends = self
                    .records
                    .get(dependent)
                    .and_then(|record| record.behavior())
                    .is_some_and(|behavior| behavior.layout_depends_on(self, dependent, child));
                if depends {
                    self.with_behavior(dependent, |behavior, parent| {
                        behavior.on_dependent_view_changed(parent, dependent, child)
                    });
                    report.notified += 1;
                }
            }
        }
        report
    }

    /// Move an anchored child's layout box to where its anchor now wants it
    fn offset_child_to_anchor(&mut self, child: NodeId) {
        let Some(resolved) = self.records.get(child).and_then(|r| r.resolved_anchor()) else {
            return;
        };
        let anchor_rect = self.tree.descendant_rect(resolved.anchor, false);
        let desired =
            self.desired_anchored_child_rect(child, anchor_rect, self.layout_direction());
        let current = self.tree.frame(child);

        let dx = desired.left() - current.left();
        let dy = desired.top() - current.top();
        if dx != 0.0 || dy != 0.0 {
            self.tree.offset(child, dx, dy);
        }
    }
}
