//! Dependency ordering and z-ordering of children

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use smallvec::SmallVec;
use tracing::debug;

use crate::coordinator::Coordinator;
use crate::error::{CoordinatorError, Result};
use crate::tree::NodeId;

impl Coordinator {
    /// Whether `child` must be measured and laid out after `other`
    ///
    /// True when `other` contains the child's resolved anchor, or when the
    /// child's behavior declares the dependency.
    pub fn depends_on(&self, child: NodeId, other: NodeId) -> bool {
        if child == other {
            return false;
        }
        let Some(record) = self.records.get(child) else {
            return false;
        };
        if record.anchor_direct_child() == Some(other) {
            return true;
        }
        record
            .behavior()
            .is_some_and(|behavior| behavior.layout_depends_on(self, child, other))
    }

    /// Resolve behaviors and anchors, then re-sort if anything changed
    pub(crate) fn prepare_children(&mut self) -> Result<()> {
        let children = self.children().to_vec();

        for &child in &children {
            self.ensure_behavior_resolved(child);

            let before = self.records.get(child).and_then(|r| r.anchor_direct_child());
            self.find_anchor(child)?;
            let after = self.records.get(child).and_then(|r| r.anchor_direct_child());
            if before != after {
                self.order_stale = true;
            }
        }

        let dirty = children.iter().any(|&child| {
            self.records
                .get(child)
                .and_then(|record| record.behavior())
                .is_some_and(|behavior| behavior.is_dirty(self, child))
        });

        if self.order_stale || dirty || self.dependency_order.len() != children.len() {
            self.dependency_order = self.sort_by_dependencies(&children)?;
            self.order_stale = false;
            debug!(children = children.len(), dirty, "children re-sorted by dependency");
        }

        self.ensure_pre_draw_listener();
        Ok(())
    }

    /// Stable topological sort of `children`
    ///
    /// Among children whose dependencies are already placed, the one earliest
    /// in `children` goes next, so unrelated children keep their order.
    pub(crate) fn sort_by_dependencies(&self, children: &[NodeId]) -> Result<Vec<NodeId>> {
        let count = children.len();
        let mut pending = vec![0usize; count];
        let mut dependents: Vec<SmallVec<[usize; 4]>> = vec![SmallVec::new(); count];

        for (i, &child) in children.iter().enumerate() {
            for (j, &other) in children.iter().enumerate() {
                if i != j && self.depends_on(child, other) {
                    pending[i] += 1;
                    dependents[j].push(i);
                }
            }
        }

        let mut ready: BinaryHeap<Reverse<usize>> = pending
            .iter()
            .enumerate()
            .filter(|(_, &n)| n == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(count);
        while let Some(Reverse(i)) = ready.pop() {
            order.push(children[i]);
            for &dependent in &dependents[i] {
                pending[dependent] -= 1;
                if pending[dependent] == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }

        if order.len() < count {
            let nodes = children
                .iter()
                .zip(&pending)
                .filter(|(_, &n)| n > 0)
                .map(|(&child, _)| child)
                .collect();
            return Err(CoordinatorError::DependencyCycle { nodes });
        }
        Ok(order)
    }

    /// Children ordered topmost first for hit testing
    ///
    /// Higher elevation wins; equal elevations keep reverse draw order.
    pub fn top_sorted_children(&self) -> SmallVec<[NodeId; 8]> {
        let mut sorted: SmallVec<[NodeId; 8]> = self.children().iter().rev().copied().collect();
        sorted.sort_by(|&a, &b| self.elevation(b).total_cmp(&self.elevation(a)));
        sorted
    }

    fn elevation(&self, node: NodeId) -> f32 {
        self.tree
            .node(node)
            .map(|node| node.get_elevation())
            .unwrap_or_default()
    }
}
