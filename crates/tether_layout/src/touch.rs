//! Touch routing between behaviors
//!
//! Bridges a host's pointer stream to the behaviors of the container's
//! children. At most one behavior owns a gesture stream; the others are offered
//! events in z-order until someone claims the stream or a behavior blocks
//! interaction below itself.
//!
//! # Architecture
//!
//! ```text
//! Host pointer stream (Down, Move..., Up/Cancel)
//!     ↓
//! on_intercept_touch_event / on_touch_event
//!     ↓
//! Interception walk (topmost child first)
//!     ↓
//! Owner's Behavior::on_touch_event
//! ```
//!
//! The host calls [`Coordinator::on_intercept_touch_event`] for each event
//! until it returns `true`, then routes the rest of the stream to
//! [`Coordinator::on_touch_event`].

use tether_core::MotionEvent;
use tracing::{debug, trace};

use crate::coordinator::Coordinator;
use crate::tree::NodeId;

/// Ownership of the current gesture stream
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TouchState {
    /// No behavior owns the stream
    #[default]
    Idle,
    /// The behavior of this child claimed the stream
    Intercepted(NodeId),
}

impl TouchState {
    pub fn owner(&self) -> Option<NodeId> {
        match self {
            TouchState::Idle => None,
            TouchState::Intercepted(owner) => Some(*owner),
        }
    }
}

impl Coordinator {
    pub fn touch_state(&self) -> TouchState {
        self.touch
    }

    /// Offer an event to the behaviors; `true` means the container takes the stream
    ///
    /// A closing `Up` or `Cancel` always leaves the router idle, even when a
    /// behavior claims it.
    pub fn on_intercept_touch_event(&mut self, event: &MotionEvent) -> bool {
        if event.starts_stream() {
            self.reset_touch_behaviors(true);
        }

        let intercepted = match self.touch {
            TouchState::Intercepted(_) => true,
            TouchState::Idle => self.perform_intercept(event),
        };

        if event.ends_stream() {
            self.reset_touch_behaviors(false);
        }
        intercepted
    }

    /// Deliver an event of a stream the container has taken
    ///
    /// Returns whether the owning behavior handled it.
    pub fn on_touch_event(&mut self, event: &MotionEvent) -> bool {
        let owner = match self.touch {
            TouchState::Intercepted(owner) => Some(owner),
            TouchState::Idle => {
                if self.perform_intercept(event) {
                    self.touch.owner()
                } else {
                    None
                }
            }
        };

        let handled = owner
            .and_then(|owner| {
                self.with_behavior(owner, |behavior, parent| {
                    behavior.on_touch_event(parent, owner, event)
                })
            })
            .unwrap_or(false);

        if event.ends_stream() {
            self.reset_touch_behaviors(false);
        }
        handled
    }

    /// A descendant asked the container to stop intercepting
    ///
    /// Any current owner loses the stream and receives a cancel.
    pub fn request_disallow_intercept(&mut self, disallow: bool) {
        if disallow {
            self.reset_touch_behaviors(true);
        }
    }

    /// Drop stream ownership and clear per-child touch tracking
    ///
    /// With `notify_owner`, the previous owner receives a synthesized cancel
    /// through [`Behavior::on_touch_event`](crate::behavior::Behavior::on_touch_event).
    pub fn reset_touch_behaviors(&mut self, notify_owner: bool) {
        let previous = std::mem::take(&mut self.touch);

        if let (true, TouchState::Intercepted(owner)) = (notify_owner, previous) {
            debug!(owner = ?owner, "stream owner cancelled");
            let cancel = MotionEvent::cancel();
            self.with_behavior(owner, |behavior, parent| {
                behavior.on_touch_event(parent, owner, &cancel)
            });
        }

        for record in self.records.values_mut() {
            record.reset_touch_tracking();
        }
    }

    fn perform_intercept(&mut self, event: &MotionEvent) -> bool {
        let order = self.top_sorted_children();

        for (index, &child) in order.iter().enumerate() {
            let mut claimed = false;

            if let Some(record) = self.records.get_mut(child) {
                if record.has_behavior() {
                    record.touch_offered = true;
                    claimed = self
                        .with_behavior(child, |behavior, parent| {
                            behavior.on_intercept_touch_event(parent, child, event)
                        })
                        .unwrap_or(false);
                }
            }

            if claimed {
                debug!(
                    owner = ?child,
                    pointer = event.id(),
                    action = ?event.action(),
                    "stream intercepted"
                );
                self.touch = TouchState::Intercepted(child);
            }

            let was_blocking = self
                .records
                .get(child)
                .is_some_and(|record| record.did_block_interaction);
            let is_blocking = self.is_blocking_interaction_below(child);

            if claimed || (is_blocking && !was_blocking) {
                self.cancel_touch_below(&order[index + 1..]);
                return claimed;
            }
            if is_blocking {
                trace!(blocker = ?child, "interaction below blocked");
                return false;
            }
        }
        false
    }

    /// Whether a child blocks interaction below it; sticky for the stream
    pub(crate) fn is_blocking_interaction_below(&mut self, child: NodeId) -> bool {
        let Some(record) = self.records.get(child) else {
            return false;
        };
        if record.did_block_interaction {
            return true;
        }

        let blocks = record
            .behavior()
            .is_some_and(|behavior| behavior.blocks_interaction_below(self, child));
        if blocks {
            if let Some(record) = self.records.get_mut(child) {
                record.did_block_interaction = true;
            }
        }
        blocks
    }

    /// Send one cancel to each child that was offered this stream and not yet cancelled
    fn cancel_touch_below(&mut self, below: &[NodeId]) {
        for &child in below {
            let Some(record) = self.records.get_mut(child) else {
                continue;
            };
            if !record.touch_offered || record.touch_cancelled || !record.has_behavior() {
                continue;
            }
            record.touch_cancelled = true;

            trace!(child = ?child, "cancelled below interceptor");
            let cancel = MotionEvent::cancel();
            self.with_behavior(child, |behavior, parent| {
                behavior.on_intercept_touch_event(parent, child, &cancel)
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::Behavior;
    use crate::params::LayoutParams;
    use crate::tree::Node;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tether_core::{Gravity, MeasureSpec, MotionAction};

    type Log = Rc<RefCell<Vec<(&'static str, &'static str, MotionAction)>>>;

    /// Records every hook call; claims the stream on the given event index
    struct Tracker {
        name: &'static str,
        log: Log,
        claim_on: Option<usize>,
        seen: usize,
    }

    impl Tracker {
        fn new(name: &'static str, log: &Log, claim_on: Option<usize>) -> Box<Self> {
            Box::new(Self {
                name,
                log: Rc::clone(log),
                claim_on,
                seen: 0,
            })
        }
    }

    impl Behavior for Tracker {
        fn on_intercept_touch_event(
            &mut self,
            _parent: &mut Coordinator,
            _child: NodeId,
            event: &MotionEvent,
        ) -> bool {
            self.log
                .borrow_mut()
                .push((self.name, "intercept", event.action()));
            self.seen += 1;
            self.claim_on == Some(self.seen)
        }

        fn on_touch_event(
            &mut self,
            _parent: &mut Coordinator,
            _child: NodeId,
            event: &MotionEvent,
        ) -> bool {
            self.log.borrow_mut().push((self.name, "touch", event.action()));
            true
        }
    }

    fn down() -> MotionEvent {
        MotionEvent::Down { id: 1, x: 10.0, y: 10.0 }
    }

    fn moved() -> MotionEvent {
        MotionEvent::Move { id: 1, x: 12.0, y: 14.0 }
    }

    fn up() -> MotionEvent {
        MotionEvent::Up { id: 1, x: 12.0, y: 14.0 }
    }

    #[test]
    fn test_owner_receives_remaining_stream() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut coordinator = Coordinator::default();
        let bottom = coordinator.add_child(Node::new(), LayoutParams::new());
        let top = coordinator.add_child(Node::new(), LayoutParams::new());
        coordinator.set_behavior(bottom, Some(Tracker::new("bottom", &log, None))).unwrap();
        coordinator.set_behavior(top, Some(Tracker::new("top", &log, Some(2)))).unwrap();

        assert!(!coordinator.on_intercept_touch_event(&down()));
        assert!(coordinator.on_intercept_touch_event(&moved()));
        assert_eq!(coordinator.touch_state(), TouchState::Intercepted(top));

        assert!(coordinator.on_touch_event(&moved()));
        assert!(coordinator.on_touch_event(&up()));
        assert_eq!(coordinator.touch_state(), TouchState::Idle);

        let log = log.borrow();
        assert_eq!(
            log.as_slice(),
            &[
                ("top", "intercept", MotionAction::Down),
                ("bottom", "intercept", MotionAction::Down),
                ("top", "intercept", MotionAction::Move),
                ("bottom", "intercept", MotionAction::Cancel),
                ("top", "touch", MotionAction::Move),
                ("top", "touch", MotionAction::Up),
            ]
        );
    }

    #[test]
    fn test_veto_cancels_owner() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut coordinator = Coordinator::default();
        let child = coordinator.add_child(Node::new(), LayoutParams::new());
        coordinator.set_behavior(child, Some(Tracker::new("sheet", &log, Some(1)))).unwrap();

        assert!(coordinator.on_intercept_touch_event(&down()));
        coordinator.request_disallow_intercept(true);

        assert_eq!(coordinator.touch_state(), TouchState::Idle);
        assert_eq!(
            log.borrow().last(),
            Some(&("sheet", "touch", MotionAction::Cancel))
        );
    }

    #[test]
    fn test_new_down_cancels_stale_owner() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut coordinator = Coordinator::default();
        let child = coordinator.add_child(Node::new(), LayoutParams::new());
        coordinator.set_behavior(child, Some(Tracker::new("sheet", &log, Some(1)))).unwrap();

        assert!(coordinator.on_intercept_touch_event(&down()));
        log.borrow_mut().clear();

        coordinator.on_intercept_touch_event(&down());
        assert_eq!(
            log.borrow().first(),
            Some(&("sheet", "touch", MotionAction::Cancel))
        );
    }

    #[test]
    fn test_closing_owned_stream_does_not_double_cancel() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut coordinator = Coordinator::default();
        let child = coordinator.add_child(Node::new(), LayoutParams::new());
        coordinator.set_behavior(child, Some(Tracker::new("sheet", &log, Some(1)))).unwrap();

        coordinator.on_intercept_touch_event(&down());
        coordinator.on_touch_event(&MotionEvent::Cancel { id: 1 });

        let cancels = log
            .borrow()
            .iter()
            .filter(|(_, _, action)| *action == MotionAction::Cancel)
            .count();
        assert_eq!(cancels, 1);
    }

    #[test]
    fn test_children_without_behavior_are_skipped() {
        let mut coordinator = Coordinator::default();
        coordinator.add_child(Node::new(), LayoutParams::new());

        assert!(!coordinator.on_intercept_touch_event(&down()));
        assert!(!coordinator.on_touch_event(&up()));
        assert_eq!(coordinator.touch_state(), TouchState::Idle);
    }

    #[test]
    fn test_on_touch_event_claims_from_idle() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut coordinator = Coordinator::default();
        let child = coordinator.add_child(Node::new(), LayoutParams::new());
        coordinator.set_behavior(child, Some(Tracker::new("sheet", &log, Some(1)))).unwrap();

        assert!(coordinator.on_touch_event(&down()));
        assert_eq!(coordinator.touch_state(), TouchState::Intercepted(child));
        assert!(coordinator.on_touch_event(&up()));
        assert_eq!(coordinator.touch_state(), TouchState::Idle);

        assert_eq!(
            log.borrow().as_slice(),
            &[
                ("sheet", "intercept", MotionAction::Down),
                ("sheet", "touch", MotionAction::Down),
                ("sheet", "touch", MotionAction::Up),
            ]
        );
    }

    #[test]
    fn test_claim_on_up_leaves_router_idle() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut coordinator = Coordinator::default();
        let child = coordinator.add_child(Node::new(), LayoutParams::new());
        coordinator.set_behavior(child, Some(Tracker::new("sheet", &log, Some(3)))).unwrap();

        assert!(!coordinator.on_intercept_touch_event(&down()));
        assert!(!coordinator.on_intercept_touch_event(&moved()));
        assert!(coordinator.on_intercept_touch_event(&up()));
        assert_eq!(coordinator.touch_state(), TouchState::Idle);

        // The next stream must not cancel an owner left over from the last one
        log.borrow_mut().clear();
        coordinator.on_intercept_touch_event(&down());
        assert_eq!(
            log.borrow().as_slice(),
            &[("sheet", "intercept", MotionAction::Down)]
        );
    }

    #[test]
    fn test_closing_events_offered_to_intercept_while_owned() {
        for closing in [up(), MotionEvent::Cancel { id: 1 }] {
            let log: Log = Rc::new(RefCell::new(Vec::new()));
            let mut coordinator = Coordinator::default();
            let child = coordinator.add_child(Node::new(), LayoutParams::new());
            coordinator.set_behavior(child, Some(Tracker::new("sheet", &log, Some(1)))).unwrap();

            assert!(coordinator.on_intercept_touch_event(&down()));
            assert!(coordinator.on_intercept_touch_event(&closing));
            assert_eq!(coordinator.touch_state(), TouchState::Idle);

            coordinator.on_intercept_touch_event(&down());
            let owner_cancels = log
                .borrow()
                .iter()
                .filter(|entry| **entry == ("sheet", "touch", MotionAction::Cancel))
                .count();
            assert_eq!(owner_cancels, 0);
        }
    }

    /// Claims streams that start inside its child
    struct HitTarget;

    impl Behavior for HitTarget {
        fn on_intercept_touch_event(
            &mut self,
            parent: &mut Coordinator,
            child: NodeId,
            event: &MotionEvent,
        ) -> bool {
            event.starts_stream()
                && event
                    .position()
                    .is_some_and(|(x, y)| parent.is_point_in_child_bounds(child, x, y))
        }
    }

    #[test]
    fn test_claim_by_hit_position() {
        let mut coordinator = Coordinator::default();
        let child = coordinator.add_child(
            Node::new().content_size(50.0, 50.0),
            LayoutParams::new().gravity(Gravity::BOTTOM | Gravity::RIGHT),
        );
        coordinator.set_behavior(child, Some(Box::new(HitTarget))).unwrap();
        coordinator
            .compute_layout(MeasureSpec::Exactly(100.0), MeasureSpec::Exactly(100.0))
            .unwrap();

        assert!(!coordinator.on_intercept_touch_event(&down()));
        coordinator.on_intercept_touch_event(&MotionEvent::Cancel { id: 1 });

        let inside = MotionEvent::Down { id: 2, x: 75.0, y: 80.0 };
        assert!(coordinator.on_intercept_touch_event(&inside));
        assert_eq!(coordinator.touch_state(), TouchState::Intercepted(child));
    }
}
