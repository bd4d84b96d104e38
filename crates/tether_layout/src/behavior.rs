//! Pluggable child behaviors
//!
//! A [`Behavior`] is attached to a direct child of a [`Coordinator`] and can
//! intercept touch streams, override measurement and positioning, declare
//! dependencies on siblings, and dim everything below its child with a scrim.
//! Every hook has a no-op default, so a behavior only implements what it uses.
//!
//! Behaviors referenced by name (from configuration) are constructed through a
//! [`BehaviorRegistry`], which also maps node kinds to default behaviors.
//!
//! # Example
//!
//! ```rust
//! use tether_layout::prelude::*;
//!
//! /// Keeps its child pinned below whatever it depends on
//! struct FollowBehavior {
//!     target: ViewId,
//! }
//!
//! impl Behavior for FollowBehavior {
//!     fn layout_depends_on(
//!         &self,
//!         parent: &Coordinator,
//!         _child: NodeId,
//!         dependency: NodeId,
//!     ) -> bool {
//!         parent.tree().node(dependency).and_then(|n| n.get_view_id()) == Some(self.target)
//!     }
//!
//!     fn on_dependent_view_changed(
//!         &mut self,
//!         parent: &mut Coordinator,
//!         child: NodeId,
//!         dependency: NodeId,
//!     ) -> bool {
//!         let below = parent.tree().frame(dependency).bottom();
//!         let top = parent.tree().frame(child).top();
//!         parent.offset_child(child, 0.0, below - top);
//!         true
//!     }
//! }
//!
//! let mut registry = BehaviorRegistry::new();
//! registry.register("Follow", || Ok(Box::new(FollowBehavior { target: ViewId(1) })));
//! assert!(registry.create("Follow").is_ok());
//! ```

use rustc_hash::FxHashMap;
use tether_core::{Color, LayoutDirection, MeasureSpec, MotionEvent};

use crate::coordinator::Coordinator;
use crate::error::{CoordinatorError, Result};
use crate::tree::NodeId;

/// Namespace that bare behavior names resolve into
pub const BUILTIN_NAMESPACE: &str = "tether.behavior";

/// Interaction and layout strategy for one child
///
/// Hooks that take `&mut Coordinator` run while the behavior is detached from
/// its child record; they may freely call back into the coordinator.
pub trait Behavior {
    /// Offered each event of a gesture stream until some behavior claims it
    ///
    /// Returning `true` makes this behavior the owner of the stream; later
    /// events go to [`on_touch_event`](Behavior::on_touch_event). A synthesized
    /// [`MotionEvent::Cancel`] arrives here when a behavior above takes over or
    /// starts blocking.
    fn on_intercept_touch_event(
        &mut self,
        _parent: &mut Coordinator,
        _child: NodeId,
        _event: &MotionEvent,
    ) -> bool {
        false
    }

    /// Receives the events of a stream this behavior owns
    fn on_touch_event(
        &mut self,
        _parent: &mut Coordinator,
        _child: NodeId,
        _event: &MotionEvent,
    ) -> bool {
        false
    }

    /// Color of the scrim drawn below this child
    fn scrim_color(&self, _parent: &Coordinator, _child: NodeId) -> Color {
        Color::BLACK
    }

    /// Opacity of the scrim drawn below this child; 0 draws nothing
    fn scrim_opacity(&self, _parent: &Coordinator, _child: NodeId) -> f32 {
        0.0
    }

    /// Whether nodes below this child may interact with the current stream
    fn blocks_interaction_below(&self, parent: &Coordinator, child: NodeId) -> bool {
        self.scrim_opacity(parent, child) > 0.0
    }

    /// Whether `child` must be laid out after `dependency`
    fn layout_depends_on(
        &self,
        _parent: &Coordinator,
        _child: NodeId,
        _dependency: NodeId,
    ) -> bool {
        false
    }

    /// Called by the reconciliation pass when `dependency` moved or resized
    ///
    /// Returns whether the child's position or size changed.
    fn on_dependent_view_changed(
        &mut self,
        _parent: &mut Coordinator,
        _child: NodeId,
        _dependency: NodeId,
    ) -> bool {
        false
    }

    /// Whether this behavior's dependency set may have changed since the last sort
    fn is_dirty(&self, _parent: &Coordinator, _child: NodeId) -> bool {
        false
    }

    /// Measure the child; return `false` to use default measurement
    ///
    /// A behavior may delegate to [`Coordinator::on_measure_child`] and adjust
    /// the result.
    fn on_measure_child(
        &mut self,
        _parent: &mut Coordinator,
        _child: NodeId,
        _width_spec: MeasureSpec,
        _width_used: f32,
        _height_spec: MeasureSpec,
        _height_used: f32,
    ) -> bool {
        false
    }

    /// Position the child; return `Ok(false)` to use default placement
    ///
    /// A behavior may delegate to [`Coordinator::on_layout_child`] and offset
    /// the result.
    fn on_layout_child(
        &mut self,
        _parent: &mut Coordinator,
        _child: NodeId,
        _direction: LayoutDirection,
    ) -> Result<bool> {
        Ok(false)
    }
}

/// Constructs a behavior; the error string explains why construction failed
pub type BehaviorFactory = Box<dyn Fn() -> std::result::Result<Box<dyn Behavior>, String>>;

/// Maps behavior names to factories and node kinds to default behaviors
///
/// Names are qualified before lookup:
///
/// - `.Name` is relative to the application namespace
/// - `some.pkg.Name` is already fully qualified
/// - `Name` lives in [`BUILTIN_NAMESPACE`]
#[derive(Default)]
pub struct BehaviorRegistry {
    app_namespace: Option<String>,
    factories: FxHashMap<String, BehaviorFactory>,
    defaults: FxHashMap<String, String>,
}

impl BehaviorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the namespace that `.Name` references resolve against
    pub fn with_app_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.app_namespace = Some(namespace.into());
        self
    }

    /// Register a factory under a (qualified) name
    pub fn register<F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        F: Fn() -> std::result::Result<Box<dyn Behavior>, String> + 'static,
    {
        if let Some(qualified) = self.qualify(name) {
            self.factories.insert(qualified, Box::new(factory));
        }
        self
    }

    /// Declare the behavior used by nodes of `kind` when none is set explicitly
    pub fn register_default(&mut self, kind: &str, behavior: &str) -> &mut Self {
        self.defaults.insert(kind.to_string(), behavior.to_string());
        self
    }

    /// Fully qualify a behavior name; `None` for an empty name
    pub fn qualify(&self, name: &str) -> Option<String> {
        if name.is_empty() {
            return None;
        }
        let qualified = if name.starts_with('.') {
            format!("{}{}", self.app_namespace.as_deref().unwrap_or_default(), name)
        } else if name.contains('.') {
            name.to_string()
        } else {
            format!("{BUILTIN_NAMESPACE}.{name}")
        };
        Some(qualified)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.qualify(name)
            .is_some_and(|qualified| self.factories.contains_key(&qualified))
    }

    /// Construct the behavior registered under `name`
    pub fn create(&self, name: &str) -> Result<Box<dyn Behavior>> {
        let Some(qualified) = self.qualify(name) else {
            return Err(CoordinatorError::BehaviorInstantiation {
                name: name.to_string(),
                reason: "empty behavior name".to_string(),
            });
        };

        let factory = self.factories.get(&qualified).ok_or_else(|| {
            CoordinatorError::BehaviorInstantiation {
                name: qualified.clone(),
                reason: "no factory registered".to_string(),
            }
        })?;

        factory().map_err(|reason| CoordinatorError::BehaviorInstantiation {
            name: qualified,
            reason,
        })
    }

    /// Construct the default behavior for a node kind, if the kind declares one
    pub fn create_default(&self, kind: &str) -> Option<Result<Box<dyn Behavior>>> {
        self.defaults.get(kind).map(|name| self.create(name))
    }
}
