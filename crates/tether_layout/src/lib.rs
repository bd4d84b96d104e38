//! Tether Coordination Engine
//!
//! A container that lays out its children through pluggable behaviors instead
//! of one fixed algorithm. Children may depend on each other, either through an
//! explicit anchor or through rules their behaviors declare, and the engine
//! keeps everything consistent:
//!
//! - **Ordering**: children are measured and placed after everything they depend on
//! - **Anchors**: a child can sit against any descendant of the container
//! - **Touch routing**: one behavior owns each gesture stream; behaviors can block
//!   interaction with the children below them
//! - **Reconciliation**: dependents follow when a dependency moves between layouts
//!
//! # Example
//!
//! ```rust
//! use tether_layout::prelude::*;
//!
//! let mut coordinator = Coordinator::default();
//! let bar = coordinator.add_child(
//!     Node::new().view_id(ViewId(1)).content_size(360.0, 56.0),
//!     LayoutParams::new().gravity(Gravity::BOTTOM),
//! );
//! let fab = coordinator.add_child(
//!     Node::new().content_size(56.0, 56.0),
//!     LayoutParams::new()
//!         .anchor(ViewId(1))
//!         .anchor_gravity(Gravity::TOP | Gravity::END)
//!         .gravity(Gravity::TOP | Gravity::LEFT),
//! );
//!
//! coordinator
//!     .compute_layout(MeasureSpec::Exactly(360.0), MeasureSpec::Exactly(640.0))
//!     .unwrap();
//!
//! assert_eq!(coordinator.dependency_sorted_children(), &[bar, fab]);
//! assert_eq!(coordinator.tree().frame(fab), Rect::new(304.0, 584.0, 56.0, 56.0));
//! ```

pub mod anchor;
pub mod behavior;
pub mod config;
pub mod coordinator;
pub mod dependency;
pub mod error;
pub mod layout;
pub mod params;
pub mod reconcile;
pub mod scrim;
pub mod touch;
pub mod tree;


// Core types
pub use behavior::{Behavior, BehaviorFactory, BehaviorRegistry, BUILTIN_NAMESPACE};
pub use config::CoordinatorConfig;
pub use coordinator::Coordinator;
pub use error::{CoordinatorError, Result};
pub use params::{ChildRecord, LayoutParams, ResolvedAnchor};
pub use reconcile::ReconcileReport;
pub use scrim::ScrimCanvas;
pub use touch::TouchState;
pub use tree::{Node, NodeId, NodeTree, ViewId, Visibility};

/// Prelude module - import everything commonly needed
pub mod prelude {
    pub use crate::behavior::{Behavior, BehaviorRegistry};
    pub use crate::config::CoordinatorConfig;
    pub use crate::coordinator::Coordinator;
    pub use crate::error::CoordinatorError;
    pub use crate::params::LayoutParams;
    pub use crate::reconcile::ReconcileReport;
    pub use crate::scrim::ScrimCanvas;
    pub use crate::touch::TouchState;
    pub use crate::tree::{Node, NodeId, ViewId, Visibility};

    // Re-export core types
    pub use tether_core::{
        Color, Dimension, Gravity, Insets, LayoutDirection, MeasureSpec, MotionEvent, Point,
        Rect, Size,
    };
}
