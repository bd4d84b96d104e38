//! Tether Core Types
//!
//! Leaf types shared by the Tether coordination engine and the hosts that
//! drive it:
//!
//! - **Geometry**: points, sizes, rects, insets and colors
//! - **Gravity**: per-axis alignment with start/end resolution
//! - **Measure specs**: typed size requirements passed from parent to child
//! - **Input**: pointer motion events forming gesture streams
//!
//! # Example
//!
//! ```rust
//! use tether_core::{Dimension, MeasureSpec};
//!
//! let parent = MeasureSpec::Exactly(200.0);
//! let child = parent.child_spec(16.0, Dimension::MatchParent);
//! assert_eq!(child, MeasureSpec::Exactly(184.0));
//! ```

pub mod geometry;
pub mod gravity;
pub mod input;
pub mod measure;

pub use geometry::{Color, Insets, Point, Rect, Size};
pub use gravity::{
    AbsoluteHorizontal, Gravity, HorizontalGravity, LayoutDirection, VerticalGravity,
};
pub use input::{MotionAction, MotionEvent};
pub use measure::{Dimension, MeasureSpec};
