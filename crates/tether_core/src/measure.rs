//! Typed measurement constraints
//!
//! A [`MeasureSpec`] is the size requirement a parent passes down for one axis.
//! A [`Dimension`] is what a child asks for on that axis. Combining the two
//! yields the child's own spec, and resolving a spec against a desired extent
//! yields the measured size.

use serde::{Deserialize, Serialize};

/// Size requirement for one axis
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MeasureSpec {
    /// The extent must be exactly this value
    Exactly(f32),
    /// The extent may be anything up to this value
    AtMost(f32),
    /// No constraint
    Unspecified,
}

impl MeasureSpec {
    /// The constraint value, or 0 when unspecified
    pub fn size(&self) -> f32 {
        match self {
            MeasureSpec::Exactly(size) | MeasureSpec::AtMost(size) => *size,
            MeasureSpec::Unspecified => 0.0,
        }
    }

    pub fn is_unspecified(&self) -> bool {
        matches!(self, MeasureSpec::Unspecified)
    }

    /// Reconcile a desired extent with this constraint
    pub fn resolve(&self, desired: f32) -> f32 {
        match *self {
            MeasureSpec::Exactly(size) => size,
            MeasureSpec::AtMost(size) => desired.min(size),
            MeasureSpec::Unspecified => desired,
        }
    }

    /// Derive the spec for a child on this axis
    ///
    /// `used` is the space already taken on this axis (padding, margins, and
    /// anything the parent reserved) and is subtracted from the available extent.
    pub fn child_spec(&self, used: f32, dimension: Dimension) -> MeasureSpec {
        let available = (self.size() - used).max(0.0);

        match (*self, dimension) {
            (_, Dimension::Fixed(size)) => MeasureSpec::Exactly(size.max(0.0)),
            (MeasureSpec::Exactly(_), Dimension::MatchParent) => MeasureSpec::Exactly(available),
            (MeasureSpec::Exactly(_), Dimension::WrapContent)
            | (MeasureSpec::AtMost(_), Dimension::MatchParent)
            | (MeasureSpec::AtMost(_), Dimension::WrapContent) => MeasureSpec::AtMost(available),
            (MeasureSpec::Unspecified, _) => MeasureSpec::Unspecified,
        }
    }
}

/// Requested extent of a child on one axis
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// A fixed extent in logical pixels
    Fixed(f32),
    /// Fill the parent's available extent
    MatchParent,
    /// Size to the child's own content
    #[default]
    WrapContent,
}
