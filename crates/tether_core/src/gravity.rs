//! Gravity flags and layout direction
//!
//! Gravity describes where a box sits inside (or against) a reference area on
//! each axis independently. Relative values (`Start`/`End`) are resolved to
//! absolute edges using the container's [`LayoutDirection`].
//!
//! ```rust
//! use tether_core::{Gravity, LayoutDirection, Rect};
//!
//! let area = Rect::new(0.0, 0.0, 200.0, 100.0);
//! let placed = Gravity::CENTER.apply(50.0, 20.0, area, LayoutDirection::Ltr);
//! assert_eq!(placed, Rect::new(75.0, 40.0, 50.0, 20.0));
//! ```

use std::ops::BitOr;

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Horizontal layout direction of a container
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutDirection {
    /// Left to right
    #[default]
    Ltr,
    /// Right to left; `Start`/`End` and keylines are mirrored
    Rtl,
}

/// Horizontal component of a gravity value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalGravity {
    Left,
    Right,
    /// Left in LTR, right in RTL
    Start,
    /// Right in LTR, left in RTL
    End,
    Center,
}

/// Vertical component of a gravity value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalGravity {
    Top,
    Bottom,
    Center,
}

/// Horizontal gravity after `Start`/`End` have been resolved
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AbsoluteHorizontal {
    Left,
    Right,
    Center,
}

/// Per-axis gravity; `None` on an axis means "unspecified"
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Gravity {
    pub horizontal: Option<HorizontalGravity>,
    pub vertical: Option<VerticalGravity>,
}

impl Gravity {
    pub const NONE: Gravity = Gravity::new(None, None);
    pub const LEFT: Gravity = Gravity::new(Some(HorizontalGravity::Left), None);
    pub const RIGHT: Gravity = Gravity::new(Some(HorizontalGravity::Right), None);
    pub const START: Gravity = Gravity::new(Some(HorizontalGravity::Start), None);
    pub const END: Gravity = Gravity::new(Some(HorizontalGravity::End), None);
    pub const CENTER_HORIZONTAL: Gravity = Gravity::new(Some(HorizontalGravity::Center), None);
    pub const TOP: Gravity = Gravity::new(None, Some(VerticalGravity::Top));
    pub const BOTTOM: Gravity = Gravity::new(None, Some(VerticalGravity::Bottom));
    pub const CENTER_VERTICAL: Gravity = Gravity::new(None, Some(VerticalGravity::Center));
    pub const CENTER: Gravity = Gravity::new(
        Some(HorizontalGravity::Center),
        Some(VerticalGravity::Center),
    );

    pub const fn new(
        horizontal: Option<HorizontalGravity>,
        vertical: Option<VerticalGravity>,
    ) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// True when neither axis is specified
    pub fn is_none(&self) -> bool {
        self.horizontal.is_none() && self.vertical.is_none()
    }

    /// Substitute `fallback` when this gravity is entirely unspecified
    ///
    /// A gravity with only one axis set is kept as is; the missing axis falls
    /// back to left/top during placement.
    pub fn or(self, fallback: Gravity) -> Gravity {
        if self.is_none() {
            fallback
        } else {
            self
        }
    }

    /// Resolve the horizontal component for a layout direction
    pub fn absolute_horizontal(&self, direction: LayoutDirection) -> AbsoluteHorizontal {
        match (self.horizontal, direction) {
            (Some(HorizontalGravity::Center), _) => AbsoluteHorizontal::Center,
            (Some(HorizontalGravity::Right), _)
            | (Some(HorizontalGravity::End), LayoutDirection::Ltr)
            | (Some(HorizontalGravity::Start), LayoutDirection::Rtl) => AbsoluteHorizontal::Right,
            _ => AbsoluteHorizontal::Left,
        }
    }

    /// Vertical component, defaulting to top
    pub fn vertical_or_top(&self) -> VerticalGravity {
        self.vertical.unwrap_or(VerticalGravity::Top)
    }

    /// Place a `width` x `height` box inside `container`
    pub fn apply(
        &self,
        width: f32,
        height: f32,
        container: Rect,
        direction: LayoutDirection,
    ) -> Rect {
        let left = match self.absolute_horizontal(direction) {
            AbsoluteHorizontal::Left => container.left(),
            AbsoluteHorizontal::Right => container.right() - width,
            AbsoluteHorizontal::Center => container.left() + (container.width() - width) / 2.0,
        };
        let top = match self.vertical_or_top() {
            VerticalGravity::Top => container.top(),
            VerticalGravity::Bottom => container.bottom() - height,
            VerticalGravity::Center => container.top() + (container.height() - height) / 2.0,
        };
        Rect::new(left, top, width, height)
    }
}

impl BitOr for Gravity {
    type Output = Gravity;

    /// Combine two gravities; axes set on the right-hand side win
    fn bitor(self, rhs: Gravity) -> Gravity {
        Gravity {
            horizontal: rhs.horizontal.or(self.horizontal),
            vertical: rhs.vertical.or(self.vertical),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_end_resolution() {
        assert_eq!(
            Gravity::START.absolute_horizontal(LayoutDirection::Ltr),
            AbsoluteHorizontal::Left
        );
        assert_eq!(
            Gravity::START.absolute_horizontal(LayoutDirection::Rtl),
            AbsoluteHorizontal::Right
        );
        assert_eq!(
            Gravity::END.absolute_horizontal(LayoutDirection::Rtl),
            AbsoluteHorizontal::Left
        );
        assert_eq!(
            Gravity::NONE.absolute_horizontal(LayoutDirection::Rtl),
            AbsoluteHorizontal::Left
        );
    }

    #[test]
    fn test_bitor_combines_axes() {
        let gravity = Gravity::BOTTOM | Gravity::END;
        assert_eq!(gravity.horizontal, Some(HorizontalGravity::End));
        assert_eq!(gravity.vertical, Some(VerticalGravity::Bottom));
    }

    #[test]
    fn test_or_only_replaces_unspecified() {
        assert_eq!(Gravity::NONE.or(Gravity::CENTER), Gravity::CENTER);
        assert_eq!(Gravity::TOP.or(Gravity::CENTER), Gravity::TOP);
    }

    #[test]
    fn test_apply_bottom_end() {
        let area = Rect::new(10.0, 10.0, 100.0, 100.0);
        let placed = (Gravity::BOTTOM | Gravity::END).apply(20.0, 30.0, area, LayoutDirection::Ltr);
        assert_eq!(placed, Rect::new(90.0, 80.0, 20.0, 30.0));

        let mirrored =
            (Gravity::BOTTOM | Gravity::END).apply(20.0, 30.0, area, LayoutDirection::Rtl);
        assert_eq!(mirrored, Rect::new(10.0, 80.0, 20.0, 30.0));
    }
}
