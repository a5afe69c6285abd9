//! Anchored placement for auxiliary windows.
//!
//! Given a requested size and a positioner (anchor rectangle, anchor point,
//! gravity, offset, constraint-adjustment flags), computes the screen-space
//! rectangle of the new window, falling back through flip, slide and resize
//! adjustments in that fixed order when the naive placement does not fit the
//! output work area.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;

use crate::geometry::{Point, Rect, Size};

/// One of the nine reference points of a rectangle. Used both for the point
/// chosen on the anchor rectangle ("parent anchor") and, inverted in
/// meaning, for the point on the child aligned against it ("gravity").
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    #[default]
    Center,
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    BottomLeft,
    TopRight,
    BottomRight,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::Center,
        Anchor::Top,
        Anchor::Bottom,
        Anchor::Left,
        Anchor::Right,
        Anchor::TopLeft,
        Anchor::BottomLeft,
        Anchor::TopRight,
        Anchor::BottomRight,
    ];

    /// The point this anchor selects on `rect`.
    pub fn position_on(self, rect: Rect) -> Point {
        let Size { width, height } = rect.size;
        let offset = match self {
            Anchor::Center => Point::new(width / 2, height / 2),
            Anchor::Top => Point::new(width / 2, 0),
            Anchor::Bottom => Point::new(width / 2, height),
            Anchor::Left => Point::new(0, height / 2),
            Anchor::Right => Point::new(width, height / 2),
            Anchor::TopLeft => Point::new(0, 0),
            Anchor::BottomLeft => Point::new(0, height),
            Anchor::TopRight => Point::new(width, 0),
            Anchor::BottomRight => Point::new(width, height),
        };
        rect.top_left + offset
    }

    /// The vector from the gravity point of a child of `size` to its
    /// top-left corner.
    pub fn gravity_offset(self, size: Size) -> Point {
        let Size { width, height } = size;
        match self {
            Anchor::Center => Point::new(-width / 2, -height / 2),
            Anchor::Top => Point::new(-width / 2, 0),
            Anchor::Bottom => Point::new(-width / 2, -height),
            Anchor::Left => Point::new(0, -height / 2),
            Anchor::Right => Point::new(-width, -height / 2),
            Anchor::TopLeft => Point::new(0, 0),
            Anchor::BottomLeft => Point::new(0, -height),
            Anchor::TopRight => Point::new(-width, 0),
            Anchor::BottomRight => Point::new(-width, -height),
        }
    }

    /// Reflection across the vertical axis. `Center`, `Top` and `Bottom`
    /// map to themselves.
    pub fn flip_x(self) -> Anchor {
        match self {
            Anchor::Left => Anchor::Right,
            Anchor::Right => Anchor::Left,
            Anchor::TopLeft => Anchor::TopRight,
            Anchor::TopRight => Anchor::TopLeft,
            Anchor::BottomLeft => Anchor::BottomRight,
            Anchor::BottomRight => Anchor::BottomLeft,
            other => other,
        }
    }

    /// Reflection across the horizontal axis. `Center`, `Left` and `Right`
    /// map to themselves.
    pub fn flip_y(self) -> Anchor {
        match self {
            Anchor::Top => Anchor::Bottom,
            Anchor::Bottom => Anchor::Top,
            Anchor::TopLeft => Anchor::BottomLeft,
            Anchor::BottomLeft => Anchor::TopLeft,
            Anchor::TopRight => Anchor::BottomRight,
            Anchor::BottomRight => Anchor::TopRight,
            other => other,
        }
    }
}

bitflags! {
    /// Fallback strategies to apply when the naively placed window does not
    /// fit the output area. Within one axis only one category applies; flip
    /// takes precedence over slide, slide over resize.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ConstraintAdjustment: u32 {
        const SLIDE_X = 1 << 0;
        const SLIDE_Y = 1 << 1;
        const FLIP_X = 1 << 2;
        const FLIP_Y = 1 << 3;
        const RESIZE_X = 1 << 4;
        const RESIZE_Y = 1 << 5;

        const SLIDE_ANY = Self::SLIDE_X.bits() | Self::SLIDE_Y.bits();
        const FLIP_ANY = Self::FLIP_X.bits() | Self::FLIP_Y.bits();
        const RESIZE_ANY = Self::RESIZE_X.bits() | Self::RESIZE_Y.bits();
    }
}

// Bit assignments are part of the wire protocol.
const_assert_eq!(ConstraintAdjustment::SLIDE_X.bits(), 1);
const_assert_eq!(ConstraintAdjustment::FLIP_X.bits(), 4);
const_assert_eq!(ConstraintAdjustment::RESIZE_X.bits(), 16);

impl Serialize for ConstraintAdjustment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where S: serde::Serializer {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for ConstraintAdjustment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where D: serde::Deserializer<'de> {
        Ok(Self::from_bits_truncate(u32::deserialize(deserializer)?))
    }
}

/// How to position a child window relative to its anchor. When
/// `anchor_rect` is absent, callers substitute the owner's full frame
/// rectangle as the anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Positioner {
    pub anchor_rect: Option<Rect>,
    pub parent_anchor: Anchor,
    pub child_anchor: Anchor,
    pub offset: Point,
    pub constraint_adjustment: ConstraintAdjustment,
}

/// Computes the screen-space rectangle for a child of `child_size` anchored
/// to `anchor_rect`. The anchor point itself is clamped into
/// `reference_rect` before the child's gravity offset is applied;
/// `output_rect` is the usable area of the monitor nearest the anchor.
///
/// All rectangles are in the same physical-pixel space. This function is
/// total: when every configured adjustment is exhausted it returns the
/// unconstrained placement even though it overhangs `output_rect`.
pub fn place(
    positioner: &Positioner,
    child_size: Size,
    anchor_rect: Rect,
    reference_rect: Rect,
    output_rect: Rect,
) -> Rect {
    let adjustment = positioner.constraint_adjustment;

    let candidate = |parent_anchor: Anchor, child_anchor: Anchor, offset: Point| -> Rect {
        let anchor_point =
            reference_rect.clamp_point(parent_anchor.position_on(anchor_rect) + offset);
        Rect::new(anchor_point + child_anchor.gravity_offset(child_size), child_size)
    };

    let default_result =
        candidate(positioner.parent_anchor, positioner.child_anchor, positioner.offset);
    if output_rect.contains_rect(&default_result) {
        return default_result;
    }

    if adjustment.contains(ConstraintAdjustment::FLIP_X) {
        let result = candidate(
            positioner.parent_anchor.flip_x(),
            positioner.child_anchor.flip_x(),
            Point::new(-positioner.offset.x, positioner.offset.y),
        );
        if output_rect.contains_rect(&result) {
            return result;
        }
    }

    if adjustment.contains(ConstraintAdjustment::FLIP_Y) {
        let result = candidate(
            positioner.parent_anchor.flip_y(),
            positioner.child_anchor.flip_y(),
            Point::new(positioner.offset.x, -positioner.offset.y),
        );
        if output_rect.contains_rect(&result) {
            return result;
        }
    }

    if adjustment.contains(ConstraintAdjustment::FLIP_ANY) {
        let result = candidate(
            positioner.parent_anchor.flip_x().flip_y(),
            positioner.child_anchor.flip_x().flip_y(),
            Point::new(-positioner.offset.x, -positioner.offset.y),
        );
        if output_rect.contains_rect(&result) {
            return result;
        }
    }

    if adjustment.intersects(ConstraintAdjustment::SLIDE_ANY) {
        let mut result = default_result;

        if adjustment.contains(ConstraintAdjustment::SLIDE_X) {
            let left_overhang = result.top_left.x - output_rect.top_left.x;
            let right_overhang = result.right() - output_rect.right();
            if left_overhang < 0 {
                result.top_left.x -= left_overhang;
            } else if right_overhang > 0 {
                result.top_left.x -= right_overhang;
            }
        }

        if adjustment.contains(ConstraintAdjustment::SLIDE_Y) {
            let top_overhang = result.top_left.y - output_rect.top_left.y;
            let bottom_overhang = result.bottom() - output_rect.bottom();
            if top_overhang < 0 {
                result.top_left.y -= top_overhang;
            } else if bottom_overhang > 0 {
                result.top_left.y -= bottom_overhang;
            }
        }

        if output_rect.contains_rect(&result) {
            return result;
        }
    }

    if adjustment.intersects(ConstraintAdjustment::RESIZE_ANY) {
        let mut result = default_result;

        if adjustment.contains(ConstraintAdjustment::RESIZE_X) {
            let left_overhang = result.top_left.x - output_rect.top_left.x;
            let right_overhang = result.right() - output_rect.right();
            if left_overhang < 0 {
                result.top_left.x -= left_overhang;
                result.size.width += left_overhang;
            }
            if right_overhang > 0 {
                result.size.width -= right_overhang;
            }
        }

        if adjustment.contains(ConstraintAdjustment::RESIZE_Y) {
            let top_overhang = result.top_left.y - output_rect.top_left.y;
            let bottom_overhang = result.bottom() - output_rect.bottom();
            if top_overhang < 0 {
                result.top_left.y -= top_overhang;
                result.size.height += top_overhang;
            }
            if bottom_overhang > 0 {
                result.size.height -= bottom_overhang;
            }
        }

        if output_rect.contains_rect(&result) {
            return result;
        }
    }

    default_result
}
