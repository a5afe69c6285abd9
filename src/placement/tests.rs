use super::{Anchor, ConstraintAdjustment, Positioner, place};
use crate::geometry::{Point, Rect, Size};

fn output() -> Rect {
    Rect::from_xywh(0, 0, 1000, 1000)
}

fn positioner(parent: Anchor, child: Anchor) -> Positioner {
    Positioner { parent_anchor: parent, child_anchor: child, ..Default::default() }
}

mod anchoring {
    use super::*;

    #[test]
    fn naive_placement_returned_when_it_fits() {
        let pos = positioner(Anchor::TopRight, Anchor::TopLeft);
        let reference = Rect::from_xywh(0, 0, 400, 300);
        let anchor = Rect::from_xywh(350, 0, 50, 50);

        let result = place(&pos, Size::new(100, 40), anchor, reference, output());
        assert_eq!(result, Rect::from_xywh(400, 0, 100, 40));
    }

    #[test]
    fn center_on_center() {
        let pos = positioner(Anchor::Center, Anchor::Center);
        let anchor = Rect::from_xywh(450, 450, 100, 100);

        let result = place(&pos, Size::new(100, 50), anchor, output(), output());
        assert_eq!(result, Rect::from_xywh(450, 475, 100, 50));
    }

    #[test]
    fn anchor_point_clamped_to_reference() {
        // The anchor rectangle pokes out of the reference area; the chosen
        // anchor point is pulled back inside it.
        let pos = positioner(Anchor::BottomRight, Anchor::TopLeft);
        let reference = Rect::from_xywh(0, 0, 300, 300);
        let anchor = Rect::from_xywh(250, 250, 100, 100);

        let result = place(&pos, Size::new(50, 50), anchor, reference, output());
        assert_eq!(result, Rect::from_xywh(300, 300, 50, 50));
    }

    #[test]
    fn offset_translates_anchor_point() {
        let mut pos = positioner(Anchor::TopLeft, Anchor::TopLeft);
        pos.offset = Point::new(10, 20);
        let anchor = Rect::from_xywh(100, 100, 50, 50);

        let result = place(&pos, Size::new(40, 40), anchor, output(), output());
        assert_eq!(result, Rect::from_xywh(110, 120, 40, 40));
    }
}

mod flipping {
    use super::*;

    #[test]
    fn flip_x_reflects_around_anchor() {
        let screen = Rect::from_xywh(0, 0, 500, 500);
        let mut pos = positioner(Anchor::TopRight, Anchor::TopLeft);
        pos.constraint_adjustment = ConstraintAdjustment::FLIP_X;
        let anchor = Rect::from_xywh(450, 100, 40, 40);

        let result = place(&pos, Size::new(100, 50), anchor, screen, screen);
        assert_eq!(result, Rect::from_xywh(350, 100, 100, 50));
    }

    #[test]
    fn flip_takes_precedence_over_slide() {
        let screen = Rect::from_xywh(0, 0, 500, 500);
        let mut pos = positioner(Anchor::TopRight, Anchor::TopLeft);
        let anchor = Rect::from_xywh(450, 100, 40, 40);

        pos.constraint_adjustment = ConstraintAdjustment::SLIDE_X;
        let slid = place(&pos, Size::new(100, 50), anchor, screen, screen);
        assert_eq!(slid, Rect::from_xywh(400, 100, 100, 50));

        pos.constraint_adjustment = ConstraintAdjustment::FLIP_X | ConstraintAdjustment::SLIDE_X;
        let result = place(&pos, Size::new(100, 50), anchor, screen, screen);
        assert_eq!(result, Rect::from_xywh(350, 100, 100, 50));
        assert_ne!(result, slid);
    }

    #[test]
    fn flip_y_moves_tooltip_above_anchor() {
        let screen = Rect::from_xywh(0, 0, 500, 400);
        let mut pos = positioner(Anchor::Bottom, Anchor::Top);
        pos.constraint_adjustment = ConstraintAdjustment::FLIP_Y;
        let anchor = Rect::from_xywh(100, 350, 50, 20);

        let result = place(&pos, Size::new(80, 60), anchor, screen, screen);
        assert_eq!(result, Rect::from_xywh(85, 290, 80, 60));
    }

    #[test]
    fn flip_both_axes_when_neither_single_flip_fits() {
        let screen = Rect::from_xywh(0, 0, 500, 500);
        let mut pos = positioner(Anchor::BottomRight, Anchor::TopLeft);
        pos.constraint_adjustment = ConstraintAdjustment::FLIP_ANY;
        let anchor = Rect::from_xywh(450, 450, 40, 40);

        let result = place(&pos, Size::new(100, 100), anchor, screen, screen);
        assert_eq!(result, Rect::from_xywh(350, 350, 100, 100));
    }

    #[test]
    fn flip_negates_offset_on_the_flipped_axis() {
        let screen = Rect::from_xywh(0, 0, 500, 500);
        let mut pos = positioner(Anchor::TopRight, Anchor::TopLeft);
        pos.offset = Point::new(10, 0);
        pos.constraint_adjustment = ConstraintAdjustment::FLIP_X;
        let anchor = Rect::from_xywh(400, 100, 50, 50);

        let result = place(&pos, Size::new(100, 50), anchor, screen, screen);
        assert_eq!(result, Rect::from_xywh(290, 100, 100, 50));
    }
}

mod sliding {
    use super::*;

    #[test]
    fn slide_x_pulls_flush_against_right_edge() {
        let screen = Rect::from_xywh(0, 0, 420, 1000);
        let mut pos = positioner(Anchor::TopRight, Anchor::TopLeft);
        pos.constraint_adjustment = ConstraintAdjustment::SLIDE_X;
        let reference = Rect::from_xywh(0, 0, 400, 300);
        let anchor = Rect::from_xywh(350, 0, 50, 50);

        let result = place(&pos, Size::new(100, 40), anchor, reference, screen);
        assert_eq!(result, Rect::from_xywh(320, 0, 100, 40));
        assert_eq!(result.right(), screen.right());
    }

    #[test]
    fn slide_x_resolves_left_overhang_first() {
        let mut pos = positioner(Anchor::Left, Anchor::Right);
        pos.constraint_adjustment = ConstraintAdjustment::SLIDE_X;
        let anchor = Rect::from_xywh(0, 100, 20, 20);

        let result = place(&pos, Size::new(100, 50), anchor, output(), output());
        assert_eq!(result, Rect::from_xywh(0, 85, 100, 50));
    }

    #[test]
    fn slide_y_pulls_up_from_bottom_edge() {
        let screen = Rect::from_xywh(0, 0, 400, 400);
        let mut pos = positioner(Anchor::Bottom, Anchor::Top);
        pos.constraint_adjustment = ConstraintAdjustment::SLIDE_Y;
        let anchor = Rect::from_xywh(100, 380, 40, 10);

        let result = place(&pos, Size::new(100, 60), anchor, screen, screen);
        assert_eq!(result, Rect::from_xywh(70, 340, 100, 60));
    }

    #[test]
    fn slide_applies_on_both_axes() {
        let screen = Rect::from_xywh(0, 0, 300, 300);
        let mut pos = positioner(Anchor::BottomRight, Anchor::TopLeft);
        pos.constraint_adjustment = ConstraintAdjustment::SLIDE_ANY;
        let anchor = Rect::from_xywh(280, 280, 10, 10);

        let result = place(&pos, Size::new(50, 50), anchor, screen, screen);
        assert_eq!(result, Rect::from_xywh(250, 250, 50, 50));
    }
}

mod resizing {
    use super::*;

    #[test]
    fn resize_shrinks_from_overhanging_sides() {
        let screen = Rect::from_xywh(0, 0, 400, 400);
        let mut pos = positioner(Anchor::BottomRight, Anchor::TopLeft);
        pos.constraint_adjustment = ConstraintAdjustment::RESIZE_ANY;
        let anchor = Rect::from_xywh(380, 380, 10, 10);

        let result = place(&pos, Size::new(100, 100), anchor, screen, screen);
        assert_eq!(result, Rect::from_xywh(390, 390, 10, 10));
        assert!(result.size.width <= 100 && result.size.height <= 100);
    }

    #[test]
    fn resize_left_overhang_moves_origin_and_shrinks() {
        let mut pos = positioner(Anchor::Left, Anchor::Right);
        pos.constraint_adjustment = ConstraintAdjustment::RESIZE_X;
        let anchor = Rect::from_xywh(30, 100, 20, 20);

        let result = place(&pos, Size::new(100, 100), anchor, output(), output());
        assert_eq!(result, Rect::from_xywh(0, 60, 30, 100));
    }

    #[test]
    fn slide_takes_precedence_over_resize() {
        let screen = Rect::from_xywh(0, 0, 420, 1000);
        let mut pos = positioner(Anchor::TopRight, Anchor::TopLeft);
        pos.constraint_adjustment = ConstraintAdjustment::SLIDE_X | ConstraintAdjustment::RESIZE_X;
        let reference = Rect::from_xywh(0, 0, 400, 300);
        let anchor = Rect::from_xywh(350, 0, 50, 50);

        let result = place(&pos, Size::new(100, 40), anchor, reference, screen);
        // Slid, not shrunk.
        assert_eq!(result, Rect::from_xywh(320, 0, 100, 40));
    }
}

mod fallback {
    use super::*;

    #[test]
    fn naive_placement_returned_when_no_adjustment_fits() {
        // The child is larger than the whole output; flips and slides
        // cannot help and resize is not allowed.
        let screen = Rect::from_xywh(0, 0, 50, 50);
        let mut pos = positioner(Anchor::TopLeft, Anchor::TopLeft);
        pos.constraint_adjustment = ConstraintAdjustment::FLIP_ANY | ConstraintAdjustment::SLIDE_ANY;
        let anchor = Rect::from_xywh(0, 0, 10, 10);

        let result = place(&pos, Size::new(100, 100), anchor, screen, screen);
        assert_eq!(result, Rect::from_xywh(0, 0, 100, 100));
    }

    #[test]
    fn no_flags_returns_naive_even_when_overhanging() {
        let screen = Rect::from_xywh(0, 0, 200, 200);
        let pos = positioner(Anchor::BottomRight, Anchor::TopLeft);
        let anchor = Rect::from_xywh(150, 150, 40, 40);

        let result = place(&pos, Size::new(100, 100), anchor, screen, screen);
        assert_eq!(result, Rect::from_xywh(190, 190, 100, 100));
    }
}

mod reflections {
    use super::*;

    #[test]
    fn flips_are_involutions() {
        for anchor in Anchor::ALL {
            assert_eq!(anchor.flip_x().flip_x(), anchor);
            assert_eq!(anchor.flip_y().flip_y(), anchor);
        }
    }

    #[test]
    fn axis_neutral_anchors_are_fixed_points() {
        assert_eq!(Anchor::Center.flip_x(), Anchor::Center);
        assert_eq!(Anchor::Center.flip_y(), Anchor::Center);
        assert_eq!(Anchor::Top.flip_x(), Anchor::Top);
        assert_eq!(Anchor::Bottom.flip_x(), Anchor::Bottom);
        assert_eq!(Anchor::Left.flip_y(), Anchor::Left);
        assert_eq!(Anchor::Right.flip_y(), Anchor::Right);
    }
}
