use wfa_rs::arrows::engine::ArrowGeometryEngine;
use wfa_rs::chart::ChartLayout;
use wfa_rs::{
    Arrow, ArrowConfig, ArrowsController, LayoutError, LayoutOptions, Orientation, Point2D, Rect,
    Scene, StaticChart,
};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Three stacks on a common baseline at y = 150: tops 100, 80 and 120.
fn abc(diff_a: f64) -> StaticChart {
    StaticChart::new()
        .with_stack("A", Rect::new(0.0, 100.0, 20.0, 50.0), diff_a)
        .with_stack("B", Rect::new(40.0, 80.0, 20.0, 70.0), 5.0)
        .with_stack("C", Rect::new(80.0, 120.0, 20.0, 30.0), -3.0)
}

fn laid_out(chart: &StaticChart, pairs: &[(&str, &str)]) -> Vec<Arrow> {
    let mut ctrl = ArrowsController::new(Scene::new());
    for (from, to) in pairs {
        ctrl.add_arrow(ArrowConfig::new(*from, *to));
    }
    ctrl.draw(chart).unwrap();
    ctrl.get_all_arrows()
}

fn assert_clear_of_stacks(chart: &StaticChart, arrows: &[Arrow]) {
    let engine = ArrowGeometryEngine::new(chart, LayoutOptions::default()).unwrap();
    for arrow in arrows {
        let bounds = arrow.bounds().expect("valid arrow has bounds");
        for (i, stack) in engine.stacks().iter().enumerate() {
            assert!(
                !bounds.overlaps(stack, 1e-6),
                "arrow {} -> {} overlaps stack {i}: {bounds:?} vs {stack:?}",
                arrow.from(),
                arrow.to()
            );
        }
    }
}

#[test]
fn up_arrow_starts_above_higher_anchor() {
    let chart = abc(10.0);
    let engine = ArrowGeometryEngine::new(&chart, LayoutOptions::default()).unwrap();
    let base = engine.base_settings(0, 2).unwrap();
    assert!(base.is_up);
    assert_eq!(base.from_point, Point2D::new(10.0, 100.0));
    assert_eq!(base.to_point, Point2D::new(90.0, 120.0));
    assert_eq!(base.horizontal_y, 85.0);
}

#[test]
fn down_arrow_hangs_below_lower_anchor() {
    // A falls: anchors switch to the bottom edges.
    let chart = StaticChart::new()
        .with_stack("A", Rect::new(0.0, 60.0, 20.0, 40.0), -10.0)
        .with_stack("B", Rect::new(40.0, 80.0, 20.0, 30.0), 5.0)
        .with_stack("C", Rect::new(80.0, 50.0, 20.0, 70.0), 5.0);
    let engine = ArrowGeometryEngine::new(&chart, LayoutOptions::default()).unwrap();
    let base = engine.base_settings(0, 2).unwrap();
    assert!(!base.is_up);
    assert_eq!(base.from_point, Point2D::new(10.0, 100.0));
    assert_eq!(base.to_point, Point2D::new(90.0, 120.0));
    assert_eq!(base.horizontal_y, 135.0);
}

#[test]
fn connector_climbs_over_taller_stack_in_between() {
    let chart = abc(10.0);
    let arrows = laid_out(&chart, &[("A", "C")]);
    let s = arrows[0].draw_settings().unwrap();
    // Base 85; the connector plus label box reaches 87.5 and B starts at 80.
    assert!(close(s.horizontal_y, 77.5));
    assert_eq!(arrows[0].label_text(), "2");
    let b = arrows[0].bounds().unwrap();
    assert!(close(b.left, 10.0) && close(b.right(), 90.0));
    assert!(close(b.top, 60.0) && close(b.bottom(), 80.0));
    assert_clear_of_stacks(&chart, &arrows);
}

#[test]
fn minimal_gap_is_configurable() {
    let chart = abc(10.0);
    let options = LayoutOptions {
        minimal_gap: 30.0,
        ..LayoutOptions::default()
    };
    let engine = ArrowGeometryEngine::new(&chart, options).unwrap();
    assert_eq!(engine.base_settings(0, 2).unwrap().horizontal_y, 70.0);
}

#[test]
fn arrows_clear_stacks_and_each_other() {
    let chart = StaticChart::new()
        .with_stack("A", Rect::new(0.0, 100.0, 20.0, 50.0), 10.0)
        .with_stack("B", Rect::new(40.0, 70.0, 20.0, 80.0), 5.0)
        .with_stack("C", Rect::new(80.0, 120.0, 20.0, 30.0), -3.0)
        .with_stack("D", Rect::new(120.0, 40.0, 20.0, 110.0), 8.0)
        .with_stack("E", Rect::new(160.0, 90.0, 20.0, 60.0), 1.0)
        .with_stack("F", Rect::new(200.0, 110.0, 20.0, 40.0), 2.0);
    let arrows = laid_out(&chart, &[("A", "C"), ("B", "E"), ("D", "F")]);
    assert!(arrows.iter().all(|a| a.is_valid()));
    assert_clear_of_stacks(&chart, &arrows);

    for (i, a) in arrows.iter().enumerate() {
        for b in &arrows[i + 1..] {
            let (ra, rb) = (a.bounds().unwrap(), b.bounds().unwrap());
            assert!(!ra.overlaps(&rb, 1e-6), "{ra:?} overlaps {rb:?}");
        }
    }
    // B -> E spans A -> C and the tall D, so it ends up above both.
    let ac = arrows[0].draw_settings().unwrap().horizontal_y;
    let be = arrows[1].draw_settings().unwrap().horizontal_y;
    assert!(be < ac);
    assert!(be < 40.0);
}

#[test]
fn stack_labels_count_as_obstacles() {
    let chart = abc(10.0).with_stack_label(0, Rect::new(0.0, 85.0, 20.0, 14.0));
    let engine = ArrowGeometryEngine::new(&chart, LayoutOptions::default()).unwrap();
    assert_eq!(
        engine.stack_full_bounds(0).unwrap(),
        Rect::new(0.0, 85.0, 20.0, 65.0)
    );
    assert_eq!(engine.base_settings(0, 2).unwrap().horizontal_y, 70.0);
}

#[test]
fn series_labels_are_transposed_on_vertical_charts() {
    let chart = StaticChart::new()
        .with_stack("A", Rect::new(0.0, 0.0, 20.0, 50.0), 10.0)
        .with_series_label(0, 0, Rect::new(50.0, 2.0, 12.0, 16.0))
        .with_orientation(Orientation {
            vertical: true,
            ..Orientation::default()
        });
    let engine = ArrowGeometryEngine::new(&chart, LayoutOptions::default()).unwrap();
    // Pixel (50, 2, 12x16) is (2, 50, 16x12) in category/value space.
    assert_eq!(
        engine.stack_full_bounds(0).unwrap(),
        Rect::new(0.0, 0.0, 20.0, 62.0)
    );
}

#[test]
fn zero_and_negative_heights_are_normalized() {
    let chart = StaticChart::new()
        .with_stack("A", Rect::new(0.0, 100.0, 20.0, 50.0), 10.0)
        .with_stack("B", Rect::new(40.0, 150.0, 20.0, -70.0), 5.0)
        .with_stack("C", Rect::new(80.0, 120.0, 20.0, 0.0), 0.0);
    let engine = ArrowGeometryEngine::new(&chart, LayoutOptions::default()).unwrap();
    assert_eq!(
        engine.stack_full_bounds(1).unwrap(),
        Rect::new(40.0, 80.0, 20.0, 70.0)
    );
    assert_eq!(
        engine.stack_full_bounds(2).unwrap(),
        Rect::new(80.0, 120.0, 20.0, 0.0)
    );

    let arrows = laid_out(&chart, &[("A", "C")]);
    let s = arrows[0].draw_settings().unwrap();
    assert_eq!(s.to_point, Point2D::new(90.0, 120.0));
    assert!(s.horizontal_y <= 80.0);
    assert_clear_of_stacks(&chart, &arrows);
}

#[test]
fn shared_anchor_points_are_spread_across_the_stack() {
    let chart = StaticChart::new()
        .with_stack("A", Rect::new(0.0, 100.0, 20.0, 50.0), 10.0)
        .with_stack("B", Rect::new(40.0, 80.0, 20.0, 70.0), 5.0)
        .with_stack("C", Rect::new(80.0, 120.0, 20.0, 30.0), 5.0);
    let arrows = laid_out(&chart, &[("A", "B"), ("A", "C")]);
    let ab = arrows[0].draw_settings().unwrap();
    let ac = arrows[1].draw_settings().unwrap();

    assert!(close(ab.horizontal_y, 65.0));
    // Clears B, then the A -> B arrow placed before it.
    assert!(close(ac.horizontal_y, 45.0));

    // The outer (higher) connector takes the outer slot.
    assert!(close(ac.from_point.x, 20.0 / 3.0));
    assert!(close(ab.from_point.x, 40.0 / 3.0));
    assert_eq!(ab.to_point.x, 50.0);
    assert_eq!(ac.to_point.x, 90.0);
}

#[test]
fn incoming_and_outgoing_arrows_split_a_stack() {
    let chart = abc(10.0);
    let arrows = laid_out(&chart, &[("A", "B"), ("B", "C")]);
    let into_b = arrows[0].draw_settings().unwrap();
    let out_of_b = arrows[1].draw_settings().unwrap();
    assert!(close(into_b.to_point.x, 40.0 + 20.0 / 3.0));
    assert!(close(out_of_b.from_point.x, 40.0 + 40.0 / 3.0));

    let mirrored = abc(10.0).with_orientation(Orientation {
        x_inverted: true,
        ..Orientation::default()
    });
    let arrows = laid_out(&mirrored, &[("A", "B"), ("B", "C")]);
    let into_b = arrows[0].draw_settings().unwrap();
    let out_of_b = arrows[1].draw_settings().unwrap();
    assert!(close(into_b.to_point.x, 40.0 + 40.0 / 3.0));
    assert!(close(out_of_b.from_point.x, 40.0 + 20.0 / 3.0));
}

#[test]
fn single_arrow_keeps_centered_anchors() {
    let arrows = laid_out(&abc(10.0), &[("C", "A")]);
    let s = arrows[0].draw_settings().unwrap();
    assert_eq!(s.from_point.x, 90.0);
    assert_eq!(s.to_point.x, 10.0);
    // C falls, so the arrow runs below the bars.
    assert!(!s.is_up);
    assert!(s.horizontal_y >= 165.0);
}

#[test]
fn orientation_flags_decide_normal_up() {
    let flat = abc(10.0);
    let flipped = abc(10.0).with_orientation(Orientation {
        vertical: true,
        y_inverted: true,
        x_inverted: false,
    });
    assert!(flat.normal_up_direction());
    assert!(flipped.normal_up_direction());
    assert!(flat.normal_right_direction());
    assert!(!flipped.normal_right_direction());

    let a = ArrowGeometryEngine::new(&flat, LayoutOptions::default()).unwrap();
    let b = ArrowGeometryEngine::new(&flipped, LayoutOptions::default()).unwrap();
    assert_eq!(a.base_settings(0, 2).unwrap(), b.base_settings(0, 2).unwrap());
}

#[test]
fn vertical_chart_grows_towards_larger_values() {
    // Value axis runs to the right in pixels: larger values are larger y here.
    let chart = StaticChart::new()
        .with_stack("A", Rect::new(0.0, 0.0, 20.0, 50.0), 10.0)
        .with_stack("B", Rect::new(40.0, 0.0, 20.0, 70.0), 5.0)
        .with_stack("C", Rect::new(80.0, 0.0, 20.0, 30.0), -3.0)
        .with_orientation(Orientation {
            vertical: true,
            ..Orientation::default()
        });
    assert!(!chart.normal_up_direction());

    let arrows = laid_out(&chart, &[("A", "C")]);
    let s = arrows[0].draw_settings().unwrap();
    assert!(s.is_up);
    assert_eq!(s.from_point, Point2D::new(10.0, 50.0));
    assert_eq!(s.to_point, Point2D::new(90.0, 30.0));
    // Base 65, pushed past B (ends at 70) together with the label box.
    assert!(close(s.horizontal_y, 80.5));
    assert_clear_of_stacks(&chart, &arrows);
}

struct Holey;

impl ChartLayout for Holey {
    fn index_by_value(&self, key: &str) -> Option<usize> {
        ["A", "B"].iter().position(|k| *k == key)
    }
    fn stacks_count(&self) -> usize {
        2
    }
    fn stack_bounds(&self, index: usize) -> Option<Rect> {
        (index == 0).then(|| Rect::new(0.0, 100.0, 20.0, 50.0))
    }
    fn stack_diff(&self, _index: usize) -> f64 {
        1.0
    }
    fn stack_value(&self, _index: usize) -> f64 {
        1.0
    }
    fn series_count(&self) -> usize {
        1
    }
    fn series_label_bounds(&self, _series: usize, _index: usize) -> Option<Rect> {
        None
    }
    fn is_vertical(&self) -> bool {
        false
    }
    fn y_inverted(&self) -> bool {
        false
    }
    fn x_inverted(&self) -> bool {
        false
    }
}

#[test]
fn resolved_category_without_bounds_is_an_error() {
    let mut ctrl = ArrowsController::new(Scene::new());
    ctrl.add_arrow(ArrowConfig::new("A", "B"));
    let err = ctrl.draw(&Holey).unwrap_err();
    assert_eq!(err, LayoutError::MissingStackBounds { index: 1 });
    assert!(err.to_string().contains("index 1"));
}
