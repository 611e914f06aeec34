use wfa_rs::label::LabelSettings;
use wfa_rs::scene::PathCommand;
use wfa_rs::style::{Fill, Stroke};
use wfa_rs::{
    ArrowConfig, ArrowId, ArrowsController, Invalidation, LayoutOptions, Rect, Scene, StaticChart,
};

fn chart() -> StaticChart {
    StaticChart::new()
        .with_stack("A", Rect::new(0.0, 100.0, 20.0, 50.0), 200.0)
        .with_stack("B", Rect::new(40.0, 80.0, 20.0, 70.0), 1300.0)
        .with_stack("C", Rect::new(80.0, 120.0, 20.0, 30.0), -300.0)
}

fn drawn(pairs: &[(&str, &str)]) -> ArrowsController<Scene> {
    let mut ctrl = ArrowsController::new(Scene::new());
    for (from, to) in pairs {
        ctrl.add_arrow(ArrowConfig::new(*from, *to));
    }
    ctrl.draw(&chart()).unwrap();
    ctrl
}

#[test]
fn draw_without_arrows_is_a_no_op() {
    let mut ctrl = ArrowsController::new(Scene::new());
    ctrl.draw(&chart()).unwrap();
    assert_eq!(ctrl.surface().created_count(), 0);
    assert_eq!(ctrl.measurement_flushes(), 0);
}

#[test]
fn draw_creates_handles_once_and_reuses_them() {
    let mut ctrl = drawn(&[("A", "C")]);
    assert!(ctrl.invalidation().is_empty());
    assert_eq!(ctrl.surface().path_count(), 2);
    assert_eq!(ctrl.surface().text_count(), 1);
    assert_eq!(ctrl.surface().created_count(), 3);
    assert_eq!(ctrl.measurement_flushes(), 1);

    ctrl.invalidate_layout();
    assert_eq!(ctrl.invalidation(), Invalidation::ALL);
    ctrl.draw(&chart()).unwrap();
    assert_eq!(ctrl.surface().created_count(), 3);
    assert_eq!(ctrl.measurement_flushes(), 2);

    // Nothing stale: no pass at all.
    ctrl.draw(&chart()).unwrap();
    assert_eq!(ctrl.measurement_flushes(), 2);
}

#[test]
fn color_change_only_repaints() {
    let mut ctrl = drawn(&[("A", "C")]);
    let id = ctrl.get_arrow(0).unwrap().id();
    let before = ctrl.get_arrow(0).unwrap().draw_settings();

    assert!(ctrl.configure_arrow(id, |c| c.stroke = Some(Stroke::new("#ff0000", 1.0))));
    assert_eq!(ctrl.invalidation(), Invalidation::APPEARANCE);
    ctrl.draw(&chart()).unwrap();
    assert_eq!(ctrl.measurement_flushes(), 1);
    assert_eq!(ctrl.get_arrow(0).unwrap().draw_settings(), before);

    let paths = ctrl.surface().paths();
    let (_, head) = paths[1];
    assert_eq!(head.fill, Some(Fill::new("#ff0000")));
    assert_eq!(head.stroke.as_ref().map(|s| s.color.as_str()), Some("#ff0000"));
}

#[test]
fn geometry_changes_recalculate() {
    let mut ctrl = drawn(&[("A", "C")]);
    let id = ctrl.get_arrow(0).unwrap().id();
    ctrl.configure_arrow(id, |c| c.stroke = Some(Stroke::new("#545f69", 4.0)));
    assert_eq!(ctrl.invalidation(), Invalidation::ALL);
    ctrl.draw(&chart()).unwrap();
    assert_eq!(ctrl.measurement_flushes(), 2);

    ctrl.configure_arrow(id, |c| c.to = "B".into());
    assert!(ctrl.invalidation().contains(Invalidation::RECALCULATION));

    assert!(!ctrl.configure_arrow(ArrowId(999), |c| c.enabled = false));
}

#[test]
fn unchanged_config_keeps_state_clean() {
    let mut ctrl = drawn(&[("A", "C")]);
    let id = ctrl.get_arrow(0).unwrap().id();
    assert!(ctrl.configure_arrow(id, |_| {}));
    assert!(ctrl.invalidation().is_empty());

    ctrl.set_options(LayoutOptions::default());
    assert!(ctrl.invalidation().is_empty());
    ctrl.set_options(LayoutOptions {
        head_size: 6.0,
        ..LayoutOptions::default()
    });
    assert_eq!(ctrl.invalidation(), Invalidation::ALL);
}

#[test]
fn removal_disposes_graphics() {
    let mut ctrl = drawn(&[("A", "C"), ("A", "B")]);
    assert_eq!(ctrl.surface().path_count(), 4);
    let second = ctrl.get_arrow(1).unwrap().id();

    assert!(ctrl.remove_arrow(second));
    assert!(!ctrl.remove_arrow(second));
    assert_eq!(ctrl.surface().path_count(), 2);
    assert_eq!(ctrl.surface().text_count(), 1);

    assert!(!ctrl.remove_arrow_at(3));
    assert!(ctrl.remove_arrow_at(0));
    assert!(ctrl.is_empty());
    assert_eq!(ctrl.surface().path_count(), 0);
    assert_eq!(ctrl.surface().text_count(), 0);
}

#[test]
fn snapshot_does_not_track_later_changes() {
    let mut ctrl = drawn(&[("A", "C")]);
    let snapshot = ctrl.get_all_arrows();
    ctrl.add_arrow(ArrowConfig::new("B", "C"));
    ctrl.remove_arrow_at(0);
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].from(), "A");
    assert_eq!(ctrl.get_arrow(0).unwrap().from(), "B");
}

#[test]
fn ids_are_stable_and_unique() {
    let mut ctrl = ArrowsController::new(Scene::new());
    let a = ctrl.add_arrow(ArrowConfig::new("A", "B"));
    let b = ctrl.add_arrow(ArrowConfig::new("A", "B"));
    assert_ne!(a, b);
    ctrl.remove_arrow(a);
    assert_eq!(ctrl.index_of(b), Some(0));
    assert_eq!(ctrl.arrow(b).unwrap().id(), b);
    assert!(ctrl.arrow(a).is_none());
}

#[test]
fn invalid_arrows_leave_their_graphics_empty() {
    let ctrl = drawn(&[("B", "B")]);
    let scene = ctrl.surface();
    assert_eq!(scene.created_count(), 3);
    assert!(scene.paths().iter().all(|(_, p)| p.commands.is_empty()));
    assert!(scene.texts().iter().all(|(_, t)| t.content.is_none()));
}

#[test]
fn label_tokens_and_locale() {
    let mut ctrl = ArrowsController::new(Scene::new());
    ctrl.set_locale("de");
    let label = LabelSettings {
        format: "{%From}→{%To}: {%ToValue} ({%Value})".into(),
        ..LabelSettings::default()
    };
    ctrl.add_arrow(ArrowConfig::new("A", "B").with_label(label));
    ctrl.draw(&chart()).unwrap();
    assert_eq!(ctrl.get_arrow(0).unwrap().label_text(), "A→B: 1.500 (1.300)");

    let texts = ctrl.surface().texts();
    assert_eq!(texts[0].1.content.as_deref(), Some("A→B: 1.500 (1.300)"));
}

#[test]
fn disabled_label_is_not_measured_or_drawn() {
    let mut ctrl = ArrowsController::new(Scene::new());
    let label = LabelSettings {
        enabled: false,
        ..LabelSettings::default()
    };
    ctrl.add_arrow(ArrowConfig::new("A", "C").with_label(label));
    ctrl.draw(&chart()).unwrap();

    let arrow = ctrl.get_arrow(0).unwrap();
    assert!(!arrow.has_label());
    assert!(arrow.label_size().is_empty());
    // Bounds are just the padded connector line.
    assert_eq!(arrow.bounds().unwrap().height, 5.0);
    assert!(ctrl.surface().texts()[0].1.content.is_none());
}

#[test]
fn serialize_round_trips_through_setup() {
    let ctrl = drawn(&[("A", "C"), ("C", "B")]);
    let configs = ctrl.serialize();
    let json = serde_json::to_string(&configs).unwrap();

    let mut restored = ArrowsController::new(Scene::new());
    restored.setup_by_config(serde_json::from_str::<Vec<ArrowConfig>>(&json).unwrap());
    assert_eq!(restored.serialize(), configs);
    restored.draw(&chart()).unwrap();
    assert_eq!(
        restored.get_arrow(1).unwrap().draw_settings(),
        ctrl.get_arrow(1).unwrap().draw_settings()
    );
}

#[test]
fn head_path_is_a_closed_triangle() {
    let ctrl = drawn(&[("A", "C")]);
    let s = ctrl.get_arrow(0).unwrap().draw_settings().unwrap();
    let paths = ctrl.surface().paths();
    let (_, connector) = paths[0];
    let (_, head) = paths[1];

    assert_eq!(connector.commands.len(), 4);
    assert!(connector.fill.is_none());
    match connector.commands[..] {
        [
            PathCommand::MoveTo(a),
            PathCommand::LineTo(b),
            PathCommand::LineTo(c),
            PathCommand::LineTo(d),
        ] => {
            assert_eq!(a, s.from_point);
            assert_eq!((b.x, b.y), (s.from_point.x, s.horizontal_y));
            assert_eq!((c.x, c.y), (s.to_point.x, s.horizontal_y));
            assert_eq!(d, s.to_point);
        }
        _ => panic!("unexpected connector {:?}", connector.commands),
    }

    assert_eq!(head.commands.len(), 4);
    assert_eq!(head.commands[3], PathCommand::Close);
    assert_eq!(head.commands[1], PathCommand::LineTo(s.to_point));
    assert!(head.fill.is_some());
}
