use frame_gestures::actions::{ActionKey, PendingAction};
use frame_gestures::frames::SharedGestureState;
use frame_gestures::mouse_gestures::{
    Buttons, GestureEvent, GestureTracker, MouseButton, Point, TargetNode, TrackerConfig,
    TrackerEffect, TrackerPhase,
};

fn press(button: MouseButton, buttons: Buttons, x: f32, y: f32, at_ms: u64) -> GestureEvent {
    GestureEvent::MouseDown {
        button,
        buttons,
        point: (x, y).into(),
        target: Vec::new(),
        at_ms,
    }
}

fn right_down(x: f32, y: f32) -> GestureEvent {
    press(MouseButton::Right, Buttons::RIGHT, x, y, 0)
}

fn drag(x: f32, y: f32) -> GestureEvent {
    GestureEvent::MouseMove {
        buttons: Buttons::RIGHT,
        point: (x, y).into(),
    }
}

fn right_up(x: f32, y: f32) -> GestureEvent {
    GestureEvent::MouseUp {
        button: MouseButton::Right,
        buttons: Buttons::NONE,
        point: (x, y).into(),
    }
}

fn dispatched(effects: &[TrackerEffect]) -> Vec<PendingAction> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            TrackerEffect::Dispatch(pending) => Some(pending.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn straight_stroke_collapses_to_one_symbol() {
    let mut tracker = GestureTracker::new(TrackerConfig::default());
    let mut state = SharedGestureState::default();
    tracker.handle(&right_down(0.0, 0.0), &mut state);
    for x in 1..=100 {
        tracker.handle(&drag(x as f32, 0.0), &mut state);
    }
    assert_eq!(state.arrows, "→");
    assert!(state.on_mouse_gesture);
    assert!(state.should_prevent_context_menu);
    assert_eq!(tracker.phase(), TrackerPhase::Active);

    let effects = tracker.handle(&right_up(100.0, 0.0), &mut state);
    let actions = dispatched(&effects);
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].key, ActionKey::Gesture("→".into()));
    assert!(actions[0].option.prevent_context_menu);
    assert!(effects.contains(&TrackerEffect::ClearTrail));
    assert!(state.arrows.is_empty());
    assert!(!state.on_mouse_gesture);
    assert!(state.should_prevent_context_menu);
    assert_eq!(tracker.phase(), TrackerPhase::Idle);
}

#[test]
fn direction_changes_are_appended() {
    let mut tracker = GestureTracker::new(TrackerConfig::default());
    let mut state = SharedGestureState::default();
    tracker.handle(&right_down(0.0, 0.0), &mut state);
    tracker.handle(&drag(30.0, 0.0), &mut state);
    tracker.handle(&drag(30.0, 30.0), &mut state);
    tracker.handle(&drag(0.0, 30.0), &mut state);
    tracker.handle(&drag(0.0, 0.0), &mut state);
    assert_eq!(state.arrows, "→↓←↑");
}

#[test]
fn short_moves_are_below_threshold() {
    let mut tracker = GestureTracker::new(TrackerConfig::default());
    let mut state = SharedGestureState::default();
    tracker.handle(&right_down(0.0, 0.0), &mut state);
    tracker.handle(&drag(3.0, 4.0), &mut state);
    assert!(state.arrows.is_empty());
    assert_eq!(tracker.phase(), TrackerPhase::Armed);

    let effects = tracker.handle(&right_up(3.0, 4.0), &mut state);
    assert!(dispatched(&effects).is_empty());
    assert!(!state.should_prevent_context_menu);
}

#[test]
fn diagonal_stroke_produces_nothing() {
    let mut tracker = GestureTracker::new(TrackerConfig::default());
    let mut state = SharedGestureState::default();
    tracker.handle(&right_down(0.0, 0.0), &mut state);
    for i in 1..=10 {
        tracker.handle(&drag(i as f32 * 5.0, i as f32 * 5.0), &mut state);
    }
    assert!(state.arrows.is_empty());
    let effects = tracker.handle(&right_up(50.0, 50.0), &mut state);
    assert!(dispatched(&effects).is_empty());
}

#[test]
fn trail_starts_with_first_symbol_and_follows_every_move() {
    let mut tracker = GestureTracker::new(TrackerConfig::default());
    let mut state = SharedGestureState::default();
    tracker.handle(&right_down(0.0, 0.0), &mut state);
    assert!(tracker.handle(&drag(5.0, 0.0), &mut state).is_empty());

    let effects = tracker.handle(&drag(10.0, 0.0), &mut state);
    assert_eq!(
        effects,
        vec![
            TrackerEffect::DrawTrail {
                from: Point { x: 0.0, y: 0.0 },
                to: Point { x: 10.0, y: 0.0 },
            },
            TrackerEffect::Progress("→".into()),
        ]
    );
    assert!(tracker.has_trail_drawn());

    let effects = tracker.handle(&drag(12.0, 0.0), &mut state);
    assert_eq!(
        effects,
        vec![TrackerEffect::DrawTrail {
            from: Point { x: 10.0, y: 0.0 },
            to: Point { x: 12.0, y: 0.0 },
        }]
    );
}

#[test]
fn missed_mouseup_completes_on_next_move() {
    let mut tracker = GestureTracker::new(TrackerConfig::default());
    let mut state = SharedGestureState::default();
    tracker.handle(&right_down(0.0, 0.0), &mut state);
    tracker.handle(&drag(0.0, 30.0), &mut state);
    let effects = tracker.handle(
        &GestureEvent::MouseMove {
            buttons: Buttons::NONE,
            point: (0.0, 40.0).into(),
        },
        &mut state,
    );
    let actions = dispatched(&effects);
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].key, ActionKey::Gesture("↓".into()));
    assert_eq!(tracker.phase(), TrackerPhase::Idle);
}

#[test]
fn link_target_is_captured_at_press() {
    let mut tracker = GestureTracker::new(TrackerConfig::default());
    let mut state = SharedGestureState::default();
    let down = GestureEvent::MouseDown {
        button: MouseButton::Right,
        buttons: Buttons::RIGHT,
        point: (0.0, 0.0).into(),
        target: vec![
            TargetNode {
                tag: "span".into(),
                ..TargetNode::default()
            },
            TargetNode {
                tag: "a".into(),
                href: Some("https://example.com/next".into()),
                ..TargetNode::default()
            },
        ],
        at_ms: 0,
    };
    tracker.handle(&down, &mut state);
    assert_eq!(
        tracker.pending().url.as_deref(),
        Some("https://example.com/next")
    );
    tracker.handle(&drag(0.0, -30.0), &mut state);
    let effects = tracker.handle(&right_up(0.0, -30.0), &mut state);
    let actions = dispatched(&effects);
    assert_eq!(
        actions[0].option.url.as_deref(),
        Some("https://example.com/next")
    );
    assert!(tracker.pending().url.is_none());
}

#[test]
fn rocker_left_right_fires_without_tracking() {
    let config = TrackerConfig {
        rocker_left_right: Some("back".into()),
        ..TrackerConfig::default()
    };
    let mut tracker = GestureTracker::new(config);
    let mut state = SharedGestureState::default();

    let effects = tracker.handle(
        &press(MouseButton::Right, Buttons::LEFT | Buttons::RIGHT, 0.0, 0.0, 0),
        &mut state,
    );
    assert_eq!(effects.first(), Some(&TrackerEffect::PreventDefault));
    let actions = dispatched(&effects);
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].key, ActionKey::Named("back".into()));
    assert!(actions[0].option.prevent_context_menu);
    assert!(state.should_prevent_context_menu);
    assert_eq!(tracker.phase(), TrackerPhase::Idle);

    tracker.handle(&drag(40.0, 0.0), &mut state);
    assert!(state.arrows.is_empty());
}

#[test]
fn rocker_right_left_uses_the_left_press() {
    let config = TrackerConfig {
        rocker_left_right: Some("back".into()),
        rocker_right_left: Some("forward".into()),
        ..TrackerConfig::default()
    };
    let mut tracker = GestureTracker::new(config);
    let mut state = SharedGestureState::default();
    tracker.handle(&right_down(0.0, 0.0), &mut state);
    let effects = tracker.handle(
        &press(MouseButton::Left, Buttons::LEFT | Buttons::RIGHT, 0.0, 0.0, 10),
        &mut state,
    );
    let actions = dispatched(&effects);
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].key, ActionKey::Named("forward".into()));
    assert!(state.arrows.is_empty());
    assert_eq!(tracker.phase(), TrackerPhase::Idle);
}

#[test]
fn unconfigured_rocker_falls_through_to_gesture() {
    let mut tracker = GestureTracker::new(TrackerConfig::default());
    let mut state = SharedGestureState::default();
    let effects = tracker.handle(
        &press(MouseButton::Right, Buttons::LEFT | Buttons::RIGHT, 0.0, 0.0, 0),
        &mut state,
    );
    assert!(effects.is_empty());
    assert_eq!(tracker.phase(), TrackerPhase::Armed);
}

#[test]
fn left_click_during_stroke_appends_click_token() {
    let mut tracker = GestureTracker::new(TrackerConfig::default());
    let mut state = SharedGestureState::default();
    tracker.handle(&right_down(0.0, 0.0), &mut state);
    tracker.handle(&drag(30.0, 0.0), &mut state);
    let effects = tracker.handle(
        &press(MouseButton::Left, Buttons::LEFT | Buttons::RIGHT, 30.0, 0.0, 0),
        &mut state,
    );
    assert_eq!(
        effects,
        vec![
            TrackerEffect::PreventDefault,
            TrackerEffect::Progress("→Click ".into()),
        ]
    );
    let effects = tracker.handle(&right_up(30.0, 0.0), &mut state);
    assert_eq!(
        dispatched(&effects)[0].key,
        ActionKey::Gesture("→Click ".into())
    );
}

#[test]
fn left_click_without_right_button_is_ignored() {
    let mut tracker = GestureTracker::new(TrackerConfig::default());
    let mut state = SharedGestureState::default();
    let effects = tracker.handle(
        &press(MouseButton::Left, Buttons::LEFT, 0.0, 0.0, 0),
        &mut state,
    );
    assert!(effects.is_empty());
    assert!(state.arrows.is_empty());
}

#[test]
fn wheel_with_right_button_dispatches_and_cancels_stroke() {
    let config = TrackerConfig {
        wheel_down: Some("nexttab".into()),
        ..TrackerConfig::default()
    };
    let mut tracker = GestureTracker::new(config);
    let mut state = SharedGestureState::default();
    tracker.handle(&right_down(0.0, 0.0), &mut state);
    tracker.handle(&drag(30.0, 0.0), &mut state);

    let effects = tracker.handle(
        &GestureEvent::Wheel {
            buttons: Buttons::RIGHT,
            delta_y: 120.0,
        },
        &mut state,
    );
    let actions = dispatched(&effects);
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].key, ActionKey::Named("nexttab".into()));
    assert!(effects.contains(&TrackerEffect::PreventDefault));
    assert!(state.arrows.is_empty());
    assert!(!state.on_mouse_gesture);
    assert!(state.should_prevent_context_menu);
    assert_eq!(tracker.phase(), TrackerPhase::Idle);
}

#[test]
fn unconfigured_wheel_direction_is_ignored() {
    let config = TrackerConfig {
        wheel_down: Some("nexttab".into()),
        ..TrackerConfig::default()
    };
    let mut tracker = GestureTracker::new(config);
    let mut state = SharedGestureState::default();
    tracker.handle(&right_down(0.0, 0.0), &mut state);
    let effects = tracker.handle(
        &GestureEvent::Wheel {
            buttons: Buttons::RIGHT,
            delta_y: -120.0,
        },
        &mut state,
    );
    assert!(effects.is_empty());
    assert_eq!(tracker.phase(), TrackerPhase::Armed);

    let effects = tracker.handle(
        &GestureEvent::Wheel {
            buttons: Buttons::NONE,
            delta_y: 120.0,
        },
        &mut state,
    );
    assert!(effects.is_empty());
}

#[test]
fn blur_cancels_without_dispatch() {
    let mut tracker = GestureTracker::new(TrackerConfig::default());
    let mut state = SharedGestureState::default();
    tracker.handle(&right_down(0.0, 0.0), &mut state);
    tracker.handle(&drag(30.0, 0.0), &mut state);
    let effects = tracker.handle(&GestureEvent::Blur, &mut state);
    assert!(dispatched(&effects).is_empty());
    assert!(effects.contains(&TrackerEffect::ClearTrail));
    assert!(state.arrows.is_empty());
    assert!(!state.on_mouse_gesture);
    assert!(!state.should_prevent_context_menu);
    assert_eq!(tracker.phase(), TrackerPhase::Idle);

    let effects = tracker.handle(&right_up(30.0, 0.0), &mut state);
    assert!(dispatched(&effects).is_empty());
}

#[test]
fn context_menu_suppression_is_consumed_once() {
    let mut tracker = GestureTracker::new(TrackerConfig::default());
    let mut state = SharedGestureState::default();
    tracker.handle(&right_down(0.0, 0.0), &mut state);
    tracker.handle(&drag(30.0, 0.0), &mut state);
    tracker.handle(&right_up(30.0, 0.0), &mut state);

    let effects = tracker.handle(&GestureEvent::ContextMenu, &mut state);
    assert_eq!(effects, vec![TrackerEffect::PreventDefault]);
    assert!(!state.should_prevent_context_menu);
    assert!(tracker
        .handle(&GestureEvent::ContextMenu, &mut state)
        .is_empty());
}

#[test]
fn double_right_click_opens_native_menu() {
    let config = TrackerConfig {
        double_right_click_menu: true,
        ..TrackerConfig::default()
    };
    let mut tracker = GestureTracker::new(config);
    let mut state = SharedGestureState::default();

    tracker.handle(&press(MouseButton::Right, Buttons::RIGHT, 0.0, 0.0, 1_000), &mut state);
    tracker.handle(&right_up(0.0, 0.0), &mut state);
    let effects = tracker.handle(
        &press(MouseButton::Right, Buttons::RIGHT, 0.0, 0.0, 1_300),
        &mut state,
    );
    assert_eq!(effects, vec![TrackerEffect::AllowContextMenu]);
    assert_eq!(tracker.phase(), TrackerPhase::Idle);
    assert!(!state.should_prevent_context_menu);
    assert!(tracker
        .handle(&GestureEvent::ContextMenu, &mut state)
        .is_empty());
}

#[test]
fn slow_second_right_click_arms_again() {
    let config = TrackerConfig {
        double_right_click_menu: true,
        ..TrackerConfig::default()
    };
    let mut tracker = GestureTracker::new(config);
    let mut state = SharedGestureState::default();
    tracker.handle(&press(MouseButton::Right, Buttons::RIGHT, 0.0, 0.0, 1_000), &mut state);
    tracker.handle(&right_up(0.0, 0.0), &mut state);
    let effects = tracker.handle(
        &press(MouseButton::Right, Buttons::RIGHT, 0.0, 0.0, 2_000),
        &mut state,
    );
    assert!(effects.is_empty());
    assert_eq!(tracker.phase(), TrackerPhase::Armed);
}

#[test]
fn stroke_started_elsewhere_is_adopted() {
    let mut tracker = GestureTracker::new(TrackerConfig::default());
    let mut state = SharedGestureState {
        arrows: "→".into(),
        on_mouse_gesture: true,
        should_prevent_context_menu: true,
        ..SharedGestureState::default()
    };

    assert!(tracker.handle(&drag(200.0, 200.0), &mut state).is_empty());
    assert_eq!(tracker.phase(), TrackerPhase::Active);
    tracker.handle(&drag(230.0, 200.0), &mut state);
    assert_eq!(state.arrows, "→");
    tracker.handle(&drag(230.0, 230.0), &mut state);
    assert_eq!(state.arrows, "→↓");

    let effects = tracker.handle(&right_up(230.0, 230.0), &mut state);
    assert_eq!(
        dispatched(&effects)[0].key,
        ActionKey::Gesture("→↓".into())
    );
}

#[test]
fn direction_added_by_another_frame_is_not_repeated() {
    let mut tracker = GestureTracker::new(TrackerConfig::default());
    let mut state = SharedGestureState::default();
    tracker.handle(&right_down(0.0, 0.0), &mut state);
    tracker.handle(&drag(40.0, 0.0), &mut state);
    assert_eq!(state.arrows, "→");

    // The stroke went down through a child frame meanwhile.
    state.arrows.push('↓');
    tracker.handle(&drag(40.0, 200.0), &mut state);
    assert_eq!(state.arrows, "→↓");
    tracker.handle(&drag(0.0, 200.0), &mut state);
    assert_eq!(state.arrows, "→↓←");
}

#[test]
fn disabled_state_ignores_input() {
    let mut tracker = GestureTracker::new(TrackerConfig::default());
    let mut state = SharedGestureState {
        enabled_extension: false,
        ..SharedGestureState::default()
    };
    assert!(tracker.handle(&right_down(0.0, 0.0), &mut state).is_empty());
    tracker.handle(&drag(30.0, 0.0), &mut state);
    assert!(state.arrows.is_empty());
    assert_eq!(tracker.phase(), TrackerPhase::Idle);
}

#[test]
fn selection_is_recorded_in_shared_state() {
    let mut tracker = GestureTracker::new(TrackerConfig::default());
    let mut state = SharedGestureState::default();
    tracker.handle(
        &GestureEvent::SelectionChange {
            text: "cats".into(),
        },
        &mut state,
    );
    assert_eq!(state.selected_text, "cats");
}
