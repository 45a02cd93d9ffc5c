use crate::actions::{ActionKey, ActionOption, PendingAction, ScrollMetrics};
use crate::frames::SharedGestureState;
use crate::mouse_gestures::engine::{
    direction_from_delta, Direction, CLICK_TOKEN, DEFAULT_TOLERANCE,
};
use serde::{Deserialize, Serialize};
use std::ops::BitOr;

/// A second right press within this window lets the native context menu through.
pub const DOUBLE_CLICK_WINDOW_MS: u64 = 750;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// Bitmask of buttons held during an event (DOM `buttons` encoding).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Buttons(pub u8);

impl Buttons {
    pub const NONE: Buttons = Buttons(0);
    pub const LEFT: Buttons = Buttons(1);
    pub const RIGHT: Buttons = Buttons(2);
    pub const MIDDLE: Buttons = Buttons(4);

    pub fn contains(self, other: Buttons) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Buttons {
    type Output = Buttons;

    fn bitor(self, rhs: Buttons) -> Buttons {
        Buttons(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl From<(f32, f32)> for Point {
    fn from(value: (f32, f32)) -> Self {
        Self {
            x: value.0,
            y: value.1,
        }
    }
}

/// One element of the event target chain, target first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetNode {
    pub tag: String,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub scroll: Option<ScrollMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GestureEvent {
    MouseDown {
        button: MouseButton,
        buttons: Buttons,
        point: Point,
        #[serde(default)]
        target: Vec<TargetNode>,
        #[serde(default)]
        at_ms: u64,
    },
    MouseMove {
        buttons: Buttons,
        point: Point,
    },
    MouseUp {
        button: MouseButton,
        buttons: Buttons,
        point: Point,
    },
    Wheel {
        buttons: Buttons,
        delta_y: f32,
    },
    ContextMenu,
    SelectionChange {
        text: String,
    },
    Blur,
}

/// Side effects requested by the tracker. The owning frame carries them out.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEffect {
    /// Consume the DOM event (prevent default and stop propagation).
    PreventDefault,
    /// The native context menu should be allowed for this click.
    AllowContextMenu,
    DrawTrail { from: Point, to: Point },
    ClearTrail,
    /// The gesture string changed.
    Progress(String),
    /// Resolve and run an action after a zero-delay pause.
    Dispatch(PendingAction),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub stroke_length: f32,
    pub tolerance: f32,
    pub double_right_click_menu: bool,
    pub rocker_left_right: Option<String>,
    pub rocker_right_left: Option<String>,
    pub wheel_up: Option<String>,
    pub wheel_down: Option<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            stroke_length: 10.0,
            tolerance: DEFAULT_TOLERANCE,
            double_right_click_menu: false,
            rocker_left_right: None,
            rocker_right_left: None,
            wheel_up: None,
            wheel_down: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerPhase {
    Idle,
    /// Right button down, no stroke yet.
    Armed,
    /// Movement crossed the stroke-length threshold.
    Active,
}

/// Per-frame gesture state machine.
///
/// Local fields never leave the frame. Everything other frames need to see
/// lives in the [`SharedGestureState`] passed to [`GestureTracker::handle`].
#[derive(Debug)]
pub struct GestureTracker {
    config: TrackerConfig,
    phase: TrackerPhase,
    previous_point: Option<Point>,
    previous_direction: Option<Direction>,
    trail_point: Option<Point>,
    has_trail_drawn: bool,
    right_click_count: u32,
    last_right_down_ms: Option<u64>,
    is_right_button_pressed: bool,
    pending: ActionOption,
}

impl GestureTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            phase: TrackerPhase::Idle,
            previous_point: None,
            previous_direction: None,
            trail_point: None,
            has_trail_drawn: false,
            right_click_count: 0,
            last_right_down_ms: None,
            is_right_button_pressed: false,
            pending: ActionOption::default(),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn phase(&self) -> TrackerPhase {
        self.phase
    }

    pub fn is_right_button_pressed(&self) -> bool {
        self.is_right_button_pressed
    }

    pub fn has_trail_drawn(&self) -> bool {
        self.has_trail_drawn
    }

    pub fn pending(&self) -> &ActionOption {
        &self.pending
    }

    pub fn handle(
        &mut self,
        event: &GestureEvent,
        state: &mut SharedGestureState,
    ) -> Vec<TrackerEffect> {
        if !state.enabled_extension {
            return Vec::new();
        }
        match event {
            GestureEvent::MouseDown {
                button,
                buttons,
                point,
                target,
                at_ms,
            } => self.on_mouse_down(*button, *buttons, *point, target, *at_ms, state),
            GestureEvent::MouseMove { buttons, point } => {
                self.on_mouse_move(*buttons, *point, state)
            }
            GestureEvent::MouseUp { button, .. } => self.on_mouse_up(*button, state),
            GestureEvent::Wheel { buttons, delta_y } => self.on_wheel(*buttons, *delta_y, state),
            GestureEvent::ContextMenu => self.on_context_menu(state),
            GestureEvent::SelectionChange { text } => {
                state.selected_text = text.clone();
                Vec::new()
            }
            GestureEvent::Blur => self.cancel(state),
        }
    }

    /// Abort everything: no action runs and the context menu is released.
    pub fn cancel(&mut self, state: &mut SharedGestureState) -> Vec<TrackerEffect> {
        let effects = self.abort_stroke(state);
        self.right_click_count = 0;
        self.last_right_down_ms = None;
        state.should_prevent_context_menu = false;
        effects
    }

    /// Drop local tracking after another frame finished the stroke.
    pub fn reset(&mut self) -> Vec<TrackerEffect> {
        let mut effects = Vec::new();
        if self.has_trail_drawn {
            effects.push(TrackerEffect::ClearTrail);
        }
        self.reset_local();
        effects
    }

    fn on_mouse_down(
        &mut self,
        button: MouseButton,
        buttons: Buttons,
        point: Point,
        target: &[TargetNode],
        at_ms: u64,
        state: &mut SharedGestureState,
    ) -> Vec<TrackerEffect> {
        match button {
            MouseButton::Right => {
                if buttons.contains(Buttons::LEFT) {
                    if let Some(action) = self.config.rocker_left_right.clone() {
                        return self.rocker(action, target, state);
                    }
                }
                if self.config.double_right_click_menu && self.note_right_press(at_ms) {
                    let mut effects = self.abort_stroke(state);
                    state.should_prevent_context_menu = false;
                    effects.push(TrackerEffect::AllowContextMenu);
                    return effects;
                }
                self.arm(point, target, state);
                Vec::new()
            }
            MouseButton::Left if buttons.contains(Buttons::RIGHT) => {
                if let Some(action) = self.config.rocker_right_left.clone() {
                    return self.rocker(action, target, state);
                }
                if self.phase != TrackerPhase::Idle || state.on_mouse_gesture {
                    return self.append_click(state);
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn on_mouse_move(
        &mut self,
        buttons: Buttons,
        point: Point,
        state: &mut SharedGestureState,
    ) -> Vec<TrackerEffect> {
        if !buttons.contains(Buttons::RIGHT) {
            // Release happened where we could not see it.
            if self.phase == TrackerPhase::Idle {
                return Vec::new();
            }
            if state.on_mouse_gesture {
                return self.complete(state);
            }
            return self.reset();
        }

        if self.phase == TrackerPhase::Idle {
            if state.on_mouse_gesture {
                self.adopt(point, state);
            }
            return Vec::new();
        }

        let mut effects = Vec::new();
        let Some(previous) = self.previous_point else {
            self.previous_point = Some(point);
            return effects;
        };

        if self.has_trail_drawn {
            if let Some(from) = self.trail_point {
                effects.push(TrackerEffect::DrawTrail { from, to: point });
            }
            self.trail_point = Some(point);
        }

        let dx = point.x - previous.x;
        let dy = point.y - previous.y;
        let threshold = self.config.stroke_length;
        if dx * dx + dy * dy < threshold * threshold {
            return effects;
        }
        self.previous_point = Some(point);
        self.phase = TrackerPhase::Active;

        let Some(dir) = direction_from_delta(dx, dy, self.config.tolerance) else {
            return effects;
        };
        // Other frames may have extended the stroke since our last symbol.
        self.previous_direction = last_direction(state);
        if self.previous_direction == Some(dir) {
            return effects;
        }
        self.previous_direction = Some(dir);
        state.arrows.push(dir.symbol());
        state.on_mouse_gesture = true;
        state.should_prevent_context_menu = true;

        if !self.has_trail_drawn {
            self.has_trail_drawn = true;
            if let Some(from) = self.trail_point {
                effects.push(TrackerEffect::DrawTrail { from, to: point });
            }
            self.trail_point = Some(point);
        }
        effects.push(TrackerEffect::Progress(state.arrows.clone()));
        effects
    }

    fn on_mouse_up(
        &mut self,
        button: MouseButton,
        state: &mut SharedGestureState,
    ) -> Vec<TrackerEffect> {
        if button != MouseButton::Right {
            return Vec::new();
        }
        if state.on_mouse_gesture {
            return self.complete(state);
        }
        self.reset()
    }

    fn on_wheel(
        &mut self,
        buttons: Buttons,
        delta_y: f32,
        state: &mut SharedGestureState,
    ) -> Vec<TrackerEffect> {
        if !buttons.contains(Buttons::RIGHT) {
            return Vec::new();
        }
        let configured = if delta_y < 0.0 {
            self.config.wheel_up.clone()
        } else if delta_y > 0.0 {
            self.config.wheel_down.clone()
        } else {
            None
        };
        let Some(action) = configured else {
            return Vec::new();
        };

        let mut option = self.pending.clone();
        let mut effects = self.abort_stroke(state);
        state.should_prevent_context_menu = true;
        option.prevent_context_menu = true;
        effects.push(TrackerEffect::PreventDefault);
        effects.push(TrackerEffect::Dispatch(PendingAction {
            key: ActionKey::Named(action),
            option,
        }));
        effects
    }

    fn on_context_menu(&mut self, state: &mut SharedGestureState) -> Vec<TrackerEffect> {
        if state.on_mouse_gesture {
            return vec![TrackerEffect::PreventDefault];
        }
        if state.should_prevent_context_menu {
            state.should_prevent_context_menu = false;
            return vec![TrackerEffect::PreventDefault];
        }
        Vec::new()
    }

    fn arm(&mut self, point: Point, target: &[TargetNode], state: &mut SharedGestureState) {
        self.phase = TrackerPhase::Armed;
        self.previous_point = Some(point);
        self.previous_direction = None;
        self.trail_point = Some(point);
        self.has_trail_drawn = false;
        self.is_right_button_pressed = true;
        self.pending = ActionOption::from_target_chain(target);
        if state.on_mouse_gesture || !state.arrows.is_empty() {
            state.clear_stroke();
        }
        state.should_prevent_context_menu = false;
    }

    /// Continue a stroke that started in another frame.
    fn adopt(&mut self, point: Point, state: &SharedGestureState) {
        self.phase = TrackerPhase::Active;
        self.previous_point = Some(point);
        self.previous_direction = last_direction(state);
        self.trail_point = Some(point);
        self.has_trail_drawn = true;
        self.is_right_button_pressed = true;
    }

    fn append_click(&mut self, state: &mut SharedGestureState) -> Vec<TrackerEffect> {
        state.arrows.push_str(CLICK_TOKEN);
        state.on_mouse_gesture = true;
        state.should_prevent_context_menu = true;
        self.phase = TrackerPhase::Active;
        self.previous_direction = None;
        vec![
            TrackerEffect::PreventDefault,
            TrackerEffect::Progress(state.arrows.clone()),
        ]
    }

    fn rocker(
        &mut self,
        action: String,
        target: &[TargetNode],
        state: &mut SharedGestureState,
    ) -> Vec<TrackerEffect> {
        let mut effects = self.abort_stroke(state);
        state.should_prevent_context_menu = true;
        let mut option = ActionOption::from_target_chain(target);
        option.prevent_context_menu = true;
        effects.push(TrackerEffect::PreventDefault);
        effects.push(TrackerEffect::Dispatch(PendingAction {
            key: ActionKey::Named(action),
            option,
        }));
        effects
    }

    fn complete(&mut self, state: &mut SharedGestureState) -> Vec<TrackerEffect> {
        let gesture = std::mem::take(&mut state.arrows);
        state.on_mouse_gesture = false;
        let mut option = std::mem::take(&mut self.pending);
        option.prevent_context_menu = state.should_prevent_context_menu;

        let mut effects = self.reset();
        effects.push(TrackerEffect::Dispatch(PendingAction {
            key: ActionKey::Gesture(gesture),
            option,
        }));
        effects
    }

    /// Returns true when this press is the second one inside the window.
    fn note_right_press(&mut self, at_ms: u64) -> bool {
        let within = self
            .last_right_down_ms
            .map(|last| at_ms.saturating_sub(last) < DOUBLE_CLICK_WINDOW_MS)
            .unwrap_or(false);
        if within && self.right_click_count >= 1 {
            self.right_click_count = 0;
            self.last_right_down_ms = None;
            return true;
        }
        if !within {
            self.right_click_count = 0;
        }
        self.right_click_count += 1;
        self.last_right_down_ms = Some(at_ms);
        false
    }

    fn abort_stroke(&mut self, state: &mut SharedGestureState) -> Vec<TrackerEffect> {
        let effects = self.reset();
        state.clear_stroke();
        effects
    }

    fn reset_local(&mut self) {
        self.phase = TrackerPhase::Idle;
        self.previous_point = None;
        self.previous_direction = None;
        self.trail_point = None;
        self.has_trail_drawn = false;
        self.is_right_button_pressed = false;
        self.pending = ActionOption::default();
    }
}

/// Last direction symbol of the shared stroke; `None` after a click token.
fn last_direction(state: &SharedGestureState) -> Option<Direction> {
    state.arrows.chars().last().and_then(Direction::from_symbol)
}
