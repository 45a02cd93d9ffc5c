pub mod db;
pub mod engine;
pub mod tracker;

pub use db::{GestureBinding, GestureTable};
pub use engine::{direction_from_delta, Direction, CLICK_TOKEN, DEFAULT_TOLERANCE};
pub use tracker::{
    Buttons, GestureEvent, GestureTracker, MouseButton, Point, TargetNode, TrackerConfig,
    TrackerEffect, TrackerPhase, DOUBLE_CLICK_WINDOW_MS,
};
