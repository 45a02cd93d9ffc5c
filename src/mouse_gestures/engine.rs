use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_6, PI};

/// Token appended to the gesture string when the left button is clicked
/// while a stroke is in progress.
pub const CLICK_TOKEN: &str = "Click ";

/// Default half-width of each cardinal sector, in radians.
pub const DEFAULT_TOLERANCE: f32 = FRAC_PI_6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Right,
    Down,
    Up,
    Left,
}

impl Direction {
    const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::Up,
        Direction::Left,
    ];

    pub fn symbol(self) -> char {
        match self {
            Direction::Right => '→',
            Direction::Down => '↓',
            Direction::Up => '↑',
            Direction::Left => '←',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        Self::ALL.into_iter().find(|dir| dir.symbol() == symbol)
    }

    /// Angle of the sector centre in screen coordinates (y grows downwards).
    fn center(self) -> f32 {
        match self {
            Direction::Right => 0.0,
            Direction::Down => FRAC_PI_2,
            Direction::Up => -FRAC_PI_2,
            Direction::Left => PI,
        }
    }
}

/// Clamp a configured tolerance so the four sectors never overlap.
pub fn clamp_tolerance(tolerance: f32) -> f32 {
    if !tolerance.is_finite() || tolerance <= 0.0 {
        return DEFAULT_TOLERANCE;
    }
    tolerance.min(FRAC_PI_4)
}

/// Classify a displacement into one of the four cardinal directions.
///
/// Displacements falling between sectors (the diagonal zones) yield `None`,
/// as does a zero displacement.
pub fn direction_from_delta(dx: f32, dy: f32, tolerance: f32) -> Option<Direction> {
    if dx == 0.0 && dy == 0.0 {
        return None;
    }
    if !dx.is_finite() || !dy.is_finite() {
        return None;
    }
    let tolerance = clamp_tolerance(tolerance);
    let theta = dy.atan2(dx);
    Direction::ALL
        .into_iter()
        .find(|dir| angular_distance(theta, dir.center()) <= tolerance)
}

fn angular_distance(a: f32, b: f32) -> f32 {
    let diff = (a - b).abs() % (2.0 * PI);
    if diff > PI {
        2.0 * PI - diff
    } else {
        diff
    }
}

/// A single element of a gesture string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureToken {
    Stroke(Direction),
    Click,
}

/// Split a gesture string into tokens. Returns `None` if the string contains
/// anything other than direction symbols and click tokens.
pub fn parse_gesture(gesture: &str) -> Option<Vec<GestureToken>> {
    let mut tokens = Vec::new();
    let mut rest = gesture;
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix(CLICK_TOKEN) {
            tokens.push(GestureToken::Click);
            rest = after;
            continue;
        }
        let mut chars = rest.chars();
        let dir = chars.next().and_then(Direction::from_symbol)?;
        tokens.push(GestureToken::Stroke(dir));
        rest = chars.as_str();
    }
    Some(tokens)
}

pub fn is_valid_gesture(gesture: &str) -> bool {
    matches!(parse_gesture(gesture), Some(tokens) if !tokens.is_empty())
}
