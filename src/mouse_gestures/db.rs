use crate::mouse_gestures::engine::is_valid_gesture;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GestureBinding {
    pub gesture: String,
    pub action: String,
}

impl GestureBinding {
    pub fn new(gesture: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            gesture: gesture.into(),
            action: action.into(),
        }
    }
}

/// Ordered gesture → action table. Lookups are exact string matches; the
/// first binding for a gesture wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "Vec<GestureBinding>", into = "Vec<GestureBinding>")]
pub struct GestureTable {
    bindings: Vec<GestureBinding>,
}

impl GestureTable {
    pub fn new(bindings: Vec<GestureBinding>) -> Self {
        let bindings = bindings
            .into_iter()
            .filter(|binding| {
                let valid = is_valid_gesture(&binding.gesture);
                if !valid {
                    tracing::warn!(
                        gesture = %binding.gesture,
                        action = %binding.action,
                        "skipping gesture binding with invalid gesture string"
                    );
                }
                valid
            })
            .collect();
        Self { bindings }
    }

    pub fn bindings(&self) -> &[GestureBinding] {
        &self.bindings
    }

    pub fn match_action(&self, gesture: &str) -> Option<&str> {
        if gesture.is_empty() {
            return None;
        }
        self.bindings
            .iter()
            .find(|binding| binding.gesture == gesture)
            .map(|binding| binding.action.as_str())
    }
}

impl From<Vec<GestureBinding>> for GestureTable {
    fn from(bindings: Vec<GestureBinding>) -> Self {
        Self::new(bindings)
    }
}

impl From<GestureTable> for Vec<GestureBinding> {
    fn from(table: GestureTable) -> Self {
        table.bindings
    }
}
