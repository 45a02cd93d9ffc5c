use serde::{Deserialize, Serialize};

/// Gesture state shared by every frame of one page.
///
/// Each frame holds a full copy. Copies are only ever replaced wholesale by
/// [`CrossFrameSync`](crate::frames::CrossFrameSync), never merged field by
/// field, so a lost update is repaired by the next broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedGestureState {
    #[serde(default)]
    pub should_prevent_context_menu: bool,
    #[serde(default)]
    pub selected_text: String,
    #[serde(default = "default_enabled")]
    pub enabled_extension: bool,
    #[serde(default)]
    pub on_mouse_gesture: bool,
    #[serde(default)]
    pub arrows: String,
}

impl Default for SharedGestureState {
    fn default() -> Self {
        Self {
            should_prevent_context_menu: false,
            selected_text: String::new(),
            enabled_extension: true,
            on_mouse_gesture: false,
            arrows: String::new(),
        }
    }
}

impl SharedGestureState {
    /// Drop the in-progress stroke without touching the context-menu flag.
    pub fn clear_stroke(&mut self) {
        self.arrows.clear();
        self.on_mouse_gesture = false;
    }
}

fn default_enabled() -> bool {
    true
}
