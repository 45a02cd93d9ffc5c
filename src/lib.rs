pub mod actions;
pub mod background;
pub mod frames;
pub mod logging;
pub mod mouse_gestures;
pub mod page;
pub mod settings;
pub mod tab_history;
