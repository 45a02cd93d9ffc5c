use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollKind {
    Up,
    Down,
    Top,
    Bottom,
}

/// Scroll geometry of one container, as reported by the DOM.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollMetrics {
    pub scroll_top: f32,
    pub scroll_height: f32,
    pub client_height: f32,
}

impl ScrollMetrics {
    pub fn can_scroll(&self, kind: ScrollKind) -> bool {
        if self.scroll_height <= self.client_height {
            return false;
        }
        match kind {
            ScrollKind::Up | ScrollKind::Top => self.scroll_top > 0.0,
            ScrollKind::Down | ScrollKind::Bottom => {
                self.scroll_top + self.client_height < self.scroll_height
            }
        }
    }
}

/// Index of the nearest container in `chain` able to absorb the scroll.
pub fn find_scroll_container(chain: &[ScrollMetrics], kind: ScrollKind) -> Option<usize> {
    chain.iter().position(|metrics| metrics.can_scroll(kind))
}
