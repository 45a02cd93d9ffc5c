use crate::actions::{ActionResolver, CustomUrl};
use crate::mouse_gestures::engine::clamp_tolerance;
use crate::mouse_gestures::{GestureBinding, GestureTable, TrackerConfig, DEFAULT_TOLERANCE};
use crate::tab_history::DEFAULT_HISTORY_SIZE;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_EXTENSION_ID: &str = "frame-gestures";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleMethod {
    PrefixMatch,
    Include,
    Regexp,
}

/// One entry of the kill-switch list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisableRule {
    pub method: RuleMethod,
    pub value: String,
}

impl DisableRule {
    pub fn new(method: RuleMethod, value: impl Into<String>) -> Self {
        Self {
            method,
            value: value.into(),
        }
    }

    fn compile(&self) -> Option<CompiledRule> {
        let rule = match self.method {
            RuleMethod::PrefixMatch => CompiledRule::Prefix(self.value.clone()),
            RuleMethod::Include => CompiledRule::Include(self.value.clone()),
            RuleMethod::Regexp => match Regex::new(&self.value) {
                Ok(re) => CompiledRule::Regexp(re),
                Err(err) => {
                    tracing::warn!(pattern = %self.value, %err, "invalid disable rule; ignoring");
                    return None;
                }
            },
        };
        Some(rule)
    }
}

#[derive(Debug, Clone)]
enum CompiledRule {
    Prefix(String),
    Include(String),
    Regexp(Regex),
}

impl CompiledRule {
    fn matches(&self, url: &str) -> bool {
        match self {
            CompiledRule::Prefix(prefix) => url.starts_with(prefix.as_str()),
            CompiledRule::Include(needle) => url.contains(needle.as_str()),
            CompiledRule::Regexp(re) => re.is_match(url),
        }
    }
}

/// The kill-switch list with its patterns compiled. Invalid rules are
/// dropped with a warning when the list is built.
#[derive(Debug, Clone, Default)]
pub struct KillSwitch {
    rules: Vec<CompiledRule>,
}

impl KillSwitch {
    pub fn new(rules: &[DisableRule]) -> Self {
        Self {
            rules: rules.iter().filter_map(DisableRule::compile).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether gestures are switched off for a frame loaded from `url`.
    pub fn matches(&self, url: &str) -> bool {
        self.rules.iter().any(|rule| rule.matches(url))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Identifier stamped on every cross-frame message.
    #[serde(default = "default_extension_id")]
    pub extension_id: String,
    /// When enabled the logger is initialised at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Ordered gesture bindings; the first binding for a gesture wins.
    #[serde(default)]
    pub gestures: Vec<GestureBinding>,
    #[serde(default)]
    pub custom_urls: Vec<CustomUrl>,
    #[serde(default)]
    pub wheel_up_action: Option<String>,
    #[serde(default)]
    pub wheel_down_action: Option<String>,
    #[serde(default)]
    pub rocker_left_right: Option<String>,
    #[serde(default)]
    pub rocker_right_left: Option<String>,
    /// Minimum travel in pixels before a stroke segment counts.
    #[serde(default = "default_stroke_length")]
    pub stroke_length: f32,
    /// Half-width of each direction sector, in radians.
    #[serde(default = "default_direction_tolerance")]
    pub direction_tolerance: f32,
    #[serde(default = "default_history_size")]
    pub previous_tab_history_size: usize,
    /// Let a quick second right click open the native context menu.
    #[serde(default)]
    pub double_right_click_menu: bool,
    #[serde(default)]
    pub disable_rules: Vec<DisableRule>,
}

fn default_extension_id() -> String {
    DEFAULT_EXTENSION_ID.to_string()
}

fn default_stroke_length() -> f32 {
    10.0
}

fn default_direction_tolerance() -> f32 {
    DEFAULT_TOLERANCE
}

fn default_history_size() -> usize {
    DEFAULT_HISTORY_SIZE
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            extension_id: default_extension_id(),
            debug_logging: false,
            gestures: Vec::new(),
            custom_urls: Vec::new(),
            wheel_up_action: None,
            wheel_down_action: None,
            rocker_left_right: None,
            rocker_right_left: None,
            stroke_length: default_stroke_length(),
            direction_tolerance: default_direction_tolerance(),
            previous_tab_history_size: default_history_size(),
            double_right_click_menu: false,
            disable_rules: Vec::new(),
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn tracker_config(&self) -> TrackerConfig {
        let stroke_length = if self.stroke_length.is_finite() && self.stroke_length > 0.0 {
            self.stroke_length
        } else {
            tracing::warn!(
                "stroke_length {} is invalid; using default {}",
                self.stroke_length,
                default_stroke_length()
            );
            default_stroke_length()
        };
        TrackerConfig {
            stroke_length,
            tolerance: clamp_tolerance(self.direction_tolerance),
            double_right_click_menu: self.double_right_click_menu,
            rocker_left_right: non_empty(&self.rocker_left_right),
            rocker_right_left: non_empty(&self.rocker_right_left),
            wheel_up: non_empty(&self.wheel_up_action),
            wheel_down: non_empty(&self.wheel_down_action),
        }
    }

    pub fn gesture_table(&self) -> GestureTable {
        GestureTable::new(self.gestures.clone())
    }

    pub fn resolver(&self) -> ActionResolver {
        ActionResolver::new(self.gesture_table(), self.custom_urls.clone())
    }

    pub fn history_size(&self) -> usize {
        self.previous_tab_history_size.max(1)
    }

    pub fn kill_switch(&self) -> KillSwitch {
        KillSwitch::new(&self.disable_rules)
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}
