use crate::actions::{ActionOption, ActionRequest, BuiltinAction};
use crate::mouse_gestures::db::GestureTable;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CUSTOM_URL_PREFIX: &str = "customurl:";
pub const SELECTION_PLACEHOLDER: &str = "{}";

/// What the user did to ask for an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ActionKey {
    /// A finished gesture string, looked up in the gesture table.
    Gesture(String),
    /// An action configured directly (rocker or wheel shortcut).
    Named(String),
}

/// An action request waiting for resolution in the frame that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAction {
    pub key: ActionKey,
    pub option: ActionOption,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAction {
    pub builtin: BuiltinAction,
    pub request: ActionRequest,
    pub option: ActionOption,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomUrl {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("\"{id}\" searches for the selected text, but no text is selected")]
    MissingSelection { id: String },
    #[error("custom URL \"{id}\" does not exist")]
    UnknownTemplate { id: String },
    #[error("custom URL \"{id}\" produced an invalid address: {url}")]
    InvalidUrl { id: String, url: String },
}

#[derive(Debug, Clone, Default)]
pub struct ActionResolver {
    table: GestureTable,
    custom_urls: Vec<CustomUrl>,
}

impl ActionResolver {
    pub fn new(table: GestureTable, custom_urls: Vec<CustomUrl>) -> Self {
        Self { table, custom_urls }
    }

    pub fn table(&self) -> &GestureTable {
        &self.table
    }

    /// Configured action name for `key`, if any.
    pub fn action_name<'a>(&'a self, key: &'a ActionKey) -> Option<&'a str> {
        match key {
            ActionKey::Gesture(gesture) => self.table.match_action(gesture),
            ActionKey::Named(name) if !name.is_empty() => Some(name.as_str()),
            ActionKey::Named(_) => None,
        }
    }

    /// Resolve a pending action.
    ///
    /// `Ok(None)` means nothing is bound; the caller drops it silently.
    pub fn resolve(
        &self,
        pending: &PendingAction,
        selected_text: &str,
    ) -> Result<Option<ResolvedAction>, ResolveError> {
        let Some(name) = self.action_name(&pending.key) else {
            tracing::debug!(key = ?pending.key, "no action configured");
            return Ok(None);
        };

        let mut request = ActionRequest {
            action: name.to_string(),
            url: pending.option.url.clone(),
            src: pending.option.src.clone(),
            text: (!selected_text.is_empty()).then(|| selected_text.to_string()),
            prevent_context_menu: pending.option.prevent_context_menu,
        };

        let builtin = if let Some(id) = name.strip_prefix(CUSTOM_URL_PREFIX) {
            request.action = BuiltinAction::OpenUrl.name().to_string();
            request.url = Some(self.expand_custom_url(id, selected_text)?);
            BuiltinAction::OpenUrl
        } else {
            match BuiltinAction::from_name(name) {
                Some(builtin) => builtin,
                None => {
                    tracing::warn!(action = %name, "ignoring unknown action name");
                    return Ok(None);
                }
            }
        };

        Ok(Some(ResolvedAction {
            builtin,
            request,
            option: pending.option.clone(),
        }))
    }

    /// Expand the template registered under `id` with `selected_text`.
    pub fn expand_custom_url(&self, id: &str, selected_text: &str) -> Result<String, ResolveError> {
        let template = self
            .custom_urls
            .iter()
            .find(|custom| custom.id == id)
            .ok_or_else(|| ResolveError::UnknownTemplate { id: id.to_string() })?;

        let url = if template.url.contains(SELECTION_PLACEHOLDER) {
            if selected_text.trim().is_empty() {
                return Err(ResolveError::MissingSelection { id: id.to_string() });
            }
            let encoded = urlencoding::encode(selected_text);
            template.url.replace(SELECTION_PLACEHOLDER, &encoded)
        } else {
            template.url.clone()
        };

        if url::Url::parse(&url).is_err() {
            return Err(ResolveError::InvalidUrl {
                id: id.to_string(),
                url,
            });
        }
        Ok(url)
    }
}
