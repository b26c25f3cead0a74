//! Per-event laundry settings and settings-form submissions

use serde::{Deserialize, Serialize};

use super::event::EventId;
use crate::constants::{FORM_ENABLE_FIELD, FORM_INTERVAL_FIELD, FORM_TOKEN_FIELD};

/// The two per-event settings the laundry reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaundrySettings {
    pub enabled: bool,
    pub interval: Option<String>,
}

/// One entry of the interval drop-down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalOption {
    pub key: String,
    pub label: String,
}

impl IntervalOption {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self { key: key.into(), label: label.into() }
    }
}

/// Raw values posted by the settings panel for one event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsSubmission {
    pub event_id: EventId,
    /// Request token field
    pub token: Option<String>,
    /// Checkbox value; `"1"` when ticked
    pub enable: Option<String>,
    /// Selected interval key, unsanitised
    pub interval: Option<String>,
}

impl SettingsSubmission {
    /// Build a submission from posted form fields, ignoring unrelated ones.
    pub fn from_form<I, K, V>(event_id: impl Into<EventId>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut submission = Self { event_id: event_id.into(), ..Self::default() };
        for (name, value) in fields {
            match name.as_ref() {
                FORM_TOKEN_FIELD => submission.token = Some(value.into()),
                FORM_ENABLE_FIELD => submission.enable = Some(value.into()),
                FORM_INTERVAL_FIELD => submission.interval = Some(value.into()),
                _ => {}
            }
        }
        submission
    }

    /// The checkbox counts as ticked only for the exact value `"1"`.
    pub fn enable_requested(&self) -> bool {
        self.enable.as_deref() == Some("1")
    }
}
