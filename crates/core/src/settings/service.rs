//! Settings service - renders and saves the per-event laundry panel

use std::sync::Arc;

use chrono::{DateTime, Utc};
use launder_domain::constants::{
    FORM_ENABLE_FIELD, FORM_INTERVAL_FIELD, FORM_TOKEN_FIELD, SETTINGS_TOKEN_ACTION,
};
use launder_domain::{EventId, LaunderError, LaundrySettings, Result, SettingsSubmission};
use tracing::{debug, warn};

use super::ports::{IntervalSelectorRenderer, RequestTokenGuard};
use super::selector::{escape_html, HtmlSelectRenderer};
use crate::laundry::catalog::IntervalCatalog;
use crate::laundry::ports::SettingsStore;

pub struct SettingsService {
    store: Arc<dyn SettingsStore>,
    guard: Arc<dyn RequestTokenGuard>,
    catalog: Arc<IntervalCatalog>,
    renderer: Arc<dyn IntervalSelectorRenderer>,
}

impl SettingsService {
    pub fn new(
        store: Arc<dyn SettingsStore>,
        guard: Arc<dyn RequestTokenGuard>,
        catalog: Arc<IntervalCatalog>,
    ) -> Self {
        Self { store, guard, catalog, renderer: Arc::new(HtmlSelectRenderer) }
    }

    /// Replace the selector markup strategy.
    pub fn with_renderer(mut self, renderer: Arc<dyn IntervalSelectorRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Current settings for an event.
    pub async fn load(&self, event_id: &EventId) -> Result<LaundrySettings> {
        Ok(LaundrySettings {
            enabled: self.store.get_enabled(event_id).await?,
            interval: self.store.get_interval(event_id).await?,
        })
    }

    /// Panel markup: enable checkbox, interval selector and request token.
    pub async fn render_panel(&self, event_id: &EventId, now: DateTime<Utc>) -> Result<String> {
        let settings = self.load(event_id).await?;
        let checked = if settings.enabled { " checked='checked'" } else { "" };
        let selector = self.renderer.render(
            FORM_INTERVAL_FIELD,
            &self.catalog.list(),
            settings.interval.as_deref(),
        );
        let token = self.guard.issue(SETTINGS_TOKEN_ACTION, event_id.as_str(), now);

        Ok(format!(
            "<p><input type=\"checkbox\" name=\"{FORM_ENABLE_FIELD}\" value=\"1\"{checked}>\
             Enable laundering of this event.</p>\
             <p>Once this event expires, reset the start date to:</p>\
             <p>{selector}</p>\
             <input type=\"hidden\" id=\"{FORM_TOKEN_FIELD}\" name=\"{FORM_TOKEN_FIELD}\" \
             value=\"{}\" />",
            escape_html(&token)
        ))
    }

    /// Apply a submission.
    ///
    /// Without a valid token nothing is written and
    /// [`LaunderError::Authorization`] is returned. Otherwise the enabled
    /// flag is always written and the interval only when it is non-empty
    /// after sanitising. Interval keys are not checked against the catalog.
    pub async fn save(
        &self,
        submission: &SettingsSubmission,
        now: DateTime<Utc>,
    ) -> Result<LaundrySettings> {
        let event_id = &submission.event_id;
        let token_ok = submission.token.as_deref().is_some_and(|token| {
            self.guard.verify(token, SETTINGS_TOKEN_ACTION, event_id.as_str(), now)
        });
        if !token_ok {
            warn!(event_id = %event_id, "rejected settings save with missing or invalid token");
            return Err(LaunderError::Authorization(format!(
                "invalid request token for event {event_id}"
            )));
        }

        let enabled = submission.enable_requested();
        self.store.set_enabled(event_id, enabled).await?;

        if let Some(interval) = submission.interval.as_deref().map(sanitize_interval_key) {
            if !interval.is_empty() {
                self.store.set_interval(event_id, &interval).await?;
            }
        }

        debug!(event_id = %event_id, enabled, "laundry settings saved");
        self.load(event_id).await
    }
}

/// Strip markup tags, drop control and non-ASCII characters, collapse
/// whitespace and trim.
pub fn sanitize_interval_key(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut in_tag = false;
    for ch in raw.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            c if c.is_ascii_whitespace() => text.push(' '),
            c if c.is_ascii() && !c.is_ascii_control() => text.push(c),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
