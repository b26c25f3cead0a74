//! Port interfaces for the settings panel

use chrono::{DateTime, Utc};
use launder_domain::IntervalOption;

/// Issues and checks request tokens protecting settings submissions.
pub trait RequestTokenGuard: Send + Sync {
    /// Token for `action` on `subject`, valid for a limited time after `now`.
    fn issue(&self, action: &str, subject: &str, now: DateTime<Utc>) -> String;

    fn verify(&self, token: &str, action: &str, subject: &str, now: DateTime<Utc>) -> bool;
}

/// Renders the interval drop-down.
///
/// Substitute an implementation to change the selector markup.
pub trait IntervalSelectorRenderer: Send + Sync {
    /// `name` is the form field name, `current` the selected key if any.
    fn render(&self, name: &str, options: &[IntervalOption], current: Option<&str>) -> String;
}
