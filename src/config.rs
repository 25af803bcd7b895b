//! Live-editable settings surface.
//!
//! Settings are an external collaborator: the admin side of the application
//! owns them and may edit them at any time. Orchestrators therefore read a
//! fresh snapshot on every call through [`SettingsProvider`] instead of
//! capturing values at construction. [`SwapSettings`] is the in-process
//! implementation, an `ArcSwap` so edits are visible without a restart and
//! reads stay lock-free.

use arc_swap::ArcSwap;
use std::sync::Arc;

/// Default daily limits, mirroring the backend's configured budgets.
pub const DEFAULT_KEYWORD_LIMIT: u32 = 50;
pub const DEFAULT_IDEAS_LIMIT: u32 = 5;
pub const DEFAULT_AUDIT_LIMIT: u32 = 20;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Workflow engine base URL, without trailing slash.
    pub base_url: String,
    /// Bearer token sent on every outbound call.
    pub token: String,
    pub daily_keyword_limit: u32,
    pub daily_ideas_limit: u32,
    pub daily_audit_limit: u32,
    /// Language/location hints forwarded to the workflows.
    pub language: String,
    pub location: String,
}

impl Settings {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            daily_keyword_limit: DEFAULT_KEYWORD_LIMIT,
            daily_ideas_limit: DEFAULT_IDEAS_LIMIT,
            daily_audit_limit: DEFAULT_AUDIT_LIMIT,
            language: "it".to_string(),
            location: "Italy".to_string(),
        }
    }

    pub fn with_daily_keyword_limit(mut self, limit: u32) -> Self {
        self.daily_keyword_limit = limit;
        self
    }

    pub fn with_daily_ideas_limit(mut self, limit: u32) -> Self {
        self.daily_ideas_limit = limit;
        self
    }

    pub fn with_daily_audit_limit(mut self, limit: u32) -> Self {
        self.daily_audit_limit = limit;
        self
    }

    pub fn with_locale(mut self, language: impl Into<String>, location: impl Into<String>) -> Self {
        self.language = language.into();
        self.location = location.into();
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new("", "")
    }
}

/// Read-side handle to the settings, consumed at call time.
pub trait SettingsProvider: Send + Sync {
    fn snapshot(&self) -> Settings;
}

/// [`ArcSwap`]-backed provider; `update` makes the new settings visible to
/// all subsequent calls immediately.
pub struct SwapSettings {
    inner: ArcSwap<Settings>,
}

impl SwapSettings {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: ArcSwap::from_pointee(settings),
        }
    }

    pub fn update(&self, settings: Settings) {
        self.inner.store(Arc::new(settings));
    }
}

impl SettingsProvider for SwapSettings {
    fn snapshot(&self) -> Settings {
        self.inner.load().as_ref().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let s = Settings::new("https://n8n.example.com/", "t");
        assert_eq!(s.base_url, "https://n8n.example.com");
    }

    #[test]
    fn updates_are_visible_to_later_snapshots() {
        let provider = SwapSettings::new(Settings::new("https://a.example", "t"));
        assert_eq!(provider.snapshot().base_url, "https://a.example");
        provider.update(Settings::new("https://b.example", "t").with_daily_ideas_limit(9));
        let snap = provider.snapshot();
        assert_eq!(snap.base_url, "https://b.example");
        assert_eq!(snap.daily_ideas_limit, 9);
    }
}
