//! User-facing messages for the manual refresh action.
//!
//! Message text is owned by a [`MessageCatalog`]; when the catalog has no
//! entry for a key, built-in English text is used.

/// Message key reported after a successful forced refresh.
pub const REFRESH_SUCCESS_KEY: &str = "refreshServerAddressSuccess";

/// Message key reported after a failed forced refresh.
pub const REFRESH_FAILED_KEY: &str = "refreshServerAddressFailed";

/// Lookup of localized message text by key.
pub trait MessageCatalog {
    /// Returns the localized text for `key`, if the catalog has one.
    fn message(&self, key: &str) -> Option<String>;
}

/// Catalog without translations; every lookup falls back to English.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCatalog;

impl MessageCatalog for DefaultCatalog {
    fn message(&self, _key: &str) -> Option<String> {
        None
    }
}

/// Outcome of a forced refresh, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshNotice {
    /// The address was refreshed.
    Refreshed,
    /// The refresh failed or was not attempted.
    Failed,
}

impl RefreshNotice {
    /// Maps the boolean reply of a forced refresh.
    #[must_use]
    pub const fn from_outcome(refreshed: bool) -> Self {
        if refreshed { Self::Refreshed } else { Self::Failed }
    }

    /// Catalog key for this notice.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Refreshed => REFRESH_SUCCESS_KEY,
            Self::Failed => REFRESH_FAILED_KEY,
        }
    }

    /// Text used when the catalog has no entry.
    #[must_use]
    pub const fn fallback_text(self) -> &'static str {
        match self {
            Self::Refreshed => "Server address refreshed successfully!",
            Self::Failed => "Failed to refresh server address!",
        }
    }

    /// Localized text from `catalog`, or the English fallback.
    ///
    /// An empty catalog entry counts as missing.
    #[must_use]
    pub fn text(self, catalog: &impl MessageCatalog) -> String {
        catalog
            .message(self.key())
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| self.fallback_text().to_string())
    }

    /// Returns true for [`RefreshNotice::Refreshed`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Refreshed)
    }
}
