//! New-release detection against a release feed.

use {
    parking_lot::RwLock,
    serde::Deserialize,
    tracing::{debug, info, warn},
};

use crate::error::UpdateError;

/// Tag of the running build, compared against the newest release tag.
pub const RUNNING_VERSION_TAG: &str = concat!("v", env!("CARGO_PKG_VERSION"));

/// Release feed queried by default.
pub const DEFAULT_FEED_URL: &str = "https://api.github.com/repos/tonearm-player/tonearm/releases/latest";

/// Page opened from the new-version dialog.
pub const DEFAULT_RELEASE_PAGE_URL: &str = "https://github.com/tonearm-player/tonearm/releases/latest";

/// Result of an on-demand update check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// A release other than the running build exists.
    NewVersion(String),
    /// The running build is the newest release, or nothing could be determined.
    UpToDate,
}

impl UpdateOutcome {
    /// Decides the outcome of a check.
    ///
    /// # Arguments
    ///
    /// * `found` - Newest tag reported by the feed, if the check succeeded
    /// * `running` - Tag of the running build
    #[must_use]
    pub fn from_check(found: Option<&str>, running: &str) -> Self {
        match found {
            Some(tag) if !tag.is_empty() && tag != running => UpdateOutcome::NewVersion(tag.to_string()),
            _ => UpdateOutcome::UpToDate,
        }
    }
}

/// Capability to learn about new releases.
pub trait UpdateChecker: Send + Sync {
    /// Newest tag found by the most recent check, if any.
    fn version_tag_found(&self) -> Option<String>;

    /// Queries the feed. Blocking; failures yield `None`.
    fn check_latest_version_tag(&self) -> Option<String>;

    /// URL of the release page shown to the user.
    fn latest_release_url(&self) -> String;
}

#[derive(Debug, Deserialize)]
struct ReleaseEntry {
    tag_name: Option<String>,
}

/// Update checker reading a GitHub-style "latest release" JSON document.
#[derive(Debug)]
pub struct ReleaseFeedChecker {
    feed_url: String,
    release_page_url: String,
    found: RwLock<Option<String>>,
}

impl Default for ReleaseFeedChecker {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_URL, DEFAULT_RELEASE_PAGE_URL)
    }
}

impl ReleaseFeedChecker {
    /// Creates a checker for a feed.
    ///
    /// # Arguments
    ///
    /// * `feed_url` - JSON endpoint returning an object with `tag_name`
    /// * `release_page_url` - Page opened to download the release
    #[must_use]
    pub fn new(feed_url: &str, release_page_url: &str) -> Self {
        Self {
            feed_url: feed_url.to_string(),
            release_page_url: release_page_url.to_string(),
            found: RwLock::new(None),
        }
    }

    fn fetch_latest_tag(&self) -> Result<String, UpdateError> {
        debug!(url = %self.feed_url, "Querying release feed");
        let entry: ReleaseEntry = ureq::get(&self.feed_url)
            .header("User-Agent", concat!("tonearm/", env!("CARGO_PKG_VERSION")))
            .call()?
            .body_mut()
            .read_json()?;

        entry
            .tag_name
            .filter(|tag| !tag.is_empty())
            .ok_or(UpdateError::MissingTag)
    }
}

impl UpdateChecker for ReleaseFeedChecker {
    fn version_tag_found(&self) -> Option<String> {
        self.found.read().clone()
    }

    fn check_latest_version_tag(&self) -> Option<String> {
        match self.fetch_latest_tag() {
            Ok(tag) => {
                info!(tag = %tag, "Latest release found");
                *self.found.write() = Some(tag.clone());
                Some(tag)
            }
            Err(e) => {
                warn!(error = %e, "Update check failed");
                None
            }
        }
    }

    fn latest_release_url(&self) -> String {
        self.release_page_url.clone()
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::update::{
        RUNNING_VERSION_TAG, ReleaseFeedChecker, UpdateChecker, UpdateOutcome,
    };

    #[test]
    fn test_outcome_new_version() {
        assert_eq!(
            UpdateOutcome::from_check(Some("v9.9.9"), "v0.1.0"),
            UpdateOutcome::NewVersion("v9.9.9".to_string())
        );
    }

    #[test]
    fn test_outcome_up_to_date() {
        assert_eq!(
            UpdateOutcome::from_check(Some("v0.1.0"), "v0.1.0"),
            UpdateOutcome::UpToDate
        );
        assert_eq!(UpdateOutcome::from_check(None, "v0.1.0"), UpdateOutcome::UpToDate);
        assert_eq!(UpdateOutcome::from_check(Some(""), "v0.1.0"), UpdateOutcome::UpToDate);
    }

    #[test]
    fn test_running_tag_has_prefix() {
        assert!(RUNNING_VERSION_TAG.starts_with('v'));
    }

    #[test]
    fn test_unreachable_feed_finds_nothing() {
        let checker = ReleaseFeedChecker::new("http://127.0.0.1:9/latest", "http://127.0.0.1:9/");
        assert!(checker.check_latest_version_tag().is_none());
        assert!(checker.version_tag_found().is_none());
        assert_eq!(checker.latest_release_url(), "http://127.0.0.1:9/");
    }
}
