//! Supported social platforms, their link endpoints and profile-URL syntax.
//!
//! Every platform has its own validator; a URL that does not match is
//! rejected before any network call. A successful match also yields a
//! best-effort identifier (username, handle or channel id) used for the
//! optimistic entry shown while the link request is in flight.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformType {
    Instagram,
    Tiktok,
    Youtube,
    Telegram,
    Vk,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformUrlError {
    #[error("Enter a valid {platform} profile link")]
    Invalid { platform: PlatformType, url: String },

    #[error("unknown platform \"{0}\"")]
    UnknownPlatform(String),
}

static INSTAGRAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:https?://)?(?:www\.|m\.)?instagram\.com/([a-z0-9._]{1,30})/?(?:\?.*)?$")
        .expect("valid regex")
});

static TIKTOK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:https?://)?(?:www\.|m\.)?tiktok\.com/@([a-z0-9._]{2,24})/?(?:\?.*)?$")
        .expect("valid regex")
});

static YOUTUBE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:https?://)?(?:www\.|m\.)?youtube\.com/(?:@([a-z0-9._-]{3,30})|channel/(uc[a-z0-9_-]{22})|c/([a-z0-9._-]{1,100}))/?(?:\?.*)?$",
    )
    .expect("valid regex")
});

static TELEGRAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:https?://)?(?:www\.)?(?:t\.me|telegram\.me)/([a-z0-9_]{5,32})/?$")
        .expect("valid regex")
});

static VK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:https?://)?(?:www\.|m\.)?vk\.com/([a-z0-9._]{2,64})/?$")
        .expect("valid regex")
});

impl PlatformType {
    pub const ALL: [PlatformType; 5] = [
        PlatformType::Instagram,
        PlatformType::Tiktok,
        PlatformType::Youtube,
        PlatformType::Telegram,
        PlatformType::Vk,
    ];

    /// Wire name, as used in JSON payloads and URL paths.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PlatformType::Instagram => "instagram",
            PlatformType::Tiktok => "tiktok",
            PlatformType::Youtube => "youtube",
            PlatformType::Telegram => "telegram",
            PlatformType::Vk => "vk",
        }
    }

    /// Name shown to users.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            PlatformType::Instagram => "Instagram",
            PlatformType::Tiktok => "TikTok",
            PlatformType::Youtube => "YouTube",
            PlatformType::Telegram => "Telegram",
            PlatformType::Vk => "VK",
        }
    }

    /// Endpoint accepting link requests for this platform.
    #[must_use]
    pub fn link_endpoint(self) -> &'static str {
        match self {
            PlatformType::Instagram => "/integrations/instagram",
            PlatformType::Tiktok => "/integrations/tiktok",
            PlatformType::Youtube => "/integrations/youtube",
            PlatformType::Telegram => "/integrations/telegram",
            PlatformType::Vk => "/integrations/vk",
        }
    }

    fn url_pattern(self) -> &'static Regex {
        match self {
            PlatformType::Instagram => &INSTAGRAM_RE,
            PlatformType::Tiktok => &TIKTOK_RE,
            PlatformType::Youtube => &YOUTUBE_RE,
            PlatformType::Telegram => &TELEGRAM_RE,
            PlatformType::Vk => &VK_RE,
        }
    }

    /// Validates `url` against this platform's profile-link syntax and
    /// returns the identifier parsed out of it.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformUrlError::Invalid`] when the URL does not look like a
    /// profile link for this platform.
    pub fn parse_profile_url(self, url: &str) -> Result<String, PlatformUrlError> {
        let trimmed = url.trim();
        self.url_pattern()
            .captures(trimmed)
            .and_then(|caps| caps.iter().skip(1).flatten().next())
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| PlatformUrlError::Invalid {
                platform: self,
                url: trimmed.to_string(),
            })
    }
}

impl fmt::Display for PlatformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for PlatformType {
    type Err = PlatformUrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        PlatformType::ALL
            .into_iter()
            .find(|p| p.as_str() == lowered)
            .ok_or_else(|| PlatformUrlError::UnknownPlatform(s.to_string()))
    }
}
