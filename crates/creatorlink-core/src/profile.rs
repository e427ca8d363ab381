//! Profile wire types returned by `GET /bloggers/{id}`.
//!
//! The backend returns the published profile and every pending draft in one
//! document. Draft containers are decoded leniently: an entry that does not
//! match the expected shape is logged and skipped, so a malformed draft can
//! only ever degrade the merged view to published data.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};

use crate::platform::PlatformType;

/// Full profile document: published data plus pending drafts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub published: PublishedProfile,
    #[serde(flatten)]
    pub drafts: DraftSet,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedProfile {
    pub id: String,
    pub name: Option<String>,
    pub contact_link: Option<String>,
    pub work_format: Option<String>,
    pub gender: Option<String>,
    pub is_barter_available: Option<bool>,
    pub is_in_registry: Option<bool>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub social: Vec<PlatformRecord>,
}

/// Everything awaiting moderation for one profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSet {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub social_media_drafts: Vec<PlatformRecord>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub profile_draft: Option<ProfileDraft>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub price_draft: Vec<PriceDraft>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub coverage_draft: Vec<CoverageDraft>,
}

impl DraftSet {
    /// `true` when any draft container carries something to moderate.
    #[must_use]
    pub fn has_pending_changes(&self) -> bool {
        !self.social_media_drafts.is_empty()
            || self.profile_draft.as_ref().is_some_and(ProfileDraft::has_any)
            || !self.price_draft.is_empty()
            || !self.coverage_draft.is_empty()
    }
}

/// One platform entry, used for both `social[]` and `socialMediaDrafts[]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformRecord {
    #[serde(rename = "type")]
    pub platform_type: PlatformType,
    #[serde(default)]
    pub profile_url: String,
    pub identifier: Option<String>,
    /// Kept as a string: the backend reports `"0"` until ingestion finishes.
    #[serde(default, deserialize_with = "string_or_number")]
    pub subscribers: Option<String>,
    pub engagement_rate: Option<f64>,
    pub post_reach: Option<u64>,
    pub story_reach: Option<u64>,
    pub post_price: Option<u64>,
    pub story_price: Option<u64>,
    pub integration_price: Option<u64>,
    #[serde(default)]
    pub screenshots: Vec<Screenshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Screenshot {
    pub url: String,
    #[serde(default)]
    pub kind: Option<String>,
}

/// Profile-level scalar overrides. `None` means "no opinion".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDraft {
    pub name: Option<String>,
    pub contact_link: Option<String>,
    pub work_format: Option<String>,
    pub gender: Option<String>,
    pub is_barter_available: Option<bool>,
    pub is_in_registry: Option<bool>,
}

impl ProfileDraft {
    #[must_use]
    pub fn has_any(&self) -> bool {
        self.name.is_some()
            || self.contact_link.is_some()
            || self.work_format.is_some()
            || self.gender.is_some()
            || self.is_barter_available.is_some()
            || self.is_in_registry.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceDraft {
    #[serde(rename = "type")]
    pub platform_type: PlatformType,
    pub post_price: Option<u64>,
    pub story_price: Option<u64>,
    pub integration_price: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageDraft {
    #[serde(rename = "type")]
    pub platform_type: PlatformType,
    pub post_reach: Option<u64>,
    pub story_reach: Option<u64>,
}

fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let items = match raw {
        None | Some(serde_json::Value::Null) => return Ok(Vec::new()),
        Some(serde_json::Value::Array(items)) => items,
        Some(other) => {
            tracing::warn!(value = %other, "expected an array; treating as empty");
            return Ok(Vec::new());
        }
    };

    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            serde_json::from_value::<T>(item)
                .map_err(|e| {
                    tracing::warn!(index = idx, error = %e, "skipping malformed profile entry");
                })
                .ok()
        })
        .collect())
}

fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    match raw {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => Ok(serde_json::from_value::<T>(value)
            .map_err(|e| {
                tracing::warn!(error = %e, "ignoring malformed draft object");
            })
            .ok()),
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
