//! Merged view of a profile, as consumed by front ends.
//!
//! A [`MergedProfileView`] is derived from a [`ProfileResponse`](crate::ProfileResponse)
//! and is never edited in place by callers; edits go through the sync layer's
//! write path, which owns the only mutable copy.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::platform::PlatformType;
use crate::profile::{DraftSet, PlatformRecord, PublishedProfile, Screenshot};

/// Metrics and prices for one platform, replaced wholesale on every fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSnapshot {
    pub subscribers: Option<String>,
    pub engagement_rate: Option<f64>,
    pub post_reach: Option<u64>,
    pub story_reach: Option<u64>,
    pub post_price: Option<u64>,
    pub story_price: Option<u64>,
    pub integration_price: Option<u64>,
    pub screenshots: Vec<Screenshot>,
}

impl PlatformSnapshot {
    #[must_use]
    pub fn from_record(record: &PlatformRecord) -> Self {
        Self {
            subscribers: record.subscribers.clone(),
            engagement_rate: record.engagement_rate,
            post_reach: record.post_reach,
            story_reach: record.story_reach,
            post_price: record.post_price,
            story_price: record.story_price,
            integration_price: record.integration_price,
            screenshots: record.screenshots.clone(),
        }
    }

    /// Whether the backend's ingestion job has produced real numbers.
    ///
    /// The only signal available is the subscriber count: it stays at the
    /// literal `"0"` until ingestion writes a value. An account that really
    /// has zero subscribers is indistinguishable from one still ingesting.
    #[must_use]
    pub fn is_ingested(&self) -> bool {
        self.subscribers
            .as_deref()
            .map(str::trim)
            .is_some_and(|s| !s.is_empty() && s != "0")
    }
}

/// Client-side state of one linked platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformLink {
    pub platform_type: PlatformType,
    pub identifier: String,
    pub profile_url: String,
    /// Optimistic or awaiting moderation.
    pub is_pending: bool,
    /// Re-link in progress; the previous data is still displayed.
    pub is_loading: bool,
    pub snapshot: Option<PlatformSnapshot>,
}

impl PlatformLink {
    /// Entry inserted before the link request is confirmed.
    #[must_use]
    pub fn optimistic(platform_type: PlatformType, identifier: String, profile_url: String) -> Self {
        Self {
            platform_type,
            identifier,
            profile_url,
            is_pending: true,
            is_loading: false,
            snapshot: None,
        }
    }

    /// Builds a link from a published or draft record.
    ///
    /// A pending link whose snapshot already carries ingested data is
    /// resolved on the spot: pending and ingested never coexist.
    #[must_use]
    pub fn from_record(record: &PlatformRecord, pending: bool) -> Self {
        let identifier = record
            .identifier
            .clone()
            .filter(|id| !id.trim().is_empty())
            .or_else(|| {
                record
                    .platform_type
                    .parse_profile_url(&record.profile_url)
                    .ok()
            })
            .unwrap_or_else(|| record.profile_url.clone());
        let snapshot = PlatformSnapshot::from_record(record);
        let is_pending = pending && !snapshot.is_ingested();
        Self {
            platform_type: record.platform_type,
            identifier,
            profile_url: record.profile_url.clone(),
            is_pending,
            is_loading: false,
            snapshot: Some(snapshot),
        }
    }

    #[must_use]
    pub fn is_ingested(&self) -> bool {
        self.snapshot
            .as_ref()
            .is_some_and(PlatformSnapshot::is_ingested)
    }

    fn to_record(&self) -> PlatformRecord {
        let snapshot = self.snapshot.clone().unwrap_or_default();
        PlatformRecord {
            platform_type: self.platform_type,
            profile_url: self.profile_url.clone(),
            identifier: Some(self.identifier.clone()),
            subscribers: snapshot.subscribers,
            engagement_rate: snapshot.engagement_rate,
            post_reach: snapshot.post_reach,
            story_reach: snapshot.story_reach,
            post_price: snapshot.post_price,
            story_price: snapshot.story_price,
            integration_price: snapshot.integration_price,
            screenshots: snapshot.screenshots,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedProfileView {
    pub id: String,
    pub name: Option<String>,
    pub contact_link: Option<String>,
    pub work_format: Option<String>,
    pub gender: Option<String>,
    pub is_barter_available: Option<bool>,
    pub is_in_registry: Option<bool>,
    pub platforms: BTreeMap<PlatformType, PlatformLink>,
}

impl MergedProfileView {
    #[must_use]
    pub fn platform(&self, platform: PlatformType) -> Option<&PlatformLink> {
        self.platforms.get(&platform)
    }

    /// Splits the view back into a published profile and the drafts needed
    /// to reproduce it: resolved platforms become published entries, pending
    /// ones become platform drafts, scalar fields are published as-is.
    #[must_use]
    pub fn decompose(&self) -> (PublishedProfile, DraftSet) {
        let (pending, published): (Vec<&PlatformLink>, Vec<&PlatformLink>) =
            self.platforms.values().partition(|link| link.is_pending);

        let profile = PublishedProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            contact_link: self.contact_link.clone(),
            work_format: self.work_format.clone(),
            gender: self.gender.clone(),
            is_barter_available: self.is_barter_available,
            is_in_registry: self.is_in_registry,
            social: published.into_iter().map(PlatformLink::to_record).collect(),
        };
        let drafts = DraftSet {
            social_media_drafts: pending.into_iter().map(PlatformLink::to_record).collect(),
            ..DraftSet::default()
        };
        (profile, drafts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(subscribers: Option<&str>) -> PlatformRecord {
        PlatformRecord {
            platform_type: PlatformType::Instagram,
            profile_url: "https://instagram.com/jane".to_string(),
            identifier: None,
            subscribers: subscribers.map(str::to_string),
            engagement_rate: None,
            post_reach: None,
            story_reach: None,
            post_price: None,
            story_price: None,
            integration_price: None,
            screenshots: Vec::new(),
        }
    }

    #[test]
    fn literal_zero_is_not_ingested() {
        let snap = PlatformSnapshot::from_record(&record(Some("0")));
        assert!(!snap.is_ingested());
        assert!(!PlatformSnapshot::from_record(&record(None)).is_ingested());
        assert!(!PlatformSnapshot::from_record(&record(Some(" "))).is_ingested());
        assert!(PlatformSnapshot::from_record(&record(Some("15"))).is_ingested());
    }

    #[test]
    fn identifier_falls_back_to_parsed_url() {
        let link = PlatformLink::from_record(&record(Some("0")), true);
        assert_eq!(link.identifier, "jane");
        assert!(link.is_pending);
    }

    #[test]
    fn pending_record_with_ingested_data_is_resolved() {
        let link = PlatformLink::from_record(&record(Some("1200")), true);
        assert!(!link.is_pending);
        assert!(link.is_ingested());
    }
}
