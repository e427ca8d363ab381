//! Merges published data with pending drafts into a single view.
//!
//! Drafts win field by field: a draft value that is present, even an empty
//! string, replaces the published one; an absent draft value defers to it.

use std::collections::{BTreeMap, HashMap};

use creatorlink_core::{
    CoverageDraft, DraftSet, MergedProfileView, PlatformLink, PlatformSnapshot, PlatformType,
    PriceDraft, ProfileDraft, ProfileResponse, PublishedProfile,
};

#[must_use]
pub fn reconcile_response(response: &ProfileResponse) -> MergedProfileView {
    reconcile(&response.published, &response.drafts)
}

/// Builds the merged view. Pure; calling it on the decomposition of its own
/// output yields the same view.
#[must_use]
pub fn reconcile(published: &PublishedProfile, drafts: &DraftSet) -> MergedProfileView {
    let empty = ProfileDraft::default();
    let draft = drafts.profile_draft.as_ref().unwrap_or(&empty);

    let mut view = MergedProfileView {
        id: published.id.clone(),
        name: overlay(draft.name.as_ref(), published.name.as_ref()),
        contact_link: overlay(draft.contact_link.as_ref(), published.contact_link.as_ref()),
        work_format: overlay(draft.work_format.as_ref(), published.work_format.as_ref()),
        gender: overlay(draft.gender.as_ref(), published.gender.as_ref()),
        is_barter_available: overlay(
            draft.is_barter_available.as_ref(),
            published.is_barter_available.as_ref(),
        ),
        is_in_registry: overlay(draft.is_in_registry.as_ref(), published.is_in_registry.as_ref()),
        platforms: merge_platforms(published, drafts),
    };

    let prices: HashMap<PlatformType, &PriceDraft> = drafts
        .price_draft
        .iter()
        .map(|d| (d.platform_type, d))
        .collect();
    let coverage: HashMap<PlatformType, &CoverageDraft> = drafts
        .coverage_draft
        .iter()
        .map(|d| (d.platform_type, d))
        .collect();

    for (platform, link) in &mut view.platforms {
        let price = prices.get(platform);
        let reach = coverage.get(platform);
        if price.is_none() && reach.is_none() {
            continue;
        }
        let snapshot = link.snapshot.get_or_insert_with(PlatformSnapshot::default);
        if let Some(price) = price {
            snapshot.post_price = price.post_price.or(snapshot.post_price);
            snapshot.story_price = price.story_price.or(snapshot.story_price);
            snapshot.integration_price = price.integration_price.or(snapshot.integration_price);
        }
        if let Some(reach) = reach {
            snapshot.post_reach = reach.post_reach.or(snapshot.post_reach);
            snapshot.story_reach = reach.story_reach.or(snapshot.story_reach);
        }
    }

    for platform in prices.keys().chain(coverage.keys()) {
        if !view.platforms.contains_key(platform) {
            tracing::debug!(platform = %platform, "ignoring draft for unlinked platform");
        }
    }

    view
}

fn overlay<T: Clone>(draft: Option<&T>, published: Option<&T>) -> Option<T> {
    draft.or(published).cloned()
}

fn merge_platforms(
    published: &PublishedProfile,
    drafts: &DraftSet,
) -> BTreeMap<PlatformType, PlatformLink> {
    let mut platforms: BTreeMap<PlatformType, PlatformLink> = published
        .social
        .iter()
        .map(|record| (record.platform_type, PlatformLink::from_record(record, false)))
        .collect();

    // Later drafts for the same platform replace earlier ones.
    let pending: BTreeMap<PlatformType, PlatformLink> = drafts
        .social_media_drafts
        .iter()
        .map(|record| (record.platform_type, PlatformLink::from_record(record, true)))
        .collect();

    for (platform, link) in pending {
        platforms.entry(platform).or_insert(link);
    }
    platforms
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
