use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use creatorlink_client::{ApiError, CreatorApi, LinkRequest};
use creatorlink_core::{
    CoverageEdit, DraftSet, MergedProfileView, PlatformLink, PlatformRecord, PlatformType,
    PriceEdit, ProfileEdit, ProfileResponse, PublishedProfile,
};
use tokio_util::sync::CancellationToken;

use crate::state::{PlatformStore, ProfileState};

pub(crate) fn record(platform: PlatformType, url: &str, subscribers: &str) -> PlatformRecord {
    PlatformRecord {
        platform_type: platform,
        profile_url: url.to_string(),
        identifier: None,
        subscribers: Some(subscribers.to_string()),
        engagement_rate: None,
        post_reach: None,
        story_reach: None,
        post_price: None,
        story_price: None,
        integration_price: None,
        screenshots: Vec::new(),
    }
}

pub(crate) fn link_request(platform: PlatformType, url: &str) -> LinkRequest {
    LinkRequest {
        platform,
        blogger_id: "b-1".to_string(),
        identifier: platform.parse_profile_url(url).unwrap_or_default(),
        profile_url: url.to_string(),
    }
}

pub(crate) fn published(records: Vec<PlatformRecord>) -> ProfileResponse {
    ProfileResponse {
        published: PublishedProfile {
            id: "b-1".to_string(),
            name: Some("Jane".to_string()),
            social: records,
            ..PublishedProfile::default()
        },
        drafts: DraftSet::default(),
    }
}

pub(crate) fn drafted(records: Vec<PlatformRecord>) -> ProfileResponse {
    let mut response = published(Vec::new());
    response.drafts.social_media_drafts = records;
    response
}

/// In-memory [`CreatorApi`] with scripted responses.
///
/// Queued profiles are served in order; once the queue is empty the last
/// fallback profile is repeated.
#[derive(Default)]
pub(crate) struct FakeApi {
    profiles: Mutex<VecDeque<Result<ProfileResponse, ApiError>>>,
    fallback: Mutex<Option<ProfileResponse>>,
    link_error: Mutex<Option<ApiError>>,
    edit_error: Mutex<Option<ApiError>>,
    observer: Mutex<Option<Arc<ProfileState>>>,
    pub fetches: AtomicU32,
    pub edits: AtomicU32,
    pub links: Mutex<Vec<LinkRequest>>,
    pub seen_during_link: Mutex<Vec<Option<PlatformLink>>>,
    pub seen_during_edit: Mutex<Vec<Option<MergedProfileView>>>,
}

impl FakeApi {
    pub fn queue_profile(&self, profile: Result<ProfileResponse, ApiError>) {
        self.profiles.lock().unwrap().push_back(profile);
    }

    pub fn set_fallback(&self, profile: ProfileResponse) {
        *self.fallback.lock().unwrap() = Some(profile);
    }

    pub fn fail_links(&self, error: ApiError) {
        *self.link_error.lock().unwrap() = Some(error);
    }

    pub fn fail_edits(&self, error: ApiError) {
        *self.edit_error.lock().unwrap() = Some(error);
    }

    /// Records what `state` holds at the moment each request arrives.
    pub fn observe(&self, state: Arc<ProfileState>) {
        *self.observer.lock().unwrap() = Some(state);
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }

    fn record_edit(&self) -> Result<(), ApiError> {
        self.edits.fetch_add(1, Ordering::SeqCst);
        if let Some(state) = self.observer.lock().unwrap().as_ref() {
            self.seen_during_edit.lock().unwrap().push(state.snapshot());
        }
        match self.edit_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CreatorApi for FakeApi {
    async fn fetch_profile(
        &self,
        _blogger_id: &str,
        cancel: Option<CancellationToken>,
    ) -> Result<ProfileResponse, ApiError> {
        if cancel.is_some_and(|token| token.is_cancelled()) {
            return Err(ApiError::cancelled());
        }
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(next) = self.profiles.lock().unwrap().pop_front() {
            return next;
        }
        self.fallback
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ApiError::new(404, "Not Found"))
    }

    async fn link_platform(
        &self,
        request: &LinkRequest,
        cancel: Option<CancellationToken>,
    ) -> Result<(), ApiError> {
        if cancel.is_some_and(|token| token.is_cancelled()) {
            return Err(ApiError::cancelled());
        }
        self.links.lock().unwrap().push(request.clone());
        if let Some(state) = self.observer.lock().unwrap().as_ref() {
            self.seen_during_link
                .lock()
                .unwrap()
                .push(state.platform(request.platform));
        }
        match self.link_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn submit_profile_edit(&self, _id: &str, _edit: &ProfileEdit) -> Result<(), ApiError> {
        self.record_edit()
    }

    async fn submit_price_edit(
        &self,
        _id: &str,
        _platform: PlatformType,
        _edit: &PriceEdit,
    ) -> Result<(), ApiError> {
        self.record_edit()
    }

    async fn submit_coverage_edit(
        &self,
        _id: &str,
        _platform: PlatformType,
        _edit: &CoverageEdit,
    ) -> Result<(), ApiError> {
        self.record_edit()
    }
}
