//! Waits for the backend to finish ingesting a freshly linked platform.
//!
//! Linking returns before the platform's metrics exist. The only completion
//! signal is the subscriber count leaving `"0"`, so the poller re-fetches
//! the profile on a fixed interval until it does or the attempt budget runs
//! out.
//!
//! During a re-link the previous account usually stays published until the
//! new one is approved, so only records pointing at the requested account
//! count towards completion.

use std::sync::Arc;
use std::time::Duration;

use creatorlink_client::{CreatorApi, LinkRequest};
use creatorlink_core::{AppConfig, PlatformLink, PlatformRecord, ProfileResponse};
use tokio_util::sync::CancellationToken;

use crate::error::SyncError;
use crate::reconcile::reconcile_response;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

#[derive(Clone)]
pub struct IngestionPoller {
    api: Arc<dyn CreatorApi>,
    interval: Duration,
    max_attempts: u32,
}

impl IngestionPoller {
    #[must_use]
    pub fn new(api: Arc<dyn CreatorApi>) -> Self {
        Self {
            api,
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    #[must_use]
    pub fn from_config(api: Arc<dyn CreatorApi>, config: &AppConfig) -> Self {
        Self::new(api)
            .with_interval(config.poll_interval())
            .with_max_attempts(config.poll_max_attempts)
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Polls until the account named by `request` shows ingested data and
    /// returns its resolved entry.
    ///
    /// Each attempt sleeps first, then fetches. A failed fetch ends polling
    /// with that error; there is no retry inside the budget.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::IngestionTimeout`] when the budget is spent,
    /// [`SyncError::Cancelled`] when `cancel` fires, or the fetch error.
    pub async fn wait_for_ingestion(
        &self,
        request: &LinkRequest,
        cancel: &CancellationToken,
    ) -> Result<PlatformLink, SyncError> {
        let platform = request.platform;
        for attempt in 1..=self.max_attempts {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::debug!(platform = %platform, attempt, "ingestion polling cancelled");
                    return Err(SyncError::Cancelled);
                }
                () = tokio::time::sleep(self.interval) => {}
            }

            let profile = self
                .api
                .fetch_profile(&request.blogger_id, Some(cancel.clone()))
                .await
                .map_err(|err| {
                    tracing::warn!(
                        platform = %platform,
                        attempt,
                        error = %err,
                        "profile fetch failed while polling ingestion"
                    );
                    SyncError::from(err)
                })?;

            if let Some(link) = ingested_link(&profile, request) {
                tracing::info!(platform = %platform, attempt, "platform ingestion finished");
                return Ok(link);
            }
            tracing::debug!(platform = %platform, attempt, "platform not ingested yet");
        }

        tracing::warn!(
            platform = %platform,
            attempts = self.max_attempts,
            "gave up waiting for platform ingestion"
        );
        Err(SyncError::IngestionTimeout {
            platform,
            attempts: self.max_attempts,
        })
    }
}

/// The requested account's entry, once a record for it carries real numbers.
///
/// Published records are checked before drafts. When the match is what the
/// merged view shows, that entry is returned so price and coverage drafts
/// stay applied.
fn ingested_link(profile: &ProfileResponse, request: &LinkRequest) -> Option<PlatformLink> {
    let published = profile.published.social.iter().map(|r| (r, false));
    let drafts = profile.drafts.social_media_drafts.iter().rev().map(|r| (r, true));
    let link = published
        .chain(drafts)
        .filter(|(record, _)| points_at(record, request))
        .map(|(record, pending)| PlatformLink::from_record(record, pending))
        .find(PlatformLink::is_ingested)?;

    let view = reconcile_response(profile);
    match view.platform(request.platform) {
        Some(merged) if merged.profile_url == link.profile_url && merged.is_ingested() => {
            Some(merged.clone())
        }
        _ => Some(link),
    }
}

fn points_at(record: &PlatformRecord, request: &LinkRequest) -> bool {
    if record.platform_type != request.platform {
        return false;
    }
    if same_url(&record.profile_url, &request.profile_url) {
        return true;
    }
    record
        .identifier
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
        .or_else(|| request.platform.parse_profile_url(&record.profile_url).ok())
        .is_some_and(|id| id.eq_ignore_ascii_case(request.identifier.trim()))
}

fn same_url(a: &str, b: &str) -> bool {
    let normalize = |url: &str| url.trim().trim_end_matches('/').to_ascii_lowercase();
    normalize(a) == normalize(b)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use creatorlink_client::ApiError;
    use creatorlink_core::{PlatformType, PriceDraft};
    use tokio::time::Instant;

    use super::*;
    use crate::test_support::{drafted, link_request, published, record, FakeApi};

    const URL: &str = "https://instagram.com/jane";
    const OLD_URL: &str = "https://instagram.com/jane_old";

    fn poller(api: &Arc<FakeApi>) -> IngestionPoller {
        IngestionPoller::new(Arc::clone(api) as Arc<dyn CreatorApi>)
    }

    fn target() -> LinkRequest {
        link_request(PlatformType::Instagram, URL)
    }

    /// Old account still published, new one waiting in drafts.
    fn relinking(new_subscribers: &str) -> ProfileResponse {
        let mut response = published(vec![record(PlatformType::Instagram, OLD_URL, "100")]);
        response
            .drafts
            .social_media_drafts
            .push(record(PlatformType::Instagram, URL, new_subscribers));
        response
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_exactly_max_attempts() {
        let api = Arc::new(FakeApi::default());
        api.set_fallback(drafted(vec![record(PlatformType::Instagram, URL, "0")]));
        let start = Instant::now();

        let err = poller(&api)
            .wait_for_ingestion(&target(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SyncError::IngestionTimeout {
                platform: PlatformType::Instagram,
                attempts: 60
            }
        ));
        assert_eq!(api.fetch_count(), 60);
        assert_eq!(start.elapsed(), Duration::from_secs(300));
    }

    #[tokio::test(start_paused = true)]
    async fn resolves_on_third_attempt_and_stops() {
        let api = Arc::new(FakeApi::default());
        api.queue_profile(Ok(drafted(vec![record(PlatformType::Instagram, URL, "0")])));
        api.queue_profile(Ok(drafted(vec![record(PlatformType::Instagram, URL, "0")])));
        api.set_fallback(published(vec![record(PlatformType::Instagram, URL, "12500")]));

        let link = poller(&api)
            .wait_for_ingestion(&target(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(api.fetch_count(), 3);
        assert!(!link.is_pending);
        assert!(!link.is_loading);
        assert_eq!(
            link.snapshot.unwrap().subscribers.as_deref(),
            Some("12500")
        );

        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(api.fetches.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn draft_with_ingested_data_counts_as_done() {
        let api = Arc::new(FakeApi::default());
        api.set_fallback(drafted(vec![record(PlatformType::Instagram, URL, "800")]));

        let link = poller(&api)
            .wait_for_ingestion(&target(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(api.fetch_count(), 1);
        assert!(!link.is_pending);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_error_stops_polling() {
        let api = Arc::new(FakeApi::default());
        api.queue_profile(Ok(drafted(vec![record(PlatformType::Instagram, URL, "0")])));
        api.queue_profile(Err(ApiError::new(503, "Service Unavailable")));
        api.set_fallback(published(vec![record(PlatformType::Instagram, URL, "100")]));

        let err = poller(&api)
            .wait_for_ingestion(&target(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Api(ref e) if e.status_code == 503));
        assert_eq!(api.fetch_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_ends_the_wait() {
        let api = Arc::new(FakeApi::default());
        api.set_fallback(drafted(vec![record(PlatformType::Instagram, URL, "0")]));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(12)).await;
            trigger.cancel();
        });

        let err = poller(&api)
            .with_max_attempts(10)
            .wait_for_ingestion(&target(), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Cancelled));
        assert_eq!(api.fetch_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn published_old_account_does_not_complete_relink() {
        let api = Arc::new(FakeApi::default());
        api.queue_profile(Ok(relinking("0")));
        api.set_fallback(relinking("4200"));

        let link = poller(&api)
            .wait_for_ingestion(&target(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(api.fetch_count(), 2);
        assert_eq!(link.profile_url, URL);
        assert!(!link.is_pending);
        assert_eq!(
            link.snapshot.unwrap().subscribers.as_deref(),
            Some("4200")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn relink_times_out_while_only_old_account_has_data() {
        let api = Arc::new(FakeApi::default());
        api.set_fallback(relinking("0"));

        let err = poller(&api)
            .with_max_attempts(4)
            .wait_for_ingestion(&target(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(api.fetch_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn published_new_account_keeps_price_drafts() {
        let api = Arc::new(FakeApi::default());
        let mut response = published(vec![record(PlatformType::Instagram, URL, "900")]);
        response.drafts.price_draft.push(PriceDraft {
            platform_type: PlatformType::Instagram,
            post_price: Some(70),
            story_price: None,
            integration_price: None,
        });
        api.set_fallback(response);

        let link = poller(&api)
            .wait_for_ingestion(&target(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(link.snapshot.unwrap().post_price, Some(70));
    }

    #[test]
    fn records_match_by_url_or_identifier() {
        let request = target();
        assert!(points_at(
            &record(PlatformType::Instagram, "https://www.instagram.com/Jane/", "0"),
            &request
        ));
        assert!(points_at(
            &record(PlatformType::Instagram, "HTTPS://instagram.com/jane/", "0"),
            &request
        ));

        let mut by_id = record(PlatformType::Instagram, "", "0");
        by_id.identifier = Some("JANE".to_string());
        assert!(points_at(&by_id, &request));

        assert!(!points_at(&record(PlatformType::Instagram, OLD_URL, "0"), &request));
        assert!(!points_at(
            &record(PlatformType::Tiktok, "https://www.tiktok.com/@jane", "0"),
            &request
        ));
    }

    #[test]
    fn builder_overrides_defaults() {
        let api: Arc<dyn CreatorApi> = Arc::new(FakeApi::default());
        let poller = IngestionPoller::new(api)
            .with_interval(Duration::from_millis(10))
            .with_max_attempts(3);
        assert_eq!(poller.interval(), Duration::from_millis(10));
        assert_eq!(poller.max_attempts(), 3);
    }
}
