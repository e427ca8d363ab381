//! Optimistic platform linking.
//!
//! Adding a platform shows it immediately as pending and removes it again if
//! the backend refuses. Re-linking keeps the old data on screen with a
//! loading flag, waits for ingestion, and only then swaps the entry. At most
//! one operation per platform runs at a time; a second one is rejected.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use creatorlink_client::{CreatorApi, LinkRequest};
use creatorlink_core::{PlatformLink, PlatformType};
use tokio_util::sync::CancellationToken;

use crate::error::SyncError;
use crate::poller::IngestionPoller;
use crate::state::PlatformStore;

type InFlight = Arc<Mutex<HashSet<PlatformType>>>;

pub struct LinkRequestCoordinator {
    api: Arc<dyn CreatorApi>,
    poller: IngestionPoller,
    in_flight: InFlight,
}

/// Releases the platform's in-flight slot on drop, including on early return.
struct InFlightGuard {
    in_flight: InFlight,
    platform: PlatformType,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.platform);
    }
}

impl LinkRequestCoordinator {
    #[must_use]
    pub fn new(api: Arc<dyn CreatorApi>, poller: IngestionPoller) -> Self {
        Self {
            api,
            poller,
            in_flight: Arc::default(),
        }
    }

    #[must_use]
    pub fn is_in_flight(&self, platform: PlatformType) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&platform)
    }

    #[must_use]
    pub fn in_flight(&self) -> Vec<PlatformType> {
        let mut platforms: Vec<PlatformType> = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect();
        platforms.sort();
        platforms
    }

    fn begin(&self, platform: PlatformType) -> Result<InFlightGuard, SyncError> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(platform) {
            tracing::debug!(platform = %platform, "rejecting concurrent link operation");
            return Err(SyncError::OperationInProgress { platform });
        }
        Ok(InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
            platform,
        })
    }

    /// Links a platform that is not linked yet.
    ///
    /// The pending entry is in `store` before the request is sent and is
    /// removed again if the request fails. Ingestion is not awaited; the
    /// entry stays pending until a later load resolves it.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidUrl`] without touching `store` or the
    /// network when `profile_url` does not match the platform,
    /// [`SyncError::AlreadyLinked`], [`SyncError::OperationInProgress`], or
    /// the link request's error after rolling back.
    pub async fn add_platform(
        &self,
        blogger_id: &str,
        store: &dyn PlatformStore,
        platform: PlatformType,
        profile_url: &str,
        cancel: &CancellationToken,
    ) -> Result<(), SyncError> {
        let identifier = platform.parse_profile_url(profile_url)?;
        let _guard = self.begin(platform)?;
        if store.platform(platform).is_some() {
            return Err(SyncError::AlreadyLinked { platform });
        }

        let profile_url = profile_url.trim().to_string();
        store.upsert_platform(PlatformLink::optimistic(
            platform,
            identifier.clone(),
            profile_url.clone(),
        ));

        let request = LinkRequest {
            platform,
            blogger_id: blogger_id.to_string(),
            identifier,
            profile_url,
        };
        if let Err(err) = self.api.link_platform(&request, Some(cancel.clone())).await {
            store.remove_platform(platform);
            tracing::warn!(platform = %platform, error = %err, "link request failed, removed pending entry");
            return Err(err.into());
        }

        tracing::info!(platform = %platform, "platform link submitted");
        Ok(())
    }

    /// Re-links an already linked platform to a new profile URL.
    ///
    /// The existing entry keeps its data and is flagged as loading until
    /// ingestion of the new account finishes. On success the entry is
    /// replaced by the ingested one; on any failure the flag is cleared and
    /// the previous data stays.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidUrl`], [`SyncError::NotLinked`],
    /// [`SyncError::OperationInProgress`], the link request's error, or any
    /// error from [`IngestionPoller::wait_for_ingestion`].
    pub async fn update_platform(
        &self,
        blogger_id: &str,
        store: &dyn PlatformStore,
        platform: PlatformType,
        profile_url: &str,
        cancel: &CancellationToken,
    ) -> Result<PlatformLink, SyncError> {
        let identifier = platform.parse_profile_url(profile_url)?;
        let _guard = self.begin(platform)?;
        if !store.patch_platform(platform, &mut |link| link.is_loading = true) {
            return Err(SyncError::NotLinked { platform });
        }

        let request = LinkRequest {
            platform,
            blogger_id: blogger_id.to_string(),
            identifier,
            profile_url: profile_url.trim().to_string(),
        };
        let result = self.relink(&request, cancel).await;

        match result {
            Ok(link) => {
                store.upsert_platform(link.clone());
                tracing::info!(platform = %platform, "platform re-linked");
                Ok(link)
            }
            Err(err) => {
                store.patch_platform(platform, &mut |link| link.is_loading = false);
                tracing::warn!(platform = %platform, error = %err, "re-link failed, kept previous data");
                Err(err)
            }
        }
    }

    async fn relink(
        &self,
        request: &LinkRequest,
        cancel: &CancellationToken,
    ) -> Result<PlatformLink, SyncError> {
        self.api.link_platform(request, Some(cancel.clone())).await?;
        self.poller.wait_for_ingestion(request, cancel).await
    }
}
