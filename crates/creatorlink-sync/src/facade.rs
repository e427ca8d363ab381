//! Entry point for front ends: load, inspect and edit one creator profile.

use std::future::Future;
use std::sync::Arc;

use creatorlink_client::{ApiError, CreatorApi};
use creatorlink_core::{
    AppConfig, CoverageEdit, MergedProfileView, PlatformLink, PlatformType, PriceEdit,
    ProfileEdit,
};
use tokio_util::sync::CancellationToken;

use crate::coordinator::LinkRequestCoordinator;
use crate::error::SyncError;
use crate::poller::IngestionPoller;
use crate::reconcile::reconcile_response;
use crate::state::ProfileState;

pub struct ProfileSync {
    api: Arc<dyn CreatorApi>,
    blogger_id: String,
    state: Arc<ProfileState>,
    coordinator: LinkRequestCoordinator,
}

impl ProfileSync {
    #[must_use]
    pub fn new(api: Arc<dyn CreatorApi>, blogger_id: impl Into<String>, poller: IngestionPoller) -> Self {
        Self {
            coordinator: LinkRequestCoordinator::new(Arc::clone(&api), poller),
            api,
            blogger_id: blogger_id.into(),
            state: Arc::new(ProfileState::new()),
        }
    }

    #[must_use]
    pub fn from_config(
        api: Arc<dyn CreatorApi>,
        blogger_id: impl Into<String>,
        config: &AppConfig,
    ) -> Self {
        let poller = IngestionPoller::from_config(Arc::clone(&api), config);
        Self::new(api, blogger_id, poller)
    }

    #[must_use]
    pub fn blogger_id(&self) -> &str {
        &self.blogger_id
    }

    #[must_use]
    pub fn state(&self) -> Arc<ProfileState> {
        Arc::clone(&self.state)
    }

    /// Current merged view, `None` before the first successful load.
    #[must_use]
    pub fn view(&self) -> Option<MergedProfileView> {
        self.state.snapshot()
    }

    /// Whether the last load saw drafts awaiting moderation.
    #[must_use]
    pub fn awaiting_moderation(&self) -> bool {
        self.state.awaiting_moderation()
    }

    /// Fetches the profile and replaces the view with the reconciled result.
    ///
    /// Entries for platforms with a link operation in flight are carried over
    /// from the current view so their loading state is not lost.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; the current view is left untouched.
    pub async fn load(&self) -> Result<MergedProfileView, SyncError> {
        let response = self.api.fetch_profile(&self.blogger_id, None).await?;
        let mut view = reconcile_response(&response);

        if let Some(current) = self.state.snapshot() {
            for platform in self.coordinator.in_flight() {
                match current.platforms.get(&platform) {
                    Some(link) => {
                        view.platforms.insert(platform, link.clone());
                    }
                    None => {
                        view.platforms.remove(&platform);
                    }
                }
            }
        }

        self.state.set_awaiting_moderation(response.drafts.has_pending_changes());
        self.state.replace(view.clone());
        tracing::debug!(
            blogger_id = %self.blogger_id,
            platforms = view.platforms.len(),
            "profile loaded"
        );
        Ok(view)
    }

    /// See [`LinkRequestCoordinator::add_platform`].
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotLoaded`] before the first load, otherwise the
    /// coordinator's errors.
    pub async fn add_platform(&self, platform: PlatformType, profile_url: &str) -> Result<(), SyncError> {
        self.add_platform_with_cancel(platform, profile_url, &CancellationToken::new())
            .await
    }

    /// Like [`Self::add_platform`], aborting the link request when `cancel` fires.
    ///
    /// # Errors
    ///
    /// As [`Self::add_platform`], plus [`SyncError::Cancelled`]. The pending
    /// entry is removed in that case.
    pub async fn add_platform_with_cancel(
        &self,
        platform: PlatformType,
        profile_url: &str,
        cancel: &CancellationToken,
    ) -> Result<(), SyncError> {
        self.ensure_loaded()?;
        self.coordinator
            .add_platform(&self.blogger_id, self.state.as_ref(), platform, profile_url, cancel)
            .await
    }

    /// See [`LinkRequestCoordinator::update_platform`].
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotLoaded`] before the first load, otherwise the
    /// coordinator's errors.
    pub async fn update_platform(
        &self,
        platform: PlatformType,
        profile_url: &str,
    ) -> Result<PlatformLink, SyncError> {
        self.update_platform_with_cancel(platform, profile_url, &CancellationToken::new())
            .await
    }

    /// Like [`Self::update_platform`], stopping early when `cancel` fires.
    ///
    /// # Errors
    ///
    /// As [`Self::update_platform`], plus [`SyncError::Cancelled`].
    pub async fn update_platform_with_cancel(
        &self,
        platform: PlatformType,
        profile_url: &str,
        cancel: &CancellationToken,
    ) -> Result<PlatformLink, SyncError> {
        self.ensure_loaded()?;
        self.coordinator
            .update_platform(&self.blogger_id, self.state.as_ref(), platform, profile_url, cancel)
            .await
    }

    /// Submits profile-level field changes.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotLoaded`] or the submit error, after restoring
    /// the edited fields.
    pub async fn update_profile(&self, edit: &ProfileEdit) -> Result<MergedProfileView, SyncError> {
        if edit.is_empty() {
            return self.state.snapshot().ok_or(SyncError::NotLoaded);
        }
        self.submit_optimistic(
            |view| {
                edit.apply_to(view);
                Ok(())
            },
            restore_profile_fields,
            self.api.submit_profile_edit(&self.blogger_id, edit),
        )
        .await
    }

    /// Submits new prices for one linked platform.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotLinked`] when the platform has no entry,
    /// otherwise as [`Self::update_profile`].
    pub async fn update_prices(
        &self,
        platform: PlatformType,
        edit: &PriceEdit,
    ) -> Result<MergedProfileView, SyncError> {
        if edit.is_empty() {
            return self.state.snapshot().ok_or(SyncError::NotLoaded);
        }
        self.submit_optimistic(
            |view| linked(edit.apply_to(view, platform), platform),
            |view, previous| restore_snapshot(view, previous, platform),
            self.api.submit_price_edit(&self.blogger_id, platform, edit),
        )
        .await
    }

    /// Submits new reach figures for one linked platform.
    ///
    /// # Errors
    ///
    /// As [`Self::update_prices`].
    pub async fn update_coverage(
        &self,
        platform: PlatformType,
        edit: &CoverageEdit,
    ) -> Result<MergedProfileView, SyncError> {
        if edit.is_empty() {
            return self.state.snapshot().ok_or(SyncError::NotLoaded);
        }
        self.submit_optimistic(
            |view| linked(edit.apply_to(view, platform), platform),
            |view, previous| restore_snapshot(view, previous, platform),
            self.api.submit_coverage_edit(&self.blogger_id, platform, edit),
        )
        .await
    }

    fn ensure_loaded(&self) -> Result<(), SyncError> {
        if self.state.is_loaded() {
            Ok(())
        } else {
            Err(SyncError::NotLoaded)
        }
    }

    /// Applies an edit to the view, submits it, and reloads on success.
    ///
    /// Nothing is sent when `apply` fails. On a submit failure only the
    /// fields `restore` touches are put back, so concurrent platform changes
    /// survive the rollback.
    async fn submit_optimistic<A, R, F>(
        &self,
        apply: A,
        restore: R,
        submit: F,
    ) -> Result<MergedProfileView, SyncError>
    where
        A: FnOnce(&mut MergedProfileView) -> Result<(), SyncError>,
        R: FnOnce(&mut MergedProfileView, &MergedProfileView),
        F: Future<Output = Result<(), ApiError>>,
    {
        let previous = self.state.snapshot().ok_or(SyncError::NotLoaded)?;
        self.state.modify(apply).ok_or(SyncError::NotLoaded)??;

        if let Err(err) = submit.await {
            self.state.modify(|view| restore(view, &previous));
            tracing::warn!(blogger_id = %self.blogger_id, error = %err, "edit rejected, rolled back");
            return Err(err.into());
        }

        match self.load().await {
            Ok(view) => Ok(view),
            Err(err) => {
                tracing::warn!(
                    blogger_id = %self.blogger_id,
                    error = %err,
                    "edit saved but reload failed, keeping local view"
                );
                self.state.snapshot().ok_or(SyncError::NotLoaded)
            }
        }
    }
}

fn linked(applied: bool, platform: PlatformType) -> Result<(), SyncError> {
    if applied {
        Ok(())
    } else {
        Err(SyncError::NotLinked { platform })
    }
}

fn restore_profile_fields(view: &mut MergedProfileView, previous: &MergedProfileView) {
    view.name.clone_from(&previous.name);
    view.contact_link.clone_from(&previous.contact_link);
    view.work_format.clone_from(&previous.work_format);
    view.gender.clone_from(&previous.gender);
    view.is_barter_available = previous.is_barter_available;
    view.is_in_registry = previous.is_in_registry;
}

fn restore_snapshot(view: &mut MergedProfileView, previous: &MergedProfileView, platform: PlatformType) {
    if let (Some(link), Some(before)) = (
        view.platforms.get_mut(&platform),
        previous.platforms.get(&platform),
    ) {
        link.snapshot.clone_from(&before.snapshot);
    }
}

#[cfg(test)]
#[path = "facade_test.rs"]
mod tests;
