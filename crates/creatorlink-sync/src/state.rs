//! The single mutable copy of the merged view.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use creatorlink_core::{MergedProfileView, PlatformLink, PlatformType};

/// Write access to the platform map, handed to the link coordinator so it
/// can insert, patch and roll back entries without owning the view.
pub trait PlatformStore: Send + Sync {
    fn platform(&self, platform: PlatformType) -> Option<PlatformLink>;

    fn upsert_platform(&self, link: PlatformLink);

    fn remove_platform(&self, platform: PlatformType);

    /// Runs `patch` on the entry if there is one. Returns whether it existed.
    fn patch_platform(&self, platform: PlatformType, patch: &mut dyn FnMut(&mut PlatformLink))
        -> bool;
}

#[derive(Debug, Default)]
pub struct ProfileState {
    view: RwLock<Option<MergedProfileView>>,
    awaiting_moderation: AtomicBool,
}

impl ProfileState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone of the current view, `None` before the first load.
    #[must_use]
    pub fn snapshot(&self) -> Option<MergedProfileView> {
        self.view
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.view
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn replace(&self, view: MergedProfileView) {
        *self.view.write().unwrap_or_else(PoisonError::into_inner) = Some(view);
    }

    /// Applies `f` to the loaded view. Returns `None` when nothing is loaded.
    pub fn modify<R>(&self, f: impl FnOnce(&mut MergedProfileView) -> R) -> Option<R> {
        self.view
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
            .map(f)
    }

    #[must_use]
    pub fn awaiting_moderation(&self) -> bool {
        self.awaiting_moderation.load(Ordering::Acquire)
    }

    pub fn set_awaiting_moderation(&self, pending: bool) {
        self.awaiting_moderation.store(pending, Ordering::Release);
    }
}

impl PlatformStore for ProfileState {
    fn platform(&self, platform: PlatformType) -> Option<PlatformLink> {
        self.view
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|view| view.platform(platform).cloned())
    }

    fn upsert_platform(&self, link: PlatformLink) {
        let mut guard = self.view.write().unwrap_or_else(PoisonError::into_inner);
        guard
            .get_or_insert_with(MergedProfileView::default)
            .platforms
            .insert(link.platform_type, link);
    }

    fn remove_platform(&self, platform: PlatformType) {
        self.modify(|view| view.platforms.remove(&platform));
    }

    fn patch_platform(
        &self,
        platform: PlatformType,
        patch: &mut dyn FnMut(&mut PlatformLink),
    ) -> bool {
        self.modify(|view| view.platforms.get_mut(&platform).map(|link| patch(link)))
            .flatten()
            .is_some()
    }
}
