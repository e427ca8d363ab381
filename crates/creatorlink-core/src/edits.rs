//! Edit payloads submitted through the write path.
//!
//! Each edit is sparse: `None` fields are not sent and leave the current
//! value alone. Applying an edit to a view is how the sync layer shows the
//! change before the backend confirms it.

use serde::Serialize;

use crate::platform::PlatformType;
use crate::view::{MergedProfileView, PlatformSnapshot};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_barter_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_in_registry: Option<bool>,
}

impl ProfileEdit {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, view: &mut MergedProfileView) {
        if let Some(name) = &self.name {
            view.name = Some(name.clone());
        }
        if let Some(link) = &self.contact_link {
            view.contact_link = Some(link.clone());
        }
        if let Some(format) = &self.work_format {
            view.work_format = Some(format.clone());
        }
        if let Some(gender) = &self.gender {
            view.gender = Some(gender.clone());
        }
        if let Some(barter) = self.is_barter_available {
            view.is_barter_available = Some(barter);
        }
        if let Some(registry) = self.is_in_registry {
            view.is_in_registry = Some(registry);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integration_price: Option<u64>,
}

impl PriceEdit {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns `false` when the platform is not in the view.
    pub fn apply_to(&self, view: &mut MergedProfileView, platform: PlatformType) -> bool {
        let Some(link) = view.platforms.get_mut(&platform) else {
            return false;
        };
        let snapshot = link.snapshot.get_or_insert_with(PlatformSnapshot::default);
        if let Some(price) = self.post_price {
            snapshot.post_price = Some(price);
        }
        if let Some(price) = self.story_price {
            snapshot.story_price = Some(price);
        }
        if let Some(price) = self.integration_price {
            snapshot.integration_price = Some(price);
        }
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_reach: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_reach: Option<u64>,
}

impl CoverageEdit {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns `false` when the platform is not in the view.
    pub fn apply_to(&self, view: &mut MergedProfileView, platform: PlatformType) -> bool {
        let Some(link) = view.platforms.get_mut(&platform) else {
            return false;
        };
        let snapshot = link.snapshot.get_or_insert_with(PlatformSnapshot::default);
        if let Some(reach) = self.post_reach {
            snapshot.post_reach = Some(reach);
        }
        if let Some(reach) = self.story_reach {
            snapshot.story_reach = Some(reach);
        }
        true
    }
}
