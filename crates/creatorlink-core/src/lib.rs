//! Shared configuration and domain types for creatorlink.
//!
//! Holds the platform catalogue, the profile wire format returned by the
//! marketplace backend, the merged view consumed by front ends, and the
//! environment-driven [`AppConfig`].

pub mod app_config;
pub mod config;
pub mod edits;
pub mod platform;
pub mod profile;
pub mod view;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use edits::{CoverageEdit, PriceEdit, ProfileEdit};
pub use platform::{PlatformType, PlatformUrlError};
pub use profile::{
    CoverageDraft, DraftSet, PlatformRecord, PriceDraft, ProfileDraft, ProfileResponse,
    PublishedProfile, Screenshot,
};
pub use view::{MergedProfileView, PlatformLink, PlatformSnapshot};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
