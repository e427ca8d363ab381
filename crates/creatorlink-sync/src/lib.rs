//! Profile synchronization for creatorlink.
//!
//! Reconciles published data with pending drafts, coordinates optimistic
//! platform linking, and waits for the backend's ingestion job by polling.
//! [`ProfileSync`] is the entry point front ends talk to; it owns the only
//! mutable copy of the profile view.

pub mod coordinator;
pub mod error;
pub mod facade;
pub mod poller;
pub mod reconcile;
pub mod state;

#[cfg(test)]
mod test_support;

pub use coordinator::LinkRequestCoordinator;
pub use error::SyncError;
pub use facade::ProfileSync;
pub use poller::IngestionPoller;
pub use reconcile::{reconcile, reconcile_response};
pub use state::{PlatformStore, ProfileState};
