//! HTTP plumbing for the creatorlink marketplace API.
//!
//! [`TokenResolver`] picks the one credential attached to each request,
//! [`RequestGateway`] executes calls and folds every failure into
//! [`ApiError`], and [`CreatorClient`] exposes the typed endpoints the sync
//! layer needs through the [`CreatorApi`] trait.

pub mod api;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod response;
pub mod token;

pub use api::{CreatorApi, CreatorClient, LinkRequest};
pub use credentials::{
    Credential, CredentialKind, CredentialStore, FileCredentialStore, MemoryCredentialStore,
};
pub use error::{ApiError, ApiErrorKind, CredentialStoreError, FieldError, IdentityError};
pub use gateway::{LogNavigator, Navigator, RequestBody, RequestGateway, RequestOptions};
pub use response::{ApiResponse, ErrorData};
pub use token::{IdentityProvider, StaticIdentityProvider, TokenResolver};
