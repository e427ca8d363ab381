//! Typed marketplace endpoints used by the sync layer.

use std::sync::Arc;

use async_trait::async_trait;
use creatorlink_core::{CoverageEdit, PlatformType, PriceEdit, ProfileEdit, ProfileResponse};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::ApiError;
use crate::gateway::{RequestGateway, RequestOptions};

/// Body of a platform link request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRequest {
    #[serde(skip)]
    pub platform: PlatformType,
    pub blogger_id: String,
    pub identifier: String,
    pub profile_url: String,
}

/// Remote operations the sync layer depends on.
///
/// Implemented by [`CreatorClient`] over HTTP; tests substitute in-memory
/// fakes.
#[async_trait]
pub trait CreatorApi: Send + Sync {
    /// Reads the full profile document including drafts.
    async fn fetch_profile(
        &self,
        blogger_id: &str,
        cancel: Option<CancellationToken>,
    ) -> Result<ProfileResponse, ApiError>;

    /// Asks the backend to link a platform; ingestion happens out of band.
    async fn link_platform(
        &self,
        request: &LinkRequest,
        cancel: Option<CancellationToken>,
    ) -> Result<(), ApiError>;

    async fn submit_profile_edit(&self, blogger_id: &str, edit: &ProfileEdit)
        -> Result<(), ApiError>;

    async fn submit_price_edit(
        &self,
        blogger_id: &str,
        platform: PlatformType,
        edit: &PriceEdit,
    ) -> Result<(), ApiError>;

    async fn submit_coverage_edit(
        &self,
        blogger_id: &str,
        platform: PlatformType,
        edit: &CoverageEdit,
    ) -> Result<(), ApiError>;
}

/// HTTP implementation of [`CreatorApi`].
#[derive(Clone)]
pub struct CreatorClient {
    gateway: Arc<RequestGateway>,
}

impl CreatorClient {
    #[must_use]
    pub fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }

    #[must_use]
    pub fn gateway(&self) -> &RequestGateway {
        &self.gateway
    }

    fn profile_path(blogger_id: &str) -> String {
        format!("/bloggers/{blogger_id}")
    }

    async fn patch(&self, endpoint: &str, body: &impl Serialize) -> Result<(), ApiError> {
        let body = serde_json::to_value(body)
            .map_err(|e| ApiError::transport(format!("could not encode body: {e}")))?;
        self.gateway
            .request::<serde_json::Value>(endpoint, RequestOptions::patch_json(body))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CreatorApi for CreatorClient {
    async fn fetch_profile(
        &self,
        blogger_id: &str,
        cancel: Option<CancellationToken>,
    ) -> Result<ProfileResponse, ApiError> {
        self.gateway
            .request::<ProfileResponse>(
                &Self::profile_path(blogger_id),
                RequestOptions::get().with_cancel(cancel),
            )
            .await?
            .ok_or_else(|| ApiError::transport("Empty profile response"))
    }

    async fn link_platform(
        &self,
        request: &LinkRequest,
        cancel: Option<CancellationToken>,
    ) -> Result<(), ApiError> {
        let body = serde_json::to_value(request)
            .map_err(|e| ApiError::transport(format!("could not encode body: {e}")))?;
        self.gateway
            .request::<serde_json::Value>(
                request.platform.link_endpoint(),
                RequestOptions::post_json(body).with_cancel(cancel),
            )
            .await?;
        tracing::info!(
            platform = %request.platform,
            blogger_id = %request.blogger_id,
            "platform link request accepted"
        );
        Ok(())
    }

    async fn submit_profile_edit(
        &self,
        blogger_id: &str,
        edit: &ProfileEdit,
    ) -> Result<(), ApiError> {
        self.patch(&Self::profile_path(blogger_id), edit).await
    }

    async fn submit_price_edit(
        &self,
        blogger_id: &str,
        platform: PlatformType,
        edit: &PriceEdit,
    ) -> Result<(), ApiError> {
        let endpoint = format!("/bloggers/{blogger_id}/prices/{}", platform.as_str());
        self.patch(&endpoint, edit).await
    }

    async fn submit_coverage_edit(
        &self,
        blogger_id: &str,
        platform: PlatformType,
        edit: &CoverageEdit,
    ) -> Result<(), ApiError> {
        let endpoint = format!("/bloggers/{blogger_id}/coverage/{}", platform.as_str());
        self.patch(&endpoint, edit).await
    }
}
