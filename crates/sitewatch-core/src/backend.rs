// ── Backend seam ──
//
// The orchestrator only needs a handful of calls. Keeping them behind a
// trait lets tests swap in an in-memory backend.

use async_trait::async_trait;

use sitewatch_api::{
    BackendClient, CheckInterval, CreateIntervalRequest, CreateSiteRequest, CreateStatusRequest,
    RecordId, Site, SiteAggregate, StatusRecord, UpdateSiteRequest,
};

use crate::error::CoreError;

/// Persistence operations the monitoring workflows depend on.
#[async_trait]
pub trait MonitorBackend: Send + Sync {
    async fn create_site(&self, request: &CreateSiteRequest) -> Result<Site, CoreError>;

    async fn list_sites(&self) -> Result<Vec<SiteAggregate>, CoreError>;

    /// Fails with [`CoreError::SiteNotFound`] for an unknown id.
    async fn get_site(&self, id: &RecordId) -> Result<SiteAggregate, CoreError>;

    async fn update_site(
        &self,
        id: &RecordId,
        request: &UpdateSiteRequest,
    ) -> Result<SiteAggregate, CoreError>;

    async fn delete_site(&self, id: &RecordId) -> Result<(), CoreError>;

    async fn create_interval(
        &self,
        request: &CreateIntervalRequest,
    ) -> Result<CheckInterval, CoreError>;

    async fn create_status(&self, request: &CreateStatusRequest)
    -> Result<StatusRecord, CoreError>;
}

#[async_trait]
impl MonitorBackend for BackendClient {
    async fn create_site(&self, request: &CreateSiteRequest) -> Result<Site, CoreError> {
        Ok(BackendClient::create_site(self, request).await?)
    }

    async fn list_sites(&self) -> Result<Vec<SiteAggregate>, CoreError> {
        Ok(BackendClient::list_sites(self).await?)
    }

    async fn get_site(&self, id: &RecordId) -> Result<SiteAggregate, CoreError> {
        BackendClient::get_site(self, id)
            .await
            .map_err(|e| CoreError::from(e).for_site(id))
    }

    async fn update_site(
        &self,
        id: &RecordId,
        request: &UpdateSiteRequest,
    ) -> Result<SiteAggregate, CoreError> {
        BackendClient::update_site(self, id, request)
            .await
            .map_err(|e| CoreError::from(e).for_site(id))
    }

    async fn delete_site(&self, id: &RecordId) -> Result<(), CoreError> {
        BackendClient::delete_site(self, id)
            .await
            .map_err(|e| CoreError::from(e).for_site(id))
    }

    async fn create_interval(
        &self,
        request: &CreateIntervalRequest,
    ) -> Result<CheckInterval, CoreError> {
        Ok(BackendClient::create_interval(self, request).await?)
    }

    async fn create_status(
        &self,
        request: &CreateStatusRequest,
    ) -> Result<StatusRecord, CoreError> {
        Ok(BackendClient::create_status(self, request).await?)
    }
}
