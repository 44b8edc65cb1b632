// Site-status endpoints

use tracing::debug;

use crate::client::{BackendClient, decode};
use crate::error::Error;
use crate::models::{CreateStatusRequest, RecordId, StatusRecord};

impl BackendClient {
    /// Record the outcome of a reachability check.
    ///
    /// `POST /site_status/create`. An undecodable response body falls back
    /// to echoing the request, as for intervals.
    pub async fn create_status(
        &self,
        request: &CreateStatusRequest,
    ) -> Result<StatusRecord, Error> {
        let url = self.url("site_status/create")?;
        debug!(site_id = %request.site_url_id, up = request.status, "creating status");
        let body = self.post(url, request).await?;
        Ok(decode(&body).unwrap_or_else(|e| {
            debug!(error = %e, "status response not decodable, echoing request");
            StatusRecord {
                id: None,
                site_url_id: Some(request.site_url_id.clone()),
                status: request.status,
            }
        }))
    }

    /// List every status record.
    ///
    /// `GET /site_status/fetch`
    pub async fn list_statuses(&self) -> Result<Vec<StatusRecord>, Error> {
        let url = self.url("site_status/fetch")?;
        debug!("listing statuses");
        self.get(url).await
    }

    /// Delete a status record.
    ///
    /// `DELETE /site_status/delete?status_id={id}`
    pub async fn delete_status(&self, id: &RecordId) -> Result<(), Error> {
        let url = self.url_with_query("site_status/delete", "status_id", &id.to_string())?;
        debug!(status_id = %id, "deleting status");
        self.delete(url).await
    }
}
