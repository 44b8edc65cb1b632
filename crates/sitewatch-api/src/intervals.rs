// Check-interval endpoints

use tracing::debug;

use crate::client::{BackendClient, decode};
use crate::error::Error;
use crate::models::{CheckInterval, CreateIntervalRequest, RecordId, UpdateIntervalRequest};

impl BackendClient {
    /// Attach a check interval to a site.
    ///
    /// `POST /site_check_intervals/create`. If the response body is not a
    /// decodable interval the request itself is returned as the record.
    pub async fn create_interval(
        &self,
        request: &CreateIntervalRequest,
    ) -> Result<CheckInterval, Error> {
        let url = self.url("site_check_intervals/create")?;
        debug!(
            site_id = %request.site_url_id,
            seconds = request.time_interval,
            "creating interval"
        );
        let body = self.post(url, request).await?;
        Ok(decode(&body).unwrap_or_else(|e| {
            debug!(error = %e, "interval response not decodable, echoing request");
            CheckInterval {
                id: None,
                site_url_id: Some(request.site_url_id.clone()),
                time_interval: request.time_interval,
            }
        }))
    }

    /// List every interval record.
    ///
    /// `GET /site_check_intervals/fetch`
    pub async fn list_intervals(&self) -> Result<Vec<CheckInterval>, Error> {
        let url = self.url("site_check_intervals/fetch")?;
        debug!("listing intervals");
        self.get(url).await
    }

    /// Change an interval record in place.
    ///
    /// `PATCH /site_check_intervals/update?interval_id={id}`
    pub async fn update_interval(
        &self,
        id: &RecordId,
        request: &UpdateIntervalRequest,
    ) -> Result<CheckInterval, Error> {
        let url = self.url_with_query(
            "site_check_intervals/update",
            "interval_id",
            &id.to_string(),
        )?;
        debug!(interval_id = %id, ?request, "updating interval");
        self.patch(url, request).await
    }

    /// Delete an interval record.
    ///
    /// `DELETE /site_check_intervals/delete?interval_id={id}`
    pub async fn delete_interval(&self, id: &RecordId) -> Result<(), Error> {
        let url = self.url_with_query(
            "site_check_intervals/delete",
            "interval_id",
            &id.to_string(),
        )?;
        debug!(interval_id = %id, "deleting interval");
        self.delete(url).await
    }
}
