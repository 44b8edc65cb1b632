// Monitored-site endpoints
//
// `fetch` returns sites joined with their intervals and statuses; every
// other call is id-scoped through the `site_id` query parameter.

use tracing::debug;

use crate::client::{BackendClient, decode};
use crate::error::Error;
use crate::models::{CreateSiteRequest, RecordId, Site, SiteAggregate, UpdateSiteRequest};

impl BackendClient {
    /// Create a monitored site.
    ///
    /// `POST /monitored_sites/create`. The response must carry the new
    /// site's `id`; every follow-up record depends on it.
    pub async fn create_site(&self, request: &CreateSiteRequest) -> Result<Site, Error> {
        let url = self.url("monitored_sites/create")?;
        debug!(name = %request.site_name, url = %request.site_url, "creating site");
        let body = self.post(url, request).await?;
        decode(&body)
    }

    /// List every site with its interval and status history.
    ///
    /// `GET /monitored_sites/fetch`
    pub async fn list_sites(&self) -> Result<Vec<SiteAggregate>, Error> {
        let url = self.url("monitored_sites/fetch")?;
        debug!("listing sites");
        self.get(url).await
    }

    /// Fetch a single site with its history.
    ///
    /// `GET /monitored_sites/fetch?site_id={id}`. The backend answers with a
    /// one-element list, or 404 for an unknown id.
    pub async fn get_site(&self, id: &RecordId) -> Result<SiteAggregate, Error> {
        let url = self.url_with_query("monitored_sites/fetch", "site_id", &id.to_string())?;
        debug!(site_id = %id, "fetching site");
        let sites: Vec<SiteAggregate> = self.get(url).await?;
        sites.into_iter().next().ok_or_else(|| Error::Http {
            status: 404,
            message: format!("site {id} not found"),
        })
    }

    /// Rename a site or point it at a different URL.
    ///
    /// `PATCH /monitored_sites/update?site_id={id}`
    pub async fn update_site(
        &self,
        id: &RecordId,
        request: &UpdateSiteRequest,
    ) -> Result<SiteAggregate, Error> {
        let url = self.url_with_query("monitored_sites/update", "site_id", &id.to_string())?;
        debug!(site_id = %id, ?request, "updating site");
        self.patch(url, request).await
    }

    /// Delete a site.
    ///
    /// `DELETE /monitored_sites/delete?site_id={id}`. Success is the HTTP
    /// status alone; the body is ignored.
    pub async fn delete_site(&self, id: &RecordId) -> Result<(), Error> {
        let url = self.url_with_query("monitored_sites/delete", "site_id", &id.to_string())?;
        debug!(site_id = %id, "deleting site");
        self.delete(url).await
    }
}
