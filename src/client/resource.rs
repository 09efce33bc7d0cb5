use std::collections::HashSet;
use std::fmt::Display;
use std::marker::PhantomData;

use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{parse_page, AccessPolicy, ApiClient, Resource};
use crate::error::ClientError;

/// Type-safe CRUD client for one admin resource.
///
/// Collection URL is `{base_url}{admin_prefix}/{T::PATH}/`, items live at
/// `{collection}{id}/`.
pub struct ResourceClient<T: Resource> {
    api: ApiClient,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: Resource> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self::new(self.api.clone())
    }
}

impl<T: Resource> ResourceClient<T> {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            _phantom: PhantomData,
        }
    }

    pub fn collection_url(&self) -> Result<Url, ClientError> {
        self.api.admin_url(T::PATH)
    }

    /// `{collection}{id}/`; ids that would step outside the collection are refused
    pub fn item_url(&self, id: impl Display) -> Result<Url, ClientError> {
        let id = id.to_string();
        if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\', '?', '#', '%']) {
            return Err(ClientError::InvalidId(id));
        }
        Ok(self.collection_url()?.join(&format!("{}/", id))?)
    }

    /// Status code and raw body of a failed response
    async fn failure(resp: reqwest::Response) -> (u16, String) {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        (status, body)
    }

    fn suppressed(status: StatusCode) -> bool {
        T::ACCESS == AccessPolicy::Degraded
            && (status == StatusCode::FORBIDDEN || status == StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Every record of the collection.
    ///
    /// Follows `next` links until exhausted and concatenates the pages. A link
    /// already fetched ends the walk, as does `api.max_pages` or a link to
    /// another origin (the bearer token stays with the configured server).
    pub async fn list(&self) -> Result<Vec<T>, ClientError> {
        let max_pages = self.api.config().api.max_pages.max(1);
        let start = self.collection_url()?;
        let origin = start.origin();
        let mut items = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(start);

        while let Some(url) = next.take() {
            if url.origin() != origin {
                warn!(resource = T::LABEL, %url, "next link leaves the API origin, stopping");
                break;
            }
            if !seen.insert(url.to_string()) {
                warn!(resource = T::LABEL, %url, "pagination loop detected, stopping");
                break;
            }
            if seen.len() > max_pages {
                warn!(resource = T::LABEL, max_pages, "page limit reached, list truncated");
                break;
            }

            let resp = self.api.request(Method::GET, url.clone(), true).send().await?;
            let status = resp.status();
            if !status.is_success() {
                if Self::suppressed(status) {
                    warn!(
                        resource = T::LABEL,
                        status = status.as_u16(),
                        "no access to resource, showing it as empty"
                    );
                    return Ok(Vec::new());
                }
                let (code, body) = Self::failure(resp).await;
                return Err(ClientError::from_status(code, &body));
            }

            let body: Value = ApiClient::decode(resp).await?;
            let page = parse_page::<T>(body, &url)?;
            debug!(resource = T::LABEL, count = page.items.len(), "page fetched");
            items.extend(page.items);
            next = page.next;
        }

        Ok(items)
    }

    /// One record; any non-success status is reported as not found
    pub async fn get(&self, id: impl Display) -> Result<T, ClientError> {
        let url = self.item_url(id)?;
        let resp = self.api.request(Method::GET, url.clone(), true).send().await?;

        if !resp.status().is_success() {
            let (status, body) = Self::failure(resp).await;
            return Err(ClientError::NotFound {
                path: url.path().to_string(),
                status,
                detail: crate::error::error_detail(status, &body),
            });
        }
        ApiClient::decode(resp).await
    }

    pub async fn create<P: Serialize + ?Sized>(&self, payload: &P) -> Result<T, ClientError> {
        let url = self.collection_url()?;
        let resp = self.api.request(Method::POST, url, true).json(payload).send().await?;

        if !resp.status().is_success() {
            let (status, body) = Self::failure(resp).await;
            return Err(ClientError::from_status(status, &body));
        }
        ApiClient::decode(resp).await
    }

    /// Partial update: only the fields present in `payload` change
    pub async fn update<P: Serialize + ?Sized>(
        &self,
        id: impl Display,
        payload: &P,
    ) -> Result<T, ClientError> {
        let url = self.item_url(id)?;
        let resp = self.api.request(Method::PATCH, url, true).json(payload).send().await?;

        if !resp.status().is_success() {
            let (status, body) = Self::failure(resp).await;
            return Err(ClientError::from_status(status, &body));
        }
        ApiClient::decode(resp).await
    }

    pub async fn delete(&self, id: impl Display) -> Result<(), ClientError> {
        let url = self.item_url(id)?;
        let resp = self.api.request(Method::DELETE, url, true).send().await?;

        if !resp.status().is_success() {
            let (status, body) = Self::failure(resp).await;
            return Err(ClientError::from_status(status, &body));
        }
        Ok(())
    }
}
