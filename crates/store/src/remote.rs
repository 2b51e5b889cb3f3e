//! REST note store for hosted mode: the same CRUD surface, proxied to a
//! notes API with optional bearer auth.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use studymorph_core::{NewNote, Note, NoteId, NoteUpdate};

use crate::{NoteStore, StoreError};

pub struct RemoteStore {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl RemoteStore {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn endpoint(&self, suffix: &str) -> String {
        format!("{}/notes{}", self.base_url, suffix)
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn expect_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Remote {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl NoteStore for RemoteStore {
    async fn list(&self) -> Result<Vec<Note>, StoreError> {
        let response = self
            .request(Method::GET, self.endpoint(""))
            .send()
            .await?;
        Ok(Self::expect_success(response).await?.json().await?)
    }

    async fn get(&self, id: NoteId) -> Result<Option<Note>, StoreError> {
        let response = self
            .request(Method::GET, self.endpoint(&format!("/{id}")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(Self::expect_success(response).await?.json().await?))
    }

    async fn add(&self, new: NewNote) -> Result<Note, StoreError> {
        let response = self
            .request(Method::POST, self.endpoint(""))
            .json(&new)
            .send()
            .await?;
        Ok(Self::expect_success(response).await?.json().await?)
    }

    async fn update(&self, id: NoteId, update: NoteUpdate) -> Result<Option<Note>, StoreError> {
        let response = self
            .request(Method::PUT, self.endpoint(&format!("/{id}")))
            .json(&update)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(Self::expect_success(response).await?.json().await?))
    }

    async fn delete(&self, id: NoteId) -> Result<bool, StoreError> {
        let response = self
            .request(Method::DELETE, self.endpoint(&format!("/{id}")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::expect_success(response).await?;
        Ok(true)
    }
}
