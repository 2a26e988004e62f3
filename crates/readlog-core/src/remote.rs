//! HTTP client for the hosted reading API.
//!
//! Speaks the server's REST surface: sessions are created with a POST
//! carrying only the duration (the server assigns the end timestamp),
//! listed with a GET that returns the trailing two weeks, and deleted by
//! their end timestamp in the path.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use url::Url;

use crate::error::StoreError;
use crate::session::ReadingSession;
use crate::store::SessionStore;

const SESSIONS_PATH: &str = "/api/reading/sessions";

#[derive(Serialize)]
struct CreateSessionBody {
    duration: i64,
}

/// [`SessionStore`] over the hosted API.
pub struct HttpSessionStore {
    client: Client,
    base: Url,
}

impl HttpSessionStore {
    /// `base` is the server root, e.g. `https://reading.example.com`.
    pub fn new(base: &str) -> Result<Self, StoreError> {
        Ok(Self {
            client: Client::new(),
            base: Url::parse(base)?,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        Ok(self.base.join(path)?)
    }
}

fn check_status(resp: &reqwest::Response, endpoint: &Url) -> Result<(), StoreError> {
    if resp.status().is_success() {
        Ok(())
    } else {
        Err(StoreError::Status {
            status: resp.status().as_u16(),
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl SessionStore for HttpSessionStore {
    async fn create(&self, duration_secs: i64) -> Result<ReadingSession, StoreError> {
        let endpoint = self.endpoint(SESSIONS_PATH)?;
        let resp = self
            .client
            .post(endpoint.clone())
            .json(&CreateSessionBody {
                duration: duration_secs,
            })
            .send()
            .await?;
        check_status(&resp, &endpoint)?;
        Ok(resp.json().await?)
    }

    async fn list(&self) -> Result<Vec<ReadingSession>, StoreError> {
        let endpoint = self.endpoint(SESSIONS_PATH)?;
        let resp = self.client.get(endpoint.clone()).send().await?;
        check_status(&resp, &endpoint)?;
        Ok(resp.json().await?)
    }

    async fn delete(&self, timestamp: i64) -> Result<(), StoreError> {
        let endpoint = self.endpoint(&format!("{SESSIONS_PATH}/{timestamp}"))?;
        let resp = self.client.delete(endpoint.clone()).send().await?;
        check_status(&resp, &endpoint)
    }
}
