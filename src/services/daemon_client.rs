use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::daemon::{ChatRequest, ChatResponse, ProvincesResponse, TablesResponse};
use crate::domains::chat::ChatMessage;
use crate::error::{AdspotError, Result};
use crate::inventory::ProvinceCount;
use crate::services::map::MapView;

/// HTTP client for `adspotd`, used by the desktop UI.
#[derive(Clone)]
pub struct DaemonClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl DaemonClient {
    pub fn new(base_url: String, token: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(3))
            .build()
            .map_err(|e| AdspotError::Runtime(e.to_string()))?;
        Ok(Self {
            base_url,
            token,
            client,
        })
    }

    pub async fn map_view(&self) -> Result<MapView> {
        self.get_json("/map").await
    }

    pub async fn province_counts(&self) -> Result<Vec<ProvinceCount>> {
        let response: ProvincesResponse = self.get_json("/analytics/provinces").await?;
        Ok(response.provinces)
    }

    pub async fn tables(&self) -> Result<Vec<String>> {
        let response: TablesResponse = self.get_json("/tables").await?;
        Ok(response.tables)
    }

    pub async fn chat(&self, messages: Vec<ChatMessage>, text: &str) -> Result<ChatResponse> {
        let request = ChatRequest {
            messages,
            text: text.to_string(),
        };
        self.post_json("/chat", &request).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let mut request = self.client.get(join_url(&self.base_url, path));
        if !self.token.trim().is_empty() {
            request = request.header(AUTHORIZATION, format!("Bearer {}", self.token));
        }
        let response = request
            .send()
            .await
            .map_err(|e| AdspotError::Http(e.to_string()))?;
        decode(response).await
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let mut request = self.client.post(join_url(&self.base_url, path));
        if !self.token.trim().is_empty() {
            request = request.header(AUTHORIZATION, format!("Bearer {}", self.token));
        }
        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| AdspotError::Http(e.to_string()))?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| AdspotError::Http(e.to_string()))?;
    if status != StatusCode::OK {
        return Err(AdspotError::Http(format!("daemon returned {status}: {body}")));
    }
    serde_json::from_str(&body).map_err(|e| AdspotError::Serialization(e.to_string()))
}

fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
