use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use mmi_core::config::StoreConfig;
use mmi_core::domain::quotation::{Quotation, QuotationId};
use mmi_core::errors::StoreError;
use mmi_core::ports::{ExpiringKind, QuotationStore};

use crate::envelope::ServiceResponse;

/// [`QuotationStore`] backed by the quotation web API.
///
/// 404 responses, `success: false` envelopes and null payloads all read as
/// "no such record". Everything else that goes wrong is a [`StoreError`].
#[derive(Clone, Debug)]
pub struct HttpQuotationStore {
    client: Client,
    base_url: String,
}

impl HttpQuotationStore {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, StoreError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|error| StoreError::Transport {
            path: base_url.clone(),
            message: error.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        Self::new(config.base_url.clone(), config.timeout_secs.map(Duration::from_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call<T>(
        &self,
        method: Method,
        path: String,
        body: Option<&Quotation>,
    ) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/{path}", self.base_url);
        let mut request = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(
            event_name = "store.request.sent",
            method = %method,
            path = %path,
            "store request"
        );
        let response = request.send().await.map_err(|error| transport(&path, error))?;

        let status = response.status();
        debug!(
            event_name = "store.response.received",
            path = %path,
            status = status.as_u16(),
            "store response"
        );
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(StoreError::Status { path, status: status.as_u16() });
        }

        let bytes = response.bytes().await.map_err(|error| transport(&path, error))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        let envelope: ServiceResponse<T> = serde_json::from_slice(&bytes).map_err(|error| {
            StoreError::Decode { path: path.clone(), message: error.to_string() }
        })?;
        if !envelope.success {
            warn!(
                event_name = "store.response.unsuccessful",
                path = %path,
                message = envelope.message.as_deref().unwrap_or_default(),
                "store reported no result"
            );
        }
        Ok(envelope.into_data())
    }
}

fn transport(path: &str, error: reqwest::Error) -> StoreError {
    StoreError::Transport { path: path.to_string(), message: error.to_string() }
}

#[async_trait]
impl QuotationStore for HttpQuotationStore {
    async fn get_quotation(&self, id: QuotationId) -> Result<Option<Quotation>, StoreError> {
        self.call(Method::GET, format!("api/quotation/{id}"), None).await
    }

    async fn get_policy(&self, id: QuotationId) -> Result<Option<Quotation>, StoreError> {
        self.call(Method::GET, format!("api/quotation/policy/{id}"), None).await
    }

    async fn save_quotation(
        &self,
        quotation: &Quotation,
    ) -> Result<Option<Quotation>, StoreError> {
        self.call(Method::POST, "api/quotation".to_string(), Some(quotation)).await
    }

    async fn convert_to_policy(&self, id: QuotationId) -> Result<Option<Quotation>, StoreError> {
        self.call(Method::PUT, format!("api/quotation/updatepolicy/{id}"), None).await
    }

    async fn list_expiring(&self, kind: ExpiringKind) -> Result<Vec<Quotation>, StoreError> {
        let path = match kind {
            ExpiringKind::Quotations => "api/quotation/expiring/quotations",
            ExpiringKind::Policies => "api/quotation/expiring/policies",
        };
        let listed: Option<Vec<Quotation>> = self.call(Method::GET, path.to_string(), None).await?;
        Ok(listed.unwrap_or_default())
    }
}
