//! services/twilio_client.rs
//! Cliente del historial de llamadas/mensajes de Twilio (API REST 2010-04-01).

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    config::app_config::{TwilioCredentials, PROVIDER_TIMEOUT},
    error::ProviderError,
    models::call_model::{ProviderCall, ProviderMessage},
};

/// Filtro por número: como origen o como destino.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFilter<'a> {
    From(&'a str),
    To(&'a str),
}

impl<'a> NumberFilter<'a> {
    fn query_pair(&self) -> (&'static str, &'a str) {
        match *self {
            NumberFilter::From(number) => ("From", number),
            NumberFilter::To(number) => ("To", number),
        }
    }
}

/// Fuente del historial de llamadas. Las consultas son de solo lectura.
#[async_trait]
pub trait CallLogProvider: Send + Sync {
    async fn list_calls(
        &self,
        filter: NumberFilter<'_>,
        limit: u32,
    ) -> Result<Vec<ProviderCall>, ProviderError>;

    async fn list_messages(
        &self,
        filter: NumberFilter<'_>,
        limit: u32,
    ) -> Result<Vec<ProviderMessage>, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct TwilioCallPage {
    #[serde(default)]
    calls: Vec<TwilioCall>,
}

#[derive(Debug, Deserialize)]
struct TwilioCall {
    #[serde(default)]
    sid: String,
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    status: String,
    /// Twilio lo envía como string ("120") o null
    #[serde(default)]
    duration: Option<String>,
    #[serde(default)]
    date_created: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TwilioMessagePage {
    #[serde(default)]
    messages: Vec<TwilioMessage>,
}

#[derive(Debug, Deserialize)]
struct TwilioMessage {
    #[serde(default)]
    sid: String,
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    status: String,
    #[serde(default)]
    date_created: Option<String>,
}

/// Twilio usa fechas RFC 2822 ("Tue, 31 Aug 2010 20:36:28 +0000").
fn parse_twilio_date(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc2822(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

impl From<TwilioCall> for ProviderCall {
    fn from(call: TwilioCall) -> Self {
        ProviderCall {
            duration_seconds: call
                .duration
                .as_deref()
                .and_then(|d| d.trim().parse::<u64>().ok()),
            date_created: parse_twilio_date(call.date_created.as_deref()),
            sid: call.sid,
            to: call.to.unwrap_or_default(),
            from: call.from.unwrap_or_default(),
            status: call.status,
        }
    }
}

impl From<TwilioMessage> for ProviderMessage {
    fn from(msg: TwilioMessage) -> Self {
        ProviderMessage {
            date_created: parse_twilio_date(msg.date_created.as_deref()),
            sid: msg.sid,
            to: msg.to.unwrap_or_default(),
            from: msg.from.unwrap_or_default(),
            status: msg.status,
        }
    }
}

/// Un error de reqwest por tiempo agotado (envío o lectura del body) es `Timeout`.
fn transport_error(err: reqwest::Error, timeout: Duration) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(timeout.as_secs())
    } else {
        ProviderError::Transport(err)
    }
}

#[derive(Clone)]
pub struct TwilioClient {
    http_client: Client,
    api_base: String,
    credentials: TwilioCredentials,
    timeout: Duration,
}

impl TwilioClient {
    pub fn new(
        api_base: impl Into<String>,
        credentials: TwilioCredentials,
    ) -> Result<Self, ProviderError> {
        Self::with_timeout(api_base, credentials, PROVIDER_TIMEOUT)
    }

    /// El timeout del cliente cubre toda la petición, incluida la lectura del body.
    pub fn with_timeout(
        api_base: impl Into<String>,
        credentials: TwilioCredentials,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            api_base: api_base.into(),
            credentials,
            timeout,
        })
    }

    fn resource_url(&self, resource: &str) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/{}.json",
            self.api_base, self.credentials.account_sid, resource
        )
    }

    /// GET autenticado; devuelve el JSON decodificado.
    async fn get_page<T>(
        &self,
        resource: &str,
        filter: NumberFilter<'_>,
        limit: u32,
    ) -> Result<T, ProviderError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = self.resource_url(resource);
        let (key, number) = filter.query_pair();
        let page_size = limit.to_string();
        log::info!("(twilio) GET {} {}={} PageSize={}", resource, key, number, limit);

        let resp = self
            .http_client
            .get(&url)
            .basic_auth(
                &self.credentials.account_sid,
                Some(&self.credentials.auth_token),
            )
            .query(&[(key, number), ("PageSize", page_size.as_str())])
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            log::error!("(twilio) {} respondió {}: {}", resource, status, body);
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;
        serde_json::from_slice::<T>(&bytes).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

#[async_trait]
impl CallLogProvider for TwilioClient {
    async fn list_calls(
        &self,
        filter: NumberFilter<'_>,
        limit: u32,
    ) -> Result<Vec<ProviderCall>, ProviderError> {
        let page: TwilioCallPage = self.get_page("Calls", filter, limit).await?;
        Ok(page
            .calls
            .into_iter()
            .take(limit as usize)
            .map(ProviderCall::from)
            .collect())
    }

    async fn list_messages(
        &self,
        filter: NumberFilter<'_>,
        limit: u32,
    ) -> Result<Vec<ProviderMessage>, ProviderError> {
        let page: TwilioMessagePage = self.get_page("Messages", filter, limit).await?;
        Ok(page
            .messages
            .into_iter()
            .take(limit as usize)
            .map(ProviderMessage::from)
            .collect())
    }
}
