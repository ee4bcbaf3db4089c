//! tests/mod.rs
//! Pruebas de endpoints con un proveedor simulado y SQLite en memoria.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::models::call_model::{ProviderCall, ProviderMessage};
use crate::services::twilio_client::{CallLogProvider, NumberFilter};


pub const TEST_TOKEN: &str = "test-token";

/// Arma la App completa (rutas + servicios) para `actix_web::test`.
macro_rules! test_app {
    ($provider:expr, $pool:expr) => {{
        let pool = $pool;
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(crate::auth::BearerConfig {
                    token: Some(crate::tests::TEST_TOKEN.to_string()),
                }))
                .app_data(actix_web::web::Data::new(
                    crate::services::call_analytics_service::CallAnalyticsService::new($provider),
                ))
                .app_data(actix_web::web::Data::new(
                    crate::services::batch_call_service::BatchCallService::new(pool.clone()),
                ))
                .app_data(actix_web::web::Data::new(
                    crate::services::user_service::UserService::new(pool),
                ))
                .configure(crate::app::init_app),
        )
        .await
    }};
}
pub(crate) use test_app;

pub fn bearer() -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", TEST_TOKEN))
}

pub fn provider_call(status: &str, duration: Option<u64>) -> ProviderCall {
    ProviderCall {
        sid: format!("CA{}", status),
        to: "+15550001111".to_string(),
        from: "+15077057482".to_string(),
        status: status.to_string(),
        duration_seconds: duration,
        date_created: None,
    }
}

pub fn provider_message(status: &str) -> ProviderMessage {
    ProviderMessage {
        sid: format!("SM{}", status),
        to: "+15550001111".to_string(),
        from: "+15077057482".to_string(),
        status: status.to_string(),
        date_created: None,
    }
}

/// Proveedor en memoria; registra los números consultados.
#[derive(Default)]
pub struct StubProvider {
    pub outbound_calls: Vec<ProviderCall>,
    pub inbound_calls: Vec<ProviderCall>,
    pub outbound_messages: Vec<ProviderMessage>,
    pub inbound_messages: Vec<ProviderMessage>,
    pub fail_inbound_calls: bool,
    pub failing_numbers: Vec<String>,
    pub queried: Mutex<Vec<String>>,
}

impl StubProvider {
    fn check(&self, number: &str, force_failure: bool) -> Result<(), ProviderError> {
        self.queried.lock().unwrap().push(number.to_string());
        if self.failing_numbers.iter().any(|n| n == number) || force_failure {
            return Err(ProviderError::Status {
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        Ok(())
    }

    pub fn into_provider(self) -> Option<Arc<dyn CallLogProvider>> {
        Some(Arc::new(self))
    }
}

#[async_trait]
impl CallLogProvider for StubProvider {
    async fn list_calls(
        &self,
        filter: NumberFilter<'_>,
        limit: u32,
    ) -> Result<Vec<ProviderCall>, ProviderError> {
        let (number, source) = match filter {
            NumberFilter::From(n) => (n, &self.outbound_calls),
            NumberFilter::To(n) => (n, &self.inbound_calls),
        };
        let inbound = matches!(filter, NumberFilter::To(_));
        self.check(number, inbound && self.fail_inbound_calls)?;
        Ok(source.iter().take(limit as usize).cloned().collect())
    }

    async fn list_messages(
        &self,
        filter: NumberFilter<'_>,
        limit: u32,
    ) -> Result<Vec<ProviderMessage>, ProviderError> {
        let (number, source) = match filter {
            NumberFilter::From(n) => (n, &self.outbound_messages),
            NumberFilter::To(n) => (n, &self.inbound_messages),
        };
        self.check(number, false)?;
        Ok(source.iter().take(limit as usize).cloned().collect())
    }
}
