//! config/app_config.rs
//! Configuración leída del entorno (y de `.env`).

use std::env;
use std::time::Duration;

/// Timeout de cada petición al proveedor de telefonía (incluye el body).
pub const PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);
/// Máximo de llamadas por dirección.
pub const CALL_LIST_LIMIT: u32 = 100;
/// Máximo de mensajes por dirección.
pub const MESSAGE_LIST_LIMIT: u32 = 50;
/// Tamaño de `recent_calls` / `recent_messages` en la vista de uso.
pub const RECENT_ITEMS: usize = 10;
/// Tamaño de las listas recientes por número en la vista múltiple.
pub const RECENT_ITEMS_PER_NUMBER: usize = 5;

const DEFAULT_DATABASE_URL: &str = "sqlite:data/call_insights.db";
const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";

#[derive(Debug, Clone)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub twilio_api_base: String,
    /// `None` si falta alguna variable de Twilio; los endpoints de análisis
    /// responden con error de configuración en vez de fallar al arrancar.
    pub twilio: Option<TwilioCredentials>,
    pub api_bearer_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: "0.0.0.0".to_string(),
            port: 5022,
            twilio_api_base: DEFAULT_TWILIO_API_BASE.to_string(),
            twilio: None,
            api_bearer_token: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construye la config desde cualquier función de búsqueda (tests sin
    /// tocar el entorno del proceso).
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match non_empty("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("PORT inválido '{}': {}", raw, e))?,
            None => defaults.port,
        };

        let twilio = match (non_empty("TWILIO_ACCOUNT_SID"), non_empty("TWILIO_AUTH_TOKEN")) {
            (Some(account_sid), Some(auth_token)) => Some(TwilioCredentials {
                account_sid,
                auth_token,
            }),
            _ => None,
        };

        Ok(AppConfig {
            database_url: non_empty("DATABASE_URL").unwrap_or(defaults.database_url),
            host: non_empty("HOST").unwrap_or(defaults.host),
            port,
            twilio_api_base: non_empty("TWILIO_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or(defaults.twilio_api_base),
            twilio,
            api_bearer_token: non_empty("API_BEARER_TOKEN"),
        })
    }
}
