use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;

use crate::auth::BearerConfig;
use crate::config::app_config::AppConfig;
use crate::logger::init_logger;
use crate::services::batch_call_service::BatchCallService;
use crate::services::call_analytics_service::CallAnalyticsService;
use crate::services::twilio_client::{CallLogProvider, TwilioClient};
use crate::services::user_service::UserService;

mod app;
mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod logger;
mod models;
mod services;

#[cfg(test)]
mod tests;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    let config = AppConfig::from_env()?;

    // Conectarnos a la DB y migrar
    let db_pool = db::setup_database(&config.database_url).await?;
    db::run_migrations(&db_pool).await?;

    let provider: Option<Arc<dyn CallLogProvider>> = match config.twilio.clone() {
        Some(creds) => {
            let client = TwilioClient::new(config.twilio_api_base.clone(), creds)?;
            Some(Arc::new(client) as Arc<dyn CallLogProvider>)
        }
        None => {
            log::warn!("TWILIO_ACCOUNT_SID/TWILIO_AUTH_TOKEN no definidos; /analysis responderá 500");
            None
        }
    };
    if config.api_bearer_token.is_none() {
        log::warn!("API_BEARER_TOKEN no definido; todos los endpoints protegidos responderán 401");
    }

    let analytics_service = CallAnalyticsService::new(provider);
    let batch_call_service = BatchCallService::new(db_pool.clone());
    let user_service = UserService::new(db_pool.clone());
    let bearer = BearerConfig {
        token: config.api_bearer_token.clone(),
    };

    // Levantar servidor
    log::info!("Levantando servidor en {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(bearer.clone()))
            .app_data(web::Data::new(analytics_service.clone()))
            .app_data(web::Data::new(batch_call_service.clone()))
            .app_data(web::Data::new(user_service.clone()))
            .configure(app::init_app)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
