//! app.rs
use crate::error::ApiError;
use crate::handlers::{analysis_handler, batch_call_handler, system_handler, user_handler};
use actix_web::web;

pub fn init_app(cfg: &mut web::ServiceConfig) {
    // Errores de extracción con el mismo formato JSON que el resto de la API
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::InvalidInput(format!("Invalid JSON body: {}", err)).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        ApiError::InvalidInput(format!("Invalid path parameter: {}", err)).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        ApiError::InvalidInput(format!("Invalid query string: {}", err)).into()
    }))
    .route("/", web::get().to(system_handler::root_endpoint))
    .route("/health", web::get().to(system_handler::health_endpoint))
    .service(
        web::scope("/analysis")
            .route(
                "/twilio-number-usage",
                web::post().to(analysis_handler::number_usage_endpoint),
            )
            .route(
                "/twilio-call-analytics",
                web::post().to(analysis_handler::call_analytics_endpoint),
            )
            .route(
                "/twilio-multiple-numbers-analytics",
                web::post().to(analysis_handler::multiple_numbers_endpoint),
            ),
    )
    .service(
        web::scope("/batch-calls")
            .route(
                "",
                web::post().to(batch_call_handler::create_batch_call_endpoint),
            )
            .route(
                "",
                web::get().to(batch_call_handler::list_batch_calls_endpoint),
            )
            .route(
                "/{batch_job_id}",
                web::get().to(batch_call_handler::get_batch_call_endpoint),
            )
            .route(
                "/{batch_job_id}/status",
                web::patch().to(batch_call_handler::update_batch_call_status_endpoint),
            ),
    )
    .service(
        web::scope("/users")
            .route("", web::post().to(user_handler::create_user_endpoint))
            .route("/{id}", web::get().to(user_handler::get_user_endpoint))
            .route("/{id}", web::delete().to(user_handler::delete_user_endpoint)),
    );
}
