//! handlers/analysis_handler.rs
//! Endpoints de analítica sobre el historial de Twilio.

use actix_web::{web, HttpResponse};

use crate::{
    auth::Authenticated,
    error::ApiResult,
    models::call_model::{MultiplePhoneNumbersRequest, PhoneNumberRequest},
    services::call_analytics_service::CallAnalyticsService,
};

/// POST /analysis/twilio-number-usage
pub async fn number_usage_endpoint(
    _auth: Authenticated,
    service: web::Data<CallAnalyticsService>,
    body: web::Json<PhoneNumberRequest>,
) -> ApiResult<HttpResponse> {
    log::info!("Entrando a number_usage_endpoint");
    let usage = service.number_usage(&body.phone_number).await?;
    Ok(HttpResponse::Ok().json(usage))
}

/// POST /analysis/twilio-call-analytics
pub async fn call_analytics_endpoint(
    _auth: Authenticated,
    service: web::Data<CallAnalyticsService>,
    body: web::Json<PhoneNumberRequest>,
) -> ApiResult<HttpResponse> {
    let analytics = service.call_analytics(&body.phone_number).await?;
    Ok(HttpResponse::Ok().json(analytics))
}

/// POST /analysis/twilio-multiple-numbers-analytics
pub async fn multiple_numbers_endpoint(
    _auth: Authenticated,
    service: web::Data<CallAnalyticsService>,
    body: web::Json<MultiplePhoneNumbersRequest>,
) -> ApiResult<HttpResponse> {
    let result = service.multiple_numbers(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(result))
}
