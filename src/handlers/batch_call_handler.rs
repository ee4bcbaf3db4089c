//! handlers/batch_call_handler.rs
use actix_web::{web, HttpResponse};

use crate::auth::Authenticated;
use crate::error::ApiResult;
use crate::models::batch_call_model::{
    CreateBatchCallRequest, ListBatchCallsQuery, UpdateBatchCallStatusRequest,
};
use crate::services::batch_call_service::BatchCallService;

/// POST /batch-calls
pub async fn create_batch_call_endpoint(
    _auth: Authenticated,
    service: web::Data<BatchCallService>,
    body: web::Json<CreateBatchCallRequest>,
) -> ApiResult<HttpResponse> {
    let record = service.create_batch_call(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(record))
}

/// GET /batch-calls
pub async fn list_batch_calls_endpoint(
    _auth: Authenticated,
    service: web::Data<BatchCallService>,
    query: web::Query<ListBatchCallsQuery>,
) -> ApiResult<HttpResponse> {
    let list = service.list_batch_calls(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// GET /batch-calls/{batch_job_id}
pub async fn get_batch_call_endpoint(
    _auth: Authenticated,
    service: web::Data<BatchCallService>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let record = service.get_batch_call(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(record))
}

/// PATCH /batch-calls/{batch_job_id}/status
pub async fn update_batch_call_status_endpoint(
    _auth: Authenticated,
    service: web::Data<BatchCallService>,
    path: web::Path<String>,
    body: web::Json<UpdateBatchCallStatusRequest>,
) -> ApiResult<HttpResponse> {
    let record = service
        .update_status(&path.into_inner(), &body.status)
        .await?;
    Ok(HttpResponse::Ok().json(record))
}
