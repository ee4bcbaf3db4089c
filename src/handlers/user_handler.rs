//! handlers/user_handler.rs
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::auth::Authenticated;
use crate::error::ApiResult;
use crate::models::user_model::CreateUserRequest;
use crate::services::user_service::UserService;

/// POST /users
pub async fn create_user_endpoint(
    _auth: Authenticated,
    service: web::Data<UserService>,
    body: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let user = service.create_user(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "User created successfully",
        "user": user
    })))
}

/// GET /users/{id}
pub async fn get_user_endpoint(
    _auth: Authenticated,
    service: web::Data<UserService>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let user = service.get_user(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// DELETE /users/{id}
/// Elimina también todos sus batch_calls (cascade).
pub async fn delete_user_endpoint(
    _auth: Authenticated,
    service: web::Data<UserService>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    service.delete_user(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
