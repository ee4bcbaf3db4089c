//! auth.rs
//! Verificación del header `Authorization: Bearer <token>`.
//! La emisión de tokens vive fuera de este servicio; aquí solo se compara
//! contra el token configurado.

use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};

use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct BearerConfig {
    pub token: Option<String>,
}

/// Extractor presente en todo endpoint protegido.
#[derive(Debug)]
pub struct Authenticated;

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn authorize(req: &HttpRequest) -> Result<Authenticated, ApiError> {
    let expected = req
        .app_data::<web::Data<BearerConfig>>()
        .and_then(|cfg| cfg.token.clone())
        .ok_or_else(|| ApiError::Unauthorized("API bearer token not configured".to_string()))?;

    match bearer_token(req) {
        Some(token) if token == expected => Ok(Authenticated),
        Some(_) => Err(ApiError::Unauthorized(
            "Could not validate credentials".to_string(),
        )),
        None => Err(ApiError::Unauthorized(
            "Missing bearer token".to_string(),
        )),
    }
}

impl FromRequest for Authenticated {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authorize(req))
    }
}
