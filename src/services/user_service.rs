//! services/user_service.rs
//! Registro mínimo de usuarios dueños de los batch jobs.

use anyhow::Context;
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::{
    db::{constraint_violation, ConstraintViolation},
    error::{ApiError, ApiResult},
    models::user_model::{CreateUserRequest, UserRecord},
};

const USER_COLUMNS: &str = "id, email, name, company_name, is_active, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct UserService {
    db_pool: Pool<Sqlite>,
}

impl UserService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        UserService { db_pool }
    }

    pub async fn create_user(&self, req: CreateUserRequest) -> ApiResult<UserRecord> {
        let email = req.email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(ApiError::InvalidInput(format!("invalid email '{}'", req.email)));
        }
        if req.name.trim().is_empty() || req.company_name.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "name and company_name must not be empty".to_string(),
            ));
        }
        let now = Utc::now();

        let inserted = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            INSERT INTO users (email, name, company_name, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, 1, ?4, ?4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&email)
        .bind(req.name.trim())
        .bind(req.company_name.trim())
        .bind(now)
        .fetch_one(&self.db_pool)
        .await;

        match inserted {
            Ok(user) => {
                log::info!("(create_user) Usuario {} creado con id={}", user.email, user.id);
                Ok(user)
            }
            Err(e) if constraint_violation(&e) == Some(ConstraintViolation::Unique) => Err(
                ApiError::Conflict(format!("email '{}' already registered", email)),
            ),
            Err(e) => Err(ApiError::Internal(
                anyhow::Error::new(e).context("Fallo al insertar usuario"),
            )),
        }
    }

    pub async fn get_user(&self, user_id: i64) -> ApiResult<UserRecord> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db_pool)
        .await
        .context("Fallo al consultar usuario")?
        .ok_or_else(|| ApiError::NotFound(format!("user {} not found", user_id)))
    }

    /// Borra el usuario; sus batch_calls caen por cascada.
    pub async fn delete_user(&self, user_id: i64) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(user_id)
            .execute(&self.db_pool)
            .await
            .context("Fallo al borrar usuario")?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("user {} not found", user_id)));
        }
        log::info!("(delete_user) Usuario id={} eliminado", user_id);
        Ok(())
    }
}
