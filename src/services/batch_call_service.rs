use anyhow::Context;
use chrono::Utc;
use sqlx::{Pool, QueryBuilder, Sqlite};

use crate::{
    db::{constraint_violation, ConstraintViolation},
    error::{ApiError, ApiResult},
    models::batch_call_model::{
        BatchCallRecord, CreateBatchCallRequest, ListBatchCallsQuery, ListBatchCallsResponse,
        DEFAULT_BATCH_STATUS,
    },
};

const BATCH_CALL_COLUMNS: &str = "id, user_id, agent_id, batch_job_id, call_name, total_numbers, \
     scheduled_time_unix, status, created_at, updated_at";

const DEFAULT_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = 100;

fn require_non_empty(field: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

#[derive(Clone, Debug)]
pub struct BatchCallService {
    db_pool: Pool<Sqlite>,
}

impl BatchCallService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        BatchCallService { db_pool }
    }

    /// Registra un batch job enviado al proveedor. `batch_job_id` es único
    /// entre todos los usuarios.
    pub async fn create_batch_call(&self, req: CreateBatchCallRequest) -> ApiResult<BatchCallRecord> {
        require_non_empty("agent_id", &req.agent_id)?;
        require_non_empty("batch_job_id", &req.batch_job_id)?;
        require_non_empty("call_name", &req.call_name)?;
        if req.total_numbers < 0 {
            return Err(ApiError::InvalidInput(
                "total_numbers must be zero or greater".to_string(),
            ));
        }
        let status = req
            .status
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BATCH_STATUS.to_string());
        let now = Utc::now();

        let inserted = sqlx::query_as::<_, BatchCallRecord>(&format!(
            r#"
            INSERT INTO batch_calls (
                user_id, agent_id, batch_job_id, call_name, total_numbers,
                scheduled_time_unix, status, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            RETURNING {BATCH_CALL_COLUMNS}
            "#
        ))
        .bind(req.user_id)
        .bind(&req.agent_id)
        .bind(&req.batch_job_id)
        .bind(&req.call_name)
        .bind(req.total_numbers)
        .bind(req.scheduled_time_unix)
        .bind(&status)
        .bind(now)
        .fetch_one(&self.db_pool)
        .await;

        match inserted {
            Ok(record) => {
                log::info!(
                    "(create_batch_call) batch_job_id={} registrado para user_id={}",
                    record.batch_job_id,
                    record.user_id
                );
                Ok(record)
            }
            Err(e) => Err(match constraint_violation(&e) {
                Some(ConstraintViolation::Unique) => ApiError::Conflict(format!(
                    "batch job '{}' already registered",
                    req.batch_job_id
                )),
                Some(ConstraintViolation::ForeignKey) => {
                    ApiError::NotFound(format!("user {} not found", req.user_id))
                }
                None => ApiError::Internal(
                    anyhow::Error::new(e).context("Fallo al insertar batch_call"),
                ),
            }),
        }
    }

    pub async fn get_batch_call(&self, batch_job_id: &str) -> ApiResult<BatchCallRecord> {
        sqlx::query_as::<_, BatchCallRecord>(&format!(
            "SELECT {BATCH_CALL_COLUMNS} FROM batch_calls WHERE batch_job_id = ?1"
        ))
        .bind(batch_job_id)
        .fetch_optional(&self.db_pool)
        .await
        .context("Fallo al consultar batch_call")?
        .ok_or_else(|| ApiError::NotFound(format!("batch job '{}' not found", batch_job_id)))
    }

    /// Sincroniza el estado reportado por el proveedor y toca `updated_at`.
    pub async fn update_status(
        &self,
        batch_job_id: &str,
        new_status: &str,
    ) -> ApiResult<BatchCallRecord> {
        require_non_empty("status", new_status)?;

        sqlx::query_as::<_, BatchCallRecord>(&format!(
            r#"
            UPDATE batch_calls
            SET status = ?2,
                updated_at = ?3
            WHERE batch_job_id = ?1
            RETURNING {BATCH_CALL_COLUMNS}
            "#
        ))
        .bind(batch_job_id)
        .bind(new_status.trim())
        .bind(Utc::now())
        .fetch_optional(&self.db_pool)
        .await
        .context("Fallo al actualizar batch_call")?
        .ok_or_else(|| ApiError::NotFound(format!("batch job '{}' not found", batch_job_id)))
    }

    /// Lista jobs, más recientes primero, con filtros opcionales.
    pub async fn list_batch_calls(
        &self,
        query: ListBatchCallsQuery,
    ) -> ApiResult<ListBatchCallsResponse> {
        let page = query.page.unwrap_or(1).max(1);
        let page_size = query
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1)
            .checked_mul(page_size)
            .filter(|offset| *offset <= i64::MAX as u64)
            .ok_or_else(|| ApiError::InvalidInput(format!("page {} is out of range", page)))?;

        // total
        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM batch_calls");
        push_filters(&mut count_qb, &query);
        let total: i64 = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.db_pool)
            .await
            .context("Fallo al contar batch_calls")?;

        // items
        let mut items_qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {BATCH_CALL_COLUMNS} FROM batch_calls"
        ));
        push_filters(&mut items_qb, &query);
        items_qb
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page_size as i64)
            .push(" OFFSET ")
            .push_bind(offset as i64);

        let items = items_qb
            .build_query_as::<BatchCallRecord>()
            .fetch_all(&self.db_pool)
            .await
            .context("Fallo al listar batch_calls")?;

        Ok(ListBatchCallsResponse {
            total: total as u64,
            page,
            page_size,
            items,
        })
    }
}

fn push_filters<'a>(qb: &mut QueryBuilder<'a, Sqlite>, query: &'a ListBatchCallsQuery) {
    let mut has_where = false;
    let mut next_clause = |qb: &mut QueryBuilder<'a, Sqlite>| {
        qb.push(if has_where { " AND " } else { " WHERE " });
        has_where = true;
    };

    if let Some(user_id) = query.user_id {
        next_clause(qb);
        qb.push("user_id = ").push_bind(user_id);
    }
    if let Some(agent_id) = query.agent_id.as_deref() {
        next_clause(qb);
        qb.push("agent_id = ").push_bind(agent_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::models::user_model::CreateUserRequest;
    use crate::services::user_service::UserService;
    use actix_rt::test;

    async fn setup() -> (BatchCallService, UserService, i64) {
        let pool = test_pool().await;
        let users = UserService::new(pool.clone());
        let user = users
            .create_user(CreateUserRequest {
                email: "owner@example.com".to_string(),
                name: "Owner".to_string(),
                company_name: "Acme".to_string(),
            })
            .await
            .expect("create user");
        (BatchCallService::new(pool), users, user.id)
    }

    fn job(user_id: i64, batch_job_id: &str, agent_id: &str) -> CreateBatchCallRequest {
        CreateBatchCallRequest {
            user_id,
            agent_id: agent_id.to_string(),
            batch_job_id: batch_job_id.to_string(),
            call_name: "Spring campaign".to_string(),
            total_numbers: 25,
            scheduled_time_unix: None,
            status: None,
        }
    }

    #[test]
    async fn create_defaults_to_submitted() {
        let (service, _, user_id) = setup().await;
        let record = service
            .create_batch_call(job(user_id, "btcal_1", "agent_a"))
            .await
            .unwrap();

        assert_eq!(record.status, DEFAULT_BATCH_STATUS);
        assert_eq!(record.total_numbers, 25);
        assert!(record.scheduled_time_unix.is_none());
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    async fn duplicate_batch_job_id_is_a_conflict() {
        let (service, users, user_id) = setup().await;
        service
            .create_batch_call(job(user_id, "btcal_dup", "agent_a"))
            .await
            .unwrap();

        let other = users
            .create_user(CreateUserRequest {
                email: "other@example.com".to_string(),
                name: "Other".to_string(),
                company_name: "Beta".to_string(),
            })
            .await
            .unwrap();

        let err = service
            .create_batch_call(job(other.id, "btcal_dup", "agent_b"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)), "got {:?}", err);
    }

    #[test]
    async fn unknown_user_is_not_found() {
        let (service, _, user_id) = setup().await;
        let err = service
            .create_batch_call(job(user_id + 999, "btcal_orphan", "agent_a"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)), "got {:?}", err);
    }

    #[test]
    async fn rejects_negative_total_and_blank_fields() {
        let (service, _, user_id) = setup().await;

        let mut req = job(user_id, "btcal_neg", "agent_a");
        req.total_numbers = -1;
        assert!(matches!(
            service.create_batch_call(req).await,
            Err(ApiError::InvalidInput(_))
        ));

        let req = job(user_id, "  ", "agent_a");
        assert!(matches!(
            service.create_batch_call(req).await,
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    async fn update_status_touches_updated_at() {
        let (service, _, user_id) = setup().await;
        let created = service
            .create_batch_call(job(user_id, "btcal_upd", "agent_a"))
            .await
            .unwrap();

        let updated = service.update_status("btcal_upd", "completed").await.unwrap();
        assert_eq!(updated.status, "completed");
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.created_at, created.created_at);

        assert!(matches!(
            service.update_status("missing", "completed").await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    async fn list_filters_and_orders_newest_first() {
        let (service, _, user_id) = setup().await;
        for (i, agent) in ["agent_a", "agent_b", "agent_a"].iter().enumerate() {
            service
                .create_batch_call(job(user_id, &format!("btcal_{}", i), agent))
                .await
                .unwrap();
        }

        let all = service
            .list_batch_calls(ListBatchCallsQuery {
                user_id: Some(user_id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(all.total, 3);
        assert_eq!(all.items[0].batch_job_id, "btcal_2");
        assert_eq!(all.items[2].batch_job_id, "btcal_0");

        let agent_a = service
            .list_batch_calls(ListBatchCallsQuery {
                agent_id: Some("agent_a".to_string()),
                page_size: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(agent_a.total, 2);
        assert_eq!(agent_a.items.len(), 1);
        assert_eq!(agent_a.page_size, 1);
    }

    #[test]
    async fn huge_page_is_rejected() {
        let (service, _, user_id) = setup().await;
        service
            .create_batch_call(job(user_id, "btcal_p1", "agent_a"))
            .await
            .unwrap();

        let result = service
            .list_batch_calls(ListBatchCallsQuery {
                page: Some(u64::MAX),
                page_size: Some(100),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));

        // Una página más allá del final devuelve vacío, no error
        let past_end = service
            .list_batch_calls(ListBatchCallsQuery {
                page: Some(50),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(past_end.total, 1);
        assert!(past_end.items.is_empty());
    }

    #[test]
    async fn deleting_user_cascades_to_batch_calls() {
        let (service, users, user_id) = setup().await;
        service
            .create_batch_call(job(user_id, "btcal_c1", "agent_a"))
            .await
            .unwrap();
        service
            .create_batch_call(job(user_id, "btcal_c2", "agent_a"))
            .await
            .unwrap();

        users.delete_user(user_id).await.unwrap();

        let remaining = service
            .list_batch_calls(ListBatchCallsQuery {
                user_id: Some(user_id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(remaining.total, 0);
        assert!(matches!(
            service.get_batch_call("btcal_c1").await,
            Err(ApiError::NotFound(_))
        ));
    }
}
