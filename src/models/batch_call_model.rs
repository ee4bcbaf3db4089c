use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Estado inicial de un job recién enviado al proveedor.
pub const DEFAULT_BATCH_STATUS: &str = "submitted";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BatchCallRecord {
    pub id: i64,
    pub user_id: i64,
    pub agent_id: String,
    pub batch_job_id: String,
    pub call_name: String,
    pub total_numbers: i64,
    /// `None` = envío inmediato
    pub scheduled_time_unix: Option<i64>,
    pub status: String, // "submitted", "completed", "failed", ... (texto libre)
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request para registrar un batch job
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBatchCallRequest {
    pub user_id: i64,
    pub agent_id: String,
    pub batch_job_id: String,
    pub call_name: String,
    pub total_numbers: i64,
    pub scheduled_time_unix: Option<i64>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBatchCallStatusRequest {
    pub status: String,
}

/// Filtros y paginación para listar jobs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListBatchCallsQuery {
    pub user_id: Option<i64>,
    pub agent_id: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListBatchCallsResponse {
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub items: Vec<BatchCallRecord>,
}
