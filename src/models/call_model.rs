//! models/call_model.rs
//! Estructuras de registros de llamadas/mensajes y de las respuestas de analítica.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dirección de un registro respecto al número consultado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// El número consultado es el origen (`From`).
    Outbound,
    /// El número consultado es el destino (`To`).
    Inbound,
}

/// Llamada tal como la entrega el proveedor, antes de etiquetarla.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderCall {
    pub sid: String,
    pub to: String,
    pub from: String,
    pub status: String,
    pub duration_seconds: Option<u64>,
    pub date_created: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderMessage {
    pub sid: String,
    pub to: String,
    pub from: String,
    pub status: String,
    pub date_created: Option<DateTime<Utc>>,
}

/// Registro transitorio de llamada; nunca se persiste.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallRecord {
    pub sid: String,
    pub to: String,
    pub from: String,
    pub direction: Direction,
    pub status: String,
    pub duration_seconds: u64,
    pub duration_formatted: String,
    pub date_created: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageRecord {
    pub to: String,
    pub from: String,
    pub direction: Direction,
    pub status: String,
    pub date_created: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallStatistics {
    pub total_calls: usize,
    pub completed_calls: usize,
    pub failed_calls: usize,
    pub busy_calls: usize,
    pub no_answer_calls: usize,
    pub canceled_calls: usize,
    pub average_call_duration_seconds: f64,
    pub total_call_duration_seconds: u64,
    pub success_rate_percentage: f64,
    pub failure_rate_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageStatistics {
    pub total_messages: usize,
    pub delivered_messages: usize,
    pub failed_messages: usize,
    pub sent_messages: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectionBreakdown {
    pub outbound: usize,
    pub inbound: usize,
}

// ---------------------------------------------------------------------------
// Requests / responses HTTP
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct PhoneNumberRequest {
    pub phone_number: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MultiplePhoneNumbersRequest {
    pub phone_numbers: Vec<String>,
    #[serde(default = "default_true")]
    pub include_recent_calls: bool,
    #[serde(default = "default_true")]
    pub include_recent_messages: bool,
}

fn default_true() -> bool {
    true
}

/// POST /analysis/twilio-number-usage
#[derive(Debug, Clone, Serialize)]
pub struct NumberUsageResponse {
    pub phone_number: String,
    pub call_statistics: CallStatistics,
    pub message_statistics: MessageStatistics,
    pub recent_calls: Vec<CallRecord>,
    pub recent_messages: Vec<MessageRecord>,
}

/// POST /analysis/twilio-call-analytics
#[derive(Debug, Clone, Serialize)]
pub struct CallAnalyticsResponse {
    pub phone_number: String,
    pub call_statistics: CallStatistics,
    pub status_breakdown: BTreeMap<String, usize>,
    pub direction_breakdown: DirectionBreakdown,
    pub calls: Vec<CallRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum NumberResult {
    Success {
        phone_number: String,
        call_statistics: CallStatistics,
        message_statistics: MessageStatistics,
        #[serde(skip_serializing_if = "Option::is_none")]
        recent_calls: Option<Vec<CallRecord>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        recent_messages: Option<Vec<MessageRecord>>,
    },
    /// Las estadísticas van siempre en `null` para que ambas variantes
    /// tengan las mismas llaves.
    Error {
        phone_number: String,
        error: String,
        call_statistics: Option<CallStatistics>,
        message_statistics: Option<MessageStatistics>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestSummary {
    pub total_numbers_requested: usize,
    pub successful_numbers: usize,
    pub failed_numbers: usize,
    pub include_recent_calls: bool,
    pub include_recent_messages: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedSummary {
    pub total_calls_across_all_numbers: usize,
    pub total_messages_across_all_numbers: usize,
    pub total_duration_seconds: u64,
    pub total_duration_formatted: String,
    pub successful_calls_across_all_numbers: usize,
    pub failed_calls_across_all_numbers: usize,
    pub combined_success_rate_percentage: f64,
    pub combined_failure_rate_percentage: f64,
    pub combined_average_duration_seconds: f64,
    pub combined_average_duration_formatted: String,
}

/// POST /analysis/twilio-multiple-numbers-analytics
#[derive(Debug, Clone, Serialize)]
pub struct MultipleNumbersResponse {
    pub request_summary: RequestSummary,
    pub combined_summary: CombinedSummary,
    pub individual_results: Vec<NumberResult>,
}
