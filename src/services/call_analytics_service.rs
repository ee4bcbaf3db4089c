//! services/call_analytics_service.rs
//! Consulta bidireccional al proveedor, merge de resultados y estadísticas.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures_util::future::join_all;

use crate::{
    config::app_config::{
        CALL_LIST_LIMIT, MESSAGE_LIST_LIMIT, RECENT_ITEMS, RECENT_ITEMS_PER_NUMBER,
    },
    error::{ApiError, ApiResult},
    models::call_model::{
        CallAnalyticsResponse, CallRecord, CallStatistics, CombinedSummary, Direction,
        DirectionBreakdown, MessageRecord, MessageStatistics, MultipleNumbersResponse,
        MultiplePhoneNumbersRequest, NumberResult, NumberUsageResponse, ProviderCall,
        ProviderMessage, RequestSummary,
    },
    services::{
        phone_number::normalize_phone_number,
        twilio_client::{CallLogProvider, NumberFilter},
    },
};

const STATUS_COMPLETED: &str = "completed";
const FAILED_STATUSES: [&str; 4] = ["failed", "busy", "no-answer", "canceled"];

/// `"{m}m {s}s"`; sin duración reportada => `"0s"`.
pub fn format_duration(seconds: Option<u64>) -> String {
    match seconds {
        Some(secs) => format!("{}m {}s", secs / 60, secs % 60),
        None => "0s".to_string(),
    }
}

/// `"{h}h {m}m {s}s"` para totales acumulados.
pub fn format_long_duration(seconds: u64) -> String {
    format!(
        "{}h {}m {}s",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Porcentaje redondeado a 2 decimales; 0 cuando `total == 0`.
fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round2(part as f64 / total as f64 * 100.0)
    }
}

fn tag_call(call: ProviderCall, direction: Direction) -> CallRecord {
    CallRecord {
        duration_formatted: format_duration(call.duration_seconds),
        duration_seconds: call.duration_seconds.unwrap_or(0),
        date_created: call
            .date_created
            .map(|d| d.to_rfc3339())
            .unwrap_or_default(),
        sid: call.sid,
        to: call.to,
        from: call.from,
        direction,
        status: call.status,
    }
}

fn tag_message(msg: ProviderMessage, direction: Direction) -> MessageRecord {
    MessageRecord {
        date_created: msg
            .date_created
            .map(|d| d.to_rfc3339())
            .unwrap_or_default(),
        to: msg.to,
        from: msg.from,
        direction,
        status: msg.status,
    }
}

/// Concatena salientes seguidas de entrantes, conservando el orden del proveedor
/// dentro de cada grupo.
pub fn merge_calls(outbound: Vec<ProviderCall>, inbound: Vec<ProviderCall>) -> Vec<CallRecord> {
    let mut merged = Vec::with_capacity(outbound.len() + inbound.len());
    merged.extend(outbound.into_iter().map(|c| tag_call(c, Direction::Outbound)));
    merged.extend(inbound.into_iter().map(|c| tag_call(c, Direction::Inbound)));
    merged
}

pub fn merge_messages(
    outbound: Vec<ProviderMessage>,
    inbound: Vec<ProviderMessage>,
) -> Vec<MessageRecord> {
    let mut merged = Vec::with_capacity(outbound.len() + inbound.len());
    merged.extend(outbound.into_iter().map(|m| tag_message(m, Direction::Outbound)));
    merged.extend(inbound.into_iter().map(|m| tag_message(m, Direction::Inbound)));
    merged
}

pub fn call_statistics(calls: &[CallRecord]) -> CallStatistics {
    let count = |status: &str| calls.iter().filter(|c| c.status == status).count();

    let total_calls = calls.len();
    let completed_calls = count(STATUS_COMPLETED);
    let failed_total = calls
        .iter()
        .filter(|c| FAILED_STATUSES.contains(&c.status.as_str()))
        .count();
    let total_duration: u64 = calls
        .iter()
        .filter(|c| c.status == STATUS_COMPLETED)
        .map(|c| c.duration_seconds)
        .sum();
    let average = if completed_calls > 0 {
        round2(total_duration as f64 / completed_calls as f64)
    } else {
        0.0
    };

    CallStatistics {
        total_calls,
        completed_calls,
        failed_calls: count("failed"),
        busy_calls: count("busy"),
        no_answer_calls: count("no-answer"),
        canceled_calls: count("canceled"),
        average_call_duration_seconds: average,
        total_call_duration_seconds: total_duration,
        success_rate_percentage: percentage(completed_calls, total_calls),
        failure_rate_percentage: percentage(failed_total, total_calls),
    }
}

pub fn message_statistics(messages: &[MessageRecord]) -> MessageStatistics {
    let count = |status: &str| messages.iter().filter(|m| m.status == status).count();
    MessageStatistics {
        total_messages: messages.len(),
        delivered_messages: count("delivered"),
        failed_messages: count("failed"),
        sent_messages: count("sent"),
    }
}

pub fn status_breakdown(calls: &[CallRecord]) -> BTreeMap<String, usize> {
    let mut breakdown = BTreeMap::new();
    for call in calls {
        *breakdown.entry(call.status.clone()).or_insert(0) += 1;
    }
    breakdown
}

fn direction_breakdown(calls: &[CallRecord]) -> DirectionBreakdown {
    let outbound = calls
        .iter()
        .filter(|c| c.direction == Direction::Outbound)
        .count();
    DirectionBreakdown {
        outbound,
        inbound: calls.len() - outbound,
    }
}

/// Acumulado de los números que respondieron bien en la vista multi-número.
#[derive(Debug, Default)]
struct CombinedTotals {
    total_calls: usize,
    total_messages: usize,
    total_duration: u64,
    successful_calls: usize,
    failed_calls: usize,
}

impl CombinedTotals {
    fn add(&mut self, calls: &CallStatistics, messages: &MessageStatistics) {
        self.total_calls += calls.total_calls;
        self.total_messages += messages.total_messages;
        self.total_duration += calls.total_call_duration_seconds;
        self.successful_calls += calls.completed_calls;
        self.failed_calls +=
            calls.failed_calls + calls.busy_calls + calls.no_answer_calls + calls.canceled_calls;
    }

    fn summary(&self) -> CombinedSummary {
        let average = if self.successful_calls > 0 {
            round2(self.total_duration as f64 / self.successful_calls as f64)
        } else {
            0.0
        };
        let average_secs = average as u64;

        CombinedSummary {
            total_calls_across_all_numbers: self.total_calls,
            total_messages_across_all_numbers: self.total_messages,
            total_duration_seconds: self.total_duration,
            total_duration_formatted: format_long_duration(self.total_duration),
            successful_calls_across_all_numbers: self.successful_calls,
            failed_calls_across_all_numbers: self.failed_calls,
            combined_success_rate_percentage: percentage(self.successful_calls, self.total_calls),
            combined_failure_rate_percentage: percentage(self.failed_calls, self.total_calls),
            combined_average_duration_seconds: average,
            combined_average_duration_formatted: if average_secs > 0 {
                format_duration(Some(average_secs))
            } else {
                "0s".to_string()
            },
        }
    }
}

#[derive(Clone)]
pub struct CallAnalyticsService {
    provider: Option<Arc<dyn CallLogProvider>>,
}

impl CallAnalyticsService {
    /// `provider == None` cuando faltan credenciales; cada request lo reporta.
    pub fn new(provider: Option<Arc<dyn CallLogProvider>>) -> Self {
        Self { provider }
    }

    fn provider(&self) -> ApiResult<&dyn CallLogProvider> {
        self.provider
            .as_deref()
            .ok_or(ApiError::ProviderNotConfigured)
    }

    /// Lanza ambas direcciones en paralelo. Si cualquiera falla, falla todo.
    pub async fn fetch_calls(&self, number: &str) -> ApiResult<Vec<CallRecord>> {
        let provider = self.provider()?;
        let (outbound, inbound) = tokio::try_join!(
            provider.list_calls(NumberFilter::From(number), CALL_LIST_LIMIT),
            provider.list_calls(NumberFilter::To(number), CALL_LIST_LIMIT),
        )?;
        log::info!(
            "(fetch_calls) {}: {} salientes, {} entrantes",
            number,
            outbound.len(),
            inbound.len()
        );
        Ok(merge_calls(outbound, inbound))
    }

    pub async fn fetch_messages(&self, number: &str) -> ApiResult<Vec<MessageRecord>> {
        let provider = self.provider()?;
        let (outbound, inbound) = tokio::try_join!(
            provider.list_messages(NumberFilter::From(number), MESSAGE_LIST_LIMIT),
            provider.list_messages(NumberFilter::To(number), MESSAGE_LIST_LIMIT),
        )?;
        Ok(merge_messages(outbound, inbound))
    }

    pub async fn number_usage(&self, raw_number: &str) -> ApiResult<NumberUsageResponse> {
        let number = normalize_phone_number(raw_number)?;
        let (calls, messages) =
            tokio::try_join!(self.fetch_calls(&number), self.fetch_messages(&number))?;

        Ok(NumberUsageResponse {
            call_statistics: call_statistics(&calls),
            message_statistics: message_statistics(&messages),
            recent_calls: calls.into_iter().take(RECENT_ITEMS).collect(),
            recent_messages: messages.into_iter().take(RECENT_ITEMS).collect(),
            phone_number: number,
        })
    }

    pub async fn call_analytics(&self, raw_number: &str) -> ApiResult<CallAnalyticsResponse> {
        let number = normalize_phone_number(raw_number)?;
        let calls = self.fetch_calls(&number).await?;

        Ok(CallAnalyticsResponse {
            call_statistics: call_statistics(&calls),
            status_breakdown: status_breakdown(&calls),
            direction_breakdown: direction_breakdown(&calls),
            calls,
            phone_number: number,
        })
    }

    /// Un número que falla no aborta a los demás: queda como entrada `error`.
    pub async fn multiple_numbers(
        &self,
        req: MultiplePhoneNumbersRequest,
    ) -> ApiResult<MultipleNumbersResponse> {
        if req.phone_numbers.is_empty() {
            return Err(ApiError::InvalidInput(
                "phone_numbers must not be empty".to_string(),
            ));
        }
        self.provider()?;

        let results = join_all(
            req.phone_numbers
                .iter()
                .map(|raw| self.single_number_result(raw, &req)),
        )
        .await;

        let mut totals = CombinedTotals::default();
        let mut successful_numbers = 0;
        for result in &results {
            if let NumberResult::Success {
                call_statistics,
                message_statistics,
                ..
            } = result
            {
                successful_numbers += 1;
                totals.add(call_statistics, message_statistics);
            }
        }

        Ok(MultipleNumbersResponse {
            request_summary: RequestSummary {
                total_numbers_requested: req.phone_numbers.len(),
                successful_numbers,
                failed_numbers: results.len() - successful_numbers,
                include_recent_calls: req.include_recent_calls,
                include_recent_messages: req.include_recent_messages,
            },
            combined_summary: totals.summary(),
            individual_results: results,
        })
    }

    async fn single_number_result(
        &self,
        raw_number: &str,
        req: &MultiplePhoneNumbersRequest,
    ) -> NumberResult {
        match self.collect_number(raw_number, req).await {
            Ok((calls, messages)) => NumberResult::Success {
                phone_number: raw_number.to_string(),
                call_statistics: call_statistics(&calls),
                message_statistics: message_statistics(&messages),
                recent_calls: req
                    .include_recent_calls
                    .then(|| calls.into_iter().take(RECENT_ITEMS_PER_NUMBER).collect()),
                recent_messages: req
                    .include_recent_messages
                    .then(|| messages.into_iter().take(RECENT_ITEMS_PER_NUMBER).collect()),
            },
            Err(e) => {
                log::error!("(multiple_numbers) Falló el número {}: {}", raw_number, e);
                NumberResult::Error {
                    phone_number: raw_number.to_string(),
                    error: e.to_string(),
                    call_statistics: None,
                    message_statistics: None,
                }
            }
        }
    }

    async fn collect_number(
        &self,
        raw_number: &str,
        req: &MultiplePhoneNumbersRequest,
    ) -> ApiResult<(Vec<CallRecord>, Vec<MessageRecord>)> {
        let number = normalize_phone_number(raw_number)?;
        if req.include_recent_messages {
            tokio::try_join!(self.fetch_calls(&number), self.fetch_messages(&number))
        } else {
            Ok((self.fetch_calls(&number).await?, Vec::new()))
        }
    }
}
