//! services/phone_number.rs
//! Normalización de números telefónicos al formato `+<dígitos>`.

use crate::error::{ApiError, ApiResult};

/// Antepone `+` si falta. No valida cantidad de dígitos ni código de país;
/// solo rechaza la entrada vacía.
pub fn normalize_phone_number(raw: &str) -> ApiResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput(
            "phone_number must not be empty".to_string(),
        ));
    }

    if trimmed.starts_with('+') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("+{}", trimmed))
    }
}
