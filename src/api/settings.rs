use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

/// Wire shape for the settings object (terminal clients expect camelCase).
#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    #[serde(rename = "lowStockThreshold")]
    pub low_stock_threshold: u32,
    #[serde(rename = "taxRate")]
    pub tax_rate: f64,
    pub currency: String,
}

/// GET /api/settings — static business thresholds from config.
/// There is no mutation path; changing them requires a restart.
pub async fn get_settings(State(state): State<AppState>) -> Json<SettingsResponse> {
    Json(SettingsResponse {
        low_stock_threshold: state.settings.low_stock_threshold,
        tax_rate: state.settings.tax_rate,
        currency: state.settings.currency.clone(),
    })
}
