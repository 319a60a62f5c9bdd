//! Login endpoint.
//!
//! The credential check is a fixed rule set standing in for a real identity
//! provider; it yields only the role tag and display name the terminal shows.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "loginType")]
    pub login_type: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(rename = "userType", skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    #[serde(rename = "userName", skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// POST /api/login — body `{loginType, password}`.
pub async fn login(Json(body): Json<LoginRequest>) -> Result<Json<LoginResponse>, (StatusCode, Json<LoginResponse>)> {
    let granted = match (body.login_type.as_str(), body.password.as_str()) {
        ("admin", "admin123") => Some(("admin", "Administrator")),
        ("user", "user123") => Some(("user", "Cashier")),
        _ => None,
    };

    match granted {
        Some((user_type, user_name)) => Ok(Json(LoginResponse {
            success: true,
            user_type: Some(user_type.to_string()),
            user_name: Some(user_name.to_string()),
            message: None,
        })),
        None => {
            tracing::warn!(login_type = %body.login_type, "Rejected login attempt");
            Err((
                StatusCode::UNAUTHORIZED,
                Json(LoginResponse {
                    success: false,
                    user_type: None,
                    user_name: None,
                    message: Some("Invalid credentials".to_string()),
                }),
            ))
        }
    }
}
