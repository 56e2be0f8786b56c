//! config/smtp_config.rs

use serde::{Deserialize, Serialize};

/// Credenciales SMTP, leídas del .env. Los defaults apuntan a un
/// relay de pruebas (ethereal) igual que el entorno de demo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    /// Nombre visible del remitente.
    pub from_name: String,
}

impl SmtpConfig {
    pub fn from_env() -> Self {
        SmtpConfig {
            host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.ethereal.email".to_string()),
            port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(587),
            user: std::env::var("SMTP_USER").unwrap_or_else(|_| "mock_user".to_string()),
            pass: std::env::var("SMTP_PASS").unwrap_or_else(|_| "mock_pass".to_string()),
            from_name: std::env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "CRM".to_string()),
        }
    }
}
