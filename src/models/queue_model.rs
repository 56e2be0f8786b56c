//! models/queue_model.rs
//! Filas de la fila de envío (`campaign_queue`).

use serde::{Deserialize, Serialize};

/// Estado de una entrada de la fila. `error` es terminal: no hay reintento
/// automático, solo queda registrado `attempts` y `last_error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum QueueStatus {
    Pending,
    Sent,
    Error,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct QueueEntry {
    pub id: String,
    pub campaign_id: String,
    pub recipient_email: String,
    pub recipient_name: String,
    pub status: QueueStatus,
    pub attempts: i64,
    pub last_error: Option<String>,
    pub created_at: String,
}

/// Fila pendiente ya unida con el subject/body de su campaña,
/// tal como la reclama el worker de despacho.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PendingEmail {
    pub id: String,
    pub campaign_id: String,
    pub recipient_email: String,
    pub recipient_name: String,
    pub subject: String,
    pub body: String,
}
