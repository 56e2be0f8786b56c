//! services/queue_service.rs
//! Acceso a la fila de envío (`campaign_queue`).

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite, SqliteConnection};
use uuid::Uuid;

use crate::models::queue_model::{PendingEmail, QueueEntry, QueueStatus};

#[derive(Debug, Clone)]
pub struct QueueService {
    db_pool: Pool<Sqlite>,
}

impl QueueService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        QueueService { db_pool }
    }

    /// Inserta una entrada `pending`. Recibe la conexión para poder formar
    /// parte de la transacción de creación de campaña.
    pub async fn enqueue(
        conn: &mut SqliteConnection,
        campaign_id: &str,
        recipient_name: &str,
        recipient_email: &str,
    ) -> Result<String> {
        let entry_id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO campaign_queue (
                id, campaign_id, recipient_email, recipient_name,
                status, attempts, created_at
            )
            VALUES (?1, ?2, ?3, ?4, 'pending', 0, ?5)
            "#,
        )
        .bind(&entry_id)
        .bind(campaign_id)
        .bind(recipient_email)
        .bind(recipient_name)
        .bind(&created_at)
        .execute(conn)
        .await
        .context("Fallo al insertar en la fila de envío")?;

        Ok(entry_id)
    }

    /// Fase de claim del worker: hasta `limit` entradas pendientes en orden
    /// de inserción, ya unidas con el subject/body de su campaña.
    /// Asume un único worker; con varios haría falta un claim condicional.
    pub async fn claim_pending(&self, limit: i64) -> Result<Vec<PendingEmail>> {
        sqlx::query_as::<_, PendingEmail>(
            r#"
            SELECT q.id, q.campaign_id, q.recipient_email, q.recipient_name,
                   c.subject, c.body
            FROM campaign_queue q
            JOIN campaigns c ON q.campaign_id = c.id
            WHERE q.status = 'pending'
            ORDER BY q.rowid
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db_pool)
        .await
        .context("Fallo al reclamar entradas pendientes")
    }

    pub async fn mark_sent(&self, entry_id: &str) -> Result<()> {
        self.record_outcome(entry_id, QueueStatus::Sent, None).await
    }

    pub async fn mark_error(&self, entry_id: &str, error: &str) -> Result<()> {
        self.record_outcome(entry_id, QueueStatus::Error, Some(error))
            .await
    }

    // attempts sube exactamente 1 por pasada, tanto en éxito como en fallo.
    async fn record_outcome(
        &self,
        entry_id: &str,
        status: QueueStatus,
        error: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE campaign_queue
            SET status = ?1,
                last_error = ?2,
                attempts = attempts + 1
            WHERE id = ?3
            "#,
        )
        .bind(status)
        .bind(error)
        .bind(entry_id)
        .execute(&self.db_pool)
        .await
        .context("Fallo al actualizar estado de la entrada")?;

        Ok(())
    }

    /// Entradas de una campaña, en orden de inserción.
    pub async fn entries_for_campaign(&self, campaign_id: &str) -> Result<Vec<QueueEntry>> {
        sqlx::query_as::<_, QueueEntry>(
            r#"
            SELECT id, campaign_id, recipient_email, recipient_name,
                   status, attempts, last_error, created_at
            FROM campaign_queue
            WHERE campaign_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(campaign_id)
        .fetch_all(&self.db_pool)
        .await
        .context("Fallo al listar entradas de la campaña")
    }

    pub async fn pending_count(&self) -> Result<i64> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM campaign_queue WHERE status = 'pending'")
                .fetch_one(&self.db_pool)
                .await
                .context("Fallo al contar pendientes")?;
        Ok(count.0)
    }
}
