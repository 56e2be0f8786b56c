//! services/campaign_service.rs

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::{
    models::campaign_model::{CampaignRecord, CreateCampaignRequest},
    services::{queue_service::QueueService, recipient_service::RecipientResolver},
};

#[derive(Debug, Clone)]
pub struct CampaignService {
    db_pool: Pool<Sqlite>,
    resolver: RecipientResolver,
}

impl CampaignService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        CampaignService {
            db_pool,
            resolver: RecipientResolver::new(),
        }
    }

    /// Ejecuta migraciones de la base de datos
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db_pool)
            .await
            .context("Failed to run campaign service migrations")?;
        Ok(())
    }

    /// Crea la campaña y puebla su fila de envío en una sola transacción:
    /// insertar campaña en `draft`, resolver destinatarios, encolar una
    /// entrada por destinatario con email no vacío y fijar `total_recipients`
    /// al conteo real de entradas. Cualquier fallo revierte todo; no queda
    /// una campaña a medio crear.
    pub async fn create_campaign(&self, req: CreateCampaignRequest) -> Result<String> {
        let campaign_id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339();

        let mut tx = self
            .db_pool
            .begin()
            .await
            .context("No se pudo abrir la transacción de creación")?;

        sqlx::query(
            r#"
            INSERT INTO campaigns (
                id, title, subject, body, stage_filter_id,
                total_recipients, sent_count, status, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, 0, 0, 'draft', ?6)
            "#,
        )
        .bind(&campaign_id)
        .bind(&req.title)
        .bind(&req.subject)
        .bind(&req.body)
        .bind(req.stage_filter_id.as_deref())
        .bind(&created_at)
        .execute(&mut *tx)
        .await
        .context("Fallo al insertar la campaña")?;

        let recipients = self
            .resolver
            .resolve(&mut *tx, req.stage_filter_id.as_deref())
            .await?;

        let mut inserted: i64 = 0;
        for recipient in &recipients {
            // Los contactos sin email no entran a la fila.
            let email = recipient
                .email
                .as_deref()
                .map(str::trim)
                .filter(|e| !e.is_empty());

            if let Some(email) = email {
                QueueService::enqueue(&mut *tx, &campaign_id, &recipient.name, email).await?;
                inserted += 1;
            }
        }

        sqlx::query("UPDATE campaigns SET total_recipients = ?1 WHERE id = ?2")
            .bind(inserted)
            .bind(&campaign_id)
            .execute(&mut *tx)
            .await
            .context("Fallo al fijar total_recipients")?;

        tx.commit()
            .await
            .context("Fallo al confirmar la creación de la campaña")?;

        log::info!(
            "Campaña {} creada con {} destinatarios",
            campaign_id,
            inserted
        );
        Ok(campaign_id)
    }

    /// Lista campañas, las más recientes primero, con el nombre de la etapa
    /// del filtro (NULL cuando la campaña va a todos los contactos).
    pub async fn list_campaigns(&self) -> Result<Vec<CampaignRecord>> {
        sqlx::query_as::<_, CampaignRecord>(
            r#"
            SELECT c.id, c.title, c.subject, c.body, c.stage_filter_id,
                   s.name AS stage_name,
                   c.total_recipients, c.sent_count, c.status, c.created_at
            FROM campaigns c
            LEFT JOIN funnel_stages s ON c.stage_filter_id = s.id
            ORDER BY c.created_at DESC
            "#,
        )
        .fetch_all(&self.db_pool)
        .await
        .context("Fallo al listar campañas")
    }

    pub async fn get_campaign(&self, campaign_id: &str) -> Result<CampaignRecord> {
        sqlx::query_as::<_, CampaignRecord>(
            r#"
            SELECT c.id, c.title, c.subject, c.body, c.stage_filter_id,
                   s.name AS stage_name,
                   c.total_recipients, c.sent_count, c.status, c.created_at
            FROM campaigns c
            LEFT JOIN funnel_stages s ON c.stage_filter_id = s.id
            WHERE c.id = ?1
            "#,
        )
        .bind(campaign_id)
        .fetch_one(&self.db_pool)
        .await
        .context("No se encontró campaña con ese id")
    }

    /// Registra una entrega exitosa: `sent_count + 1`, y la campaña pasa de
    /// `draft` a `sending` con su primera entrega. Un solo UPDATE, así el
    /// incremento es atómico frente a ticks concurrentes.
    pub async fn record_delivery(&self, campaign_id: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE campaigns
            SET sent_count = sent_count + 1,
                status = CASE WHEN status = 'draft' THEN 'sending' ELSE status END
            WHERE id = ?1
            "#,
        )
        .bind(campaign_id)
        .execute(&self.db_pool)
        .await
        .context("Fallo al incrementar sent_count")?;

        Ok(())
    }

    /// Monitor de finalización: completa la campaña cuando `sent_count`
    /// alcanza `total_recipients` (con total > 0; una campaña sin
    /// destinatarios queda en `draft`). El guard del UPDATE lo hace
    /// idempotente. Devuelve si esta llamada la completó.
    pub async fn finalize_if_complete(&self, campaign_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE campaigns
            SET status = 'completed'
            WHERE id = ?1
              AND total_recipients > 0
              AND sent_count >= total_recipients
              AND status != 'completed'
            "#,
        )
        .bind(campaign_id)
        .execute(&self.db_pool)
        .await
        .context("Fallo al verificar finalización de la campaña")?;

        let completed = result.rows_affected() > 0;
        if completed {
            log::info!("Campaña {} completada", campaign_id);
        }
        Ok(completed)
    }
}
