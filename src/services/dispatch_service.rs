//! services/dispatch_service.rs
//! Worker de despacho: drena la fila de envío en lotes acotados.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;

use crate::{
    config::dispatch_config::DispatchConfig,
    models::queue_model::PendingEmail,
    services::{
        campaign_service::CampaignService, mailer_service::MailTransport,
        queue_service::QueueService,
    },
};

#[derive(Clone)]
pub struct DispatchService {
    queue_service: QueueService,
    campaign_service: CampaignService,
    mailer: Arc<dyn MailTransport>,
    config: DispatchConfig,
}

impl DispatchService {
    pub fn new(
        queue_service: QueueService,
        campaign_service: CampaignService,
        mailer: Arc<dyn MailTransport>,
        config: DispatchConfig,
    ) -> Self {
        DispatchService {
            queue_service,
            campaign_service,
            mailer,
            config,
        }
    }

    /// Un tick: reclama hasta `batch_size` entradas pendientes, intenta cada
    /// envío en orden y registra el resultado. Devuelve cuántas procesó.
    pub async fn process_tick(&self) -> Result<usize> {
        let batch = self
            .queue_service
            .claim_pending(self.config.batch_size)
            .await?;
        if batch.is_empty() {
            return Ok(0);
        }

        log::info!("Procesando {} emails de la fila...", batch.len());

        let mut touched: Vec<String> = Vec::new();
        for item in &batch {
            self.process_entry(item).await;
            if !touched.contains(&item.campaign_id) {
                touched.push(item.campaign_id.clone());
            }
        }

        // Fase de finalización: un chequeo por campaña tocada en este tick.
        for campaign_id in &touched {
            if let Err(e) = self.campaign_service.finalize_if_complete(campaign_id).await {
                log::error!(
                    "Fallo el chequeo de finalización de {}: {:?}",
                    campaign_id,
                    e
                );
            }
        }

        Ok(batch.len())
    }

    /// Procesa una entrada. Ningún fallo (de entrega o de storage) corta el
    /// lote: un destinatario no bloquea a los demás. No se sostiene ninguna
    /// transacción durante el envío; el estado se escribe al resolverse.
    async fn process_entry(&self, item: &PendingEmail) {
        let body = render_body(&item.body, &item.recipient_name);

        match self
            .mailer
            .send(
                &item.recipient_email,
                &item.recipient_name,
                &item.subject,
                &body,
            )
            .await
        {
            Ok(()) => {
                if let Err(e) = self.queue_service.mark_sent(&item.id).await {
                    // La entrada sigue `pending`; el próximo tick la re-reclama.
                    log::error!("Fallo al marcar {} como enviada: {:?}", item.id, e);
                    return;
                }
                if let Err(e) = self.campaign_service.record_delivery(&item.campaign_id).await {
                    log::error!(
                        "Fallo al actualizar sent_count de {}: {:?}",
                        item.campaign_id,
                        e
                    );
                }
            }
            Err(e) => {
                log::warn!("Fallo el envío a {}: {}", item.recipient_email, e);
                let error = format!("{e:#}");
                if let Err(e2) = self.queue_service.mark_error(&item.id, &error).await {
                    log::error!("Fallo al marcar {} como error: {:?}", item.id, e2);
                }
            }
        }
    }

    /// Bucle del worker: periodo fijo, backoff cuando la fila lleva varios
    /// ticks vacía, y apagado ordenado (termina el lote en curso y retorna
    /// al recibir la señal).
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let base = Duration::from_secs(self.config.poll_interval_secs);
        let mut delay = base;
        let mut empty_ticks: u32 = 0;

        log::info!(
            "Worker de despacho activo (lote={}, periodo={}s)",
            self.config.batch_size,
            self.config.poll_interval_secs
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        log::info!("Worker de despacho: apagado ordenado");
                        break;
                    }
                    continue;
                }
            }

            match self.process_tick().await {
                Ok(0) => {
                    empty_ticks += 1;
                    let next = next_poll_delay(&self.config, delay, empty_ticks);
                    if next != delay {
                        log::debug!("Fila vacía, el periodo de polling sube a {:?}", next);
                    }
                    delay = next;
                }
                Ok(_) => {
                    empty_ticks = 0;
                    delay = base;
                }
                Err(e) => {
                    // Un tick fallido no tumba el proceso.
                    log::error!("Fallo el tick de despacho: {:?}", e);
                    empty_ticks = 0;
                    delay = base;
                }
            }
        }
    }
}

/// Sustituye el placeholder `{{name}}` del body por el nombre del destinatario.
pub fn render_body(body: &str, recipient_name: &str) -> String {
    body.replace("{{name}}", recipient_name)
}

/// Siguiente periodo de polling tras un tick vacío: a partir de
/// `backoff_after_empty_ticks` consecutivos el periodo se duplica hasta
/// `max_poll_interval_secs`. Un tick no vacío resetea al periodo base.
pub fn next_poll_delay(config: &DispatchConfig, current: Duration, empty_ticks: u32) -> Duration {
    let max = Duration::from_secs(config.max_poll_interval_secs);
    if empty_ticks >= config.backoff_after_empty_ticks && current < max {
        (current * 2).min(max)
    } else {
        current
    }
}
