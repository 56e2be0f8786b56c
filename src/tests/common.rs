//! tests/common.rs
//! Helpers compartidos: SQLite en memoria con las migraciones reales y un
//! transporte de correo simulado con fallos inyectables por dirección.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::config::dispatch_config::DispatchConfig;
use crate::models::campaign_model::CampaignStatus;
use crate::services::{
    campaign_service::CampaignService, dispatch_service::DispatchService,
    mailer_service::MailTransport, queue_service::QueueService,
};

/// Pool de una sola conexión: con varias, cada conexión de
/// "sqlite::memory:" tendría su propia base.
pub async fn setup_test_db() -> Pool<Sqlite> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("No se pudo abrir SQLite en memoria");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Fallo al correr migraciones de test");

    pool
}

pub async fn seed_contact(pool: &Pool<Sqlite>, name: &str, email: Option<&str>) -> String {
    let id = Uuid::new_v4().to_string();
    sqlx::query("INSERT INTO contacts (id, name, email) VALUES (?1, ?2, ?3)")
        .bind(&id)
        .bind(name)
        .bind(email)
        .execute(pool)
        .await
        .expect("No se pudo insertar contacto");
    id
}

pub async fn seed_stage(pool: &Pool<Sqlite>, name: &str) -> String {
    let id = Uuid::new_v4().to_string();
    sqlx::query("INSERT INTO funnel_stages (id, name) VALUES (?1, ?2)")
        .bind(&id)
        .bind(name)
        .execute(pool)
        .await
        .expect("No se pudo insertar etapa");
    id
}

pub async fn seed_opportunity(
    pool: &Pool<Sqlite>,
    contact_id: &str,
    stage_id: &str,
    status: &str,
) -> String {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO opportunities (id, contact_id, stage_id, status) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(&id)
    .bind(contact_id)
    .bind(stage_id)
    .bind(status)
    .execute(pool)
    .await
    .expect("No se pudo insertar oportunidad");
    id
}

pub fn make_dispatcher(
    pool: &Pool<Sqlite>,
    mailer: Arc<dyn MailTransport>,
    batch_size: i64,
) -> DispatchService {
    let config = DispatchConfig {
        batch_size,
        ..DispatchConfig::default()
    };
    DispatchService::new(
        QueueService::new(pool.clone()),
        CampaignService::new(pool.clone()),
        mailer,
        config,
    )
}

/// Invariantes del agregado, verificables tras cada tick:
/// `0 <= sent_count <= total_recipients`, y `completed` si y solo si
/// `total_recipients > 0 && sent_count >= total_recipients`.
pub async fn assert_campaign_invariants(pool: &Pool<Sqlite>) {
    let campaigns = CampaignService::new(pool.clone())
        .list_campaigns()
        .await
        .expect("No se pudieron listar campañas");

    for c in campaigns {
        assert!(c.sent_count >= 0, "sent_count negativo en {}", c.id);
        assert!(
            c.sent_count <= c.total_recipients,
            "sent_count {} > total_recipients {} en {}",
            c.sent_count,
            c.total_recipients,
            c.id
        );
        let should_complete = c.total_recipients > 0 && c.sent_count >= c.total_recipients;
        assert_eq!(
            c.status == CampaignStatus::Completed,
            should_complete,
            "estado {:?} inconsistente en {}",
            c.status,
            c.id
        );
    }
}

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to_email: String,
    pub subject: String,
    pub body: String,
}

/// Transporte simulado: registra lo enviado y falla para las
/// direcciones marcadas.
#[derive(Default)]
pub struct MockMailer {
    pub sent: Mutex<Vec<SentMail>>,
    fail_addresses: Vec<String>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(addresses: &[&str]) -> Self {
        MockMailer {
            sent: Mutex::new(Vec::new()),
            fail_addresses: addresses.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl MailTransport for MockMailer {
    async fn send(
        &self,
        to_email: &str,
        _to_name: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<()> {
        if self.fail_addresses.iter().any(|a| a == to_email) {
            return Err(anyhow!("el relay rechazó al destinatario {to_email}"));
        }
        self.sent.lock().unwrap().push(SentMail {
            to_email: to_email.to_string(),
            subject: subject.to_string(),
            body: html_body.to_string(),
        });
        Ok(())
    }
}
