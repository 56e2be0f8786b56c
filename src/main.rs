use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tokio::sync::watch;

use crate::config::dispatch_config::DispatchConfig;
use crate::config::smtp_config::SmtpConfig;
use crate::logger::init_logger;
use crate::services::campaign_service::CampaignService;
use crate::services::dispatch_service::DispatchService;
use crate::services::mailer_service::SmtpMailer;
use crate::services::queue_service::QueueService;

mod app;
mod config;
mod handlers;
mod logger;
mod models;
mod services;
#[cfg(test)]
mod tests;

async fn setup_database() -> Pool<Sqlite> {
    // 1) Crear carpeta "data"
    std::fs::create_dir_all("data").expect("No se pudo crear directorio 'data'");

    // 2) Ruta final: ./data/crm.db
    let db_path = std::env::current_dir()
        .expect("No se pudo obtener el current_dir")
        .join("data")
        .join("crm.db");

    log::info!("Conectando a SQLite en {}", db_path.to_string_lossy());

    // 3) Conectarnos con SQLx
    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .expect("No se pudo conectar a la base de datos SQLite.")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    // Conectarnos a la DB
    let db_pool = setup_database().await;

    // CampaignService + migraciones
    let campaign_service = CampaignService::new(db_pool.clone());
    if let Err(e) = campaign_service.run_migrations().await {
        panic!("Fallo en migraciones: {:?}", e);
    }

    let queue_service = QueueService::new(db_pool.clone());

    // Transporte SMTP real; el worker lo recibe como trait object
    let smtp_config = SmtpConfig::from_env();
    let mailer = SmtpMailer::new(&smtp_config).expect("No se pudo construir el transporte SMTP");

    // Worker de despacho, con canal de apagado ordenado
    let dispatch_service = DispatchService::new(
        queue_service,
        campaign_service.clone(),
        Arc::new(mailer),
        DispatchConfig::from_env(),
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = tokio::spawn(dispatch_service.run(shutdown_rx));

    // Levantar servidor
    log::info!("Levantando servidor en 0.0.0.0:5030");
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(campaign_service.clone()))
            .configure(app::init_app)
    })
    .workers(1)
    .bind(("0.0.0.0", 5030))?
    .run()
    .await?;

    // El worker termina el lote en curso antes de salir
    let _ = shutdown_tx.send(true);
    let _ = worker.await;

    Ok(())
}
