//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod campaign_service;
pub mod dispatch_service;
pub mod mailer_service;
pub mod queue_service;
pub mod recipient_service;
