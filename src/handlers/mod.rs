//! handlers/mod.rs
//! Módulo que agrupa los distintos handlers (campañas, health).

pub mod campaign_handler;
pub mod health_handler;
