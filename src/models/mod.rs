//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

pub mod campaign_model;
pub mod contact_model;
pub mod queue_model;
