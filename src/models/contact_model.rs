//! models/contact_model.rs

use sqlx::FromRow;

/// Par (nombre, email) que devuelve el resolver de destinatarios.
/// El email puede faltar: esos contactos se descartan al poblar la fila.
#[derive(Debug, Clone, FromRow)]
pub struct Recipient {
    pub name: String,
    pub email: Option<String>,
}
