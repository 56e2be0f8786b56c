//! services/recipient_service.rs

use anyhow::{Context, Result};
use sqlx::SqliteConnection;

use crate::models::contact_model::Recipient;

/// Resuelve la audiencia de una campaña en el momento de crearla.
#[derive(Debug, Clone, Default)]
pub struct RecipientResolver;

impl RecipientResolver {
    pub fn new() -> Self {
        RecipientResolver
    }

    /// Devuelve los pares (nombre, email) de la audiencia. Con filtro de
    /// etapa son los contactos con una oportunidad abierta en esa etapa;
    /// sin filtro, todos los contactos del sistema. Corre sobre la conexión
    /// que se le pase, para que la creación de campaña pueda ejecutarlo
    /// dentro de su transacción.
    pub async fn resolve(
        &self,
        conn: &mut SqliteConnection,
        stage_filter: Option<&str>,
    ) -> Result<Vec<Recipient>> {
        let recipients = match stage_filter {
            Some(stage_id) => sqlx::query_as::<_, Recipient>(
                r#"
                SELECT DISTINCT c.name, c.email
                FROM contacts c
                JOIN opportunities o ON o.contact_id = c.id
                WHERE o.stage_id = ?1 AND o.status = 'open'
                "#,
            )
            .bind(stage_id)
            .fetch_all(conn)
            .await
            .context("Fallo al resolver contactos por etapa")?,
            None => sqlx::query_as::<_, Recipient>("SELECT name, email FROM contacts")
                .fetch_all(conn)
                .await
                .context("Fallo al listar todos los contactos")?,
        };

        Ok(recipients)
    }
}
