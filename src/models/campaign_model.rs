use serde::{Deserialize, Serialize};

/// Ciclo de vida de una campaña. Se persiste como TEXT en minúsculas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum CampaignStatus {
    Draft,
    Sending,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CampaignRecord {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub body: String,
    /// Etapa del funnel usada como filtro de audiencia; None = todos los contactos.
    pub stage_filter_id: Option<String>,
    /// Nombre de la etapa (viene del JOIN en el listado).
    #[sqlx(default)]
    pub stage_name: Option<String>,
    pub total_recipients: i64,
    pub sent_count: i64,
    pub status: CampaignStatus,
    pub created_at: String,
}

/// Request para crear una campaña (POST /api/email/campaigns).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaignRequest {
    pub title: String,
    pub subject: String,
    pub body: String,
    // El cliente puede mandar el filtro como audienceFilter o stageFilterId.
    #[serde(default, alias = "stageFilterId", alias = "audienceFilter")]
    pub stage_filter_id: Option<String>,
}
