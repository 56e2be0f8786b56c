use crate::{
    models::campaign_model::CreateCampaignRequest, services::campaign_service::CampaignService,
};
use actix_web::{web, HttpResponse};
use serde_json::json;

/// GET /api/email/campaigns
pub async fn list_campaigns_endpoint(campaign_service: web::Data<CampaignService>) -> HttpResponse {
    match campaign_service.list_campaigns().await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => {
            log::error!("Error al listar campañas: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "error": e.to_string()
            }))
        }
    }
}

/// POST /api/email/campaigns
pub async fn create_campaign_endpoint(
    campaign_service: web::Data<CampaignService>,
    body: web::Json<CreateCampaignRequest>,
) -> HttpResponse {
    match campaign_service.create_campaign(body.into_inner()).await {
        Ok(campaign_id) => HttpResponse::Ok().json(json!({
            "success": true,
            "campaignId": campaign_id
        })),
        Err(e) => {
            log::error!("Error al crear campaña: {:?}", e);
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "error": e.to_string()
            }))
        }
    }
}
