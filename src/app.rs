//! app.rs
use crate::handlers::{campaign_handler, health_handler};
use actix_web::web;

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(web::scope("/health").route("", web::get().to(health_handler::health_endpoint)))
            .service(
                web::scope("/email").service(
                    web::scope("/campaigns")
                        .route(
                            "",
                            web::get().to(campaign_handler::list_campaigns_endpoint),
                        )
                        .route(
                            "",
                            web::post().to(campaign_handler::create_campaign_endpoint),
                        ),
                ),
            ),
    );
}
