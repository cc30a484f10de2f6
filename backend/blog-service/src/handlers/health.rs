use actix_web::{web, HttpResponse};

use crate::state::AppState;

pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    match state.store.posts.health_check().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "blog-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => {
            tracing::warn!(error = %e, "Store health check failed");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unhealthy",
                "error": "store unavailable",
                "service": "blog-service"
            }))
        }
    }
}
