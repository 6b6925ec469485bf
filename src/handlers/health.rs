use crate::db::Store;
use actix_web::{web, HttpResponse};
use serde_json::json;

pub async fn ping() -> HttpResponse {
    HttpResponse::Ok().json("pong")
}

pub async fn health(store: web::Data<dyn Store>) -> HttpResponse {
    match store.ping().await {
        Ok(()) => HttpResponse::Ok().json(json!({ "message": "Database connection successful!" })),
        Err(err) => {
            log::error!("health check failed: {}", err);
            HttpResponse::ServiceUnavailable()
                .json(json!({ "message": "Failed to connect to the database." }))
        }
    }
}
