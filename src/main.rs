mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;

use crate::{
    config::Config,
    db::{
        pool::{create_pool, run_migrations},
        MemoryStore, PgStore, Store,
    },
};
use actix_cors::Cors;
use actix_web::{
    http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    web, App, HttpServer,
};
use dotenv::dotenv;
use env_logger::Env;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::from_env().expect("Invalid configuration!");

    let store: Arc<dyn Store> = match &config.database_url {
        Some(database_url) => {
            let pool = create_pool(database_url)
                .await
                .expect("Failed to create database pool!");

            run_migrations(&pool)
                .await
                .expect("Failed to run migrations!");

            Arc::new(PgStore::new(pool))
        }
        None => {
            log::warn!("DATABASE_URL is not set, records are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    if config.admin.username.is_none() || config.admin.password.is_none() {
        log::warn!("ADMIN_USERNAME/ADMIN_PASSWORD not set, admin endpoints are unreachable");
    }

    let address = config.address();
    let admin = web::Data::new(config.admin.clone());
    log::info!("listening on {}", address);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .send_wildcard()
                    .allowed_headers(vec![AUTHORIZATION, ACCEPT])
                    .allowed_header(CONTENT_TYPE)
                    .max_age(3600),
            )
            .app_data(web::Data::from(store.clone()))
            .app_data(admin.clone())
            .configure(routes::configure)
    })
    .bind(&address)?
    .run()
    .await
}
