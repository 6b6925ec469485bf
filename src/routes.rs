use actix_web::web;

use crate::{error::ApiError, handlers};

/// Malformed bodies, paths, queries and forms all answer 422 with a `detail` message.
fn extractor_errors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| ApiError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::FormConfig::default()
            .error_handler(|err, _req| ApiError::Validation(err.to_string()).into()),
    );
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    extractor_errors(cfg);

    cfg.route("/ping", web::get().to(handlers::health::ping))
        .route("/health", web::get().to(handlers::health::health))
        .route("/token", web::post().to(handlers::auth::login))
        .service(
            web::scope("/invitations")
                .route("/", web::get().to(handlers::invitation::list_invitations))
                .route("/", web::post().to(handlers::invitation::create_invitation))
                .route(
                    "/by_name/{name}",
                    web::get().to(handlers::invitation::get_invitation_by_name),
                )
                .route(
                    "/by_guest_name/",
                    web::get().to(handlers::invitation::get_invitation_by_guest_name),
                )
                .route(
                    "/{id}",
                    web::get().to(handlers::invitation::get_invitation),
                )
                .route(
                    "/{id}",
                    web::delete().to(handlers::invitation::delete_invitation),
                )
                .route(
                    "/{id}/guests/confirm",
                    web::post().to(handlers::invitation::confirm_guests),
                ),
        )
        .service(
            web::scope("/guests")
                .route("/", web::get().to(handlers::guest::list_guests))
                .route("/", web::post().to(handlers::guest::create_guest))
                .route("/count", web::get().to(handlers::guest::count_guests))
                .route("/{id}", web::get().to(handlers::guest::get_guest))
                .route("/{id}", web::patch().to(handlers::guest::update_guest))
                .route("/{id}", web::delete().to(handlers::guest::delete_guest))
                .route(
                    "/{id}/confirm",
                    web::patch().to(handlers::guest::confirm_guest),
                ),
        )
        .service(
            web::scope("/songs")
                .route("/", web::get().to(handlers::song::list_songs))
                .route("/", web::post().to(handlers::song::create_song))
                .route(
                    "/invitation/{invitation_id}",
                    web::get().to(handlers::song::list_songs_for_invitation),
                )
                .route("/{id}", web::get().to(handlers::song::get_song))
                .route("/{id}", web::put().to(handlers::song::update_song))
                .route("/{id}", web::delete().to(handlers::song::delete_song)),
        );
}
