use crate::{
    db::Store,
    error::ApiError,
    middleware::auth::AdminToken,
    models::{NewSong, UpdateSongRequest},
};
use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

fn require_name(name: &str) -> Result<&str, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }
    Ok(name)
}

pub async fn list_songs(store: web::Data<dyn Store>) -> Result<HttpResponse, actix_web::Error> {
    let songs = store.list_songs().await.map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(songs))
}

pub async fn get_song(
    store: web::Data<dyn Store>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, actix_web::Error> {
    let song = store
        .get_song(path.into_inner())
        .await
        .map_err(ApiError::lookup("Song"))?;

    Ok(HttpResponse::Ok().json(song))
}

pub async fn list_songs_for_invitation(
    store: web::Data<dyn Store>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, actix_web::Error> {
    let songs = store
        .list_songs_by_invitation(path.into_inner())
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(songs))
}

pub async fn create_song(
    store: web::Data<dyn Store>,
    body: web::Json<NewSong>,
) -> Result<HttpResponse, actix_web::Error> {
    let song = NewSong {
        name: require_name(&body.name)?.to_string(),
        invitation_id: body.invitation_id,
    };

    let song = store.insert_song(&song).await.map_err(ApiError::from)?;

    Ok(HttpResponse::Created().json(song))
}

pub async fn update_song(
    _admin: AdminToken,
    store: web::Data<dyn Store>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateSongRequest>,
) -> Result<HttpResponse, actix_web::Error> {
    let name = require_name(&body.name)?;

    let song = store
        .rename_song(path.into_inner(), name)
        .await
        .map_err(ApiError::lookup("Song"))?;

    Ok(HttpResponse::Ok().json(song))
}

pub async fn delete_song(
    _admin: AdminToken,
    store: web::Data<dyn Store>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, actix_web::Error> {
    store
        .delete_song(path.into_inner())
        .await
        .map_err(ApiError::lookup("Song"))?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Song deleted successfully" })))
}
