use crate::{
    db::{Store, StoreError},
    error::ApiError,
    middleware::auth::AdminToken,
    models::{ConfirmGuestRequest, CreateGuestRequest, Guest, GuestPatch, NewGuest, TallyQuery},
    services::{
        confirmation::{plus_one_capacity, seat_balance},
        GuestTally,
    },
};
use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

fn guest_seats(guest: &Guest) -> i64 {
    seat_balance(guest.with_plus_one, guest.is_plus_one)
}

/// Reject a write whose net effect `change` on the free plus-one seats of
/// `invitation_id` would leave more plus-ones than granted seats.
async fn ensure_seats(store: &dyn Store, invitation_id: Uuid, change: i64) -> Result<(), ApiError> {
    if change >= 0 {
        return Ok(());
    }

    store
        .get_invitation(invitation_id)
        .await
        .map_err(|err| match err {
            StoreError::NotFound => ApiError::InvalidReference("Invitation"),
            other => ApiError::from(other),
        })?;
    let guests = store
        .list_guests_by_invitation(invitation_id)
        .await
        .map_err(ApiError::from)?;

    let available = plus_one_capacity(&guests);
    if available + change < 0 {
        log::warn!(
            "invitation {} has {} free plus-one seats, write needs {}",
            invitation_id,
            available,
            -change
        );
        return Err(ApiError::Overbooked);
    }
    Ok(())
}

pub async fn list_guests(store: web::Data<dyn Store>) -> Result<HttpResponse, actix_web::Error> {
    let guests = store.list_guests().await.map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(guests))
}

pub async fn count_guests(
    store: web::Data<dyn Store>,
    query: web::Query<TallyQuery>,
) -> Result<HttpResponse, actix_web::Error> {
    let guests = match query.invitation_id {
        Some(invitation_id) => {
            store
                .get_invitation(invitation_id)
                .await
                .map_err(ApiError::lookup("Invitation"))?;
            store.list_guests_by_invitation(invitation_id).await
        }
        None => store.list_guests().await,
    }
    .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(GuestTally::from_guests(&guests)))
}

pub async fn get_guest(
    store: web::Data<dyn Store>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, actix_web::Error> {
    let guest = store
        .get_guest(path.into_inner())
        .await
        .map_err(ApiError::lookup("Guest"))?;

    Ok(HttpResponse::Ok().json(guest))
}

pub async fn create_guest(
    _admin: AdminToken,
    store: web::Data<dyn Store>,
    body: web::Json<CreateGuestRequest>,
) -> Result<HttpResponse, actix_web::Error> {
    let new_guest = NewGuest::from(body.into_inner());
    new_guest.validate().map_err(ApiError::BadRequest)?;
    ensure_seats(
        store.get_ref(),
        new_guest.invitation_id,
        seat_balance(new_guest.with_plus_one, new_guest.is_plus_one),
    )
    .await?;

    let guest = store.insert_guest(&new_guest).await.map_err(ApiError::from)?;

    log::info!("added guest {} to invitation {}", guest.id, guest.invitation_id);

    Ok(HttpResponse::Created().json(guest))
}

pub async fn update_guest(
    _admin: AdminToken,
    store: web::Data<dyn Store>,
    path: web::Path<Uuid>,
    body: web::Json<GuestPatch>,
) -> Result<HttpResponse, actix_web::Error> {
    let guest_id = path.into_inner();

    let current = store
        .get_guest(guest_id)
        .await
        .map_err(ApiError::lookup("Guest"))?;
    body.validate_against(&current)
        .map_err(ApiError::BadRequest)?;

    let mut patched = current.clone();
    body.apply(&mut patched);
    if patched.invitation_id == current.invitation_id {
        ensure_seats(
            store.get_ref(),
            current.invitation_id,
            guest_seats(&patched) - guest_seats(&current),
        )
        .await?;
    } else {
        ensure_seats(store.get_ref(), current.invitation_id, -guest_seats(&current)).await?;
        ensure_seats(store.get_ref(), patched.invitation_id, guest_seats(&patched)).await?;
    }

    let guest = store
        .update_guest(guest_id, &body)
        .await
        .map_err(ApiError::lookup("Guest"))?;

    Ok(HttpResponse::Ok().json(guest))
}

pub async fn delete_guest(
    _admin: AdminToken,
    store: web::Data<dyn Store>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, actix_web::Error> {
    let guest_id = path.into_inner();

    let current = store
        .get_guest(guest_id)
        .await
        .map_err(ApiError::lookup("Guest"))?;
    ensure_seats(store.get_ref(), current.invitation_id, -guest_seats(&current)).await?;

    store
        .delete_guest(guest_id)
        .await
        .map_err(ApiError::lookup("Guest"))?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Guest deleted successfully" })))
}

/// Single-guest RSVP: attending with the chosen menu.
pub async fn confirm_guest(
    store: web::Data<dyn Store>,
    path: web::Path<Uuid>,
    body: web::Json<ConfirmGuestRequest>,
) -> Result<HttpResponse, actix_web::Error> {
    let guest = store
        .update_guest(
            path.into_inner(),
            &GuestPatch::attendance(Some(true), body.menu),
        )
        .await
        .map_err(ApiError::lookup("Guest"))?;

    Ok(HttpResponse::Ok().json(guest))
}
