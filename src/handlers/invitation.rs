use crate::{
    db::{Store, StoreError},
    error::ApiError,
    middleware::auth::AdminToken,
    models::{
        ConfirmGuestsRequest, CreateInvitationRequest, GuestNameQuery, Invitation,
        InvitationWithGuests,
    },
    services,
};
use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

async fn with_guests(
    store: &dyn Store,
    invitation: Invitation,
) -> Result<InvitationWithGuests, ApiError> {
    let guests = store.list_guests_by_invitation(invitation.id).await?;
    Ok(InvitationWithGuests::new(invitation, guests))
}

pub async fn list_invitations(store: web::Data<dyn Store>) -> Result<HttpResponse, actix_web::Error> {
    let invitations = store.list_invitations().await.map_err(ApiError::from)?;
    let guests = store.list_guests().await.map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(InvitationWithGuests::join(invitations, guests)))
}

pub async fn create_invitation(
    _admin: AdminToken,
    store: web::Data<dyn Store>,
    body: web::Json<CreateInvitationRequest>,
) -> Result<HttpResponse, actix_web::Error> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()).into());
    }

    let invitation = store.create_invitation(name).await.map_err(|e| match e {
        StoreError::AlreadyExists => ApiError::BadRequest("Name is not unique".to_string()),
        other => ApiError::from(other),
    })?;

    log::info!("created invitation {} ({})", invitation.id, invitation.name);

    Ok(HttpResponse::Created().json(InvitationWithGuests::new(invitation, vec![])))
}

pub async fn get_invitation(
    store: web::Data<dyn Store>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, actix_web::Error> {
    let invitation = store
        .get_invitation(path.into_inner())
        .await
        .map_err(ApiError::lookup("Invitation"))?;

    Ok(HttpResponse::Ok().json(with_guests(store.get_ref(), invitation).await?))
}

pub async fn get_invitation_by_name(
    store: web::Data<dyn Store>,
    path: web::Path<String>,
) -> Result<HttpResponse, actix_web::Error> {
    let name = path.into_inner();

    let invitation = store
        .get_invitation_by_name(&name)
        .await
        .map_err(ApiError::lookup("Invitation"))?;

    let invitation = store
        .increment_seen(invitation.id)
        .await
        .map_err(ApiError::lookup("Invitation"))?;

    Ok(HttpResponse::Ok().json(with_guests(store.get_ref(), invitation).await?))
}

pub async fn get_invitation_by_guest_name(
    store: web::Data<dyn Store>,
    query: web::Query<GuestNameQuery>,
) -> Result<HttpResponse, actix_web::Error> {
    if query.name.is_empty() || query.last_name.is_empty() {
        return Err(ApiError::BadRequest("Name and last_name is required".to_string()).into());
    }

    let guest = store
        .find_guest_by_name(&query.name, &query.last_name)
        .await
        .map_err(ApiError::lookup("Invitation"))?;

    // the guest may still point at a deleted invitation
    let invitation = store
        .increment_seen(guest.invitation_id)
        .await
        .map_err(ApiError::lookup("Invitation"))?;

    Ok(HttpResponse::Ok().json(with_guests(store.get_ref(), invitation).await?))
}

pub async fn delete_invitation(
    _admin: AdminToken,
    store: web::Data<dyn Store>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, actix_web::Error> {
    let invitation_id = path.into_inner();

    store
        .delete_invitation(invitation_id)
        .await
        .map_err(ApiError::lookup("Invitation"))?;

    log::info!("deleted invitation {}", invitation_id);

    Ok(HttpResponse::Ok().json(json!({ "message": "Invitation deleted successfully" })))
}

pub async fn confirm_guests(
    store: web::Data<dyn Store>,
    path: web::Path<Uuid>,
    body: web::Json<ConfirmGuestsRequest>,
) -> Result<HttpResponse, actix_web::Error> {
    let invitation = services::confirm_guests(store.get_ref(), path.into_inner(), &body)
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(invitation))
}
