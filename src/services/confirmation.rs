//! RSVP confirmation for a whole invitation.
//!
//! Every check runs against a single snapshot of the invitation's guests and
//! finishes before the first write. Writes are then applied one record at a
//! time; the store only guarantees atomicity per record, so a failure part way
//! through leaves earlier records written and is reported as `PartialBatch`.
//!
//! Two concurrent confirmations of the same invitation can both read the same
//! free capacity and together overcommit plus-one seats. This is accepted for
//! the single-writer deployment the service targets.

use std::collections::HashSet;

use thiserror::Error;
use uuid::Uuid;

use crate::db::{Store, StoreError};
use crate::models::{
    ConfirmGuestsRequest, Guest, GuestConfirmation, GuestPatch, InvitationWithGuests, NewGuest,
    PlusOneRequest,
};

#[derive(Debug, Error)]
pub enum ConfirmError {
    #[error("invitation not found")]
    InvitationNotFound,

    #[error("guest {guest_id} does not belong to the invitation")]
    InvalidMembership { guest_id: Uuid },

    #[error("guest {guest_id} was removed before it could be updated")]
    GuestNotFound { guest_id: Uuid },

    #[error("{requested} new guests requested but only {available} plus-one seats are free")]
    CapacityExceeded { requested: usize, available: i64 },

    #[error("{0}")]
    Validation(String),

    #[error(
        "batch stopped after updating {} and creating {} guests",
        .updated.len(),
        .created.len()
    )]
    PartialBatch {
        updated: Vec<Uuid>,
        created: Vec<Uuid>,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The writes a confirmation will perform, computed without touching the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationPlan {
    pub updates: Vec<(Uuid, GuestPatch)>,
    pub plus_ones: Vec<NewGuest>,
}

/// Free plus-one seats a single guest record contributes: one when it grants
/// a plus-one, minus one when it is a plus-one.
pub fn seat_balance(with_plus_one: bool, is_plus_one: bool) -> i64 {
    i64::from(with_plus_one) - i64::from(is_plus_one)
}

/// Unused plus-one seats across the whole invitation. Negative when the data
/// already holds more plus-ones than were granted.
pub fn plus_one_capacity(guests: &[Guest]) -> i64 {
    guests
        .iter()
        .map(|g| seat_balance(g.with_plus_one, g.is_plus_one))
        .sum()
}

pub fn check_membership(
    invitation_guests: &[Guest],
    updates: &[GuestConfirmation],
) -> Result<(), ConfirmError> {
    let members: HashSet<Uuid> = invitation_guests.iter().map(|g| g.id).collect();
    match updates.iter().find(|u| !members.contains(&u.id)) {
        Some(stray) => Err(ConfirmError::InvalidMembership { guest_id: stray.id }),
        None => Ok(()),
    }
}

pub fn check_capacity(available: i64, requested: usize) -> Result<(), ConfirmError> {
    let wanted = i64::try_from(requested).unwrap_or(i64::MAX);
    if wanted > available {
        return Err(ConfirmError::CapacityExceeded {
            requested,
            available,
        });
    }
    Ok(())
}

fn plus_one_record(invitation_id: Uuid, req: &PlusOneRequest) -> NewGuest {
    NewGuest {
        invitation_id,
        name: req.name.clone(),
        last_name: req.last_name.clone(),
        is_attending: Some(true),
        is_pending: false,
        is_kid: req.is_kid,
        menu: req.menu,
        with_plus_one: false,
        is_plus_one: true,
    }
}

/// Validate `request` against the current guests of the invitation and return
/// the writes to perform.
pub fn plan(
    invitation_id: Uuid,
    invitation_guests: &[Guest],
    request: &ConfirmGuestsRequest,
) -> Result<ConfirmationPlan, ConfirmError> {
    let available = plus_one_capacity(invitation_guests);
    check_membership(invitation_guests, &request.guests)?;

    let plus_ones = request.plus_ones();
    check_capacity(available, plus_ones.len())?;
    if plus_ones.iter().any(|p| p.name.trim().is_empty()) {
        return Err(ConfirmError::Validation(
            "New guests need a name".to_string(),
        ));
    }

    Ok(ConfirmationPlan {
        updates: request
            .guests
            .iter()
            .map(|u| (u.id, GuestPatch::attendance(u.is_attending, u.menu)))
            .collect(),
        plus_ones: plus_ones
            .iter()
            .map(|p| plus_one_record(invitation_id, p))
            .collect(),
    })
}

/// Apply a plan in order: attendance updates first, then plus-one inserts.
pub async fn apply(store: &dyn Store, plan: &ConfirmationPlan) -> Result<(), ConfirmError> {
    let mut updated = Vec::with_capacity(plan.updates.len());
    let mut created = Vec::with_capacity(plan.plus_ones.len());

    let partial = |updated: Vec<Uuid>, created: Vec<Uuid>, source: StoreError| {
        if updated.is_empty() && created.is_empty() {
            ConfirmError::Store(source)
        } else {
            ConfirmError::PartialBatch {
                updated,
                created,
                source,
            }
        }
    };

    for (id, patch) in &plan.updates {
        match store.update_guest(*id, patch).await {
            Ok(_) => updated.push(*id),
            Err(StoreError::NotFound) if updated.is_empty() => {
                return Err(ConfirmError::GuestNotFound { guest_id: *id })
            }
            Err(source) => return Err(partial(updated, created, source)),
        }
    }

    for guest in &plan.plus_ones {
        match store.insert_guest(guest).await {
            Ok(inserted) => created.push(inserted.id),
            Err(source) => return Err(partial(updated, created, source)),
        }
    }

    Ok(())
}

fn invitation_lookup(err: StoreError) -> ConfirmError {
    match err {
        StoreError::NotFound => ConfirmError::InvitationNotFound,
        other => ConfirmError::Store(other),
    }
}

/// Record RSVPs for guests of `invitation_id`, add any plus-ones, and return
/// the invitation with its refreshed guest list.
pub async fn confirm_guests(
    store: &dyn Store,
    invitation_id: Uuid,
    request: &ConfirmGuestsRequest,
) -> Result<InvitationWithGuests, ConfirmError> {
    store
        .get_invitation(invitation_id)
        .await
        .map_err(invitation_lookup)?;

    let guests = store.list_guests_by_invitation(invitation_id).await?;
    let plan = plan(invitation_id, &guests, request).inspect_err(|err| {
        log::warn!("rejected confirmation for invitation {}: {}", invitation_id, err);
    })?;

    apply(store, &plan).await.inspect_err(|err| {
        log::error!("confirmation for invitation {} failed: {}", invitation_id, err);
    })?;

    log::info!(
        "invitation {}: confirmed {} guests, added {} plus-ones",
        invitation_id,
        plan.updates.len(),
        plan.plus_ones.len()
    );

    let invitation = store
        .get_invitation(invitation_id)
        .await
        .map_err(invitation_lookup)?;
    let guests = store.list_guests_by_invitation(invitation_id).await?;

    Ok(InvitationWithGuests::new(invitation, guests))
}
