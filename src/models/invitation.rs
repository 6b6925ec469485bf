use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

use super::guest::Guest;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Invitation {
    pub id: Uuid,
    pub name: String,
    pub seen: i64,
    pub created_at: DateTime<Utc>,
}

/// An invitation together with every guest that references it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationWithGuests {
    #[serde(flatten)]
    pub invitation: Invitation,
    pub guests: Vec<Guest>,
}

impl InvitationWithGuests {
    pub fn new(invitation: Invitation, guests: Vec<Guest>) -> Self {
        Self { invitation, guests }
    }

    /// Join a batch of invitations with a batch of guests by `invitation_id`.
    /// Guests pointing at an invitation outside the batch are dropped.
    pub fn join(invitations: Vec<Invitation>, guests: Vec<Guest>) -> Vec<Self> {
        let mut by_invitation: HashMap<Uuid, Vec<Guest>> = HashMap::new();
        for guest in guests {
            by_invitation
                .entry(guest.invitation_id)
                .or_default()
                .push(guest);
        }

        invitations
            .into_iter()
            .map(|invitation| {
                let guests = by_invitation.remove(&invitation.id).unwrap_or_default();
                Self::new(invitation, guests)
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateInvitationRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct GuestNameQuery {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub last_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::guest::Menu;

    fn invitation(name: &str) -> Invitation {
        Invitation {
            id: Uuid::new_v4(),
            name: name.to_string(),
            seen: 0,
            created_at: Utc::now(),
        }
    }

    fn guest_of(invitation_id: Uuid, name: &str) -> Guest {
        Guest {
            id: Uuid::new_v4(),
            name: name.to_string(),
            last_name: String::new(),
            invitation_id,
            is_attending: None,
            is_pending: true,
            is_kid: false,
            menu: Menu::NoRestriction,
            with_plus_one: false,
            is_plus_one: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn join_groups_guests_under_their_invitation() {
        let smith = invitation("Smith Wedding");
        let jones = invitation("Jones");
        let guests = vec![
            guest_of(smith.id, "A"),
            guest_of(jones.id, "B"),
            guest_of(smith.id, "C"),
            guest_of(Uuid::new_v4(), "orphan"),
        ];

        let joined = InvitationWithGuests::join(vec![smith.clone(), jones.clone()], guests);

        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].invitation, smith);
        let names: Vec<_> = joined[0].guests.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["A", "C"]);
        assert_eq!(joined[1].guests.len(), 1);
    }

    #[test]
    fn serializes_flat_with_guests_array() {
        let inv = InvitationWithGuests::new(invitation("Smith Wedding"), vec![]);
        let value = serde_json::to_value(&inv).unwrap();
        assert_eq!(value["name"], "Smith Wedding");
        assert_eq!(value["seen"], 0);
        assert!(value["guests"].as_array().unwrap().is_empty());
    }
}
