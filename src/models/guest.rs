use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "menu_option", rename_all = "snake_case")]
pub enum Menu {
    Vegetarian,
    Vegan,
    #[default]
    #[serde(alias = "no restriction")]
    NoRestriction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Guest {
    pub id: Uuid,
    pub name: String,
    pub last_name: String,
    pub invitation_id: Uuid,
    pub is_attending: Option<bool>,
    pub is_pending: bool,
    pub is_kid: bool,
    pub menu: Menu,
    pub with_plus_one: bool,
    pub is_plus_one: bool,
    pub created_at: DateTime<Utc>,
}

/// A guest record ready to be inserted; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGuest {
    pub invitation_id: Uuid,
    pub name: String,
    pub last_name: String,
    pub is_attending: Option<bool>,
    pub is_pending: bool,
    pub is_kid: bool,
    pub menu: Menu,
    pub with_plus_one: bool,
    pub is_plus_one: bool,
}

impl NewGuest {
    /// Check the fields the store cannot check on its own.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Name is required".to_string());
        }
        if self.with_plus_one && self.is_plus_one {
            return Err("A plus-one guest cannot bring a plus-one".to_string());
        }
        Ok(())
    }
}

fn default_pending() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct CreateGuestRequest {
    pub name: String,
    #[serde(default)]
    pub last_name: String,
    pub invitation_id: Uuid,
    #[serde(default)]
    pub is_attending: Option<bool>,
    #[serde(default = "default_pending")]
    pub is_pending: bool,
    #[serde(default)]
    pub is_kid: bool,
    #[serde(default)]
    pub menu: Menu,
    #[serde(default)]
    pub with_plus_one: bool,
    #[serde(default)]
    pub is_plus_one: bool,
}

impl From<CreateGuestRequest> for NewGuest {
    fn from(req: CreateGuestRequest) -> Self {
        NewGuest {
            invitation_id: req.invitation_id,
            name: req.name,
            last_name: req.last_name,
            is_attending: req.is_attending,
            is_pending: req.is_pending,
            is_kid: req.is_kid,
            menu: req.menu,
            with_plus_one: req.with_plus_one,
            is_plus_one: req.is_plus_one,
        }
    }
}

// Wraps any present value (including `null`) in `Some`, so that a missing key
// and an explicit `null` end up as different values.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Field-level diff for a guest. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GuestPatch {
    #[serde(default)]
    pub invitation_id: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// `Some(None)` resets attendance to unknown.
    #[serde(default, deserialize_with = "present")]
    pub is_attending: Option<Option<bool>>,
    #[serde(default)]
    pub is_pending: Option<bool>,
    #[serde(default)]
    pub is_kid: Option<bool>,
    #[serde(default)]
    pub menu: Option<Menu>,
    #[serde(default)]
    pub with_plus_one: Option<bool>,
    #[serde(default)]
    pub is_plus_one: Option<bool>,
}

impl GuestPatch {
    /// The RSVP write used by the confirmation workflow.
    pub fn attendance(is_attending: Option<bool>, menu: Menu) -> Self {
        GuestPatch {
            is_attending: Some(is_attending),
            menu: Some(menu),
            is_pending: Some(false),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == GuestPatch::default()
    }

    pub fn apply(&self, guest: &mut Guest) {
        if let Some(invitation_id) = self.invitation_id {
            guest.invitation_id = invitation_id;
        }
        if let Some(name) = &self.name {
            guest.name = name.clone();
        }
        if let Some(last_name) = &self.last_name {
            guest.last_name = last_name.clone();
        }
        if let Some(is_attending) = self.is_attending {
            guest.is_attending = is_attending;
        }
        if let Some(is_pending) = self.is_pending {
            guest.is_pending = is_pending;
        }
        if let Some(is_kid) = self.is_kid {
            guest.is_kid = is_kid;
        }
        if let Some(menu) = self.menu {
            guest.menu = menu;
        }
        if let Some(with_plus_one) = self.with_plus_one {
            guest.with_plus_one = with_plus_one;
        }
        if let Some(is_plus_one) = self.is_plus_one {
            guest.is_plus_one = is_plus_one;
        }
    }

    /// Reject patches that would leave `guest` both granting and occupying a plus-one seat.
    pub fn validate_against(&self, guest: &Guest) -> Result<(), String> {
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err("Name is required".to_string());
        }
        let mut patched = guest.clone();
        self.apply(&mut patched);
        if patched.with_plus_one && patched.is_plus_one {
            return Err("A plus-one guest cannot bring a plus-one".to_string());
        }
        Ok(())
    }
}

/// One entry of the `guests` array sent to the confirmation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GuestConfirmation {
    #[serde(alias = "_id")]
    pub id: Uuid,
    #[serde(default)]
    pub is_attending: Option<bool>,
    pub menu: Menu,
}

/// A plus-one attendee to be created by the confirmation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PlusOneRequest {
    pub name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub is_kid: bool,
    #[serde(default)]
    pub menu: Menu,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmGuestsRequest {
    pub guests: Vec<GuestConfirmation>,
    #[serde(default)]
    pub new_guests: Option<Vec<PlusOneRequest>>,
}

impl ConfirmGuestsRequest {
    pub fn plus_ones(&self) -> &[PlusOneRequest] {
        self.new_guests.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub struct ConfirmGuestRequest {
    pub menu: Menu,
}

#[derive(Debug, Deserialize)]
pub struct TallyQuery {
    pub invitation_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guest() -> Guest {
        Guest {
            id: Uuid::new_v4(),
            name: "Ana".to_string(),
            last_name: "Smith".to_string(),
            invitation_id: Uuid::new_v4(),
            is_attending: Some(true),
            is_pending: true,
            is_kid: false,
            menu: Menu::NoRestriction,
            with_plus_one: true,
            is_plus_one: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn menu_accepts_legacy_spelling() {
        let menu: Menu = serde_json::from_str("\"no restriction\"").unwrap();
        assert_eq!(menu, Menu::NoRestriction);
        assert_eq!(serde_json::to_string(&menu).unwrap(), "\"no_restriction\"");
    }

    #[test]
    fn unknown_menu_is_rejected() {
        assert!(serde_json::from_str::<Menu>("\"carnivore\"").is_err());
    }

    #[test]
    fn patch_distinguishes_null_from_absent() {
        let absent: GuestPatch = serde_json::from_str(r#"{"menu": "vegan"}"#).unwrap();
        assert_eq!(absent.is_attending, None);

        let null: GuestPatch = serde_json::from_str(r#"{"is_attending": null}"#).unwrap();
        assert_eq!(null.is_attending, Some(None));

        let mut g = guest();
        null.apply(&mut g);
        assert_eq!(g.is_attending, None);
        assert_eq!(g.menu, Menu::NoRestriction);
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut g = guest();
        let before = g.clone();
        let patch = GuestPatch {
            menu: Some(Menu::Vegan),
            ..Default::default()
        };
        patch.apply(&mut g);
        assert_eq!(g.menu, Menu::Vegan);
        assert_eq!(g.name, before.name);
        assert_eq!(g.is_pending, before.is_pending);
        assert_eq!(g.is_attending, before.is_attending);
    }

    #[test]
    fn empty_patch_is_empty() {
        let patch: GuestPatch = serde_json::from_str("{}").unwrap();
        assert!(patch.is_empty());
        assert!(!GuestPatch::attendance(None, Menu::Vegan).is_empty());
    }

    #[test]
    fn patch_cannot_make_both_plus_one_flags_true() {
        let g = guest();
        let patch = GuestPatch {
            is_plus_one: Some(true),
            ..Default::default()
        };
        assert!(patch.validate_against(&g).is_err());

        let swap = GuestPatch {
            is_plus_one: Some(true),
            with_plus_one: Some(false),
            ..Default::default()
        };
        assert!(swap.validate_against(&g).is_ok());
    }

    #[test]
    fn confirmation_accepts_underscore_id() {
        let id = Uuid::new_v4();
        let body = format!(r#"{{"_id": "{id}", "is_attending": false, "menu": "vegetarian"}}"#);
        let entry: GuestConfirmation = serde_json::from_str(&body).unwrap();
        assert_eq!(entry.id, id);
        assert_eq!(entry.is_attending, Some(false));
    }

    #[test]
    fn missing_new_guests_means_none() {
        let req: ConfirmGuestsRequest = serde_json::from_str(r#"{"guests": []}"#).unwrap();
        assert!(req.plus_ones().is_empty());
    }
}
