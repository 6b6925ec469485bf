//! In-process store.
//!
//! Used when no `DATABASE_URL` is configured and by the test suite. Each call
//! takes the lock once, so every operation is atomic for the single record it
//! touches, which is the same guarantee the Postgres backend gives.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::models::{Guest, GuestPatch, Invitation, NewGuest, NewSong, Song};

#[derive(Default)]
struct Collections {
    invitations: Vec<Invitation>,
    guests: Vec<Guest>,
    songs: Vec<Song>,
}

impl Collections {
    fn has_invitation(&self, id: Uuid) -> bool {
        self.invitations.iter().any(|i| i.id == id)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn remove_by<T>(items: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> Result<(), StoreError> {
    let before = items.len();
    items.retain(|item| !matches(item));
    if items.len() == before {
        Err(StoreError::NotFound)
    } else {
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_invitations(&self) -> Result<Vec<Invitation>, StoreError> {
        Ok(self.inner.read().await.invitations.clone())
    }

    async fn create_invitation(&self, name: &str) -> Result<Invitation, StoreError> {
        let mut db = self.inner.write().await;
        if db.invitations.iter().any(|i| i.name == name) {
            return Err(StoreError::AlreadyExists);
        }

        let invitation = Invitation {
            id: Uuid::new_v4(),
            name: name.to_string(),
            seen: 0,
            created_at: Utc::now(),
        };
        db.invitations.push(invitation.clone());
        Ok(invitation)
    }

    async fn get_invitation(&self, id: Uuid) -> Result<Invitation, StoreError> {
        let db = self.inner.read().await;
        db.invitations
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_invitation_by_name(&self, name: &str) -> Result<Invitation, StoreError> {
        let db = self.inner.read().await;
        db.invitations
            .iter()
            .find(|i| i.name == name)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn delete_invitation(&self, id: Uuid) -> Result<(), StoreError> {
        let mut db = self.inner.write().await;
        remove_by(&mut db.invitations, |i| i.id == id)
    }

    async fn increment_seen(&self, id: Uuid) -> Result<Invitation, StoreError> {
        let mut db = self.inner.write().await;
        let invitation = db
            .invitations
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(StoreError::NotFound)?;
        invitation.seen += 1;
        Ok(invitation.clone())
    }

    async fn list_guests(&self) -> Result<Vec<Guest>, StoreError> {
        Ok(self.inner.read().await.guests.clone())
    }

    async fn list_guests_by_invitation(
        &self,
        invitation_id: Uuid,
    ) -> Result<Vec<Guest>, StoreError> {
        let db = self.inner.read().await;
        Ok(db
            .guests
            .iter()
            .filter(|g| g.invitation_id == invitation_id)
            .cloned()
            .collect())
    }

    async fn get_guest(&self, id: Uuid) -> Result<Guest, StoreError> {
        let db = self.inner.read().await;
        db.guests
            .iter()
            .find(|g| g.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_guest_by_name(
        &self,
        name: &str,
        last_name: &str,
    ) -> Result<Guest, StoreError> {
        let db = self.inner.read().await;
        db.guests
            .iter()
            .find(|g| g.name == name && g.last_name == last_name)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn insert_guest(&self, guest: &NewGuest) -> Result<Guest, StoreError> {
        let mut db = self.inner.write().await;
        if !db.has_invitation(guest.invitation_id) {
            return Err(StoreError::InvalidReference);
        }

        let guest = Guest {
            id: Uuid::new_v4(),
            name: guest.name.clone(),
            last_name: guest.last_name.clone(),
            invitation_id: guest.invitation_id,
            is_attending: guest.is_attending,
            is_pending: guest.is_pending,
            is_kid: guest.is_kid,
            menu: guest.menu,
            with_plus_one: guest.with_plus_one,
            is_plus_one: guest.is_plus_one,
            created_at: Utc::now(),
        };
        db.guests.push(guest.clone());
        Ok(guest)
    }

    async fn update_guest(&self, id: Uuid, patch: &GuestPatch) -> Result<Guest, StoreError> {
        let mut db = self.inner.write().await;
        if let Some(invitation_id) = patch.invitation_id {
            if !db.has_invitation(invitation_id) {
                return Err(StoreError::InvalidReference);
            }
        }

        let guest = db
            .guests
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(StoreError::NotFound)?;
        patch.apply(guest);
        Ok(guest.clone())
    }

    async fn delete_guest(&self, id: Uuid) -> Result<(), StoreError> {
        let mut db = self.inner.write().await;
        remove_by(&mut db.guests, |g| g.id == id)
    }

    async fn list_songs(&self) -> Result<Vec<Song>, StoreError> {
        Ok(self.inner.read().await.songs.clone())
    }

    async fn list_songs_by_invitation(&self, invitation_id: Uuid) -> Result<Vec<Song>, StoreError> {
        let db = self.inner.read().await;
        Ok(db
            .songs
            .iter()
            .filter(|s| s.invitation_id == invitation_id)
            .cloned()
            .collect())
    }

    async fn get_song(&self, id: Uuid) -> Result<Song, StoreError> {
        let db = self.inner.read().await;
        db.songs
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn insert_song(&self, song: &NewSong) -> Result<Song, StoreError> {
        let mut db = self.inner.write().await;
        if !db.has_invitation(song.invitation_id) {
            return Err(StoreError::InvalidReference);
        }

        let song = Song {
            id: Uuid::new_v4(),
            name: song.name.clone(),
            invitation_id: song.invitation_id,
            created_at: Utc::now(),
        };
        db.songs.push(song.clone());
        Ok(song)
    }

    async fn rename_song(&self, id: Uuid, name: &str) -> Result<Song, StoreError> {
        let mut db = self.inner.write().await;
        let song = db
            .songs
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StoreError::NotFound)?;
        song.name = name.to_string();
        Ok(song.clone())
    }

    async fn delete_song(&self, id: Uuid) -> Result<(), StoreError> {
        let mut db = self.inner.write().await;
        remove_by(&mut db.songs, |s| s.id == id)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Menu;

    fn new_guest(invitation_id: Uuid, name: &str) -> NewGuest {
        NewGuest {
            invitation_id,
            name: name.to_string(),
            last_name: "Smith".to_string(),
            is_attending: None,
            is_pending: true,
            is_kid: false,
            menu: Menu::NoRestriction,
            with_plus_one: false,
            is_plus_one: false,
        }
    }

    #[tokio::test]
    async fn invitation_names_are_unique() {
        let store = MemoryStore::new();
        store.create_invitation("Smith Wedding").await.unwrap();

        let err = store.create_invitation("Smith Wedding").await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists));
    }

    #[tokio::test]
    async fn insert_guest_rejects_dangling_invitation() {
        let store = MemoryStore::new();

        let err = store
            .insert_guest(&new_guest(Uuid::new_v4(), "A"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidReference));
        assert!(store.list_guests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn guests_are_listed_per_invitation() {
        let store = MemoryStore::new();
        let smith = store.create_invitation("Smith").await.unwrap();
        let jones = store.create_invitation("Jones").await.unwrap();
        store.insert_guest(&new_guest(smith.id, "A")).await.unwrap();
        store.insert_guest(&new_guest(jones.id, "B")).await.unwrap();
        store.insert_guest(&new_guest(smith.id, "C")).await.unwrap();

        let guests = store.list_guests_by_invitation(smith.id).await.unwrap();
        let names: Vec<_> = guests.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["A", "C"]);
    }

    #[tokio::test]
    async fn update_guest_applies_patch_to_one_record() {
        let store = MemoryStore::new();
        let inv = store.create_invitation("Smith").await.unwrap();
        let a = store.insert_guest(&new_guest(inv.id, "A")).await.unwrap();
        let b = store.insert_guest(&new_guest(inv.id, "B")).await.unwrap();

        let updated = store
            .update_guest(a.id, &GuestPatch::attendance(Some(true), Menu::Vegan))
            .await
            .unwrap();

        assert_eq!(updated.is_attending, Some(true));
        assert_eq!(updated.menu, Menu::Vegan);
        assert!(!updated.is_pending);
        assert_eq!(store.get_guest(b.id).await.unwrap(), b);
    }

    #[tokio::test]
    async fn update_guest_checks_new_invitation() {
        let store = MemoryStore::new();
        let inv = store.create_invitation("Smith").await.unwrap();
        let a = store.insert_guest(&new_guest(inv.id, "A")).await.unwrap();

        let patch = GuestPatch {
            invitation_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        let err = store.update_guest(a.id, &patch).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidReference));
        assert_eq!(store.get_guest(a.id).await.unwrap().invitation_id, inv.id);
    }

    #[tokio::test]
    async fn missing_records_report_not_found() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();

        assert!(matches!(store.get_guest(id).await, Err(StoreError::NotFound)));
        assert!(matches!(store.delete_guest(id).await, Err(StoreError::NotFound)));
        assert!(matches!(store.increment_seen(id).await, Err(StoreError::NotFound)));
        assert!(matches!(
            store.rename_song(id, "x").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn increment_seen_counts_each_call() {
        let store = MemoryStore::new();
        let inv = store.create_invitation("Smith").await.unwrap();

        store.increment_seen(inv.id).await.unwrap();
        let after = store.increment_seen(inv.id).await.unwrap();
        assert_eq!(after.seen, 2);
    }

    #[tokio::test]
    async fn deleting_invitation_leaves_guests() {
        let store = MemoryStore::new();
        let inv = store.create_invitation("Smith").await.unwrap();
        store.insert_guest(&new_guest(inv.id, "A")).await.unwrap();

        store.delete_invitation(inv.id).await.unwrap();

        assert!(store.get_invitation(inv.id).await.is_err());
        assert_eq!(store.list_guests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn songs_require_an_invitation() {
        let store = MemoryStore::new();
        let inv = store.create_invitation("Smith").await.unwrap();

        let song = store
            .insert_song(&NewSong {
                name: "September".to_string(),
                invitation_id: inv.id,
            })
            .await
            .unwrap();
        let renamed = store.rename_song(song.id, "Dancing Queen").await.unwrap();
        assert_eq!(renamed.name, "Dancing Queen");

        let err = store
            .insert_song(&NewSong {
                name: "Orphan".to_string(),
                invitation_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidReference));
    }
}
