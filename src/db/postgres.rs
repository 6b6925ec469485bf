use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{Store, StoreError};
use crate::models::{Guest, GuestPatch, Invitation, NewGuest, NewSong, Song};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn invitation_exists(&self, id: Uuid) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM invitations WHERE id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

fn expect_deleted(rows_affected: u64) -> Result<(), StoreError> {
    if rows_affected == 0 {
        Err(StoreError::NotFound)
    } else {
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_invitations(&self) -> Result<Vec<Invitation>, StoreError> {
        let invitations = sqlx::query_as::<_, Invitation>(
            r#"
            SELECT id, name, seen, created_at
            FROM invitations
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(invitations)
    }

    async fn create_invitation(&self, name: &str) -> Result<Invitation, StoreError> {
        let invitation = sqlx::query_as::<_, Invitation>(
            r#"
            INSERT INTO invitations (name)
            VALUES ($1)
            RETURNING id, name, seen, created_at
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(invitation)
    }

    async fn get_invitation(&self, id: Uuid) -> Result<Invitation, StoreError> {
        sqlx::query_as::<_, Invitation>(
            r#"
            SELECT id, name, seen, created_at
            FROM invitations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn get_invitation_by_name(&self, name: &str) -> Result<Invitation, StoreError> {
        sqlx::query_as::<_, Invitation>(
            r#"
            SELECT id, name, seen, created_at
            FROM invitations
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn delete_invitation(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM invitations WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        expect_deleted(result.rows_affected())
    }

    async fn increment_seen(&self, id: Uuid) -> Result<Invitation, StoreError> {
        sqlx::query_as::<_, Invitation>(
            r#"
            UPDATE invitations
            SET seen = seen + 1
            WHERE id = $1
            RETURNING id, name, seen, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn list_guests(&self) -> Result<Vec<Guest>, StoreError> {
        let guests = sqlx::query_as::<_, Guest>(
            r#"
            SELECT id, name, last_name, invitation_id, is_attending, is_pending,
                   is_kid, menu, with_plus_one, is_plus_one, created_at
            FROM guests
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(guests)
    }

    async fn list_guests_by_invitation(
        &self,
        invitation_id: Uuid,
    ) -> Result<Vec<Guest>, StoreError> {
        let guests = sqlx::query_as::<_, Guest>(
            r#"
            SELECT id, name, last_name, invitation_id, is_attending, is_pending,
                   is_kid, menu, with_plus_one, is_plus_one, created_at
            FROM guests
            WHERE invitation_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(invitation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(guests)
    }

    async fn get_guest(&self, id: Uuid) -> Result<Guest, StoreError> {
        sqlx::query_as::<_, Guest>(
            r#"
            SELECT id, name, last_name, invitation_id, is_attending, is_pending,
                   is_kid, menu, with_plus_one, is_plus_one, created_at
            FROM guests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn find_guest_by_name(
        &self,
        name: &str,
        last_name: &str,
    ) -> Result<Guest, StoreError> {
        sqlx::query_as::<_, Guest>(
            r#"
            SELECT id, name, last_name, invitation_id, is_attending, is_pending,
                   is_kid, menu, with_plus_one, is_plus_one, created_at
            FROM guests
            WHERE name = $1 AND last_name = $2
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(name)
        .bind(last_name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn insert_guest(&self, guest: &NewGuest) -> Result<Guest, StoreError> {
        // selecting from invitations yields no row when the reference dangles
        sqlx::query_as::<_, Guest>(
            r#"
            INSERT INTO guests (invitation_id, name, last_name, is_attending, is_pending,
                                is_kid, menu, with_plus_one, is_plus_one)
            SELECT i.id, $2, $3, $4, $5, $6, $7, $8, $9
            FROM invitations i
            WHERE i.id = $1
            RETURNING id, name, last_name, invitation_id, is_attending, is_pending,
                      is_kid, menu, with_plus_one, is_plus_one, created_at
            "#,
        )
        .bind(guest.invitation_id)
        .bind(&guest.name)
        .bind(&guest.last_name)
        .bind(guest.is_attending)
        .bind(guest.is_pending)
        .bind(guest.is_kid)
        .bind(guest.menu)
        .bind(guest.with_plus_one)
        .bind(guest.is_plus_one)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::InvalidReference)
    }

    async fn update_guest(&self, id: Uuid, patch: &GuestPatch) -> Result<Guest, StoreError> {
        if patch.is_empty() {
            return self.get_guest(id).await;
        }
        if let Some(invitation_id) = patch.invitation_id {
            if !self.invitation_exists(invitation_id).await? {
                return Err(StoreError::InvalidReference);
            }
        }

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE guests SET ");
        let mut set = builder.separated(", ");
        if let Some(invitation_id) = patch.invitation_id {
            set.push("invitation_id = ").push_bind_unseparated(invitation_id);
        }
        if let Some(name) = &patch.name {
            set.push("name = ").push_bind_unseparated(name.clone());
        }
        if let Some(last_name) = &patch.last_name {
            set.push("last_name = ").push_bind_unseparated(last_name.clone());
        }
        if let Some(is_attending) = patch.is_attending {
            set.push("is_attending = ").push_bind_unseparated(is_attending);
        }
        if let Some(is_pending) = patch.is_pending {
            set.push("is_pending = ").push_bind_unseparated(is_pending);
        }
        if let Some(is_kid) = patch.is_kid {
            set.push("is_kid = ").push_bind_unseparated(is_kid);
        }
        if let Some(menu) = patch.menu {
            set.push("menu = ").push_bind_unseparated(menu);
        }
        if let Some(with_plus_one) = patch.with_plus_one {
            set.push("with_plus_one = ").push_bind_unseparated(with_plus_one);
        }
        if let Some(is_plus_one) = patch.is_plus_one {
            set.push("is_plus_one = ").push_bind_unseparated(is_plus_one);
        }
        builder.push(" WHERE id = ").push_bind(id);
        builder.push(
            " RETURNING id, name, last_name, invitation_id, is_attending, is_pending, \
             is_kid, menu, with_plus_one, is_plus_one, created_at",
        );

        builder
            .build_query_as::<Guest>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn delete_guest(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM guests WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        expect_deleted(result.rows_affected())
    }

    async fn list_songs(&self) -> Result<Vec<Song>, StoreError> {
        let songs = sqlx::query_as::<_, Song>(
            r#"
            SELECT id, name, invitation_id, created_at
            FROM songs
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(songs)
    }

    async fn list_songs_by_invitation(&self, invitation_id: Uuid) -> Result<Vec<Song>, StoreError> {
        let songs = sqlx::query_as::<_, Song>(
            r#"
            SELECT id, name, invitation_id, created_at
            FROM songs
            WHERE invitation_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(invitation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(songs)
    }

    async fn get_song(&self, id: Uuid) -> Result<Song, StoreError> {
        sqlx::query_as::<_, Song>(
            r#"
            SELECT id, name, invitation_id, created_at
            FROM songs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn insert_song(&self, song: &NewSong) -> Result<Song, StoreError> {
        sqlx::query_as::<_, Song>(
            r#"
            INSERT INTO songs (invitation_id, name)
            SELECT i.id, $2
            FROM invitations i
            WHERE i.id = $1
            RETURNING id, name, invitation_id, created_at
            "#,
        )
        .bind(song.invitation_id)
        .bind(&song.name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::InvalidReference)
    }

    async fn rename_song(&self, id: Uuid, name: &str) -> Result<Song, StoreError> {
        sqlx::query_as::<_, Song>(
            r#"
            UPDATE songs
            SET name = $1
            WHERE id = $2
            RETURNING id, name, invitation_id, created_at
            "#,
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn delete_song(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM songs WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        expect_deleted(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
