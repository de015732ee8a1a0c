use super::{DeleteOutcome, StoryStore, ViewOutcome};
use crate::error::Result;
use crate::models::{NewStory, Story, StoryOwner};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

const STORY_COLUMNS: &str = r#"
    s.id, s.content, s.image_url, s.created_at, s.expires_at, s.views,
    u.id AS owner_id, u.username, u.first_name, u.last_name, u.profile_picture
"#;

/// PostgreSQL-backed story store.
#[derive(Clone)]
pub struct PgStoryStore {
    pool: PgPool,
}

impl PgStoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_story(row: &PgRow) -> std::result::Result<Story, sqlx::Error> {
        Ok(Story {
            id: row.try_get("id")?,
            owner: StoryOwner {
                id: row.try_get("owner_id")?,
                username: row.try_get("username")?,
                first_name: row.try_get("first_name")?,
                last_name: row.try_get("last_name")?,
                profile_picture: row.try_get("profile_picture")?,
            },
            content: row.try_get("content")?,
            image_url: row.try_get("image_url")?,
            created_at: row.try_get("created_at")?,
            expires_at: row.try_get("expires_at")?,
            views: row.try_get("views")?,
        })
    }

    async fn fetch_story(&self, story_id: Uuid) -> Result<Option<Story>> {
        let sql = format!(
            "SELECT {STORY_COLUMNS} FROM stories s JOIN users u ON u.id = s.user_id WHERE s.id = $1"
        );
        let row = sqlx::query(&sql)
            .bind(story_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(Self::row_to_story).transpose()?)
    }
}

#[async_trait]
impl StoryStore for PgStoryStore {
    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    async fn upsert_owner(&self, owner: &StoryOwner) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, first_name, last_name, profile_picture)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET username = EXCLUDED.username,
                first_name = COALESCE(EXCLUDED.first_name, users.first_name),
                last_name = COALESCE(EXCLUDED.last_name, users.last_name),
                profile_picture = COALESCE(EXCLUDED.profile_picture, users.profile_picture)
            "#,
        )
        .bind(owner.id)
        .bind(&owner.username)
        .bind(&owner.first_name)
        .bind(&owner.last_name)
        .bind(&owner.profile_picture)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_owner(&self, user_id: Uuid) -> Result<Option<StoryOwner>> {
        let owner = sqlx::query_as::<_, StoryOwner>(
            r#"SELECT id, username, first_name, last_name, profile_picture FROM users WHERE id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(owner)
    }

    async fn insert(&self, story: NewStory) -> Result<Story> {
        let sql = format!(
            r#"
            WITH inserted AS (
                INSERT INTO stories (id, user_id, content, image_url, created_at, expires_at, views)
                VALUES ($1, $2, $3, $4, $5, $6, 0)
                RETURNING id, user_id, content, image_url, created_at, expires_at, views
            )
            SELECT {STORY_COLUMNS}
            FROM inserted s JOIN users u ON u.id = s.user_id
            "#
        );
        let row = sqlx::query(&sql)
            .bind(story.id)
            .bind(story.owner_id)
            .bind(&story.content)
            .bind(&story.image_url)
            .bind(story.created_at)
            .bind(story.expires_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(Self::row_to_story(&row)?)
    }

    async fn find(&self, story_id: Uuid) -> Result<Option<Story>> {
        self.fetch_story(story_id).await
    }

    async fn list_active(&self, owner_id: Option<Uuid>, now: DateTime<Utc>) -> Result<Vec<Story>> {
        let sql = format!(
            r#"
            SELECT {STORY_COLUMNS}
            FROM stories s JOIN users u ON u.id = s.user_id
            WHERE s.expires_at > $1
              AND ($2::UUID IS NULL OR s.user_id = $2)
            ORDER BY s.created_at DESC, s.id DESC
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(now)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(Self::row_to_story)
            .collect::<std::result::Result<Vec<_>, _>>()?)
    }

    async fn increment_views(&self, story_id: Uuid, now: DateTime<Utc>) -> Result<ViewOutcome> {
        // Single-statement increment; concurrent views serialize on the row lock.
        let sql = format!(
            r#"
            WITH bumped AS (
                UPDATE stories SET views = views + 1
                WHERE id = $1 AND expires_at >= $2
                RETURNING id, user_id, content, image_url, created_at, expires_at, views
            )
            SELECT {STORY_COLUMNS}
            FROM bumped s JOIN users u ON u.id = s.user_id
            "#
        );
        let row = sqlx::query(&sql)
            .bind(story_id)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = row {
            return Ok(ViewOutcome::Viewed(Self::row_to_story(&row)?));
        }

        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM stories WHERE id = $1")
            .bind(story_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match exists {
            Some(_) => ViewOutcome::Expired,
            None => ViewOutcome::NotFound,
        })
    }

    async fn delete_owned(&self, story_id: Uuid, requester_id: Uuid) -> Result<DeleteOutcome> {
        let deleted = sqlx::query(r#"DELETE FROM stories WHERE id = $1 AND user_id = $2"#)
            .bind(story_id)
            .bind(requester_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted > 0 {
            return Ok(DeleteOutcome::Deleted);
        }

        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM stories WHERE id = $1")
            .bind(story_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match exists {
            Some(_) => DeleteOutcome::NotOwner,
            None => DeleteOutcome::NotFound,
        })
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        match sqlx::query(r#"DELETE FROM stories WHERE expires_at <= $1"#)
            .bind(now)
            .execute(&self.pool)
            .await
        {
            Ok(res) => Ok(res.rows_affected()),
            Err(err) => {
                let table_missing = err
                    .as_database_error()
                    .and_then(|db_err| db_err.code())
                    .map(|code| code == "42P01")
                    .unwrap_or(false);
                if table_missing {
                    tracing::debug!("story purge skipped because table does not exist (migration pending)");
                    Ok(0)
                } else {
                    Err(err.into())
                }
            }
        }
    }
}
