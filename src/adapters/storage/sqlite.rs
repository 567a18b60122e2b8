use super::query::{build_song_query, SONG_COLUMNS};
use crate::domain::model::{Author, NewSong, Page, Song, SongFilter, SongUpdate};
use crate::domain::ports::{AuthorInsert, SongStore};
use crate::utils::error::{CatalogError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS author (
        id TEXT PRIMARY KEY NOT NULL,
        group_name TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS song (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        author_id TEXT NOT NULL REFERENCES author(id) ON UPDATE CASCADE ON DELETE CASCADE,
        release_date TEXT,
        text TEXT NOT NULL DEFAULT '',
        link TEXT NOT NULL DEFAULT '',
        UNIQUE (name, author_id)
    )
    "#,
];

/// 唯一性交給資料庫判定，不使用應用層鎖
#[derive(Debug, Clone)]
pub struct SqliteSongStore {
    pool: SqlitePool,
}

impl SqliteSongStore {
    /// 連線並建立資料表（若不存在）
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self::new(pool);
        store.ensure_schema().await?;
        tracing::info!(database_url, "Song store ready");
        Ok(store)
    }

    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch_song(&self, id: Uuid) -> Result<Option<Song>> {
        let sql = format!("{} WHERE s.id = ?", SONG_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(song_from_row).transpose()
    }
}

fn parse_id(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| CatalogError::Database(sqlx::Error::Decode(Box::new(e))))
}

fn song_from_row(row: &SqliteRow) -> Result<Song> {
    let id: String = row.try_get("id")?;
    let author_id: String = row.try_get("author_id")?;
    let author_id = parse_id(&author_id)?;
    let release_date: Option<NaiveDate> = row.try_get("release_date")?;

    Ok(Song {
        id: parse_id(&id)?,
        name: row.try_get("name")?,
        author_id,
        author: Some(Author {
            id: author_id,
            group_name: row.try_get("group_name")?,
        }),
        release_date,
        text: row.try_get("text")?,
        link: row.try_get("link")?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

#[async_trait]
impl SongStore for SqliteSongStore {
    async fn find_author_by_name(&self, group_name: &str) -> Result<Option<Author>> {
        let row = sqlx::query("SELECT id, group_name FROM author WHERE group_name = ?")
            .bind(group_name)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let id: String = row.try_get("id")?;
                Ok(Some(Author {
                    id: parse_id(&id)?,
                    group_name: row.try_get("group_name")?,
                }))
            }
            None => Ok(None),
        }
    }

    async fn create_author(&self, group_name: &str) -> Result<AuthorInsert> {
        let author = Author {
            id: Uuid::new_v4(),
            group_name: group_name.to_string(),
        };

        let inserted = sqlx::query("INSERT INTO author (id, group_name) VALUES (?, ?)")
            .bind(author.id.to_string())
            .bind(&author.group_name)
            .execute(&self.pool)
            .await;

        match inserted {
            Ok(_) => {
                tracing::debug!(author_id = %author.id, group = group_name, "Author created");
                Ok(AuthorInsert::Created(author))
            }
            Err(e) if is_unique_violation(&e) => {
                tracing::debug!(group = group_name, "Author insert hit unique constraint");
                Ok(AuthorInsert::Conflict)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn create_song(&self, song: NewSong) -> Result<Song> {
        let id = Uuid::new_v4();

        let inserted = sqlx::query(
            "INSERT INTO song (id, name, author_id, release_date, text, link) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(&song.name)
        .bind(song.author_id.to_string())
        .bind(song.release_date)
        .bind(&song.text)
        .bind(&song.link)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                tracing::warn!(name = %song.name, author_id = %song.author_id, "Duplicate song for author");
                return Err(CatalogError::AuthorSongDuplicate);
            }
            Err(e) if is_foreign_key_violation(&e) => return Err(CatalogError::AuthorNotFound),
            Err(e) => return Err(e.into()),
        }

        // 重新讀取，附上作者
        self.fetch_song(id).await?.ok_or(CatalogError::SongsNotFound)
    }

    async fn get_song(&self, id: Uuid) -> Result<Song> {
        self.fetch_song(id).await?.ok_or(CatalogError::SongsNotFound)
    }

    async fn delete_song(&self, id: Uuid) -> Result<Song> {
        let song = self.get_song(id).await?;

        let deleted = sqlx::query("DELETE FROM song WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(CatalogError::SongsNotFound);
        }
        Ok(song)
    }

    async fn update_song(&self, update: SongUpdate) -> Result<Song> {
        if update.is_empty() {
            return self.get_song(update.id).await;
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE song SET ");
        {
            let mut fields = query.separated(", ");
            if let Some(name) = &update.name {
                fields.push("name = ").push_bind_unseparated(name.clone());
            }
            if let Some(author_id) = update.author_id {
                fields
                    .push("author_id = ")
                    .push_bind_unseparated(author_id.to_string());
            }
            if let Some(release_date) = update.release_date {
                fields
                    .push("release_date = ")
                    .push_bind_unseparated(release_date);
            }
            if let Some(text) = &update.text {
                fields.push("text = ").push_bind_unseparated(text.clone());
            }
            if let Some(link) = &update.link {
                fields.push("link = ").push_bind_unseparated(link.clone());
            }
        }
        query.push(" WHERE id = ").push_bind(update.id.to_string());

        let updated = match query.build().execute(&self.pool).await {
            Ok(result) => result,
            Err(e) if is_unique_violation(&e) => return Err(CatalogError::AuthorSongDuplicate),
            Err(e) if is_foreign_key_violation(&e) => return Err(CatalogError::AuthorNotFound),
            Err(e) => return Err(e.into()),
        };

        if updated.rows_affected() == 0 {
            return Err(CatalogError::SongsNotFound);
        }

        self.get_song(update.id).await
    }

    async fn list_songs(&self, filter: &SongFilter, page: Page) -> Result<Vec<Song>> {
        let Some(mut query) = build_song_query(filter, page) else {
            tracing::debug!(page = page.page, page_size = page.page_size, "Page offset out of range");
            return Err(CatalogError::SongsNotFound);
        };
        let rows = query.build().fetch_all(&self.pool).await?;

        if rows.is_empty() {
            return Err(CatalogError::SongsNotFound);
        }

        rows.iter().map(song_from_row).collect()
    }
}
