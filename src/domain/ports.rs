use crate::domain::model::{Author, IdentityMatch, NewSong, Page, Song, SongFilter, SongUpdate};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;
use uuid::Uuid;

/// 以 (group, song) 解析曲目 id、分享連結與標準名稱
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn fetch(&self, group_name: &str, song_name: &str) -> Result<IdentityMatch>;
}

/// 發行日期查詢，盡力而為
#[async_trait]
pub trait ReleaseDateProvider: Send + Sync {
    async fn fetch(&self, group_name: &str, song_name: &str) -> Result<NaiveDate>;
}

/// 以 Identity provider 回傳的曲目 id 取原始歌詞
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    async fn fetch(&self, track_id: &str) -> Result<String>;
}

/// `create_author` 的結果；`Conflict` 代表別的寫入者剛建立了同名作者
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorInsert {
    Created(Author),
    Conflict,
}

#[async_trait]
pub trait SongStore: Send + Sync {
    async fn find_author_by_name(&self, group_name: &str) -> Result<Option<Author>>;

    /// 唯一鍵衝突必須回傳 `AuthorInsert::Conflict` 而非錯誤
    async fn create_author(&self, group_name: &str) -> Result<AuthorInsert>;

    /// (name, author_id) 衝突時回傳 `CatalogError::AuthorSongDuplicate`
    async fn create_song(&self, song: NewSong) -> Result<Song>;

    async fn get_song(&self, id: Uuid) -> Result<Song>;
    async fn delete_song(&self, id: Uuid) -> Result<Song>;
    async fn update_song(&self, update: SongUpdate) -> Result<Song>;

    /// 零筆結果回傳 `CatalogError::SongsNotFound`
    async fn list_songs(&self, filter: &SongFilter, page: Page) -> Result<Vec<Song>>;
}

pub trait ConfigProvider: Send + Sync {
    fn database_url(&self) -> &str;
    fn max_connections(&self) -> u32;
    fn enrichment_timeout(&self) -> Duration;
    fn default_page_size(&self) -> u32;
}
