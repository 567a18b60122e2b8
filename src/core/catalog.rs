use crate::core::enrichment::EnrichmentCoordinator;
use crate::core::lyrics::paginate;
use crate::domain::model::{Author, NewSong, Page, Song, SongChanges, SongFilter, SongUpdate};
use crate::domain::ports::{AuthorInsert, SongStore};
use crate::utils::error::{CatalogError, Result};
use crate::utils::validation::{
    parse_release_date, parse_song_id, validate_link, validate_max_length,
    validate_non_empty_string, validate_range, MAX_NAME_LENGTH, MAX_TEXT_LENGTH,
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// 歌曲目錄的用例入口：建立（含補全）、查詢、歌詞分頁、更新、刪除
pub struct SongCatalog<S: SongStore> {
    store: S,
    enrichment: EnrichmentCoordinator,
    default_page_size: u32,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn validate_page(page: Option<u32>, page_size: Option<u32>) -> Result<()> {
    if let Some(page) = page {
        validate_range("page", page, 1, u32::MAX)?;
    }
    if let Some(page_size) = page_size {
        validate_range("page_size", page_size, 1, u32::MAX)?;
    }
    Ok(())
}

impl<S: SongStore> SongCatalog<S> {
    pub fn new(store: S, enrichment: EnrichmentCoordinator, default_page_size: u32) -> Self {
        Self {
            store,
            enrichment,
            default_page_size,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 補全後寫入；同作者同名歌曲回傳 `AuthorSongDuplicate`
    pub async fn create_song(
        &self,
        cancel: &CancellationToken,
        group_name: &str,
        song_name: &str,
    ) -> Result<Song> {
        let group_name = group_name.trim();
        let song_name = song_name.trim();
        validate_non_empty_string("group", group_name)?;
        validate_non_empty_string("song", song_name)?;
        validate_max_length("group", group_name, MAX_NAME_LENGTH)?;
        validate_max_length("song", song_name, MAX_NAME_LENGTH)?;

        tracing::info!(group = group_name, song = song_name, "Creating song");

        let enriched = self.enrichment.enrich(cancel, group_name, song_name).await?;
        let author = self.resolve_author(&enriched.canonical_artist_name).await?;

        let song = self
            .store
            .create_song(NewSong {
                name: enriched.canonical_track_name,
                author_id: author.id,
                release_date: enriched.release_date,
                text: enriched.lyrics,
                link: enriched.canonical_link,
            })
            .await?;

        tracing::info!(
            song_id = %song.id,
            author_id = %author.id,
            external_track_id = %enriched.external_track_id,
            "🎵 Song created"
        );
        Ok(song)
    }

    /// 先查再建；唯一鍵衝突代表其他寫入者剛建立，重讀一次即可
    async fn resolve_author(&self, group_name: &str) -> Result<Author> {
        if let Some(author) = self.store.find_author_by_name(group_name).await? {
            return Ok(author);
        }

        match self.store.create_author(group_name).await? {
            AuthorInsert::Created(author) => Ok(author),
            AuthorInsert::Conflict => {
                tracing::debug!(group = group_name, "Author created concurrently, re-reading");
                self.store
                    .find_author_by_name(group_name)
                    .await?
                    .ok_or_else(|| {
                        tracing::error!(
                            group = group_name,
                            "Author conflict reported but no row could be read back"
                        );
                        CatalogError::ErrorGetSongData
                    })
            }
        }
    }

    pub async fn list_songs(&self, mut filter: SongFilter) -> Result<Vec<Song>> {
        validate_page(filter.page, filter.page_size)?;
        let page = Page::resolve(filter.page, filter.page_size, self.default_page_size);

        // 儲存的名稱與歌詞都是小寫
        filter.name = non_blank(filter.name).map(|v| v.to_lowercase());
        filter.group_name = non_blank(filter.group_name);
        filter.text = non_blank(filter.text).map(|v| v.to_lowercase());
        filter.link = non_blank(filter.link);

        tracing::debug!(?filter, page = page.page, page_size = page.page_size, "Listing songs");
        let songs = self.store.list_songs(&filter, page).await?;
        tracing::info!(count = songs.len(), "Songs listed");
        Ok(songs)
    }

    pub async fn get_song(&self, id: &str) -> Result<Song> {
        let id = parse_song_id(id)?;
        self.store.get_song(id).await
    }

    /// 依段落分頁回傳歌詞
    pub async fn song_lyrics(
        &self,
        id: &str,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<Vec<String>> {
        validate_page(page, page_size)?;
        let page = Page::resolve(page, page_size, self.default_page_size);

        let song = self.get_song(id).await?;
        let verses = paginate(&song.text, page.page, page.page_size);

        tracing::debug!(
            song_id = %song.id,
            page = page.page,
            page_size = page.page_size,
            verses = verses.len(),
            "Lyrics page served"
        );
        Ok(verses)
    }

    pub async fn update_song(&self, id: &str, changes: SongChanges) -> Result<Song> {
        let update = self.build_update(parse_song_id(id)?, changes)?;
        if update.is_empty() {
            return Err(CatalogError::invalid_input("no fields to update"));
        }

        let song = self.store.update_song(update).await?;
        tracing::info!(song_id = %song.id, "Song updated");
        Ok(song)
    }

    fn build_update(&self, id: Uuid, changes: SongChanges) -> Result<SongUpdate> {
        let mut update = SongUpdate::new(id);

        if let Some(name) = non_blank(changes.name) {
            let name = name.trim().to_lowercase();
            validate_max_length("name", &name, MAX_NAME_LENGTH)?;
            update.name = Some(name);
        }
        if let Some(author_id) = non_blank(changes.author_id) {
            let author_id = Uuid::parse_str(author_id.trim()).map_err(|_| {
                CatalogError::invalid_input(format!("author_id '{}' is not a UUID", author_id))
            })?;
            update.author_id = Some(author_id);
        }
        if let Some(release_date) = non_blank(changes.release_date) {
            update.release_date = Some(parse_release_date(release_date.trim())?);
        }
        if let Some(text) = non_blank(changes.text) {
            validate_max_length("text", &text, MAX_TEXT_LENGTH)?;
            update.text = Some(text.to_lowercase());
        }
        if let Some(link) = non_blank(changes.link) {
            validate_link("link", &link)?;
            update.link = Some(link);
        }

        Ok(update)
    }

    /// 回傳被刪除的歌曲（含作者）
    pub async fn delete_song(&self, id: &str) -> Result<Song> {
        let id = parse_song_id(id)?;
        let song = self.store.delete_song(id).await?;
        tracing::info!(song_id = %song.id, "Song deleted");
        Ok(song)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::SqliteSongStore;
    use crate::core::enrichment::tests::{uprising, Behaviour, Stubs};
    use crate::domain::model::IdentityMatch;
    use crate::domain::ports::{IdentityProvider, LyricsProvider, ReleaseDateProvider};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    async fn temp_store() -> (TempDir, SqliteSongStore) {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}", dir.path().join("catalog.db").display());
        let store = SqliteSongStore::connect(&url, 4).await.unwrap();
        (dir, store)
    }

    async fn author_count(store: &SqliteSongStore) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM author")
            .fetch_one(store.pool())
            .await
            .unwrap()
    }

    /// 以輸入的歌名與團名作為標準名稱，方便同團多首歌
    struct EchoIdentity;

    #[async_trait]
    impl IdentityProvider for EchoIdentity {
        async fn fetch(&self, group_name: &str, song_name: &str) -> Result<IdentityMatch> {
            tokio::task::yield_now().await;
            Ok(IdentityMatch {
                track_id: format!("{}-{}", group_name, song_name),
                link: format!("https://www.musixmatch.com/lyrics/{}/{}", group_name, song_name),
                track_name: song_name.to_string(),
                artist_name: group_name.to_string(),
            })
        }
    }

    struct NoDate;

    #[async_trait]
    impl ReleaseDateProvider for NoDate {
        async fn fetch(&self, _group_name: &str, _song_name: &str) -> Result<NaiveDate> {
            Err(CatalogError::ErrorGetSongData)
        }
    }

    struct FixedLyrics;

    #[async_trait]
    impl LyricsProvider for FixedLyrics {
        async fn fetch(&self, _track_id: &str) -> Result<String> {
            Ok("First Verse\n\nSecond Verse\n\nThird Verse".to_string())
        }
    }

    fn echo_coordinator() -> EnrichmentCoordinator {
        EnrichmentCoordinator::new(
            Arc::new(EchoIdentity),
            Arc::new(NoDate),
            Arc::new(FixedLyrics),
            Duration::from_secs(5),
        )
    }

    /// 第一次查詢作者時假裝不存在，建立前先讓「對手」寫入同名作者
    struct RacingStore {
        inner: SqliteSongStore,
        raced: AtomicBool,
    }

    #[async_trait]
    impl SongStore for RacingStore {
        async fn find_author_by_name(&self, group_name: &str) -> Result<Option<Author>> {
            if !self.raced.load(Ordering::SeqCst) {
                return Ok(None);
            }
            self.inner.find_author_by_name(group_name).await
        }

        async fn create_author(&self, group_name: &str) -> Result<AuthorInsert> {
            self.inner.create_author(group_name).await?;
            self.raced.store(true, Ordering::SeqCst);
            self.inner.create_author(group_name).await
        }

        async fn create_song(&self, song: NewSong) -> Result<Song> {
            self.inner.create_song(song).await
        }

        async fn get_song(&self, id: Uuid) -> Result<Song> {
            self.inner.get_song(id).await
        }

        async fn delete_song(&self, id: Uuid) -> Result<Song> {
            self.inner.delete_song(id).await
        }

        async fn update_song(&self, update: SongUpdate) -> Result<Song> {
            self.inner.update_song(update).await
        }

        async fn list_songs(&self, filter: &SongFilter, page: Page) -> Result<Vec<Song>> {
            self.inner.list_songs(filter, page).await
        }
    }

    /// 回報衝突但永遠讀不到作者
    struct VanishingAuthorStore {
        inner: SqliteSongStore,
    }

    #[async_trait]
    impl SongStore for VanishingAuthorStore {
        async fn find_author_by_name(&self, _group_name: &str) -> Result<Option<Author>> {
            Ok(None)
        }

        async fn create_author(&self, _group_name: &str) -> Result<AuthorInsert> {
            Ok(AuthorInsert::Conflict)
        }

        async fn create_song(&self, song: NewSong) -> Result<Song> {
            self.inner.create_song(song).await
        }

        async fn get_song(&self, id: Uuid) -> Result<Song> {
            self.inner.get_song(id).await
        }

        async fn delete_song(&self, id: Uuid) -> Result<Song> {
            self.inner.delete_song(id).await
        }

        async fn update_song(&self, update: SongUpdate) -> Result<Song> {
            self.inner.update_song(update).await
        }

        async fn list_songs(&self, filter: &SongFilter, page: Page) -> Result<Vec<Song>> {
            self.inner.list_songs(filter, page).await
        }
    }

    #[tokio::test]
    async fn test_create_song_persists_enriched_song() {
        let (_dir, store) = temp_store().await;
        let stubs = Stubs::happy();
        let catalog = SongCatalog::new(store, stubs.coordinator(Duration::from_secs(5)), 10);

        let song = catalog
            .create_song(&CancellationToken::new(), "MUSE", "Uprising")
            .await
            .unwrap();

        assert_eq!(song.name, "uprising");
        assert_eq!(song.author.as_ref().unwrap().group_name, "muse");
        assert_eq!(song.release_date, NaiveDate::from_ymd_opt(2009, 9, 7));
        assert_eq!(song.link, uprising().link);
        assert_eq!(song.text, "paranoia is in bloom\n\nthey will not force us");
        assert_eq!(catalog.get_song(&song.id.to_string()).await.unwrap(), song);
    }

    #[tokio::test]
    async fn test_create_song_twice_is_duplicate() {
        let (_dir, store) = temp_store().await;
        let stubs = Stubs::happy();
        let catalog = SongCatalog::new(store, stubs.coordinator(Duration::from_secs(5)), 10);
        let cancel = CancellationToken::new();

        catalog.create_song(&cancel, "muse", "uprising").await.unwrap();
        let second = catalog.create_song(&cancel, "muse", "uprising").await;

        assert!(matches!(second, Err(CatalogError::AuthorSongDuplicate)));
        assert_eq!(author_count(catalog.store()).await, 1);
    }

    #[tokio::test]
    async fn test_identity_failure_creates_nothing() {
        let (_dir, store) = temp_store().await;
        let stubs = Stubs::new(
            Behaviour::Fail,
            Behaviour::Ok(NaiveDate::from_ymd_opt(2009, 9, 7).unwrap()),
            Behaviour::Ok("verse".to_string()),
        );
        let catalog = SongCatalog::new(store, stubs.coordinator(Duration::from_secs(5)), 10);

        let result = catalog
            .create_song(&CancellationToken::new(), "nobody", "nothing")
            .await;

        assert!(matches!(result, Err(CatalogError::ErrorGetSongData)));
        assert_eq!(author_count(catalog.store()).await, 0);
        assert!(matches!(
            catalog.list_songs(SongFilter::default()).await,
            Err(CatalogError::SongsNotFound)
        ));
    }

    #[tokio::test]
    async fn test_concurrent_creates_share_one_author() {
        let (_dir, store) = temp_store().await;
        let catalog = SongCatalog::new(store, echo_coordinator(), 10);
        let cancel = CancellationToken::new();

        let (first, second) = tokio::join!(
            catalog.create_song(&cancel, "new group", "first song"),
            catalog.create_song(&cancel, "new group", "second song"),
        );

        let first = first.unwrap();
        let second = second.unwrap();
        assert_eq!(first.author_id, second.author_id);
        assert_eq!(author_count(catalog.store()).await, 1);
    }

    #[tokio::test]
    async fn test_author_race_is_reconciled() {
        let (_dir, inner) = temp_store().await;
        let store = RacingStore {
            inner,
            raced: AtomicBool::new(false),
        };
        let catalog = SongCatalog::new(store, echo_coordinator(), 10);

        let song = catalog
            .create_song(&CancellationToken::new(), "rivals", "anthem")
            .await
            .unwrap();

        let rival = catalog
            .store()
            .inner
            .find_author_by_name("rivals")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(song.author_id, rival.id);
        assert_eq!(author_count(&catalog.store().inner).await, 1);
    }

    #[tokio::test]
    async fn test_unreconcilable_author_is_song_data_error() {
        let (_dir, inner) = temp_store().await;
        let catalog = SongCatalog::new(VanishingAuthorStore { inner }, echo_coordinator(), 10);

        let result = catalog
            .create_song(&CancellationToken::new(), "ghosts", "boo")
            .await;

        assert!(matches!(result, Err(CatalogError::ErrorGetSongData)));
    }

    #[tokio::test]
    async fn test_create_song_rejects_blank_input() {
        let (_dir, store) = temp_store().await;
        let stubs = Stubs::happy();
        let catalog = SongCatalog::new(store, stubs.coordinator(Duration::from_secs(5)), 10);

        let result = catalog
            .create_song(&CancellationToken::new(), "   ", "uprising")
            .await;

        assert!(matches!(result, Err(CatalogError::InvalidInputData { .. })));
        assert_eq!(
            stubs.identity.calls.load(std::sync::atomic::Ordering::SeqCst),
            0
        );
    }

    #[tokio::test]
    async fn test_song_lyrics_pages_by_verse() {
        let (_dir, store) = temp_store().await;
        let catalog = SongCatalog::new(store, echo_coordinator(), 2);
        let song = catalog
            .create_song(&CancellationToken::new(), "muse", "uprising")
            .await
            .unwrap();
        let id = song.id.to_string();

        assert_eq!(
            catalog.song_lyrics(&id, None, None).await.unwrap(),
            vec!["first verse".to_string(), "second verse".to_string()]
        );
        assert_eq!(
            catalog.song_lyrics(&id, Some(2), Some(1)).await.unwrap(),
            vec!["second verse".to_string()]
        );
        assert!(catalog.song_lyrics(&id, Some(5), Some(1)).await.unwrap().is_empty());
        assert!(matches!(
            catalog.song_lyrics(&id, Some(0), None).await,
            Err(CatalogError::InvalidInputData { .. })
        ));
        assert!(matches!(
            catalog.song_lyrics("not-a-uuid", None, None).await,
            Err(CatalogError::InvalidSongIdFormat { .. })
        ));
        assert!(matches!(
            catalog
                .song_lyrics(&Uuid::new_v4().to_string(), None, None)
                .await,
            Err(CatalogError::SongsNotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_songs_lowercases_text_filter() {
        let (_dir, store) = temp_store().await;
        let catalog = SongCatalog::new(store, echo_coordinator(), 10);
        let cancel = CancellationToken::new();
        catalog.create_song(&cancel, "muse", "uprising").await.unwrap();
        catalog.create_song(&cancel, "blur", "song 2").await.unwrap();

        let songs = catalog
            .list_songs(SongFilter {
                text: Some("SECOND Verse".to_string()),
                group_name: Some("Blur".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].name, "song 2");
    }

    #[tokio::test]
    async fn test_update_song_validates_and_applies() {
        let (_dir, store) = temp_store().await;
        let catalog = SongCatalog::new(store, echo_coordinator(), 10);
        let song = catalog
            .create_song(&CancellationToken::new(), "muse", "uprising")
            .await
            .unwrap();
        let id = song.id.to_string();

        let updated = catalog
            .update_song(
                &id,
                SongChanges {
                    release_date: Some("2009-09-07".to_string()),
                    text: Some("New Verse".to_string()),
                    link: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.release_date, NaiveDate::from_ymd_opt(2009, 9, 7));
        assert_eq!(updated.text, "new verse");
        assert_eq!(updated.link, song.link);

        assert!(matches!(
            catalog.update_song(&id, SongChanges::default()).await,
            Err(CatalogError::InvalidInputData { .. })
        ));
        assert!(matches!(
            catalog
                .update_song(
                    &id,
                    SongChanges {
                        link: Some("not a link".to_string()),
                        ..Default::default()
                    }
                )
                .await,
            Err(CatalogError::InvalidInputData { .. })
        ));
        assert!(matches!(
            catalog
                .update_song(
                    &id,
                    SongChanges {
                        name: Some("x".repeat(MAX_NAME_LENGTH + 1)),
                        ..Default::default()
                    }
                )
                .await,
            Err(CatalogError::InvalidInputData { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_song_then_get_is_not_found() {
        let (_dir, store) = temp_store().await;
        let catalog = SongCatalog::new(store, echo_coordinator(), 10);
        let song = catalog
            .create_song(&CancellationToken::new(), "muse", "uprising")
            .await
            .unwrap();
        let id = song.id.to_string();

        let deleted = catalog.delete_song(&id).await.unwrap();
        assert_eq!(deleted.author.unwrap().group_name, "muse");
        assert!(matches!(
            catalog.get_song(&id).await,
            Err(CatalogError::SongsNotFound)
        ));
    }
}
