use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// 演出團體，group_name 一律小寫且唯一
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub group_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: Uuid,
    pub name: String,
    pub author_id: Uuid,
    pub author: Option<Author>,
    pub release_date: Option<NaiveDate>,
    /// 歌詞，段落之間以空行分隔
    pub text: String,
    pub link: String,
}

/// 寫入 store 前的新歌曲
#[derive(Debug, Clone, PartialEq)]
pub struct NewSong {
    pub name: String,
    pub author_id: Uuid,
    pub release_date: Option<NaiveDate>,
    pub text: String,
    pub link: String,
}

/// Identity provider 的標準化結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityMatch {
    pub track_id: String,
    pub link: String,
    pub track_name: String,
    pub artist_name: String,
}

/// 單次建立請求的補全結果，不會持久化
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentResult {
    pub external_track_id: String,
    pub canonical_link: String,
    pub canonical_track_name: String,
    pub canonical_artist_name: String,
    pub release_date: Option<NaiveDate>,
    pub lyrics: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SongFilter {
    pub name: Option<String>,
    pub group_name: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub text: Option<String>,
    pub link: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// 已套用預設值的分頁參數
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub page_size: u32,
}

impl Page {
    pub fn resolve(page: Option<u32>, page_size: Option<u32>, default_page_size: u32) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE),
            page_size: page_size.unwrap_or(default_page_size),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

/// 部分更新，只有 `Some` 的欄位會寫入
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SongUpdate {
    pub id: Uuid,
    pub name: Option<String>,
    pub author_id: Option<Uuid>,
    pub release_date: Option<NaiveDate>,
    pub text: Option<String>,
    pub link: Option<String>,
}

impl SongUpdate {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.author_id.is_none()
            && self.release_date.is_none()
            && self.text.is_none()
            && self.link.is_none()
    }
}

/// 使用者提交的更新請求，空字串視同未提供
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SongChanges {
    pub name: Option<String>,
    pub author_id: Option<String>,
    pub release_date: Option<String>,
    pub text: Option<String>,
    pub link: Option<String>,
}
