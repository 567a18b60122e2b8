//! Song listing query composition.

use crate::domain::model::{Page, SongFilter};
use sqlx::{QueryBuilder, Sqlite};

pub(crate) const SONG_COLUMNS: &str = "SELECT s.id, s.name, s.author_id, s.release_date, s.text, s.link, a.group_name \
     FROM song s JOIN author a ON a.id = s.author_id";

fn contains_pattern(value: &str) -> String {
    format!("%{}%", value)
}

/// 過濾條件皆為子字串比對，release_date 為完全比對；依插入順序分頁
///
/// offset 超出 SQLite 整數範圍時回傳 `None`，該頁必定沒有資料
pub(crate) fn build_song_query<'a>(
    filter: &'a SongFilter,
    page: Page,
) -> Option<QueryBuilder<'a, Sqlite>> {
    let offset = i64::try_from(page.offset()).ok()?;

    let mut query = QueryBuilder::new(SONG_COLUMNS);
    query.push(" WHERE 1 = 1");

    if let Some(name) = filter.name.as_deref().filter(|v| !v.is_empty()) {
        query.push(" AND s.name LIKE ").push_bind(contains_pattern(name));
    }
    if let Some(group) = filter.group_name.as_deref().filter(|v| !v.is_empty()) {
        query
            .push(" AND a.group_name LIKE ")
            .push_bind(contains_pattern(&group.to_lowercase()));
    }
    if let Some(release_date) = filter.release_date {
        query.push(" AND s.release_date = ").push_bind(release_date);
    }
    if let Some(text) = filter.text.as_deref().filter(|v| !v.is_empty()) {
        query.push(" AND s.text LIKE ").push_bind(contains_pattern(text));
    }
    if let Some(link) = filter.link.as_deref().filter(|v| !v.is_empty()) {
        query.push(" AND s.link LIKE ").push_bind(contains_pattern(link));
    }

    query
        .push(" ORDER BY s.rowid LIMIT ")
        .push_bind(i64::from(page.page_size))
        .push(" OFFSET ")
        .push_bind(offset);

    Some(query)
}
