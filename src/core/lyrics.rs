/// Lyrics provider 附加在歌詞後面的免責聲明區塊
pub const COMMERCIAL_USE_DISCLAIMER: &str =
    "\n...\n\n******* This Lyrics is NOT for Commercial use *******";

/// 段落之間以空行分隔
pub const VERSE_SEPARATOR: &str = "\n\n";

/// 取第一個免責聲明之前的內容並轉小寫
pub fn canonical_lyrics(raw: &str) -> String {
    let body = match raw.find(COMMERCIAL_USE_DISCLAIMER) {
        Some(at) => &raw[..at],
        None => raw,
    };
    body.to_lowercase()
}

pub fn split_verses(text: &str) -> Vec<&str> {
    text.split(VERSE_SEPARATOR).collect()
}

/// 依段落分頁；超出範圍回傳空集合而不是錯誤
pub fn paginate(text: &str, page: u32, page_size: u32) -> Vec<String> {
    let verses = split_verses(text);
    let page_size = page_size as usize;
    let offset = (page.saturating_sub(1) as usize).saturating_mul(page_size);

    if offset > verses.len() {
        return Vec::new();
    }

    let end = offset.saturating_add(page_size).min(verses.len());
    verses[offset..end].iter().map(|v| v.to_string()).collect()
}
