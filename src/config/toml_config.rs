use crate::domain::model::DEFAULT_PAGE_SIZE;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{CatalogError, Result};
use crate::utils::validation::{
    validate_positive_number, validate_secret, validate_template, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECONDS: u64 = 5;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub database: DatabaseConfig,
    pub identity: IdentityConfig,
    pub release_date: ReleaseDateConfig,
    pub enrichment: Option<EnrichmentConfig>,
    pub pagination: Option<PaginationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
}

/// Musixmatch：曲目搜尋與歌詞共用同一組 base_url / api_key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub base_url: String,
    /// 佔位符：{artist} {track} {api_key}
    pub search_path: String,
    /// 佔位符：{track_id} {api_key}
    pub lyrics_path: String,
    pub api_key: String,
}

/// Genius：以 Authorization 標頭驗證
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseDateConfig {
    pub base_url: String,
    /// 佔位符：{track} {artist}
    pub search_path: String,
    pub authorization: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub default_page_size: Option<u32>,
}

impl CatalogConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CatalogError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CatalogError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MUSIXMATCH_API_KEY})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CatalogError::ConfigError {
            message: format!("invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        if self.database.url.trim().is_empty() {
            return Err(CatalogError::MissingConfigError {
                field: "database.url".to_string(),
            });
        }
        validate_positive_number("database.max_connections", u64::from(self.max_connections()), 1)?;

        validate_url("identity.base_url", &self.identity.base_url)?;
        validate_template(
            "identity.search_path",
            &self.identity.search_path,
            &["artist", "track", "api_key"],
        )?;
        validate_template(
            "identity.lyrics_path",
            &self.identity.lyrics_path,
            &["track_id", "api_key"],
        )?;
        validate_secret("identity.api_key", &self.identity.api_key)?;

        validate_url("release_date.base_url", &self.release_date.base_url)?;
        validate_template(
            "release_date.search_path",
            &self.release_date.search_path,
            &["track", "artist"],
        )?;
        validate_secret("release_date.authorization", &self.release_date.authorization)?;

        validate_positive_number("enrichment.timeout_seconds", self.timeout_seconds(), 1)?;
        validate_positive_number(
            "pagination.default_page_size",
            u64::from(self.default_page_size()),
            1,
        )?;

        Ok(())
    }

    fn timeout_seconds(&self) -> u64 {
        self.enrichment
            .as_ref()
            .and_then(|e| e.timeout_seconds)
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }
}

impl ConfigProvider for CatalogConfig {
    fn database_url(&self) -> &str {
        &self.database.url
    }

    fn max_connections(&self) -> u32 {
        self.database
            .max_connections
            .unwrap_or(DEFAULT_MAX_CONNECTIONS)
    }

    fn enrichment_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds())
    }

    fn default_page_size(&self) -> u32 {
        self.pagination
            .as_ref()
            .and_then(|p| p.default_page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

impl Validate for CatalogConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC_CONFIG: &str = r#"
[database]
url = "sqlite://songs.db"

[identity]
base_url = "https://api.musixmatch.com/ws/1.1/"
search_path = "track.search?q_artist={artist}&q_track={track}&apikey={api_key}"
lyrics_path = "track.lyrics.get?commontrack_id={track_id}&apikey={api_key}"
api_key = "mm-key"

[release_date]
base_url = "https://api.genius.com/"
search_path = "search?q={track}%20{artist}"
authorization = "Bearer genius-token"
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = CatalogConfig::from_toml_str(BASIC_CONFIG).unwrap();

        assert_eq!(config.database.url, "sqlite://songs.db");
        assert_eq!(config.identity.api_key, "mm-key");
        assert_eq!(config.enrichment_timeout(), Duration::from_secs(5));
        assert_eq!(config.default_page_size(), 10);
        assert_eq!(config.max_connections(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SONGS_CATALOG_TEST_MM_KEY", "from-env");

        let content = BASIC_CONFIG.replace("\"mm-key\"", "\"${SONGS_CATALOG_TEST_MM_KEY}\"");
        let config = CatalogConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.identity.api_key, "from-env");

        std::env::remove_var("SONGS_CATALOG_TEST_MM_KEY");
    }

    #[test]
    fn test_unset_env_var_fails_validation() {
        let content =
            BASIC_CONFIG.replace("\"mm-key\"", "\"${SONGS_CATALOG_TEST_NEVER_SET_KEY}\"");
        let config = CatalogConfig::from_toml_str(&content).unwrap();

        assert!(matches!(
            config.validate(),
            Err(CatalogError::MissingConfigError { field }) if field == "identity.api_key"
        ));
    }

    #[test]
    fn test_config_validation_rejects_bad_template() {
        let content = BASIC_CONFIG.replace("commontrack_id={track_id}&", "");
        let config = CatalogConfig::from_toml_str(&content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_optional_sections_override_defaults() {
        let content = format!(
            "{}\n[enrichment]\ntimeout_seconds = 12\n\n[pagination]\ndefault_page_size = 3\n",
            BASIC_CONFIG
        );
        let config = CatalogConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.enrichment_timeout(), Duration::from_secs(12));
        assert_eq!(config.default_page_size(), 3);
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC_CONFIG.as_bytes()).unwrap();

        let config = CatalogConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.release_date.authorization, "Bearer genius-token");
    }
}
