use crate::domain::model::{SongChanges, SongFilter};
use crate::utils::error::{CatalogError, Result};
use crate::utils::validation::{parse_release_date, validate_non_empty_string, Validate};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "songs-catalog")]
#[command(about = "Song catalog with Musixmatch/Genius enrichment")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, env = "SONGS_CATALOG_CONFIG", default_value = "catalog.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit JSON logs on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Enrich a (group, song) pair from the providers and store it
    Create {
        #[arg(long)]
        group: String,
        #[arg(long)]
        song: String,
    },
    /// List songs matching the given filters
    List(ListArgs),
    /// Show one song
    Get { id: String },
    /// Show a page of verses of a song's lyrics
    Lyrics {
        id: String,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Update the given fields of a song
    Update {
        id: String,
        #[command(flatten)]
        changes: UpdateArgs,
    },
    /// Delete a song and print it
    Delete { id: String },
}

#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    /// Song name substring
    #[arg(long)]
    pub name: Option<String>,
    /// Group name substring
    #[arg(long)]
    pub group: Option<String>,
    /// Exact release date (YYYY-MM-DD)
    #[arg(long)]
    pub release_date: Option<String>,
    /// Lyrics substring
    #[arg(long)]
    pub text: Option<String>,
    /// Link substring
    #[arg(long)]
    pub link: Option<String>,
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub page_size: Option<u32>,
}

impl ListArgs {
    pub fn into_filter(self) -> Result<SongFilter> {
        let release_date = match self.release_date.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => Some(parse_release_date(value)?),
            _ => None,
        };

        Ok(SongFilter {
            name: self.name,
            group_name: self.group,
            release_date,
            text: self.text,
            link: self.link,
            page: self.page,
            page_size: self.page_size,
        })
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct UpdateArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub author_id: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub release_date: Option<String>,
    #[arg(long)]
    pub text: Option<String>,
    #[arg(long)]
    pub link: Option<String>,
}

impl From<UpdateArgs> for SongChanges {
    fn from(args: UpdateArgs) -> Self {
        SongChanges {
            name: args.name,
            author_id: args.author_id,
            release_date: args.release_date,
            text: args.text,
            link: args.link,
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if self.config.trim().is_empty() {
            return Err(CatalogError::MissingConfigError {
                field: "config".to_string(),
            });
        }

        if let Command::Create { group, song } = &self.command {
            validate_non_empty_string("group", group)?;
            validate_non_empty_string("song", song)?;
        }
        Ok(())
    }
}
