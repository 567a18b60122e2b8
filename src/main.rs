use clap::Parser;
use serde::Serialize;
use songs_catalog::domain::ports::ConfigProvider;
use songs_catalog::utils::{logger, validation::Validate};
use songs_catalog::{
    CatalogConfig, CatalogError, CliConfig, Command, EnrichmentCoordinator, GeniusClient,
    MusixmatchClient, SongCatalog, SqliteSongStore,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting songs-catalog");
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = run(cli).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?})",
            e,
            e.category()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: CliConfig) -> Result<(), CatalogError> {
    cli.validate()?;

    tracing::info!("📁 Loading configuration from: {}", cli.config);
    let config = CatalogConfig::from_file(&cli.config)?;
    config.validate()?;
    tracing::info!("✅ Configuration loaded and validated successfully");

    let store = SqliteSongStore::connect(config.database_url(), config.max_connections()).await?;

    // Identity 與 Lyrics 共用同一個 Musixmatch 客戶端
    let musixmatch = Arc::new(MusixmatchClient::new(&config.identity));
    let genius = Arc::new(GeniusClient::new(&config.release_date));
    let enrichment = EnrichmentCoordinator::new(
        musixmatch.clone(),
        genius,
        musixmatch,
        config.enrichment_timeout(),
    );
    let catalog = SongCatalog::new(store, enrichment, config.default_page_size());

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("🛑 Interrupt received, cancelling");
            on_signal.cancel();
        }
    });

    match cli.command {
        Command::Create { group, song } => {
            print_json(&catalog.create_song(&cancel, &group, &song).await?)
        }
        Command::List(args) => print_json(&catalog.list_songs(args.into_filter()?).await?),
        Command::Get { id } => print_json(&catalog.get_song(&id).await?),
        Command::Lyrics {
            id,
            page,
            page_size,
        } => print_json(&catalog.song_lyrics(&id, page, page_size).await?),
        Command::Update { id, changes } => {
            print_json(&catalog.update_song(&id, changes.into()).await?)
        }
        Command::Delete { id } => print_json(&catalog.delete_song(&id).await?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CatalogError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
