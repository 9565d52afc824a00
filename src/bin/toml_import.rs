use anyhow::Context;
use clap::Parser;
use movies_import::config::toml_config::TomlConfig;
use movies_import::core::ConfigProvider;
use movies_import::utils::{logger, validation::Validate};
use movies_import::{ImportEngine, ImportPipeline, LocalStorage, TmdbClient};

#[derive(Parser)]
#[command(name = "toml-import")]
#[command(about = "TMDb import driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "import-config.toml")]
    config: String,

    /// Enable verbose output (overrides [logging].verbose)
    #[arg(short, long)]
    verbose: bool,

    /// Override [import].max_pages
    #[arg(long)]
    max_pages: Option<u32>,

    /// Show the resolved configuration and fetch only the genre list
    #[arg(long)]
    dry_run: bool,
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Import: {}", config.import.name);
    if let Some(description) = &config.import.description {
        tracing::info!("   {}", description);
    }
    tracing::info!("   Source: {}", config.api_base_url());
    tracing::info!(
        "   API key: {}",
        if config.api_key().is_some() {
            "from config"
        } else {
            "from TMDB_API_KEY"
        }
    );
    tracing::info!("   Pages: {}", ConfigProvider::max_pages(config));
    tracing::info!("   Include upcoming: {}", config.include_upcoming());
    tracing::info!("   Output: {}", config.output_path());
}

async fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    let client = TmdbClient::from_config(config)?;
    let genres = client
        .fetch_movie_genres()
        .await
        .context("failed to reach the catalog API")?;

    tracing::info!("🔍 Catalog API reachable, {} genres available", genres.len());
    for genre in &genres {
        tracing::debug!("   {} ({})", genre.name, genre.id);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;

    if let Some(max_pages) = args.max_pages {
        config.import.max_pages = Some(max_pages);
    }

    let verbose = args.verbose || config.verbose();
    if config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("🚀 Starting TOML-based import");
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written");
        return perform_dry_run(&config).await;
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = ImportPipeline::new(storage, config)?;
    let report = ImportEngine::new(pipeline).run().await?;

    println!("✅ Import completed successfully!");
    println!(
        "🎬 {} films, {} authors, {} genres",
        report.films, report.authors, report.genres
    );
    println!("📁 Output saved to: {}", report.output_path);

    Ok(())
}
