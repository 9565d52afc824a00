use clap::Parser;
use movies_import::utils::error::{ErrorSeverity, ImportError};
use movies_import::utils::{logger, validation::Validate};
use movies_import::{CliConfig, ImportEngine, ImportPipeline, LocalStorage};

fn report_failure(e: &ImportError) -> i32 {
    tracing::error!(
        "❌ Import failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2, // 可重試
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting movies-import");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        std::process::exit(report_failure(&e));
    }

    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = match ImportPipeline::new(storage, config) {
        Ok(pipeline) => pipeline,
        Err(e) => std::process::exit(report_failure(&e)),
    };

    let engine = ImportEngine::new(pipeline);

    match engine.run().await {
        Ok(report) => {
            tracing::info!("✅ Import completed in {:?}", report.elapsed);
            println!(
                "✅ Imported {} genres, {} authors, {} films",
                report.genres, report.authors, report.films
            );
            println!("📁 Output saved to: {}", report.output_path);
        }
        Err(e) => {
            let exit_code = report_failure(&e);
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
