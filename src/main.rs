use clap::Parser;
use data_access_iam::core::{ConfigProvider, TemplateStore};
use data_access_iam::utils::{logger, validation::Validate};
use data_access_iam::{CliConfig, CompileEngine, FsTemplateStore, LocalStorage, TemplatePipeline};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    logger::init_logger(config.verbose, config.log_json);

    tracing::info!("Starting data-access-iam");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }

    let store = match FsTemplateStore::load(config.templates_dir()) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };
    tracing::debug!("Statement templates: {:?}", store.available_shapes());

    let dry_run = config.dry_run;
    let storage = LocalStorage::new(".".to_string());
    let pipeline = TemplatePipeline::new(storage, config, store);
    let engine = CompileEngine::new(pipeline);

    let outcome = if dry_run {
        engine.plan().await.map(|result| {
            let format = engine.pipeline().config().output_format();
            println!("🔍 Dry run, nothing written");
            println!(
                "  Records: {} compiled, {} skipped",
                result.records_compiled, result.records_skipped
            );
            for document in &result.documents {
                println!(
                    "  {} ({} roles)",
                    document.file_name(format),
                    document.len()
                );
            }
        })
    } else {
        engine.run().await.map(|summary| {
            println!("✅ Compiled {} records", summary.records_compiled);
            for path in &summary.written {
                println!("📁 {}", path);
            }
            if summary.collisions > 0 {
                println!(
                    "⚠️  {} duplicate resource names were overwritten",
                    summary.collisions
                );
            }
        })
    };

    if let Err(e) = outcome {
        tracing::error!(
            "Compilation failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}
