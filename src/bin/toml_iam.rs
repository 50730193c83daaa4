use anyhow::Context;
use clap::Parser;
use data_access_iam::core::{ConfigProvider, TemplateStore};
use data_access_iam::utils::{logger, validation::Validate};
use data_access_iam::{CompileEngine, FsTemplateStore, LocalStorage, TemplatePipeline, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-iam")]
#[command(about = "Compile IAM role templates from a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "iam-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Compile and report without writing any files
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;

    logger::init_logger(args.verbose || config.verbose(), config.log_json());
    tracing::info!("Loaded configuration from {}", args.config);

    if let Err(e) = config.validate() {
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }

    display_config_summary(&config, &args);

    let store = FsTemplateStore::load(config.templates_dir())?;
    let shapes = store.available_shapes();

    let pipeline = TemplatePipeline::new(LocalStorage::new(".".to_string()), config, store);
    let engine = CompileEngine::new(pipeline);

    if args.dry_run {
        let result = engine.plan().await?;
        println!("🔍 Dry run analysis:");
        println!("  Statement templates: {}", shapes.join(", "));
        println!(
            "  Records: {} compiled, {} skipped, {} duplicates",
            result.records_compiled, result.records_skipped, result.collisions
        );
        let format = engine.pipeline().config().output_format();
        for document in &result.documents {
            println!("  {} ({} roles)", document.file_name(format), document.len());
        }
        return Ok(());
    }

    match engine.run().await {
        Ok(summary) => {
            println!("✅ Compiled {} records", summary.records_compiled);
            for path in &summary.written {
                println!("📁 {}", path);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Compilation failed: {} (Category: {:?})", e, e.category());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Mapping: {}", config.mapping_file());
    println!("  Templates: {}", config.templates_dir());
    println!("  Output: {} ({:?})", config.output_dir(), config.output_format());
    println!("  On duplicate: {:?}", config.collision_policy());
    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }
    println!();
}
