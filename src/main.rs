//! Chanscout - AI-enriched community discovery.
//!
//! A CLI front-end over the discovery engine: searches several retrieval
//! surfaces in parallel, ranks the merged candidates, optionally enriches
//! the top ones, and renders the result set.
//!
//! Exit codes:
//!   0 - Success (an empty result set is a success)
//!   1 - Runtime error (invalid arguments, config failure, I/O error)

use anyhow::{Context, Result};
use chanscout::cli::{Args, OutputFormat};
use chanscout::config::Config;
use chanscout::engine::DiscoveryEngine;
use chanscout::models::AssessmentStats;
use chanscout::report;
use chanscout::surface::{HttpGateway, HttpInference};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Chanscout v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_discovery(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .chanscout.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".chanscout.toml");

    if path.exists() {
        eprintln!("⚠️  .chanscout.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .chanscout.toml")?;

    println!("✅ Created .chanscout.toml with default settings.");
    println!("   Edit it to customize the gateway, model, catalogs, and cache TTLs.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete discovery workflow.
async fn run_discovery(args: Args) -> Result<()> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let query = args.query_str().to_string();
    let opts = args.discover_options();

    if !args.quiet {
        println!("🔍 Discovering communities for: \"{}\"", query);
        if opts.enrich {
            println!("   Model: {}", config.model.name);
            println!("   Analysis limit: {}", opts.analysis_limit);
        }
    }

    // Build the engine over its two outbound surfaces
    let gateway = Arc::new(HttpGateway::new(
        config.gateway.base_url.clone(),
        config.gateway.timeout_seconds,
    ));
    let inference = Arc::new(HttpInference::new(
        config.inference_config(args.api_key.clone()),
    ));
    let show_progress = opts.enrich && !args.quiet;
    let engine = DiscoveryEngine::with_config(
        gateway,
        inference,
        config.engine_config(show_progress),
    );

    // Run the discovery call
    let results = engine
        .discover(&query, &opts)
        .await
        .context("Discovery failed")?;

    let duration = start_time.elapsed().as_secs_f64();
    debug!("engine stats after run: {:?}", engine.stats());

    // Render the chosen representation
    let output = match args.format {
        OutputFormat::Json => report::export_records(&results, &query)
            .context("Failed to serialize results")?,
        OutputFormat::Csv => report::export_csv(&results),
        OutputFormat::Report => report::export_report(&results, &query),
    };

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            if !args.quiet {
                println!("✅ Results saved to: {}", path.display());
            }
        }
        None => println!("{}", output),
    }

    // Print summary
    if !args.quiet {
        if results.is_empty() {
            println!("\n📭 No communities found. This is a valid outcome, not a failure.");
        } else {
            println!("\n📊 Discovery Summary:");
            println!("   Candidates: {}", results.len());

            let stats = AssessmentStats::from_results(&results);
            if stats.analyzed > 0 {
                println!(
                    "   Assessed: {} | Avg quality: {:.1}/10 | High quality: {}",
                    stats.analyzed, stats.avg_score, stats.high_quality
                );
            }
        }
        println!("   Duration: {:.1}s", duration);
    }

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .chanscout.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
