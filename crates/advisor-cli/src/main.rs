//! Advisor CLI - business advisory engine

use std::path::{Path, PathBuf};
use std::sync::Arc;

use advisor_core::config::Config;
use advisor_core::domain::advisory::{
    AdvisoryEngine, AdvisoryRecommendation, AdvisoryTemplates, BusinessAdvisoryExtraction,
    EnhancedBusinessAnalyzer,
};
use advisor_core::domain::knowledge::{AdvisoryGraphBuilder, GraphBuildResult, KnowledgeGraphStore};
use advisor_core::gateway::{InferenceGateway, LlmGateway, OfflineGateway};
use advisor_core::infrastructure::knowledge::SqliteDocumentStore;
use advisor_core::llm::LlmClient;
use advisor_core::storage::Database;
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "advisor")]
#[command(author, version, about = "Business advisory engine for small businesses", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Never contact the inference backend; use built-in fallbacks
    #[arg(long, global = true)]
    offline: bool,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Get recommendations for a business question
    Advise {
        /// The question, in plain language
        query: String,
        /// Industry context (restaurant, retail, ...)
        #[arg(short, long)]
        industry: Option<String>,
    },

    /// Extract pain points, solutions and tools from a document
    Extract {
        /// Document to analyze
        file: PathBuf,
        #[arg(short, long)]
        industry: Option<String>,
        /// Source id recorded on graph nodes (defaults to the file name)
        #[arg(long)]
        document_id: Option<String>,
        /// Print the extraction without writing it to the graph
        #[arg(long)]
        no_persist: bool,
    },

    /// Inspect the knowledge graph
    Graph {
        #[command(subcommand)]
        action: GraphAction,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run health check
    Doctor,
}

#[derive(Subcommand)]
enum GraphAction {
    /// Node and relationship counts
    Stats,
    /// Show one node
    Show { id: String },
    /// Dump every node and relationship as JSON
    Export,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("advisor=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Advise { query, industry } => {
            cmd_advise(&query, industry.as_deref(), cli.format, cli.offline).await
        }

        Commands::Extract {
            file,
            industry,
            document_id,
            no_persist,
        } => {
            cmd_extract(
                &file,
                industry.as_deref(),
                document_id,
                no_persist,
                cli.format,
                cli.offline,
                cli.quiet,
            )
            .await
        }

        Commands::Graph { action } => cmd_graph(action, cli.format).await,

        Commands::Config { action } => cmd_config(action, cli.quiet),

        Commands::Doctor => cmd_doctor(cli.quiet).await,
    }
}

/// Pick the gateway: OpenRouter when a key is set, otherwise offline
fn build_gateway(config: &Config, offline: bool) -> anyhow::Result<Arc<dyn InferenceGateway>> {
    if offline {
        return Ok(Arc::new(OfflineGateway::with_reason("offline mode requested")));
    }

    match config.llm.resolved_api_key()? {
        Some(key) => {
            let client = LlmClient::new(config.llm.clone(), key)?;
            Ok(Arc::new(LlmGateway::new(client)))
        }
        None => {
            warn!("No API key configured, using offline fallbacks");
            Ok(Arc::new(OfflineGateway::with_reason(
                "no API key configured (set ADVISOR_API_KEY or OPENROUTER_API_KEY)",
            )))
        }
    }
}

fn load_templates(config: &Config) -> anyhow::Result<Arc<AdvisoryTemplates>> {
    Ok(Arc::new(config.analysis.load_templates()?))
}

async fn open_graph(config: &Config) -> anyhow::Result<(Database, KnowledgeGraphStore<SqliteDocumentStore>)> {
    let db = Database::open(config.database_path()?).await?;
    let store = Arc::new(SqliteDocumentStore::new(db.pool().clone()));
    Ok((db, KnowledgeGraphStore::new(store)))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn cmd_advise(
    query: &str,
    industry: Option<&str>,
    format: OutputFormat,
    offline: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    let engine = AdvisoryEngine::new(build_gateway(&config, offline)?)
        .with_templates(load_templates(&config)?);

    let recommendation = engine.get_advisory_recommendations(query, industry).await;

    match format {
        OutputFormat::Json => print_json(&recommendation),
        OutputFormat::Text => {
            print_recommendation(&recommendation);
            Ok(())
        }
    }
}

fn print_recommendation(rec: &AdvisoryRecommendation) {
    println!("Query: {}", rec.query);
    if let Some(industry) = &rec.industry {
        println!("Industry: {}", industry);
    }
    println!("Confidence: {}%", rec.confidence_score);
    println!();

    if !rec.pain_points_identified.is_empty() {
        println!("Pain points:");
        for point in &rec.pain_points_identified {
            println!("  - {} [{}] {}", point.name, point.severity, point.cost_impact);
        }
        println!();
    }

    if !rec.recommended_solutions.is_empty() {
        println!("Solutions:");
        for solution in &rec.recommended_solutions {
            println!(
                "  - {} ({}) ROI {} in {}",
                solution.name, solution.solution_type, solution.roi, solution.timeline
            );
        }
        println!();
    }

    if !rec.suggested_tools.is_empty() {
        println!("Tools:");
        for tool in &rec.suggested_tools {
            println!(
                "  - {} by {}: {} ({} complexity)",
                tool.name, tool.vendor, tool.cost, tool.complexity
            );
        }
        println!();
    }

    println!("Plan ({}):", rec.implementation_plan.total_timeline);
    for phase in &rec.implementation_plan.phases {
        println!("  {} - {}", phase.name, phase.duration);
    }
    for risk in &rec.implementation_plan.risk_factors {
        println!("  risk: {}", risk);
    }
    println!();

    println!(
        "ROI: cost {}, savings {}, payback {}, 3-year {}",
        rec.roi_projection.implementation_cost,
        rec.roi_projection.annual_savings,
        rec.roi_projection.payback_period,
        rec.roi_projection.three_year_roi
    );
    println!();

    println!("Next steps:");
    for (i, step) in rec.next_steps.iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }
}

async fn cmd_extract(
    file: &Path,
    industry: Option<&str>,
    document_id: Option<String>,
    no_persist: bool,
    format: OutputFormat,
    offline: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    let document = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read document: {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());
    let document_id = document_id.unwrap_or_else(|| file_name.clone());

    let analyzer = EnhancedBusinessAnalyzer::new(build_gateway(&config, offline)?)
        .with_templates(load_templates(&config)?)
        .with_dedupe(config.analysis.dedupe_pain_points);

    let extraction = analyzer
        .extract_business_advisory_knowledge(&document, &file_name, industry)
        .await;

    let build = if no_persist {
        None
    } else {
        let (db, graph) = open_graph(&config).await?;
        let result = AdvisoryGraphBuilder::from_graph(graph)
            .build_advisory_graph(&extraction, &document_id)
            .await;
        db.close().await;
        info!(document_id = %document_id, nodes = result.nodes_created, "Extraction persisted");
        Some(result)
    };

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "extraction": extraction,
            "graph": build,
        })),
        OutputFormat::Text => {
            print_extraction(&extraction, build.as_ref(), quiet);
            Ok(())
        }
    }
}

fn print_extraction(
    extraction: &BusinessAdvisoryExtraction,
    build: Option<&GraphBuildResult>,
    quiet: bool,
) {
    println!("Industry: {}", extraction.industry);
    println!("Confidence: {:.0}%", extraction.confidence_scores.overall);

    if !quiet {
        println!();
        println!("Pain points ({}):", extraction.pain_points.len());
        for point in &extraction.pain_points {
            println!("  - {} [{}] {:.0}%", point.name, point.severity.as_str(), point.confidence);
        }
        println!("Solutions ({}):", extraction.solutions.len());
        for solution in &extraction.solutions {
            println!("  - {} ({})", solution.name, solution.solution_type);
        }
        println!("Tools ({}):", extraction.tools.len());
        for tool in &extraction.tools {
            println!("  - {} by {}: {}", tool.name, tool.vendor, tool.price());
        }
        println!();
        println!(
            "Urgency: {} ({})",
            extraction.urgency_assessment.level, extraction.urgency_assessment.timeline
        );
        println!("Complexity: {}", extraction.complexity_rating.reasoning);
    }

    match build {
        Some(result) => {
            println!();
            println!(
                "Graph: {} nodes ({} new), {} relationships",
                result.nodes_created, result.nodes_inserted, result.relationships_created
            );
            if !result.success {
                println!("Warning: {} writes failed", result.failed_writes);
            }
        }
        None if !quiet => println!("Graph: not persisted"),
        None => {}
    }
}

async fn cmd_graph(action: GraphAction, format: OutputFormat) -> anyhow::Result<()> {
    let config = Config::load()?;
    let (db, graph) = open_graph(&config).await?;

    let outcome = match action {
        GraphAction::Stats => {
            let stats = graph.stats().await?;
            match format {
                OutputFormat::Json => print_json(&stats),
                OutputFormat::Text => {
                    println!("Nodes: {}", stats.node_count);
                    for (node_type, count) in &stats.nodes_by_type {
                        println!("  {}: {}", node_type, count);
                    }
                    println!("Relationships: {}", stats.relationship_count);
                    for (rel_type, count) in &stats.relationships_by_type {
                        println!("  {}: {}", rel_type, count);
                    }
                    println!("Average confidence: {:.1}", stats.average_confidence);
                    Ok(())
                }
            }
        }
        GraphAction::Show { id } => match graph.get_node(&id).await? {
            Some(node) => match format {
                OutputFormat::Json => print_json(&node),
                OutputFormat::Text => {
                    println!("{} ({})", node.name, node.node_type.as_str());
                    println!("  ID: {}", node.id);
                    println!("  Confidence: {:.0}", node.confidence);
                    println!("  Sources: {}", node.source_documents.join(", "));
                    for (key, value) in &node.properties {
                        println!("  {}: {}", key, value);
                    }
                    Ok(())
                }
            },
            None => Err(anyhow::anyhow!("Node not found: {}", id)),
        },
        GraphAction::Export => print_json(&graph.export().await?),
    };

    db.close().await;
    outcome
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for (key, value) in config.list()? {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

async fn cmd_doctor(quiet: bool) -> anyhow::Result<()> {
    if !quiet {
        println!("Advisor Health Check");
        println!("====================");
        println!();
    }

    let mut all_ok = true;

    let config = match Config::load() {
        Ok(config) => {
            if !quiet {
                println!("[OK] Configuration: Valid");
            }

            match config.llm.resolved_api_key() {
                Ok(Some(_)) => {
                    if !quiet {
                        let redacted = config.llm.redacted_api_key()?.unwrap_or_default();
                        println!("[OK] API Key: Configured ({})", redacted);
                    }
                }
                Ok(None) => {
                    if !quiet {
                        println!("[--] API Key: Not configured (offline fallbacks only)");
                        println!("     Set ADVISOR_API_KEY or OPENROUTER_API_KEY environment variable");
                    }
                }
                Err(e) => {
                    all_ok = false;
                    if !quiet {
                        println!("[!!] API Key: Error - {}", e);
                    }
                }
            }

            match config.analysis.load_templates() {
                Ok(_) => {
                    if !quiet {
                        println!("[OK] Templates: {}", config.get("analysis.templates_path")?);
                    }
                }
                Err(e) => {
                    all_ok = false;
                    if !quiet {
                        println!("[!!] Templates: Error - {:#}", e);
                    }
                }
            }

            Some(config)
        }
        Err(e) => {
            all_ok = false;
            if !quiet {
                println!("[!!] Configuration: Error - {:#}", e);
            }
            None
        }
    };

    if !quiet {
        match Config::config_path() {
            Ok(path) if path.exists() => println!("[OK] Config file: {}", path.display()),
            Ok(path) => println!("[--] Config file: {} (using defaults)", path.display()),
            Err(e) => println!("[!!] Config file: Error - {}", e),
        }
    }

    if let Some(config) = config {
        match open_graph(&config).await {
            Ok((db, graph)) => {
                match db.health_check().await {
                    Ok(()) => {
                        if !quiet {
                            println!("[OK] Database: Connected");
                            println!("     Path: {}", db.path().display());
                        }
                        match db.migration_status().await {
                            Ok(status) if status.needs_migration => {
                                all_ok = false;
                                if !quiet {
                                    println!(
                                        "[!!] Database: Migrations pending (v{} -> v{})",
                                        status.current_version, status.target_version
                                    );
                                }
                            }
                            Ok(status) => {
                                if !quiet {
                                    println!("[OK] Database: Schema v{}", status.current_version);
                                }
                            }
                            Err(e) => {
                                all_ok = false;
                                if !quiet {
                                    println!("[!!] Database: Migration check failed - {}", e);
                                }
                            }
                        }
                        if !quiet && let Ok(stats) = graph.stats().await {
                            println!(
                                "     Graph: {} nodes, {} relationships",
                                stats.node_count, stats.relationship_count
                            );
                        }
                    }
                    Err(e) => {
                        all_ok = false;
                        if !quiet {
                            println!("[!!] Database: Health check failed - {}", e);
                        }
                    }
                }
                db.close().await;
            }
            Err(e) => {
                all_ok = false;
                if !quiet {
                    println!("[!!] Database: Failed to open - {:#}", e);
                }
            }
        }
    }

    if !quiet {
        println!();
        if all_ok {
            println!("All checks passed!");
        } else {
            println!("Some checks failed. See above for details.");
        }
    }

    Ok(())
}
