use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chat_context::{parse_candidates, Conversation, ConversationPipeline, KnowledgeBase, PipelineConfig, PipelineOutput};

// ============================================================================
// Main CLI Structure
// ============================================================================

#[derive(Parser)]
#[command(name = "chat-context")]
#[command(version, about = "Normalize and analyze captured conversations", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Pipeline config (JSON); missing fields use defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Topic knowledge base (JSON); defaults to the built-in vocabulary
    #[arg(long, global = true)]
    knowledge: Option<PathBuf>,

    /// Print the full output as JSON instead of context lines
    #[arg(long, global = true)]
    json: bool,

    /// Detailed logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process one conversation: a JSON array of message candidates
    Analyze {
        /// Input file; reads stdin when omitted
        input: Option<PathBuf>,

        /// Display name of the local user
        #[arg(long)]
        user: Option<String>,

        /// Group context lines under date headers
        #[arg(long)]
        group_by_date: bool,

        /// Reference date for relative labels (YYYY-MM-DD), default today
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Process many conversations in parallel: a JSON array of
    /// `{candidates, displayName}` objects
    Batch {
        input: Option<PathBuf>,

        #[arg(long)]
        group_by_date: bool,

        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Print the default configuration as JSON
    DefaultConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.clone();
    let knowledge_path = cli.knowledge.clone();
    let pipeline = || build_pipeline(config_path.as_deref(), knowledge_path.as_deref());

    match cli.command {
        Commands::Analyze {
            input,
            user,
            group_by_date,
            today,
        } => {
            let raw = read_input(input.as_deref())?;
            let candidates = parse_candidates(&raw).context("Failed to parse message candidates")?;
            let pipeline = pipeline()?.with_date_grouping(group_by_date);
            let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
            let output = pipeline.run_at(&candidates, user.as_deref(), today);
            print_output(&output, cli.json)?;
        }
        Commands::Batch {
            input,
            group_by_date,
            today,
        } => {
            let raw = read_input(input.as_deref())?;
            let conversations: Vec<Conversation> =
                serde_json::from_str(&raw).context("Failed to parse conversation batch")?;
            let pipeline = pipeline()?.with_date_grouping(group_by_date);
            let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
            let outputs = pipeline.run_batch_at(&conversations, today);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outputs)?);
            } else {
                for (i, output) in outputs.iter().enumerate() {
                    println!("=== Conversation {} ===", i + 1);
                    print_output(output, false)?;
                }
            }
        }
        Commands::DefaultConfig => {
            println!("{}", serde_json::to_string_pretty(&PipelineConfig::default())?);
        }
    }

    Ok(())
}

fn build_pipeline(config: Option<&Path>, knowledge: Option<&Path>) -> Result<ConversationPipeline> {
    let config = match config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    let knowledge = match knowledge {
        Some(path) => KnowledgeBase::from_file(path)
            .with_context(|| format!("Failed to load knowledge base from {}", path.display()))?,
        None => KnowledgeBase::builtin(),
    };
    ConversationPipeline::with_knowledge(config, Arc::new(knowledge)).context("Failed to build pipeline")
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn print_output(output: &PipelineOutput, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(output)?);
        return Ok(());
    }

    let analysis = &output.analysis;
    println!(
        "# {} messages | flow: {:?} | tone: {:?} | intent: {:?} | urgency: {:?}",
        analysis.message_count,
        analysis.conversation_flow.flow_type,
        analysis.sentiment.tone,
        analysis.intent.primary,
        analysis.urgency.level,
    );
    println!("# topic: {}", analysis.topic_analysis.summary);
    if let Some(question) = &analysis.has_unanswered_question.question {
        println!("# open question: {}", question);
    }
    for line in &output.context_lines {
        println!("{}", line);
    }
    Ok(())
}
