//! Blogsmith CLI - Command-line interface
//!
//! Usage:
//!   blogsmith index-info
//!   blogsmith search <topic> [--top-k N] [--metric cosine|dot]
//!   blogsmith draft <topic> [--email ADDR] [--out DIR]

use anyhow::{bail, Context};
use blogsmith_core::{AppConfig, SimilarityMetric};
use blogsmith_export::render_attachments;
use blogsmith_mail::{is_deliverable_address, Mailer, MailjetMailer, OutgoingMail};
use blogsmith_rag::BlogDrafter;
use blogsmith_vector::{create_embedding_client, EmbeddingClient, Retriever, VectorIndex};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "blogsmith")]
#[command(about = "Draft blog posts grounded in an embedding index")]
#[command(version)]
struct Cli {
    /// TOML configuration file (environment variables still override it)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Vector index file
    #[arg(long, global = true)]
    index: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what the vector index contains
    IndexInfo,
    /// Rank index records against a topic
    Search {
        /// Topic to search for
        topic: String,
        /// Number of results
        #[arg(long)]
        top_k: Option<usize>,
        /// Similarity metric (cosine or dot)
        #[arg(long)]
        metric: Option<SimilarityMetric>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Draft a blog post
    Draft {
        /// Topic to write about
        topic: String,
        /// Email the PDF and DOCX to this address
        #[arg(long)]
        email: Option<String>,
        /// Write the PDF and DOCX into this directory
        #[arg(long)]
        out: Option<PathBuf>,
        /// Print the draft as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)
                .and_then(AppConfig::with_env_override)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => AppConfig::from_env().context("Invalid configuration in environment")?,
        };
        if let Some(index) = &self.index {
            config.index.path = index.clone();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!("blogsmith={}", config.logging.level))
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::IndexInfo => index_info(&config),
        Commands::Search {
            topic,
            top_k,
            metric,
            json,
        } => search(&config, &topic, top_k, metric, json).await,
        Commands::Draft {
            topic,
            email,
            out,
            json,
        } => draft(&config, &topic, email.as_deref(), out.as_deref(), json).await,
    }
}

fn load_index(config: &AppConfig) -> anyhow::Result<Arc<VectorIndex>> {
    Ok(Arc::new(VectorIndex::load(&config.index.path)?))
}

fn index_info(config: &AppConfig) -> anyhow::Result<()> {
    let index = load_index(config)?;

    println!("Index:     {}", config.index.path.display());
    println!("Records:   {}", index.len());
    match index.dimension() {
        Some(dimension) => println!("Dimension: {dimension}"),
        None => println!("Dimension: -"),
    }
    for record in index.records().iter().take(5) {
        println!("  {:<16} {}", record.id, record.label());
    }
    if index.len() > 5 {
        println!("  ... {} more", index.len() - 5);
    }
    Ok(())
}

async fn search(
    config: &AppConfig,
    topic: &str,
    top_k: Option<usize>,
    metric: Option<SimilarityMetric>,
    json: bool,
) -> anyhow::Result<()> {
    let index = load_index(config)?;
    let embedder: Arc<dyn EmbeddingClient> = Arc::from(create_embedding_client(&config.llm)?);
    let retriever = Retriever::new(index, embedder)
        .with_config(&config.index)
        .with_top_k(top_k.unwrap_or(config.index.top_k))
        .with_metric(metric.unwrap_or(config.index.metric));

    let hits = retriever.search(topic).await?;

    if json {
        let rows: Vec<_> = hits
            .iter()
            .map(|hit| {
                serde_json::json!({
                    "id": hit.record.id,
                    "label": hit.label(),
                    "score": hit.score,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if hits.is_empty() {
        println!("No matches.");
    }
    for (rank, hit) in hits.iter().enumerate() {
        println!("{:>2}. {:>8.4}  {}", rank + 1, hit.score, hit.label());
    }
    Ok(())
}

async fn draft(
    config: &AppConfig,
    topic: &str,
    email: Option<&str>,
    out: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    if let Some(address) = email {
        if !is_deliverable_address(address) {
            bail!("Not a deliverable email address: {address}");
        }
    }

    let index = load_index(config)?;
    let drafter = BlogDrafter::from_config(config, index)?;
    let draft = drafter.draft(topic).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&draft)?);
    } else {
        println!("{}\n", draft.blog);
        println!("Sources:");
        for source in &draft.sources {
            println!("  {:>8.4}  {}", source.score, source.label);
        }
    }

    if out.is_none() && email.is_none() {
        return Ok(());
    }

    let attachments = render_attachments(&draft.topic, &draft.blog)?;

    if let Some(dir) = out {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        for attachment in &attachments {
            let path = dir.join(&attachment.filename);
            std::fs::write(&path, &attachment.data)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
    }

    if let Some(address) = email {
        let mailer = MailjetMailer::from_config(&config.mail)?;
        let mail = OutgoingMail::blog(address, &draft.topic, &draft.blog, attachments);
        let receipt = mailer.send(&mail).await?;
        eprintln!("Emailed {address} (status {})", receipt.status);
    }

    Ok(())
}
