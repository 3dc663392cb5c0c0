// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use litreview::utils::logging::{format_error, format_heading, format_success, format_warning};
use litreview::{
    BatchInserter, ChatClient, Config, EmbeddingClient, FileKind, JsonExporter,
    LanceDbClient, MarkdownParser, PdfLoader, PromptKind, PromptStore, PromptTemplate,
    Preprocessor, SchemaManager, SentenceRecord, Summarizer, TextExporter, TopicLabeler,
    Validator,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "litreview")]
#[command(version = "0.1.0")]
#[command(about = "Literature-review pipeline: metadata extraction, summaries and topic labels", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split papers and notes into sentences and store them with metadata
    Ingest {
        dir: PathBuf,

        #[arg(long, value_name = "NUM")]
        limit: Option<usize>,

        /// Also write the sentence records to a text file
        #[arg(long, value_name = "FILE")]
        save: Option<PathBuf>,
    },

    /// Search stored sentences by semantic similarity
    Search {
        query: String,

        #[arg(short, default_value_t = 5)]
        k: usize,

        #[arg(short, long)]
        source: Option<String>,
    },

    /// Summarize a single document
    Summarize { file: PathBuf },

    /// Produce a short label for a topic
    LabelTopic {
        #[arg(long = "keyword", required = true)]
        keywords: Vec<String>,

        #[arg(long = "document", required = true)]
        documents: Vec<String>,
    },

    /// Manage stored prompt templates
    Prompts {
        #[command(subcommand)]
        action: PromptAction,
    },

    Export {
        output: PathBuf,

        #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        #[arg(short, long)]
        pretty: bool,

        #[arg(short, long)]
        source: Option<String>,
    },

    Stats,

    Verify,

    Reset {
        #[arg(long)]
        confirm: bool,
    },
}

#[derive(Subcommand)]
enum PromptAction {
    List {
        category: Option<String>,
    },
    Get {
        category: String,
        index: usize,
    },
    Add {
        category: String,
        #[arg(long)]
        template: String,
    },
    Edit {
        category: String,
        index: usize,
        #[arg(long)]
        template: String,
    },
    Delete {
        category: String,
        index: usize,
    },
    /// Verify that every prompt in use has its required placeholders
    Check,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    litreview::utils::logging::init_logger(cli.color, cli.verbose);

    info!("Loading configuration from: {}", cli.config.display());

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load_defaults().context("Failed to load default configuration")?
    };

    match cli.command {
        Commands::Ingest { dir, limit, save } => {
            cmd_ingest(&config, &dir, limit, save.as_deref(), cli.color).await?;
        }
        Commands::Search { query, k, source } => {
            cmd_search(&config, &query, k, source.as_deref()).await?;
        }
        Commands::Summarize { file } => {
            cmd_summarize(&config, &file).await?;
        }
        Commands::LabelTopic {
            keywords,
            documents,
        } => {
            cmd_label_topic(&config, &keywords, &documents).await?;
        }
        Commands::Prompts { action } => {
            cmd_prompts(&config, action)?;
        }
        Commands::Export {
            output,
            format,
            pretty,
            source,
        } => {
            cmd_export(&config, &output, format, pretty, source.as_deref()).await?;
        }
        Commands::Stats => {
            cmd_stats(&config).await?;
        }
        Commands::Verify => {
            cmd_verify(&config).await?;
        }
        Commands::Reset { confirm } => {
            cmd_reset(&config, confirm).await?;
        }
    }

    Ok(())
}

async fn connect(config: &Config) -> Result<LanceDbClient> {
    let client = LanceDbClient::new(config.database.clone())
        .await
        .context("Failed to create LanceDB client")?;

    if !client.ping().await? {
        error!("Cannot connect to LanceDB");
        bail!("Database connection failed");
    }

    Ok(client)
}

fn open_prompts(config: &Config) -> Result<PromptStore> {
    PromptStore::open(&config.prompts.path).with_context(|| {
        format!(
            "Failed to open prompt store {}",
            config.prompts.path.display()
        )
    })
}

async fn cmd_ingest(
    config: &Config,
    dir: &Path,
    limit: Option<usize>,
    save: Option<&Path>,
    colored: bool,
) -> Result<()> {
    info!("Starting ingestion of {}", dir.display());
    let start_time = Instant::now();

    let prompts = open_prompts(config)?;
    let metadata_template = prompts
        .resolve(PromptKind::DocumentMetadata)
        .context("Invalid document metadata prompt")?;

    let model = ChatClient::new(&config.llm).context("Failed to create chat client")?;
    info!("Using chat model {}", model.model());

    let client = connect(config).await?;
    SchemaManager::new(&client)
        .initialize()
        .await
        .context("Failed to initialize schema")?;
    client.check_embedding_dim().await?;

    let preprocessor = Preprocessor::new(config.pipeline.clone(), &model, metadata_template)
        .with_progress(colored);
    let output = preprocessor
        .run(dir, limit)
        .await
        .context("Preprocessing failed")?;

    for failure in &output.failures {
        eprintln!(
            "{}",
            format_warning(&format!("{}: {}", failure.relative_path, failure.message))
        );
    }

    if let Some(path) = save {
        TextExporter::save(&output.records, path).context("Failed to save sentences")?;
    }

    let embeddings = EmbeddingClient::new(&config.llm, config.database.embedding_dim)
        .context("Failed to create embedding client")?;
    let insert_stats = BatchInserter::new(&client, &embeddings)
        .replace_sources(&output.sources, &output.records)
        .await
        .context("Failed to store sentences")?;

    let stats = &output.stats;
    println!("{}", format_heading("Ingestion summary"));
    println!("  Documents processed: {}", stats.documents_processed);
    println!("  Documents failed:    {}", stats.documents_failed);
    println!("  Pages processed:     {}", stats.pages_processed);
    println!(
        "  Sentences stored:    {} ({} batches)",
        insert_stats.sentences_inserted, insert_stats.batches
    );
    println!(
        "  Sentences/document:  {:.1}",
        stats.sentences_per_document()
    );
    println!("  Success rate:        {:.1}%", stats.success_rate());

    println!(
        "{}",
        format_success(&format!(
            "Ingestion complete in {:.2}s",
            start_time.elapsed().as_secs_f64()
        ))
    );

    Ok(())
}

async fn cmd_search(config: &Config, query: &str, k: usize, source: Option<&str>) -> Result<()> {
    Validator::validate_top_k(k)?;
    Validator::validate_content_not_empty(query)?;

    info!("Searching for: {}", query);

    let client = connect(config).await?;
    let embeddings = EmbeddingClient::new(&config.llm, config.database.embedding_dim)
        .context("Failed to create embedding client")?;

    let query_embedding = embeddings
        .embed_query(query)
        .await
        .context("Failed to embed query")?;

    let results = client
        .vector_search(query_embedding, k, source)
        .await
        .context("Vector search failed")?;

    if results.is_empty() {
        println!("\nNo results found for query: \"{}\"\n", query);
        println!("Try:");
        println!("  - Using different search terms");
        println!("  - Removing the source filter");
        println!("  - Checking that documents have been ingested");
        return Ok(());
    }

    println!(
        "\n{}\n",
        format_heading(&format!("Search Results for: \"{}\"", query))
    );
    println!("Found {} result(s)\n", results.len());
    println!("{}", "=".repeat(80));

    for (idx, result) in results.iter().enumerate() {
        println!("\n{}. {}", idx + 1, result.format_summary(300));
        println!("   Source: {} (page {})", result.metadata.source, result.metadata.page);
        println!("   Citation: {}", result.metadata.citation);
    }

    println!("\n{}", "=".repeat(80));
    info!("Search complete");

    Ok(())
}

async fn cmd_summarize(config: &Config, file: &Path) -> Result<()> {
    let kind = Validator::validate_document(file, config.pipeline.max_file_size_mb)?;

    let text = load_document_text(file, kind).await?;
    Validator::validate_content_not_empty(&text)?;

    let prompts = open_prompts(config)?;
    let template = prompts
        .resolve(PromptKind::Summary)
        .context("Invalid summary prompt")?;

    let model = ChatClient::new(&config.llm).context("Failed to create chat client")?;
    let summary = Summarizer::new(&model, template)
        .summarize(&text)
        .await
        .context("Summarization failed")?;

    println!("{}", format_heading(&format!("Summary of {}", file.display())));
    println!("{}", summary);

    Ok(())
}

async fn load_document_text(file: &Path, kind: FileKind) -> Result<String> {
    let text = match kind {
        FileKind::Paper => PdfLoader::new().load_pages(file).await?.join("\n"),
        FileKind::MarkdownNote => {
            let content = tokio::fs::read_to_string(file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            MarkdownParser::new().to_plain_text(&content)?
        }
        FileKind::TextNote => tokio::fs::read_to_string(file)
            .await
            .with_context(|| format!("Failed to read {}", file.display()))?,
        FileKind::Other => bail!("Unsupported file type: {}", file.display()),
    };
    Ok(text)
}

async fn cmd_label_topic(config: &Config, keywords: &[String], documents: &[String]) -> Result<()> {
    let prompts = open_prompts(config)?;
    let template = prompts
        .resolve(PromptKind::TopicLabel)
        .context("Invalid topic label prompt")?;

    let model = ChatClient::new(&config.llm).context("Failed to create chat client")?;
    let label = TopicLabeler::new(&model, template)
        .label(documents, keywords)
        .await
        .context("Topic labeling failed")?;

    println!("{}", label);
    Ok(())
}

fn cmd_prompts(config: &Config, action: PromptAction) -> Result<()> {
    let mut store = open_prompts(config)?;

    match action {
        PromptAction::List { category } => {
            let categories: Vec<String> = match category {
                Some(category) => vec![category],
                None => store.categories().map(str::to_string).collect(),
            };

            for category in categories {
                println!("{}", format_heading(&category));
                let entries = store.list(&category);
                if entries.is_empty() {
                    println!("  (no prompts)");
                }
                for (index, entry) in entries.iter().enumerate() {
                    println!("  [{}] {}", index, Validator::truncate_text(&entry.template, 80));
                }
            }
        }
        PromptAction::Get { category, index } => {
            println!("{}", store.get(&category, index)?);
        }
        PromptAction::Add { category, template } => {
            Validator::validate_category(&category)?;
            verify_for_category(&category, &template)?;
            let index = store.add(&category, template)?;
            println!(
                "{}",
                format_success(&format!("Prompt added to '{}' at index {}", category, index))
            );
        }
        PromptAction::Edit {
            category,
            index,
            template,
        } => {
            verify_for_category(&category, &template)?;
            store.edit(&category, index, template)?;
            println!(
                "{}",
                format_success(&format!("Prompt {} in '{}' updated", index, category))
            );
        }
        PromptAction::Delete { category, index } => {
            store.delete(&category, index)?;
            println!(
                "{}",
                format_success(&format!("Prompt {} deleted from '{}'", index, category))
            );
        }
        PromptAction::Check => {
            let mut failed = 0;
            for kind in PromptKind::ALL {
                match store.resolve(kind) {
                    Ok(_) => println!("{}", format_success(&format!("{}: ok", kind))),
                    Err(e) => {
                        failed += 1;
                        println!("{}", format_error(&format!("{}: {}", kind, e)));
                    }
                }
            }
            if failed > 0 {
                bail!("{} prompt(s) failed verification", failed);
            }
        }
    }

    Ok(())
}

/// Templates for known categories must carry that category's placeholders.
fn verify_for_category(category: &str, template: &str) -> Result<()> {
    match PromptKind::from_category(category) {
        Some(kind) => PromptTemplate::new(template).verify(kind)?,
        None => warn!("'{}' is not a category used by the pipeline", category),
    }
    Ok(())
}

async fn cmd_export(
    config: &Config,
    output: &Path,
    format: ExportFormat,
    pretty: bool,
    source: Option<&str>,
) -> Result<()> {
    info!("Exporting sentences to {}", output.display());

    let client = connect(config).await?;
    let records: Vec<SentenceRecord> = client
        .scan_sentences(source)
        .await
        .context("Failed to read stored sentences")?
        .into_iter()
        .map(|stored| stored.record)
        .collect();

    if records.is_empty() {
        println!("{}", format_warning("No sentences to export"));
        return Ok(());
    }

    match format {
        ExportFormat::Json => {
            let path = output.join("sentences.json");
            let manifest = JsonExporter::save(&records, &path, pretty)?;
            println!(
                "{}",
                format_success(&format!(
                    "Exported {} sentences from {} sources to {}",
                    manifest.total_sentences,
                    manifest.sources.len(),
                    path.display()
                ))
            );
        }
        ExportFormat::Text => {
            let path = output.join("sentences.txt");
            TextExporter::save(&records, &path)?;
            println!(
                "{}",
                format_success(&format!(
                    "Exported {} sentences to {}",
                    records.len(),
                    path.display()
                ))
            );
        }
    }

    Ok(())
}

async fn cmd_stats(config: &Config) -> Result<()> {
    info!("Gathering statistics");

    let client = connect(config).await?;
    let count = client.get_sentence_count().await?;
    let sources: std::collections::BTreeSet<String> = client
        .scan_sentences(None)
        .await?
        .into_iter()
        .map(|stored| stored.record.metadata.source)
        .collect();

    println!("{}", format_heading("Database statistics"));
    println!("  Table:     {}", client.table_name());
    println!("  Sentences: {}", count);
    println!("  Sources:   {}", sources.len());

    Ok(())
}

async fn cmd_verify(config: &Config) -> Result<()> {
    info!("Verifying database schema");

    let client = connect(config).await?;
    info!("Database connection successful");

    if SchemaManager::new(&client).verify_schema().await? {
        println!("{}", format_success("Schema verification passed"));
    } else {
        println!(
            "{}",
            format_warning("Sentences table missing or incomplete, run ingest to create it")
        );
    }

    Ok(())
}

async fn cmd_reset(config: &Config, confirm: bool) -> Result<()> {
    if !confirm {
        eprintln!(
            "{}",
            format_error("This will delete all data. Use --confirm to proceed")
        );
        return Ok(());
    }

    warn!("Resetting database - all data will be lost");

    let client = connect(config).await?;
    let schema_manager = SchemaManager::new(&client);
    schema_manager
        .drop_all_tables()
        .await
        .context("Failed to drop tables")?;
    schema_manager
        .initialize()
        .await
        .context("Failed to recreate schema")?;

    println!("{}", format_success("Database reset complete"));

    Ok(())
}
