use anyhow::Context;
use api_shared::CreatedRes;
use clap::{Parser, Subcommand};
use docsos_core::{open_store, status_report, CoreConfig, DocRepository, SectionRepository};
use docsos_files::UploadService;
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docsos")]
#[command(about = "DocsOS documentation store CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage sections
    #[command(subcommand)]
    Sections(SectionCommands),
    /// Manage docs
    #[command(subcommand)]
    Docs(DocCommands),
    /// Store a file in the upload directory
    Upload {
        /// File to upload
        path: PathBuf,
        /// Name to store it under (defaults to the file's own name)
        #[arg(long)]
        name: Option<String>,
    },
    /// Report store connectivity
    Status,
}

#[derive(Subcommand)]
enum SectionCommands {
    /// List sections in display order
    List,
    /// Create a section
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        order: Option<i64>,
    },
}

#[derive(Subcommand)]
enum DocCommands {
    /// List docs, optionally of one section
    List {
        #[arg(long)]
        section_id: Option<String>,
    },
    /// Create a doc
    Create {
        #[arg(long)]
        section_id: String,
        #[arg(long)]
        title: String,
        /// Markdown content
        #[arg(long, conflicts_with = "content_file")]
        content: Option<String>,
        /// Read the markdown content from a file
        #[arg(long)]
        content_file: Option<PathBuf>,
        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
        #[arg(long)]
        cover_image: Option<String>,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Builds a create payload, leaving out options that were not given.
fn payload(fields: Vec<(&str, Option<Value>)>) -> Value {
    let object = fields
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
        .collect();
    Value::Object(object)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("docsos=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = CoreConfig::from_env().context("invalid configuration")?;

    match cli.command {
        Commands::Sections(command) => {
            let store = open_store(&cfg).await?;
            let sections = SectionRepository::new(store);
            match command {
                SectionCommands::List => print_json(&sections.list().await?)?,
                SectionCommands::Create {
                    title,
                    description,
                    order,
                } => {
                    let id = sections
                        .create(&payload(vec![
                            ("title", Some(json!(title))),
                            ("description", description.map(Value::from)),
                            ("order", order.map(Value::from)),
                        ]))
                        .await?;
                    print_json(&CreatedRes { id: id.to_string() })?;
                }
            }
        }
        Commands::Docs(command) => {
            let store = open_store(&cfg).await?;
            let docs = DocRepository::new(store, cfg.section_filter_policy());
            match command {
                DocCommands::List { section_id } => {
                    print_json(&docs.list(section_id.as_deref()).await?)?
                }
                DocCommands::Create {
                    section_id,
                    title,
                    content,
                    content_file,
                    tags,
                    cover_image,
                } => {
                    let content = match content_file {
                        Some(path) => Some(
                            std::fs::read_to_string(&path)
                                .with_context(|| format!("reading {}", path.display()))?,
                        ),
                        None => content,
                    };
                    let id = docs
                        .create(&payload(vec![
                            ("section_id", Some(json!(section_id))),
                            ("title", Some(json!(title))),
                            ("content", content.map(Value::from)),
                            ("tags", tags.map(Value::from)),
                            ("cover_image", cover_image.map(Value::from)),
                        ]))
                        .await?;
                    print_json(&CreatedRes { id: id.to_string() })?;
                }
            }
        }
        Commands::Upload { path, name } => {
            let content =
                std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            let requested = match name {
                Some(name) => name,
                None => path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .context("upload path has no file name")?,
            };
            let uploads = UploadService::new(cfg.upload_dir())?;
            print_json(&uploads.store(&requested, &content)?)?;
        }
        Commands::Status => {
            let store = open_store(&cfg).await?;
            print_json(&status_report(&cfg, store.as_ref()).await)?;
        }
    }

    Ok(())
}
