use appbase_content::{
    client::{BackendInitializer, RestConnector},
    config::Config,
    helper::{public_helpers, seo_helpers, youtube_helpers},
    models::{
        db_operations::{storage_db_operations::CONTENT_FOLDER, ContentFacade},
        envelope::Envelope,
        ContentKind, MediaKind, RecordId, UploadFile,
    },
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "appbase_content", author, version, about = "Manage and preview the site's content and media.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the .env configuration file. When it is missing, the process environment is used.
    #[arg(long, required = true, value_name = "FILE")]
    env_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Content {
        #[command(subcommand)]
        action: ContentAction,
    },
    Media {
        #[command(subcommand)]
        action: MediaAction,
    },
    /// Upload a file into a content folder.
    Upload {
        file: PathBuf,
        #[arg(long, default_value = CONTENT_FOLDER)]
        folder: String,
    },
    /// Upload a media file into the folder for its type.
    UploadMedia {
        file: PathBuf,
        #[arg(long = "type", value_parser = parse_media_kind)]
        kind: MediaKind,
    },
    DeleteFile {
        path: String,
    },
    /// Per-type content counts for the dashboard.
    Stats,
    /// Print the video id of a YouTube URL.
    Youtube {
        url: String,
    },
    /// Render the dynamic sections of a public page.
    Render {
        path: String,
    },
    /// Print the head tags of a page.
    Seo {
        page: String,
        #[arg(long, default_value = "ar")]
        lang: String,
    },
}

#[derive(Subcommand, Debug)]
enum ContentAction {
    List {
        #[arg(long = "type", value_parser = parse_content_kind)]
        kind: Option<ContentKind>,
    },
    Public {
        #[arg(long = "type", value_parser = parse_content_kind)]
        kind: ContentKind,
        #[arg(long)]
        limit: Option<u32>,
    },
    Get {
        id: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum MediaAction {
    List {
        #[arg(long = "type", value_parser = parse_media_kind)]
        kind: Option<MediaKind>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        page_size: u32,
    },
    Get {
        id: String,
    },
    Delete {
        id: String,
    },
}

fn parse_content_kind(value: &str) -> Result<ContentKind, String> {
    ContentKind::parse(value).ok_or_else(|| format!("unknown content type '{}'", value))
}

fn parse_media_kind(value: &str) -> Result<MediaKind, String> {
    MediaKind::parse(value).ok_or_else(|| format!("unknown media type '{}'", value))
}

fn print_json<T: Serialize>(value: &T) -> bool {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            true
        }
        Err(e) => {
            eprintln!("❌ Error: could not serialize output: {}", e);
            false
        }
    }
}

fn print_envelope<B: Serialize>(envelope: Envelope<B>) -> bool {
    print_json(&envelope) && envelope.success
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_env(&cli.env_file) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Error: failed to load or parse configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    env_logger::init_from_env(env_logger::Env::new().default_filter_or(&config.log_level));
    config.warn_on_credential_problems();

    // Commands that never touch the backend.
    match &cli.command {
        Commands::Youtube { url } => {
            return match youtube_helpers::extract_youtube_id(url) {
                Some(id) => {
                    println!("{}", id);
                    ExitCode::SUCCESS
                }
                None => {
                    eprintln!("❌ Error: '{}' is not a valid YouTube URL.", url);
                    ExitCode::FAILURE
                }
            };
        }
        Commands::Seo { page, lang } => {
            let Some(lang) = seo_helpers::Lang::parse(lang) else {
                eprintln!("❌ Error: unknown language '{}'. Use 'ar' or 'en'.", lang);
                return ExitCode::FAILURE;
            };
            return match public_helpers::PageRenderer::new() {
                Ok(renderer) => {
                    print!("{}", seo_helpers::head_tags(&renderer, page, lang));
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("❌ Error: page templates failed to compile: {}", e);
                    ExitCode::FAILURE
                }
            };
        }
        _ => {}
    }

    let initializer = Arc::new(BackendInitializer::new(
        config.client_settings(),
        RestConnector,
        config.readiness_policy(),
    ));
    initializer.initialize();
    let facade = ContentFacade::new(initializer);

    let ok = match cli.command {
        Commands::Content { action } => match action {
            ContentAction::List { kind } => print_envelope(Envelope::data(facade.list_content(kind).await)),
            ContentAction::Public { kind, limit } => {
                print_envelope(Envelope::data(facade.get_public_content(kind, limit).await))
            }
            ContentAction::Get { id } => print_envelope(Envelope::record(facade.get_content(&RecordId::from(id)).await)),
            ContentAction::Delete { id } => print_envelope(Envelope::done(facade.delete_content(&RecordId::from(id)).await)),
        },
        Commands::Media { action } => match action {
            MediaAction::List { kind, page, page_size } => {
                print_envelope(Envelope::page(facade.list_media(kind, page, page_size).await))
            }
            MediaAction::Get { id } => print_envelope(Envelope::record(facade.get_media(&RecordId::from(id)).await)),
            MediaAction::Delete { id } => print_envelope(Envelope::done(facade.delete_media(&RecordId::from(id)).await)),
        },
        Commands::Upload { file, folder } => match UploadFile::from_path(&file).await {
            Ok(upload) => print_envelope(Envelope::upload(facade.upload_file(&upload, &folder).await)),
            Err(e) => {
                eprintln!("❌ Error: could not read '{}': {}", file.display(), e);
                false
            }
        },
        Commands::UploadMedia { file, kind } => match UploadFile::from_path(&file).await {
            Ok(upload) => print_envelope(Envelope::upload(facade.upload_media_file(&upload, kind).await)),
            Err(e) => {
                eprintln!("❌ Error: could not read '{}': {}", file.display(), e);
                false
            }
        },
        Commands::DeleteFile { path } => print_envelope(Envelope::done(facade.delete_file(&path).await)),
        Commands::Stats => print_envelope(Envelope::stats(facade.dashboard_stats().await)),
        Commands::Render { path } => {
            let Some(page) = public_helpers::PublicPage::from_path(&path) else {
                eprintln!("❌ Error: '{}' has no dynamic sections.", path);
                return ExitCode::FAILURE;
            };
            match public_helpers::PageRenderer::new() {
                Ok(renderer) => print_json(&public_helpers::load_page(&facade, &renderer, page).await),
                Err(e) => {
                    eprintln!("❌ Error: page templates failed to compile: {}", e);
                    false
                }
            }
        }
        Commands::Youtube { .. } | Commands::Seo { .. } => true,
    };

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
