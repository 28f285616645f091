use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::{input, output};
use notes_core::classifier;
use notes_core::config;
use notes_core::config::AppConfig;
use notes_core::models::{InputType, Note};
use notes_core::pipeline;
use notes_core::taxonomy::Subject;
use std::path::PathBuf;
use storage::NoteFilter;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;
    debug!(database = %cfg.database.path, provider = %cfg.provider.name, "configuration loaded");

    match cli.command {
        Commands::Generate {
            text,
            file,
            audio,
            transcript,
            json,
        } => {
            let note_input = match audio {
                Some(path) => input::audio_input(&path, transcript.as_deref())?,
                None => input::text_input(text, file.as_deref())?,
            };
            let note = pipeline::run_generate(&cfg, &note_input).await?;
            print_note(&note, json)
        }
        Commands::Classify { text, file, json } => run_classify(&cfg, text, file, json).await,
        Commands::List {
            subject,
            language,
            input_type,
            search,
            limit,
            json,
        } => {
            let filter = NoteFilter {
                subject: subject.map(|s| s.label().to_string()),
                language,
                input_type: input_type.map(|t| t.as_str().to_string()),
                search,
                limit,
            };
            run_list(&cfg, &filter, json).await
        }
        Commands::Show { id, json } => {
            let store = storage::open(&cfg.database.path).await?;
            let note = Note::try_from(store.get(id).await?)?;
            print_note(&note, json)
        }
        Commands::Edit {
            id,
            notes,
            notes_file,
            json,
        } => {
            let replacement = input::edited_notes(notes, notes_file.as_deref())?;
            let store = storage::open(&cfg.database.path).await?;
            let note = Note::try_from(store.update_generated_notes(id, &replacement).await?)?;
            print_note(&note, json)
        }
        Commands::Delete { id } => {
            let store = storage::open(&cfg.database.path).await?;
            store.delete(id).await?;
            println!("deleted note {}", id);
            Ok(())
        }
        Commands::Subjects => {
            let store = storage::open(&cfg.database.path).await?;
            let counts = store.count_by_subject().await?;
            for line in output::subjects_table(&counts) {
                println!("{}", line);
            }
            Ok(())
        }
    }
}

#[derive(Parser)]
#[command(name = "lecture-notes")]
#[command(about = "Turn lectures into structured, classified study notes", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate notes from text or audio and store them
    Generate {
        /// Lecture text
        #[arg(long, conflicts_with_all = ["file", "audio"])]
        text: Option<String>,
        /// Read lecture text from a file
        #[arg(long, conflicts_with = "audio")]
        file: Option<PathBuf>,
        /// Lecture recording (mp3, wav, m4a, ogg, flac, ...)
        #[arg(long)]
        audio: Option<PathBuf>,
        /// Transcript of the recording, if one exists
        #[arg(long, requires = "audio")]
        transcript: Option<PathBuf>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Detect language and subject without generating notes
    Classify {
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// List stored notes, newest first
    List {
        /// Filter by subject, e.g. "Computer Science"
        #[arg(long, value_parser = parse_subject)]
        subject: Option<Subject>,
        /// Filter by language (case-insensitive)
        #[arg(long)]
        language: Option<String>,
        /// Filter by input type (text|audio)
        #[arg(long, value_parser = parse_input_type)]
        input_type: Option<InputType>,
        /// Substring search over notes and source text
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one note
    Show {
        id: i64,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace the generated notes of a stored note
    Edit {
        id: i64,
        #[arg(long, conflicts_with = "notes_file")]
        notes: Option<String>,
        #[arg(long)]
        notes_file: Option<PathBuf>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a stored note
    Delete { id: i64 },
    /// List the subject taxonomy with stored note counts
    Subjects,
}

fn parse_subject(s: &str) -> Result<Subject, String> {
    s.parse::<Subject>().map_err(|e| e.to_string())
}

fn parse_input_type(s: &str) -> Result<InputType, String> {
    s.parse::<InputType>().map_err(|e| e.to_string())
}

fn print_note(note: &Note, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(note)?);
    } else {
        println!("{}", output::note_detail(note));
    }
    Ok(())
}

async fn run_classify(
    cfg: &AppConfig,
    text: Option<String>,
    file: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let content = input::read_text(text, file.as_deref())?;
    let registry = pipeline::build_registry(cfg);
    let llm = registry.generator(None)?;
    let result = classifier::classify(llm.as_ref(), &content).await;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("language: {}\nsubject:  {}", result.language, result.subject);
    }
    Ok(())
}

async fn run_list(cfg: &AppConfig, filter: &NoteFilter, json: bool) -> Result<()> {
    let store = storage::open(&cfg.database.path).await?;
    let notes = store
        .list(filter)
        .await?
        .into_iter()
        .map(Note::try_from)
        .collect::<Result<Vec<_>>>()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&notes)?);
    } else if notes.is_empty() {
        println!("no notes");
    } else {
        for note in &notes {
            println!("{}", output::note_line(note));
        }
    }
    Ok(())
}
