//! Downedit - Main Entry Point
//!
//! Command-line front end: export, import, beautify and table generation
//! through the same controller a GUI would drive.

use clap::{Parser, Subcommand, ValueEnum};
use downedit::config::{get_store_dir, load_config, load_config_from};
use downedit::error::ResultExt;
use downedit::export::{export_file_name, ExportFormat};
use downedit::files::{NativeFiles, PresetDialogs};
use downedit::markdown::{generate_table_markdown, Alignment, TableSpec};
use downedit::state::stored_documents;
use downedit::storage::{JsonFileKvStore, MemoryKvStore};
use downedit::timers::now_ms;
use downedit::{DowneditApp, Error, Result, Settings};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Application name constant.
const APP_NAME: &str = "Downedit";

#[derive(Parser)]
#[command(
    name = "downedit",
    about = "Markdown export, Word import and cleanup",
    version
)]
struct Cli {
    /// Settings file to use instead of the platform config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a markdown file to PDF, DOCX or HTML
    Export {
        input: PathBuf,
        #[arg(long = "to", value_enum)]
        to: FormatArg,
        /// Output file (defaults to the input name with the format's extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Convert a Word document to markdown
    Import {
        input: PathBuf,
        /// Output file (prints to stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Tidy a markdown file
    Beautify {
        input: PathBuf,
        /// Exit with status 1 if the file would change, without writing
        #[arg(long)]
        check: bool,
        /// Output file (rewrites the input when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print an empty pipe table
    Table {
        #[arg(long, default_value = "3")]
        rows: usize,
        #[arg(long, default_value = "2")]
        cols: usize,
        /// Column alignments, e.g. left,center,right
        #[arg(long, value_delimiter = ',')]
        align: Vec<String>,
    },
    /// List documents saved in the local store, newest first
    List,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Pdf,
    Docx,
    Html,
}

impl From<FormatArg> for ExportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Pdf => ExportFormat::Pdf,
            FormatArg::Docx => ExportFormat::Docx,
            FormatArg::Html => ExportFormat::Html,
        }
    }
}

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    debug!("Starting {}", APP_NAME);

    let settings = match &cli.config {
        Some(path) => load_config_from(path)
            .unwrap_or_warn_default(Settings::default(), "Failed to load configuration"),
        None => load_config(),
    };

    match run(cli.command, settings) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, settings: Settings) -> Result<ExitCode> {
    match command {
        Commands::Export { input, to, output } => {
            let format = ExportFormat::from(to);
            let dialogs = match output {
                Some(path) => PresetDialogs::new().with_save_path(path),
                None => PresetDialogs::new().with_save_path(sibling(
                    &input,
                    &export_file_name(&file_name(&input), format),
                )),
            };
            let mut app = batch_app(settings, dialogs);
            app.open_path(&input, now_ms())?;
            if let Some(path) = app.export_active(format)? {
                println!("{}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Import { input, output } => {
            let dialogs = match &output {
                Some(path) => PresetDialogs::new().with_save_path(path),
                None => PresetDialogs::new(),
            };
            let mut app = batch_app(settings, dialogs);
            let outcome = app.import_word_path(&input, now_ms())?;
            for warning in &outcome.warnings {
                eprintln!("warning: {}", warning);
            }

            if output.is_some() {
                if let Some(path) = app.save_active_as(now_ms())? {
                    println!("{}", path.display());
                }
            } else if let Some(doc) = app.active() {
                print!("{}", doc.content());
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Beautify {
            input,
            check,
            output,
        } => {
            let dialogs = match &output {
                Some(path) => PresetDialogs::new().with_save_path(path),
                None => PresetDialogs::new(),
            };
            let mut app = batch_app(settings, dialogs);
            let now = now_ms();
            app.open_path(&input, now)?;
            let changed = app.beautify_active(now)?;

            if check {
                if changed {
                    println!("{} would be reformatted", input.display());
                    return Ok(ExitCode::FAILURE);
                }
                return Ok(ExitCode::SUCCESS);
            }

            let written = if output.is_some() {
                app.save_active_as(now)?
            } else if changed {
                app.save_active(now)?
            } else {
                None
            };
            match written {
                Some(path) => info!("Wrote {}", path.display()),
                None => info!("{} already tidy", input.display()),
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Table { rows, cols, align } => {
            let mut spec = TableSpec::new(rows, cols);
            for (col, name) in align.iter().enumerate() {
                let alignment = Alignment::parse(name)
                    .ok_or_else(|| Error::Application(format!("Unknown alignment '{}'", name)))?;
                spec.set_alignment(col, alignment);
            }
            println!("{}", generate_table_markdown(&spec));
            Ok(ExitCode::SUCCESS)
        }

        Commands::List => {
            let store = JsonFileKvStore::open(get_store_dir()?)?;
            let now = now_ms();
            for doc in stored_documents(&store)? {
                println!(
                    "{}  {}  {}",
                    doc.id,
                    downedit::history::format_history_time(doc.updated_at, now),
                    doc.file_name
                );
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Controller for one-shot commands: nothing outlives the process, so the
/// store is in memory.
fn batch_app(settings: Settings, dialogs: PresetDialogs) -> DowneditApp {
    DowneditApp::new(
        settings,
        Box::new(MemoryKvStore::new()),
        Box::new(NativeFiles::new()),
        Box::new(dialogs),
    )
}

fn file_name(path: &Path) -> String {
    downedit::files::file_name_of(path)
}

fn sibling(path: &Path, name: &str) -> PathBuf {
    path.parent()
        .map(|dir| dir.join(name))
        .unwrap_or_else(|| PathBuf::from(name))
}
