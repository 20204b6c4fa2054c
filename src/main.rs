//! Binary entry point for recordpro.
//!
//! This binary provides the CLI interface for the student-records manager.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::{Args, Parser, Subcommand};
use recordpro::cli::{self, render};
use recordpro::config::RecordProConfig;
use recordpro::llm::{GeminiClient, OpenAiClient};
use recordpro::observability;
use recordpro::services::gateway::random_roll_suffix;
use recordpro::services::{FieldUpdate, FormController, aggregation};
use recordpro::{
    AppState, FilesystemBackend, RecordStore, SortField, SortOrder, SortState, StudentId, View,
};
use secrecy::ExposeSecret;
use std::path::Path;
use std::process::ExitCode;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// `RecordPro` - a local student-records manager.
#[derive(Parser)]
#[command(name = "recordpro")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// List students.
    List {
        /// Case-insensitive match on name or roll number.
        #[arg(short, long, default_value = "")]
        search: String,

        /// Sort field: name, rollNumber, gpa, or enrollmentDate.
        #[arg(long, default_value = "name")]
        sort: SortField,

        /// Sort descending.
        #[arg(long)]
        desc: bool,
    },

    /// Show one student.
    Show {
        /// Student id.
        id: String,
    },

    /// Add a student.
    Add {
        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Edit a student.
    Edit {
        /// Student id.
        id: String,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Delete a student.
    Delete {
        /// Student id.
        id: String,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete every student.
    Reset {
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Show summary statistics.
    Stats,

    /// Ask the AI advisor for a report on all students.
    Insights,

    /// Ask the AI advisor for sample students and store them.
    Generate,

    /// Show the effective configuration.
    Config,
}

/// Field values for add and edit.
#[derive(Args, Default)]
struct FieldArgs {
    /// Full name.
    #[arg(long)]
    name: Option<String>,

    /// Roll number.
    #[arg(long)]
    roll: Option<String>,

    /// GPA; non-numeric text is stored as 0.0.
    #[arg(long)]
    gpa: Option<String>,

    /// Department.
    #[arg(long)]
    department: Option<String>,

    /// Email address.
    #[arg(long)]
    email: Option<String>,

    /// Status: Enrolled, Graduated, or "On Leave".
    #[arg(long)]
    status: Option<String>,

    /// Enrollment date (YYYY-MM-DD).
    #[arg(long)]
    date: Option<String>,

    /// Set a field by its record key (repeatable), e.g. `rollNumber=CS-1`.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,
}

impl FieldArgs {
    /// Converts the provided flags to staged-field updates, in flag order.
    fn into_updates(self) -> recordpro::Result<Vec<FieldUpdate>> {
        let pairs = [
            ("name", self.name),
            ("rollNumber", self.roll),
            ("gpa", self.gpa),
            ("department", self.department),
            ("email", self.email),
            ("status", self.status),
            ("enrollmentDate", self.date),
        ];

        let mut updates = Vec::new();
        for (key, value) in pairs {
            if let Some(value) = value {
                updates.push(FieldUpdate::parse(key, &value)?);
            }
        }
        for assignment in self.set {
            let (key, value) = assignment.split_once('=').ok_or_else(|| {
                recordpro::Error::InvalidInput(format!("expected KEY=VALUE, got '{assignment}'"))
            })?;
            updates.push(FieldUpdate::parse(key.trim(), value)?);
        }
        Ok(updates)
    }
}

/// Main entry point.
fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init_from_config(&config.logging, cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(cli: Cli, config: RecordProConfig) -> CmdResult {
    match cli.command {
        Commands::List { search, sort, desc } => cmd_list(&config, search, sort, desc),
        Commands::Show { id } => cmd_show(&config, id),
        Commands::Add { fields } => cmd_add(&config, fields),
        Commands::Edit { id, fields } => cmd_edit(&config, id, fields),
        Commands::Delete { id, yes } => cmd_delete(&config, id, yes),
        Commands::Reset { yes } => cmd_reset(&config, yes),
        Commands::Stats => cmd_stats(&config),
        Commands::Insights => cmd_insights(&config),
        Commands::Generate => cmd_generate(&config),
        Commands::Config => cmd_config(&config),
    }
}

/// Loads configuration.
fn load_config(path: Option<&str>) -> Result<RecordProConfig, Box<dyn std::error::Error>> {
    // If a path is provided, load from that file
    if let Some(config_path) = path {
        return Ok(RecordProConfig::load_from_file(Path::new(config_path))?.with_env_overrides());
    }

    // Environment override for config path
    if let Ok(config_path) = std::env::var("RECORDPRO_CONFIG_PATH") {
        if !config_path.trim().is_empty() {
            return Ok(
                RecordProConfig::load_from_file(Path::new(&config_path))?.with_env_overrides()
            );
        }
    }

    // Otherwise, load from default location
    Ok(RecordProConfig::load_default().with_env_overrides())
}

/// Opens the record store at the configured location.
fn open_store(config: &RecordProConfig) -> recordpro::Result<RecordStore<FilesystemBackend>> {
    let backend = FilesystemBackend::with_create(&config.data_dir)?;
    Ok(RecordStore::open(backend, config.storage_key.clone()))
}

/// List command.
fn cmd_list(config: &RecordProConfig, search: String, sort: SortField, desc: bool) -> CmdResult {
    let store = open_store(config)?;

    let mut state = AppState::new();
    state.navigate(View::Records);
    state.set_search(search);
    state.sort = SortState::new(sort, if desc { SortOrder::Desc } else { SortOrder::Asc });

    print!("{}", render::student_table(&state.visible(store.records())));
    Ok(())
}

/// Show command.
fn cmd_show(config: &RecordProConfig, id: String) -> CmdResult {
    let store = open_store(config)?;
    let id = StudentId::new(id);
    let student = store
        .get(&id)
        .ok_or(recordpro::Error::NotFound(id))?;

    print!("{}", render::student_detail(student));
    Ok(())
}

/// Add command.
fn cmd_add(config: &RecordProConfig, fields: FieldArgs) -> CmdResult {
    let mut store = open_store(config)?;
    let mut form = FormController::new();
    form.begin_create(recordpro::today());

    for update in fields.into_updates()? {
        form.apply(update)?;
    }
    warn_issues(&form);

    let student = form.submit(&mut store)?;
    println!("Added {} ({})", student.name(), student.id);
    Ok(())
}

/// Edit command.
fn cmd_edit(config: &RecordProConfig, id: String, fields: FieldArgs) -> CmdResult {
    let mut store = open_store(config)?;
    let id = StudentId::new(id);
    let updates = fields.into_updates()?;
    if updates.is_empty() {
        return Err(recordpro::Error::InvalidInput("no fields to change".to_string()).into());
    }

    let mut form = FormController::new();
    let student = store
        .get(&id)
        .ok_or_else(|| recordpro::Error::NotFound(id.clone()))?;
    form.begin_edit(student);

    for update in updates {
        form.apply(update)?;
    }
    warn_issues(&form);

    let student = form.submit(&mut store)?;
    println!("Updated {} ({})", student.name(), student.id);
    Ok(())
}

/// Prints advisory form problems without blocking the submit.
fn warn_issues(form: &FormController) {
    for issue in form.validate() {
        eprintln!("Warning: {}", issue.message());
    }
}

/// Delete command.
fn cmd_delete(config: &RecordProConfig, id: String, yes: bool) -> CmdResult {
    let mut store = open_store(config)?;
    let id = StudentId::new(id);
    let Some(student) = store.get(&id) else {
        println!("No student with id {id}");
        return Ok(());
    };

    let prompt = format!("Delete {} ({})?", student.name(), student.roll_number());
    if !yes && !cli::confirm_stdin(&prompt)? {
        println!("Cancelled");
        return Ok(());
    }

    store.delete(&id)?;
    println!("Deleted {id}");
    Ok(())
}

/// Reset command.
fn cmd_reset(config: &RecordProConfig, yes: bool) -> CmdResult {
    let mut store = open_store(config)?;
    let prompt = format!("Delete all {} student records?", store.len());
    if !yes && !cli::confirm_stdin(&prompt)? {
        println!("Cancelled");
        return Ok(());
    }

    store.clear()?;
    println!("All records cleared");
    Ok(())
}

/// Stats command.
fn cmd_stats(config: &RecordProConfig) -> CmdResult {
    let store = open_store(config)?;
    let records = store.records();

    print!("{}", render::overview(records));
    println!();
    print!(
        "{}",
        render::ranked("Top Performers", &aggregation::top_performers(records))
    );
    print!("{}", render::ranked("At Risk", &aggregation::at_risk(records)));
    Ok(())
}

/// Insights command.
fn cmd_insights(config: &RecordProConfig) -> CmdResult {
    let store = open_store(config)?;
    let gateway = cli::build_gateway(&config.ai);

    let mut state = AppState::new();
    state.navigate(View::Ai);
    println!("{}", state.refresh_insights(&gateway, store.records()));
    Ok(())
}

/// Generate command.
fn cmd_generate(config: &RecordProConfig) -> CmdResult {
    let mut store = open_store(config)?;
    let gateway = cli::build_gateway(&config.ai);

    let samples = gateway.request_sample_records();
    if samples.is_empty() {
        println!("No sample records were generated");
        return Ok(());
    }

    let today = recordpro::today();
    let created = store.create_batch(
        samples
            .into_iter()
            .map(|sample| sample.into_fields(today, random_roll_suffix())),
    )?;
    println!("Generated {} sample record(s)", created.len());
    Ok(())
}

/// Config command.
fn cmd_config(config: &RecordProConfig) -> CmdResult {
    let default_model = match config.ai.provider {
        recordpro::config::AiProvider::Gemini => GeminiClient::DEFAULT_MODEL,
        recordpro::config::AiProvider::OpenAi => OpenAiClient::DEFAULT_MODEL,
    };
    let api_key = config
        .ai
        .api_key
        .as_ref()
        .map_or("(from environment)", |k| {
            if k.expose_secret().is_empty() {
                "(empty)"
            } else {
                "(set)"
            }
        });

    println!("Current Configuration");
    println!("=====================");
    println!();
    println!("Data Directory: {}", config.data_dir.display());
    println!("Snapshot File: {}", config.snapshot_path().display());
    println!();
    println!("AI Configuration:");
    println!("  Provider: {}", config.ai.provider.as_str());
    println!(
        "  Model: {}",
        config.ai.model.as_deref().unwrap_or(default_model)
    );
    println!("  API Key: {api_key}");
    println!(
        "  Base URL: {}",
        config.ai.base_url.as_deref().unwrap_or("(default)")
    );
    println!();
    println!("Logging:");
    println!(
        "  Format: {}",
        config.logging.format.as_deref().unwrap_or("pretty")
    );
    println!(
        "  Filter: {}",
        config.logging.filter.as_deref().unwrap_or("info")
    );
    if let Some(file) = &config.logging.file {
        println!("  File: {}", file.display());
    }

    Ok(())
}
