//! myvault - Encrypted JSON secrets vault
//!
//! Manage property-keyed secret records in a single age-encrypted file.
//!
//! Commands:
//! - validate -i <FILE>: Check a JSON input file without touching the vault
//! - read [--property EXPR] [-o FILE]: Show or export entries
//! - create -i <FILE>: Append new entries
//! - update -i <FILE>: Merge fields into existing entries
//! - delete --property EXPR [--force]: Remove entries with confirmation

use anyhow::{bail, Result};
use clap::{CommandFactory, Parser, Subcommand};
use myvault::storage::read_json_input;
use myvault::validate::{summarize, validate};
use myvault::{
    output, CreateOutcome, DeleteOutcome, FilterExpression, ReadOutcome, Record, RecordStore,
    TerminalDecisions, UpdateOutcome, VaultCipher, VaultFile,
};
use myvault_core::{logging, Config};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "myvault")]
#[command(about = "Encrypted JSON secrets vault - property-keyed entries with glob selection")]
#[command(version)]
#[command(after_help = r#"EXAMPLES:
    myvault validate -i secrets.json
    myvault -f vault.json create -i new_secrets.json
    myvault -f vault.json read --property website1.com
    myvault -f vault.json read --property "web*|*api*"
    myvault -f vault.json update -i updates.json
    myvault -f vault.json delete --property "web*|test.*"
    myvault -f vault.json delete --property "*.old" --force

SECURITY:
    - The vault password is read from $VAULT_PASSWORD (see config password_env)
    - Input and vault files must be owner-only (chmod 600)
    - Vault is encrypted with age (scrypt passphrase, ASCII armor)
    - Secret values are never logged"#)]
struct Cli {
    /// Path to encrypted vault file
    #[arg(short = 'f', long = "file", global = true)]
    file: Option<PathBuf>,

    /// Also log to the console at debug level (the log file is always written)
    #[arg(short = 'd', long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a JSON input file
    Validate {
        /// JSON file to validate
        #[arg(short = 'i', long = "input")]
        input: PathBuf,
    },

    /// Read entries from the vault
    Read {
        /// Filter by property expression (globs, '|' for alternatives: "web*|*api*|exact.match")
        #[arg(long)]
        property: Option<String>,
        /// Write matching entries to a JSON file instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Create new vault entries
    Create {
        /// JSON file with new entries
        #[arg(short = 'i', long = "input")]
        input: PathBuf,
    },

    /// Update existing vault entries
    Update {
        /// JSON file with updated entries
        #[arg(short = 'i', long = "input")]
        input: PathBuf,
    },

    /// Delete vault entries
    Delete {
        /// Property expression to delete (globs, '|' for alternatives)
        #[arg(long)]
        property: String,
        /// Skip confirmation prompts
        #[arg(long)]
        force: bool,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Validate { .. } => "validate",
            Commands::Read { .. } => "read",
            Commands::Create { .. } => "create",
            Commands::Update { .. } => "update",
            Commands::Delete { .. } => "delete",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        return ExitCode::FAILURE;
    };

    let config = match Config::load_default() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&config.log_path(), cli.debug) {
        eprintln!("warning: {:#}", e);
    }

    match run(command, cli.file, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Vault operation failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, file: Option<PathBuf>, config: &Config) -> Result<()> {
    let name = command.name();
    match command {
        Commands::Validate { input } => cmd_validate(&input),
        Commands::Read { property, output } => {
            let store = open_store(file, config, name)?;
            cmd_read(&store, property.as_deref(), output.as_deref())
        }
        Commands::Create { input } => cmd_create(&mut open_store(file, config, name)?, &input),
        Commands::Update { input } => cmd_update(&mut open_store(file, config, name)?, &input),
        Commands::Delete { property, force } => {
            cmd_delete(&mut open_store(file, config, name)?, &property, force)
        }
    }
}

/// Resolve the vault path and password. Fails before any file is touched.
fn open_store(file: Option<PathBuf>, config: &Config, command: &str) -> Result<RecordStore<VaultFile>> {
    let Some(password) = config.password() else {
        bail!("{} environment variable not set", config.password_env);
    };

    let Some(path) = file.or_else(|| config.default_file.clone()) else {
        bail!("Vault file (-f/--file) is required for {} command", command);
    };

    tracing::info!("Running {} on vault file: {}", command, path.display());
    Ok(RecordStore::new(VaultFile::new(&path, VaultCipher::new(&password))))
}

/// Read and validate a JSON input file
fn load_input(input: &Path) -> Result<Vec<Record>> {
    let records = validate(read_json_input(input)?)?;
    tracing::info!("Loaded {} entries from input file", records.len());
    Ok(records)
}

/// Structural check of an input file, no vault involved
fn cmd_validate(input: &Path) -> Result<()> {
    tracing::info!("Validating JSON file: {}", input.display());
    let records = load_input(input)?;
    let summary = summarize(&records);

    println!("✓ JSON file structure is valid");
    println!("✓ File permissions are secure");
    println!("✓ Found {} valid entries", records.len());
    println!("Properties found: {}", summary.properties.join(", "));
    if !summary.duplicates.is_empty() {
        tracing::warn!("Duplicate properties detected: {}", summary.duplicates.join(", "));
        println!("warning: Duplicate properties detected: {}", summary.duplicates.join(", "));
    }
    println!("All fields used: {}", summary.fields.join(", "));
    println!("JSON validation completed successfully!");

    Ok(())
}

/// Show entries, or write them to a file
fn cmd_read(
    store: &RecordStore<VaultFile>,
    property: Option<&str>,
    output_file: Option<&Path>,
) -> Result<()> {
    let filter = property.map(FilterExpression::parse);
    let records = match store.read(filter.as_ref())? {
        ReadOutcome::Found(records) => records,
        ReadOutcome::NoMatches => {
            match filter {
                Some(f) => println!("No entries found matching property expression: {}", f),
                None => println!("No entries found"),
            }
            return Ok(());
        }
        ReadOutcome::Empty => {
            println!("No entries found");
            return Ok(());
        }
    };

    match output_file {
        Some(path) => {
            output::write_json(path, &records)?;
            println!("Results written to: {}", path.display());
        }
        None => println!("{}", output::render_compact(&records)),
    }

    Ok(())
}

/// Append new entries
fn cmd_create(store: &mut RecordStore<VaultFile>, input: &Path) -> Result<()> {
    let new_records = load_input(input)?;

    match store.create(new_records, &mut TerminalDecisions::stdio())? {
        CreateOutcome::Created { added, total } => {
            println!("Successfully created {} entries in vault file", added);
            println!("Total entries in vault: {}", total);
        }
        CreateOutcome::Cancelled { .. } => println!("Create operation cancelled"),
    }

    Ok(())
}

/// Merge fields into existing entries
fn cmd_update(store: &mut RecordStore<VaultFile>, input: &Path) -> Result<()> {
    let updates = load_input(input)?;

    match store.update(&updates, &mut TerminalDecisions::stdio())? {
        UpdateOutcome::Updated { updated, not_found } => {
            println!("Successfully updated {} entries in vault file", updated);
            if !not_found.is_empty() {
                println!("Properties not found: {}", not_found.join(", "));
            }
        }
        UpdateOutcome::NothingUpdated { .. } => println!("No entries were updated"),
        UpdateOutcome::Cancelled { .. } => println!("Update operation cancelled"),
    }

    Ok(())
}

/// Remove entries matching an expression
fn cmd_delete(store: &mut RecordStore<VaultFile>, property: &str, force: bool) -> Result<()> {
    let filter = FilterExpression::parse(property);

    match store.delete(&filter, force, &mut TerminalDecisions::stdio())? {
        DeleteOutcome::Empty => println!("No entries found in vault file"),
        DeleteOutcome::NoMatches => {
            println!("No entries found matching property expression: {}", filter)
        }
        DeleteOutcome::Cancelled => println!("Delete operation cancelled"),
        DeleteOutcome::NothingSelected => println!("No entries selected for deletion"),
        DeleteOutcome::Deleted { removed, remaining } => {
            for property in &removed {
                tracing::info!("Deleted property: {}", property);
            }
            println!(
                "Successfully deleted {} entries. {} entries remaining.",
                removed.len(),
                remaining
            );
        }
        DeleteOutcome::Removed { removed } => {
            for property in &removed {
                tracing::info!("Deleted property: {}", property);
            }
            println!("Deleted all entries. Vault file removed.");
        }
    }

    tracing::info!("Delete operation completed for expression: {}", filter);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        let cli = Cli::try_parse_from(["myvault", "validate", "-i", "secrets.json"]).unwrap();
        if let Some(Commands::Validate { input }) = cli.command {
            assert_eq!(input, PathBuf::from("secrets.json"));
        } else {
            panic!("Expected Validate command");
        }

        let cli = Cli::try_parse_from(["myvault", "-f", "vault.json", "read", "--property", "web*|*api*"]).unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("vault.json")));
        if let Some(Commands::Read { property, output }) = cli.command {
            assert_eq!(property.as_deref(), Some("web*|*api*"));
            assert!(output.is_none());
        } else {
            panic!("Expected Read command");
        }
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["myvault", "read", "-f", "v.json", "-d", "-o", "out.json"]).unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("v.json")));
        assert!(cli.debug);
        assert!(matches!(cli.command, Some(Commands::Read { output: Some(_), .. })));
    }

    #[test]
    fn test_cli_delete_requires_property() {
        assert!(Cli::try_parse_from(["myvault", "-f", "v.json", "delete"]).is_err());

        let cli = Cli::try_parse_from(["myvault", "delete", "--property", "*.old", "--force"]).unwrap();
        if let Some(Commands::Delete { property, force }) = cli.command {
            assert_eq!(property, "*.old");
            assert!(force);
        } else {
            panic!("Expected Delete command");
        }
    }

    #[test]
    fn test_cli_create_requires_input() {
        assert!(Cli::try_parse_from(["myvault", "create"]).is_err());
        assert!(Cli::try_parse_from(["myvault", "update"]).is_err());
    }

    #[test]
    fn test_missing_vault_file_is_error() {
        let config = Config {
            password_env: "PATH".to_string(),
            ..Config::default()
        };
        let err = run(Commands::Read { property: None, output: None }, None, &config).unwrap_err();
        assert_eq!(err.to_string(), "Vault file (-f/--file) is required for read command");
    }

    #[test]
    fn test_missing_password_is_error() {
        let config = Config {
            password_env: "MYVAULT_TEST_UNSET_PASSWORD".to_string(),
            ..Config::default()
        };
        let err = run(
            Commands::Delete { property: "*".to_string(), force: true },
            Some(PathBuf::from("/nonexistent/vault.json")),
            &config,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "MYVAULT_TEST_UNSET_PASSWORD environment variable not set");
    }
}
