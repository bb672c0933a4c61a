//! Non-interactive contact book entry point.
//!
//! # Responsibility
//! - Wire `contactbook_core` to one data directory and run a single command.
//! - Keep output line-oriented so it can be scripted or diffed.
//!
//! # Invariants
//! - The store file exists (header-only when new) before any command runs.
//! - Every failure ends with a non-zero exit code and one `error:` line.
//! - Interactive prompts never appear; merge confirmation is explicit (`--yes`).

use clap::{Parser, Subcommand};
use contactbook_core::{
    core_version, default_log_level, init_logging, Contact, ContactService, CsvContactStore,
    FileErrorLog, LoadStatus, SortKey, StoreConfig, UndoOutcome,
};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "contactbook")]
#[command(about = "Flat-file contact book with undo and daily backups")]
#[command(version)]
struct Cli {
    /// Directory holding the store, snapshot, backups and logs.
    #[arg(long, global = true, env = "CONTACTBOOK_DIR", default_value = ".")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Print all contacts
    List {
        /// Favorites first instead of by name
        #[arg(long)]
        favorites: bool,
    },
    /// Substring match, or /regex/
    Search { query: String },
    /// Create a manual backup
    Backup,
    /// List backup files
    Backups,
    /// Replace the store with a backup
    Restore { backup_name: String },
    /// Revert the last save
    Undo,
    /// Write all contacts as JSON
    ExportJson { path: Option<PathBuf> },
    /// Append contacts from a CSV file
    ImportCsv { path: PathBuf },
    /// Write one contact as a .vcf file
    Vcard { name: String, dir: Option<PathBuf> },
    /// Show near-duplicate pairs
    Dupes {
        /// Merge every proposed pair
        #[arg(long)]
        yes: bool,
    },
    /// Print the core version
    Version,
}

impl Commands {
    /// Stable command name for logs; arguments may carry contact data.
    fn name(&self) -> &'static str {
        match self {
            Self::List { .. } => "list",
            Self::Search { .. } => "search",
            Self::Backup => "backup",
            Self::Backups => "backups",
            Self::Restore { .. } => "restore",
            Self::Undo => "undo",
            Self::ExportJson { .. } => "export-json",
            Self::ImportCsv { .. } => "import-csv",
            Self::Vcard { .. } => "vcard",
            Self::Dupes { .. } => "dupes",
            Self::Version => "version",
        }
    }
}

type CliResult = Result<(), String>;

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult {
    if cli.command == Commands::Version {
        println!("contactbook_core version={}", core_version());
        return Ok(());
    }

    std::fs::create_dir_all(&cli.dir)
        .map_err(|err| format!("cannot create {}: {err}", cli.dir.display()))?;
    let data_dir = std::fs::canonicalize(&cli.dir)
        .map_err(|err| format!("cannot resolve {}: {err}", cli.dir.display()))?;
    // Diagnostics are optional for a one-shot command.
    if let Err(err) = init_logging(default_log_level(), &data_dir.join("logs").to_string_lossy())
    {
        eprintln!("warning: logging disabled: {err}");
    }

    let config = StoreConfig::in_dir(&data_dir);
    let error_log = Arc::new(FileErrorLog::new(&config.error_log_path));
    let service = ContactService::new(CsvContactStore::new(config.clone(), error_log));
    service.store().init().map_err(|err| err.to_string())?;
    info!(
        "event=cli_command module=cli status=start command={}",
        cli.command.name()
    );

    match cli.command {
        Commands::List { favorites } => list(&service, favorites),
        Commands::Search { query } => search(&service, &query),
        Commands::Backup => {
            let path = service.manual_backup().map_err(|err| err.to_string())?;
            println!("created {}", path.display());
            Ok(())
        }
        Commands::Backups => {
            for name in service.list_backups().map_err(|err| err.to_string())? {
                println!("{name}");
            }
            Ok(())
        }
        Commands::Restore { backup_name } => {
            service
                .restore(&backup_name)
                .map_err(|err| err.to_string())?;
            println!("restored {backup_name}");
            Ok(())
        }
        Commands::Undo => match service.undo().map_err(|err| err.to_string())? {
            UndoOutcome::Restored { count } => {
                println!("restored {count} contact(s)");
                Ok(())
            }
            UndoOutcome::NothingToUndo => {
                println!("nothing to undo");
                Ok(())
            }
        },
        Commands::ExportJson { path } => {
            let path = path.unwrap_or_else(|| config.export_json_path.clone());
            let count = service.export_json(&path).map_err(|err| err.to_string())?;
            println!("exported {count} contact(s) to {}", path.display());
            Ok(())
        }
        Commands::ImportCsv { path } => {
            let report = service.import_csv(&path).map_err(|err| err.to_string())?;
            println!(
                "imported {} contact(s); skipped {} blank and {} duplicate row(s)",
                report.imported, report.skipped_blank, report.skipped_duplicate
            );
            Ok(())
        }
        Commands::Vcard { name, dir } => {
            let dir = dir.unwrap_or(data_dir);
            let path = service
                .export_vcard(&name, &dir)
                .map_err(|err| err.to_string())?;
            println!("wrote {}", path.display());
            Ok(())
        }
        Commands::Dupes { yes } => dupes(&service, yes),
        Commands::Version => Ok(()),
    }
}

fn list(service: &ContactService<CsvContactStore>, favorites: bool) -> CliResult {
    let key = if favorites {
        SortKey::Favorite
    } else {
        SortKey::Name
    };
    let report = service.load_report();
    if let LoadStatus::Degraded(reason) = &report.status {
        eprintln!("warning: store could not be read ({reason}); showing no contacts");
    }
    print_contacts(&service.list_sorted(key));
    Ok(())
}

fn search(service: &ContactService<CsvContactStore>, query: &str) -> CliResult {
    let hits = service.search(query).map_err(|err| err.to_string())?;
    if hits.is_empty() {
        println!("no matches");
    }
    print_contacts(&hits);
    Ok(())
}

fn dupes(service: &ContactService<CsvContactStore>, merge: bool) -> CliResult {
    if !merge {
        let candidates = service.merge_candidates();
        if candidates.is_empty() {
            println!("no near-duplicates");
        }
        for (first, second, score) in candidates {
            println!("{} <- {} ({score:.2})", first.name, second.name);
        }
        return Ok(());
    }

    let report = service
        .auto_merge(|_, _| true)
        .map_err(|err| err.to_string())?;
    for (kept, removed) in &report.merged {
        println!("merged {removed} into {kept}");
    }
    println!("removed {} contact(s)", report.removed_count());
    Ok(())
}

fn print_contacts(contacts: &[Contact]) {
    for contact in contacts {
        let star = if contact.favorite { "*" } else { " " };
        println!(
            "{star} {} | {} | {} | {}",
            contact.name,
            contact.phone,
            contact.email,
            contact.tags_joined()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{run, Cli, Commands};
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("contactbook").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn dir_is_accepted_before_or_after_the_subcommand() {
        let before = parse(&["--dir", "/tmp/a", "list", "--favorites"]);
        let after = parse(&["list", "--dir", "/tmp/a", "--favorites"]);

        assert_eq!(before.dir, after.dir);
        assert_eq!(after.command, Commands::List { favorites: true });
    }

    #[test]
    fn dupes_only_merges_with_yes() {
        assert_eq!(parse(&["dupes"]).command, Commands::Dupes { yes: false });
        assert_eq!(parse(&["dupes", "--yes"]).command, Commands::Dupes { yes: true });
    }

    #[test]
    fn missing_required_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["contactbook", "search"]).is_err());
        assert!(Cli::try_parse_from(["contactbook", "restore"]).is_err());
        assert!(Cli::try_parse_from(["contactbook", "frobnicate"]).is_err());
    }

    #[test]
    fn manual_backup_works_in_a_fresh_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("fresh");
        let cli = parse(&["--dir", data_dir.to_str().unwrap(), "backup"]);

        run(cli).unwrap();

        let store = std::fs::read_to_string(data_dir.join("contacts.csv")).unwrap();
        assert_eq!(store, "name,phone,email,tags,favorite\n");
        let backups: Vec<_> = std::fs::read_dir(data_dir.join("backups"))
            .unwrap()
            .flatten()
            .collect();
        assert_eq!(backups.len(), 1);
    }
}
