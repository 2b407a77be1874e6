//! Headless maintenance tool for Lurch documents.
//!
//! # Responsibility
//! - Verify `lurch_core` linkage (`ping`).
//! - Inspect and maintain documents through the configured backends.

use clap::{Parser, Subcommand};
use log::error;
use lurch_core::fs::capability::{parse_file_operation, supported_file_operation_strings};
use lurch_core::{
    configured_registry, init_logging, BrowserFileSystem, CoreConfig, FileObject, FileSystem,
    FileSystemContext, HeadlessEditor, KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(version, about = "Inspect and maintain Lurch documents", long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend the file commands run against
    #[arg(long, default_value = BrowserFileSystem::NAME)]
    backend: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the core health check and version
    Ping,
    /// Registered backends and the operations each implements
    Backends,
    /// Whether the backend implements an operation (`read`, `write`, ...)
    Supports { operation: String },
    /// Entries of the backend root, or of a folder path
    List { folder: Option<String> },
    Has { filename: String },
    Read { filename: String },
    Write { filename: String, contents: String },
    Delete { filename: String },
}

impl Command {
    /// Contract operation the command needs, if any.
    fn operation(&self) -> Option<&'static str> {
        match self {
            Self::Ping | Self::Backends | Self::Supports { .. } => None,
            Self::List { .. } => Some("list"),
            Self::Has { .. } => Some("has"),
            Self::Read { .. } => Some("read"),
            Self::Write { .. } => Some("write"),
            Self::Delete { .. } => Some("delete"),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            ExitCode::SUCCESS
        }
        Err(message) => {
            error!("event=cli_command module=cli status=error");
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<String, String> {
    if let Command::Ping = cli.command {
        return Ok(format!(
            "lurch_core ping={} version={}",
            lurch_core::ping(),
            lurch_core::core_version()
        ));
    }

    let config = match cli.config.as_deref() {
        Some(path) => CoreConfig::load(path).map_err(|err| err.to_string())?,
        None => CoreConfig::default(),
    };
    if let Some(log_dir) = config.log_dir.as_deref().and_then(|dir| dir.to_str()) {
        init_logging(&config.log_level, log_dir).map_err(|err| err.to_string())?;
    }

    let storage: Arc<dyn KeyValueStore> = match config.storage_path.as_deref() {
        Some(path) => Arc::new(SqliteKeyValueStore::open(path).map_err(|err| err.to_string())?),
        None => Arc::new(MemoryKeyValueStore::new()),
    };
    let context = FileSystemContext::new(Arc::new(HeadlessEditor::new()), storage);
    let registry = configured_registry(&config).map_err(|err| err.to_string())?;

    if let Command::Backends = cli.command {
        let lines: Vec<String> = registry
            .names()
            .iter()
            .filter_map(|name| registry.instantiate(name, &context))
            .map(|backend| {
                let operations: Vec<&str> = backend
                    .capabilities()
                    .operations()
                    .into_iter()
                    .map(|operation| operation.as_str())
                    .collect();
                format!("{}: {}", backend.name(), operations.join(", "))
            })
            .collect();
        return Ok(lines.join("\n"));
    }

    let backend = registry
        .instantiate(&cli.backend, &context)
        .ok_or_else(|| {
            format!(
                "unknown backend `{}`; registered: {}",
                cli.backend,
                registry.names().join(", ")
            )
        })?;
    if let Some(operation) = cli.command.operation() {
        if !backend.implements_named(operation) {
            return Err(format!("{} does not implement `{operation}`", backend.name()));
        }
    }

    let result = match cli.command {
        Command::Ping | Command::Backends => Ok(String::new()),
        Command::Supports { operation } => {
            parse_file_operation(&operation).map_err(|err| {
                format!(
                    "{err}; expected one of: {}",
                    supported_file_operation_strings().join(", ")
                )
            })?;
            Ok(backend.implements_named(&operation).to_string())
        }
        Command::List { folder } => {
            let folder = folder.map(|path| FileObject::folder(Some(backend.name().to_string()), path));
            backend.list(folder.as_ref()).await.map(|entries| {
                entries
                    .iter()
                    .map(FileObject::display_name)
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        Command::Has { filename } => backend
            .has(&FileObject::named(filename))
            .await
            .map(|found| found.to_string()),
        Command::Read { filename } => backend
            .read(&FileObject::named(filename))
            .await
            .map(|read| read.contents().unwrap_or_default().to_string()),
        Command::Write { filename, contents } => backend
            .write(&FileObject::named(filename).with_contents(contents))
            .await
            .map(|saved| format!("saved {}", saved.display_name())),
        Command::Delete { filename } => backend
            .delete(&FileObject::named(filename))
            .await
            .map(|()| String::new()),
    };
    result.map_err(|err| err.to_string())
}
