//! `casetpl`: manage case templates from a terminal.

mod config;
mod terminal;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use casetpl_client::{ClientConfig, TemplateApi};
use casetpl_editor::{CaseTemplateEditor, Collaborators, ImportRequest};
use casetpl_events::EventBus;

use config::CliConfig;
use terminal::{DirectorySaver, TerminalDialogs, TerminalNotifier};

#[derive(Parser)]
#[command(name = "casetpl")]
#[command(about = "List, export, import and delete case templates")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all case templates
    List,

    /// Print one template as JSON
    Show {
        /// Template id
        id: String,
    },

    /// Write a template to `Case-Template__<name>.json`
    Export {
        /// Template id
        id: String,

        /// Output directory (defaults to CASETPL_EXPORT_DIR)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Create a new template from an exported file
    Import {
        /// Path of the JSON file
        file: PathBuf,
    },

    /// Delete a template
    Delete {
        /// Template id
        id: String,

        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let cli_config = CliConfig::from_env()?;

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "casetpl_cli=info,casetpl_editor=info".into());
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    if cli_config.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }

    // --- Configuration ---
    let client_config = ClientConfig::from_env()?;
    tracing::debug!(base_url = %client_config.base_url, "Loaded client configuration");
    let api = Arc::new(TemplateApi::new(&client_config).context("Failed to build HTTP client")?);

    // --- Event bus ---
    let events = Arc::new(EventBus::default());
    let mut rx = events.subscribe();
    let event_log = tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            tracing::info!(
                event_type = event.change.event_type(),
                template_id = %event.template_id,
                template_name = event.template_name.as_deref().unwrap_or(""),
                "Template event"
            );
        }
    });

    let mut dialogs = TerminalDialogs::new(matches!(cli.command, Commands::Delete { yes: true, .. }));
    if let Commands::Import { file } = &cli.command {
        let content = tokio::fs::read_to_string(file)
            .await
            .with_context(|| format!("Failed to read {}", file.display()))?;
        dialogs = dialogs.with_import(ImportRequest {
            file_name: file.file_name().map(|n| n.to_string_lossy().into_owned()),
            content,
        });
    }

    let export_dir = match &cli.command {
        Commands::Export { out: Some(dir), .. } => dir.clone(),
        _ => cli_config.export_dir.clone(),
    };
    let saver = Arc::new(DirectorySaver::new(export_dir));

    let mut editor = CaseTemplateEditor::new(Collaborators {
        store: api.clone(),
        catalog: api.clone(),
        users: api,
        dialogs: Arc::new(dialogs),
        notifier: Arc::new(TerminalNotifier),
        files: saver.clone(),
        events,
    });
    editor.load().await;

    let result = run(&mut editor, cli.command, &saver).await;
    drop(editor);
    // The editor held the last sender; the logger drains and exits.
    let _ = event_log.await;
    result
}

async fn run(
    editor: &mut CaseTemplateEditor,
    command: Commands,
    saver: &DirectorySaver,
) -> anyhow::Result<()> {
    match command {
        Commands::List => {
            for stored in editor.templates() {
                let template = &stored.template;
                println!(
                    "{}\t{}\t{} task(s)",
                    template.id.as_deref().unwrap_or("-"),
                    template.name,
                    template.tasks.len()
                );
            }
        }
        Commands::Show { id } => {
            select(editor, &id).await?;
            let template = editor.working_copy()?;
            println!("{}", serde_json::to_string_pretty(&template)?);
        }
        Commands::Export { id, .. } => {
            select(editor, &id).await?;
            let file = editor.export_template()?;
            println!("{}", saver.path_for(&file).display());
        }
        Commands::Import { .. } => {
            if let Some(id) = editor.import_template().await? {
                println!("{id}");
            }
        }
        Commands::Delete { id, .. } => {
            select(editor, &id).await?;
            if !editor.delete_template().await? {
                eprintln!("Cancelled");
            }
        }
    }
    Ok(())
}

async fn select(editor: &mut CaseTemplateEditor, id: &str) -> anyhow::Result<()> {
    editor.select_template(id).await;
    if editor.template().id.as_deref() != Some(id) {
        bail!("Case template {id} not found");
    }
    Ok(())
}
