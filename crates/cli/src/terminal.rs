//! Terminal implementations of the editor's interactive ports.

use std::path::PathBuf;

use async_trait::async_trait;
use casetpl_core::ExportedFile;
use casetpl_editor::{
    Confirmation, DialogHost, FileSaver, ImportRequest, Notifier, NotifyLevel, StoreError,
    TaskEditRequest, TaskEditResult,
};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Answers dialogs from command-line arguments, prompting on stdin for
/// confirmations unless `assume_yes` is set.
pub struct TerminalDialogs {
    assume_yes: bool,
    import: Option<ImportRequest>,
}

impl TerminalDialogs {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            import: None,
        }
    }

    /// Pre-load the file the import dialog will return.
    pub fn with_import(mut self, request: ImportRequest) -> Self {
        self.import = Some(request);
        self
    }
}

#[async_trait]
impl DialogHost for TerminalDialogs {
    async fn edit_task(&self, request: TaskEditRequest) -> Option<TaskEditResult> {
        tracing::debug!(mode = ?request.mode, "Task editing is not available from the terminal");
        None
    }

    async fn import_template(&self) -> Option<ImportRequest> {
        self.import.clone()
    }

    async fn confirm(&self, confirmation: Confirmation) -> bool {
        if self.assume_yes {
            return true;
        }

        eprintln!("{}", confirmation.title);
        eprint!("{} [{}/N] ", confirmation.message, confirmation.ok_text);

        let mut line = String::new();
        let mut stdin = BufReader::new(tokio::io::stdin());
        match stdin.read_line(&mut line).await {
            Ok(_) => is_yes(&line),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read confirmation answer");
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes" | "yes, remove it"
    )
}

/// Prints user-facing messages to stderr and mirrors them into the log.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn log(&self, message: &str, level: NotifyLevel) {
        match level {
            NotifyLevel::Info | NotifyLevel::Success => tracing::info!(?level, "{message}"),
            NotifyLevel::Warning => tracing::warn!("{message}"),
            NotifyLevel::Error => tracing::error!("{message}"),
        }
        eprintln!("{}: {message}", label(level));
    }

    fn error(&self, context: &str, error: &StoreError) {
        tracing::error!(context, status = ?error.status(), error = %error, "Store call failed");
        eprintln!("error: [{context}] {error}");
    }
}

fn label(level: NotifyLevel) -> &'static str {
    match level {
        NotifyLevel::Info => "info",
        NotifyLevel::Success => "ok",
        NotifyLevel::Warning => "warning",
        NotifyLevel::Error => "error",
    }
}

/// Writes export files into a directory.
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, file: &ExportedFile) -> PathBuf {
        self.dir.join(&file.file_name)
    }
}

impl FileSaver for DirectorySaver {
    fn save(&self, file: &ExportedFile) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(file);
        std::fs::write(&path, &file.contents)?;
        tracing::debug!(path = %path.display(), "Export file written");
        Ok(())
    }
}
