use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::config_directory;
use crate::domain::ticket::TicketDraft;
use crate::error::{AppError, AppResult};

const STASH_FILE_NAME: &str = "draft_stash.json";

#[derive(Default, Serialize, Deserialize)]
struct StashFile {
    draft: Option<TicketDraft>,
    #[serde(default)]
    last_error: Option<String>,
}

/// Keeps the draft of a failed create so it can be resubmitted as-is.
pub struct DraftStash {
    file_path: PathBuf,
    file: StashFile,
}

impl DraftStash {
    pub fn default_path() -> AppResult<PathBuf> {
        Ok(config_directory()?.join(STASH_FILE_NAME))
    }

    /// Reads the stash, or starts an empty one when the file cannot be read.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load_from(path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "ignoring unreadable draft stash");
            Self {
                file_path: path.to_path_buf(),
                file: StashFile::default(),
            }
        })
    }

    pub fn load_from(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str::<StashFile>(&contents)
                .map_err(|err| AppError::Configuration(format!("invalid draft stash: {err}")))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => StashFile::default(),
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            file_path: path,
            file,
        })
    }

    pub fn draft(&self) -> Option<&TicketDraft> {
        self.file.draft.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.file.last_error.as_deref()
    }

    pub fn keep(&mut self, draft: &TicketDraft, error: &AppError) {
        self.file.draft = Some(draft.clone());
        self.file.last_error = Some(error.to_string());
    }

    pub fn clear(&mut self) {
        self.file = StashFile::default();
    }

    pub fn save(&self) -> AppResult<()> {
        if self.file.draft.is_none() {
            return match fs::remove_file(&self.file_path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(err.into()),
            };
        }

        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&self.file)
            .map_err(|err| AppError::Configuration(format!("failed to write draft stash: {err}")))?;
        fs::write(&self.file_path, data)?;
        debug!(path = %self.file_path.display(), "stashed draft");
        Ok(())
    }
}
