// ============================
// crates/backend-lib/src/storage.rs
// ============================
//! Storage abstraction with flat-file implementation.
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use notes_common::Note;
use serde::{Deserialize, Serialize};
use tokio::{fs as tokio_fs, io::AsyncWriteExt};
use uuid::Uuid;

use crate::auth::identity::{Identity, Username};
use crate::error::AppError;

/// What the credential store keeps per user
#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub id: Uuid,
    pub username: Username,
    pub password_hash: String,
}

impl CredentialRecord {
    pub fn identity(&self) -> Identity {
        Identity::new(self.id, self.username.clone())
    }
}

/// Lookup and creation of user credentials
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Stored credential for `username`, if any
    async fn get_credential(
        &self,
        username: &Username,
    ) -> Result<Option<CredentialRecord>, AppError>;

    /// Persist a new credential and hand back the generated identity.
    /// Fails with [`AppError::DuplicateUsername`] if the name is taken.
    async fn put_credential(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<Identity, AppError>;
}

/// Per-user note storage
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn add_note(&self, note: &Note) -> Result<(), AppError>;

    /// Notes owned by `user_id`, newest first
    async fn list_notes(
        &self,
        user_id: Uuid,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Note>, AppError>;
}

/// Everything the service needs from a storage backend
pub trait Storage: CredentialStore + NoteStore {}

impl<T: CredentialStore + NoteStore> Storage for T {}

/// Flat-file implementation of the storage traits.
///
/// Layout under `root`:
/// - `users/<username>.json`: one credential record per user
/// - `notes/<user_id>.log`: JSON lines, appended in creation order
#[derive(Clone)]
pub struct FlatFileStorage {
    root: PathBuf,
}

impl FlatFileStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("users"))?;
        fs::create_dir_all(root.join("notes"))?;
        Ok(Self { root })
    }

    fn user_path(&self, username: &Username) -> PathBuf {
        self.root
            .join("users")
            .join(format!("{}.json", username.as_str()))
    }

    fn notes_path(&self, user_id: Uuid) -> PathBuf {
        self.root.join("notes").join(format!("{user_id}.log"))
    }
}

#[async_trait]
impl CredentialStore for FlatFileStorage {
    async fn get_credential(
        &self,
        username: &Username,
    ) -> Result<Option<CredentialRecord>, AppError> {
        let content = match tokio_fs::read_to_string(self.user_path(username)).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<CredentialRecord>(&content) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::error!(
                    username = %username.as_str(),
                    error = %e,
                    "unreadable credential record"
                );
                Ok(None)
            },
        }
    }

    async fn put_credential(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<Identity, AppError> {
        let record = CredentialRecord {
            id: Uuid::new_v4(),
            username: username.clone(),
            password_hash: password_hash.to_string(),
        };
        let json = serde_json::to_vec_pretty(&record)?;

        // Written in full under a name no username can take, then linked into
        // place. `hard_link` fails if the target exists, so readers only ever
        // see complete records.
        let tmp = self.root.join("users").join(format!(".tmp-{}", Uuid::new_v4()));
        let published = write_and_link(&tmp, &self.user_path(username), &json).await;
        if let Err(e) = tokio_fs::remove_file(&tmp).await {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!(path = %tmp.display(), error = %e, "failed to remove temp file");
            }
        }

        match published {
            Ok(()) => {},
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(AppError::DuplicateUsername)
            },
            Err(e) => return Err(e.into()),
        }

        Ok(record.identity())
    }
}

async fn write_and_link(tmp: &Path, target: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = tokio_fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(tmp)
        .await?;
    file.write_all(contents).await?;
    file.sync_all().await?;
    drop(file);

    tokio_fs::hard_link(tmp, target).await
}

#[async_trait]
impl NoteStore for FlatFileStorage {
    async fn add_note(&self, note: &Note) -> Result<(), AppError> {
        let mut line = serde_json::to_vec(note)?;
        line.push(b'\n');

        let mut file = tokio_fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.notes_path(note.user_id))
            .await?;

        // One write per line so concurrent appends never interleave
        file.write_all(&line).await?;
        Ok(())
    }

    async fn list_notes(
        &self,
        user_id: Uuid,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Note>, AppError> {
        let content = match tokio_fs::read_to_string(self.notes_path(user_id)).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut notes = Vec::new();
        for line in content.lines().filter(|line| !line.trim().is_empty()) {
            match serde_json::from_str::<Note>(line) {
                Ok(note) if note.user_id == user_id => notes.push(note),
                Ok(_) => {},
                Err(e) => tracing::warn!(%user_id, error = %e, "skipping corrupt note line"),
            }
        }

        Ok(notes.into_iter().rev().skip(offset).take(limit).collect())
    }
}
