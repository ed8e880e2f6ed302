//! Folder-backed remote.
//!
//! Stores the remote state as six JSON documents inside one directory, which
//! is typically a cloud-drive mount shared between devices. "Authenticated"
//! means the folder was connected on this device and still exists.
//!
//! Each document is replaced atomically through a uniquely named temp file.
//! A push writes tombstones and metadata before the entity documents, so an
//! interrupted push never leaves entities newer than the metadata describing
//! them.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Chart, DeletedRecord, MetadataMap, SetList, SyncMetadata};
use crate::sync::{RecordKind, RemoteAdapter, RemoteBundle, StorageInfo};

const CHARTS_FILE: &str = "charts.json";
const SET_LISTS_FILE: &str = "setlists.json";
const CHART_METADATA_FILE: &str = "chart-metadata.json";
const SET_LIST_METADATA_FILE: &str = "setlist-metadata.json";
const DELETED_CHARTS_FILE: &str = "deleted-charts.json";
const DELETED_SET_LISTS_FILE: &str = "deleted-setlists.json";

const DOCUMENTS: [&str; 6] = [
    CHARTS_FILE,
    SET_LISTS_FILE,
    CHART_METADATA_FILE,
    SET_LIST_METADATA_FILE,
    DELETED_CHARTS_FILE,
    DELETED_SET_LISTS_FILE,
];

/// Remote stored as JSON documents in a shared folder
#[derive(Debug)]
pub struct FolderRemote {
    root: PathBuf,
    connected: AtomicBool,
}

impl FolderRemote {
    /// A remote for `root` that still needs [`RemoteAdapter::authenticate`]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            connected: AtomicBool::new(false),
        }
    }

    /// A remote for a folder this device connected to earlier
    pub fn connected(root: impl Into<PathBuf>) -> Self {
        let remote = Self::new(root);
        remote.connected.store(true, Ordering::SeqCst);
        remote
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_authenticated(&self) -> Result<()> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(Error::NotAuthenticated)
        }
    }

    fn document_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    async fn read_document<T>(&self, name: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let path = self.document_path(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => Ok(T::default()),
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(|error| Error::MalformedDocument {
                    document: name.to_string(),
                    reason: error.to_string(),
                })
            }
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(T::default()),
            Err(error) => Err(Error::Network(format!(
                "failed to read {}: {error}",
                path.display()
            ))),
        }
    }

    async fn write_document<T>(&self, name: &str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let path = self.document_path(name);
        // Unique per write: other devices may be pushing into the same folder.
        let temp_path = self.document_path(&format!("{name}.{}.tmp", Uuid::now_v7().simple()));
        let payload = serde_json::to_vec_pretty(value)?;

        let written = match tokio::fs::write(&temp_path, payload).await {
            Ok(()) => tokio::fs::rename(&temp_path, &path).await.map_err(|error| {
                Error::Network(format!("failed to replace {}: {error}", path.display()))
            }),
            Err(error) => Err(Error::Network(format!(
                "failed to write {}: {error}",
                temp_path.display()
            ))),
        };
        if written.is_err() {
            if let Err(error) = tokio::fs::remove_file(&temp_path).await {
                if error.kind() != ErrorKind::NotFound {
                    warn!("Failed to remove {}: {error}", temp_path.display());
                }
            }
        }
        written
    }
}

impl RemoteAdapter for FolderRemote {
    fn is_authenticated(&self) -> bool {
        self.connected.load(Ordering::SeqCst) && self.root.is_dir()
    }

    async fn authenticate(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|error| {
                Error::Network(format!(
                    "failed to open remote folder {}: {error}",
                    self.root.display()
                ))
            })?;
        self.connected.store(true, Ordering::SeqCst);
        info!("Connected remote folder {}", self.root.display());
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        self.connected.store(false, Ordering::SeqCst);
        info!("Disconnected remote folder {}", self.root.display());
        Ok(())
    }

    async fn pull(&self) -> Result<RemoteBundle> {
        self.ensure_authenticated()?;

        let (
            charts,
            set_lists,
            chart_metadata,
            set_list_metadata,
            deleted_charts,
            deleted_set_lists,
        ) = tokio::try_join!(
            self.read_document::<Vec<Chart>>(CHARTS_FILE),
            self.read_document::<Vec<SetList>>(SET_LISTS_FILE),
            self.read_document::<MetadataMap>(CHART_METADATA_FILE),
            self.read_document::<MetadataMap>(SET_LIST_METADATA_FILE),
            self.read_document::<Vec<DeletedRecord>>(DELETED_CHARTS_FILE),
            self.read_document::<Vec<DeletedRecord>>(DELETED_SET_LISTS_FILE),
        )?;

        debug!(
            charts = charts.len(),
            set_lists = set_lists.len(),
            "Pulled remote folder"
        );

        Ok(RemoteBundle {
            charts,
            set_lists,
            chart_metadata,
            set_list_metadata,
            deleted_charts,
            deleted_set_lists,
        })
    }

    async fn push(&self, bundle: &RemoteBundle) -> Result<()> {
        self.ensure_authenticated()?;

        tokio::try_join!(
            self.write_document(DELETED_CHARTS_FILE, &bundle.deleted_charts),
            self.write_document(DELETED_SET_LISTS_FILE, &bundle.deleted_set_lists),
            self.write_document(CHART_METADATA_FILE, &bundle.chart_metadata),
            self.write_document(SET_LIST_METADATA_FILE, &bundle.set_list_metadata),
        )?;
        tokio::try_join!(
            self.write_document(CHARTS_FILE, &bundle.charts),
            self.write_document(SET_LISTS_FILE, &bundle.set_lists),
        )?;

        debug!(
            charts = bundle.charts.len(),
            set_lists = bundle.set_lists.len(),
            "Pushed remote folder"
        );
        Ok(())
    }

    async fn update_metadata(
        &self,
        kind: RecordKind,
        id: &str,
        metadata: SyncMetadata,
    ) -> Result<()> {
        self.ensure_authenticated()?;

        let name = match kind {
            RecordKind::Chart => CHART_METADATA_FILE,
            RecordKind::SetList => SET_LIST_METADATA_FILE,
        };
        let mut map = self.read_document::<MetadataMap>(name).await?;
        map.insert(id.to_string(), metadata);
        self.write_document(name, &map).await
    }

    async fn storage_info(&self) -> Result<StorageInfo> {
        self.ensure_authenticated()?;

        let mut used = 0u64;
        for name in DOCUMENTS {
            match tokio::fs::metadata(self.document_path(name)).await {
                Ok(metadata) => used = used.saturating_add(metadata.len()),
                Err(error) if error.kind() == ErrorKind::NotFound => {}
                Err(error) => {
                    return Err(Error::Network(format!("failed to stat {name}: {error}")));
                }
            }
        }
        Ok(StorageInfo { used, total: None })
    }
}
