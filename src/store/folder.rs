// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Folder-backed store: one `<collection>.json` array per collection under a root directory.
//!
//! Every mutation rewrites the affected collection file atomically (temp file + rename) before
//! the in-memory table is updated, so a failed write leaves both the file and the table as they
//! were.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use super::table::Table;
use super::{Collection, Document, DocumentStore, Filter, StoreError};
use crate::model::DocumentId;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Slower, best-effort durability.
    ///
    /// Attempts to flush written file contents and rename operations to stable storage where
    /// possible. Exact guarantees are platform/filesystem-dependent.
    Durable,
}

#[derive(Debug)]
pub struct FolderStore {
    root: PathBuf,
    durability: WriteDurability,
    tables: RwLock<BTreeMap<Collection, Table>>,
}

impl FolderStore {
    /// Opens (creating if needed) the store rooted at `root` and loads every collection file.
    pub async fn open(
        root: impl Into<PathBuf>,
        durability: WriteDurability,
    ) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|source| StoreError::Io {
                path: root.clone(),
                source,
            })?;

        let mut tables = BTreeMap::new();
        for collection in Collection::ALL {
            let path = collection_path(&root, collection);
            let table = load_table(&path).await?;
            tracing::debug!(
                collection = collection.name(),
                documents = table.documents().len(),
                "loaded collection"
            );
            tables.insert(collection, table);
        }

        Ok(Self {
            root,
            durability,
            tables: RwLock::new(tables),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    /// Applies `mutate` to a copy of the collection, persists the copy, then commits it.
    async fn mutate<R>(
        &self,
        collection: Collection,
        mutate: impl FnOnce(&mut Table) -> R,
        changed: impl Fn(&R) -> bool,
    ) -> Result<R, StoreError> {
        let mut tables = self.tables.write().await;
        let mut table = tables.get(&collection).cloned().unwrap_or_default();
        let result = mutate(&mut table);
        if !changed(&result) {
            return Ok(result);
        }

        let path = collection_path(&self.root, collection);
        let contents = serde_json::to_vec_pretty(table.documents()).map_err(|source| {
            StoreError::Json {
                path: path.clone(),
                source,
            }
        })?;
        write_atomic(&path, &contents, self.durability).await?;

        tables.insert(collection, table);
        Ok(result)
    }
}

#[async_trait]
impl DocumentStore for FolderStore {
    async fn insert(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<DocumentId, StoreError> {
        self.mutate(collection, |table| table.insert(document), |_| true)
            .await
    }

    async fn find_by_id(
        &self,
        collection: Collection,
        id: &DocumentId,
    ) -> Result<Option<Document>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&collection)
            .and_then(|table| table.find_by_id(id))
            .cloned())
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&collection)
            .map(|table| table.find(filter))
            .unwrap_or_default())
    }

    async fn update(
        &self,
        collection: Collection,
        id: &DocumentId,
        changes: Document,
    ) -> Result<bool, StoreError> {
        self.mutate(collection, |table| table.update(id, changes), |found| *found)
            .await
    }

    async fn delete(&self, collection: Collection, id: &DocumentId) -> Result<bool, StoreError> {
        self.mutate(collection, |table| table.delete(id), |found| *found)
            .await
    }

    async fn delete_many(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<usize, StoreError> {
        self.mutate(collection, |table| table.delete_many(filter), |removed| *removed > 0)
            .await
    }
}

fn collection_path(root: &Path, collection: Collection) -> PathBuf {
    root.join(format!("{}.json", collection.name()))
}

async fn load_table(path: &Path) -> Result<Table, StoreError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Table::default()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let documents: Vec<Document> =
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Table::from_documents(documents))
}

async fn write_atomic(
    path: &Path,
    contents: &[u8],
    durability: WriteDurability,
) -> Result<(), StoreError> {
    let Some(parent) = path.parent() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no parent"),
        });
    };

    let Some(file_name) = path.file_name() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no file name"),
        });
    };

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(
        ".lessonmap.tmp.{}.{}",
        file_name.to_string_lossy(),
        nanos
    ));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .await
        .map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;

    let written = async {
        file.write_all(contents).await?;
        file.flush().await?;
        if durability == WriteDurability::Durable {
            file.sync_all().await?;
        }
        Ok::<_, io::Error>(())
    }
    .await;
    drop(file);

    if let Err(source) = written {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(StoreError::Io {
            path: tmp_path,
            source,
        });
    }

    if let Err(source) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            let dir = fs::File::open(parent)
                .await
                .map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            dir.sync_all().await.map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
