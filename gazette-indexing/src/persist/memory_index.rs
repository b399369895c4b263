use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use anyhow::Result;
use async_trait::async_trait;
use derive_builder::Builder;
use tokio::sync::RwLock;

use gazette_core::{CommitError, IndexWriter, SubmitError, indexing::Document};

#[derive(Debug, Default, Builder, Clone)]
#[builder(pattern = "owned")]
/// A simple in-memory index.
///
/// Great for experimentation and testing. It behaves like a search index with explicit commits:
/// submitted documents are staged and only become visible through [`MemoryIndex::get`] once
/// `commit` is called. A document with an id that is already present replaces the previous one.
///
/// Documents without a numeric id are rejected.
pub struct MemoryIndex {
    #[builder(default)]
    staged: Arc<RwLock<BTreeMap<u64, Document>>>,
    #[builder(default)]
    committed: Arc<RwLock<BTreeMap<u64, Document>>>,
    #[builder(default)]
    batch_size: Option<usize>,
    #[builder(default)]
    commit_count: Arc<AtomicUsize>,
}

impl MemoryIndex {
    pub fn builder() -> MemoryIndexBuilder {
        MemoryIndexBuilder::default()
    }

    /// Retrieve a committed document by its id
    pub async fn get(&self, id: u64) -> Option<Document> {
        self.committed.read().await.get(&id).cloned()
    }

    /// Retrieve all committed documents, ordered by id
    pub async fn get_all(&self) -> Vec<Document> {
        self.committed.read().await.values().cloned().collect()
    }

    /// Number of documents submitted but not yet committed
    pub async fn staged_len(&self) -> usize {
        self.staged.read().await.len()
    }

    /// How many times `commit` was called
    pub fn commit_count(&self) -> usize {
        self.commit_count.load(Ordering::Relaxed)
    }

    async fn stage(&self, documents: &[Document]) -> Result<(), SubmitError> {
        let ids = documents
            .iter()
            .map(|document| {
                document.id().ok_or_else(|| SubmitError::Status {
                    status: 400,
                    body: "document is missing a numeric `id`".to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut lock = self.staged.write().await;
        for (id, document) in ids.into_iter().zip(documents) {
            lock.insert(id, document.clone());
        }

        Ok(())
    }
}

#[async_trait]
impl IndexWriter for MemoryIndex {
    async fn setup(&self) -> Result<()> {
        Ok(())
    }

    async fn submit(&self, document: &Document) -> Result<String, SubmitError> {
        self.stage(std::slice::from_ref(document)).await?;

        Ok(r#"{"responseHeader":{"status":0}}"#.to_string())
    }

    /// Stages all documents, or none if any of them lacks an id
    async fn submit_batch(&self, documents: &[Document]) -> Result<String, SubmitError> {
        self.stage(documents).await?;

        Ok(r#"{"responseHeader":{"status":0}}"#.to_string())
    }

    async fn commit(&self) -> Result<String, CommitError> {
        let staged = std::mem::take(&mut *self.staged.write().await);
        let num_staged = staged.len();
        self.committed.write().await.extend(staged);
        self.commit_count.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(num_staged, "Committed memory index");

        Ok(r#"{"responseHeader":{"status":0}}"#.to_string())
    }

    fn batch_size(&self) -> Option<usize> {
        self.batch_size
    }
}
