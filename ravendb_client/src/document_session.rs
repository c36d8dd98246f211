use std::future::Future;

use uuid::Uuid;

use crate::{ravendb_error::RavenDbError, AsyncDocumentSession, DocumentStore};

/// Blocking flavour of [`AsyncDocumentSession`].
///
/// Every operation runs on the runtime the [`DocumentStore`] was initialized on and blocks the
/// calling thread until it completes. It can be used from plain threads, from
/// `spawn_blocking`, or from a multi-threaded runtime worker. Calling it from a
/// current-thread runtime worker panics.
#[derive(Debug)]
pub struct DocumentSession {
    inner: AsyncDocumentSession,
}

impl DocumentSession {
    pub(crate) fn new(inner: AsyncDocumentSession) -> Self {
        Self { inner }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id()
    }

    pub fn database(&self) -> Option<&str> {
        self.inner.database()
    }

    pub fn document_store(&self) -> &DocumentStore {
        self.inner.document_store()
    }

    pub fn get_cluster_topology(&self) -> Result<String, RavenDbError> {
        self.block_on(self.inner.get_cluster_topology())
    }

    pub fn get_all_documents(
        &self,
        page_size: Option<i64>,
        start: Option<i64>,
    ) -> Result<serde_json::Value, RavenDbError> {
        self.block_on(self.inner.get_all_documents(page_size, start))
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        let runtime = self.inner.document_store().runtime();
        tokio::task::block_in_place(|| runtime.block_on(future))
    }
}
