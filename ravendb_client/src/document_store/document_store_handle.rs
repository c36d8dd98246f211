use std::sync::Arc;

use anyhow::Context;
use reqwest::Url;
use tokio::{
    runtime::Handle,
    sync::{broadcast, mpsc, oneshot},
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    events::SessionEvent, raven_command::RavenCommandVariant, AsyncDocumentSession,
    ClientCertificate, DocumentConventions, DocumentSession, DocumentStoreActor,
    DocumentStoreBuilder, DocumentStoreError, DocumentStoreInitialConfiguration,
    DocumentStoreMessage,
};

/**
This a handle to the actor.

Only one DocumentStoreActor should exist per database cluster when possible to reduce resource
usage. Cloning this handle is very cheap and will not instantiate a new actor in the background.
It is recommended to clone this handle to each component that needs to talk to the DocumentStoreActor.
When the last handle goes out of scope and it dropped, the backing actor will also be dropped.

```rust
# tokio_test::block_on(async {
use ravendb_client::DocumentStore;

let document_store = DocumentStore::builder()
    .set_urls(&["http://localhost:8080"])
    .set_database_name("Orders")
    .initialize()
    .unwrap();
let clone = document_store.clone();
assert_eq!(clone.id(), document_store.id());
# })
```
*/
#[derive(Clone, Debug)]
pub struct DocumentStore {
    sender: mpsc::Sender<DocumentStoreMessage>,
    inner: Arc<DocumentStoreInner>,
}

/// Immutable data shared by every clone of a [`DocumentStore`].
#[derive(Debug)]
struct DocumentStoreInner {
    certificate: Option<ClientCertificate>,
    conventions: DocumentConventions,
    database: Option<String>,
    id: Uuid,
    runtime: Handle,
    session_events: broadcast::Sender<SessionEvent>,
    urls: Vec<String>,
}

impl DocumentStore {
    pub fn builder() -> DocumentStoreBuilder {
        DocumentStoreBuilder::default()
    }

    // This is pub(crate) so only the builder can crank it out
    pub(crate) fn new(
        initial_config: DocumentStoreInitialConfiguration,
        urls: Vec<String>,
        database: Option<String>,
        certificate: Option<ClientCertificate>,
        runtime: Handle,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(8);
        let (session_events, _) = broadcast::channel(100);
        let conventions = initial_config.conventions.clone();
        let actor = DocumentStoreActor::new(receiver, initial_config);
        runtime.spawn(super::run_document_store_actor(actor));

        let inner = DocumentStoreInner {
            certificate,
            conventions,
            database,
            id: Uuid::new_v4(),
            runtime,
            session_events,
            urls,
        };
        tracing::debug!(document_store_id = %inner.id, "DocumentStore initialized");

        Self {
            sender,
            inner: Arc::new(inner),
        }
    }

    /// Uniquely identifies this store. Clones share the id.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// The urls the store was initialized with, without trailing slashes.
    pub fn urls(&self) -> &[String] {
        &self.inner.urls
    }

    /// The default database sessions operate on.
    pub fn database(&self) -> Option<&str> {
        self.inner.database.as_deref()
    }

    pub fn certificate(&self) -> Option<&ClientCertificate> {
        self.inner.certificate.as_ref()
    }

    pub fn conventions(&self) -> &DocumentConventions {
        &self.inner.conventions
    }

    pub(crate) fn runtime(&self) -> &Handle {
        &self.inner.runtime
    }

    #[instrument(
        level = "debug",
        name = "Actor Handle - Execute Raven Command",
        skip(self)
    )]
    pub async fn execute_raven_command(
        &self,
        command: RavenCommandVariant,
    ) -> Result<reqwest::Response, DocumentStoreError> {
        tracing::trace!("Creating oneshot channel");
        let (tx, rx) = oneshot::channel();

        tracing::trace!("Sending message to actor");
        self.sender
            .send(DocumentStoreMessage::ExecuteRavenCommand {
                command,
                respond_to: tx,
            })
            .await
            .map_err(|_| DocumentStoreError::ActorStopped)?;

        tracing::trace!("Waiting for oneshot to return");
        let response = rx
            .await
            .context("DocumentStoreActor task has been killed")??;
        Ok(response)
    }

    #[instrument(
        level = "debug",
        name = "Actor Handle - Get Server Address",
        skip(self)
    )]
    pub async fn get_server_address(&self) -> Result<Url, DocumentStoreError> {
        tracing::debug!("Getting a server address");
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(DocumentStoreMessage::GetServerAddress { respond_to: tx })
            .await
            .map_err(|_| DocumentStoreError::ActorStopped)?;
        let url = rx
            .await
            .context("DocumentStoreActor task has been killed")??;
        Ok(url)
    }

    /// Asks the actor to refresh the cluster topology in the background.
    pub async fn request_topology_update(&self) -> Result<(), DocumentStoreError> {
        self.sender
            .send(DocumentStoreMessage::UpdateTopology)
            .await
            .map_err(|_| DocumentStoreError::ActorStopped)
    }

    /// Opens a blocking unit of work against the default database.
    pub fn open_session(&self) -> Result<DocumentSession, DocumentStoreError> {
        Ok(DocumentSession::new(self.open_async_session()?))
    }

    /// Opens an async unit of work against the default database.
    pub fn open_async_session(&self) -> Result<AsyncDocumentSession, DocumentStoreError> {
        if self.sender.is_closed() {
            return Err(DocumentStoreError::ActorStopped);
        }
        Ok(AsyncDocumentSession::new(self.clone()))
    }

    /// Subscribes to session lifecycle events. Only events published after subscribing are
    /// received.
    pub fn subscribe_session_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.session_events.subscribe()
    }

    pub(crate) fn publish_session_event(&self, event: SessionEvent) {
        // Nobody listening is fine.
        let _ = self.inner.session_events.send(event);
    }
}
