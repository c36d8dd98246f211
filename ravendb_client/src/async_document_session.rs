use reqwest::StatusCode;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    events::SessionEvent, raven_command::RavenCommandVariant, ravendb_error::RavenDbError,
    DocumentStore, DocumentStoreError,
};

/// Implements Unit of Work for accessing the RavenDB server.
///
/// A session borrows the [`DocumentStore`] it was opened from and owns nothing else. Dropping
/// the session releases it.
#[derive(Debug)]
pub struct AsyncDocumentSession {
    id: Uuid,
    document_store: DocumentStore,
}

impl AsyncDocumentSession {
    pub(crate) fn new(document_store: DocumentStore) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(session_id = %id, "Session opened");
        document_store.publish_session_event(SessionEvent::SessionCreated { session_id: id });
        Self { id, document_store }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn database(&self) -> Option<&str> {
        self.document_store.database()
    }

    pub fn document_store(&self) -> &DocumentStore {
        &self.document_store
    }

    #[instrument(level = "info", name = "Get Cluster Topology", skip(self), fields(session_id = %self.id))]
    pub async fn get_cluster_topology(&self) -> Result<String, RavenDbError> {
        let response = self
            .execute(RavenCommandVariant::GetClusterTopology)
            .await?;

        let body = response.text().await.map_err(anyhow::Error::from)?;
        tracing::info!("Cluster topology downloaded");
        Ok(body)
    }

    /// Lists the documents of the session's database, optionally paged.
    #[instrument(level = "info", name = "Get All Documents", skip(self), fields(session_id = %self.id))]
    pub async fn get_all_documents(
        &self,
        page_size: Option<i64>,
        start: Option<i64>,
    ) -> Result<serde_json::Value, RavenDbError> {
        let database = self
            .database()
            .ok_or(RavenDbError::DatabaseNotSet)?
            .to_string();

        let response = self
            .execute(RavenCommandVariant::GetAllDocumentsFromDatabase {
                database,
                page_size,
                start,
            })
            .await?;

        let documents = response
            .json::<serde_json::Value>()
            .await
            .map_err(anyhow::Error::from)?;
        Ok(documents)
    }

    async fn execute(&self, command: RavenCommandVariant) -> Result<reqwest::Response, RavenDbError> {
        let database = command.database().map(str::to_string);
        let response = self
            .document_store
            .execute_raven_command(command)
            .await
            .map_err(|e: DocumentStoreError| anyhow::Error::from(e))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                tracing::error!("Server rejected the client credentials");
                Err(RavenDbError::BadAuthorization)
            }
            StatusCode::NOT_FOUND if database.is_some() => Err(RavenDbError::DatabaseDoesNotExist(
                database.unwrap_or_default(),
            )),
            status if !status.is_success() => Err(RavenDbError::UnexpectedError(anyhow::anyhow!(
                "Server responded with status {}",
                status
            ))),
            _ => Ok(response),
        }
    }
}

impl Drop for AsyncDocumentSession {
    fn drop(&mut self) {
        tracing::debug!(session_id = %self.id, "Session disposed");
        self.document_store
            .publish_session_event(SessionEvent::SessionClosing { session_id: self.id });
    }
}
