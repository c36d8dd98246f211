use reqwest::Url;
use tokio::sync::oneshot;

use crate::{raven_command::RavenCommandVariant, DocumentConventions};

#[derive(Debug)]
pub(crate) enum DocumentStoreMessage {
    /// Executes the provided [`RavenCommandVariant`] against one of the cluster nodes.
    ExecuteRavenCommand {
        command: RavenCommandVariant,
        respond_to: oneshot::Sender<Result<reqwest::Response, anyhow::Error>>,
    },
    GetServerAddress {
        respond_to: oneshot::Sender<Result<Url, anyhow::Error>>,
    },
    UpdateTopology,
}

/// Everything the actor needs to start serving requests.
#[derive(Debug)]
pub(crate) struct DocumentStoreInitialConfiguration {
    pub(crate) conventions: DocumentConventions,
    pub(crate) http_client: reqwest::Client,
    pub(crate) initial_urls: Vec<Url>,
}
