use std::time::Duration;

use anyhow::Context;
use rand::seq::IteratorRandom;
use reqwest::{header::HeaderValue, Url};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{instrument, Span};
use uuid::Uuid;

use crate::{
    cluster_topology::ClusterTopologyInfo,
    document_conventions::DocumentConventions,
    raven_command::{RavenCommand, RavenCommandVariant},
    DocumentStoreError, DocumentStoreInitialConfiguration, DocumentStoreMessage,
};

pub(crate) struct DocumentStoreActor {
    conventions: DocumentConventions,
    http_client: reqwest::Client,
    receiver: mpsc::Receiver<DocumentStoreMessage>,
    /// Allows the actor to receive messages from itself.
    receiver_internal: mpsc::Receiver<DocumentStoreMessage>,
    /// Allows the actor to send messages to itself.
    sender_internal: mpsc::Sender<DocumentStoreMessage>,
    topology_info: ClusterTopologyInfo,
    topology_updater: Option<JoinHandle<Result<ClusterTopologyInfo, DocumentStoreError>>>,
}
impl DocumentStoreActor {
    pub(crate) fn new(
        receiver: mpsc::Receiver<DocumentStoreMessage>,
        initial_config: DocumentStoreInitialConfiguration,
    ) -> Self {
        let (tx, rx) = mpsc::channel(10);
        Self {
            conventions: initial_config.conventions,
            http_client: initial_config.http_client,
            receiver,
            receiver_internal: rx,
            sender_internal: tx,
            topology_info: ClusterTopologyInfo::from_initial_urls(&initial_config.initial_urls),
            topology_updater: None,
        }
    }

    /// Message handler for the DocumentStoreActor
    #[instrument(
        level = "debug",
        name = "DocumentStore Actor - Handle Message",
        skip(self),
        fields(correlation_id)
    )]
    async fn handle_message(&mut self, msg: DocumentStoreMessage) {
        // Apply a correlation id to all child spans of this message handler
        Span::current().record("correlation_id", Uuid::new_v4().to_string());
        match msg {
            DocumentStoreMessage::ExecuteRavenCommand {
                command,
                respond_to,
            } => {
                let base_server_url = match self.get_server_address().await {
                    Ok(url) => url,
                    Err(e) => {
                        let _ = respond_to.send(Err(e));
                        return;
                    }
                };
                let raven_command = RavenCommand {
                    base_server_url,
                    command,
                };
                let client = self.http_client.clone();
                let topology_etag = self.topology_info.etag;
                let sender_internal = self.sender_internal.clone();
                let topology_updates_enabled = !self.conventions.disable_topology_updates();

                // Spawn a task to do the request
                tokio::spawn(async move {
                    let result = DocumentStoreActor::send_raven_command_request_to_server(
                        &client,
                        raven_command,
                        topology_etag,
                    )
                    .await;

                    if let Ok(response) = &result {
                        let refresh_requested = response
                            .headers()
                            .get("Refresh-Topology")
                            .and_then(|value| value.to_str().ok())
                            .map(|value| value.eq_ignore_ascii_case("true"))
                            .unwrap_or(false);
                        if refresh_requested && topology_updates_enabled {
                            // A full queue already holds an update request.
                            if let Err(mpsc::error::TrySendError::Closed(_)) =
                                sender_internal.try_send(DocumentStoreMessage::UpdateTopology)
                            {
                                tracing::error!(
                                    "Could not send internal message to request topology update. Actor is gone."
                                );
                            }
                        }
                    }

                    // Send the result back to the caller
                    let _ = respond_to.send(result);
                });
            }
            DocumentStoreMessage::GetServerAddress { respond_to } => {
                let result = self.get_server_address().await;
                let _ = respond_to.send(result);
            }
            DocumentStoreMessage::UpdateTopology => {
                tracing::debug!("Updating topology.");
                match self.refresh_topology().await {
                    Ok(_) => tracing::debug!("Topology update downloading, awaiting store."),
                    Err(e) => {
                        tracing::error!(
                            "There was an error updating the topology. Caused by: {}",
                            e
                        );
                    }
                }
            }
        }
    }

    /// Kicks off a cluster topology download. The result is collected the next time a server
    /// address is requested.
    #[instrument(level = "debug", skip(self))]
    async fn refresh_topology(&mut self) -> Result<(), DocumentStoreError> {
        // Determine if a topology update is already running and skip if it is.
        if self
            .topology_updater
            .as_ref()
            .map(|x| !x.is_finished())
            .unwrap_or(false)
        {
            tracing::debug!(
                "Topology update already running. Skipping to avoid duplication of effort."
            );
            return Ok(());
        }

        tracing::trace!("Attempting topology update");
        let get_topology = RavenCommand {
            base_server_url: self.get_server_address().await?,
            command: RavenCommandVariant::GetClusterTopology,
        };

        let client = self.http_client.clone();
        let etag = self.topology_info.etag;

        // Kick off an async task to actually do the update. Store the joinhandle for later use.
        self.topology_updater = Some(tokio::spawn(async move {
            let response = DocumentStoreActor::send_raven_command_request_to_server(
                &client,
                get_topology,
                etag,
            )
            .await
            .context("Unable to send command to server")?;

            let topology = response
                .error_for_status()
                .context("Server refused to return the cluster topology")?
                .json::<ClusterTopologyInfo>()
                .await
                .context("Unable to deserialize cluster topology information")?;
            Ok::<_, DocumentStoreError>(topology)
        }));

        Ok(())
    }

    #[instrument(level = "debug", skip(client))]
    async fn send_raven_command_request_to_server(
        client: &reqwest::Client,
        raven_command: RavenCommand,
        topology_etag: i64,
    ) -> anyhow::Result<reqwest::Response> {
        let mut request = raven_command.get_http_request(client)?;
        let headerval = HeaderValue::from_str(topology_etag.to_string().as_str())?;
        request.headers_mut().append("Topology-Etag", headerval);
        tracing::trace!("Request Headers: {:#?}", &request.headers());
        let response = client.execute(request).await?;

        Ok(response)
    }

    /// Moves a finished topology download into the actor's state.
    ///
    /// A failed or empty download leaves the current topology in place.
    async fn collect_topology_update(&mut self) {
        let finished = self
            .topology_updater
            .as_ref()
            .map(|updater| updater.is_finished())
            .unwrap_or(false);
        if !finished {
            return;
        }
        let Some(handle) = self.topology_updater.take() else {
            return;
        };

        match handle.await {
            Ok(Ok(topology)) if !topology.topology.all_nodes.is_empty() => {
                self.topology_info = topology;
                tracing::info!("Topology updated and stored.");
            }
            Ok(Ok(_)) => {
                tracing::warn!("Server returned an empty topology. Keeping the previous one.")
            }
            Ok(Err(e)) => tracing::error!("Topology update failed. Caused by: {}", e),
            Err(e) => tracing::error!("Topology update task failed. Caused by: {}", e),
        }
    }

    #[instrument(
        level = "debug",
        name = "DocumentStore Actor - Get Server Address",
        skip(self)
    )]
    async fn get_server_address(&mut self) -> anyhow::Result<Url> {
        self.collect_topology_update().await;

        let url = self
            .topology_info
            .topology
            .all_nodes
            .values()
            .choose(&mut rand::thread_rng())
            .context("Urls list is empty")
            .cloned();
        if let Ok(u) = &url {
            tracing::debug!("Selected Url: {}", u);
        }
        url
    }
}

#[instrument(level = "debug", name = "Running Document Store Actor", skip(actor))]
pub(crate) async fn run_document_store_actor(mut actor: DocumentStoreActor) {
    let topology_updates_enabled = !actor.conventions.disable_topology_updates();
    // The first tick completes immediately, which performs the initial topology discovery.
    let mut topology_update_timer = tokio::time::interval(
        actor
            .conventions
            .topology_update_interval()
            .max(Duration::from_secs(1)),
    );
    loop {
        tokio::select! {
            _ = topology_update_timer.tick(), if topology_updates_enabled => {
                tracing::debug!("Updating topology via timer.");
                if let Err(e) = actor.refresh_topology().await {
                    tracing::error!("There was an error updating the topology. Caused by: {}", e);
                }
            },
            opt_msg = actor.receiver.recv() => {
                let msg = match opt_msg {
                    Some(msg) => msg,
                    None => break,
                };
                actor.handle_message(msg).await;
            },
            Some(msg) = actor.receiver_internal.recv() => {
                actor.handle_message(msg).await;
            }
        }
    }
    tracing::debug!("All DocumentStore handles dropped, actor stopping.");
}
