use std::path::Path;

use ravendb_client::cluster_topology::ClusterTopologyInfo;
use ravendb_dependency_injection::{ContentRoot, JsonConfiguration, RavenServiceCollection};
use tracing::subscriber::set_global_default;
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};
use tracing_tree::HierarchicalLayer;

// Settings can be overridden from the environment, e.g.
// `DEMO_RavenSettings__Urls__0=https://a.free.example.ravendb.cloud`
// `DEMO_RavenSettings__CertFilePath=client.pem`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing();

    let content_root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("examples")
        .join("demo");
    let configuration = JsonConfiguration::from_json_file(content_root.join("appsettings.json"))?
        .add_environment_variables("DEMO_");

    let provider = RavenServiceCollection::new(configuration, ContentRoot::new(&content_root))
        .add_document_store_with(|options| {
            options.after_initialize_store = Some(std::sync::Arc::new(
                |store: &ravendb_client::DocumentStore| {
                    tracing::info!(urls = ?store.urls(), "DocumentStore ready");
                },
            ));
        })
        .add_async_session()
        .build();

    let scope = provider.create_scope();
    let session = scope.async_session()?;
    match session.get_cluster_topology().await {
        Ok(topology_string) => {
            tracing::debug!("{}", &topology_string);
            let topo = serde_json::from_str::<ClusterTopologyInfo>(topology_string.as_str())?;
            println!("{:#?}", topo);
        }
        Err(e) => {
            tracing::error!("Error happened: {}", &e);
            return Err(e.into());
        }
    };

    let documents = session.get_all_documents(Some(10), None).await?;
    println!("{:#}", documents);

    Ok(())
}

fn setup_tracing() {
    // Redirect all `log`'s events to the subscriber
    LogTracer::init().expect("Failed to set logger");
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = Registry::default()
        .with(env_filter)
        .with(HierarchicalLayer::new(2));
    set_global_default(subscriber).expect("Failed to set subscriber");
}
