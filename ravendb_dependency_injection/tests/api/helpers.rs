use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use ravendb_dependency_injection::{
    ContentRoot, JsonConfiguration, RavenOptions, RavenServiceCollection,
};
use tempfile::TempDir;
use tracing::{subscriber::set_global_default, Subscriber};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{fmt::MakeWriter, layer::SubscriberExt, EnvFilter, Registry};

pub const TEST_CERTIFICATE: &str = "ravendb-client_test_cert.pem";

// Set `TEST_LOG` to see the logs of a test run.
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "debug".to_string();
    let subscriber_name = "ravendb_dependency_injection_test".to_string();
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

fn get_subscriber<Sink>(
    name: String,
    env_filter: String,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));
    let formatting_layer = BunyanFormattingLayer::new(name, sink);
    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
}

fn init_subscriber(subscriber: impl Subscriber + Send + Sync) {
    LogTracer::init().expect("Failed to set logger");
    set_global_default(subscriber).expect("Failed to set subscriber");
}

/// A content root in a temporary directory with an `appsettings.json` in it.
pub struct TestHost {
    pub content_root: TempDir,
    pub configuration: JsonConfiguration,
}

impl TestHost {
    pub fn new(appsettings: serde_json::Value) -> Self {
        Lazy::force(&TRACING);

        let content_root = tempfile::tempdir().expect("Failed to create content root");
        let path = content_root.path().join("appsettings.json");
        std::fs::write(&path, appsettings.to_string()).expect("Failed to write appsettings.json");
        let configuration =
            JsonConfiguration::from_json_file(&path).expect("Failed to load appsettings.json");

        Self {
            content_root,
            configuration,
        }
    }

    pub fn path(&self) -> &Path {
        self.content_root.path()
    }

    pub fn services(&self) -> RavenServiceCollection {
        RavenServiceCollection::new(self.configuration.clone(), ContentRoot::new(self.path()))
    }

    /// Copies the test certificate to `relative_path` under the content root.
    pub fn add_certificate(&self, relative_path: &str) -> PathBuf {
        let destination = self.path().join(relative_path);
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create certificate directory");
        }
        std::fs::copy(fixture(TEST_CERTIFICATE), &destination)
            .expect("Failed to copy test certificate");
        destination
    }
}

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Keeps the store actor off the network.
pub fn without_topology_updates(options: &mut RavenOptions) {
    options.before_initialize_store = Some(std::sync::Arc::new(
        |builder: &mut ravendb_client::DocumentStoreBuilder| {
            builder.conventions_mut().set_disable_topology_updates(true);
        },
    ));
}
