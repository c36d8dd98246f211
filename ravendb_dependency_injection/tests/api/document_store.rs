use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use ravendb_dependency_injection::{
    get_document_store, BeforeInitializeHook, ConfigurationError, RavenError,
    ResolvedRavenOptions,
};
use serde_json::json;
use tokio_test::assert_err;

use crate::helpers::{without_topology_updates, TestHost, TEST_CERTIFICATE};

#[tokio::test]
async fn empty_database_name_fails_with_configuration_error() {
    let host = TestHost::new(json!({
        "RavenSettings": { "Urls": ["http://localhost:8080"], "DatabaseName": "" }
    }));
    let provider = host.services().add_document_store().build();

    let error = assert_err!(provider.document_store());

    assert!(matches!(
        error,
        RavenError::Configuration(ConfigurationError::MissingDatabaseName { .. })
    ));
    assert!(error.to_string().contains("DatabaseName"));
}

#[tokio::test]
async fn empty_urls_fail_with_configuration_error() {
    let host = TestHost::new(json!({
        "RavenSettings": { "Urls": [], "DatabaseName": "Orders" }
    }));
    let provider = host.services().add_document_store().build();

    let error = assert_err!(provider.document_store());

    assert!(matches!(
        error,
        RavenError::Configuration(ConfigurationError::MissingUrls { .. })
    ));
}

#[tokio::test]
async fn store_is_built_from_the_settings_section() {
    // Arrange
    let host = TestHost::new(json!({
        "RavenSettings": { "Urls": ["http://localhost:8080"], "DatabaseName": "Orders" }
    }));
    let provider = host
        .services()
        .add_document_store_with(without_topology_updates)
        .build();

    // Act
    let document_store = provider.document_store().unwrap();

    // Assert
    assert_eq!(document_store.urls(), ["http://localhost:8080"]);
    assert_eq!(document_store.database(), Some("Orders"));
    assert!(document_store.certificate().is_none());
    assert!(document_store.conventions().disable_topology_updates());
}

#[tokio::test]
async fn store_carries_the_resolved_certificate() {
    // Arrange
    let host = TestHost::new(json!({
        "RavenSettings": {
            "Urls": ["https://localhost:8080"],
            "DatabaseName": "Orders",
            "CertFilePath": TEST_CERTIFICATE
        }
    }));
    let certificate_path = host.add_certificate(TEST_CERTIFICATE);
    let provider = host
        .services()
        .add_document_store_with(without_topology_updates)
        .build();

    // Act
    let document_store = provider.document_store().unwrap();

    // Assert
    let options = provider.options().unwrap();
    assert_eq!(options.certificate().unwrap().path(), certificate_path);
    assert_eq!(
        document_store.certificate().unwrap().path(),
        certificate_path
    );
}

#[tokio::test]
async fn certificate_requires_https_urls() {
    let host = TestHost::new(json!({
        "RavenSettings": {
            "Urls": ["http://localhost:8080"],
            "DatabaseName": "Orders",
            "CertFilePath": TEST_CERTIFICATE
        }
    }));
    host.add_certificate(TEST_CERTIFICATE);
    let provider = host.services().add_document_store().build();

    let error = assert_err!(provider.document_store());

    assert!(matches!(error, RavenError::DocumentStore(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_resolution_constructs_exactly_one_store() {
    // Arrange
    let host = TestHost::new(json!({
        "RavenSettings": { "Urls": ["http://localhost:8080"], "DatabaseName": "Orders" }
    }));
    let constructed = Arc::new(AtomicUsize::new(0));
    let counter = constructed.clone();
    let provider = host
        .services()
        .add_document_store_with(move |options| {
            let counter = counter.clone();
            options.get_document_store = Some(Arc::new(
                move |options: &ResolvedRavenOptions, before: Option<&BeforeInitializeHook>| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(100));
                    get_document_store(options, before)
                },
            ));
        })
        .build();

    // Act
    let tasks = (0..16)
        .map(|_| {
            let provider = provider.clone();
            tokio::task::spawn_blocking(move || provider.document_store().map(|store| store.id()))
        })
        .collect::<Vec<_>>();
    let mut ids = Vec::with_capacity(tasks.len());
    for task in tasks {
        ids.push(task.await.unwrap().unwrap());
    }

    // Assert
    assert_eq!(constructed.load(Ordering::SeqCst), 1);
    ids.dedup();
    assert_eq!(ids.len(), 1);
}
