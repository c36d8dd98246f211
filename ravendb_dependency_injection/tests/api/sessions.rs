use ravendb_client::events::SessionEvent;
use ravendb_dependency_injection::RavenError;
use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use crate::helpers::{without_topology_updates, TestHost};

fn host_for(server: &MockServer) -> TestHost {
    TestHost::new(json!({
        "RavenSettings": { "Urls": [server.uri()], "DatabaseName": "Orders" }
    }))
}

#[tokio::test]
async fn two_sessions_in_one_scope_are_independent_and_share_the_store() {
    // Arrange
    let server = MockServer::start().await;
    let host = host_for(&server);
    let provider = host
        .services()
        .add_document_store_with(without_topology_updates)
        .add_async_session()
        .build();
    let scope = provider.create_scope();

    // Act
    let first = scope.async_session().unwrap();
    let second = scope.async_session().unwrap();

    // Assert
    assert_ne!(first.id(), second.id());
    assert_eq!(first.document_store().id(), second.document_store().id());
    assert_eq!(
        first.document_store().id(),
        provider.document_store().unwrap().id()
    );
}

#[tokio::test]
async fn scopes_share_the_singleton() {
    let server = MockServer::start().await;
    let host = host_for(&server);
    let provider = host
        .services()
        .add_document_store_with(without_topology_updates)
        .add_async_session()
        .build();

    let first = provider.create_scope().async_session().unwrap();
    let second = provider.create_scope().async_session().unwrap();

    assert_eq!(first.document_store().id(), second.document_store().id());
}

#[tokio::test]
async fn async_session_reads_documents_through_the_singleton() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/databases/Orders/docs"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "Results": [{ "Id": "orders/1" }] })),
        )
        .expect(1)
        .mount(&server)
        .await;
    let host = host_for(&server);
    let provider = host
        .services()
        .add_document_store_with(without_topology_updates)
        .add_async_session()
        .build();

    // Act
    let session = provider.create_scope().async_session().unwrap();
    let documents = session.get_all_documents(None, None).await.unwrap();

    // Assert
    assert_eq!(documents["Results"][0]["Id"], "orders/1");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn blocking_session_reads_the_cluster_topology() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cluster/topology"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"Leader\":\"A\"}"))
        .mount(&server)
        .await;
    let host = host_for(&server);
    let provider = host
        .services()
        .add_document_store_with(without_topology_updates)
        .add_session()
        .build();

    // Act
    let topology = tokio::task::spawn_blocking(move || {
        let session = provider.create_scope().session()?;
        Ok::<_, RavenError>(session.get_cluster_topology())
    })
    .await
    .unwrap()
    .unwrap();

    // Assert
    assert_eq!(topology.unwrap(), "{\"Leader\":\"A\"}");
}

#[tokio::test]
async fn dropping_a_session_announces_its_release() {
    // Arrange
    let server = MockServer::start().await;
    let host = host_for(&server);
    let provider = host
        .services()
        .add_document_store_with(without_topology_updates)
        .add_async_session()
        .build();
    let mut events = provider.document_store().unwrap().subscribe_session_events();

    // Act
    let session_id = {
        let session = provider.create_scope().async_session().unwrap();
        session.id()
    };

    // Assert
    assert_eq!(
        events.recv().await.unwrap(),
        SessionEvent::SessionCreated { session_id }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        SessionEvent::SessionClosing { session_id }
    );
}

#[tokio::test]
async fn explicit_store_overload_bypasses_the_container() {
    let server = MockServer::start().await;
    let mut builder = ravendb_client::DocumentStore::builder()
        .set_urls(&[server.uri()])
        .set_database_name("Explicit");
    builder.conventions_mut().set_disable_topology_updates(true);
    let document_store = builder.initialize().unwrap();
    let host = host_for(&server);
    let provider = host
        .services()
        .add_async_session_with_store(document_store.clone())
        .build();

    let session = provider.create_scope().async_session().unwrap();

    assert_eq!(session.document_store().id(), document_store.id());
    assert_eq!(session.database(), Some("Explicit"));
}
