/*!
ravendb_client is a client library for the RavenDB document database.
It aims to compete with the existing libraries officially offered, but
using more rusty ways of doing things.

This library requires tokio and async, and uses the actor pattern to maintain
a single instance of the [`DocumentStore`] per cluster, as recommended by the
official libraries. This is designed to keep resource usage in your app to a minimum.

A [`DocumentStore`] is configured through a [`DocumentStoreBuilder`] and becomes usable once
[`DocumentStoreBuilder::initialize`] is called. Sessions can then be requested from it to
interact with the database. A session is a unit of work: open one per request or operation
and let it drop when the work is done.

# Example
```rust
# tokio_test::block_on(async {
use ravendb_client::DocumentStore;

let mut builder = DocumentStore::builder()
    .set_urls(&["http://localhost:8080"])
    .set_database_name("Orders");
builder.conventions_mut().set_disable_topology_updates(true);

let document_store = builder.initialize().unwrap();
let session = document_store.open_async_session().unwrap();
assert_eq!(session.database(), Some("Orders"));
# })
```

When `session` is dropped, it'll close any open handles appropriately on its own.
*/

mod async_document_session;
mod certificate;
mod document_conventions;
mod document_session;
mod document_store;

pub mod cluster_topology;
pub mod events;
pub mod raven_command;
pub mod ravendb_error;

pub use async_document_session::*;
pub use certificate::*;
pub use document_conventions::*;
pub use document_session::*;
pub use document_store::*;

/// Formats an error followed by every error in its `source()` chain.
pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
