//! Registers a RavenDB [`DocumentStore`](ravendb_client::DocumentStore) singleton and
//! per-unit-of-work sessions from host configuration.
//!
//! Settings are read from the `RavenSettings` configuration section:
//!
//! ```json
//! {
//!   "RavenSettings": {
//!     "Urls": ["http://localhost:8080"],
//!     "DatabaseName": "Orders",
//!     "CertFilePath": "",
//!     "CertPassword": ""
//!   }
//! }
//! ```
//!
//! ```rust
//! use ravendb_dependency_injection::{ContentRoot, JsonConfiguration, RavenServiceCollection};
//!
//! tokio_test::block_on(async {
//!     let configuration = JsonConfiguration::from_json_str(
//!         r#"{ "RavenSettings": { "Urls": ["http://localhost:8080"], "DatabaseName": "Orders" } }"#,
//!     )
//!     .unwrap();
//!     let provider = RavenServiceCollection::new(configuration, ContentRoot::new("."))
//!         .add_document_store_with(|options| {
//!             options.before_initialize_store = Some(std::sync::Arc::new(|builder: &mut ravendb_client::DocumentStoreBuilder| {
//!                 builder.conventions_mut().set_disable_topology_updates(true);
//!             }));
//!         })
//!         .add_async_session()
//!         .build();
//!
//!     let session = provider.create_scope().async_session().unwrap();
//!     assert_eq!(session.database(), Some("Orders"));
//! });
//! ```
mod configuration;
mod error;
mod options;
mod options_setup;
mod services;
mod settings;

pub use configuration::*;
pub use error::*;
pub use options::*;
pub use options_setup::*;
pub use services::*;
pub use settings::*;
