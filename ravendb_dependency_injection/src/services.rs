//! Registration and resolution of the RavenDB services.
//!
//! [`RavenServiceCollection`] records what was registered. [`RavenServiceProvider`] owns the
//! resolved options and the [`DocumentStore`] singleton. [`RavenScope`] is a unit of work that
//! opens sessions against it.
use std::sync::Arc;

use once_cell::sync::OnceCell;
use ravendb_client::{AsyncDocumentSession, DocumentSession, DocumentStore};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    ConfigurationSource, HostEnvironment, RavenError, RavenOptions, RavenOptionsSetup,
    RavenSettings, ResolvedRavenOptions,
};

type ConfigureOptions = Arc<dyn Fn(&mut RavenOptions) + Send + Sync>;

/// Where a session factory gets its store from.
#[derive(Clone, Debug)]
enum StoreSource {
    /// The provider's singleton.
    Container,
    /// A store built outside the provider.
    Explicit(DocumentStore),
}

/// Collects RavenDB service registrations.
///
/// ```rust,no_run
/// use ravendb_dependency_injection::{ContentRoot, JsonConfiguration, RavenServiceCollection};
///
/// # async fn run() -> Result<(), ravendb_dependency_injection::RavenError> {
/// let provider = RavenServiceCollection::new(
///     JsonConfiguration::from_json_file("appsettings.json")?,
///     ContentRoot::from_current_dir()?,
/// )
/// .add_document_store()
/// .add_async_session()
/// .build();
///
/// let scope = provider.create_scope();
/// let session = scope.async_session()?;
/// let topology = session.get_cluster_topology().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RavenServiceCollection {
    setup: RavenOptionsSetup,
    configure_options: Vec<ConfigureOptions>,
    document_store: bool,
    session: Option<StoreSource>,
    async_session: Option<StoreSource>,
}

impl RavenServiceCollection {
    /// `configuration` and `host_environment` are used for any option the caller leaves unset.
    pub fn new(
        configuration: impl ConfigurationSource + 'static,
        host_environment: impl HostEnvironment + 'static,
    ) -> Self {
        Self {
            setup: RavenOptionsSetup::from_boxed(
                Box::new(configuration),
                Box::new(host_environment),
            ),
            configure_options: Vec::new(),
            document_store: false,
            session: None,
            async_session: None,
        }
    }

    /// Registers the options resolver and the [`DocumentStore`] singleton.
    pub fn add_document_store(mut self) -> Self {
        self.document_store = true;
        self
    }

    /// Like [`add_document_store`](Self::add_document_store), and runs `configure` against the
    /// blank [`RavenOptions`] before they are resolved. Closures run in registration order.
    pub fn add_document_store_with<F>(mut self, configure: F) -> Self
    where
        F: Fn(&mut RavenOptions) + Send + Sync + 'static,
    {
        self.configure_options.push(Arc::new(configure));
        self.add_document_store()
    }

    /// Registers a [`DocumentSession`] per unit of work, opened on the singleton store.
    pub fn add_session(mut self) -> Self {
        self.session = Some(StoreSource::Container);
        self
    }

    /// Registers a [`DocumentSession`] per unit of work, opened on `document_store`.
    pub fn add_session_with_store(mut self, document_store: DocumentStore) -> Self {
        self.session = Some(StoreSource::Explicit(document_store));
        self
    }

    /// Registers an [`AsyncDocumentSession`] per unit of work, opened on the singleton store.
    pub fn add_async_session(mut self) -> Self {
        self.async_session = Some(StoreSource::Container);
        self
    }

    /// Registers an [`AsyncDocumentSession`] per unit of work, opened on `document_store`.
    pub fn add_async_session_with_store(mut self, document_store: DocumentStore) -> Self {
        self.async_session = Some(StoreSource::Explicit(document_store));
        self
    }

    /// Freezes the registrations. Nothing is resolved until it is first asked for.
    pub fn build(self) -> RavenServiceProvider {
        RavenServiceProvider {
            inner: Arc::new(ProviderInner {
                setup: self.setup,
                configure_options: self.configure_options,
                document_store_registered: self.document_store,
                session: self.session,
                async_session: self.async_session,
                options: OnceCell::new(),
                document_store: OnceCell::new(),
            }),
        }
    }
}

impl std::fmt::Debug for RavenServiceCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RavenServiceCollection")
            .field("setup", &self.setup)
            .field("configure_options", &self.configure_options.len())
            .field("document_store", &self.document_store)
            .field("session", &self.session)
            .field("async_session", &self.async_session)
            .finish()
    }
}

/// Resolves the registered RavenDB services. Cloning is cheap; clones share the singletons.
#[derive(Clone)]
pub struct RavenServiceProvider {
    inner: Arc<ProviderInner>,
}

struct ProviderInner {
    setup: RavenOptionsSetup,
    configure_options: Vec<ConfigureOptions>,
    document_store_registered: bool,
    session: Option<StoreSource>,
    async_session: Option<StoreSource>,
    options: OnceCell<ResolvedRavenOptions>,
    document_store: OnceCell<DocumentStore>,
}

impl RavenServiceProvider {
    /// The resolved options. Resolution runs once; a failure is returned to the caller and
    /// retried on the next call.
    #[instrument(level = "debug", name = "Resolve RavenOptions", skip(self))]
    pub fn options(&self) -> Result<&ResolvedRavenOptions, RavenError> {
        if !self.inner.document_store_registered {
            return Err(RavenError::ServiceNotRegistered("RavenOptions"));
        }
        self.inner.options.get_or_try_init(|| {
            let mut options = RavenOptions::default();
            for configure in &self.inner.configure_options {
                configure(&mut options);
            }
            self.inner.setup.resolve(options)
        })
    }

    pub fn settings(&self) -> Result<&RavenSettings, RavenError> {
        Ok(self.options()?.settings())
    }

    /// The [`DocumentStore`] singleton.
    ///
    /// Built on first use by the options' factory, after which the after-initialize hook runs.
    /// Concurrent first calls block until one of them has built the store, so exactly one is
    /// ever created.
    #[instrument(level = "debug", name = "Resolve DocumentStore", skip(self))]
    pub fn document_store(&self) -> Result<DocumentStore, RavenError> {
        if !self.inner.document_store_registered {
            return Err(RavenError::ServiceNotRegistered("DocumentStore"));
        }
        let document_store = self.inner.document_store.get_or_try_init(|| {
            let options = self.options()?;
            let document_store = options.create_document_store()?;
            if let Some(after_initialize) = options.after_initialize_store() {
                tracing::debug!("Running after-initialize hook");
                after_initialize(&document_store);
            }
            Ok::<_, RavenError>(document_store)
        })?;
        Ok(document_store.clone())
    }

    /// Starts a unit of work.
    pub fn create_scope(&self) -> RavenScope {
        let scope = RavenScope {
            id: Uuid::new_v4(),
            provider: self.clone(),
        };
        tracing::debug!(scope_id = %scope.id, "Scope created");
        scope
    }
}

impl std::fmt::Debug for RavenServiceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RavenServiceProvider")
            .field("options", &self.inner.options.get())
            .field("document_store", &self.inner.document_store.get())
            .finish_non_exhaustive()
    }
}

/// A unit of work. Every session it hands out is new and independent; each one is released
/// when dropped.
#[derive(Clone, Debug)]
pub struct RavenScope {
    id: Uuid,
    provider: RavenServiceProvider,
}

impl RavenScope {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn provider(&self) -> &RavenServiceProvider {
        &self.provider
    }

    /// Opens a blocking [`DocumentSession`] from the registered source.
    #[instrument(level = "debug", name = "Open DocumentSession", skip(self), fields(scope_id = %self.id))]
    pub fn session(&self) -> Result<DocumentSession, RavenError> {
        let document_store = self.store_for(&self.provider.inner.session, "DocumentSession")?;
        Ok(document_store.open_session()?)
    }

    /// Opens an [`AsyncDocumentSession`] from the registered source.
    #[instrument(level = "debug", name = "Open AsyncDocumentSession", skip(self), fields(scope_id = %self.id))]
    pub fn async_session(&self) -> Result<AsyncDocumentSession, RavenError> {
        let document_store =
            self.store_for(&self.provider.inner.async_session, "AsyncDocumentSession")?;
        Ok(document_store.open_async_session()?)
    }

    fn store_for(
        &self,
        source: &Option<StoreSource>,
        service: &'static str,
    ) -> Result<DocumentStore, RavenError> {
        match source {
            Some(StoreSource::Container) => self.provider.document_store(),
            Some(StoreSource::Explicit(document_store)) => Ok(document_store.clone()),
            None => {
                let error = RavenError::ServiceNotRegistered(service);
                tracing::error!("{}", error);
                Err(error)
            }
        }
    }
}
