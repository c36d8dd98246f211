//! The options that control how the [`DocumentStore`] singleton is built.
//!
//! Options move through three types, one per stage of resolution, so a stage can't be skipped:
//!
//! * [`RavenOptions`]: filled in by the caller. Everything is optional.
//! * [`ConfiguredRavenOptions`]: settings, configuration and host environment are known.
//!   Settings may still be adjusted.
//! * [`ResolvedRavenOptions`]: certificate and document store factory are known. Frozen.
use std::{fmt, sync::Arc};

use ravendb_client::{ClientCertificate, DocumentStore, DocumentStoreBuilder};

use crate::{
    settings::DEFAULT_SECTION_NAME, ConfigurationSource, HostEnvironment, RavenError,
    RavenSettings,
};

/// Runs against the store before it is initialized. Use it to set conventions.
pub type BeforeInitializeHook = Arc<dyn Fn(&mut DocumentStoreBuilder) + Send + Sync>;

/// Runs once against the initialized store, e.g. to deploy indexes.
pub type AfterInitializeHook = Arc<dyn Fn(&DocumentStore) + Send + Sync>;

/// Builds and initializes a [`DocumentStore`] from resolved options.
pub type DocumentStoreFactory = Arc<
    dyn Fn(&ResolvedRavenOptions, Option<&BeforeInitializeHook>) -> Result<DocumentStore, RavenError>
        + Send
        + Sync,
>;

/// The caller-facing options. Anything left unset is filled in during resolution.
///
/// ```rust
/// use ravendb_dependency_injection::{RavenOptions, RavenSettings};
///
/// let options = RavenOptions::default()
///     .with_settings(RavenSettings::new(&["http://localhost:8080"], "Orders"))
///     .before_initialize_store(|builder| {
///         builder.conventions_mut().set_identity_parts_separator('-');
///     });
/// assert_eq!(options.section_name, "RavenSettings");
/// ```
#[derive(Clone)]
pub struct RavenOptions {
    /// The RavenDB settings. When unset they are bound from [`section_name`](Self::section_name).
    pub settings: Option<RavenSettings>,

    /// The name of the configuration section the settings are bound from.
    pub section_name: String,

    /// Where settings are bound from. Defaults to the host configuration.
    pub configuration: Option<Box<dyn ConfigurationSource>>,

    /// Defaults to the host environment.
    pub host_environment: Option<Box<dyn HostEnvironment>>,

    /// A pre-loaded client certificate. When unset it is loaded from
    /// [`RavenSettings::cert_file_path`].
    pub certificate: Option<ClientCertificate>,

    /// Replaces the default document store factory.
    pub get_document_store: Option<DocumentStoreFactory>,

    pub before_initialize_store: Option<BeforeInitializeHook>,

    pub after_initialize_store: Option<AfterInitializeHook>,
}

impl Default for RavenOptions {
    fn default() -> Self {
        Self {
            settings: None,
            section_name: DEFAULT_SECTION_NAME.to_string(),
            configuration: None,
            host_environment: None,
            certificate: None,
            get_document_store: None,
            before_initialize_store: None,
            after_initialize_store: None,
        }
    }
}

impl RavenOptions {
    pub fn with_settings(mut self, settings: RavenSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn with_section_name(mut self, section_name: &str) -> Self {
        self.section_name = section_name.to_string();
        self
    }

    pub fn with_configuration(mut self, configuration: impl ConfigurationSource + 'static) -> Self {
        self.configuration = Some(Box::new(configuration));
        self
    }

    pub fn with_host_environment(
        mut self,
        host_environment: impl HostEnvironment + 'static,
    ) -> Self {
        self.host_environment = Some(Box::new(host_environment));
        self
    }

    pub fn with_certificate(mut self, certificate: ClientCertificate) -> Self {
        self.certificate = Some(certificate);
        self
    }

    pub fn with_document_store_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&ResolvedRavenOptions, Option<&BeforeInitializeHook>) -> Result<DocumentStore, RavenError>
            + Send
            + Sync
            + 'static,
    {
        self.get_document_store = Some(Arc::new(factory));
        self
    }

    pub fn before_initialize_store<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut DocumentStoreBuilder) + Send + Sync + 'static,
    {
        self.before_initialize_store = Some(Arc::new(hook));
        self
    }

    pub fn after_initialize_store<F>(mut self, hook: F) -> Self
    where
        F: Fn(&DocumentStore) + Send + Sync + 'static,
    {
        self.after_initialize_store = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for RavenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RavenOptions")
            .field("settings", &self.settings.as_ref().map(redacted))
            .field("section_name", &self.section_name)
            .field("configuration", &self.configuration.is_some())
            .field("host_environment", &self.host_environment)
            .field("certificate", &self.certificate)
            .field("get_document_store", &self.get_document_store.is_some())
            .field("before_initialize_store", &self.before_initialize_store.is_some())
            .field("after_initialize_store", &self.after_initialize_store.is_some())
            .finish()
    }
}

/// Options after the first resolution stage.
#[derive(Clone)]
pub struct ConfiguredRavenOptions {
    pub(crate) settings: RavenSettings,
    pub(crate) section_name: String,
    pub(crate) configuration: Box<dyn ConfigurationSource>,
    pub(crate) host_environment: Box<dyn HostEnvironment>,
    pub(crate) certificate: Option<ClientCertificate>,
    pub(crate) get_document_store: Option<DocumentStoreFactory>,
    pub(crate) before_initialize_store: Option<BeforeInitializeHook>,
    pub(crate) after_initialize_store: Option<AfterInitializeHook>,
}

impl ConfiguredRavenOptions {
    pub fn settings(&self) -> &RavenSettings {
        &self.settings
    }

    /// Settings can still change between the two resolution stages. Required values are only
    /// checked when the document store is built.
    pub fn settings_mut(&mut self) -> &mut RavenSettings {
        &mut self.settings
    }

    pub fn section_name(&self) -> &str {
        &self.section_name
    }

    pub fn configuration(&self) -> &dyn ConfigurationSource {
        &*self.configuration
    }

    pub fn host_environment(&self) -> &dyn HostEnvironment {
        &*self.host_environment
    }

    pub fn certificate(&self) -> Option<&ClientCertificate> {
        self.certificate.as_ref()
    }
}

impl fmt::Debug for ConfiguredRavenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfiguredRavenOptions")
            .field("settings", &redacted(&self.settings))
            .field("section_name", &self.section_name)
            .field("host_environment", &self.host_environment)
            .field("certificate", &self.certificate)
            .finish_non_exhaustive()
    }
}

/// Fully resolved options. Used to build the [`DocumentStore`] singleton and never changed
/// afterwards.
#[derive(Clone)]
pub struct ResolvedRavenOptions {
    pub(crate) name: String,
    pub(crate) settings: RavenSettings,
    pub(crate) section_name: String,
    pub(crate) configuration: Box<dyn ConfigurationSource>,
    pub(crate) host_environment: Box<dyn HostEnvironment>,
    pub(crate) certificate: Option<ClientCertificate>,
    pub(crate) get_document_store: DocumentStoreFactory,
    pub(crate) before_initialize_store: Option<BeforeInitializeHook>,
    pub(crate) after_initialize_store: Option<AfterInitializeHook>,
}

impl ResolvedRavenOptions {
    /// The name these options were resolved under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &RavenSettings {
        &self.settings
    }

    pub fn section_name(&self) -> &str {
        &self.section_name
    }

    pub fn configuration(&self) -> &dyn ConfigurationSource {
        &*self.configuration
    }

    pub fn host_environment(&self) -> &dyn HostEnvironment {
        &*self.host_environment
    }

    pub fn certificate(&self) -> Option<&ClientCertificate> {
        self.certificate.as_ref()
    }

    pub fn document_store_factory(&self) -> &DocumentStoreFactory {
        &self.get_document_store
    }

    pub fn before_initialize_store(&self) -> Option<&BeforeInitializeHook> {
        self.before_initialize_store.as_ref()
    }

    pub fn after_initialize_store(&self) -> Option<&AfterInitializeHook> {
        self.after_initialize_store.as_ref()
    }

    /// Calls the factory with the before-initialize hook. Every call builds a new store.
    pub fn create_document_store(&self) -> Result<DocumentStore, RavenError> {
        (self.get_document_store)(self, self.before_initialize_store.as_ref())
    }
}

impl fmt::Debug for ResolvedRavenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedRavenOptions")
            .field("name", &self.name)
            .field("settings", &redacted(&self.settings))
            .field("section_name", &self.section_name)
            .field("host_environment", &self.host_environment)
            .field("certificate", &self.certificate)
            .finish_non_exhaustive()
    }
}

fn redacted(settings: &RavenSettings) -> RavenSettings {
    RavenSettings {
        cert_password: settings.cert_password.as_ref().map(|_| "********".to_string()),
        ..settings.clone()
    }
}
