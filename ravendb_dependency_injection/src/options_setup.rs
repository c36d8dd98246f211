use std::sync::Arc;

use ravendb_client::{ClientCertificate, DocumentStore, DocumentStoreBuilder};
use tracing::instrument;

use crate::{
    BeforeInitializeHook, ConfigurationError, ConfigurationSource, ConfiguredRavenOptions,
    DocumentStoreFactory, HostEnvironment, RavenError, RavenOptions, RavenSettings,
    ResolvedRavenOptions,
};

/// The name options are resolved under when none is given.
pub const DEFAULT_OPTIONS_NAME: &str = "";

/// Resolves [`RavenOptions`] in two stages, defaulting anything the caller left unset.
///
/// [`configure`](Self::configure) fills in settings, configuration and host environment.
/// [`post_configure`](Self::post_configure) loads the certificate and picks the document store
/// factory.
#[derive(Clone, Debug)]
pub struct RavenOptionsSetup {
    configuration: Box<dyn ConfigurationSource>,
    host_environment: Box<dyn HostEnvironment>,
}

impl RavenOptionsSetup {
    /// `configuration` and `host_environment` are the host's handles, used for any option that
    /// doesn't supply its own.
    pub fn new(
        configuration: impl ConfigurationSource + 'static,
        host_environment: impl HostEnvironment + 'static,
    ) -> Self {
        Self::from_boxed(Box::new(configuration), Box::new(host_environment))
    }

    pub(crate) fn from_boxed(
        configuration: Box<dyn ConfigurationSource>,
        host_environment: Box<dyn HostEnvironment>,
    ) -> Self {
        Self {
            configuration,
            host_environment,
        }
    }

    /// Runs both stages.
    pub fn resolve(&self, options: RavenOptions) -> Result<ResolvedRavenOptions, RavenError> {
        let configured = self.configure(options)?;
        self.post_configure(DEFAULT_OPTIONS_NAME, configured)
    }

    /// Fills in the settings, configuration and host environment when they are unset.
    ///
    /// Settings are bound from the `section_name` section of the configuration. A missing
    /// section yields empty settings; required values are checked when the store is built.
    #[instrument(level = "debug", name = "Configure RavenOptions", skip(self))]
    pub fn configure(&self, options: RavenOptions) -> Result<ConfiguredRavenOptions, RavenError> {
        let configuration = options
            .configuration
            .unwrap_or_else(|| self.configuration.clone());
        let host_environment = options
            .host_environment
            .unwrap_or_else(|| self.host_environment.clone());

        let settings = match options.settings {
            Some(settings) => settings,
            None => bind_settings(&*configuration, &options.section_name)?,
        };

        Ok(ConfiguredRavenOptions {
            settings,
            section_name: options.section_name,
            configuration,
            host_environment,
            certificate: options.certificate,
            get_document_store: options.get_document_store,
            before_initialize_store: options.before_initialize_store,
            after_initialize_store: options.after_initialize_store,
        })
    }

    /// Loads the certificate when none was supplied and falls back to the default document
    /// store factory.
    ///
    /// Fails with [`RavenError::MissingCertificateFile`] if a certificate path is configured
    /// but no file exists there.
    #[instrument(level = "debug", name = "Post Configure RavenOptions", skip(self, options))]
    pub fn post_configure(
        &self,
        name: &str,
        options: ConfiguredRavenOptions,
    ) -> Result<ResolvedRavenOptions, RavenError> {
        let certificate = match options.certificate {
            Some(certificate) => Some(certificate),
            None => get_certificate(&options.settings, &*options.host_environment)?,
        };

        let get_document_store = options
            .get_document_store
            .unwrap_or_else(|| Arc::new(get_document_store) as DocumentStoreFactory);

        Ok(ResolvedRavenOptions {
            name: name.to_string(),
            settings: options.settings,
            section_name: options.section_name,
            configuration: options.configuration,
            host_environment: options.host_environment,
            certificate,
            get_document_store,
            before_initialize_store: options.before_initialize_store,
            after_initialize_store: options.after_initialize_store,
        })
    }
}

fn bind_settings(
    configuration: &dyn ConfigurationSource,
    section_name: &str,
) -> Result<RavenSettings, RavenError> {
    match configuration.section(section_name) {
        Some(section) => {
            let settings = serde_json::from_value::<RavenSettings>(section).map_err(|e| {
                tracing::error!("Unable to bind `{}` section. Caused by: {}", section_name, e);
                ConfigurationError::InvalidSection {
                    section: section_name.to_string(),
                    source: e,
                }
            })?;
            Ok(settings)
        }
        None => {
            tracing::warn!(
                "Configuration section `{}` not found, using empty settings",
                section_name
            );
            Ok(RavenSettings::default())
        }
    }
}

/// Loads the certificate named by [`RavenSettings::cert_file_path`], resolved against the
/// content root. No path means no certificate.
#[instrument(level = "debug", skip(settings), fields(cert_file_path = ?settings.cert_file_path))]
fn get_certificate(
    settings: &RavenSettings,
    host_environment: &dyn HostEnvironment,
) -> Result<Option<ClientCertificate>, RavenError> {
    let cert_relative_path = match settings.cert_file_path.as_deref() {
        Some(path) if !path.is_empty() => path,
        _ => return Ok(None),
    };

    let cert_file_path = host_environment.content_root_path().join(cert_relative_path);
    if !cert_file_path.is_file() {
        let error = RavenError::MissingCertificateFile {
            relative_path: cert_relative_path.to_string(),
            expected_path: cert_file_path,
        };
        tracing::error!("{}", error);
        return Err(error);
    }

    let certificate =
        ClientCertificate::from_file(&cert_file_path, settings.cert_password.as_deref())?;
    Ok(Some(certificate))
}

/// The default [`DocumentStoreFactory`].
///
/// Builds a store from the resolved settings and certificate, lets `configure` adjust it, then
/// initializes it. Every call creates a new store; caching it is the caller's job.
#[instrument(level = "debug", name = "Get DocumentStore", skip_all, fields(options = %options.name()))]
pub fn get_document_store(
    options: &ResolvedRavenOptions,
    configure: Option<&BeforeInitializeHook>,
) -> Result<DocumentStore, RavenError> {
    let settings = options.settings();
    if settings.database_name.is_empty() {
        let error = ConfigurationError::MissingDatabaseName {
            section: options.section_name().to_string(),
        };
        tracing::error!("{}", error);
        return Err(error.into());
    }
    if settings.urls.is_empty() {
        let error = ConfigurationError::MissingUrls {
            section: options.section_name().to_string(),
        };
        tracing::error!("{}", error);
        return Err(error.into());
    }

    let mut builder = DocumentStoreBuilder::new()
        .set_urls(&settings.urls)
        .set_database_name(&settings.database_name);

    if let Some(certificate) = options.certificate() {
        builder = builder.set_certificate(certificate.clone());
    }

    if let Some(configure) = configure {
        configure(&mut builder);
    }

    let document_store = builder.initialize()?;
    tracing::info!(
        document_store_id = %document_store.id(),
        database = %settings.database_name,
        "DocumentStore created"
    );
    Ok(document_store)
}
