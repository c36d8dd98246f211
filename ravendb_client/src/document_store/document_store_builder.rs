use reqwest::Url;
use tracing::instrument;

use crate::{
    document_store::DocumentStoreInitialConfiguration, CertificateFormat, ClientCertificate,
    DocumentConventions, DocumentStore, DocumentStoreError,
};

/// Collects the configuration for a [`DocumentStore`] before it is initialized.
///
/// Everything set here is fixed once [`initialize`](DocumentStoreBuilder::initialize) runs.
#[derive(Clone, Debug, Default)]
pub struct DocumentStoreBuilder {
    certificate: Option<ClientCertificate>,
    conventions: DocumentConventions,
    database_name: Option<String>,
    document_store_urls: Vec<String>,
}

impl DocumentStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_certificate(mut self, certificate: ClientCertificate) -> Self {
        self.certificate = Some(certificate);
        self
    }

    pub fn set_conventions(mut self, conventions: DocumentConventions) -> Self {
        self.conventions = conventions;
        self
    }

    /// Appends `urls` to the list of nodes the store will bootstrap from.
    pub fn set_urls<T>(mut self, urls: &[T]) -> Self
    where
        T: AsRef<str>,
    {
        for u in urls {
            self.document_store_urls.push(u.as_ref().to_string());
        }
        self
    }

    pub fn set_database_name(mut self, database_name: &str) -> Self {
        self.database_name = Some(database_name.to_string());
        self
    }

    pub fn conventions_mut(&mut self) -> &mut DocumentConventions {
        &mut self.conventions
    }

    pub fn conventions(&self) -> &DocumentConventions {
        &self.conventions
    }

    pub fn certificate(&self) -> Option<&ClientCertificate> {
        self.certificate.as_ref()
    }

    pub fn database_name(&self) -> Option<&str> {
        self.database_name.as_deref()
    }

    pub fn urls(&self) -> &[String] {
        &self.document_store_urls
    }

    /// Validates the configuration, spawns a new document store actor and returns a handle to it.
    ///
    /// Must be called from within a tokio runtime. Topology discovery starts in the background,
    /// so this does not wait for the servers to answer.
    ///
    /// Each call creates a new, independent actor with its own connection pool. It is not
    /// recommended to create more than one per database cluster. The builder is left untouched
    /// so it can act as a template.
    #[instrument(level = "debug", name = "Initialize DocumentStore", skip(self))]
    pub fn initialize(&self) -> Result<DocumentStore, DocumentStoreError> {
        // Ensure DocumentStore URLs are valid and there is at least one
        if self.document_store_urls.is_empty() {
            tracing::error!(
                "No URLs were supplied and a document store can't exist without at least one"
            );
            return Err(DocumentStoreError::MissingUrlsError);
        }

        let initial_urls = validate_urls(
            self.document_store_urls.as_slice(),
            self.certificate.is_some(),
        )
        .map_err(|e| {
            tracing::error!("{}", e);
            e
        })?;

        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            tracing::error!("DocumentStore initialized outside of a tokio runtime");
            DocumentStoreError::NoRuntime
        })?;

        // Reqwest client maintains an internal connection pool. Reuse it for as long as the
        // store lives.
        let mut client = reqwest::Client::builder();
        if let Some(certificate) = &self.certificate {
            client = client.identity(certificate.identity()?);
            client = match certificate.format() {
                CertificateFormat::Pem => client.use_rustls_tls(),
                #[cfg(feature = "native-tls")]
                CertificateFormat::Pkcs12 => client.use_native_tls(),
                #[cfg(not(feature = "native-tls"))]
                CertificateFormat::Pkcs12 => client,
            };
        }
        let http_client = client.build().map_err(|e| {
            tracing::error!("Unable to build http client. Caused by: {}", e);
            DocumentStoreError::HttpClient(e)
        })?;

        let urls = self
            .document_store_urls
            .iter()
            .map(|u| u.trim_end_matches('/').to_string())
            .collect::<Vec<_>>();

        // Create an initial configuration for the DocumentStoreActor
        let initial_config = DocumentStoreInitialConfiguration {
            conventions: self.conventions.clone(),
            http_client,
            initial_urls,
        };

        tracing::trace!("Initial Configuration: {:?}", &initial_config);

        Ok(DocumentStore::new(
            initial_config,
            urls,
            self.database_name.clone(),
            self.certificate.clone(),
            runtime,
        ))
    }
}

/// Converts the provided URL strings to a [`Vec`] of [`Url`], ensuring they are a valid format.
///
/// All URLs must share one scheme, either http or https. When `require_https` is set, that
/// scheme has to be https.
#[instrument(level = "debug", name = "Validate URLs")]
fn validate_urls<T: std::fmt::Debug>(
    urls: &[T],
    require_https: bool,
) -> Result<Vec<Url>, DocumentStoreError>
where
    T: AsRef<str>,
{
    let clean_urls = urls
        .iter()
        .map(|url| {
            Url::parse(url.as_ref()).map_err(|e| DocumentStoreError::InvalidUrl {
                url: url.as_ref().to_string(),
                source: e,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    for url in &clean_urls {
        match url.scheme() {
            "https" => {}
            "http" if require_https => {
                return Err(DocumentStoreError::HttpsRequired(url.to_string()))
            }
            "http" => {}
            _ => return Err(DocumentStoreError::UnsupportedScheme(url.to_string())),
        }
    }

    if let Some(first) = clean_urls.first() {
        if clean_urls.iter().any(|u| u.scheme() != first.scheme()) {
            return Err(DocumentStoreError::MixedUrlSchemes);
        }
    }

    Ok(clean_urls)
}
