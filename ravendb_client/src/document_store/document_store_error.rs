use crate::{error_chain_fmt, CertificateError};

#[derive(thiserror::Error)]
pub enum DocumentStoreError {
    #[error("No URLs were supplied and a document store can't exist without at least one")]
    MissingUrlsError,
    #[error("`{url}` is not a valid url")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Url `{0}` must use either the http or https scheme")]
    UnsupportedScheme(String),
    #[error("Urls must all use the same scheme, but both http and https were supplied")]
    MixedUrlSchemes,
    #[error("A client certificate was supplied, so url `{0}` must use https")]
    HttpsRequired(String),
    #[error(transparent)]
    Certificate(#[from] CertificateError),
    #[error("Unable to build the http client for the document store")]
    HttpClient(#[source] reqwest::Error),
    #[error("A document store can only be initialized from within a tokio runtime")]
    NoRuntime,
    #[error("The DocumentStore actor is no longer running")]
    ActorStopped,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}
impl std::fmt::Debug for DocumentStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
