use std::path::PathBuf;

use ravendb_client::{error_chain_fmt, CertificateError, DocumentStoreError};

/// A required RavenDB setting is missing or malformed.
#[derive(thiserror::Error)]
pub enum ConfigurationError {
    #[error("You haven't configured a DatabaseName. Ensure your configuration contains a `{section}` section with a DatabaseName.")]
    MissingDatabaseName { section: String },
    #[error("You haven't configured your Raven database URLs. Ensure your configuration contains a `{section}` section with Urls.")]
    MissingUrls { section: String },
    #[error("The `{section}` configuration section could not be bound to RavenSettings")]
    InvalidSection {
        section: String,
        #[source]
        source: serde_json::Error,
    },
}
impl std::fmt::Debug for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(thiserror::Error)]
pub enum RavenError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("The Raven certificate file, {relative_path} is missing. Expected it at {}.", .expected_path.display())]
    MissingCertificateFile {
        relative_path: String,
        expected_path: PathBuf,
    },
    #[error(transparent)]
    Certificate(#[from] CertificateError),
    #[error(transparent)]
    DocumentStore(#[from] DocumentStoreError),
    #[error("No {0} has been registered. Register it on the RavenServiceCollection first.")]
    ServiceNotRegistered(&'static str),
    #[error("Unable to load configuration file `{}`", .path.display())]
    ConfigurationFile {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}
impl std::fmt::Debug for RavenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl RavenError {
    /// True for the errors caused by missing or malformed settings.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, RavenError::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{ConfigurationError, RavenError};

    #[test]
    fn missing_database_name_message_names_the_key_and_section() {
        let error = RavenError::from(ConfigurationError::MissingDatabaseName {
            section: "RavenSettings".to_string(),
        });

        let message = error.to_string();

        assert!(error.is_configuration_error());
        assert!(message.contains("DatabaseName"));
        assert!(message.contains("RavenSettings"));
    }

    #[test]
    fn missing_certificate_message_names_both_paths() {
        let error = RavenError::MissingCertificateFile {
            relative_path: "client.pem".to_string(),
            expected_path: PathBuf::from("/srv/app/client.pem"),
        };

        let message = error.to_string();

        assert!(!error.is_configuration_error());
        assert!(message.contains("client.pem is missing"));
        assert!(message.contains("/srv/app/client.pem"));
    }
}
