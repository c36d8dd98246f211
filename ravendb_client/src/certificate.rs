use std::{
    fmt,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::instrument;

use crate::error_chain_fmt;

/// The encoding of a client certificate file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CertificateFormat {
    /// Certificate chain and private key in a single PEM file.
    Pem,
    /// A `.pfx`/`.p12` archive, optionally protected by a password.
    Pkcs12,
}

impl CertificateFormat {
    fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("pfx") | Some("p12") => Self::Pkcs12,
            _ => Self::Pem,
        }
    }
}

/// A client certificate used to authenticate against a secured RavenDB server.
///
/// The file contents are kept in memory so the identity can be handed to every
/// HTTP client the document store builds. Cloning is cheap.
#[derive(Clone)]
pub struct ClientCertificate {
    path: PathBuf,
    format: CertificateFormat,
    contents: Arc<[u8]>,
    password: Option<String>,
}

impl ClientCertificate {
    /// Reads and validates the certificate at `path`.
    ///
    /// `password` is only used for PKCS#12 archives. An empty password is treated the same as
    /// no password.
    #[instrument(level = "debug", name = "Load Client Certificate", skip(password))]
    pub fn from_file(
        path: impl AsRef<Path> + fmt::Debug,
        password: Option<&str>,
    ) -> Result<Self, CertificateError> {
        let path = path.as_ref().to_path_buf();
        let mut buf = Vec::new();
        File::open(&path)
            .and_then(|mut file| file.read_to_end(&mut buf))
            .map_err(|e| {
                tracing::error!("Failed to read certificate file. Caused by: {}", e);
                CertificateError::Read {
                    path: path.clone(),
                    source: e,
                }
            })?;

        let format = CertificateFormat::from_path(&path);
        let password = password.filter(|p| !p.is_empty()).map(str::to_string);
        if format == CertificateFormat::Pem && password.is_some() {
            tracing::warn!(
                "A password was supplied for PEM certificate `{}`. Encrypted PEM keys are not supported, so the password is ignored.",
                path.display()
            );
        }

        let certificate = Self {
            path,
            format,
            contents: buf.into(),
            password,
        };
        // Fail early on files that can't become an identity.
        certificate.identity()?;
        tracing::debug!("Client certificate loaded");
        Ok(certificate)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> CertificateFormat {
        self.format
    }

    /// Builds the [`reqwest::Identity`] presented during the TLS handshake.
    pub fn identity(&self) -> Result<reqwest::Identity, CertificateError> {
        match self.format {
            CertificateFormat::Pem => reqwest::Identity::from_pem(&self.contents).map_err(|e| {
                CertificateError::InvalidCertificate {
                    path: self.path.clone(),
                    source: e,
                }
            }),
            #[cfg(feature = "native-tls")]
            CertificateFormat::Pkcs12 => reqwest::Identity::from_pkcs12_der(
                &self.contents,
                self.password.as_deref().unwrap_or_default(),
            )
            .map_err(|e| CertificateError::InvalidCertificate {
                path: self.path.clone(),
                source: e,
            }),
            #[cfg(not(feature = "native-tls"))]
            CertificateFormat::Pkcs12 => Err(CertificateError::UnsupportedFormat(self.path.clone())),
        }
    }
}

impl fmt::Debug for ClientCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCertificate")
            .field("path", &self.path)
            .field("format", &self.format)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .finish()
    }
}

#[derive(thiserror::Error)]
pub enum CertificateError {
    #[error("Unable to read certificate file `{}`", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Certificate file `{}` does not contain a valid client identity", .path.display())]
    InvalidCertificate {
        path: PathBuf,
        #[source]
        source: reqwest::Error,
    },
    #[error("PKCS#12 certificate `{}` requires the `native-tls` feature", .0.display())]
    UnsupportedFormat(PathBuf),
}
impl std::fmt::Debug for CertificateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
