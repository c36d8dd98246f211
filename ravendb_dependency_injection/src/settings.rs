use serde::Deserialize;

/// The default name of the configuration section [`RavenSettings`] are bound from.
pub const DEFAULT_SECTION_NAME: &str = "RavenSettings";

/// Contains settings for RavenDB, such as the URL to the database.
///
/// Bound from a configuration section shaped like:
///
/// ```json
/// {
///   "RavenSettings": {
///     "Urls": ["http://localhost:8080"],
///     "DatabaseName": "Orders",
///     "CertFilePath": "certs/client.pem",
///     "CertPassword": null
///   }
/// }
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct RavenSettings {
    /// The URLs where the database resides.
    pub urls: Vec<String>,

    /// The name of the database.
    pub database_name: String,

    /// The path to the client certificate, relative to the host's content root. For example, if
    /// the cert is named `foo.pem` and sits next to the deployed binary, set this to `foo.pem`.
    /// If unset or empty, no certificate is used.
    pub cert_file_path: Option<String>,

    /// The password to use for the certificate.
    pub cert_password: Option<String>,
}

impl RavenSettings {
    pub fn new<T: AsRef<str>>(urls: &[T], database_name: &str) -> Self {
        Self {
            urls: urls.iter().map(|u| u.as_ref().to_string()).collect(),
            database_name: database_name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_certificate(mut self, cert_file_path: &str, cert_password: Option<&str>) -> Self {
        self.cert_file_path = Some(cert_file_path.to_string());
        self.cert_password = cert_password.map(str::to_string);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::RavenSettings;

    #[test]
    fn binds_from_pascal_case_section() {
        // Arrange
        let section = serde_json::json!({
            "Urls": ["http://localhost:8080", "http://localhost:8081"],
            "DatabaseName": "Orders",
            "CertFilePath": "client.pem",
            "CertPassword": "secret"
        });

        // Act
        let settings = serde_json::from_value::<RavenSettings>(section).unwrap();

        // Assert
        assert_eq!(
            settings,
            RavenSettings::new(&["http://localhost:8080", "http://localhost:8081"], "Orders")
                .with_certificate("client.pem", Some("secret"))
        );
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let settings =
            serde_json::from_value::<RavenSettings>(serde_json::json!({ "DatabaseName": "Orders" }))
                .unwrap();

        assert!(settings.urls.is_empty());
        assert_eq!(settings.database_name, "Orders");
        assert_eq!(settings.cert_file_path, None);
        assert_eq!(settings.cert_password, None);
    }
}
