use ravendb_dependency_injection::{
    ConfigurationError, ContentRoot, JsonConfiguration, RavenError, RavenOptions,
    RavenOptionsSetup, RavenSettings,
};
use serde_json::json;
use tokio_test::assert_err;

use crate::helpers::{TestHost, TEST_CERTIFICATE};

#[test]
fn missing_certificate_file_fails_post_configure() {
    // Arrange
    let host = TestHost::new(json!({
        "RavenSettings": {
            "Urls": ["https://localhost:8080"],
            "DatabaseName": "Orders",
            "CertFilePath": "certs/client.pem"
        }
    }));
    let setup = RavenOptionsSetup::new(host.configuration.clone(), ContentRoot::new(host.path()));
    let configured = setup.configure(RavenOptions::default()).unwrap();

    // Act
    let error = assert_err!(setup.post_configure("", configured));

    // Assert
    match error {
        RavenError::MissingCertificateFile {
            relative_path,
            expected_path,
        } => {
            assert_eq!(relative_path, "certs/client.pem");
            assert_eq!(expected_path, host.path().join("certs/client.pem"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn missing_certificate_file_fails_provider_resolution() {
    let host = TestHost::new(json!({
        "RavenSettings": {
            "Urls": ["https://localhost:8080"],
            "DatabaseName": "Orders",
            "CertFilePath": "client.pem"
        }
    }));
    let provider = host.services().add_document_store().build();

    let error = assert_err!(provider.options());

    assert!(matches!(error, RavenError::MissingCertificateFile { .. }));
}

#[test]
fn certificate_is_resolved_against_the_content_root() {
    // Arrange
    let host = TestHost::new(json!({
        "RavenSettings": {
            "Urls": ["https://localhost:8080"],
            "DatabaseName": "Orders",
            "CertFilePath": format!("certs/{}", TEST_CERTIFICATE)
        }
    }));
    let expected = host.add_certificate(&format!("certs/{}", TEST_CERTIFICATE));
    let provider = host.services().add_document_store().build();

    // Act
    let options = provider.options().unwrap();

    // Assert
    assert_eq!(options.certificate().unwrap().path(), expected);
}

#[test]
fn environment_variables_override_the_configuration_file() {
    let host = TestHost::new(json!({
        "RavenSettings": { "Urls": ["http://localhost:8080"], "DatabaseName": "Orders" }
    }));

    temp_env::with_vars(
        [
            ("RAVEN_API_TEST_RavenSettings__DatabaseName", Some("Invoices")),
            ("RAVEN_API_TEST_RavenSettings__Urls__0", Some("http://db:8080")),
        ],
        || {
            let configuration = host
                .configuration
                .clone()
                .add_environment_variables("RAVEN_API_TEST_");
            let setup = RavenOptionsSetup::new(configuration, ContentRoot::new(host.path()));

            let resolved = setup.resolve(RavenOptions::default()).unwrap();

            assert_eq!(
                resolved.settings(),
                &RavenSettings::new(&["http://db:8080"], "Invoices")
            );
        },
    );
}

#[test]
fn caller_settings_win_over_configuration() {
    let host = TestHost::new(json!({
        "RavenSettings": { "Urls": ["http://localhost:8080"], "DatabaseName": "Orders" }
    }));
    let provider = host
        .services()
        .add_document_store_with(|options| {
            options.settings = Some(RavenSettings::new(&["http://override:8080"], "Override"));
        })
        .build();

    let settings = provider.settings().unwrap();

    assert_eq!(settings.database_name, "Override");
}

#[test]
fn malformed_section_is_reported() {
    let setup = RavenOptionsSetup::new(
        JsonConfiguration::from_value(json!({ "RavenSettings": "not an object" })),
        ContentRoot::new("."),
    );

    let error = assert_err!(setup.configure(RavenOptions::default()));

    assert!(matches!(
        error,
        RavenError::Configuration(ConfigurationError::InvalidSection { .. })
    ));
}
