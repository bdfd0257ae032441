use super::*;
use crate::Error;

fn mtls() -> TransportConfig {
    TransportConfig::MutualTls {
        cert_path: "server.crt".into(),
        key_path: "server.key".into(),
    }
}

#[test]
fn select_should_cover_every_combination() {
    let cases = [
        (false, None, None, TransportConfig::Plain),
        (true, None, None, TransportConfig::Ssl),
        (false, Some("server.crt"), None, TransportConfig::Plain),
        (true, Some("server.crt"), None, TransportConfig::Ssl),
        (false, None, Some("server.key"), TransportConfig::Plain),
        (true, None, Some("server.key"), TransportConfig::Ssl),
        (false, Some("server.crt"), Some("server.key"), mtls()),
        (true, Some("server.crt"), Some("server.key"), mtls()),
    ];

    for (ssl, cert, key, expected) in cases {
        assert_eq!(
            TransportConfig::select(ssl, cert, key),
            expected,
            "ssl={ssl} cert={cert:?} key={key:?}"
        );
    }
}

#[test]
fn select_should_treat_empty_paths_as_absent() {
    assert_eq!(TransportConfig::select(false, Some(""), Some("")), TransportConfig::Plain);
    assert_eq!(TransportConfig::select(true, Some("server.crt"), Some("")), TransportConfig::Ssl);
}

#[test]
fn settings_should_derive_transport_from_fields() {
    let settings = TransportSettings {
        ssl: false,
        key_file: Some("server.key".into()),
        cert_file: Some("server.crt".into()),
        ..Default::default()
    };

    assert_eq!(settings.transport(), mtls());
    assert!(settings.transport().is_secure());
    assert!(!TransportSettings::default().transport().is_secure());
}

#[test]
fn validate_should_reject_key_without_cert() {
    let settings = TransportSettings {
        key_file: Some("server.key".into()),
        ..Default::default()
    };

    assert!(matches!(settings.validate(), Err(Error::InvalidConfig(_))));
}

#[test]
fn validate_should_reject_request_timeout_below_eval_timeout() {
    let settings = TransportSettings {
        eval_timeout_ms: 5000,
        request_timeout_ms: 1000,
        ..Default::default()
    };

    assert!(settings.validate().is_err());
}

#[test]
fn validate_should_reject_zero_as_script_error_code() {
    let settings = TransportSettings {
        script_error_codes: vec![0, 3],
        ..Default::default()
    };

    assert!(settings.validate().is_err());
}

#[test]
fn validate_should_reject_empty_script_error_codes() {
    let settings = TransportSettings {
        script_error_codes: vec![],
        ..Default::default()
    };

    assert!(matches!(settings.validate(), Err(Error::InvalidConfig(_))));
}
