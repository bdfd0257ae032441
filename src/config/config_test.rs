use std::collections::HashMap;
use std::time::Duration;

use serial_test::serial;
use temp_env::with_vars;

use super::*;
use crate::Error;

fn cleanup_all_harness_env_vars() {
    for (key, _) in std::env::vars() {
        if key.starts_with("CARTRIDGE__") || key == "CONFIG_PATH" {
            std::env::remove_var(&key);
        }
    }
}

#[test]
#[serial]
fn default_config_should_initialize_with_hardcoded_values() {
    let config = HarnessConfig::default();

    assert_eq!(config.router.host, "localhost");
    assert_eq!(config.router.port, 3301);
    assert_eq!(config.router.api_port, 8081);
    assert_eq!(config.router.username, "admin");
    assert_eq!(config.router.password, "testapp-cluster-cookie");
    assert!(!config.router.use_fixed_ports);
    assert_eq!(config.bootstrap.router_timeout(), Duration::from_secs(60));
    assert_eq!(config.bootstrap.healthy_timeout(), Duration::from_secs(10));
    assert_eq!(config.bootstrap.poll_interval(), Duration::from_secs(1));
    assert_eq!(config.retry.topology.max_attempts, 2);
    assert_eq!(config.retry.topology.backoff_delay(), Duration::from_secs(10));
    assert_eq!(config.transport.transport(), TransportConfig::Plain);
}

#[test]
#[serial]
fn new_should_merge_environment_overrides() {
    cleanup_all_harness_env_vars();
    with_vars(
        vec![
            ("CARTRIDGE__ROUTER__PORT", Some("3401")),
            ("CARTRIDGE__BOOTSTRAP__PROFILE", Some("enterprise")),
            ("CARTRIDGE__TRANSPORT__SSL", Some("true")),
        ],
        || {
            let config = HarnessConfig::new().unwrap();

            assert_eq!(config.router.port, 3401);
            assert_eq!(config.bootstrap.profile, BootstrapProfile::Enterprise);
            assert_eq!(config.bootstrap.healthy_timeout(), Duration::from_secs(60));
            assert_eq!(config.transport.transport(), TransportConfig::Ssl);
        },
    );
}

#[test]
#[serial]
fn with_override_config_should_merge_file_settings() {
    cleanup_all_harness_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("harness.toml");

    std::fs::write(
        &config_path,
        r#"
        [router]
        username = "guest"
        use_fixed_ports = true

        [bootstrap]
        healthy_timeout_ms = 25000
        poll_interval_ms = 250

        [retry.topology]
        backoff_delay_ms = 500
        "#,
    )
    .unwrap();

    let empty_vars: Vec<(&str, Option<&str>)> = vec![];
    with_vars(empty_vars, || {
        let base_config = HarnessConfig::new().expect("success");
        let config = base_config
            .with_override_config(config_path.to_str().unwrap())
            .expect("override should load");

        assert_eq!(config.router.username, "guest");
        assert!(config.router.use_fixed_ports);
        // Untouched values survive the merge
        assert_eq!(config.router.port, 3301);
        assert_eq!(config.bootstrap.healthy_timeout(), Duration::from_secs(25));
        assert_eq!(config.bootstrap.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.retry.topology.backoff_delay(), Duration::from_millis(500));
        assert_eq!(config.retry.topology.max_attempts, 2);
    });
}

#[test]
#[serial]
fn environment_variables_should_have_highest_priority() {
    cleanup_all_harness_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("harness.toml");
    std::fs::write(
        &config_path,
        r#"
        [router]
        port = 3500
        api_port = 8500
        "#,
    )
    .unwrap();

    with_vars(
        vec![
            ("CONFIG_PATH", Some(config_path.to_str().unwrap())),
            ("CARTRIDGE__ROUTER__PORT", Some("3600")),
        ],
        || {
            let config = HarnessConfig::new().unwrap();

            assert_eq!(config.router.port, 3600);
            assert_eq!(config.router.api_port, 8500);
        },
    );
}

#[test]
#[serial]
fn missing_config_path_file_should_fail() {
    cleanup_all_harness_env_vars();
    with_vars(
        vec![("CONFIG_PATH", Some("/definitely/not/here/harness.toml"))],
        || {
            let result = HarnessConfig::new();
            assert!(matches!(result, Err(Error::Settings(_))));
        },
    );
}

#[test]
fn validation_should_accept_defaults() {
    assert!(HarnessConfig::default().validate().is_ok());
}

#[test]
fn validation_should_reject_zero_router_port() {
    let mut config = HarnessConfig::default();
    config.router.port = 0;

    assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
}

#[test]
fn validation_should_reject_zero_attempts() {
    let mut config = HarnessConfig::default();
    config.retry.topology.max_attempts = 0;

    assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
}

#[test]
fn validation_should_reject_zero_poll_interval() {
    let mut config = HarnessConfig::default();
    config.bootstrap.poll_interval_ms = 0;

    assert!(config.validate().is_err());
}

#[test]
fn validation_should_reject_blank_probe() {
    let mut config = HarnessConfig::default();
    config.bootstrap.cluster_healthy_probe = "   ".into();

    assert!(config.validate().is_err());
}

#[test]
fn explicit_healthy_timeout_overrides_profile() {
    let mut config = BootstrapConfig {
        profile: BootstrapProfile::Enterprise,
        ..Default::default()
    };
    assert_eq!(config.healthy_timeout(), Duration::from_secs(60));

    config.healthy_timeout_ms = Some(1500);
    assert_eq!(config.healthy_timeout(), Duration::from_millis(1500));
}

#[test]
#[serial]
fn build_args_should_prefer_explicit_values_over_environment() {
    with_vars(
        vec![
            ("TARANTOOL_VERSION", Some("2.11")),
            ("TARANTOOL_RUNDIR", Some("/var/run/tarantool")),
        ],
        || {
            let explicit = HashMap::from([("TARANTOOL_VERSION".to_string(), "2.10".to_string())]);
            let args = BuildArgs::new(explicit).merged_with_env();

            assert_eq!(args.get("TARANTOOL_VERSION"), Some("2.10"));
            assert_eq!(args.get("TARANTOOL_RUNDIR"), Some("/var/run/tarantool"));
            assert_eq!(args.run_dir(), "/var/run/tarantool");
        },
    );
}

#[test]
#[serial]
fn build_args_run_dir_defaults_when_unset() {
    with_vars(vec![("TARANTOOL_RUNDIR", None::<&str>)], || {
        let args = BuildArgs::default().merged_with_env();
        assert_eq!(args.run_dir(), "/tmp/run");
    });
}
