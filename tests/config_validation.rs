use std::error::Error;

use opsdeck::config::{Config, validate_config};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn empty_toml_yields_usable_defaults() -> TestResult {
    let cfg: Config = toml::from_str("")?;

    assert_eq!(cfg.server.host, "127.0.0.1");
    assert_eq!(cfg.server.port, 3333);
    assert_eq!(cfg.repos.root, std::path::PathBuf::from("."));
    assert!(cfg.deploy.cwd_marker.is_none());
    assert!(!cfg.assistant.bin.is_empty());
    assert!(!cfg.convert.bin.is_empty());
    validate_config(&cfg)?;
    Ok(())
}

#[test]
fn full_config_parses() -> TestResult {
    let cfg: Config = toml::from_str(
        r#"
        [server]
        host = "0.0.0.0"
        port = 8080

        [repos]
        root = "/srv/projects"

        [deploy]
        cwd_marker = "infra-gcp"

        [assistant]
        bin = "/usr/local/bin/assistant"
        args = ["commit", "--yes"]
        clear_env = ["GOOGLE_APPLICATION_CREDENTIALS"]

        [assistant.env]
        GIT_AUTHOR_NAME = "Deploy Bot"

        [convert]
        bin = "convert"
        "#,
    )?;

    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.deploy.cwd_marker.as_deref(), Some("infra-gcp"));
    assert_eq!(cfg.assistant.args, vec!["commit", "--yes"]);
    assert_eq!(
        cfg.assistant.env.get("GIT_AUTHOR_NAME").map(String::as_str),
        Some("Deploy Bot")
    );
    assert_eq!(cfg.assistant.clear_env, vec!["GOOGLE_APPLICATION_CREDENTIALS"]);
    validate_config(&cfg)?;
    Ok(())
}

#[test]
fn zero_port_is_rejected() -> TestResult {
    let cfg: Config = toml::from_str("[server]\nport = 0\n")?;
    assert!(validate_config(&cfg).is_err());
    Ok(())
}

#[test]
fn empty_assistant_bin_is_rejected() -> TestResult {
    let cfg: Config = toml::from_str("[assistant]\nbin = \"\"\n")?;
    assert!(validate_config(&cfg).is_err());
    Ok(())
}

#[test]
fn multi_component_cwd_marker_is_rejected() -> TestResult {
    let cfg: Config = toml::from_str("[deploy]\ncwd_marker = \"a/b\"\n")?;
    assert!(validate_config(&cfg).is_err());
    Ok(())
}

#[test]
fn conflicting_env_override_is_rejected() -> TestResult {
    let cfg: Config = toml::from_str(
        r#"
        [assistant]
        clear_env = ["TOKEN"]

        [assistant.env]
        TOKEN = "x"
        "#,
    )?;
    assert!(validate_config(&cfg).is_err());
    Ok(())
}
