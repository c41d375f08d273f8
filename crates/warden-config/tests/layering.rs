//! Integration tests for TOML + environment configuration layering.
//!
//! Uses figment::Jail for sandboxed cwd and env var manipulation.

use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use pretty_assertions::assert_eq;
use warden_config::WardenConfig;

#[test]
fn loads_backend_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[backend]
base_url = "https://A1B2.playfabapi.com"
title_id = "A1B2"
request_timeout_secs = 10
"#,
        )?;

        let config: WardenConfig = Figment::from(Serialized::defaults(WardenConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.backend.base_url, "https://A1B2.playfabapi.com");
        assert_eq!(config.backend.title_id, "A1B2");
        assert_eq!(config.backend.request_timeout_secs, 10);
        assert!(config.backend.is_configured());
        Ok(())
    });
}

#[test]
fn partial_inventory_section_keeps_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r"
[inventory]
refresh_interval_ms = 10000
",
        )?;

        let config: WardenConfig = Figment::from(Serialized::defaults(WardenConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.inventory.refresh_interval_ms, 10_000);
        assert_eq!(config.inventory.tick_ms, 250);
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[auth]
auto_login = true
device_id = "from-toml"
"#,
        )?;
        jail.set_env("WARDEN_AUTH__AUTO_LOGIN", "false");
        jail.set_env("WARDEN_AUTH__DEVICE_ID", "from-env");

        let config: WardenConfig = Figment::from(Serialized::defaults(WardenConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("WARDEN_").split("__"))
            .extract()?;

        assert!(!config.auth.auto_login);
        assert_eq!(config.auth.device_id, "from-env");
        Ok(())
    });
}

#[test]
fn load_picks_up_project_local_file() {
    Jail::expect_with(|jail| {
        jail.create_dir(".warden")?;
        jail.create_file(
            ".warden/config.toml",
            r#"
[backend]
base_url = "http://localhost:8080"
title_id = "LOCAL"
"#,
        )?;

        let config = WardenConfig::load().expect("config loads");
        assert_eq!(config.backend.base_url, "http://localhost:8080");
        assert_eq!(config.backend.title_id, "LOCAL");
        Ok(())
    });
}

#[test]
fn load_rejects_invalid_timeout() {
    Jail::expect_with(|jail| {
        jail.set_env("WARDEN_BACKEND__REQUEST_TIMEOUT_SECS", "0");
        let err = WardenConfig::load().unwrap_err();
        assert!(err.to_string().contains("request_timeout_secs"));
        Ok(())
    });
}
