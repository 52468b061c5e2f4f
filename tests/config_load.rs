// tests/config_load.rs
//
// Loading from $DIGEST_CONFIG_PATH and the env-driven AI client factory.
// Env vars are process-global, hence #[serial].

use serial_test::serial;
use std::io::Write;

use tech_news_digest::config::{AppConfig, ENV_CONFIG_PATH};
use tech_news_digest::summarize::build_client_from_config;
use tech_news_digest::Category;

struct EnvGuard(&'static str);

impl EnvGuard {
    fn set(key: &'static str, value: &str) -> Self {
        std::env::set_var(key, value);
        Self(key)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        std::env::remove_var(self.0);
    }
}

#[test]
#[serial]
fn env_path_is_loaded() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[ranking]
cap = 2
min_score = 0.5

[ai]
provider = "Gemini"
temperature = 9.0

[categories.ai]
keywords = ["llm"]
"#
    )
    .unwrap();

    let _g = EnvGuard::set(ENV_CONFIG_PATH, file.path().to_str().unwrap());
    let cfg = AppConfig::load_default().unwrap();
    assert_eq!(cfg.ranking.cap, 2);
    assert_eq!(cfg.ai.provider, "gemini");
    assert!((cfg.ai.temperature - 0.7).abs() < 1e-6);
    assert_eq!(cfg.enabled_categories(), vec![Category::Ai]);
}

#[test]
#[serial]
fn missing_env_path_is_an_error() {
    let _g = EnvGuard::set(ENV_CONFIG_PATH, "/definitely/not/here/digest.toml");
    assert!(AppConfig::load_default().is_err());
}

#[test]
#[serial]
fn invalid_toml_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[ranking\ncap = ").unwrap();
    assert!(AppConfig::load_from(file.path()).is_err());
}

#[test]
#[serial]
fn ai_factory_follows_env() {
    let cfg = AppConfig::default();

    {
        let _m = EnvGuard::set("AI_TEST_MODE", "mock");
        assert_eq!(build_client_from_config(&cfg.ai).provider_name(), "mock");
    }

    std::env::remove_var("GEMINI_API_KEY");
    assert_eq!(build_client_from_config(&cfg.ai).provider_name(), "disabled");

    let mut off = cfg.ai.clone();
    off.enabled = false;
    let _k = EnvGuard::set("GEMINI_API_KEY", "test-key");
    assert_eq!(build_client_from_config(&off).provider_name(), "disabled");

    let dir = tempfile::tempdir().unwrap();
    let _c = EnvGuard::set("AI_CACHE_DIR", dir.path().to_str().unwrap());
    assert_eq!(build_client_from_config(&cfg.ai).provider_name(), "gemini");
}
