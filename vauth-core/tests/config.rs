use serial_test::serial;
use vauth_core::config::{
    validate_section, ConfigError, ConfigProperties, ConfigValue, DefaultSecretResolver,
    PropertyMeta, VauthConfig,
};

#[test]
fn empty_config_has_no_keys() {
    let config = VauthConfig::empty();
    assert!(matches!(
        config.get::<String>("nonexistent"),
        Err(ConfigError::NotFound(_))
    ));
}

#[test]
fn set_and_get() {
    let mut config = VauthConfig::empty();
    config.set("jwt_token.issuer", ConfigValue::String("voice".into()));
    assert_eq!(config.get::<String>("jwt_token.issuer").unwrap(), "voice");
}

#[test]
fn get_or_default() {
    let config = VauthConfig::empty();
    assert_eq!(config.get_or("jwt_token.lifetime", 60u32), 60);
}

#[test]
fn type_conversions() {
    let mut config = VauthConfig::empty();
    config.set("int_val", ConfigValue::Integer(42));
    config.set("bool_str", ConfigValue::String("yes".into()));
    config.set("null_val", ConfigValue::Null);
    config.set("negative", ConfigValue::Integer(-5));

    assert_eq!(config.get::<i64>("int_val").unwrap(), 42);
    assert_eq!(config.get::<u32>("int_val").unwrap(), 42);
    assert_eq!(config.get::<String>("int_val").unwrap(), "42");
    assert!(config.get::<bool>("bool_str").unwrap());
    assert!(config.get::<Option<String>>("null_val").unwrap().is_none());
    assert!(matches!(
        config.get::<u32>("negative"),
        Err(ConfigError::TypeMismatch { expected: "u32", .. })
    ));
}

#[test]
fn flatten_nested_yaml() {
    let yaml = r#"
jwt_token:
  issuer: "voice-assistants"
  lifetime: 30
  validate_audience: false
"#;
    let config = VauthConfig::from_yaml_str(yaml, "test").unwrap();

    assert_eq!(config.get::<String>("jwt_token.issuer").unwrap(), "voice-assistants");
    assert_eq!(config.get::<i64>("jwt_token.lifetime").unwrap(), 30);
    assert!(!config.get::<bool>("jwt_token.validate_audience").unwrap());
}

#[test]
fn list_values_whole_and_indexed() {
    let yaml = r#"
cors:
  origins:
    - "https://alexa.amazon.com"
    - "https://assistant.google.com"
"#;
    let config = VauthConfig::from_yaml_str(yaml, "test").unwrap();
    let origins: Vec<String> = config.get("cors.origins").unwrap();
    assert_eq!(origins.len(), 2);
    assert_eq!(
        config.get::<String>("cors.origins.1").unwrap(),
        "https://assistant.google.com"
    );
}

#[test]
fn invalid_yaml_is_load_error() {
    let result = VauthConfig::from_yaml_str("jwt_token: [unclosed", "test");
    assert!(matches!(result, Err(ConfigError::Load(_))));
}

#[test]
#[serial]
fn load_from_dir_applies_profile_override() {
    std::env::remove_var("VAUTH_PROFILE");
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("application.yaml"),
        "svc:\n  issuer: base\n  lifetime: 60\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("application-prod.yaml"), "svc:\n  issuer: prod\n").unwrap();

    let config = VauthConfig::load_from_dir(dir.path(), "prod", &DefaultSecretResolver).unwrap();
    assert_eq!(config.profile(), "prod");
    assert_eq!(config.get::<String>("svc.issuer").unwrap(), "prod");
    assert_eq!(config.get::<i64>("svc.lifetime").unwrap(), 60);
}

#[test]
#[serial]
fn profile_env_var_wins_over_argument() {
    std::env::set_var("VAUTH_PROFILE", "staging");
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("application-staging.yaml"), "svc:\n  name: staging\n").unwrap();

    let config = VauthConfig::load_from_dir(dir.path(), "dev", &DefaultSecretResolver).unwrap();
    std::env::remove_var("VAUTH_PROFILE");

    assert_eq!(config.profile(), "staging");
    assert_eq!(config.get::<String>("svc.name").unwrap(), "staging");
}

#[test]
#[serial]
fn environment_overrides_yaml() {
    std::env::remove_var("VAUTH_PROFILE");
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("application.yaml"),
        "vauthtest_section:\n  issuer_name: from-yaml\n",
    )
    .unwrap();
    std::env::set_var("VAUTHTEST_SECTION_ISSUER_NAME", "from-env");

    let config = VauthConfig::load_from_dir(dir.path(), "dev", &DefaultSecretResolver).unwrap();
    std::env::remove_var("VAUTHTEST_SECTION_ISSUER_NAME");

    assert_eq!(
        config.get::<String>("vauthtest_section.issuer_name").unwrap(),
        "from-env"
    );
}

#[test]
#[serial]
fn secret_file_placeholder_is_resolved() {
    std::env::remove_var("VAUTH_PROFILE");
    let dir = tempfile::tempdir().unwrap();
    let secret = dir.path().join("jwt_key");
    std::fs::write(&secret, "from-mounted-file\n").unwrap();
    std::fs::write(
        dir.path().join("application.yaml"),
        format!("keys:\n  signing: \"${{file:{}}}\"\n", secret.display()),
    )
    .unwrap();

    let config = VauthConfig::load_from_dir(dir.path(), "dev", &DefaultSecretResolver).unwrap();
    assert_eq!(config.get::<String>("keys.signing").unwrap(), "from-mounted-file");
}

#[test]
#[serial]
fn missing_files_yield_env_only_config() {
    std::env::remove_var("VAUTH_PROFILE");
    let dir = tempfile::tempdir().unwrap();
    let config = VauthConfig::load_from_dir(dir.path(), "dev", &DefaultSecretResolver).unwrap();
    assert_eq!(config.profile(), "dev");
    assert!(!config.contains_key("jwt_token.issuer_that_does_not_exist"));
}

#[test]
#[serial]
fn dotenv_file_feeds_placeholders() {
    std::env::remove_var("VAUTH_PROFILE");
    std::env::remove_var("VAUTH_DOTENV_SECRET");
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".env"), "VAUTH_DOTENV_SECRET=from-dotenv\n").unwrap();
    std::fs::write(
        dir.path().join("application.yaml"),
        "keys:\n  signing: \"${VAUTH_DOTENV_SECRET}\"\n",
    )
    .unwrap();

    let config = VauthConfig::load_from_dir(dir.path(), "dev", &DefaultSecretResolver).unwrap();
    std::env::remove_var("VAUTH_DOTENV_SECRET");
    assert_eq!(config.get::<String>("keys.signing").unwrap(), "from-dotenv");
}

#[test]
#[serial]
fn malformed_dotenv_is_load_error() {
    std::env::remove_var("VAUTH_PROFILE");
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".env"), "BROKEN LINE WITHOUT EQUALS\n").unwrap();

    let result = VauthConfig::load_from_dir(dir.path(), "dev", &DefaultSecretResolver);
    assert!(matches!(result, Err(ConfigError::Load(ref msg)) if msg.contains(".env")));
}

#[test]
fn get_optional_distinguishes_absent_from_wrong_type() {
    let mut config = VauthConfig::empty();
    config.set("client.retries", ConfigValue::Integer(3));
    config.set("client.proxy", ConfigValue::Null);
    config.set("client.timeout", ConfigValue::String("soon".into()));

    assert_eq!(config.get_optional::<u32>("client.retries").unwrap(), Some(3));
    assert_eq!(config.get_optional::<String>("client.proxy").unwrap(), None);
    assert_eq!(config.get_optional::<String>("client.missing").unwrap(), None);
    assert!(matches!(
        config.get_optional::<u32>("client.timeout"),
        Err(ConfigError::TypeMismatch { expected: "u32", .. })
    ));
}

// --- ConfigProperties ---

#[derive(Clone, Debug)]
struct ClientSection {
    name: String,
    timeout: u32,
}

impl ConfigProperties for ClientSection {
    fn prefix() -> &'static str {
        "client"
    }

    fn properties_metadata() -> Vec<PropertyMeta> {
        vec![
            PropertyMeta::required("client", "name", "String").with_description("Client name"),
            PropertyMeta::optional("client", "timeout", "u32", 30),
        ]
    }

    fn from_config(config: &VauthConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            name: config.get("client.name")?,
            timeout: config.get_optional("client.timeout")?.unwrap_or(30),
        })
    }
}

#[test]
fn typed_section_via_deref() {
    let config = VauthConfig::from_yaml_str("client:\n  name: alexa\n", "test")
        .unwrap()
        .with_typed::<ClientSection>()
        .unwrap();
    assert_eq!(config.name, "alexa");
    assert_eq!(config.timeout, 30);
    assert_eq!(config.get::<String>("client.name").unwrap(), "alexa");
}

#[test]
fn validate_section_reports_missing_required_key() {
    let config = VauthConfig::from_yaml_str("client:\n  timeout: 5\n", "test").unwrap();
    let errors = validate_section::<ClientSection>(&config);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].key, "client.name");
    assert_eq!(errors[0].env_hint, "CLIENT_NAME");
    assert!(errors[0].to_string().contains("Client name"));
}

#[test]
fn validate_section_reports_type_mismatch() {
    let config =
        VauthConfig::from_yaml_str("client:\n  name: alexa\n  timeout: soon\n", "test").unwrap();
    let errors = validate_section::<ClientSection>(&config);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].key, "client.timeout");
    assert_eq!(errors[0].expected_type, "u32");
}

#[test]
fn validate_section_accepts_complete_section() {
    let config = VauthConfig::from_yaml_str("client:\n  name: alexa\n", "test").unwrap();
    assert!(validate_section::<ClientSection>(&config).is_empty());
}
