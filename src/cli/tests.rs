use super::*;
use clap::CommandFactory;

mod test_helpers {
    use super::*;

    pub(super) fn parse_args(argv: &[&str]) -> Args {
        Args::try_parse_from(argv)
            .unwrap_or_else(|err| panic!("argv={argv:?} should parse successfully: {err}"))
    }
}

use test_helpers::parse_args;

#[test]
fn cli_definition_is_consistent() {
    Args::command().debug_assert();
}

#[test]
fn no_subcommand_means_chat() {
    let args = parse_args(&["flashchat"]);
    assert!(args.command.is_none());
    assert!(!args.env_only);
}

#[test]
fn global_flags_parse_before_and_after_subcommands() {
    for argv in [
        &["flashchat", "-m", "gemini-1.5-pro", "--env-only", "chat"][..],
        &["flashchat", "chat", "--model", "gemini-1.5-pro", "--env-only"][..],
    ] {
        let args = parse_args(argv);
        assert_eq!(args.model.as_deref(), Some("gemini-1.5-pro"), "argv={argv:?}");
        assert!(args.env_only, "argv={argv:?}");
        assert!(matches!(args.command, Some(Commands::Chat)));
    }
}

#[test]
fn log_flag_takes_a_path() {
    let args = parse_args(&["flashchat", "--log", "/tmp/flashchat.log"]);
    assert_eq!(
        args.log.as_deref(),
        Some(std::path::Path::new("/tmp/flashchat.log"))
    );
}

#[test]
fn say_collects_prompt_words() {
    let args = parse_args(&["flashchat", "say", "--raw", "what", "is", "-1?"]);
    match args.command {
        Some(Commands::Say { prompt, raw }) => {
            assert!(raw);
            assert_eq!(prompt.join(" "), "what is -1?");
        }
        _ => panic!("expected say"),
    }
}

#[test]
fn say_requires_a_prompt() {
    assert!(Args::try_parse_from(["flashchat", "say"]).is_err());
}

#[test]
fn set_accepts_optional_key_and_value() {
    match parse_args(&["flashchat", "set"]).command {
        Some(Commands::Set { key, value }) => {
            assert!(key.is_none());
            assert!(value.is_empty());
        }
        _ => panic!("expected set"),
    }
    match parse_args(&["flashchat", "set", "model", "gemini-1.5-pro"]).command {
        Some(Commands::Set { key, value }) => {
            assert_eq!(key.as_deref(), Some("model"));
            assert_eq!(value, vec!["gemini-1.5-pro"]);
        }
        _ => panic!("expected set"),
    }
}

#[test]
fn unset_requires_key() {
    assert!(Args::try_parse_from(["flashchat", "unset"]).is_err());
    assert!(matches!(
        parse_args(&["flashchat", "unset", "model"]).command,
        Some(Commands::Unset { key }) if key == "model"
    ));
}

#[test]
fn model_override_replaces_configured_model() {
    let dir = tempfile::TempDir::new().unwrap();
    let orch = ConfigOrchestrator::new(dir.path().join("config.toml"));

    let config = effective_config(&orch, Some("gemini-2.0-flash".into())).unwrap();
    assert_eq!(config.model(), "gemini-2.0-flash");

    let config = effective_config(&orch, Some("  ".into())).unwrap();
    assert_eq!(config.model(), crate::core::config::defaults::DEFAULT_MODEL);
}

#[test]
fn gateway_builds_from_config_table() {
    let mut config = Config::default();
    config.credential_groups = vec!["x".into()];
    config
        .credential_table
        .insert("color-x-1".into(), "#AIzaKey".into());
    let keystore = KeyStore::new_with_keyring(false);

    let gateway = build_gateway(&config, &keystore, false).unwrap();
    // Environment keys take precedence when present on the test host.
    assert!(!gateway.pool().is_empty());
}
