//! Config parsing and its effect on the engine.

use logstitch::engine::DecodePolicy;
use logstitch::{Config, IngestError, Profile};

#[test]
fn full_config_parses() {
    let config: Config = toml::from_str(
        r#"
[ingest]
root = "~/AppData/Roaming"
output_dir = "/tmp/reports"
jobs = 8
record_orphans = false
decode = "strict"

[parse]
tags = ["info", "error", "trace"]

[[parse.extra_grammars]]
name = "iso_t"
pattern = '^(?P<ts>\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2})\s+(?P<rest>.*)$'

[joiner]
logs = " | "
"#,
    )
    .unwrap();

    assert!(config.validate().is_ok());
    assert_eq!(config.ingest.jobs, 8);
    assert!(!config.ingest.record_orphans);
    assert_eq!(config.ingest.decode, DecodePolicy::Strict);
    assert_eq!(config.parse.extra_grammars[0].name, "iso_t");
    assert!(!config.parse.extra_grammars[0].time_only);
    assert_eq!(config.output_dir(), std::path::PathBuf::from("/tmp/reports"));
}

#[test]
fn config_drives_profile_engine() {
    let config: Config = toml::from_str(
        r#"
[parse]
tags = ["trace"]

[[parse.extra_grammars]]
name = "iso_t"
pattern = '^(?P<ts>\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2})\s+(?P<rest>.*)$'

[joiner]
logs = " | "
"#,
    )
    .unwrap();

    let profile = Profile::logs();
    let engine = profile.engine(&config.engine_settings(profile.name()).unwrap());
    assert_eq!(engine.joiner(), " | ");
    assert!(engine.grammars().match_line("2024-01-15T10:00:00 [trace] up").is_some());
    assert_eq!(engine.tags().extract("[trace] [info] x"), vec!["trace"]);

    let jupyter = Profile::jupyter();
    let engine = jupyter.engine(&config.engine_settings(jupyter.name()).unwrap());
    assert_eq!(engine.joiner(), " \\n ");
    assert_eq!(engine.grammars().grammars().len(), 2);
}

#[test]
fn grammar_without_groups_is_a_configuration_error() {
    let config: Config = toml::from_str(
        r#"
[[parse.extra_grammars]]
name = "bad"
pattern = '^\d+'
"#,
    )
    .unwrap();
    let err = config.validate().unwrap_err();
    assert!(matches!(err, IngestError::InvalidGrammar { .. }));
    assert!(err.is_configuration());
    assert!(err.to_string().contains("bad"));
}
