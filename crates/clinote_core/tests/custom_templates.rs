use clinote_core::{Engine, EngineConfig, IssueKind, NoteError};
use std::io::Write;

fn engine_with_templates_file(json: &str) -> Result<Engine, NoteError> {
    let mut file = tempfile::NamedTempFile::new().expect("temp file should be created");
    file.write_all(json.as_bytes())
        .expect("temp file should be writable");
    let path = file.path().to_string_lossy().to_string();
    let config = EngineConfig::from_lookup(|name| {
        (name == clinote_core::config::env_vars::TEMPLATES_FILE).then(|| path.clone())
    })?;
    Engine::new(config)
}

#[test]
fn configured_template_is_resolvable_by_id_and_alias() {
    let engine = engine_with_templates_file(
        r#"[{
            "id": "progress",
            "title": "Progress Note",
            "aliases": ["Progress Note"],
            "sections": [
                {"name": "Interval History", "aliases": ["Interval"]},
                {"name": "Vitals", "required": false, "format_rule": {"heading_case": "upper"}},
                {"name": "Plan", "format_rule": {"normalize_bullets": true}}
            ]
        }]"#,
    )
    .expect("engine should build");

    assert_eq!(
        engine.registry().template_ids(),
        vec!["discharge", "hp", "progress", "soap"]
    );
    let normalized = engine
        .normalize("Plan:\n* walk daily\nInterval:\nno falls\nVitals:\nBP 120/80", "progress note")
        .expect("normalize should succeed");
    assert_eq!(
        normalized,
        "Interval History:\nno falls\n\nVITALS:\nBP 120/80\n\nPlan:\n- walk daily"
    );
}

#[test]
fn colliding_template_file_fails_engine_construction() {
    let err = engine_with_templates_file(
        r#"[{"id": "hp", "sections": [{"name": "Summary"}]}]"#,
    )
    .expect_err("collision with a built-in must fail");
    assert_eq!(err.code(), "config");
}

#[test]
fn malformed_template_file_is_a_config_error() {
    let err = engine_with_templates_file("not json").expect_err("bad file must fail");
    assert!(matches!(err, NoteError::Config(_)));
}

#[test]
fn inline_json_template_drives_validation() {
    let engine = Engine::new(EngineConfig::default()).expect("engine should build");
    let template = r#"{"id": "consult", "sections": [
        {"name": "Reason", "aliases": ["RFC"]},
        {"name": "Recommendations"}
    ]}"#;
    let report = engine
        .validate("RFC:\nsyncope\nOther:\nn/a", template, false)
        .expect("inline template should resolve");

    assert_eq!(report.template, "consult");
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].kind, IssueKind::MissingRequiredSection);
    assert_eq!(report.errors[0].section.as_deref(), Some("Recommendations"));
    assert_eq!(report.warnings_of(IssueKind::UnknownSection).count(), 1);
}

#[test]
fn broken_inline_template_explains_the_problem() {
    let engine = Engine::new(EngineConfig::default()).expect("engine should build");
    let err = engine
        .validate("text", "sections: Plan, plan", false)
        .expect_err("duplicate sections must fail");
    match err {
        NoteError::UnknownTemplate { detail, .. } => {
            assert!(detail.expect("detail should be present").contains("plan"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
