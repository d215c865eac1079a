// tests/cli_tests.rs
//
// The command implementations behind the `clove-expr` binary.

mod common;

use std::fs;
use std::path::PathBuf;

use clove_expr::cli::{
    CheckOptions, CheckResult, CliError, OutputFormat, ParseOptions, execute_check, execute_parse,
    load_language,
};
use clove_expr::{Language, LanguageConfig, ParseErrorCode};
use common::arithmetic;
use pretty_assertions::assert_eq;

fn write_language(name: &str, json: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("clove-expr-{}-{}.json", name, std::process::id()));
    fs::write(&path, json).unwrap();
    path
}

fn parse_options(text: &str, format: OutputFormat) -> ParseOptions {
    ParseOptions {
        text: text.to_string(),
        format,
        pretty: false,
    }
}

#[test]
fn test_language_from_file() {
    let path = write_language(
        "sql",
        r#"{
            "operators": [
                { "name_parts": ["AND"], "kind": "binary", "priority": 50 },
                { "name_parts": ["="], "kind": "binary", "priority": 30 }
            ],
            "case_sensitive": false
        }"#,
    );
    let language = load_language(Some(path.as_path())).unwrap();
    fs::remove_file(&path).unwrap();

    let output = execute_parse(&parse_options("a = 1 and b = 2", OutputFormat::Outline), &language)
        .unwrap();
    assert!(!output.has_errors());
    assert_eq!(output.rendered, "AND(=(a, 1), =(b, 2))");
}

#[test]
fn test_invalid_language_file() {
    let path = write_language("broken", r#"{ "operators": "+" }"#);
    let err = load_language(Some(path.as_path())).unwrap_err();
    fs::remove_file(&path).unwrap();
    assert!(matches!(err, CliError::Language(_)));
}

#[test]
fn test_rejected_language_reported_by_commands() {
    let language = Language::new(LanguageConfig::default().with_keyword(1, "x").with_keyword(1, "y"));
    let err = execute_parse(&parse_options("a", OutputFormat::Outline), &language).unwrap_err();
    assert!(matches!(err, CliError::Language(_)));
}

#[test]
fn test_parse_json_output() {
    let options = ParseOptions {
        pretty: true,
        ..parse_options("x + 1", OutputFormat::Json)
    };
    let output = execute_parse(&options, &arithmetic()).unwrap();
    assert!(output.rendered.contains('\n'));

    let value: serde_json::Value = serde_json::from_str(&output.rendered).unwrap();
    assert_eq!(value["index_in_text"], 0);
    assert_eq!(value["length"], 5);
    assert_eq!(value["root"]["kind"], "root");
    assert!(value["errors"].as_array().unwrap().is_empty());
}

#[test]
fn test_parse_reports_diagnostics() {
    let output = execute_parse(&parse_options("x +", OutputFormat::Outline), &arithmetic()).unwrap();
    assert!(output.has_errors());
    assert_eq!(output.rendered, "!series(x, +)");
    assert_eq!(
        output.diagnostics,
        vec!["1:3 [E0005] operand missing for operator '+'".to_string()]
    );
}

#[test]
fn test_check_command() {
    let options = CheckOptions {
        text: "a = (1 + 2".to_string(),
    };
    let CheckResult::Invalid(found) = execute_check(&options, &arithmetic()).unwrap() else {
        panic!("expected errors");
    };
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, ParseErrorCode::ClosingBraceMissing);
    assert_eq!((found[0].line, found[0].column), (1, 11));

    let options = CheckOptions {
        text: "a = (1 + 2)".to_string(),
    };
    assert!(matches!(
        execute_check(&options, &arithmetic()).unwrap(),
        CheckResult::Valid
    ));
}
