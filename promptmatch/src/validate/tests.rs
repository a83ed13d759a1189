//! Tests for request validation.

use serde_json::json;

use super::*;

fn cfg() -> Config {
    Config::default()
}

#[test]
fn test_valid_request_is_normalized() {
    let req = validate(
        &json!({
            "situation": "  Commercial Auto ",
            "level": "Structure\t",
            "file_type": "\nSummary Report",
            "data": "  keep my spaces  ",
        }),
        &cfg(),
    )
    .unwrap();

    assert_eq!(req.situation, "Commercial Auto");
    assert_eq!(req.level, "Structure");
    assert_eq!(req.file_type, "Summary Report");
    assert_eq!(req.data.as_deref(), Some("  keep my spaces  "));
}

#[test]
fn test_non_object_is_structural() {
    for value in [json!(null), json!([1, 2]), json!("text"), json!(42), json!(true)] {
        assert_eq!(validate(&value, &cfg()), Err(MatchError::MissingData), "{value}");
    }
}

#[test]
fn test_each_missing_key_is_structural() {
    let full = json!({
        "situation": "Commercial Auto",
        "level": "Structure",
        "file_type": "Summary Report",
        "data": "",
    });

    for key in REQUIRED_FIELDS {
        let mut value = full.clone();
        value.as_object_mut().unwrap().remove(key);
        assert_eq!(validate(&value, &cfg()), Err(MatchError::MissingData), "without {key}");
    }
}

#[test]
fn test_categorical_field_shapes() {
    let bad_values = [json!(null), json!(""), json!("   "), json!(7), json!(["Structure"]), json!({})];

    for field in CATEGORICAL_FIELDS {
        for bad in &bad_values {
            let mut value = json!({
                "situation": "Commercial Auto",
                "level": "Structure",
                "file_type": "Summary Report",
                "data": "x",
            });
            value[field] = bad.clone();
            assert_eq!(
                validate(&value, &cfg()),
                Err(MatchError::MissingData),
                "{field} = {bad}"
            );
        }
    }
}

#[test]
fn test_data_may_be_empty_or_null() {
    let mut value = json!({
        "situation": "General Liability",
        "level": "Summarize",
        "file_type": "Deposition",
        "data": "",
    });
    assert_eq!(validate(&value, &cfg()).unwrap().data.as_deref(), Some(""));

    value["data"] = json!("   ");
    assert!(validate(&value, &cfg()).is_ok());

    value["data"] = Value::Null;
    assert_eq!(validate(&value, &cfg()).unwrap().data, None);
}

#[test]
fn test_data_wrong_type_is_structural() {
    for bad in [json!(1), json!(false), json!(["a"]), json!({"a": 1})] {
        let value = json!({
            "situation": "General Liability",
            "level": "Summarize",
            "file_type": "Deposition",
            "data": bad,
        });
        assert_eq!(validate(&value, &cfg()), Err(MatchError::MissingData));
    }
}

#[test]
fn test_data_is_capped_in_characters() {
    let mut config = cfg();
    config.max_data_length = 4;

    let value = json!({
        "situation": "Commercial Auto",
        "level": "Structure",
        "file_type": "Summary Report",
        "data": "éèêëxyz",
    });
    assert_eq!(validate(&value, &config).unwrap().data.as_deref(), Some("éèêë"));
}

#[test]
fn test_default_cap_is_ten_thousand() {
    let value = json!({
        "situation": "Commercial Auto",
        "level": "Structure",
        "file_type": "Summary Report",
        "data": "a".repeat(12_000),
    });
    assert_eq!(validate(&value, &cfg()).unwrap().data.unwrap().len(), 10_000);
}

#[test]
fn test_unknown_values_are_semantic() {
    let cases = [
        ("situation", "Unknown"),
        ("level", "Invalid Level"),
        ("file_type", "Invalid File Type"),
        ("situation", "commercial auto"),
    ];
    for (field, bad) in cases {
        let mut value = json!({
            "situation": "Commercial Auto",
            "level": "Structure",
            "file_type": "Summary Report",
            "data": "x",
        });
        value[field] = json!(bad);
        assert_eq!(validate(&value, &cfg()), Err(MatchError::InvalidPrompt), "{field} = {bad}");
    }
}

#[test]
fn test_structural_wins_over_semantic() {
    // Unknown situation plus a missing key.
    let value = json!({
        "situation": "Unknown",
        "level": "Structure",
        "data": "x",
    });
    assert_eq!(validate(&value, &cfg()), Err(MatchError::MissingData));

    // Unknown situation plus a blank level.
    let value = json!({
        "situation": "Unknown",
        "level": " ",
        "file_type": "Summary Report",
        "data": "x",
    });
    assert_eq!(validate(&value, &cfg()), Err(MatchError::MissingData));
}

#[test]
fn test_extra_keys_are_ignored() {
    let value = json!({
        "situation": "Commercial Auto",
        "level": "Structure",
        "file_type": "Summary Report",
        "data": "",
        "priority": 3,
    });
    assert!(validate(&value, &cfg()).is_ok());
}

#[test]
fn test_inspect_collects_all_errors() {
    let report = inspect(
        &json!({
            "situation": "Unknown",
            "level": "",
            "data": 5,
        }),
        &cfg(),
    );

    assert!(!report.is_valid);
    assert_eq!(report.errors.len(), 4, "{:?}", report.errors);
    assert_eq!(report.errors[0], "missing required fields: file_type");
    assert!(report.errors[1].starts_with("invalid value for situation: \"Unknown\""));
    assert_eq!(report.errors[2], "field level cannot be empty");
    assert_eq!(report.errors[3], "field data must be a string, got number");
    assert_eq!(report.sanitized.get("situation"), Some(&json!("Unknown")));
    assert!(report.matched_prompt.is_none());
}

#[test]
fn test_inspect_valid_request() {
    let report = inspect(
        &json!({
            "situation": " Workers Compensation ",
            "level": "Summarize",
            "file_type": "Summons",
            "data": null,
        }),
        &cfg(),
    );

    assert!(report.is_valid);
    assert!(report.errors.is_empty());
    assert_eq!(report.matched_prompt.as_deref(), Some("Prompt 5"));
    assert_eq!(report.sanitized.get("situation"), Some(&json!("Workers Compensation")));
    assert_eq!(report.sanitized.get("data"), Some(&Value::Null));
}

#[test]
fn test_inspect_reports_missing_combination() {
    let report = inspect(
        &json!({
            "situation": "Commercial Auto",
            "level": "Structure",
            "file_type": "Deposition",
            "data": "",
        }),
        &cfg(),
    );

    assert!(!report.is_valid);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("no prompt for combination"));
}

#[test]
fn test_inspect_non_object() {
    let report = inspect(&json!([]), &cfg());
    assert!(!report.is_valid);
    assert_eq!(report.errors, vec!["request must be a JSON object, got array"]);
}

#[test]
fn test_helpers() {
    assert!(is_valid_string(&json!("a"), false));
    assert!(!is_valid_string(&json!("  "), false));
    assert!(is_valid_string(&json!("  "), true));
    assert!(!is_valid_string(&json!(1), true));

    let obj = json!({"situation": "x", "data": ""});
    assert_eq!(
        missing_fields(obj.as_object().unwrap(), &REQUIRED_FIELDS),
        vec!["level", "file_type"]
    );

    assert_eq!(sanitize("  hello world  ", Some(5)), "hello");
    assert_eq!(sanitize("  hi  ", None), "hi");
    assert_eq!(cap_chars("abc", 10), "abc");
    assert_eq!(cap_chars("abc", 0), "");
}
