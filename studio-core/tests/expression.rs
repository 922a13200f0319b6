use std::sync::Arc;
use studio_core::expression::{
    ExpressionError, ExpressionValue, Function, FunctionRegistry, ReplaceRegex,
};

fn text(value: &str) -> ExpressionValue {
    ExpressionValue::text(value)
}

#[test]
fn replaces_every_match() {
    let result = ReplaceRegex
        .evaluate(&[text("a1b22c333"), text("[0-9]+"), text("#")])
        .unwrap();
    assert_eq!(result, text("a#b#c#"));
}

#[test]
fn replacement_can_reference_groups() {
    let result = ReplaceRegex
        .evaluate(&[text("2024-05-17"), text(r"(\d+)-(\d+)-(\d+)"), text("$3.$2.$1")])
        .unwrap();
    assert_eq!(result, text("17.05.2024"));
}

#[test]
fn unknown_arguments_yield_unknown() {
    let result = ReplaceRegex
        .evaluate(&[text("abc"), ExpressionValue::Unknown, text("x")])
        .unwrap();
    assert!(result.is_unknown());
    let result = ReplaceRegex
        .evaluate(&[ExpressionValue::Unknown, ExpressionValue::Number(1.0), text("x")])
        .unwrap();
    assert!(result.is_unknown());
}

#[test]
fn non_text_arguments_fail() {
    let err = ReplaceRegex
        .evaluate(&[text("abc"), ExpressionValue::Number(1.0), text("x")])
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid argument type, must be (string, string, string)"
    );
}

#[test]
fn empty_target_fails() {
    let err = ReplaceRegex
        .evaluate(&[text("abc"), text(""), text("x")])
        .unwrap_err();
    assert_eq!(err, ExpressionError::EmptyTarget);
    assert_eq!(err.to_string(), "The target String must contain text");
}

#[test]
fn invalid_regex_fails() {
    let err = ReplaceRegex
        .evaluate(&[text("abc"), text("(unclosed"), text("x")])
        .unwrap_err();
    assert!(matches!(err, ExpressionError::InvalidRegex(_)));
    assert!(err
        .to_string()
        .starts_with("Second argument must be regular expression."));
}

#[test]
fn registry_checks_name_and_arity() {
    let registry = FunctionRegistry::with_builtins();
    assert_eq!(registry.names(), vec!["replace_regex"]);
    assert_eq!(
        registry
            .call("replace_regex", &[text("aXa"), text("X"), text("-")])
            .unwrap(),
        text("a-a")
    );
    assert!(matches!(
        registry.call("replace_regex", &[text("a")]),
        Err(ExpressionError::WrongArity { expected: 3, actual: 1, .. })
    ));
    assert!(matches!(
        registry.call("upper", &[]),
        Err(ExpressionError::UnknownFunction(_))
    ));
}

#[test]
fn registering_same_name_replaces() {
    let mut registry = FunctionRegistry::new();
    registry.register(Arc::new(ReplaceRegex));
    registry.register(Arc::new(ReplaceRegex));
    assert_eq!(registry.names().len(), 1);
}
