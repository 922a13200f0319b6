//! Text functions callable from attribute expressions.

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionValue {
    Text(String),
    Number(f64),
    /// Missing value; functions propagate it.
    Unknown,
}

impl ExpressionValue {
    pub fn text(value: &str) -> Self {
        ExpressionValue::Text(value.to_string())
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ExpressionValue::Unknown)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ExpressionValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for ExpressionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionValue::Text(text) => f.write_str(text),
            ExpressionValue::Number(number) => write!(f, "{number}"),
            ExpressionValue::Unknown => f.write_str("?"),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ExpressionError {
    #[error("Invalid argument type, must be ({0})")]
    InvalidArgumentType(String),
    #[error("The target String must contain text")]
    EmptyTarget,
    #[error("Second argument must be regular expression. {0}")]
    InvalidRegex(String),
    #[error("{name} expects {expected} arguments, got {actual}")]
    WrongArity {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
}

pub trait Function: Send + Sync {
    fn name(&self) -> &str;

    fn arity(&self) -> usize;

    fn evaluate(&self, arguments: &[ExpressionValue]) -> Result<ExpressionValue, ExpressionError>;
}

/// `replace_regex(text, what, by)`: replaces every match of `what` in `text`.
/// `by` may refer to capture groups as `$1` or `${name}`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReplaceRegex;

impl Function for ReplaceRegex {
    fn name(&self) -> &str {
        "replace_regex"
    }

    fn arity(&self) -> usize {
        3
    }

    fn evaluate(&self, arguments: &[ExpressionValue]) -> Result<ExpressionValue, ExpressionError> {
        if arguments.iter().any(ExpressionValue::is_unknown) {
            return Ok(ExpressionValue::Unknown);
        }
        let [text, what, by] = arguments else {
            return Err(ExpressionError::WrongArity {
                name: self.name().to_string(),
                expected: self.arity(),
                actual: arguments.len(),
            });
        };
        let (Some(text), Some(what), Some(by)) = (text.as_text(), what.as_text(), by.as_text())
        else {
            return Err(ExpressionError::InvalidArgumentType(
                "string, string, string".to_string(),
            ));
        };
        if what.is_empty() {
            return Err(ExpressionError::EmptyTarget);
        }
        let pattern = Regex::new(what).map_err(|err| ExpressionError::InvalidRegex(err.to_string()))?;
        Ok(ExpressionValue::Text(pattern.replace_all(text, by).into_owned()))
    }
}

/// Functions by name, with arity checked before evaluation.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: BTreeMap<String, Arc<dyn Function>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ReplaceRegex));
        registry
    }

    /// Replaces a function of the same name.
    pub fn register(&mut self, function: Arc<dyn Function>) {
        self.functions.insert(function.name().to_string(), function);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Function>> {
        self.functions.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.functions.keys().map(String::as_str).collect()
    }

    pub fn call(
        &self,
        name: &str,
        arguments: &[ExpressionValue],
    ) -> Result<ExpressionValue, ExpressionError> {
        let function = self
            .get(name)
            .ok_or_else(|| ExpressionError::UnknownFunction(name.to_string()))?;
        if function.arity() != arguments.len() {
            return Err(ExpressionError::WrongArity {
                name: name.to_string(),
                expected: function.arity(),
                actual: arguments.len(),
            });
        }
        function.evaluate(arguments)
    }
}
