use std::fmt;

use crate::scanner::TokenKind;

/// The main error type for config scanning, preprocessing and decoding.
///
/// Every error aborts the in-progress decode entirely; there is no local
/// recovery or partial tree. Variants that originate at a token carry the
/// token's `line`, `column` and `unit` so callers can report the exact
/// offending location.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Raised for scan-level malformations such as an unterminated string,
    /// block comment or arrow-string.
    Lexical {
        message: String,
        line: usize,
        column: usize,
        unit: String,
    },
    /// Raised when the observed token kind does not match any expected kind
    /// at a specific grammar point.
    UnexpectedType {
        expected: Vec<TokenKind>,
        got: TokenKind,
        value: String,
        line: usize,
        column: usize,
        unit: String,
    },
    /// Raised when the observed token value does not match an expected
    /// literal at a specific grammar point.
    UnexpectedValue {
        expected: Vec<String>,
        got: String,
        line: usize,
        column: usize,
        unit: String,
    },
    /// Raised when input ends in the middle of a construct.
    UnexpectedEof { expected: String, unit: String },
    /// Raised when a macro invocation's argument count does not match the
    /// declared parameter count.
    MacroArity {
        name: String,
        expected: usize,
        got: usize,
        line: usize,
        column: usize,
        unit: String,
    },
    /// Raised when a member name is added twice to one scope
    /// (case-insensitive).
    DuplicateMember { name: String, scope: String },
    /// Raised when `class X : Y` names a `Y` that is not visible in any
    /// enclosing scope.
    UnresolvedInheritance { name: String, scope: String },
    /// Raised for a stray `#else`/`#endif`, a second `#else` in one
    /// conditional, or a missing `#endif` at end of input.
    UnbalancedConditional {
        message: String,
        line: usize,
        column: usize,
        unit: String,
    },
    /// Raised when an include path cannot be resolved or opened, or contains
    /// a forbidden `.` or `..` segment.
    IncludeResolution {
        path: String,
        message: String,
        line: usize,
        column: usize,
        unit: String,
    },
    /// Raised when a unit cannot be read at all.
    File { path: String, message: String },
}

fn kinds(expected: &[TokenKind]) -> String {
    expected
        .iter()
        .map(|k| format!("{:?}", k))
        .collect::<Vec<_>>()
        .join(" | ")
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Lexical { message, line, column, unit } =>
                write!(f, "[CONFIG] Lexical error in {} at {}:{}: {}", unit, line, column, message),
            ConfigError::UnexpectedType { expected, got, value, line, column, unit } =>
                write!(f, "[CONFIG] Expected <{}>, got {:?} ('{}') in {} at {}:{}",
                    kinds(expected), got, value, unit, line, column),
            ConfigError::UnexpectedValue { expected, got, line, column, unit } =>
                write!(f, "[CONFIG] Expected one of {:?}, got '{}' in {} at {}:{}",
                    expected, got, unit, line, column),
            ConfigError::UnexpectedEof { expected, unit } =>
                write!(f, "[CONFIG] Unexpected end of input in {}: expected {}", unit, expected),
            ConfigError::MacroArity { name, expected, got, line, column, unit } =>
                write!(f, "[CONFIG] Macro '{}' expects {} argument(s), got {} in {} at {}:{}",
                    name, expected, got, unit, line, column),
            ConfigError::DuplicateMember { name, scope } =>
                write!(f, "[CONFIG] '{}' already defined in '{}'", name, scope),
            ConfigError::UnresolvedInheritance { name, scope } =>
                write!(f, "[CONFIG] Attempted to inherit non-existing config '{}' from '{}'", name, scope),
            ConfigError::UnbalancedConditional { message, line, column, unit } =>
                write!(f, "[CONFIG] Unbalanced conditional in {} at {}:{}: {}", unit, line, column, message),
            ConfigError::IncludeResolution { path, message, line, column, unit } =>
                write!(f, "[CONFIG] Cannot include '{}' from {} at {}:{}: {}", path, unit, line, column, message),
            ConfigError::File { path, message } =>
                write!(f, "[CONFIG] File error '{}': {}", path, message),
        }
    }
}

impl std::error::Error for ConfigError {}
