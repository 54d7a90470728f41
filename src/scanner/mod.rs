// Author: Dustin Pilgrim
// License: MIT

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::ConfigError;

mod scan;

/// The closed set of token kinds produced by the [`Scanner`].
///
/// `Unknown` covers every single non-identifier, non-string, non-directive
/// character, including whitespace and structural punctuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Unknown,
    String,
    Prepro,
    Identifier,
    ArrowString,
}

/// One lexical token, carrying its source location.
///
/// String tokens retain their surrounding quotes; a doubled `""` inside the
/// literal has already been collapsed to a single `"` by the scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub line: usize,
    pub column: usize,
    pub unit: Arc<str>,
}

impl Token {
    /// True for `Unknown` tokens holding a single whitespace character.
    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Unknown && self.value.chars().all(char::is_whitespace)
    }

    pub fn is_value(&self, value: &str) -> bool {
        self.kind == TokenKind::Unknown && self.value == value
    }
}

/// Character-level lexer over one input unit (a file or an in-memory text).
///
/// The unit's full text is loaded eagerly, so the scanner supports arbitrary
/// look-behind and look-ahead across line boundaries. Tokens are produced
/// lazily through [`Scanner::next_token`]; exhaustion yields `None`, never an
/// error.
pub struct Scanner {
    unit: Arc<str>,
    dir: PathBuf,
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Scanner {
    /// Open a unit on disk. Include directives found while this scanner is
    /// active resolve against the unit's parent directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        Ok(Self::build(path.to_string_lossy().into(), dir, &text))
    }

    /// Scan an in-memory unit. `unit` is only used for error reporting and as
    /// the decoded root's name.
    pub fn from_str(unit: &str, text: &str) -> Self {
        Self::build(unit.into(), PathBuf::from("."), text)
    }

    fn build(unit: Arc<str>, dir: PathBuf, text: &str) -> Self {
        Scanner {
            unit,
            dir,
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn unit(&self) -> Arc<str> {
        self.unit.clone()
    }

    /// Directory against which this unit's includes resolve.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Produce the next token, or `None` once the unit is consumed.
    pub fn next_token(&mut self) -> Result<Option<Token>, ConfigError> {
        scan::next_token(self)
    }
}
