use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::ConfigError;
use crate::scanner::{Scanner, Token, TokenKind};

/// An uninterrupted logical token sequence over a stack of [`Scanner`]s.
///
/// `#include` pushes a new scanner on top; when the top scanner is exhausted
/// it is popped and pulling continues from the next one down. The stream is
/// exhausted only when the stack is empty. Lookahead is buffered internally
/// and replayed on subsequent pulls.
pub struct TokenStream {
    scanners: Vec<Scanner>,
    buf: VecDeque<Token>,
    unit: Arc<str>,
}

impl TokenStream {
    pub fn new(scanner: Scanner) -> Self {
        let unit = scanner.unit();
        TokenStream {
            scanners: vec![scanner],
            buf: VecDeque::new(),
            unit,
        }
    }

    pub fn from_unit<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Ok(Self::new(Scanner::from_file(path)?))
    }

    /// Unit name of the scanner currently on top of the stack.
    pub fn unit(&self) -> Arc<str> {
        self.scanners
            .last()
            .map(|s| s.unit())
            .unwrap_or_else(|| self.unit.clone())
    }

    /// Directory of the unit currently being scanned; include paths resolve
    /// against it.
    pub fn current_dir(&self) -> PathBuf {
        self.scanners
            .last()
            .map(|s| s.dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Push a new scanner for an included unit on top of the stack.
    pub fn push_unit(&mut self, path: &Path) -> Result<(), ConfigError> {
        self.scanners.push(Scanner::from_file(path)?);
        Ok(())
    }

    fn next_raw(&mut self) -> Result<Option<Token>, ConfigError> {
        while let Some(top) = self.scanners.last_mut() {
            if let Some(token) = top.next_token()? {
                return Ok(Some(token));
            }
            self.scanners.pop();
        }
        Ok(None)
    }

    /// Consume the next token, or `None` once every scanner is exhausted.
    /// Whitespace tokens are skipped unless `include_ws` is set.
    pub fn next_token(&mut self, include_ws: bool) -> Result<Option<Token>, ConfigError> {
        loop {
            let token = match self.buf.pop_front() {
                Some(t) => Some(t),
                None => self.next_raw()?,
            };
            match token {
                None => return Ok(None),
                Some(t) if !include_ws && t.is_whitespace() => continue,
                Some(t) => return Ok(Some(t)),
            }
        }
    }

    /// Consume the next token, treating exhaustion as an error.
    pub fn get(&mut self, include_ws: bool) -> Result<Token, ConfigError> {
        self.next_token(include_ws)?.ok_or_else(|| ConfigError::UnexpectedEof {
            expected: "a token".into(),
            unit: self.unit().to_string(),
        })
    }

    /// Look at the `n`-th (1-based) upcoming non-whitespace token without
    /// consuming it.
    pub fn peek_n(&mut self, n: usize, include_ws: bool) -> Result<Option<&Token>, ConfigError> {
        if n == 0 {
            return Ok(None);
        }
        let mut taken = Vec::with_capacity(n);
        while taken.len() < n {
            match self.next_token(include_ws)? {
                Some(t) => taken.push(t),
                None => break,
            }
        }
        let got = taken.len();
        for t in taken.into_iter().rev() {
            self.buf.push_front(t);
        }
        if got < n {
            Ok(None)
        } else {
            Ok(self.buf.get(n - 1))
        }
    }

    pub fn peek(&mut self) -> Result<Option<&Token>, ConfigError> {
        self.peek_n(1, false)
    }

    /// Consume and drop `n` non-whitespace tokens; exhaustion is swallowed.
    pub fn discard(&mut self, n: usize) -> Result<(), ConfigError> {
        for _ in 0..n {
            if self.next_token(false)?.is_none() {
                break;
            }
        }
        Ok(())
    }

    pub fn expect_kind(&mut self, kind: TokenKind) -> Result<Token, ConfigError> {
        let token = self.get(false)?;
        check_kind(token, kind)
    }

    pub fn expect_kinds(&mut self, kinds: &[TokenKind]) -> Result<Vec<Token>, ConfigError> {
        kinds.iter().map(|&k| self.expect_kind(k)).collect()
    }

    pub fn expect_value(&mut self, value: &str) -> Result<Token, ConfigError> {
        let token = self.get(false)?;
        check_value(token, value)
    }

    pub fn expect_values(&mut self, values: &[&str]) -> Result<Vec<Token>, ConfigError> {
        values.iter().map(|&v| self.expect_value(v)).collect()
    }
}

pub(crate) fn check_kind(token: Token, kind: TokenKind) -> Result<Token, ConfigError> {
    if token.kind != kind {
        return Err(ConfigError::UnexpectedType {
            expected: vec![kind],
            got: token.kind,
            value: token.value,
            line: token.line,
            column: token.column,
            unit: token.unit.to_string(),
        });
    }
    Ok(token)
}

pub(crate) fn check_value(token: Token, value: &str) -> Result<Token, ConfigError> {
    if token.value != value {
        return Err(ConfigError::UnexpectedValue {
            expected: vec![value.to_string()],
            got: token.value,
            line: token.line,
            column: token.column,
            unit: token.unit.to_string(),
        });
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(text: &str) -> TokenStream {
        TokenStream::new(Scanner::from_str("test.cpp", text))
    }

    #[test]
    fn test_get_skips_whitespace_by_default() {
        let mut s = stream("alpha  beta");
        assert_eq!(s.get(false).unwrap().value, "alpha");
        assert_eq!(s.get(false).unwrap().value, "beta");
        assert!(s.next_token(false).unwrap().is_none());
    }

    #[test]
    fn test_get_with_whitespace() {
        let mut s = stream("a b");
        assert_eq!(s.get(true).unwrap().value, "a");
        assert!(s.get(true).unwrap().is_whitespace());
        assert_eq!(s.get(true).unwrap().value, "b");
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut s = stream("x = 1;");
        assert_eq!(s.peek().unwrap().unwrap().value, "x");
        assert_eq!(s.peek().unwrap().unwrap().value, "x");
        assert_eq!(s.get(false).unwrap().value, "x");
        assert_eq!(s.get(false).unwrap().value, "=");
    }

    #[test]
    fn test_peek_n_lookahead() {
        let mut s = stream("a b c");
        assert_eq!(s.peek_n(3, false).unwrap().unwrap().value, "c");
        assert_eq!(s.get(false).unwrap().value, "a");
        assert_eq!(s.get(false).unwrap().value, "b");
        assert_eq!(s.get(false).unwrap().value, "c");
    }

    #[test]
    fn test_peek_zero_is_none() {
        let mut s = stream("a b");
        assert!(s.peek_n(0, false).unwrap().is_none());
        assert_eq!(s.get(false).unwrap().value, "a");
    }

    #[test]
    fn test_peek_past_end() {
        let mut s = stream("one");
        assert!(s.peek_n(2, false).unwrap().is_none());
        assert_eq!(s.get(false).unwrap().value, "one");
    }

    #[test]
    fn test_discard() {
        let mut s = stream("a b c");
        s.discard(2).unwrap();
        assert_eq!(s.get(false).unwrap().value, "c");
        // Discarding past the end is not an error.
        s.discard(5).unwrap();
    }

    #[test]
    fn test_expect_value_mismatch() {
        let mut s = stream("a");
        let err = s.expect_value("{").unwrap_err();
        assert!(matches!(err, ConfigError::UnexpectedValue { .. }));
    }

    #[test]
    fn test_expect_kinds_sequence() {
        let mut s = stream("name = 1");
        let tokens = s
            .expect_kinds(&[TokenKind::Identifier, TokenKind::Unknown])
            .unwrap();
        assert_eq!(tokens[0].value, "name");
        assert_eq!(tokens[1].value, "=");
    }

    #[test]
    fn test_scanner_stack_pops_on_exhaustion() {
        let dir = tempfile::tempdir().unwrap();
        let inner = dir.path().join("inner.hpp");
        std::fs::write(&inner, "beta").unwrap();

        let mut s = stream("alpha");
        assert_eq!(s.get(false).unwrap().value, "alpha");
        s.push_unit(&inner).unwrap();
        assert_eq!(s.get(false).unwrap().value, "beta");
        assert!(s.next_token(false).unwrap().is_none());
    }
}
