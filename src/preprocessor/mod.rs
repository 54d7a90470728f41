use std::collections::{HashMap, VecDeque};
use std::path::Path;

use log::debug;

use crate::ConfigError;
use crate::scanner::{Scanner, Token, TokenKind};
use crate::stream::{TokenStream, check_kind, check_value};

mod define;

pub use define::DefineStatement;

/// Consumes a [`TokenStream`] and yields a fully preprocessed token
/// sequence: `#define`/`#undef`/`#include`/`#ifdef`/`#ifndef`/`#else`/
/// `#endif` are resolved and macro invocations found among ordinary
/// identifiers are expanded.
///
/// The macro table is scoped to one `Preprocessor` instance; nothing is
/// shared across decode invocations. Callers pull tokens through the same
/// `get`/`peek`/`expect` surface the raw stream offers.
pub struct Preprocessor {
    stream: TokenStream,
    defined: HashMap<String, DefineStatement>,
    out: VecDeque<Token>,
}

impl Preprocessor {
    pub fn new(stream: TokenStream) -> Self {
        Preprocessor {
            stream,
            defined: HashMap::new(),
            out: VecDeque::new(),
        }
    }

    pub fn from_scanner(scanner: Scanner) -> Self {
        Self::new(TokenStream::new(scanner))
    }

    pub fn from_unit<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Ok(Self::new(TokenStream::from_unit(path)?))
    }

    pub fn unit(&self) -> String {
        self.stream.unit().to_string()
    }

    /// Pull the next preprocessed token. Whitespace tokens (surviving from
    /// macro bodies) are skipped unless `include_ws` is set.
    pub fn next_token(&mut self, include_ws: bool) -> Result<Option<Token>, ConfigError> {
        loop {
            if let Some(token) = self.out.pop_front() {
                if !include_ws && token.is_whitespace() {
                    continue;
                }
                return Ok(Some(token));
            }
            match self.stream.next_token(false)? {
                Some(token) => self.preprocess(token)?,
                None => return Ok(None),
            }
        }
    }

    pub fn get(&mut self, include_ws: bool) -> Result<Token, ConfigError> {
        self.next_token(include_ws)?.ok_or_else(|| ConfigError::UnexpectedEof {
            expected: "a token".into(),
            unit: self.unit(),
        })
    }

    pub fn peek(&mut self) -> Result<Option<&Token>, ConfigError> {
        let mut taken = Vec::new();
        while taken.is_empty() {
            match self.out.pop_front() {
                Some(t) if t.is_whitespace() => continue,
                Some(t) => taken.push(t),
                None => match self.stream.next_token(false)? {
                    Some(token) => self.preprocess(token)?,
                    None => break,
                },
            }
        }
        let got = !taken.is_empty();
        for t in taken.into_iter().rev() {
            self.out.push_front(t);
        }
        if got { Ok(self.out.front()) } else { Ok(None) }
    }

    pub fn expect_kind(&mut self, kind: TokenKind) -> Result<Token, ConfigError> {
        let token = self.get(false)?;
        check_kind(token, kind)
    }

    pub fn expect_value(&mut self, value: &str) -> Result<Token, ConfigError> {
        let token = self.get(false)?;
        check_value(token, value)
    }

    pub fn expect_values(&mut self, values: &[&str]) -> Result<Vec<Token>, ConfigError> {
        values.iter().map(|&v| self.expect_value(v)).collect()
    }

    /// Handle one raw token, appending its preprocessed form to the output
    /// queue.
    fn preprocess(&mut self, token: Token) -> Result<(), ConfigError> {
        match token.kind {
            TokenKind::Prepro => self.directive(&token),
            TokenKind::Identifier if self.defined.contains_key(&token.value) => {
                let expanded = self.expand_invocation(&token)?;
                self.out.extend(expanded);
                Ok(())
            }
            _ => {
                self.out.push_back(token);
                Ok(())
            }
        }
    }

    fn directive(&mut self, prepro: &Token) -> Result<(), ConfigError> {
        let command = self.stream.expect_kind(TokenKind::Identifier)?;
        match command.value.as_str() {
            "define" => self.handle_define(),
            "undef" => {
                let name = self.stream.expect_kind(TokenKind::Identifier)?;
                if self.defined.remove(&name.value).is_some() {
                    debug!("undefined macro {}", name.value);
                }
                Ok(())
            }
            "include" => self.handle_include(),
            "ifdef" => self.handle_conditional(false),
            "ifndef" => self.handle_conditional(true),
            "else" | "endif" => Err(ConfigError::UnbalancedConditional {
                message: format!("#{} without a matching #ifdef/#ifndef", command.value),
                line: command.line,
                column: command.column,
                unit: command.unit.to_string(),
            }),
            other => Err(ConfigError::UnexpectedValue {
                expected: vec![
                    "define".into(),
                    "undef".into(),
                    "include".into(),
                    "ifdef".into(),
                    "ifndef".into(),
                ],
                got: other.to_string(),
                line: prepro.line,
                column: prepro.column,
                unit: prepro.unit.to_string(),
            }),
        }
    }

    fn handle_define(&mut self) -> Result<(), ConfigError> {
        let name = self.stream.expect_kind(TokenKind::Identifier)?;

        let mut params = Vec::new();
        // The parameter list only counts when the '(' immediately follows
        // the name; `#define FOO (x)` is an object-like macro with a
        // parenthesized body.
        if self.stream.peek_n(1, true)?.is_some_and(|t| t.is_value("(")) {
            self.stream.discard(1)?;
            self.parse_params(&mut params)?;
        }

        let body = self.capture_body()?;
        debug!("defined macro {} ({} params, {} body tokens)", name.value, params.len(), body.len());
        self.defined
            .insert(name.value.clone(), DefineStatement::new(name.value, params, body));
        Ok(())
    }

    fn parse_params(&mut self, params: &mut Vec<String>) -> Result<(), ConfigError> {
        loop {
            let token = self.stream.get(false)?;
            match token.kind {
                TokenKind::Identifier => {
                    params.push(token.value);
                    match self.stream.peek()? {
                        Some(t) if t.is_value(",") => {
                            self.stream.discard(1)?;
                        }
                        Some(t) if t.is_value(")") => {}
                        Some(t) => {
                            return Err(ConfigError::UnexpectedValue {
                                expected: vec![",".into(), ")".into()],
                                got: t.value.clone(),
                                line: t.line,
                                column: t.column,
                                unit: t.unit.to_string(),
                            });
                        }
                        None => {
                            return Err(ConfigError::UnexpectedEof {
                                expected: "',' or ')'".into(),
                                unit: self.unit(),
                            });
                        }
                    }
                }
                TokenKind::Unknown if token.value == ")" => return Ok(()),
                _ => {
                    return Err(ConfigError::UnexpectedType {
                        expected: vec![TokenKind::Identifier, TokenKind::Unknown],
                        got: token.kind,
                        value: token.value,
                        line: token.line,
                        column: token.column,
                        unit: token.unit.to_string(),
                    });
                }
            }
        }
    }

    /// Capture the raw macro body up to an unescaped newline. Runs of spaces
    /// collapse to a single space token, tabs are kept, and a `\` right
    /// before a newline continues the body on the next line.
    fn capture_body(&mut self) -> Result<Vec<Token>, ConfigError> {
        let mut body: Vec<Token> = Vec::new();
        loop {
            let token = match self.stream.next_token(true)? {
                Some(t) => t,
                None => break,
            };
            if token.is_value("\\") {
                if self.stream.peek_n(1, true)?.is_some_and(|t| t.is_value("\n")) {
                    self.stream.next_token(true)?;
                    continue;
                }
                body.push(token);
                continue;
            }
            if token.is_value("\n") {
                break;
            }
            if token.is_value("\r") {
                continue;
            }
            if token.is_value(" ") {
                if body.last().is_some_and(|t| t.is_value(" ")) {
                    continue;
                }
                body.push(token);
                continue;
            }
            body.push(token);
        }
        Ok(define::trim_ws(body))
    }

    fn handle_include(&mut self) -> Result<(), ConfigError> {
        let token = self.stream.get(false)?;
        let raw = match token.kind {
            TokenKind::String => token
                .value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(&token.value)
                .to_string(),
            TokenKind::ArrowString => token.value.clone(),
            _ => {
                return Err(ConfigError::UnexpectedType {
                    expected: vec![TokenKind::String, TokenKind::ArrowString],
                    got: token.kind,
                    value: token.value,
                    line: token.line,
                    column: token.column,
                    unit: token.unit.to_string(),
                });
            }
        };

        let mut resolved = self.stream.current_dir();
        for component in raw.split('\\') {
            if component == "." || component == ".." {
                return Err(ConfigError::IncludeResolution {
                    path: raw.clone(),
                    message: "path must not contain '.' or '..' as a segment".into(),
                    line: token.line,
                    column: token.column,
                    unit: token.unit.to_string(),
                });
            }
            resolved.push(component);
        }

        debug!("including {}", resolved.display());
        self.stream.push_unit(&resolved).map_err(|e| {
            let message = match e {
                ConfigError::File { message, .. } => message,
                other => other.to_string(),
            };
            ConfigError::IncludeResolution {
                path: raw.clone(),
                message,
                line: token.line,
                column: token.column,
                unit: token.unit.to_string(),
            }
        })
    }

    /// `#ifdef` / `#ifndef`: stream tokens (recursively re-preprocessed)
    /// only while the branch is active. `#else` flips the flag exactly once;
    /// a second `#else` or a missing `#endif` is an error.
    fn handle_conditional(&mut self, negate: bool) -> Result<(), ConfigError> {
        let name = self.stream.expect_kind(TokenKind::Identifier)?;
        let mut active = self.defined.contains_key(&name.value) != negate;
        let mut seen_else = false;

        loop {
            let token = match self.stream.next_token(false)? {
                Some(t) => t,
                None => {
                    return Err(ConfigError::UnbalancedConditional {
                        message: "missing #endif at end of input".into(),
                        line: name.line,
                        column: name.column,
                        unit: name.unit.to_string(),
                    });
                }
            };

            if token.kind == TokenKind::Prepro {
                match self.peek_directive()? {
                    Some(directive) if directive == "endif" => {
                        self.stream.discard(1)?;
                        return Ok(());
                    }
                    Some(directive) if directive == "else" => {
                        let else_tok = self.stream.get(false)?;
                        if seen_else {
                            return Err(ConfigError::UnbalancedConditional {
                                message: "second #else in one conditional".into(),
                                line: else_tok.line,
                                column: else_tok.column,
                                unit: else_tok.unit.to_string(),
                            });
                        }
                        seen_else = true;
                        active = !active;
                        continue;
                    }
                    Some(directive) if !active && (directive == "ifdef" || directive == "ifndef") => {
                        // Skip the nested conditional structurally so its
                        // #else/#endif cannot match ours.
                        self.stream.discard(1)?;
                        self.skip_conditional(&token)?;
                        continue;
                    }
                    _ => {
                        if active {
                            self.preprocess(token)?;
                        }
                        continue;
                    }
                }
            }

            if active {
                self.preprocess(token)?;
            }
        }
    }

    /// Consume tokens of an inactive nested conditional up to its matching
    /// `#endif`, counting further nested conditionals.
    fn skip_conditional(&mut self, opener: &Token) -> Result<(), ConfigError> {
        let mut depth = 1usize;
        loop {
            let token = match self.stream.next_token(false)? {
                Some(t) => t,
                None => {
                    return Err(ConfigError::UnbalancedConditional {
                        message: "missing #endif at end of input".into(),
                        line: opener.line,
                        column: opener.column,
                        unit: opener.unit.to_string(),
                    });
                }
            };
            if token.kind != TokenKind::Prepro {
                continue;
            }
            match self.peek_directive()? {
                Some(directive) if directive == "ifdef" || directive == "ifndef" => {
                    self.stream.discard(1)?;
                    depth += 1;
                }
                Some(directive) if directive == "endif" => {
                    self.stream.discard(1)?;
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
    }

    fn peek_directive(&mut self) -> Result<Option<String>, ConfigError> {
        Ok(self
            .stream
            .peek()?
            .filter(|t| t.kind == TokenKind::Identifier)
            .map(|t| t.value.clone()))
    }

    /// Expand a macro invocation whose arguments (if any) come from the raw
    /// stream.
    fn expand_invocation(&mut self, site: &Token) -> Result<Vec<Token>, ConfigError> {
        let stmt = match self.defined.get(&site.value) {
            Some(s) => s.clone(),
            None => return Ok(vec![site.clone()]),
        };

        if stmt.params.is_empty() {
            return stmt.invoke(site, &[], &self.defined);
        }

        if !self.stream.peek()?.is_some_and(|t| t.is_value("(")) {
            return Err(ConfigError::MacroArity {
                name: stmt.name.clone(),
                expected: stmt.params.len(),
                got: 0,
                line: site.line,
                column: site.column,
                unit: site.unit.to_string(),
            });
        }
        self.stream.discard(1)?;

        let args = self.collect_args(site)?;
        stmt.invoke(site, &args, &self.defined)
    }

    /// Collect comma-separated argument runs from the stream, balancing
    /// nested `(...)`. Runs keep their interior whitespace so stringizing
    /// sees the literal argument text.
    fn collect_args(&mut self, site: &Token) -> Result<Vec<Vec<Token>>, ConfigError> {
        let mut args = Vec::new();
        let mut current: Vec<Token> = Vec::new();
        let mut depth = 1usize;

        loop {
            let token = self.stream.next_token(true)?.ok_or_else(|| ConfigError::UnexpectedEof {
                expected: format!("')' closing arguments of macro '{}'", site.value),
                unit: self.unit(),
            })?;

            if token.is_value("(") {
                depth += 1;
                current.push(token);
            } else if token.is_value(")") {
                depth -= 1;
                if depth == 0 {
                    args.push(define::trim_ws(current));
                    return Ok(args);
                }
                current.push(token);
            } else if token.is_value(",") && depth == 1 {
                args.push(define::trim_ws(std::mem::take(&mut current)));
            } else {
                current.push(token);
            }
        }
    }
}

#[cfg(test)]
mod tests;
