use std::collections::HashMap;

use crate::ConfigError;
use crate::scanner::{Token, TokenKind};

/// One `#define`: a named, optionally parameterized textual substitution
/// rule. The body is the raw token run captured when the directive was read,
/// with runs of spaces collapsed to a single space token.
#[derive(Debug, Clone)]
pub struct DefineStatement {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Token>,
}

impl DefineStatement {
    pub fn new(name: String, params: Vec<String>, body: Vec<Token>) -> Self {
        DefineStatement { name, params, body }
    }

    /// Expand one invocation. `site` is the identifier token that triggered
    /// the invocation and is used for error locations.
    ///
    /// Expansion is two-pass: parameters are substituted (applying `##`
    /// pasting and `#param` stringizing against the raw argument runs), then
    /// the substituted sequence is recursively re-expanded against `defined`.
    pub fn invoke(
        &self,
        site: &Token,
        args: &[Vec<Token>],
        defined: &HashMap<String, DefineStatement>,
    ) -> Result<Vec<Token>, ConfigError> {
        if args.len() != self.params.len() {
            return Err(ConfigError::MacroArity {
                name: self.name.clone(),
                expected: self.params.len(),
                got: args.len(),
                line: site.line,
                column: site.column,
                unit: site.unit.to_string(),
            });
        }

        let substituted = self.substitute(args);
        expand_tokens(&substituted, defined)
    }

    /// Pass 1: replace parameter identifiers with their argument token runs
    /// and apply the `##` and `#` operators.
    fn substitute(&self, args: &[Vec<Token>]) -> Vec<Token> {
        let mut out = Vec::new();
        let mut i = 0;

        while i < self.body.len() {
            let token = &self.body[i];
            match token.kind {
                TokenKind::Identifier => {
                    if let Some(rhs) = self.paste_operand(i) {
                        let value =
                            self.operand_text(token, args) + &self.operand_text(&self.body[rhs], args);
                        out.push(Token {
                            kind: TokenKind::Identifier,
                            value,
                            line: token.line,
                            column: token.column,
                            unit: token.unit.clone(),
                        });
                        i = rhs + 1;
                        continue;
                    }
                    match self.params.iter().position(|p| p == &token.value) {
                        Some(p) => out.extend(args[p].iter().cloned()),
                        None => out.push(token.clone()),
                    }
                    i += 1;
                }
                TokenKind::Unknown if token.value == "#" => {
                    if let Some((next, p)) = self.stringize_operand(i) {
                        out.push(Token {
                            kind: TokenKind::String,
                            value: format!("\"{}\"", token_text(&args[p])),
                            line: token.line,
                            column: token.column,
                            unit: token.unit.clone(),
                        });
                        i = next + 1;
                        continue;
                    }
                    out.push(token.clone());
                    i += 1;
                }
                _ => {
                    out.push(token.clone());
                    i += 1;
                }
            }
        }

        out
    }

    /// If the body reads `identifier ## identifier` at `i`, return the index
    /// of the right-hand identifier.
    fn paste_operand(&self, i: usize) -> Option<usize> {
        let mut j = i + 1;
        while self.body.get(j).is_some_and(Token::is_whitespace) {
            j += 1;
        }
        if !(self.body.get(j)?.is_value("#") && self.body.get(j + 1)?.is_value("#")) {
            return None;
        }
        let mut k = j + 2;
        while self.body.get(k).is_some_and(Token::is_whitespace) {
            k += 1;
        }
        (self.body.get(k)?.kind == TokenKind::Identifier).then_some(k)
    }

    /// If the body reads `# paramName` at `i`, return the parameter's index
    /// and the position of the parameter identifier.
    fn stringize_operand(&self, i: usize) -> Option<(usize, usize)> {
        let mut j = i + 1;
        while self.body.get(j).is_some_and(Token::is_whitespace) {
            j += 1;
        }
        let token = self.body.get(j)?;
        if token.kind != TokenKind::Identifier {
            return None;
        }
        self.params
            .iter()
            .position(|p| p == &token.value)
            .map(|p| (j, p))
    }

    fn operand_text(&self, token: &Token, args: &[Vec<Token>]) -> String {
        match self.params.iter().position(|p| p == &token.value) {
            Some(p) => token_text(&args[p]),
            None => token.value.clone(),
        }
    }
}

/// The literal text of an argument token run.
pub(crate) fn token_text(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.value.as_str()).collect()
}

/// Pass 2: walk a token sequence and expand every macro invocation found in
/// it, recursively. Parameterized invocations pull their arguments from the
/// same sequence.
pub(crate) fn expand_tokens(
    tokens: &[Token],
    defined: &HashMap<String, DefineStatement>,
) -> Result<Vec<Token>, ConfigError> {
    let mut out = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        if token.kind == TokenKind::Identifier {
            if let Some(stmt) = defined.get(&token.value) {
                if stmt.params.is_empty() {
                    out.extend(stmt.invoke(token, &[], defined)?);
                    i += 1;
                    continue;
                }

                let mut j = i + 1;
                while tokens.get(j).is_some_and(Token::is_whitespace) {
                    j += 1;
                }
                if tokens.get(j).is_some_and(|t| t.is_value("(")) {
                    let mut cursor = j + 1;
                    let args = collect_args_slice(tokens, &mut cursor, token)?;
                    out.extend(stmt.invoke(token, &args, defined)?);
                    i = cursor;
                    continue;
                }

                return Err(ConfigError::MacroArity {
                    name: stmt.name.clone(),
                    expected: stmt.params.len(),
                    got: 0,
                    line: token.line,
                    column: token.column,
                    unit: token.unit.to_string(),
                });
            }
        }
        out.push(token.clone());
        i += 1;
    }

    Ok(out)
}

/// Split comma-separated argument runs out of `tokens`, starting just after
/// the opening `(` and consuming through the matching `)`. Nested `(...)`
/// counts toward balancing, not as a separator.
fn collect_args_slice(
    tokens: &[Token],
    cursor: &mut usize,
    site: &Token,
) -> Result<Vec<Vec<Token>>, ConfigError> {
    let mut args = Vec::new();
    let mut current = Vec::new();
    let mut depth = 1usize;

    loop {
        let token = tokens.get(*cursor).ok_or_else(|| ConfigError::UnexpectedEof {
            expected: format!("')' closing arguments of macro '{}'", site.value),
            unit: site.unit.to_string(),
        })?;
        *cursor += 1;

        if token.is_value("(") {
            depth += 1;
            current.push(token.clone());
        } else if token.is_value(")") {
            depth -= 1;
            if depth == 0 {
                args.push(trim_ws(current));
                return Ok(args);
            }
            current.push(token.clone());
        } else if token.is_value(",") && depth == 1 {
            args.push(trim_ws(std::mem::take(&mut current)));
        } else {
            current.push(token.clone());
        }
    }
}

/// Drop leading and trailing whitespace tokens from an argument run.
pub(crate) fn trim_ws(mut tokens: Vec<Token>) -> Vec<Token> {
    while tokens.first().is_some_and(Token::is_whitespace) {
        tokens.remove(0);
    }
    while tokens.last().is_some_and(Token::is_whitespace) {
        tokens.pop();
    }
    tokens
}
