use std::path::Path;

use crate::ConfigError;
use crate::ast::{ClassNode, Node, PropertyNode, RawValue};
use crate::preprocessor::Preprocessor;
use crate::scanner::{Scanner, Token, TokenKind};

/// Recursive-descent consumer of the preprocessed token sequence.
///
/// ```text
/// unit         := statement*
/// statement    := classDecl | propertyDecl | ';'
/// classDecl    := 'class' IDENT (':' IDENT)? '{' statement* '}' ';'
/// propertyDecl := IDENT ('[' ']')? '=' value ';'
/// ```
pub struct Parser {
    stream: Preprocessor,
}

impl Parser {
    pub fn new(stream: Preprocessor) -> Self {
        Parser { stream }
    }

    pub fn from_scanner(scanner: Scanner) -> Self {
        Self::new(Preprocessor::from_scanner(scanner))
    }

    pub fn from_unit<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Ok(Self::new(Preprocessor::from_unit(path)?))
    }

    /// Parse the whole unit. End of input terminates the top level cleanly.
    pub fn parse(&mut self) -> Result<Vec<Node>, ConfigError> {
        let mut nodes = Vec::new();
        while let Some(token) = self.stream.next_token(false)? {
            if let Some(node) = self.parse_statement(token)? {
                nodes.push(node);
            }
        }
        Ok(nodes)
    }

    /// One statement, given its first token. Stray `;` yields `None`.
    fn parse_statement(&mut self, token: Token) -> Result<Option<Node>, ConfigError> {
        match token.kind {
            TokenKind::Identifier if token.value == "class" => {
                Ok(Some(Node::Class(self.parse_class()?)))
            }
            TokenKind::Identifier => Ok(Some(Node::Property(self.parse_property(token)?))),
            TokenKind::Unknown if token.value == ";" => Ok(None),
            _ => Err(ConfigError::UnexpectedType {
                expected: vec![TokenKind::Identifier],
                got: token.kind,
                value: token.value,
                line: token.line,
                column: token.column,
                unit: token.unit.to_string(),
            }),
        }
    }

    fn parse_class(&mut self) -> Result<ClassNode, ConfigError> {
        let name = self.stream.expect_kind(TokenKind::Identifier)?;
        let token = self.stream.expect_kind(TokenKind::Unknown)?;

        let (inherits, opener) = if token.value == ":" {
            let parent = self.stream.expect_kind(TokenKind::Identifier)?;
            let opener = self.stream.expect_kind(TokenKind::Unknown)?;
            (Some(parent.value), opener)
        } else {
            (None, token)
        };

        if opener.value != "{" {
            return Err(ConfigError::UnexpectedValue {
                expected: vec!["{".into()],
                got: opener.value,
                line: opener.line,
                column: opener.column,
                unit: opener.unit.to_string(),
            });
        }

        let mut members = Vec::new();
        loop {
            let token = self.stream.get(false)?;
            if token.is_value("}") {
                break;
            }
            if let Some(node) = self.parse_statement(token)? {
                members.push(node);
            }
        }
        self.stream.expect_value(";")?;

        Ok(ClassNode {
            name: name.value,
            inherits,
            members,
        })
    }

    fn parse_property(&mut self, name: Token) -> Result<PropertyNode, ConfigError> {
        let token = self.stream.expect_kind(TokenKind::Unknown)?;

        if token.value == "[" {
            self.stream.expect_values(&["]", "=", "{"])?;
            let items = self.parse_array_items()?;
            self.stream.expect_value(";")?;
            return Ok(PropertyNode {
                name: name.value,
                is_array: true,
                value: RawValue::Array(items),
            });
        }

        if token.value != "=" {
            return Err(ConfigError::UnexpectedValue {
                expected: vec!["[".into(), "=".into()],
                got: token.value,
                line: token.line,
                column: token.column,
                unit: token.unit.to_string(),
            });
        }

        let (text, _) = self.scalar_run(&[";"])?;
        Ok(PropertyNode {
            name: name.value,
            is_array: false,
            value: RawValue::Scalar(text),
        })
    }

    /// Array body after its opening `{`. Elements are scalar runs or nested
    /// arrays; `,` separates, `}` closes.
    fn parse_array_items(&mut self) -> Result<Vec<RawValue>, ConfigError> {
        let mut items = Vec::new();
        loop {
            let (close, open) = match self.stream.peek()? {
                Some(t) => (t.is_value("}"), t.is_value("{")),
                None => {
                    return Err(ConfigError::UnexpectedEof {
                        expected: "'}' closing array".into(),
                        unit: self.stream.unit(),
                    });
                }
            };

            if close {
                self.stream.get(false)?;
                return Ok(items);
            }

            if open {
                self.stream.get(false)?;
                items.push(RawValue::Array(self.parse_array_items()?));
                let sep = self.stream.get(false)?;
                if sep.is_value("}") {
                    return Ok(items);
                }
                if !sep.is_value(",") {
                    return Err(ConfigError::UnexpectedValue {
                        expected: vec![",".into(), "}".into()],
                        got: sep.value,
                        line: sep.line,
                        column: sep.column,
                        unit: sep.unit.to_string(),
                    });
                }
                continue;
            }

            let (text, terminator) = self.scalar_run(&[",", "}"])?;
            items.push(RawValue::Scalar(text));
            if terminator.is_value("}") {
                return Ok(items);
            }
        }
    }

    /// The raw concatenation of token values up to the first single-character
    /// `Unknown` token matching one of `terminators`. Quoted substrings are
    /// whole tokens and cannot terminate the run early.
    fn scalar_run(&mut self, terminators: &[&str]) -> Result<(String, Token), ConfigError> {
        let mut text = String::new();
        loop {
            let token = match self.stream.next_token(true)? {
                Some(t) => t,
                None => {
                    return Err(ConfigError::UnexpectedEof {
                        expected: format!("one of {:?}", terminators),
                        unit: self.stream.unit(),
                    });
                }
            };
            if token.kind == TokenKind::Unknown && terminators.contains(&token.value.as_str()) {
                return Ok((text, token));
            }
            text.push_str(&token.value);
        }
    }
}

#[cfg(test)]
mod tests;
