use super::*;

fn peek(scanner: &Scanner) -> Option<char> {
    scanner.chars.get(scanner.pos).copied()
}

/// Advance by one character and update line/column tracking.
fn bump(scanner: &mut Scanner) -> Option<char> {
    let c = scanner.chars.get(scanner.pos).copied()?;
    scanner.pos += 1;
    if c == '\n' {
        scanner.line += 1;
        scanner.column = 1;
    } else {
        scanner.column += 1;
    }
    Some(c)
}

/// True when nothing but whitespace precedes `idx` on its line.
fn line_blank_before(scanner: &Scanner, idx: usize) -> bool {
    scanner.chars[..idx]
        .iter()
        .rev()
        .take_while(|&&c| c != '\n')
        .all(|c| c.is_whitespace())
}

fn is_identifier_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

fn make_token(scanner: &Scanner, kind: TokenKind, value: String, line: usize, column: usize) -> Token {
    Token {
        kind,
        value,
        line,
        column,
        unit: scanner.unit(),
    }
}

pub(super) fn next_token(scanner: &mut Scanner) -> Result<Option<Token>, ConfigError> {
    loop {
        let line = scanner.line;
        let column = scanner.column;
        let start = scanner.pos;

        let c = match bump(scanner) {
            Some(c) => c,
            None => return Ok(None),
        };

        match c {
            '/' if peek(scanner) == Some('/') => {
                while let Some(ch) = bump(scanner) {
                    if ch == '\n' {
                        break;
                    }
                }
            }
            '/' if peek(scanner) == Some('*') => {
                bump(scanner);
                skip_block_comment(scanner, line, column)?;
            }
            '#' if line_blank_before(scanner, start) => {
                return Ok(Some(make_token(scanner, TokenKind::Prepro, String::new(), line, column)));
            }
            '"' => {
                let value = scan_string(scanner, line, column)?;
                return Ok(Some(make_token(scanner, TokenKind::String, value, line, column)));
            }
            '<' => {
                let value = scan_arrow_string(scanner, line, column)?;
                return Ok(Some(make_token(scanner, TokenKind::ArrowString, value, line, column)));
            }
            c if c == '_' || c.is_ascii_alphabetic() => {
                let mut ident = String::new();
                ident.push(c);
                while let Some(ch) = peek(scanner) {
                    if is_identifier_char(ch) {
                        ident.push(ch);
                        bump(scanner);
                    } else {
                        break;
                    }
                }
                return Ok(Some(make_token(scanner, TokenKind::Identifier, ident, line, column)));
            }
            c => {
                return Ok(Some(make_token(scanner, TokenKind::Unknown, c.to_string(), line, column)));
            }
        }
    }
}

fn skip_block_comment(scanner: &mut Scanner, line: usize, column: usize) -> Result<(), ConfigError> {
    loop {
        match bump(scanner) {
            Some('*') if peek(scanner) == Some('/') => {
                bump(scanner);
                return Ok(());
            }
            Some(_) => {}
            None => {
                return Err(ConfigError::Lexical {
                    message: "unterminated block comment".into(),
                    line,
                    column,
                    unit: scanner.unit.to_string(),
                });
            }
        }
    }
}

/// Consume a string literal after the opening `"`. A doubled `""` escapes a
/// literal quote and is collapsed; the returned value keeps the surrounding
/// quotes.
fn scan_string(scanner: &mut Scanner, line: usize, column: usize) -> Result<String, ConfigError> {
    let mut value = String::from("\"");
    loop {
        match bump(scanner) {
            Some('"') => {
                if peek(scanner) == Some('"') {
                    bump(scanner);
                    value.push('"');
                } else {
                    value.push('"');
                    return Ok(value);
                }
            }
            Some(ch) => value.push(ch),
            None => {
                return Err(ConfigError::Lexical {
                    message: "unterminated string literal".into(),
                    line,
                    column,
                    unit: scanner.unit.to_string(),
                });
            }
        }
    }
}

/// Consume an arrow-string after the opening `<`, verbatim up to `>`. The
/// delimiters are not part of the value.
fn scan_arrow_string(scanner: &mut Scanner, line: usize, column: usize) -> Result<String, ConfigError> {
    let mut value = String::new();
    loop {
        match bump(scanner) {
            Some('>') => return Ok(value),
            Some(ch) => value.push(ch),
            None => {
                return Err(ConfigError::Lexical {
                    message: "unterminated arrow-string".into(),
                    line,
                    column,
                    unit: scanner.unit.to_string(),
                });
            }
        }
    }
}
