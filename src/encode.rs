// Author: Dustin Pilgrim
// License: MIT

use std::fmt::{self, Write};

use crate::config::{Config, Member, Value};

/// Renders a [`Config`] tree back into source text.
///
/// Only each scope's own members are written; inherited members are
/// represented by the `: parent` clause, so a decode of the output
/// reconstructs the same tree. An indent width of zero produces compact
/// single-line output, still re-parseable.
pub struct Encoder {
    indent: usize,
}

impl Encoder {
    pub fn new(indent: usize) -> Self {
        Encoder { indent }
    }

    pub fn encode_to<W: Write>(&self, config: &Config, out: &mut W) -> fmt::Result {
        self.write_scope(config, out, 0)
    }

    fn write_scope<W: Write>(&self, config: &Config, out: &mut W, level: usize) -> fmt::Result {
        for member in config.members() {
            self.pad(out, level)?;
            match member {
                Member::Property(node) => {
                    if let Value::Array(items) = &node.value {
                        write!(out, "{}[]{}", node.name, self.eq())?;
                        self.write_array(items, out)?;
                        out.write_char(';')?;
                    } else {
                        write!(out, "{}{}", node.name, self.eq())?;
                        self.write_value(&node.value, out)?;
                        out.write_char(';')?;
                    }
                }
                Member::Class(class) => {
                    match class.inherits() {
                        Some(base) if self.indent > 0 => {
                            write!(out, "class {} : {} {{", class.name(), base.name())?
                        }
                        Some(base) => write!(out, "class {}:{}{{", class.name(), base.name())?,
                        None if self.indent > 0 => write!(out, "class {} {{", class.name())?,
                        None => write!(out, "class {}{{", class.name())?,
                    }
                    self.newline(out)?;
                    self.write_scope(&class, out, level + 1)?;
                    self.pad(out, level)?;
                    out.write_str("};")?;
                }
            }
            self.newline(out)?;
        }
        Ok(())
    }

    fn write_array<W: Write>(&self, items: &[Value], out: &mut W) -> fmt::Result {
        out.write_char('{')?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.write_str(self.sep())?;
            }
            self.write_value(item, out)?;
        }
        out.write_char('}')
    }

    fn write_value<W: Write>(&self, value: &Value, out: &mut W) -> fmt::Result {
        match value {
            Value::Bool(true) => out.write_str("true"),
            Value::Bool(false) => out.write_str("false"),
            Value::Int(n) => write!(out, "{}", n),
            Value::Float(n) => write!(out, "{}", n),
            // Interior quotes are doubled, the scanner's escape form.
            Value::String(s) => write!(out, "\"{}\"", s.replace('"', "\"\"")),
            Value::Array(items) => self.write_array(items, out),
        }
    }

    fn eq(&self) -> &'static str {
        if self.indent > 0 { " = " } else { "=" }
    }

    fn sep(&self) -> &'static str {
        if self.indent > 0 { ", " } else { "," }
    }

    fn pad<W: Write>(&self, out: &mut W, level: usize) -> fmt::Result {
        for _ in 0..self.indent * level {
            out.write_char(' ')?;
        }
        Ok(())
    }

    fn newline<W: Write>(&self, out: &mut W) -> fmt::Result {
        if self.indent > 0 {
            out.write_char('\n')?;
        }
        Ok(())
    }
}

/// Encode without pretty-printing: compact, single-line, re-parseable.
pub fn encode(config: &Config) -> String {
    encode_indent(config, 0)
}

/// Encode with an explicit indent width; zero yields compact output.
pub fn encode_indent(config: &Config, indent: usize) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    Encoder::new(indent).encode_to(config, &mut out).unwrap();
    out
}
