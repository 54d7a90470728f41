// Author: Dustin Pilgrim
// License: MIT

use std::cell::RefCell;
use std::fmt;
use std::path::Path;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use crate::ConfigError;
use crate::ast::{Node, RawValue};
use crate::parser::Parser;
use crate::scanner::Scanner;

mod access;

/// A decoded leaf value. Scalars are typed by a single coercion rule; arrays
/// nest to arbitrary depth.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
}

/// A named property inside a [`Config`] scope.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueNode {
    pub name: String,
    pub value: Value,
}

/// One member of a scope: either a property or a nested class.
#[derive(Debug, Clone)]
pub enum Member {
    Property(ValueNode),
    Class(Config),
}

impl Member {
    /// Original-case name, as written in the source.
    pub fn name(&self) -> String {
        match self {
            Member::Property(node) => node.name.clone(),
            Member::Class(config) => config.name(),
        }
    }
}

impl PartialEq for Member {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Member::Property(a), Member::Property(b)) => a == b,
            (Member::Class(a), Member::Class(b)) => a == b,
            _ => false,
        }
    }
}

pub(crate) struct ConfigInner {
    name: String,
    inherits: Weak<RefCell<ConfigInner>>,
    parent: Weak<RefCell<ConfigInner>>,
    // Keyed by the lowercased name; the member itself keeps the
    // original-case name for display and encode.
    members: IndexMap<String, Member>,
}

/// An inheritance-aware, ordered, case-insensitive tree of config values.
///
/// A `Config` is a cheap handle onto a shared scope: cloning it clones the
/// handle, not the tree. Lookup checks the local mapping first, then walks
/// the `inherits` chain; the lexical parent is used only to resolve
/// inheritance by name during decode, never for value lookup.
#[derive(Clone)]
pub struct Config {
    inner: Rc<RefCell<ConfigInner>>,
}

impl Config {
    /// A fresh root scope, named after its unit.
    pub fn new(name: &str) -> Self {
        Config {
            inner: Rc::new(RefCell::new(ConfigInner {
                name: name.to_string(),
                inherits: Weak::new(),
                parent: Weak::new(),
                members: IndexMap::new(),
            })),
        }
    }

    fn new_child(name: &str, parent: &Config, inherits: Option<&Config>) -> Self {
        Config {
            inner: Rc::new(RefCell::new(ConfigInner {
                name: name.to_string(),
                inherits: inherits.map(|c| Rc::downgrade(&c.inner)).unwrap_or_default(),
                parent: Rc::downgrade(&parent.inner),
                members: IndexMap::new(),
            })),
        }
    }

    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    /// The ancestor this scope inherits values from, if any.
    pub fn inherits(&self) -> Option<Config> {
        self.inner.borrow().inherits.upgrade().map(|inner| Config { inner })
    }

    /// The lexically enclosing scope, if any.
    pub fn parent(&self) -> Option<Config> {
        self.inner.borrow().parent.upgrade().map(|inner| Config { inner })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Config")
            .field("name", &inner.name)
            .field("inherits", &inner.inherits.upgrade().map(|i| i.borrow().name.clone()))
            .field("members", &inner.members.values().collect::<Vec<_>>())
            .finish()
    }
}

/// Structural equality: ordered member names, member values and the
/// inherits-target name. The scope's own name is not compared, so a decoded
/// round-trip equals its source tree even though roots are named after
/// different units.
impl PartialEq for Config {
    fn eq(&self, other: &Self) -> bool {
        if self.inherits().map(|c| c.name()) != other.inherits().map(|c| c.name()) {
            return false;
        }
        let a = self.inner.borrow();
        let b = other.inner.borrow();
        a.members.len() == b.members.len()
            && a.members
                .iter()
                .zip(b.members.iter())
                .all(|((ka, va), (kb, vb))| ka == kb && va == vb)
    }
}

/// Decode one unit on disk into a [`Config`] tree.
pub fn decode<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    decode_scanner(Scanner::from_file(path)?, &name)
}

/// Decode an in-memory unit. `name` becomes the root scope's name.
pub fn decode_str(name: &str, text: &str) -> Result<Config, ConfigError> {
    decode_scanner(Scanner::from_str(name, text), name)
}

fn decode_scanner(scanner: Scanner, name: &str) -> Result<Config, ConfigError> {
    debug!("decoding unit {}", name);
    let nodes = Parser::from_scanner(scanner).parse()?;
    let root = Config::new(name);
    decode_nodes(&root, &nodes)?;
    debug!("decoded unit {} ({} top-level members)", name, root.len());
    Ok(root)
}

fn decode_nodes(scope: &Config, nodes: &[Node]) -> Result<(), ConfigError> {
    for node in nodes {
        match node {
            Node::Class(class) => {
                let inherits = match &class.inherits {
                    Some(parent_name) => Some(scope.find_class(parent_name).ok_or_else(|| {
                        ConfigError::UnresolvedInheritance {
                            name: parent_name.clone(),
                            scope: scope.name(),
                        }
                    })?),
                    None => None,
                };
                let child = Config::new_child(&class.name, scope, inherits.as_ref());
                scope.add(Member::Class(child.clone()))?;
                decode_nodes(&child, &class.members)?;
            }
            Node::Property(property) => {
                scope.add(Member::Property(ValueNode {
                    name: property.name.clone(),
                    value: clean_value(&property.value),
                }))?;
            }
        }
    }
    Ok(())
}

/// Coerce a raw parsed value into a typed one.
///
/// Arrays are cleaned recursively, dropping purely-whitespace string
/// elements. Scalars try, in order: the bool literals, quoted-string
/// stripping, numeric parse (collapsing to an integer when exactly
/// integral), and finally the trimmed text itself.
fn clean_value(raw: &RawValue) -> Value {
    match raw {
        RawValue::Array(items) => Value::Array(
            items
                .iter()
                .filter(|item| match item {
                    RawValue::Scalar(s) => !s.trim().is_empty(),
                    RawValue::Array(_) => true,
                })
                .map(clean_value)
                .collect(),
        ),
        RawValue::Scalar(text) => {
            let trimmed = text.trim();
            match trimmed {
                "true" => return Value::Bool(true),
                "false" => return Value::Bool(false),
                _ => {}
            }
            if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
                return Value::String(trimmed[1..trimmed.len() - 1].to_string());
            }
            if let Ok(number) = trimmed.parse::<f64>() {
                if number.fract() == 0.0 && number.abs() <= i64::MAX as f64 {
                    return Value::Int(number as i64);
                }
                return Value::Float(number);
            }
            Value::String(trimmed.to_string())
        }
    }
}
