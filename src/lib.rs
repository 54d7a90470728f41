// Author: Dustin Pilgrim
// License: MIT

//! Reader and writer for class-based game config files with C-preprocessor
//! directives.
//!
//! [`decode`] turns a file into a [`Config`] tree: scanning, preprocessing
//! (`#define`, `#include`, conditionals), parsing and value coercion in one
//! call. [`encode`] renders a tree back into source text, and
//! [`export::to_json`] gives a JSON view.
//!
//! ```no_run
//! let config = arma_config::decode("config.cpp")?;
//! if let Some(value) = config.get_value("version") {
//!     println!("version = {:?}", value);
//! }
//! # Ok::<(), arma_config::ConfigError>(())
//! ```

pub mod ast;
pub mod config;
pub mod encode;
pub mod error;
pub mod export;
pub mod parser;
pub mod preprocessor;
pub mod scanner;
pub mod stream;

pub use config::{Config, Member, Value, ValueNode, decode, decode_str};
pub use encode::{Encoder, encode, encode_indent};
pub use error::ConfigError;
pub use export::to_json;
pub use scanner::{Scanner, Token, TokenKind};
