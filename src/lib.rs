//! bb — a parser for a compact, pictographic data-entry notation.
//!
//! A bb document mixes free-form tokens (numbers, quoted strings, booleans,
//! nulls) with *typed quantities*: short pictographic units, optionally led
//! by a quantity and followed by a value and chained `modifier value` pairs.
//! Unit grammars are declared inline and grow as the document is read:
//!
//! ```text
//! ∆ = { unit: pizza, +: topping, >: comment }
//! 2∆+"mushroom"+"extra cheese">"eat in"
//! ```
//!
//! # Quick Start
//!
//! ```
//! let row = bb::parse("∆ = {+:f} ∆+3+\"b\"");
//! assert_eq!(
//!     serde_json::to_string(&row).unwrap(),
//!     r#"[{"f":[3,"b"]}]"#
//! );
//! ```
//!
//! The crate is organised around a single linear pipeline:
//!
//! - [`Lexer`] — the state-machine tokenizer, including the inline
//!   definition lexer and the typed-quantity sub-scanners;
//! - [`TypeRegistry`] / [`Udt`] — the per-parse unit dictionary, built-in
//!   catalogues included;
//! - [`parse`] / [`parse_injection`] — the data emitters, producing a
//!   [`Row`] of [`Value`]s ready for JSON serialisation;
//! - [`syntax`], [`preview`], [`explain`] — editor-facing emitters over the
//!   same token stream.
//!
//! ## Feature Flags
//!
//! - `wasm` — browser bindings via `wasm-bindgen`
//! - `logging` — state-transition tracing using the `log` crate

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all)]

/// Logging macro - no-op when the logging feature is disabled
#[cfg(not(feature = "logging"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

/// Logging macro - forwards to the log crate when the feature is enabled
#[cfg(feature = "logging")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

pub(crate) use log_debug;

mod catalog;
mod definition;
mod error;
mod lexer;
mod materialize;
mod parser;
mod registry;
mod scanner;
mod script;
mod syntax;
mod token;
mod typed;
mod value;

pub mod injection;

// Conditional compilation for the browser bridge
#[cfg(feature = "wasm")]
mod wasm;

// ============================================================================
// Token model and lexer
// ============================================================================

pub use lexer::{Lexer, ParseContext};
pub use token::{Token, TokenKind, TypedInstance};

// ============================================================================
// Type registry
// ============================================================================

pub use registry::{TypeRegistry, Udt};

// ============================================================================
// Parsing and emission
// ============================================================================

pub use injection::extract as extract_injected;
pub use parser::{parse, parse_injection};
pub use syntax::{explain, preview, syntax};

// ============================================================================
// Values and errors
// ============================================================================

pub use error::ErrorKind;
pub use value::{Record, Row, Value};

// ============================================================================
// Scripting
// ============================================================================

pub use script::run_script;
