//! mcuprog-core - Core types shared by the mcuprog front end and its tools
//!
//! This crate holds everything that is independent of a particular
//! programming tool:
//!
//! - the value literal grammar used for `--literal` and `--direct`
//! - the structured argument record handed to an engine
//! - the [`Engine`] capability trait and its error type
//! - memory region names and the console log level
//!
//! # Features
//!
//! - `clap` - Derive `clap::ValueEnum` for the enumerated argument types
//!
//! # Example
//!
//! ```
//! use mcuprog_core::literal::{parse_literal, LiteralValue, Number};
//!
//! assert_eq!(parse_literal("0x10").unwrap(), LiteralValue::Scalar(Number::Int(16)));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod args;
pub mod engine;
pub mod level;
pub mod literal;
pub mod memory;

pub use args::{Action, HighVoltageMode, StructuredArguments};
pub use engine::{Engine, EngineError};
pub use level::LogLevel;
pub use literal::{LiteralParseError, LiteralValue, Number};
