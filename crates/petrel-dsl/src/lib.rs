#![doc = include_str!("../README.md")]

//! Parser for the Petrel model language.
//!
//! This crate turns PRISM-style guarded-command sources into a spanned
//! AST. It is purely syntactic; model-shape validation and construction of
//! the explicit consumption MDP live in `petrel-ir`.

pub mod ast;
pub mod errors;
pub mod parser;

pub use errors::ParseError;
pub use parser::parse;
