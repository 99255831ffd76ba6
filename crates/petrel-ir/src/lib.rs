#![doc = include_str!("../README.md")]

//! Petrel intermediate representation and lowering.
//!
//! This crate defines the extended integers used by the fixed-point
//! analyses, the explicit sparse consumption-MDP model, counter selectors
//! (resource-aware policy tables), and the lowering pass from the parsed
//! model AST to the explicit model.

pub mod cmdp;
pub mod counter_selector;
pub mod ext_int;
pub mod lowering;
#[cfg(any(test, feature = "proptest"))]
pub mod proptest_generators;

pub use cmdp::{ActionId, Cmdp, CmdpBuilder, StateId};
pub use counter_selector::{CounterSelector, SelectionRule};
pub use ext_int::{ExtInt, ExtIntError};
