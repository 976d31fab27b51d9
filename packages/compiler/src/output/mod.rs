//! Output Module
//!
//! Synthetic code model and its text emitter.

pub mod abstract_emitter;
pub mod output_ast;
