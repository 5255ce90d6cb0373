//! Generates scripting-runtime wrappers for documented C/C++ APIs.
//!
//! The pipeline is: [`extract`] documentation XML into a
//! [`SymbolTable`](wrapgen_symbols::SymbolTable), persist it with a
//! [`store`], then [`codegen`] wrapper sources from templates.

pub mod cli;
pub mod codegen;
pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod store;
pub mod warnings;

pub use wrapgen_symbols as symbols;
