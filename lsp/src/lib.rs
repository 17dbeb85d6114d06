//! Language server for the XULE rule language.
//!
//! [`analyzer`] holds the editor-independent pipeline (compilation units,
//! symbol tables, checks, completion and definition lookup); the server
//! wires it to `tower-lsp`.

pub mod analyzer;
mod server;

pub use server::run;
