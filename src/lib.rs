//! logweave
//!
//! TUI that reads a process's log output from stdin and groups the lines into
//! conversations by evaluating user-supplied template rules against each
//! decoded record.
//!
//! Pure core: `template`, `parser`, `classify`, `index`, `state`.
//! Impure shell: `source`, `ingest`, `view`, `logging`.

pub mod classify;
pub mod config;
pub mod index;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod parser;
pub mod source;
pub mod state;
pub mod template;
pub mod view;
