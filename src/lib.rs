#![warn(
    clippy::all,
    clippy::pedantic,
    dead_code
)]
#![allow(
    clippy::inline_always,
    clippy::uninlined_format_args, // ?...
    clippy::single_match_else,
    clippy::collapsible_if,
    clippy::new_without_default,
    clippy::redundant_field_names,
    clippy::struct_field_names,
    clippy::similar_names,
    clippy::match_same_arms,
    clippy::too_many_lines,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
)]

pub mod hash;
pub mod wire;
pub mod object;
pub mod storage;
pub mod repository;
pub mod error;
pub mod config;
pub mod refs;
pub mod index;
pub mod workdir;
pub mod diff;
pub mod graph;
pub mod merge;
pub mod add;
pub mod remove;
pub mod commit;
pub mod branch;
pub mod checkout;
pub mod fetch;
pub mod remote;
pub mod clone;
pub mod status;
pub mod plumbing;
pub mod util;
