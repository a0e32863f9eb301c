//! # Delta
//!
//! A Rust implementation of the Quill Delta format for representing rich text documents and changes.
//!
//! Deltas are a simple, yet expressive format that can be used to describe contents and changes.
//! The format is JSON based, and is human readable, yet easily parsible by machines. Deltas can
//! describe any rich text document, includes all text and formatting information, without the
//! ambiguity and complexity of HTML.
//!
//! This crate is the operation *algebra*: composition, transformation, slicing, splitting, and
//! canonical compaction over insert/retain/delete operations. It is pure and synchronous — every
//! public entry point is a deterministic function of its inputs, with no shared mutable state
//! beyond the process-wide embed handler registry (see [`embed`]) and no I/O. As a library crate
//! it never installs a `tracing` subscriber; wiring one up is an application concern.

pub mod attributes;
pub mod delta;
pub mod diff;
pub mod embed;
pub mod error;
pub mod grapheme;
pub mod op;
pub mod op_iterator;
pub mod stepper;

pub use attributes::{AttributeMap, AttributeValue};
pub use delta::Delta;
pub use embed::{register_embed_handler, Embed, EmbedHandler};
pub use error::Error;
pub use op::{Action, Kind, Op, OpValue, TakeRest};
pub use op_iterator::OpIterator;

// Re-export for convenience
pub use serde_json::Value as JsonValue;
