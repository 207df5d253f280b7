//! Data models for V53a API responses.
//!
//! The client hands responses back as raw JSON; these types are typed
//! views used where output has to be shaped:
//!
//! - `RecordPage`: one page of the list endpoint
//! - `LastElements`: the last-elements snapshot of a record
//! - `Record`: an opaque record object with id/did accessors

pub mod record;

pub use record::{LastElements, Record, RecordPage};
