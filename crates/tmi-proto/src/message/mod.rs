//! Owned TMI message type with parsing and serialization.

mod nom_parser;
mod parse;
mod serialize;
pub mod tags;
mod types;

pub use self::types::{Message, Tag};
