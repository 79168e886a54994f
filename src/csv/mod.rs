//! Parse, address and write delimited tables
//!
//! Text flows through the modules in this order: [`split`] cuts a physical line into raw
//! tokens, [`codec`] unescapes each token, [`grid`] stores the resulting cells with their
//! coordinates, and [`rows`] projects them back out as row and column views. [`document`]
//! ties these together with a [`options::FormatConfig`] and does the I/O.
//!
//! Malformed quoting never fails. Only lookups, decoding and I/O produce errors.
pub mod cache;
pub mod codec;
pub mod document;
pub mod grid;
pub mod options;
pub mod record;
pub mod rows;
pub mod split;
