//! # pbsift-core
//!
//! A schema-less decoder for the Protocol Buffer wire format.
//!
//! Given an encoded message and no `.proto` file, this crate recovers a
//! best-effort field tree and prints every leaf with its field-number path:
//!
//! ```text
//! pb_1 : 150
//! pb_2_1 : 1
//! pb_3 : abc
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`wire`]: Bounds-checked cursor and primitive decoders
//! - [`field`]: Field decoding and the nested-message heuristic
//! - [`printer`]: Tree walking and leaf output
//! - [`decoder`]: The top-level decode loop
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```
//! use pbsift_core::{Decoder, DecoderConfig};
//!
//! let data = [0x08, 0x96, 0x01, 0x12, 0x02, 0x08, 0x01];
//!
//! let mut out = Vec::new();
//! let report = Decoder::with_config(DecoderConfig::new()).decode_to(&data, &mut out)?;
//!
//! assert_eq!(out, b"pb_1 : 150\npb_2_1 : 1\n");
//! assert!(report.is_complete());
//! # Ok::<(), pbsift_core::Error>(())
//! ```
//!
//! ## Extensibility
//!
//! - [`FieldVisitor`]: Customize what happens to each decoded field
//! - [`DecoderConfig`]: Field-number ceiling, depth cap and path label
//!

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod decoder;
pub mod error;
pub mod field;
pub mod printer;
pub mod wire;

// Re-export primary types for convenience
pub use decoder::{decode, DecodeReport, Decoder};
pub use error::{DecodeError, DecodeResult, Error, Result};
pub use field::{DecoderConfig, Field, FieldDecoder, Payload};
pub use printer::{FieldPath, FieldVisitor, LineWriter, NullVisitor, StatsVisitor, TreePrinter};
pub use wire::{Cursor, Tag, WireType};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Highest field number the decoder accepts by default.
///
/// Real field numbers go up to 2^29 - 1, but messages seen in practice stay
/// far below 512. Treating anything larger as invalid is what stops random
/// bytes from being read as nested messages. Override it with
/// [`DecoderConfig::max_field_number`].
pub const MAX_FIELD_NUMBER: u32 = 512;

/// Label at the start of every printed path
pub const ROOT_LABEL: &str = "pb";
