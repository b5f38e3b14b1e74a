//! Stateless cell encoders.
//!
//! Each column group has one encoder that maps a single raw cell to a number:
//!
//! | Group     | Encoder            | Output                          |
//! |-----------|--------------------|---------------------------------|
//! | `hex`     | [`hex_encode`]     | arbitrary-precision integer     |
//! | `hash`    | [`hash_encode`]    | `u64` xxHash64 digest           |
//! | `embed`   | [`embed_encode`]   | `f64` mean of the text vector   |
//!
//! Encoders never look at other cells, so columns can be encoded in any order.
//!
//! ```
//! use billcode::encoding::{Cell, hex_encode};
//!
//! let id = Cell::from(Some("AB-CD-EF"));
//! assert_eq!(hex_encode(&id).unwrap().to_string(), "11259375");
//! ```

pub mod cell;
pub mod embed;
pub mod hash;
pub mod hex;

pub use cell::Cell;
pub use embed::{
    HashedEmbedder, TextEmbedder, WordVectors, embed_encode, encode_embed_column, load_embedder,
};
pub use hash::{encode_hash_column, hash_encode};
pub use hex::{encode_hex_column, hex_encode};
