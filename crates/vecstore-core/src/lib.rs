#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod document;
mod embedder;
mod error;

pub use document::Document;
pub use embedder::{Embedder, SharedEmbedder};
pub use error::{BoxedError, Error, ErrorKind, Result};

/// Tracing target for embedding operations.
pub const TRACING_TARGET: &str = "vecstore_core::embedder";
