//! Mock implementations of vecstore traits.

mod embedding;

pub use embedding::MockEmbedder;
