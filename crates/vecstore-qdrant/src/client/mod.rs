//! Operation-group clients over a shared transport.

mod collections;
mod points;

pub use collections::CollectionsClient;
pub use points::PointsClient;
