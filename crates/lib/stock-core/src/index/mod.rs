//! Ticker index client over the vector collection.

mod connector;
mod surreal;

pub use connector::{BuildIndexFn, BuildIndexFuture, IndexConnector};
pub use surreal::{IndexError, IndexResult, TickerIndex};
