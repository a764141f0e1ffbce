#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use async_trait as _;

mod books;
mod bounded;
mod in_flight;
mod prefetch;

pub use books::BookCache;
pub use bounded::BoundedCache;
pub use in_flight::{InFlightGuard, InFlightSet};
pub use prefetch::{PrefetchConfig, PrefetchCoordinator, PrefetchSummary};
