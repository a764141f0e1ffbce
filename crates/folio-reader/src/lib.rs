#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use async_trait as _;

mod error;
mod service;

pub use error::ReaderError;
pub use service::{AUDIO_SETTINGS_KEY, PageView, PlayOutcome, ReaderDeps, ReaderService};
