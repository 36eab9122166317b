//! # Staging Module
//!
//! Copies device clips into the compiled folder under a trial-ordinal prefix
//! and orders the staged names naturally (numeric substrings by value).

mod order;
mod stager;

pub use order::{natural_cmp, sort_natural};
pub use stager::{StagedClip, Stager};
