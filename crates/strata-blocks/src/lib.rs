//! Terrain material catalogue.
#![forbid(unsafe_code)]

pub mod material;

pub use material::{Material, MaterialParseError};
