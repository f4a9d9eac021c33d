#![forbid(unsafe_code)]

mod mirror;
mod registry;

pub use mirror::*;
pub use registry::*;
