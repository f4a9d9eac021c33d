#![forbid(unsafe_code)]

mod envelope;
mod handlers;
mod payload;

pub use envelope::*;
pub use handlers::{definitions, dispatch, op_names};
