pub mod aggregate;
pub mod error;
pub mod filter;
pub mod io;
pub mod layout;
pub mod model;
pub mod pipeline;
pub mod validate;

pub use error::{CoverageError, Result};
