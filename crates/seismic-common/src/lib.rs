//! Common types and utilities shared across the seismic dashboard crates.

pub mod crs;
pub mod error;
pub mod extent;
pub mod parameter;

pub use crs::CrsCode;
pub use error::{ErrorKind, SeismicError, SeismicResult};
pub use extent::{Axis, Extent};
pub use parameter::{Parameter, ParameterInfo};
