//! # strata-core
//!
//! Shared primitives for the Strata sink components.
//!
//! - **Error Types**: Shared error definitions and result types
//! - **Observability**: Logging initialization and span helpers
//!
//! ## Example
//!
//! ```rust
//! use strata_core::prelude::*;
//!
//! init_logging(LogFormat::Pretty);
//! let err = Error::invalid_input("write parallelism must be positive");
//! assert!(err.to_string().starts_with("invalid input"));
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod observability;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::observability::{LogFormat, init_logging, sink_span};
}

pub use error::{Error, Result};
pub use observability::{LogFormat, init_logging, sink_span};
