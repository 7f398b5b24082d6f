//! Output streams over `embedded_io` sinks, formatting through `growbuf`.
//!
//! ```
//! use growbuf_stream::Ostream;
//!
//! let mut out = Ostream::new(Vec::new());
//! out.set_precision(2);
//! out.write_str("pi=").unwrap().write_float(3.14159).unwrap();
//! out.set_width(5);
//! out.write_int(42).unwrap();
//! assert_eq!(out.get_ref().as_slice(), b"pi=3.14   42");
//! ```
#![no_std]

#[cfg(feature = "std")]
extern crate std;

mod error;
mod ios_base;
mod ostream;
#[cfg(feature = "std")]
mod standard;

pub use error::{Result, StreamError};
pub use ios_base::{FormatState, IosBase, StreamSize, DEFAULT_PRECISION, DEFAULT_WIDTH};
pub use ostream::Ostream;
#[cfg(feature = "std")]
pub use standard::{stderr, stdout, SharedState, StderrStream, StdoutStream};

pub use embedded_io;
