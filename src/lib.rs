//! A trace-driven simulator of one set-associative data cache with FIFO
//! replacement.
//!
//! A trace of loads, stores and modifies is replayed against a cache of
//! `2^s` sets of `E` lines with `2^b`-byte blocks, counting hits, misses and
//! evictions. Only tags are modelled, never data.

pub mod cache;
pub mod commons;
pub mod error;
pub mod simulator;
pub mod trace;

pub use cache::{Cache, CacheLine};
pub use commons::{AccessEvent, AccessKind, Addr, Geometry};
pub use error::Error;
pub use simulator::{simulate, Outcome, Simulator, Stats};
pub use trace::TraceReader;
