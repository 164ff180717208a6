//! Real-world scenario benchmarks.
//!
//! Models how the keyboard is actually played: a few keys, a chord, or the
//! whole keyboard at once, rendered into each device format.

mod formats;
mod polyphony;

pub use formats::bench_formats;
pub use polyphony::bench_polyphony;
