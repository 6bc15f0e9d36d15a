//! SCRU128: Sortable, Clock and Random number-based Unique identifier
//!
//! SCRU128 ID is yet another attempt to supersede [UUID] for the users who need decentralized,
//! globally unique time-ordered identifiers. SCRU128 is inspired by [ULID] and [KSUID] and has
//! the following features:
//!
//! - 128-bit unsigned integer type
//! - Sortable by generation time (as integer and as text)
//! - 25-digit case-insensitive textual representation (Base36)
//! - 48-bit millisecond Unix timestamp that ensures useful life until year 10889
//! - Up to 281 trillion time-ordered but unpredictable unique IDs per millisecond
//! - 80-bit three-layer randomness for global uniqueness
//!
//! ```rust
//! # #[cfg(feature = "global_gen")]
//! # {
//! // generate a new identifier object
//! let x = scru128::new()?;
//! println!("{}", x); // e.g., "036z951mhjikzik2gsl81gr7l"
//! println!("{}", x.to_u128()); // as a 128-bit unsigned integer
//!
//! // generate a textual representation directly
//! println!("{}", scru128::new_string()?); // e.g., "036z951mhzx67t63mq9xe6q0j"
//! # }
//! # Ok::<(), scru128::GeneratorError>(())
//! ```
//!
//! See [SCRU128 Specification] for details.
//!
//! [UUID]: https://en.wikipedia.org/wiki/Universally_unique_identifier
//! [ULID]: https://github.com/ulid/spec
//! [KSUID]: https://github.com/segmentio/ksuid
//! [SCRU128 Specification]: https://github.com/scru128/spec
//!
//! # Field layout
//!
//! | Bits    | Field        | Meaning                                                      |
//! |---------|--------------|--------------------------------------------------------------|
//! | 0..48   | `timestamp`  | Unix time in milliseconds                                    |
//! | 48..72  | `counter_hi` | Renewed randomly once a second or incremented upon overflow  |
//! | 72..96  | `counter_lo` | Incremented within a millisecond, reset to a random number   |
//! | 96..128 | `entropy`    | Freshly drawn for every ID                                   |
//!
//! Bit offsets count from the most significant bit; the 16-byte form is big-endian.
//!
//! # Crate features
//!
//! Default features:
//!
//! - `std` enables, among others, the default timestamp source for [`Scru128Generator`] using
//!   [`std::time`].
//! - `global_gen` (implies `default_rng` and `std`) provides the process-wide default SCRU128
//!   generator and enables the [`new()`] and [`new_string()`] functions.
//!
//! Optional features:
//!
//! - `default_rng` (implies `std`) enables the default random number generator for
//!   [`Scru128Generator`].
//! - `log` reports clock rollbacks and counter exhaustion through the [`log`] crate.
//! - `serde` enables serialization and deserialization of [`Scru128Id`] via `serde`.
//! - `rand010`, `rand09` and `rand08` enable adapters for `rand::RngCore` of the respective
//!   versions to use a third-party random number generator with [`Scru128Generator`].
//!
//! [`log`]: https://docs.rs/log

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
pub use error::{
    ClockError, FieldRangeError, GeneratorError, GeneratorErrorKind, ParseError, RandError,
};

mod id;
pub use id::Scru128Id;

pub mod generator;
pub use generator::{GeneratorStatus, Scru128Generator};

mod global_gen;
#[cfg(feature = "global_gen")]
pub use global_gen::{new, new_string};

/// The maximum value of 48-bit `timestamp` field.
pub const MAX_TIMESTAMP: u64 = 0xffff_ffff_ffff;

/// The maximum value of 24-bit `counter_hi` field.
pub const MAX_COUNTER_HI: u32 = 0xff_ffff;

/// The maximum value of 24-bit `counter_lo` field.
pub const MAX_COUNTER_LO: u32 = 0xff_ffff;

/// The default timestamp rollback allowance, in milliseconds, of the generation methods that
/// read the clock internally.
pub const DEFAULT_ROLLBACK_ALLOWANCE: u64 = 10_000; // 10 seconds
