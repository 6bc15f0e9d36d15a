//! Integration with `rand` (v0.9) crate.

#![cfg(feature = "rand09")]

use super::{RandSource, Scru128Generator};
use crate::error::RandError;
use rand_core09::{RngCore, TryRngCore};

/// An adapter that implements [`RandSource`] for [`RngCore`] types.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Adapter<T>(/** The wrapped [`RngCore`] type. */ pub T);

impl<T: RngCore> RandSource for Adapter<T> {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }
}

/// An adapter that implements [`RandSource`] for fallible [`TryRngCore`] types, reporting their
/// failures through [`RandSource::try_next_u32`].
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct TryAdapter<T>(/** The wrapped [`TryRngCore`] type. */ pub T);

impl<T: TryRngCore> RandSource for TryAdapter<T> {
    /// # Panics
    ///
    /// Panics if the wrapped random number generator fails.
    fn next_u32(&mut self) -> u32 {
        match self.0.try_next_u32() {
            Ok(value) => value,
            Err(err) => panic!("scru128: random number generator failed: {}", err),
        }
    }

    fn try_next_u32(&mut self) -> Result<u32, RandError> {
        self.0.try_next_u32().map_err(|_err| {
            #[cfg(feature = "log")]
            log::warn!("scru128: random number generator failed: {}", _err);
            RandError::new("`TryRngCore::try_next_u32` failed")
        })
    }
}

impl<T: RngCore> Scru128Generator<Adapter<T>> {
    /// Creates a generator object with a specified random number generator that implements
    /// [`RngCore`] from `rand` (v0.9) crate. The specified random number generator should be
    /// cryptographically strong and securely seeded.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(feature = "default_rng")]
    /// # {
    /// # use rand09 as rand;
    /// use scru128::Scru128Generator;
    ///
    /// let mut g = Scru128Generator::with_rand09(rand::rng());
    /// println!("{}", g.generate()?);
    /// # }
    /// # Ok::<(), scru128::GeneratorError>(())
    /// ```
    pub const fn with_rand09(rng: T) -> Self {
        Self::with_rng(Adapter(rng))
    }
}

impl<T: TryRngCore> Scru128Generator<TryAdapter<T>> {
    /// Creates a generator object with a specified fallible random number generator that
    /// implements [`TryRngCore`] from `rand` (v0.9) crate, such as `rand::rngs::OsRng`.
    ///
    /// Failures of the wrapped generator are returned as [`GeneratorError`](crate::GeneratorError)
    /// from the generation methods.
    pub const fn with_try_rand09(rng: T) -> Self {
        Self::with_rng(TryAdapter(rng))
    }
}
