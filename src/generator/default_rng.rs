use std::error;

use rand09::{rngs::OsRng, rngs::ReseedingRng, RngCore as _};

use super::{DefaultRng, RandSource};

/// Number of bytes generated before the inner ChaCha12 core is reseeded by the OS.
const RESEED_THRESHOLD: u64 = 1024 * 64;

impl RandSource for DefaultRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }
}

impl Default for DefaultRng {
    /// Creates an instance of the default random number generator.
    ///
    /// # Panics
    ///
    /// Panics in the highly unlikely event where the operating system's random number generator
    /// failed to provide secure entropy. Use [`DefaultRng::try_new`] to handle the failure.
    fn default() -> Self {
        Self::try_new().expect("scru128: could not initialize DefaultRng")
    }
}

impl DefaultRng {
    /// Creates an instance of the default random number generator, or returns an error if the
    /// operating system's random number generator could not provide the initial seed.
    pub fn try_new() -> Result<Self, impl error::Error> {
        ReseedingRng::new(RESEED_THRESHOLD, OsRng).map(|inner| Self {
            _private: (),
            inner,
        })
    }
}
