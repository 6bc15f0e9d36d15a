//! Integration with `rand` (v0.10) crate.

#![cfg(feature = "rand010")]

use super::{RandSource, Scru128Generator};
use rand_core010::Rng;

/// An adapter that implements [`RandSource`] for [`Rng`] types.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Adapter<T>(/** The wrapped [`Rng`] type. */ pub T);

impl<T: Rng> RandSource for Adapter<T> {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }
}

impl<T: Rng> Scru128Generator<Adapter<T>> {
    /// Creates a generator object with a specified random number generator that implements [`Rng`]
    /// from `rand` (v0.10) crate. The specified random number generator should be
    /// cryptographically strong and securely seeded.
    pub const fn with_rand010(rng: T) -> Self {
        Self::with_rng(Adapter(rng))
    }
}

#[cfg(test)]
mod tests {
    use super::Scru128Generator;
    use core::convert::Infallible;

    /// Yields consecutive integers following the initial value.
    struct Counting(u32);

    impl rand_core010::TryRng for Counting {
        type Error = Infallible;

        fn try_next_u32(&mut self) -> Result<u32, Self::Error> {
            self.0 += 1;
            Ok(self.0)
        }

        fn try_next_u64(&mut self) -> Result<u64, Self::Error> {
            self.try_next_u32().map(u64::from)
        }

        fn try_fill_bytes(&mut self, dst: &mut [u8]) -> Result<(), Self::Error> {
            dst.fill(0);
            Ok(())
        }
    }

    /// Carries over counters drawn from the wrapped generator
    #[test]
    fn carries_over_counters_drawn_from_the_wrapped_generator() {
        let ts = 0x0123_4567_89abu64;
        let mut g = Scru128Generator::with_rand010(Counting(0xff_fffd));

        let x = g.generate_or_abort_core(ts, 10_000).unwrap().unwrap();
        assert_eq!((x.counter_lo(), x.counter_hi()), (0xff_fffe, 0xff_ffff));
        assert_eq!(x.entropy(), 0x100_0000);

        let y = g.generate_or_abort_core(ts, 10_000).unwrap().unwrap();
        assert_eq!((y.counter_lo(), y.counter_hi()), (0xff_ffff, 0xff_ffff));
        assert_eq!(y.entropy(), 0x100_0001);

        // both counters exhausted, so the timestamp moves on with a fresh `counter_lo`
        let z = g.generate_or_abort_core(ts, 10_000).unwrap().unwrap();
        assert_eq!(z.timestamp(), ts + 1);
        assert_eq!((z.counter_lo(), z.counter_hi()), (0x100_0002 & 0xff_ffff, 0));
        assert_eq!(z.entropy(), 0x100_0003);
        assert!(x < y && y < z);
    }
}
