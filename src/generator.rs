//! SCRU128 generator and related items.

use crate::error::{ClockError, GeneratorError, GeneratorErrorKind, RandError};
use crate::{Scru128Id, DEFAULT_ROLLBACK_ALLOWANCE, MAX_COUNTER_HI, MAX_COUNTER_LO, MAX_TIMESTAMP};

#[cfg(feature = "default_rng")]
mod default_rng;
pub mod with_rand010;
pub mod with_rand08;
pub mod with_rand09;

/// A trait that defines the minimum random number generator interface for [`Scru128Generator`].
///
/// The generator only calls [`try_next_u32`](RandSource::try_next_u32); sources that can fail
/// should override it so that failures are reported as [`GeneratorError`] rather than panics.
pub trait RandSource {
    /// Returns the next random `u32`.
    fn next_u32(&mut self) -> u32;

    /// Returns the next random `u32`, or an error if the source could not produce one.
    fn try_next_u32(&mut self) -> Result<u32, RandError> {
        Ok(self.next_u32())
    }
}

/// A trait that defines the minimum system clock interface for [`Scru128Generator`].
pub trait TimeSource {
    /// Returns the current Unix timestamp in milliseconds.
    fn unix_ts_ms(&mut self) -> Result<u64, ClockError>;
}

/// The default random number generator used by [`Scru128Generator`].
///
/// Currently, `DefaultRng` uses [`ChaCha12Core`] that is initially seeded and subsequently
/// reseeded by [`OsRng`] every 64 kiB of random data using the [`ReseedingRng`] wrapper. It is
/// the same strategy as that employed by [`ThreadRng`]; see the docs of `rand` crate for a
/// detailed discussion on the strategy.
///
/// This structure is available only when the `default_rng` crate feature is enabled.
///
/// [`ChaCha12Core`]: https://docs.rs/rand_chacha/0.9/rand_chacha/struct.ChaCha12Core.html
/// [`OsRng`]: https://docs.rs/rand/0.9/rand/rngs/struct.OsRng.html
/// [`ReseedingRng`]: https://docs.rs/rand/0.9/rand/rngs/struct.ReseedingRng.html
/// [`ThreadRng`]: https://docs.rs/rand/0.9/rand/rngs/struct.ThreadRng.html
#[derive(Clone, Debug)]
pub struct DefaultRng {
    _private: (),
    #[cfg(feature = "default_rng")]
    inner: rand09::rngs::ReseedingRng<rand_chacha::ChaCha12Core, rand09::rngs::OsRng>,
}

/// The default [`TimeSource`] that uses [`std::time::SystemTime`].
///
/// It implements [`TimeSource`] only when the `std` crate feature is enabled.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct StdSystemTime;

#[cfg(feature = "std")]
impl TimeSource for StdSystemTime {
    fn unix_ts_ms(&mut self) -> Result<u64, ClockError> {
        use std::time;
        let elapsed = time::SystemTime::now().duration_since(time::UNIX_EPOCH)?;
        Ok(elapsed.as_millis() as u64)
    }
}

/// Status code that indicates which branch the last generation of ID took.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[non_exhaustive]
pub enum GeneratorStatus {
    /// The generator has yet to generate an ID.
    #[default]
    NotExecuted,

    /// The latest `timestamp` was used because it was greater than the previous one.
    NewTimestamp,

    /// `counter_lo` was incremented because the latest `timestamp` was no greater than the
    /// previous one.
    CounterLoInc,

    /// `counter_hi` was incremented because `counter_lo` reached its maximum value.
    CounterHiInc,

    /// The previous `timestamp` was incremented because `counter_hi` reached its maximum value.
    TimestampInc,

    /// The generator was reset and the monotonic order of IDs was broken because the latest
    /// `timestamp` was smaller than the previous one by more than the rollback allowance.
    RollbackReset,

    /// No ID was generated because the latest `timestamp` was smaller than the previous one by
    /// more than the rollback allowance.
    RollbackAbort,

    /// The last generation failed and returned an error.
    Error,
}

/// Counter fields committed by each successful generation.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
struct State {
    timestamp: u64,
    counter_hi: u32,
    counter_lo: u32,

    /// The timestamp at the last renewal of `counter_hi` field.
    ts_counter_hi: u64,
}

/// Outcome of the timestamp and counter branch of a generation.
enum Step {
    Next(State, GeneratorStatus),
    Rollback,
}

/// Represents a SCRU128 ID generator that encapsulates the monotonic counters and other internal
/// states.
///
/// The generator is a plain value owned by the caller; every generation method takes `&mut self`,
/// so concurrent use requires external synchronization such as a [`Mutex`](std::sync::Mutex).
///
/// # Examples
///
/// ```rust
/// use scru128::Scru128Generator;
///
/// let mut g = Scru128Generator::new();
/// println!("{}", g.generate()?);
/// println!("{}", g.generate()?.to_u128());
/// # Ok::<(), scru128::GeneratorError>(())
/// ```
///
/// Each generator instance generates monotonically ordered IDs, but multiple generators called
/// concurrently may produce disordered results unless explicitly synchronized.
///
/// ```rust
/// use scru128::Scru128Generator;
/// use std::{sync, thread};
///
/// let g = sync::Arc::new(sync::Mutex::new(Scru128Generator::new()));
/// thread::scope(|s| {
///     for i in 0..4 {
///         let g = sync::Arc::clone(&g);
///         s.spawn(move || {
///             for _ in 0..4 {
///                 println!("{} by thread {}", g.lock().unwrap().generate().unwrap(), i);
///                 thread::yield_now();
///             }
///         });
///     }
/// });
/// ```
///
/// # Generator functions
///
/// The generator comes with several methods that generate a SCRU128 ID:
///
/// | Flavor                     | Timestamp | On big clock rewind      |
/// | -------------------------- | --------- | ------------------------ |
/// | [`generate`]               | Now       | Resets generator         |
/// | [`generate_or_abort`]      | Now       | Returns `Ok(None)`       |
/// | [`generate_or_wait`]       | Now       | Retries, then resets     |
/// | [`generate_or_reset_core`] | Argument  | Resets generator         |
/// | [`generate_or_abort_core`] | Argument  | Returns `Ok(None)`       |
///
/// All of them return a monotonically increasing ID by reusing the previous `timestamp` even if
/// the one provided is smaller than the immediately preceding ID's. However, when such a clock
/// rollback is considered significant (by default, more than ten seconds):
///
/// 1.  `generate` (or_reset) methods reset the generator and return a new ID based on the given
///     `timestamp`, breaking the increasing order of IDs.
/// 2.  `or_abort` variants abort and return `Ok(None)` immediately.
///
/// [`last_status`](Scru128Generator::last_status) tells which of these branches was taken.
///
/// [`generate`]: Scru128Generator::generate
/// [`generate_or_abort`]: Scru128Generator::generate_or_abort
/// [`generate_or_wait`]: Scru128Generator::generate_or_wait
/// [`generate_or_reset_core`]: Scru128Generator::generate_or_reset_core
/// [`generate_or_abort_core`]: Scru128Generator::generate_or_abort_core
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Scru128Generator<R = DefaultRng, T = StdSystemTime> {
    state: State,
    last_status: GeneratorStatus,

    rng: R,
    time_source: T,
}

#[cfg(feature = "default_rng")]
#[cfg_attr(docsrs, doc(cfg(feature = "default_rng")))]
impl Scru128Generator {
    /// Creates a generator object with the default random number generator.
    ///
    /// # Panics
    ///
    /// Panics in the highly unlikely event where the operating system's random number generator
    /// failed to provide secure entropy.
    pub fn new() -> Self {
        Default::default()
    }
}

impl<R> Scru128Generator<R> {
    /// Creates a generator object with a specified random number generator. The specified random
    /// number generator should be cryptographically strong and securely seeded.
    pub const fn with_rng(rng: R) -> Self {
        Self::with_rand_and_time_sources(rng, StdSystemTime)
    }
}

impl<R, T> Scru128Generator<R, T> {
    /// Creates a generator object with specified random number generator and system clock.
    pub const fn with_rand_and_time_sources(rng: R, time_source: T) -> Self {
        Self {
            state: State {
                timestamp: 0,
                counter_hi: 0,
                counter_lo: 0,
                ts_counter_hi: 0,
            },
            last_status: GeneratorStatus::NotExecuted,
            rng,
            time_source,
        }
    }

    /// Returns the status code that indicates the internal state involved in the last
    /// generation of ID.
    pub const fn last_status(&self) -> GeneratorStatus {
        self.last_status
    }
}

impl<R: RandSource, T: TimeSource> Scru128Generator<R, T> {
    /// Generates a new SCRU128 ID object from the current `timestamp`, or resets the generator
    /// upon significant timestamp rollback.
    ///
    /// See the [`Scru128Generator`] type documentation for the description.
    pub fn generate(&mut self) -> Result<Scru128Id, GeneratorError> {
        let timestamp = self.read_clock()?;
        self.generate_or_reset_core(timestamp, DEFAULT_ROLLBACK_ALLOWANCE)
    }

    /// Generates a new SCRU128 ID object from the current `timestamp`, or returns `Ok(None)`
    /// upon significant timestamp rollback.
    ///
    /// See the [`Scru128Generator`] type documentation for the description.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scru128::Scru128Generator;
    ///
    /// let g = std::sync::Mutex::new(Scru128Generator::new());
    /// let x = g.lock().unwrap().generate_or_abort()?;
    /// println!("{}", x.expect("clock went backwards by ten seconds or more"));
    /// # Ok::<(), scru128::GeneratorError>(())
    /// ```
    pub fn generate_or_abort(&mut self) -> Result<Option<Scru128Id>, GeneratorError> {
        let timestamp = self.read_clock()?;
        self.generate_or_abort_core(timestamp, DEFAULT_ROLLBACK_ALLOWANCE)
    }

    /// Generates a new SCRU128 ID object from the current `timestamp`, re-reading the clock up to
    /// `max_retries` times while it lags behind the previous `timestamp` by more than the default
    /// rollback allowance.
    ///
    /// The thread yields between retries. Once the retries are exhausted, the generator is reset
    /// as [`generate`](Scru128Generator::generate) does.
    pub fn generate_or_wait(&mut self, max_retries: usize) -> Result<Scru128Id, GeneratorError> {
        for _ in 0..max_retries {
            let timestamp = self.read_clock()?;
            let value = self.generate_or_abort_core(timestamp, DEFAULT_ROLLBACK_ALLOWANCE)?;
            if let Some(value) = value {
                return Ok(value);
            }

            #[cfg(feature = "std")]
            std::thread::yield_now();
            #[cfg(not(feature = "std"))]
            core::hint::spin_loop();
        }

        #[cfg(feature = "log")]
        log::warn!(
            "scru128: clock did not go forward after {} retries; resetting generator",
            max_retries
        );
        let timestamp = self.read_clock()?;
        self.generate_or_reset_core(timestamp, DEFAULT_ROLLBACK_ALLOWANCE)
    }

    fn read_clock(&mut self) -> Result<u64, GeneratorError> {
        self.time_source.unix_ts_ms().map_err(|err| {
            self.last_status = GeneratorStatus::Error;
            err.into()
        })
    }
}

impl<R: RandSource, T> Scru128Generator<R, T> {
    /// Generates a new SCRU128 ID object from the `timestamp` passed, or resets the generator
    /// upon significant timestamp rollback.
    ///
    /// See the [`Scru128Generator`] type documentation for the description.
    ///
    /// The `rollback_allowance` parameter specifies the amount of `timestamp` rollback that is
    /// considered significant. A suggested value is `10_000` (milliseconds). A rollback of
    /// exactly `rollback_allowance` is still tolerated.
    ///
    /// # Errors
    ///
    /// Returns an error if `timestamp` is not a 48-bit positive integer, if `rollback_allowance`
    /// exceeds 48 bits, or if the random number generator fails. The counters are left untouched
    /// in such a case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scru128::{GeneratorStatus, Scru128Generator};
    ///
    /// let mut g = Scru128Generator::new();
    /// let x = g.generate_or_reset_core(0x0123_4567_89ab, 10_000)?;
    /// assert_eq!(g.last_status(), GeneratorStatus::NewTimestamp);
    ///
    /// let y = g.generate_or_reset_core(0x0123_4567_89ab - 10_001, 10_000)?;
    /// assert_eq!(g.last_status(), GeneratorStatus::RollbackReset);
    /// assert!(y < x);
    /// # Ok::<(), scru128::GeneratorError>(())
    /// ```
    pub fn generate_or_reset_core(
        &mut self,
        timestamp: u64,
        rollback_allowance: u64,
    ) -> Result<Scru128Id, GeneratorError> {
        let result = self.reset_core_inner(timestamp, rollback_allowance);
        self.record_failure(result)
    }

    /// Generates a new SCRU128 ID object from the `timestamp` passed, or returns `Ok(None)` upon
    /// significant timestamp rollback.
    ///
    /// See the [`Scru128Generator`] type documentation for the description.
    ///
    /// The `rollback_allowance` parameter specifies the amount of `timestamp` rollback that is
    /// considered significant. A suggested value is `10_000` (milliseconds). A rollback of
    /// exactly `rollback_allowance` is still tolerated.
    ///
    /// # Errors
    ///
    /// Returns an error if `timestamp` is not a 48-bit positive integer, if `rollback_allowance`
    /// exceeds 48 bits, or if the random number generator fails. The counters are left untouched
    /// in such a case.
    pub fn generate_or_abort_core(
        &mut self,
        timestamp: u64,
        rollback_allowance: u64,
    ) -> Result<Option<Scru128Id>, GeneratorError> {
        let result = self.abort_core_inner(timestamp, rollback_allowance);
        self.record_failure(result)
    }

    fn reset_core_inner(
        &mut self,
        timestamp: u64,
        rollback_allowance: u64,
    ) -> Result<Scru128Id, GeneratorError> {
        validate_args(timestamp, rollback_allowance)?;
        let (next, status) = match self.step(timestamp, rollback_allowance)? {
            Step::Next(next, status) => (next, status),
            Step::Rollback => {
                #[cfg(feature = "log")]
                log::warn!(
                    "scru128: clock went backwards from {} to {}; resetting generator",
                    self.state.timestamp,
                    timestamp
                );

                // start over from `timestamp`; zero `ts_counter_hi` forces renewal of `counter_hi`
                let next = State {
                    timestamp,
                    counter_lo: self.rng.try_next_u32()? & MAX_COUNTER_LO,
                    ..State::default()
                };
                (next, GeneratorStatus::RollbackReset)
            }
        };
        self.finish(next, status)
    }

    fn abort_core_inner(
        &mut self,
        timestamp: u64,
        rollback_allowance: u64,
    ) -> Result<Option<Scru128Id>, GeneratorError> {
        validate_args(timestamp, rollback_allowance)?;
        match self.step(timestamp, rollback_allowance)? {
            Step::Next(next, status) => self.finish(next, status).map(Some),
            Step::Rollback => {
                #[cfg(feature = "log")]
                log::debug!(
                    "scru128: clock went backwards from {} to {}; aborting",
                    self.state.timestamp,
                    timestamp
                );
                self.last_status = GeneratorStatus::RollbackAbort;
                Ok(None)
            }
        }
    }

    /// Determines the next `timestamp` and counters without committing them.
    fn step(&mut self, timestamp: u64, rollback_allowance: u64) -> Result<Step, GeneratorError> {
        let prev = self.state;
        let mut next = prev;

        let status = if timestamp > prev.timestamp {
            next.timestamp = timestamp;
            next.counter_lo = self.rng.try_next_u32()? & MAX_COUNTER_LO;
            GeneratorStatus::NewTimestamp
        } else if timestamp + rollback_allowance >= prev.timestamp {
            // go on with previous timestamp if new one is not much smaller
            if prev.counter_lo < MAX_COUNTER_LO {
                next.counter_lo += 1;
                GeneratorStatus::CounterLoInc
            } else if prev.counter_hi < MAX_COUNTER_HI {
                next.counter_lo = 0;
                next.counter_hi += 1;
                GeneratorStatus::CounterHiInc
            } else {
                // increment timestamp at counter overflow
                if prev.timestamp >= MAX_TIMESTAMP {
                    return Err(GeneratorError::new(GeneratorErrorKind::TimestampOverflow));
                }
                #[cfg(feature = "log")]
                log::debug!("scru128: counters exhausted at {}", prev.timestamp);
                next.timestamp += 1;
                next.counter_hi = 0;
                next.counter_lo = self.rng.try_next_u32()? & MAX_COUNTER_LO;
                GeneratorStatus::TimestampInc
            }
        } else {
            return Ok(Step::Rollback);
        };

        Ok(Step::Next(next, status))
    }

    /// Renews `counter_hi` if due, draws `entropy`, and commits `next` as the new state.
    fn finish(
        &mut self,
        mut next: State,
        status: GeneratorStatus,
    ) -> Result<Scru128Id, GeneratorError> {
        if next.timestamp - next.ts_counter_hi >= 1_000 || next.ts_counter_hi == 0 {
            next.ts_counter_hi = next.timestamp;
            next.counter_hi = self.rng.try_next_u32()? & MAX_COUNTER_HI;
        }
        let entropy = self.rng.try_next_u32()?;

        self.state = next;
        self.last_status = status;
        Ok(Scru128Id::from_fields_unchecked(
            next.timestamp,
            next.counter_hi,
            next.counter_lo,
            entropy,
        ))
    }

    fn record_failure<U>(
        &mut self,
        result: Result<U, GeneratorError>,
    ) -> Result<U, GeneratorError> {
        if result.is_err() {
            self.last_status = GeneratorStatus::Error;
        }
        result
    }
}

const fn validate_args(timestamp: u64, rollback_allowance: u64) -> Result<(), GeneratorError> {
    if timestamp == 0 || timestamp > MAX_TIMESTAMP {
        Err(GeneratorError::new(GeneratorErrorKind::InvalidTimestamp(timestamp)))
    } else if rollback_allowance > MAX_TIMESTAMP {
        Err(GeneratorError::new(
            GeneratorErrorKind::InvalidRollbackAllowance(rollback_allowance),
        ))
    } else {
        Ok(())
    }
}

/// Supports operations as an infinite iterator that produces a new ID for each call of `next()`.
///
/// The iteration ends when the generator returns an error. The error itself is not yielded; it is
/// logged as a warning when the `log` crate feature is enabled. Call
/// [`generate`](Scru128Generator::generate) directly to handle it.
///
/// # Examples
///
/// ```rust
/// use scru128::Scru128Generator;
///
/// Scru128Generator::new()
///     .enumerate()
///     .skip(4)
///     .take(4)
///     .for_each(|(i, e)| println!("[{}] {}", i, e));
/// ```
impl<R: RandSource, T: TimeSource> Iterator for Scru128Generator<R, T> {
    type Item = Scru128Id;

    fn next(&mut self) -> Option<Self::Item> {
        match self.generate() {
            Ok(value) => Some(value),
            Err(_err) => {
                #[cfg(feature = "log")]
                log::warn!("scru128: iteration stopped: {}", _err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests;
