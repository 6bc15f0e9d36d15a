//! Default generator and entry point functions.

#![cfg(feature = "global_gen")]
#![cfg_attr(docsrs, doc(cfg(feature = "global_gen")))]

use crate::error::{GeneratorError, RandError};
use crate::generator::{DefaultRng, StdSystemTime};
use crate::{Scru128Generator, Scru128Id};
use std::sync::{Mutex, PoisonError};

/// Runs `f` with the process-wide global generator, creating one if none exists or the process
/// has forked since.
fn with_global_gen<U>(
    f: impl FnOnce(&mut Scru128Generator) -> Result<U, GeneratorError>,
) -> Result<U, GeneratorError> {
    static G: Mutex<Option<ProcessLocalGenerator>> = Mutex::new(None);

    // every generation commits its state atomically, so a poisoned state is still consistent
    let mut guard = G.lock().unwrap_or_else(PoisonError::into_inner);
    let inner = match guard.take() {
        Some(inner) if !inner.is_stale() => inner,
        _ => ProcessLocalGenerator::try_new()?,
    };
    f(&mut guard.insert(inner).generator)
}

/// A thin wrapper to reset the state when the process ID changes (i.e., upon Unix forks).
#[derive(Debug)]
struct ProcessLocalGenerator {
    #[cfg(unix)]
    pid: u32,
    generator: Scru128Generator,
}

impl ProcessLocalGenerator {
    fn try_new() -> Result<Self, RandError> {
        let rng = DefaultRng::try_new()
            .map_err(|_| RandError::new("could not seed the global generator"))?;

        #[cfg(feature = "log")]
        log::debug!("scru128: initialized global generator");
        Ok(Self {
            #[cfg(unix)]
            pid: std::process::id(),
            generator: Scru128Generator::with_rand_and_time_sources(rng, StdSystemTime),
        })
    }

    fn is_stale(&self) -> bool {
        #[cfg(unix)]
        return self.pid != std::process::id();

        #[cfg(not(unix))]
        false
    }
}

/// Generates a new SCRU128 ID object using the global generator.
///
/// This function is thread-safe; multiple threads in a process can call it concurrently without
/// breaking the monotonic order of generated IDs. On Unix, this function resets the generator
/// state when the process ID changes (i.e., upon forks) to avoid collisions across processes.
///
/// # Errors
///
/// Returns an error if the system clock or the operating system's random number generator fails.
pub fn new() -> Result<Scru128Id, GeneratorError> {
    with_global_gen(Scru128Generator::generate)
}

/// Generates a new SCRU128 ID encoded in the 25-digit canonical string representation using the
/// global generator.
///
/// Use this to quickly get a new SCRU128 ID as a string.
///
/// This function is thread-safe; multiple threads in a process can call it concurrently without
/// breaking the monotonic order of generated IDs. On Unix, this function resets the generator
/// state when the process ID changes (i.e., upon forks) to avoid collisions across processes.
///
/// # Examples
///
/// ```rust
/// let x = scru128::new_string()?; // e.g., "036z951mhjikzik2gsl81gr7l"
///
/// assert!(regex::Regex::new(r"^[0-9a-z]{25}$").unwrap().is_match(&x));
/// # Ok::<(), scru128::GeneratorError>(())
/// ```
pub fn new_string() -> Result<String, GeneratorError> {
    new().map(String::from)
}

#[cfg(test)]
mod tests {
    use crate::Scru128Id;

    /// Generates 25-digit canonical string
    #[test]
    fn generates_25_digit_canonical_string() {
        let re = regex::Regex::new(r"^[0-9a-z]{25}$").unwrap();
        for _ in 0..10_000 {
            let e = super::new_string().unwrap();
            assert!(re.is_match(&e));
            assert_eq!(e.parse::<Scru128Id>().unwrap().encode(), e.as_str());
        }
    }

    /// Generates no IDs sharing same timestamp and counters under multithreading
    #[test]
    fn generates_no_ids_sharing_same_timestamp_and_counters_under_multithreading() {
        use std::{collections::HashSet, sync::mpsc, thread};

        let (tx, rx) = mpsc::channel();
        for _ in 0..4 {
            let tx = tx.clone();
            thread::spawn(move || {
                for _ in 0..10000 {
                    tx.send(super::new().unwrap()).unwrap();
                }
            });
        }
        drop(tx);

        let mut s = HashSet::new();
        while let Ok(e) = rx.recv() {
            s.insert((e.timestamp(), e.counter_hi(), e.counter_lo()));
        }

        assert_eq!(s.len(), 4 * 10000);
    }
}
