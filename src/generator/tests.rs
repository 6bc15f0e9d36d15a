use super::*;

mod generate_or_abort;

/// Returns the same value every time.
struct ConstRand(u32);

impl RandSource for ConstRand {
    fn next_u32(&mut self) -> u32 {
        self.0
    }
}

/// Succeeds for the first `n_ok` calls and fails afterwards.
struct FailingRand {
    n_ok: usize,
}

impl RandSource for FailingRand {
    fn next_u32(&mut self) -> u32 {
        unreachable!("generator must call `try_next_u32`")
    }

    fn try_next_u32(&mut self) -> Result<u32, RandError> {
        if self.n_ok == 0 {
            return Err(RandError::new("exhausted"));
        }
        self.n_ok -= 1;
        Ok(0x42)
    }
}

/// Replays a scripted sequence of timestamps, repeating the last one.
struct ScriptedClock {
    timestamps: &'static [u64],
    position: usize,
}

impl TimeSource for ScriptedClock {
    fn unix_ts_ms(&mut self) -> Result<u64, ClockError> {
        let ts = self.timestamps[self.position.min(self.timestamps.len() - 1)];
        self.position += 1;
        Ok(ts)
    }
}

struct BrokenClock;

impl TimeSource for BrokenClock {
    fn unix_ts_ms(&mut self) -> Result<u64, ClockError> {
        Err(ClockError::new())
    }
}

impl Scru128Generator<()> {
    pub(crate) fn for_testing() -> Scru128Generator<impl RandSource, impl TimeSource> {
        Scru128Generator::with_rand_and_time_sources(new_rand_source(), new_time_source())
    }
}

fn new_rand_source() -> impl RandSource {
    use rand09::{rngs::StdRng, RngCore as _, SeedableRng as _};

    struct MockRandSource(StdRng);
    impl RandSource for MockRandSource {
        fn next_u32(&mut self) -> u32 {
            self.0.next_u32()
        }
    }

    let local_var = 0u32;
    let addr_as_seed = (&local_var as *const u32) as u64;
    MockRandSource(StdRng::seed_from_u64(addr_as_seed))
}

fn new_time_source() -> impl TimeSource {
    #[cfg(feature = "std")]
    return StdSystemTime;

    #[cfg(not(feature = "std"))]
    {
        struct MockTimeSource(u64);
        impl TimeSource for MockTimeSource {
            fn unix_ts_ms(&mut self) -> Result<u64, ClockError> {
                self.0 += 1;
                Ok(self.0)
            }
        }
        MockTimeSource(0x0123_4567_89abu64)
    }
}

/// Is iterable with for-in loop
#[test]
fn is_iterable_with_for_in_loop() {
    let mut i = 0;
    for e in Scru128Generator::for_testing() {
        assert!(e.timestamp() > 0);
        i += 1;
        if i > 100 {
            break;
        }
    }
    assert_eq!(i, 101);
}

/// Stops iteration at the first error
#[cfg(feature = "std")]
#[test]
fn stops_iteration_at_the_first_error() {
    // a new timestamp takes three draws and a counter increment one more
    let clock = ScriptedClock {
        timestamps: &[0x0123_4567_89ab],
        position: 0,
    };
    let mut g = Scru128Generator::with_rand_and_time_sources(FailingRand { n_ok: 4 }, clock);

    let ids: Vec<Scru128Id> = g.by_ref().collect();
    assert_eq!(ids.len(), 2);
    assert!(ids[0] < ids[1]);
    assert_eq!(g.last_status(), GeneratorStatus::Error);
    assert_eq!(g.time_source.position, 3);
}

/// Generates increasing IDs from the system clock
#[test]
fn generates_increasing_ids_from_the_system_clock() {
    let mut g = Scru128Generator::for_testing();
    assert_eq!(g.last_status(), GeneratorStatus::NotExecuted);

    let mut prev = g.generate().unwrap();
    for _ in 0..10_000 {
        let curr = g.generate().unwrap();
        assert!(prev < curr);
        prev = curr;
    }
}

/// Encodes up-to-date timestamp
#[cfg(feature = "std")]
#[test]
fn encodes_up_to_date_timestamp() {
    let mut g = Scru128Generator::for_testing();
    for _ in 0..10_000 {
        let ts_now = StdSystemTime.unix_ts_ms().unwrap() as i64;
        let timestamp = g.generate().unwrap().timestamp() as i64;
        assert!((ts_now - timestamp).abs() < 16);
    }
}

/// Propagates clock errors without touching the state
#[test]
fn propagates_clock_errors_without_touching_the_state() {
    let mut g = Scru128Generator::with_rand_and_time_sources(ConstRand(0x42), BrokenClock);
    let prev = g.generate_or_abort_core(0x0123_4567_89ab, 10_000).unwrap().unwrap();
    let state = g.state;

    let err = g.generate().unwrap_err();
    assert!(matches!(err.kind(), GeneratorErrorKind::Clock(_)));
    assert_eq!(g.last_status(), GeneratorStatus::Error);
    assert!(g.generate_or_abort().is_err());
    assert!(g.generate_or_wait(3).is_err());
    assert_eq!(g.state, state);

    assert!(g.next().is_none());
    assert!(g.generate_or_abort_core(0x0123_4567_89ab, 10_000).unwrap().unwrap() > prev);
}

/// Propagates random source errors without touching the state
#[test]
fn propagates_random_source_errors_without_touching_the_state() {
    let ts = 0x0123_4567_89abu64;

    for n_ok in 0..3 {
        let mut g = Scru128Generator::with_rng(FailingRand { n_ok });
        let err = g.generate_or_reset_core(ts, 10_000).unwrap_err();
        assert!(matches!(err.kind(), GeneratorErrorKind::RandSource(_)));
        assert_eq!(g.last_status(), GeneratorStatus::Error);
        assert_eq!(g.state, State::default());
    }

    let mut g = Scru128Generator::with_rng(FailingRand { n_ok: 3 });
    g.generate_or_abort_core(ts, 10_000).unwrap().unwrap();
    let state = g.state;
    assert!(g.generate_or_abort_core(ts, 10_000).is_err());
    assert!(g.generate_or_reset_core(ts - 20_000, 10_000).is_err());
    assert_eq!(g.state, state);
}

/// Rejects timestamps and rollback allowances out of range
#[test]
fn rejects_timestamps_and_rollback_allowances_out_of_range() {
    let mut g = Scru128Generator::with_rng(ConstRand(0x42));

    for ts in [0, MAX_TIMESTAMP + 1, u64::MAX] {
        let err = g.generate_or_reset_core(ts, 10_000).unwrap_err();
        assert!(matches!(err.kind(), GeneratorErrorKind::InvalidTimestamp(e) if *e == ts));
        assert_eq!(g.last_status(), GeneratorStatus::Error);
        assert!(g.generate_or_abort_core(ts, 10_000).is_err());
    }

    let err = g.generate_or_abort_core(1, MAX_TIMESTAMP + 1).unwrap_err();
    assert!(matches!(err.kind(), GeneratorErrorKind::InvalidRollbackAllowance(_)));
    assert_eq!(g.state, State::default());

    assert!(g.generate_or_reset_core(MAX_TIMESTAMP, MAX_TIMESTAMP).is_ok());
    assert_eq!(g.last_status(), GeneratorStatus::NewTimestamp);
}

/// Waits for the clock to catch up before resetting
#[test]
fn waits_for_the_clock_to_catch_up_before_resetting() {
    const TS: u64 = 0x0123_4567_89ab;

    // catches up on the third read
    let clock = ScriptedClock {
        timestamps: &[TS, TS - 60_000, TS - 60_000, TS - 5_000],
        position: 0,
    };
    let mut g = Scru128Generator::with_rand_and_time_sources(ConstRand(0x42), clock);
    let prev = g.generate().unwrap();
    let curr = g.generate_or_wait(8).unwrap();
    assert_eq!(g.last_status(), GeneratorStatus::CounterLoInc);
    assert!(prev < curr);
    assert_eq!(curr.timestamp(), TS);

    // gives up and resets
    let clock = ScriptedClock {
        timestamps: &[TS, TS - 60_000],
        position: 0,
    };
    let mut g = Scru128Generator::with_rand_and_time_sources(ConstRand(0x42), clock);
    let prev = g.generate().unwrap();
    let curr = g.generate_or_wait(8).unwrap();
    assert_eq!(g.last_status(), GeneratorStatus::RollbackReset);
    assert!(prev > curr);
    assert_eq!(curr.timestamp(), TS - 60_000);
    assert_eq!(g.time_source.position, 1 + 8 + 1);

    // zero retries reset right away
    let clock = ScriptedClock {
        timestamps: &[TS, TS - 60_000],
        position: 0,
    };
    let mut g = Scru128Generator::with_rand_and_time_sources(ConstRand(0x42), clock);
    g.generate().unwrap();
    g.generate_or_wait(0).unwrap();
    assert_eq!(g.last_status(), GeneratorStatus::RollbackReset);
}
