use super::{ConstRand, GeneratorStatus, Scru128Generator};

/// Generates increasing IDs even with decreasing or constant timestamp
#[test]
fn generates_increasing_ids_even_with_decreasing_or_constant_timestamp() {
    let ts = 0x0123_4567_89abu64;
    let mut g = Scru128Generator::for_testing();

    let mut prev = g.generate_or_abort_core(ts, 10_000).unwrap().unwrap();
    assert_eq!(g.last_status(), GeneratorStatus::NewTimestamp);
    assert_eq!(prev.timestamp(), ts);

    for i in 0..100_000u64 {
        let curr = g
            .generate_or_abort_core(ts - i.min(9_999), 10_000)
            .unwrap()
            .unwrap();
        assert!(prev < curr);
        prev = curr;
    }
    assert!(prev.timestamp() >= ts);
}

/// Returns None if timestamp goes backwards a lot
#[test]
fn returns_none_if_timestamp_goes_backwards_a_lot() {
    let ts = 0x0123_4567_89abu64;
    let mut g = Scru128Generator::with_rng(ConstRand(0x42));

    let prev = g.generate_or_abort_core(ts, 10_000).unwrap().unwrap();
    assert_eq!(prev.timestamp(), ts);

    let mut curr = g.generate_or_abort_core(ts - 10_000, 10_000).unwrap();
    assert_eq!(g.last_status(), GeneratorStatus::CounterLoInc);
    assert!(prev < curr.unwrap());

    let state = g.state;
    curr = g.generate_or_abort_core(ts - 10_001, 10_000).unwrap();
    assert_eq!(g.last_status(), GeneratorStatus::RollbackAbort);
    assert!(curr.is_none());

    curr = g.generate_or_abort_core(ts - 10_002, 10_000).unwrap();
    assert_eq!(g.last_status(), GeneratorStatus::RollbackAbort);
    assert!(curr.is_none());
    assert_eq!(g.state, state);

    // resumes from where it left off
    let next = g.generate_or_abort_core(ts, 10_000).unwrap().unwrap();
    assert!(next > prev);
}
