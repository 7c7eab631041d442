use std::collections::HashSet;

use coinflip::error::Result;
use coinflip::seed::{EntropySource, SeedDistributor};
use coinflip::{Aggregation, BitSource, Engine, EngineConfig, Plan};
use proptest::prelude::*;

/// Replays a fixed list of raw entropy values, cycling when exhausted.
struct Replay {
    values: Vec<u32>,
    next: usize,
}

impl EntropySource for Replay {
    fn next_u32(&mut self) -> Result<u32> {
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        Ok(value)
    }
}

#[derive(Default)]
struct Alternating(u64);

impl BitSource for Alternating {
    fn next_word(&mut self) -> u64 {
        let word = self.0;
        self.0 ^= 1;
        word
    }
}

fn engine(workers: usize, batch: u64, aggregation: Aggregation) -> Engine {
    let mut config = EngineConfig::new(workers, batch);
    config.aggregation = aggregation;
    Engine::new(config).expect("valid config")
}

#[test]
fn reference_configuration_single_unit() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    let report = engine.run(160_000).unwrap();
    assert_eq!(report.true_count() + report.false_count(), 160_000);
    assert_eq!(report.per_worker.len(), 32);
    assert!(report.per_worker.iter().all(|r| r.total() == 5000));
    assert!(report.elapsed_seconds() >= 0.0);
}

#[test]
fn alternating_stub_yields_exact_halves() {
    let engine = engine(4, 2, Aggregation::Atomic);
    let plan = Plan::new(16, engine.config());
    let report = engine
        .run_seeded(&plan, vec![11, 22, 33, 44], |_| Alternating::default())
        .unwrap();
    assert_eq!((report.true_count(), report.false_count()), (8, 8));
}

#[test]
fn zero_total_spawns_nothing() {
    let engine = engine(4, 2, Aggregation::Locked);
    let report = engine.run(0).unwrap();
    assert_eq!(report.totals.total(), 0);
    assert!(report.per_worker.is_empty());
    assert_eq!(report.elapsed_seconds(), 0.0);
}

#[test]
fn repeated_runs_start_from_a_zero_tally() {
    let engine = engine(2, 5, Aggregation::Atomic);
    for _ in 0..5 {
        assert_eq!(engine.run(30).unwrap().totals.total(), 30);
    }
}

#[test]
fn concurrent_runs_on_a_shared_engine_stay_independent() {
    let engine = engine(3, 7, Aggregation::Atomic);
    std::thread::scope(|scope| {
        let handles: Vec<_> = (1..=4u64)
            .map(|multiple| {
                let engine = &engine;
                scope.spawn(move || (multiple * 21, engine.run(multiple * 21).unwrap()))
            })
            .collect();
        for handle in handles {
            let (total, report) = handle.join().unwrap();
            assert_eq!(report.totals.total(), total);
        }
    });
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn totals_always_match_request(
        workers in 1usize..8,
        batch in 1u64..64,
        multiple in 1u64..16,
        locked in any::<bool>(),
    ) {
        let aggregation = if locked { Aggregation::Locked } else { Aggregation::Atomic };
        let engine = engine(workers, batch, aggregation);
        let total = engine.config().unit() * multiple;

        let report = engine.run(total).unwrap();
        prop_assert_eq!(report.true_count() + report.false_count(), total);
        prop_assert_eq!(report.per_worker.len(), workers);

        let plan = Plan::new(total, engine.config());
        let mut summed = 0;
        for result in &report.per_worker {
            prop_assert_eq!(result.total(), plan.batches_per_worker * batch);
            summed += result.total();
        }
        prop_assert_eq!(summed, total);
    }

    // one or two values replayed give every worker the same raw entropy
    #[test]
    fn seeds_distinct_under_repeated_entropy(
        values in proptest::collection::vec(any::<u32>(), 1..3),
        count in 1usize..128,
    ) {
        let seeds = SeedDistributor::new(Replay { values, next: 0 })
            .distribute(count)
            .unwrap();
        let unique: HashSet<_> = seeds.iter().copied().collect();
        prop_assert_eq!(unique.len(), count);
        prop_assert!(seeds.iter().all(|&s| s != 0));
    }
}
