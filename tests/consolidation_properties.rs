use symbolscan::lowlevel::is_close;
use symbolscan::{consolidate, Consolidator, Detection, Polarity};

/// Deterministic scatter of detections with clusters and loners.
fn scatter(n: usize, seed: u32) -> Vec<Detection> {
    let mut state = seed.wrapping_mul(2_654_435_761).max(1);
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state
    };
    (0..n)
        .map(|_| {
            let x = (next() % 200) as usize;
            let y = (next() % 150) as usize;
            let score = 0.7 + (next() % 300) as f32 / 1000.0;
            Detection::new(x, y, score)
        })
        .collect()
}

fn assert_no_close_pairs(dets: &[Detection], cw: usize, ch: usize) {
    for (i, a) in dets.iter().enumerate() {
        for b in &dets[i + 1..] {
            assert!(!is_close(a, b, cw, ch), "{a:?} and {b:?} are still close");
        }
    }
}

#[test]
fn consolidation_is_idempotent() {
    for seed in 1..8 {
        let raw = scatter(60, seed);
        let once = consolidate(&raw, 12, 9);
        let twice = consolidate(&once, 12, 9);
        assert_eq!(once, twice, "seed {seed}");
    }
}

#[test]
fn survivors_are_pairwise_far_apart() {
    for seed in 1..8 {
        let out = consolidate(&scatter(80, seed), 15, 10);
        assert_no_close_pairs(&out, 15, 10);
    }
}

#[test]
fn scores_are_preserved_and_maximum_survives() {
    for seed in 1..8 {
        let raw = scatter(50, seed);
        let out = consolidate(&raw, 10, 10);
        assert!(out.iter().all(|d| raw.contains(d)));
        let best = raw.iter().map(|d| d.score).fold(f32::NEG_INFINITY, f32::max);
        assert!(out.iter().any(|d| d.score == best));
    }
}

#[test]
fn score_sum_never_grows() {
    for seed in 1..8 {
        let raw = scatter(70, seed);
        let out = consolidate(&raw, 20, 20);
        let raw_sum: f32 = raw.iter().map(|d| d.score).sum();
        let out_sum: f32 = out.iter().map(|d| d.score).sum();
        assert!(out_sum <= raw_sum + 1e-3);
        assert!(out.len() <= raw.len());
    }
}

#[test]
fn proximity_is_symmetric() {
    let dets = scatter(30, 5);
    for a in &dets {
        for b in &dets {
            assert_eq!(is_close(a, b, 7, 4), is_close(b, a, 7, 4));
        }
    }
}

#[test]
fn close_pair_keeps_higher_score() {
    let a = Detection::new(100, 100, 0.81);
    let b = Detection::new(104, 97, 0.93);
    assert_eq!(consolidate(&[a, b], 5, 5), vec![b]);
    assert_eq!(consolidate(&[b, a], 5, 5), vec![b]);
}

#[test]
fn transitive_chain_needs_more_than_two_passes() {
    let chain: Vec<_> = (0..5)
        .map(|i| Detection::new(i * 6, 0, 0.75 + i as f32 * 0.02))
        .collect();
    let two_pass = Consolidator::new(6, 6).with_max_passes(Some(2)).run(&chain);
    let fixed = Consolidator::new(6, 6).run(&chain);
    assert_eq!(two_pass.len(), 3);
    assert_eq!(fixed, vec![chain[4]]);
}

#[test]
fn lower_is_better_keeps_minimum() {
    let dets = [
        Detection::new(10, 10, 0.2),
        Detection::new(12, 11, 0.05),
        Detection::new(80, 80, 0.4),
    ];
    let out = Consolidator::new(5, 5)
        .with_polarity(Polarity::LowerIsBetter)
        .run(&dets);
    assert_eq!(out, vec![Detection::new(12, 11, 0.05), Detection::new(80, 80, 0.4)]);
}
