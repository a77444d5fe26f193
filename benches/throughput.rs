use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use criterion::{criterion_group, criterion_main, Criterion};
use rulescope::parse::{parse_dataset, parse_rules};
use rulescope::{Dataset, DecisionList};

/// A shared 5 000-row dataset and a 20-rule list learned from it.
fn build_shared() -> (Arc<Dataset>, DecisionList) {
    let mut text = String::from("a,b,c,label\n");
    for r in 0..5_000 {
        let label = if r % 3 == 0 { "yes" } else { "no" };
        text.push_str(&format!("{},{},{},{label}\n", r % 97, r % 31, r % 7));
    }
    let dataset = parse_dataset(&text, ',', "label").unwrap();

    let mut rules = String::new();
    for i in 0..20 {
        let label = if i % 2 == 0 { "yes" } else { "no" };
        rules.push_str(&format!(
            "if a >= {} and b < {} then {label} ({}/2)\n",
            i * 4,
            5 + i,
            10 + i
        ));
    }
    rules.push_str("else no (1/1)\n");
    let list = parse_rules(&rules, dataset.catalog()).unwrap();

    (Arc::new(dataset), list)
}

/// Independent lists evaluated concurrently over one read-only dataset.
fn bench_throughput(c: &mut Criterion) {
    let thread_counts = [1, 2, 4, 8];

    let mut group = c.benchmark_group("throughput");
    group.measurement_time(Duration::from_secs(5));

    for &threads in &thread_counts {
        let (dataset, list) = build_shared();
        let rows = Arc::new(dataset.all_indices());

        group.bench_function(&format!("{threads}_threads"), |b| {
            b.iter_custom(|iters| {
                let per_thread = iters / threads as u64;
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let ds = Arc::clone(&dataset);
                        let rows = Arc::clone(&rows);
                        let mut list = list.clone();
                        thread::spawn(move || {
                            let start = Instant::now();
                            for _ in 0..per_thread {
                                let _ = list.evaluate(&ds, &rows);
                            }
                            start.elapsed()
                        })
                    })
                    .collect();

                let mut max_elapsed = Duration::ZERO;
                for h in handles {
                    let elapsed = h.join().unwrap();
                    if elapsed > max_elapsed {
                        max_elapsed = elapsed;
                    }
                }
                max_elapsed
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_throughput);
criterion_main!(benches);
