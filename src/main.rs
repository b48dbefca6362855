use rand::prelude::*;
use sched_model::{
    Algorithm, Job, SchedulerConfig, Sim,
    sim::{compare, Metrics},
};
use std::{env, error::Error, fs};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    // Optional JSON workload path; otherwise a seeded synthetic workload
    let jobs = match env::args().nth(1) {
        Some(path) => serde_json::from_str::<Vec<Job>>(&fs::read_to_string(path)?)?,
        None => bernoulli_jobs(40, 0.3, 0.4, 2, 8, 0),
    };
    let overhead = match env::args().nth(2) {
        Some(ticks) => ticks.parse()?,
        None => 0,
    };

    let mut runs: Vec<(String, Metrics)> = Vec::new();
    for algorithm in Algorithm::ALL {
        let config = SchedulerConfig::new(algorithm).with_overhead(overhead);
        let outcome = Sim::new(jobs.clone(), &config)?.run()?;

        println!("== {} ==", config.label());
        for segment in outcome.log.segments() {
            match segment.slot.pid() {
                Some(pid) => println!("  [{:>4}, {:>4})  P{}", segment.start, segment.end, pid),
                None => println!("  [{:>4}, {:>4})  {:?}", segment.start, segment.end, segment.slot),
            }
        }
        println!(
            "  waiting {:.2}  turnaround {:.2}  response {:.2}  utilization {:.1}%  switches {}",
            outcome.metrics.avg_waiting_time,
            outcome.metrics.avg_turnaround_time,
            outcome.metrics.avg_response_time,
            outcome.metrics.cpu_utilization * 100.0,
            outcome.context_switches,
        );
        runs.push((config.label(), outcome.metrics));
    }

    println!("== ranking by average waiting time ==");
    for (rank, (label, metrics)) in compare(runs.iter().map(|(l, m)| (l.as_str(), *m)))
        .into_iter()
        .enumerate()
    {
        println!("  {}. {:<36} {:.2}", rank + 1, label, metrics.avg_waiting_time);
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Each tick spawns a job with probability `p_arrival`, short with probability `p_short`.
fn bernoulli_jobs(
    ticks: u64,
    p_arrival: f64,
    p_short: f64,
    short_ticks: i64,
    long_ticks: i64,
    seed: u64,
) -> Vec<Job> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut jobs = Vec::new();

    for t in 0..ticks {
        if rng.random::<f64>() < p_arrival {
            let burst_time = if rng.random::<f64>() < p_short {
                short_ticks
            } else {
                long_ticks
            };

            let pid = jobs.len() as u64 + 1;
            jobs.push(
                Job::new(pid, t as i64, burst_time)
                    .with_priority(rng.random_range(0..4))
                    .with_name(format!("job{pid}")),
            );
        }
    }

    jobs
}
