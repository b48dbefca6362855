use pretty_assertions::assert_eq;
use sched_model::{
    Algorithm, ConfigError, Job, LevelConfig, ProcessState, RunState, SchedulerConfig, Sim,
    SimError, SimEvent, WorkloadError,
    core::{Pid, Slot},
};

fn run(jobs: Vec<Job>, config: SchedulerConfig) -> sched_model::SimOutcome {
    Sim::new(jobs, &config).unwrap().run().unwrap()
}

fn column<T>(outcome: &sched_model::SimOutcome, f: impl Fn(&sched_model::ProcessReport) -> T) -> Vec<T> {
    outcome.processes.iter().map(f).collect()
}

fn executed(outcome: &sched_model::SimOutcome) -> Vec<Option<Pid>> {
    outcome.log.entries().iter().map(|e| e.slot.pid()).collect()
}

#[test]
fn test_fcfs_two_processes() {
    let outcome = run(
        vec![Job::new(1, 0, 5), Job::new(2, 1, 3)],
        SchedulerConfig::new(Algorithm::Fcfs),
    );

    assert_eq!(column(&outcome, |p| p.waiting_time), vec![0, 4]);
    assert_eq!(column(&outcome, |p| p.turnaround_time), vec![5, 7]);
    assert_eq!(column(&outcome, |p| p.completion_time), vec![5, 8]);
    assert_eq!(outcome.metrics.avg_waiting_time, 2.0);
    assert_eq!(outcome.metrics.avg_turnaround_time, 6.0);
    assert_eq!(outcome.metrics.cpu_utilization, 1.0);
    assert_eq!(outcome.total_ticks, 8);
}

#[test]
fn test_round_robin_quantum_two() {
    let outcome = run(
        vec![Job::new(1, 0, 4), Job::new(2, 0, 2)],
        SchedulerConfig::new(Algorithm::RoundRobin).with_quantum(2),
    );

    assert_eq!(
        executed(&outcome),
        vec![Some(1), Some(1), Some(2), Some(2), Some(1), Some(1)]
    );
    assert_eq!(column(&outcome, |p| p.waiting_time), vec![2, 2]);
    assert_eq!(column(&outcome, |p| p.turnaround_time), vec![6, 4]);
    assert_eq!(column(&outcome, |p| p.response_time), vec![0, 2]);
    assert_eq!(outcome.scheduler, "rr(q=2)");
}

#[test]
fn test_round_robin_continues_alone() {
    // A lone process keeps the CPU across slice boundaries
    let outcome = run(
        vec![Job::new(1, 0, 5)],
        SchedulerConfig::new(Algorithm::RoundRobin).with_quantum(2),
    );
    assert_eq!(outcome.log.segments().len(), 1);
    assert_eq!(outcome.context_switches, 0);
}

#[test]
fn test_srtf_preempts_on_shorter_arrival() {
    let outcome = run(
        vec![Job::new(1, 0, 7), Job::new(2, 2, 2)],
        SchedulerConfig::new(Algorithm::Srtf),
    );

    assert_eq!(
        executed(&outcome),
        vec![
            Some(1),
            Some(1),
            Some(2),
            Some(2),
            Some(1),
            Some(1),
            Some(1),
            Some(1),
            Some(1)
        ]
    );
    assert_eq!(column(&outcome, |p| p.turnaround_time), vec![9, 2]);
    assert_eq!(column(&outcome, |p| p.waiting_time), vec![2, 0]);
    assert_eq!(column(&outcome, |p| p.response_time), vec![0, 0]);
    assert_eq!(outcome.context_switches, 2);
}

#[test]
fn test_srtf_with_switch_overhead() {
    let outcome = run(
        vec![Job::new(1, 0, 7), Job::new(2, 2, 2)],
        SchedulerConfig::new(Algorithm::Srtf).with_overhead(1),
    );

    assert_eq!(column(&outcome, |p| p.completion_time), vec![11, 5]);
    assert_eq!(outcome.log.count(Slot::SWITCH), 2);
    assert_eq!(outcome.total_ticks, 11);
    assert_eq!(outcome.metrics.cpu_utilization, 9.0 / 11.0);
}

#[test]
fn test_sjf_does_not_preempt() {
    let outcome = run(
        vec![Job::new(1, 0, 6), Job::new(2, 1, 4), Job::new(3, 2, 2)],
        SchedulerConfig::new(Algorithm::Sjf),
    );

    assert_eq!(column(&outcome, |p| p.completion_time), vec![6, 12, 8]);
    assert_eq!(column(&outcome, |p| p.waiting_time), vec![0, 7, 4]);
}

#[test]
fn test_priority_modes() {
    let jobs = vec![
        Job::new(1, 0, 3).with_priority(2),
        Job::new(2, 1, 2).with_priority(0),
        Job::new(3, 1, 1).with_priority(1),
    ];

    let plain = run(jobs.clone(), SchedulerConfig::new(Algorithm::Priority));
    assert_eq!(column(&plain, |p| p.completion_time), vec![3, 5, 6]);

    let preemptive = run(jobs, SchedulerConfig::new(Algorithm::PriorityPreemptive));
    assert_eq!(column(&preemptive, |p| p.completion_time), vec![6, 3, 4]);
    assert_eq!(column(&preemptive, |p| p.response_time), vec![0, 0, 2]);
}

#[test]
fn test_multilevel_higher_level_preempts() {
    // Priority 2 lands in the FCFS level, priority 0 in the top RR(2) level
    let outcome = run(
        vec![
            Job::new(1, 0, 5).with_priority(2),
            Job::new(2, 2, 3).with_priority(0),
        ],
        SchedulerConfig::new(Algorithm::Multilevel),
    );

    assert_eq!(
        outcome.log.pids().collect::<Vec<_>>(),
        vec![1, 1, 2, 2, 2, 1, 1, 1]
    );
    assert_eq!(column(&outcome, |p| p.completion_time), vec![8, 5]);
    assert_eq!(outcome.context_switches, 2);
    assert_eq!(outcome.scheduler, "multilevel[rr(q=2), rr(q=4), fcfs]");
}

#[test]
fn test_multilevel_explicit_queue_level() {
    let config = SchedulerConfig::new(Algorithm::Multilevel).with_levels(vec![
        LevelConfig::new(Algorithm::Fcfs, None),
        LevelConfig::new(Algorithm::Sjf, None),
    ]);
    let outcome = run(
        vec![
            Job::new(1, 0, 4).with_priority(0).with_queue_level(1),
            Job::new(2, 1, 1).with_priority(1).with_queue_level(0),
        ],
        config,
    );

    assert_eq!(column(&outcome, |p| p.completion_time), vec![5, 2]);
}

#[test]
fn test_idle_gap_lowers_utilization() {
    let outcome = run(
        vec![Job::new(1, 0, 2), Job::new(2, 5, 1)],
        SchedulerConfig::new(Algorithm::Fcfs),
    );

    assert_eq!(
        executed(&outcome),
        vec![Some(1), Some(1), None, None, None, Some(2)]
    );
    assert_eq!(outcome.log.count(Slot::IDLE), 3);
    assert_eq!(outcome.metrics.cpu_utilization, 0.5);
    assert_eq!(outcome.metrics.throughput, 2.0 / 6.0);
}

#[test]
fn test_run_until_pauses_and_resumes() {
    let mut sim = Sim::new(
        vec![Job::new(1, 0, 5), Job::new(2, 1, 3)],
        &SchedulerConfig::new(Algorithm::Fcfs),
    )
    .unwrap();
    assert_eq!(sim.state(), RunState::NotStarted);

    assert_eq!(sim.run_until(3).unwrap(), RunState::Running);
    assert_eq!(sim.now(), 3);
    assert!(sim.reports().is_empty());

    let outcome = sim.run().unwrap();
    assert_eq!(sim.state(), RunState::Completed);
    assert_eq!(outcome.total_ticks, 8);
}

#[test]
fn test_step_reports_events() {
    let mut sim = Sim::new(vec![Job::new(1, 0, 1)], &SchedulerConfig::new(Algorithm::Fcfs)).unwrap();

    let outcome = sim.step().unwrap();
    assert_eq!(
        outcome.events,
        vec![
            SimEvent::StateChange {
                pid: 1,
                from: ProcessState::New,
                to: ProcessState::Ready
            },
            SimEvent::StateChange {
                pid: 1,
                from: ProcessState::Ready,
                to: ProcessState::Running
            },
            SimEvent::CpuCurrentChange {
                from: None,
                to: Some(1)
            },
            SimEvent::StateChange {
                pid: 1,
                from: ProcessState::Running,
                to: ProcessState::Terminated
            },
        ]
    );
    assert_eq!(outcome.completed, vec![1]);
    assert!(sim.all_jobs_completed());
    assert!(sim.step().unwrap().events.is_empty());
}

#[test]
fn test_empty_workload() {
    let outcome = run(vec![], SchedulerConfig::new(Algorithm::Srtf));
    assert_eq!(outcome.total_ticks, 0);
    assert!(outcome.processes.is_empty());
    assert_eq!(outcome.metrics, sched_model::Metrics::default());
}

#[test]
fn test_rejects_bad_input() {
    let fcfs = SchedulerConfig::new(Algorithm::Fcfs);

    assert!(matches!(
        Sim::new(vec![Job::new(1, 0, 1), Job::new(1, 1, 1)], &fcfs),
        Err(SimError::Workload(WorkloadError::DuplicatePid(1)))
    ));
    assert!(matches!(
        Sim::new(vec![Job::new(1, 0, 0)], &fcfs),
        Err(SimError::Workload(WorkloadError::NonPositiveBurst { pid: 1, .. }))
    ));
    assert!(matches!(
        Sim::new(
            vec![Job::new(1, 0, 1)],
            &SchedulerConfig::new(Algorithm::RoundRobin).with_quantum(0)
        ),
        Err(SimError::Config(ConfigError::NonPositiveQuantum(0)))
    ));
    assert!(matches!(
        Sim::new(vec![Job::new(1, 0, 1)], &fcfs.clone().with_overhead(-1)),
        Err(SimError::Config(ConfigError::NegativeOverhead(-1)))
    ));
    assert!(matches!(
        Sim::new(
            vec![Job::new(1, 0, 1).with_queue_level(5)],
            &SchedulerConfig::new(Algorithm::Multilevel)
        ),
        Err(SimError::Workload(WorkloadError::QueueLevelOutOfRange {
            pid: 1,
            level: 5,
            levels: 3
        }))
    ));
}

#[test]
fn test_outcome_serializes() {
    let config = SchedulerConfig::from_json(r#"{"algorithm": "rr", "quantum": 1}"#).unwrap();
    let jobs: Vec<Job> = serde_json::from_str(
        r#"[{"pid": 1, "arrival_time": 0, "burst_time": 1, "name": "init"}]"#,
    )
    .unwrap();
    let outcome = Sim::new(jobs, &config).unwrap().run().unwrap();

    let value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(value["scheduler"], "rr(q=1)");
    assert_eq!(value["processes"][0]["name"], "init");
    assert_eq!(value["log"][0]["pid"], 1);
    assert!(value["log"][0].get("slot").is_none());
    assert_eq!(value["metrics"]["cpu_utilization"], 1.0);
}

#[test]
fn test_log_json_reports_pid_per_tick() {
    let jobs = vec![Job::new(1, 0, 1), Job::new(2, 3, 1)];

    let plain = run(jobs.clone(), SchedulerConfig::new(Algorithm::Fcfs));
    assert_eq!(
        serde_json::to_string(&plain.log).unwrap(),
        r#"[{"tick":0,"pid":1},{"tick":1,"pid":"idle"},{"tick":2,"pid":"idle"},{"tick":3,"pid":2}]"#
    );

    // Overhead ticks appear as "switch" in place of a pid
    let charged = run(jobs, SchedulerConfig::new(Algorithm::Fcfs).with_overhead(1));
    assert_eq!(
        serde_json::to_string(&charged.log).unwrap(),
        r#"[{"tick":0,"pid":1},{"tick":1,"pid":"idle"},{"tick":2,"pid":"idle"},{"tick":3,"pid":"switch"},{"tick":4,"pid":2}]"#
    );
}

#[test]
fn test_quantum_ignored_outside_round_robin() {
    let config = SchedulerConfig::from_json(r#"{"algorithm": "fcfs", "quantum": 0}"#).unwrap();
    let outcome = run(vec![Job::new(1, 0, 2)], config);
    assert_eq!(outcome.total_ticks, 2);
}

#[test]
fn test_large_workload_completes() {
    // Many simultaneous arrivals keep every ready queue long for the whole run
    let jobs: Vec<Job> = (1..=2000).map(|pid| Job::new(pid, 0, 1)).collect();

    for algorithm in [Algorithm::Fcfs, Algorithm::RoundRobin, Algorithm::Multilevel] {
        let outcome = run(jobs.clone(), SchedulerConfig::new(algorithm));
        assert_eq!(outcome.total_ticks, 2000);
        assert_eq!(outcome.processes.len(), 2000);
        assert_eq!(outcome.processes[1999].completion_time, 2000);
    }
}
