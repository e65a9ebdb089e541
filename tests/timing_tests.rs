use pfor_triage::commands::{execute_parlaytime, ParlaytimeArgs};
use pfor_triage::timing::{compare_timings, parse_parlaytime_log};
use pretty_assertions::assert_eq;
use std::path::Path;

const ORIG_LOG: &str = "\
== CILK_WORKERS = 1 ==
Parlay time: 2.000
Parlay time: 4.000

== CILK_WORKERS = 2 ==
Parlay time: 1.000
Parlay time: 1.000

";

const TEST_LOG: &str = "\
== CILK_WORKERS = 2 ==
Parlay time: 0.500
Parlay time: 1.500

== CILK_WORKERS = 8 ==
Parlay time: 0.250
Parlay time: 0.250
";

const ICACHE: &str = "\
== CILK_WORKERS = 2 ==
          300      icache.misses:u
        1,200      icache.hit:u
";

fn write_inputs(base: &Path) {
    let data = base.join("data/wordCounts");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(data.join("exp1.parlaytime.orig.log"), ORIG_LOG).unwrap();
    std::fs::write(data.join("exp1.parlaytime.test.log"), TEST_LOG).unwrap();
    std::fs::write(data.join("exp1.icache.orig.txt"), ICACHE).unwrap();
    std::fs::write(data.join("exp1.icache.test.txt"), ICACHE).unwrap();
}

#[test]
fn test_join_keeps_shared_worker_counts() {
    let control = parse_parlaytime_log(ORIG_LOG).unwrap();
    let experiment = parse_parlaytime_log(TEST_LOG).unwrap();

    let rows = compare_timings(&control, &experiment).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].cilk_workers, 2);
    assert_eq!(rows[0].avg_parlaytime_orig, 1.0);
    assert_eq!(rows[0].avg_parlaytime_test, 1.0);
}

#[test]
fn test_parlaytime_writes_both_csv_files() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_inputs(temp_dir.path());

    let outputs = execute_parlaytime(&ParlaytimeArgs {
        base_dir: temp_dir.path().to_path_buf(),
        test: "wordCounts".to_string(),
        experiment_id: "exp1".to_string(),
        ece: 4,
    })
    .unwrap();

    assert_eq!(
        outputs.timing_csv,
        temp_dir.path().join("perf/wordCounts/exp1.ece4.r2.parlay.csv")
    );
    let timing = std::fs::read_to_string(&outputs.timing_csv).unwrap();
    assert_eq!(timing.lines().count(), 2);
    assert!(timing.starts_with("cilk_workers,avg_parlaytime_orig,"));

    let icache = std::fs::read_to_string(&outputs.icache_csv).unwrap();
    assert_eq!(
        icache.lines().nth(1),
        Some("2,300,1200,0.2,300,1200,0.2")
    );
}

#[test]
fn test_missing_log_is_an_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let result = execute_parlaytime(&ParlaytimeArgs {
        base_dir: temp_dir.path().to_path_buf(),
        test: "wordCounts".to_string(),
        experiment_id: "absent".to_string(),
        ece: 1,
    });
    assert!(result.is_err());
}
