use pfor_triage::aggregator::cache::{lookup, read_cache, write_cache};
use pfor_triage::aggregator::{
    aggregate_lines, CachePolicy, CachedSummary, IntrinsicVersion, LogSource, PerfLogAggregator,
    PerfSummary, SourceFingerprint,
};
use pfor_triage::utils::PerfLogError;
use pretty_assertions::assert_eq;

const HOST_A: [&str; 3] = [
    "builtin,0,100,10,0,hostA,loc1,loc1",
    "builtin,1,50,5,0,hostA,loc2,loc2",
    "builtin,2,20,2,3,hostA,loc2,loc3",
];

#[test]
fn test_three_versions_for_one_host() {
    let summary = aggregate_lines(HOST_A).unwrap();
    let host = summary.host("hostA").unwrap();

    let baseline = host.accumulators(IntrinsicVersion::Baseline);
    assert_eq!(baseline.len(), 1);
    assert_eq!(baseline[0].entry_count, 1);
    assert_eq!(baseline[0].tripcount_sum, 100.0);

    let eager = host.accumulators(IntrinsicVersion::Ef);
    assert_eq!(eager.len(), 1);
    assert_eq!(eager[0].eager_entry_count, 1);

    let dac = host.accumulators(IntrinsicVersion::Dac);
    assert_eq!(dac.len(), 1);
    assert_eq!(dac[0].dac_entry_count, 1);
    assert_eq!(dac[0].depth_sum, 3.0);

    assert_eq!(host.origloc, vec!["loc1", "loc2"]);
}

#[test]
fn test_order_independence() {
    let forward = aggregate_lines(HOST_A).unwrap();
    let mut reversed = HOST_A;
    reversed.reverse();
    let backward = aggregate_lines(reversed).unwrap();

    assert_eq!(forward, backward);
}

#[test]
fn test_entry_counts_stay_consistent() {
    let lines = [
        "builtin,2,8,1,0,h,o,i",
        "builtin,2,8,1,4,h,o,i",
        "calledat,h,main.C:1:1,main,0",
        "builtin,2,8,1,2,h,o,i",
    ];

    for end in 1..=lines.len() {
        let summary = aggregate_lines(lines[..end].iter().copied()).unwrap();
        for profile in summary.hosts.values() {
            for accumulators in profile.versions.values() {
                assert!(accumulators.iter().all(|acc| acc.is_consistent()));
            }
        }
    }

    let summary = aggregate_lines(lines).unwrap();
    let acc = &summary.host("h").unwrap().accumulators(IntrinsicVersion::Dac)[0];
    assert_eq!(acc.entry_count, 3);
    assert_eq!(acc.eager_entry_count, 1);
    assert_eq!(acc.dac_entry_count, 2);
}

#[test]
fn test_callers_are_split_by_depth() {
    let summary = aggregate_lines([
        "calledat,h,a.C:1:1,spawner,0",
        "calledat,h,a.C:2:1,spawner,0",
        "calledat,h,b.C:5:5,recurse,2",
    ])
    .unwrap();
    let host = summary.host("h").unwrap();

    assert_eq!(host.ef_callers["spawner"], vec!["a.C:1:1", "a.C:2:1"]);
    assert_eq!(host.dac_callers["recurse"], vec!["b.C:5:5"]);
    assert!(host.accumulators(IntrinsicVersion::Baseline).is_empty());
}

#[test]
fn test_unknown_tag_is_fatal() {
    let err = aggregate_lines(["builtin,0,1,1,0,h,o,i", "sample,1,2"]).unwrap_err();
    assert!(matches!(err, PerfLogError::UnknownTag { line: 2, .. }));
}

#[test]
fn test_trailing_blank_line_is_dropped() {
    let summary = aggregate_lines(["builtin,0,1,1,0,h,o,i", ""]).unwrap();
    assert_eq!(summary.hosts.len(), 1);
}

#[test]
fn test_summary_json_reload() {
    let summary = aggregate_lines(HOST_A).unwrap();
    let json = serde_json::to_string(&summary).unwrap();
    let reloaded: PerfSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(summary, reloaded);
}

#[test]
fn test_gzip_log_streams() {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(HOST_A.join("\n").as_bytes()).unwrap();
    let bytes = encoder.finish().unwrap();
    let total = bytes.len() as u64;

    let source = LogSource::from_reader(std::io::Cursor::new(bytes), total).unwrap();
    assert!(source.compressed);

    let mut aggregator = PerfLogAggregator::new();
    aggregator.consume(source.reader, || {}).unwrap();
    assert_eq!(aggregator.lines_processed(), 3);
    assert_eq!(aggregator.finish(), aggregate_lines(HOST_A).unwrap());
    assert_eq!(source.counter.get(), total);
}

#[test]
fn test_cache_policies() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("wordCounts.perf.short.json");
    let summary = aggregate_lines(HOST_A).unwrap();
    let built_from = SourceFingerprint::of_bytes(b"old log");
    let changed = SourceFingerprint::of_bytes(b"new log");

    write_cache(&path, &CachedSummary::new(summary.clone(), Some(built_from.clone()))).unwrap();
    assert_eq!(read_cache(&path).unwrap().summary, summary);

    assert_eq!(
        lookup(&path, CachePolicy::Verify, Some(&built_from)),
        Some(summary.clone())
    );
    assert_eq!(lookup(&path, CachePolicy::Verify, Some(&changed)), None);
    assert_eq!(lookup(&path, CachePolicy::Trust, Some(&changed)), Some(summary));
    assert_eq!(lookup(&path, CachePolicy::Refresh, Some(&built_from)), None);
}
