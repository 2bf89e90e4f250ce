//! Integration tests: full pipeline from trace JSON to DOT output.

use std::path::PathBuf;

use scanviz_core::{
    check_trace, render_trace, LabelError, LabelMode, Step, Trace, TraceError,
};

fn demos_dir() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir.join("../../demos")
}

fn load_demo(name: &str) -> Trace {
    let path = demos_dir().join(name);
    Trace::load(&path).unwrap_or_else(|e| panic!("cannot load {}: {}", path.display(), e))
}

fn trace_from_json(json: &str) -> Trace {
    let steps: Vec<Step> = serde_json::from_str(json).unwrap();
    Trace::from_steps(steps).unwrap()
}

// A minimal three-step scan: root, one prefix query under it, one result
// row under that.
const SMALL_TRACE: &str = r#"[
    {"Id": 1, "ParentId": null, "Data": {"Type": "Start"}},
    {"Id": 2, "ParentId": 1, "Data": {"Type": "PrefixQuery", "PartitionKeyPrefix": "abc", "PartitionKeyLowerBound": ""}},
    {"Id": 3, "ParentId": 2, "Data": {"Type": "EntitySegment", "Count": 1,
        "First": {"PartitionKey": "abc123", "RowKey": "r1"},
        "Last": {"PartitionKey": "abc123", "RowKey": "r1"}}}
]"#;

// ── small trace, plain mode ─────────────────────────────────────────────

#[test]
fn plain_small_trace_end_to_end() {
    let trace = trace_from_json(SMALL_TRACE);
    let graph = render_trace(&trace, LabelMode::Plain, "dfs").unwrap();
    let dot = graph.to_dot();

    // Root is skipped and its children get no edge.
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);
    assert!(!dot.contains("\t1 ["));
    assert!(!dot.contains("1 -> 2"));

    assert!(dot.contains(
        "\t2 [label=<<b>Query 1</b>: PK = 'abc*'> fillcolor=darkslategray1 shape=box style=filled]"
    ));
    assert!(dot.contains(
        "\t3 [label=<<b>1 result</b>: abc123, r1> fillcolor=darkseagreen1 shape=box style=filled]"
    ));
    assert!(dot.contains("\t2 -> 3\n"));
}

// ── small trace, linked mode ────────────────────────────────────────────

#[test]
fn linked_small_trace_end_to_end() {
    let trace = trace_from_json(SMALL_TRACE);
    let graph = render_trace(&trace, LabelMode::Linked, "dfs").unwrap();
    let dot = graph.to_dot();

    // The root draws as a rounded box in linked mode.
    assert_eq!(graph.node_count(), 3);
    assert!(dot.contains("\t1 [label=<<b>Start</b>> shape=box style=rounded]"));

    // The prefix query sits directly under the root, whose prefix is
    // empty, so its own prefix shows unstripped.
    assert!(dot.contains("\t2 [label=\"abc*\" fillcolor=darkslategray1 shape=box style=filled]"));

    // The segment resolves 'abc' from its ancestor and strips it.
    assert!(dot.contains("href=\"https://www.nuget.org/packages/abc123\""));
    assert!(dot.contains("<u><font color=\"blue\">...123</font></u>"));
    assert!(dot.contains("<td>(1 total)</td>"));

    // Still the only edge: the root's child keeps its sentinel parent
    // invisible even though the root node itself is drawn.
    assert_eq!(graph.edge_count(), 1);
    assert!(dot.contains("\t2 -> 3\n"));
    assert!(!dot.contains("1 -> 2"));
}

// ── demo traces ─────────────────────────────────────────────────────────

#[test]
fn dfs_demo_summary() {
    let trace = load_demo("steps-example1-DFS.json");
    let summary = check_trace(&trace).unwrap();
    assert_eq!(summary.steps, 12);
    assert_eq!(summary.queries, 6);
    assert_eq!(summary.rows, 7);
    assert_eq!(summary.nodes, 11);
    assert_eq!(summary.edges, 9);
}

#[test]
fn bfs_demo_summary() {
    let trace = load_demo("steps-example1-BFS.json");
    let summary = check_trace(&trace).unwrap();
    assert_eq!(summary.steps, 12);
    assert_eq!(summary.queries, 6);
    assert_eq!(summary.rows, 7);
    assert_eq!(summary.nodes, 11);
    assert_eq!(summary.edges, 9);
}

#[test]
fn dfs_demo_plain_query_numbering_follows_input_order() {
    let trace = load_demo("steps-example1-DFS.json");
    let dot = render_trace(&trace, LabelMode::Plain, "dfs")
        .unwrap()
        .to_dot();

    assert!(dot.contains("<b>Query 1</b>: PK = '' and RK &gt; ''"));
    assert!(dot.contains("<b>Query 2</b>: PK = '*'"));
    assert!(dot.contains("<b>Query 3</b>: PK = 'az$newtonsoft.json' and RK &gt; '12.0.2'"));
    assert!(dot.contains("<b>Query 4</b>: PK = 'a*' and PK &gt; 'az$newtonsoft.json'"));
    assert!(dot.contains("<b>Query 5</b>: PK = 'az$nuget.versioning' and RK &gt; '6.5.0'"));
    assert!(dot.contains("<b>Query 6</b>: PK = 'az*' and PK &gt; 'az$nuget.versioning'"));
}

#[test]
fn dfs_demo_plain_segments() {
    let trace = load_demo("steps-example1-DFS.json");
    let dot = render_trace(&trace, LabelMode::Plain, "dfs")
        .unwrap()
        .to_dot();

    assert!(dot.contains("<b>2 results</b>: az$newtonsoft.json, 12.0.1 - az$newtonsoft.json, 12.0.2"));
    assert!(dot.contains("<b>1 result</b>: az$newtonsoft.json, 12.0.3"));
    assert!(dot.contains("<b>2 results</b>: az$nuget.frameworks, 6.5.0 - az$nuget.versioning, 6.5.0"));
    assert!(dot.contains("<b>1 result</b>: bz$serilog, 3.1.1"));
}

#[test]
fn dfs_demo_linked_labels_strip_resolved_prefixes() {
    let trace = load_demo("steps-example1-DFS.json");
    let dot = render_trace(&trace, LabelMode::Linked, "dfs")
        .unwrap()
        .to_dot();

    // Step 11's prefix 'az' strips against its parent's prefix 'a'.
    assert!(dot.contains("\t11 [label=\"...z*\""));
    // Step 7's own prefix resolves against the empty root prefix.
    assert!(dot.contains("\t7 [label=\"a*\""));
    // Step 8 spans two partitions under prefix 'a': both endpoints linked
    // with their row keys as versions.
    assert!(dot.contains("href=\"https://www.nuget.org/packages/nuget.frameworks/6.5.0\""));
    assert!(dot.contains("href=\"https://www.nuget.org/packages/nuget.versioning/6.5.0\""));
    assert!(dot.contains("<u><font color=\"blue\">...z$nuget.frameworks</font></u>"));
    // Step 9 has a child, so it links its partition key without a version.
    assert!(dot.contains("href=\"https://www.nuget.org/packages/nuget.versioning\" title=\"nuget.versioning\""));
    // Step 2 has no children: plain text with the empty key.
    assert!(dot.contains("\t2 [label=\"pk: \""));
}

#[test]
fn demo_traces_agree_on_scanned_rows() {
    let dfs = check_trace(&load_demo("steps-example1-DFS.json")).unwrap();
    let bfs = check_trace(&load_demo("steps-example1-BFS.json")).unwrap();
    // Same scan, different traversal order: identical row and query
    // totals.
    assert_eq!(dfs.rows, bfs.rows);
    assert_eq!(dfs.queries, bfs.queries);
}

// ── malformed traces ────────────────────────────────────────────────────

#[test]
fn unknown_step_type_fails_to_load() {
    let json = r#"[
        {"Id": 1, "ParentId": null, "Data": {"Type": "Start"}},
        {"Id": 2, "ParentId": 1, "Data": {"Type": "SegmentQuery", "PartitionKey": "a"}}
    ]"#;
    let result: Result<Vec<Step>, _> = serde_json::from_str(json);
    assert!(result.is_err());
}

#[test]
fn duplicate_ids_fail_to_index() {
    let json = r#"[
        {"Id": 1, "ParentId": null, "Data": {"Type": "Start"}},
        {"Id": 1, "ParentId": null, "Data": {"Type": "Start"}}
    ]"#;
    let steps: Vec<Step> = serde_json::from_str(json).unwrap();
    let err = Trace::from_steps(steps).unwrap_err();
    assert!(matches!(err, TraceError::DuplicateId { id: 1 }));
}

#[test]
fn dangling_parent_fails_at_render_time() {
    let json = r#"[
        {"Id": 1, "ParentId": null, "Data": {"Type": "Start"}},
        {"Id": 3, "ParentId": 2, "Data": {"Type": "EntitySegment", "Count": 1,
            "First": {"PartitionKey": "a", "RowKey": "r"},
            "Last": {"PartitionKey": "a", "RowKey": "r"}}}
    ]"#;
    let trace = trace_from_json(json);
    let err = render_trace(&trace, LabelMode::Plain, "dfs").unwrap_err();
    assert!(matches!(
        err,
        LabelError::Trace(TraceError::MissingParent { id: 3, parent_id: 2 })
    ));
}

#[test]
fn cyclic_parent_chain_fails_at_render_time() {
    // Parent links that loop back with no bearer must abort the pass, not
    // spin.
    let json = r#"[
        {"Id": 2, "ParentId": 3, "Data": {"Type": "PartitionKeyQuery", "PartitionKey": "a", "RowKeySkip": null}},
        {"Id": 3, "ParentId": 2, "Data": {"Type": "PartitionKeyQuery", "PartitionKey": "a", "RowKeySkip": null}}
    ]"#;
    let trace = trace_from_json(json);
    let err = render_trace(&trace, LabelMode::Plain, "dfs").unwrap_err();
    assert!(matches!(
        err,
        LabelError::Trace(TraceError::CyclicChain { id: 2 })
    ));
    assert!(check_trace(&trace).is_err());
}

#[test]
fn mismatched_prefix_fails_only_where_stripping_happens() {
    // The segment's keys do not extend its ancestor's prefix. Plain mode
    // never strips, so it renders; linked mode fails.
    let json = r#"[
        {"Id": 1, "ParentId": null, "Data": {"Type": "Start"}},
        {"Id": 2, "ParentId": 1, "Data": {"Type": "PrefixQuery", "PartitionKeyPrefix": "zz", "PartitionKeyLowerBound": ""}},
        {"Id": 3, "ParentId": 2, "Data": {"Type": "EntitySegment", "Count": 1,
            "First": {"PartitionKey": "abc", "RowKey": "r"},
            "Last": {"PartitionKey": "abc", "RowKey": "r"}}}
    ]"#;
    let trace = trace_from_json(json);
    assert!(render_trace(&trace, LabelMode::Plain, "dfs").is_ok());
    let err = render_trace(&trace, LabelMode::Linked, "dfs").unwrap_err();
    assert!(matches!(err, LabelError::PrefixMismatch { .. }));
}
