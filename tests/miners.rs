use sfp::{
    config::Config,
    digraph::{Digraph, SubgraphNode},
    graph::Graph,
    lattice::{DataType, Node},
    loader::from_iter,
    miners::{Dfs, Miner, Vsigram},
    report::{ChainReporter, CollectReporter, FileReporter, Reporter, UniqueReporter},
    store::{Store, StoreType},
};
use std::collections::BTreeSet;

fn create_fixture() -> Graph {
    let vertices = vec![
        (1, "black"),
        (2, "black"),
        (3, "red"),
        (4, "red"),
        (5, "red"),
        (6, "red"),
    ];
    let edges = vec![(1, 3, ""), (1, 4, ""), (3, 4, ""), (2, 5, ""), (5, 6, ""), (6, 2, "")];
    from_iter(vertices, edges)
}

/// Three copies of a labelled triangle; the first two carry an extra
/// `c -> d` arc and the last two an extra `b -> e` arc.
fn create_motifs() -> Graph {
    let mut vertices = vec![];
    let mut edges = vec![];
    for i in 0..3 {
        let base = 10 * i;
        vertices.extend(vec![(base, "a"), (base + 1, "b"), (base + 2, "c")]);
        edges.extend(vec![
            (base, base + 1, "x"),
            (base + 1, base + 2, "x"),
            (base, base + 2, "y"),
        ]);
        if i < 2 {
            vertices.push((base + 3, "d"));
            edges.push((base + 2, base + 3, "z"));
        }
        if i > 0 {
            vertices.push((base + 4, "e"));
            edges.push((base + 1, base + 4, "z"));
        }
    }
    from_iter(vertices, edges)
}

fn labels(nodes: &[SubgraphNode]) -> BTreeSet<Vec<u8>> {
    nodes.iter().map(|n| n.label().to_vec()).collect()
}

fn mine_dfs(dt: &Digraph) -> Vec<SubgraphNode> {
    let mut reporter: CollectReporter<SubgraphNode> = CollectReporter::new();
    Dfs::open(&StoreType::Mem)
        .unwrap()
        .mine(dt, &mut reporter)
        .unwrap();
    reporter.into_nodes()
}

fn mine_vsigram(dt: &Digraph, workers: usize) -> Vec<SubgraphNode> {
    let mut reporter: CollectReporter<SubgraphNode> = CollectReporter::new();
    Vsigram::new(workers, 4).mine(dt, &mut reporter).unwrap();
    reporter.into_nodes()
}

#[test]
fn test_dfs_fixture() {
    let dt = Digraph::new(create_fixture(), Config::default()).unwrap();
    let nodes = mine_dfs(&dt);
    assert_eq!(nodes.len(), 5);
    assert_eq!(labels(&nodes).len(), 5);
    for node in &nodes {
        assert!(node.support().unwrap() >= 2);
    }
}

#[test]
fn test_dfs_reports_acceptable_only() {
    let config = Config::default().min_edges(1).max_edges(1);
    let dt = Digraph::new(create_fixture(), config).unwrap();
    let nodes = mine_dfs(&dt);
    assert_eq!(nodes.len(), 2);
    assert!(nodes.iter().all(|n| n.pattern().num_edges() == 1));
}

#[test]
fn test_vsigram_matches_dfs() {
    for graph in vec![create_fixture(), create_motifs()] {
        let dt = Digraph::new(graph, Config::default()).unwrap();
        let expected = labels(&mine_dfs(&dt));
        for &workers in &[1, 4] {
            let nodes = mine_vsigram(&dt, workers);
            assert_eq!(nodes.len(), expected.len());
            assert_eq!(labels(&nodes), expected);
        }
    }
}

#[test]
fn test_vsigram_on_sqlite_cache() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::default().cache_dir(dir.path()).workers(3);
    let dt = Digraph::new(create_motifs(), config.clone()).unwrap();
    let first = labels(&mine_vsigram(&dt, 3));
    dt.close().unwrap();
    let dt = Digraph::new(create_motifs(), config).unwrap();
    assert_eq!(labels(&mine_vsigram(&dt, 3)), first);
    assert_eq!(labels(&mine_dfs(&dt)), first);
    dt.close().unwrap();
}

#[test]
fn test_motifs_maximal() {
    let dt = Digraph::new(create_motifs(), Config::default()).unwrap();
    let maximal: Vec<SubgraphNode> = mine_dfs(&dt)
        .into_iter()
        .filter(|n| n.maximal().unwrap())
        .collect();
    assert_eq!(maximal.len(), 2);
    for node in &maximal {
        assert_eq!(node.pattern().num_edges(), 4);
        assert_eq!(node.support().unwrap(), 2);
    }
}

#[test]
fn test_dfs_seen_store_is_reset() {
    let dir = tempfile::tempdir().unwrap();
    let store_type = StoreType::Sqlite(dir.path().to_path_buf());
    let dt = Digraph::new(create_fixture(), Config::default()).unwrap();
    for _ in 0..2 {
        let mut reporter: CollectReporter<SubgraphNode> = CollectReporter::new();
        Dfs::open(&store_type)
            .unwrap()
            .mine(&dt, &mut reporter)
            .unwrap();
        assert_eq!(reporter.nodes().len(), 5);
    }
    let seen = Store::open(&store_type, "dfs_seen").unwrap();
    assert_eq!(seen.len().unwrap(), 5);
}

#[test]
fn test_reporters() {
    let dt = Digraph::new(create_fixture(), Config::default()).unwrap();
    let nodes = mine_dfs(&dt);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("patterns.tsv");

    let mut unique = UniqueReporter::new(CollectReporter::<SubgraphNode>::new());
    for node in nodes.iter().chain(nodes.iter()) {
        unique.report(node).unwrap();
    }
    assert_eq!(unique.into_inner().nodes().len(), nodes.len());

    let reporters: Vec<Box<dyn Reporter<SubgraphNode>>> = vec![
        Box::new(FileReporter::create(&path).unwrap()),
        Box::new(CollectReporter::<SubgraphNode>::new()),
    ];
    let mut chain = ChainReporter::new(reporters);
    for node in &nodes {
        chain.report(node).unwrap();
    }
    chain.close().unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), nodes.len());
    assert!(lines.contains(&"0:1(0:red)\t4"));
    assert!(lines.contains(&"1:2(0:black)(1:red)[0->1:]\t2"));
}

#[test]
fn test_singletons_above_threshold_only() {
    let dt = Digraph::new(create_fixture(), Config::default().support(3)).unwrap();
    let nodes = mine_dfs(&dt);
    let names: Vec<String> = nodes.iter().map(|n| n.to_string()).collect();
    assert!(names.contains(&String::from("0:1(0:red)")));
    assert!(!names.contains(&String::from("0:1(0:black)")));
    assert!(nodes.iter().all(|n| n.support().unwrap() >= dt.support()));
}
