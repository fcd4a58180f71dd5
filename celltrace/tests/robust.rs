use std::thread;

use celltrace::algorithms::extract::edge_seeds;
use celltrace::{find_contours, Cell, CellConstraints, CellConstraintsDetails, CellResult, Cluster, Projection, Vec3};
use proptest::prelude::*;
use serde_json::json;

fn grid(w: usize, h: usize) -> Cluster {
    let mut c = Cluster::new();
    for j in 0..=h {
        for i in 0..=w {
            c.add_node_xy(i as f64, j as f64).unwrap();
        }
    }
    let ix = |i: usize, j: usize| j * (w + 1) + i;
    for j in 0..=h {
        for i in 0..=w {
            if i < w {
                c.add_edge(ix(i, j), ix(i + 1, j)).unwrap();
            }
            if j < h {
                c.add_edge(ix(i, j), ix(i, j + 1)).unwrap();
            }
        }
    }
    c
}

#[test]
fn concurrent_traces_share_dedup_state() {
    let c = grid(4, 4);
    let p = Projection::default().project_flat(c.positions());
    let k = CellConstraints::new();
    let seeds = edge_seeds(&c);

    // every thread walks every seed; each face must still win exactly once
    let successes: Vec<Vec<u32>> = thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(|| {
                    let mut won = Vec::new();
                    for seed in &seeds {
                        let mut cell = Cell::new();
                        if cell.build_from_cluster(*seed, &c, &p, &k) == CellResult::Success {
                            won.push(cell.cell_hash());
                        }
                    }
                    won
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut all: Vec<u32> = successes.into_iter().flatten().collect();
    let total = all.len();
    all.sort_unstable();
    all.dedup();
    assert_eq!(total, 17, "16 squares and the outer face");
    assert_eq!(all.len(), total);
    assert_eq!(k.num_unique_cells(), 17);
}

#[test]
fn seed_from_an_empty_cluster_is_unknown() {
    let c = Cluster::new();
    let out = find_contours(&c, &Projection::default(), &CellConstraints::new(), &[Vec3::new(0.0, 0.0, 0.0)], None)
        .unwrap();
    assert_eq!(out.outcomes.len(), 1);
    assert_eq!(out.outcomes[0].result, CellResult::Unknown);
    assert_eq!(out.bad_seeds(), vec![0]);
}

#[test]
fn dangling_edges_are_rejected() {
    let doc = json!({
        "version": 1,
        "nodes": [ { "id": 0, "x": 0.0, "y": 0.0 } ],
        "edges": [ { "a": 0, "b": 42 } ]
    });
    assert!(Cluster::from_json_value(doc).is_err());
}

#[test]
fn unknown_details_fields_are_ignored() {
    let d = CellConstraintsDetails::from_json(r#"{ "min_area": 4.0, "flavour": "plain" }"#).unwrap();
    assert_eq!(d.min_area, 4.0);
    assert!(!d.omit_below_area);
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

    #[test]
    fn arbitrary_json_never_panics(s in "\\PC{0,200}") {
        let _ = Cluster::from_json(&s);
        let _ = CellConstraintsDetails::from_json(&s);
    }

    #[test]
    fn arbitrary_seeds_never_panic(xs in prop::collection::vec((-10.0f64..10.0, -10.0f64..10.0), 0..20)) {
        let c = grid(3, 3);
        let seeds: Vec<Vec3> = xs.iter().map(|&(x, y)| Vec3::new(x, y, 0.0)).collect();
        let out = find_contours(&c, &Projection::default(), &CellConstraints::new(), &seeds, None).unwrap();
        prop_assert_eq!(out.outcomes.len(), seeds.len());
        prop_assert_eq!(out.good_seeds().len() + out.bad_seeds().len(), seeds.len());
    }
}
