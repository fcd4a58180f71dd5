use celltrace::{Cell, CellConstraints, CellResult, Cluster, Link, Vec2};

fn star() -> (Cluster, Vec<Vec2>) {
    let mut c = Cluster::new();
    let hub = c.add_node_xy(0.0, 0.0).unwrap();
    for (x, y) in [(2.0, 0.0), (-1.0, 1.7), (-1.0, -1.7)] {
        let leaf = c.add_node_xy(x, y).unwrap();
        c.add_edge(hub, leaf).unwrap();
    }
    let p = c.positions().iter().map(|q| Vec2::new(q.x, q.y)).collect();
    (c, p)
}

fn all_seeds(c: &Cluster) -> Vec<Link> {
    let mut seeds = Vec::new();
    for e in c.edges() {
        seeds.push(Link::new(e.start as i32, e.index as i32));
        seeds.push(Link::new(e.end as i32, e.index as i32));
    }
    seeds
}

#[test]
fn star_without_leaves_yields_nothing() {
    let (c, p) = star();
    let mut k = CellConstraints::new();
    k.keep_cells_with_leaves = false;
    for seed in all_seeds(&c) {
        let mut cell = Cell::new();
        let r = cell.build_from_cluster(seed, &c, &p, &k);
        assert_ne!(r, CellResult::Success, "seed {:?}", seed);
        assert!(!cell.built_successfully());
    }
}

#[test]
fn star_with_duplicated_leaves_is_one_cell() {
    let (c, p) = star();
    let mut k = CellConstraints::new();
    k.keep_cells_with_leaves = true;
    k.duplicate_leaf_points = true;

    let mut cells = Vec::new();
    let mut duplicates = 0;
    for seed in all_seeds(&c) {
        let mut cell = Cell::new();
        match cell.build_from_cluster(seed, &c, &p, &k) {
            CellResult::Success => cells.push(cell),
            CellResult::Duplicate => duplicates += 1,
            other => panic!("unexpected {:?} from {:?}", other, seed),
        }
    }
    assert_eq!(cells.len(), 1);
    assert_eq!(duplicates, 5);

    let cell = &cells[0];
    assert_eq!(cell.nodes.len(), 9);
    assert_eq!(cell.nodes[0], 0);
    assert_eq!(cell.nodes.iter().filter(|&&n| n == 0).count(), 3);
    for leaf in 1..=3 {
        let at = cell.nodes.iter().position(|&n| n == leaf).unwrap();
        assert_eq!(cell.nodes[at + 1], leaf, "leaf {} is doubled", leaf);
    }
    assert!(cell.area.abs() < 1e-9);
}

#[test]
fn lone_segment_is_a_leaf() {
    let mut c = Cluster::new();
    c.add_node_xy(0.0, 0.0).unwrap();
    c.add_node_xy(1.0, 0.0).unwrap();
    c.add_edge(0, 1).unwrap();
    let p: Vec<Vec2> = vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)];
    let mut cell = Cell::new();
    let r = cell.build_from_cluster(Link::new(0, 0), &c, &p, &CellConstraints::new());
    assert_eq!(r, CellResult::Leaf);
}

#[test]
fn collinear_triangle_has_no_area() {
    let mut c = Cluster::new();
    for x in [0.0, 1.0, 2.0] {
        c.add_node_xy(x, 0.0).unwrap();
    }
    c.add_edge(0, 1).unwrap();
    c.add_edge(1, 2).unwrap();
    c.add_edge(2, 0).unwrap();
    let p: Vec<Vec2> = c.positions().iter().map(|q| Vec2::new(q.x, q.y)).collect();
    let k = CellConstraints::new();
    for seed in all_seeds(&c) {
        let mut cell = Cell::new();
        if cell.build_from_cluster(seed, &c, &p, &k) == CellResult::Success {
            assert!(cell.area.abs() < 1e-12);
            assert_eq!(cell.compactness, 0.0);
        }
    }
}

#[test]
fn invalidated_edge_is_not_a_seed() {
    let mut c = Cluster::new();
    for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)] {
        c.add_node_xy(x, y).unwrap();
    }
    let e = c.add_edge(0, 1).unwrap();
    c.add_edge(1, 2).unwrap();
    c.add_edge(2, 0).unwrap();
    assert!(c.set_edge_valid(e, false));
    let p: Vec<Vec2> = c.positions().iter().map(|q| Vec2::new(q.x, q.y)).collect();
    let mut cell = Cell::new();
    let r = cell.build_from_cluster(Link::new(0, e as i32), &c, &p, &CellConstraints::new());
    assert_eq!(r, CellResult::Unknown);
}
