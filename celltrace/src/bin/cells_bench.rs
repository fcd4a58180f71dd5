#[cfg(feature = "bench_cells")]
use celltrace::{build_surface, find_all_cells, CellConstraints, Cluster, Projection};
#[cfg(feature = "bench_cells")]
use std::time::Instant;

#[cfg(not(feature = "bench_cells"))]
fn main() {
    panic!("cells_bench requires --features bench_cells");
}

#[cfg(feature = "bench_cells")]
fn build_grid_cluster(w: usize, h: usize) -> Cluster {
    let mut c = Cluster::new();
    for j in 0..=h {
        for i in 0..=w {
            // slight jitter so not every corner is a right angle
            let jx = ((i * 7 + j * 3) % 5) as f64 * 0.1;
            let jy = ((i * 3 + j * 11) % 7) as f64 * 0.1;
            let _ = c.add_node_xy(i as f64 * 6.0 + jx, j as f64 * 6.0 + jy);
        }
    }
    let ix = |i: usize, j: usize| j * (w + 1) + i;
    for j in 0..=h {
        for i in 0..w {
            let _ = c.add_edge(ix(i, j), ix(i + 1, j));
        }
    }
    for i in 0..=w {
        for j in 0..h {
            let _ = c.add_edge(ix(i, j), ix(i, j + 1));
        }
    }
    c
}

#[cfg(feature = "bench_cells")]
fn main() {
    let args: Vec<String> = std::env::args().collect();
    let mut w = 70usize;
    let mut h = 70usize;
    let mut repeats = 10usize;
    for a in &args[1..] {
        if let Some(val) = a.strip_prefix("--w=") {
            if let Ok(v) = val.parse() {
                w = v;
            }
        } else if let Some(val) = a.strip_prefix("--h=") {
            if let Ok(v) = val.parse() {
                h = v;
            }
        } else if let Some(val) = a.strip_prefix("--repeats=") {
            if let Ok(v) = val.parse() {
                repeats = v;
            }
        }
    }

    let c = build_grid_cluster(w, h);
    let projected = Projection::default().project_flat(c.positions());

    // Dedup state lives in the constraints, so every run gets fresh ones.
    let fresh = || {
        let mut k = CellConstraints::new();
        k.omit_wrapping_cell = true;
        k.wrapper_classification_tolerance = 0.01;
        k
    };

    let mut trace_times = Vec::with_capacity(repeats);
    let mut cells = 0;
    for _ in 0..repeats.max(1) {
        let k = fresh();
        let t0 = Instant::now();
        match find_all_cells(&c, &projected, &k) {
            Ok(out) => cells = out.cells.len(),
            Err(e) => {
                eprintln!("find_all_cells failed: {}", e);
                return;
            }
        }
        trace_times.push(t0.elapsed().as_secs_f64() * 1000.0);
    }
    let avg_trace = trace_times.iter().sum::<f64>() / trace_times.len() as f64;

    let k = fresh();
    let t1 = Instant::now();
    let triangles = match build_surface(&c, &projected, &k) {
        Ok(s) => s.triangles.len(),
        Err(e) => {
            eprintln!("build_surface failed: {}", e);
            return;
        }
    };
    let surface_ms = t1.elapsed().as_secs_f64() * 1000.0;

    println!(
        "grid={}x{} edges={} cells={} avg_trace_ms={:.3} triangles={} surface_ms={:.3}",
        w,
        h,
        c.num_edges(),
        cells,
        avg_trace,
        triangles,
        surface_ms
    );
}
