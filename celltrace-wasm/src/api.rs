use crate::CellGraph;
use celltrace::artifacts::{CellArtifacts, CellArtifactsDetails, SeedMutationDetails, SeedPoint};
use celltrace::{
    build_surface, find_all_cells, find_contours, CellConstraints, CellConstraintsDetails, CellExtraction,
    CellResult, Cluster, ExtractionStats, NodePicking, Projection, Vec3,
};
use js_sys::Float64Array;
use serde::Serialize;
use wasm_bindgen::prelude::*;
type JsValue = wasm_bindgen::JsValue;
use crate::error;
use crate::interop;

#[wasm_bindgen]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

#[derive(Serialize)]
struct CellsOut<'a> {
    cells: &'a [celltrace::Cell],
    #[serde(skip_serializing_if = "Option::is_none")]
    artifacts: Option<Vec<CellArtifacts>>,
    stats: &'a ExtractionStats,
}

#[derive(Serialize)]
struct ContoursOut<'a> {
    good_seeds: Vec<usize>,
    bad_seeds: Vec<usize>,
    results: Vec<CellResult>,
    cells: Vec<&'a celltrace::Cell>,
    seed_points: Vec<SeedPoint>,
    stats: &'a ExtractionStats,
}

fn projection(nx: f64, ny: f64, nz: f64) -> Result<Projection, JsValue> {
    if !nx.is_finite() || !ny.is_finite() || !nz.is_finite() {
        return Err(error::non_finite("normal"));
    }
    Projection::new(Vec3::new(nx, ny, nz)).map_err(|e| error::from_core(&e))
}

fn constraints(details: JsValue) -> Result<CellConstraints, JsValue> {
    let d: CellConstraintsDetails =
        interop::from_js_or_default(details).map_err(|e| error::invalid_config("details", e))?;
    Ok(CellConstraints::from_details(&d))
}

fn warn_on_malformed(what: &str, stats: &ExtractionStats) {
    let n = stats.count(CellResult::MalformedCluster);
    if n > 0 {
        interop::console_warn(&format!("{}: {} trace(s) hit the loop guard", what, n));
    }
}

impl CellGraph {
    fn extract(&self, details: JsValue, nx: f64, ny: f64, nz: f64) -> Result<CellExtraction, JsValue> {
        let k = constraints(details)?;
        let projected = projection(nx, ny, nz)?.project_flat(self.inner.positions());
        let out = find_all_cells(&self.inner, &projected, &k).map_err(|e| error::from_core(&e))?;
        warn_on_malformed("find_cells", &out.stats);
        Ok(out)
    }
}

#[wasm_bindgen]
impl CellGraph {
    #[wasm_bindgen(constructor)]
    pub fn new() -> CellGraph {
        crate::CellGraph::rs_new()
    }
    pub fn version(&self) -> u64 {
        self.rs_version()
    }

    // Cluster identity
    pub fn cluster_id(&self) -> u32 {
        self.inner.id
    }
    pub fn set_cluster_id(&mut self, id: u32) {
        self.inner.id = id;
        self.bump();
    }
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let added = self.inner.tags.insert(tag.to_string());
        if added {
            self.bump();
        }
        added
    }

    // Nodes/Edges basic
    pub fn add_node(&mut self, x: f64, y: f64, z: f64) -> Option<u32> {
        let id = self.inner.add_node(Vec3::new(x, y, z)).ok()?;
        self.bump();
        Some(id as u32)
    }
    pub fn add_node_res(&mut self, x: f64, y: f64, z: f64) -> JsValue {
        if !x.is_finite() {
            return error::non_finite("x");
        }
        if !y.is_finite() {
            return error::non_finite("y");
        }
        if !z.is_finite() {
            return error::non_finite("z");
        }
        match self.inner.add_node(Vec3::new(x, y, z)) {
            Ok(id) => {
                self.bump();
                error::ok(JsValue::from_f64(id as f64))
            }
            Err(e) => error::from_core(&e),
        }
    }
    pub fn get_node(&self, id: u32) -> JsValue {
        if (id as usize) < self.inner.num_nodes() {
            let p = self.inner.pos(id as usize);
            interop::arr_f64(&[p.x, p.y, p.z]).into()
        } else {
            JsValue::NULL
        }
    }
    pub fn node_count(&self) -> u32 {
        self.inner.num_nodes() as u32
    }
    pub fn add_edge(&mut self, a: u32, b: u32) -> Option<u32> {
        let id = self.inner.add_edge(a as usize, b as usize).ok()?;
        self.bump();
        Some(id as u32)
    }
    pub fn add_edge_res(&mut self, a: u32, b: u32) -> JsValue {
        match self.inner.add_edge(a as usize, b as usize) {
            Ok(id) => {
                self.bump();
                error::ok(JsValue::from_f64(id as f64))
            }
            Err(e) => error::from_core(&e),
        }
    }
    pub fn set_edge_valid(&mut self, id: u32, valid: bool) -> bool {
        let ok = self.inner.set_edge_valid(id as usize, valid);
        if ok {
            self.bump();
        }
        ok
    }
    pub fn set_edge_valid_res(&mut self, id: u32, valid: bool) -> JsValue {
        if id as usize >= self.inner.num_edges() {
            return error::invalid_id("edge", id);
        }
        error::ok(JsValue::from_bool(self.set_edge_valid(id, valid)))
    }
    pub fn edge_count(&self) -> u32 {
        self.inner.num_edges() as u32
    }
    pub fn clear(&mut self) {
        let id = self.inner.id;
        self.inner = Cluster::with_id(id);
        self.bump();
    }

    // Typed arrays getters
    pub fn get_node_data(&self) -> JsValue {
        let mut pos = Vec::with_capacity(self.inner.num_nodes() * 3);
        for p in self.inner.positions() {
            pos.extend_from_slice(&[p.x, p.y, p.z]);
        }
        let degrees: Vec<u32> = self.inner.nodes().iter().map(|n| n.num() as u32).collect();
        let obj = interop::new_obj();
        interop::set_kv(&obj, "positions", &interop::arr_f64(&pos).into());
        interop::set_kv(&obj, "degrees", &interop::arr_u32(&degrees).into());
        obj.into()
    }
    pub fn get_edge_data(&self) -> JsValue {
        let mut endpoints = Vec::with_capacity(self.inner.num_edges() * 2);
        let mut valid = Vec::with_capacity(self.inner.num_edges());
        for e in self.inner.edges() {
            endpoints.push(e.start as u32);
            endpoints.push(e.end as u32);
            valid.push(e.valid as u8);
        }
        let obj = interop::new_obj();
        interop::set_kv(&obj, "endpoints", &interop::arr_u32(&endpoints).into());
        interop::set_kv(&obj, "valid", &interop::arr_u8(&valid).into());
        obj.into()
    }

    // Persistence
    pub fn to_json(&self) -> JsValue {
        interop::to_js(&self.inner.to_json()).unwrap_or(JsValue::NULL)
    }
    pub fn from_json(&mut self, v: JsValue) -> bool {
        match serde_wasm_bindgen::from_value::<serde_json::Value>(v) {
            Ok(val) => match Cluster::from_json_value(val) {
                Ok(c) => {
                    self.inner = c;
                    self.bump();
                    true
                }
                Err(_) => false,
            },
            Err(_) => false,
        }
    }
    pub fn from_json_res(&mut self, v: JsValue) -> JsValue {
        match serde_wasm_bindgen::from_value::<serde_json::Value>(v) {
            Ok(val) => match Cluster::from_json_value(val) {
                Ok(c) => {
                    self.inner = c;
                    self.bump();
                    error::ok(JsValue::from_bool(true))
                }
                Err(e) => error::from_core(&e),
            },
            Err(e) => error::err("json_parse", format!("{}", e), None),
        }
    }

    // Cells
    /// `{ ok, value: { cells, stats } }`; `details` may be undefined.
    pub fn find_cells(&self, details: JsValue, nx: f64, ny: f64, nz: f64) -> JsValue {
        let out = match self.extract(details, nx, ny, nz) {
            Ok(v) => v,
            Err(e) => return e,
        };
        let value = CellsOut { cells: &out.cells, artifacts: None, stats: &out.stats };
        match interop::to_js(&value) {
            Ok(v) => error::ok(v),
            Err(e) => error::serialize(e),
        }
    }
    pub fn find_cells_with_artifacts(
        &self,
        details: JsValue,
        artifacts: JsValue,
        nx: f64,
        ny: f64,
        nz: f64,
    ) -> JsValue {
        let ad: CellArtifactsDetails = match interop::from_js_or_default(artifacts) {
            Ok(d) => d,
            Err(e) => return error::invalid_config("artifacts", e),
        };
        if let Err(e) = ad.validate() {
            return error::from_core(&e);
        }
        let out = match self.extract(details, nx, ny, nz) {
            Ok(v) => v,
            Err(e) => return e,
        };
        let written = out.cells.iter().map(|c| CellArtifacts::process(&ad, &self.inner, c)).collect();
        let value = CellsOut { cells: &out.cells, artifacts: Some(written), stats: &out.stats };
        match interop::to_js(&value) {
            Ok(v) => error::ok(v),
            Err(e) => error::serialize(e),
        }
    }
    /// Accepted cells as flat arrays: cell `i` owns
    /// `nodes[offsets[i]..offsets[i + 1]]`.
    pub fn get_cell_arrays(&self, details: JsValue, nx: f64, ny: f64, nz: f64) -> JsValue {
        let out = match self.extract(details, nx, ny, nz) {
            Ok(v) => v,
            Err(e) => return e,
        };
        let mut offsets = Vec::with_capacity(out.cells.len() + 1);
        let mut nodes = Vec::new();
        let mut areas = Vec::with_capacity(out.cells.len());
        let mut hashes = Vec::with_capacity(out.cells.len());
        let mut convex = Vec::with_capacity(out.cells.len());
        offsets.push(0u32);
        for c in &out.cells {
            nodes.extend(c.nodes.iter().map(|&n| n as u32));
            offsets.push(nodes.len() as u32);
            areas.push(c.area);
            hashes.push(c.cell_hash());
            convex.push(c.is_convex as u8);
        }
        let obj = interop::new_obj();
        interop::set_kv(&obj, "offsets", &interop::arr_u32(&offsets).into());
        interop::set_kv(&obj, "nodes", &interop::arr_u32(&nodes).into());
        interop::set_kv(&obj, "areas", &interop::arr_f64(&areas).into());
        interop::set_kv(&obj, "hashes", &interop::arr_u32(&hashes).into());
        interop::set_kv(&obj, "convex", &interop::arr_u8(&convex).into());
        error::ok(obj.into())
    }
    /// One trace per seed; `seeds` holds `x, y, z` triples.
    #[allow(clippy::too_many_arguments)]
    pub fn find_contours(
        &self,
        seeds: Float64Array,
        details: JsValue,
        picking: JsValue,
        mutation: JsValue,
        nx: f64,
        ny: f64,
        nz: f64,
    ) -> JsValue {
        let flat = seeds.to_vec();
        if flat.len() % 3 != 0 {
            return error::err("invalid_seeds", "seeds must hold x, y, z triples", None);
        }
        let points: Vec<Vec3> = flat.chunks_exact(3).map(|s| Vec3::new(s[0], s[1], s[2])).collect();
        let k = match constraints(details) {
            Ok(k) => k,
            Err(e) => return e,
        };
        let picking: NodePicking = match interop::from_js_or_default(picking) {
            Ok(p) => p,
            Err(e) => return error::invalid_config("picking", e),
        };
        let mutation: SeedMutationDetails = match interop::from_js_or_default(mutation) {
            Ok(m) => m,
            Err(e) => return error::invalid_config("mutation", e),
        };
        let proj = match projection(nx, ny, nz) {
            Ok(p) => p,
            Err(e) => return e,
        };
        let out = match find_contours(&self.inner, &proj, &k, &points, Some(&picking)) {
            Ok(o) => o,
            Err(e) => return error::from_core(&e),
        };
        warn_on_malformed("find_contours", &out.stats);

        let mut seed_points = Vec::new();
        for o in &out.outcomes {
            if let Some(cell) = &o.cell {
                let mut sp = SeedPoint::at(points[o.seed]);
                let cell_points: Vec<Vec3> = cell.nodes.iter().map(|&n| self.inner.pos(n)).collect();
                mutation.apply(cell, &mut sp, &cell_points);
                seed_points.push(sp);
            }
        }
        let value = ContoursOut {
            good_seeds: out.good_seeds(),
            bad_seeds: out.bad_seeds(),
            results: out.outcomes.iter().map(|o| o.result).collect(),
            cells: out.cells().collect(),
            seed_points,
            stats: &out.stats,
        };
        match interop::to_js(&value) {
            Ok(v) => error::ok(v),
            Err(e) => error::serialize(e),
        }
    }

    // Triangulation
    /// `{ ok, value: { triangles, used_nodes, failed } }` with flat index
    /// arrays, three per triangle.
    pub fn triangulate_surface(&self, details: JsValue, nx: f64, ny: f64, nz: f64) -> JsValue {
        let k = match constraints(details) {
            Ok(k) => k,
            Err(e) => return e,
        };
        let projected = match projection(nx, ny, nz) {
            Ok(p) => p.project_flat(self.inner.positions()),
            Err(e) => return e,
        };
        let surface = match build_surface(&self.inner, &projected, &k) {
            Ok(s) => s,
            Err(e) => return error::from_core(&e),
        };
        warn_on_malformed("triangulate_surface", &surface.stats);
        let mut tris = Vec::with_capacity(surface.triangles.len() * 3);
        for t in &surface.triangles {
            tris.extend(t.vtx.iter().map(|&v| v as u32));
        }
        let obj = interop::new_obj();
        interop::set_kv(&obj, "triangles", &interop::arr_u32(&tris).into());
        interop::set_kv(&obj, "used_nodes", &interop::indices_u32(&surface.used_nodes).into());
        interop::set_kv(&obj, "failed", &JsValue::from_f64(surface.failed_triangulations as f64));
        error::ok(obj.into())
    }
}

impl Default for CellGraph {
    fn default() -> Self {
        CellGraph::new()
    }
}
