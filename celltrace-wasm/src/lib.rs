use wasm_bindgen::prelude::*;
mod api;
mod error;
mod interop;

#[wasm_bindgen]
pub struct CellGraph {
    pub(crate) inner: celltrace::Cluster,
    pub(crate) version: u64,
}

impl CellGraph {
    pub fn rs_new() -> CellGraph { CellGraph { inner: celltrace::Cluster::new(), version: 0 } }
    pub fn rs_version(&self) -> u64 { self.version }
    pub(crate) fn bump(&mut self) { self.version = self.version.wrapping_add(1); }
}
