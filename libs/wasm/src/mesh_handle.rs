//! # Mesh Handle
//!
//! WASM-friendly wrapper for preview buffers that can be transferred to
//! JavaScript.

use boxgen_mesh::{Mesh, RenderBuffers};
use wasm_bindgen::prelude::*;

/// A handle to welded preview buffers of one part.
///
/// # Example (JavaScript)
///
/// ```javascript
/// const mesh = generate_part(JSON.stringify(params), "box");
///
/// const geometry = new THREE.BufferGeometry();
/// geometry.setAttribute('position', new THREE.BufferAttribute(mesh.positions(), 3));
/// geometry.setAttribute('normal', new THREE.BufferAttribute(mesh.normals(), 3));
/// geometry.setIndex(new THREE.BufferAttribute(mesh.indices(), 1));
/// ```
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct MeshHandle {
    buffers: RenderBuffers,
    polygon_count: u32,
}

#[wasm_bindgen]
impl MeshHandle {
    /// Returns the number of welded vertices.
    #[wasm_bindgen(getter)]
    pub fn vertex_count(&self) -> u32 {
        self.buffers.vertex_count() as u32
    }

    /// Returns the number of triangles.
    #[wasm_bindgen(getter)]
    pub fn triangle_count(&self) -> u32 {
        self.buffers.triangle_count() as u32
    }

    /// Returns the number of polygons before triangulation.
    #[wasm_bindgen(getter)]
    pub fn polygon_count(&self) -> u32 {
        self.polygon_count
    }

    /// Returns the vertex positions as a Float32Array.
    ///
    /// Format: [x, y, z, x, y, z, ...]
    pub fn positions(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(&self.buffers.positions[..])
    }

    /// Returns the smooth vertex normals as a Float32Array.
    pub fn normals(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(&self.buffers.normals[..])
    }

    /// Returns the triangle indices as a Uint32Array.
    pub fn indices(&self) -> js_sys::Uint32Array {
        js_sys::Uint32Array::from(&self.buffers.indices[..])
    }
}

impl MeshHandle {
    /// Builds preview buffers for `mesh`.
    pub fn from_mesh(mesh: &Mesh) -> Self {
        Self {
            buffers: RenderBuffers::from_mesh(mesh),
            polygon_count: mesh.polygon_count() as u32,
        }
    }

    /// Native access to the buffers.
    pub fn buffers(&self) -> &RenderBuffers {
        &self.buffers
    }
}
