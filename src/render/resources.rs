//! GPU-side resource handles
//!
//! Backends hand out [`GpuMesh`] and [`Model`] handles. A handle owns its
//! resource exclusively: dropping it queues the resource for release on the
//! backend's [`ReleaseQueue`], and the backend frees queued resources in
//! `collect_garbage` at a point of its choosing (usually end of frame).
//!
//! ## Why a queue
//!
//! `Drop` has no access to the backend, so a handle cannot free its resource
//! directly. Instead every handle carries a clone of the queue (an
//! `Rc<RefCell<..>>`, since all rendering happens on one thread) and pushes
//! its id there.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::debug;

use super::{DrawStyle, RenderBackend};
use crate::color::Color;
use crate::mesh::MeshData;

/// Backend-unique resource id
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

impl ResourceId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of a released resource
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    Mesh,
    Model,
}

/// A resource whose handle has been dropped
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Released {
    pub kind: ResourceKind,
    pub id: ResourceId,
}

#[derive(Debug, Default)]
struct QueueInner {
    next_id: u64,
    released: Vec<Released>,
}

/// Id allocator plus deferred-release list shared by a backend and its handles
#[derive(Clone, Debug, Default)]
pub struct ReleaseQueue {
    inner: Rc<RefCell<QueueInner>>,
}

impl ReleaseQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id
    pub fn allocate(&self) -> ResourceId {
        let mut inner = self.inner.borrow_mut();
        let id = ResourceId(inner.next_id);
        inner.next_id += 1;
        id
    }

    fn release(&self, kind: ResourceKind, id: ResourceId) {
        self.inner.borrow_mut().released.push(Released { kind, id });
    }

    /// Take every release queued since the last drain, in drop order
    pub fn drain(&self) -> Vec<Released> {
        std::mem::take(&mut self.inner.borrow_mut().released)
    }

    pub fn pending(&self) -> usize {
        self.inner.borrow().released.len()
    }
}

/// Uploaded vertex/index buffers
pub struct GpuMesh {
    id: ResourceId,
    vertex_count: usize,
    triangle_count: usize,
    queue: ReleaseQueue,
}

impl GpuMesh {
    /// Called by backends after a successful upload
    pub fn new(queue: &ReleaseQueue, vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            id: queue.allocate(),
            vertex_count,
            triangle_count,
            queue: queue.clone(),
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }
}

impl Drop for GpuMesh {
    fn drop(&mut self) {
        self.queue.release(ResourceKind::Mesh, self.id);
    }
}

impl fmt::Debug for GpuMesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuMesh")
            .field("id", &self.id)
            .field("vertex_count", &self.vertex_count)
            .field("triangle_count", &self.triangle_count)
            .finish()
    }
}

/// Renderable wrapper built from a [`GpuMesh`]
pub struct Model {
    id: ResourceId,
    mesh: ResourceId,
    queue: ReleaseQueue,
}

impl Model {
    /// Called by backends after building a model from `mesh`
    pub fn new(queue: &ReleaseQueue, mesh: &GpuMesh) -> Self {
        Self {
            id: queue.allocate(),
            mesh: mesh.id(),
            queue: queue.clone(),
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Id of the mesh this model draws
    pub fn mesh_id(&self) -> ResourceId {
        self.mesh
    }
}

impl Drop for Model {
    fn drop(&mut self) {
        self.queue.release(ResourceKind::Model, self.id);
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("id", &self.id)
            .field("mesh", &self.mesh)
            .finish()
    }
}

/// A model together with the mesh it was built from
///
/// Field order matters: `model` is declared first so it is dropped, and
/// therefore released, before `mesh`.
#[derive(Debug)]
pub struct RenderModel {
    model: Model,
    mesh: GpuMesh,
}

impl RenderModel {
    /// Upload `data` and wrap it in a model.
    ///
    /// Returns `None` if the mesh is empty or the backend refuses either
    /// step. A mesh uploaded before a failed model build is released again.
    pub fn build(backend: &mut dyn RenderBackend, data: &MeshData) -> Option<Self> {
        if data.is_empty() {
            return None;
        }
        let mesh = backend.upload_mesh(data)?;
        let model = backend.load_model(&mesh)?;
        debug!(
            "built model {} from mesh {} ({} vertices, {} triangles)",
            model.id(),
            mesh.id(),
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Some(Self { model, mesh })
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn mesh(&self) -> &GpuMesh {
        &self.mesh
    }

    /// Draw with the backend's current transform
    pub fn draw(&self, backend: &mut dyn RenderBackend, style: DrawStyle, color: Color) {
        backend.draw_model(&self.model, style, color);
    }
}
