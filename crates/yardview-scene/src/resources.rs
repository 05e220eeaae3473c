//! # Resource Pool
//!
//! Geometry and material storage shared between the lifecycle manager and
//! the GL compositor. Geometries are reference counted and shared between
//! objects of identical shape; materials belong to exactly one object so
//! color changes can be applied in place.
//!
//! Every creation and disposal is queued as a [`ResourceEvent`]. The
//! compositor drains the queue once per frame to upload new vertex buffers
//! and delete the ones nobody references any more.

use std::collections::HashMap;

use crate::geometry::{MeshMaterial, RenderableMesh};
use crate::scene_graph::Primitive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(u64);

/// Dimension quantum for geometry sharing (1 mm).
const KEY_QUANTUM: f32 = 1000.0;

/// Shape identity used to share geometry between objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryKey {
    kind: u8,
    dims: [i64; 3],
}

impl GeometryKey {
    /// `None` for primitives that carry no geometry.
    pub fn from_primitive(primitive: &Primitive) -> Option<Self> {
        let q = |v: f32| (v * KEY_QUANTUM).round() as i64;
        let (kind, dims) = match *primitive {
            Primitive::Group => return None,
            Primitive::Box { half_extents } => (
                0,
                [q(half_extents.x), q(half_extents.y), q(half_extents.z)],
            ),
            Primitive::Cylinder {
                radius,
                half_height,
            } => (1, [q(radius), q(half_height), 0]),
            Primitive::Sphere { radius } => (2, [q(radius), 0, 0]),
            Primitive::Plane { half_size } => (3, [q(half_size), 0, 0]),
        };
        Some(Self { kind, dims })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceEvent {
    GeometryCreated(GeometryId),
    GeometryDisposed(GeometryId),
    MaterialCreated(MaterialId),
    MaterialDisposed(MaterialId),
}

#[derive(Debug)]
struct GeometryEntry {
    key: GeometryKey,
    mesh: RenderableMesh,
    ref_count: usize,
}

#[derive(Debug, Default)]
pub struct ResourcePool {
    geometries: HashMap<GeometryId, GeometryEntry>,
    by_key: HashMap<GeometryKey, GeometryId>,
    materials: HashMap<MaterialId, MeshMaterial>,
    events: Vec<ResourceEvent>,
    next_id: u64,
}

fn synthesize(primitive: &Primitive) -> Option<RenderableMesh> {
    match *primitive {
        Primitive::Group => None,
        Primitive::Box { half_extents } => Some(RenderableMesh::create_box(half_extents * 2.0)),
        Primitive::Cylinder {
            radius,
            half_height,
        } => Some(RenderableMesh::create_cylinder(radius, half_height * 2.0)),
        Primitive::Sphere { radius } => Some(RenderableMesh::create_sphere(radius)),
        Primitive::Plane { half_size } => Some(RenderableMesh::create_ground(half_size * 2.0)),
    }
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Get or synthesize geometry for `primitive`, taking one reference.
    pub fn acquire_geometry(&mut self, primitive: &Primitive) -> Option<GeometryId> {
        let key = GeometryKey::from_primitive(primitive)?;
        if let Some(&id) = self.by_key.get(&key) {
            if let Some(entry) = self.geometries.get_mut(&id) {
                entry.ref_count += 1;
                return Some(id);
            }
        }

        let mesh = synthesize(primitive)?;
        let id = GeometryId(self.allocate_id());
        tracing::debug!(?id, triangles = mesh.triangle_count(), "created geometry");
        self.geometries.insert(
            id,
            GeometryEntry {
                key,
                mesh,
                ref_count: 1,
            },
        );
        self.by_key.insert(key, id);
        self.events.push(ResourceEvent::GeometryCreated(id));
        Some(id)
    }

    /// Drop one reference. Returns true when the geometry was disposed.
    pub fn release_geometry(&mut self, id: GeometryId) -> bool {
        let Some(entry) = self.geometries.get_mut(&id) else {
            tracing::warn!(?id, "release of unknown geometry");
            return false;
        };
        entry.ref_count = entry.ref_count.saturating_sub(1);
        if entry.ref_count > 0 {
            return false;
        }
        if let Some(entry) = self.geometries.remove(&id) {
            self.by_key.remove(&entry.key);
        }
        tracing::debug!(?id, "disposed geometry");
        self.events.push(ResourceEvent::GeometryDisposed(id));
        true
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&RenderableMesh> {
        self.geometries.get(&id).map(|e| &e.mesh)
    }

    pub fn geometry_ref_count(&self, id: GeometryId) -> usize {
        self.geometries.get(&id).map_or(0, |e| e.ref_count)
    }

    pub fn geometries(&self) -> impl Iterator<Item = (GeometryId, &RenderableMesh)> {
        self.geometries.iter().map(|(id, e)| (*id, &e.mesh))
    }

    pub fn create_material(&mut self, material: MeshMaterial) -> MaterialId {
        let id = MaterialId(self.allocate_id());
        self.materials.insert(id, material);
        self.events.push(ResourceEvent::MaterialCreated(id));
        id
    }

    pub fn material(&self, id: MaterialId) -> Option<&MeshMaterial> {
        self.materials.get(&id)
    }

    /// Replace a material in place. Returns whether the value changed.
    pub fn update_material(&mut self, id: MaterialId, material: MeshMaterial) -> bool {
        match self.materials.get_mut(&id) {
            Some(current) if *current != material => {
                *current = material;
                true
            }
            _ => false,
        }
    }

    pub fn release_material(&mut self, id: MaterialId) -> bool {
        if self.materials.remove(&id).is_some() {
            self.events.push(ResourceEvent::MaterialDisposed(id));
            true
        } else {
            false
        }
    }

    pub fn live_geometries(&self) -> usize {
        self.geometries.len()
    }

    pub fn live_materials(&self) -> usize {
        self.materials.len()
    }

    pub fn pending_events(&self) -> &[ResourceEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<ResourceEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drop everything, queueing disposal for each live resource.
    pub fn clear(&mut self) {
        let mut geometry_ids: Vec<_> = self.geometries.keys().copied().collect();
        geometry_ids.sort();
        self.events
            .extend(geometry_ids.into_iter().map(ResourceEvent::GeometryDisposed));
        let mut material_ids: Vec<_> = self.materials.keys().copied().collect();
        material_ids.sort();
        self.events
            .extend(material_ids.into_iter().map(ResourceEvent::MaterialDisposed));
        self.geometries.clear();
        self.by_key.clear();
        self.materials.clear();
    }
}
