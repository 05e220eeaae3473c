//! # Equipment Mesh Lifecycle
//!
//! Reconciles an equipment snapshot and the layer table against the live
//! scene objects. After every pass there is exactly one object per visible
//! tag and none for hidden or removed tags.
//!
//! Each object is a tagged group node carrying position and rotation, with
//! a single mesh child holding geometry and material. Shape changes
//! dispose the mesh and synthesize a new one; color and opacity changes
//! update the material in place.

use glam::Vec3;
use std::collections::{BTreeMap, HashMap};
use yardview_core::data::sanitize_snapshot;
use yardview_core::{Equipment, EquipmentType, LayerTable, ShapeParams};
use yardview_settings::{ColorConfig, LabelConfig};

use crate::bounds::Aabb;
use crate::color_mode::{ColorMode, ColorResolver};
use crate::geometry::MeshMaterial;
use crate::resources::ResourcePool;
use crate::scene_graph::{NodeId, ObjectTag, Primitive, SceneGraph, Transform};

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: usize,
    /// Material or transform changed in place
    pub updated: usize,
    /// Shape changed, mesh rebuilt
    pub recreated: usize,
    pub removed: usize,
    pub terrain_changed: bool,
}

impl ReconcileReport {
    /// Whether the set of live nodes changed.
    pub fn membership_changed(&self) -> bool {
        self.created > 0 || self.recreated > 0 || self.removed > 0 || self.terrain_changed
    }

    pub fn is_noop(&self) -> bool {
        !self.membership_changed() && self.updated == 0
    }
}

#[derive(Debug, Clone)]
struct LiveObject {
    group: NodeId,
    mesh: NodeId,
    primitive: Primitive,
    shape: ShapeParams,
}

/// Primitive drawn for an equipment item, sized from its shape parameters.
pub fn primitive_for(equipment_type: EquipmentType, shape: &ShapeParams) -> Primitive {
    let [x, y, z] = shape.extent();
    match equipment_type {
        EquipmentType::Building | EquipmentType::Crane | EquipmentType::Terrain => {
            Primitive::Box {
                half_extents: Vec3::new(x, y, z) * 0.5,
            }
        }
        EquipmentType::Tank | EquipmentType::Pipe => Primitive::Cylinder {
            radius: x.max(z) * 0.5,
            half_height: y * 0.5,
        },
        EquipmentType::Valve => Primitive::Sphere {
            radius: x.max(y).max(z) * 0.5,
        },
    }
}

#[derive(Debug)]
pub struct LifecycleManager {
    objects: BTreeMap<String, LiveObject>,
    terrain: Option<NodeId>,
    generation: u64,
    colors: ColorResolver,
    terrain_size: f32,
    terrain_material: MeshMaterial,
}

impl LifecycleManager {
    pub fn new(colors: ColorConfig, labels: &LabelConfig) -> Self {
        Self {
            objects: BTreeMap::new(),
            terrain: None,
            generation: 0,
            colors: ColorResolver::new(colors),
            terrain_size: labels.terrain_size,
            terrain_material: MeshMaterial::ground(labels.terrain_color.to_array()),
        }
    }

    /// Bumped whenever the set of live nodes changes.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.objects.contains_key(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    /// Tagged group node of a live object.
    pub fn node_for(&self, tag: &str) -> Option<NodeId> {
        self.objects.get(tag).map(|o| o.group)
    }

    pub fn mesh_node_for(&self, tag: &str) -> Option<NodeId> {
        self.objects.get(tag).map(|o| o.mesh)
    }

    pub fn terrain_node(&self) -> Option<NodeId> {
        self.terrain
    }

    pub fn color_resolver(&self) -> &ColorResolver {
        &self.colors
    }

    /// Roots handed to the raycast resolver.
    pub fn pick_candidates(&self) -> Vec<NodeId> {
        self.objects
            .values()
            .map(|o| o.group)
            .chain(self.terrain)
            .collect()
    }

    /// World bounds of a live object; empty when the tag is not live.
    pub fn object_bounds(&self, graph: &SceneGraph, tag: &str) -> Aabb {
        self.node_for(tag)
            .map_or(Aabb::EMPTY, |node| graph.world_bounds(node))
    }

    /// Live tags whose system matches `system`.
    pub fn tags_in_system(&self, graph: &SceneGraph, system: &str) -> Vec<String> {
        self.objects
            .iter()
            .filter(|(_, o)| graph.tag(o.group).is_some_and(|t| t.system == system))
            .map(|(tag, _)| tag.clone())
            .collect()
    }

    pub fn reconcile(
        &mut self,
        graph: &mut SceneGraph,
        pool: &mut ResourcePool,
        equipment: &[Equipment],
        layers: &LayerTable,
        mode: ColorMode,
    ) -> ReconcileReport {
        let snapshot = sanitize_snapshot(equipment);
        let visible: HashMap<&str, &Equipment> = snapshot
            .iter()
            .filter(|e| layers.is_type_visible(e.equipment_type))
            .map(|e| (e.tag.as_str(), e))
            .collect();

        let mut report = ReconcileReport::default();

        let stale: Vec<String> = self
            .objects
            .keys()
            .filter(|tag| !visible.contains_key(tag.as_str()))
            .cloned()
            .collect();
        for tag in stale {
            self.dispose(graph, pool, &tag);
            report.removed += 1;
        }

        for item in snapshot
            .iter()
            .filter(|e| visible.contains_key(e.tag.as_str()))
        {
            let primitive = primitive_for(item.equipment_type, &item.shape);
            match self.objects.get(&item.tag) {
                Some(live) if live.primitive != primitive || live.shape != item.shape => {
                    tracing::debug!(tag = %item.tag, "shape changed, rebuilding mesh");
                    self.dispose(graph, pool, &item.tag);
                    if self.create(graph, pool, item, primitive, mode) {
                        report.recreated += 1;
                    }
                }
                Some(_) => {
                    if self.update(graph, pool, item, mode) {
                        report.updated += 1;
                    }
                }
                None => {
                    if self.create(graph, pool, item, primitive, mode) {
                        report.created += 1;
                    }
                }
            }
        }

        report.terrain_changed = self.sync_terrain(graph, pool, layers.is_terrain_visible());

        if report.membership_changed() {
            self.generation += 1;
        }
        tracing::debug!(
            created = report.created,
            updated = report.updated,
            recreated = report.recreated,
            removed = report.removed,
            live = self.objects.len(),
            generation = self.generation,
            "reconciled scene"
        );
        report
    }

    fn create(
        &mut self,
        graph: &mut SceneGraph,
        pool: &mut ResourcePool,
        item: &Equipment,
        primitive: Primitive,
        mode: ColorMode,
    ) -> bool {
        let transform = Transform::from_position_euler(item.position, item.rotation);
        let Some(group) = graph.add_child(graph.root(), Primitive::Group, transform) else {
            return false;
        };
        let Some(mesh) = graph.add_child(group, primitive, Transform::IDENTITY) else {
            graph.remove_subtree(group);
            return false;
        };
        graph.set_tag(group, object_tag(item));

        let geometry = pool.acquire_geometry(&primitive);
        let material = pool.create_material(self.colors.material(item, mode));
        if let Some(node) = graph.node_mut(mesh) {
            node.geometry = geometry;
            node.material = Some(material);
        }

        self.objects.insert(
            item.tag.clone(),
            LiveObject {
                group,
                mesh,
                primitive,
                shape: item.shape,
            },
        );
        true
    }

    fn update(
        &mut self,
        graph: &mut SceneGraph,
        pool: &mut ResourcePool,
        item: &Equipment,
        mode: ColorMode,
    ) -> bool {
        let Some(live) = self.objects.get(&item.tag) else {
            return false;
        };
        let mut changed = false;

        let transform = Transform::from_position_euler(item.position, item.rotation);
        if let Some(group) = graph.node_mut(live.group) {
            if group.transform != transform {
                group.transform = transform;
                changed = true;
            }
        }

        let tag = object_tag(item);
        if graph.tag(live.group) != Some(&tag) {
            graph.set_tag(live.group, tag);
            changed = true;
        }

        if let Some(material) = graph.node(live.mesh).and_then(|n| n.material) {
            changed |= pool.update_material(material, self.colors.material(item, mode));
        }
        changed
    }

    fn dispose(&mut self, graph: &mut SceneGraph, pool: &mut ResourcePool, tag: &str) {
        let Some(live) = self.objects.remove(tag) else {
            return;
        };
        release_nodes(pool, graph.remove_subtree(live.group));
        tracing::debug!(tag = %tag, "disposed scene object");
    }

    /// Returns whether the ground plane was added or removed.
    fn sync_terrain(
        &mut self,
        graph: &mut SceneGraph,
        pool: &mut ResourcePool,
        visible: bool,
    ) -> bool {
        match (visible, self.terrain) {
            (true, None) => {
                let primitive = Primitive::Plane {
                    half_size: self.terrain_size * 0.5,
                };
                let Some(node) = graph.add_child(graph.root(), primitive, Transform::IDENTITY)
                else {
                    return false;
                };
                let geometry = pool.acquire_geometry(&primitive);
                let material = pool.create_material(self.terrain_material);
                if let Some(n) = graph.node_mut(node) {
                    n.geometry = geometry;
                    n.material = Some(material);
                }
                self.terrain = Some(node);
                true
            }
            (false, Some(node)) => {
                release_nodes(pool, graph.remove_subtree(node));
                self.terrain = None;
                true
            }
            _ => false,
        }
    }

    /// Remove every object and the terrain. Used at teardown.
    pub fn clear(&mut self, graph: &mut SceneGraph, pool: &mut ResourcePool) {
        let tags: Vec<String> = self.objects.keys().cloned().collect();
        let had_any = !tags.is_empty() || self.terrain.is_some();
        for tag in tags {
            self.dispose(graph, pool, &tag);
        }
        self.sync_terrain(graph, pool, false);
        if had_any {
            self.generation += 1;
        }
    }
}

fn object_tag(item: &Equipment) -> ObjectTag {
    ObjectTag {
        tag: item.tag.clone(),
        equipment_type: item.equipment_type,
        system: item.system.clone(),
    }
}

fn release_nodes(pool: &mut ResourcePool, nodes: Vec<crate::scene_graph::SceneNode>) {
    for node in nodes {
        if let Some(geometry) = node.geometry {
            pool.release_geometry(geometry);
        }
        if let Some(material) = node.material {
            pool.release_material(material);
        }
    }
}
