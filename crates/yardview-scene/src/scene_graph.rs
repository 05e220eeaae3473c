//! # Scene Graph
//!
//! Arena of nodes keyed by [`NodeId`]. Ids are never reused, so a stale id
//! held by a resolver or the outline controller simply stops resolving
//! instead of pointing at an unrelated object.
//!
//! Equipment identity lives in a side-table ([`ObjectTag`]) rather than in
//! the nodes themselves; picking walks up the parent chain until it finds
//! a tagged node.

use glam::{Mat4, Quat, Vec3};
use std::collections::HashMap;
use yardview_core::EquipmentType;

use crate::bounds::Aabb;
use crate::resources::{GeometryId, MaterialId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

/// Analytic shape of a node in its local space, centered on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Group,
    Box { half_extents: Vec3 },
    /// Upright along local Y
    Cylinder { radius: f32, half_height: f32 },
    Sphere { radius: f32 },
    /// Horizontal square on local y = 0
    Plane { half_size: f32 },
}

impl Primitive {
    pub fn local_bounds(&self) -> Aabb {
        match *self {
            Primitive::Group => Aabb::EMPTY,
            Primitive::Box { half_extents } => Aabb::new(-half_extents, half_extents),
            Primitive::Cylinder {
                radius,
                half_height,
            } => {
                let h = Vec3::new(radius, half_height, radius);
                Aabb::new(-h, h)
            }
            Primitive::Sphere { radius } => Aabb::new(Vec3::splat(-radius), Vec3::splat(radius)),
            Primitive::Plane { half_size } => Aabb::new(
                Vec3::new(-half_size, 0.0, -half_size),
                Vec3::new(half_size, 0.0, half_size),
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Position plus optional XYZ Euler rotation in radians.
    pub fn from_position_euler(position: [f32; 3], rotation: Option<[f32; 3]>) -> Self {
        let rotation = rotation
            .map(|[x, y, z]| Quat::from_euler(glam::EulerRot::XYZ, x, y, z))
            .unwrap_or(Quat::IDENTITY);
        Self {
            translation: Vec3::from_array(position),
            rotation,
            scale: Vec3::ONE,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub transform: Transform,
    pub primitive: Primitive,
    pub geometry: Option<GeometryId>,
    pub material: Option<MaterialId>,
    pub visible: bool,
}

impl SceneNode {
    fn new(parent: Option<NodeId>, primitive: Primitive, transform: Transform) -> Self {
        Self {
            parent,
            children: Vec::new(),
            transform,
            primitive,
            geometry: None,
            material: None,
            visible: true,
        }
    }
}

/// Equipment identity attached to a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectTag {
    pub tag: String,
    pub equipment_type: EquipmentType,
    pub system: String,
}

/// One drawable node, flattened with its world matrix.
#[derive(Debug, Clone, Copy)]
pub struct DrawItem {
    pub node: NodeId,
    pub world: Mat4,
    pub geometry: GeometryId,
    pub material: MaterialId,
}

#[derive(Debug)]
pub struct SceneGraph {
    nodes: HashMap<NodeId, SceneNode>,
    tags: HashMap<NodeId, ObjectTag>,
    root: NodeId,
    next_id: u64,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            SceneNode::new(None, Primitive::Group, Transform::IDENTITY),
        );
        Self {
            nodes,
            tags: HashMap::new(),
            root,
            next_id: 1,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&id)
    }

    /// Attach a new node under `parent`. `None` if the parent is gone.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        primitive: Primitive,
        transform: Transform,
    ) -> Option<NodeId> {
        if !self.nodes.contains_key(&parent) {
            tracing::warn!(?parent, "add_child on missing parent");
            return None;
        }
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes
            .insert(id, SceneNode::new(Some(parent), primitive, transform));
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(id);
        }
        Some(id)
    }

    pub fn set_tag(&mut self, id: NodeId, tag: ObjectTag) {
        if self.nodes.contains_key(&id) {
            self.tags.insert(id, tag);
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&ObjectTag> {
        self.tags.get(&id)
    }

    pub fn tagged_nodes(&self) -> impl Iterator<Item = (NodeId, &ObjectTag)> {
        self.tags.iter().map(|(id, tag)| (*id, tag))
    }

    /// Detach and remove `id` with all descendants. The root cannot be removed.
    /// Returns the removed nodes so their resources can be released.
    pub fn remove_subtree(&mut self, id: NodeId) -> Vec<SceneNode> {
        if id == self.root {
            return Vec::new();
        }
        let Some(parent) = self.nodes.get(&id).and_then(|n| n.parent) else {
            return Vec::new();
        };
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.retain(|c| *c != id);
        }

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            self.tags.remove(&next);
            if let Some(node) = self.nodes.remove(&next) {
                stack.extend(node.children.iter().copied());
                removed.push(node);
            }
        }
        removed
    }

    /// `id` followed by each ancestor up to the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.nodes.get(&node_id) else {
                break;
            };
            chain.push(node_id);
            current = node.parent;
        }
        chain
    }

    /// Nearest node (self included) carrying an equipment tag.
    pub fn tagged_ancestor(&self, id: NodeId) -> Option<(NodeId, &ObjectTag)> {
        self.ancestors(id)
            .into_iter()
            .find_map(|a| self.tags.get(&a).map(|t| (a, t)))
    }

    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        if !self.nodes.contains_key(&id) {
            return None;
        }
        let mut world = Mat4::IDENTITY;
        for ancestor in self.ancestors(id).into_iter().rev() {
            if let Some(node) = self.nodes.get(&ancestor) {
                world *= node.transform.matrix();
            }
        }
        Some(world)
    }

    /// Whether the node and every ancestor are visible.
    pub fn is_effectively_visible(&self, id: NodeId) -> bool {
        let chain = self.ancestors(id);
        !chain.is_empty()
            && chain
                .iter()
                .all(|a| self.nodes.get(a).is_some_and(|n| n.visible))
    }

    /// Depth-first ids of `id` and its descendants.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.get(&next) {
                out.push(next);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// World-space box of the subtree under `id`.
    pub fn world_bounds(&self, id: NodeId) -> Aabb {
        let Some(parent_world) = self
            .node(id)
            .and_then(|n| n.parent)
            .and_then(|p| self.world_matrix(p))
            .or_else(|| self.contains(id).then_some(Mat4::IDENTITY))
        else {
            return Aabb::EMPTY;
        };
        self.subtree_bounds(id, parent_world)
    }

    fn subtree_bounds(&self, id: NodeId, parent_world: Mat4) -> Aabb {
        let Some(node) = self.nodes.get(&id) else {
            return Aabb::EMPTY;
        };
        let world = parent_world * node.transform.matrix();
        node.children.iter().fold(
            node.primitive.local_bounds().transformed(&world),
            |acc, child| acc.union(&self.subtree_bounds(*child, world)),
        )
    }

    /// Flatten visible mesh nodes with their world matrices.
    pub fn draw_list(&self) -> Vec<DrawItem> {
        let mut items = Vec::new();
        self.collect_draws(self.root, Mat4::IDENTITY, &mut items);
        items
    }

    fn collect_draws(&self, id: NodeId, parent_world: Mat4, out: &mut Vec<DrawItem>) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if !node.visible {
            return;
        }
        let world = parent_world * node.transform.matrix();
        if let (Some(geometry), Some(material)) = (node.geometry, node.material) {
            out.push(DrawItem {
                node: id,
                world,
                geometry,
                material,
            });
        }
        for child in &node.children {
            self.collect_draws(*child, world, out);
        }
    }
}
