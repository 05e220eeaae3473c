//! # Raycast Interaction Resolver
//!
//! Maps pointer positions to equipment tags. The pointer is converted to a
//! world ray through the camera, every candidate subtree is tested
//! analytically in each node's local space, and the nearest hit is walked
//! up the parent chain to the first tagged node.
//!
//! Local-space rays keep the world parameterization (the direction is not
//! renormalized after the inverse transform), so hit parameters from
//! differently scaled nodes stay directly comparable.

use glam::{Mat4, Vec2, Vec3};

use crate::camera::PerspectiveCamera;
use crate::scene_graph::{NodeId, Primitive, SceneGraph};

/// Widget rectangle the pointer coordinates are relative to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ContainerRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Normalized device coordinates, y up. `None` for a collapsed rect.
    pub fn to_ndc(&self, pointer: Vec2) -> Option<Vec2> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        let x = (pointer.x - self.x) / self.width * 2.0 - 1.0;
        let y = -((pointer.y - self.y) / self.height * 2.0 - 1.0);
        Some(Vec2::new(x, y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// World ray from the camera through the pointer.
    pub fn from_pointer(
        pointer: Vec2,
        rect: &ContainerRect,
        camera: &PerspectiveCamera,
    ) -> Option<Ray> {
        let ndc = rect.to_ndc(pointer)?;
        let inverse = camera.view_projection().inverse();
        if !inverse.is_finite() {
            return None;
        }
        let far = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        let direction = (far - camera.position).normalize_or_zero();
        if direction == Vec3::ZERO || !direction.is_finite() {
            return None;
        }
        Some(Ray::new(camera.position, direction))
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    fn transformed(&self, matrix: &Mat4) -> Ray {
        Ray {
            origin: matrix.transform_point3(self.origin),
            direction: matrix.transform_vector3(self.direction),
        }
    }
}

/// Nearest non-negative ray parameter hitting `primitive` in its local space.
pub fn intersect_primitive(ray: &Ray, primitive: &Primitive) -> Option<f32> {
    match *primitive {
        Primitive::Group => None,
        Primitive::Box { half_extents } => intersect_box(ray, half_extents),
        Primitive::Cylinder {
            radius,
            half_height,
        } => intersect_cylinder(ray, radius, half_height),
        Primitive::Sphere { radius } => intersect_sphere(ray, radius),
        Primitive::Plane { half_size } => intersect_plane(ray, half_size),
    }
}

fn nearest_non_negative(a: f32, b: f32) -> Option<f32> {
    let (near, far) = if a <= b { (a, b) } else { (b, a) };
    if near >= 0.0 {
        Some(near)
    } else if far >= 0.0 {
        Some(far)
    } else {
        None
    }
}

fn intersect_box(ray: &Ray, half: Vec3) -> Option<f32> {
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    for axis in 0..3 {
        let o = ray.origin[axis];
        let d = ray.direction[axis];
        let h = half[axis];
        if d.abs() < f32::EPSILON {
            if o < -h || o > h {
                return None;
            }
            continue;
        }
        let t1 = (-h - o) / d;
        let t2 = (h - o) / d;
        t_min = t_min.max(t1.min(t2));
        t_max = t_max.min(t1.max(t2));
        if t_min > t_max {
            return None;
        }
    }
    nearest_non_negative(t_min, t_max)
}

fn intersect_sphere(ray: &Ray, radius: f32) -> Option<f32> {
    let a = ray.direction.length_squared();
    let b = 2.0 * ray.origin.dot(ray.direction);
    let c = ray.origin.length_squared() - radius * radius;
    let disc = b * b - 4.0 * a * c;
    if a <= 0.0 || disc < 0.0 {
        return None;
    }
    let sqrt = disc.sqrt();
    nearest_non_negative((-b - sqrt) / (2.0 * a), (-b + sqrt) / (2.0 * a))
}

fn intersect_cylinder(ray: &Ray, radius: f32, half_height: f32) -> Option<f32> {
    let (o, d) = (ray.origin, ray.direction);
    let mut best: Option<f32> = None;
    let mut consider = |t: f32| {
        if t >= 0.0 && best.is_none_or(|b| t < b) {
            best = Some(t);
        }
    };

    // Side wall
    let a = d.x * d.x + d.z * d.z;
    if a > f32::EPSILON {
        let b = 2.0 * (o.x * d.x + o.z * d.z);
        let c = o.x * o.x + o.z * o.z - radius * radius;
        let disc = b * b - 4.0 * a * c;
        if disc >= 0.0 {
            let sqrt = disc.sqrt();
            for t in [(-b - sqrt) / (2.0 * a), (-b + sqrt) / (2.0 * a)] {
                if (o.y + t * d.y).abs() <= half_height {
                    consider(t);
                }
            }
        }
    }

    // Caps
    if d.y.abs() > f32::EPSILON {
        for cap in [-half_height, half_height] {
            let t = (cap - o.y) / d.y;
            let p = o + d * t;
            if p.x * p.x + p.z * p.z <= radius * radius {
                consider(t);
            }
        }
    }

    best
}

fn intersect_plane(ray: &Ray, half_size: f32) -> Option<f32> {
    if ray.direction.y.abs() < f32::EPSILON {
        return None;
    }
    let t = -ray.origin.y / ray.direction.y;
    if t < 0.0 {
        return None;
    }
    let p = ray.at(t);
    (p.x.abs() <= half_size && p.z.abs() <= half_size).then_some(t)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub node: NodeId,
    /// Distance from the ray origin in world units
    pub distance: f32,
    pub point: Vec3,
}

/// Nearest hit among `candidates` and all their descendants.
pub fn intersect(graph: &SceneGraph, ray: &Ray, candidates: &[NodeId]) -> Option<Hit> {
    let mut best: Option<Hit> = None;
    for &candidate in candidates {
        for node_id in graph.descendants(candidate) {
            let Some(node) = graph.node(node_id) else {
                continue;
            };
            if matches!(node.primitive, Primitive::Group) || !graph.is_effectively_visible(node_id)
            {
                continue;
            }
            let Some(world) = graph.world_matrix(node_id) else {
                continue;
            };
            let local = ray.transformed(&world.inverse());
            if let Some(t) = intersect_primitive(&local, &node.primitive) {
                if best.is_none_or(|b| t < b.distance) {
                    best = Some(Hit {
                        node: node_id,
                        distance: t,
                        point: ray.at(t),
                    });
                }
            }
        }
    }
    best
}

/// Everything a pick needs, borrowed from the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PickContext<'a> {
    pub graph: &'a SceneGraph,
    pub camera: &'a PerspectiveCamera,
    pub rect: ContainerRect,
    pub candidates: &'a [NodeId],
}

impl PickContext<'_> {
    /// Tag of the nearest tagged object under the pointer.
    pub fn pick(&self, pointer: Vec2) -> Option<String> {
        let ray = Ray::from_pointer(pointer, &self.rect, self.camera)?;
        let hit = intersect(self.graph, &ray, self.candidates)?;
        self.graph
            .tagged_ancestor(hit.node)
            .map(|(_, tag)| tag.tag.clone())
    }
}

/// Result of a click
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickResolution {
    pub tag: Option<String>,
    pub multi_select: bool,
}

/// Hover moved to a different tag (or off every tag)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverChange {
    pub tag: Option<String>,
}

/// Turns pointer input into click and hover signals.
#[derive(Debug, Default)]
pub struct InteractionResolver {
    hovered: Option<String>,
}

impl InteractionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn resolve_click(
        &self,
        ctx: &PickContext<'_>,
        pointer: Vec2,
        multi_select: bool,
    ) -> ClickResolution {
        ClickResolution {
            tag: ctx.pick(pointer),
            multi_select,
        }
    }

    /// Signals only when the hovered tag differs from the last one reported.
    pub fn resolve_move(&mut self, ctx: &PickContext<'_>, pointer: Vec2) -> Option<HoverChange> {
        self.set_hovered(ctx.pick(pointer))
    }

    /// Pointer left the widget.
    pub fn reset_hover(&mut self) -> Option<HoverChange> {
        self.set_hovered(None)
    }

    fn set_hovered(&mut self, tag: Option<String>) -> Option<HoverChange> {
        if self.hovered == tag {
            return None;
        }
        self.hovered.clone_from(&tag);
        Some(HoverChange { tag })
    }
}
