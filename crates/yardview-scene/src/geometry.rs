//! # Primitive Mesh Synthesis
//!
//! Builds the triangle meshes equipment is drawn with: boxes, upright
//! cylinders, spheres, and the flat ground plane. Meshes are generated in
//! local space centered on the origin; placement comes from the owning
//! scene node's transform.

use glam::Vec3;
use std::f32::consts::{PI, TAU};

use crate::bounds::Aabb;

/// Floats per vertex: position, normal, color.
pub const VERTEX_STRIDE_FLOATS: usize = 10;

const CYLINDER_SEGMENTS: u32 = 32;
const SPHERE_RINGS: u32 = 16;
const SPHERE_SEGMENTS: u32 = 24;

/// A triangle mesh ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct RenderableMesh {
    /// Vertex data: [x, y, z, nx, ny, nz, r, g, b, a] per vertex
    pub vertices: Vec<f32>,
    /// Index data for triangles
    pub indices: Vec<u32>,
    pub bounds: Aabb,
}

/// Surface parameters for one scene object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshMaterial {
    /// Diffuse color (RGBA)
    pub diffuse_color: [f32; 4],
    /// Ambient color (RGBA)
    pub ambient_color: [f32; 4],
    /// Specular color (RGBA)
    pub specular_color: [f32; 4],
    pub shininess: f32,
    /// 0.0 = fully transparent, 1.0 = fully opaque
    pub alpha: f32,
}

impl Default for MeshMaterial {
    fn default() -> Self {
        Self {
            diffuse_color: [0.7, 0.7, 0.8, 1.0],
            ambient_color: [0.2, 0.2, 0.2, 1.0],
            specular_color: [0.4, 0.4, 0.4, 1.0],
            shininess: 32.0,
            alpha: 1.0,
        }
    }
}

impl MeshMaterial {
    pub fn solid(color: [f32; 3], alpha: f32) -> Self {
        Self {
            diffuse_color: [color[0], color[1], color[2], alpha],
            ambient_color: [color[0] * 0.3, color[1] * 0.3, color[2] * 0.3, alpha],
            alpha,
            ..Default::default()
        }
    }

    /// Matte material for the ground plane.
    pub fn ground(color: [f32; 3]) -> Self {
        Self {
            specular_color: [0.0, 0.0, 0.0, 1.0],
            shininess: 1.0,
            ..Self::solid(color, 1.0)
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.alpha < 1.0
    }

    pub fn color(&self) -> [f32; 3] {
        [
            self.diffuse_color[0],
            self.diffuse_color[1],
            self.diffuse_color[2],
        ]
    }
}

impl RenderableMesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            bounds: Aabb::EMPTY,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / VERTEX_STRIDE_FLOATS
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn push_vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.vertex_count() as u32;
        self.vertices.extend_from_slice(&[
            position.x, position.y, position.z, normal.x, normal.y, normal.z, 1.0, 1.0, 1.0, 1.0,
        ]);
        self.bounds.expand_to(position);
        index
    }

    /// Box with full extents `size`, 4 vertices per face for flat normals.
    pub fn create_box(size: Vec3) -> Self {
        let h = size * 0.5;
        let mut mesh = Self::new();

        // (normal, u axis, v axis) per face
        let faces = [
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        ];

        for (normal, u, v) in faces {
            let center = normal * h;
            let du = u * h;
            let dv = v * h;
            let a = mesh.push_vertex(center - du - dv, normal);
            let b = mesh.push_vertex(center + du - dv, normal);
            let c = mesh.push_vertex(center + du + dv, normal);
            let d = mesh.push_vertex(center - du + dv, normal);
            mesh.indices.extend_from_slice(&[a, b, c, c, d, a]);
        }

        mesh
    }

    /// Upright (Y axis) capped cylinder centered on the origin.
    pub fn create_cylinder(radius: f32, height: f32) -> Self {
        let half = height * 0.5;
        let mut mesh = Self::new();

        for i in 0..CYLINDER_SEGMENTS {
            let a0 = i as f32 / CYLINDER_SEGMENTS as f32 * TAU;
            let a1 = (i + 1) as f32 / CYLINDER_SEGMENTS as f32 * TAU;
            let (s0, c0) = a0.sin_cos();
            let (s1, c1) = a1.sin_cos();
            let n0 = Vec3::new(s0, 0.0, c0);
            let n1 = Vec3::new(s1, 0.0, c1);

            let b0 = mesh.push_vertex(n0 * radius - Vec3::Y * half, n0);
            let b1 = mesh.push_vertex(n1 * radius - Vec3::Y * half, n1);
            let t1 = mesh.push_vertex(n1 * radius + Vec3::Y * half, n1);
            let t0 = mesh.push_vertex(n0 * radius + Vec3::Y * half, n0);
            mesh.indices.extend_from_slice(&[b0, b1, t1, t1, t0, b0]);

            let top_c = mesh.push_vertex(Vec3::Y * half, Vec3::Y);
            let top0 = mesh.push_vertex(n0 * radius + Vec3::Y * half, Vec3::Y);
            let top1 = mesh.push_vertex(n1 * radius + Vec3::Y * half, Vec3::Y);
            mesh.indices.extend_from_slice(&[top_c, top0, top1]);

            let bot_c = mesh.push_vertex(-Vec3::Y * half, Vec3::NEG_Y);
            let bot0 = mesh.push_vertex(n0 * radius - Vec3::Y * half, Vec3::NEG_Y);
            let bot1 = mesh.push_vertex(n1 * radius - Vec3::Y * half, Vec3::NEG_Y);
            mesh.indices.extend_from_slice(&[bot_c, bot1, bot0]);
        }

        mesh
    }

    /// UV sphere centered on the origin.
    pub fn create_sphere(radius: f32) -> Self {
        let mut mesh = Self::new();

        for ring in 0..=SPHERE_RINGS {
            let phi = ring as f32 / SPHERE_RINGS as f32 * PI;
            let (sin_phi, cos_phi) = phi.sin_cos();
            for seg in 0..=SPHERE_SEGMENTS {
                let theta = seg as f32 / SPHERE_SEGMENTS as f32 * TAU;
                let (sin_theta, cos_theta) = theta.sin_cos();
                let normal = Vec3::new(sin_phi * sin_theta, cos_phi, sin_phi * cos_theta);
                mesh.push_vertex(normal * radius, normal);
            }
        }

        let row = SPHERE_SEGMENTS + 1;
        for ring in 0..SPHERE_RINGS {
            for seg in 0..SPHERE_SEGMENTS {
                let a = ring * row + seg;
                let b = a + row;
                mesh.indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }

        mesh
    }

    /// Square ground plane on y = 0 facing up.
    pub fn create_ground(size: f32) -> Self {
        let h = size * 0.5;
        let mut mesh = Self::new();
        let a = mesh.push_vertex(Vec3::new(-h, 0.0, h), Vec3::Y);
        let b = mesh.push_vertex(Vec3::new(h, 0.0, h), Vec3::Y);
        let c = mesh.push_vertex(Vec3::new(h, 0.0, -h), Vec3::Y);
        let d = mesh.push_vertex(Vec3::new(-h, 0.0, -h), Vec3::Y);
        mesh.indices.extend_from_slice(&[a, b, c, c, d, a]);
        mesh
    }
}

impl Default for RenderableMesh {
    fn default() -> Self {
        Self::new()
    }
}
