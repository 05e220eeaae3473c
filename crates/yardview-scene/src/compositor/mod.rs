//! # OpenGL Compositor
//!
//! Draws a [`Frame`] in three steps:
//!
//! 1. raster pass: lit meshes into an offscreen color+depth target,
//!    opaque first, then translucent back to front;
//! 2. mask pass: outlined meshes as flat white into the mask target;
//! 3. composite: full-screen blend of the scene and the mask's edges
//!    into whatever framebuffer the host widget had bound.
//!
//! Vertex buffers are uploaded when the pool reports a new geometry and
//! deleted when it reports a disposal.

mod buffers;
pub mod shaders;

use glam::{Mat3, Mat4, Vec3};
use glow::HasContext;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use yardview_core::{Result, SceneError};

use crate::pipeline::{Compositor, Frame};
use crate::resources::{GeometryId, ResourceEvent};
use crate::scene_graph::DrawItem;
use buffers::{MeshBuffers, RenderTarget};
use shaders::*;

/// Lighting parameters for the raster pass
#[derive(Debug, Clone)]
pub struct LightingParams {
    /// Light direction (normalized)
    pub light_direction: Vec3,
    pub light_color: Vec3,
    pub ambient_color: Vec3,
}

impl Default for LightingParams {
    fn default() -> Self {
        Self {
            light_direction: Vec3::new(-0.3, -1.0, -0.7).normalize(),
            light_color: Vec3::new(1.0, 1.0, 1.0),
            ambient_color: Vec3::new(0.35, 0.35, 0.38),
        }
    }
}

pub struct GlCompositor {
    gl: Rc<glow::Context>,
    mesh_program: glow::Program,
    mask_program: glow::Program,
    composite_program: glow::Program,
    fullscreen_vao: glow::VertexArray,
    meshes: HashMap<GeometryId, MeshBuffers>,
    scene_target: Option<RenderTarget>,
    mask_target: Option<RenderTarget>,
    lighting: LightingParams,
    disposed: bool,
}

impl std::fmt::Debug for GlCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlCompositor")
            .field("meshes", &self.meshes.len())
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl GlCompositor {
    /// Compile programs and create the shared vertex array.
    pub fn new(gl: Rc<glow::Context>) -> Result<Self> {
        let mesh_program = create_shader_program(&gl, MESH_VERTEX_SHADER, MESH_FRAGMENT_SHADER)?;
        let mask_program = create_shader_program(&gl, MASK_VERTEX_SHADER, MASK_FRAGMENT_SHADER)
            .inspect_err(|_| unsafe { gl.delete_program(mesh_program) })?;
        let composite_program =
            create_shader_program(&gl, COMPOSITE_VERTEX_SHADER, COMPOSITE_FRAGMENT_SHADER)
                .inspect_err(|_| unsafe {
                    gl.delete_program(mesh_program);
                    gl.delete_program(mask_program);
                })?;
        let fullscreen_vao = unsafe { gl.create_vertex_array() }.map_err(|e| {
            unsafe {
                gl.delete_program(mesh_program);
                gl.delete_program(mask_program);
                gl.delete_program(composite_program);
            }
            SceneError::Buffer(e)
        })?;

        tracing::info!("GL compositor created");
        Ok(Self {
            gl,
            mesh_program,
            mask_program,
            composite_program,
            fullscreen_vao,
            meshes: HashMap::new(),
            scene_target: None,
            mask_target: None,
            lighting: LightingParams::default(),
            disposed: false,
        })
    }

    pub fn set_lighting(&mut self, lighting: LightingParams) {
        self.lighting = lighting;
    }

    pub fn uploaded_meshes(&self) -> usize {
        self.meshes.len()
    }

    fn apply_resource_events(&mut self, frame: &Frame<'_>) -> Result<()> {
        for event in frame.resource_events {
            match *event {
                ResourceEvent::GeometryCreated(id) => {
                    if let Some(mesh) = frame.pool.geometry(id) {
                        let buffers = MeshBuffers::upload(&self.gl, mesh)?;
                        if let Some(old) = self.meshes.insert(id, buffers) {
                            old.delete(&self.gl);
                        }
                    }
                }
                ResourceEvent::GeometryDisposed(id) => {
                    if let Some(buffers) = self.meshes.remove(&id) {
                        buffers.delete(&self.gl);
                    }
                }
                ResourceEvent::MaterialCreated(_) | ResourceEvent::MaterialDisposed(_) => {}
            }
        }

        // Geometry that predates this compositor never produced an event here
        for draw in frame.draws {
            if !self.meshes.contains_key(&draw.geometry) {
                if let Some(mesh) = frame.pool.geometry(draw.geometry) {
                    let buffers = MeshBuffers::upload(&self.gl, mesh)?;
                    self.meshes.insert(draw.geometry, buffers);
                }
            }
        }
        Ok(())
    }

    fn raster_pass(&self, frame: &Frame<'_>, target: &RenderTarget) {
        let gl = &self.gl;
        let [r, g, b] = frame.background;
        target.bind(gl);
        unsafe {
            gl.clear_color(r, g, b, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LEQUAL);
            gl.use_program(Some(self.mesh_program));
        }

        let program = self.mesh_program;
        self.set_uniform_vec3(program, "light_direction", &self.lighting.light_direction);
        self.set_uniform_vec3(program, "light_color", &self.lighting.light_color);
        self.set_uniform_vec3(program, "ambient_color", &self.lighting.ambient_color);
        self.set_uniform_vec3(program, "camera_position", &frame.camera_position);

        let (mut opaque, mut translucent): (Vec<&DrawItem>, Vec<&DrawItem>) =
            frame.draws.iter().partition(|d| {
                frame
                    .pool
                    .material(d.material)
                    .is_none_or(|m| !m.is_transparent())
            });
        opaque.sort_by_key(|d| d.geometry);
        let eye = frame.camera_position;
        translucent.sort_by(|a, b| {
            let da = a.world.w_axis.truncate().distance_squared(eye);
            let db = b.world.w_axis.truncate().distance_squared(eye);
            db.total_cmp(&da)
        });

        for draw in &opaque {
            self.draw_lit(frame, draw);
        }

        if !translucent.is_empty() {
            unsafe {
                gl.enable(glow::BLEND);
                gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
                gl.depth_mask(false);
            }
            for draw in &translucent {
                self.draw_lit(frame, draw);
            }
            unsafe {
                gl.depth_mask(true);
                gl.disable(glow::BLEND);
            }
        }
    }

    fn draw_lit(&self, frame: &Frame<'_>, draw: &DrawItem) {
        let (Some(buffers), Some(material)) = (
            self.meshes.get(&draw.geometry),
            frame.pool.material(draw.material),
        ) else {
            return;
        };
        let program = self.mesh_program;
        let mvp = frame.projection * frame.view * draw.world;
        let normal = Mat3::from_mat4(draw.world.inverse().transpose());

        self.set_uniform_mat4(program, "mvp_matrix", &mvp);
        self.set_uniform_mat4(program, "model_matrix", &draw.world);
        self.set_uniform_mat3(program, "normal_matrix", &normal);
        self.set_uniform_vec4(program, "material_diffuse", &material.diffuse_color);
        self.set_uniform_vec4(program, "material_ambient", &material.ambient_color);
        self.set_uniform_vec4(program, "material_specular", &material.specular_color);
        self.set_uniform_f32(program, "material_shininess", material.shininess);
        self.set_uniform_f32(program, "material_alpha", material.alpha);
        buffers.draw(&self.gl);
    }

    fn mask_pass(&self, frame: &Frame<'_>, target: &RenderTarget) {
        let gl = &self.gl;
        target.bind(gl);
        unsafe {
            gl.clear_color(0.0, 0.0, 0.0, 0.0);
            gl.clear(glow::COLOR_BUFFER_BIT);
            gl.disable(glow::DEPTH_TEST);
            gl.use_program(Some(self.mask_program));
        }
        if !frame.outline.is_active() {
            return;
        }
        let targets: HashSet<_> = frame.outline.targets.iter().copied().collect();
        for draw in frame.draws.iter().filter(|d| targets.contains(&d.node)) {
            if let Some(buffers) = self.meshes.get(&draw.geometry) {
                let mvp = frame.projection * frame.view * draw.world;
                self.set_uniform_mat4(self.mask_program, "mvp_matrix", &mvp);
                buffers.draw(gl);
            }
        }
    }

    fn composite_pass(
        &self,
        frame: &Frame<'_>,
        scene: &RenderTarget,
        mask: &RenderTarget,
        output: Option<glow::Framebuffer>,
    ) {
        let gl = &self.gl;
        let program = self.composite_program;
        let outline = frame.outline;
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, output);
            gl.viewport(0, 0, scene.width as i32, scene.height as i32);
            gl.disable(glow::DEPTH_TEST);
            gl.use_program(Some(program));

            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(scene.color));
            gl.active_texture(glow::TEXTURE1);
            gl.bind_texture(glow::TEXTURE_2D, Some(mask.color));
        }
        self.set_uniform_i32(program, "scene_texture", 0);
        self.set_uniform_i32(program, "mask_texture", 1);
        let texel = [1.0 / mask.width as f32, 1.0 / mask.height as f32];
        self.set_uniform_vec2(program, "mask_texel_size", &texel);
        self.set_uniform_vec3(program, "edge_color", &Vec3::from_array(outline.color));
        let strength = if outline.is_active() {
            outline.edge_strength
        } else {
            0.0
        };
        self.set_uniform_f32(program, "edge_strength", strength);
        self.set_uniform_f32(program, "edge_thickness", outline.edge_thickness);
        self.set_uniform_f32(program, "edge_glow", outline.edge_glow);

        unsafe {
            gl.bind_vertex_array(Some(self.fullscreen_vao));
            gl.draw_arrays(glow::TRIANGLES, 0, 3);
            gl.bind_vertex_array(None);
            gl.active_texture(glow::TEXTURE1);
            gl.bind_texture(glow::TEXTURE_2D, None);
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, None);
            gl.use_program(None);
        }
    }

    /// Framebuffer the host had bound when the frame started.
    fn current_framebuffer(&self) -> Option<glow::Framebuffer> {
        let raw = unsafe { self.gl.get_parameter_i32(glow::FRAMEBUFFER_BINDING) };
        std::num::NonZeroU32::new(raw as u32).map(glow::NativeFramebuffer)
    }

    // Helper methods

    fn set_uniform_mat4(&self, program: glow::Program, name: &str, matrix: &Mat4) {
        unsafe {
            if let Some(loc) = self.gl.get_uniform_location(program, name) {
                self.gl
                    .uniform_matrix_4_f32_slice(Some(&loc), false, &matrix.to_cols_array());
            }
        }
    }

    fn set_uniform_mat3(&self, program: glow::Program, name: &str, matrix: &Mat3) {
        unsafe {
            if let Some(loc) = self.gl.get_uniform_location(program, name) {
                self.gl
                    .uniform_matrix_3_f32_slice(Some(&loc), false, &matrix.to_cols_array());
            }
        }
    }

    fn set_uniform_vec2(&self, program: glow::Program, name: &str, vec: &[f32; 2]) {
        unsafe {
            if let Some(loc) = self.gl.get_uniform_location(program, name) {
                self.gl.uniform_2_f32(Some(&loc), vec[0], vec[1]);
            }
        }
    }

    fn set_uniform_vec3(&self, program: glow::Program, name: &str, vec: &Vec3) {
        unsafe {
            if let Some(loc) = self.gl.get_uniform_location(program, name) {
                self.gl.uniform_3_f32(Some(&loc), vec.x, vec.y, vec.z);
            }
        }
    }

    fn set_uniform_vec4(&self, program: glow::Program, name: &str, vec: &[f32; 4]) {
        unsafe {
            if let Some(loc) = self.gl.get_uniform_location(program, name) {
                self.gl.uniform_4_f32(Some(&loc), vec[0], vec[1], vec[2], vec[3]);
            }
        }
    }

    fn set_uniform_f32(&self, program: glow::Program, name: &str, value: f32) {
        unsafe {
            if let Some(loc) = self.gl.get_uniform_location(program, name) {
                self.gl.uniform_1_f32(Some(&loc), value);
            }
        }
    }

    fn set_uniform_i32(&self, program: glow::Program, name: &str, value: i32) {
        unsafe {
            if let Some(loc) = self.gl.get_uniform_location(program, name) {
                self.gl.uniform_1_i32(Some(&loc), value);
            }
        }
    }
}

impl Compositor for GlCompositor {
    fn resize(&mut self, raster: (u32, u32), outline: (u32, u32)) -> Result<()> {
        if self.disposed {
            return Err(SceneError::NotInitialized);
        }
        if let Some(old) = self.scene_target.take() {
            old.delete(&self.gl);
        }
        if let Some(old) = self.mask_target.take() {
            old.delete(&self.gl);
        }
        self.scene_target = Some(RenderTarget::create(&self.gl, raster.0, raster.1, true)?);
        self.mask_target = Some(RenderTarget::create(&self.gl, outline.0, outline.1, false)?);
        tracing::debug!(?raster, ?outline, "compositor targets resized");
        Ok(())
    }

    fn render(&mut self, frame: &Frame<'_>) -> Result<()> {
        if self.disposed {
            return Err(SceneError::NotInitialized);
        }
        let output = self.current_framebuffer();
        self.apply_resource_events(frame)?;

        let (Some(scene), Some(mask)) = (self.scene_target.as_ref(), self.mask_target.as_ref())
        else {
            return Err(SceneError::Framebuffer(
                "render before the targets were sized".to_string(),
            ));
        };

        self.raster_pass(frame, scene);
        self.mask_pass(frame, mask);
        self.composite_pass(frame, scene, mask, output);
        Ok(())
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        let gl = Rc::clone(&self.gl);
        for (_, buffers) in self.meshes.drain() {
            buffers.delete(&gl);
        }
        if let Some(target) = self.scene_target.take() {
            target.delete(&gl);
        }
        if let Some(target) = self.mask_target.take() {
            target.delete(&gl);
        }
        unsafe {
            gl.delete_vertex_array(self.fullscreen_vao);
            gl.delete_program(self.mesh_program);
            gl.delete_program(self.mask_program);
            gl.delete_program(self.composite_program);
        }
        tracing::info!("GL compositor disposed");
    }
}

impl Drop for GlCompositor {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn create_shader_program(
    gl: &glow::Context,
    vs_source: &str,
    fs_source: &str,
) -> Result<glow::Program> {
    unsafe {
        let vs = gl.create_shader(glow::VERTEX_SHADER).map_err(SceneError::Shader)?;
        gl.shader_source(vs, vs_source);
        gl.compile_shader(vs);
        if !gl.get_shader_compile_status(vs) {
            let info = gl.get_shader_info_log(vs);
            gl.delete_shader(vs);
            return Err(SceneError::Shader(format!("Vertex shader: {info}")));
        }

        let fs = gl.create_shader(glow::FRAGMENT_SHADER).map_err(SceneError::Shader)?;
        gl.shader_source(fs, fs_source);
        gl.compile_shader(fs);
        if !gl.get_shader_compile_status(fs) {
            let info = gl.get_shader_info_log(fs);
            gl.delete_shader(vs);
            gl.delete_shader(fs);
            return Err(SceneError::Shader(format!("Fragment shader: {info}")));
        }

        let program = gl.create_program().map_err(SceneError::Shader)?;
        gl.attach_shader(program, vs);
        gl.attach_shader(program, fs);
        gl.link_program(program);
        if !gl.get_program_link_status(program) {
            let info = gl.get_program_info_log(program);
            gl.delete_shader(vs);
            gl.delete_shader(fs);
            gl.delete_program(program);
            return Err(SceneError::Shader(format!("Program linking: {info}")));
        }

        gl.delete_shader(vs);
        gl.delete_shader(fs);
        Ok(program)
    }
}
