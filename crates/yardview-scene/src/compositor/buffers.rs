//! GPU-side storage for meshes and offscreen render targets.

use glow::HasContext;
use yardview_core::{Result, SceneError};

use crate::geometry::{RenderableMesh, VERTEX_STRIDE_FLOATS};

const STRIDE_BYTES: i32 = (VERTEX_STRIDE_FLOATS * std::mem::size_of::<f32>()) as i32;

/// Vertex array plus its vertex and index buffers
#[derive(Debug)]
pub struct MeshBuffers {
    pub vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: glow::Buffer,
    pub index_count: i32,
}

impl MeshBuffers {
    pub fn upload(gl: &glow::Context, mesh: &RenderableMesh) -> Result<Self> {
        unsafe {
            let vao = gl.create_vertex_array().map_err(SceneError::Buffer)?;
            gl.bind_vertex_array(Some(vao));

            let vbo = gl.create_buffer().map_err(SceneError::Buffer)?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&mesh.vertices),
                glow::STATIC_DRAW,
            );

            let ebo = gl.create_buffer().map_err(SceneError::Buffer)?;
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(&mesh.indices),
                glow::STATIC_DRAW,
            );

            // Position (location 0)
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, STRIDE_BYTES, 0);
            gl.enable_vertex_attrib_array(0);
            // Normal (location 1)
            gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, STRIDE_BYTES, 12);
            gl.enable_vertex_attrib_array(1);
            // Color (location 2)
            gl.vertex_attrib_pointer_f32(2, 4, glow::FLOAT, false, STRIDE_BYTES, 24);
            gl.enable_vertex_attrib_array(2);

            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);

            Ok(Self {
                vao,
                vbo,
                ebo,
                index_count: mesh.indices.len() as i32,
            })
        }
    }

    pub fn draw(&self, gl: &glow::Context) {
        if self.index_count == 0 {
            return;
        }
        unsafe {
            gl.bind_vertex_array(Some(self.vao));
            gl.draw_elements(glow::TRIANGLES, self.index_count, glow::UNSIGNED_INT, 0);
            gl.bind_vertex_array(None);
        }
    }

    pub fn delete(self, gl: &glow::Context) {
        unsafe {
            gl.delete_vertex_array(self.vao);
            gl.delete_buffer(self.vbo);
            gl.delete_buffer(self.ebo);
        }
    }
}

/// GL rejects zero-sized textures; a collapsed widget still gets 1x1.
fn texture_extent(width: u32, height: u32) -> (i32, i32) {
    let clamp = |v: u32| v.clamp(1, i32::MAX as u32) as i32;
    (clamp(width), clamp(height))
}

/// Framebuffer with a color texture and optional depth attachment
#[derive(Debug)]
pub struct RenderTarget {
    pub framebuffer: glow::Framebuffer,
    pub color: glow::Texture,
    depth: Option<glow::Renderbuffer>,
    pub width: u32,
    pub height: u32,
}

impl RenderTarget {
    pub fn create(gl: &glow::Context, width: u32, height: u32, with_depth: bool) -> Result<Self> {
        let (w, h) = texture_extent(width, height);
        unsafe {
            let framebuffer = gl.create_framebuffer().map_err(SceneError::Framebuffer)?;
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(framebuffer));

            let color = gl.create_texture().map_err(SceneError::Framebuffer)?;
            gl.bind_texture(glow::TEXTURE_2D, Some(color));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                w,
                h,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                None,
            );
            for (param, value) in [
                (glow::TEXTURE_MIN_FILTER, glow::LINEAR),
                (glow::TEXTURE_MAG_FILTER, glow::LINEAR),
                (glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE),
                (glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE),
            ] {
                gl.tex_parameter_i32(glow::TEXTURE_2D, param, value as i32);
            }
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                Some(color),
                0,
            );
            gl.bind_texture(glow::TEXTURE_2D, None);

            let depth = if with_depth {
                let rb = gl.create_renderbuffer().map_err(SceneError::Framebuffer)?;
                gl.bind_renderbuffer(glow::RENDERBUFFER, Some(rb));
                gl.renderbuffer_storage(glow::RENDERBUFFER, glow::DEPTH_COMPONENT24, w, h);
                gl.framebuffer_renderbuffer(
                    glow::FRAMEBUFFER,
                    glow::DEPTH_ATTACHMENT,
                    glow::RENDERBUFFER,
                    Some(rb),
                );
                gl.bind_renderbuffer(glow::RENDERBUFFER, None);
                Some(rb)
            } else {
                None
            };

            let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);

            let target = Self {
                framebuffer,
                color,
                depth,
                width: w as u32,
                height: h as u32,
            };
            if status != glow::FRAMEBUFFER_COMPLETE {
                target.delete(gl);
                return Err(SceneError::Framebuffer(format!(
                    "incomplete framebuffer (status 0x{status:X})"
                )));
            }
            Ok(target)
        }
    }

    pub fn bind(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.framebuffer));
            gl.viewport(0, 0, self.width as i32, self.height as i32);
        }
    }

    pub fn delete(self, gl: &glow::Context) {
        unsafe {
            gl.delete_framebuffer(self.framebuffer);
            gl.delete_texture(self.color);
            if let Some(depth) = self.depth {
                gl.delete_renderbuffer(depth);
            }
        }
    }
}
