//! # GLSL Sources
//!
//! Lit mesh pass, flat mask pass for outlined objects, and the full-screen
//! composite that blends the scene with the detected outline edges.

pub const MESH_VERTEX_SHADER: &str = r#"
#version 330 core

layout (location = 0) in vec3 position;
layout (location = 1) in vec3 normal;
layout (location = 2) in vec4 color;

uniform mat4 mvp_matrix;
uniform mat4 model_matrix;
uniform mat3 normal_matrix;
uniform vec3 camera_position;
uniform vec4 material_diffuse;

out vec3 frag_position;
out vec3 frag_normal;
out vec4 frag_color;
out vec3 frag_view_direction;

void main() {
    vec4 world_position = model_matrix * vec4(position, 1.0);
    gl_Position = mvp_matrix * vec4(position, 1.0);

    frag_position = world_position.xyz;
    frag_normal = normalize(normal_matrix * normal);
    frag_color = color * material_diffuse;
    frag_view_direction = normalize(camera_position - frag_position);
}
"#;

pub const MESH_FRAGMENT_SHADER: &str = r#"
#version 330 core

in vec3 frag_position;
in vec3 frag_normal;
in vec4 frag_color;
in vec3 frag_view_direction;

uniform vec3 light_direction;
uniform vec3 light_color;
uniform vec3 ambient_color;

uniform vec4 material_ambient;
uniform vec4 material_specular;
uniform float material_shininess;
uniform float material_alpha;

out vec4 FragColor;

void main() {
    vec3 normal = normalize(frag_normal);
    vec3 light_dir = normalize(-light_direction);
    vec3 view_dir = normalize(frag_view_direction);

    vec3 ambient = ambient_color * material_ambient.rgb;

    float diff = max(dot(normal, light_dir), 0.0);
    vec3 diffuse = diff * light_color * frag_color.rgb;

    // Blinn-Phong
    vec3 halfway_dir = normalize(light_dir + view_dir);
    float spec = pow(max(dot(normal, halfway_dir), 0.0), material_shininess);
    vec3 specular = spec * light_color * material_specular.rgb;

    FragColor = vec4(ambient + diffuse + specular, material_alpha);
}
"#;

pub const MASK_VERTEX_SHADER: &str = r#"
#version 330 core

layout (location = 0) in vec3 position;

uniform mat4 mvp_matrix;

void main() {
    gl_Position = mvp_matrix * vec4(position, 1.0);
}
"#;

pub const MASK_FRAGMENT_SHADER: &str = r#"
#version 330 core

out vec4 FragColor;

void main() {
    FragColor = vec4(1.0);
}
"#;

/// Full-screen triangle generated from gl_VertexID, no buffers needed.
pub const COMPOSITE_VERTEX_SHADER: &str = r#"
#version 330 core

out vec2 uv;

void main() {
    vec2 pos = vec2(float((gl_VertexID << 1) & 2), float(gl_VertexID & 2));
    uv = pos;
    gl_Position = vec4(pos * 2.0 - 1.0, 0.0, 1.0);
}
"#;

pub const COMPOSITE_FRAGMENT_SHADER: &str = r#"
#version 330 core

in vec2 uv;

uniform sampler2D scene_texture;
uniform sampler2D mask_texture;
uniform vec2 mask_texel_size;
uniform vec3 edge_color;
uniform float edge_strength;
uniform float edge_thickness;
uniform float edge_glow;

out vec4 FragColor;

void main() {
    vec4 scene = texture(scene_texture, uv);
    if (edge_strength <= 0.0) {
        FragColor = scene;
        return;
    }

    float inside = texture(mask_texture, uv).r;
    float radius = max(edge_thickness, 1.0) + edge_glow * 4.0;
    int steps = int(ceil(radius));

    // Distance to the nearest masked texel, searched in a square window
    float nearest = radius + 1.0;
    for (int y = -steps; y <= steps; ++y) {
        for (int x = -steps; x <= steps; ++x) {
            vec2 offset = vec2(float(x), float(y));
            float m = texture(mask_texture, uv + offset * mask_texel_size).r;
            if (m > 0.5) {
                nearest = min(nearest, length(offset));
            }
        }
    }

    float edge = 0.0;
    if (inside < 0.5 && nearest <= radius) {
        float core = step(nearest, max(edge_thickness, 1.0));
        float halo = edge_glow * (1.0 - nearest / radius);
        edge = clamp(max(core, halo), 0.0, 1.0);
    }

    float amount = clamp(edge * edge_strength / 3.0, 0.0, 1.0);
    FragColor = vec4(mix(scene.rgb, edge_color, amount), 1.0);
}
"#;
