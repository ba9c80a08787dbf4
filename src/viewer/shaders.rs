use bytemuck::{Pod, Zeroable};

/// Per-frame camera data shared by every pipeline.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_right: [f32; 4],
    pub camera_up: [f32; 4],
    pub camera_position: [f32; 4],
    pub time: f32,
    pub _padding: [f32; 3],
}

/// Surface response for one decoration mesh.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Material {
    /// 1.0 draws the instance color unlit.
    pub emissive: f32,
    pub shininess: f32,
    pub specular: f32,
    pub _padding: f32,
}

pub const MESH_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    camera_right: vec4<f32>,
    camera_up: vec4<f32>,
    camera_position: vec4<f32>,
    time: f32,
};

struct Material {
    emissive: f32,
    shininess: f32,
    specular: f32,
    _padding: f32,
};

@group(0) @binding(0) var<uniform> uniforms: Uniforms;
@group(1) @binding(0) var<uniform> material: Material;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) offset: vec3<f32>,
    @location(3) scale: f32,
    @location(4) rotation: vec4<f32>,
    @location(5) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec3<f32>,
};

fn quat_rotate(q: vec4<f32>, v: vec3<f32>) -> vec3<f32> {
    let t = 2.0 * cross(q.xyz, v);
    return v + q.w * t + cross(q.xyz, t);
}

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    var out: VertexOutput;
    let world = instance.offset + quat_rotate(instance.rotation, vertex.position * instance.scale);
    out.clip_position = uniforms.view_proj * vec4<f32>(world, 1.0);
    out.world_position = world;
    out.normal = quat_rotate(instance.rotation, vertex.normal);
    out.color = instance.color.rgb;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    if material.emissive > 0.5 {
        return vec4<f32>(in.color * 1.4, 1.0);
    }

    let n = normalize(in.normal);
    let light_dir = normalize(vec3<f32>(0.5, 1.0, 0.8));
    let view_dir = normalize(uniforms.camera_position.xyz - in.world_position);
    let half_dir = normalize(light_dir + view_dir);

    let ambient = 0.3;
    let diffuse = max(dot(n, light_dir), 0.0) * 0.8;
    let specular = pow(max(dot(n, half_dir), 0.0), material.shininess) * material.specular;

    return vec4<f32>(in.color * (ambient + diffuse) + vec3<f32>(specular), 1.0);
}
"#;

pub const PHOTO_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    camera_right: vec4<f32>,
    camera_up: vec4<f32>,
    camera_position: vec4<f32>,
    time: f32,
};

@group(0) @binding(0) var<uniform> uniforms: Uniforms;
@group(1) @binding(0) var photo_texture: texture_2d<f32>;
@group(1) @binding(1) var photo_sampler: sampler;

struct InstanceInput {
    @location(2) offset: vec3<f32>,
    @location(3) scale: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(
    @location(0) corner: vec2<f32>,
    @location(1) uv: vec2<f32>,
    instance: InstanceInput,
) -> VertexOutput {
    var out: VertexOutput;
    let extent = corner * instance.scale;
    let world = instance.offset
        + uniforms.camera_right.xyz * extent.x
        + uniforms.camera_up.xyz * extent.y;
    out.clip_position = uniforms.view_proj * vec4<f32>(world, 1.0);
    out.uv = uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(photo_texture, photo_sampler, in.uv);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn validate_wgsl(code: &str) -> Result<(), String> {
        let module = naga::front::wgsl::parse_str(code)
            .map_err(|e| format!("WGSL parse error: {:?}", e))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| format!("WGSL validation error: {:?}", e))?;

        Ok(())
    }

    #[test]
    fn test_mesh_shader_validates() {
        validate_wgsl(MESH_SHADER).unwrap();
    }

    #[test]
    fn test_photo_shader_validates() {
        validate_wgsl(PHOTO_SHADER).unwrap();
    }

    #[test]
    fn test_uniform_layouts_match_wgsl() {
        assert_eq!(std::mem::size_of::<Uniforms>(), 128);
        assert_eq!(std::mem::size_of::<Material>(), 16);
    }
}
