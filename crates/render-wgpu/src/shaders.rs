/// WGSL shader for every lit mesh: instanced transforms and colors, one
/// texture, ambient + hemisphere + point lights.
pub const SCENE_SHADER: &str = r#"
struct PointLight {
    position: vec4<f32>,
    color: vec4<f32>,
};

struct Uniforms {
    view_proj: mat4x4<f32>,
    eye: vec4<f32>,
    // x = ambient, y = environment intensity
    ambient: vec4<f32>,
    sky: vec4<f32>,
    ground: vec4<f32>,
    lights: array<PointLight, 2>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

@group(1) @binding(0)
var albedo: texture_2d<f32>;
@group(1) @binding(1)
var albedo_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct InstanceInput {
    @location(3) model_0: vec4<f32>,
    @location(4) model_1: vec4<f32>,
    @location(5) model_2: vec4<f32>,
    @location(6) model_3: vec4<f32>,
    @location(7) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) color: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_position = world_pos.xyz;
    out.world_normal = normalize(world_normal);
    out.uv = vertex.uv;
    out.color = instance.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.world_normal);
    let view_dir = normalize(uniforms.eye.xyz - in.world_position);
    let base = textureSample(albedo, albedo_sampler, in.uv) * in.color;

    let hemi = mix(uniforms.ground.rgb, uniforms.sky.rgb, n.y * 0.5 + 0.5);
    var light = vec3<f32>(uniforms.ambient.x) + hemi * uniforms.ambient.y;
    var specular = vec3<f32>(0.0);
    for (var i = 0u; i < 2u; i = i + 1u) {
        let l = normalize(uniforms.lights[i].position.xyz - in.world_position);
        let intensity = uniforms.lights[i].color.rgb * uniforms.lights[i].color.a;
        light = light + intensity * max(dot(n, l), 0.0);
        let h = normalize(l + view_dir);
        specular = specular + intensity * pow(max(dot(n, h), 0.0), 32.0) * 0.15;
    }
    return vec4<f32>(base.rgb * light + specular, base.a);
}
"#;
