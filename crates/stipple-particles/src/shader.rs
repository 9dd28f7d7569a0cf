//! WGSL program compilation and reflection.
//!
//! Both stages are parsed and validated with naga. The uniform block at
//! `@group(0) @binding(0)` and the vertex inputs are reflected so callers
//! can resolve uniforms and attributes by name.
//!
//! A program links only if its interface fits what the particle pipeline
//! supplies: one uniform block and a single `vertexPosition` input.

use std::collections::HashMap;

use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{AddressSpace, Binding, Handle, Module, ResourceBinding, ShaderStage, Type, TypeInner};

use crate::error::ShaderError;
use crate::layout::POSITION_ATTRIBUTE;

const UNIFORM_BINDING: ResourceBinding = ResourceBinding { group: 0, binding: 0 };

/// A linked vertex/fragment program plus its reflected interface.
#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub vertex_source: String,
    pub fragment_source: String,
    pub vertex_entry: String,
    pub fragment_entry: String,

    /// Uniform member name to byte offset within the block.
    pub uniforms: HashMap<String, u32>,
    /// Size of the uniform block in bytes (0 when there is none).
    pub uniform_block_size: u32,

    /// Vertex input name to `@location`.
    pub attributes: HashMap<String, u32>,
}

/// Compiles both stages and links them into a [`ProgramInfo`].
///
/// `capabilities` is what the target device can run; shaders needing more
/// fail to compile.
pub fn compile(
    vertex: &str,
    fragment: &str,
    capabilities: Capabilities,
) -> Result<ProgramInfo, ShaderError> {
    let vs = parse_and_validate("vertex", vertex, capabilities)?;
    let fs = parse_and_validate("fragment", fragment, capabilities)?;

    let vs_entry = vs
        .entry_points
        .iter()
        .find(|ep| ep.stage == ShaderStage::Vertex)
        .ok_or_else(|| ShaderError::Link("vertex shader has no @vertex entry point".into()))?;
    let fs_entry = fs
        .entry_points
        .iter()
        .find(|ep| ep.stage == ShaderStage::Fragment)
        .ok_or_else(|| ShaderError::Link("fragment shader has no @fragment entry point".into()))?;

    // Stage interface: every fragment input needs a vertex output.
    let mut outputs = Vec::new();
    if let Some(result) = &vs_entry.function.result {
        collect_locations(&vs, None, result.ty, result.binding.as_ref(), &mut outputs);
    }
    let mut inputs = Vec::new();
    for arg in &fs_entry.function.arguments {
        collect_locations(&fs, arg.name.as_deref(), arg.ty, arg.binding.as_ref(), &mut inputs);
    }
    for (name, location) in &inputs {
        if !outputs.iter().any(|(_, l)| l == location) {
            return Err(ShaderError::Link(format!(
                "fragment input `{name}` at @location({location}) has no matching vertex output"
            )));
        }
    }

    check_resources("vertex", &vs)?;
    check_resources("fragment", &fs)?;
    let (uniforms, uniform_block_size) = link_uniform_blocks(&vs, &fs)?;

    let mut vertex_inputs = Vec::new();
    for arg in &vs_entry.function.arguments {
        collect_locations(
            &vs,
            arg.name.as_deref(),
            arg.ty,
            arg.binding.as_ref(),
            &mut vertex_inputs,
        );
    }
    // Only the particle position is fed from a buffer.
    if let Some((name, location)) = vertex_inputs
        .iter()
        .find(|(name, _)| name != POSITION_ATTRIBUTE)
    {
        return Err(ShaderError::Link(format!(
            "vertex input `{name}` at @location({location}) is not fed by the particle buffer"
        )));
    }
    let attributes: HashMap<String, u32> = vertex_inputs.into_iter().collect();

    log::debug!(
        "linked program {} / {}: {} uniforms, {} attributes",
        vs_entry.name,
        fs_entry.name,
        uniforms.len(),
        attributes.len()
    );

    Ok(ProgramInfo {
        vertex_source: vertex.to_string(),
        fragment_source: fragment.to_string(),
        vertex_entry: vs_entry.name.clone(),
        fragment_entry: fs_entry.name.clone(),
        uniforms,
        uniform_block_size,
        attributes,
    })
}

fn parse_and_validate(
    stage: &'static str,
    source: &str,
    capabilities: Capabilities,
) -> Result<Module, ShaderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::Compile {
        stage,
        message: e.emit_to_string(source),
    })?;

    Validator::new(ValidationFlags::all(), capabilities)
        .validate(&module)
        .map_err(|e| ShaderError::Compile {
            stage,
            message: e.emit_to_string(source),
        })?;

    Ok(module)
}

/// Flattens `@location` bindings of an argument or result, descending into
/// structs.
fn collect_locations(
    module: &Module,
    name: Option<&str>,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    out: &mut Vec<(String, u32)>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => {
            out.push((name.unwrap_or_default().to_string(), *location));
        }
        Some(_) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for m in members {
                    collect_locations(module, m.name.as_deref(), m.ty, m.binding.as_ref(), out);
                }
            }
        }
    }
}

/// Rejects any bound resource other than the uniform block.
fn check_resources(stage: &str, module: &Module) -> Result<(), ShaderError> {
    for (_, var) in module.global_variables.iter() {
        let Some(binding) = &var.binding else { continue };
        if var.space == AddressSpace::Uniform && *binding == UNIFORM_BINDING {
            continue;
        }
        let name = var.name.as_deref().unwrap_or("<unnamed>");
        return Err(ShaderError::Link(format!(
            "{stage} resource `{name}` at @group({}) @binding({}) is not provided; \
             only a uniform block at @group(0) @binding(0) is bound",
            binding.group, binding.binding
        )));
    }
    Ok(())
}

/// Reflects the uniform block of one stage: member offsets and block size.
fn uniform_block(module: &Module) -> Result<Option<(HashMap<String, u32>, u32)>, ShaderError> {
    let Some((_, var)) = module.global_variables.iter().find(|(_, var)| {
        var.space == AddressSpace::Uniform && var.binding == Some(UNIFORM_BINDING)
    }) else {
        return Ok(None);
    };

    match &module.types[var.ty].inner {
        TypeInner::Struct { members, span } => {
            let offsets = members
                .iter()
                .filter_map(|m| m.name.clone().map(|name| (name, m.offset)))
                .collect();
            Ok(Some((offsets, *span)))
        }
        _ => Err(ShaderError::Link("uniform at @group(0) @binding(0) must be a struct".into())),
    }
}

/// Merges both stages' uniform blocks. Shared members must agree on offset.
fn link_uniform_blocks(
    vs: &Module,
    fs: &Module,
) -> Result<(HashMap<String, u32>, u32), ShaderError> {
    let (mut uniforms, mut size) = uniform_block(vs)?.unwrap_or_default();

    if let Some((fs_uniforms, fs_size)) = uniform_block(fs)? {
        for (name, offset) in fs_uniforms {
            match uniforms.get(&name) {
                Some(&vs_offset) if vs_offset != offset => {
                    return Err(ShaderError::Link(format!(
                        "uniform `{name}` is at offset {vs_offset} in the vertex stage \
                         but {offset} in the fragment stage"
                    )));
                }
                Some(_) => {}
                None => {
                    uniforms.insert(name, offset);
                }
            }
        }
        size = size.max(fs_size);
    }

    Ok((uniforms, size))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERT: &str = include_str!("../resources/shaders/point_particle.vert.wgsl");
    const FRAG: &str = include_str!("../resources/shaders/point_particle.frag.wgsl");

    fn link(vertex: &str, fragment: &str) -> Result<ProgramInfo, ShaderError> {
        compile(vertex, fragment, Capabilities::default())
    }

    #[test]
    fn reflects_particle_program() {
        let info = link(VERT, FRAG).unwrap();

        assert_eq!(info.vertex_entry, "vs_main");
        assert_eq!(info.fragment_entry, "fs_main");

        assert_eq!(info.uniforms.get("mvp"), Some(&0));
        assert_eq!(info.uniforms.get("color"), Some(&64));
        assert_eq!(info.uniforms.get("currentTime"), Some(&80));
        assert_eq!(info.uniform_block_size, 96);

        assert_eq!(info.attributes.get("vertexPosition"), Some(&0));
        assert_eq!(info.attributes.len(), 1);
    }

    #[test]
    fn syntax_error_names_the_stage() {
        let err = link(VERT, "fn fs_main( {").unwrap_err();
        match err {
            ShaderError::Compile { stage, message } => {
                assert_eq!(stage, "fragment");
                assert!(!message.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn validation_error_is_a_compile_error() {
        let bad = "@vertex fn vs_main() -> @builtin(position) vec4<f32> { return 1.0; }";
        assert!(matches!(
            link(bad, FRAG),
            Err(ShaderError::Compile { stage: "vertex", .. })
        ));
    }

    #[test]
    fn missing_entry_point_fails_to_link() {
        let err = link(FRAG, FRAG).unwrap_err();
        assert!(matches!(err, ShaderError::Link(_)), "{err}");
    }

    #[test]
    fn mismatched_uniform_blocks_fail_to_link() {
        let frag = r#"
            struct Uniforms {
                color: vec4<f32>,
                mvp: mat4x4<f32>,
            }
            @group(0) @binding(0) var<uniform> u: Uniforms;

            @fragment
            fn fs_main(@location(0) sprite: vec2<f32>) -> @location(0) vec4<f32> {
                return u.color;
            }
        "#;
        let err = link(VERT, frag).unwrap_err();
        assert!(err.to_string().contains("offset"), "{err}");
    }

    #[test]
    fn unmatched_fragment_input_fails_to_link() {
        let frag = r#"
            @fragment
            fn fs_main(@location(3) tint: vec4<f32>) -> @location(0) vec4<f32> {
                return tint;
            }
        "#;
        let err = link(VERT, frag).unwrap_err();
        assert!(err.to_string().contains("tint"), "{err}");
    }

    #[test]
    fn unfed_vertex_input_fails_to_link() {
        let vert = VERT.replace(
            "@location(0) vertexPosition: vec3<f32>",
            "@location(0) vertexPosition: vec3<f32>, @location(1) extra: vec4<f32>",
        );
        assert_ne!(vert, VERT);

        let err = link(&vert, FRAG).unwrap_err();
        assert!(matches!(err, ShaderError::Link(_)), "{err}");
        assert!(err.to_string().contains("extra"), "{err}");
    }

    #[test]
    fn extra_binding_fails_to_link() {
        let vert = format!("@group(0) @binding(1) var<uniform> extra: vec4<f32>;\n{VERT}");

        let err = link(&vert, FRAG).unwrap_err();
        assert!(matches!(err, ShaderError::Link(_)), "{err}");
        assert!(err.to_string().contains("@binding(1)"), "{err}");
    }

    #[test]
    fn fragment_texture_binding_fails_to_link() {
        let frag = r#"
            @group(1) @binding(0) var tex: texture_2d<f32>;

            @fragment
            fn fs_main(@location(0) sprite: vec2<f32>) -> @location(0) vec4<f32> {
                return textureLoad(tex, vec2<i32>(0, 0), 0);
            }
        "#;
        let err = link(VERT, frag).unwrap_err();
        assert!(err.to_string().contains("`tex`"), "{err}");
    }

    #[test]
    fn features_the_device_lacks_fail_to_compile() {
        let frag = r#"
            @fragment
            fn fs_main(
                @location(0) sprite: vec2<f32>,
                @builtin(primitive_index) index: u32,
            ) -> @location(0) vec4<f32> {
                return vec4<f32>(sprite, f32(index), 1.0);
            }
        "#;
        assert!(matches!(
            link(VERT, frag),
            Err(ShaderError::Compile { stage: "fragment", .. })
        ));

        let caps = Capabilities::default() | Capabilities::PRIMITIVE_INDEX;
        assert!(compile(VERT, frag, caps).is_ok());
    }
}
