//! WGSL validation with naga, plus layout checks against the Rust uniform
//! structs uploaded to these shaders.

use attractors::gpu::shaders::{integrate_source, points_source, WORKGROUP_SIZE};
use attractors::gpu::{IntegrateParams, RenderUniforms};
use naga::front::wgsl;
use naga::valid::{Capabilities, ValidationFlags, Validator};

fn parse_and_validate(source: &str) -> naga::Module {
    let module = match wgsl::parse_str(source) {
        Ok(module) => module,
        Err(err) => panic!("{}", err.emit_to_string(source)),
    };

    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
    if let Err(err) = validator.validate(&module) {
        panic!("validation failed: {:?}", err);
    }
    module
}

fn struct_size(module: &naga::Module, name: &str) -> u32 {
    module
        .types
        .iter()
        .find_map(|(_, ty)| match (&ty.name, &ty.inner) {
            (Some(n), naga::TypeInner::Struct { span, .. }) if n == name => Some(*span),
            _ => None,
        })
        .unwrap_or_else(|| panic!("struct {} not found", name))
}

#[test]
fn test_integrate_shader_validates() {
    let module = parse_and_validate(&integrate_source());

    let entry = module
        .entry_points
        .iter()
        .find(|e| e.name == "main")
        .expect("compute entry point");
    assert_eq!(entry.stage, naga::ShaderStage::Compute);
    assert_eq!(entry.workgroup_size, [WORKGROUP_SIZE, 1, 1]);
}

#[test]
fn test_points_shader_validates() {
    let module = parse_and_validate(&points_source());

    let stages: Vec<_> = module.entry_points.iter().map(|e| (e.name.as_str(), e.stage)).collect();
    assert!(stages.contains(&("vs_main", naga::ShaderStage::Vertex)));
    assert!(stages.contains(&("fs_main", naga::ShaderStage::Fragment)));
}

#[test]
fn test_integrate_params_layout_matches() {
    let module = parse_and_validate(&integrate_source());
    assert_eq!(
        struct_size(&module, "Params") as usize,
        std::mem::size_of::<IntegrateParams>()
    );
}

#[test]
fn test_render_uniforms_layout_matches() {
    let module = parse_and_validate(&points_source());
    assert_eq!(
        struct_size(&module, "Uniforms") as usize,
        std::mem::size_of::<RenderUniforms>()
    );
}
