//! WGSL sources. The field evaluation is shared by both shaders.

/// Workgroup size of the integration kernel; must match `integrate.wgsl`.
pub const WORKGROUP_SIZE: u32 = 256;

const FIELD_WGSL: &str = include_str!("field.wgsl");
const INTEGRATE_WGSL: &str = include_str!("integrate.wgsl");
const POINTS_WGSL: &str = include_str!("points.wgsl");

/// Compute shader: one invocation per particle.
pub fn integrate_source() -> String {
    format!("{}\n{}", INTEGRATE_WGSL, FIELD_WGSL)
}

/// Point-list vertex and fragment shader.
pub fn points_source() -> String {
    format!("{}\n{}", POINTS_WGSL, FIELD_WGSL)
}
