//! Polynomial vector fields and the named preset registry.
//!
//! Every attractor is expressed as three quadratic polynomials, one per
//! axis, over the monomial basis `{1, x, y, z, x², xy, xz, y², yz, z²}`:
//!
//! ```text
//! dx/dt = Σ cx[i] · m[i](x, y, z)
//! dy/dt = Σ cy[i] · m[i](x, y, z)
//! dz/dt = Σ cz[i] · m[i](x, y, z)
//! ```
//!
//! The same coefficient layout is uploaded to the GPU, so the CPU and
//! WGSL evaluations sum the terms in the same order.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Number of monomials in the quadratic basis.
pub const MONOMIAL_COUNT: usize = 10;

/// Total number of coefficients (three axes).
pub const COEFFICIENT_COUNT: usize = 3 * MONOMIAL_COUNT;

/// One term of the quadratic monomial basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Monomial {
    One,
    X,
    Y,
    Z,
    XX,
    XY,
    XZ,
    YY,
    YZ,
    ZZ,
}

impl Monomial {
    /// All monomials in coefficient order.
    pub const ALL: [Monomial; MONOMIAL_COUNT] = [
        Monomial::One,
        Monomial::X,
        Monomial::Y,
        Monomial::Z,
        Monomial::XX,
        Monomial::XY,
        Monomial::XZ,
        Monomial::YY,
        Monomial::YZ,
        Monomial::ZZ,
    ];

    /// Position of this monomial in a coefficient row.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Evaluate every monomial at `p`, in coefficient order.
#[inline]
pub fn monomials(p: Vec3) -> [f32; MONOMIAL_COUNT] {
    let (x, y, z) = (p.x, p.y, p.z);
    [1.0, x, y, z, x * x, x * y, x * z, y * y, y * z, z * z]
}

/// Output axis of a coefficient row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// A quadratic vector field: 10 coefficients per axis.
///
/// Fields are values. Selecting a preset replaces the whole field; there
/// is no way to patch a single coefficient of the active field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttractorField {
    x: [f32; MONOMIAL_COUNT],
    y: [f32; MONOMIAL_COUNT],
    z: [f32; MONOMIAL_COUNT],
}

impl AttractorField {
    /// The degenerate field: every particle has zero velocity.
    pub const ZERO: Self = Self {
        x: [0.0; MONOMIAL_COUNT],
        y: [0.0; MONOMIAL_COUNT],
        z: [0.0; MONOMIAL_COUNT],
    };

    /// Build a field from its three coefficient rows.
    pub fn new(x: [f32; MONOMIAL_COUNT], y: [f32; MONOMIAL_COUNT], z: [f32; MONOMIAL_COUNT]) -> Self {
        Self { x, y, z }
    }

    /// Return a copy with one term set. Unset terms stay zero.
    pub fn with_term(mut self, axis: Axis, monomial: Monomial, value: f32) -> Self {
        self.row_mut(axis)[monomial.index()] = value;
        self
    }

    /// Coefficient row for one axis.
    pub fn row(&self, axis: Axis) -> &[f32; MONOMIAL_COUNT] {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }

    fn row_mut(&mut self, axis: Axis) -> &mut [f32; MONOMIAL_COUNT] {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }

    /// Single coefficient lookup.
    pub fn coefficient(&self, axis: Axis, monomial: Monomial) -> f32 {
        self.row(axis)[monomial.index()]
    }

    /// Velocity of the field at `p`.
    #[inline]
    pub fn velocity(&self, p: Vec3) -> Vec3 {
        let m = monomials(p);
        Vec3::new(dot(&self.x, &m), dot(&self.y, &m), dot(&self.z, &m))
    }

    /// All 30 coefficients packed into eight `vec4<f32>` slots.
    ///
    /// Coefficient `k` of the flattened `[x | y | z]` layout lives at
    /// `slots[k / 4][k % 4]`; the last two lanes are zero.
    pub fn to_gpu(&self) -> [[f32; 4]; 8] {
        let mut slots = [[0.0f32; 4]; 8];
        for (k, c) in self.x.iter().chain(self.y.iter()).chain(self.z.iter()).enumerate() {
            slots[k / 4][k % 4] = *c;
        }
        slots
    }
}

impl Default for AttractorField {
    fn default() -> Self {
        Self::ZERO
    }
}

#[inline]
fn dot(c: &[f32; MONOMIAL_COUNT], m: &[f32; MONOMIAL_COUNT]) -> f32 {
    // Left-to-right sum, the order the WGSL kernel uses.
    let mut acc = c[0] * m[0];
    for i in 1..MONOMIAL_COUNT {
        acc += c[i] * m[i];
    }
    acc
}

/// A named, immutable attractor definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Registry key. Lookups ignore ASCII case.
    pub name: String,
    /// The vector field.
    pub field: AttractorField,
    /// Visual centre of the attractor, moved to the origin before rotation.
    #[serde(default)]
    pub center: [f32; 3],
}

impl Preset {
    pub fn new(name: impl Into<String>, field: AttractorField, center: Vec3) -> Self {
        Self {
            name: name.into(),
            field,
            center: center.to_array(),
        }
    }

    /// Lorenz system with parameters σ, ρ, β.
    ///
    /// ```text
    /// dx = σ(y − x)    dy = x(ρ − z) − y    dz = xy − βz
    /// ```
    pub fn lorenz(sigma: f32, rho: f32, beta: f32) -> Self {
        let field = AttractorField::ZERO
            .with_term(Axis::X, Monomial::X, -sigma)
            .with_term(Axis::X, Monomial::Y, sigma)
            .with_term(Axis::Y, Monomial::X, rho)
            .with_term(Axis::Y, Monomial::Y, -1.0)
            .with_term(Axis::Y, Monomial::XZ, -1.0)
            .with_term(Axis::Z, Monomial::XY, 1.0)
            .with_term(Axis::Z, Monomial::Z, -beta);
        Self::new("lorenz", field, Vec3::new(0.0, 0.0, rho - 3.0))
    }

    /// Rössler system with parameters a, b, c.
    ///
    /// ```text
    /// dx = −y − z    dy = x + ay    dz = b + z(x − c)
    /// ```
    pub fn rossler(a: f32, b: f32, c: f32) -> Self {
        let field = AttractorField::ZERO
            .with_term(Axis::X, Monomial::Y, -1.0)
            .with_term(Axis::X, Monomial::Z, -1.0)
            .with_term(Axis::Y, Monomial::X, 1.0)
            .with_term(Axis::Y, Monomial::Y, a)
            .with_term(Axis::Z, Monomial::One, b)
            .with_term(Axis::Z, Monomial::XZ, 1.0)
            .with_term(Axis::Z, Monomial::Z, -c);
        Self::new("rossler", field, Vec3::new(0.0, 0.0, 2.0))
    }

    /// Lü (Lu-Chen) system with parameters a, b, c.
    ///
    /// ```text
    /// dx = a(y − x)    dy = −xz + cy    dz = xy − bz
    /// ```
    pub fn lu_chen(a: f32, b: f32, c: f32) -> Self {
        let field = AttractorField::ZERO
            .with_term(Axis::X, Monomial::X, -a)
            .with_term(Axis::X, Monomial::Y, a)
            .with_term(Axis::Y, Monomial::XZ, -1.0)
            .with_term(Axis::Y, Monomial::Y, c)
            .with_term(Axis::Z, Monomial::XY, 1.0)
            .with_term(Axis::Z, Monomial::Z, -b);
        Self::new("lu-chen", field, Vec3::new(0.0, 0.0, 20.0))
    }

    pub fn center(&self) -> Vec3 {
        Vec3::from_array(self.center)
    }
}

/// Ordered set of named presets.
///
/// Order matters: the number keys select presets by index.
#[derive(Debug, Clone)]
pub struct PresetRegistry {
    presets: Vec<Preset>,
}

impl PresetRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self { presets: Vec::new() }
    }

    /// Registry holding the built-in presets: Lorenz, Rössler, Lu-Chen.
    pub fn builtin() -> Self {
        Self {
            presets: vec![
                Preset::lorenz(10.0, 28.0, 8.0 / 3.0),
                Preset::rossler(0.2, 0.2, 5.7),
                Preset::lu_chen(36.0, 3.0, 20.0),
            ],
        }
    }

    /// Append a preset. Names must be unique (ignoring case).
    pub fn register(&mut self, preset: Preset) -> Result<(), ConfigError> {
        if self.position(&preset.name).is_some() {
            return Err(ConfigError::DuplicatePreset(preset.name));
        }
        self.presets.push(preset);
        Ok(())
    }

    /// Index of the preset called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.presets
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Look up a preset by name.
    pub fn get(&self, name: &str) -> Result<&Preset, ConfigError> {
        self.position(name)
            .map(|i| &self.presets[i])
            .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))
    }

    /// Look up a preset by registration order.
    pub fn by_index(&self, index: usize) -> Result<&Preset, ConfigError> {
        self.presets
            .get(index)
            .ok_or_else(|| ConfigError::UnknownPreset(format!("#{}", index + 1)))
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.presets.iter().map(|p| p.name.as_str()).collect()
    }
}

impl Default for PresetRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_field_has_zero_velocity() {
        let v = AttractorField::ZERO.velocity(Vec3::new(3.0, -7.0, 11.0));
        assert_eq!(v, Vec3::ZERO);
    }

    #[test]
    fn test_lorenz_velocity() {
        let lorenz = Preset::lorenz(10.0, 28.0, 8.0 / 3.0);
        let v = lorenz.field.velocity(Vec3::new(1.0, 2.0, 3.0));
        assert!((v.x - 10.0).abs() < 1e-5);
        // 1 * (28 - 3) - 2 = 23
        assert!((v.y - 23.0).abs() < 1e-5);
        // 1 * 2 - 8/3 * 3 = -6
        assert!((v.z + 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_rossler_velocity() {
        let rossler = Preset::rossler(0.2, 0.2, 5.7);
        let v = rossler.field.velocity(Vec3::new(1.0, 1.0, 1.0));
        assert!((v.x + 2.0).abs() < 1e-5);
        assert!((v.y - 1.2).abs() < 1e-5);
        // 0.2 + 1 * (1 - 5.7)
        assert!((v.z + 4.5).abs() < 1e-5);
    }

    #[test]
    fn test_lu_chen_velocity() {
        let lu = Preset::lu_chen(36.0, 3.0, 20.0);
        let v = lu.field.velocity(Vec3::new(1.0, 2.0, 3.0));
        assert!((v.x - 36.0).abs() < 1e-4);
        assert!((v.y - 37.0).abs() < 1e-4);
        assert!((v.z + 7.0).abs() < 1e-4);
    }

    #[test]
    fn test_to_gpu_layout() {
        let field = AttractorField::ZERO
            .with_term(Axis::X, Monomial::One, 1.0)
            .with_term(Axis::Y, Monomial::One, 2.0)
            .with_term(Axis::Z, Monomial::ZZ, 3.0);
        let slots = field.to_gpu();
        assert_eq!(slots[0][0], 1.0);
        // y row starts at flat index 10
        assert_eq!(slots[2][2], 2.0);
        // z row ends at flat index 29
        assert_eq!(slots[7][1], 3.0);
        assert_eq!(slots[7][2], 0.0);
        assert_eq!(slots[7][3], 0.0);
    }

    #[test]
    fn test_registry_lookup_ignores_case() {
        let registry = PresetRegistry::builtin();
        assert_eq!(registry.get("Lorenz").unwrap().name, "lorenz");
        assert_eq!(registry.position("LU-CHEN"), Some(2));
    }

    #[test]
    fn test_registry_unknown_preset() {
        let registry = PresetRegistry::builtin();
        assert!(matches!(registry.get("henon"), Err(ConfigError::UnknownPreset(_))));
        assert!(matches!(registry.by_index(3), Err(ConfigError::UnknownPreset(_))));
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let mut registry = PresetRegistry::builtin();
        let err = registry.register(Preset::lorenz(10.0, 99.0, 1.0)).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicatePreset(_)));
        assert_eq!(registry.len(), 3);

        registry
            .register(Preset::new("still", AttractorField::ZERO, Vec3::ZERO))
            .unwrap();
        assert_eq!(registry.names(), vec!["lorenz", "rossler", "lu-chen", "still"]);
    }
}
