//! Catalogue of named point-wise complex maps.
//!
//! This module defines the [`ComplexMap`] trait for point-wise maps, the
//! [`MapKind`] enum naming each built-in formula, and the
//! [`MapRegistry`]: a constant table binding every kind to its default
//! parameters.
//!
//! | Name          | Formula               | Defaults                 |
//! |---------------|-----------------------|--------------------------|
//! | `Linear`      | `a·z + b`             | a = 1.5, b = 0           |
//! | `Quadratic`   | `z²`                  |                          |
//! | `Inverse`     | `1 / (z + ε)`         |                          |
//! | `Exponential` | `e^z`                 |                          |
//! | `Bilinear`    | `(a·z + b) / (c·z + d)` | a = 1, b = 0, c = 0, d = 1 |
//!
//! The registry is never mutated. Parameter overrides produce a new
//! [`MapFunction`] and leave the table untouched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{ComplexPoint, PipelineError, PointSet};

/// Additive regularizer for `Inverse` and clamp floor for the `Bilinear`
/// denominator.
pub const EPSILON: f64 = 1e-8;

/// Identifies one built-in map formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapKind {
    /// `a·z + b`.
    Linear,
    /// `z²`.
    Quadratic,
    /// `1 / (z + ε)`.
    Inverse,
    /// `e^z`, no rescaling.
    Exponential,
    /// Möbius transform `(a·z + b) / (c·z + d)`.
    Bilinear,
}

impl MapKind {
    /// Registry key for this kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::Quadratic => "Quadratic",
            Self::Inverse => "Inverse",
            Self::Exponential => "Exponential",
            Self::Bilinear => "Bilinear",
        }
    }

    /// Human-readable formula.
    #[must_use]
    pub const fn formula(self) -> &'static str {
        match self {
            Self::Linear => "a*z + b",
            Self::Quadratic => "z^2",
            Self::Inverse => "1 / (z + eps)",
            Self::Exponential => "e^z",
            Self::Bilinear => "(a*z + b) / (c*z + d)",
        }
    }

    /// Names of the parameters this kind reads.
    #[must_use]
    pub const fn parameter_names(self) -> &'static [&'static str] {
        match self {
            Self::Linear => &["a", "b"],
            Self::Quadratic | Self::Inverse | Self::Exponential => &[],
            Self::Bilinear => &["a", "b", "c", "d"],
        }
    }
}

impl fmt::Display for MapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Numeric parameters bound to a map.
///
/// Every kind carries all four slots; each formula reads only the ones
/// listed in [`MapKind::parameter_names`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapParams {
    /// Numerator scale.
    pub a: f64,
    /// Numerator offset.
    pub b: f64,
    /// Denominator scale (`Bilinear` only).
    pub c: f64,
    /// Denominator offset (`Bilinear` only).
    pub d: f64,
}

impl MapParams {
    /// The identity parameters `a = 1, b = 0, c = 0, d = 1`.
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
    };

    /// Registered defaults for `Linear`.
    pub const LINEAR: Self = Self {
        a: 1.5,
        ..Self::IDENTITY
    };

    fn slot_mut(&mut self, name: &str) -> Option<&mut f64> {
        match name {
            "a" => Some(&mut self.a),
            "b" => Some(&mut self.b),
            "c" => Some(&mut self.c),
            "d" => Some(&mut self.d),
            _ => None,
        }
    }

    /// Value of a named parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "a" => Some(self.a),
            "b" => Some(self.b),
            "c" => Some(self.c),
            "d" => Some(self.d),
            _ => None,
        }
    }
}

/// A `name=value` parameter override supplied at invocation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamOverride {
    /// Parameter name (`a`, `b`, `c`, or `d`).
    pub name: String,
    /// Replacement value.
    pub value: f64,
}

impl ParamOverride {
    /// Create a new override.
    #[must_use]
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl FromStr for ParamOverride {
    type Err = PipelineError;

    /// Parse `name=value`, e.g. `c=0.8`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = s.split_once('=').ok_or_else(|| {
            PipelineError::InvalidConfig(format!("parameter override must be 'name=value', got '{s}'"))
        })?;
        let value: f64 = value.trim().parse().map_err(|e| {
            PipelineError::InvalidConfig(format!("invalid value for parameter '{}': {e}", name.trim()))
        })?;
        Ok(Self::new(name.trim(), value))
    }
}

/// Trait for point-wise complex maps.
///
/// Implementations must be pure: the output for a point depends only on
/// that point and the map's bound parameters.
pub trait ComplexMap {
    /// Name used in titles and error messages.
    fn name(&self) -> &str;

    /// Map a single point.
    fn map_point(&self, z: ComplexPoint) -> ComplexPoint;

    /// Map every point of a set, preserving order.
    fn apply(&self, points: &PointSet) -> PointSet {
        points.iter().map(|&z| self.map_point(z)).collect()
    }
}

/// A map kind with its parameters bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapFunction {
    /// Which formula to evaluate.
    pub kind: MapKind,
    /// Parameters the formula reads.
    pub params: MapParams,
}

impl MapFunction {
    /// Bind a kind to explicit parameters.
    #[must_use]
    pub const fn new(kind: MapKind, params: MapParams) -> Self {
        Self { kind, params }
    }

    /// Return a copy with `overrides` applied on top of the current
    /// parameters.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidParameter`] if an override names a
    /// parameter this kind does not read, or carries a non-finite value.
    pub fn with_overrides(mut self, overrides: &[ParamOverride]) -> Result<Self, PipelineError> {
        for o in overrides {
            let rejected = |reason: &str| PipelineError::InvalidParameter {
                map: self.kind.name().to_string(),
                parameter: o.name.clone(),
                reason: reason.to_string(),
            };
            if !self.kind.parameter_names().contains(&o.name.as_str()) {
                return Err(rejected("not a parameter of this map"));
            }
            if !o.value.is_finite() {
                return Err(rejected("value must be finite"));
            }
            if let Some(slot) = self.params.slot_mut(&o.name) {
                *slot = o.value;
            }
        }
        Ok(self)
    }

    /// Map every point and reject non-finite output.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NonFinite`] if any mapped point has a NaN
    /// or infinite component.
    pub fn apply_checked(&self, points: &PointSet) -> Result<PointSet, PipelineError> {
        let mapped = self.apply(points);
        match mapped.non_finite_count() {
            0 => Ok(mapped),
            count => Err(PipelineError::NonFinite {
                map: self.kind.name().to_string(),
                count,
            }),
        }
    }
}

impl ComplexMap for MapFunction {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn map_point(&self, z: ComplexPoint) -> ComplexPoint {
        let MapParams { a, b, c, d } = self.params;
        match self.kind {
            MapKind::Linear => z.scale(a) + ComplexPoint::from_real(b),
            MapKind::Quadratic => z.square(),
            MapKind::Inverse => ComplexPoint::ONE / (z + ComplexPoint::from_real(EPSILON)),
            MapKind::Exponential => z.exp(),
            MapKind::Bilinear => {
                let numerator = z.scale(a) + ComplexPoint::from_real(b);
                let denominator = clamp_components(z.scale(c) + ComplexPoint::from_real(d));
                numerator / denominator
            }
        }
    }
}

/// Replace each component whose magnitude is below [`EPSILON`] with
/// `EPSILON`, real and imaginary parts independently.
///
/// Note this is not a magnitude clamp: a denominator of exactly `1 + 0i`
/// becomes `1 + εi`.
#[must_use]
pub fn clamp_components(z: ComplexPoint) -> ComplexPoint {
    let clamp = |x: f64| if x.abs() < EPSILON { EPSILON } else { x };
    ComplexPoint::new(clamp(z.re), clamp(z.im))
}

/// One registry row: a kind and its default parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapEntry {
    /// Formula.
    pub kind: MapKind,
    /// Registered defaults.
    pub defaults: MapParams,
}

impl MapEntry {
    /// The entry as a ready-to-apply function with default parameters.
    #[must_use]
    pub const fn function(&self) -> MapFunction {
        MapFunction::new(self.kind, self.defaults)
    }
}

/// Fixed, read-only table from map name to [`MapFunction`].
#[derive(Debug)]
pub struct MapRegistry {
    entries: &'static [MapEntry],
}

static BUILTIN: MapRegistry = MapRegistry {
    entries: &[
        MapEntry {
            kind: MapKind::Linear,
            defaults: MapParams::LINEAR,
        },
        MapEntry {
            kind: MapKind::Quadratic,
            defaults: MapParams::IDENTITY,
        },
        MapEntry {
            kind: MapKind::Inverse,
            defaults: MapParams::IDENTITY,
        },
        MapEntry {
            kind: MapKind::Exponential,
            defaults: MapParams::IDENTITY,
        },
        MapEntry {
            kind: MapKind::Bilinear,
            defaults: MapParams::IDENTITY,
        },
    ],
};

impl MapRegistry {
    /// The process-wide built-in catalogue.
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// All entries in catalogue order.
    #[must_use]
    pub const fn entries(&self) -> &[MapEntry] {
        self.entries
    }

    /// Registry keys in catalogue order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.kind.name())
    }

    /// Whether `name` is a registry key.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    fn entry(&self, name: &str) -> Option<&MapEntry> {
        self.entries.iter().find(|e| e.kind.name() == name)
    }

    /// Look up a map by name, bound to its registered defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::UnknownMap`] if `name` is not a key.
    pub fn resolve(&self, name: &str) -> Result<MapFunction, PipelineError> {
        self.entry(name)
            .map(MapEntry::function)
            .ok_or_else(|| PipelineError::UnknownMap(name.to_string()))
    }

    /// Look up a map by name and apply parameter overrides.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::UnknownMap`] if `name` is not a key, or
    /// [`PipelineError::InvalidParameter`] if an override is rejected.
    pub fn resolve_with(
        &self,
        name: &str,
        overrides: &[ParamOverride],
    ) -> Result<MapFunction, PipelineError> {
        self.resolve(name)?.with_overrides(overrides)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    fn close(a: ComplexPoint, b: ComplexPoint, tol: f64) -> bool {
        (a - b).norm() < tol
    }

    fn builtin(name: &str) -> MapFunction {
        MapRegistry::builtin().resolve(name).unwrap()
    }

    #[test]
    fn registry_lists_catalogue_in_order() {
        let names: Vec<_> = MapRegistry::builtin().names().collect();
        assert_eq!(
            names,
            vec!["Linear", "Quadratic", "Inverse", "Exponential", "Bilinear"]
        );
    }

    #[test]
    fn every_kind_is_registered() {
        for kind in [
            MapKind::Linear,
            MapKind::Quadratic,
            MapKind::Inverse,
            MapKind::Exponential,
            MapKind::Bilinear,
        ] {
            assert!(MapRegistry::builtin().contains(kind.name()));
            assert_eq!(builtin(kind.name()).kind, kind);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = MapRegistry::builtin().resolve("Bogus").unwrap_err();
        assert!(matches!(err, PipelineError::UnknownMap(ref n) if n == "Bogus"));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(MapRegistry::builtin().resolve("quadratic").is_err());
    }

    #[test]
    fn resolving_twice_gives_identical_output() {
        let input = PointSet::new(vec![ComplexPoint::new(0.3, -0.7), ComplexPoint::ONE]);
        for name in MapRegistry::builtin().names() {
            let first = builtin(name).apply(&input);
            let second = builtin(name).apply(&input);
            assert_eq!(first, second, "{name}");
        }
    }

    #[test]
    fn linear_defaults_scale_by_one_and_a_half() {
        let z = builtin("Linear").map_point(ComplexPoint::new(2.0, -1.0));
        assert!(close(z, ComplexPoint::new(3.0, -1.5), TOLERANCE));
    }

    #[test]
    fn linear_with_offset_override() {
        let f = MapRegistry::builtin()
            .resolve_with("Linear", &[ParamOverride::new("b", 0.5)])
            .unwrap();
        let z = f.map_point(ComplexPoint::new(0.0, 1.0));
        assert!(close(z, ComplexPoint::new(0.5, 1.5), TOLERANCE));
    }

    #[test]
    fn quadratic_squares() {
        let z = builtin("Quadratic").map_point(ComplexPoint::new(1.0, 1.0));
        assert!(close(z, ComplexPoint::new(0.0, 2.0), TOLERANCE));
    }

    #[test]
    fn inverse_of_origin_is_regularized() {
        let z = builtin("Inverse").map_point(ComplexPoint::ZERO);
        assert!(z.is_finite());
        assert!(close(z, ComplexPoint::from_real(1.0 / EPSILON), 1e-3));
    }

    #[test]
    fn inverse_of_minus_one() {
        let z = builtin("Inverse").map_point(ComplexPoint::new(-1.0, 0.0));
        assert!((z.re - 1.0 / (-1.0 + EPSILON)).abs() < TOLERANCE);
        assert!(z.im.abs() < TOLERANCE);
    }

    #[test]
    fn exponential_has_no_rescaling() {
        let z = builtin("Exponential").map_point(ComplexPoint::ONE);
        assert!(close(z, ComplexPoint::from_real(std::f64::consts::E), TOLERANCE));
    }

    #[test]
    fn bilinear_defaults_are_nearly_identity() {
        // d = 1 + 0i has a zero imaginary part, clamped to EPSILON.
        let z = ComplexPoint::new(0.4, -0.3);
        let mapped = builtin("Bilinear").map_point(z);
        assert!(close(mapped, z, 1e-7));
        assert_ne!(mapped, z);
    }

    #[test]
    fn bilinear_with_overrides() {
        let f = MapRegistry::builtin()
            .resolve_with(
                "Bilinear",
                &[
                    ParamOverride::new("a", 1.0),
                    ParamOverride::new("c", 0.8),
                    ParamOverride::new("d", 1.0),
                ],
            )
            .unwrap();
        assert!((f.params.c - 0.8).abs() < TOLERANCE);
        // z = i: numerator i, denominator 1 + 0.8i.
        let z = ComplexPoint::new(0.0, 1.0);
        let expected = z / ComplexPoint::new(1.0, 0.8);
        assert!(close(f.map_point(z), expected, TOLERANCE));
    }

    #[test]
    fn overrides_do_not_mutate_registry() {
        let _ = MapRegistry::builtin()
            .resolve_with("Linear", &[ParamOverride::new("a", 9.0)])
            .unwrap();
        assert!((builtin("Linear").params.a - 1.5).abs() < TOLERANCE);
    }

    #[test]
    fn bilinear_denominator_clamp_avoids_blow_up() {
        // c·z + d = -1·1 + 1 = 0 + 0i: both components clamp to EPSILON.
        let f = MapRegistry::builtin()
            .resolve_with(
                "Bilinear",
                &[ParamOverride::new("c", -1.0), ParamOverride::new("d", 1.0)],
            )
            .unwrap();
        let z = ComplexPoint::ONE;
        let mapped = f.map_point(z);
        assert!(mapped.is_finite(), "{mapped:?}");
        let expected = z / ComplexPoint::new(EPSILON, EPSILON);
        assert!(close(mapped, expected, 1e-3));
    }

    #[test]
    fn clamp_is_component_wise_not_magnitude() {
        let clamped = clamp_components(ComplexPoint::new(5.0, 1e-9));
        assert_eq!(clamped, ComplexPoint::new(5.0, EPSILON));
        let negative = clamp_components(ComplexPoint::new(-1e-9, -2.0));
        assert_eq!(negative, ComplexPoint::new(EPSILON, -2.0));
    }

    #[test]
    fn override_of_undeclared_parameter_is_rejected() {
        let err = MapRegistry::builtin()
            .resolve_with("Linear", &[ParamOverride::new("c", 1.0)])
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidParameter { ref parameter, .. } if parameter == "c"
        ));
    }

    #[test]
    fn non_finite_override_is_rejected() {
        let err = MapRegistry::builtin()
            .resolve_with("Bilinear", &[ParamOverride::new("a", f64::NAN)])
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidParameter { .. }));
    }

    #[test]
    fn override_parses_from_string() {
        let o: ParamOverride = " c = 0.8 ".parse().unwrap();
        assert_eq!(o, ParamOverride::new("c", 0.8));
        assert!("c".parse::<ParamOverride>().is_err());
        assert!("c=abc".parse::<ParamOverride>().is_err());
    }

    #[test]
    fn apply_checked_rejects_overflow() {
        let set = PointSet::new(vec![ComplexPoint::from_real(1000.0)]);
        let err = builtin("Exponential").apply_checked(&set).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::NonFinite { ref map, count: 1 } if map == "Exponential"
        ));
    }

    #[test]
    fn apply_preserves_order() {
        let set = PointSet::new(vec![ComplexPoint::from_real(1.0), ComplexPoint::from_real(2.0)]);
        let mapped = builtin("Quadratic").apply(&set);
        assert_eq!(
            mapped.points(),
            &[ComplexPoint::from_real(1.0), ComplexPoint::from_real(4.0)]
        );
    }
}
