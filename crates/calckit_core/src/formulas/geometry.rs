//! Right triangles and solid volumes.

use std::f64::consts::PI;

use crate::error::{CalcError, ValidationError, ensure_finite};
use crate::format::format_compact;
use crate::model::Outputs;
use crate::units::{LengthUnit, VolumeUnit, convert_volume};
use crate::validate::{Validator, rules};

use super::{Calculation, FormulaId, Inputs};

/// |a² + b² − c²| below this counts as a right triangle
pub const RIGHT_TRIANGLE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct Hypotenuse {
    pub a: f64,
    pub b: f64,
}

impl Hypotenuse {
    pub(crate) fn parse(inputs: &Inputs) -> Result<Self, CalcError> {
        Ok(Self {
            a: inputs.number("a")?,
            b: inputs.number("b")?,
        })
    }
}

impl Calculation for Hypotenuse {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .field("a", self.a, rules::POSITIVE)
            .field("b", self.b, rules::POSITIVE)
            .finish()
    }

    fn compute(&self) -> Result<Outputs, CalcError> {
        let c = ensure_finite("hypotenuse", self.a.hypot(self.b))?;
        Ok(Outputs::new()
            .number("hypotenuse", c)
            .step("c = √(a² + b²)")
            .step(format!(
                "c = √({}² + {}²) = {}",
                format_compact(self.a),
                format_compact(self.b),
                format_compact(c)
            )))
    }

    fn describe(&self) -> String {
        format!("hypotenuse of legs {} and {}", self.a, self.b)
    }
}

/// Missing leg given the hypotenuse and the other leg
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub hypotenuse: f64,
    pub leg: f64,
}

impl Leg {
    pub(crate) fn parse(inputs: &Inputs) -> Result<Self, CalcError> {
        Ok(Self {
            hypotenuse: inputs.number("hypotenuse")?,
            leg: inputs.number("leg")?,
        })
    }
}

impl Calculation for Leg {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .field("hypotenuse", self.hypotenuse, rules::POSITIVE)
            .field("leg", self.leg, rules::POSITIVE)
            .cross(
                "leg",
                self.leg < self.hypotenuse,
                "must be less than the hypotenuse",
            )
            .finish()
    }

    fn compute(&self) -> Result<Outputs, CalcError> {
        let (c, a) = (self.hypotenuse, self.leg);
        let b = ((c - a) * (c + a)).sqrt();
        Ok(Outputs::new()
            .number("leg", b)
            .step("b = √(c² − a²)")
            .step(format!(
                "b = √({}² − {}²) = {}",
                format_compact(c),
                format_compact(a),
                format_compact(b)
            )))
    }

    fn describe(&self) -> String {
        format!("leg of hypotenuse {} and leg {}", self.hypotenuse, self.leg)
    }
}

/// Check whether three sides form a right triangle with hypotenuse `c`
#[derive(Debug, Clone, PartialEq)]
pub struct RightTriangle {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl RightTriangle {
    pub(crate) fn parse(inputs: &Inputs) -> Result<Self, CalcError> {
        Ok(Self {
            a: inputs.number("a")?,
            b: inputs.number("b")?,
            c: inputs.number("c")?,
        })
    }
}

impl Calculation for RightTriangle {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .field("a", self.a, rules::POSITIVE)
            .field("b", self.b, rules::POSITIVE)
            .field("c", self.c, rules::POSITIVE)
            .finish()
    }

    fn compute(&self) -> Result<Outputs, CalcError> {
        let residual = ensure_finite(
            "a² + b² − c²",
            self.a * self.a + self.b * self.b - self.c * self.c,
        )?;
        let is_right = residual.abs() < RIGHT_TRIANGLE_TOLERANCE;
        Ok(Outputs::new()
            .number("residual", residual)
            .label("is_right_triangle", if is_right { "yes" } else { "no" })
            .step(format!("a² + b² − c² = {}", format_compact(residual)))
            .step(if is_right {
                "satisfies the Pythagorean theorem"
            } else {
                "not a right triangle"
            }))
    }

    fn describe(&self) -> String {
        format!("triangle ({}, {}, {})", self.a, self.b, self.c)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SolidShape {
    Cube {
        side: f64,
    },
    Cuboid {
        length: f64,
        width: f64,
        height: f64,
    },
    Sphere {
        radius: f64,
    },
    Cylinder {
        radius: f64,
        height: f64,
    },
    Cone {
        radius: f64,
        height: f64,
    },
    Pyramid {
        base_length: f64,
        base_width: f64,
        height: f64,
    },
    HollowCylinder {
        outer_radius: f64,
        inner_radius: f64,
        height: f64,
    },
}

impl SolidShape {
    pub fn id(&self) -> FormulaId {
        match self {
            SolidShape::Cube { .. } => FormulaId::Cube,
            SolidShape::Cuboid { .. } => FormulaId::Cuboid,
            SolidShape::Sphere { .. } => FormulaId::Sphere,
            SolidShape::Cylinder { .. } => FormulaId::Cylinder,
            SolidShape::Cone { .. } => FormulaId::Cone,
            SolidShape::Pyramid { .. } => FormulaId::Pyramid,
            SolidShape::HollowCylinder { .. } => FormulaId::HollowCylinder,
        }
    }

    /// Named dimensions in declaration order
    fn dimensions(&self) -> Vec<(&'static str, f64)> {
        match *self {
            SolidShape::Cube { side } => vec![("side", side)],
            SolidShape::Cuboid {
                length,
                width,
                height,
            } => vec![("length", length), ("width", width), ("height", height)],
            SolidShape::Sphere { radius } => vec![("radius", radius)],
            SolidShape::Cylinder { radius, height } | SolidShape::Cone { radius, height } => {
                vec![("radius", radius), ("height", height)]
            }
            SolidShape::Pyramid {
                base_length,
                base_width,
                height,
            } => vec![
                ("base_length", base_length),
                ("base_width", base_width),
                ("height", height),
            ],
            SolidShape::HollowCylinder {
                outer_radius,
                inner_radius,
                height,
            } => vec![
                ("outer_radius", outer_radius),
                ("inner_radius", inner_radius),
                ("height", height),
            ],
        }
    }

    fn volume_formula(&self) -> &'static str {
        match self {
            SolidShape::Cube { .. } => "V = s³",
            SolidShape::Cuboid { .. } => "V = l·w·h",
            SolidShape::Sphere { .. } => "V = 4/3·π·r³",
            SolidShape::Cylinder { .. } => "V = π·r²·h",
            SolidShape::Cone { .. } => "V = 1/3·π·r²·h",
            SolidShape::Pyramid { .. } => "V = 1/3·l·w·h",
            SolidShape::HollowCylinder { .. } => "V = π·(R² − r²)·h",
        }
    }

    pub fn volume(&self) -> f64 {
        match *self {
            SolidShape::Cube { side } => side.powi(3),
            SolidShape::Cuboid {
                length,
                width,
                height,
            } => length * width * height,
            SolidShape::Sphere { radius } => 4.0 / 3.0 * PI * radius.powi(3),
            SolidShape::Cylinder { radius, height } => PI * radius * radius * height,
            SolidShape::Cone { radius, height } => PI * radius * radius * height / 3.0,
            SolidShape::Pyramid {
                base_length,
                base_width,
                height,
            } => base_length * base_width * height / 3.0,
            SolidShape::HollowCylinder {
                outer_radius,
                inner_radius,
                height,
            } => PI * (outer_radius * outer_radius - inner_radius * inner_radius) * height,
        }
    }

    pub fn surface_area(&self) -> f64 {
        match *self {
            SolidShape::Cube { side } => 6.0 * side * side,
            SolidShape::Cuboid {
                length,
                width,
                height,
            } => 2.0 * (length * width + length * height + width * height),
            SolidShape::Sphere { radius } => 4.0 * PI * radius * radius,
            SolidShape::Cylinder { radius, height } => 2.0 * PI * radius * (radius + height),
            SolidShape::Cone { radius, height } => {
                PI * radius * (radius + radius.hypot(height))
            }
            SolidShape::Pyramid {
                base_length,
                base_width,
                height,
            } => {
                let slant_l = (base_width / 2.0).hypot(height);
                let slant_w = (base_length / 2.0).hypot(height);
                base_length * base_width + base_length * slant_l + base_width * slant_w
            }
            SolidShape::HollowCylinder {
                outer_radius,
                inner_radius,
                height,
            } => {
                2.0 * PI * (outer_radius + inner_radius) * height
                    + 2.0 * PI * (outer_radius * outer_radius - inner_radius * inner_radius)
            }
        }
    }
}

/// A solid's volume and surface area in the chosen unit
#[derive(Debug, Clone, PartialEq)]
pub struct Solid {
    pub shape: SolidShape,
    pub unit: LengthUnit,
    /// Also report the volume converted to this unit
    pub volume_unit: Option<VolumeUnit>,
}

impl Solid {
    pub(crate) fn parse(id: FormulaId, inputs: &Inputs) -> Result<Self, CalcError> {
        let shape = match id {
            FormulaId::Cube => SolidShape::Cube {
                side: inputs.number("side")?,
            },
            FormulaId::Cuboid => SolidShape::Cuboid {
                length: inputs.number("length")?,
                width: inputs.number("width")?,
                height: inputs.number("height")?,
            },
            FormulaId::Sphere => SolidShape::Sphere {
                radius: inputs.number("radius")?,
            },
            FormulaId::Cylinder => SolidShape::Cylinder {
                radius: inputs.number("radius")?,
                height: inputs.number("height")?,
            },
            FormulaId::Cone => SolidShape::Cone {
                radius: inputs.number("radius")?,
                height: inputs.number("height")?,
            },
            FormulaId::Pyramid => SolidShape::Pyramid {
                base_length: inputs.number("base_length")?,
                base_width: inputs.number("base_width")?,
                height: inputs.number("height")?,
            },
            FormulaId::HollowCylinder => SolidShape::HollowCylinder {
                outer_radius: inputs.number("outer_radius")?,
                inner_radius: inputs.number("inner_radius")?,
                height: inputs.number("height")?,
            },
            other => return Err(CalcError::UnknownFormula(other.to_string())),
        };
        Ok(Self {
            shape,
            unit: inputs.choice("unit")?.unwrap_or_default(),
            volume_unit: inputs.choice("volume_unit")?,
        })
    }
}

impl Calculation for Solid {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Validator::new();
        for (name, value) in self.shape.dimensions() {
            let rule = if name == "inner_radius" {
                rules::NON_NEGATIVE
            } else {
                rules::POSITIVE
            };
            v = v.field(name, value, rule);
        }
        if let SolidShape::HollowCylinder {
            outer_radius,
            inner_radius,
            ..
        } = self.shape
        {
            v = v.cross(
                "inner_radius",
                inner_radius < outer_radius,
                "must be less than outer radius",
            );
        }
        v.finish()
    }

    fn compute(&self) -> Result<Outputs, CalcError> {
        let volume = ensure_finite("volume", self.shape.volume())?;
        let area = ensure_finite("surface area", self.shape.surface_area())?;
        let unit = self.unit.symbol();
        let mut outputs = Outputs::new()
            .number("volume", volume)
            .number("surface_area", area)
            .step(self.shape.volume_formula())
            .step(format!("V = {} {unit}³", format_compact(volume)))
            .step(format!("A = {} {unit}²", format_compact(area)));

        if let Some(target) = self.volume_unit {
            let converted = convert_volume(volume, self.unit, target);
            outputs = outputs.number(target.key(), converted).step(format!(
                "{} {unit}³ = {} {}",
                format_compact(volume),
                format_compact(converted),
                match target {
                    VolumeUnit::Liter => "L",
                    VolumeUnit::Gallon => "gal",
                }
            ));
        }
        Ok(outputs)
    }

    fn describe(&self) -> String {
        let dims: Vec<String> = self
            .shape
            .dimensions()
            .iter()
            .map(|(name, value)| format!("{name}={value}{}", self.unit.symbol()))
            .collect();
        format!("{} ({})", self.shape.id(), dims.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pythagorean_trio() {
        let h = Hypotenuse { a: 3.0, b: 4.0 }.compute().unwrap();
        assert_eq!(h.get("hypotenuse"), Some(5.0));

        let leg = Leg {
            hypotenuse: 5.0,
            leg: 3.0,
        };
        assert_eq!(leg.compute().unwrap().get("leg"), Some(4.0));

        let err = Leg {
            hypotenuse: 3.0,
            leg: 5.0,
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field, "leg");
    }

    #[test]
    fn test_right_triangle_tolerance() {
        let yes = RightTriangle {
            a: 3.0,
            b: 4.0,
            c: 5.0,
        }
        .compute()
        .unwrap();
        assert_eq!(yes.get("residual"), Some(0.0));
        assert!(yes.labels.contains(&("is_right_triangle".into(), "yes".into())));

        let no = RightTriangle {
            a: 3.0,
            b: 4.0,
            c: 5.001,
        }
        .compute()
        .unwrap();
        assert!(no.labels.contains(&("is_right_triangle".into(), "no".into())));
    }

    fn solid(shape: SolidShape) -> Solid {
        Solid {
            shape,
            unit: LengthUnit::Meter,
            volume_unit: None,
        }
    }

    #[test]
    fn test_volumes() {
        let cube = solid(SolidShape::Cube { side: 2.0 }).compute().unwrap();
        assert_eq!(cube.get("volume"), Some(8.0));
        assert_eq!(cube.get("surface_area"), Some(24.0));

        let sphere = solid(SolidShape::Sphere { radius: 1.0 }).compute().unwrap();
        assert!((sphere.get("volume").unwrap() - 4.0 / 3.0 * PI).abs() < 1e-12);

        let cone = solid(SolidShape::Cone {
            radius: 3.0,
            height: 4.0,
        })
        .compute()
        .unwrap();
        assert!((cone.get("volume").unwrap() - 12.0 * PI).abs() < 1e-9);
        // πr(r + slant) with slant 5
        assert!((cone.get("surface_area").unwrap() - 24.0 * PI).abs() < 1e-9);

        let pyramid = solid(SolidShape::Pyramid {
            base_length: 3.0,
            base_width: 3.0,
            height: 4.0,
        })
        .compute()
        .unwrap();
        assert_eq!(pyramid.get("volume"), Some(12.0));
    }

    #[test]
    fn test_hollow_cylinder_radii() {
        let bad = solid(SolidShape::HollowCylinder {
            outer_radius: 1.0,
            inner_radius: 2.0,
            height: 1.0,
        });
        let err = bad.validate().unwrap_err();
        assert_eq!(err.field, "inner_radius");
        assert_eq!(err.message, "must be less than outer radius");

        // A non-positive outer radius is reported before the cross rule
        let worse = solid(SolidShape::HollowCylinder {
            outer_radius: -1.0,
            inner_radius: 2.0,
            height: 1.0,
        });
        assert_eq!(worse.validate().unwrap_err().field, "outer_radius");
    }

    #[test]
    fn test_volume_unit_conversion() {
        let mut s = solid(SolidShape::Cuboid {
            length: 10.0,
            width: 10.0,
            height: 10.0,
        });
        s.unit = LengthUnit::Centimeter;
        s.volume_unit = Some(VolumeUnit::Liter);
        let out = s.compute().unwrap();
        assert!((out.get("volume_liters").unwrap() - 1.0).abs() < 1e-12);
    }
}
