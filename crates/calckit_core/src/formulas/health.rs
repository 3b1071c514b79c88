use std::fmt;
use std::str::FromStr;

use crate::error::{CalcError, ParseError, ValidationError};
use crate::format::format_compact;
use crate::model::Outputs;
use crate::validate::{Rule, Validator};

use super::{Calculation, Inputs};

const WEIGHT_KG: &[Rule] = &[Rule::Positive, Rule::AtMost(700.0)];
const HEIGHT_CM: &[Rule] = &[Rule::Positive, Rule::AtMost(300.0)];

/// WHO adult category for a body-mass index
pub fn bmi_category(bmi: f64) -> &'static str {
    if bmi < 18.5 {
        "underweight"
    } else if bmi < 25.0 {
        "normal"
    } else if bmi < 30.0 {
        "overweight"
    } else {
        "obese"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bmi {
    pub weight_kg: f64,
    pub height_cm: f64,
}

impl Bmi {
    pub(crate) fn parse(inputs: &Inputs) -> Result<Self, CalcError> {
        Ok(Self {
            weight_kg: inputs.number("weight_kg")?,
            height_cm: inputs.number("height_cm")?,
        })
    }
}

impl Calculation for Bmi {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .field("weight_kg", self.weight_kg, WEIGHT_KG)
            .field("height_cm", self.height_cm, HEIGHT_CM)
            .finish()
    }

    fn compute(&self) -> Result<Outputs, CalcError> {
        let meters = self.height_cm / 100.0;
        let bmi = self.weight_kg / (meters * meters);
        Ok(Outputs::new()
            .number("bmi", bmi)
            .label("category", bmi_category(bmi))
            .step("BMI = kg / m²")
            .step(format!(
                "BMI = {} / {}² = {}",
                format_compact(self.weight_kg),
                format_compact(meters),
                format_compact(bmi)
            )))
    }

    fn describe(&self) -> String {
        format!("BMI for {} kg at {} cm", self.weight_kg, self.height_cm)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivityLevel {
    #[default]
    Sedentary,
    Active,
    Athlete,
}

impl ActivityLevel {
    pub const CHOICES: &'static str = "sedentary, active, athlete";

    /// Daily protein, grams per kilogram of body weight
    pub fn grams_per_kg(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 0.8,
            ActivityLevel::Active => 1.3,
            ActivityLevel::Athlete => 1.8,
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "active" => Ok(ActivityLevel::Active),
            "athlete" => Ok(ActivityLevel::Athlete),
            other => Err(ParseError::UnknownChoice {
                field: "activity".into(),
                value: other.to_string(),
                expected: Self::CHOICES,
            }),
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Active => "active",
            ActivityLevel::Athlete => "athlete",
        })
    }
}

/// Recommended daily protein intake
#[derive(Debug, Clone, PartialEq)]
pub struct Protein {
    pub weight_kg: f64,
    pub activity: ActivityLevel,
}

impl Protein {
    pub(crate) fn parse(inputs: &Inputs) -> Result<Self, CalcError> {
        Ok(Self {
            weight_kg: inputs.number("weight_kg")?,
            activity: inputs.choice("activity")?.unwrap_or_default(),
        })
    }
}

impl Calculation for Protein {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .field("weight_kg", self.weight_kg, WEIGHT_KG)
            .finish()
    }

    fn compute(&self) -> Result<Outputs, CalcError> {
        let per_kg = self.activity.grams_per_kg();
        let grams = self.weight_kg * per_kg;
        Ok(Outputs::new()
            .number("protein_grams", grams)
            .number("grams_per_kg", per_kg)
            .label("activity", self.activity.to_string())
            .step(format!(
                "{} kg × {} g/kg ({}) = {} g/day",
                format_compact(self.weight_kg),
                format_compact(per_kg),
                self.activity,
                format_compact(grams)
            )))
    }

    fn describe(&self) -> String {
        format!("protein for {} kg, {}", self.weight_kg, self.activity)
    }
}
