//! Feature vector and request validation

use std::fmt;

use chrono::{Datelike, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// Earliest accepted model year
pub const MIN_YEAR: i32 = 1980;

/// Loose upper bounds, meant to reject garbage rather than fit the training data
pub const MAX_POWER_BHP: f64 = 2000.0;
pub const MAX_TORQUE_NM: f64 = 5000.0;
pub const MAX_ENGINE_CC: u32 = 8000;

/// Names of the request fields, in canonical order
pub const FIELD_YEAR: &str = "year";
pub const FIELD_MAX_POWER_BHP: &str = "max_power_bhp";
pub const FIELD_TORQUE_NM: &str = "torque_nm";
pub const FIELD_ENGINE_CC: &str = "engine_cc";

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// All validation failures found in one request
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the error reported for a field, if any
    pub fn field(&self, name: &str) -> Option<&ValidationError> {
        self.0.iter().find(|e| e.field == name)
    }

    fn push(&mut self, field: &str, reason: impl Into<String>) {
        self.0.push(ValidationError::new(field, reason));
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Accepted ranges for each feature
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureBounds {
    pub min_year: i32,
    pub max_year: i32,
    pub max_power_bhp: f64,
    pub max_torque_nm: f64,
    pub max_engine_cc: u32,
}

impl FeatureBounds {
    /// Bounds for a given calendar year (vehicles up to next year's model are accepted)
    pub fn for_year(current_year: i32) -> Self {
        Self {
            min_year: MIN_YEAR,
            max_year: current_year + 1,
            max_power_bhp: MAX_POWER_BHP,
            max_torque_nm: MAX_TORQUE_NM,
            max_engine_cc: MAX_ENGINE_CC,
        }
    }

    /// Bounds based on the current UTC year
    pub fn current() -> Self {
        Self::for_year(Utc::now().year())
    }
}

/// Validated, immutable vehicle features
///
/// Can only be obtained through [`FeatureVector::validate`] (or
/// [`FeatureVector::new`], which runs the same checks).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    year: i32,
    max_power_bhp: f64,
    torque_nm: f64,
    engine_cc: u32,
}

impl FeatureVector {
    /// Builds a vector from typed values, applying the range checks
    pub fn new(
        year: i32,
        max_power_bhp: f64,
        torque_nm: f64,
        engine_cc: u32,
        bounds: &FeatureBounds,
    ) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        check_year(i64::from(year), bounds, &mut errors);
        check_positive(FIELD_MAX_POWER_BHP, max_power_bhp, bounds.max_power_bhp, &mut errors);
        check_positive(FIELD_TORQUE_NM, torque_nm, bounds.max_torque_nm, &mut errors);
        check_engine_cc(i64::from(engine_cc), bounds, &mut errors);

        if errors.is_empty() {
            Ok(Self {
                year,
                max_power_bhp,
                torque_nm,
                engine_cc,
            })
        } else {
            Err(errors)
        }
    }

    /// Validates a raw JSON request body, collecting every violation
    pub fn validate(raw: &Value, bounds: &FeatureBounds) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let Some(object) = raw.as_object() else {
            errors.push("body", "must be a JSON object");
            return Err(errors);
        };

        let year = integer_field(object, FIELD_YEAR, &mut errors)
            .filter(|v| check_year(*v, bounds, &mut errors));
        let power = number_field(object, FIELD_MAX_POWER_BHP, &mut errors)
            .filter(|v| check_positive(FIELD_MAX_POWER_BHP, *v, bounds.max_power_bhp, &mut errors));
        let torque = number_field(object, FIELD_TORQUE_NM, &mut errors)
            .filter(|v| check_positive(FIELD_TORQUE_NM, *v, bounds.max_torque_nm, &mut errors));
        let engine = integer_field(object, FIELD_ENGINE_CC, &mut errors)
            .filter(|v| check_engine_cc(*v, bounds, &mut errors));

        match (year, power, torque, engine) {
            (Some(year), Some(max_power_bhp), Some(torque_nm), Some(engine_cc))
                if errors.is_empty() =>
            {
                // Both were range-checked above, so the narrowing cannot truncate
                Ok(Self {
                    year: year as i32,
                    max_power_bhp,
                    torque_nm,
                    engine_cc: engine_cc as u32,
                })
            }
            _ => Err(errors),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn max_power_bhp(&self) -> f64 {
        self.max_power_bhp
    }

    pub fn torque_nm(&self) -> f64 {
        self.torque_nm
    }

    pub fn engine_cc(&self) -> u32 {
        self.engine_cc
    }

    /// Field name/value pairs, used for fingerprinting and logging
    pub fn fields(&self) -> [(&'static str, String); 4] {
        [
            (FIELD_YEAR, self.year.to_string()),
            (FIELD_MAX_POWER_BHP, self.max_power_bhp.to_string()),
            (FIELD_TORQUE_NM, self.torque_nm.to_string()),
            (FIELD_ENGINE_CC, self.engine_cc.to_string()),
        ]
    }
}

fn field_value<'a>(
    object: &'a Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<&'a Value> {
    match object.get(field) {
        None | Some(Value::Null) => {
            errors.push(field, "field is required");
            None
        }
        Some(value) => Some(value),
    }
}

fn integer_field(
    object: &Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<i64> {
    let value = field_value(object, field, errors)?;

    match value.as_i64() {
        Some(v) => Some(v),
        None => {
            errors.push(field, "must be an integer");
            None
        }
    }
}

fn number_field(
    object: &Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<f64> {
    let value = field_value(object, field, errors)?;

    match value.as_f64() {
        Some(v) if v.is_finite() => Some(v),
        _ => {
            errors.push(field, "must be a number");
            None
        }
    }
}

fn check_year(year: i64, bounds: &FeatureBounds, errors: &mut ValidationErrors) -> bool {
    let (min, max) = (i64::from(bounds.min_year), i64::from(bounds.max_year));

    if !(min..=max).contains(&year) {
        errors.push(
            FIELD_YEAR,
            format!("must be between {} and {} (got {})", min, max, year),
        );
        return false;
    }

    true
}

fn check_positive(field: &str, value: f64, max: f64, errors: &mut ValidationErrors) -> bool {
    if !value.is_finite() || value <= 0.0 {
        errors.push(field, format!("must be greater than 0 (got {})", value));
        return false;
    }

    if value > max {
        errors.push(field, format!("must be at most {} (got {})", max, value));
        return false;
    }

    true
}

fn check_engine_cc(engine_cc: i64, bounds: &FeatureBounds, errors: &mut ValidationErrors) -> bool {
    if engine_cc <= 0 {
        errors.push(
            FIELD_ENGINE_CC,
            format!("must be greater than 0 (got {})", engine_cc),
        );
        return false;
    }

    if engine_cc > i64::from(bounds.max_engine_cc) {
        errors.push(
            FIELD_ENGINE_CC,
            format!("must be at most {} (got {})", bounds.max_engine_cc, engine_cc),
        );
        return false;
    }

    true
}
