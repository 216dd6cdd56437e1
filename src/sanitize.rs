//! Input sanitization and validation for the seven soil/climate fields.
//!
//! Validation is a uniform pipeline over a static descriptor table:
//! one presence pass, then per-field sanitize-and-bounds-check. The
//! result is either a complete [`FeatureVector`] or the first error
//! encountered, so failure paths stay visible at each call site.

use std::collections::HashMap;

use crate::error::{CultivarError, Result};

/// Static descriptor for one numeric form field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Form field name (e.g. "N", "temperature")
    pub name: &'static str,
    /// Display label used in error messages and the PDF report
    pub label: &'static str,
    /// Inclusive lower bound
    pub min: f64,
    /// Inclusive upper bound
    pub max: f64,
    /// Decimal places when formatting for display
    pub decimals: usize,
    /// Display unit suffix ("" for unitless)
    pub unit: &'static str,
}

/// The seven feature fields, in classifier input order.
pub const FEATURE_FIELDS: [FieldSpec; 7] = [
    FieldSpec {
        name: "N",
        label: "Nitrogen (N)",
        min: 0.0,
        max: 200.0,
        decimals: 1,
        unit: " kg/ha",
    },
    FieldSpec {
        name: "P",
        label: "Phosphorus (P)",
        min: 0.0,
        max: 200.0,
        decimals: 1,
        unit: " kg/ha",
    },
    FieldSpec {
        name: "K",
        label: "Potassium (K)",
        min: 0.0,
        max: 200.0,
        decimals: 1,
        unit: " kg/ha",
    },
    FieldSpec {
        name: "temperature",
        label: "Temperature",
        min: -50.0,
        max: 100.0,
        decimals: 1,
        unit: "\u{b0}C",
    },
    FieldSpec {
        name: "humidity",
        label: "Humidity",
        min: 0.0,
        max: 100.0,
        decimals: 1,
        unit: "%",
    },
    FieldSpec {
        name: "ph",
        label: "pH Level",
        min: 0.0,
        max: 14.0,
        decimals: 2,
        unit: "",
    },
    FieldSpec {
        name: "rainfall",
        label: "Rainfall",
        min: 0.0,
        max: 1000.0,
        decimals: 1,
        unit: " mm",
    },
];

/// Maximum accepted length for the crop label on the report path.
pub const MAX_CROP_LEN: usize = 100;

/// Strip non-numeric characters, parse, and bounds-check one field.
///
/// Characters other than ASCII digits, `.` and `-` are removed before
/// parsing, so "82%" or " 20.8 C" sanitize cleanly. Errors name the
/// field via its display label.
///
/// # Errors
///
/// Returns [`CultivarError::Validation`] when the stripped text does
/// not parse as a finite number or the value falls outside
/// `[spec.min, spec.max]`.
pub fn sanitize_numeric(raw: &str, spec: &FieldSpec) -> Result<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    let value: f64 = cleaned.parse().map_err(|_| CultivarError::Validation {
        field: spec.label.to_string(),
        message: "is not a valid number".to_string(),
    })?;

    if !value.is_finite() {
        return Err(CultivarError::Validation {
            field: spec.label.to_string(),
            message: "is not a valid number".to_string(),
        });
    }
    if value < spec.min {
        return Err(CultivarError::Validation {
            field: spec.label.to_string(),
            message: format!("must be at least {}", spec.min),
        });
    }
    if value > spec.max {
        return Err(CultivarError::Validation {
            field: spec.label.to_string(),
            message: format!("must be at most {}", spec.max),
        });
    }

    Ok(value)
}

/// Trim and truncate free text for display use. No numeric parsing.
pub fn sanitize_text(raw: &str, max_len: usize) -> String {
    raw.trim().chars().take(max_len).collect()
}

/// Ordered, validated 7-element feature vector. Immutable once built;
/// lives only for the duration of one request.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f64; 7],
}

impl FeatureVector {
    /// Build directly from already-validated values (used in tests and
    /// by callers that bypass the form layer).
    pub fn new(values: [f64; 7]) -> Self {
        Self { values }
    }

    /// Validate and extract the seven feature fields from a form body.
    ///
    /// Presence is checked first across all fields in classifier order;
    /// the first absent or blank field fails the whole request. Only
    /// then is each field sanitized and bounds-checked, stopping at the
    /// first invalid one.
    ///
    /// # Errors
    ///
    /// [`CultivarError::MissingField`] naming the first missing field,
    /// or [`CultivarError::Validation`] from [`sanitize_numeric`].
    pub fn from_form(form: &HashMap<String, String>) -> Result<Self> {
        for spec in &FEATURE_FIELDS {
            match form.get(spec.name) {
                Some(raw) if !raw.trim().is_empty() => {}
                _ => return Err(CultivarError::MissingField(spec.name.to_string())),
            }
        }

        let mut values = [0.0_f64; 7];
        for (slot, spec) in values.iter_mut().zip(&FEATURE_FIELDS) {
            // Presence was verified above, so the lookup cannot fail.
            let raw = form.get(spec.name).map(String::as_str).unwrap_or_default();
            *slot = sanitize_numeric(raw, spec)?;
        }

        Ok(Self { values })
    }

    /// Classifier input as f32, in field order.
    pub fn as_f32(&self) -> [f32; 7] {
        let mut out = [0.0_f32; 7];
        for (dst, src) in out.iter_mut().zip(&self.values) {
            *dst = *src as f32;
        }
        out
    }

    /// Raw values in field order.
    pub fn values(&self) -> &[f64; 7] {
        &self.values
    }

    /// Form name -> formatted value, for echoing on the result view.
    pub fn echo_params(&self) -> Vec<(String, String)> {
        FEATURE_FIELDS
            .iter()
            .zip(&self.values)
            .map(|(spec, v)| {
                (
                    spec.name.to_string(),
                    format!("{v:.prec$}", prec = spec.decimals),
                )
            })
            .collect()
    }

    /// Display label -> formatted value with unit, for the PDF report.
    /// Units carry their own separator ("90.0 kg/ha" but "20.8\u{b0}C").
    pub fn report_params(&self) -> Vec<(String, String)> {
        FEATURE_FIELDS
            .iter()
            .zip(&self.values)
            .map(|(spec, v)| {
                (
                    spec.label.to_string(),
                    format!("{v:.prec$}{unit}", prec = spec.decimals, unit = spec.unit),
                )
            })
            .collect()
    }
}
