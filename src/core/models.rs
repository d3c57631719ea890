//! Entity types for near-Earth objects and their close approaches.
//!
//! Raw text fields are coerced exactly once, when an entity is built. The
//! coercion functions here are total: malformed input degrades to an
//! "unknown" state instead of failing, so one bad row never aborts a load.
//!
//! Unknown states are explicit `Option`s. They are rendered for output only
//! through [`NearEarthObject::name_or_empty`] and
//! [`NearEarthObject::diameter_km`], which every writer shares.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::Value;

use super::dates::datetime_to_str;

/// Flag text marking a potentially hazardous object.
const HAZARDOUS_FLAG: &str = "Y";

/// Coerce a name cell. The empty string means "no name".
pub fn coerce_name(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Coerce a diameter cell in kilometers.
///
/// Empty, unparseable and non-finite values all become `None`.
pub fn coerce_diameter(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|d| d.is_finite())
}

/// Coerce a hazard flag cell. Only the exact text `Y` is hazardous.
pub fn coerce_hazardous(raw: &str) -> bool {
    raw == HAZARDOUS_FLAG
}

/// Coerce a JSON scalar holding a number or numeric text.
///
/// Anything that does not yield a finite number becomes NaN.
pub fn coerce_float(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    finite_or_nan(parsed.unwrap_or(f64::NAN))
}

#[inline]
fn finite_or_nan(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        f64::NAN
    }
}

/// A near-Earth object from the NEO catalog.
///
/// The designation is the join key for close approaches and cannot change
/// after construction. Approaches are not stored here; see
/// [`NeoCatalog::approaches_for`](crate::core::catalog::NeoCatalog::approaches_for).
#[derive(Debug, Clone, PartialEq)]
pub struct NearEarthObject {
    designation: String,
    name: Option<String>,
    diameter: Option<f64>,
    hazardous: bool,
}

impl NearEarthObject {
    /// Creates a NEO from already-typed values.
    ///
    /// An empty name and a non-finite diameter are normalized to `None`.
    pub fn new(
        designation: impl Into<String>,
        name: Option<String>,
        diameter: Option<f64>,
        hazardous: bool,
    ) -> Self {
        Self {
            designation: designation.into(),
            name: name.filter(|n| !n.is_empty()),
            diameter: diameter.filter(|d| d.is_finite()),
            hazardous,
        }
    }

    /// Creates a NEO from raw catalog cells, applying the coercion rules.
    pub fn from_fields(
        designation: impl Into<String>,
        name: &str,
        diameter: &str,
        hazardous: &str,
    ) -> Self {
        Self {
            designation: designation.into(),
            name: coerce_name(name),
            diameter: coerce_diameter(diameter),
            hazardous: coerce_hazardous(hazardous),
        }
    }

    /// Placeholder for a designation that has no catalog entry.
    pub fn unknown(designation: impl Into<String>) -> Self {
        Self::new(designation, None, None, false)
    }

    #[inline]
    pub fn designation(&self) -> &str {
        &self.designation
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Diameter in kilometers, if known.
    #[inline]
    pub fn diameter(&self) -> Option<f64> {
        self.diameter
    }

    #[inline]
    pub fn is_hazardous(&self) -> bool {
        self.hazardous
    }

    /// Name for output, with "no name" rendered as the empty string.
    #[inline]
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Diameter for output, with "unknown" rendered as NaN.
    #[inline]
    pub fn diameter_km(&self) -> f64 {
        self.diameter.unwrap_or(f64::NAN)
    }

    /// Designation followed by the name in parentheses, when there is one.
    pub fn fullname(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({})", self.designation, name),
            None => self.designation.clone(),
        }
    }
}

impl fmt::Display for NearEarthObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NEO {} has a diameter of {:.3} km and {} potentially hazardous.",
            self.fullname(),
            self.diameter_km(),
            if self.hazardous { "is" } else { "is not" }
        )
    }
}

/// A single close approach of a NEO to Earth.
///
/// Loaders produce approaches with no linked NEO. The catalog join links
/// every approach to exactly one NEO, real or placeholder.
#[derive(Debug, Clone)]
pub struct CloseApproach {
    designation: String,
    time: NaiveDateTime,
    distance: f64,
    velocity: f64,
    neo: Option<Arc<NearEarthObject>>,
}

impl CloseApproach {
    /// Creates an unlinked approach. Non-finite distance or velocity becomes NaN.
    pub fn new(
        designation: impl Into<String>,
        time: NaiveDateTime,
        distance: f64,
        velocity: f64,
    ) -> Self {
        Self {
            designation: designation.into(),
            time,
            distance: finite_or_nan(distance),
            velocity: finite_or_nan(velocity),
            neo: None,
        }
    }

    /// Designation of the NEO this approach belongs to.
    #[inline]
    pub fn designation(&self) -> &str {
        &self.designation
    }

    #[inline]
    pub fn time(&self) -> NaiveDateTime {
        self.time
    }

    /// Time of closest approach as `YYYY-MM-DD HH:MM`.
    pub fn time_str(&self) -> String {
        datetime_to_str(&self.time)
    }

    /// Nominal approach distance in astronomical units.
    #[inline]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Velocity relative to Earth in km/s.
    #[inline]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// The linked NEO, or `None` before the catalog join.
    #[inline]
    pub fn neo(&self) -> Option<&NearEarthObject> {
        self.neo.as_deref()
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.neo.is_some()
    }

    pub(crate) fn link(&mut self, neo: Arc<NearEarthObject>) {
        self.neo = Some(neo);
    }
}

impl fmt::Display for CloseApproach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let who = self
            .neo
            .as_ref()
            .map_or_else(|| self.designation.clone(), |neo| neo.fullname());
        write!(
            f,
            "On {}, '{}' approaches Earth at a distance of {:.2} au and a velocity of {:.2} km/s.",
            self.time_str(),
            who,
            self.distance,
            self.velocity
        )
    }
}
