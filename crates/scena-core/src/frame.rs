//! Frames: the overridden visual properties of one element.
//!
//! A `Frame` holds exactly the CSS-like properties an element overrides
//! (position, size, clip path, custom properties) plus a typed transform
//! block. The inline style of the live element is always derived from the
//! frame by [`Frame::to_style`], which is deterministic: equal frames render
//! byte-equal style strings.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ─── Values ──────────────────────────────────────────────────────────────

/// A single property value. Numbers are pixels for length properties and
/// unitless otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrameValue {
    Number(f64),
    Text(String),
}

impl FrameValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            // Accept "80px" style strings coming from hosts.
            Self::Text(s) => s.trim().trim_end_matches("px").parse().ok(),
        }
    }
}

impl From<f64> for FrameValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for FrameValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FrameValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl fmt::Display for FrameValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Format a number without trailing `.0` and without negative zero.
pub fn format_number(v: f64) -> String {
    let v = if v == 0.0 { 0.0 } else { v };
    format!("{v}")
}

/// Properties whose numeric values are rendered with a `px` unit.
const LENGTH_PROPERTIES: &[&str] = &[
    "left",
    "top",
    "right",
    "bottom",
    "width",
    "height",
    "min-width",
    "min-height",
    "max-width",
    "max-height",
    "margin",
    "padding",
    "border-radius",
    "border-width",
    "font-size",
];

pub fn is_length_property(name: &str) -> bool {
    LENGTH_PROPERTIES.contains(&name)
        || name.starts_with("margin-")
        || name.starts_with("padding-")
}

// ─── Transform ───────────────────────────────────────────────────────────

/// Typed transform functions, rendered in the fixed order
/// translate → rotate → scale → skew.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translate: Option<[f64; 2]>,
    /// Degrees, normalized to `[0, 360)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<[f64; 2]>,
    /// Degrees on each axis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skew: Option<[f64; 2]>,
}

impl Transform {
    pub fn is_empty(&self) -> bool {
        self.translate.is_none()
            && self.rotate.is_none()
            && self.scale.is_none()
            && self.skew.is_none()
    }

    /// Overwrite the functions that are set in `other`.
    pub fn merge(&mut self, other: &Transform) {
        if other.translate.is_some() {
            self.translate = other.translate;
        }
        if let Some(deg) = other.rotate {
            self.rotate = Some(normalize_degrees(deg));
        }
        if other.scale.is_some() {
            self.scale = other.scale;
        }
        if other.skew.is_some() {
            self.skew = other.skew;
        }
    }

    /// CSS `transform` value, or `None` when no function is set.
    pub fn to_css(&self) -> Option<String> {
        let mut parts = Vec::with_capacity(4);
        if let Some([x, y]) = self.translate {
            parts.push(format!(
                "translate({}px, {}px)",
                format_number(x),
                format_number(y)
            ));
        }
        if let Some(deg) = self.rotate {
            parts.push(format!("rotate({}deg)", format_number(deg)));
        }
        if let Some([x, y]) = self.scale {
            parts.push(format!("scale({}, {})", format_number(x), format_number(y)));
        }
        if let Some([x, y]) = self.skew {
            parts.push(format!(
                "skew({}deg, {}deg)",
                format_number(x),
                format_number(y)
            ));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    /// Parse a CSS transform list such as `translate(4px, 2px) rotate(10deg)`.
    /// `none` and the empty string give an empty transform. Returns `None`
    /// for unknown functions or malformed arguments.
    pub fn parse_css(css: &str) -> Option<Transform> {
        let mut out = Transform::default();
        let mut rest = css.trim();
        if rest == "none" {
            return Some(out);
        }
        while !rest.is_empty() {
            let open = rest.find('(')?;
            let close = rest.find(')')?;
            if close < open {
                return None;
            }
            let args = parse_args(&rest[open + 1..close])?;
            out.apply(rest[..open].trim(), &args)?;
            rest = rest[close + 1..].trim_start();
        }
        Some(out)
    }

    /// Set one transform function from its numeric arguments (pixels and
    /// degrees). Returns `None` for an unknown function or a wrong argument
    /// count, leaving the transform unchanged.
    pub fn apply(&mut self, function: &str, args: &[f64]) -> Option<()> {
        let [tx, ty] = self.translate.unwrap_or([0.0, 0.0]);
        let [sx, sy] = self.scale.unwrap_or([1.0, 1.0]);
        let [kx, ky] = self.skew.unwrap_or([0.0, 0.0]);
        match (function, args) {
            ("translate", [x]) => self.translate = Some([*x, 0.0]),
            ("translate", [x, y]) => self.translate = Some([*x, *y]),
            ("translateX", [x]) => self.translate = Some([*x, ty]),
            ("translateY", [y]) => self.translate = Some([tx, *y]),
            ("rotate", [deg]) => self.rotate = Some(normalize_degrees(*deg)),
            ("scale", [s]) => self.scale = Some([*s, *s]),
            ("scale", [x, y]) => self.scale = Some([*x, *y]),
            ("scaleX", [x]) => self.scale = Some([*x, sy]),
            ("scaleY", [y]) => self.scale = Some([sx, *y]),
            ("skew", [x]) => self.skew = Some([*x, 0.0]),
            ("skew", [x, y]) => self.skew = Some([*x, *y]),
            ("skewX", [x]) => self.skew = Some([*x, ky]),
            ("skewY", [y]) => self.skew = Some([kx, *y]),
            _ => return None,
        }
        Some(())
    }
}

/// Split `4px, -2px` or `10deg` into numbers.
fn parse_args(args: &str) -> Option<Vec<f64>> {
    args.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|a| !a.is_empty())
        .map(|a| a.trim_end_matches("px").trim_end_matches("deg").parse().ok())
        .collect()
}

/// Saved frames carry the typed block; a CSS string is accepted too.
fn deserialize_transform<'de, D: Deserializer<'de>>(de: D) -> Result<Transform, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Typed(Transform),
        Css(String),
    }
    match Repr::deserialize(de)? {
        Repr::Typed(transform) => Ok(transform),
        Repr::Css(css) => Transform::parse_css(&css)
            .ok_or_else(|| D::Error::custom(format!("invalid transform `{css}`"))),
    }
}

/// Wrap an angle into `[0, 360)`.
pub fn normalize_degrees(deg: f64) -> f64 {
    let d = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if d >= 360.0 { 0.0 } else { d }
}

// ─── Frame ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    #[serde(
        default,
        skip_serializing_if = "Transform::is_empty",
        deserialize_with = "deserialize_transform"
    )]
    pub transform: Transform,
    #[serde(flatten)]
    pub properties: BTreeMap<String, FrameValue>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// An absolutely positioned box.
    pub fn rect(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::new()
            .with("position", "absolute")
            .with("left", left)
            .with("top", top)
            .with("width", width)
            .with("height", height)
    }

    /// Builder-style `set`.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<FrameValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a property. `transform` (a CSS transform list) and
    /// `transform.<function>` (e.g. `transform.rotate`) write the typed
    /// transform block; values that do not parse are ignored.
    pub fn set(&mut self, name: &str, value: impl Into<FrameValue>) {
        let value = value.into();
        if name == "transform" {
            match &value {
                FrameValue::Text(css) => match Transform::parse_css(css) {
                    Some(transform) => self.transform = transform,
                    None => log::warn!("ignoring unparsable transform `{css}`"),
                },
                FrameValue::Number(n) => log::warn!("ignoring numeric transform {n}"),
            }
            return;
        }
        if let Some(function) = name.strip_prefix("transform.") {
            let args = match &value {
                FrameValue::Number(n) => Some(vec![*n]),
                FrameValue::Text(s) => parse_args(s),
            };
            if args.and_then(|args| self.transform.apply(function, &args)).is_none() {
                log::warn!("ignoring {name} = {value}");
            }
            return;
        }
        self.properties.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FrameValue> {
        self.properties.get(name)
    }

    /// Numeric value of a property (`"80px"` strings are accepted).
    pub fn number(&self, name: &str) -> Option<f64> {
        self.properties.get(name).and_then(FrameValue::as_number)
    }

    pub fn remove(&mut self, name: &str) -> Option<FrameValue> {
        self.properties.remove(name)
    }

    pub fn rotation(&self) -> f64 {
        self.transform.rotate.unwrap_or(0.0)
    }

    pub fn set_rotation(&mut self, deg: f64) {
        self.transform.rotate = Some(normalize_degrees(deg));
    }

    /// Merge `other` into this frame; properties in `other` win.
    pub fn merge(&mut self, other: &Frame) {
        for (name, value) in &other.properties {
            self.properties.insert(name.clone(), value.clone());
        }
        self.transform.merge(&other.transform);
    }

    pub fn clear(&mut self) {
        self.properties.clear();
        self.transform = Transform::default();
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.transform.is_empty()
    }

    /// Render the inline style string.
    ///
    /// Properties are emitted in key order, numeric lengths get `px`, and the
    /// transform block is emitted last.
    pub fn to_style(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.properties {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(name);
            out.push_str(": ");
            match value {
                FrameValue::Number(n) if is_length_property(name) => {
                    out.push_str(&format_number(*n));
                    out.push_str("px");
                }
                other => out.push_str(&other.to_string()),
            }
            out.push(';');
        }
        if let Some(transform) = self.transform.to_css() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str("transform: ");
            out.push_str(&transform);
            out.push(';');
        }
        out
    }
}
