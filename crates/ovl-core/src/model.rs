//! Text overlay data model.
//!
//! A composition is a flat, ordered list of [`TextElement`]s painted on top of
//! a raster image. The list index is the z-order: index 0 paints first, the
//! last element paints last and wins hit-testing ties. Every geometric field
//! lives in the image's *natural pixel space*, never in screen pixels, so the
//! list is unaffected by zoom and pan.

use crate::id::ElementId;
use crate::richtext::RichText;
use kurbo::{Point, Size};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::RangeInclusive;

// ─── Limits ──────────────────────────────────────────────────────────────

/// Bounds enforced on every element after each mutation.
pub mod limits {
    use std::ops::RangeInclusive;

    pub const MIN_BOX_SIZE: f64 = 50.0;
    pub const MIN_FONT_SIZE: f64 = 12.0;
    pub const OPACITY: RangeInclusive<f64> = 0.0..=100.0;
    pub const LETTER_SPACING: RangeInclusive<f64> = -5.0..=20.0;
    pub const LINE_HEIGHT: RangeInclusive<f64> = 0.8..=3.0;
    pub const SHADOW_BLUR: RangeInclusive<f64> = 0.0..=50.0;
    pub const SHADOW_OFFSET: RangeInclusive<f64> = -50.0..=50.0;
    pub const FONT_WEIGHT: RangeInclusive<u16> = 100..=900;
}

fn clamp_to(value: f64, range: &RangeInclusive<f64>) -> f64 {
    if value.is_nan() {
        *range.start()
    } else {
        value.clamp(*range.start(), *range.end())
    }
}

fn at_least(value: f64, floor: f64) -> f64 {
    if value.is_nan() { floor } else { value.max(floor) }
}

/// Fold an angle in degrees into `(-180, 180]`.
pub fn normalize_rotation(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let mut r = degrees % 360.0;
    if r > 180.0 {
        r -= 360.0;
    } else if r <= -180.0 {
        r += 360.0;
    }
    r
}

// ─── Colors ──────────────────────────────────────────────────────────────

/// 8-bit RGBA color, `#RRGGBB` / `#RRGGBBAA` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RGBA`, `#RRGGBB`, or `#RRGGBBAA`. The `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let digit = |b: u8| char::from(b).to_digit(16).map(|d| d as u8);
        let pair = |i: usize| -> Option<u8> { Some(digit(bytes[i])? << 4 | digit(bytes[i + 1])?) };

        match bytes.len() {
            3 | 4 => {
                let mut c = [255u8; 4];
                for (slot, &b) in c.iter_mut().zip(bytes) {
                    *slot = digit(b)? * 17;
                }
                Some(Self::rgba(c[0], c[1], c[2], c[3]))
            }
            6 => Some(Self::rgb(pair(0)?, pair(2)?, pair(4)?)),
            8 => Some(Self::rgba(pair(0)?, pair(2)?, pair(4)?, pair(6)?)),
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Scale alpha by a 0–100 opacity percentage.
    pub fn with_opacity(self, percent: f64) -> Self {
        let factor = clamp_to(percent, &limits::OPACITY) / 100.0;
        Self {
            a: (f64::from(self.a) * factor).round() as u8,
            ..self
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color {s:?}")))
    }
}

/// Box fill behind the text. `"transparent"` on the wire means no fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Background {
    #[default]
    Transparent,
    Solid(Color),
}

impl Serialize for Background {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Background::Transparent => serializer.serialize_str("transparent"),
            Background::Solid(c) => c.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Background {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s.is_empty() || s.eq_ignore_ascii_case("transparent") {
            return Ok(Background::Transparent);
        }
        Color::from_hex(&s)
            .map(Background::Solid)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid background {s:?}")))
    }
}

// ─── Typography ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
    LineThrough,
}

/// Horizontal text alignment inside the element box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

pub const DEFAULT_FONT: &str = "Inter";

/// Accepts `700`, `"700"`, `"bold"`, or `"normal"`.
fn parse_weight<E: serde::de::Error>(value: serde_json::Value) -> Result<u16, E> {
    let weight = match &value {
        serde_json::Value::Number(n) => n.as_u64().map(|n| n.min(u64::from(u16::MAX)) as u16),
        serde_json::Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "normal" | "regular" => Some(400),
            "bold" => Some(700),
            other => other.parse::<u16>().ok(),
        },
        _ => None,
    };
    weight.ok_or_else(|| E::custom(format!("invalid font weight {value}")))
}

fn de_weight<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    parse_weight(serde_json::Value::deserialize(deserializer)?)
}

fn de_weight_opt<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u16>, D::Error> {
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => parse_weight(v).map(Some),
    }
}

/// `[x, y]` on the wire.
pub(crate) mod point_array {
    use kurbo::Point;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(p: &Point, serializer: S) -> Result<S::Ok, S::Error> {
        [p.x, p.y].serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Point, D::Error> {
        let [x, y] = <[f64; 2]>::deserialize(deserializer)?;
        Ok(Point::new(x, y))
    }
}

// ─── Text element ────────────────────────────────────────────────────────

/// One styled text object positioned over the base image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextElement {
    pub id: ElementId,
    pub text: RichText,
    /// Visual center, natural image pixels.
    #[serde(with = "point_array")]
    pub position: Point,
    pub width: f64,
    pub height: f64,
    /// Degrees, always within `(-180, 180]`.
    pub rotation: f64,

    pub font_name: String,
    pub font_size: f64,
    #[serde(deserialize_with = "de_weight")]
    pub font_weight: u16,
    pub font_style: FontStyle,
    pub text_decoration: TextDecoration,
    pub text_align: TextAlign,

    pub color: Color,
    pub stroke_width: f64,
    pub stroke_color: Color,
    pub shadow_enabled: bool,
    pub shadow_color: Color,
    pub shadow_blur: f64,
    pub shadow_offset_x: f64,
    pub shadow_offset_y: f64,
    pub background_color: Background,
    pub background_opacity: f64,
    pub opacity: f64,
    pub letter_spacing: f64,
    pub line_height: f64,

    pub ai_generated: bool,
    pub template_id: Option<String>,
}

impl Default for TextElement {
    fn default() -> Self {
        Self {
            id: ElementId::UNASSIGNED,
            text: RichText::default(),
            position: Point::ZERO,
            width: 400.0,
            height: 100.0,
            rotation: 0.0,
            font_name: DEFAULT_FONT.to_string(),
            font_size: 48.0,
            font_weight: 700,
            font_style: FontStyle::Normal,
            text_decoration: TextDecoration::None,
            text_align: TextAlign::Center,
            color: Color::WHITE,
            stroke_width: 0.0,
            stroke_color: Color::BLACK,
            shadow_enabled: false,
            shadow_color: Color::rgba(0, 0, 0, 128),
            shadow_blur: 4.0,
            shadow_offset_x: 2.0,
            shadow_offset_y: 2.0,
            background_color: Background::Transparent,
            background_opacity: 100.0,
            opacity: 100.0,
            letter_spacing: 0.0,
            line_height: 1.2,
            ai_generated: false,
            template_id: None,
        }
    }
}

impl TextElement {
    pub fn new(id: ElementId, text: RichText, position: Point) -> Self {
        Self {
            id,
            text,
            position,
            ..Self::default()
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Pull every bounded field back inside its range.
    pub fn sanitize(&mut self) {
        self.width = at_least(self.width, limits::MIN_BOX_SIZE);
        self.height = at_least(self.height, limits::MIN_BOX_SIZE);
        self.font_size = at_least(self.font_size, limits::MIN_FONT_SIZE);
        self.font_weight = self
            .font_weight
            .clamp(*limits::FONT_WEIGHT.start(), *limits::FONT_WEIGHT.end());
        self.rotation = normalize_rotation(self.rotation);
        self.stroke_width = at_least(self.stroke_width, 0.0);
        self.shadow_blur = clamp_to(self.shadow_blur, &limits::SHADOW_BLUR);
        self.shadow_offset_x = clamp_to(self.shadow_offset_x, &limits::SHADOW_OFFSET);
        self.shadow_offset_y = clamp_to(self.shadow_offset_y, &limits::SHADOW_OFFSET);
        self.background_opacity = clamp_to(self.background_opacity, &limits::OPACITY);
        self.opacity = clamp_to(self.opacity, &limits::OPACITY);
        self.letter_spacing = clamp_to(self.letter_spacing, &limits::LETTER_SPACING);
        self.line_height = clamp_to(self.line_height, &limits::LINE_HEIGHT);
        if !self.position.x.is_finite() || !self.position.y.is_finite() {
            self.position = Point::ZERO;
        }
    }
}

// ─── Partial updates ─────────────────────────────────────────────────────

/// A partial set of element fields. `None` leaves the field untouched.
///
/// Also the style half of AI-generated elements on the wire, which is why
/// `position` is skipped by serde (the service sends percentages instead).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ElementPatch {
    pub text: Option<RichText>,
    #[serde(skip)]
    pub position: Option<Point>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub font_name: Option<String>,
    pub font_size: Option<f64>,
    #[serde(deserialize_with = "de_weight_opt")]
    pub font_weight: Option<u16>,
    pub font_style: Option<FontStyle>,
    pub text_decoration: Option<TextDecoration>,
    pub text_align: Option<TextAlign>,
    pub color: Option<Color>,
    pub stroke_width: Option<f64>,
    pub stroke_color: Option<Color>,
    pub shadow_enabled: Option<bool>,
    pub shadow_color: Option<Color>,
    pub shadow_blur: Option<f64>,
    pub shadow_offset_x: Option<f64>,
    pub shadow_offset_y: Option<f64>,
    pub background_color: Option<Background>,
    pub background_opacity: Option<f64>,
    pub opacity: Option<f64>,
    pub letter_spacing: Option<f64>,
    pub line_height: Option<f64>,
}

macro_rules! merge_fields {
    ($patch:expr, $el:expr, $($field:ident),* $(,)?) => {
        $( if let Some(v) = &$patch.$field { $el.$field = v.clone(); } )*
    };
}

impl ElementPatch {
    pub fn moved_to(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn rotated(degrees: f64) -> Self {
        Self {
            rotation: Some(degrees),
            ..Self::default()
        }
    }

    pub fn resized(width: Option<f64>, height: Option<f64>) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn font_size(size: f64) -> Self {
        Self {
            font_size: Some(size),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge into `el`, then re-establish the element's bounds.
    pub fn apply(&self, el: &mut TextElement) {
        merge_fields!(
            self,
            el,
            text,
            position,
            width,
            height,
            rotation,
            font_name,
            font_size,
            font_weight,
            font_style,
            text_decoration,
            text_align,
            color,
            stroke_width,
            stroke_color,
            shadow_enabled,
            shadow_color,
            shadow_blur,
            shadow_offset_x,
            shadow_offset_y,
            background_color,
            background_opacity,
            opacity,
            letter_spacing,
            line_height,
        );
        el.sanitize();
    }
}
