//! The declarative style model for a quote card.
//!
//! A [`Theme`] fully describes one composition: background, typography,
//! effects, canvas size and the normalized position of the text block. The
//! type is pure data with validated defaults; all mutation goes through
//! [`Theme::apply`], which returns a new value and never touches the
//! original. Renders always operate on a snapshot, so a theme handed to the
//! compositor cannot change mid-render.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Font families the editor offers. Patches naming any other family are
/// rejected; the compositor falls back to a sans-serif face when the family
/// is not installed.
pub const FONT_FAMILIES: [&str; 5] = [
    "Roboto",
    "Playfair Display",
    "Montserrat",
    "Open Sans",
    "Lora",
];

/// Clamp ranges for the numeric theme fields, matching the editor sliders.
pub mod limits {
    pub const FONT_SIZE_PT: (f32, f32) = (12.0, 72.0);
    pub const PADDING_PX: (f32, f32) = (0.0, 100.0);
    pub const SHADOW_BLUR_PX: (f32, f32) = (0.0, 20.0);
    pub const LETTER_SPACING_PX: (f32, f32) = (-2.0, 10.0);
    pub const LINE_HEIGHT: (f32, f32) = (1.0, 3.0);
    pub const CANVAS_PX: (u32, u32) = (16, 4096);
}

/// An RGBA color parsed from the CSS-style notations the editor emits:
/// `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(...)` and `rgba(...)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);

    /// Parse a CSS-style color string.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(hex)
                .ok_or_else(|| Error::Validation(format!("bad hex color '{}'", s)));
        }
        if let Some(inner) = s
            .strip_prefix("rgba(")
            .or_else(|| s.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return Self::parse_rgb_args(inner)
                .ok_or_else(|| Error::Validation(format!("bad rgb() color '{}'", s)));
        }
        Err(Error::Validation(format!("unrecognized color '{}'", s)))
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            // #rgb shorthand: each nibble doubled
            3 => {
                let nibble = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
                let (r, g, b) = (nibble(0)?, nibble(1)?, nibble(2)?);
                Some(Self::rgb(r * 17, g * 17, b * 17))
            }
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    fn parse_rgb_args(inner: &str) -> Option<Self> {
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return None;
        }
        let r = parts[0].parse::<u8>().ok()?;
        let g = parts[1].parse::<u8>().ok()?;
        let b = parts[2].parse::<u8>().ok()?;
        let a = match parts.get(3) {
            Some(p) => {
                let f = p.parse::<f32>().ok()?;
                if !(0.0..=1.0).contains(&f) {
                    return None;
                }
                (f * 255.0).round() as u8
            }
            None => 255,
        };
        Some(Self::rgba(r, g, b, a))
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> String {
        if c.a == 255 {
            format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", c.r, c.g, c.b, c.a)
        }
    }
}

/// Horizontal alignment of the text within its block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl FromStr for Alignment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "left" => Ok(Alignment::Left),
            "center" => Ok(Alignment::Center),
            "right" => Ok(Alignment::Right),
            other => Err(Error::Validation(format!("unknown alignment '{}'", other))),
        }
    }
}

/// Where a background image comes from: a filesystem path or a
/// `data:image/...;base64,...` URL produced by an upload control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImageSource {
    Path(PathBuf),
    DataUrl(String),
}

impl From<String> for ImageSource {
    fn from(s: String) -> Self {
        if s.starts_with("data:") {
            ImageSource::DataUrl(s)
        } else {
            ImageSource::Path(PathBuf::from(s))
        }
    }
}

impl From<ImageSource> for String {
    fn from(src: ImageSource) -> String {
        match src {
            ImageSource::Path(p) => p.display().to_string(),
            ImageSource::DataUrl(u) => u,
        }
    }
}

impl ImageSource {
    pub fn is_empty(&self) -> bool {
        match self {
            ImageSource::Path(p) => p.as_os_str().is_empty(),
            ImageSource::DataUrl(u) => u.is_empty(),
        }
    }
}

/// Background layer variants. A gradient always carries exactly two colors;
/// an image background requires a resolvable source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Background {
    Solid {
        color: Color,
    },
    Gradient {
        colors: [Color; 2],
        #[serde(rename = "angleDegrees")]
        angle_degrees: f32,
    },
    Image {
        source: ImageSource,
    },
}

impl Background {
    /// Returns the variant with numeric fields brought into their domain
    /// (gradient angles wrap into `[0, 360)`).
    fn normalized(self) -> Self {
        match self {
            Background::Gradient {
                colors,
                angle_degrees,
            } => Background::Gradient {
                colors,
                angle_degrees: angle_degrees.rem_euclid(360.0),
            },
            other => other,
        }
    }
}

/// Glyph-level effects applied by the compositor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEffects {
    pub shadow_enabled: bool,
    pub shadow_color: Color,
    pub shadow_blur_px: f32,
    pub letter_spacing_px: f32,
    pub line_height_multiplier: f32,
}

impl Default for TextEffects {
    fn default() -> Self {
        Self {
            shadow_enabled: false,
            shadow_color: Color::BLACK,
            shadow_blur_px: 3.0,
            letter_spacing_px: 0.0,
            line_height_multiplier: 1.5,
        }
    }
}

/// Normalized anchor position of the text block, as percentage offsets of
/// the canvas. Both axes always stay within `[0, 100]`; the rendered block
/// may still overflow the canvas edge since only its anchor is clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Build a position, clamping both axes into `[0, 100]`.
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: x.clamp(0.0, 100.0),
            y: y.clamp(0.0, 100.0),
        }
    }

    /// Canvas center
    pub const CENTER: Position = Position { x: 50.0, y: 50.0 };

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::CENTER
    }
}

/// The complete description of one card composition.
///
/// Field units follow the editor: sizes and spacing in CSS reference pixels,
/// position as percentages. The output resolution is
/// `canvas_width_px x canvas_height_px` before supersampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub background: Background,
    pub text_color: Color,
    pub font_family: String,
    pub font_size_pt: f32,
    pub padding_px: f32,
    pub alignment: Alignment,
    pub canvas_width_px: u32,
    pub canvas_height_px: u32,
    pub effects: TextEffects,
    pub position: Position,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Background::Solid {
                color: Color::WHITE,
            },
            text_color: Color::BLACK,
            font_family: "Roboto".to_string(),
            font_size_pt: 24.0,
            padding_px: 40.0,
            alignment: Alignment::Center,
            canvas_width_px: 1080,
            canvas_height_px: 1080,
            effects: TextEffects::default(),
            position: Position::CENTER,
        }
    }
}

fn clamp_range(value: f32, range: (f32, f32)) -> f32 {
    value.clamp(range.0, range.1)
}

impl Theme {
    /// Merge a patch into this theme, returning the new value.
    ///
    /// Each field is validated independently: numeric fields clamp to their
    /// slider range, an unknown font family or empty image source is dropped
    /// with a warning, and the rest of the patch still applies. Applying the
    /// same patch twice yields the same theme as applying it once.
    pub fn apply(&self, patch: &ThemePatch) -> Theme {
        let mut next = self.clone();

        if let Some(background) = &patch.background {
            match background {
                Background::Image { source } if source.is_empty() => {
                    log::warn!("ignoring image background with empty source");
                }
                other => next.background = other.clone().normalized(),
            }
        }
        if let Some(color) = patch.text_color {
            next.text_color = color;
        }
        if let Some(family) = &patch.font_family {
            if FONT_FAMILIES.iter().any(|f| f == family) {
                next.font_family = family.clone();
            } else {
                log::warn!("ignoring unknown font family '{}'", family);
            }
        }
        if let Some(size) = patch.font_size_pt {
            next.font_size_pt = clamp_range(size, limits::FONT_SIZE_PT);
        }
        if let Some(padding) = patch.padding_px {
            next.padding_px = clamp_range(padding, limits::PADDING_PX);
        }
        if let Some(alignment) = patch.alignment {
            next.alignment = alignment;
        }
        if let Some(w) = patch.canvas_width_px {
            next.canvas_width_px = w.clamp(limits::CANVAS_PX.0, limits::CANVAS_PX.1);
        }
        if let Some(h) = patch.canvas_height_px {
            next.canvas_height_px = h.clamp(limits::CANVAS_PX.0, limits::CANVAS_PX.1);
        }
        if let Some(effects) = &patch.effects {
            if let Some(enabled) = effects.shadow_enabled {
                next.effects.shadow_enabled = enabled;
            }
            if let Some(color) = effects.shadow_color {
                next.effects.shadow_color = color;
            }
            if let Some(blur) = effects.shadow_blur_px {
                next.effects.shadow_blur_px = clamp_range(blur, limits::SHADOW_BLUR_PX);
            }
            if let Some(spacing) = effects.letter_spacing_px {
                next.effects.letter_spacing_px =
                    clamp_range(spacing, limits::LETTER_SPACING_PX);
            }
            if let Some(line_height) = effects.line_height_multiplier {
                next.effects.line_height_multiplier =
                    clamp_range(line_height, limits::LINE_HEIGHT);
            }
        }
        if let Some(position) = patch.position {
            // Position::new re-clamps; deserialized values may be raw
            next.position = Position::new(position.x, position.y);
        }

        next
    }

    /// Strict validation for themes crossing a trust boundary, such as a
    /// persisted snapshot. Reports the first offending field instead of
    /// clamping.
    pub fn validate(&self) -> Result<()> {
        if self.font_size_pt <= 0.0 {
            return Err(Error::Validation(format!(
                "fontSizePt must be positive, got {}",
                self.font_size_pt
            )));
        }
        if self.effects.line_height_multiplier < 1.0 {
            return Err(Error::Validation(format!(
                "lineHeightMultiplier must be >= 1, got {}",
                self.effects.line_height_multiplier
            )));
        }
        if !(0.0..=100.0).contains(&self.position.x())
            || !(0.0..=100.0).contains(&self.position.y())
        {
            return Err(Error::Validation(format!(
                "position ({}, {}) outside [0, 100]",
                self.position.x(),
                self.position.y()
            )));
        }
        if !FONT_FAMILIES.iter().any(|f| f == &self.font_family) {
            return Err(Error::Validation(format!(
                "fontFamily '{}' is not in the allow-list",
                self.font_family
            )));
        }
        if self.canvas_width_px == 0 || self.canvas_height_px == 0 {
            return Err(Error::Validation("canvas dimensions must be non-zero".into()));
        }
        if let Background::Gradient { angle_degrees, .. } = self.background {
            if !(0.0..360.0).contains(&angle_degrees) {
                return Err(Error::Validation(format!(
                    "gradient angle {} outside [0, 360)",
                    angle_degrees
                )));
            }
        }
        if let Background::Image { source } = &self.background {
            if source.is_empty() {
                return Err(Error::Validation("image background has empty source".into()));
            }
        }
        Ok(())
    }
}

/// A partial theme update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemePatch {
    pub background: Option<Background>,
    pub text_color: Option<Color>,
    pub font_family: Option<String>,
    pub font_size_pt: Option<f32>,
    pub padding_px: Option<f32>,
    pub alignment: Option<Alignment>,
    pub canvas_width_px: Option<u32>,
    pub canvas_height_px: Option<u32>,
    pub effects: Option<EffectsPatch>,
    pub position: Option<Position>,
}

/// Partial update for the effects group
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EffectsPatch {
    pub shadow_enabled: Option<bool>,
    pub shadow_color: Option<Color>,
    pub shadow_blur_px: Option<f32>,
    pub letter_spacing_px: Option<f32>,
    pub line_height_multiplier: Option<f32>,
}

/// A named canvas resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasPreset {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Canvas size presets offered by the editor
pub const CANVAS_PRESETS: [CanvasPreset; 4] = [
    CanvasPreset {
        name: "Instagram Post",
        width: 1080,
        height: 1080,
    },
    CanvasPreset {
        name: "Instagram Story",
        width: 1080,
        height: 1920,
    },
    CanvasPreset {
        name: "Twitter Post",
        width: 1200,
        height: 675,
    },
    CanvasPreset {
        name: "Facebook Post",
        width: 1200,
        height: 630,
    },
];

/// A named, fully-populated theme snapshot. Presets are read-only templates;
/// applying one replaces the whole theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemePreset {
    pub id: String,
    pub name: String,
    pub theme: Theme,
}

/// The built-in theme presets
pub fn builtin_presets() -> Vec<ThemePreset> {
    vec![
        ThemePreset {
            id: "clean".into(),
            name: "Clean/Minimal".into(),
            theme: Theme {
                background: Background::Solid {
                    color: Color::WHITE,
                },
                text_color: Color::BLACK,
                font_family: "Roboto".into(),
                font_size_pt: 24.0,
                padding_px: 20.0,
                alignment: Alignment::Center,
                canvas_width_px: 800,
                canvas_height_px: 400,
                effects: TextEffects {
                    shadow_enabled: false,
                    shadow_color: Color::BLACK,
                    shadow_blur_px: 0.0,
                    letter_spacing_px: 0.0,
                    line_height_multiplier: 1.5,
                },
                position: Position::CENTER,
            },
        },
        ThemePreset {
            id: "dark".into(),
            name: "Dark/Modern".into(),
            theme: Theme {
                background: Background::Solid {
                    color: Color::rgb(0x1a, 0x1a, 0x1a),
                },
                text_color: Color::WHITE,
                font_family: "Montserrat".into(),
                font_size_pt: 28.0,
                padding_px: 24.0,
                alignment: Alignment::Center,
                canvas_width_px: 800,
                canvas_height_px: 400,
                effects: TextEffects {
                    shadow_enabled: true,
                    shadow_color: Color::BLACK,
                    shadow_blur_px: 8.0,
                    letter_spacing_px: 1.0,
                    line_height_multiplier: 1.6,
                },
                position: Position::CENTER,
            },
        },
        ThemePreset {
            id: "colorful".into(),
            name: "Colorful/Fun".into(),
            theme: Theme {
                background: Background::Gradient {
                    colors: [Color::rgb(0xff, 0x6b, 0x6b), Color::rgb(0x4e, 0xcd, 0xc4)],
                    angle_degrees: 135.0,
                },
                text_color: Color::WHITE,
                font_family: "Open Sans".into(),
                font_size_pt: 26.0,
                padding_px: 24.0,
                alignment: Alignment::Center,
                canvas_width_px: 800,
                canvas_height_px: 400,
                effects: TextEffects {
                    shadow_enabled: true,
                    shadow_color: Color::rgba(0, 0, 0, 77),
                    shadow_blur_px: 6.0,
                    letter_spacing_px: 0.5,
                    line_height_multiplier: 1.4,
                },
                position: Position::CENTER,
            },
        },
        ThemePreset {
            id: "professional".into(),
            name: "Professional/Business".into(),
            theme: Theme {
                background: Background::Gradient {
                    colors: [Color::rgb(0xf8, 0xf9, 0xfa), Color::rgb(0xe9, 0xec, 0xef)],
                    angle_degrees: 120.0,
                },
                text_color: Color::rgb(0x21, 0x25, 0x29),
                font_family: "Lora".into(),
                font_size_pt: 24.0,
                padding_px: 40.0,
                alignment: Alignment::Center,
                canvas_width_px: 800,
                canvas_height_px: 400,
                effects: TextEffects {
                    shadow_enabled: false,
                    shadow_color: Color::BLACK,
                    shadow_blur_px: 0.0,
                    letter_spacing_px: 0.2,
                    line_height_multiplier: 1.6,
                },
                position: Position::CENTER,
            },
        },
    ]
}

/// Look up a built-in preset by id
pub fn find_preset(id: &str) -> Option<ThemePreset> {
    builtin_presets().into_iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_theme_is_valid() {
        let theme = Theme::default();
        assert!(theme.validate().is_ok());
        assert_eq!(theme.canvas_width_px, 1080);
        assert_eq!(theme.position, Position::CENTER);
    }

    #[test]
    fn builtin_presets_are_valid() {
        for preset in builtin_presets() {
            assert!(
                preset.theme.validate().is_ok(),
                "preset '{}' failed validation",
                preset.id
            );
        }
        assert!(find_preset("dark").is_some());
        assert!(find_preset("nope").is_none());
    }

    #[test]
    fn color_parsing() {
        assert_eq!(Color::parse("#ffffff").unwrap(), Color::WHITE);
        assert_eq!(Color::parse("#fff").unwrap(), Color::WHITE);
        assert_eq!(
            Color::parse("#ff6b6b").unwrap(),
            Color::rgb(0xff, 0x6b, 0x6b)
        );
        assert_eq!(
            Color::parse("rgba(0,0,0,0.3)").unwrap(),
            Color::rgba(0, 0, 0, 77)
        );
        assert_eq!(Color::parse("rgb(1, 2, 3)").unwrap(), Color::rgb(1, 2, 3));
        assert!(Color::parse("teal").is_err());
        assert!(Color::parse("#12345").is_err());
    }

    #[test]
    fn color_serde_round_trip() {
        let c = Color::rgba(0x12, 0x34, 0x56, 0x78);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"#12345678\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn patch_clamps_numeric_fields() {
        let theme = Theme::default();
        let patch = ThemePatch {
            font_size_pt: Some(500.0),
            padding_px: Some(-10.0),
            effects: Some(EffectsPatch {
                line_height_multiplier: Some(0.25),
                letter_spacing_px: Some(99.0),
                ..Default::default()
            }),
            position: Some(Position::new(250.0, -40.0)),
            ..Default::default()
        };
        let next = theme.apply(&patch);
        assert_eq!(next.font_size_pt, limits::FONT_SIZE_PT.1);
        assert_eq!(next.padding_px, 0.0);
        assert_eq!(next.effects.line_height_multiplier, 1.0);
        assert_eq!(next.effects.letter_spacing_px, limits::LETTER_SPACING_PX.1);
        assert_eq!(next.position.x(), 100.0);
        assert_eq!(next.position.y(), 0.0);
        assert!(next.validate().is_ok());
    }

    #[test]
    fn patch_rejects_unknown_font_only() {
        let theme = Theme::default();
        let patch = ThemePatch {
            font_family: Some("Comic Sans".into()),
            font_size_pt: Some(30.0),
            ..Default::default()
        };
        let next = theme.apply(&patch);
        // the bad field is dropped, the rest of the patch still lands
        assert_eq!(next.font_family, "Roboto");
        assert_eq!(next.font_size_pt, 30.0);
    }

    #[test]
    fn patch_is_idempotent() {
        let theme = Theme::default();
        let patch = ThemePatch {
            font_size_pt: Some(48.0),
            alignment: Some(Alignment::Right),
            background: Some(Background::Gradient {
                colors: [Color::BLACK, Color::WHITE],
                angle_degrees: 400.0,
            }),
            ..Default::default()
        };
        let once = theme.apply(&patch);
        let twice = once.apply(&patch);
        assert_eq!(once, twice);
    }

    #[test]
    fn gradient_angle_is_normalized() {
        let theme = Theme::default().apply(&ThemePatch {
            background: Some(Background::Gradient {
                colors: [Color::BLACK, Color::WHITE],
                angle_degrees: -45.0,
            }),
            ..Default::default()
        });
        match theme.background {
            Background::Gradient { angle_degrees, .. } => {
                assert!((angle_degrees - 315.0).abs() < 1e-4)
            }
            _ => panic!("expected gradient"),
        }
        assert!(theme.validate().is_ok());
    }

    #[test]
    fn empty_image_source_is_rejected() {
        let theme = Theme::default().apply(&ThemePatch {
            background: Some(Background::Image {
                source: ImageSource::Path(PathBuf::new()),
            }),
            ..Default::default()
        });
        assert_eq!(
            theme.background,
            Background::Solid {
                color: Color::WHITE
            }
        );
    }

    #[test]
    fn theme_serde_round_trip() {
        let preset = find_preset("colorful").unwrap();
        let json = serde_json::to_string(&preset.theme).unwrap();
        assert!(json.contains("\"kind\":\"gradient\""));
        assert!(json.contains("\"angleDegrees\":135.0"));
        let back: Theme = serde_json::from_str(&json).unwrap();
        assert_eq!(back, preset.theme);
    }

    #[test]
    fn image_source_from_string() {
        let data: ImageSource = "data:image/png;base64,AAAA".to_string().into();
        assert!(matches!(data, ImageSource::DataUrl(_)));
        let path: ImageSource = "backgrounds/paper.png".to_string().into();
        assert!(matches!(path, ImageSource::Path(_)));
    }
}
