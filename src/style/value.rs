//! Property identifiers, value representation and per-property metadata.

use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// What a property change affects, used to route style-change records
    /// to relayout and/or redraw.
    pub struct Affects: u8 {
        const SIZE = 1 << 0;
        const DRAW = 1 << 1;
    }
}

/// The recognized longhand properties, used to index computed-style arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum PropertyId {
    Color,
    BackgroundColor,
    FontSize,
    FontFamily,
    FontWeight,
    Opacity,
    MinWidth,
    MinHeight,
    MarginTop,
    MarginRight,
    MarginBottom,
    MarginLeft,
    PaddingTop,
    PaddingRight,
    PaddingBottom,
    PaddingLeft,
    BorderWidth,
    BorderColor,
    BorderRadius,
    TransitionDuration,
    TransitionTimingFunction,
}

impl PropertyId {
    pub const COUNT: usize = 21;

    /// All properties in index order.
    pub const ALL: [PropertyId; Self::COUNT] = [
        PropertyId::Color,
        PropertyId::BackgroundColor,
        PropertyId::FontSize,
        PropertyId::FontFamily,
        PropertyId::FontWeight,
        PropertyId::Opacity,
        PropertyId::MinWidth,
        PropertyId::MinHeight,
        PropertyId::MarginTop,
        PropertyId::MarginRight,
        PropertyId::MarginBottom,
        PropertyId::MarginLeft,
        PropertyId::PaddingTop,
        PropertyId::PaddingRight,
        PropertyId::PaddingBottom,
        PropertyId::PaddingLeft,
        PropertyId::BorderWidth,
        PropertyId::BorderColor,
        PropertyId::BorderRadius,
        PropertyId::TransitionDuration,
        PropertyId::TransitionTimingFunction,
    ];

    /// Array index for computed-style storage.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up a property by its CSS name.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "color" => PropertyId::Color,
            "background-color" => PropertyId::BackgroundColor,
            "font-size" => PropertyId::FontSize,
            "font-family" => PropertyId::FontFamily,
            "font-weight" => PropertyId::FontWeight,
            "opacity" => PropertyId::Opacity,
            "min-width" => PropertyId::MinWidth,
            "min-height" => PropertyId::MinHeight,
            "margin-top" => PropertyId::MarginTop,
            "margin-right" => PropertyId::MarginRight,
            "margin-bottom" => PropertyId::MarginBottom,
            "margin-left" => PropertyId::MarginLeft,
            "padding-top" => PropertyId::PaddingTop,
            "padding-right" => PropertyId::PaddingRight,
            "padding-bottom" => PropertyId::PaddingBottom,
            "padding-left" => PropertyId::PaddingLeft,
            "border-width" => PropertyId::BorderWidth,
            "border-color" => PropertyId::BorderColor,
            "border-radius" => PropertyId::BorderRadius,
            "transition-duration" => PropertyId::TransitionDuration,
            "transition-timing-function" => PropertyId::TransitionTimingFunction,
            _ => return None,
        })
    }

    /// The CSS name of this property.
    pub fn name(self) -> &'static str {
        match self {
            PropertyId::Color => "color",
            PropertyId::BackgroundColor => "background-color",
            PropertyId::FontSize => "font-size",
            PropertyId::FontFamily => "font-family",
            PropertyId::FontWeight => "font-weight",
            PropertyId::Opacity => "opacity",
            PropertyId::MinWidth => "min-width",
            PropertyId::MinHeight => "min-height",
            PropertyId::MarginTop => "margin-top",
            PropertyId::MarginRight => "margin-right",
            PropertyId::MarginBottom => "margin-bottom",
            PropertyId::MarginLeft => "margin-left",
            PropertyId::PaddingTop => "padding-top",
            PropertyId::PaddingRight => "padding-right",
            PropertyId::PaddingBottom => "padding-bottom",
            PropertyId::PaddingLeft => "padding-left",
            PropertyId::BorderWidth => "border-width",
            PropertyId::BorderColor => "border-color",
            PropertyId::BorderRadius => "border-radius",
            PropertyId::TransitionDuration => "transition-duration",
            PropertyId::TransitionTimingFunction => "transition-timing-function",
        }
    }

    /// Inherited properties default to the parent's computed value when no
    /// rule supplies one; non-inherited default to their initial value.
    pub fn is_inherited(self) -> bool {
        matches!(
            self,
            PropertyId::Color
                | PropertyId::FontSize
                | PropertyId::FontFamily
                | PropertyId::FontWeight
        )
    }

    /// Whether a cascaded change of this property starts a transition.
    pub fn is_animatable(self) -> bool {
        matches!(
            self,
            PropertyId::Color
                | PropertyId::BackgroundColor
                | PropertyId::FontSize
                | PropertyId::Opacity
                | PropertyId::MinWidth
                | PropertyId::MinHeight
                | PropertyId::MarginTop
                | PropertyId::MarginRight
                | PropertyId::MarginBottom
                | PropertyId::MarginLeft
                | PropertyId::PaddingTop
                | PropertyId::PaddingRight
                | PropertyId::PaddingBottom
                | PropertyId::PaddingLeft
                | PropertyId::BorderWidth
                | PropertyId::BorderColor
                | PropertyId::BorderRadius
        )
    }

    /// Whether a change to this property requires relayout, redraw or both.
    pub fn affects(self) -> Affects {
        match self {
            PropertyId::FontSize
            | PropertyId::FontFamily
            | PropertyId::FontWeight
            | PropertyId::MinWidth
            | PropertyId::MinHeight
            | PropertyId::MarginTop
            | PropertyId::MarginRight
            | PropertyId::MarginBottom
            | PropertyId::MarginLeft
            | PropertyId::PaddingTop
            | PropertyId::PaddingRight
            | PropertyId::PaddingBottom
            | PropertyId::PaddingLeft
            | PropertyId::BorderWidth => Affects::SIZE | Affects::DRAW,
            PropertyId::Color
            | PropertyId::BackgroundColor
            | PropertyId::Opacity
            | PropertyId::BorderColor
            | PropertyId::BorderRadius => Affects::DRAW,
            PropertyId::TransitionDuration | PropertyId::TransitionTimingFunction => {
                Affects::empty()
            }
        }
    }

    /// The initial (spec-default) value.
    pub fn initial(self) -> Value {
        match self {
            PropertyId::Color => Value::Color(Rgba::BLACK),
            PropertyId::BackgroundColor => Value::Color(Rgba::TRANSPARENT),
            PropertyId::FontSize => Value::Px(14.0),
            PropertyId::FontFamily => Value::Keyword("sans-serif".into()),
            PropertyId::FontWeight => Value::Number(400.0),
            PropertyId::Opacity => Value::Number(1.0),
            PropertyId::MinWidth
            | PropertyId::MinHeight
            | PropertyId::MarginTop
            | PropertyId::MarginRight
            | PropertyId::MarginBottom
            | PropertyId::MarginLeft
            | PropertyId::PaddingTop
            | PropertyId::PaddingRight
            | PropertyId::PaddingBottom
            | PropertyId::PaddingLeft
            | PropertyId::BorderWidth
            | PropertyId::BorderRadius => Value::Px(0.0),
            PropertyId::BorderColor => Value::Color(Rgba::TRANSPARENT),
            PropertyId::TransitionDuration => Value::Ms(0.0),
            PropertyId::TransitionTimingFunction => Value::Keyword("ease".into()),
        }
    }
}

/// An RGBA color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Rgba = Rgba::rgb(1.0, 1.0, 1.0);
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::new(red, green, blue, 1.0)
    }

    /// Parse a hex color body (without `#`): 3, 4, 6 or 8 hex digits.
    pub fn from_hex(hex: &str) -> Option<Self> {
        fn nibble(b: u8) -> Option<u8> {
            match b {
                b'0'..=b'9' => Some(b - b'0'),
                b'a'..=b'f' => Some(b - b'a' + 10),
                b'A'..=b'F' => Some(b - b'A' + 10),
                _ => None,
            }
        }
        let bytes = hex.as_bytes();
        let channel = |hi: u8, lo: u8| -> Option<f64> {
            Some(f64::from(nibble(hi)? * 16 + nibble(lo)?) / 255.0)
        };
        match bytes.len() {
            3 | 4 => {
                let mut c = [0.0; 4];
                c[3] = 1.0;
                for (i, &b) in bytes.iter().enumerate() {
                    c[i] = channel(b, b)?;
                }
                Some(Self::new(c[0], c[1], c[2], c[3]))
            }
            6 | 8 => {
                let mut c = [0.0; 4];
                c[3] = 1.0;
                for i in 0..bytes.len() / 2 {
                    c[i] = channel(bytes[2 * i], bytes[2 * i + 1])?;
                }
                Some(Self::new(c[0], c[1], c[2], c[3]))
            }
            _ => None,
        }
    }

    pub fn is_translucent(&self) -> bool {
        self.alpha < 1.0
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let to_byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        if self.alpha < 1.0 {
            write!(
                f,
                "#{:02x}{:02x}{:02x}{:02x}",
                to_byte(self.red),
                to_byte(self.green),
                to_byte(self.blue),
                to_byte(self.alpha)
            )
        } else {
            write!(
                f,
                "#{:02x}{:02x}{:02x}",
                to_byte(self.red),
                to_byte(self.green),
                to_byte(self.blue)
            )
        }
    }
}

/// A length unit as declared in a stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    Px,
    Pt,
    /// Relative to the parent node's computed font size.
    Em,
    /// Relative to the root node's computed font size.
    Rem,
    Percent,
}

/// A declared length, resolved to pixels at compute time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f64,
    pub unit: LengthUnit,
}

impl Length {
    pub fn px(value: f64) -> Self {
        Self {
            value,
            unit: LengthUnit::Px,
        }
    }

    /// Resolve to pixels. `base` is the parent font size for `em` and the
    /// percentage base; `root` is the root font size for `rem`.
    pub fn resolve(&self, base: f64, root: f64) -> f64 {
        match self.unit {
            LengthUnit::Px => self.value,
            // 1pt = 4/3 px at 96 dpi.
            LengthUnit::Pt => self.value * 4.0 / 3.0,
            LengthUnit::Em => self.value * base,
            LengthUnit::Rem => self.value * root,
            LengthUnit::Percent => self.value / 100.0 * base,
        }
    }
}

/// A property value.
///
/// Declared values may carry relative lengths (`Length`); computed values
/// only ever contain absolute variants (`Px`, `Ms`, `Number`, `Color`,
/// `Keyword`).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// An absolute pixel length.
    Px(f64),
    /// A declared, not yet resolved length.
    Length(Length),
    /// A unitless number (opacity, font-weight).
    Number(f64),
    /// A color.
    Color(Rgba),
    /// A keyword or font-family name.
    Keyword(String),
    /// A duration in milliseconds.
    Ms(f64),
}

impl Value {
    /// The pixel magnitude, if this is an absolute length.
    pub fn as_px(&self) -> Option<f64> {
        match self {
            Value::Px(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Rgba> {
        match self {
            Value::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_ms(&self) -> Option<f64> {
        match self {
            Value::Ms(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_keyword(&self) -> Option<&str> {
        match self {
            Value::Keyword(k) => Some(k),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Px(v) => write!(f, "{v}px"),
            Value::Length(l) => match l.unit {
                LengthUnit::Px => write!(f, "{}px", l.value),
                LengthUnit::Pt => write!(f, "{}pt", l.value),
                LengthUnit::Em => write!(f, "{}em", l.value),
                LengthUnit::Rem => write!(f, "{}rem", l.value),
                LengthUnit::Percent => write!(f, "{}%", l.value),
            },
            Value::Number(v) => write!(f, "{v}"),
            Value::Color(c) => write!(f, "{c}"),
            Value::Keyword(k) => write!(f, "{k}"),
            Value::Ms(v) => write!(f, "{v}ms"),
        }
    }
}

/// A fully resolved style: one value per property, indexed by
/// [`PropertyId`].
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    values: Vec<Value>,
}

impl ComputedStyle {
    /// All properties at their initial values.
    pub fn initial() -> Self {
        Self {
            values: PropertyId::ALL.iter().map(|p| p.initial()).collect(),
        }
    }

    pub fn get(&self, property: PropertyId) -> &Value {
        &self.values[property.index()]
    }

    pub fn set(&mut self, property: PropertyId, value: Value) {
        self.values[property.index()] = value;
    }

    /// The computed font size in pixels.
    pub fn font_size(&self) -> f64 {
        self.get(PropertyId::FontSize).as_px().unwrap_or(14.0)
    }

    /// Property-ids whose values differ from `other`.
    pub fn diff(&self, other: &ComputedStyle) -> Vec<PropertyId> {
        PropertyId::ALL
            .iter()
            .copied()
            .filter(|p| self.get(*p) != other.get(*p))
            .collect()
    }

    /// Serialize back to a declaration list (`name: value;` lines), used
    /// by the style round-trip tests and CSS debugging output.
    pub fn to_declarations(&self) -> String {
        let mut out = String::new();
        for property in PropertyId::ALL {
            out.push_str(property.name());
            out.push_str(": ");
            out.push_str(&self.get(property).to_string());
            out.push_str(";\n");
        }
        out
    }
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self::initial()
    }
}
