//! Declaration-to-value conversion: validates parsed declarations against
//! per-property grammars and expands shorthands into longhands.

use super::model::{Declaration, DeclarationValue};
use super::value::{Length, LengthUnit, PropertyId, Rgba, Value};

/// The named colors the value grammar accepts.
pub fn named_color(name: &str) -> Option<Rgba> {
    Some(match name {
        "black" => Rgba::BLACK,
        "white" => Rgba::WHITE,
        "red" => Rgba::rgb(1.0, 0.0, 0.0),
        "green" => Rgba::rgb(0.0, 0.5, 0.0),
        "lime" => Rgba::rgb(0.0, 1.0, 0.0),
        "blue" => Rgba::rgb(0.0, 0.0, 1.0),
        "yellow" => Rgba::rgb(1.0, 1.0, 0.0),
        "cyan" => Rgba::rgb(0.0, 1.0, 1.0),
        "magenta" => Rgba::rgb(1.0, 0.0, 1.0),
        "gray" | "grey" => Rgba::rgb(0.5, 0.5, 0.5),
        "silver" => Rgba::rgb(0.75, 0.75, 0.75),
        "maroon" => Rgba::rgb(0.5, 0.0, 0.0),
        "navy" => Rgba::rgb(0.0, 0.0, 0.5),
        "teal" => Rgba::rgb(0.0, 0.5, 0.5),
        "orange" => Rgba::rgb(1.0, 0.65, 0.0),
        "transparent" => Rgba::TRANSPARENT,
        _ => return None,
    })
}

fn length_unit(unit: &str) -> Option<LengthUnit> {
    Some(match unit {
        "px" => LengthUnit::Px,
        "pt" => LengthUnit::Pt,
        "em" => LengthUnit::Em,
        "rem" => LengthUnit::Rem,
        "%" => LengthUnit::Percent,
        _ => return None,
    })
}

fn parse_color(value: &DeclarationValue) -> Option<Rgba> {
    match value {
        DeclarationValue::Color(hex) => Rgba::from_hex(hex),
        DeclarationValue::Ident(name) => named_color(name),
        _ => None,
    }
}

fn parse_length(value: &DeclarationValue) -> Option<Value> {
    match value {
        DeclarationValue::Dimension(v, unit) => {
            let unit = length_unit(unit)?;
            Some(Value::Length(Length { value: *v, unit }))
        }
        // Unitless zero is accepted as 0px.
        DeclarationValue::Number(v) if *v == 0.0 => Some(Value::Px(0.0)),
        _ => None,
    }
}

fn parse_duration(value: &DeclarationValue) -> Option<Value> {
    match value {
        DeclarationValue::Dimension(v, unit) if unit == "ms" => Some(Value::Ms(*v)),
        DeclarationValue::Dimension(v, unit) if unit == "s" => Some(Value::Ms(v * 1000.0)),
        DeclarationValue::Number(v) if *v == 0.0 => Some(Value::Ms(0.0)),
        _ => None,
    }
}

/// Validate a single value against a property's grammar.
fn parse_value(property: PropertyId, value: &DeclarationValue) -> Option<Value> {
    match property {
        PropertyId::Color | PropertyId::BackgroundColor | PropertyId::BorderColor => {
            parse_color(value).map(Value::Color)
        }
        PropertyId::FontSize
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
        | PropertyId::BorderRadius => parse_length(value),
        PropertyId::FontFamily => match value {
            DeclarationValue::Ident(name) => Some(Value::Keyword(name.clone())),
            DeclarationValue::String(name) => Some(Value::Keyword(name.clone())),
            _ => None,
        },
        PropertyId::FontWeight => match value {
            DeclarationValue::Number(v) => Some(Value::Number(*v)),
            DeclarationValue::Ident(name) if name == "normal" => Some(Value::Number(400.0)),
            DeclarationValue::Ident(name) if name == "bold" => Some(Value::Number(700.0)),
            _ => None,
        },
        PropertyId::Opacity => match value {
            DeclarationValue::Number(v) => Some(Value::Number(v.clamp(0.0, 1.0))),
            _ => None,
        },
        PropertyId::TransitionDuration => parse_duration(value),
        PropertyId::TransitionTimingFunction => match value {
            DeclarationValue::Ident(name)
                if matches!(
                    name.as_str(),
                    "linear" | "ease" | "ease-in" | "ease-out" | "ease-in-out"
                        | "ease-out-cubic"
                ) =>
            {
                Some(Value::Keyword(name.clone()))
            }
            _ => None,
        },
    }
}

/// Expand a 1-4 value box shorthand into (top, right, bottom, left).
fn expand_box<'a>(values: &'a [DeclarationValue]) -> Option<[&'a DeclarationValue; 4]> {
    match values {
        [all] => Some([all, all, all, all]),
        [vertical, horizontal] => Some([vertical, horizontal, vertical, horizontal]),
        [top, horizontal, bottom] => Some([top, horizontal, bottom, horizontal]),
        [top, right, bottom, left] => Some([top, right, bottom, left]),
        _ => None,
    }
}

/// Convert a parsed declaration into longhand `(property, value)` pairs.
///
/// Returns `Err` with a description when the property is unknown or the
/// value does not fit its grammar; the caller turns that into a located
/// parse warning and skips the declaration.
pub fn resolve_declaration(
    declaration: &Declaration,
) -> Result<Vec<(PropertyId, Value)>, String> {
    let name = declaration.property.as_str();

    // Box shorthands.
    if name == "margin" || name == "padding" {
        let sides = expand_box(&declaration.values)
            .ok_or_else(|| format!("'{name}' expects 1 to 4 values"))?;
        let longhands: [PropertyId; 4] = if name == "margin" {
            [
                PropertyId::MarginTop,
                PropertyId::MarginRight,
                PropertyId::MarginBottom,
                PropertyId::MarginLeft,
            ]
        } else {
            [
                PropertyId::PaddingTop,
                PropertyId::PaddingRight,
                PropertyId::PaddingBottom,
                PropertyId::PaddingLeft,
            ]
        };
        let mut out = Vec::with_capacity(4);
        for (property, value) in longhands.into_iter().zip(sides) {
            let parsed = parse_value(property, value)
                .ok_or_else(|| format!("invalid value for '{name}'"))?;
            out.push((property, parsed));
        }
        return Ok(out);
    }

    let property =
        PropertyId::from_name(name).ok_or_else(|| format!("unknown property '{name}'"))?;
    let value = declaration
        .values
        .first()
        .ok_or_else(|| format!("missing value for '{name}'"))?;
    if declaration.values.len() > 1 {
        return Err(format!("'{name}' expects a single value"));
    }
    let parsed =
        parse_value(property, value).ok_or_else(|| format!("invalid value for '{name}'"))?;
    Ok(vec![(property, parsed)])
}
