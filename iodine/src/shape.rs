//! Composite node shapes.
//!
//! A node is drawn as a list of geometric primitives, each placed by a
//! [`Transform`] relative to the node's bounding box, plus one text item.
//! Each primitive kind declares the style properties it carries through
//! [`ShapeItem::supports`].

use crate::config::Theme;
use crate::error::{NomResult, ValueError};
use crate::model::{Color, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec2,
    pub rotation: f64,
    pub scale: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Transform { translation: Vec2::default(), rotation: 0.0, scale: Vec2::repeat(1.0) }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum Primitive {
    Rectangle { fill_color: Color, border_color: Color, border_width: f64, corner_radius: f64 },
    Circle { fill_color: Color, border_color: Color, border_width: f64 },
    Hexagon { points: Vec<Vec2>, fill_color: Color, border_color: Color, border_width: f64, radius: f64 },
    Triangle { points: Vec<Vec2>, fill_color: Color, border_color: Color, border_width: f64, radius: f64 },
    Line { points: Vec<Vec2>, border_color: Color, border_width: f64, radius: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontFamily {
    #[serde(rename = "sans-serif")]
    SansSerif,
    #[serde(rename = "serif")]
    Serif,
    #[serde(rename = "monospace")]
    Monospace,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Normal,
    Italic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    Bold,
    Light,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlignment {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextPosition {
    InNode,
    Above,
    Below,
    NextTo,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextPrim {
    pub bg_color: Color,
    pub font_color: Color,
    pub font_size: u32,
    pub font_family: FontFamily,
    pub font_style: FontStyle,
    pub font_weight: FontWeight,
    pub alignment: TextAlignment,
    pub position: TextPosition,
}

impl Default for TextPrim {
    fn default() -> Self {
        TextPrim {
            bg_color: Color::rgba(255, 255, 0, 0),
            font_color: Color::rgba(0, 0, 0, 255),
            font_size: 11,
            font_family: FontFamily::SansSerif,
            font_style: FontStyle::Normal,
            font_weight: FontWeight::Normal,
            alignment: TextAlignment::Center,
            position: TextPosition::InNode,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompositeShape {
    pub name: String,
    pub items: Vec<(Primitive, Transform)>,
    pub text_item: (TextPrim, Transform),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveProperty {
    FillColor,
    BorderColor,
    BorderWidth,
    CornerRadius,
    Radius,
    BgColor,
    FontColor,
    FontSize,
    FontFamily,
    FontStyle,
    FontWeight,
    Alignment,
    Position,
}

impl PrimitiveProperty {
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveProperty::FillColor => "fill_color",
            PrimitiveProperty::BorderColor => "border_color",
            PrimitiveProperty::BorderWidth => "border_width",
            PrimitiveProperty::CornerRadius => "corner_radius",
            PrimitiveProperty::Radius => "radius",
            PrimitiveProperty::BgColor => "bg_color",
            PrimitiveProperty::FontColor => "font_color",
            PrimitiveProperty::FontSize => "font_size",
            PrimitiveProperty::FontFamily => "font_family",
            PrimitiveProperty::FontStyle => "font_style",
            PrimitiveProperty::FontWeight => "font_weight",
            PrimitiveProperty::Alignment => "alignment",
            PrimitiveProperty::Position => "position",
        }
    }
}

impl FromStr for PrimitiveProperty {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use PrimitiveProperty::*;
        [FillColor, BorderColor, BorderWidth, CornerRadius, Radius, BgColor, FontColor, FontSize,
         FontFamily, FontStyle, FontWeight, Alignment, Position]
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ValueError::UnsupportedProperty { property: s.to_string(), primitive: "any primitive" })
    }
}

/// A property value as handed in by scripting front-ends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Color(Color),
    Number(f64),
    Text(String),
}

impl PropertyValue {
    fn color(&self, prop: PrimitiveProperty) -> NomResult<Color> {
        match self {
            PropertyValue::Color(c) => Ok(*c),
            _ => Err(type_err(prop)),
        }
    }

    fn number(&self, prop: PrimitiveProperty) -> NomResult<f64> {
        match self {
            PropertyValue::Number(v) if v.is_finite() => Ok(*v),
            _ => Err(type_err(prop)),
        }
    }

    fn choice<T: for<'de> Deserialize<'de>>(&self, prop: PrimitiveProperty) -> NomResult<T> {
        match self {
            PropertyValue::Text(s) => {
                serde_json::from_value(serde_json::Value::String(s.clone())).map_err(|_| type_err(prop))
            }
            _ => Err(type_err(prop)),
        }
    }
}

fn type_err(prop: PrimitiveProperty) -> crate::error::Error {
    ValueError::PropertyType(prop.as_str().to_string()).into()
}

/// Common surface of geometric primitives and the text item.
pub trait ShapeItem {
    fn kind_name(&self) -> &'static str;
    fn supports(&self, prop: PrimitiveProperty) -> bool;
    /// Assigns `value`; fails when the property is unsupported or the value has the wrong type.
    fn set_property(&mut self, prop: PrimitiveProperty, value: &PropertyValue) -> NomResult<()>;

    fn check_supported(&self, prop: PrimitiveProperty) -> NomResult<()> {
        if self.supports(prop) {
            Ok(())
        } else {
            Err(ValueError::UnsupportedProperty { property: prop.as_str().to_string(), primitive: self.kind_name() }.into())
        }
    }
}

impl Primitive {
    pub fn fill_color(&self) -> Option<Color> {
        match self {
            Primitive::Rectangle { fill_color, .. }
            | Primitive::Circle { fill_color, .. }
            | Primitive::Hexagon { fill_color, .. }
            | Primitive::Triangle { fill_color, .. } => Some(*fill_color),
            Primitive::Line { .. } => None,
        }
    }

    pub fn border_color(&self) -> Color {
        match self {
            Primitive::Rectangle { border_color, .. }
            | Primitive::Circle { border_color, .. }
            | Primitive::Hexagon { border_color, .. }
            | Primitive::Triangle { border_color, .. }
            | Primitive::Line { border_color, .. } => *border_color,
        }
    }

    pub fn border_width(&self) -> f64 {
        match self {
            Primitive::Rectangle { border_width, .. }
            | Primitive::Circle { border_width, .. }
            | Primitive::Hexagon { border_width, .. }
            | Primitive::Triangle { border_width, .. }
            | Primitive::Line { border_width, .. } => *border_width,
        }
    }

    fn fill_mut(&mut self) -> Option<&mut Color> {
        match self {
            Primitive::Rectangle { fill_color, .. }
            | Primitive::Circle { fill_color, .. }
            | Primitive::Hexagon { fill_color, .. }
            | Primitive::Triangle { fill_color, .. } => Some(fill_color),
            Primitive::Line { .. } => None,
        }
    }

    fn border_mut(&mut self) -> (&mut Color, &mut f64) {
        match self {
            Primitive::Rectangle { border_color, border_width, .. }
            | Primitive::Circle { border_color, border_width, .. }
            | Primitive::Hexagon { border_color, border_width, .. }
            | Primitive::Triangle { border_color, border_width, .. }
            | Primitive::Line { border_color, border_width, .. } => (border_color, border_width),
        }
    }

    pub(crate) fn set_fill(&mut self, c: Color) {
        if let Some(f) = self.fill_mut() {
            *f = c;
        }
    }

    pub(crate) fn set_border(&mut self, c: Color) {
        *self.border_mut().0 = c;
    }

    pub(crate) fn set_border_width(&mut self, w: f64) {
        *self.border_mut().1 = w;
    }
}

impl ShapeItem for Primitive {
    fn kind_name(&self) -> &'static str {
        match self {
            Primitive::Rectangle { .. } => "rectangle",
            Primitive::Circle { .. } => "circle",
            Primitive::Hexagon { .. } => "hexagon",
            Primitive::Triangle { .. } => "triangle",
            Primitive::Line { .. } => "line",
        }
    }

    fn supports(&self, prop: PrimitiveProperty) -> bool {
        use PrimitiveProperty::*;
        match prop {
            FillColor => self.fill_color().is_some(),
            BorderColor | BorderWidth => true,
            CornerRadius => matches!(self, Primitive::Rectangle { .. }),
            Radius => matches!(self, Primitive::Hexagon { .. } | Primitive::Triangle { .. } | Primitive::Line { .. }),
            _ => false,
        }
    }

    fn set_property(&mut self, prop: PrimitiveProperty, value: &PropertyValue) -> NomResult<()> {
        self.check_supported(prop)?;
        match prop {
            PrimitiveProperty::FillColor => self.set_fill(value.color(prop)?),
            PrimitiveProperty::BorderColor => self.set_border(value.color(prop)?),
            PrimitiveProperty::BorderWidth => self.set_border_width(value.number(prop)?),
            PrimitiveProperty::CornerRadius => {
                let v = value.number(prop)?;
                if let Primitive::Rectangle { corner_radius, .. } = self {
                    *corner_radius = v;
                }
            }
            PrimitiveProperty::Radius => {
                let v = value.number(prop)?;
                if let Primitive::Hexagon { radius, .. } | Primitive::Triangle { radius, .. } | Primitive::Line { radius, .. } = self {
                    *radius = v;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

impl ShapeItem for TextPrim {
    fn kind_name(&self) -> &'static str {
        "text"
    }

    fn supports(&self, prop: PrimitiveProperty) -> bool {
        use PrimitiveProperty::*;
        matches!(prop, BgColor | FontColor | FontSize | FontFamily | FontStyle | FontWeight | Alignment | Position)
    }

    fn set_property(&mut self, prop: PrimitiveProperty, value: &PropertyValue) -> NomResult<()> {
        self.check_supported(prop)?;
        match prop {
            PrimitiveProperty::BgColor => self.bg_color = value.color(prop)?,
            PrimitiveProperty::FontColor => self.font_color = value.color(prop)?,
            PrimitiveProperty::FontSize => {
                let v = value.number(prop)?;
                if v.fract() != 0.0 || v < 0.0 || v > u32::MAX as f64 {
                    return Err(type_err(prop));
                }
                self.font_size = v as u32;
            }
            PrimitiveProperty::FontFamily => self.font_family = value.choice(prop)?,
            PrimitiveProperty::FontStyle => self.font_style = value.choice(prop)?,
            PrimitiveProperty::FontWeight => self.font_weight = value.choice(prop)?,
            PrimitiveProperty::Alignment => self.alignment = value.choice(prop)?,
            PrimitiveProperty::Position => self.position = value.choice(prop)?,
            _ => {}
        }
        Ok(())
    }
}

impl CompositeShape {
    pub fn fill_color(&self) -> Option<Color> {
        self.items.iter().find_map(|(p, _)| p.fill_color())
    }

    pub fn border_color(&self) -> Option<Color> {
        self.items.first().map(|(p, _)| p.border_color())
    }

    pub fn border_width(&self) -> Option<f64> {
        self.items.first().map(|(p, _)| p.border_width())
    }

    pub(crate) fn set_fill(&mut self, c: Color) {
        self.items.iter_mut().for_each(|(p, _)| p.set_fill(c));
    }

    pub(crate) fn set_border(&mut self, c: Color) {
        self.items.iter_mut().for_each(|(p, _)| p.set_border(c));
    }

    pub(crate) fn set_border_width(&mut self, w: f64) {
        self.items.iter_mut().for_each(|(p, _)| p.set_border_width(w));
    }

    /// Item at `prim_index`, where -1 addresses the text item.
    pub(crate) fn item_mut(&mut self, prim_index: i32) -> NomResult<&mut dyn ShapeItem> {
        if prim_index == -1 {
            return Ok(&mut self.text_item.0 as &mut dyn ShapeItem);
        }
        usize::try_from(prim_index)
            .ok()
            .and_then(|i| self.items.get_mut(i))
            .map(|(p, _)| p as &mut dyn ShapeItem)
            .ok_or_else(|| ValueError::PrimitiveIndex(prim_index).into())
    }

    /// Takes over fill, border color and border width item by item when the
    /// item counts match; otherwise leaves `self` as is.
    pub(crate) fn inherit_style(&mut self, old: &CompositeShape) {
        if self.items.len() != old.items.len() {
            return;
        }
        for ((new, _), (prev, _)) in self.items.iter_mut().zip(&old.items) {
            if let Some(fill) = prev.fill_color() {
                new.set_fill(fill);
            }
            new.set_border(prev.border_color());
            new.set_border_width(prev.border_width());
        }
    }
}

/// `n + 1` points of a regular n-gon inscribed in a circle of radius `r`; the
/// last point closes the outline.
pub fn gen_polygon_pts(n: usize, r: f64) -> Vec<Vec2> {
    let inc = 2.0 * PI / n as f64;
    (0..=n).map(|i| Vec2::new((inc * i as f64).cos(), (inc * i as f64).sin()) * r).collect()
}

const SHAPE_NAMES: [&str; 7] = ["rectangle", "circle", "hexagon", "line", "triangle", "text-only", "demo combo"];

pub fn shape_count() -> usize {
    SHAPE_NAMES.len()
}

pub fn shape_index_by_name(name: &str) -> Option<usize> {
    SHAPE_NAMES.iter().position(|n| *n == name)
}

/// The rectangle every new node starts with.
pub fn default_shape(theme: &Theme) -> CompositeShape {
    let rect = Primitive::Rectangle {
        fill_color: theme.node_fill,
        border_color: theme.node_border,
        border_width: theme.node_border_width,
        corner_radius: 4.0,
    };
    CompositeShape {
        name: SHAPE_NAMES[0].to_string(),
        items: vec![(rect, Transform::default())],
        text_item: (TextPrim::default(), Transform::default()),
    }
}

/// Builds built-in shape `i` with colors from `theme`.
pub fn builtin_shape(theme: &Theme, i: usize) -> Option<CompositeShape> {
    let (fill_color, border_color, border_width) = (theme.node_fill, theme.node_border, theme.node_border_width);
    let circle = Primitive::Circle { fill_color, border_color, border_width };
    let whole = Transform::default();
    let text = (TextPrim::default(), whole);

    let (items, text_item) = match i {
        0 => return Some(default_shape(theme)),
        1 => (vec![(circle, whole)], text),
        2 => {
            let points = gen_polygon_pts(6, 0.5);
            (vec![(Primitive::Hexagon { points, fill_color, border_color, border_width, radius: 0.5 }, whole)], text)
        }
        3 => {
            let mut points = gen_polygon_pts(2, 0.5);
            points.pop();
            (vec![(Primitive::Line { points, border_color, border_width, radius: 0.5 }, whole)], text)
        }
        4 => {
            let points = gen_polygon_pts(3, 0.5);
            (vec![(Primitive::Triangle { points, fill_color, border_color, border_width, radius: 0.5 }, whole)], text)
        }
        5 => (Vec::new(), text),
        6 => {
            let half = Vec2::repeat(0.5);
            let red = Primitive::Rectangle {
                fill_color: Color::rgba(255, 0, 0, 255),
                border_color: Color::rgba(0, 255, 0, 255),
                border_width: 2.0,
                corner_radius: 4.0,
            };
            let items = vec![
                (circle.clone(), Transform { scale: half, ..whole }),
                (circle, Transform { scale: half, translation: half, ..whole }),
                (red, Transform { scale: half, translation: Vec2::repeat(0.25), ..whole }),
            ];
            let label = TextPrim { font_color: Color::rgba(255, 255, 255, 255), ..TextPrim::default() };
            (items, (label, whole))
        }
        _ => return None,
    };
    Some(CompositeShape { name: SHAPE_NAMES[i].to_string(), items, text_item })
}

pub fn builtin_shapes(theme: &Theme) -> Vec<CompositeShape> {
    (0..SHAPE_NAMES.len()).filter_map(|i| builtin_shape(theme, i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polygon_points_close_the_outline() {
        let pts = gen_polygon_pts(6, 0.5);
        assert_eq!(pts.len(), 7);
        assert!(pts[0].approx_eq(Vec2::new(0.5, 0.0)));
        assert!(pts[6].approx_eq(pts[0]));
    }

    #[test]
    fn builtins_in_order() {
        let shapes = builtin_shapes(&Theme::default());
        let names: Vec<_> = shapes.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, SHAPE_NAMES);
        assert_eq!(shapes[3].items[0].0.fill_color(), None);
        if let Primitive::Line { points, .. } = &shapes[3].items[0].0 {
            assert_eq!(points.len(), 2);
        }
        assert!(shapes[5].items.is_empty());
        assert_eq!(shapes[6].items.len(), 3);
        assert!(builtin_shape(&Theme::default(), 7).is_none());
    }

    #[test]
    fn capability_checks() {
        let line = &builtin_shapes(&Theme::default())[3].items[0].0;
        assert!(!line.supports(PrimitiveProperty::FillColor));
        assert!(line.supports(PrimitiveProperty::Radius));
        assert!(!TextPrim::default().supports(PrimitiveProperty::BorderWidth));
    }

    #[test]
    fn property_names_parse() {
        assert_eq!("corner_radius".parse::<PrimitiveProperty>(), Ok(PrimitiveProperty::CornerRadius));
        assert!("nonsense".parse::<PrimitiveProperty>().is_err());
    }

    #[test]
    fn text_choices_from_strings() {
        let mut t = TextPrim::default();
        t.set_property(PrimitiveProperty::FontFamily, &PropertyValue::Text("monospace".into())).unwrap();
        assert_eq!(t.font_family, FontFamily::Monospace);
        t.set_property(PrimitiveProperty::Position, &PropertyValue::Text("next_to".into())).unwrap();
        assert_eq!(t.position, TextPosition::NextTo);
        assert!(t.set_property(PrimitiveProperty::FontSize, &PropertyValue::Number(10.5)).is_err());
        assert!(t.set_property(PrimitiveProperty::Alignment, &PropertyValue::Text("justify".into())).is_err());
    }
}
