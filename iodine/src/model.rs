use crate::error::{self, NomResult};
use crate::shape::CompositeShape;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }
    pub const fn repeat(v: f64) -> Self {
        Vec2 { x: v, y: v }
    }
    pub fn dot(self, o: Vec2) -> f64 {
        self.x * o.x + self.y * o.y
    }
    pub fn norm_sq(self) -> f64 {
        self.dot(self)
    }
    pub fn norm(self) -> f64 {
        self.norm_sq().sqrt()
    }
    /// Unit vector scaled to `len`; the zero vector stays zero.
    pub fn normalized(self, len: f64) -> Vec2 {
        let n = self.norm();
        if n <= crate::geometry::tolerance::EPS_LEN {
            Vec2::default()
        } else {
            self * (len / n)
        }
    }
    pub fn approx_eq(self, o: Vec2) -> bool {
        use crate::geometry::tolerance::{approx_eq, EPS_LEN};
        approx_eq(self.x, o.x, EPS_LEN) && approx_eq(self.y, o.y, EPS_LEN)
    }
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
    pub fn round2(self) -> Vec2 {
        Vec2::new(round2(self.x), round2(self.y))
    }
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, o: Vec2) -> Vec2 {
        Vec2::new(self.x + o.x, self.y + o.y)
    }
}
impl AddAssign for Vec2 {
    fn add_assign(&mut self, o: Vec2) {
        self.x += o.x;
        self.y += o.y;
    }
}
impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, o: Vec2) -> Vec2 {
        Vec2::new(self.x - o.x, self.y - o.y)
    }
}
impl SubAssign for Vec2 {
    fn sub_assign(&mut self, o: Vec2) {
        self.x -= o.x;
        self.y -= o.y;
    }
}
impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, k: f64) -> Vec2 {
        Vec2::new(self.x * k, self.y * k)
    }
}
impl Div<f64> for Vec2 {
    type Output = Vec2;
    fn div(self, k: f64) -> Vec2 {
        Vec2::new(self.x / k, self.y / k)
    }
}
impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }
    pub fn with_rgb(self, r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: self.a }
    }
    pub fn with_alpha(self, a: u8) -> Self {
        Color { a, ..self }
    }
    /// RGB packed as `0xRRGGBB`.
    pub fn rgb_packed(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
    pub fn alpha_f64(self) -> f64 {
        self.a as f64 / 255.0
    }

    /// Validates integer channels in [0, 255].
    pub fn checked_rgb(r: i32, g: i32, b: i32) -> NomResult<(u8, u8, u8)> {
        let ch = |param: &'static str, v: i32| {
            u8::try_from(v).map_err(|_| error::out_of_range(param, v as f64))
        };
        Ok((ch("r", r)?, ch("g", g)?, ch("b", b)?))
    }

    /// Validates a float alpha in [0, 1] and scales it to a channel value.
    pub fn checked_alpha(a: f64) -> NomResult<u8> {
        error::ensure((0.0..=1.0).contains(&a), "alpha", a)?;
        Ok((a * 255.0) as u8)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipStyle {
    Circle,
    Tee,
}

impl Default for TipStyle {
    fn default() -> Self {
        TipStyle::Circle
    }
}

/// Which side of a reaction a node sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Reactant,
    Product,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Species {
    pub id: String,
    pub floating: bool,
    pub shape_index: usize,
    pub shape: CompositeShape,
    pub concentration: f64,
    pub name: String,
    pub sbo: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Species(Species),
    Alias { original: u32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub position: Vec2,
    pub rect_size: Vec2,
    pub locked: bool,
    pub compartment: Option<u32>,
    pub kind: NodeKind,
}

impl Node {
    pub fn center(&self) -> Vec2 {
        self.position + self.rect_size * 0.5
    }
    pub fn rect(&self) -> crate::geometry::rect::Rect {
        crate::geometry::rect::Rect::new(self.position, self.rect_size)
    }
    pub fn species(&self) -> Option<&Species> {
        match &self.kind {
            NodeKind::Species(s) => Some(s),
            NodeKind::Alias { .. } => None,
        }
    }
    pub fn original(&self) -> Option<u32> {
        match self.kind {
            NodeKind::Alias { original } => Some(original),
            NodeKind::Species(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciesNode {
    pub stoich: f64,
    #[serde(rename = "handlePos")]
    pub handle_pos: Vec2,
}

impl SpeciesNode {
    pub fn new(stoich: f64) -> Self {
        SpeciesNode { stoich, handle_pos: Vec2::default() }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Reaction {
    pub id: String,
    pub center_pos: Option<Vec2>,
    pub rate_law: String,
    pub reactants: BTreeMap<u32, SpeciesNode>,
    pub products: BTreeMap<u32, SpeciesNode>,
    pub fill_color: Color,
    pub thickness: f64,
    pub center_handle_pos: Vec2,
    pub bezier_curves: bool,
    pub modifiers: BTreeSet<u32>,
    pub tip_style: TipStyle,
}

impl Reaction {
    pub fn new(id: impl Into<String>) -> Self {
        Reaction {
            id: id.into(),
            center_pos: None,
            rate_law: String::new(),
            reactants: BTreeMap::new(),
            products: BTreeMap::new(),
            fill_color: Color::rgba(255, 150, 80, 255),
            thickness: 3.0,
            center_handle_pos: Vec2::default(),
            bezier_curves: true,
            modifiers: BTreeSet::new(),
            tip_style: TipStyle::Circle,
        }
    }
    pub fn side(&self, role: Role) -> &BTreeMap<u32, SpeciesNode> {
        match role {
            Role::Reactant => &self.reactants,
            Role::Product => &self.products,
        }
    }
    pub fn side_mut(&mut self, role: Role) -> &mut BTreeMap<u32, SpeciesNode> {
        match role {
            Role::Reactant => &mut self.reactants,
            Role::Product => &mut self.products,
        }
    }
    pub(crate) fn sides_identical(&self) -> bool {
        self.reactants.keys().eq(self.products.keys())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Compartment {
    pub id: String,
    pub position: Vec2,
    pub rect_size: Vec2,
    pub nodes: BTreeSet<u32>,
    pub volume: f64,
    pub fill_color: Color,
    pub outline_color: Color,
    pub outline_thickness: f64,
}

impl Compartment {
    pub fn new(id: impl Into<String>, position: Vec2, rect_size: Vec2) -> Self {
        Compartment {
            id: id.into(),
            position,
            rect_size,
            nodes: BTreeSet::new(),
            volume: 1.0,
            fill_color: Color::rgba(0, 247, 255, 255),
            outline_color: Color::rgba(0, 106, 255, 255),
            outline_thickness: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Network {
    pub id: String,
    pub(crate) nodes: Vec<Option<Node>>,               // id is index
    pub(crate) reactions: Vec<Option<Reaction>>,       // id is index
    pub(crate) compartments: Vec<Option<Compartment>>, // id is index
    pub(crate) base_nodes: BTreeSet<u32>,
    pub(crate) src_map: BTreeMap<u32, BTreeSet<u32>>,  // node -> reactions it feeds
    pub(crate) dest_map: BTreeMap<u32, BTreeSet<u32>>, // node -> reactions it is produced by
    pub(crate) parameters: BTreeMap<String, f64>,
}

impl Network {
    pub fn new(id: impl Into<String>) -> Self {
        Network {
            id: id.into(),
            nodes: Vec::new(),
            reactions: Vec::new(),
            compartments: Vec::new(),
            base_nodes: BTreeSet::new(),
            src_map: BTreeMap::new(),
            dest_map: BTreeMap::new(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn node(&self, i: u32) -> Option<&Node> {
        self.nodes.get(i as usize).and_then(|n| n.as_ref())
    }
    pub(crate) fn node_mut(&mut self, i: u32) -> Option<&mut Node> {
        self.nodes.get_mut(i as usize).and_then(|n| n.as_mut())
    }
    pub fn reaction(&self, i: u32) -> Option<&Reaction> {
        self.reactions.get(i as usize).and_then(|r| r.as_ref())
    }
    pub(crate) fn reaction_mut(&mut self, i: u32) -> Option<&mut Reaction> {
        self.reactions.get_mut(i as usize).and_then(|r| r.as_mut())
    }
    pub fn compartment(&self, i: u32) -> Option<&Compartment> {
        self.compartments.get(i as usize).and_then(|c| c.as_ref())
    }
    pub(crate) fn compartment_mut(&mut self, i: u32) -> Option<&mut Compartment> {
        self.compartments.get_mut(i as usize).and_then(|c| c.as_mut())
    }

    pub fn nodes(&self) -> impl Iterator<Item = (u32, &Node)> {
        self.nodes.iter().enumerate().filter_map(|(i, n)| n.as_ref().map(|n| (i as u32, n)))
    }
    pub fn reactions(&self) -> impl Iterator<Item = (u32, &Reaction)> {
        self.reactions.iter().enumerate().filter_map(|(i, r)| r.as_ref().map(|r| (i as u32, r)))
    }
    pub fn compartments(&self) -> impl Iterator<Item = (u32, &Compartment)> {
        self.compartments.iter().enumerate().filter_map(|(i, c)| c.as_ref().map(|c| (i as u32, c)))
    }
    pub fn parameters(&self) -> &BTreeMap<String, f64> {
        &self.parameters
    }

    /// Resolves an alias to its concrete node; concrete nodes resolve to themselves.
    pub fn concrete_index(&self, i: u32) -> Option<u32> {
        match self.node(i)?.kind {
            NodeKind::Species(_) => Some(i),
            NodeKind::Alias { original } => Some(original),
        }
    }
    pub(crate) fn species(&self, i: u32) -> Option<&Species> {
        let c = self.concrete_index(i)?;
        self.node(c)?.species()
    }
    pub(crate) fn species_mut(&mut self, i: u32) -> Option<&mut Species> {
        let c = self.concrete_index(i)?;
        match &mut self.node_mut(c)?.kind {
            NodeKind::Species(s) => Some(s),
            NodeKind::Alias { .. } => None,
        }
    }

    pub(crate) fn push_node(&mut self, node: Node) -> u32 {
        let id = self.nodes.len() as u32;
        match node.compartment {
            None => {
                self.base_nodes.insert(id);
            }
            Some(c) => {
                if let Some(comp) = self.compartment_mut(c) {
                    comp.nodes.insert(id);
                }
            }
        }
        self.nodes.push(Some(node));
        id
    }

    pub(crate) fn push_reaction(&mut self, rea: Reaction) -> u32 {
        let id = self.reactions.len() as u32;
        for src in rea.reactants.keys() {
            self.src_map.entry(*src).or_default().insert(id);
        }
        for dest in rea.products.keys() {
            self.dest_map.entry(*dest).or_default().insert(id);
        }
        self.reactions.push(Some(rea));
        id
    }

    pub(crate) fn push_compartment(&mut self, comp: Compartment) -> u32 {
        let id = self.compartments.len() as u32;
        self.compartments.push(Some(comp));
        id
    }

    pub(crate) fn role_map_mut(&mut self, role: Role) -> &mut BTreeMap<u32, BTreeSet<u32>> {
        match role {
            Role::Reactant => &mut self.src_map,
            Role::Product => &mut self.dest_map,
        }
    }

    pub(crate) fn link(&mut self, role: Role, node: u32, reaction: u32) {
        self.role_map_mut(role).entry(node).or_default().insert(reaction);
    }

    pub(crate) fn unlink(&mut self, role: Role, node: u32, reaction: u32) {
        let map = self.role_map_mut(role);
        if let Some(set) = map.get_mut(&node) {
            set.remove(&reaction);
            if set.is_empty() {
                map.remove(&node);
            }
        }
    }

    pub fn src_reactions(&self, node: u32) -> BTreeSet<u32> {
        self.src_map.get(&node).cloned().unwrap_or_default()
    }
    pub fn dest_reactions(&self, node: u32) -> BTreeSet<u32> {
        self.dest_map.get(&node).cloned().unwrap_or_default()
    }
    pub(crate) fn is_free(&self, node: u32) -> bool {
        !self.src_map.contains_key(&node) && !self.dest_map.contains_key(&node)
    }
}

/// All networks of a store; this is the unit captured by an undo snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NetworkSet {
    pub(crate) nets: BTreeMap<u32, Network>,
    pub(crate) last_index: u32,
}

impl NetworkSet {
    pub fn get(&self, neti: u32) -> Option<&Network> {
        self.nets.get(&neti)
    }
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Network)> {
        self.nets.iter().map(|(k, v)| (*k, v))
    }
    pub fn len(&self) -> usize {
        self.nets.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nets.is_empty()
    }
}
