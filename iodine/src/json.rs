//! Network documents: the JSON form of a single network.
//!
//! Points are `[x, y]` arrays and colors `[r, g, b, a]` arrays (alpha may be
//! omitted on load). Nodes, reactions and compartments are keyed by their
//! index. Loading validates every field before any state changes.

use crate::error::{NomError, NomResult};
use crate::geometry::limits;
use crate::history::History;
use crate::model::{Color, Compartment, Network, NetworkSet, Node, NodeKind, Reaction, Role, Species, SpeciesNode, TipStyle, Vec2};
use crate::shape::{self, CompositeShape};
use crate::Store;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

pub const SERIAL_VERSION: &str = "1.0.0";

type Pt = [f64; 2];

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpeciesDoc {
    id: String,
    position: Pt,
    rect_size: Pt,
    node_locked: bool,
    floating: bool,
    #[serde(default = "no_compartment")]
    compi: i64,
    shape: CompositeShape,
    #[serde(default)]
    concentration: f64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    sbo: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AliasDoc {
    original_idx: u32,
    position: Pt,
    rect_size: Pt,
    node_locked: bool,
    #[serde(default = "no_compartment")]
    compi: i64,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum NodeDoc {
    Alias(AliasDoc),
    Species(SpeciesDoc),
}

#[derive(Serialize, Deserialize)]
struct SpeciesNodeDoc {
    stoich: f64,
    #[serde(rename = "handlePos")]
    handle_pos: Pt,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReactionDoc {
    id: String,
    #[serde(default)]
    center_pos: Option<Pt>,
    rate_law: String,
    reactants: BTreeMap<u32, SpeciesNodeDoc>,
    products: BTreeMap<u32, SpeciesNodeDoc>,
    fill_color: Vec<u8>,
    thickness: f64,
    center_handle_pos: Pt,
    bezier_curves: bool,
    #[serde(default)]
    modifiers: Vec<u32>,
    #[serde(default)]
    tip_style: TipStyle,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompartmentDoc {
    id: String,
    position: Pt,
    rect_size: Pt,
    nodes: Vec<u32>,
    volume: f64,
    fill_color: Vec<u8>,
    outline_color: Vec<u8>,
    outline_thickness: f64,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NetworkDoc {
    #[serde(default)]
    serial_version: Option<String>,
    id: String,
    nodes: BTreeMap<u32, NodeDoc>,
    reactions: BTreeMap<u32, ReactionDoc>,
    compartments: BTreeMap<u32, CompartmentDoc>,
    #[serde(default)]
    parameters: BTreeMap<String, f64>,
}

fn no_compartment() -> i64 {
    -1
}

fn pt(v: Vec2) -> Pt {
    [v.x, v.y]
}

fn rgba(c: Color) -> Vec<u8> {
    vec![c.r, c.g, c.b, c.a]
}

fn compi_of(c: Option<u32>) -> i64 {
    c.map_or(-1, i64::from)
}

fn bad(msg: impl Into<String>) -> crate::error::Error {
    NomError::Json(msg.into()).into()
}

fn check(ok: bool, msg: impl FnOnce() -> String) -> NomResult<()> {
    if ok { Ok(()) } else { Err(bad(msg())) }
}

fn coord(p: Pt, what: &str) -> NomResult<Vec2> {
    check(limits::in_coord_bounds(p[0]) && limits::in_coord_bounds(p[1]), || format!("{} out of bounds", what))?;
    Ok(Vec2::new(p[0], p[1]))
}

fn size(p: Pt, what: &str) -> NomResult<Vec2> {
    check(limits::in_size_bounds(p[0]) && limits::in_size_bounds(p[1]), || format!("{} out of bounds", what))?;
    Ok(Vec2::new(p[0], p[1]))
}

fn color(v: &[u8], what: &str) -> NomResult<Color> {
    match *v {
        [r, g, b] => Ok(Color::rgba(r, g, b, 255)),
        [r, g, b, a] => Ok(Color::rgba(r, g, b, a)),
        _ => Err(bad(format!("{} must have 3 or 4 channels", what))),
    }
}

fn id(s: String, what: &str) -> NomResult<String> {
    check(s.len() <= limits::MAX_ID_LEN, || format!("{} id too long", what))?;
    Ok(s)
}

fn dump(net: &Network) -> NetworkDoc {
    let nodes = net
        .nodes()
        .map(|(i, n)| {
            let doc = match &n.kind {
                NodeKind::Alias { original } => NodeDoc::Alias(AliasDoc {
                    original_idx: *original,
                    position: pt(n.position),
                    rect_size: pt(n.rect_size),
                    node_locked: n.locked,
                    compi: compi_of(n.compartment),
                }),
                NodeKind::Species(s) => NodeDoc::Species(SpeciesDoc {
                    id: s.id.clone(),
                    position: pt(n.position),
                    rect_size: pt(n.rect_size),
                    node_locked: n.locked,
                    floating: s.floating,
                    compi: compi_of(n.compartment),
                    shape: s.shape.clone(),
                    concentration: s.concentration,
                    name: s.name.clone(),
                    sbo: s.sbo.clone(),
                }),
            };
            (i, doc)
        })
        .collect();
    let side = |m: &BTreeMap<u32, SpeciesNode>| -> BTreeMap<u32, SpeciesNodeDoc> {
        m.iter().map(|(i, s)| (*i, SpeciesNodeDoc { stoich: s.stoich, handle_pos: pt(s.handle_pos) })).collect()
    };
    let reactions = net
        .reactions()
        .map(|(i, r)| {
            let doc = ReactionDoc {
                id: r.id.clone(),
                center_pos: r.center_pos.map(pt),
                rate_law: r.rate_law.clone(),
                reactants: side(&r.reactants),
                products: side(&r.products),
                fill_color: rgba(r.fill_color),
                thickness: r.thickness,
                center_handle_pos: pt(r.center_handle_pos),
                bezier_curves: r.bezier_curves,
                modifiers: r.modifiers.iter().copied().collect(),
                tip_style: r.tip_style,
            };
            (i, doc)
        })
        .collect();
    let compartments = net
        .compartments()
        .map(|(i, c)| {
            let doc = CompartmentDoc {
                id: c.id.clone(),
                position: pt(c.position),
                rect_size: pt(c.rect_size),
                nodes: c.nodes.iter().copied().collect(),
                volume: c.volume,
                fill_color: rgba(c.fill_color),
                outline_color: rgba(c.outline_color),
                outline_thickness: c.outline_thickness,
            };
            (i, doc)
        })
        .collect();
    NetworkDoc {
        serial_version: Some(SERIAL_VERSION.to_string()),
        id: net.id.clone(),
        nodes,
        reactions,
        compartments,
        parameters: net.parameters.clone(),
    }
}

fn slots<T>(len: Option<u32>, cap: usize, what: &str) -> NomResult<Vec<Option<T>>> {
    let n = len.map_or(0, |i| i as usize + 1);
    check(n <= cap, || format!("{} index exceeds limit", what))?;
    Ok(std::iter::repeat_with(|| None).take(n).collect())
}

/// Builds a network from a parsed document, checking every reference.
fn build(doc: NetworkDoc) -> NomResult<Network> {
    let mut net = Network::new(id(doc.id, "network")?);

    net.compartments = slots(doc.compartments.keys().next_back().copied(), limits::MAX_COMPARTMENTS, "compartment")?;
    let mut comp_ids = BTreeSet::new();
    for (ci, c) in doc.compartments {
        check(comp_ids.insert(c.id.clone()), || format!("duplicate compartment id '{}'", c.id))?;
        check(c.volume.is_finite() && c.volume >= 0.0, || format!("compartment {} has a bad volume", ci))?;
        check(c.outline_thickness.is_finite() && c.outline_thickness > 0.0, || format!("compartment {} has a bad outline", ci))?;
        let mut comp = Compartment::new(id(c.id, "compartment")?, coord(c.position, "position")?, size(c.rect_size, "size")?);
        comp.volume = c.volume;
        comp.fill_color = color(&c.fill_color, "fillColor")?;
        comp.outline_color = color(&c.outline_color, "outlineColor")?;
        comp.outline_thickness = c.outline_thickness;
        comp.nodes = c.nodes.into_iter().collect();
        net.compartments[ci as usize] = Some(comp);
    }

    net.nodes = slots(doc.nodes.keys().next_back().copied(), limits::MAX_NODES, "node")?;
    let mut node_ids = BTreeSet::new();
    let mut aliases = Vec::new();
    for (ni, n) in doc.nodes {
        let (position, rect_size, locked, compi, kind) = match n {
            NodeDoc::Alias(a) => {
                aliases.push((ni, a.original_idx));
                (a.position, a.rect_size, a.node_locked, a.compi, NodeKind::Alias { original: a.original_idx })
            }
            NodeDoc::Species(s) => {
                check(node_ids.insert(s.id.clone()), || format!("duplicate node id '{}'", s.id))?;
                check(s.concentration.is_finite() && s.concentration >= 0.0, || format!("node {} has a bad concentration", ni))?;
                let shape_index = shape::shape_index_by_name(&s.shape.name)
                    .ok_or_else(|| bad(format!("unknown shape '{}'", s.shape.name)))?;
                let species = Species {
                    id: id(s.id, "node")?,
                    floating: s.floating,
                    shape_index,
                    shape: s.shape,
                    concentration: s.concentration,
                    name: s.name,
                    sbo: s.sbo,
                };
                (s.position, s.rect_size, s.node_locked, s.compi, NodeKind::Species(species))
            }
        };
        let compartment = match compi {
            -1 => None,
            c => {
                let c = u32::try_from(c).map_err(|_| bad(format!("node {} has compartment {}", ni, c)))?;
                check(net.compartment(c).is_some(), || format!("node {} refers to missing compartment {}", ni, c))?;
                Some(c)
            }
        };
        match compartment {
            None => net.base_nodes.insert(ni),
            Some(c) => net.compartment_mut(c).map_or(false, |comp| comp.nodes.insert(ni)),
        };
        net.nodes[ni as usize] = Some(Node {
            position: coord(position, "position")?,
            rect_size: size(rect_size, "rectSize")?,
            locked,
            compartment,
            kind,
        });
    }
    for (ni, orig) in aliases {
        let ok = net.node(orig).map_or(false, |n| n.species().is_some());
        check(ok, || format!("alias {} refers to {}, which is not a species node", ni, orig))?;
    }
    for (ci, c) in net.compartments() {
        let ok = c.nodes.iter().all(|ni| net.node(*ni).map_or(false, |n| n.compartment == Some(ci)));
        check(ok, || format!("compartment {} lists a node outside it", ci))?;
    }

    net.reactions = slots(doc.reactions.keys().next_back().copied(), limits::MAX_REACTIONS, "reaction")?;
    let mut rea_ids = BTreeSet::new();
    for (ri, r) in doc.reactions {
        check(rea_ids.insert(r.id.clone()), || format!("duplicate reaction id '{}'", r.id))?;
        check(!r.reactants.is_empty() && !r.products.is_empty(), || format!("reaction {} has an empty side", ri))?;
        check(
            r.reactants.len() <= limits::MAX_PARTICIPANTS && r.products.len() <= limits::MAX_PARTICIPANTS,
            || format!("reaction {} has too many participants", ri),
        )?;
        check(r.thickness.is_finite() && r.thickness > 0.0, || format!("reaction {} has a bad thickness", ri))?;
        let mut rea = Reaction::new(id(r.id, "reaction")?);
        rea.center_pos = r.center_pos.map(|p| coord(p, "centerPos")).transpose()?;
        rea.rate_law = r.rate_law;
        rea.fill_color = color(&r.fill_color, "fillColor")?;
        rea.thickness = r.thickness;
        rea.center_handle_pos = coord(r.center_handle_pos, "centerHandlePos")?;
        rea.bezier_curves = r.bezier_curves;
        rea.tip_style = r.tip_style;
        for m in r.modifiers {
            check(net.node(m).is_some(), || format!("reaction {} has missing modifier {}", ri, m))?;
            rea.modifiers.insert(m);
        }
        for (role, side) in [(Role::Reactant, r.reactants), (Role::Product, r.products)] {
            for (ni, sn) in side {
                check(net.node(ni).is_some(), || format!("reaction {} refers to missing node {}", ri, ni))?;
                check(sn.stoich.is_finite() && sn.stoich > 0.0, || format!("reaction {} has stoich {}", ri, sn.stoich))?;
                let entry = SpeciesNode { stoich: sn.stoich, handle_pos: coord(sn.handle_pos, "handlePos")? };
                rea.side_mut(role).insert(ni, entry);
                net.link(role, ni, ri);
            }
        }
        check(!rea.sides_identical(), || format!("reaction {} has identical sides", ri))?;
        net.reactions[ri as usize] = Some(rea);
    }

    for (k, v) in &doc.parameters {
        check(v.is_finite(), || format!("parameter '{}' is not finite", k))?;
    }
    net.parameters = doc.parameters;
    Ok(net)
}

impl<H: History> Store<H> {
    pub fn dump_network(&self, neti: u32) -> NomResult<Value> {
        let doc = dump(self.network(neti)?);
        serde_json::to_value(doc).map_err(|e| bad(e.to_string()))
    }

    pub fn dump_network_json(&self, neti: u32) -> NomResult<String> {
        let doc = dump(self.network(neti)?);
        serde_json::to_string(&doc).map_err(|e| bad(e.to_string()))
    }

    /// Replaces every network with the one in `v`, placed at index 0.
    ///
    /// Nothing changes unless the whole document is valid; on success the
    /// replacement is a single undo step.
    pub fn load_network(&mut self, v: Value) -> NomResult<u32> {
        let doc: NetworkDoc = serde_json::from_value(v).map_err(|e| bad(e.to_string()))?;
        self.load_doc(doc)
    }

    pub fn load_network_json(&mut self, s: &str) -> NomResult<u32> {
        let doc: NetworkDoc = serde_json::from_str(s).map_err(|e| bad(e.to_string()))?;
        self.load_doc(doc)
    }

    fn load_doc(&mut self, doc: NetworkDoc) -> NomResult<u32> {
        match doc.serial_version.as_deref() {
            Some(SERIAL_VERSION) => {}
            other => log::warn!(
                "loaded network has serial version '{}', expected '{}'",
                other.unwrap_or("pre-release"),
                SERIAL_VERSION
            ),
        }
        let net = build(doc)?;
        self.record();
        let mut nets = NetworkSet::default();
        nets.nets.insert(0, net);
        nets.last_index = 1;
        self.nets = nets;
        log::debug!("network loaded at 0");
        Ok(0)
    }
}
