use crate::error::{ensure, ensure_id, NomError, NomResult, ValueError};
use crate::geometry::limits::{in_size_bounds, COORD_MAX, COORD_MIN, MAX_NODES};
use crate::history::History;
use crate::model::{Color, Network, Node, NodeKind, Role, Species, Vec2};
use crate::shape::{self, CompositeShape, FontFamily, FontStyle, FontWeight, PrimitiveProperty, PropertyValue, ShapeItem, TextPrim};
use crate::Store;

fn check_rect(x: f64, y: f64, w: f64, h: f64) -> NomResult<()> {
    ensure(x >= 0.0 && x <= COORD_MAX, "x", x)?;
    ensure(y >= 0.0 && y <= COORD_MAX, "y", y)?;
    ensure(w > 0.0 && in_size_bounds(w), "w", w)?;
    ensure(h > 0.0 && in_size_bounds(h), "h", h)
}

fn node_of(net: &Network, nodei: u32) -> NomResult<&Node> {
    net.node(nodei).ok_or_else(|| NomError::NodeIndex(nodei).into())
}

fn aliases_of(net: &Network, original: u32) -> Vec<u32> {
    net.nodes().filter(|(_, n)| n.original() == Some(original)).map(|(i, _)| i).collect()
}

impl<H: History> Store<H> {
    pub(crate) fn node_ref(&self, neti: u32, nodei: u32) -> NomResult<&Node> {
        node_of(self.network(neti)?, nodei)
    }

    pub(crate) fn species_ref(&self, neti: u32, nodei: u32) -> NomResult<&Species> {
        let net = self.network(neti)?;
        node_of(net, nodei)?;
        net.species(nodei).ok_or_else(|| NomError::NodeIndex(nodei).into())
    }

    /// Records a snapshot and applies `f` to the node itself, alias or not.
    fn edit_node(&mut self, neti: u32, nodei: u32, f: impl FnOnce(&mut Node)) -> NomResult<()> {
        self.node_ref(neti, nodei)?;
        self.record();
        if let Some(n) = self.net_mut(neti)?.node_mut(nodei) {
            f(n);
        }
        Ok(())
    }

    /// Records a snapshot and applies `f` to the species behind the node.
    fn edit_species(&mut self, neti: u32, nodei: u32, f: impl FnOnce(&mut Species)) -> NomResult<()> {
        self.species_ref(neti, nodei)?;
        self.record();
        if let Some(s) = self.net_mut(neti)?.species_mut(nodei) {
            f(s);
        }
        Ok(())
    }

    pub fn add_node(&mut self, neti: u32, id: &str, x: f64, y: f64, w: f64, h: f64, floating: bool, locked: bool) -> NomResult<u32> {
        let net = self.network(neti)?;
        if net.nodes().any(|(_, n)| n.species().map_or(false, |s| s.id == id)) {
            return Err(NomError::IdRepeat(id.to_string()).into());
        }
        ensure_id(id)?;
        check_rect(x, y, w, h)?;
        ensure(net.nodes.len() < MAX_NODES, "node count", net.nodes.len() as f64)?;
        let shape = shape::default_shape(&self.config.theme);
        self.record();
        let node = Node {
            position: Vec2::new(x, y),
            rect_size: Vec2::new(w, h),
            locked,
            compartment: None,
            kind: NodeKind::Species(Species {
                id: id.to_string(),
                floating,
                shape_index: 0,
                shape,
                concentration: 0.0,
                name: String::new(),
                sbo: String::new(),
            }),
        };
        Ok(self.net_mut(neti)?.push_node(node))
    }

    /// Adds a second drawing of `original`'s species; aliases of aliases
    /// resolve to the concrete node.
    pub fn add_alias_node(&mut self, neti: u32, original: u32, x: f64, y: f64, w: f64, h: f64) -> NomResult<u32> {
        let net = self.network(neti)?;
        node_of(net, original)?;
        check_rect(x, y, w, h)?;
        ensure(net.nodes.len() < MAX_NODES, "node count", net.nodes.len() as f64)?;
        let concrete = net.concrete_index(original).ok_or(NomError::NodeIndex(original))?;
        let compartment = node_of(net, concrete)?.compartment;
        self.record();
        let node = Node {
            position: Vec2::new(x, y),
            rect_size: Vec2::new(w, h),
            locked: false,
            compartment,
            kind: NodeKind::Alias { original: concrete },
        };
        Ok(self.net_mut(neti)?.push_node(node))
    }

    /// Creates an alias of `nodei` and moves `nodei`'s participation in
    /// reaction `reai` over to it.
    pub fn alias_for_reaction(&mut self, neti: u32, reai: u32, nodei: u32, x: f64, y: f64, w: f64, h: f64) -> NomResult<u32> {
        let net = self.network(neti)?;
        let rea = net.reaction(reai).ok_or(NomError::ReactionIndex(reai))?;
        node_of(net, nodei)?;
        if !rea.reactants.contains_key(&nodei) && !rea.products.contains_key(&nodei) {
            return Err(ValueError::NotInRelation { node: nodei, reaction: reai, role: Role::Reactant }.into());
        }
        self.group(|st| {
            let alias = st.add_alias_node(neti, nodei, x, y, w, h)?;
            let net = st.net_mut(neti)?;
            for role in [Role::Reactant, Role::Product] {
                let moved = net.reaction_mut(reai).and_then(|r| r.side_mut(role).remove(&nodei));
                if let Some(entry) = moved {
                    if let Some(r) = net.reaction_mut(reai) {
                        r.side_mut(role).insert(alias, entry);
                    }
                    net.unlink(role, nodei, reai);
                    net.link(role, alias, reai);
                }
            }
            Ok(alias)
        })
    }

    pub fn get_original_index(&self, neti: u32, nodei: u32) -> NomResult<Option<u32>> {
        Ok(self.node_ref(neti, nodei)?.original())
    }

    /// Deletes a node. A concrete node must be free, and so must each of its
    /// aliases; the aliases go with it. Deleting an alias hands its reaction
    /// entries and modifier references back to the original.
    pub fn delete_node(&mut self, neti: u32, nodei: u32) -> NomResult<()> {
        let net = self.network(neti)?;
        let node = node_of(net, nodei)?;
        match node.kind {
            NodeKind::Species(_) => {
                if !net.is_free(nodei) {
                    return Err(NomError::NodeNotFree(nodei).into());
                }
                if let Some(a) = aliases_of(net, nodei).into_iter().find(|a| !net.is_free(*a)) {
                    return Err(NomError::NodeNotFree(a).into());
                }
            }
            NodeKind::Alias { original } => {
                for role in [Role::Reactant, Role::Product] {
                    let reactions = match role {
                        Role::Reactant => net.src_reactions(nodei),
                        Role::Product => net.dest_reactions(nodei),
                    };
                    for reai in reactions {
                        if let Some(r) = net.reaction(reai) {
                            let mut after = r.clone();
                            if let Some(e) = after.side_mut(role).remove(&nodei) {
                                after.side_mut(role).entry(original).or_insert(e);
                            }
                            if after.sides_identical() {
                                return Err(ValueError::IdenticalSides.into());
                            }
                        }
                    }
                }
            }
        }
        self.record();
        let net = self.net_mut(neti)?;
        if net.node(nodei).and_then(|n| n.species()).is_some() {
            for a in aliases_of(net, nodei) {
                remove_node_slot(net, a);
            }
        }
        remove_node_slot(net, nodei);
        Ok(())
    }

    pub fn get_node_index(&self, neti: u32, id: &str) -> NomResult<u32> {
        self.network(neti)?
            .nodes()
            .find(|(_, n)| n.species().map_or(false, |s| s.id == id))
            .map(|(i, _)| i)
            .ok_or_else(|| NomError::IdNotFound(id.to_string()).into())
    }

    pub fn get_number_of_nodes(&self, neti: u32) -> NomResult<usize> {
        Ok(self.network(neti)?.nodes().count())
    }

    pub fn get_list_of_node_ids(&self, neti: u32) -> NomResult<Vec<String>> {
        Ok(self.network(neti)?.nodes().filter_map(|(_, n)| n.species().map(|s| s.id.clone())).collect())
    }

    pub fn get_list_of_node_indices(&self, neti: u32) -> NomResult<Vec<u32>> {
        Ok(self.network(neti)?.nodes().map(|(i, _)| i).collect())
    }

    pub fn get_src_reactions(&self, neti: u32, nodei: u32) -> NomResult<Vec<u32>> {
        self.node_ref(neti, nodei)?;
        Ok(self.network(neti)?.src_reactions(nodei).into_iter().collect())
    }

    pub fn get_dest_reactions(&self, neti: u32, nodei: u32) -> NomResult<Vec<u32>> {
        self.node_ref(neti, nodei)?;
        Ok(self.network(neti)?.dest_reactions(nodei).into_iter().collect())
    }

    pub fn get_node_center(&self, neti: u32, nodei: u32) -> NomResult<Vec2> {
        Ok(self.node_ref(neti, nodei)?.center().round2())
    }

    /// Position and size, each rounded to two decimals.
    pub fn get_node_coordinate_and_size(&self, neti: u32, nodei: u32) -> NomResult<(Vec2, Vec2)> {
        let n = self.node_ref(neti, nodei)?;
        Ok((n.position.round2(), n.rect_size.round2()))
    }

    pub fn get_node_id(&self, neti: u32, nodei: u32) -> NomResult<String> {
        Ok(self.species_ref(neti, nodei)?.id.clone())
    }

    pub fn set_node_id(&mut self, neti: u32, nodei: u32, id: &str) -> NomResult<()> {
        self.species_ref(neti, nodei)?;
        if let Ok(other) = self.get_node_index(neti, id) {
            if Some(other) != self.network(neti)?.concrete_index(nodei) {
                return Err(NomError::IdRepeat(id.to_string()).into());
            }
        }
        ensure_id(id)?;
        let id = id.to_string();
        self.edit_species(neti, nodei, |s| s.id = id)
    }

    pub fn get_node_name(&self, neti: u32, nodei: u32) -> NomResult<String> {
        Ok(self.species_ref(neti, nodei)?.name.clone())
    }

    pub fn set_node_name(&mut self, neti: u32, nodei: u32, name: &str) -> NomResult<()> {
        let name = name.to_string();
        self.edit_species(neti, nodei, |s| s.name = name)
    }

    pub fn get_node_sbo(&self, neti: u32, nodei: u32) -> NomResult<String> {
        Ok(self.species_ref(neti, nodei)?.sbo.clone())
    }

    pub fn set_node_sbo(&mut self, neti: u32, nodei: u32, sbo: &str) -> NomResult<()> {
        let sbo = sbo.to_string();
        self.edit_species(neti, nodei, |s| s.sbo = sbo)
    }

    pub fn get_node_concentration(&self, neti: u32, nodei: u32) -> NomResult<f64> {
        Ok(self.species_ref(neti, nodei)?.concentration)
    }

    pub fn set_node_concentration(&mut self, neti: u32, nodei: u32, conc: f64) -> NomResult<()> {
        self.species_ref(neti, nodei)?;
        ensure(conc >= 0.0, "concentration", conc)?;
        self.edit_species(neti, nodei, |s| s.concentration = conc)
    }

    pub fn is_floating_node(&self, neti: u32, nodei: u32) -> NomResult<bool> {
        Ok(self.species_ref(neti, nodei)?.floating)
    }

    pub fn is_boundary_node(&self, neti: u32, nodei: u32) -> NomResult<bool> {
        Ok(!self.is_floating_node(neti, nodei)?)
    }

    pub fn set_node_floating_status(&mut self, neti: u32, nodei: u32, floating: bool) -> NomResult<()> {
        self.edit_species(neti, nodei, |s| s.floating = floating)
    }

    pub fn is_node_locked(&self, neti: u32, nodei: u32) -> NomResult<bool> {
        Ok(self.node_ref(neti, nodei)?.locked)
    }

    pub fn set_node_locked_status(&mut self, neti: u32, nodei: u32, locked: bool) -> NomResult<()> {
        self.edit_node(neti, nodei, |n| n.locked = locked)
    }

    /// Moves a node. A locked node is left alone and no undo step is recorded.
    pub fn set_node_coordinate(&mut self, neti: u32, nodei: u32, x: f64, y: f64, allow_negative: bool) -> NomResult<()> {
        self.network(neti)?;
        let lower = if allow_negative { COORD_MIN } else { 0.0 };
        ensure(x >= lower && x <= COORD_MAX, "x", x)?;
        ensure(y >= lower && y <= COORD_MAX, "y", y)?;
        if self.node_ref(neti, nodei)?.locked {
            return Ok(());
        }
        self.edit_node(neti, nodei, |n| n.position = Vec2::new(x, y))
    }

    pub fn set_node_size(&mut self, neti: u32, nodei: u32, w: f64, h: f64) -> NomResult<()> {
        self.node_ref(neti, nodei)?;
        ensure(w > 0.0 && in_size_bounds(w), "w", w)?;
        ensure(h > 0.0 && in_size_bounds(h), "h", h)?;
        self.edit_node(neti, nodei, |n| n.rect_size = Vec2::new(w, h))
    }

    // Style
    pub fn get_node_fill_color(&self, neti: u32, nodei: u32) -> NomResult<Option<Color>> {
        Ok(self.species_ref(neti, nodei)?.shape.fill_color())
    }

    pub fn get_node_fill_color_rgb(&self, neti: u32, nodei: u32) -> NomResult<Option<u32>> {
        Ok(self.get_node_fill_color(neti, nodei)?.map(Color::rgb_packed))
    }

    pub fn get_node_fill_color_alpha(&self, neti: u32, nodei: u32) -> NomResult<Option<f64>> {
        Ok(self.get_node_fill_color(neti, nodei)?.map(Color::alpha_f64))
    }

    /// Recolors every primitive that has a fill, keeping each one's alpha.
    pub fn set_node_fill_color_rgb(&mut self, neti: u32, nodei: u32, r: i32, g: i32, b: i32) -> NomResult<()> {
        self.species_ref(neti, nodei)?;
        let (r, g, b) = Color::checked_rgb(r, g, b)?;
        self.edit_species(neti, nodei, |s| {
            for (p, _) in s.shape.items.iter_mut() {
                if let Some(c) = p.fill_color() {
                    p.set_fill(c.with_rgb(r, g, b));
                }
            }
        })
    }

    pub fn set_node_fill_color_alpha(&mut self, neti: u32, nodei: u32, a: f64) -> NomResult<()> {
        self.species_ref(neti, nodei)?;
        let a = Color::checked_alpha(a)?;
        self.edit_species(neti, nodei, |s| {
            for (p, _) in s.shape.items.iter_mut() {
                if let Some(c) = p.fill_color() {
                    p.set_fill(c.with_alpha(a));
                }
            }
        })
    }

    pub fn get_node_border_color(&self, neti: u32, nodei: u32) -> NomResult<Option<Color>> {
        Ok(self.species_ref(neti, nodei)?.shape.border_color())
    }

    pub fn get_node_border_color_rgb(&self, neti: u32, nodei: u32) -> NomResult<Option<u32>> {
        Ok(self.get_node_border_color(neti, nodei)?.map(Color::rgb_packed))
    }

    pub fn get_node_border_color_alpha(&self, neti: u32, nodei: u32) -> NomResult<Option<f64>> {
        Ok(self.get_node_border_color(neti, nodei)?.map(Color::alpha_f64))
    }

    pub fn set_node_border_color_rgb(&mut self, neti: u32, nodei: u32, r: i32, g: i32, b: i32) -> NomResult<()> {
        self.species_ref(neti, nodei)?;
        let (r, g, b) = Color::checked_rgb(r, g, b)?;
        self.edit_species(neti, nodei, |s| {
            for (p, _) in s.shape.items.iter_mut() {
                let c = p.border_color();
                p.set_border(c.with_rgb(r, g, b));
            }
        })
    }

    pub fn set_node_border_color_alpha(&mut self, neti: u32, nodei: u32, a: f64) -> NomResult<()> {
        self.species_ref(neti, nodei)?;
        let a = Color::checked_alpha(a)?;
        self.edit_species(neti, nodei, |s| {
            for (p, _) in s.shape.items.iter_mut() {
                let c = p.border_color();
                p.set_border(c.with_alpha(a));
            }
        })
    }

    pub fn get_node_border_width(&self, neti: u32, nodei: u32) -> NomResult<Option<f64>> {
        Ok(self.species_ref(neti, nodei)?.shape.border_width())
    }

    pub fn set_node_border_width(&mut self, neti: u32, nodei: u32, width: f64) -> NomResult<()> {
        self.species_ref(neti, nodei)?;
        ensure(width > 0.0, "border width", width)?;
        self.edit_species(neti, nodei, |s| s.shape.set_border_width(width))
    }

    fn text_ref(&self, neti: u32, nodei: u32) -> NomResult<&TextPrim> {
        Ok(&self.species_ref(neti, nodei)?.shape.text_item.0)
    }

    fn edit_text(&mut self, neti: u32, nodei: u32, f: impl FnOnce(&mut TextPrim)) -> NomResult<()> {
        self.edit_species(neti, nodei, |s| f(&mut s.shape.text_item.0))
    }

    pub fn get_node_font_point_size(&self, neti: u32, nodei: u32) -> NomResult<u32> {
        Ok(self.text_ref(neti, nodei)?.font_size)
    }

    pub fn set_node_font_point_size(&mut self, neti: u32, nodei: u32, size: u32) -> NomResult<()> {
        self.species_ref(neti, nodei)?;
        ensure(size > 0, "font size", size as f64)?;
        self.edit_text(neti, nodei, |t| t.font_size = size)
    }

    pub fn get_node_font_family(&self, neti: u32, nodei: u32) -> NomResult<FontFamily> {
        Ok(self.text_ref(neti, nodei)?.font_family)
    }

    pub fn set_node_font_family(&mut self, neti: u32, nodei: u32, family: FontFamily) -> NomResult<()> {
        self.edit_text(neti, nodei, |t| t.font_family = family)
    }

    pub fn get_node_font_style(&self, neti: u32, nodei: u32) -> NomResult<FontStyle> {
        Ok(self.text_ref(neti, nodei)?.font_style)
    }

    pub fn set_node_font_style(&mut self, neti: u32, nodei: u32, style: FontStyle) -> NomResult<()> {
        self.edit_text(neti, nodei, |t| t.font_style = style)
    }

    pub fn get_node_font_weight(&self, neti: u32, nodei: u32) -> NomResult<FontWeight> {
        Ok(self.text_ref(neti, nodei)?.font_weight)
    }

    pub fn set_node_font_weight(&mut self, neti: u32, nodei: u32, weight: FontWeight) -> NomResult<()> {
        self.edit_text(neti, nodei, |t| t.font_weight = weight)
    }

    pub fn get_node_font_color(&self, neti: u32, nodei: u32) -> NomResult<Color> {
        Ok(self.text_ref(neti, nodei)?.font_color)
    }

    pub fn set_node_font_color_rgb(&mut self, neti: u32, nodei: u32, r: i32, g: i32, b: i32) -> NomResult<()> {
        self.species_ref(neti, nodei)?;
        let (r, g, b) = Color::checked_rgb(r, g, b)?;
        self.edit_text(neti, nodei, |t| t.font_color = t.font_color.with_rgb(r, g, b))
    }

    pub fn set_node_font_color_alpha(&mut self, neti: u32, nodei: u32, a: f64) -> NomResult<()> {
        self.species_ref(neti, nodei)?;
        let a = Color::checked_alpha(a)?;
        self.edit_text(neti, nodei, |t| t.font_color = t.font_color.with_alpha(a))
    }

    // Shapes
    pub fn get_list_of_composite_shapes(&self) -> Vec<CompositeShape> {
        shape::builtin_shapes(&self.config.theme)
    }

    pub fn get_composite_shape_at(&self, shapei: usize) -> NomResult<CompositeShape> {
        shape::builtin_shape(&self.config.theme, shapei).ok_or_else(|| ValueError::UnknownShape(shapei).into())
    }

    pub fn get_node_shape(&self, neti: u32, nodei: u32) -> NomResult<CompositeShape> {
        Ok(self.species_ref(neti, nodei)?.shape.clone())
    }

    pub fn get_node_shape_index(&self, neti: u32, nodei: u32) -> NomResult<usize> {
        Ok(self.species_ref(neti, nodei)?.shape_index)
    }

    /// Swaps in built-in shape `shapei`. With `preserve_common_fields` the
    /// old fill and border carry over when both shapes have as many items.
    pub fn set_node_shape_index(&mut self, neti: u32, nodei: u32, shapei: usize, preserve_common_fields: bool) -> NomResult<()> {
        let old = &self.species_ref(neti, nodei)?.shape;
        let mut shape = self.get_composite_shape_at(shapei)?;
        if preserve_common_fields {
            shape.inherit_style(old);
        }
        self.edit_species(neti, nodei, |s| {
            s.shape_index = shapei;
            s.shape = shape;
        })
    }

    /// Sets one property of primitive `prim_index` (-1 for the text item).
    pub fn set_node_primitive_property(&mut self, neti: u32, nodei: u32, prim_index: i32, property: &str, value: &PropertyValue) -> NomResult<()> {
        let mut shape = self.species_ref(neti, nodei)?.shape.clone();
        let item = shape.item_mut(prim_index)?;
        let prop: PrimitiveProperty = property.parse().map_err(|_| ValueError::UnsupportedProperty {
            property: property.to_string(),
            primitive: item.kind_name(),
        })?;
        item.set_property(prop, value)?;
        self.edit_species(neti, nodei, |s| s.shape = shape)
    }
}

/// Unlinks a node from its container, from modifier sets and, for an alias,
/// hands its reaction entries back to the original. Callers have validated.
fn remove_node_slot(net: &mut Network, nodei: u32) {
    let Some(node) = net.nodes.get_mut(nodei as usize).and_then(|n| n.take()) else {
        return;
    };
    match node.compartment {
        None => {
            net.base_nodes.remove(&nodei);
        }
        Some(c) => {
            if let Some(comp) = net.compartment_mut(c) {
                comp.nodes.remove(&nodei);
            }
        }
    }
    let original = node.original();
    let reaction_ids: Vec<u32> = net.reactions().map(|(i, _)| i).collect();
    for reai in reaction_ids {
        let mut moved = Vec::new();
        if let Some(r) = net.reaction_mut(reai) {
            if r.modifiers.remove(&nodei) {
                if let Some(o) = original {
                    r.modifiers.insert(o);
                }
            }
            if let Some(o) = original {
                for role in [Role::Reactant, Role::Product] {
                    if let Some(e) = r.side_mut(role).remove(&nodei) {
                        r.side_mut(role).entry(o).or_insert(e);
                        moved.push((role, o));
                    }
                }
            }
        }
        for (role, o) in moved {
            net.unlink(role, nodei, reai);
            net.link(role, o, reai);
        }
    }
}
