use crate::error::{ensure, ensure_id, NomError, NomResult, ValueError};
use crate::geometry::limits::{in_coord_bounds, MAX_PARTICIPANTS, MAX_REACTIONS};
use crate::geometry::rect::{compute_centroid, Rect};
use crate::history::History;
use crate::model::{Color, Network, Reaction, Role, SpeciesNode, TipStyle, Vec2};
use crate::Store;
use std::collections::BTreeSet;

fn reaction_of(net: &Network, reai: u32) -> NomResult<&Reaction> {
    net.reaction(reai).ok_or_else(|| NomError::ReactionIndex(reai).into())
}

fn check_point(p: Vec2) -> NomResult<()> {
    ensure(in_coord_bounds(p.x), "x", p.x)?;
    ensure(in_coord_bounds(p.y), "y", p.y)
}

/// Rectangles of every participant, reactants first, in index order.
pub(crate) fn participant_rects(net: &Network, rea: &Reaction) -> Vec<Rect> {
    rea.reactants
        .keys()
        .chain(rea.products.keys())
        .filter_map(|i| net.node(*i).map(|n| n.rect()))
        .collect()
}

/// The explicit center if set, otherwise the centroid of the participants.
pub(crate) fn real_center(net: &Network, rea: &Reaction) -> Option<Vec2> {
    rea.center_pos.or_else(|| compute_centroid(&participant_rects(net, rea)))
}

/// Places each species handle halfway between its node and the reaction
/// center, and the centroid handle halfway toward the first reactant.
pub(crate) fn apply_default_handles(net: &Network, rea: &mut Reaction) {
    let Some(center) = real_center(net, rea) else {
        return;
    };
    let node_center = |i: &u32| net.node(*i).map(|n| n.center());
    if let Some(first) = rea.reactants.keys().next().and_then(node_center) {
        rea.center_handle_pos = (first + center) * 0.5;
    }
    for (i, sn) in rea.reactants.iter_mut().chain(rea.products.iter_mut()) {
        if let Some(c) = node_center(i) {
            sn.handle_pos = (c + center) * 0.5;
        }
    }
}

impl<H: History> Store<H> {
    pub(crate) fn reaction_ref(&self, neti: u32, reai: u32) -> NomResult<&Reaction> {
        reaction_of(self.network(neti)?, reai)
    }

    fn edit_reaction(&mut self, neti: u32, reai: u32, f: impl FnOnce(&mut Reaction)) -> NomResult<()> {
        self.reaction_ref(neti, reai)?;
        self.record();
        if let Some(r) = self.net_mut(neti)?.reaction_mut(reai) {
            f(r);
        }
        Ok(())
    }

    /// Checks net, reaction, node, then membership of `nodei` on `role`'s side.
    fn species_node_ref(&self, neti: u32, reai: u32, nodei: u32, role: Role) -> NomResult<&SpeciesNode> {
        let net = self.network(neti)?;
        let rea = reaction_of(net, reai)?;
        net.node(nodei).ok_or(NomError::NodeIndex(nodei))?;
        rea.side(role)
            .get(&nodei)
            .ok_or_else(|| ValueError::NotInRelation { node: nodei, reaction: reai, role }.into())
    }

    fn edit_species_node(&mut self, neti: u32, reai: u32, nodei: u32, role: Role, f: impl FnOnce(&mut SpeciesNode)) -> NomResult<()> {
        self.species_node_ref(neti, reai, nodei, role)?;
        self.record();
        if let Some(sn) = self.net_mut(neti)?.reaction_mut(reai).and_then(|r| r.side_mut(role).get_mut(&nodei)) {
            f(sn);
        }
        Ok(())
    }

    /// Creates a reaction with unit stoichiometries and default handles.
    pub fn create_reaction(&mut self, neti: u32, id: &str, sources: &[u32], targets: &[u32]) -> NomResult<u32> {
        if sources.is_empty() || targets.is_empty() {
            return Err(ValueError::EmptySide.into());
        }
        let net = self.network(neti)?;
        if net.reactions().any(|(_, r)| r.id == id) {
            return Err(NomError::IdRepeat(id.to_string()).into());
        }
        ensure_id(id)?;
        if let Some(missing) = sources.iter().chain(targets).find(|i| net.node(**i).is_none()) {
            return Err(NomError::NodeIndex(*missing).into());
        }
        let src: BTreeSet<u32> = sources.iter().copied().collect();
        let dest: BTreeSet<u32> = targets.iter().copied().collect();
        if src == dest {
            return Err(ValueError::IdenticalSides.into());
        }
        ensure(net.reactions.len() < MAX_REACTIONS, "reaction count", net.reactions.len() as f64)?;
        ensure(src.len().max(dest.len()) <= MAX_PARTICIPANTS, "participants", src.len().max(dest.len()) as f64)?;

        let mut rea = Reaction::new(id);
        rea.reactants = src.into_iter().map(|i| (i, SpeciesNode::new(1.0))).collect();
        rea.products = dest.into_iter().map(|i| (i, SpeciesNode::new(1.0))).collect();
        apply_default_handles(net, &mut rea);
        self.record();
        Ok(self.net_mut(neti)?.push_reaction(rea))
    }

    pub fn delete_reaction(&mut self, neti: u32, reai: u32) -> NomResult<()> {
        self.reaction_ref(neti, reai)?;
        self.record();
        let net = self.net_mut(neti)?;
        if let Some(rea) = net.reactions.get_mut(reai as usize).and_then(|r| r.take()) {
            for src in rea.reactants.keys() {
                net.unlink(Role::Reactant, *src, reai);
            }
            for dest in rea.products.keys() {
                net.unlink(Role::Product, *dest, reai);
            }
        }
        Ok(())
    }

    /// Removes every reaction of the network; indices keep counting up.
    pub fn clear_reactions(&mut self, neti: u32) -> NomResult<()> {
        self.network(neti)?;
        self.record();
        let net = self.net_mut(neti)?;
        net.reactions.iter_mut().for_each(|r| *r = None);
        net.src_map.clear();
        net.dest_map.clear();
        Ok(())
    }

    pub fn get_reaction_index(&self, neti: u32, id: &str) -> NomResult<u32> {
        self.network(neti)?
            .reactions()
            .find(|(_, r)| r.id == id)
            .map(|(i, _)| i)
            .ok_or_else(|| NomError::IdNotFound(id.to_string()).into())
    }

    pub fn get_number_of_reactions(&self, neti: u32) -> NomResult<usize> {
        Ok(self.network(neti)?.reactions().count())
    }

    pub fn get_reaction_id(&self, neti: u32, reai: u32) -> NomResult<String> {
        Ok(self.reaction_ref(neti, reai)?.id.clone())
    }

    pub fn set_reaction_id(&mut self, neti: u32, reai: u32, id: &str) -> NomResult<()> {
        self.reaction_ref(neti, reai)?;
        if let Ok(other) = self.get_reaction_index(neti, id) {
            if other != reai {
                return Err(NomError::IdRepeat(id.to_string()).into());
            }
        }
        ensure_id(id)?;
        let id = id.to_string();
        self.edit_reaction(neti, reai, |r| r.id = id)
    }

    pub fn get_list_of_reaction_ids(&self, neti: u32) -> NomResult<Vec<String>> {
        Ok(self.network(neti)?.reactions().map(|(_, r)| r.id.clone()).collect())
    }

    pub fn get_list_of_reaction_indices(&self, neti: u32) -> NomResult<Vec<u32>> {
        Ok(self.network(neti)?.reactions().map(|(i, _)| i).collect())
    }

    // Participants
    pub fn get_number_of_src_nodes(&self, neti: u32, reai: u32) -> NomResult<usize> {
        Ok(self.reaction_ref(neti, reai)?.reactants.len())
    }

    pub fn get_number_of_dest_nodes(&self, neti: u32, reai: u32) -> NomResult<usize> {
        Ok(self.reaction_ref(neti, reai)?.products.len())
    }

    pub fn get_list_of_reaction_src_nodes(&self, neti: u32, reai: u32) -> NomResult<Vec<u32>> {
        Ok(self.reaction_ref(neti, reai)?.reactants.keys().copied().collect())
    }

    pub fn get_list_of_reaction_dest_nodes(&self, neti: u32, reai: u32) -> NomResult<Vec<u32>> {
        Ok(self.reaction_ref(neti, reai)?.products.keys().copied().collect())
    }

    pub fn get_list_of_reaction_src_stoich(&self, neti: u32, reai: u32) -> NomResult<Vec<f64>> {
        Ok(self.reaction_ref(neti, reai)?.reactants.values().map(|s| s.stoich).collect())
    }

    pub fn get_list_of_reaction_dest_stoich(&self, neti: u32, reai: u32) -> NomResult<Vec<f64>> {
        Ok(self.reaction_ref(neti, reai)?.products.values().map(|s| s.stoich).collect())
    }

    pub fn add_src_node(&mut self, neti: u32, reai: u32, nodei: u32, stoich: f64) -> NomResult<()> {
        self.add_participant(neti, reai, nodei, stoich, Role::Reactant)
    }

    pub fn add_dest_node(&mut self, neti: u32, reai: u32, nodei: u32, stoich: f64) -> NomResult<()> {
        self.add_participant(neti, reai, nodei, stoich, Role::Product)
    }

    fn add_participant(&mut self, neti: u32, reai: u32, nodei: u32, stoich: f64, role: Role) -> NomResult<()> {
        let net = self.network(neti)?;
        let rea = reaction_of(net, reai)?;
        let node = net.node(nodei).ok_or(NomError::NodeIndex(nodei))?;
        if !(stoich > 0.0) || !stoich.is_finite() {
            return Err(NomError::Stoich(stoich).into());
        }
        if rea.side(role).contains_key(&nodei) {
            return Err(NomError::IdRepeat(nodei.to_string()).into());
        }
        ensure(rea.side(role).len() < MAX_PARTICIPANTS, "participants", rea.side(role).len() as f64)?;
        let mut after = rea.clone();
        let mut entry = SpeciesNode::new(stoich);
        if let Some(center) = real_center(net, rea) {
            entry.handle_pos = (node.center() + center) * 0.5;
        }
        after.side_mut(role).insert(nodei, entry);
        if after.sides_identical() {
            return Err(ValueError::IdenticalSides.into());
        }
        self.record();
        let net = self.net_mut(neti)?;
        if let Some(r) = net.reaction_mut(reai) {
            *r = after;
        }
        net.link(role, nodei, reai);
        Ok(())
    }

    pub fn delete_src_node(&mut self, neti: u32, reai: u32, nodei: u32) -> NomResult<()> {
        self.remove_participant(neti, reai, nodei, Role::Reactant)
    }

    pub fn delete_dest_node(&mut self, neti: u32, reai: u32, nodei: u32) -> NomResult<()> {
        self.remove_participant(neti, reai, nodei, Role::Product)
    }

    fn remove_participant(&mut self, neti: u32, reai: u32, nodei: u32, role: Role) -> NomResult<()> {
        let rea = self.reaction_ref(neti, reai)?;
        if !rea.side(role).contains_key(&nodei) {
            return Err(NomError::IdNotFound(nodei.to_string()).into());
        }
        let mut after = rea.clone();
        after.side_mut(role).remove(&nodei);
        if after.side(role).is_empty() {
            return Err(ValueError::EmptySide.into());
        }
        if after.sides_identical() {
            return Err(ValueError::IdenticalSides.into());
        }
        self.record();
        let net = self.net_mut(neti)?;
        if let Some(r) = net.reaction_mut(reai) {
            *r = after;
        }
        net.unlink(role, nodei, reai);
        Ok(())
    }

    // Stoichiometry and handles
    pub fn get_reaction_src_node_stoich(&self, neti: u32, reai: u32, nodei: u32) -> NomResult<f64> {
        Ok(self.species_node_ref(neti, reai, nodei, Role::Reactant)?.stoich)
    }

    pub fn get_reaction_dest_node_stoich(&self, neti: u32, reai: u32, nodei: u32) -> NomResult<f64> {
        Ok(self.species_node_ref(neti, reai, nodei, Role::Product)?.stoich)
    }

    pub fn set_reaction_src_node_stoich(&mut self, neti: u32, reai: u32, nodei: u32, stoich: f64) -> NomResult<()> {
        self.set_stoich(neti, reai, nodei, stoich, Role::Reactant)
    }

    pub fn set_reaction_dest_node_stoich(&mut self, neti: u32, reai: u32, nodei: u32, stoich: f64) -> NomResult<()> {
        self.set_stoich(neti, reai, nodei, stoich, Role::Product)
    }

    fn set_stoich(&mut self, neti: u32, reai: u32, nodei: u32, stoich: f64, role: Role) -> NomResult<()> {
        self.species_node_ref(neti, reai, nodei, role)?;
        if !(stoich > 0.0) || !stoich.is_finite() {
            return Err(NomError::Stoich(stoich).into());
        }
        self.edit_species_node(neti, reai, nodei, role, |sn| sn.stoich = stoich)
    }

    pub fn get_reaction_src_node_handle_position(&self, neti: u32, reai: u32, nodei: u32) -> NomResult<Vec2> {
        Ok(self.species_node_ref(neti, reai, nodei, Role::Reactant)?.handle_pos.round2())
    }

    pub fn get_reaction_dest_node_handle_position(&self, neti: u32, reai: u32, nodei: u32) -> NomResult<Vec2> {
        Ok(self.species_node_ref(neti, reai, nodei, Role::Product)?.handle_pos.round2())
    }

    pub fn set_reaction_src_node_handle_position(&mut self, neti: u32, reai: u32, nodei: u32, pos: Vec2) -> NomResult<()> {
        self.set_handle(neti, reai, nodei, pos, Role::Reactant)
    }

    pub fn set_reaction_dest_node_handle_position(&mut self, neti: u32, reai: u32, nodei: u32, pos: Vec2) -> NomResult<()> {
        self.set_handle(neti, reai, nodei, pos, Role::Product)
    }

    pub(crate) fn set_handle(&mut self, neti: u32, reai: u32, nodei: u32, pos: Vec2, role: Role) -> NomResult<()> {
        self.species_node_ref(neti, reai, nodei, role)?;
        check_point(pos)?;
        self.edit_species_node(neti, reai, nodei, role, |sn| sn.handle_pos = pos)
    }

    /// Default handle layout: the centroid handle, then reactant handles,
    /// then product handles, each side in node index order.
    pub fn default_handle_positions(&self, neti: u32, reai: u32) -> NomResult<Vec<Vec2>> {
        let net = self.network(neti)?;
        let mut rea = reaction_of(net, reai)?.clone();
        apply_default_handles(net, &mut rea);
        Ok(handle_list(&rea))
    }

    /// Applies a list laid out like [`Store::default_handle_positions`] as one undo step.
    pub fn set_reaction_handle_positions(&mut self, neti: u32, reai: u32, positions: &[Vec2]) -> NomResult<()> {
        let rea = self.reaction_ref(neti, reai)?;
        let expected = 1 + rea.reactants.len() + rea.products.len();
        if positions.len() != expected {
            return Err(ValueError::OutOfRange { param: "handle count", got: positions.len() as f64 }.into());
        }
        for p in positions {
            check_point(*p)?;
        }
        self.edit_reaction(neti, reai, |r| {
            let mut it = positions.iter().copied();
            if let Some(c) = it.next() {
                r.center_handle_pos = c;
            }
            for (sn, p) in r.reactants.values_mut().chain(r.products.values_mut()).zip(it) {
                sn.handle_pos = p;
            }
        })
    }

    // Attributes
    pub fn get_reaction_rate_law(&self, neti: u32, reai: u32) -> NomResult<String> {
        Ok(self.reaction_ref(neti, reai)?.rate_law.clone())
    }

    pub fn set_rate_law(&mut self, neti: u32, reai: u32, rate_law: &str) -> NomResult<()> {
        let rate_law = rate_law.to_string();
        self.edit_reaction(neti, reai, |r| r.rate_law = rate_law)
    }

    pub fn get_reaction_center_pos(&self, neti: u32, reai: u32) -> NomResult<Option<Vec2>> {
        Ok(self.reaction_ref(neti, reai)?.center_pos)
    }

    /// `None` returns the reaction to its computed centroid.
    pub fn set_reaction_center_pos(&mut self, neti: u32, reai: u32, pos: Option<Vec2>) -> NomResult<()> {
        self.reaction_ref(neti, reai)?;
        if let Some(p) = pos {
            check_point(p)?;
        }
        self.edit_reaction(neti, reai, |r| r.center_pos = pos)
    }

    pub fn get_reaction_center_handle_position(&self, neti: u32, reai: u32) -> NomResult<Vec2> {
        Ok(self.reaction_ref(neti, reai)?.center_handle_pos.round2())
    }

    pub fn set_reaction_center_handle_position(&mut self, neti: u32, reai: u32, pos: Vec2) -> NomResult<()> {
        self.reaction_ref(neti, reai)?;
        check_point(pos)?;
        self.edit_reaction(neti, reai, |r| r.center_handle_pos = pos)
    }

    pub fn get_reaction_fill_color(&self, neti: u32, reai: u32) -> NomResult<Color> {
        Ok(self.reaction_ref(neti, reai)?.fill_color)
    }

    pub fn get_reaction_fill_color_rgb(&self, neti: u32, reai: u32) -> NomResult<u32> {
        Ok(self.get_reaction_fill_color(neti, reai)?.rgb_packed())
    }

    pub fn get_reaction_fill_color_alpha(&self, neti: u32, reai: u32) -> NomResult<f64> {
        Ok(self.get_reaction_fill_color(neti, reai)?.alpha_f64())
    }

    pub fn set_reaction_fill_color_rgb(&mut self, neti: u32, reai: u32, r: i32, g: i32, b: i32) -> NomResult<()> {
        self.reaction_ref(neti, reai)?;
        let (r, g, b) = Color::checked_rgb(r, g, b)?;
        self.edit_reaction(neti, reai, |rea| rea.fill_color = rea.fill_color.with_rgb(r, g, b))
    }

    pub fn set_reaction_fill_color_alpha(&mut self, neti: u32, reai: u32, a: f64) -> NomResult<()> {
        self.reaction_ref(neti, reai)?;
        let a = Color::checked_alpha(a)?;
        self.edit_reaction(neti, reai, |rea| rea.fill_color = rea.fill_color.with_alpha(a))
    }

    pub fn get_reaction_line_thickness(&self, neti: u32, reai: u32) -> NomResult<f64> {
        Ok(self.reaction_ref(neti, reai)?.thickness)
    }

    pub fn set_reaction_line_thickness(&mut self, neti: u32, reai: u32, thickness: f64) -> NomResult<()> {
        self.reaction_ref(neti, reai)?;
        ensure(thickness > 0.0, "thickness", thickness)?;
        self.edit_reaction(neti, reai, |r| r.thickness = thickness)
    }

    pub fn get_reaction_bezier_curves(&self, neti: u32, reai: u32) -> NomResult<bool> {
        Ok(self.reaction_ref(neti, reai)?.bezier_curves)
    }

    pub fn set_reaction_bezier_curves(&mut self, neti: u32, reai: u32, bezier: bool) -> NomResult<()> {
        self.edit_reaction(neti, reai, |r| r.bezier_curves = bezier)
    }

    pub fn get_reaction_modifiers(&self, neti: u32, reai: u32) -> NomResult<Vec<u32>> {
        Ok(self.reaction_ref(neti, reai)?.modifiers.iter().copied().collect())
    }

    pub fn set_reaction_modifiers(&mut self, neti: u32, reai: u32, modifiers: &[u32]) -> NomResult<()> {
        let net = self.network(neti)?;
        reaction_of(net, reai)?;
        if let Some(missing) = modifiers.iter().find(|i| net.node(**i).is_none()) {
            return Err(NomError::NodeIndex(*missing).into());
        }
        let set: BTreeSet<u32> = modifiers.iter().copied().collect();
        self.edit_reaction(neti, reai, |r| r.modifiers = set)
    }

    pub fn get_modifier_tip_style(&self, neti: u32, reai: u32) -> NomResult<TipStyle> {
        Ok(self.reaction_ref(neti, reai)?.tip_style)
    }

    pub fn set_modifier_tip_style(&mut self, neti: u32, reai: u32, style: TipStyle) -> NomResult<()> {
        self.edit_reaction(neti, reai, |r| r.tip_style = style)
    }

    // Composite constructors, each one undo step.
    pub fn create_uni_uni(&mut self, neti: u32, id: &str, rate_law: &str, src: u32, dest: u32, src_stoich: f64, dest_stoich: f64) -> NomResult<u32> {
        self.create_with_stoich(neti, id, rate_law, &[(src, src_stoich)], &[(dest, dest_stoich)])
    }

    pub fn create_uni_bi(&mut self, neti: u32, id: &str, rate_law: &str, src: u32, dest1: u32, dest2: u32, src_stoich: f64, dest1_stoich: f64, dest2_stoich: f64) -> NomResult<u32> {
        self.create_with_stoich(neti, id, rate_law, &[(src, src_stoich)], &[(dest1, dest1_stoich), (dest2, dest2_stoich)])
    }

    pub fn create_bi_uni(&mut self, neti: u32, id: &str, rate_law: &str, src1: u32, src2: u32, dest: u32, src1_stoich: f64, src2_stoich: f64, dest_stoich: f64) -> NomResult<u32> {
        self.create_with_stoich(neti, id, rate_law, &[(src1, src1_stoich), (src2, src2_stoich)], &[(dest, dest_stoich)])
    }

    pub fn create_bi_bi(&mut self, neti: u32, id: &str, rate_law: &str, src1: u32, src2: u32, dest1: u32, dest2: u32, src1_stoich: f64, src2_stoich: f64, dest1_stoich: f64, dest2_stoich: f64) -> NomResult<u32> {
        self.create_with_stoich(
            neti,
            id,
            rate_law,
            &[(src1, src1_stoich), (src2, src2_stoich)],
            &[(dest1, dest1_stoich), (dest2, dest2_stoich)],
        )
    }

    // Rate-law parameters
    pub fn set_parameter(&mut self, neti: u32, name: &str, value: f64) -> NomResult<()> {
        self.network(neti)?;
        ensure(value.is_finite(), "parameter", value)?;
        self.record();
        self.net_mut(neti)?.parameters.insert(name.to_string(), value);
        Ok(())
    }

    /// Unknown names are ignored and leave the history untouched.
    pub fn remove_parameter(&mut self, neti: u32, name: &str) -> NomResult<()> {
        if !self.network(neti)?.parameters.contains_key(name) {
            return Ok(());
        }
        self.record();
        self.net_mut(neti)?.parameters.remove(name);
        Ok(())
    }

    pub fn get_parameters(&self, neti: u32) -> NomResult<Vec<(String, f64)>> {
        Ok(self.network(neti)?.parameters().iter().map(|(k, v)| (k.clone(), *v)).collect())
    }

    fn create_with_stoich(&mut self, neti: u32, id: &str, rate_law: &str, srcs: &[(u32, f64)], dests: &[(u32, f64)]) -> NomResult<u32> {
        let sources: Vec<u32> = srcs.iter().map(|(i, _)| *i).collect();
        let targets: Vec<u32> = dests.iter().map(|(i, _)| *i).collect();
        self.group(|st| {
            st.create_reaction(neti, id, &sources, &targets)?;
            let reai = st.get_reaction_index(neti, id)?;
            for (i, s) in srcs {
                st.set_reaction_src_node_stoich(neti, reai, *i, *s)?;
            }
            for (i, s) in dests {
                st.set_reaction_dest_node_stoich(neti, reai, *i, *s)?;
            }
            st.set_rate_law(neti, reai, rate_law)?;
            Ok(reai)
        })
    }
}

pub(crate) fn handle_list(rea: &Reaction) -> Vec<Vec2> {
    std::iter::once(rea.center_handle_pos)
        .chain(rea.reactants.values().chain(rea.products.values()).map(|s| s.handle_pos))
        .collect()
}
