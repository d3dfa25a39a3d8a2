use crate::error::{NomResult, ValueError};
use crate::history::History;
use crate::model::{Network, Role};
use crate::Store;
use std::collections::{BTreeMap, BTreeSet};

fn fail(msg: String) -> crate::error::Error {
    ValueError::Inconsistent(msg).into()
}

fn unique<'a>(ids: impl Iterator<Item = &'a str>, what: &str, net: &str) -> NomResult<()> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(fail(format!("{}: duplicate {} id '{}'", net, what, id)));
        }
    }
    Ok(())
}

fn check_network(net: &Network) -> NomResult<()> {
    let name = net.id.as_str();
    unique(net.nodes().filter_map(|(_, n)| n.species()).map(|s| s.id.as_str()), "node", name)?;
    unique(net.reactions().map(|(_, r)| r.id.as_str()), "reaction", name)?;
    unique(net.compartments().map(|(_, c)| c.id.as_str()), "compartment", name)?;

    for (i, n) in net.nodes() {
        if let Some(orig) = n.original() {
            if net.node(orig).and_then(|o| o.species()).is_none() {
                return Err(fail(format!("{}: alias {} points at {}", name, i, orig)));
            }
        }
        let member = match n.compartment {
            None => net.base_nodes.contains(&i),
            Some(c) => net.compartment(c).map_or(false, |comp| comp.nodes.contains(&i)),
        };
        if !member {
            return Err(fail(format!("{}: node {} missing from its compartment", name, i)));
        }
    }
    let listed = net.base_nodes.len() + net.compartments().map(|(_, c)| c.nodes.len()).sum::<usize>();
    if listed != net.nodes().count() {
        return Err(fail(format!("{}: {} memberships for {} nodes", name, listed, net.nodes().count())));
    }

    let mut src: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
    let mut dest: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
    for (ri, r) in net.reactions() {
        if r.reactants.is_empty() || r.products.is_empty() || r.sides_identical() {
            return Err(fail(format!("{}: reaction {} has bad sides", name, ri)));
        }
        for role in [Role::Reactant, Role::Product] {
            for (ni, sn) in r.side(role) {
                if net.node(*ni).is_none() || !(sn.stoich > 0.0) {
                    return Err(fail(format!("{}: reaction {} has bad participant {}", name, ri, ni)));
                }
                let map = if role == Role::Reactant { &mut src } else { &mut dest };
                map.entry(*ni).or_default().insert(ri);
            }
        }
        if let Some(m) = r.modifiers.iter().find(|m| net.node(**m).is_none()) {
            return Err(fail(format!("{}: reaction {} has missing modifier {}", name, ri, m)));
        }
    }
    if src != net.src_map || dest != net.dest_map {
        return Err(fail(format!("{}: reaction maps out of sync", name)));
    }
    Ok(())
}

impl<H: History> Store<H> {
    /// Checks the cross-structure invariants of every network.
    pub fn validate_state(&self) -> NomResult<()> {
        unique(self.nets.iter().map(|(_, n)| n.id.as_str()), "network", "store")?;
        for (_, net) in self.nets.iter() {
            check_network(net)?;
        }
        Ok(())
    }
}
