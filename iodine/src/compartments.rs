use crate::error::{ensure, ensure_id, NomError, NomResult};
use crate::geometry::limits::{in_coord_bounds, in_size_bounds, MAX_COMPARTMENTS};
use crate::history::History;
use crate::model::{Color, Compartment, Network, Vec2};
use crate::Store;

fn compartment_of(net: &Network, compi: u32) -> NomResult<&Compartment> {
    net.compartment(compi).ok_or_else(|| NomError::CompartmentIndex(compi).into())
}

fn check_position(x: f64, y: f64) -> NomResult<()> {
    ensure(x >= 0.0 && in_coord_bounds(x), "x", x)?;
    ensure(y >= 0.0 && in_coord_bounds(y), "y", y)
}

fn check_size(w: f64, h: f64) -> NomResult<()> {
    ensure(in_size_bounds(w), "w", w)?;
    ensure(in_size_bounds(h), "h", h)
}

impl<H: History> Store<H> {
    fn compartment_ref(&self, neti: u32, compi: u32) -> NomResult<&Compartment> {
        compartment_of(self.network(neti)?, compi)
    }

    fn edit_compartment(&mut self, neti: u32, compi: u32, f: impl FnOnce(&mut Compartment)) -> NomResult<()> {
        self.compartment_ref(neti, compi)?;
        self.record();
        if let Some(c) = self.net_mut(neti)?.compartment_mut(compi) {
            f(c);
        }
        Ok(())
    }

    pub fn add_compartment(&mut self, neti: u32, id: &str, x: f64, y: f64, w: f64, h: f64) -> NomResult<u32> {
        check_position(x, y)?;
        check_size(w, h)?;
        let net = self.network(neti)?;
        if net.compartments().any(|(_, c)| c.id == id) {
            return Err(NomError::IdRepeat(id.to_string()).into());
        }
        ensure_id(id)?;
        ensure(net.compartments.len() < MAX_COMPARTMENTS, "compartment count", net.compartments.len() as f64)?;
        self.record();
        let comp = Compartment::new(id, Vec2::new(x, y), Vec2::new(w, h));
        Ok(self.net_mut(neti)?.push_compartment(comp))
    }

    /// Deletes a compartment; its member nodes return to the base compartment.
    pub fn delete_compartment(&mut self, neti: u32, compi: u32) -> NomResult<()> {
        self.compartment_ref(neti, compi)?;
        self.record();
        let net = self.net_mut(neti)?;
        if let Some(comp) = net.compartments.get_mut(compi as usize).and_then(|c| c.take()) {
            for nodei in comp.nodes {
                if let Some(n) = net.node_mut(nodei) {
                    n.compartment = None;
                }
                net.base_nodes.insert(nodei);
            }
        }
        Ok(())
    }

    pub fn get_list_of_compartment_indices(&self, neti: u32) -> NomResult<Vec<u32>> {
        Ok(self.network(neti)?.compartments().map(|(i, _)| i).collect())
    }

    /// Members of `compi`, or of the base compartment when `None`.
    pub fn get_nodes_in_compartment(&self, neti: u32, compi: Option<u32>) -> NomResult<Vec<u32>> {
        let net = self.network(neti)?;
        match compi {
            None => Ok(net.base_nodes.iter().copied().collect()),
            Some(c) => Ok(compartment_of(net, c)?.nodes.iter().copied().collect()),
        }
    }

    pub fn get_compartment_of_node(&self, neti: u32, nodei: u32) -> NomResult<Option<u32>> {
        Ok(self.node_ref(neti, nodei)?.compartment)
    }

    pub fn set_compartment_of_node(&mut self, neti: u32, nodei: u32, compi: Option<u32>) -> NomResult<()> {
        let net = self.network(neti)?;
        let old = self.node_ref(neti, nodei)?.compartment;
        if let Some(c) = compi {
            compartment_of(net, c)?;
        }
        self.record();
        let net = self.net_mut(neti)?;
        match old {
            None => {
                net.base_nodes.remove(&nodei);
            }
            Some(c) => {
                if let Some(comp) = net.compartment_mut(c) {
                    comp.nodes.remove(&nodei);
                }
            }
        }
        match compi {
            None => {
                net.base_nodes.insert(nodei);
            }
            Some(c) => {
                if let Some(comp) = net.compartment_mut(c) {
                    comp.nodes.insert(nodei);
                }
            }
        }
        if let Some(n) = net.node_mut(nodei) {
            n.compartment = compi;
        }
        Ok(())
    }

    pub fn get_compartment_position(&self, neti: u32, compi: u32) -> NomResult<Vec2> {
        Ok(self.compartment_ref(neti, compi)?.position)
    }

    pub fn set_compartment_position(&mut self, neti: u32, compi: u32, x: f64, y: f64) -> NomResult<()> {
        check_position(x, y)?;
        self.edit_compartment(neti, compi, |c| c.position = Vec2::new(x, y))
    }

    pub fn get_compartment_size(&self, neti: u32, compi: u32) -> NomResult<Vec2> {
        Ok(self.compartment_ref(neti, compi)?.rect_size)
    }

    pub fn set_compartment_size(&mut self, neti: u32, compi: u32, w: f64, h: f64) -> NomResult<()> {
        check_size(w, h)?;
        self.edit_compartment(neti, compi, |c| c.rect_size = Vec2::new(w, h))
    }

    pub fn get_compartment_volume(&self, neti: u32, compi: u32) -> NomResult<f64> {
        Ok(self.compartment_ref(neti, compi)?.volume)
    }

    pub fn set_compartment_volume(&mut self, neti: u32, compi: u32, volume: f64) -> NomResult<()> {
        ensure(volume >= 0.0, "volume", volume)?;
        self.edit_compartment(neti, compi, |c| c.volume = volume)
    }

    pub fn get_compartment_id(&self, neti: u32, compi: u32) -> NomResult<String> {
        Ok(self.compartment_ref(neti, compi)?.id.clone())
    }

    pub fn set_compartment_id(&mut self, neti: u32, compi: u32, id: &str) -> NomResult<()> {
        let net = self.network(neti)?;
        compartment_of(net, compi)?;
        if net.compartments().any(|(i, c)| i != compi && c.id == id) {
            return Err(NomError::IdRepeat(id.to_string()).into());
        }
        ensure_id(id)?;
        let id = id.to_string();
        self.edit_compartment(neti, compi, |c| c.id = id)
    }

    pub fn get_compartment_fill_color(&self, neti: u32, compi: u32) -> NomResult<Color> {
        Ok(self.compartment_ref(neti, compi)?.fill_color)
    }

    pub fn set_compartment_fill_color(&mut self, neti: u32, compi: u32, color: Color) -> NomResult<()> {
        self.edit_compartment(neti, compi, |c| c.fill_color = color)
    }

    pub fn get_compartment_outline_color(&self, neti: u32, compi: u32) -> NomResult<Color> {
        Ok(self.compartment_ref(neti, compi)?.outline_color)
    }

    pub fn set_compartment_outline_color(&mut self, neti: u32, compi: u32, color: Color) -> NomResult<()> {
        self.edit_compartment(neti, compi, |c| c.outline_color = color)
    }

    pub fn get_compartment_outline_thickness(&self, neti: u32, compi: u32) -> NomResult<f64> {
        Ok(self.compartment_ref(neti, compi)?.outline_thickness)
    }

    pub fn set_compartment_outline_thickness(&mut self, neti: u32, compi: u32, thickness: f64) -> NomResult<()> {
        ensure(thickness > 0.0, "thickness", thickness)?;
        self.edit_compartment(neti, compi, |c| c.outline_thickness = thickness)
    }
}
