pub mod config;
pub mod curves;
pub mod error;
pub mod history;
pub mod interaction;
pub mod model;
pub mod picking;
pub mod shape;
pub mod geometry {
    pub mod arrow;
    pub mod bezier;
    pub mod cubic;
    pub mod intersect;
    pub mod limits;
    pub mod math;
    pub mod rect;
    pub mod tolerance;
}
mod compartments;
mod json;
mod nodes;
mod reactions;
mod validate;

pub use config::{EditorConfig, Theme};
pub use error::{Error, NomError, NomResult, ValueError};
pub use history::{History, SnapshotStack};
pub use model::{Color, Network, NetworkSet, Node, NodeKind, Reaction, Role, TipStyle, Vec2};

/// The network object model: every network of a document plus its undo history.
///
/// All operations address entities by integer index. Mutations validate every
/// precondition first, then record one snapshot, then apply; a failed call
/// leaves both the networks and the history untouched.
#[derive(Clone, Debug)]
pub struct Store<H: History = SnapshotStack> {
    nets: NetworkSet,
    history: H,
    recording: bool, // false inside start_group/end_group
    config: EditorConfig,
}

impl Default for Store<SnapshotStack> {
    fn default() -> Self {
        Self::new()
    }
}

impl Store<SnapshotStack> {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        let history = SnapshotStack::with_max_depth(config.max_undo_depth);
        Self::with_history(history, config)
    }
}

impl<H: History> Store<H> {
    pub fn with_history(history: H, config: EditorConfig) -> Self {
        Store { nets: NetworkSet::default(), history, recording: true, config }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn networks(&self) -> &NetworkSet {
        &self.nets
    }

    pub fn network(&self, neti: u32) -> NomResult<&Network> {
        self.nets.nets.get(&neti).ok_or_else(|| NomError::NetIndex(neti).into())
    }

    pub(crate) fn net_mut(&mut self, neti: u32) -> NomResult<&mut Network> {
        self.nets.nets.get_mut(&neti).ok_or_else(|| NomError::NetIndex(neti).into())
    }

    /// Snapshots the current state unless a group is open.
    pub(crate) fn record(&mut self) {
        if self.recording {
            self.history.clear_redo();
            self.history.push(self.nets.clone());
        }
    }

    // Networks
    pub fn new_network(&mut self, id: &str) -> NomResult<u32> {
        if self.nets.nets.values().any(|n| n.id == id) {
            return Err(NomError::IdRepeat(id.to_string()).into());
        }
        error::ensure_id(id)?;
        self.record();
        let neti = self.nets.last_index;
        self.nets.nets.insert(neti, Network::new(id));
        self.nets.last_index += 1;
        log::debug!("network '{}' created at {}", id, neti);
        Ok(neti)
    }

    pub fn get_network_index(&self, id: &str) -> NomResult<u32> {
        self.nets
            .iter()
            .find(|(_, n)| n.id == id)
            .map(|(i, _)| i)
            .ok_or_else(|| NomError::IdNotFound(id.to_string()).into())
    }

    pub fn delete_network(&mut self, neti: u32) -> NomResult<()> {
        self.network(neti)?;
        self.record();
        self.nets.nets.remove(&neti);
        log::debug!("network {} deleted", neti);
        Ok(())
    }

    pub fn clear_networks(&mut self) {
        self.record();
        self.nets = NetworkSet::default();
    }

    /// Empties a network, keeping its id and index.
    pub fn clear_network(&mut self, neti: u32) -> NomResult<()> {
        let id = self.network(neti)?.id.clone();
        self.record();
        *self.net_mut(neti)? = Network::new(id);
        Ok(())
    }

    pub fn get_number_of_networks(&self) -> usize {
        self.nets.len()
    }

    pub fn get_network_id(&self, neti: u32) -> NomResult<String> {
        Ok(self.network(neti)?.id.clone())
    }

    pub fn get_list_of_networks(&self) -> Vec<u32> {
        self.nets.iter().map(|(i, _)| i).collect()
    }

    // Undo / redo
    pub fn undo(&mut self) -> NomResult<()> {
        let prev = self.history.pop_undo().ok_or(NomError::StackEmpty("undo"))?;
        let cur = std::mem::replace(&mut self.nets, prev);
        self.history.push_redo(cur);
        log::debug!("undo, {} left", self.history.undo_len());
        Ok(())
    }

    pub fn redo(&mut self) -> NomResult<()> {
        let next = self.history.pop_redo().ok_or(NomError::StackEmpty("redo"))?;
        let cur = std::mem::replace(&mut self.nets, next);
        self.history.push(cur);
        log::debug!("redo, {} left", self.history.redo_len());
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.history.undo_len() > 0
    }

    pub fn can_redo(&self) -> bool {
        self.history.redo_len() > 0
    }

    pub fn undo_depth(&self) -> usize {
        self.history.undo_len()
    }

    /// Records one snapshot and suspends recording until [`Store::end_group`].
    ///
    /// Groups do not nest: a second call records another snapshot.
    pub fn start_group(&mut self) {
        self.history.clear_redo();
        self.history.push(self.nets.clone());
        self.recording = false;
        log::debug!("group started");
    }

    pub fn end_group(&mut self) {
        self.recording = true;
        log::debug!("group ended");
    }

    /// Runs `f` as one undo step. The snapshot is only recorded once `f`
    /// succeeds; on failure the networks are restored and the history is
    /// never touched. Inside an open group nothing extra is recorded.
    pub(crate) fn group<T>(&mut self, f: impl FnOnce(&mut Self) -> NomResult<T>) -> NomResult<T> {
        let before = self.nets.clone();
        let was_recording = self.recording;
        self.recording = false;
        let out = f(self);
        self.recording = was_recording;
        match out {
            Ok(v) => {
                if was_recording {
                    self.history.clear_redo();
                    self.history.push(before);
                }
                Ok(v)
            }
            Err(e) => {
                self.nets = before;
                log::debug!("group rolled back");
                Err(e)
            }
        }
    }

    /// Drops every network and both stacks, and resets the network counter.
    pub fn reset(&mut self) {
        self.nets = NetworkSet::default();
        self.history.clear();
        self.recording = true;
        log::debug!("store reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_indices_are_monotonic() {
        let mut s = Store::new();
        assert_eq!(s.new_network("a").unwrap(), 0);
        assert_eq!(s.new_network("b").unwrap(), 1);
        s.delete_network(0).unwrap();
        assert_eq!(s.new_network("c").unwrap(), 2);
        assert_eq!(s.get_list_of_networks(), vec![1, 2]);
        assert_eq!(s.new_network("b").unwrap_err().code(), -3);
        s.clear_networks();
        assert_eq!(s.new_network("d").unwrap(), 0);
    }

    #[test]
    fn failed_group_leaves_no_trace() {
        let mut s = Store::new();
        s.new_network("n").unwrap();
        let depth = s.undo_depth();
        let r: NomResult<()> = s.group(|st| {
            st.new_network("m")?;
            st.delete_network(99)
        });
        assert!(r.is_err());
        assert_eq!(s.undo_depth(), depth);
        assert_eq!(s.get_number_of_networks(), 1);
        assert!(s.recording);
    }

    #[test]
    fn failed_group_keeps_capped_history() {
        let cfg = EditorConfig { max_undo_depth: Some(2), ..EditorConfig::default() };
        let mut s = Store::with_config(cfg);
        s.new_network("a").unwrap();
        s.new_network("b").unwrap();
        let r: NomResult<()> = s.group(|st| st.delete_network(99));
        assert!(r.is_err());
        assert_eq!(s.undo_depth(), 2);
        s.undo().unwrap();
        s.undo().unwrap();
        assert_eq!(s.get_number_of_networks(), 0);
    }

    #[test]
    fn group_inside_open_group_records_nothing() {
        let mut s = Store::new();
        s.new_network("n").unwrap();
        s.start_group();
        let depth = s.undo_depth();
        s.group(|st| st.new_network("m").map(drop)).unwrap();
        assert_eq!(s.undo_depth(), depth);
        assert!(!s.recording);
        s.end_group();
        s.undo().unwrap();
        assert_eq!(s.get_list_of_networks(), vec![0]);
    }

    #[test]
    fn two_stack_swap() {
        let mut s = Store::new();
        assert_eq!(s.undo().unwrap_err().code(), -9);
        s.new_network("n").unwrap();
        s.undo().unwrap();
        assert_eq!(s.get_number_of_networks(), 0);
        assert!(s.can_redo());
        s.redo().unwrap();
        assert_eq!(s.get_network_id(0).unwrap(), "n");
        assert_eq!(s.redo().unwrap_err().code(), -9);
    }
}
