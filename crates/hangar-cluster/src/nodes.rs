use crate::ClusterError;
use hangar_schema::{Node, NodeAddress};
use std::collections::{BTreeMap, HashMap};

/// Node table: records in registration order plus an address index.
///
/// Not synchronized. `MemoryStorage` wraps it in a single mutex.
#[derive(Debug, Default)]
pub struct NodeTable {
    nodes: Vec<Node>,
    index: HashMap<NodeAddress, usize>,
}

impl NodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.address.clone(), i))
            .collect();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn insert(&mut self, node: Node) -> Result<(), ClusterError> {
        if self.index.contains_key(&node.address) {
            return Err(ClusterError::DuplicateAddress(node.address.into_inner()));
        }
        self.index.insert(node.address.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    pub fn get(&self, address: &str) -> Result<&Node, ClusterError> {
        self.index
            .get(address)
            .map(|&i| &self.nodes[i])
            .ok_or_else(|| ClusterError::NodeNotFound(address.to_owned()))
    }

    pub fn get_mut(&mut self, address: &str) -> Result<&mut Node, ClusterError> {
        match self.index.get(address) {
            Some(&i) => Ok(&mut self.nodes[i]),
            None => Err(ClusterError::NodeNotFound(address.to_owned())),
        }
    }

    pub fn all(&self) -> Vec<Node> {
        self.nodes.clone()
    }

    pub fn by_metadata(&self, filter: &BTreeMap<String, String>) -> Vec<Node> {
        self.nodes
            .iter()
            .filter(|n| n.matches_any(filter))
            .cloned()
            .collect()
    }

    /// Overwrite the stored record for `node.address`. Metadata is replaced,
    /// not merged.
    pub fn replace(&mut self, node: Node) -> Result<(), ClusterError> {
        let slot = self.get_mut(&node.address)?;
        *slot = node;
        Ok(())
    }

    pub fn remove(&mut self, address: &str) -> Result<Node, ClusterError> {
        let i = *self
            .index
            .get(address)
            .ok_or_else(|| ClusterError::NodeNotFound(address.to_owned()))?;
        let removed = self.nodes.remove(i);
        self.rebuild_index();
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
    }
}
