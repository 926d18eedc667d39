use crate::ClusterError;
use hangar_schema::{Container, ContainerId, NodeAddress};
use std::collections::HashMap;

/// Container placement index: instance id to host, and workload name to
/// instance id.
#[derive(Debug, Default)]
pub struct ContainerTable {
    hosts: HashMap<ContainerId, NodeAddress>,
    names: HashMap<String, ContainerId>,
}

impl ContainerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ContainerId, host: NodeAddress) {
        self.hosts.insert(id, host);
    }

    pub fn insert_name(&mut self, id: ContainerId, name: &str) {
        self.names.insert(name.to_owned(), id);
    }

    pub fn host(&self, id: &str) -> Result<&NodeAddress, ClusterError> {
        self.hosts
            .get(id)
            .ok_or_else(|| ClusterError::ContainerNotFound(id.to_owned()))
    }

    pub fn id_by_name(&self, name: &str) -> Result<&ContainerId, ClusterError> {
        self.names
            .get(name)
            .ok_or_else(|| ClusterError::ContainerNotFound(format!("name '{name}'")))
    }

    /// Drop the placement for `id` and any names resolving to it. Absent ids
    /// are a no-op.
    pub fn remove(&mut self, id: &str) {
        self.hosts.remove(id);
        self.names.retain(|_, mapped| *mapped != id);
    }

    pub fn snapshot(&self) -> Vec<Container> {
        self.hosts
            .iter()
            .map(|(id, host)| Container {
                id: id.clone(),
                host: host.clone(),
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.hosts.clear();
        self.names.clear();
    }
}
