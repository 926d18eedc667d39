use crate::containers::ContainerTable;
use crate::healing::{self, HealingLease};
use crate::nodes::NodeTable;
use crate::ClusterError;
use chrono::Utc;
use hangar_schema::{Container, ContainerId, Node, NodeAddress};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::debug;

/// The boundary through which provisioners and healing daemons read and
/// update cluster bookkeeping.
pub trait ClusterStorage: Send + Sync {
    /// Register a node. Fails with `DuplicateAddress` rather than overwriting.
    fn store_node(&self, node: Node) -> Result<(), ClusterError>;

    fn retrieve_node(&self, address: &str) -> Result<Node, ClusterError>;

    /// All nodes, in registration order.
    fn retrieve_nodes(&self) -> Result<Vec<Node>, ClusterError>;

    /// Nodes carrying **at least one** of the `filter` pairs. This is an OR
    /// across keys, not an AND: `{pool: a, region: eu}` matches every node in
    /// pool `a` and every node in region `eu`.
    fn retrieve_nodes_by_metadata(
        &self,
        filter: &BTreeMap<String, String>,
    ) -> Result<Vec<Node>, ClusterError>;

    /// Replace a node record wholesale.
    fn update_node(&self, node: Node) -> Result<(), ClusterError>;

    fn remove_node(&self, address: &str) -> Result<(), ClusterError>;

    fn store_container(&self, id: &str, host: &str) -> Result<(), ClusterError>;

    fn retrieve_container(&self, id: &str) -> Result<NodeAddress, ClusterError>;

    /// Idempotent: removing an unknown id succeeds.
    fn remove_container(&self, id: &str) -> Result<(), ClusterError>;

    fn retrieve_containers(&self) -> Result<Vec<Container>, ClusterError>;

    fn store_container_by_name(&self, id: &str, name: &str) -> Result<(), ClusterError>;

    fn retrieve_container_by_name(&self, name: &str) -> Result<ContainerId, ClusterError>;

    fn retrieve_host_by_name(&self, name: &str) -> Result<NodeAddress, ClusterError> {
        let id = self.retrieve_container_by_name(name)?;
        self.retrieve_container(&id)
    }

    /// Non-blocking try-lock. `Ok(false)` means another healer holds an
    /// unexpired lease; callers back off and poll.
    fn lock_node_for_healing(
        &self,
        address: &str,
        is_failure: bool,
        timeout: Duration,
    ) -> Result<bool, ClusterError>;

    /// Reset the lease deadline to `now + timeout` without checking who holds
    /// it. Only safe when the caller knows it is the holder.
    fn extend_node_lock(&self, address: &str, timeout: Duration) -> Result<(), ClusterError>;

    /// Clear the lease without checking who holds it.
    fn unlock_node(&self, address: &str) -> Result<(), ClusterError>;

    fn acquire_healing_lease(
        &self,
        address: &str,
        is_failure: bool,
        timeout: Duration,
    ) -> Result<Option<HealingLease>, ClusterError>;

    fn extend_healing_lease(
        &self,
        lease: &HealingLease,
        timeout: Duration,
    ) -> Result<HealingLease, ClusterError>;

    fn release_healing_lease(&self, lease: &HealingLease) -> Result<(), ClusterError>;
}

/// In-process cluster store.
///
/// The node table and the container index sit behind independent mutexes, so
/// node and container operations never wait on each other. Reads hand out
/// copies; nothing returned aliases the stored records.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    nodes: Mutex<NodeTable>,
    containers: Mutex<ContainerTable>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn nodes(&self) -> Result<MutexGuard<'_, NodeTable>, ClusterError> {
        self.nodes
            .lock()
            .map_err(|e| ClusterError::LockPoisoned(format!("node table: {e}")))
    }

    fn containers(&self) -> Result<MutexGuard<'_, ContainerTable>, ClusterError> {
        self.containers
            .lock()
            .map_err(|e| ClusterError::LockPoisoned(format!("container table: {e}")))
    }

    /// Drop every node and container.
    pub fn reset(&self) -> Result<(), ClusterError> {
        self.nodes()?.clear();
        self.containers()?.clear();
        Ok(())
    }

    pub fn node_count(&self) -> Result<usize, ClusterError> {
        Ok(self.nodes()?.len())
    }
}

impl ClusterStorage for MemoryStorage {
    fn store_node(&self, node: Node) -> Result<(), ClusterError> {
        let address = node.address.clone();
        self.nodes()?.insert(node)?;
        debug!("registered node {address}");
        Ok(())
    }

    fn retrieve_node(&self, address: &str) -> Result<Node, ClusterError> {
        self.nodes()?.get(address).cloned()
    }

    fn retrieve_nodes(&self) -> Result<Vec<Node>, ClusterError> {
        Ok(self.nodes()?.all())
    }

    fn retrieve_nodes_by_metadata(
        &self,
        filter: &BTreeMap<String, String>,
    ) -> Result<Vec<Node>, ClusterError> {
        Ok(self.nodes()?.by_metadata(filter))
    }

    fn update_node(&self, node: Node) -> Result<(), ClusterError> {
        self.nodes()?.replace(node)
    }

    fn remove_node(&self, address: &str) -> Result<(), ClusterError> {
        self.nodes()?.remove(address)?;
        debug!("removed node {address}");
        Ok(())
    }

    fn store_container(&self, id: &str, host: &str) -> Result<(), ClusterError> {
        self.containers()?.insert(id.into(), host.into());
        Ok(())
    }

    fn retrieve_container(&self, id: &str) -> Result<NodeAddress, ClusterError> {
        self.containers()?.host(id).cloned()
    }

    fn remove_container(&self, id: &str) -> Result<(), ClusterError> {
        self.containers()?.remove(id);
        Ok(())
    }

    fn retrieve_containers(&self) -> Result<Vec<Container>, ClusterError> {
        Ok(self.containers()?.snapshot())
    }

    fn store_container_by_name(&self, id: &str, name: &str) -> Result<(), ClusterError> {
        self.containers()?.insert_name(id.into(), name);
        Ok(())
    }

    fn retrieve_container_by_name(&self, name: &str) -> Result<ContainerId, ClusterError> {
        self.containers()?.id_by_name(name).cloned()
    }

    fn lock_node_for_healing(
        &self,
        address: &str,
        is_failure: bool,
        timeout: Duration,
    ) -> Result<bool, ClusterError> {
        let mut nodes = self.nodes()?;
        let node = nodes.get_mut(address)?;
        let acquired = healing::try_lock(node, Utc::now(), is_failure, timeout)?;
        if acquired {
            debug!("healing lock granted on {address} for {timeout:?} (failure: {is_failure})");
        } else {
            debug!("healing lock on {address} still held");
        }
        Ok(acquired)
    }

    fn extend_node_lock(&self, address: &str, timeout: Duration) -> Result<(), ClusterError> {
        let mut nodes = self.nodes()?;
        healing::extend(nodes.get_mut(address)?, Utc::now(), timeout)
    }

    fn unlock_node(&self, address: &str) -> Result<(), ClusterError> {
        let mut nodes = self.nodes()?;
        healing::release(nodes.get_mut(address)?);
        debug!("healing lock on {address} released");
        Ok(())
    }

    fn acquire_healing_lease(
        &self,
        address: &str,
        is_failure: bool,
        timeout: Duration,
    ) -> Result<Option<HealingLease>, ClusterError> {
        let mut nodes = self.nodes()?;
        healing::acquire(nodes.get_mut(address)?, Utc::now(), is_failure, timeout)
    }

    fn extend_healing_lease(
        &self,
        lease: &HealingLease,
        timeout: Duration,
    ) -> Result<HealingLease, ClusterError> {
        let mut nodes = self.nodes()?;
        healing::extend_lease(nodes.get_mut(&lease.address)?, lease, Utc::now(), timeout)
    }

    fn release_healing_lease(&self, lease: &HealingLease) -> Result<(), ClusterError> {
        let mut nodes = self.nodes()?;
        healing::release_lease(nodes.get_mut(&lease.address)?, lease)
    }
}
