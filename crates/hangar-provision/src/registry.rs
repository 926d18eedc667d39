use crate::provisioner::Provisioner;
use crate::ProvisionError;
use std::collections::HashMap;
use std::sync::Arc;

/// Provider name to backend mapping.
///
/// Built once at start-up and shared behind an `Arc`. Lookups never mutate it.
#[derive(Default)]
pub struct ProvisionerRegistry {
    provisioners: HashMap<String, Arc<dyn Provisioner>>,
}

impl ProvisionerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provisioner: Arc<dyn Provisioner>) -> Result<(), ProvisionError> {
        let name = provisioner.name().to_owned();
        if self.provisioners.contains_key(&name) {
            return Err(ProvisionError::DuplicateProvider(name));
        }
        tracing::debug!("registered provisioner '{name}'");
        self.provisioners.insert(name, provisioner);
        Ok(())
    }

    pub fn with(mut self, provisioner: Arc<dyn Provisioner>) -> Result<Self, ProvisionError> {
        self.register(provisioner)?;
        Ok(self)
    }

    pub fn get(&self, provider: &str) -> Result<Arc<dyn Provisioner>, ProvisionError> {
        self.provisioners
            .get(provider)
            .cloned()
            .ok_or_else(|| ProvisionError::UnknownProvider(provider.to_owned()))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.provisioners.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.provisioners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.provisioners.is_empty()
    }
}

impl std::fmt::Debug for ProvisionerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisionerRegistry")
            .field("providers", &self.names())
            .finish()
    }
}
