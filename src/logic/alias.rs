use crate::model::EntityIdentifier;
use std::collections::HashMap;

/// Identifiers recorded per alias during one compile pass
#[derive(Debug, Clone, Default)]
pub struct AliasResolver {
    identifiers: HashMap<String, Vec<EntityIdentifier>>,
}

impl AliasResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, alias: &str, identifier: EntityIdentifier) {
        self.identifiers
            .entry(alias.to_string())
            .or_default()
            .push(identifier);
    }

    /// Recorded identifiers in row order; empty when every row was skipped
    pub fn identifiers(&self, alias: &str) -> &[EntityIdentifier] {
        self.identifiers
            .get(alias)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self, alias: &str) -> usize {
        self.identifiers(alias).len()
    }
}
