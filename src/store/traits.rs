use crate::model::{
    DataGraph, DataGraphIds, EntitySetId, Fqn, PropertyTypeId, StoredAssociation, StoredEntity,
};
use anyhow::Result;
use std::collections::HashMap;

/// Entity data model registry: name → id lookups
#[async_trait::async_trait]
pub trait EdmStore: Send + Sync {
    /// Ids for the given entity-set names; unknown names are absent from the map
    async fn get_entity_set_ids(&self, names: &[String]) -> Result<HashMap<String, EntitySetId>>;
    /// Ids for the given property FQNs; unknown FQNs are absent from the map
    async fn get_property_type_ids(&self, fqns: &[Fqn]) -> Result<HashMap<Fqn, PropertyTypeId>>;
}

#[async_trait::async_trait]
pub trait DataGraphStore: Send + Sync {
    /// Atomic batch write. Returned ids are aligned with the submitted lists.
    async fn create_data_graph(&self, graph: DataGraph) -> Result<DataGraphIds>;
    async fn list_entities(&self, entity_set_id: &EntitySetId) -> Result<Vec<StoredEntity>>;
    async fn list_associations(
        &self,
        entity_set_id: &EntitySetId,
    ) -> Result<Vec<StoredAssociation>>;
}

pub trait Store: EdmStore + DataGraphStore + Send + Sync {}
impl<T: EdmStore + DataGraphStore + Send + Sync> Store for T {}
