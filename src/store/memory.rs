use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use log::debug;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

use crate::model::{
    generate_id, DataAssociation, DataGraph, DataGraphIds, EntityData, EntityKeyId, EntityRef,
    EntitySetId, Fqn, PropertyTypeId, StoredAssociation, StoredEntity,
};
use crate::store::traits::{DataGraphStore, EdmStore};

#[derive(Debug, Default)]
struct MemoryState {
    entity_sets: HashMap<String, EntitySetId>,
    property_types: HashMap<Fqn, PropertyTypeId>,
    entities: HashMap<EntitySetId, Vec<StoredEntity>>,
    associations: HashMap<EntitySetId, Vec<StoredAssociation>>,
}

/// Writes of one batch, fully resolved before any of them is applied
struct StagedGraph {
    entities: Vec<StoredEntity>,
    associations: Vec<StoredAssociation>,
    ids: DataGraphIds,
}

impl MemoryState {
    fn is_entity_set(&self, id: &str) -> bool {
        self.entity_sets.values().any(|set_id| set_id == id)
    }

    fn is_property_type(&self, id: &str) -> bool {
        self.property_types.values().any(|pt| pt == id)
    }

    fn has_entity(&self, entity_set_id: &str, key: &str) -> bool {
        self.entities
            .get(entity_set_id)
            .is_some_and(|entities| entities.iter().any(|e| e.id == key))
    }

    fn check_data(&self, entity_set_id: &str, data: &EntityData) -> Result<()> {
        if !self.is_entity_set(entity_set_id) {
            bail!("unknown entity set id {}", entity_set_id);
        }
        if let Some(property_type_id) = data.keys().find(|id| !self.is_property_type(id)) {
            bail!("unknown property type id {}", property_type_id);
        }
        Ok(())
    }

    fn resolve_endpoint(
        &self,
        entity_set_id: &EntitySetId,
        reference: Option<EntityRef>,
        created: &BTreeMap<EntitySetId, Vec<EntityKeyId>>,
    ) -> Result<EntityKeyId> {
        match reference {
            Some(EntityRef::Index(index)) => created
                .get(entity_set_id)
                .and_then(|keys| keys.get(index))
                .cloned()
                .ok_or_else(|| {
                    anyhow!("entity index {} out of range for entity set {}", index, entity_set_id)
                }),
            Some(EntityRef::Key(key)) => {
                if self.has_entity(entity_set_id, &key) {
                    Ok(key)
                } else {
                    Err(anyhow!("entity {} not found in entity set {}", key, entity_set_id))
                }
            }
            None => Err(anyhow!(
                "association endpoint in {} needs exactly one of index or key",
                entity_set_id
            )),
        }
    }

    fn stage(&self, graph: DataGraph) -> Result<StagedGraph> {
        let now = Utc::now();
        let mut staged = StagedGraph {
            entities: Vec::new(),
            associations: Vec::new(),
            ids: DataGraphIds::default(),
        };

        for (entity_set_id, entities) in graph.entities {
            let mut keys = Vec::with_capacity(entities.len());
            for data in entities {
                self.check_data(&entity_set_id, &data)?;
                let id = generate_id();
                keys.push(id.clone());
                staged.entities.push(StoredEntity {
                    id,
                    entity_set_id: entity_set_id.clone(),
                    data,
                    created_at: now,
                });
            }
            staged.ids.entity_key_ids.insert(entity_set_id, keys);
        }

        for (entity_set_id, edges) in graph.associations {
            let mut keys = Vec::with_capacity(edges.len());
            for edge in edges {
                self.check_data(&entity_set_id, &edge.data)?;
                let src = self.resolve_endpoint(
                    &edge.src_entity_set_id,
                    edge.src(),
                    &staged.ids.entity_key_ids,
                )?;
                let dst = self.resolve_endpoint(
                    &edge.dst_entity_set_id,
                    edge.dst(),
                    &staged.ids.entity_key_ids,
                )?;
                let DataAssociation {
                    src_entity_set_id,
                    dst_entity_set_id,
                    data,
                    ..
                } = edge;

                let id = generate_id();
                keys.push(id.clone());
                staged.associations.push(StoredAssociation {
                    id,
                    entity_set_id: entity_set_id.clone(),
                    src_entity_set_id,
                    src_entity_key_id: src,
                    dst_entity_set_id,
                    dst_entity_key_id: dst,
                    data,
                    created_at: now,
                });
            }
            staged.ids.association_entity_key_ids.insert(entity_set_id, keys);
        }

        Ok(staged)
    }

    fn commit(&mut self, staged: StagedGraph) -> DataGraphIds {
        for entity in staged.entities {
            self.entities
                .entry(entity.entity_set_id.clone())
                .or_default()
                .push(entity);
        }
        for association in staged.associations {
            self.associations
                .entry(association.entity_set_id.clone())
                .or_default()
                .push(association);
        }
        staged.ids
    }
}

/// In-process graph store and EDM registry
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity set, returning the existing id if already known
    pub fn register_entity_set(&self, name: &str) -> EntitySetId {
        self.state
            .write()
            .entity_sets
            .entry(name.to_string())
            .or_insert_with(generate_id)
            .clone()
    }

    /// Register a property type, returning the existing id if already known
    pub fn register_property_type(&self, fqn: &str) -> PropertyTypeId {
        self.state
            .write()
            .property_types
            .entry(fqn.to_string())
            .or_insert_with(generate_id)
            .clone()
    }

    pub fn entity_set_id(&self, name: &str) -> Option<EntitySetId> {
        self.state.read().entity_sets.get(name).cloned()
    }

    pub fn property_type_id(&self, fqn: &str) -> Option<PropertyTypeId> {
        self.state.read().property_types.get(fqn).cloned()
    }

    /// Insert a single entity outside of a batch, e.g. a read ingested by
    /// the plate reader feed
    pub fn insert_entity(
        &self,
        entity_set_id: &EntitySetId,
        data: EntityData,
    ) -> Result<EntityKeyId> {
        self.insert_entity_with_key(entity_set_id, generate_id(), data)
    }

    /// Insert an entity under a caller-chosen key, e.g. a person keyed by
    /// the officer's user id
    pub fn insert_entity_with_key(
        &self,
        entity_set_id: &EntitySetId,
        key: EntityKeyId,
        data: EntityData,
    ) -> Result<EntityKeyId> {
        let mut state = self.state.write();
        state.check_data(entity_set_id, &data)?;
        if state.has_entity(entity_set_id, &key) {
            bail!("entity {} already exists in entity set {}", key, entity_set_id);
        }
        state
            .entities
            .entry(entity_set_id.clone())
            .or_default()
            .push(StoredEntity {
                id: key.clone(),
                entity_set_id: entity_set_id.clone(),
                data,
                created_at: Utc::now(),
            });
        Ok(key)
    }
}

#[async_trait::async_trait]
impl EdmStore for MemoryStore {
    async fn get_entity_set_ids(&self, names: &[String]) -> Result<HashMap<String, EntitySetId>> {
        let state = self.state.read();
        Ok(names
            .iter()
            .filter_map(|name| state.entity_sets.get(name).map(|id| (name.clone(), id.clone())))
            .collect())
    }

    async fn get_property_type_ids(&self, fqns: &[Fqn]) -> Result<HashMap<Fqn, PropertyTypeId>> {
        let state = self.state.read();
        Ok(fqns
            .iter()
            .filter_map(|fqn| state.property_types.get(fqn).map(|id| (fqn.clone(), id.clone())))
            .collect())
    }
}

#[async_trait::async_trait]
impl DataGraphStore for MemoryStore {
    async fn create_data_graph(&self, graph: DataGraph) -> Result<DataGraphIds> {
        let mut state = self.state.write();
        let staged = state.stage(graph)?;
        debug!(
            "committing {} entities and {} associations",
            staged.entities.len(),
            staged.associations.len()
        );
        Ok(state.commit(staged))
    }

    async fn list_entities(&self, entity_set_id: &EntitySetId) -> Result<Vec<StoredEntity>> {
        Ok(self
            .state
            .read()
            .entities
            .get(entity_set_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_associations(
        &self,
        entity_set_id: &EntitySetId,
    ) -> Result<Vec<StoredAssociation>> {
        Ok(self
            .state
            .read()
            .associations
            .get(entity_set_id)
            .cloned()
            .unwrap_or_default())
    }
}
