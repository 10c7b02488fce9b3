use crate::model::{EntityKeyId, EntitySetId, PropertyTypeId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Property-type id → values, the detail payload of one entity or edge
pub type EntityData = BTreeMap<PropertyTypeId, Vec<Value>>;

/// How a compiled entity is referred to inside one batch
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityRef {
    /// Already persisted entity
    Key(EntityKeyId),
    /// Position in the entity set's pending creation list
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityIdentifier {
    pub entity_set_id: EntitySetId,
    pub reference: EntityRef,
}

impl EntityIdentifier {
    pub fn existing(entity_set_id: &EntitySetId, key: EntityKeyId) -> Self {
        Self {
            entity_set_id: entity_set_id.clone(),
            reference: EntityRef::Key(key),
        }
    }

    pub fn pending(entity_set_id: &EntitySetId, index: usize) -> Self {
        Self {
            entity_set_id: entity_set_id.clone(),
            reference: EntityRef::Index(index),
        }
    }

    pub fn is_existing_key(&self) -> bool {
        matches!(self.reference, EntityRef::Key(_))
    }
}

/// One edge of a batch write. Exactly one of index/key is set per side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataAssociation {
    pub src_entity_set_id: EntitySetId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_entity_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_entity_key_id: Option<EntityKeyId>,
    pub dst_entity_set_id: EntitySetId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_entity_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_entity_key_id: Option<EntityKeyId>,
    pub data: EntityData,
}

impl DataAssociation {
    pub fn between(src: &EntityIdentifier, dst: &EntityIdentifier, data: EntityData) -> Self {
        let (src_entity_index, src_entity_key_id) = split_ref(&src.reference);
        let (dst_entity_index, dst_entity_key_id) = split_ref(&dst.reference);
        Self {
            src_entity_set_id: src.entity_set_id.clone(),
            src_entity_index,
            src_entity_key_id,
            dst_entity_set_id: dst.entity_set_id.clone(),
            dst_entity_index,
            dst_entity_key_id,
            data,
        }
    }

    pub fn src(&self) -> Option<EntityRef> {
        join_ref(self.src_entity_index, self.src_entity_key_id.as_ref())
    }

    pub fn dst(&self) -> Option<EntityRef> {
        join_ref(self.dst_entity_index, self.dst_entity_key_id.as_ref())
    }
}

fn split_ref(reference: &EntityRef) -> (Option<usize>, Option<EntityKeyId>) {
    match reference {
        EntityRef::Key(key) => (None, Some(key.clone())),
        EntityRef::Index(index) => (Some(*index), None),
    }
}

fn join_ref(index: Option<usize>, key: Option<&EntityKeyId>) -> Option<EntityRef> {
    match (index, key) {
        (None, Some(key)) => Some(EntityRef::Key(key.clone())),
        (Some(index), None) => Some(EntityRef::Index(index)),
        _ => None,
    }
}

/// Batch write request, grouped by entity-set id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataGraph {
    pub entities: BTreeMap<EntitySetId, Vec<EntityData>>,
    pub associations: BTreeMap<EntitySetId, Vec<DataAssociation>>,
}

impl DataGraph {
    pub fn entity_count(&self) -> usize {
        self.entities.values().map(Vec::len).sum()
    }

    pub fn association_count(&self) -> usize {
        self.associations.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entity_count() == 0 && self.association_count() == 0
    }
}

/// Ids generated by the store, positionally aligned with the submitted lists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataGraphIds {
    pub entity_key_ids: BTreeMap<EntitySetId, Vec<EntityKeyId>>,
    pub association_entity_key_ids: BTreeMap<EntitySetId, Vec<EntityKeyId>>,
}

/// Generated ids keyed by entity-set name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub entities: BTreeMap<String, Vec<EntityKeyId>>,
    pub associations: BTreeMap<String, Vec<EntityKeyId>>,
}

/// Entity as held by the graph store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEntity {
    pub id: EntityKeyId,
    pub entity_set_id: EntitySetId,
    pub data: EntityData,
    pub created_at: DateTime<Utc>,
}

/// Edge as held by the graph store, with both endpoints resolved to keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAssociation {
    pub id: EntityKeyId,
    pub entity_set_id: EntitySetId,
    pub src_entity_set_id: EntitySetId,
    pub src_entity_key_id: EntityKeyId,
    pub dst_entity_set_id: EntitySetId,
    pub dst_entity_key_id: EntityKeyId,
    pub data: EntityData,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_association_serializes_only_one_reference_per_side() {
        let src = EntityIdentifier::existing(&"people".to_string(), "user-1".to_string());
        let dst = EntityIdentifier::pending(&"alerts".to_string(), 0);
        let association = DataAssociation::between(&src, &dst, EntityData::new());

        let json = serde_json::to_value(&association).unwrap();
        assert_eq!(json["srcEntityKeyId"], "user-1");
        assert!(json.get("srcEntityIndex").is_none());
        assert_eq!(json["dstEntityIndex"], 0);
        assert!(json.get("dstEntityKeyId").is_none());

        assert_eq!(association.src(), Some(EntityRef::Key("user-1".to_string())));
        assert_eq!(association.dst(), Some(EntityRef::Index(0)));
    }

    #[test]
    fn test_association_with_both_references_is_ambiguous() {
        let mut association = DataAssociation::between(
            &EntityIdentifier::pending(&"a".to_string(), 1),
            &EntityIdentifier::pending(&"b".to_string(), 2),
            EntityData::new(),
        );
        association.src_entity_key_id = Some("k".to_string());
        assert_eq!(association.src(), None);
    }
}
