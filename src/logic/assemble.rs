use log::warn;
use std::collections::BTreeMap;

use crate::logic::entity_compiler::CompiledEntities;
use crate::model::{
    DataAssociation, DataGraph, DataGraphIds, EdmIds, EntityKeyId, EntitySetId, SubmissionResult,
};

pub struct RequestAssembler;

impl RequestAssembler {
    /// Final batch payload; entity sets without pending writes are left out
    pub fn assemble(
        entities: CompiledEntities,
        associations: BTreeMap<EntitySetId, Vec<DataAssociation>>,
    ) -> DataGraph {
        DataGraph {
            entities: entities
                .entities
                .into_iter()
                .filter(|(_, pending)| !pending.is_empty())
                .collect(),
            associations: associations
                .into_iter()
                .filter(|(_, edges)| !edges.is_empty())
                .collect(),
        }
    }

    /// Re-key the store's generated ids by entity-set name
    pub fn map_result(ids: DataGraphIds, edm: &EdmIds) -> SubmissionResult {
        SubmissionResult {
            entities: by_name(ids.entity_key_ids, edm),
            associations: by_name(ids.association_entity_key_ids, edm),
        }
    }
}

fn by_name(
    ids: BTreeMap<EntitySetId, Vec<EntityKeyId>>,
    edm: &EdmIds,
) -> BTreeMap<String, Vec<EntityKeyId>> {
    let mut named: BTreeMap<String, Vec<EntityKeyId>> = BTreeMap::new();
    for (entity_set_id, keys) in ids {
        let name = match edm.entity_set_name(&entity_set_id) {
            Some(name) => name.to_string(),
            None => {
                warn!("store returned ids for unrequested entity set {}", entity_set_id);
                entity_set_id
            }
        };
        named.entry(name).or_default().extend(keys);
    }
    named
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_result_is_keyed_by_entity_set_name() {
        let edm = EdmIds::new(
            HashMap::from([
                ("LPRAlerts".to_string(), "es-alerts".to_string()),
                ("LPRRegisteredFor".to_string(), "es-registered".to_string()),
            ]),
            HashMap::new(),
        );
        let ids = DataGraphIds {
            entity_key_ids: BTreeMap::from([(
                "es-alerts".to_string(),
                vec!["k1".to_string(), "k2".to_string()],
            )]),
            association_entity_key_ids: BTreeMap::from([(
                "es-registered".to_string(),
                vec!["e1".to_string()],
            )]),
        };

        let result = RequestAssembler::map_result(ids, &edm);
        assert_eq!(result.entities["LPRAlerts"], vec!["k1", "k2"]);
        assert_eq!(result.associations["LPRRegisteredFor"], vec!["e1"]);
    }

    #[test]
    fn test_empty_lists_are_not_assembled() {
        let mut entities = CompiledEntities::default();
        entities.entities.insert("es-empty".to_string(), Vec::new());
        let graph = RequestAssembler::assemble(
            entities,
            BTreeMap::from([("es-edges".to_string(), Vec::new())]),
        );
        assert!(graph.is_empty());
        assert!(graph.entities.is_empty());
        assert!(graph.associations.is_empty());
    }
}
