use crate::model::Fqn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// One entity-set row of a submission config.
///
/// `fields` maps logical form field names to the property type FQN they are
/// written to. A template with `id_field` references an existing entity
/// instead of creating one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySetTemplate {
    pub alias: String,
    #[serde(rename = "name")]
    pub entity_set_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_values_field: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, Fqn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_if_false: Option<Vec<String>>,
}

impl EntitySetTemplate {
    pub fn new(alias: &str, entity_set_name: &str) -> Self {
        Self {
            alias: alias.to_string(),
            entity_set_name: entity_set_name.to_string(),
            id_field: None,
            multiple_values_field: None,
            fields: BTreeMap::new(),
            ignore_if_false: None,
        }
    }

    pub fn with_id_field(mut self, field: &str) -> Self {
        self.id_field = Some(field.to_string());
        self
    }

    pub fn with_multiple_values_field(mut self, field: &str) -> Self {
        self.multiple_values_field = Some(field.to_string());
        self
    }

    pub fn with_field(mut self, field: &str, fqn: &str) -> Self {
        self.fields.insert(field.to_string(), fqn.to_string());
        self
    }

    pub fn with_ignore_if_false(mut self, fields: &[&str]) -> Self {
        self.ignore_if_false = Some(fields.iter().map(|f| f.to_string()).collect());
        self
    }

    /// True when the template references existing entities only
    pub fn references_existing(&self) -> bool {
        self.id_field.is_some()
    }
}

/// Describes one edge type between two aliased templates
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationTemplate {
    pub src_alias: String,
    pub dst_alias: String,
    #[serde(rename = "association")]
    pub association_alias: String,
}

impl AssociationTemplate {
    pub fn new(src_alias: &str, association_alias: &str, dst_alias: &str) -> Self {
        Self {
            src_alias: src_alias.to_string(),
            dst_alias: dst_alias.to_string(),
            association_alias: association_alias.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionConfig {
    pub entity_sets: Vec<EntitySetTemplate>,
    #[serde(default)]
    pub associations: Vec<AssociationTemplate>,
}

impl SubmissionConfig {
    pub fn new(
        entity_sets: Vec<EntitySetTemplate>,
        associations: Vec<AssociationTemplate>,
    ) -> Self {
        Self {
            entity_sets,
            associations,
        }
    }

    pub fn template(&self, alias: &str) -> Option<&EntitySetTemplate> {
        self.entity_sets.iter().find(|t| t.alias == alias)
    }

    /// Distinct entity-set names in declaration order
    pub fn entity_set_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.entity_sets
            .iter()
            .filter(|t| seen.insert(t.entity_set_name.as_str()))
            .map(|t| t.entity_set_name.clone())
            .collect()
    }

    /// Every property FQN referenced by any template
    pub fn property_fqns(&self) -> Vec<Fqn> {
        self.entity_sets
            .iter()
            .flat_map(|t| t.fields.values().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Aliases that describe an edge's own entity set
    pub fn association_aliases(&self) -> HashSet<&str> {
        self.associations
            .iter()
            .map(|a| a.association_alias.as_str())
            .collect()
    }

    /// Aliases used as the source or destination of some association
    pub fn participant_aliases(&self) -> HashSet<&str> {
        self.associations
            .iter()
            .flat_map(|a| [a.src_alias.as_str(), a.dst_alias.as_str()])
            .collect()
    }
}
