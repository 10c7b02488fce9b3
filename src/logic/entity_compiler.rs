use log::debug;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::errors::SubmitError;
use crate::logic::alias::AliasResolver;
use crate::logic::extract::extract_values;
use crate::model::{
    EdmIds, EntityData, EntityIdentifier, EntityKeyId, EntitySetId, EntitySetTemplate, FormValues,
    SubmissionConfig,
};

/// How a template takes part in the config's associations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateRole {
    /// Not referenced by any association
    Entity,
    /// Source or destination of at least one association
    Participant,
    /// Describes the edge's own entity set
    Association,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Fields are declared but none of them has a value in this row
    NoValues,
    /// Every `ignoreIfFalse` field is falsy in this row
    IgnoredIfFalse,
    /// No fields, no id field, and no association references the alias
    NothingToWrite,
}

/// Outcome for one template row
#[derive(Debug, Clone, PartialEq)]
pub enum WriteDecision {
    CreateNew(EntityData),
    ReferenceExisting(EntityKeyId),
    Skip(SkipReason),
}

/// Decide what one value row of a template contributes to the batch.
///
/// The `ignoreIfFalse` gate is checked first, so it also drops existing-entity
/// references whose key may then be absent.
pub fn decide(
    template: &EntitySetTemplate,
    row: &FormValues,
    details: EntityData,
    role: TemplateRole,
) -> Result<WriteDecision, SubmitError> {
    if let Some(fields) = &template.ignore_if_false {
        if !fields.is_empty() && fields.iter().all(|f| !row.is_truthy(f)) {
            return Ok(WriteDecision::Skip(SkipReason::IgnoredIfFalse));
        }
    }

    if let Some(id_field) = &template.id_field {
        return entity_key(row, id_field).map(WriteDecision::ReferenceExisting);
    }

    if !template.fields.is_empty() && details.is_empty() {
        return Ok(WriteDecision::Skip(SkipReason::NoValues));
    }

    if template.fields.is_empty() && role == TemplateRole::Entity {
        return Ok(WriteDecision::Skip(SkipReason::NothingToWrite));
    }

    Ok(WriteDecision::CreateNew(details))
}

fn entity_key(row: &FormValues, id_field: &str) -> Result<EntityKeyId, SubmitError> {
    match row.get(id_field) {
        Some(Value::String(key)) if !key.is_empty() => Ok(key.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Null) | Some(Value::String(_)) | None => Err(SubmitError::invalid_values(
            id_field,
            "missing entity key",
        )),
        Some(other) => Err(SubmitError::invalid_values(
            id_field,
            format!("entity key must be a string, got {}", other),
        )),
    }
}

/// Build the property-id keyed detail map, dropping unset properties
pub fn build_details(
    template: &EntitySetTemplate,
    row: &FormValues,
    edm: &EdmIds,
) -> Result<EntityData, SubmitError> {
    let mut details = EntityData::new();
    for (field, fqn) in &template.fields {
        let property_type_id = edm.property_type_id(fqn)?;
        let values = extract_values(row.get(field));
        if !values.is_empty() {
            details.insert(property_type_id.clone(), values);
        }
    }
    Ok(details)
}

/// Value rows of a template: the whole form, or one row per element of
/// its multiple-values field
pub fn value_rows<'v>(
    template: &EntitySetTemplate,
    values: &'v FormValues,
) -> Result<Vec<Cow<'v, FormValues>>, SubmitError> {
    let Some(field) = &template.multiple_values_field else {
        return Ok(vec![Cow::Borrowed(values)]);
    };

    match values.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Object(map) => Ok(Cow::Owned(FormValues::from(map.clone()))),
                other => Err(SubmitError::invalid_values(
                    field,
                    format!("expected a list of objects, found element {}", other),
                )),
            })
            .collect(),
        Some(other) => Err(SubmitError::invalid_values(
            field,
            format!("expected a list of objects, got {}", other),
        )),
    }
}

/// Result of the entity pass over a config
#[derive(Debug, Clone, Default)]
pub struct CompiledEntities {
    pub aliases: AliasResolver,
    /// Pending creation lists per entity set
    pub entities: BTreeMap<EntitySetId, Vec<EntityData>>,
    /// Edge payloads per association alias; identifiers recorded for an
    /// association alias index into its list here
    pub edge_data: HashMap<String, Vec<EntityData>>,
}

impl CompiledEntities {
    pub fn edge_details(&self, alias: &str, index: usize) -> Option<&EntityData> {
        self.edge_data.get(alias).and_then(|rows| rows.get(index))
    }
}

pub struct EntityCompiler<'a> {
    config: &'a SubmissionConfig,
    edm: &'a EdmIds,
    association_aliases: HashSet<&'a str>,
    participant_aliases: HashSet<&'a str>,
}

impl<'a> EntityCompiler<'a> {
    pub fn new(config: &'a SubmissionConfig, edm: &'a EdmIds) -> Self {
        Self {
            config,
            edm,
            association_aliases: config.association_aliases(),
            participant_aliases: config.participant_aliases(),
        }
    }

    fn role(&self, alias: &str) -> TemplateRole {
        if self.association_aliases.contains(alias) {
            TemplateRole::Association
        } else if self.participant_aliases.contains(alias) {
            TemplateRole::Participant
        } else {
            TemplateRole::Entity
        }
    }

    pub fn compile(&self, values: &FormValues) -> Result<CompiledEntities, SubmitError> {
        let mut compiled = CompiledEntities::default();

        for template in &self.config.entity_sets {
            let entity_set_id = self.edm.entity_set_id(&template.entity_set_name)?;
            let role = self.role(&template.alias);

            for row in value_rows(template, values)? {
                let details = build_details(template, &row, self.edm)?;
                let decision = decide(template, &row, details, role)?;
                debug!("template '{}': {:?}", template.alias, decision);

                let identifier = match decision {
                    WriteDecision::Skip(_) => continue,
                    WriteDecision::ReferenceExisting(key) => {
                        EntityIdentifier::existing(entity_set_id, key)
                    }
                    WriteDecision::CreateNew(details) => match role {
                        TemplateRole::Entity | TemplateRole::Participant => {
                            let pending =
                                compiled.entities.entry(entity_set_id.clone()).or_default();
                            pending.push(details);
                            EntityIdentifier::pending(entity_set_id, pending.len() - 1)
                        }
                        TemplateRole::Association => {
                            let rows =
                                compiled.edge_data.entry(template.alias.clone()).or_default();
                            rows.push(details);
                            EntityIdentifier::pending(entity_set_id, rows.len() - 1)
                        }
                    },
                };
                compiled.aliases.record(&template.alias, identifier);
            }
        }

        Ok(compiled)
    }
}
