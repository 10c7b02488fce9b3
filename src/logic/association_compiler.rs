use log::debug;
use std::collections::BTreeMap;

use crate::errors::{ConfigError, SubmitError};
use crate::logic::entity_compiler::CompiledEntities;
use crate::logic::product::cartesian_product;
use crate::model::{
    AssociationTemplate, DataAssociation, EdmIds, EntityData, EntityRef, EntitySetId,
    SubmissionConfig,
};

pub struct AssociationCompiler<'a> {
    config: &'a SubmissionConfig,
    edm: &'a EdmIds,
}

impl<'a> AssociationCompiler<'a> {
    pub fn new(config: &'a SubmissionConfig, edm: &'a EdmIds) -> Self {
        Self { config, edm }
    }

    /// Emit one edge per (src, dst) identifier pair for every recorded
    /// association row, grouped by the association's entity-set id
    pub fn compile(
        &self,
        compiled: &CompiledEntities,
    ) -> Result<BTreeMap<EntitySetId, Vec<DataAssociation>>, SubmitError> {
        let mut associations: BTreeMap<EntitySetId, Vec<DataAssociation>> = BTreeMap::new();

        for association in &self.config.associations {
            let edges = self.compile_association(association, compiled)?;
            if edges.is_empty() {
                continue;
            }
            let entity_set_id = self.association_entity_set_id(association)?;
            associations
                .entry(entity_set_id.clone())
                .or_default()
                .extend(edges);
        }

        Ok(associations)
    }

    fn association_entity_set_id(
        &self,
        association: &AssociationTemplate,
    ) -> Result<&'a EntitySetId, SubmitError> {
        let template = self
            .config
            .template(&association.association_alias)
            .ok_or_else(|| ConfigError::UnknownAlias {
                alias: association.association_alias.clone(),
                role: "association",
            })?;
        Ok(self.edm.entity_set_id(&template.entity_set_name)?)
    }

    fn compile_association(
        &self,
        association: &AssociationTemplate,
        compiled: &CompiledEntities,
    ) -> Result<Vec<DataAssociation>, SubmitError> {
        let sources = compiled.aliases.identifiers(&association.src_alias);
        let destinations = compiled.aliases.identifiers(&association.dst_alias);
        let rows = compiled.aliases.identifiers(&association.association_alias);

        let mut edges = Vec::with_capacity(rows.len() * sources.len() * destinations.len());
        for row in rows {
            let data = match &row.reference {
                EntityRef::Index(index) => compiled
                    .edge_details(&association.association_alias, *index)
                    .cloned()
                    .unwrap_or_default(),
                EntityRef::Key(_) => EntityData::new(),
            };
            edges.extend(
                cartesian_product(sources, destinations)
                    .map(|(src, dst)| DataAssociation::between(src, dst, data.clone())),
            );
        }

        debug!(
            "association {} -[{}]-> {}: {} rows x {} sources x {} destinations",
            association.src_alias,
            association.association_alias,
            association.dst_alias,
            rows.len(),
            sources.len(),
            destinations.len()
        );
        Ok(edges)
    }
}
