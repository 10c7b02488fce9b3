use std::collections::HashSet;

use crate::errors::ConfigError;
use crate::model::SubmissionConfig;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Structural checks that need no entity data model access
    pub fn validate(config: &SubmissionConfig) -> Result<(), ConfigError> {
        let mut aliases = HashSet::new();
        for template in &config.entity_sets {
            if !aliases.insert(template.alias.as_str()) {
                return Err(ConfigError::DuplicateAlias(template.alias.clone()));
            }
        }

        let mut endpoints = HashSet::new();
        for association in &config.associations {
            for (alias, role) in [
                (&association.src_alias, "source"),
                (&association.dst_alias, "destination"),
                (&association.association_alias, "association"),
            ] {
                if !aliases.contains(alias.as_str()) {
                    return Err(ConfigError::UnknownAlias {
                        alias: alias.clone(),
                        role,
                    });
                }
            }
            endpoints.insert(association.src_alias.as_str());
            endpoints.insert(association.dst_alias.as_str());
        }

        for alias in config.association_aliases() {
            if endpoints.contains(alias) {
                return Err(ConfigError::AliasRoleConflict(alias.to_string()));
            }
            if config
                .template(alias)
                .is_some_and(|template| template.references_existing())
            {
                return Err(ConfigError::AssociationWithIdField(alias.to_string()));
            }
        }

        Ok(())
    }
}
