use crate::errors::{ConfigError, ResolutionError, SubmitError};
use crate::model::{EntitySetId, Fqn, PropertyTypeId};
use std::collections::HashMap;

/// Entity-set and property-type ids resolved for one submission
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdmIds {
    entity_set_ids: HashMap<String, EntitySetId>,
    property_type_ids: HashMap<Fqn, PropertyTypeId>,
}

impl EdmIds {
    pub fn new(
        entity_set_ids: HashMap<String, EntitySetId>,
        property_type_ids: HashMap<Fqn, PropertyTypeId>,
    ) -> Self {
        Self {
            entity_set_ids,
            property_type_ids,
        }
    }

    pub fn entity_set_id(&self, name: &str) -> Result<&EntitySetId, ResolutionError> {
        self.entity_set_ids
            .get(name)
            .ok_or_else(|| ResolutionError::UnknownEntitySet(name.to_string()))
    }

    pub fn property_type_id(&self, fqn: &str) -> Result<&PropertyTypeId, ConfigError> {
        self.property_type_ids
            .get(fqn)
            .ok_or_else(|| ConfigError::UnknownPropertyType(fqn.to_string()))
    }

    /// Reverse lookup used to report generated ids by entity-set name
    pub fn entity_set_name(&self, id: &str) -> Option<&str> {
        self.entity_set_ids
            .iter()
            .find(|(_, set_id)| set_id.as_str() == id)
            .map(|(name, _)| name.as_str())
    }

    /// Fails on the first name or FQN the lookup did not return
    pub fn ensure_complete(&self, names: &[String], fqns: &[Fqn]) -> Result<(), SubmitError> {
        for name in names {
            self.entity_set_id(name)?;
        }
        for fqn in fqns {
            self.property_type_id(fqn)?;
        }
        Ok(())
    }
}
