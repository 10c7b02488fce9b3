use thiserror::Error;

/// Top-level error of a submission. Every kind aborts the whole submission.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The submission config is inconsistent or names unknown property types.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The entity data model could not resolve the config's names.
    #[error("resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// Form values do not have the shape the config expects.
    #[error("invalid value for field '{field}': {reason}")]
    InvalidValues { field: String, reason: String },

    /// The batch write was rejected or could not be delivered.
    #[error("write error: {0}")]
    Write(#[source] anyhow::Error),
}

impl SubmitError {
    pub fn invalid_values(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValues {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("alias '{0}' is declared more than once")]
    DuplicateAlias(String),

    #[error("association references unknown {role} alias '{alias}'")]
    UnknownAlias { alias: String, role: &'static str },

    #[error("alias '{0}' is used both as an association and as an association endpoint")]
    AliasRoleConflict(String),

    #[error("association alias '{0}' cannot reference an existing entity through idField")]
    AssociationWithIdField(String),

    #[error("no property type id for '{0}'")]
    UnknownPropertyType(String),
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("entity set '{0}' is not known to the entity data model")]
    UnknownEntitySet(String),

    #[error("entity data model lookup failed: {0}")]
    Lookup(#[source] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_offender() {
        let err: SubmitError = ConfigError::UnknownAlias {
            alias: "report".to_string(),
            role: "destination",
        }
        .into();
        assert_eq!(
            err.to_string(),
            "config error: association references unknown destination alias 'report'"
        );

        let err: SubmitError = ResolutionError::UnknownEntitySet("LPRZones".to_string()).into();
        assert!(err.to_string().contains("LPRZones"));

        let err = SubmitError::invalid_values("readId", "missing entity key");
        assert_eq!(err.to_string(), "invalid value for field 'readId': missing entity key");
    }
}
