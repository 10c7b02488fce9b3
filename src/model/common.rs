use uuid::Uuid;

pub type Id = String;

/// Backend id of an entity set, as returned by the EDM
pub type EntitySetId = Id;

/// Backend id of a property type, as returned by the EDM
pub type PropertyTypeId = Id;

/// Stable key of an entity that already exists in the graph store
pub type EntityKeyId = Id;

/// Fully-qualified property type name, e.g. `ol.name`
pub type Fqn = String;

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}
