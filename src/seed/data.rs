use anyhow::{anyhow, Result};
use serde_json::json;

use crate::model::{AssociationTemplate, EntityData, EntitySetTemplate, SubmissionConfig};
use crate::store::MemoryStore;

// Entity sets
pub const PEOPLE: &str = "LPRPeople";
pub const ALERTS: &str = "LPRAlerts";
pub const REPORTS: &str = "LPRReports";
pub const SAVED_ZONES: &str = "LPRSavedZones";
pub const VEHICLE_RECORDS: &str = "LPRVehicleRecords";
pub const REGISTERED_FOR: &str = "LPRRegisteredFor";

// Property types
pub const PERSON_ID: &str = "nc.SubjectIdentification";
pub const CASE_NUMBER: &str = "ol.casenumbertext";
pub const SEARCH_REASON: &str = "ol.searchreason";
pub const LICENSE_PLATE: &str = "vehicle.licensenumber";
pub const EXPIRATION_DATE: &str = "ol.expirationdate";
pub const NAME: &str = "ol.name";
pub const DESCRIPTION: &str = "ol.description";
pub const SEARCH_POLYGONS: &str = "ol.searchpolygons";
pub const DATE_LOGGED: &str = "ol.datelogged";

pub const PRESET_NAMES: [&str; 4] = ["alert", "report", "zone", "add-reads-to-report"];

fn user_template() -> EntitySetTemplate {
    EntitySetTemplate::new("user", PEOPLE)
        .with_id_field("userId")
        .with_field("userId", PERSON_ID)
}

fn registered_for() -> EntitySetTemplate {
    EntitySetTemplate::new("registeredFor", REGISTERED_FOR)
}

/// Officer → registeredFor → new plate alert
pub fn alert_config() -> SubmissionConfig {
    SubmissionConfig::new(
        vec![
            user_template(),
            EntitySetTemplate::new("alert", ALERTS)
                .with_field("caseNum", CASE_NUMBER)
                .with_field("searchReason", SEARCH_REASON)
                .with_field("plate", LICENSE_PLATE)
                .with_field("expirationDate", EXPIRATION_DATE),
            registered_for(),
        ],
        vec![AssociationTemplate::new("user", "registeredFor", "alert")],
    )
}

/// Officer → registeredFor → new report
pub fn report_config() -> SubmissionConfig {
    SubmissionConfig::new(
        vec![
            user_template(),
            EntitySetTemplate::new("report", REPORTS)
                .with_field("reportName", NAME)
                .with_field("caseNum", CASE_NUMBER)
                .with_field("description", DESCRIPTION),
            registered_for(),
        ],
        vec![AssociationTemplate::new("user", "registeredFor", "report")],
    )
}

/// Officer → registeredFor → saved map zone
pub fn zone_config() -> SubmissionConfig {
    SubmissionConfig::new(
        vec![
            user_template(),
            EntitySetTemplate::new("zone", SAVED_ZONES)
                .with_field("zoneName", NAME)
                .with_field("polygon", SEARCH_POLYGONS),
            registered_for(),
        ],
        vec![AssociationTemplate::new("user", "registeredFor", "zone")],
    )
}

/// Each read in `readIdsToAddToReport` → registeredFor → existing report
pub fn add_reads_to_report_config() -> SubmissionConfig {
    SubmissionConfig::new(
        vec![
            EntitySetTemplate::new("read", VEHICLE_RECORDS)
                .with_id_field("readId")
                .with_multiple_values_field("readIdsToAddToReport"),
            EntitySetTemplate::new("report", REPORTS).with_id_field("reportId"),
            registered_for(),
        ],
        vec![AssociationTemplate::new("read", "registeredFor", "report")],
    )
}

pub fn preset(name: &str) -> Option<SubmissionConfig> {
    match name {
        "alert" => Some(alert_config()),
        "report" => Some(report_config()),
        "zone" => Some(zone_config()),
        "add-reads-to-report" => Some(add_reads_to_report_config()),
        _ => None,
    }
}

/// Register every entity set and property type the presets use
pub fn register_presets(store: &MemoryStore) {
    for config in PRESET_NAMES.iter().filter_map(|name| preset(name)) {
        for name in config.entity_set_names() {
            store.register_entity_set(&name);
        }
        for fqn in config.property_fqns() {
            store.register_property_type(&fqn);
        }
    }
    // Reads carry properties of their own even though no preset writes them
    store.register_property_type(DATE_LOGGED);
}

/// Demo data: one officer keyed by `officer_id` and a few plate reads
pub fn load_sample_data(store: &MemoryStore, officer_id: &str) -> Result<Vec<String>> {
    register_presets(store);

    let entity_set = |name: &str| {
        store
            .entity_set_id(name)
            .ok_or_else(|| anyhow!("entity set {} not registered", name))
    };
    let property = |fqn: &str| {
        store
            .property_type_id(fqn)
            .ok_or_else(|| anyhow!("property type {} not registered", fqn))
    };

    let people = entity_set(PEOPLE)?;
    let person = EntityData::from([(property(PERSON_ID)?, vec![json!(officer_id)])]);
    store.insert_entity_with_key(&people, officer_id.to_string(), person)?;

    let reads = entity_set(VEHICLE_RECORDS)?;
    let mut read_ids = Vec::new();
    for (plate, logged) in [
        ("7ABC123", "2024-03-01T08:15:00Z"),
        ("4XYZ987", "2024-03-01T09:40:00Z"),
        ("7ABC123", "2024-03-02T17:05:00Z"),
    ] {
        let data = EntityData::from([
            (property(LICENSE_PLATE)?, vec![json!(plate)]),
            (property(DATE_LOGGED)?, vec![json!(logged)]),
        ]);
        read_ids.push(store.insert_entity(&reads, data)?);
    }

    Ok(read_ids)
}
