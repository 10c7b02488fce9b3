use crate::errors::SubmitError;
use crate::logic::assemble::RequestAssembler;
use crate::logic::association_compiler::AssociationCompiler;
use crate::logic::entity_compiler::EntityCompiler;
use crate::model::{DataGraph, EdmIds, FormValues, SubmissionConfig};

/// Pure compile step: config + resolved ids + form values → batch payload.
///
/// All state (alias table, creation lists, edge lists) lives for a single
/// call to [`SubmissionCompiler::compile`].
pub struct SubmissionCompiler<'a> {
    config: &'a SubmissionConfig,
    edm: &'a EdmIds,
}

impl<'a> SubmissionCompiler<'a> {
    pub fn new(config: &'a SubmissionConfig, edm: &'a EdmIds) -> Self {
        Self { config, edm }
    }

    pub fn compile(&self, values: &FormValues) -> Result<DataGraph, SubmitError> {
        let entities = EntityCompiler::new(self.config, self.edm).compile(values)?;
        let associations = AssociationCompiler::new(self.config, self.edm).compile(&entities)?;
        Ok(RequestAssembler::assemble(entities, associations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssociationTemplate, EntitySetTemplate};
    use serde_json::json;
    use std::collections::HashMap;

    fn edm() -> EdmIds {
        EdmIds::new(
            HashMap::from([
                ("LPRPeople".to_string(), "es-people".to_string()),
                ("LPRAlerts".to_string(), "es-alerts".to_string()),
                ("LPRVehicleRecords".to_string(), "es-reads".to_string()),
                ("LPRReports".to_string(), "es-reports".to_string()),
                ("LPRRegisteredFor".to_string(), "es-registered".to_string()),
            ]),
            HashMap::from([
                ("nc.SubjectIdentification".to_string(), "pt-person-id".to_string()),
                ("ol.casenumber".to_string(), "pt-case".to_string()),
                ("ol.searchreason".to_string(), "pt-reason".to_string()),
                ("vehicle.licensenumber".to_string(), "pt-plate".to_string()),
                ("ol.expirationdate".to_string(), "pt-expiration".to_string()),
                ("ol.name".to_string(), "pt-name".to_string()),
                ("ol.description".to_string(), "pt-description".to_string()),
            ]),
        )
    }

    fn values(json: serde_json::Value) -> FormValues {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_simple_alert() {
        let config = SubmissionConfig::new(
            vec![
                EntitySetTemplate::new("user", "LPRPeople")
                    .with_id_field("userId")
                    .with_field("userId", "nc.SubjectIdentification"),
                EntitySetTemplate::new("alert", "LPRAlerts")
                    .with_field("caseNum", "ol.casenumber")
                    .with_field("searchReason", "ol.searchreason")
                    .with_field("plate", "vehicle.licensenumber")
                    .with_field("expirationDate", "ol.expirationdate"),
                EntitySetTemplate::new("registeredFor", "LPRRegisteredFor"),
            ],
            vec![AssociationTemplate::new("user", "registeredFor", "alert")],
        );
        let edm = edm();
        let graph = SubmissionCompiler::new(&config, &edm)
            .compile(&values(json!({
                "userId": "officer-7",
                "caseNum": "2024-0042",
                "searchReason": "stolen vehicle",
                "plate": "7ABC123",
                "expirationDate": "2024-12-31T00:00:00Z"
            })))
            .unwrap();

        assert_eq!(graph.entity_count(), 1);
        let alert = &graph.entities["es-alerts"][0];
        assert_eq!(alert.len(), 4);
        assert_eq!(alert["pt-plate"], vec![json!("7ABC123")]);
        assert!(!graph.entities.contains_key("es-people"));

        assert_eq!(graph.association_count(), 1);
        let edge = &graph.associations["es-registered"][0];
        assert_eq!(edge.src_entity_set_id, "es-people");
        assert_eq!(edge.src_entity_key_id.as_deref(), Some("officer-7"));
        assert_eq!(edge.dst_entity_set_id, "es-alerts");
        assert_eq!(edge.dst_entity_index, Some(0));
    }

    #[test]
    fn test_reads_added_to_existing_report() {
        let config = SubmissionConfig::new(
            vec![
                EntitySetTemplate::new("read", "LPRVehicleRecords")
                    .with_id_field("readId")
                    .with_multiple_values_field("readIdsToAddToReport"),
                EntitySetTemplate::new("report", "LPRReports").with_id_field("reportId"),
                EntitySetTemplate::new("registeredFor", "LPRRegisteredFor"),
            ],
            vec![AssociationTemplate::new("read", "registeredFor", "report")],
        );
        let edm = edm();
        let graph = SubmissionCompiler::new(&config, &edm)
            .compile(&values(json!({
                "reportId": "report-1",
                "readIdsToAddToReport": [{"readId": "a"}, {"readId": "b"}, {"readId": "c"}]
            })))
            .unwrap();

        assert_eq!(graph.entity_count(), 0);
        let edges = &graph.associations["es-registered"];
        assert_eq!(edges.len(), 3);
        let sources: Vec<_> = edges
            .iter()
            .map(|e| e.src_entity_key_id.clone().unwrap())
            .collect();
        assert_eq!(sources, vec!["a", "b", "c"]);
        for edge in edges {
            assert_eq!(edge.dst_entity_key_id.as_deref(), Some("report-1"));
            assert_eq!(edge.src_entity_index, None);
        }
    }

    #[test]
    fn test_all_empty_form_writes_nothing() {
        let config = SubmissionConfig::new(
            vec![
                EntitySetTemplate::new("user", "LPRPeople").with_id_field("userId"),
                EntitySetTemplate::new("report", "LPRReports")
                    .with_field("reportName", "ol.name")
                    .with_field("description", "ol.description"),
                EntitySetTemplate::new("registeredFor", "LPRRegisteredFor"),
            ],
            vec![AssociationTemplate::new("user", "registeredFor", "report")],
        );
        let edm = edm();
        let graph = SubmissionCompiler::new(&config, &edm)
            .compile(&values(json!({"userId": "officer-7", "reportName": "", "description": null})))
            .unwrap();

        assert!(graph.is_empty());
    }

    #[test]
    fn test_aliases_sharing_entity_set_are_isolated() {
        let config = SubmissionConfig::new(
            vec![
                EntitySetTemplate::new("owner", "LPRPeople").with_field("ownerName", "ol.name"),
                EntitySetTemplate::new("driver", "LPRPeople").with_field("driverName", "ol.name"),
                EntitySetTemplate::new("alert", "LPRAlerts")
                    .with_field("plate", "vehicle.licensenumber"),
                EntitySetTemplate::new("registeredFor", "LPRRegisteredFor"),
            ],
            vec![AssociationTemplate::new("driver", "registeredFor", "alert")],
        );
        let edm = edm();
        let graph = SubmissionCompiler::new(&config, &edm)
            .compile(&values(json!({"ownerName": "Owner", "driverName": "Driver", "plate": "X1"})))
            .unwrap();

        assert_eq!(graph.entities["es-people"].len(), 2);
        let edges = &graph.associations["es-registered"];
        assert_eq!(edges.len(), 1);
        // driver was compiled second, so it holds index 1 of the people list
        assert_eq!(edges[0].src_entity_index, Some(1));
        assert_eq!(graph.entities["es-people"][1]["pt-name"], vec![json!("Driver")]);
    }

    fn optional_vehicle_config() -> SubmissionConfig {
        SubmissionConfig::new(
            vec![
                EntitySetTemplate::new("vehicle", "LPRVehicleRecords")
                    .with_id_field("vehicleId")
                    .with_ignore_if_false(&["linkVehicle"]),
                EntitySetTemplate::new("alert", "LPRAlerts").with_field("n", "ol.name"),
                EntitySetTemplate::new("registeredFor", "LPRRegisteredFor"),
            ],
            vec![AssociationTemplate::new("vehicle", "registeredFor", "alert")],
        )
    }

    #[test]
    fn test_falsy_gate_drops_existing_participant() {
        let config = optional_vehicle_config();
        let edm = edm();
        let compiler = SubmissionCompiler::new(&config, &edm);

        let graph = compiler
            .compile(&values(json!({"n": "x", "linkVehicle": false})))
            .unwrap();
        assert_eq!(graph.entity_count(), 1);
        assert!(graph.associations.is_empty());

        let graph = compiler
            .compile(&values(json!({"n": "x", "linkVehicle": false, "vehicleId": "v1"})))
            .unwrap();
        assert!(graph.associations.is_empty());

        let graph = compiler
            .compile(&values(json!({"n": "x", "linkVehicle": true, "vehicleId": "v1"})))
            .unwrap();
        let edges = &graph.associations["es-registered"];
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].src_entity_key_id.as_deref(), Some("v1"));
    }

    #[test]
    fn test_fieldless_participant_keeps_its_edge() {
        let config = SubmissionConfig::new(
            vec![
                EntitySetTemplate::new("marker", "LPRPeople"),
                EntitySetTemplate::new("alert", "LPRAlerts").with_field("n", "ol.name"),
                EntitySetTemplate::new("registeredFor", "LPRRegisteredFor"),
            ],
            vec![AssociationTemplate::new("marker", "registeredFor", "alert")],
        );
        let edm = edm();
        let graph = SubmissionCompiler::new(&config, &edm)
            .compile(&values(json!({"n": "x"})))
            .unwrap();

        assert_eq!(graph.entities["es-people"].len(), 1);
        assert!(graph.entities["es-people"][0].is_empty());
        let edges = &graph.associations["es-registered"];
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].src_entity_set_id, "es-people");
        assert_eq!(edges[0].src_entity_index, Some(0));
        assert_eq!(edges[0].dst_entity_index, Some(0));
    }

    #[test]
    fn test_unknown_property_type_fails_compile() {
        let config = SubmissionConfig::new(
            vec![EntitySetTemplate::new("report", "LPRReports")
                .with_field("reportName", "ol.unknown")],
            vec![],
        );
        let edm = edm();
        let err = SubmissionCompiler::new(&config, &edm)
            .compile(&values(json!({"reportName": "x"})))
            .unwrap_err();
        assert!(matches!(err, SubmitError::Config(_)));
    }
}
