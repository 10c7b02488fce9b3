use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::SubmissionSettings;
use crate::errors::{ResolutionError, SubmitError};
use crate::logic::assemble::RequestAssembler;
use crate::logic::compiler::SubmissionCompiler;
use crate::logic::validate::ConfigValidator;
use crate::model::{
    DataGraph, EdmIds, FormValues, SubmissionConfig, SubmissionResult, UserContext,
};
use crate::store::traits::Store;

/// Where a submission currently is. Resolving and submitting are the only
/// phases that wait on the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    Idle,
    ResolvingEntitySetIds,
    Compiling,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub config: SubmissionConfig,
    #[serde(default)]
    pub values: FormValues,
    #[serde(default)]
    pub include_user_id: bool,
}

impl SubmissionRequest {
    pub fn new(config: SubmissionConfig, values: FormValues) -> Self {
        Self {
            config,
            values,
            include_user_id: false,
        }
    }

    pub fn including_user_id(mut self) -> Self {
        self.include_user_id = true;
        self
    }
}

/// Resolve → compile → write, for one submission at a time.
///
/// Every call starts over from [`SubmissionPhase::Idle`]; nothing carries
/// over between calls except the final phase, which stays readable.
pub struct SubmissionPipeline<'a, S: Store> {
    store: &'a S,
    settings: &'a SubmissionSettings,
    phase: SubmissionPhase,
}

impl<'a, S: Store> SubmissionPipeline<'a, S> {
    pub fn new(store: &'a S, settings: &'a SubmissionSettings) -> Self {
        Self {
            store,
            settings,
            phase: SubmissionPhase::Idle,
        }
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    /// Compile and write the submission, returning generated ids keyed by
    /// entity-set name
    pub async fn submit(
        &mut self,
        request: SubmissionRequest,
        user: &UserContext,
    ) -> Result<SubmissionResult, SubmitError> {
        self.advance(SubmissionPhase::Idle);
        let outcome = self.run(request, user).await;
        self.finish(&outcome);
        outcome
    }

    /// Like [`Self::submit`], handing the result to `callback` on success
    pub async fn submit_with_callback<F>(
        &mut self,
        request: SubmissionRequest,
        user: &UserContext,
        callback: F,
    ) -> Result<(), SubmitError>
    where
        F: FnOnce(SubmissionResult),
    {
        let result = self.submit(request, user).await?;
        callback(result);
        Ok(())
    }

    /// Dry run: validate, resolve and compile without writing
    pub async fn compile(
        &mut self,
        request: SubmissionRequest,
        user: &UserContext,
    ) -> Result<DataGraph, SubmitError> {
        self.advance(SubmissionPhase::Idle);
        let outcome = self.compile_only(&request, user).await;
        self.finish(&outcome);
        outcome
    }

    async fn compile_only(
        &mut self,
        request: &SubmissionRequest,
        user: &UserContext,
    ) -> Result<DataGraph, SubmitError> {
        let (edm, values) = self.prepare(request, user).await?;
        self.advance(SubmissionPhase::Compiling);
        SubmissionCompiler::new(&request.config, &edm).compile(&values)
    }

    async fn run(
        &mut self,
        request: SubmissionRequest,
        user: &UserContext,
    ) -> Result<SubmissionResult, SubmitError> {
        let (edm, values) = self.prepare(&request, user).await?;

        self.advance(SubmissionPhase::Compiling);
        let graph = SubmissionCompiler::new(&request.config, &edm).compile(&values)?;

        self.advance(SubmissionPhase::Submitting);
        let (entity_count, association_count) = (graph.entity_count(), graph.association_count());
        let ids = self
            .store
            .create_data_graph(graph)
            .await
            .map_err(SubmitError::Write)?;

        info!(
            "submission wrote {} entities and {} associations",
            entity_count, association_count
        );
        Ok(RequestAssembler::map_result(ids, &edm))
    }

    async fn prepare(
        &mut self,
        request: &SubmissionRequest,
        user: &UserContext,
    ) -> Result<(EdmIds, FormValues), SubmitError> {
        ConfigValidator::validate(&request.config)?;
        let edm = self.resolve(&request.config).await?;
        let values = self.with_user_id(&request.values, request.include_user_id, user);
        Ok((edm, values))
    }

    /// Fetch entity-set ids and property-type ids; both lookups must finish
    /// before anything is compiled
    async fn resolve(&mut self, config: &SubmissionConfig) -> Result<EdmIds, SubmitError> {
        self.advance(SubmissionPhase::ResolvingEntitySetIds);
        let names = config.entity_set_names();
        let fqns = config.property_fqns();

        let (entity_set_ids, property_type_ids) = tokio::try_join!(
            self.store.get_entity_set_ids(&names),
            self.store.get_property_type_ids(&fqns),
        )
        .map_err(ResolutionError::Lookup)?;

        let edm = EdmIds::new(entity_set_ids, property_type_ids);
        edm.ensure_complete(&names, &fqns)?;
        Ok(edm)
    }

    fn with_user_id(
        &self,
        values: &FormValues,
        include_user_id: bool,
        user: &UserContext,
    ) -> FormValues {
        let mut values = values.clone();
        if include_user_id {
            values.insert(
                &self.settings.user_id_field,
                Value::String(user.user_id.clone()),
            );
        }
        values
    }

    fn finish<T>(&mut self, outcome: &Result<T, SubmitError>) {
        match outcome {
            Ok(_) => {
                self.advance(SubmissionPhase::Succeeded);
            }
            Err(e) => {
                warn!("submission failed during {:?}: {}", self.phase, e);
                self.advance(SubmissionPhase::Failed);
            }
        }
    }

    fn advance(&mut self, phase: SubmissionPhase) {
        debug!("submission phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }
}
