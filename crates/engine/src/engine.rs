//! The engine: entry points and evaluation passes over a [`Store`].

use std::collections::BTreeMap;
use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info, warn};

use remedy_core::{
    ActiveMission, ActiveRemedy, Catalog, MissionPlaybook, MissionStatus, RemedyDefinition,
    StepResult,
};
use remedy_storage::{Archive, ArchiveEntry, NullArchive, RecordKind, StorageError, Store};

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::documents::{DocumentRequest, DocumentSink, NullDocuments};
use crate::error::EngineError;
use crate::machine;
use crate::monitor::{self, Escalation};
use crate::orchestrator::{self, Decision};
use crate::report::{Change, Fault, PassReport};
use crate::view::{MissionView, RemedyView};

/// Remedy and mission engine over a store.
///
/// The engine holds no instance state of its own. Every entry point and
/// every pass reads what it needs from the store and writes back with the
/// version it read, so a concurrent writer on the same instance surfaces as
/// a [`StorageError::ConcurrentConflict`] instead of a lost update.
pub struct Engine<S: Store> {
    catalog: Arc<Catalog>,
    store: S,
    archive: Arc<dyn Archive>,
    documents: Arc<dyn DocumentSink>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl<S: Store> Engine<S> {
    /// An engine with the system clock, no archive and no document sink.
    pub fn new(catalog: Arc<Catalog>, store: S) -> Self {
        Engine {
            catalog,
            store,
            archive: Arc::new(NullArchive),
            documents: Arc::new(NullDocuments),
            clock: Arc::new(SystemClock),
            config: EngineConfig::default(),
        }
    }

    pub fn with_archive(mut self, archive: Arc<dyn Archive>) -> Self {
        self.archive = archive;
        self
    }

    pub fn with_documents(mut self, documents: Arc<dyn DocumentSink>) -> Self {
        self.documents = documents;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    // ── Entry points ─────────────────────────────────────────────────────────

    /// Start a standalone remedy on the definition's first step.
    pub fn initiate_remedy(
        &self,
        definition_id: &str,
        variables: BTreeMap<String, String>,
    ) -> Result<ActiveRemedy, EngineError> {
        let definition = self.definition(definition_id)?;
        let mut remedy = machine::instantiate(
            definition,
            new_instance_id(),
            variables,
            None,
            self.clock.now(),
        )?;
        remedy.version = self.store.put_remedy(&remedy, None)?;
        info!(
            remedy = %remedy.instance_id,
            definition = %definition.id,
            step = %remedy.current_step_id,
            status = %remedy.status,
            "Remedy initiated"
        );
        self.request_document(definition, &remedy);
        Ok(remedy)
    }

    /// Record the outcome of the remedy's current step and advance it.
    pub fn report_step_result(
        &self,
        instance_id: &str,
        result: StepResult,
        notes: Option<String>,
    ) -> Result<ActiveRemedy, EngineError> {
        let remedy = self.store.get_remedy(instance_id)?;
        if remedy.is_closed() {
            return Err(EngineError::RemedyClosed {
                instance_id: remedy.instance_id,
                status: remedy.status,
            });
        }
        let definition = self.definition(&remedy.remedy_definition_id)?;
        let mut advanced = machine::advance(definition, &remedy, result, notes, self.clock.now())?;
        advanced.version = self.store.put_remedy(&advanced, Some(remedy.version))?;
        info!(
            remedy = %advanced.instance_id,
            from = %remedy.current_step_id,
            to = %advanced.current_step_id,
            result = %result,
            status = %advanced.status,
            "Step result recorded"
        );
        self.after_remedy_transition(definition, &advanced);
        Ok(advanced)
    }

    /// Create a mission on the playbook's first step. Its first remedy is
    /// started by the next orchestrator pass.
    pub fn launch_mission(
        &self,
        playbook_id: &str,
        variables: BTreeMap<String, String>,
    ) -> Result<ActiveMission, EngineError> {
        let playbook = self.playbook(playbook_id)?;
        let first = playbook
            .first_step()
            .ok_or_else(|| EngineError::EmptyPlaybook {
                playbook_id: playbook.id.clone(),
            })?;
        let mut mission = ActiveMission {
            instance_id: new_instance_id(),
            playbook_id: playbook.id.clone(),
            status: MissionStatus::InProgress,
            current_step_order: first.order,
            active_remedy_instance_id: None,
            variables,
            remedy_instance_ids: Vec::new(),
            started_at: self.clock.now(),
            concluded_at: None,
            version: 0,
        };
        mission.version = self.store.put_mission(&mission, None)?;
        info!(
            mission = %mission.instance_id,
            playbook = %playbook.id,
            order = mission.current_step_order,
            "Mission launched"
        );
        Ok(mission)
    }

    /// Abandon an open remedy. It closes as a failure, so a mission that
    /// owns it follows its failure transition on the next pass.
    pub fn cancel_remedy(&self, instance_id: &str) -> Result<ActiveRemedy, EngineError> {
        let remedy = self.store.get_remedy(instance_id)?;
        let mut cancelled = machine::cancel(&remedy, self.clock.now())?;
        cancelled.version = self.store.put_remedy(&cancelled, Some(remedy.version))?;
        info!(remedy = %cancelled.instance_id, "Remedy cancelled");
        self.archive_remedy(&cancelled);
        Ok(cancelled)
    }

    /// Abandon a mission. It concludes as failed and its open remedy, if
    /// any, is cancelled with it.
    pub fn cancel_mission(&self, instance_id: &str) -> Result<ActiveMission, EngineError> {
        let mission = self.store.get_mission(instance_id)?;
        if mission.is_terminal() {
            return Err(EngineError::MissionClosed {
                instance_id: mission.instance_id,
                status: mission.status,
            });
        }
        let now = self.clock.now();
        let mut concluded = mission.clone();
        concluded.status = MissionStatus::Failed;
        concluded.active_remedy_instance_id = None;
        concluded.concluded_at = Some(now);
        concluded.version = self.store.put_mission(&concluded, Some(mission.version))?;
        info!(mission = %concluded.instance_id, "Mission cancelled");
        self.archive_mission(&concluded);

        if let Some(remedy_id) = &mission.active_remedy_instance_id {
            match self.cancel_remedy(remedy_id) {
                Ok(_) | Err(EngineError::RemedyClosed { .. }) => {}
                Err(e) => warn!(
                    mission = %concluded.instance_id,
                    remedy = %remedy_id,
                    error = %e,
                    "Failed to cancel the mission's active remedy"
                ),
            }
        }
        Ok(concluded)
    }

    pub fn remedy_view(&self, instance_id: &str) -> Result<RemedyView, EngineError> {
        let remedy = self.store.get_remedy(instance_id)?;
        let definition = self.definition(&remedy.remedy_definition_id)?;
        RemedyView::build(definition, &remedy, self.clock.now())
    }

    pub fn mission_view(&self, instance_id: &str) -> Result<MissionView, EngineError> {
        let mission = self.store.get_mission(instance_id)?;
        let playbook = self.playbook(&mission.playbook_id)?;
        Ok(MissionView::build(playbook, &mission))
    }

    pub fn remedies(&self) -> Result<Vec<ActiveRemedy>, EngineError> {
        Ok(self.store.list_remedies()?)
    }

    pub fn missions(&self) -> Result<Vec<ActiveMission>, EngineError> {
        Ok(self.store.list_missions()?)
    }

    // ── Evaluation passes ────────────────────────────────────────────────────

    /// Deadline monitor pass: escalate every remedy whose response deadline
    /// is at or before now.
    ///
    /// Only a failure to list the store fails the pass. Problems with one
    /// remedy are recorded as faults and the pass moves on.
    pub fn sweep_deadlines(&self) -> Result<PassReport, EngineError> {
        let now = self.clock.now();
        let mut report = PassReport::default();
        for remedy in self.store.list_remedies()? {
            if !remedy.is_expired(now) {
                continue;
            }
            match self.escalate_one(&remedy, now) {
                Ok(Some(change)) => report.changes.push(change),
                Ok(None) => {}
                Err(e) => {
                    warn!(remedy = %remedy.instance_id, error = %e, "Skipping remedy in deadline sweep");
                    report
                        .faults
                        .push(Fault::new(RecordKind::Remedy, &remedy.instance_id, &e));
                }
            }
        }
        Ok(report)
    }

    /// Mission orchestrator pass: one decision per in-progress mission.
    pub fn orchestrate(&self) -> Result<PassReport, EngineError> {
        let now = self.clock.now();
        let mut report = PassReport::default();
        for mission in self.store.list_missions()? {
            if mission.is_terminal() {
                continue;
            }
            match self.orchestrate_one(&mission, now) {
                Ok(Some(change)) => report.changes.push(change),
                Ok(None) => {}
                Err(e) => {
                    warn!(mission = %mission.instance_id, error = %e, "Skipping mission in orchestration pass");
                    report
                        .faults
                        .push(Fault::new(RecordKind::Mission, &mission.instance_id, &e));
                }
            }
        }
        Ok(report)
    }

    /// One scheduler tick: a deadline sweep, then orchestrator passes until
    /// a pass changes nothing or `max_orchestration_passes` is reached.
    pub fn tick(&self) -> Result<PassReport, EngineError> {
        let mut report = self.sweep_deadlines()?;
        for _ in 0..self.config.max_orchestration_passes.max(1) {
            let pass = self.orchestrate()?;
            let settled = pass.changes.is_empty();
            report.merge(pass);
            if settled {
                break;
            }
        }
        if report.is_quiet() {
            debug!("Tick made no changes");
        } else {
            info!(
                changes = report.changes.len(),
                faults = report.faults.len(),
                "Tick complete"
            );
        }
        Ok(report)
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn escalate_one(
        &self,
        remedy: &ActiveRemedy,
        now: OffsetDateTime,
    ) -> Result<Option<Change>, EngineError> {
        let definition = self.definition(&remedy.remedy_definition_id)?;
        let mut escalated = match monitor::escalate(definition, remedy, now)? {
            Escalation::Escalated(escalated) => escalated,
            Escalation::NotDue => return Ok(None),
            Escalation::NoFailureTarget => {
                debug!(
                    remedy = %remedy.instance_id,
                    step = %remedy.current_step_id,
                    "Deadline passed but step has no failure target"
                );
                return Ok(None);
            }
        };
        escalated.version = self.store.put_remedy(&escalated, Some(remedy.version))?;
        info!(
            remedy = %escalated.instance_id,
            from = %remedy.current_step_id,
            to = %escalated.current_step_id,
            status = %escalated.status,
            "Remedy escalated after deadline"
        );
        self.after_remedy_transition(definition, &escalated);
        Ok(Some(Change::Escalated {
            remedy_instance_id: escalated.instance_id.clone(),
            from_step: remedy.current_step_id.clone(),
            to_step: escalated.current_step_id.clone(),
            status: escalated.status,
        }))
    }

    fn orchestrate_one(
        &self,
        mission: &ActiveMission,
        now: OffsetDateTime,
    ) -> Result<Option<Change>, EngineError> {
        let playbook = self.playbook(&mission.playbook_id)?;
        let remedy = match &mission.active_remedy_instance_id {
            Some(remedy_id) => match self.store.get_remedy(remedy_id) {
                Ok(remedy) => Some(remedy),
                Err(StorageError::NotFound { .. }) => None,
                Err(e) => return Err(e.into()),
            },
            None => None,
        };

        match orchestrator::decide(playbook, mission, remedy.as_ref())? {
            Decision::Idle => {
                debug!(mission = %mission.instance_id, "Mission has nothing to do");
                Ok(None)
            }
            Decision::StartRemedy {
                order,
                definition_id,
            } => self.start_mission_remedy(mission, order, &definition_id, now).map(Some),
            Decision::Advance { from, to } => {
                let mut advanced = mission.clone();
                advanced.current_step_order = to;
                advanced.active_remedy_instance_id = None;
                self.store.put_mission(&advanced, Some(mission.version))?;
                info!(
                    mission = %mission.instance_id,
                    from_order = from,
                    to_order = to,
                    "Mission advanced"
                );
                Ok(Some(Change::MissionAdvanced {
                    mission_instance_id: mission.instance_id.clone(),
                    from_order: from,
                    to_order: to,
                }))
            }
            Decision::Conclude(status) => {
                let mut concluded = mission.clone();
                concluded.status = status;
                concluded.active_remedy_instance_id = None;
                concluded.concluded_at = Some(now);
                concluded.version = self.store.put_mission(&concluded, Some(mission.version))?;
                info!(mission = %mission.instance_id, status = %status, "Mission concluded");
                self.archive_mission(&concluded);
                Ok(Some(Change::MissionConcluded {
                    mission_instance_id: mission.instance_id.clone(),
                    status,
                }))
            }
        }
    }

    /// Instantiate the remedy for the mission's current step and attach it.
    ///
    /// The remedy is written before the mission, so a mission never points
    /// at a remedy that was not stored. If the mission write fails the remedy
    /// is closed again.
    fn start_mission_remedy(
        &self,
        mission: &ActiveMission,
        order: u32,
        definition_id: &str,
        now: OffsetDateTime,
    ) -> Result<Change, EngineError> {
        let definition = self.definition(definition_id)?;
        let mut remedy = machine::instantiate(
            definition,
            new_instance_id(),
            mission.variables.clone(),
            Some(mission.instance_id.clone()),
            now,
        )?;
        remedy.version = self.store.put_remedy(&remedy, None)?;

        let mut attached = mission.clone();
        attached.active_remedy_instance_id = Some(remedy.instance_id.clone());
        attached.remedy_instance_ids.push(remedy.instance_id.clone());
        if let Err(e) = self.store.put_mission(&attached, Some(mission.version)) {
            self.discard_unattached(&remedy, now);
            return Err(e.into());
        }
        info!(
            mission = %mission.instance_id,
            remedy = %remedy.instance_id,
            definition = %definition.id,
            order,
            "Mission started remedy"
        );
        self.request_document(definition, &remedy);

        Ok(Change::RemedyStarted {
            mission_instance_id: mission.instance_id.clone(),
            remedy_instance_id: remedy.instance_id,
            definition_id: definition.id.clone(),
            order,
        })
    }

    /// Close a remedy whose mission could not be pointed at it, so the
    /// deadline monitor never picks it up.
    fn discard_unattached(&self, remedy: &ActiveRemedy, now: OffsetDateTime) {
        let closed = machine::cancel(remedy, now).and_then(|mut cancelled| {
            cancelled.version = self.store.put_remedy(&cancelled, Some(remedy.version))?;
            Ok(cancelled)
        });
        match closed {
            Ok(cancelled) => {
                warn!(
                    remedy = %remedy.instance_id,
                    mission = ?remedy.mission_instance_id,
                    "Closed remedy left unattached by a failed mission write"
                );
                self.archive_remedy(&cancelled);
            }
            Err(e) => warn!(
                remedy = %remedy.instance_id,
                error = %e,
                "Failed to close unattached remedy"
            ),
        }
    }

    fn after_remedy_transition(&self, definition: &RemedyDefinition, remedy: &ActiveRemedy) {
        if remedy.is_closed() {
            self.archive_remedy(remedy);
        } else {
            self.request_document(definition, remedy);
        }
    }

    fn request_document(&self, definition: &RemedyDefinition, remedy: &ActiveRemedy) {
        if let Some(request) = DocumentRequest::for_current_step(definition, remedy) {
            debug!(
                remedy = %remedy.instance_id,
                template = %request.template_id,
                "Requesting document"
            );
            self.documents.generate(request);
        }
    }

    fn archive_remedy(&self, remedy: &ActiveRemedy) {
        let closed_at = remedy.closed_at.unwrap_or_else(|| self.clock.now());
        if let Err(e) = self.archive.append(&ArchiveEntry::for_remedy(remedy, closed_at)) {
            warn!(remedy = %remedy.instance_id, error = %e, "Failed to archive closed remedy");
        }
    }

    fn archive_mission(&self, mission: &ActiveMission) {
        let closed_at = mission.concluded_at.unwrap_or_else(|| self.clock.now());
        if let Err(e) = self.archive.append(&ArchiveEntry::for_mission(mission, closed_at)) {
            warn!(mission = %mission.instance_id, error = %e, "Failed to archive concluded mission");
        }
    }

    fn definition(&self, definition_id: &str) -> Result<&RemedyDefinition, EngineError> {
        self.catalog
            .remedy(definition_id)
            .ok_or_else(|| EngineError::UnknownDefinition {
                definition_id: definition_id.to_string(),
            })
    }

    fn playbook(&self, playbook_id: &str) -> Result<&MissionPlaybook, EngineError> {
        self.catalog
            .playbook(playbook_id)
            .ok_or_else(|| EngineError::UnknownPlaybook {
                playbook_id: playbook_id.to_string(),
            })
    }
}

fn new_instance_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
