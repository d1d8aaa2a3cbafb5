//! Public orchestration façade: plan creation, chat turns and plan lookup.
//!
//! A service is built once at process start and shared by handle. It owns
//! the agent registry (immutable after construction), the per-turn agent
//! order and the session store.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::agents::{AgentBackend, AgentRegistry};
use crate::core::context::{ExecutionContext, USER_ROLE};
use crate::core::plan::derive_plan;
use crate::core::types::{OrchestratorRun, PlanSession, SessionState};
use crate::error::OrchestratorError;
use crate::io::config::OrchestratorConfig;
use crate::io::generator::{TextGenerator, generator_from_config};
use crate::pipeline::PipelineRunner;
use crate::store::SessionStore;

#[derive(Debug)]
pub struct OrchestratorService {
    registry: AgentRegistry,
    planner: String,
    runner: PipelineRunner,
    sessions: SessionStore,
}

impl OrchestratorService {
    /// Service over an explicit registry. `agent_order` is the per-turn order
    /// and should not include `planner`.
    pub fn new(
        registry: AgentRegistry,
        planner: impl Into<String>,
        agent_order: Vec<String>,
    ) -> Self {
        Self {
            registry,
            planner: planner.into(),
            runner: PipelineRunner::new(agent_order),
            sessions: SessionStore::new(),
        }
    }

    /// Service with the built-in agents backed by the configured generator.
    pub fn from_config(config: &OrchestratorConfig) -> Result<Self> {
        let generator = generator_from_config(&config.generator)?;
        Ok(Self::with_generator(config, generator))
    }

    /// Service with the built-in agents backed by `generator`.
    pub fn with_generator(config: &OrchestratorConfig, generator: Arc<dyn TextGenerator>) -> Self {
        let backend = AgentBackend::new(generator, config.prompt_budget_bytes);
        let registry = AgentRegistry::builtin(&backend, &config.navigator.root);
        Self::new(registry, config.planner.clone(), config.agent_order.clone())
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn planner(&self) -> &str {
        &self.planner
    }

    pub fn agent_order(&self) -> &[String] {
        self.runner.order()
    }

    /// Check that the planner and every agent in the turn order are registered.
    pub fn verify_agents(&self) -> Result<(), OrchestratorError> {
        self.registry.require(&self.planner)?;
        for name in self.runner.order() {
            self.registry.require(name)?;
        }
        Ok(())
    }

    /// Start a session for `goal` and derive its plan from the planner.
    #[instrument(skip_all, fields(planner = %self.planner))]
    pub fn create_plan(&self, goal: &str) -> Result<PlanSession, OrchestratorError> {
        let planner = self.registry.require(&self.planner)?;
        let session_id = Uuid::new_v4().to_string();
        let context = ExecutionContext::new(session_id.as_str(), Some(goal.to_string()));

        let result = planner
            .run(&context)
            .map_err(|err| OrchestratorError::agent_failed(&self.planner, err))?;
        let plan = derive_plan(&result);

        // Later turns read the steps from the planner artifact.
        let mut artifacts = BTreeMap::new();
        artifacts.insert(self.planner.clone(), result.metadata);

        let state = SessionState {
            session_id,
            goal: goal.to_string(),
            plan,
            history: Vec::new(),
            artifacts,
        };
        info!(
            session_id = %state.session_id,
            steps = state.plan.len(),
            "created plan"
        );
        let session = PlanSession::from(&state);
        self.sessions.put(state);
        Ok(session)
    }

    /// Run one chat turn: append the user message and walk the agent order.
    ///
    /// The session is updated only when the whole turn succeeds. Turns on the
    /// same session must not overlap; callers serialize them.
    #[instrument(skip_all, fields(session_id = %session_id))]
    pub fn handle_message(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<OrchestratorRun, OrchestratorError> {
        let state = self.sessions.get(session_id)?;
        let context = ExecutionContext::from_parts(
            state.session_id.as_str(),
            Some(state.goal.clone()),
            &state.history,
            &state.artifacts,
        )
        .with_message(USER_ROLE, message);

        let outcome = self.runner.run(&self.registry, context)?;

        let (history, artifacts) = outcome.context.into_parts();
        info!(
            agents = outcome.executions.len(),
            history_len = history.len(),
            "turn completed"
        );
        self.sessions.put(SessionState {
            history: history.clone(),
            artifacts,
            ..state
        });
        Ok(OrchestratorRun {
            session_id: session_id.to_string(),
            history,
            results: outcome.executions,
        })
    }

    pub fn get_plan(&self, session_id: &str) -> Result<PlanSession, OrchestratorError> {
        let state = self.sessions.get(session_id)?;
        Ok(PlanSession::from(&state))
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AgentResult;
    use crate::test_support::{StaticAgent, steps_metadata};
    use serde_json::json;

    fn stub_service() -> OrchestratorService {
        OrchestratorService::from_config(&OrchestratorConfig::default()).expect("service")
    }

    #[test]
    fn create_plan_uses_fallback_and_mentions_goal() {
        let service = stub_service();
        let session = service.create_plan("Ship MVP").expect("plan");

        assert!(!session.plan.is_empty());
        assert!(session.plan[0].contains("Ship MVP"));
        assert_eq!(session.goal, "Ship MVP");
        assert_eq!(service.get_plan(&session.session_id).expect("get"), session);
    }

    /// Any non-empty goal shows up unchanged in the first fallback step.
    #[test]
    fn first_step_renders_goal_verbatim() {
        let service = stub_service();
        for goal in ["  ", "\t", " Ship MVP ", "Déployer l'API 🚀", "line one\nline two"] {
            let session = service.create_plan(goal).expect("plan");
            assert_eq!(session.goal, goal);
            assert!(
                session.plan[0].contains(goal),
                "goal {goal:?} missing from {:?}",
                session.plan[0]
            );
        }

        let session = service.create_plan("").expect("plan");
        assert!(!session.plan.is_empty());
        assert!(session.plan[0].contains("Refine project requirements"));
    }

    #[test]
    fn session_ids_are_unique() {
        let service = stub_service();
        let a = service.create_plan("a").expect("a");
        let b = service.create_plan("b").expect("b");
        assert_ne!(a.session_id, b.session_id);
        assert_eq!(service.session_count(), 2);
    }

    #[test]
    fn unknown_session_is_not_found() {
        let service = stub_service();

        let err = service.handle_message("missing", "hi").unwrap_err();
        assert!(matches!(err, OrchestratorError::SessionNotFound(ref id) if id == "missing"));
        assert!(service.get_plan("missing").unwrap_err().is_not_found());
        assert_eq!(service.session_count(), 0);
    }

    /// End-to-end with the stock configuration.
    #[test]
    fn chat_turn_runs_every_configured_agent() {
        let service = stub_service();
        let session = service.create_plan("Ship MVP").expect("plan");

        let run = service
            .handle_message(&session.session_id, "Start execution")
            .expect("turn");

        assert_eq!(run.agent_names(), service.agent_order());
        assert_eq!(run.history[0].role, USER_ROLE);
        assert_eq!(run.history[0].content, "Start execution");
        assert_eq!(run.history.len(), 1 + service.agent_order().len());

        // The coder reads the steps published at plan creation.
        let coder = run
            .results
            .iter()
            .find(|r| r.agent == "coder")
            .expect("coder result");
        assert_eq!(coder.metadata.get("plan_steps"), Some(&json!(session.plan)));
    }

    #[test]
    fn history_is_append_only_across_turns() {
        let service = stub_service();
        let session = service.create_plan("goal").expect("plan");

        let first = service.handle_message(&session.session_id, "one").expect("first");
        let second = service.handle_message(&session.session_id, "two").expect("second");

        assert!(second.history.len() > first.history.len());
        assert_eq!(&second.history[..first.history.len()], first.history.as_slice());
        assert_eq!(second.history[first.history.len()].content, "two");
        assert_eq!(
            service.get_plan(&session.session_id).expect("plan").plan,
            session.plan,
            "plan is fixed at creation"
        );
    }

    #[test]
    fn structured_planner_steps_become_the_plan() {
        let mut registry = AgentRegistry::new();
        registry.register(Arc::new(StaticAgent::new(
            "planner",
            AgentResult::new("ignored\n- not this", steps_metadata(&["a", "b"])),
        )));
        let service = OrchestratorService::new(registry, "planner", Vec::new());

        let session = service.create_plan("g").expect("plan");
        assert_eq!(session.plan, vec!["a", "b"]);
    }

    #[test]
    fn missing_planner_is_unknown_agent() {
        let service = OrchestratorService::new(AgentRegistry::new(), "planner", Vec::new());
        let err = service.create_plan("g").unwrap_err();
        assert!(matches!(err, OrchestratorError::UnknownAgent(ref name) if name == "planner"));
        assert_eq!(service.session_count(), 0);
    }

    /// A failed turn leaves the stored session untouched, user message included.
    #[test]
    fn failed_turn_persists_nothing() {
        let mut registry = AgentRegistry::new();
        registry.register(Arc::new(StaticAgent::new("planner", AgentResult::text("- step"))));
        registry.register(Arc::new(StaticAgent::new("ok", AgentResult::text("fine"))));
        registry.register(Arc::new(StaticAgent::failing("broken", "boom")));
        let service = OrchestratorService::new(
            registry,
            "planner",
            vec!["ok".to_string(), "broken".to_string()],
        );
        let session = service.create_plan("g").expect("plan");
        assert_eq!(session.plan, vec!["step"]);

        let err = service.handle_message(&session.session_id, "hi").unwrap_err();
        assert!(matches!(err, OrchestratorError::AgentFailed { .. }));

        let state = service.sessions.get(&session.session_id).expect("state");
        assert!(state.history.is_empty());
        assert_eq!(state.artifacts.keys().collect::<Vec<_>>(), vec!["planner"]);
    }

    #[test]
    fn verify_agents_reports_unregistered_names() {
        let mut registry = AgentRegistry::new();
        registry.register(Arc::new(StaticAgent::new("planner", AgentResult::text(""))));
        let service = OrchestratorService::new(registry, "planner", vec!["ghost".to_string()]);

        let err = service.verify_agents().unwrap_err();
        assert!(matches!(err, OrchestratorError::UnknownAgent(ref name) if name == "ghost"));
    }
}
