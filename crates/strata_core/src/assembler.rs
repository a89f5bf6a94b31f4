//! Stack assembly.
//!
//! The assembler drives one environment from a raw [`ConfigBundle`] to an
//! ordered plan and export registry:
//!
//! ```text
//! Init -> Validating -> PolicyResolved -> GraphBuilt -> Exported -> Done
//! ```
//!
//! Any step may fail, which moves the run to `Failed` and stops it. There are
//! no retries; a new run starts from a new assembler.

use tracing::{debug, error, info};

use strata_config::{ConfigBundle, ConfigValidator, EnvironmentName, ValidatedConfig};
use strata_graph::{CompositionGraph, ExecutionPlan, ExportRegistry};
use strata_policy::{PolicyBundle, PolicyResolver};

use crate::error::{AssemblyError, AssemblyResult, Stage, StageError};
use crate::state::AssemblyState;

/// Everything one successful run produced.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub env: EnvironmentName,
    pub stack_name: String,
    pub description: String,
    pub config: ValidatedConfig,
    pub policy: PolicyBundle,
    pub plan: ExecutionPlan,
    pub exports: ExportRegistry,
}

/// Runs the assembly state machine for one bundle.
pub struct StackAssembler {
    bundle: ConfigBundle,
    state: AssemblyState,
    history: Vec<AssemblyState>,
}

impl StackAssembler {
    pub fn new(bundle: ConfigBundle) -> Self {
        Self {
            bundle,
            state: AssemblyState::Init,
            history: vec![AssemblyState::Init],
        }
    }

    pub fn state(&self) -> &AssemblyState {
        &self.state
    }

    /// Every state the run has been in, starting with `Init`.
    pub fn history(&self) -> &[AssemblyState] {
        &self.history
    }

    fn transition(&mut self, next: AssemblyState) -> Result<(), StageError> {
        if !self.state.can_transition_to(&next) {
            return Err(StageError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        debug!("Assembly state {} -> {}", self.state, next);
        self.state = next.clone();
        self.history.push(next);
        Ok(())
    }

    fn fail(&mut self, stage: Stage, source: impl Into<StageError>) -> AssemblyError {
        let source = source.into();
        error!("Assembly failed during {}: {}", stage, source);

        let failed = AssemblyState::Failed {
            stage,
            error: source.to_string(),
        };
        if self.state.can_transition_to(&failed) {
            self.state = failed.clone();
            self.history.push(failed);
        }
        AssemblyError::new(stage, source)
    }

    fn step(&mut self, next: AssemblyState) -> AssemblyResult<()> {
        let stage = next.stage();
        self.transition(next).map_err(|e| self.fail(stage, e))
    }

    /// Validate, resolve policy, compose and register exports.
    pub fn run(&mut self) -> AssemblyResult<Assembly> {
        self.step(AssemblyState::Validating)?;
        let config = ConfigValidator::validate(&self.bundle)
            .map_err(|e| self.fail(Stage::Validation, e))?;
        info!("Validated configuration for {}", config.env);

        let policy = PolicyResolver::resolve(config.env, Some(&config.policy_overrides));
        self.step(AssemblyState::PolicyResolved)?;
        info!(
            "Resolved policy for {}: removal {}, log retention {} days",
            policy.env,
            policy.removal_policy(),
            policy.log_retention_days
        );

        let plan = CompositionGraph::build(&config, &policy)
            .map_err(|e| self.fail(Stage::Composition, e))?;
        self.step(AssemblyState::GraphBuilt)?;

        let mut exports = ExportRegistry::new();
        plan.register_exports(config.env, &mut exports)
            .map_err(|e| self.fail(Stage::Export, e))?;
        self.step(AssemblyState::Exported)?;
        info!("Registered {} exports for {}", exports.len(), config.env);

        let env = config.env;
        let assembly = Assembly {
            env,
            stack_name: format!("MainStack-{}", env),
            description: format!("Strata stack for the {} environment", env),
            config,
            policy,
            plan,
            exports,
        };

        self.step(AssemblyState::Done)?;
        info!("Assembled {} with {} nodes", assembly.stack_name, assembly.plan.len());
        Ok(assembly)
    }
}

/// Assemble a bundle in a fresh run.
pub fn assemble(bundle: ConfigBundle) -> AssemblyResult<Assembly> {
    StackAssembler::new(bundle).run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successful_run_history() {
        let mut assembler = StackAssembler::new(ConfigBundle::new("dev"));
        let assembly = assembler.run().unwrap();

        assert_eq!(assembly.stack_name, "MainStack-dev");
        assert_eq!(assembler.state(), &AssemblyState::Done);
        let names: Vec<_> = assembler.history().iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec!["init", "validating", "policy_resolved", "graph_built", "exported", "done"]
        );
    }

    #[test]
    fn test_validation_failure_stops_before_graph() {
        let mut assembler = StackAssembler::new(ConfigBundle::new("qa"));
        let err = assembler.run().unwrap_err();

        assert_eq!(err.stage, Stage::Validation);
        assert!(matches!(err.source, StageError::Validation(_)));
        assert!(matches!(
            assembler.state(),
            AssemblyState::Failed {
                stage: Stage::Validation,
                ..
            }
        ));
        assert!(!assembler
            .history()
            .iter()
            .any(|s| *s == AssemblyState::GraphBuilt));
    }

    #[test]
    fn test_second_run_is_rejected() {
        let mut assembler = StackAssembler::new(ConfigBundle::new("dev"));
        assembler.run().unwrap();
        let err = assembler.run().unwrap_err();
        assert!(matches!(err.source, StageError::InvalidTransition { .. }));
        assert_eq!(assembler.state(), &AssemblyState::Done);
    }
}
