//! The driver loop.
//!
//! Starts a saga, then repeatedly resolves the last yielded value against the
//! environment mapping and resumes the saga with the substitute, until the
//! saga reports `done`. Every PUT-shaped value the saga produces is recorded.
//!
//! A yielded value needs a mapping entry unless it is the saga's first yield,
//! an `Undefined` yield, or a PUT (single or batched). The first yield is
//! usually a setup step and is resumed with `Undefined` when unmapped. A
//! missing entry aborts the run with an assertion error that renders the
//! offending value.

use crate::effect::Effect;
use crate::equality::{DeepEqual, StructuralEq};
use crate::error::{EngineError, EngineResult};
use crate::mapping::{resolve_effective, EnvMapping};
use crate::saga::{Saga, SagaFactory};
use saga_types::{render, Value};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Engine settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of resumptions before the run is aborted.
    /// `None` drives until the saga finishes, however long that takes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<u64>,
}

/// Everything observed during one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// PUT effects in yield order.
    pub puts: Vec<Value>,
    /// Number of times the saga was resumed.
    pub steps: u64,
    /// The substitute passed on each resumption, in order.
    pub resumed: Vec<Value>,
}

/// Deterministic driver for effect-yielding sagas.
#[derive(Debug, Clone, Default)]
pub struct SagaTestEngine<E = DeepEqual> {
    config: EngineConfig,
    equality: E,
}

impl SagaTestEngine {
    /// An engine with deep equality and no step ceiling.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: StructuralEq> SagaTestEngine<E> {
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Abort runs still going after `limit` resumptions.
    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.config.max_steps = Some(limit);
        self
    }

    /// Replace the equality used to match yielded values against keys.
    pub fn with_equality<E2: StructuralEq>(self, equality: E2) -> SagaTestEngine<E2> {
        SagaTestEngine {
            config: self.config,
            equality,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Drive a saga to completion and return the PUT effects it produced.
    pub fn run<F: SagaFactory>(
        &self,
        factory: &F,
        mapping: &EnvMapping,
        args: Vec<Value>,
    ) -> EngineResult<Vec<Value>> {
        self.run_with_report(factory, mapping, args)
            .map(|report| report.puts)
    }

    /// Like [`run`](Self::run), also reporting step count and substitutes.
    pub fn run_with_report<F: SagaFactory>(
        &self,
        factory: &F,
        mapping: &EnvMapping,
        args: Vec<Value>,
    ) -> EngineResult<RunReport> {
        let mut saga = factory.start(args);
        let mut current = Value::Undefined;
        let mut done = false;
        let mut report = RunReport::default();

        while !done {
            if let Some(limit) = self.config.max_steps {
                if report.steps >= limit {
                    warn!(limit, "saga did not finish within the step limit");
                    return Err(EngineError::StepLimitExceeded { limit });
                }
            }

            let found = resolve_effective(&current, mapping, &self.equality);
            let is_put = Effect::classify(&current).is_put();
            // Steps 0 and 1 examine the initial `Undefined` and the first yield.
            let first_yield = report.steps <= 1;
            let acceptable = first_yield || found.is_some() || current.is_undefined() || is_put;
            if !acceptable {
                warn!(step = report.steps, effect = %current, "no mapping entry for yielded effect");
                return Err(EngineError::Assertion(format!(
                    "Env Mapping is missing a value for {}",
                    render(&current)
                )));
            }

            let substitute = found.cloned().unwrap_or_default();
            debug!(
                step = report.steps,
                found = found.is_some(),
                put = is_put,
                "resuming saga"
            );
            trace!(substitute = %substitute, "substitute");

            let next = saga.resume(substitute.clone()).map_err(EngineError::Saga)?;
            report.resumed.push(substitute);
            current = next.value;
            done = next.done;

            if Effect::classify(&current).is_put() {
                report.puts.push(current.clone());
            }
            report.steps += 1;
        }

        debug!(
            steps = report.steps,
            puts = report.puts.len(),
            "saga finished"
        );
        Ok(report)
    }
}

/// Drive `factory`'s saga with the default engine.
pub fn saga_test_engine<F: SagaFactory>(
    factory: &F,
    mapping: &EnvMapping,
    args: Vec<Value>,
) -> EngineResult<Vec<Value>> {
    SagaTestEngine::new().run(factory, mapping, args)
}
