//! The coroutine capability the engine drives.
//!
//! A saga is resumed one step at a time with a substitute value and answers
//! with the next yielded value plus a `done` flag, mirroring a generator's
//! `next(value) -> { value, done }` protocol.

use crate::error::SagaError;
use saga_types::Value;
use std::collections::VecDeque;

/// Result of resuming a saga once.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// The yielded value, or the return value when `done`.
    pub value: Value,
    pub done: bool,
}

impl Step {
    /// The saga suspended on `value`.
    pub fn yielded(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            done: false,
        }
    }

    /// The saga returned `value`.
    pub fn done(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            done: true,
        }
    }
}

/// A suspended effect-yielding computation.
///
/// The first `resume` starts the saga; its input is the engine's initial
/// substitute and is usually ignored, as a generator ignores its first
/// `next` argument.
pub trait Saga {
    fn resume(&mut self, input: Value) -> Result<Step, SagaError>;
}

impl<S: Saga + ?Sized> Saga for Box<S> {
    fn resume(&mut self, input: Value) -> Result<Step, SagaError> {
        (**self).resume(input)
    }
}

/// Instantiates a fresh saga from the run's initial arguments.
pub trait SagaFactory {
    type Saga: Saga;

    fn start(&self, args: Vec<Value>) -> Self::Saga;
}

impl<F, S> SagaFactory for F
where
    F: Fn(Vec<Value>) -> S,
    S: Saga,
{
    type Saga = S;

    fn start(&self, args: Vec<Value>) -> S {
        self(args)
    }
}

/// A saga backed by a closure over `(step index, resumed input)`.
pub struct FnSaga<F> {
    step: usize,
    f: F,
}

impl<F> Saga for FnSaga<F>
where
    F: FnMut(usize, Value) -> Result<Step, SagaError>,
{
    fn resume(&mut self, input: Value) -> Result<Step, SagaError> {
        let step = (self.f)(self.step, input)?;
        self.step += 1;
        Ok(step)
    }
}

/// Build a saga from a fallible step closure.
pub fn try_saga_fn<F>(f: F) -> FnSaga<F>
where
    F: FnMut(usize, Value) -> Result<Step, SagaError>,
{
    FnSaga { step: 0, f }
}

/// Build a saga from an infallible step closure.
pub fn saga_fn<F>(mut f: F) -> FnSaga<impl FnMut(usize, Value) -> Result<Step, SagaError>>
where
    F: FnMut(usize, Value) -> Step,
{
    try_saga_fn(move |step, input| Ok(f(step, input)))
}

/// A saga that yields a fixed script of values in order, then returns a final
/// value. Inputs do not steer the script but are recorded in [`resumed`].
///
/// [`resumed`]: ScriptedSaga::resumed
#[derive(Debug, Clone, Default)]
pub struct ScriptedSaga {
    script: VecDeque<Value>,
    output: Value,
    finished: bool,
    resumed: Vec<Value>,
}

impl ScriptedSaga {
    pub fn new(script: impl IntoIterator<Item = Value>) -> Self {
        Self {
            script: script.into_iter().collect(),
            output: Value::Undefined,
            finished: false,
            resumed: Vec::new(),
        }
    }

    /// Set the value returned once the script is exhausted.
    pub fn returning(mut self, output: impl Into<Value>) -> Self {
        self.output = output.into();
        self
    }

    /// Every value this saga was resumed with, in order.
    pub fn resumed(&self) -> &[Value] {
        &self.resumed
    }

    /// A factory producing a fresh copy of this script per run.
    pub fn factory(self) -> impl Fn(Vec<Value>) -> ScriptedSaga {
        move |_: Vec<Value>| self.clone()
    }
}

impl Saga for ScriptedSaga {
    fn resume(&mut self, input: Value) -> Result<Step, SagaError> {
        self.resumed.push(input);
        if self.finished {
            return Ok(Step::done(Value::Undefined));
        }
        match self.script.pop_front() {
            Some(value) => Ok(Step::yielded(value)),
            None => {
                self.finished = true;
                Ok(Step::done(std::mem::take(&mut self.output)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_saga_yields_then_returns() {
        let mut saga = ScriptedSaga::new([Value::from("a"), Value::from("b")]).returning(7);
        assert_eq!(saga.resume(Value::Undefined).unwrap(), Step::yielded("a"));
        assert_eq!(saga.resume(Value::from(1)).unwrap(), Step::yielded("b"));
        assert_eq!(saga.resume(Value::from(2)).unwrap(), Step::done(7));
        assert_eq!(saga.resume(Value::Undefined).unwrap(), Step::done(Value::Undefined));
    }

    #[test]
    fn test_scripted_saga_records_inputs() {
        let mut saga = ScriptedSaga::new([Value::from("a"), Value::from("a")]);
        assert!(saga.resumed().is_empty());
        saga.resume(Value::Undefined).unwrap();
        saga.resume(Value::from(1)).unwrap();
        saga.resume(Value::from(1)).unwrap();
        saga.resume(Value::put("late")).unwrap();
        assert_eq!(
            saga.resumed(),
            &[
                Value::Undefined,
                Value::from(1),
                Value::from(1),
                Value::put("late"),
            ]
        );
    }

    #[test]
    fn test_factory_copies_start_unrecorded() {
        let factory = ScriptedSaga::new([Value::from("a")]).factory();
        let mut first = factory.start(vec![]);
        first.resume(Value::from(9)).unwrap();
        assert_eq!(first.resumed(), &[Value::from(9)]);
        assert!(factory.start(vec![]).resumed().is_empty());
    }

    #[test]
    fn test_fn_saga_counts_steps() {
        let mut seen = Vec::new();
        let mut saga = saga_fn(|step, input| {
            seen.push((step, input));
            if step < 2 {
                Step::yielded(step as i64)
            } else {
                Step::done(Value::Undefined)
            }
        });
        assert_eq!(saga.resume(Value::Undefined).unwrap(), Step::yielded(0));
        assert_eq!(saga.resume(Value::from("x")).unwrap(), Step::yielded(1));
        assert!(saga.resume(Value::from("y")).unwrap().done);
        drop(saga);
        assert_eq!(seen[1], (1, Value::from("x")));
    }

    #[test]
    fn test_try_saga_fn_propagates_error() {
        let mut saga = try_saga_fn(|_, _| Err("boom".into()));
        let err = saga.resume(Value::Undefined).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_closure_factory() {
        let factory = |args: Vec<Value>| ScriptedSaga::new(args);
        let mut saga = factory.start(vec![Value::from(1)]);
        assert_eq!(saga.resume(Value::Undefined).unwrap(), Step::yielded(1));
    }
}
