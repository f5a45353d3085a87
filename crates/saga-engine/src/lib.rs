//! Saga test engine: drives effect-yielding sagas without side effects.
//!
//! ```text
//! saga yields effect → resolve against mapping → resume with substitute → …
//!                     └─ PUT effects recorded, never substituted
//! ```
//!
//! The saga is any [`Saga`]: a step function answering `resume(value)` with
//! the next yielded value and a `done` flag. Substitutes come from an
//! [`EnvMapping`], matched with a pluggable [`StructuralEq`]. The engine
//! returns the ordered list of PUT effects the saga attempted.

pub mod effect;
pub mod engine;
pub mod equality;
pub mod error;
pub mod mapping;
pub mod saga;

pub use effect::{is_nested_put_effect, is_put_effect, Effect};
pub use engine::{saga_test_engine, EngineConfig, RunReport, SagaTestEngine};
pub use equality::{DeepEqual, StructuralEq};
pub use error::{ensure, EngineError, EngineResult, SagaError};
pub use mapping::{get_next_val, is_nested_array_mapping, resolve, EffectMap, EnvMapping};
pub use saga::{saga_fn, try_saga_fn, FnSaga, Saga, SagaFactory, ScriptedSaga, Step};
pub use saga_types::{render, Value, PUT_KEY};
