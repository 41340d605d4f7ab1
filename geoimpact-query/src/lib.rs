//! Indicator computation for the geoimpact engine.
//!
//! A request names a sourcing location (geo-region, material, admin region),
//! a set of indicators and a calculation context. Computation is a pipeline
//! of pure steps followed by one I/O step:
//!
//! ```text
//! indicators ──► StrategyRegistry ──► QueryComposer ──► QueryBatch
//!                 (raw-value deps)     (dedup + bind)       │
//!                                                           ▼
//!        DatasetRegistry + RegionCellResolver ──► PlanResolver ──► ResolvedBatch
//!                                                                      │
//!                                                      PlanExecutor ◄──┘ (async I/O)
//!                                                           │
//!                                     RawValueBundle ──► strategy.finalize
//! ```
//!
//! Everything up to [`ResolvedBatch`] is synchronous and holds no shared
//! mutable state; the only shared resource is the expansion cache inside
//! the region resolver.
//!
//! # Modules
//!
//! - [`raw_value`]: Typed description of each raw value, shared by every context
//! - [`strategy`]: Indicator formula strategies and their registry
//! - [`binder`]: Calculation contexts and positional parameter binding
//! - [`plan`]: Query batches, sub-queries and resolved plans
//! - [`composer`]: Dependency-driven batch composition
//! - [`resolve`]: Registry and region resolution of a composed batch
//! - [`execute`]: Execution trait and the in-memory grid store
//! - [`bundle`]: Raw-value bundles
//! - [`engine`]: The `ImpactEngine` facade
//! - [`error`]: Error types

pub mod binder;
pub mod bundle;
pub mod composer;
pub mod engine;
pub mod error;
pub mod execute;
pub mod plan;
pub mod raw_value;
pub mod resolve;
pub mod strategy;

pub use binder::{
    ArgumentSource, BoundArguments, BoundParam, CalculationContext, ParamSlot, ParamValue,
    RowSource, SourcingColumn, SourcingLocation,
};
pub use bundle::RawValueBundle;
pub use composer::QueryComposer;
pub use engine::{BatchOutcome, ImpactEngine};
pub use error::{Dependency, ExecutionError, IndicatorError, QueryError, RawValueError};
pub use execute::{InMemoryGridStore, PlanExecutor};
pub use plan::{
    CoefficientLookup, GridAggregate, JoinTarget, OutputBinding, QueryBatch, ResolvedBatch,
    ResolvedPlan, ResolvedSubQuery, SubQuery,
};
pub use raw_value::{Combinator, GridInput, GridSpec, RawValueSpec, ResolutionPolicy};
pub use resolve::PlanResolver;
pub use strategy::{IndicatorFormula, IndicatorParams, IndicatorStrategy, StrategyRegistry};
