//! Typed vocabulary of the scheduling-constraint engine.
//!
//! - `BlockCategory` / `ClauseRole`: which facet a block describes and which clause it sits in
//! - `BlockDetails`: category-tagged parameter shapes
//! - `BlockDefinition`: catalog entries and the per-rule copies made from them
//! - `ExceptionOperator`: how the main and secondary clause combine
//! - `Rule` / `Blueprint`: the resolved rule and the partial description it is built from

mod block;
mod blueprint;
mod category;
mod details;
mod operator;
mod rule;

pub use block::*;
pub use blueprint::*;
pub use category::*;
pub use details::*;
pub use operator::*;
pub use rule::*;
