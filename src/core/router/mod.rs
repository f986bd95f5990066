//! Model router
//!
//! Decides which provider and model serve a request: routing rules first
//! (first match in priority order), then the highest priority provider that
//! is enabled and not unhealthy.
//!
//! ## Module Structure
//!
//! - `complexity` - Deterministic request complexity scoring
//! - `error` - Router error types
//! - `rules` - Rule condition matching and ordering
//! - `selection` - Provider ordering and model choice
//! - `router` - Snapshot management and the routing decision

pub mod complexity;
pub mod error;
pub mod router;
pub mod rules;
pub mod selection;


pub use complexity::{assess_complexity, complexity_score};
pub use error::RouterError;
pub use router::{AvailableProvider, ModelRouter, RouterSnapshot};
