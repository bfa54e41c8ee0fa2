//! Hierarchical parameter subsystem.
//!
//! # Data Flow
//! ```text
//! DefaultParamsFactory (process-wide root, swappable)
//!     → client store      (ParamStore::with_parent(root))
//!     → connection store  (ParamStore::with_parent(client))
//!     → request store     (ParamStore::with_parent(connection))
//!
//! Lookup: local map → parent → ... → root → None
//! ```
//!
//! # Design Decisions
//! - Parents are shared (`Arc`), never owned by a single child
//! - Each store serializes access to its own map; chain reads are not
//!   snapshot isolated
//! - Typed getters fail loudly on coercion errors instead of defaulting
//! - Absent values fall back to the caller-supplied default

pub mod connection;
pub mod defaults;
pub mod names;
pub mod store;
pub mod value;

pub use connection::ConnectionParams;
pub use defaults::{default_params, set_params_factory, DefaultParamsFactory, ParamsFactory};
pub use store::ParamStore;
pub use value::{ParamError, ParamValue};
