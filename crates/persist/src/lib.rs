//! Storage boundary and editing sessions for conceptdag.
//!
//! The graph core in [`conceptdag_graph`] never performs I/O. This crate wraps it
//! with the collaborators a host application supplies:
//!
//! - [`ModuleRepository`]: loads and saves the persisted concept records of a module
//! - [`ConceptCatalog`]: the universe of selectable concepts
//! - [`ModuleSession`]: one module opened for editing, tying the two together
//!
//! # Usage
//!
//! ```rust,ignore
//! use conceptdag_persist::{InMemoryRepository, ModuleSession, SessionConfig};
//! use conceptdag_graph::{ConceptId, ModuleId};
//!
//! let config = SessionConfig::default();
//! let mut session = ModuleSession::open(InMemoryRepository::new(), ModuleId(1), &config).await?;
//!
//! let root = session.graph().flat_list()[0].step_id;
//! session.graph_mut().assign_concept(root, ConceptId(10))?;
//! let summary = session.save().await?;
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod repository;
pub mod session;
pub mod tracing;

pub use catalog::{ComplexityTier, Concept, ConceptCatalog, StaticCatalog};
pub use config::{GraphSettings, LoggingSettings, SessionConfig, StorageSettings};
pub use error::{Error, Result};
pub use repository::{InMemoryRepository, JsonFileRepository, ModuleRepository, SaveSummary};
pub use session::ModuleSession;
pub use self::tracing::{LogLevel, TracingFormat, init_tracing};
