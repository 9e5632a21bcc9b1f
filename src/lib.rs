//! # stockroom
//!
//! Inventory catalog and audit service: category and product CRUD behind
//! a role-gated REST API, an append-only activity log written in the same
//! unit of work as every mutation, and reports derived from live data.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, CatalogClient)
//!     │
//!     ├── REST Handlers + extractors (api/)
//!     ├── IdentityGate (auth/)            bearer token → Actor
//!     │
//!     ├── CatalogService / ReportService (service/)
//!     ├── authorization policy + domain rules (domain/)
//!     │
//!     └── CatalogStore (store/)
//!           ├── MemoryStore   one RwLock over catalog + log
//!           └── PostgresStore one transaction per mutation
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod store;
