//! Data Transfer Objects for REST request/response serialization.
//!
//! Field names are camelCase on the wire. Query parameters arrive as
//! strings and are parsed here so that malformed values surface as
//! `Invalid` errors with the standard error body.

pub mod auth_dto;
pub mod category_dto;
pub mod common_dto;
pub mod product_dto;
pub mod report_dto;

pub use auth_dto::*;
pub use category_dto::*;
pub use common_dto::*;
pub use product_dto::*;
pub use report_dto::*;
