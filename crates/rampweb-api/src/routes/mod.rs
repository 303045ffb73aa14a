//! Route modules for the HTTP server
//!
//! - transactions: transaction page, list fragments, approval toggles
//! - gateway: JSON access to the local data gateway
//!
//! The transactions module follows the usual split:
//! - mod.rs: module declaration and exports
//! - api.rs: JSON and HTMX endpoints
//! - page.rs: full page and fragment rendering

pub mod gateway;
pub mod transactions;
