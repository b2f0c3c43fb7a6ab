//! Permission system types and utilities.
//!
//! Accounts carry one of three closed roles. The resolver turns an identity
//! into a [`SessionRole`] that gated components receive explicitly.

pub mod resolver;
pub mod role;

pub use resolver::{
    resolve_assignment, resolve_role, resolve_session, SessionContext, SessionRole,
};
pub use role::{Role, UnknownRole};
