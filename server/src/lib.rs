//! `StudyHub` Server
//!
//! Role-based access and moderation core for the study platform: role
//! resolution, the admin overview, role management and complaint handling.

pub mod admin;
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod moderation;
pub mod permissions;
pub mod store;
