//! CLI command implementations

pub mod config;
pub mod link;
pub mod login;
pub mod logout;
pub mod scan;
pub mod spaces;
