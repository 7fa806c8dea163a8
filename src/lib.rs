pub mod cache;
pub mod cmd;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod infra;
pub mod services;
pub mod stash;
pub mod view;
pub mod workflow;

#[cfg(test)]
mod test_support;
