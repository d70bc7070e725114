pub mod alert;
pub mod checklist;
pub mod common;
pub mod completions;
pub mod config;
pub mod delete;
pub mod edit;
pub mod list;
pub mod new;
pub mod relocate;
pub mod show;
pub mod sync;
