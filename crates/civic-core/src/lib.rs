//! Core types and trait definitions for the civic-issue gamification engine.
//!
//! No HTTP or database code lives here. The crate owns the point ledger
//! model, the level table, the badge rule engine, the per-user aggregator and
//! the leaderboard, all written against [`store::GamificationStore`].

// Trait methods spell out `+ Send` futures; the advisory lint is noise here.
#![allow(async_fn_in_trait)]

pub mod actions;
pub mod activity;
pub mod badge;
pub mod error;
pub mod leaderboard;
pub mod level;
pub mod points;
pub mod report;
pub mod stats;
pub mod store;
pub mod user;

pub use error::{Error, Result};
