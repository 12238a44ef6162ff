#![deny(warnings)]
pub mod event;
pub mod history;
pub mod ledger;
pub mod model;
pub mod prob;
mod reducer;
pub mod state;
pub mod stats;
pub mod tracker;
