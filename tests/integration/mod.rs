//! End-to-end tests of the exposed operations, driven the way a host binding would.

mod common;
mod ownership;
mod reparse;
mod scenarios;
mod snapshots;
