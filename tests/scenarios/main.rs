//! Scenario-based tests for profiler-pipeline

mod helpers;

mod ddl_then_extract;
mod failure_handling;
mod store_modes;
