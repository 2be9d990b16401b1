//! Scenario-based tests for devstack

mod failure_handling;
mod success_chain;
mod teardown_policy;
