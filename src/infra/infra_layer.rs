// The infra module contains implementations of core traits.
// Each platform integration goes in its own submodule.

#[path = "slack/mod.rs"]
pub mod slack;
