//! Behavioural tests for the chat service, run against both backends.
//!
//! - `harness.rs`     - Service construction over memory and mock Redis, helpers
//! - `ordering.rs`    - Per-channel publish order, no duplicates
//! - `replay.rs`      - Backlog replay and live tail meet without gap or overlap
//! - `isolation.rs`   - Channels never leak into each other
//! - `idle.rs`        - Idle ticks
//! - `equivalence.rs` - Memory and Redis produce the same sequences
//! - `scenarios.rs`   - End-to-end channel and message flows
//! - `errors.rs`      - Error taxonomy and terminal errors

mod equivalence;
