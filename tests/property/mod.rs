//! Property-based tests for plan ordering, convergence and idempotence

mod convergence;
