//! Tracing and logging setup shared by every process that hosts the registry.

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Initialize plain-text logging for tests and local runs.
pub fn init_for_tests() {
    tracing::init_pretty();
}

/// Tracing configuration (filters, layers).
pub mod tracing;
