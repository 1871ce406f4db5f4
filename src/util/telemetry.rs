//! Structured logging setup.

/// Install a default env-filtered fmt subscriber unless the embedding
/// process already set one. Formatting and rotation beyond this are the
/// embedder's concern.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
