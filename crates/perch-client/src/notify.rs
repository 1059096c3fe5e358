//! User-facing notification seam (toast analog).

use tracing::{error, info};

/// Surface operation outcomes to the user. UIs plug in their own toast
/// implementation; headless consumers get structured logs.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn failure(&self, message: &str);
}

/// Default notifier that reports through tracing.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        info!(target: "perch_client::notify", outcome = "success", "{message}");
    }

    fn failure(&self, message: &str) {
        error!(target: "perch_client::notify", outcome = "failure", "{message}");
    }
}
