//! Access gate
//!
//! Guard consulted before any protected command runs. It reads the session
//! store synchronously and decides what happens instead of, or before, the
//! requested action. The gate keeps no state of its own and performs no I/O;
//! every evaluation is fresh.

use crate::session::SessionStore;

/// Outcome of a gate evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The session store has not finished hydration; show a wait notice
    Loading,
    /// No authenticated session. Carries the originally requested target so
    /// a successful login can send the user back to it.
    RedirectToLogin { from: String },
    /// Authenticated, inactive subscription, but trial days left. Blocking
    /// countdown screen; re-running the request is the "continue" action.
    TrialActive {
        days_remaining: i64,
        patient_limit: u32,
    },
    /// Authenticated with no usable subscription: trial ran out, or no
    /// snapshot is stored at all (fail closed)
    TrialExpired,
    /// Active subscription; the requested content may run
    Allow,
}

/// Evaluates the gate for a protected target.
///
/// Subscription state is only consulted after the authentication check. A
/// missing subscription snapshot counts as zero days remaining and lands in
/// [`Verdict::TrialExpired`], never in [`Verdict::TrialActive`].
pub fn evaluate(session: &SessionStore, requested: &str) -> Verdict {
    if !session.is_hydrated() {
        return Verdict::Loading;
    }

    if !session.is_authenticated() {
        return Verdict::RedirectToLogin {
            from: requested.to_owned(),
        };
    }

    if session.is_subscription_active() {
        return Verdict::Allow;
    }

    let days_remaining = session.days_remaining();
    if days_remaining > 0 {
        Verdict::TrialActive {
            days_remaining,
            patient_limit: session.patient_limit(),
        }
    } else {
        Verdict::TrialExpired
    }
}
