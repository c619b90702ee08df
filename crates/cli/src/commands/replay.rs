//! Replay a session script against a fresh cart session.
//!
//! # Usage
//!
//! ```bash
//! pf-cli replay crates/cli/scripts/thai_dinner.yaml
//! ```
//!
//! # Environment Variables
//!
//! - `PLATEFUL_TAX_RATE` - Tax rate override (default: 0.08)
//! - `PLATEFUL_BASE_DELIVERY_FEE` - Base delivery fee override (default: 2.99)

use std::path::Path;

use tracing::{debug, info, warn};

use plateful_cart::{Cart, CartSession, CartSnapshot, PricingConfig};

use crate::script::{Catalog, ScriptError, SessionScript, apply_step, load_script};

/// Summary of a replay.
#[derive(Debug)]
pub struct ReplayOutcome {
    /// Steps that ran to completion.
    pub applied: usize,
    /// Steps the cart rejected.
    pub rejected: usize,
    /// Final session state.
    pub snapshot: CartSnapshot,
}

/// Replay a script file and print the final snapshot as JSON.
///
/// # Errors
///
/// Returns an error if configuration or the script fails to load, or if a
/// step references something missing from the catalog.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let pricing = PricingConfig::from_env()?;
    info!(
        tax_rate = %pricing.tax_rate(),
        base_delivery_fee = %pricing.base_delivery_fee(),
        "Loaded pricing"
    );

    let script = load_script(path)?;
    info!(path = %path.display(), steps = script.steps.len(), "Loaded script");

    let outcome = replay(&script, pricing)?;
    info!(
        applied = outcome.applied,
        rejected = outcome.rejected,
        total = %outcome.snapshot.cart.totals().total,
        ready = outcome.snapshot.checkout_blockers.is_empty(),
        "Replay complete"
    );

    print_snapshot(&outcome.snapshot)?;
    Ok(())
}

/// Run every step of a script, continuing past rejected cart mutations.
///
/// # Errors
///
/// Returns `ScriptError` for anything other than a cart rejection.
pub fn replay(
    script: &SessionScript,
    pricing: PricingConfig,
) -> Result<ReplayOutcome, ScriptError> {
    let catalog = Catalog::from_script(script);
    let mut session = CartSession::new(pricing);
    session.subscribe(|cart: &Cart| {
        debug!(
            revision = cart.revision(),
            lines = cart.lines().len(),
            total = %cart.totals().total,
            "Cart changed"
        );
    });

    let mut applied = 0;
    let mut rejected = 0;
    for (index, step) in script.steps.iter().enumerate() {
        match apply_step(&mut session, &catalog, step) {
            Ok(()) => applied += 1,
            Err(ScriptError::Cart(e)) => {
                warn!(step = index, error = %e, "Step rejected");
                rejected += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(ReplayOutcome {
        applied,
        rejected,
        snapshot: session.snapshot(),
    })
}

#[allow(clippy::print_stdout)]
fn print_snapshot(snapshot: &CartSnapshot) -> Result<(), serde_json::Error> {
    let json = serde_json::to_string_pretty(snapshot)?;
    println!("{json}");
    Ok(())
}
