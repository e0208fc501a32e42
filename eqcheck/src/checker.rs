//! The driver loop shared by the count-based checkers

use crate::application_scheme::ApplicationScheme;
use crate::dd_function::DdFunction;
use crate::error::CheckError;
use crate::task_manager::TaskManager;
use eqcheck_dd::Package;
use std::sync::atomic::{AtomicBool, Ordering};

/// Interleave both circuits' gates onto the running diagram(s)
///
/// `state2` selects the topology: `Some` runs each side on its own
/// diagram (construction, simulation), `None` runs both sides on
/// `state1` (the alternating checker's shared diagram). After the joint
/// loop each side drains its remaining gates one at a time.
///
/// Returns `Ok(false)` when the cancellation flag fired before the
/// walk completed.
pub(crate) fn run_checking_loop<F: DdFunction>(
    pkg: &mut Package,
    scheme: &ApplicationScheme,
    tm1: &mut TaskManager<'_>,
    tm2: &mut TaskManager<'_>,
    state1: &mut F,
    mut state2: Option<&mut F>,
    done: &AtomicBool,
) -> Result<bool, CheckError> {
    loop {
        if done.load(Ordering::Relaxed) {
            return Ok(false);
        }
        tm1.apply_swap_operations();
        tm2.apply_swap_operations();
        if tm1.finished() || tm2.finished() {
            break;
        }
        let (left, right) = scheme.step_counts(tm1);
        tm1.advance(pkg, state1, left)?;
        match state2.as_deref_mut() {
            Some(s2) => tm2.advance(pkg, s2, right)?,
            None => tm2.advance(pkg, state1, right)?,
        }
    }

    while !tm1.finished() {
        if done.load(Ordering::Relaxed) {
            return Ok(false);
        }
        tm1.advance(pkg, state1, 1)?;
    }
    while !tm2.finished() {
        if done.load(Ordering::Relaxed) {
            return Ok(false);
        }
        match state2.as_deref_mut() {
            Some(s2) => tm2.advance(pkg, s2, 1)?,
            None => tm2.advance(pkg, state1, 1)?,
        }
    }
    Ok(true)
}
