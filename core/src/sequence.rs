//! Strictly sequential execution of several requests on one manager.
//!
//! # Design
//! Steps are closures that start an exchange, not futures, so nothing is
//! sent before its turn: a step is only called once the previous future has
//! resolved and its response has been accumulated. The manager is shared by
//! reference with every step and callback, which is why its configuration
//! sits behind interior mutability rather than `&mut`.

use std::future::Future;

use crate::error::{CallbackFault, ManagerError};
use crate::manager::RequestManager;
use crate::response::Response;
use crate::transport::Transport;

impl<R: Response, T: Transport> RequestManager<R, T> {
    /// Run `steps` one at a time, feeding each resolved response to
    /// `accumulate`.
    ///
    /// A step is not started until the previous step's future has resolved
    /// and `accumulate` has returned `Ok` for it. `finish` runs once after the
    /// last step. The first failure, whether a rejected step or an
    /// accumulator error, goes to `fail` and no further steps are started;
    /// `finish` then never runs.
    ///
    /// A transport fault is not a failure here: it resolves the step with a
    /// not-okay response, which the accumulator sees like any other.
    pub async fn run_sequence<I, S, Fut, A, F, E>(
        &self,
        steps: I,
        mut accumulate: A,
        finish: F,
        fail: E,
    ) where
        I: IntoIterator<Item = S>,
        S: FnOnce() -> Fut,
        Fut: Future<Output = Result<R, ManagerError>>,
        A: FnMut(&R, &Self) -> Result<(), CallbackFault>,
        F: FnOnce(&Self),
        E: FnOnce(ManagerError, &Self),
    {
        for (index, step) in steps.into_iter().enumerate() {
            let outcome = match step().await {
                Ok(response) => accumulate(&response, self).map_err(ManagerError::Callback),
                Err(e) => Err(e),
            };
            if let Err(err) = outcome {
                tracing::warn!(step = index, error = %err, "sequence aborted");
                fail(err, self);
                return;
            }
        }
        tracing::debug!("sequence finished");
        finish(self);
    }
}
