//! Response validation.
//!
//! Evaluates named predicates against a response and records one
//! `Validation` per predicate, in declaration order.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use pulse_domain::{ResponseSpec, Validation};
use thiserror::Error;

/// Error a fallible predicate may return instead of a verdict.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct PredicateError(pub String);

type CheckFn = dyn Fn(&ResponseSpec) -> Result<bool, PredicateError> + Send + Sync;

/// A named boolean check against a response.
///
/// Checks must be pure: they may run against any response and must not
/// depend on evaluation order.
pub struct Predicate {
    description: String,
    check: Box<CheckFn>,
}

impl Predicate {
    /// Creates a predicate from an infallible check.
    #[must_use]
    pub fn new<F>(description: impl Into<String>, check: F) -> Self
    where
        F: Fn(&ResponseSpec) -> bool + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            check: Box::new(move |response| Ok(check(response))),
        }
    }

    /// Creates a predicate from a check that may fail to produce a verdict.
    #[must_use]
    pub fn fallible<F>(description: impl Into<String>, check: F) -> Self
    where
        F: Fn(&ResponseSpec) -> Result<bool, PredicateError> + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            check: Box::new(check),
        }
    }

    /// Passes when the status equals `code`.
    #[must_use]
    pub fn status_is(description: impl Into<String>, code: u16) -> Self {
        Self::new(description, move |response| response.status == code)
    }

    /// Passes when the status is one of `codes`.
    #[must_use]
    pub fn status_in(description: impl Into<String>, codes: &'static [u16]) -> Self {
        Self::new(description, move |response| codes.contains(&response.status))
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Evaluates predicates against responses.
#[derive(Debug, Default, Clone, Copy)]
pub struct Validator;

impl Validator {
    /// Creates a validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Evaluates every predicate against `response`.
    ///
    /// The output has exactly one entry per predicate, in input order. A
    /// predicate that errors or panics is recorded as failed under its own
    /// description.
    #[must_use]
    pub fn evaluate(&self, response: &ResponseSpec, predicates: &[Predicate]) -> Vec<Validation> {
        predicates
            .iter()
            .map(|predicate| self.evaluate_one(response, predicate))
            .collect()
    }

    fn evaluate_one(&self, response: &ResponseSpec, predicate: &Predicate) -> Validation {
        let outcome = catch_unwind(AssertUnwindSafe(|| (predicate.check)(response)));
        let passed = match outcome {
            Ok(Ok(passed)) => passed,
            Ok(Err(err)) => {
                tracing::warn!(
                    predicate = %predicate.description,
                    error = %err,
                    "predicate could not be evaluated"
                );
                false
            }
            Err(_) => {
                tracing::warn!(predicate = %predicate.description, "predicate panicked");
                false
            }
        };

        Validation {
            description: predicate.description.clone(),
            passed,
        }
    }
}
