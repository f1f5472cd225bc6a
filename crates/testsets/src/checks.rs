//! Glue between the check macros and [`Outcome`].

use crate::outcome::{Location, Outcome};
use crate::stack::Stack;
use std::any::Any;

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[doc(hidden)]
pub fn __check_outcome(
    expression: &str,
    result: std::thread::Result<bool>,
    location: Location,
) -> Outcome {
    match result {
        Ok(true) => Outcome::pass(expression),
        Ok(false) => Outcome::fail(expression)
            .at(location)
            .with_stack(Stack::capture()),
        Err(payload) => Outcome::error(expression, panic_message(&*payload))
            .at(location)
            .with_stack(Stack::capture()),
    }
}

#[doc(hidden)]
pub fn __compare_outcome(
    expression: &str,
    result: std::thread::Result<(bool, String)>,
    location: Location,
) -> Outcome {
    match result {
        Ok((true, _)) => Outcome::pass(expression),
        Ok((false, evaluated)) => Outcome::fail(expression)
            .with_evaluated(evaluated)
            .at(location)
            .with_stack(Stack::capture()),
        Err(payload) => __check_outcome(expression, Err(payload), location),
    }
}

#[doc(hidden)]
pub fn __broken_outcome(
    expression: &str,
    result: std::thread::Result<bool>,
    location: Location,
) -> Outcome {
    // A broken check that panics is still just broken.
    Outcome::from_broken_check(expression, matches!(result, Ok(true))).at(location)
}
