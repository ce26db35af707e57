//! Operator evaluation modules
//!
//! This module contains the evaluation of leaf expressions for the evaluator.

mod comparison;
mod membership;
mod percent;

pub(crate) use comparison::{evaluate_relational, resolve};
pub(crate) use membership::{evaluate_contains, evaluate_in_ip_range};
pub use percent::{client_key, percent_matches, random_matches, MAC_PARAM, SERVICE_ACCOUNT_ID_PARAM};
