//! Test modules for the evaluation engine


#[cfg(test)]
mod rules_test;
