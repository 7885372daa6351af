pub mod navigator;
pub mod schedule;
