pub mod metrics;
pub mod simulate;
