//! Background judging: validate, encode, dispatch, poll, aggregate.

pub mod aggregator;
pub mod pipeline;
pub mod poller;
pub mod validator;

#[cfg(test)]
pub(crate) mod testing;

pub use pipeline::{JudgeError, JudgePipeline};
