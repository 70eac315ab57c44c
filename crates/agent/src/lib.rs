//! The Alfred dialogue loop.
//!
//! 1. **Send** the message history and the tool descriptors to the model
//! 2. **If tool calls**: run each tool in emitted order, append the results, go to 1
//! 3. **If plain text**: that message is the answer
//!
//! Tool failures become conversation content the model can react to; model
//! failures and a runaway tool-cycle count abort the run.

pub mod loop_runner;

#[cfg(test)]
mod test_helpers;

pub use loop_runner::{DialogueLoop, LoopState, TOOL_ERROR_PREFIX, Transcript};
