//! Long-running engine tasks.
//!
//! | Task | Drives |
//! |------|--------|
//! | [`EntropyPump`] | seismic feed → validator → pending entropy or rotation |
//! | [`BlockProducer`] | pending work → propose → vote → finalize |

pub mod block_producer;
pub mod entropy_pump;

pub use block_producer::BlockProducer;
pub use entropy_pump::{Backoff, EntropyPump, PollOutcome};
