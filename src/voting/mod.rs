pub mod processor;
pub mod tally;

pub use processor::cast_vote;
