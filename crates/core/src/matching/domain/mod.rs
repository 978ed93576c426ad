pub mod candidate_insertion;
pub mod matcher;
pub mod transcript;
