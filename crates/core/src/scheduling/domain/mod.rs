pub mod constraint_validator;
pub mod insertion_scheduler;
pub mod plan;
pub mod planner;
pub mod rejection;
