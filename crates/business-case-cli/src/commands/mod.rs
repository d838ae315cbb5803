pub mod prioritization;
pub mod projection;
