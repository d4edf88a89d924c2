pub mod lifecycle;
pub mod restart;
pub mod scheduling;
