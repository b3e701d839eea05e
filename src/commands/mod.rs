pub mod live;
pub mod signal;
