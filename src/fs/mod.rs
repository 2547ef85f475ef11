pub mod atomic;
pub mod paths;
