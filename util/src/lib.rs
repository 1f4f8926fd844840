pub mod error;
pub mod grid;
pub mod pos;
pub mod time;

pub use bitcode;
