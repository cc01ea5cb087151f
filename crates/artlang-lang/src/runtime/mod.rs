pub mod input;
pub mod interpreter;
pub mod scheduler;
pub mod value;
