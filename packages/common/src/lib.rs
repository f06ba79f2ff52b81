pub mod collect;
pub mod visitor;

pub use collect::*;
pub use visitor::*;
