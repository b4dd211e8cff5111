// Bodies are owned by the world; everything else refers to them by handle.

pub mod arena;
pub mod body;

pub use arena::*;
pub use body::*;
