pub mod common;
pub mod creator;
pub mod post;

pub use common::*;
pub use creator::*;
pub use post::*;
