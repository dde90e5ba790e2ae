pub mod board;
pub mod field;
pub mod page;
pub mod record;

pub use board::*;
pub use field::*;
pub use page::*;
pub use record::*;
