pub mod index;

pub use index::{IndexField, IndexModel};
