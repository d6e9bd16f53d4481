pub mod dynamodb;
pub mod in_memory;
pub mod models;
pub mod store;

pub use dynamodb::*;
pub use in_memory::*;
pub use models::*;
pub use store::*;
