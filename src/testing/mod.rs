pub mod dummies;
pub mod stubs;

pub use dummies::{schema_binary, schema_numeric, schema_regression};
pub use stubs::VecStream;
