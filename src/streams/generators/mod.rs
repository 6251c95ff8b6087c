mod linear;
pub mod sea;

pub use linear::LinearGenerator;
pub use sea::{SeaFunction, SeaGenerator};
