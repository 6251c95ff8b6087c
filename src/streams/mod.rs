mod delimited;
pub mod generators;
mod stream;

pub use delimited::DelimitedFileStream;
pub use generators::{LinearGenerator, SeaFunction, SeaGenerator};
pub use stream::ExampleStream;
