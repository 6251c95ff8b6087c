mod prequential;

pub use prequential::PrequentialRunner;
