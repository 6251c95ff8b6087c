pub mod attributes;
pub mod estimators;
pub mod example;
pub mod id_gen;
