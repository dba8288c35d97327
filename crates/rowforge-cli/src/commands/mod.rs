pub mod generate;
pub mod preview;
pub mod strategies;
pub mod validate;
