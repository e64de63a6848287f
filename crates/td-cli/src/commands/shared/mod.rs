pub mod edit;
pub mod parse;
