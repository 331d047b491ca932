pub mod file;
pub mod selection;
