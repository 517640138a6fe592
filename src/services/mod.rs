pub mod catalog;
pub mod resources;
pub mod votes;
