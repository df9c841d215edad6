pub mod barrel;
pub mod entity;
pub mod grid;
pub mod rules;
pub mod runner;
pub mod tile;
