pub mod ai;
pub mod collision;
pub mod entity;
pub mod grid;
pub mod input;
pub mod physics;
pub mod player;
pub mod tile;
