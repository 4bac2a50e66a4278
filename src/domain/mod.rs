pub mod ability;
pub mod ai;
pub mod entity;
pub mod geometry;
pub mod input;
pub mod physics;
pub mod rules;
