pub mod campaign;
pub mod event;
pub mod game;
pub mod level;
pub mod progress;
pub mod session;
pub mod step;
