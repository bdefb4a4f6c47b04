pub mod camera;
pub mod event;
pub mod pool;
pub mod step;
pub mod world;
