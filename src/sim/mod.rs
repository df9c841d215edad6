pub mod driver;
pub mod event;
pub mod level;
pub mod pool;
pub mod session;
pub mod step;
