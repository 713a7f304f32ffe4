pub mod app;
pub mod error;
pub mod geometry;
pub mod scene;
pub mod upload;

pub use app::{App, Config};
pub use error::{Error, Result};
pub use upload::GpuScene;
