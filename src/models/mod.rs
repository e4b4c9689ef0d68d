pub mod image;
pub mod relay;
pub mod text;

pub use image::*;
pub use relay::*;
pub use text::*;
