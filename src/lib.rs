#[cfg(feature = "cli")]
pub mod cli;
pub mod color;
pub mod config;
pub mod error;
pub mod fonts;
pub mod model;
pub mod render;

#[cfg(feature = "cli")]
pub use cli::{Args, run};
pub use color::{Color, is_dark};
pub use config::RenderingOptions;
pub use error::{AssetError, ConfigError, OutputError, RenderError, RenderWarning};
pub use fonts::{FontBook, GlyphSource};
pub use model::{Diagram, GraphicalGrid, Shape, ShapeKind, TextLabel};
pub use render::{RenderedImage, Renderer, render_to_file, render_to_image};
