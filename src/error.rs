use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::color::Color;
use crate::fonts::FontUnavailable;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid rendering configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("cannot allocate a {width}x{height} raster")]
    Allocation { width: u32, height: u32 },
    #[error("cannot write image to {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: OutputError,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("background {0} is translucent but transparency is disabled")]
    TranslucentBackground(Color),
    #[error("raster size {width}x{height} is empty")]
    EmptyCanvas { width: u32, height: u32 },
    #[error("grid cell size {width}x{height} is empty")]
    EmptyCell { width: u32, height: u32 },
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("PNG encoding failed: {0}")]
    Encode(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("cannot read asset {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot decode PNG asset {}: {message}", path.display())]
    Png { path: PathBuf, message: String },
    #[error("cannot parse SVG asset {}: {source}", path.display())]
    Svg {
        path: PathBuf,
        #[source]
        source: usvg::Error,
    },
    #[error("asset {} has no drawable area", path.display())]
    Empty { path: PathBuf },
}

/// A non-fatal problem recovered during a render pass. The raster is still
/// complete, but some element was skipped.
#[derive(Debug, Error)]
pub enum RenderWarning {
    #[error("custom shape skipped: {0}")]
    Asset(#[from] AssetError),
    #[error("text in SVG asset {} is not rendered", path.display())]
    SvgText { path: PathBuf },
    #[error("label {text:?} skipped: {source}")]
    Font {
        text: String,
        #[source]
        source: FontUnavailable,
    },
}
