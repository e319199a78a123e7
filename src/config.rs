use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::color::Color;
use crate::error::ConfigError;
use crate::model::GraphicalGrid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderingOptions {
    pub antialias: bool,
    pub background_color: Color,
    pub drop_shadows: bool,
    pub needs_transparency: bool,
    pub render_debug_lines: bool,
}

impl Default for RenderingOptions {
    fn default() -> Self {
        Self {
            antialias: true,
            background_color: Color::WHITE,
            drop_shadows: true,
            needs_transparency: false,
            render_debug_lines: false,
        }
    }
}

impl RenderingOptions {
    /// Checks the options against the grid they will be used with. Later
    /// stages assume a validated configuration.
    pub fn validate(&self, grid: &GraphicalGrid) -> Result<(), ConfigError> {
        if !self.needs_transparency && !self.background_color.is_opaque() {
            return Err(ConfigError::TranslucentBackground(self.background_color));
        }
        if grid.width == 0 || grid.height == 0 {
            return Err(ConfigError::EmptyCanvas {
                width: grid.width,
                height: grid.height,
            });
        }
        if grid.cell_width == 0 || grid.cell_height == 0 {
            return Err(ConfigError::EmptyCell {
                width: grid.cell_width,
                height: grid.cell_height,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    antialias: Option<bool>,
    background_color: Option<Color>,
    drop_shadows: Option<bool>,
    needs_transparency: Option<bool>,
    render_debug_lines: Option<bool>,
}

pub fn load_options(path: Option<&Path>) -> anyhow::Result<RenderingOptions> {
    let Some(path) = path else {
        return Ok(RenderingOptions::default());
    };

    let contents = std::fs::read_to_string(path)?;
    parse_options(&contents)
}

pub fn parse_options(contents: &str) -> anyhow::Result<RenderingOptions> {
    let mut options = RenderingOptions::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(v) = parsed.antialias {
        options.antialias = v;
    }
    if let Some(v) = parsed.background_color {
        options.background_color = v;
    }
    if let Some(v) = parsed.drop_shadows {
        options.drop_shadows = v;
    }
    if let Some(v) = parsed.needs_transparency {
        options.needs_transparency = v;
    }
    if let Some(v) = parsed.render_debug_lines {
        options.render_debug_lines = v;
    }
    Ok(options)
}
