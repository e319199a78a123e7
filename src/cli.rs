use crate::color::Color;
use crate::config::{RenderingOptions, load_options};
use crate::fonts::FontBook;
use crate::model::Diagram;
use crate::render::Renderer;
use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "ditaa-render", version, about = "Rasterize a laid-out ditaa diagram to PNG")]
pub struct Args {
    /// Diagram model (.json/.json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output PNG file
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Rendering options JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Disable anti-aliasing
    #[arg(long = "no-antialias")]
    pub no_antialias: bool,

    /// Disable drop shadows
    #[arg(long = "no-shadows")]
    pub no_shadows: bool,

    /// Allow a translucent background
    #[arg(long = "transparent")]
    pub transparent: bool,

    /// Draw the cell grid on top of the diagram
    #[arg(long = "debug-lines")]
    pub debug_lines: bool,

    /// Background color (#rrggbb or #rrggbbaa)
    #[arg(short = 'b', long = "background")]
    pub background: Option<Color>,

    /// Extra font file, may be repeated
    #[arg(long = "font")]
    pub fonts: Vec<PathBuf>,

    /// Raise log verbosity, may be repeated
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    /// Config file first, then flags on top.
    pub fn rendering_options(&self) -> Result<RenderingOptions> {
        let mut options = load_options(self.config.as_deref())
            .with_context(|| format!("failed to load options from {:?}", self.config))?;
        if self.no_antialias {
            options.antialias = false;
        }
        if self.no_shadows {
            options.drop_shadows = false;
        }
        if self.transparent {
            options.needs_transparency = true;
        }
        if self.debug_lines {
            options.render_debug_lines = true;
        }
        if let Some(color) = self.background {
            options.background_color = color;
        }
        Ok(options)
    }
}

pub fn run(args: &Args) -> Result<()> {
    let options = args.rendering_options()?;
    let input = read_input(args.input.as_deref())?;
    let diagram = Diagram::from_json5(&input).context("failed to parse diagram model")?;

    let mut fonts = FontBook::new();
    for font in &args.fonts {
        fonts
            .load_font_file(font)
            .with_context(|| format!("failed to load font {}", font.display()))?;
    }

    let image = Renderer::with_glyphs(fonts).render_to_file(&diagram, &args.output, options)?;
    if image.is_degraded() {
        eprintln!(
            "warning: {} element(s) could not be drawn",
            image.warnings().len()
        );
        for warning in image.warnings() {
            eprintln!("  {warning}");
        }
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()));
        }
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_overlay_defaults() {
        let args = Args::try_parse_from([
            "ditaa-render",
            "-o",
            "out.png",
            "--no-shadows",
            "--transparent",
            "-b",
            "#00000000",
            "-vv",
        ])
        .unwrap();
        let options = args.rendering_options().unwrap();
        assert!(!options.drop_shadows);
        assert!(options.antialias);
        assert!(options.needs_transparency);
        assert_eq!(options.background_color, Color::rgba(0, 0, 0, 0));
        assert_eq!(args.log_level(), LevelFilter::Debug);
    }

    #[test]
    fn output_is_required() {
        assert!(Args::try_parse_from(["ditaa-render", "-i", "model.json5"]).is_err());
    }

    #[test]
    fn rejects_malformed_background() {
        assert!(Args::try_parse_from(["ditaa-render", "-o", "out.png", "-b", "red"]).is_err());
    }
}
