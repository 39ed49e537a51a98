use ansi_to_html::{Converter, Markup, Scheme};
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Where tarantula's report is captured when no input is named.
pub const DEFAULT_INPUT: &str = "tarantula.out";

#[derive(Debug, Parser)]
#[command(about = "Renders ANSI-colored terminal output, such as a tarantula report, as HTML")]
pub struct Args {
    /// File to convert, or `-` for stdin
    #[arg(default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Print only the converted text with inline styles, without the document around it
    #[arg(long)]
    pub fragment: bool,

    /// Use inline styles instead of a stylesheet
    #[arg(long, conflicts_with = "fragment")]
    pub inline: bool,

    /// Black text on a light background
    #[arg(long)]
    pub light: bool,

    /// Document title
    #[arg(long, default_value = "", conflicts_with = "fragment")]
    pub title: String,
}

impl Args {
    pub fn converter(&self) -> Converter {
        let scheme = if self.light {
            Scheme::Light
        } else {
            Scheme::Dark
        };
        let markup = if self.inline {
            Markup::Inline
        } else {
            Markup::Classes
        };
        Converter::new()
            .scheme(scheme)
            .markup(markup)
            .title(self.title.as_str())
    }
}

/// Reads the whole input as UTF-8.
pub fn load(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .lock()
            .read_to_string(&mut text)
            .wrap_err("failed to read stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).wrap_err_with(|| format!("failed to read {}", path.display()))
}

pub fn emit(html: &str, out: &mut impl Write) -> io::Result<()> {
    out.write_all(html.as_bytes())?;
    out.write_all(b"\n")?;
    out.flush()
}

/// Converts `args.input` and writes the HTML to `out`. Nothing is written unless the input was
/// read completely.
pub fn run(args: &Args, out: &mut impl Write) -> Result<()> {
    let ansi = load(&args.input)?;
    log::info!("Read {} bytes from {}", ansi.len(), args.input.display());

    let converter = args.converter();
    let html = if args.fragment {
        converter.convert_fragment(&ansi)
    } else {
        converter.convert(&ansi)
    };

    emit(&html, out).wrap_err("failed to write HTML")
}
