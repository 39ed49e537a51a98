//! Converts text containing ANSI escape sequences into HTML.
//!
//! ```
//! let html = ansi_to_html::Converter::new()
//!     .title("build log")
//!     .convert("\x1b[31merror\x1b[0m: oops");
//! assert!(html.contains("error</span>: oops"));
//! ```

mod ansi;
mod perform;
mod renderer;
mod style;

pub use ansi::{Color, Scheme};
pub use renderer::{Markup, Renderer};
pub use style::{Style, Styles};

#[rustfmt::skip]
macro_rules! document_format {
    () => {
r#"<!DOCTYPE html>
<html>
<head>
<meta http-equiv="Content-Type" content="text/html; charset=utf-8">
<title>{title}</title>
<style type="text/css">
.body_foreground {{ color: {foreground}; }}
.body_background {{ background-color: {background}; }}
.ansi2html-content {{ display: inline; white-space: pre-wrap; word-wrap: break-word; }}
{css}</style>
</head>
<body class="body_foreground body_background" style="font-size: normal;">
<pre class="ansi2html-content">
{body}
</pre>
</body>
</html>"#
    }
}

/// Conversion settings. The defaults produce a complete dark-background document styled through
/// CSS classes.
#[derive(Clone, Debug, Default)]
pub struct Converter {
    scheme: Scheme,
    markup: Markup,
    title: String,
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn markup(mut self, markup: Markup) -> Self {
        self.markup = markup;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Produces a complete HTML document.
    pub fn convert(&self, ansi: &str) -> String {
        let (body, styles) = self.render(ansi, self.markup);
        let mut css = String::new();
        styles
            .emit_css(self.scheme, &mut css)
            .expect("writing to a String cannot fail");
        format!(
            document_format!(),
            title = escape(&self.title),
            foreground = self.scheme.foreground(),
            background = self.scheme.background(),
            css = css,
            body = body,
        )
    }

    /// Produces only the converted text, with inline styles so it needs no stylesheet.
    pub fn convert_fragment(&self, ansi: &str) -> String {
        self.render(ansi, Markup::Inline).0
    }

    fn render(&self, ansi: &str, markup: Markup) -> (String, Styles) {
        let mut renderer = Renderer::new(Vec::with_capacity(ansi.len()), self.scheme, markup);
        let mut parser = vte::Parser::new();
        for byte in ansi.as_bytes() {
            parser.advance(&mut renderer, *byte);
        }
        let (html, styles) = renderer
            .finish()
            .expect("writing to a Vec cannot fail");
        // Every byte written is either copied from a char or part of an ASCII tag.
        let html = String::from_utf8(html).expect("rendered HTML is UTF-8");
        (html, styles)
    }
}

/// Converts with the default settings.
pub fn convert_escaped(ansi: &str) -> String {
    Converter::new().convert(ansi)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}
