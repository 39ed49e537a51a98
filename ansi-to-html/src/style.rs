use crate::ansi::{Color, Scheme};
use fnv::FnvHashMap;
use std::fmt::{self, Write};

/// Graphic rendition state, as set by SGR sequences.
///
/// `Style::default()` means "inherit everything from the document", which is also what SGR 0
/// resets to. Unset colors are resolved against the [`Scheme`] only when reverse video needs them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Style {
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
    pub blink: bool,
    pub reverse: bool,
    pub conceal: bool,
    pub strike: bool,
}

impl Style {
    pub fn is_plain(&self) -> bool {
        *self == Style::default()
    }

    /// A blank drawn in this style looks exactly like an unstyled blank.
    pub fn blank_is_invisible(&self) -> bool {
        self.background.is_none() && !self.reverse && !self.underline && !self.strike
    }

    /// Apply the parameters of one `CSI ... m` sequence.
    ///
    /// Each item is one parameter with its colon-separated subparameters, which is how
    /// `vte::Params` iterates.
    pub fn apply_sgr<'a>(&mut self, params: impl IntoIterator<Item = &'a [u16]>) {
        let mut params = params.into_iter();
        let mut seen_any = false;
        while let Some(param) = params.next() {
            seen_any = true;
            match param {
                [0] => *self = Style::default(),
                [1] => self.bold = true,
                [2] => self.dim = true,
                [3] => self.italic = true,
                [4] => self.underline = true,
                [5] | [6] => self.blink = true,
                [7] => self.reverse = true,
                [8] => self.conceal = true,
                [9] => self.strike = true,
                [21] | [22] => {
                    self.bold = false;
                    self.dim = false;
                }
                [23] => self.italic = false,
                [24] => self.underline = false,
                [25] => self.blink = false,
                [27] => self.reverse = false,
                [28] => self.conceal = false,
                [29] => self.strike = false,
                [n @ 30..=37] => self.foreground = Some(Color::basic(*n)),
                [38, sub @ ..] => {
                    if let Some(color) = extended_color(sub, &mut params) {
                        self.foreground = Some(color);
                    }
                }
                [39] => self.foreground = None,
                [n @ 40..=47] => self.background = Some(Color::basic(*n)),
                [48, sub @ ..] => {
                    if let Some(color) = extended_color(sub, &mut params) {
                        self.background = Some(color);
                    }
                }
                [49] => self.background = None,
                [n @ 90..=97] => self.foreground = Some(Color::bright(*n)),
                [n @ 100..=107] => self.background = Some(Color::bright(*n)),
                _ => log::debug!("Unhandled SGR parameter {:?}", param),
            }
        }
        if !seen_any {
            *self = Style::default();
        }
    }

    /// Write the CSS declarations for this style, e.g. `color:#a00;font-weight:bold`.
    pub fn write_css(&self, scheme: Scheme, out: &mut impl Write) -> fmt::Result {
        let mut decl = Declarations { out, first: true };

        if self.reverse {
            match self.background {
                Some(color) => decl.push(format_args!("color:{color}"))?,
                None => decl.push(format_args!("color:{}", scheme.background()))?,
            }
            match self.foreground {
                Some(color) => decl.push(format_args!("background-color:{color}"))?,
                None => decl.push(format_args!("background-color:{}", scheme.foreground()))?,
            }
        } else {
            if let Some(color) = self.foreground {
                decl.push(format_args!("color:{color}"))?;
            }
            if let Some(color) = self.background {
                decl.push(format_args!("background-color:{color}"))?;
            }
        }
        if self.bold {
            decl.push(format_args!("font-weight:bold"))?;
        }
        if self.dim {
            decl.push(format_args!("opacity:0.5"))?;
        }
        if self.italic {
            decl.push(format_args!("font-style:italic"))?;
        }

        let decoration = [
            (self.underline, "underline"),
            (self.strike, "line-through"),
            (self.blink, "blink"),
        ]
        .iter()
        .filter(|(on, _)| *on)
        .map(|(_, name)| *name)
        .collect::<Vec<_>>();
        if !decoration.is_empty() {
            decl.push(format_args!("text-decoration:{}", decoration.join(" ")))?;
        }

        if self.conceal {
            decl.push(format_args!("visibility:hidden"))?;
        }
        Ok(())
    }

    pub fn css(&self, scheme: Scheme) -> String {
        let mut css = String::new();
        self.write_css(scheme, &mut css)
            .expect("writing to a String cannot fail");
        css
    }
}

struct Declarations<'a, W> {
    out: &'a mut W,
    first: bool,
}

impl<W: Write> Declarations<'_, W> {
    fn push(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        if !self.first {
            self.out.write_char(';')?;
        }
        self.first = false;
        self.out.write_fmt(args)
    }
}

/// Reads the color operand of SGR 38/48, either from the colon subparameters (`38:5:n`) or from
/// the parameters that follow (`38;5;n`, `38;2;r;g;b`).
fn extended_color<'a>(
    sub: &[u16],
    rest: &mut impl Iterator<Item = &'a [u16]>,
) -> Option<Color> {
    if !sub.is_empty() {
        return match *sub {
            [5, code] => Color::parse_8bit(code),
            [2, r, g, b] | [2, _, r, g, b] => Color::parse_rgb(r, g, b),
            _ => {
                log::debug!("Unhandled extended color {:?}", sub);
                None
            }
        };
    }

    let mut next = || rest.next().and_then(|p| p.first().copied());
    match next() {
        Some(5) => Color::parse_8bit(next()?),
        Some(2) => {
            let (r, g, b) = (next()?, next()?, next()?);
            Color::parse_rgb(r, g, b)
        }
        other => {
            log::debug!("Unhandled extended color mode {:?}", other);
            None
        }
    }
}

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const BASE: usize = ALPHABET.len();

/// The CSS classes handed out so far, in order of first use.
#[derive(Debug, Default)]
pub struct Styles {
    known: FnvHashMap<Style, usize>,
    names: Vec<(Style, String)>,
}

impl Styles {
    /// Returns the class name for `style`, allocating the next free one if it is new.
    pub fn class(&mut self, style: Style) -> &str {
        let next_idx = self.names.len();
        let idx = *self.known.entry(style).or_insert(next_idx);
        if idx == next_idx {
            self.names.push((style, class_name(idx)));
        }
        &self.names[idx].1
    }

    /// One `.name { ... }` rule per class, in allocation order.
    pub fn emit_css(&self, scheme: Scheme, out: &mut impl Write) -> fmt::Result {
        for (style, name) in &self.names {
            write!(out, ".{name} {{ ")?;
            style.write_css(scheme, out)?;
            out.write_str(" }\n")?;
        }
        Ok(())
    }
}

fn class_name(mut idx: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(ALPHABET[idx % BASE]);
        idx /= BASE;
        if idx == 0 {
            break;
        }
    }
    name.reverse();
    name.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sgr(style: &mut Style, params: &[&[u16]]) {
        style.apply_sgr(params.iter().copied());
    }

    #[test]
    fn basic_attributes_and_reset() {
        let mut style = Style::default();
        sgr(&mut style, &[&[1], &[4], &[31]]);
        assert!(style.bold);
        assert!(style.underline);
        assert_eq!(style.foreground, Some(Color::RED));

        sgr(&mut style, &[&[0]]);
        assert!(style.is_plain());
    }

    #[test]
    fn empty_params_reset() {
        let mut style = Style {
            italic: true,
            ..Style::default()
        };
        sgr(&mut style, &[]);
        assert!(style.is_plain());
    }

    #[test]
    fn tarantula_palette_codes() {
        let mut style = Style::default();
        sgr(&mut style, &[&[38], &[5], &[196], &[48], &[5], &[16]]);
        assert_eq!(style.foreground, Some(Color::EightBit(196)));
        assert_eq!(style.background, Some(Color::EightBit(16)));
    }

    #[test]
    fn unknown_parameters_are_skipped() {
        // The yellow line of a tarantula report: 33 and 5 are meaningful, 226 is not.
        let mut style = Style::default();
        sgr(&mut style, &[&[33], &[5], &[226], &[48], &[5], &[16]]);
        assert_eq!(style.foreground, Some(Color::YELLOW));
        assert!(style.blink);
        assert_eq!(style.background, Some(Color::EightBit(16)));
    }

    #[test]
    fn truecolor_both_forms() {
        let mut semicolons = Style::default();
        sgr(&mut semicolons, &[&[38], &[2], &[1], &[2], &[3]]);
        let mut colons = Style::default();
        sgr(&mut colons, &[&[38, 2, 1, 2, 3]]);
        assert_eq!(semicolons.foreground, Color::parse_rgb(1, 2, 3));
        assert_eq!(semicolons, colons);
    }

    #[test]
    fn truncated_extended_color_is_ignored() {
        let mut style = Style::default();
        sgr(&mut style, &[&[38], &[5]]);
        assert_eq!(style.foreground, None);
    }

    #[test]
    fn default_colors_and_intensity() {
        let mut style = Style::default();
        sgr(&mut style, &[&[1], &[2], &[92], &[101]]);
        assert_eq!(style.foreground, Some(Color::EightBit(10)));
        assert_eq!(style.background, Some(Color::EightBit(9)));
        sgr(&mut style, &[&[22], &[39], &[49]]);
        assert!(style.is_plain());
    }

    #[test]
    fn every_basic_foreground_code() {
        let expected = ["#000", "#a00", "#0a0", "#a60", "#00a", "#a0a", "#0aa", "#aaa"];
        for (n, hex) in (30..=37).zip(expected) {
            let mut style = Style::default();
            sgr(&mut style, &[&[n]]);
            assert_eq!(style.css(Scheme::Dark), format!("color:{hex}"), "SGR {n}");

            let mut style = Style::default();
            sgr(&mut style, &[&[n + 10]]);
            assert_eq!(
                style.css(Scheme::Dark),
                format!("background-color:{hex}"),
                "SGR {}",
                n + 10
            );
        }
    }

    #[test]
    fn css_declarations() {
        let style = Style {
            foreground: Some(Color::RED),
            bold: true,
            underline: true,
            strike: true,
            ..Style::default()
        };
        assert_eq!(
            style.css(Scheme::Dark),
            "color:#a00;font-weight:bold;text-decoration:underline line-through"
        );
    }

    #[test]
    fn reverse_uses_scheme_defaults() {
        let style = Style {
            reverse: true,
            ..Style::default()
        };
        assert_eq!(style.css(Scheme::Dark), "color:#000;background-color:#aaa");
        assert_eq!(style.css(Scheme::Light), "color:#aaa;background-color:#000");
    }

    #[test]
    fn class_names_are_stable_and_sequential() {
        let mut styles = Styles::default();
        let red = Style {
            foreground: Some(Color::RED),
            ..Style::default()
        };
        let bold = Style {
            bold: true,
            ..Style::default()
        };
        assert_eq!(styles.class(red), "a");
        assert_eq!(styles.class(bold), "b");
        assert_eq!(styles.class(red), "a");

        let mut css = String::new();
        styles.emit_css(Scheme::Dark, &mut css).unwrap();
        assert_eq!(css, ".a { color:#a00 }\n.b { font-weight:bold }\n");
    }

    #[test]
    fn class_name_rollover() {
        assert_eq!(class_name(0), "a");
        assert_eq!(class_name(25), "z");
        assert_eq!(class_name(26), "ba");
        assert_eq!(class_name(27), "bb");
    }
}
