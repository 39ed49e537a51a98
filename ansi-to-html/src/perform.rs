use crate::ansi::C0;
use crate::renderer::Renderer;
use std::io::Write;
use vte::{Params, Perform};

impl<W: Write> Perform for Renderer<W> {
    fn print(&mut self, c: char) {
        self.print(c);
    }

    #[inline]
    fn execute(&mut self, byte: u8) {
        match byte {
            C0::HT => self.put_tab(),
            C0::BS => self.backspace(),
            C0::CR => self.carriage_return(),
            C0::LF | C0::VT | C0::FF => self.linefeed(),
            C0::NUL | C0::BEL => {}
            _ => log::debug!("Unhandled execute byte={:02x}", byte),
        }
    }

    fn csi_dispatch(&mut self, params: &Params, intermediates: &[u8], ignore: bool, action: char) {
        if ignore || !intermediates.is_empty() {
            log::debug!(
                "Dropping CSI {:?} {:?} {}",
                intermediates,
                params,
                action
            );
            return;
        }

        match action {
            'm' => self.style.apply_sgr(params.iter()),
            'A' => self.move_up_by(count(params)),
            'B' => self.move_down_by(count(params)),
            'C' => self.move_right_by(count(params)),
            'D' => self.move_left_by(count(params)),
            'G' => self.set_column(nth(params, 0).unwrap_or(1)),
            'H' | 'f' => {
                let row = nth(params, 0).unwrap_or(1);
                let col = nth(params, 1).unwrap_or(1);
                self.handle_move(row, col);
            }
            'J' => self.erase_in_display(nth(params, 0).unwrap_or(0)),
            'K' => self.erase_in_line(nth(params, 0).unwrap_or(0)),
            _ => log::debug!("Unhandled dispatch {} {:?}", action, params),
        }
    }

    fn esc_dispatch(&mut self, intermediates: &[u8], _ignore: bool, byte: u8) {
        log::debug!("Unhandled escape {:?} {:02x}", intermediates, byte);
    }
}

fn nth(params: &Params, n: usize) -> Option<u16> {
    params.iter().nth(n).and_then(|p| p.first().copied())
}

/// Repeat count of a cursor movement; absent or zero both mean one.
fn count(params: &Params) -> usize {
    usize::from(nth(params, 0).filter(|&n| n != 0).unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use crate::ansi::Scheme;
    use crate::renderer::{Markup, Renderer};

    fn render(input: &str) -> String {
        let mut renderer = Renderer::new(Vec::new(), Scheme::Dark, Markup::Classes);
        let mut parser = vte::Parser::new();
        for byte in input.as_bytes() {
            parser.advance(&mut renderer, *byte);
        }
        let (out, _) = renderer.finish().unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn cursor_left() {
        assert_eq!(render("abc\x1b[2Dx"), "axc");
        assert_eq!(render("abc\x1b[Dx"), "abx");
        assert_eq!(render("abc\x1b[0Dx"), "abx");
        assert_eq!(render("abc\x1b[9Dx"), "xbc");
    }

    #[test]
    fn cursor_right() {
        assert_eq!(render("a\x1b[3Cb"), "a   b");
        assert_eq!(render("a\x1b[Cb"), "a b");
        assert_eq!(render("a\x1b[0Cb"), "a b");
    }

    #[test]
    fn cursor_up_keeps_column() {
        assert_eq!(render("one\ntwo\x1b[Ax"), "onex\ntwo");
        assert_eq!(render("one\ntwo\x1b[0Ax"), "onex\ntwo");
        assert_eq!(render("one\ntwo\x1b[5Ax"), "onex\ntwo");
    }

    #[test]
    fn cursor_down_keeps_column() {
        assert_eq!(render("x\x1b[2By"), "x\n\n y");
        assert_eq!(render("x\x1b[0By"), "x\n y");
        assert_eq!(render("x\x1b[By"), "x\n y");
    }

    #[test]
    fn absolute_position() {
        assert_eq!(render("first\nsecond\x1b[1;3HX"), "fiXst\nsecond");
        assert_eq!(render("ab\ncd\x1b[2;2fY"), "ab\ncY");
        assert_eq!(render("ab\ncd\x1b[HZ"), "Zb\ncd");
    }

    #[test]
    fn absolute_column() {
        assert_eq!(render("abcdef\x1b[3GX"), "abXdef");
        assert_eq!(render("abcdef\x1b[GX"), "Xbcdef");
    }

    #[test]
    fn erase_below() {
        assert_eq!(render("one\ntwo\nthree\x1b[2;2H\x1b[J"), "one\nt");
        assert_eq!(render("one\ntwo\nthree\x1b[2;2H\x1b[0J"), "one\nt");
    }

    #[test]
    fn erase_above() {
        assert_eq!(render("one\ntwo\nthree\x1b[2;2H\x1b[1J"), "\n  o\nthree");
    }

    #[test]
    fn whole_screen_clears_keep_the_log() {
        assert_eq!(render("one\ntwo\x1b[2J"), "one\ntwo");
        assert_eq!(render("one\ntwo\x1b[3J"), "one\ntwo");
    }

    #[test]
    fn erase_in_line_modes() {
        assert_eq!(render("abcdef\x1b[4G\x1b[K"), "abc");
        assert_eq!(render("abcdef\x1b[4G\x1b[1K"), "    ef");
        assert_eq!(render("keep\nabcdef\x1b[2K"), "keep\n");
    }

    #[test]
    fn private_modes_are_dropped() {
        assert_eq!(render("\x1b[?25lhi\x1b[?1049h"), "hi");
    }
}
