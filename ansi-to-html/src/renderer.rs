use crate::ansi::Scheme;
use crate::style::{Style, Styles};
use std::collections::VecDeque;
use std::io::{self, Write};

// Rows further up than this can no longer be reached by cursor movement, so they are written out.
const MAX_ROWS: usize = 64;

const TAB_WIDTH: usize = 8;

// Cursor movement never goes further right than this. Printed text may still extend past it.
const MAX_COLUMNS: usize = 4096;

/// How a styled run is expressed in the emitted markup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Markup {
    /// `<span class="a">`, with the rules collected in [`Styles`].
    #[default]
    Classes,
    /// `<span style="color:#a00">`, self-contained.
    Inline,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cell {
    text: char, // FIXME: one char per cell is wrong for grapheme clusters
    style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            text: ' ',
            style: Style::default(),
        }
    }
}

impl Cell {
    fn is_blank(&self) -> bool {
        self.text == ' ' && self.style.blank_is_invisible()
    }
}

#[derive(Default)]
struct Row {
    cells: Vec<Cell>,
    position: usize,
}

impl Row {
    #[inline]
    fn print(&mut self, cell: Cell) {
        if let Some(current) = self.cells.get_mut(self.position) {
            *current = cell;
        } else {
            self.print_cold(cell);
        }
        self.position += 1;
    }

    #[cold]
    #[inline(never)]
    fn print_cold(&mut self, cell: Cell) {
        self.cells.resize(self.position, Cell::default());
        self.cells.push(cell);
    }

    fn erase_to_end(&mut self) {
        self.cells.truncate(self.position);
    }

    fn erase_to_start(&mut self) {
        let end = (self.position + 1).min(self.cells.len());
        for cell in &mut self.cells[..end] {
            *cell = Cell::default();
        }
    }

    fn erase(&mut self) {
        self.cells.clear();
    }

    /// Number of cells worth emitting; trailing blanks are dropped.
    fn visible_len(&self) -> usize {
        self.cells
            .iter()
            .rposition(|c| !c.is_blank())
            .map_or(0, |i| i + 1)
    }
}

/// A minimal terminal grid that turns what `vte` parses into HTML.
///
/// Only the last `MAX_ROWS` rows are kept; older rows are rendered to `out` as they scroll off,
/// so a renderer can consume arbitrarily long logs.
pub struct Renderer<W> {
    pub style: Style,
    scheme: Scheme,
    markup: Markup,
    current_row: usize,
    rows: VecDeque<Row>,
    styles: Styles,
    out: W,
    rendered_rows: usize,
    error: Option<io::Error>,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, scheme: Scheme, markup: Markup) -> Self {
        Self {
            style: Style::default(),
            scheme,
            markup,
            current_row: 0,
            rows: vec![Row::default()].into(),
            styles: Styles::default(),
            out,
            rendered_rows: 0,
            error: None,
        }
    }

    pub fn print(&mut self, c: char) {
        let cell = Cell {
            text: c,
            style: self.style,
        };
        self.current_row().print(cell);
    }

    fn current_row(&mut self) -> &mut Row {
        &mut self.rows[self.current_row]
    }

    fn column(&self) -> usize {
        self.rows[self.current_row].position
    }

    pub fn put_tab(&mut self) {
        loop {
            self.print(' ');
            if self.column() % TAB_WIDTH == 0 {
                break;
            }
        }
    }

    pub fn backspace(&mut self) {
        let row = self.current_row();
        row.position = row.position.saturating_sub(1);
    }

    pub fn carriage_return(&mut self) {
        self.current_row().position = 0;
    }

    /// Moves to the start of the next row, scrolling if the window is full.
    pub fn linefeed(&mut self) {
        self.down_one();
        self.carriage_return();
    }

    fn down_one(&mut self) {
        if self.current_row == MAX_ROWS - 1 {
            // Pushing something off the screen
            if let Some(row) = self.rows.pop_front() {
                if let Err(e) = self.render(&row) {
                    self.error.get_or_insert(e);
                }
            }
            self.rows.push_back(Row::default());
        } else if self.current_row == self.rows.len() - 1 {
            self.rows.push_back(Row::default());
            self.current_row += 1;
        } else {
            self.current_row += 1;
        }
    }

    pub fn erase_in_display(&mut self, mode: u16) {
        match mode {
            0 => {
                self.current_row().erase_to_end();
                self.rows.truncate(self.current_row + 1);
            }
            1 => {
                for row in self.rows.range_mut(..self.current_row) {
                    row.erase();
                }
                self.current_row().erase_to_start();
            }
            // Clearing the whole screen would throw away the log we are converting
            _ => log::debug!("Ignoring erase_in_display {}", mode),
        }
    }

    pub fn erase_in_line(&mut self, mode: u16) {
        let row = self.current_row();
        match mode {
            0 => row.erase_to_end(),
            1 => row.erase_to_start(),
            2 => row.erase(),
            _ => log::debug!("Unhandled erase_in_line {}", mode),
        }
    }

    /// Absolute move, 1-based, relative to the oldest row still held.
    pub fn handle_move(&mut self, row: u16, col: u16) {
        let target = usize::from(row.max(1) - 1);
        if target <= self.current_row {
            self.move_up_by(self.current_row - target);
        } else {
            self.move_down_by(target - self.current_row);
        }
        self.set_column(col);
    }

    pub fn move_up_by(&mut self, cells: usize) {
        let col = self.column();
        self.current_row = self.current_row.saturating_sub(cells);
        self.current_row().position = col;
    }

    pub fn move_down_by(&mut self, cells: usize) {
        let col = self.column();
        for _ in 0..cells {
            self.down_one();
        }
        self.current_row().position = col;
    }

    pub fn move_right_by(&mut self, cells: usize) {
        let row = self.current_row();
        let target = row.position.saturating_add(cells).min(MAX_COLUMNS);
        row.position = row.position.max(target);
    }

    pub fn move_left_by(&mut self, cells: usize) {
        let row = self.current_row();
        row.position = row.position.saturating_sub(cells);
    }

    /// 1-based column, as CSI sequences count.
    pub fn set_column(&mut self, col: u16) {
        self.current_row().position = usize::from(col.saturating_sub(1)).min(MAX_COLUMNS);
    }

    fn render(&mut self, row: &Row) -> io::Result<()> {
        if self.rendered_rows > 0 {
            self.out.write_all(b"\n")?;
        }
        self.rendered_rows += 1;

        let mut current = Style::default();
        for cell in &row.cells[..row.visible_len()] {
            // Terminal applications will often reset the style right after some formatted text
            // then write some whitespace then set it to something again.
            // So blanks that would look the same either way don't break the current run.
            let style = if cell.is_blank() && current.blank_is_invisible() {
                current
            } else {
                cell.style
            };
            if style != current {
                if !current.is_plain() {
                    self.out.write_all(b"</span>")?;
                }
                if !style.is_plain() {
                    self.open_span(style)?;
                }
                current = style;
            }
            write_escaped(&mut self.out, cell.text)?;
        }
        if !current.is_plain() {
            self.out.write_all(b"</span>")?;
        }
        Ok(())
    }

    fn open_span(&mut self, style: Style) -> io::Result<()> {
        match self.markup {
            Markup::Classes => {
                let class = self.styles.class(style);
                write!(self.out, "<span class=\"{class}\">")
            }
            Markup::Inline => write!(self.out, "<span style=\"{}\">", style.css(self.scheme)),
        }
    }

    /// Renders every row still held and hands back the sink with the classes that were used.
    pub fn finish(mut self) -> io::Result<(W, Styles)> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        for row in core::mem::take(&mut self.rows) {
            self.render(&row)?;
        }
        self.out.flush()?;
        Ok((self.out, self.styles))
    }
}

fn write_escaped(out: &mut impl Write, c: char) -> io::Result<()> {
    match c {
        '&' => out.write_all(b"&amp;"),
        '<' => out.write_all(b"&lt;"),
        '>' => out.write_all(b"&gt;"),
        '"' => out.write_all(b"&quot;"),
        c => {
            let mut bytes = [0u8; 4];
            out.write_all(c.encode_utf8(&mut bytes).as_bytes())
        }
    }
}
