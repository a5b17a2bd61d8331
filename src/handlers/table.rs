//! Plain text tables, in the style of `tabulate`'s `simple` format.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Clone, Debug)]
pub struct Column {
    pub header: String,
    pub align: Align,
    pub cells: Vec<String>,
}

impl Column {
    pub fn new(header: impl Into<String>, align: Align) -> Self {
        Self {
            header: header.into(),
            align,
            cells: vec![],
        }
    }

    /// The column width: the widest cell, and at least two more than the header.
    fn width(&self) -> usize {
        self.cells
            .iter()
            .map(|c| visible_len(c))
            .fold(visible_len(&self.header) + 2, usize::max)
    }
}

/// The length of `s` as shown on a terminal, ANSI color sequences take no room.
pub fn visible_len(s: &str) -> usize {
    let mut len = 0;
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            len += 1;
        }
    }

    len
}

fn pad(s: &str, width: usize, align: Align) -> String {
    let fill = " ".repeat(width.saturating_sub(visible_len(s)));
    match align {
        Align::Left => format!("{s}{fill}"),
        Align::Right => format!("{fill}{s}"),
    }
}

/// Renders a header row, a dash separator and every row. Columns are joined by two spaces and
/// trailing whitespace is stripped off every line.
pub fn render(columns: &[Column]) -> String {
    let widths: Vec<_> = columns.iter().map(Column::width).collect();
    let rows = columns.iter().map(|c| c.cells.len()).max().unwrap_or(0);

    let line = |cells: Vec<String>| cells.join("  ").trim_end().to_string();

    let mut lines = Vec::with_capacity(rows + 2);
    lines.push(line(
        columns
            .iter()
            .zip(&widths)
            .map(|(c, &w)| pad(&c.header, w, c.align))
            .collect(),
    ));
    lines.push(line(widths.iter().map(|&w| "-".repeat(w)).collect()));

    for row in 0..rows {
        lines.push(line(
            columns
                .iter()
                .zip(&widths)
                .map(|(c, &w)| pad(c.cells.get(row).map_or("", String::as_str), w, c.align))
                .collect(),
        ));
    }

    lines.join("\n")
}
