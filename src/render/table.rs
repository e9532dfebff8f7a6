use std::fmt::Write as _;

/// An ascii table
#[derive(Debug)]
pub struct AsciiTable {
    data: Vec<Vec<String>>,

    /// Widths in chars, not bytes, so cyrillic names line up
    max_cell_widths: Vec<usize>,
}

impl AsciiTable {
    /// Make a new table
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: vec![vec![String::new(); width]; height],
            max_cell_widths: vec![0; width],
        }
    }

    /// Set the value of the given cell.
    ///
    /// Indexing starts at 0. It starts at the top left corner and ends at the bottom right.
    pub fn set_cell(&mut self, x: usize, y: usize, data: impl Into<String>) {
        let data = data.into();
        self.max_cell_widths[x] = std::cmp::max(self.max_cell_widths[x], data.chars().count());
        self.data[y][x] = data;
    }

    /// Set a whole row
    pub fn set_row<I, S>(&mut self, y: usize, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for (x, data) in row.into_iter().enumerate() {
            self.set_cell(x, y, data);
        }
    }

    fn fmt_row_border(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_char('+')?;
        for max_cell_width in self.max_cell_widths.iter() {
            // One space of margin on each side
            for _ in 0..max_cell_width + 2 {
                f.write_char('-')?;
            }
            f.write_char('+')?;
        }
        writeln!(f)
    }
}

impl std::fmt::Display for AsciiTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.fmt_row_border(f)?;
        for (i, row) in self.data.iter().enumerate() {
            for (cell, max_cell_width) in row.iter().zip(self.max_cell_widths.iter()) {
                let padding = max_cell_width.saturating_sub(cell.chars().count());
                write!(f, "| {cell}")?;
                for _ in 0..padding + 1 {
                    f.write_char(' ')?;
                }
            }
            writeln!(f, "|")?;

            // Separate the header
            if i == 0 {
                self.fmt_row_border(f)?;
            }
        }
        self.fmt_row_border(f)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn layout() {
        let mut table = AsciiTable::new(2, 3);
        table.set_row(0, ["Name", "Kills"]);
        table.set_row(1, ["Рельса", "12"]);
        table.set_cell(0, 2, "ab");

        let expected = "\
+--------+-------+
| Name   | Kills |
+--------+-------+
| Рельса | 12    |
| ab     |       |
+--------+-------+
";
        assert_eq!(table.to_string(), expected);
    }
}
