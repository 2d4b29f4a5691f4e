//! Grid-table text codec.
//!
//! Expected layout (cells may wrap over several `|` lines between borders):
//!   +------------+-------------------+
//!   | date       | notes             |
//!   +============+===================+
//!   | 2024-09-01 | Amazon home goods |
//!   |            | (rugs, grinders)  |
//!   +------------+-------------------+

use coinvest_core::{LedgerError, Result};

/// Ordered columns plus ordered rows of string cells.
///
/// Every row holds exactly one cell per column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl GridTable {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: Vec<String>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(LedgerError::ColumnCount {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell of row `row` under column `name`.
    pub fn cell(&self, row: usize, name: &str) -> Option<&str> {
        let idx = self.column_index(name)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    /// Copy with the given column order; columns this table lacks come out empty.
    pub fn reindexed(&self, columns: &[&str]) -> GridTable {
        let lookup: Vec<Option<usize>> = columns.iter().map(|c| self.column_index(c)).collect();
        GridTable {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| {
                    lookup
                        .iter()
                        .map(|idx| idx.map(|i| row[i].clone()).unwrap_or_default())
                        .collect()
                })
                .collect(),
        }
    }
}

fn is_border(line: &str) -> bool {
    line.len() >= 2
        && line.starts_with('+')
        && line.ends_with('+')
        && line.chars().all(|c| matches!(c, '+' | '-' | '='))
}

fn is_top_border(line: &str) -> bool {
    is_border(line) && !line.contains('=')
}

fn split_cells(line: &str, expected: usize) -> Result<Vec<String>> {
    if line.len() < 2 || !line.starts_with('|') || !line.ends_with('|') {
        return Err(LedgerError::format(format!(
            "table line should start and end with '|': {line}"
        )));
    }
    let cells: Vec<String> = line[1..line.len() - 1]
        .split('|')
        .map(|c| c.trim().to_string())
        .collect();
    if cells.len() != expected {
        return Err(LedgerError::ColumnCount {
            expected,
            found: cells.len(),
        });
    }
    Ok(cells)
}

/// Concatenate wrapped continuation cells position-wise with a single space.
fn merge_cells(acc: &mut [String], more: Vec<String>) {
    for (cell, extra) in acc.iter_mut().zip(more) {
        if extra.is_empty() {
            continue;
        }
        if !cell.is_empty() {
            cell.push(' ');
        }
        cell.push_str(&extra);
    }
}

/// Parse grid-table text into a [`GridTable`].
pub fn decode(text: &str) -> Result<GridTable> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let top = lines
        .next()
        .ok_or_else(|| LedgerError::format("grid table is empty"))?;
    if !is_top_border(top) {
        return Err(LedgerError::format(
            "the first line should start and end with '+' and contain only '-' between '+' signs",
        ));
    }
    let column_count = top.matches('+').count() - 1;
    if column_count == 0 {
        return Err(LedgerError::format("grid table has no columns"));
    }

    // Header segments run until the first border.
    let mut columns = vec![String::new(); column_count];
    let mut header_lines = 0;
    loop {
        match lines.next() {
            Some(line) if is_border(line) => break,
            Some(line) => {
                merge_cells(&mut columns, split_cells(line, column_count)?);
                header_lines += 1;
            }
            None => return Err(LedgerError::format("grid table header is not closed by a border")),
        }
    }
    if header_lines == 0 {
        return Err(LedgerError::format("grid table has no header row"));
    }

    let mut table = GridTable::new(columns);
    let mut block: Option<Vec<String>> = None;
    for line in lines {
        if is_border(line) {
            if let Some(row) = block.take() {
                table.push_row(row)?;
            }
            continue;
        }
        let cells = split_cells(line, column_count)?;
        match block.as_mut() {
            Some(row) => merge_cells(row, cells),
            None => block = Some(cells),
        }
    }
    if let Some(row) = block {
        table.push_row(row)?;
    }

    Ok(table)
}

/// Greedy word wrap: never splits words or breaks on hyphens, keeps
/// whitespace runs inside a line and drops whitespace at line breaks.
/// Always returns at least one (possibly empty) line.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let normalized: String = text
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();

    // Alternating runs of spaces and non-spaces.
    let mut chunks: Vec<&str> = Vec::new();
    let mut start = 0;
    let mut prev_space: Option<bool> = None;
    for (i, c) in normalized.char_indices() {
        let space = c == ' ';
        if prev_space.is_some_and(|p| p != space) {
            chunks.push(&normalized[start..i]);
            start = i;
        }
        prev_space = Some(space);
    }
    if start < normalized.len() {
        chunks.push(&normalized[start..]);
    }

    let is_space = |s: &str| s.starts_with(' ');
    let char_len = |s: &str| s.chars().count();

    let mut lines: Vec<String> = Vec::new();
    let mut i = 0;
    while i < chunks.len() {
        if is_space(chunks[i]) && !lines.is_empty() {
            i += 1;
            continue;
        }

        let mut cur: Vec<&str> = Vec::new();
        let mut cur_len = 0;
        while i < chunks.len() && cur_len + char_len(chunks[i]) <= width {
            cur_len += char_len(chunks[i]);
            cur.push(chunks[i]);
            i += 1;
        }
        // An overlong word gets a line of its own.
        if cur.is_empty() && i < chunks.len() {
            cur.push(chunks[i]);
            i += 1;
        }
        if cur.last().is_some_and(|c| c.starts_with(' ')) {
            cur.pop();
        }
        if !cur.is_empty() {
            lines.push(cur.concat());
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Truncated linear-interpolation percentile.
fn percentile(values: &mut [usize], pct: f64) -> usize {
    if values.is_empty() {
        return 0;
    }
    values.sort_unstable();
    let rank = pct / 100.0 * (values.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let lo_v = values[lo] as f64;
    let hi_v = values[hi] as f64;
    (lo_v + (hi_v - lo_v) * (rank - lo as f64)) as usize
}

/// Width for one column: the 70th percentile of raw lengths capped at
/// `max_cell_width`, then widened to the longest line after wrapping there.
fn column_width(texts: &[&str], max_cell_width: usize) -> usize {
    let mut lengths: Vec<usize> = texts.iter().map(|t| t.chars().count()).collect();
    let initial = percentile(&mut lengths, 70.0).min(max_cell_width).max(1);
    texts
        .iter()
        .flat_map(|t| wrap(t, initial))
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
}

fn border(widths: &[usize], fill: char) -> String {
    let segments: Vec<String> = widths
        .iter()
        .map(|w| fill.to_string().repeat(w + 2))
        .collect();
    format!("+{}+", segments.join("+"))
}

fn render_cells<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> Vec<String> {
    let wrapped: Vec<Vec<String>> = cells
        .iter()
        .zip(widths)
        .map(|(c, w)| wrap(c.as_ref(), *w))
        .collect();
    let height = wrapped.iter().map(Vec::len).max().unwrap_or(1);

    (0..height)
        .map(|i| {
            let mut line = String::new();
            for (cell_lines, w) in wrapped.iter().zip(widths) {
                let text = cell_lines.get(i).map(String::as_str).unwrap_or("");
                line.push_str(&format!("| {:<width$} ", text, width = *w));
            }
            line.push('|');
            line
        })
        .collect()
}

/// Render a [`GridTable`] as grid-table text (no trailing newline).
pub fn encode(table: &GridTable, max_cell_width: usize) -> String {
    let widths: Vec<usize> = (0..table.columns.len())
        .map(|i| {
            let texts: Vec<&str> = table
                .rows
                .iter()
                .map(|r| r[i].as_str())
                .chain(std::iter::once(table.columns[i].as_str()))
                .collect();
            column_width(&texts, max_cell_width)
        })
        .collect();

    let separator = border(&widths, '-');
    let mut lines = vec![separator.clone()];
    lines.extend(render_cells(&table.columns, &widths));
    lines.push(border(&widths, '='));
    for row in &table.rows {
        lines.extend(render_cells(row, &widths));
        lines.push(separator.clone());
    }

    lines.join("\n")
}
