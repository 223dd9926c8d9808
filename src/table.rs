use scraper::{ElementRef, Html, Selector};

use crate::error::{DiecastError, Result};
use crate::normalize::clean_cell_text;

/// A single table cell as written in the source document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    /// Number of rows this cell covers in its column, always at least 1
    pub rowspan: usize,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), rowspan: 1 }
    }

    /// A cell that also covers the next `rowspan - 1` rows
    pub fn spanning(text: impl Into<String>, rowspan: usize) -> Self {
        Self { text: text.into(), rowspan: rowspan.max(1) }
    }
}

/// A loosely structured table: header strings plus ragged data rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { headers, rows }
    }

    /// Whether the concatenated header text contains any of `markers`
    pub fn qualifies(&self, markers: &[String]) -> bool {
        if self.headers.is_empty() {
            return false;
        }
        let joined = self.headers.concat();
        markers.iter().any(|m| !m.is_empty() && joined.contains(m.as_str()))
    }
}

/// Parse every table matched by `table_selector` out of an HTML document.
///
/// The header row is the first row holding `<th>` cells; every row after it is
/// a data row. Rows of nested tables belong to the nested table only.
pub fn parse_tables(html: &str, table_selector: &str) -> Result<Vec<RawTable>> {
    let document = Html::parse_document(html);
    let table_sel = Selector::parse(table_selector).map_err(|e| {
        DiecastError::ExtractionError(format!("Invalid table selector '{}': {:?}", table_selector, e))
    })?;
    let row_sel = Selector::parse("tr").expect("Invalid row selector");
    let header_sel = Selector::parse("th").expect("Invalid header selector");
    let cell_sel = Selector::parse("td, th").expect("Invalid cell selector");

    let mut tables = Vec::new();
    for table in document.select(&table_sel) {
        let rows: Vec<ElementRef> = table
            .select(&row_sel)
            .filter(|tr| owning_table(tr).map(|t| t.id()) == Some(table.id()))
            .collect();

        let Some(header_idx) = rows.iter().position(|tr| tr.select(&header_sel).next().is_some())
        else {
            tables.push(RawTable::default());
            continue;
        };

        let headers = rows[header_idx]
            .select(&header_sel)
            .filter(|th| owning_row(th).map(|r| r.id()) == Some(rows[header_idx].id()))
            .map(|th| element_text(&th))
            .collect();

        let mut layout = SpanLayout::default();
        let data = rows[header_idx + 1..]
            .iter()
            .map(|tr| {
                let cells = tr
                    .select(&cell_sel)
                    .filter(|cell| owning_row(cell).map(|r| r.id()) == Some(tr.id()))
                    .map(|cell| Cell {
                        text: element_text(&cell),
                        rowspan: parse_rowspan(cell.value().attr("rowspan")),
                    });
                layout.align(cells)
            })
            .collect();

        tables.push(RawTable::new(headers, data));
    }

    Ok(tables)
}

/// Column slots still covered by spanning cells of earlier rows.
///
/// HTML leaves a covered cell out of the row entirely, which would shift
/// every later cell one column to the left. Aligning puts an empty cell in
/// each covered slot so cell index and column index agree again.
#[derive(Debug, Default)]
struct SpanLayout {
    /// Rows still covered below the current one, per column
    pending: Vec<usize>,
}

impl SpanLayout {
    fn covered(&self, col: usize) -> bool {
        self.pending.get(col).is_some_and(|&n| n > 0)
    }

    fn align(&mut self, cells: impl Iterator<Item = Cell>) -> Vec<Cell> {
        let covered_now: Vec<bool> = (0..self.pending.len()).map(|c| self.covered(c)).collect();
        let mut row = Vec::new();

        for cell in cells {
            while self.covered(row.len()) {
                row.push(Cell::new(""));
            }
            let col = row.len();
            if cell.rowspan > 1 {
                if self.pending.len() <= col {
                    self.pending.resize(col + 1, 0);
                }
                self.pending[col] = cell.rowspan - 1;
            }
            row.push(cell);
        }

        for (col, covered) in covered_now.into_iter().enumerate() {
            if covered {
                self.pending[col] -= 1;
            }
        }
        row
    }
}

/// Keep only the tables whose headers carry one of `markers`
pub fn qualifying_tables(tables: Vec<RawTable>, markers: &[String]) -> Vec<RawTable> {
    tables.into_iter().filter(|t| t.qualifies(markers)).collect()
}

/// Rowspan attribute value; absent, unparsable or zero means 1
pub fn parse_rowspan(attr: Option<&str>) -> usize {
    attr.and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n >= 1)
        .unwrap_or(1)
}

fn element_text(el: &ElementRef) -> String {
    clean_cell_text(&el.text().collect::<Vec<_>>().join(" "))
}

fn nearest_ancestor<'a>(el: &ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == name)
}

fn owning_table<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    nearest_ancestor(el, "table")
}

fn owning_row<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    nearest_ancestor(el, "tr")
}
