//! Markdown table rendering. Undefined values render as blank cells.

use crate::derive::transforms::round_to;

#[derive(Debug, Clone, Default)]
pub struct MarkdownTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl MarkdownTable {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating to the header width.
    pub fn push(&mut self, mut cells: Vec<String>) {
        cells.resize(self.headers.len(), String::new());
        self.rows.push(cells);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("| {} |\n", self.headers.join(" | ")));
        let sep: Vec<&str> = self.headers.iter().map(|_| "---").collect();
        out.push_str(&format!("| {} |\n", sep.join(" | ")));
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|c| c.replace('|', "\\|")).collect();
            out.push_str(&format!("| {} |\n", cells.join(" | ")));
        }
        out
    }
}

pub fn int_cell(value: i64) -> String {
    value.to_string()
}

pub fn opt_int_cell(value: Option<i64>) -> String {
    value.map(int_cell).unwrap_or_default()
}

/// Fixed-precision number, blank when undefined.
pub fn num_cell(value: Option<f64>, places: u32) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{:.*}", places as usize, round_to(v, places)),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_header_separator_and_rows() {
        let mut t = MarkdownTable::new(&["Country", "Value"]);
        t.push(vec!["Norway".into(), num_cell(Some(1.005), 1)]);
        t.push(vec!["Sweden".into()]);
        assert_eq!(
            t.render(),
            "| Country | Value |\n| --- | --- |\n| Norway | 1.0 |\n| Sweden |  |\n"
        );
    }

    #[test]
    fn undefined_values_are_blank() {
        assert_eq!(num_cell(None, 2), "");
        assert_eq!(num_cell(Some(f64::NAN), 2), "");
        assert_eq!(opt_int_cell(None), "");
        assert_eq!(num_cell(Some(14.285714), 2), "14.29");
    }
}
