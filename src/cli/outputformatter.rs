use terminal_size::{terminal_size, Width};

/// Plain-text table with per-column widths capped to fit the terminal.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self { columns: columns.into_iter().map(Into::into).collect(), rows: Vec::new() }
    }

    pub fn push_row(&mut self, row: Vec<String>) { self.rows.push(row); }

    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    /// Render to lines no wider than `max_width` visible characters. `color` highlights headers.
    pub fn render(&self, max_width: usize, color: bool) -> Vec<String> {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| visible_len(c).min(max_width)).collect();
        for r in &self.rows {
            for (i, cell) in r.iter().enumerate().take(widths.len()) {
                widths[i] = widths[i].max(visible_len(cell).min(max_width));
            }
        }
        let sep = build_separator(&widths);
        let mut out = Vec::with_capacity(self.rows.len() + 4);
        out.push(fit_line_to_width(&sep, max_width));
        out.push(fit_line_to_width(&build_header(&self.columns, &widths, color), max_width));
        out.push(fit_line_to_width(&sep, max_width));
        for r in &self.rows {
            out.push(fit_line_to_width(&build_row(r, &widths), max_width));
        }
        out.push(fit_line_to_width(&sep, max_width));
        out
    }

    pub fn print(&self) {
        for line in self.render(terminal_width(), true) {
            println!("{}", line);
        }
        println!("rows: {}", self.rows.len());
    }
}

pub fn terminal_width() -> usize {
    match terminal_size() {
        Some((Width(w), _)) if w > 8 => (w - 4) as usize,
        _ => 80,
    }
}

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::from("+");
    for w in widths {
        s.push_str(&"-".repeat(*w + 2));
        s.push('+');
    }
    s
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::from("|");
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        let text = truncate(cell, *w);
        let pad = " ".repeat(w.saturating_sub(visible_len(&text)));
        s.push(' ');
        if is_numeric_like(cell) {
            s.push_str(&pad);
            s.push_str(&text);
        } else {
            s.push_str(&text);
            s.push_str(&pad);
        }
        s.push_str(" |");
    }
    s
}

// Headers are left-aligned; padding is computed on visible width so color codes don't skew it.
fn build_header(cells: &[String], widths: &[usize], color: bool) -> String {
    let mut s = String::from("|");
    for (i, w) in widths.iter().enumerate() {
        let text = truncate(cells.get(i).map(String::as_str).unwrap_or(""), *w);
        s.push(' ');
        if color {
            s.push_str(&format!("\x1b[32m{}\x1b[0m", text));
        } else {
            s.push_str(&text);
        }
        s.push_str(&" ".repeat(w.saturating_sub(visible_len(&text))));
        s.push_str(" |");
    }
    s
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max { return s.to_string(); }
    if max <= 1 { return "…".to_string(); }
    s.chars().take(max - 1).collect::<String>() + "…"
}

fn is_numeric_like(s: &str) -> bool {
    let st = s.trim();
    !st.is_empty() && st.chars().all(|c| c.is_ascii_digit() || c == '-') && st.chars().any(|c| c.is_ascii_digit())
}

fn fit_line_to_width(s: &str, maxw: usize) -> String {
    if visible_len(s) <= maxw { return s.to_string(); }
    let plain = strip_ansi(s);
    let chars: Vec<char> = plain.chars().collect();
    if maxw <= 3 { return "…".repeat(maxw.min(1)); }
    let budget = maxw - 3;
    let front = budget / 2;
    let back = budget - front;
    let head: String = chars[..front].iter().collect();
    let tail: String = chars[chars.len() - back..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Count visible chars, skipping ANSI CSI sequences.
pub fn visible_len(s: &str) -> usize { strip_ansi(s).chars().count() }

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for n in chars.by_ref() {
                if n.is_ascii_alphabetic() { break; }
            }
            continue;
        }
        out.push(c);
    }
    out
}
