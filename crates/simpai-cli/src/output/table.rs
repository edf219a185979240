#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

const MIN_COLUMN: usize = 6;
const SEPARATOR: &str = "  ";

/// Render rows as left-aligned columns under a dashed header line.
#[must_use]
pub fn render_table(headers: &[&str], rows: &[Vec<String>], options: TableOptions) -> String {
    let mut widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
                .max(MIN_COLUMN)
        })
        .collect();

    if let Some(max_width) = options.max_width {
        shrink_to_fit(&mut widths, max_width);
    }

    let header_line = join_cells(headers.iter().map(|h| (*h).to_string()), &widths, false);
    let divider = "-".repeat(header_line.chars().count());

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(header_line);
    lines.push(divider);
    for row in rows {
        let cells = (0..widths.len()).map(|i| row.get(i).cloned().unwrap_or_else(|| "-".into()));
        lines.push(join_cells(cells, &widths, options.color));
    }
    lines.join("\n")
}

/// Narrow the widest column until the table fits, never below `MIN_COLUMN`.
fn shrink_to_fit(widths: &mut [usize], max_width: usize) {
    let separators = widths.len().saturating_sub(1) * SEPARATOR.len();
    while widths.iter().sum::<usize>() + separators > max_width {
        let Some((index, width)) = widths
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, w)| *w > MIN_COLUMN)
            .max_by_key(|(_, w)| *w)
        else {
            break;
        };
        widths[index] = width - 1;
    }
}

fn join_cells(cells: impl Iterator<Item = String>, widths: &[usize], color: bool) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| {
            let text = truncate(&cell, *width);
            let pad = " ".repeat(width - text.chars().count());
            let shown = if color { colorize(&text) } else { text };
            format!("{shown}{pad}")
        })
        .collect::<Vec<_>>()
        .join(SEPARATOR)
        .trim_end()
        .to_string()
}

fn truncate(value: &str, width: usize) -> String {
    let single_line = value.replace('\n', " ");
    if single_line.chars().count() <= width {
        return single_line;
    }
    let mut out: String = single_line.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn colorize(value: &str) -> String {
    let code = match value.to_ascii_lowercase().as_str() {
        "true" | "active" | "completed" | "success" | "fresh" | "ok" => "32",
        "cached" | "fallback" | "skipped" | "trialing" | "in_flight" => "33",
        "false" | "failed" | "cancelled" | "canceled" | "past_due" | "error" => "31",
        _ => return value.to_string(),
    };
    format!("\u{1b}[{code}m{value}\u{1b}[0m")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{TableOptions, render_table};

    const PLAIN: TableOptions = TableOptions {
        max_width: None,
        color: false,
    };

    #[test]
    fn columns_align_under_headers() {
        let rows = vec![
            vec!["Basic".to_string(), "9.99".to_string()],
            vec!["Professional".to_string(), "29.00".to_string()],
        ];
        let out = render_table(&["name", "price"], &rows, PLAIN);
        assert_eq!(
            out,
            "name          price\n-------------------\nBasic         9.99\nProfessional  29.00"
        );
    }

    #[test]
    fn narrow_terminal_truncates_widest_column() {
        let rows = vec![vec!["a".repeat(50), "ok".to_string()]];
        let out = render_table(
            &["text", "status"],
            &rows,
            TableOptions {
                max_width: Some(30),
                color: false,
            },
        );
        for line in out.lines() {
            assert!(line.chars().count() <= 30, "line too wide: {line}");
        }
        assert!(out.contains('…'));
    }

    #[test]
    fn multi_line_cells_stay_on_one_row() {
        let rows = vec![vec!["first\nsecond".to_string()]];
        let out = render_table(&["value"], &rows, PLAIN);
        assert_eq!(out.lines().count(), 3);
        assert!(out.ends_with("first second"));
    }

    #[test]
    fn color_wraps_known_statuses_only() {
        let rows = vec![vec!["active".to_string(), "Basic".to_string()]];
        let out = render_table(
            &["status", "plan"],
            &rows,
            TableOptions {
                max_width: None,
                color: true,
            },
        );
        assert!(out.contains("\u{1b}[32mactive\u{1b}[0m"));
        assert!(!out.contains("\u{1b}[32mBasic"));
    }
}
