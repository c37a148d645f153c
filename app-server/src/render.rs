//! Plain-text table for the list and search views.

use std::fmt;

use semcat_categories::CategoryRow;

/// Render rows as an aligned table.
///
/// Search rows add a similarity column (score as a whole percentage) and are
/// numbered by rank; listing rows are numbered by position.
pub fn render_rows(rows: &[CategoryRow]) -> String {
    Table(rows).to_string()
}

struct Table<'a>(&'a [CategoryRow]);

impl fmt::Display for Table<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.0;
        if rows.is_empty() {
            return writeln!(f, "No categories.");
        }

        let show_scores = rows.iter().any(|row| row.score().is_some());
        let name_width = rows
            .iter()
            .map(|row| row.name().chars().count())
            .max()
            .unwrap_or(0)
            .max("name".len());

        write!(f, "{:>3}  {:<name_width$}", "#", "name")?;
        if show_scores {
            write!(f, "  {:>13}", "similarity(%)")?;
        }
        writeln!(f, "  id")?;

        for (i, row) in rows.iter().enumerate() {
            let number = match row {
                CategoryRow::Listed(_) => i + 1,
                CategoryRow::Ranked(result) => result.rank,
            };
            write!(f, "{number:>3}  {:<name_width$}", row.name())?;
            if show_scores {
                let percent = row.score().map(|s| format!("{:.0}", (s * 100.0).round()));
                write!(f, "  {:>13}", percent.as_deref().unwrap_or("-"))?;
            }
            writeln!(f, "  {}", row.id())?;
        }
        Ok(())
    }
}
