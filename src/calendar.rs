use chrono::{Datelike, NaiveDate};

const WEEKDAYS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];
const CELL_WIDTH: usize = 4;

/// Month grid (Monday first) with a `*` after each day listed in `marked`.
///
/// Returns `None` for an invalid year/month.
pub fn render_month(year: i32, month: u32, marked: &[NaiveDate]) -> Option<String> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;

    let title = first.format("%B %Y").to_string();
    let mut out = format!("{:^width$}\n", title, width = CELL_WIDTH * 7);
    let header: String = WEEKDAYS.iter().map(|day| format!("{:>3} ", day)).collect();
    out.push_str(header.trim_end());
    out.push('\n');

    let mut line = " ".repeat(CELL_WIDTH * first.weekday().num_days_from_monday() as usize);
    for day in first.iter_days().take_while(|day| day.month() == month) {
        let mark = if marked.contains(&day) { '*' } else { ' ' };
        line.push_str(&format!("{:>3}{}", day.day(), mark));

        if day.weekday().num_days_from_monday() == 6 {
            out.push_str(line.trim_end());
            out.push('\n');
            line.clear();
        }
    }
    if !line.trim().is_empty() {
        out.push_str(line.trim_end());
        out.push('\n');
    }

    Some(out)
}
