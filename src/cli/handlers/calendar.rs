//! Calendar command handler.

use anyhow::{Result, anyhow};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;
use std::fmt::Write;

use crate::cli::CalendarArgs;
use crate::domain::DateKey;
use crate::infra::StorageContext;
use crate::store::TreeIndexer;

pub fn handle_calendar(args: &CalendarArgs, ctx: &StorageContext) -> Result<()> {
    let today = DateKey::today();
    let year = args.year.unwrap_or(today.year());
    let month = args.month.map(|m| m - 1).unwrap_or(today.month());

    let index = TreeIndexer::new(ctx).crawl();
    let days: BTreeSet<u32> = index.month(year, month).iter().map(|(k, _)| k.day()).collect();

    print!("{}", render_month(year, month, &days)?);
    println!();
    println!("{} day(s) with notes", days.len());
    Ok(())
}

/// Renders a Monday-first month grid; days with notes are marked with `*`.
pub fn render_month(year: i32, month: u32, marked: &BTreeSet<u32>) -> Result<String> {
    let first = NaiveDate::from_ymd_opt(year, month + 1, 1)
        .ok_or_else(|| anyhow!("invalid month {}-{}", year, month + 1))?;
    let days_in_month = first
        .checked_add_months(chrono::Months::new(1))
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .ok_or_else(|| anyhow!("month out of range: {}-{}", year, month + 1))?;

    let mut out = String::new();
    writeln!(out, "{:^28}", first.format("%B %Y").to_string())?;
    writeln!(out, " Mo  Tu  We  Th  Fr  Sa  Su ")?;

    let offset = first.weekday().num_days_from_monday() as usize;
    let mut line = "    ".repeat(offset);
    for day in 1..=days_in_month {
        let mark = if marked.contains(&day) { '*' } else { ' ' };
        write!(line, " {:>2}{}", day, mark)?;
        if (offset + day as usize) % 7 == 0 {
            writeln!(out, "{}", line.trim_end())?;
            line.clear();
        }
    }
    if !line.is_empty() {
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(out)
}
