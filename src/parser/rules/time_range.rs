use chrono::{Datelike, Duration, Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::parser::{Rule, RuleChain, TimeRange, WordComparer};

type RangeFn = fn(NaiveDate) -> Option<TimeRange>;

static LAST_N: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:last|past|previous)\s+(?P<n>\d{1,4})\s+(?P<unit>day|week|month|year)s?\b")
        .expect("relative range pattern must compile")
});

fn days_back(today: NaiveDate, days: i64) -> Option<TimeRange> {
    let start = today.checked_sub_signed(Duration::days(days))?;
    Some(TimeRange::spanning(start, today))
}

fn months_back(today: NaiveDate, months: u32) -> Option<TimeRange> {
    let start = today.checked_sub_months(Months::new(months))?;
    Some(TimeRange::spanning(start, today))
}

fn month_start(today: NaiveDate) -> Option<NaiveDate> {
    today.with_day(1)
}

fn quarter_start(today: NaiveDate) -> Option<NaiveDate> {
    let month = ((today.month() - 1) / 3) * 3 + 1;
    NaiveDate::from_ymd_opt(today.year(), month, 1)
}

fn today(t: NaiveDate) -> Option<TimeRange> { Some(TimeRange::spanning(t, t)) }

fn yesterday(t: NaiveDate) -> Option<TimeRange> {
    let y = t.pred_opt()?;
    Some(TimeRange::spanning(y, y))
}

fn this_week(t: NaiveDate) -> Option<TimeRange> {
    let start = t.checked_sub_signed(Duration::days(t.weekday().num_days_from_monday() as i64))?;
    Some(TimeRange::spanning(start, t))
}

fn last_7_days(t: NaiveDate) -> Option<TimeRange> { days_back(t, 7) }

fn last_14_days(t: NaiveDate) -> Option<TimeRange> { days_back(t, 14) }

fn last_30_days(t: NaiveDate) -> Option<TimeRange> { days_back(t, 30) }

fn last_month(t: NaiveDate) -> Option<TimeRange> {
    let end = month_start(t)?.pred_opt()?;
    Some(TimeRange::spanning(month_start(end)?, end))
}

fn this_month(t: NaiveDate) -> Option<TimeRange> { Some(TimeRange::spanning(month_start(t)?, t)) }

fn last_90_days(t: NaiveDate) -> Option<TimeRange> { days_back(t, 90) }

fn this_quarter(t: NaiveDate) -> Option<TimeRange> { Some(TimeRange::spanning(quarter_start(t)?, t)) }

fn year_to_date(t: NaiveDate) -> Option<TimeRange> {
    Some(TimeRange::spanning(NaiveDate::from_ymd_opt(t.year(), 1, 1)?, t))
}

fn last_year(t: NaiveDate) -> Option<TimeRange> {
    let start = NaiveDate::from_ymd_opt(t.year() - 1, 1, 1)?;
    let end = NaiveDate::from_ymd_opt(t.year() - 1, 12, 31)?;
    Some(TimeRange::spanning(start, end))
}

fn last_12_months(t: NaiveDate) -> Option<TimeRange> { months_back(t, 12) }

/// Fixed relative phrases, tried in this order.
const PHRASES: &[(&[&str], RangeFn)] = &[
    (&["today"], today),
    (&["yesterday"], yesterday),
    (&["this week", "week to date", "wtd"], this_week),
    (&["last 7 days", "past 7 days", "last week", "past week", "last seven days"], last_7_days),
    (&["last 14 days", "past 14 days", "last two weeks", "past two weeks"], last_14_days),
    (&["last 30 days", "past 30 days", "past month", "last thirty days"], last_30_days),
    (&["last month", "previous month"], last_month),
    (&["this month", "month to date", "mtd"], this_month),
    (&["last 90 days", "past 90 days", "last quarter", "past quarter", "last 3 months", "past 3 months"], last_90_days),
    (&["this quarter", "quarter to date", "qtd"], this_quarter),
    (&["ytd", "year to date", "this year"], year_to_date),
    (&["last year", "previous year"], last_year),
    (&["last 12 months", "past 12 months", "past year", "trailing twelve months", "ttm"], last_12_months),
];

fn relative_n(text: &str, today: NaiveDate) -> Option<TimeRange> {
    let caps = LAST_N.captures(text)?;
    let n: u32 = caps["n"].parse().ok()?;
    if n == 0 {
        return None;
    }
    match &caps["unit"] {
        "day" => days_back(today, n as i64),
        "week" => days_back(today, n as i64 * 7),
        "month" => months_back(today, n),
        "year" => months_back(today, n.checked_mul(12)?),
        _ => None,
    }
}

/// Phrase table rules followed by the generic "last N units" rule.
pub fn time_range_chain() -> RuleChain<TimeRange> {
    let mut chain = RuleChain::new("time_range");
    for (phrases, compute) in PHRASES {
        let comparers: Vec<WordComparer> = phrases.iter().map(|p| WordComparer::new(p)).collect();
        let compute = *compute;
        chain.push(Rule::new(
            phrases[0],
            move |ctx| comparers.iter().any(|c| c.matches(ctx.utterance)),
            move |ctx| compute(ctx.today()),
        ));
    }
    chain.with(Rule::always("last_n_units", |ctx| relative_n(ctx.text(), ctx.today())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Granularity, ParseContext, Utterance, Vocabulary};
    use chrono::{TimeZone, Utc};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn detect(text: &str) -> Option<TimeRange> {
        // Wednesday 2025-05-14
        let now = Utc.with_ymd_and_hms(2025, 5, 14, 15, 30, 0).unwrap();
        let u = Utterance::new(text);
        let v = Vocabulary::default();
        let ctx = ParseContext::new(&u, &v, &[], now);
        time_range_chain().first_match(&ctx).map(|(_, r)| r)
    }

    #[test]
    fn last_30_days() {
        let r = detect("cost by state, last 30 days").unwrap();
        assert_eq!((r.start, r.end), (d(2025, 4, 14), d(2025, 5, 14)));
        assert_eq!(r.granularity, Granularity::Day);
    }

    #[test]
    fn calendar_phrases() {
        let r = detect("spend last month").unwrap();
        assert_eq!((r.start, r.end), (d(2025, 4, 1), d(2025, 4, 30)));

        let r = detect("spend this month").unwrap();
        assert_eq!((r.start, r.end), (d(2025, 5, 1), d(2025, 5, 14)));

        let r = detect("YTD shipments").unwrap();
        assert_eq!((r.start, r.end), (d(2025, 1, 1), d(2025, 5, 14)));
        assert_eq!(r.granularity, Granularity::Month);

        let r = detect("this quarter").unwrap();
        assert_eq!(r.start, d(2025, 4, 1));

        let r = detect("last year").unwrap();
        assert_eq!((r.start, r.end), (d(2024, 1, 1), d(2024, 12, 31)));

        let r = detect("this week").unwrap();
        assert_eq!(r.start, d(2025, 5, 12));

        let r = detect("yesterday").unwrap();
        assert_eq!((r.start, r.end), (d(2025, 5, 13), d(2025, 5, 13)));
    }

    #[test]
    fn first_phrase_in_table_order_wins() {
        // "today" precedes "last month" in the table
        let r = detect("last month compared with today").unwrap();
        assert_eq!((r.start, r.end), (d(2025, 5, 14), d(2025, 5, 14)));
    }

    #[test]
    fn generic_last_n_units() {
        let r = detect("past 45 days").unwrap();
        assert_eq!(r.start, d(2025, 3, 30));
        assert_eq!(r.granularity, Granularity::Week);

        let r = detect("last 6 months").unwrap();
        assert_eq!(r.start, d(2024, 11, 14));

        let r = detect("previous 2 weeks").unwrap();
        assert_eq!(r.start, d(2025, 4, 30));
    }

    #[test]
    fn no_phrase_no_range() {
        assert!(detect("cost by state").is_none());
        assert!(detect("last 0 days").is_none());
    }
}
