//! Posting date extraction.

use chrono::{Datelike, NaiveDate};

use super::markers::marker_values;
use super::patterns::DATE_TOKEN;
use super::{Chain, PostingContext, Rule};
use crate::models::posting::Field;

/// `marker` → `bare_token`.
///
/// When neither rule matches, the extractor falls back to its reference
/// (processing) date and marks the date as not found.
pub fn date_chain() -> Chain<NaiveDate> {
    Chain::new(Field::Date)
        .rule(Rule::new("marker", from_marker).validated_by(plausible_year))
        .rule(Rule::new("bare_token", bare_tokens).validated_by(plausible_year))
}

/// Parse with the first format that accepts the whole value.
pub fn parse_date(value: &str, formats: &[String]) -> Option<NaiveDate> {
    let value = value.trim();
    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

fn from_marker(ctx: &PostingContext<'_>) -> Vec<NaiveDate> {
    let formats = &ctx.config().date_formats;
    marker_values(&ctx.lines, &ctx.rules.date_markers, &ctx.rules.field_markers)
        .iter()
        .filter_map(|value| {
            parse_date(value, formats).or_else(|| {
                DATE_TOKEN
                    .find_iter(value)
                    .find_map(|m| parse_date(m.as_str(), formats))
            })
        })
        .collect()
}

fn bare_tokens(ctx: &PostingContext<'_>) -> Vec<NaiveDate> {
    let formats = &ctx.config().date_formats;
    DATE_TOKEN
        .find_iter(ctx.text)
        .filter_map(|m| parse_date(m.as_str(), formats))
        .collect()
}

fn plausible_year(_: &PostingContext<'_>, date: &NaiveDate) -> bool {
    (1970..=2100).contains(&date.year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::ExtractionConfig;
    use crate::posting::rules::ExtractionRules;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn date(text: &str) -> Option<(NaiveDate, &'static str)> {
        let rules = ExtractionRules::default();
        let ctx = PostingContext::new(text, &rules);
        date_chain().run(&ctx).map(|m| (m.value, m.rule))
    }

    #[test]
    fn test_format_order() {
        let formats = ExtractionConfig::default().date_formats;
        assert_eq!(parse_date("2024-03-05", &formats), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date("2024/3/5", &formats), Some(ymd(2024, 3, 5)));
        // Day-first wins over month-first for ambiguous values.
        assert_eq!(parse_date("05/03/2024", &formats), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date("12/31/2024", &formats), Some(ymd(2024, 12, 31)));
        assert_eq!(parse_date("31/02/2024", &formats), None);
        assert_eq!(parse_date("yesterday", &formats), None);
    }

    #[test]
    fn test_marker_before_bare_token() {
        let text = "Cierre 2024-12-01\nFecha de publicación: 15/04/2024";
        assert_eq!(date(text), Some((ymd(2024, 4, 15), "marker")));
    }

    #[test]
    fn test_bare_token_skips_invalid_dates() {
        let text = "Ref 2024-13-45\nAbierta hasta 2024-06-30";
        assert_eq!(date(text), Some((ymd(2024, 6, 30), "bare_token")));
    }

    #[test]
    fn test_no_date() {
        assert_eq!(date("Posted: 3 days ago"), None);
    }
}
