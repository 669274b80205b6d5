//! Role (job title) extraction.

use super::markers::marker_values;
use super::patterns::{BULLET_ITEM, COMPANY_SUFFIX, LOGO_TOKEN, NUMBERED_ITEM, TITLE_SEPARATOR};
use super::{Chain, PostingContext, Rule};
use crate::models::posting::Field;
use crate::text::collapse_whitespace;

/// `marker` → `keyword` → `title_line`.
pub fn role_chain() -> Chain<String> {
    Chain::new(Field::Role)
        .rule(Rule::new("marker", from_marker).validated_by(valid_marker_role))
        .rule(Rule::new("keyword", keyword_lines).validated_by(plausible_title))
        .rule(Rule::new("title_line", title_lines).validated_by(plain_title))
}

fn from_marker(ctx: &PostingContext<'_>) -> Vec<String> {
    marker_values(&ctx.lines, &ctx.rules.role_markers, &ctx.rules.field_markers)
        .iter()
        .map(|v| clean_title(v))
        .collect()
}

fn keyword_lines(ctx: &PostingContext<'_>) -> Vec<String> {
    ctx.lines
        .iter()
        .map(|line| cut_title(line))
        .filter(|title| ctx.rules.has_role_keyword(title))
        .collect()
}

fn title_lines(ctx: &PostingContext<'_>) -> Vec<String> {
    ctx.lines.iter().map(|line| cut_title(line)).collect()
}

fn valid_marker_role(ctx: &PostingContext<'_>, value: &String) -> bool {
    !value.is_empty()
        && value.chars().count() <= ctx.config().max_title_chars
        && !value.ends_with(':')
        && !ctx.rules.is_marker_line(value)
        && !ctx.rules.is_noise(value)
}

/// Short, capitalized, not a sentence, list item or boilerplate.
pub(crate) fn plausible_title(ctx: &PostingContext<'_>, value: &String) -> bool {
    let config = ctx.config();
    let starts_upper = value.chars().next().is_some_and(char::is_uppercase);

    starts_upper
        && value.split_whitespace().count() <= config.max_title_words
        && value.chars().count() <= config.max_title_chars
        && !value.ends_with(['.', ':'])
        && !value.contains(':')
        && !BULLET_ITEM.is_match(value)
        && !NUMBERED_ITEM.is_match(value)
        && !ctx.rules.is_noise(value)
}

/// A plausible title that does not look like a company line.
fn plain_title(ctx: &PostingContext<'_>, value: &String) -> bool {
    plausible_title(ctx, value) && !COMPANY_SUFFIX.is_match(value) && !LOGO_TOKEN.is_match(value)
}

/// Title part of a line, before any location or metadata separator.
fn cut_title(line: &str) -> String {
    let head = TITLE_SEPARATOR.split(line).next().unwrap_or(line);
    clean_title(head)
}

fn clean_title(value: &str) -> String {
    collapse_whitespace(value)
        .trim_end_matches([',', ';'])
        .trim()
        .to_string()
}
