//! Company name extraction.

use super::markers::marker_values;
use super::patterns::{
    BULLET_ITEM, DANGLING_PERIOD, LOGO_SUFFIX, LOGO_TOKEN, MODALITY_TAG, NUMBERED_ITEM,
    TITLE_SEPARATOR, TRAILING_PUNCTUATION,
};
use super::{Chain, PostingContext, Rule};
use crate::models::posting::Field;
use crate::text::{collapse_whitespace, normalize};

/// `marker` → `logo` → `middle_dot` → `capitalized_line`.
///
/// Every rule shares [`valid_company`], so a candidate equal to the extracted
/// role or found in the deny list is skipped and the chain moves on.
pub fn company_chain() -> Chain<String> {
    Chain::new(Field::Company)
        .rule(Rule::new("marker", from_marker).validated_by(valid_company))
        .rule(Rule::new("logo", after_logo).validated_by(valid_company))
        .rule(Rule::new("middle_dot", before_middle_dot).validated_by(valid_company))
        .rule(Rule::new("capitalized_line", capitalized_lines).validated_by(valid_company))
}

/// Strip logo tokens, modality tags, location tails and trailing punctuation.
///
/// `"Acme Corp logo"`, `"Acme Corp (Remote)"` and `"Acme Corp · Bogotá"` all
/// clean to `"Acme Corp"`.
pub fn clean_company_name(name: &str) -> String {
    let without_logo = LOGO_SUFFIX.replace(name.trim(), "");
    let head = TITLE_SEPARATOR
        .split(&without_logo)
        .next()
        .unwrap_or_default();
    let without_tags = MODALITY_TAG.replace_all(head, " ");
    let collapsed = collapse_whitespace(&without_tags);
    let trimmed = TRAILING_PUNCTUATION.replace(&collapsed, "");
    DANGLING_PERIOD.replace(&trimmed, "${1}").into_owned()
}

fn from_marker(ctx: &PostingContext<'_>) -> Vec<String> {
    marker_values(&ctx.lines, &ctx.rules.company_markers, &ctx.rules.field_markers)
        .iter()
        .map(|v| clean_company_name(v))
        .collect()
}

fn after_logo(ctx: &PostingContext<'_>) -> Vec<String> {
    let mut candidates = Vec::new();
    for (i, line) in ctx.lines.iter().enumerate() {
        let Some(token) = LOGO_TOKEN.find(line) else {
            continue;
        };
        let before = clean_company_name(&line[..token.start()]);
        if !before.is_empty() {
            candidates.push(before);
        } else if let Some(next) = ctx.lines.get(i + 1) {
            candidates.push(clean_company_name(next));
        }
    }
    candidates
}

/// Segment before the first `·`, unless the line also carries a deny-listed
/// segment such as a location or "2 days ago".
fn before_middle_dot(ctx: &PostingContext<'_>) -> Vec<String> {
    ctx.lines
        .iter()
        .filter_map(|line| {
            let mut segments = line.split('·');
            let head = segments.next()?;
            let mut rest = segments.peekable();
            rest.peek()?;
            if rest.any(|segment| ctx.rules.deny.rejects(segment)) {
                return None;
            }
            Some(clean_company_name(head))
        })
        .collect()
}

fn capitalized_lines(ctx: &PostingContext<'_>) -> Vec<String> {
    let max_words = ctx.config().max_company_words;
    ctx.lines
        .iter()
        .filter(|line| line.chars().next().is_some_and(char::is_uppercase))
        .filter(|line| line.split_whitespace().count() <= max_words)
        .filter(|line| !line.contains(':') && !line.ends_with('.'))
        .filter(|line| !BULLET_ITEM.is_match(line) && !NUMBERED_ITEM.is_match(line))
        .filter(|line| !ctx.rules.has_role_keyword(line))
        .map(|line| clean_company_name(line))
        .collect()
}

fn valid_company(ctx: &PostingContext<'_>, value: &String) -> bool {
    if value.is_empty() || value.chars().count() > ctx.config().max_company_chars {
        return false;
    }
    if value.ends_with(':') || ctx.rules.is_marker_line(value) || ctx.rules.is_noise(value) {
        return false;
    }
    ctx.role_norm.as_deref() != Some(normalize(value).as_str())
}
