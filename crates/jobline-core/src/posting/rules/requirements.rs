//! Requirements list extraction.

use super::markers::marker_section;
use super::patterns::{BULLET_ITEM, NUMBERED_ITEM};
use super::{Chain, PostingContext, Rule};
use crate::models::posting::Field;

/// `section` → `bullets` → `numbered`.
pub fn requirements_chain() -> Chain<Vec<String>> {
    Chain::new(Field::Requirements)
        .rule(Rule::new("section", from_section).validated_by(non_empty))
        .rule(Rule::new("bullets", bullets).validated_by(enough_items))
        .rule(Rule::new("numbered", numbered).validated_by(enough_items))
}

/// Text of a bullet or numbered line, without its prefix.
pub fn list_item(line: &str) -> Option<&str> {
    BULLET_ITEM
        .captures(line)
        .or_else(|| NUMBERED_ITEM.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn from_section(ctx: &PostingContext<'_>) -> Vec<Vec<String>> {
    let Some(lines) = marker_section(ctx.text, &ctx.rules.requirement_headers) else {
        return Vec::new();
    };
    let items: Vec<String> = lines
        .iter()
        .filter_map(|line| list_item(line))
        .map(str::to_string)
        .collect();
    if !items.is_empty() {
        return vec![items];
    }
    vec![lines.iter().map(|line| line.to_string()).collect()]
}

fn bullets(ctx: &PostingContext<'_>) -> Vec<Vec<String>> {
    vec![items_matching(ctx, |line| {
        BULLET_ITEM.captures(line).map(|c| c[1].to_string())
    })]
}

fn numbered(ctx: &PostingContext<'_>) -> Vec<Vec<String>> {
    vec![items_matching(ctx, |line| {
        NUMBERED_ITEM.captures(line).map(|c| c[1].to_string())
    })]
}

fn items_matching(ctx: &PostingContext<'_>, item: impl Fn(&str) -> Option<String>) -> Vec<String> {
    ctx.lines.iter().filter_map(|line| item(*line)).collect()
}

fn non_empty(_: &PostingContext<'_>, items: &Vec<String>) -> bool {
    !items.is_empty()
}

fn enough_items(ctx: &PostingContext<'_>, items: &Vec<String>) -> bool {
    !items.is_empty() && items.len() >= ctx.config().min_list_items
}
