//! Work mode (remote / hybrid / on-site) extraction.

use super::markers::marker_values;
use super::{Chain, PostingContext, Rule};
use crate::models::posting::{Field, WorkMode};

/// `marker` → `keyword`.
pub fn work_mode_chain() -> Chain<WorkMode> {
    Chain::new(Field::WorkMode)
        .rule(Rule::new("marker", from_marker))
        .rule(Rule::new("keyword", from_keyword))
}

fn from_marker(ctx: &PostingContext<'_>) -> Vec<WorkMode> {
    marker_values(&ctx.lines, &ctx.rules.work_mode_markers, &ctx.rules.field_markers)
        .iter()
        .filter_map(|value| ctx.rules.work_mode_in(value))
        .collect()
}

fn from_keyword(ctx: &PostingContext<'_>) -> Vec<WorkMode> {
    ctx.rules.work_mode_in(ctx.text).into_iter().collect()
}
