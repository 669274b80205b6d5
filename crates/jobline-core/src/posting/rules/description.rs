//! Description extraction.

use super::markers::marker_section;
use super::patterns::BLANK_LINE_RUN;
use super::{Chain, PostingContext, Rule};
use crate::models::posting::Field;

/// `marker` → `largest_paragraph` → `leading_lines` → `head`.
///
/// Only blank text misses every rule; the extractor then uses the configured
/// placeholder.
pub fn description_chain() -> Chain<String> {
    Chain::new(Field::Description)
        .rule(Rule::new("marker", marker_block).validated_by(long_enough))
        .rule(Rule::new("largest_paragraph", largest_paragraph))
        .rule(Rule::new("leading_lines", leading_lines))
        .rule(Rule::new("head", head))
}

fn marker_block(ctx: &PostingContext<'_>) -> Vec<String> {
    marker_section(ctx.text, &ctx.rules.description_markers)
        .map(|lines| lines.join("\n"))
        .into_iter()
        .collect()
}

fn long_enough(ctx: &PostingContext<'_>, block: &String) -> bool {
    block.chars().count() >= ctx.config().description_min_chars
}

fn largest_paragraph(ctx: &PostingContext<'_>) -> Vec<String> {
    let min_chars = ctx.config().description_min_chars;
    let paragraphs: Vec<&str> = BLANK_LINE_RUN
        .split(ctx.text.trim())
        .map(str::trim)
        .filter(|p| p.chars().count() > min_chars)
        .collect();

    // `max_by_key` keeps the last maximum; scan backwards to keep the first.
    paragraphs
        .iter()
        .rev()
        .max_by_key(|p| p.chars().count())
        .map(|p| p.to_string())
        .into_iter()
        .collect()
}

fn leading_lines(ctx: &PostingContext<'_>) -> Vec<String> {
    if ctx.lines.len() < 3 {
        return Vec::new();
    }
    let max_lines = ctx.config().description_max_lines;
    vec![ctx.lines.iter().take(max_lines).copied().collect::<Vec<_>>().join("\n")]
}

fn head(ctx: &PostingContext<'_>) -> Vec<String> {
    let text = ctx.text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    vec![text.chars().take(ctx.config().description_max_chars).collect()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posting::rules::ExtractionRules;

    fn description(text: &str) -> Option<(String, &'static str)> {
        let rules = ExtractionRules::default();
        let ctx = PostingContext::new(text, &rules);
        description_chain().run(&ctx).map(|m| (m.value, m.rule))
    }

    const LONG_A: &str = "We build data products for retail clients across the region.";
    const LONG_B: &str = "You will own dashboards, pipelines and stakeholder reporting end to end.";

    #[test]
    fn test_marker_block() {
        let text = format!("Analyst\nAbout the role:\n{LONG_A}\nMore detail here.\n\nBenefits");
        let (value, rule) = description(&text).unwrap();
        assert_eq!(rule, "marker");
        assert_eq!(value, format!("{LONG_A}\nMore detail here."));
    }

    #[test]
    fn test_short_marker_block_falls_through() {
        let text = format!("Description: TBD\n\n{LONG_A}");
        assert_eq!(description(&text), Some((LONG_A.to_string(), "largest_paragraph")));
    }

    #[test]
    fn test_largest_paragraph_first_on_tie() {
        let text = format!("Title\n\n{LONG_A}\n\n\n{LONG_B}\n\nshort");
        assert_eq!(description(&text), Some((LONG_B.to_string(), "largest_paragraph")));

        let text = format!("{LONG_A}\n\n{LONG_A}x\n\n{LONG_A}y");
        assert_eq!(description(&text).unwrap().0, format!("{LONG_A}x"));
    }

    #[test]
    fn test_leading_lines_then_head() {
        let text = "Analyst\nAcme\nRemote\nSQL";
        assert_eq!(description(text), Some((text.to_string(), "leading_lines")));

        assert_eq!(description("Analyst\nAcme"), Some(("Analyst\nAcme".to_string(), "head")));
        assert_eq!(description("  \n "), None);
    }
}
