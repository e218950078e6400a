//! Agent prompt templates bundled at compile time.
//!
//! Static configuration data loaded once; placeholders are substituted
//! with `str::replace` when an agent builds its prompt.

/// Writer - drafts the initial article for a topic
pub const DRAFT: &str = include_str!("defaults/draft.md");

/// Evaluator - scores the article against the rubric, answers in JSON
pub const EVALUATE: &str = include_str!("defaults/evaluate.md");

/// Planner - turns an evaluation into a concrete revision plan
pub const PLAN_REVISION: &str = include_str!("defaults/plan_revision.md");

/// Writer - rewrites the article following the plan
pub const REVISE: &str = include_str!("defaults/revise.md");

/// References agent - cited sources section
pub const REFERENCES: &str = include_str!("defaults/references.md");

/// Infobox agent - key-facts table
pub const INFOBOX: &str = include_str!("defaults/infobox.md");

/// See-also agent - related topics list
pub const SEE_ALSO: &str = include_str!("defaults/see_also.md");

/// Categories agent - classification tags
pub const CATEGORIES: &str = include_str!("defaults/categories.md");

/// All templates with their slugs.
pub fn all_defaults() -> Vec<(&'static str, &'static str)> {
    vec![
        ("draft", DRAFT),
        ("evaluate", EVALUATE),
        ("plan_revision", PLAN_REVISION),
        ("revise", REVISE),
        ("references", REFERENCES),
        ("infobox", INFOBOX),
        ("see_also", SEE_ALSO),
        ("categories", CATEGORIES),
    ]
}
