use crate::config::GroupingConfig;
use crate::group::{Group, Groupable};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub template: String,
    /// Template spelled with the internal placeholder char; stable dedup key.
    pub canonical_template: String,
    pub count: usize,
    pub frequency: f64,
    /// Number of separate differing regions in the template.
    pub placeholders: usize,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupingReport {
    pub total_items: usize,
    pub total_groups: usize,
    pub groups: Vec<GroupSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Largest group first; ties keep result order.
    #[default]
    Count,
    /// The order the grouping run returned.
    Input,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "count" => Ok(SortOrder::Count),
            "input" => Ok(SortOrder::Input),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(OutputFormat::Json),
            "table" => Ok(OutputFormat::Table),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

pub fn summarize<T: Groupable>(
    groups: &[Group<T>],
    config: &GroupingConfig,
    total_items: usize,
    max_examples: usize,
) -> Vec<GroupSummary> {
    groups
        .iter()
        .map(|g| {
            let count = g.len();
            let frequency = if total_items == 0 { 0.0 } else { count as f64 / total_items as f64 };
            GroupSummary {
                template: g.display_template(config),
                canonical_template: g.comparable_template(config),
                count,
                frequency,
                placeholders: g.template().map(|t| t.placeholder_count(config.placeholder_char)).unwrap_or(0),
                examples: g
                    .members()
                    .iter()
                    .take(max_examples)
                    .map(|m| m.grouping_key().into_owned())
                    .collect(),
            }
        })
        .collect()
}

pub fn sort_summaries(summaries: &mut [GroupSummary], order: SortOrder) {
    if order == SortOrder::Count {
        // Stable, so equal counts keep result order.
        summaries.sort_by(|a, b| b.count.cmp(&a.count));
    }
}

pub fn build_report<T: Groupable>(
    groups: &[Group<T>],
    config: &GroupingConfig,
    total_items: usize,
    max_examples: usize,
    order: SortOrder,
) -> GroupingReport {
    let mut summaries = summarize(groups, config, total_items, max_examples);
    sort_summaries(&mut summaries, order);
    GroupingReport { total_items, total_groups: summaries.len(), groups: summaries }
}
