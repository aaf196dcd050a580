use crate::analyzer::TriageSummary;
use crate::classify::Category;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Suggestion urgency; declaration order is most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Critical => "CRITICAL",
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub priority: Priority,
    pub issue: String,
    pub action: String,
    pub count: usize,
}

struct Rule {
    categories: &'static [Category],
    priority: Priority,
    issue: &'static str,
    action: &'static str,
}

// No classifier rule emits an external-service category, so the network rule
// only sums NETWORK_ERROR today.
const RULES: &[Rule] = &[
    Rule {
        categories: &[Category::FileNotFound],
        priority: Priority::High,
        issue: "File Not Found Errors",
        action: "Check if data files are missing or paths are incorrect. Verify deployment includes all necessary files.",
    },
    Rule {
        categories: &[Category::CalculationError],
        priority: Priority::High,
        issue: "Calculation Errors (Division by Zero)",
        action: "Review data validation logic. Check for empty datasets or zero values in calculations.",
    },
    Rule {
        categories: &[Category::Timeout],
        priority: Priority::Medium,
        issue: "Timeout Errors",
        action: "Investigate slow queries or external service calls. Consider increasing timeout limits or optimizing performance.",
    },
    Rule {
        categories: &[Category::MemoryError],
        priority: Priority::Critical,
        issue: "Memory Errors",
        action: "Check memory limits and usage. Consider increasing the service memory allocation or optimizing data processing.",
    },
    Rule {
        categories: &[Category::NetworkError],
        priority: Priority::High,
        issue: "Network/External Service Errors",
        action: "Check external service status and network connectivity. Implement retry logic and circuit breakers.",
    },
    Rule {
        categories: &[Category::ValidationError],
        priority: Priority::Medium,
        issue: "Data Validation Errors",
        action: "Review input validation logic. Check API request parameters and data format requirements.",
    },
];

/// General follow-ups that apply to any triage, regardless of category mix.
pub const GENERAL_STEPS: &[&str] = &[
    "Review the most frequent error groups above",
    "Check service logs for full stack traces",
    "Verify recent deployments or configuration changes",
    "Check external dependencies and third-party services",
    "Review monitoring dashboards for resource usage patterns",
    "Consider setting up alerts for error rate thresholds",
];

/// Remediation suggestions for the categories present in `summary`, most
/// urgent first. Empty when no rule applies.
pub fn recommend(summary: &TriageSummary) -> Vec<Suggestion> {
    let mut out: Vec<Suggestion> = RULES
        .iter()
        .filter_map(|rule| {
            let count: usize = rule.categories.iter().map(|c| summary.count(*c)).sum();
            (count > 0).then(|| Suggestion {
                priority: rule.priority,
                issue: rule.issue.to_string(),
                action: rule.action.to_string(),
                count,
            })
        })
        .collect();
    // Stable, so equal priorities keep table order.
    out.sort_by_key(|s| s.priority);
    out
}
