use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse error category assigned to every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    FileNotFound,
    CalculationError,
    Timeout,
    MemoryError,
    NetworkError,
    PermissionError,
    ValidationError,
    Exception,
    Unknown,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::FileNotFound,
        Category::CalculationError,
        Category::Timeout,
        Category::MemoryError,
        Category::NetworkError,
        Category::PermissionError,
        Category::ValidationError,
        Category::Exception,
        Category::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::FileNotFound => "FILE_NOT_FOUND",
            Category::CalculationError => "CALCULATION_ERROR",
            Category::Timeout => "TIMEOUT",
            Category::MemoryError => "MEMORY_ERROR",
            Category::NetworkError => "NETWORK_ERROR",
            Category::PermissionError => "PERMISSION_ERROR",
            Category::ValidationError => "VALIDATION_ERROR",
            Category::Exception => "EXCEPTION",
            Category::Unknown => "UNKNOWN",
        }
    }

    pub fn parse(s: &str) -> Option<Category> {
        let wanted = s.trim().to_ascii_uppercase();
        Category::ALL.into_iter().find(|c| c.as_str() == wanted)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// First match wins: "connection timed out" is a timeout, not a network error.
const RULES: &[(&[&str], Category)] = &[
    (&["file not found", "no such file"], Category::FileNotFound),
    (&["division by zero", "divide by zero"], Category::CalculationError),
    (&["timeout", "timed out"], Category::Timeout),
    (&["memory", "out of memory"], Category::MemoryError),
    (&["connection", "network"], Category::NetworkError),
    (&["permission", "forbidden"], Category::PermissionError),
    (&["validation", "invalid"], Category::ValidationError),
    (&["exception", "error"], Category::Exception),
];

pub fn classify(message: &str) -> Category {
    let lower = message.to_lowercase();
    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, category)| *category)
        .unwrap_or(Category::Unknown)
}
