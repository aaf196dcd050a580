use crate::classify::{classify, Category};
use crate::normalize::normalize;
use crate::record::Record;
use itertools::Itertools;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Aggregated view of one analysis run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TriageSummary {
    pub total_count: usize,
    pub by_category: BTreeMap<Category, Vec<Arc<Record>>>,
    pub by_normalized_key: BTreeMap<String, Vec<Arc<Record>>>,
    /// Newest first; equal timestamps keep input order.
    pub timeline: Vec<Arc<Record>>,
}

impl TriageSummary {
    pub fn count(&self, category: Category) -> usize {
        self.by_category.get(&category).map_or(0, Vec::len)
    }

    pub fn records_in(&self, category: Category) -> &[Arc<Record>] {
        self.by_category.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Categories by record count, largest first.
    pub fn category_counts(&self) -> Vec<(Category, usize)> {
        self.by_category
            .iter()
            .map(|(c, v)| (*c, v.len()))
            .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
            .collect()
    }

    /// The `n` most frequent grouping keys, largest first, ties by key.
    pub fn top_groups(&self, n: usize) -> Vec<(&str, usize)> {
        self.by_normalized_key
            .iter()
            .map(|(k, v)| (k.as_str(), v.len()))
            .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
            .take(n)
            .collect()
    }

    pub fn recent(&self, n: usize) -> &[Arc<Record>] {
        &self.timeline[..n.min(self.timeline.len())]
    }
}

/// Per-run accumulator. Each run owns its own analyzer; nothing is shared.
#[derive(Debug, Default)]
pub struct TriageAnalyzer {
    max_records: Option<usize>,
    total: usize,
    by_category: BTreeMap<Category, Vec<Arc<Record>>>,
    by_key: BTreeMap<String, Vec<Arc<Record>>>,
    timeline: Vec<Arc<Record>>,
}

impl TriageAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop accepting records once `max` have been taken.
    pub fn with_max_records(mut self, max: Option<usize>) -> Self {
        self.max_records = max;
        self
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    fn remaining(&self) -> usize {
        self.max_records.map_or(usize::MAX, |m| m.saturating_sub(self.total))
    }

    /// Classify and bucket one record. Returns false when the cap is reached.
    pub fn add(&mut self, record: Record) -> bool {
        if self.remaining() == 0 {
            return false;
        }
        let category = classify(&record.message);
        let key = normalize(&record.message);
        self.push(category, key, Arc::new(record));
        true
    }

    /// Bulk form of [`add`](Self::add): classification runs in parallel, the
    /// merge runs in input order so buckets match sequential insertion.
    pub fn extend(&mut self, records: Vec<Record>) {
        let take = self.remaining().min(records.len());
        if take < records.len() {
            log::debug!("record cap reached, dropping {} records", records.len() - take);
        }
        let derived: Vec<(Category, String, Arc<Record>)> = records
            .into_par_iter()
            .take(take)
            .map(|r| (classify(&r.message), normalize(&r.message), Arc::new(r)))
            .collect();
        for (category, key, record) in derived {
            self.push(category, key, record);
        }
    }

    fn push(&mut self, category: Category, key: String, record: Arc<Record>) {
        self.by_category.entry(category).or_default().push(Arc::clone(&record));
        self.by_key.entry(key).or_default().push(Arc::clone(&record));
        self.timeline.push(record);
        self.total += 1;
    }

    pub fn summary(&self) -> TriageSummary {
        let mut timeline = self.timeline.clone();
        // Stable: ties keep arrival order.
        timeline.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        TriageSummary {
            total_count: self.total,
            by_category: self.by_category.clone(),
            by_normalized_key: self.by_key.clone(),
            timeline,
        }
    }

    pub fn into_summary(self) -> TriageSummary {
        let mut timeline = self.timeline;
        timeline.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        TriageSummary {
            total_count: self.total,
            by_category: self.by_category,
            by_normalized_key: self.by_key,
            timeline,
        }
    }
}

/// One-shot analysis of a record batch.
pub fn analyze(records: Vec<Record>) -> TriageSummary {
    let mut analyzer = TriageAnalyzer::new();
    analyzer.extend(records);
    let summary = analyzer.into_summary();
    log::debug!(
        "analyzed {} records into {} categories, {} groups",
        summary.total_count,
        summary.by_category.len(),
        summary.by_normalized_key.len()
    );
    summary
}
