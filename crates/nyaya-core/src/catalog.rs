use std::collections::HashSet;

use crate::error::{GuidanceError, GuidanceResult};
use crate::types::{Category, CategoryCount, QueryFilter, QueryResult, RightsRecord};

/// Read-only, validated collection of rights records.
///
/// Built once at startup and shared by reference; there is no mutation API.
#[derive(Debug, Clone)]
pub struct RightsCatalog {
    records: Vec<RightsRecord>,
}

impl RightsCatalog {
    /// Validate every record and build the catalog. A single bad record fails
    /// the whole load.
    pub fn new(records: Vec<RightsRecord>) -> GuidanceResult<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            validate_record(record)?;
            if !seen.insert(record.id) {
                return Err(GuidanceError::validation(
                    format!("id={}", record.id),
                    "id",
                    "is not unique",
                ));
            }
        }
        tracing::debug!(records = records.len(), "rights catalog loaded");
        Ok(Self { records })
    }

    /// Load records from a JSON array.
    pub fn from_json(json: &str) -> GuidanceResult<Self> {
        let raw: Vec<serde_json::Value> = serde_json::from_str(json).map_err(|e| {
            GuidanceError::validation("<library>", "<root>", format!("is not a JSON array: {e}"))
        })?;
        let records = raw
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                serde_json::from_value::<RightsRecord>(v).map_err(|e| {
                    GuidanceError::validation(format!("#{i}"), "<schema>", e.to_string())
                })
            })
            .collect::<GuidanceResult<Vec<_>>>()?;
        Self::new(records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[RightsRecord] {
        &self.records
    }

    /// Category filter AND text search, then a `[(page-1)*limit, page*limit)` slice.
    pub fn query(&self, filter: &QueryFilter) -> GuidanceResult<QueryResult<'_>> {
        if filter.page < 1 {
            return Err(GuidanceError::InvalidArgument(format!(
                "page must be at least 1 (got {})",
                filter.page
            )));
        }
        if filter.limit < 1 {
            return Err(GuidanceError::InvalidArgument(format!(
                "limit must be at least 1 (got {})",
                filter.limit
            )));
        }

        let needle = filter
            .search
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(str::to_lowercase);

        let matches: Vec<&RightsRecord> = self
            .records
            .iter()
            .filter(|r| filter.category.map_or(true, |c| r.category == c))
            .filter(|r| needle.as_deref().map_or(true, |n| matches_text(r, n)))
            .collect();

        let total = matches.len();
        let limit = usize::try_from(filter.limit).unwrap_or(usize::MAX);
        let start = usize::try_from(filter.page - 1)
            .unwrap_or(usize::MAX)
            .saturating_mul(limit);
        let data = matches.into_iter().skip(start).take(limit).collect();

        Ok(QueryResult {
            data,
            total,
            page: filter.page,
            limit: filter.limit,
        })
    }

    /// First page of records matching `query`. Blank queries are rejected.
    pub fn search(&self, query: &str) -> GuidanceResult<Vec<&RightsRecord>> {
        if query.trim().is_empty() {
            return Err(GuidanceError::InvalidArgument(
                "search query is required".into(),
            ));
        }
        Ok(self.query(&QueryFilter::with_search(query))?.data)
    }

    pub fn by_category(&self, category: Category) -> GuidanceResult<Vec<&RightsRecord>> {
        Ok(self.query(&QueryFilter::with_category(category))?.data)
    }

    pub fn get(&self, id: i64) -> GuidanceResult<&RightsRecord> {
        self.records
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| GuidanceError::NotFound(format!("rights record {id}")))
    }

    /// Categories present in the catalog with their record counts.
    pub fn categories(&self) -> Vec<CategoryCount> {
        let mut out: Vec<CategoryCount> = Vec::new();
        for record in &self.records {
            match out.iter_mut().find(|c| c.category == record.category) {
                Some(c) => c.count += 1,
                None => out.push(CategoryCount {
                    category: record.category,
                    count: 1,
                }),
            }
        }
        out
    }
}

fn matches_text(record: &RightsRecord, needle: &str) -> bool {
    record.title.to_lowercase().contains(needle)
        || record.description.to_lowercase().contains(needle)
        || record
            .remedies
            .iter()
            .any(|remedy| remedy.to_lowercase().contains(needle))
}

fn validate_record(record: &RightsRecord) -> GuidanceResult<()> {
    let label = format!("id={}", record.id);

    if record.id < 1 {
        return Err(GuidanceError::validation(label, "id", "must be a positive integer"));
    }

    let text_fields = [
        ("title", &record.title),
        ("description", &record.description),
        ("situation", &record.situation),
        ("timeframe", &record.timeframe),
        ("cost", &record.cost),
        ("successRate", &record.success_rate),
    ];
    for (field, value) in text_fields {
        if value.trim().is_empty() {
            return Err(GuidanceError::validation(label, field, "must not be empty"));
        }
    }

    if record.remedies.is_empty() {
        return Err(GuidanceError::validation(
            label,
            "remedies",
            "must contain at least one entry",
        ));
    }
    if let Some(i) = record.remedies.iter().position(|r| r.trim().is_empty()) {
        return Err(GuidanceError::validation(
            label,
            format!("remedies[{i}]"),
            "must not be empty",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, category: Category, title: &str) -> RightsRecord {
        RightsRecord {
            id,
            category,
            title: title.into(),
            description: format!("{title} description"),
            situation: "situation".into(),
            remedies: vec!["Send a legal notice".into()],
            timeframe: "30 days".into(),
            cost: "Low".into(),
            success_rate: "High".into(),
        }
    }

    #[test]
    fn test_offset_overflow_yields_empty_page() {
        let catalog = RightsCatalog::new(vec![record(1, Category::Loan, "A")]).unwrap();
        let result = catalog
            .query(&QueryFilter::default().page(i64::MAX, i64::MAX))
            .unwrap();
        assert!(result.data.is_empty());
        assert_eq!(result.total, 1);
    }

    #[test]
    fn test_validation_names_record_and_field() {
        let mut bad = record(7, Category::Rental, "Deposit");
        bad.cost = "  ".into();
        let err = RightsCatalog::new(vec![record(1, Category::Loan, "A"), bad]).unwrap_err();
        match err {
            GuidanceError::Validation { record, field, .. } => {
                assert_eq!(record, "id=7");
                assert_eq!(field, "cost");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }
}
