use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GuidanceError;

/// Shown alongside every piece of model-generated guidance.
pub const DISCLAIMER: &str = "This is AI-generated guidance and not professional legal advice. \
Consult with a qualified attorney for your specific situation.";

// ── Rights library ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Employment,
    Rental,
    Business,
    Loan,
    Consumer,
    Insurance,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Employment,
        Category::Rental,
        Category::Business,
        Category::Loan,
        Category::Consumer,
        Category::Insurance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Employment => "employment",
            Category::Rental => "rental",
            Category::Business => "business",
            Category::Loan => "loan",
            Category::Consumer => "consumer",
            Category::Insurance => "insurance",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = GuidanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| GuidanceError::InvalidArgument(format!("unknown category: {s}")))
    }
}

/// A canned legal scenario from the rights library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RightsRecord {
    pub id: i64,
    pub category: Category,
    pub title: String,
    pub description: String,
    pub situation: String,
    /// Display order is meaningful.
    pub remedies: Vec<String>,
    pub timeframe: String,
    pub cost: String,
    pub success_rate: String,
}

/// Filter/search/pagination request against the catalog.
///
/// `page` and `limit` are signed so that out-of-range caller input can be
/// reported instead of silently wrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFilter {
    pub category: Option<Category>,
    pub search: Option<String>,
    pub page: i64,
    pub limit: i64,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self {
            category: None,
            search: None,
            page: 1,
            limit: 10,
        }
    }
}

impl QueryFilter {
    pub fn with_category(category: Category) -> Self {
        Self {
            category: Some(category),
            ..Default::default()
        }
    }

    pub fn with_search(search: impl Into<String>) -> Self {
        Self {
            search: Some(search.into()),
            ..Default::default()
        }
    }

    pub fn page(mut self, page: i64, limit: i64) -> Self {
        self.page = page;
        self.limit = limit;
        self
    }
}

/// One page of matching records, borrowed from the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult<'a> {
    pub data: Vec<&'a RightsRecord>,
    /// Number of matches before pagination.
    pub total: usize,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

/// Value/label pair for a picker in the client UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormOption {
    pub value: &'static str,
    pub label: &'static str,
}

// ── Model response shapes ────────────────────────────────────────────────

/// Names the schema a model reply must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    BreachAnalysis,
    CaseTypeRecommendation,
    CaseDetails,
}

impl ResponseShape {
    pub fn name(&self) -> &'static str {
        match self {
            ResponseShape::BreachAnalysis => "breach_analysis",
            ResponseShape::CaseTypeRecommendation => "case_type_recommendation",
            ResponseShape::CaseDetails => "case_details",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreachAnalysis {
    pub is_breach: bool,
    pub confidence: f64,
    pub explanation: String,
    pub remedies: Vec<String>,
    pub next_steps: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Likelihood {
    High,
    Medium,
    Low,
}

impl FromStr for Likelihood {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Likelihood::High),
            "medium" => Ok(Likelihood::Medium),
            "low" => Ok(Likelihood::Low),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedCase {
    #[serde(rename = "type")]
    pub case_type: String,
    pub description: String,
    pub likelihood: Likelihood,
    pub timeframe: String,
    pub cost: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseTypeRecommendation {
    pub recommended_cases: Vec<RecommendedCase>,
    pub general_advice: String,
    pub estimated_success: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseDetails {
    pub overview: String,
    pub benefits: Vec<String>,
    pub drawbacks: Vec<String>,
    /// Ordered step-by-step guide.
    pub steps: Vec<String>,
}

/// A model reply that passed the contract check for its shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelResponse {
    BreachAnalysis(BreachAnalysis),
    CaseTypeRecommendation(CaseTypeRecommendation),
    CaseDetails(CaseDetails),
}

impl ModelResponse {
    pub fn shape(&self) -> ResponseShape {
        match self {
            ModelResponse::BreachAnalysis(_) => ResponseShape::BreachAnalysis,
            ModelResponse::CaseTypeRecommendation(_) => ResponseShape::CaseTypeRecommendation,
            ModelResponse::CaseDetails(_) => ResponseShape::CaseDetails,
        }
    }
}

// ── Guidance requests / reports ──────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreachRequest {
    pub situation: Option<String>,
    pub contract_type: Option<String>,
}

impl BreachRequest {
    pub fn new(situation: impl Into<String>, contract_type: impl Into<String>) -> Self {
        Self {
            situation: Some(situation.into()),
            contract_type: Some(contract_type.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseTypeRequest {
    pub problem_type: Option<String>,
    pub situation: Option<String>,
}

impl CaseTypeRequest {
    pub fn new(problem_type: impl Into<String>, situation: Option<String>) -> Self {
        Self {
            problem_type: Some(problem_type.into()),
            situation,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseDetailsRequest {
    pub problem_type: Option<String>,
    pub case_type: Option<String>,
}

impl CaseDetailsRequest {
    pub fn new(problem_type: impl Into<String>, case_type: impl Into<String>) -> Self {
        Self {
            problem_type: Some(problem_type.into()),
            case_type: Some(case_type.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreachReport {
    #[serde(flatten)]
    pub analysis: BreachAnalysis,
    pub contract_type: String,
    pub analysis_date: DateTime<Utc>,
    pub disclaimer: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseTypeReport {
    pub problem_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub situation: Option<String>,
    #[serde(flatten)]
    pub recommendation: CaseTypeRecommendation,
    pub generated_at: DateTime<Utc>,
    pub disclaimer: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseDetailsReport {
    pub problem_type: String,
    pub case_type: String,
    #[serde(flatten)]
    pub details: CaseDetails,
    pub generated_at: DateTime<Utc>,
    pub disclaimer: &'static str,
}
