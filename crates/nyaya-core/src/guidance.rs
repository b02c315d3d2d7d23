use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::contract;
use crate::error::{GuidanceError, GuidanceResult};
use crate::model::ModelBackend;
use crate::prompt;
use crate::types::{
    BreachReport, BreachRequest, CaseDetailsReport, CaseDetailsRequest, CaseTypeReport,
    CaseTypeRequest, ResponseShape, DISCLAIMER,
};

/// Longest accepted free-text situation, in characters.
pub const MAX_SITUATION_CHARS: usize = 2000;
/// Longest accepted contract/problem/case type label, in characters.
pub const MAX_LABEL_CHARS: usize = 200;

/// Deadline and cancellation signal for one guidance call.
#[derive(Debug, Clone)]
pub struct CallContext {
    pub timeout: Duration,
    pub cancel: CancellationToken,
}

impl CallContext {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// How often a failed model call is retried, and how long to wait first.
/// The wait doubles after each failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }
}

/// Sequences prompt construction, the model call and the contract check.
///
/// Stateless apart from the injected backend; clones share the backend.
#[derive(Clone)]
pub struct GuidanceOrchestrator {
    backend: Arc<dyn ModelBackend>,
    retry: RetryPolicy,
    default_timeout: Duration,
}

impl GuidanceOrchestrator {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self {
            backend,
            retry: RetryPolicy::default(),
            default_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// A fresh call context using the configured default timeout.
    pub fn default_call(&self) -> CallContext {
        CallContext::new(self.default_timeout)
    }

    pub async fn analyze_breach(
        &self,
        req: &BreachRequest,
        call: &CallContext,
    ) -> GuidanceResult<BreachReport> {
        let situation = required(&req.situation, "situation", MAX_SITUATION_CHARS)?;
        let contract_type = required(&req.contract_type, "contractType", MAX_LABEL_CHARS)?;

        let prompt = prompt::breach_prompt(situation, contract_type);
        let raw = self.call_model("analyze_breach", &prompt, call).await?;
        let analysis = contract::validate_breach_analysis(&raw)
            .inspect_err(|e| {
                error!(
                    operation = "analyze_breach",
                    shape = ResponseShape::BreachAnalysis.name(),
                    "{e}"
                )
            })?;

        Ok(BreachReport {
            analysis,
            contract_type: contract_type.to_string(),
            analysis_date: Utc::now(),
            disclaimer: DISCLAIMER,
        })
    }

    pub async fn find_case_type(
        &self,
        req: &CaseTypeRequest,
        call: &CallContext,
    ) -> GuidanceResult<CaseTypeReport> {
        let problem_type = required(&req.problem_type, "problemType", MAX_LABEL_CHARS)?;
        let situation = optional(&req.situation, "situation", MAX_SITUATION_CHARS)?;

        let prompt = prompt::case_type_prompt(problem_type, situation);
        let raw = self.call_model("find_case_type", &prompt, call).await?;
        let recommendation = contract::validate_case_type_recommendation(&raw)
            .inspect_err(|e| {
                error!(
                    operation = "find_case_type",
                    shape = ResponseShape::CaseTypeRecommendation.name(),
                    "{e}"
                )
            })?;

        Ok(CaseTypeReport {
            problem_type: problem_type.to_string(),
            situation: situation.map(str::to_string),
            recommendation,
            generated_at: Utc::now(),
            disclaimer: DISCLAIMER,
        })
    }

    pub async fn case_details(
        &self,
        req: &CaseDetailsRequest,
        call: &CallContext,
    ) -> GuidanceResult<CaseDetailsReport> {
        let problem_type = required(&req.problem_type, "problemType", MAX_LABEL_CHARS)?;
        let case_type = required(&req.case_type, "caseType", MAX_LABEL_CHARS)?;

        let prompt = prompt::case_details_prompt(problem_type, case_type);
        let raw = self.call_model("case_details", &prompt, call).await?;
        let details = contract::validate_case_details(&raw)
            .inspect_err(|e| {
                error!(
                    operation = "case_details",
                    shape = ResponseShape::CaseDetails.name(),
                    "{e}"
                )
            })?;

        Ok(CaseDetailsReport {
            problem_type: problem_type.to_string(),
            case_type: case_type.to_string(),
            details,
            generated_at: Utc::now(),
            disclaimer: DISCLAIMER,
        })
    }

    /// Run the model call under the caller's deadline, retrying failures per
    /// the retry policy. The deadline covers every attempt and backoff wait;
    /// cancellation stops both the call and any backoff wait.
    async fn call_model(
        &self,
        operation: &'static str,
        prompt: &str,
        call: &CallContext,
    ) -> GuidanceResult<String> {
        let backend = self.backend.name();
        let deadline = Instant::now() + call.timeout;
        let mut delay = self.retry.backoff;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            info!(operation, backend = %backend, attempt, prompt_len = prompt.len(), "calling model");

            let outcome = tokio::select! {
                biased;
                _ = call.cancel.cancelled() => {
                    warn!(operation, attempt, "model call cancelled");
                    return Err(GuidanceError::ModelUnavailable("cancelled by caller".into()));
                }
                r = tokio::time::timeout_at(deadline, self.backend.generate(prompt)) => r,
            };

            let cause = match outcome {
                Ok(Ok(text)) => {
                    info!(operation, attempt, output_len = text.len(), "model response received");
                    return Ok(text);
                }
                Ok(Err(e)) => format!("{e:#}"),
                Err(_elapsed) => format!("timed out after {}ms", call.timeout.as_millis()),
            };

            // No retry once the backoff wait alone would run past the deadline.
            if attempt > self.retry.max_retries || Instant::now() + delay >= deadline {
                error!(operation, backend = %backend, attempt, "model call failed: {cause}");
                return Err(GuidanceError::ModelUnavailable(cause));
            }

            warn!(
                operation,
                attempt,
                retry_in_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "model call failed, retrying: {cause}"
            );
            tokio::select! {
                biased;
                _ = call.cancel.cancelled() => {
                    return Err(GuidanceError::ModelUnavailable("cancelled by caller".into()));
                }
                _ = tokio::time::sleep(delay) => {}
            }
            delay = delay.saturating_mul(2);
        }
    }
}

fn required<'a>(
    value: &'a Option<String>,
    field: &str,
    max_chars: usize,
) -> GuidanceResult<&'a str> {
    match value.as_deref().map(str::trim) {
        None => Err(GuidanceError::InvalidArgument(format!("{field} is required"))),
        Some("") => Err(GuidanceError::InvalidArgument(format!(
            "{field} must not be empty"
        ))),
        Some(v) => check_length(v, field, max_chars),
    }
}

fn optional<'a>(
    value: &'a Option<String>,
    field: &str,
    max_chars: usize,
) -> GuidanceResult<Option<&'a str>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => check_length(v, field, max_chars).map(Some),
    }
}

fn check_length<'a>(value: &'a str, field: &str, max_chars: usize) -> GuidanceResult<&'a str> {
    let len = value.chars().count();
    if len > max_chars {
        return Err(GuidanceError::InvalidArgument(format!(
            "{field} is too long ({len} characters, max {max_chars})"
        )));
    }
    Ok(value)
}
