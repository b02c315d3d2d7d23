//! Structural contract check for model replies.
//!
//! A reply is trusted downstream only after it parses as a JSON object and
//! every field required by its [`ResponseShape`] is present with the right
//! type. Extra fields are ignored. Probabilities must be finite; values
//! outside `[0, 1]` are logged but accepted.

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{GuidanceError, GuidanceResult};
use crate::types::{
    BreachAnalysis, CaseDetails, CaseTypeRecommendation, Likelihood, ModelResponse,
    RecommendedCase, ResponseShape,
};

/// Parse `raw` and check it against `shape`.
pub fn validate(raw: &str, shape: ResponseShape) -> GuidanceResult<ModelResponse> {
    let obj = parse_object(raw)?;
    let fields = Fields::root(&obj);
    let response = match shape {
        ResponseShape::BreachAnalysis => ModelResponse::BreachAnalysis(breach_analysis(&fields)?),
        ResponseShape::CaseTypeRecommendation => {
            ModelResponse::CaseTypeRecommendation(case_type_recommendation(&fields)?)
        }
        ResponseShape::CaseDetails => ModelResponse::CaseDetails(case_details(&fields)?),
    };
    Ok(response)
}

pub fn validate_breach_analysis(raw: &str) -> GuidanceResult<BreachAnalysis> {
    breach_analysis(&Fields::root(&parse_object(raw)?))
}

pub fn validate_case_type_recommendation(raw: &str) -> GuidanceResult<CaseTypeRecommendation> {
    case_type_recommendation(&Fields::root(&parse_object(raw)?))
}

pub fn validate_case_details(raw: &str) -> GuidanceResult<CaseDetails> {
    case_details(&Fields::root(&parse_object(raw)?))
}

fn breach_analysis(f: &Fields<'_>) -> GuidanceResult<BreachAnalysis> {
    Ok(BreachAnalysis {
        is_breach: f.boolean("isBreach")?,
        confidence: f.probability("confidence")?,
        explanation: f.text("explanation")?,
        remedies: f.text_list("remedies")?,
        next_steps: f.text_list("nextSteps")?,
    })
}

fn case_type_recommendation(f: &Fields<'_>) -> GuidanceResult<CaseTypeRecommendation> {
    let recommended_cases = f
        .objects("recommendedCases")?
        .iter()
        .map(|case| {
            Ok(RecommendedCase {
                case_type: case.text("type")?,
                description: case.text("description")?,
                likelihood: case.likelihood("likelihood")?,
                timeframe: case.text("timeframe")?,
                cost: case.text("cost")?,
            })
        })
        .collect::<GuidanceResult<Vec<_>>>()?;

    Ok(CaseTypeRecommendation {
        recommended_cases,
        general_advice: f.text("generalAdvice")?,
        estimated_success: f.probability("estimatedSuccess")?,
    })
}

fn case_details(f: &Fields<'_>) -> GuidanceResult<CaseDetails> {
    Ok(CaseDetails {
        overview: f.text("overview")?,
        benefits: f.text_list("benefits")?,
        drawbacks: f.text_list("drawbacks")?,
        steps: f.text_list("steps")?,
    })
}

/// Parse the reply as a JSON object, tolerating one surrounding Markdown code fence.
fn parse_object(raw: &str) -> GuidanceResult<Map<String, Value>> {
    let body = strip_code_fence(raw);
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(obj)) => Ok(obj),
        Ok(_) => Err(GuidanceError::parse("expected a JSON object")),
        Err(_) => Err(GuidanceError::parse("malformed JSON")),
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop an info string such as "json" on the opening fence line.
    match inner.split_once('\n') {
        Some((info, body)) if !info.contains('{') => body.trim(),
        _ => inner.trim(),
    }
}

/// Typed accessors over one JSON object; errors carry the full field path.
struct Fields<'a> {
    obj: &'a Map<String, Value>,
    prefix: String,
}

impl<'a> Fields<'a> {
    fn root(obj: &'a Map<String, Value>) -> Self {
        Self {
            obj,
            prefix: String::new(),
        }
    }

    fn path(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    fn get(&self, name: &str) -> GuidanceResult<&'a Value> {
        match self.obj.get(name) {
            None | Some(Value::Null) => {
                Err(GuidanceError::parse(format!("missing field {}", self.path(name))))
            }
            Some(v) => Ok(v),
        }
    }

    fn invalid(&self, name: &str, expected: &str) -> GuidanceError {
        GuidanceError::parse(format!(
            "invalid field {}: expected {expected}",
            self.path(name)
        ))
    }

    fn boolean(&self, name: &str) -> GuidanceResult<bool> {
        self.get(name)?
            .as_bool()
            .ok_or_else(|| self.invalid(name, "boolean"))
    }

    fn text(&self, name: &str) -> GuidanceResult<String> {
        self.get(name)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.invalid(name, "string"))
    }

    fn probability(&self, name: &str) -> GuidanceResult<f64> {
        let value = self
            .get(name)?
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.invalid(name, "finite number"))?;
        if !(0.0..=1.0).contains(&value) {
            warn!(field = %self.path(name), value, "model probability outside [0, 1]");
        }
        Ok(value)
    }

    fn text_list(&self, name: &str) -> GuidanceResult<Vec<String>> {
        let items = self
            .get(name)?
            .as_array()
            .ok_or_else(|| self.invalid(name, "array of strings"))?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| self.invalid(&format!("{name}[{i}]"), "string"))
            })
            .collect()
    }

    fn objects(&self, name: &str) -> GuidanceResult<Vec<Fields<'a>>> {
        let items = self
            .get(name)?
            .as_array()
            .ok_or_else(|| self.invalid(name, "array of objects"))?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let path = format!("{name}[{i}]");
                item.as_object()
                    .map(|obj| Fields {
                        obj,
                        prefix: format!("{}{path}.", self.prefix),
                    })
                    .ok_or_else(|| self.invalid(&path, "object"))
            })
            .collect()
    }

    fn likelihood(&self, name: &str) -> GuidanceResult<Likelihood> {
        self.text(name)?
            .parse()
            .map_err(|_| self.invalid(name, "one of High, Medium, Low"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_plain_fence() {
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn test_strip_json_fence() {
        assert_eq!(strip_code_fence("  ```json\n{\"a\":1}\n```  "), "{\"a\":1}");
    }

    #[test]
    fn test_unfenced_text_is_untouched() {
        assert_eq!(strip_code_fence(" {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn test_nested_error_path() {
        let raw = r#"{"recommendedCases":[{"type":"Civil suit","description":"d","likelihood":"Maybe","timeframe":"t","cost":"c"}],"generalAdvice":"a","estimatedSuccess":0.5}"#;
        let err = validate_case_type_recommendation(raw).unwrap_err();
        let GuidanceError::ResponseParse { reason } = err else {
            panic!("expected ResponseParse");
        };
        assert!(reason.starts_with("invalid field recommendedCases[0].likelihood"));
    }
}
