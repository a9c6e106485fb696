//! Conversions from inbound JSON bodies to validated request types.
//!
//! Normalization is deliberately lenient: unknown languages, analysis types
//! and provider names fall back to defaults instead of failing. Only the
//! fields a request cannot do without (`code`, `analysisResults`) and the
//! size limits produce validation errors.

use serde_json::{Map, Value};

use crate::types::{
    AnalysisRequest, AnalysisType, ExplainRequest, ImproveRequest, Language, ProviderPreference,
    ReportRequest, RequestLimits,
};
use crate::{MimirError, Result};

const NOT_AN_OBJECT: &str = "Request body must be a valid JSON object";

/// Parse raw body bytes, requiring a top-level JSON object.
pub fn parse_body(bytes: &[u8]) -> Result<Map<String, Value>> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(MimirError::Validation(NOT_AN_OBJECT.to_string())),
    }
}

fn str_field<'a>(body: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    body.get(name).and_then(Value::as_str)
}

/// `code` must be a non-blank string within limits; it is forwarded untrimmed.
fn code_field(body: &Map<String, Value>, limits: &RequestLimits) -> Result<String> {
    let code = str_field(body, "code").unwrap_or_default();
    limits.check_code(code)?;
    Ok(code.to_string())
}

fn language_field(body: &Map<String, Value>) -> Language {
    str_field(body, "language")
        .map(Language::normalize)
        .unwrap_or_default()
}

/// Build an [`AnalysisRequest`] from a `/analyze` body.
///
/// `known_providers` are the registered names `preferredProvider` may match.
pub fn analysis_request<S: AsRef<str>>(
    body: &Map<String, Value>,
    limits: &RequestLimits,
    known_providers: &[S],
) -> Result<AnalysisRequest> {
    let code = code_field(body, limits)?;
    let analysis_type = str_field(body, "analysisType")
        .map(AnalysisType::normalize)
        .unwrap_or_default();
    let preference = str_field(body, "preferredProvider")
        .map(|raw| ProviderPreference::resolve(raw, known_providers))
        .unwrap_or_default();

    Ok(AnalysisRequest::new(code)
        .with_language(language_field(body))
        .with_analysis_type(analysis_type)
        .with_preferred_provider(preference))
}

/// Build an [`ExplainRequest`] from an `/explain` body.
pub fn explain_request(
    body: &Map<String, Value>,
    limits: &RequestLimits,
) -> Result<ExplainRequest> {
    let code = code_field(body, limits)?;
    Ok(ExplainRequest::new(code).with_language(language_field(body)))
}

/// Build an [`ImproveRequest`] from an `/improve` body.
///
/// A non-string `context` is ignored.
pub fn improve_request(
    body: &Map<String, Value>,
    limits: &RequestLimits,
) -> Result<ImproveRequest> {
    let code = code_field(body, limits)?;
    let mut request = ImproveRequest::new(code).with_language(language_field(body));
    if let Some(context) = str_field(body, "context") {
        limits.check_context(context)?;
        request = request.with_context(context);
    }
    Ok(request)
}

/// Build a [`ReportRequest`] from a `/report` body.
///
/// A missing or non-object `projectInfo` becomes `{}`.
pub fn report_request(body: &Map<String, Value>, limits: &RequestLimits) -> Result<ReportRequest> {
    let results = body
        .get("analysisResults")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    limits.check_report_results(results.len())?;

    let mut request = ReportRequest::new(results);
    if let Some(info @ Value::Object(_)) = body.get("projectInfo") {
        request = request.with_project_info(info.clone());
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    const KNOWN: &[&str] = &["gemini", "openai", "anthropic"];

    #[test]
    fn non_object_bodies_are_rejected() {
        for raw in [&b"[1,2]"[..], b"\"code\"", b"not json", b""] {
            let err = parse_body(raw).unwrap_err();
            assert_eq!(err.to_string(), NOT_AN_OBJECT);
        }
        assert!(parse_body(br#"{"code":"x"}"#).is_ok());
    }

    #[test]
    fn analysis_defaults_apply() {
        let request =
            analysis_request(&body(json!({"code": "x = 1"})), &RequestLimits::default(), KNOWN)
                .unwrap();
        assert_eq!(request.language, Language::JavaScript);
        assert_eq!(request.analysis_type, AnalysisType::General);
        assert_eq!(request.preferred_provider, ProviderPreference::Auto);
    }

    #[test]
    fn analysis_fields_are_normalized() {
        let request = analysis_request(
            &body(json!({
                "code": "  fn main() {}  ",
                "language": "RS",
                "analysisType": "Security",
                "preferredProvider": "OPENAI"
            })),
            &RequestLimits::default(),
            KNOWN,
        )
        .unwrap();
        assert_eq!(request.code, "  fn main() {}  ");
        assert_eq!(request.language, Language::Rust);
        assert_eq!(request.analysis_type, AnalysisType::Security);
        assert_eq!(request.preferred_provider, ProviderPreference::named("openai"));
    }

    #[test]
    fn unknown_values_fall_back_silently() {
        let request = analysis_request(
            &body(json!({
                "code": "x",
                "language": "cobol",
                "analysisType": 7,
                "preferredProvider": "mistral"
            })),
            &RequestLimits::default(),
            KNOWN,
        )
        .unwrap();
        assert_eq!(request.language, Language::JavaScript);
        assert_eq!(request.analysis_type, AnalysisType::General);
        assert_eq!(request.preferred_provider, ProviderPreference::Auto);
    }

    #[test]
    fn missing_or_non_string_code_is_rejected() {
        let limits = RequestLimits::default();
        for value in [json!({}), json!({"code": 42}), json!({"code": ""})] {
            let err = explain_request(&body(value), &limits).unwrap_err();
            assert!(err.is_validation());
            assert_eq!(
                err.to_string(),
                "Code is required and must be a non-empty string"
            );
        }
    }

    #[test]
    fn improve_context_is_bounded() {
        let limits = RequestLimits {
            max_context_chars: 5,
            ..Default::default()
        };
        let ok = improve_request(&body(json!({"code": "x", "context": "short"})), &limits).unwrap();
        assert_eq!(ok.context.as_deref(), Some("short"));

        let err =
            improve_request(&body(json!({"code": "x", "context": "too long"})), &limits)
                .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Context exceeds maximum length of 5 characters"
        );

        let ignored = improve_request(&body(json!({"code": "x", "context": 5})), &limits).unwrap();
        assert!(ignored.context.is_none());
    }

    #[test]
    fn report_requires_results() {
        let limits = RequestLimits::default();
        for value in [
            json!({}),
            json!({"analysisResults": []}),
            json!({"analysisResults": "nope"}),
        ] {
            let err = report_request(&body(value), &limits).unwrap_err();
            assert_eq!(
                err.to_string(),
                "Analysis results are required and must be a non-empty array"
            );
        }
    }

    #[test]
    fn report_project_info_defaults_to_empty_object() {
        let limits = RequestLimits::default();
        let request =
            report_request(&body(json!({"analysisResults": [{"a": 1}]})), &limits).unwrap();
        assert_eq!(request.project_info, json!({}));

        let request = report_request(
            &body(json!({"analysisResults": [1], "projectInfo": {"name": "demo"}})),
            &limits,
        )
        .unwrap();
        assert_eq!(request.project_info, json!({"name": "demo"}));
    }

    #[test]
    fn too_many_report_results() {
        let limits = RequestLimits {
            max_report_results: 2,
            ..Default::default()
        };
        let err =
            report_request(&body(json!({"analysisResults": [1, 2, 3]})), &limits).unwrap_err();
        assert_eq!(err.to_string(), "Too many analysis results (maximum 2)");
    }
}
