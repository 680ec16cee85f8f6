//! Diagnostic audit generation
//!
//! Summarizes a classroom snapshot, asks the text generator for a root-cause
//! report, and parses the reply in two tiers:
//! - no JSON object in the reply (or an unparseable one) is a hard failure
//! - a parsed object with missing or invalid fields is repaired with defaults

use chrono::Utc;
use insight_core::config::DiagnosticConfig;
use insight_core::models::{ClassroomSnapshot, DiagnosticAudit, FailureType, Severity};
use insight_core::{InsightError, Result, TextGenerator};
use serde_json::{json, Map, Value};

pub const SYSTEM_INSTRUCTION: &str = "You are an instructional coach reviewing classroom \
learning data for a teacher. Identify the single most likely root cause of the struggle \
shown in the data and propose one concrete bridge activity. Respond with one JSON object \
and nothing else.";

const FALLBACK_ROOT_CAUSE: &str = "Root cause could not be determined from the available data.";
const FALLBACK_BRIDGE_ACTIVITY: &str =
    "Review the struggling topics with a short guided practice session.";

/// Compact JSON view of the snapshot sent to the generator.
pub fn build_summary(snapshot: &ClassroomSnapshot, config: &DiagnosticConfig) -> Value {
    let clusters: Vec<Value> = snapshot
        .clusters
        .iter()
        .take(config.summary_clusters)
        .map(|c| {
            let mut cluster = json!({
                "topic": c.topic,
                "subject": c.subject,
                "avgStruggleScore": round2(c.avg_struggle_score),
                "studentCount": c.student_count,
                "dominantDimension": c.dominant_dimension.as_str(),
            });
            if let Some(insight) = &c.memory_insight {
                cluster["memoryInsight"] = Value::String(insight.clone());
            }
            cluster
        })
        .collect();

    let mut critical: Vec<(f64, Value)> = Vec::new();
    for student in &snapshot.students {
        for lesson in &snapshot.lessons {
            let Some(score) = student.cells.get(&lesson.id).and_then(|c| c.struggle_score) else {
                continue;
            };
            if score >= config.critical_cell_threshold {
                critical.push((
                    score,
                    json!({
                        "student": student.name,
                        "lesson": lesson.title,
                        "topic": lesson.topic,
                        "struggleScore": score,
                    }),
                ));
            }
        }
    }
    critical.sort_by(|a, b| b.0.total_cmp(&a.0));
    let critical_cells: Vec<Value> = critical
        .into_iter()
        .take(config.max_critical_cells)
        .map(|(_, cell)| cell)
        .collect();

    json!({
        "classroomName": snapshot.classroom_name,
        "studentCount": snapshot.students.len(),
        "lessonCount": snapshot.lessons.len(),
        "clusters": clusters,
        "criticalCells": critical_cells,
    })
}

pub fn build_prompt(summary: &Value) -> Result<String> {
    let failure_types: Vec<&str> = FailureType::ALL.iter().map(|t| t.as_str()).collect();
    let severities: Vec<&str> = Severity::ALL.iter().map(|s| s.as_str()).collect();

    Ok(format!(
        r#"Classroom data:
{summary}

Return a JSON object with exactly these fields:
- "rootCause": one paragraph explaining why these students are struggling
- "failureType": one of {failure_types}
- "severity": one of {severities}
- "bridgeActivity": a markdown description of one remediation activity
- "recommendations": an array of at most 5 short action items for the teacher"#,
        summary = serde_json::to_string_pretty(summary)?,
        failure_types = failure_types.join(" | "),
        severities = severities.join(" | "),
    ))
}

/// Parse a generator reply into an audit, repairing fields where possible.
pub fn parse_audit(raw: &str, max_recommendations: usize) -> Result<DiagnosticAudit> {
    let text = strip_code_fence(raw);

    let (start, end) = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => {
            return Err(InsightError::DiagnosticParse(
                "no JSON object in generation response".to_string(),
            ))
        }
    };

    let value: Value = serde_json::from_str(&text[start..=end])
        .map_err(|e| InsightError::DiagnosticParse(format!("invalid JSON object: {}", e)))?;
    let object = value.as_object().ok_or_else(|| {
        InsightError::DiagnosticParse("generation response is not a JSON object".to_string())
    })?;

    let failure_type = field_str(object, "failureType", "failure_type")
        .and_then(|s| s.parse().ok())
        .unwrap_or(FailureType::Conceptual);

    let severity = field_str(object, "severity", "severity")
        .and_then(|s| s.parse().ok())
        .unwrap_or(Severity::Medium);

    let root_cause = field_str(object, "rootCause", "root_cause")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_ROOT_CAUSE)
        .to_string();

    let bridge_activity = field_str(object, "bridgeActivity", "bridge_activity")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_BRIDGE_ACTIVITY)
        .to_string();

    let recommendations = field(object, "recommendations", "recommendations")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .take(max_recommendations)
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(DiagnosticAudit {
        generated_at: Utc::now(),
        root_cause,
        failure_type,
        severity,
        bridge_activity,
        recommendations,
    })
}

pub async fn generate_audit(
    generator: &dyn TextGenerator,
    snapshot: &ClassroomSnapshot,
    config: &DiagnosticConfig,
) -> Result<DiagnosticAudit> {
    let summary = build_summary(snapshot, config);
    let prompt = build_prompt(&summary)?;

    let raw = generator.generate(&prompt, SYSTEM_INSTRUCTION).await?;

    let audit = parse_audit(&raw, config.max_recommendations).map_err(|e| {
        tracing::warn!(
            classroom_id = %snapshot.classroom_id,
            backend = generator.name(),
            response_len = raw.len(),
            error = %e,
            "Unusable diagnostic response"
        );
        e
    })?;

    tracing::info!(
        classroom_id = %snapshot.classroom_id,
        backend = generator.name(),
        failure_type = %audit.failure_type,
        severity = %audit.severity,
        recommendations = audit.recommendations.len(),
        "Diagnostic audit generated"
    );

    Ok(audit)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (```json)
    let body = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => rest,
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn field<'a>(object: &'a Map<String, Value>, name: &str, alias: &str) -> Option<&'a Value> {
    object.get(name).or_else(|| object.get(alias))
}

fn field_str<'a>(object: &'a Map<String, Value>, name: &str, alias: &str) -> Option<&'a str> {
    field(object, name, alias).and_then(Value::as_str)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
