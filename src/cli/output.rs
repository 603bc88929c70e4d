//! Output formatting for CLI commands.
//!
//! Every command renders either human-readable text or pretty JSON.

use std::fmt::Write;

use serde::Serialize;

use crate::acp::EndpointReport;
use crate::core::{ChainReport, QueryReport, StageReport, StepOutcome, StepResult};

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Parses a format name, defaulting to text for anything unknown.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    /// Serializes `value` as pretty JSON.
    #[must_use]
    pub fn to_json<T: Serialize + ?Sized>(self, value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

fn outcome_line(outcome: &StepOutcome) -> String {
    match outcome {
        StepOutcome::Success(text) => text.clone(),
        StepOutcome::Failure(failure) => format!("[failed: {}] {failure}", failure.kind()),
    }
}

/// Formats a hierarchical query report.
#[must_use]
pub fn format_query_report(report: &QueryReport, format: OutputFormat, verbose: bool) -> String {
    match format {
        OutputFormat::Json => format.to_json(report),
        OutputFormat::Text => {
            let mut output = report.answer.trim_end().to_string();
            output.push_str("\n\n---\n");
            let _ = write!(
                output,
                "Agents: {} | Steps: {} ok, {} failed | Tokens: {} | Time: {:.1}s",
                report.agents.len(),
                report.steps_succeeded,
                report.steps_failed,
                report.total_tokens,
                report.elapsed.as_secs_f64()
            );
            for (i, result) in report.results.iter().enumerate() {
                if let Some(failure) = result.outcome.failure() {
                    let _ = write!(
                        output,
                        "\nStep {} ({}) failed: {}: {failure}",
                        i + 1,
                        result.step.agent_name,
                        failure.kind()
                    );
                } else if verbose {
                    let _ = write!(
                        output,
                        "\nStep {} ({}): {}",
                        i + 1,
                        result.step.agent_name,
                        result.step.question
                    );
                }
            }
            output.push('\n');
            output
        }
    }
}

fn format_stage(output: &mut String, stage: &StageReport) {
    let _ = writeln!(output, "== {} ({}) ==", stage.stage, stage.agent);
    let _ = writeln!(output, "{}\n", outcome_line(&stage.outcome).trim_end());
}

/// Formats a sequential chain report.
#[must_use]
pub fn format_chain_report(report: &ChainReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format.to_json(report),
        OutputFormat::Text => {
            let mut output = String::new();
            format_stage(&mut output, &report.first);
            if let Some(second) = &report.second {
                format_stage(&mut output, second);
            }
            output.push_str("== Final answer ==\n");
            match (&report.answer, &report.fallback) {
                (Some(answer), _) => output.push_str(answer.trim_end()),
                (None, Some(fallback)) => {
                    let _ = write!(output, "No final answer. {fallback}");
                }
                (None, None) => output.push_str("No final answer."),
            }
            let _ = write!(output, "\n\nTime: {:.1}s\n", report.elapsed.as_secs_f64());
            output
        }
    }
}

/// Formats a per-endpoint discovery listing.
#[must_use]
pub fn format_discovery(
    reports: &[EndpointReport],
    descriptions: &[(String, String)],
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "endpoints": reports,
                "agents": descriptions
                    .iter()
                    .map(|(name, description)| serde_json::json!({
                        "name": name,
                        "description": description,
                    }))
                    .collect::<Vec<_>>(),
            });
            format.to_json(&json)
        }
        OutputFormat::Text => {
            if reports.is_empty() {
                return "No endpoints configured.\n".to_string();
            }
            let mut output = String::new();
            let mut descriptions = descriptions.iter();
            for report in reports {
                let _ = writeln!(output, "{}", report.endpoint);
                if let Some(error) = &report.error {
                    let _ = writeln!(output, "  skipped: {error}");
                    continue;
                }
                if report.agents.is_empty() {
                    output.push_str("  (no agents)\n");
                }
                for _ in &report.agents {
                    if let Some((name, description)) = descriptions.next() {
                        if description.is_empty() {
                            let _ = writeln!(output, "  {name}");
                        } else {
                            let _ = writeln!(output, "  {name}: {description}");
                        }
                    }
                }
            }
            output
        }
    }
}

/// Formats the answers to direct questions.
#[must_use]
pub fn format_ask_results(results: &[StepResult], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format.to_json(results),
        OutputFormat::Text => {
            let mut output = String::new();
            for (i, result) in results.iter().enumerate() {
                if results.len() > 1 {
                    let _ = writeln!(output, "Q{}: {}", i + 1, result.step.question);
                }
                let _ = writeln!(output, "{}", outcome_line(&result.outcome).trim_end());
                if i + 1 < results.len() {
                    output.push('\n');
                }
            }
            output
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::core::{ChainStage, PlanStep};
    use crate::error::StepFailure;

    fn report() -> QueryReport {
        QueryReport {
            query: "q".to_string(),
            agents: vec!["rag_agent".to_string()],
            plan: vec![
                PlanStep::new("rag_agent", "a"),
                PlanStep::new("ghost", "b"),
            ],
            results: vec![
                StepResult::new(
                    PlanStep::new("rag_agent", "a"),
                    StepOutcome::Success("yes".to_string()),
                ),
                StepResult::new(
                    PlanStep::new("ghost", "b"),
                    StepOutcome::Failure(StepFailure::AgentNotFound {
                        agent: "ghost".to_string(),
                    }),
                ),
            ],
            answer: "Final.".to_string(),
            steps_succeeded: 1,
            steps_failed: 1,
            total_tokens: 30,
            elapsed: Duration::from_millis(1500),
        }
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("text"), OutputFormat::Text);
        assert_eq!(OutputFormat::parse("yaml"), OutputFormat::Text);
    }

    #[test]
    fn test_query_report_text() {
        let text = format_query_report(&report(), OutputFormat::Text, false);
        assert!(text.starts_with("Final.\n\n---\n"));
        assert!(text.contains("Steps: 1 ok, 1 failed"));
        assert!(text.contains("Step 2 (ghost) failed: agent_not_found"));
        assert!(!text.contains("Step 1 (rag_agent)"));

        let verbose = format_query_report(&report(), OutputFormat::Text, true);
        assert!(verbose.contains("Step 1 (rag_agent): a"));
    }

    #[test]
    fn test_query_report_json() {
        let json = format_query_report(&report(), OutputFormat::Json, false);
        let value: serde_json::Value =
            serde_json::from_str(&json).unwrap_or_else(|_| unreachable!());
        assert_eq!(value["answer"], "Final.");
        assert_eq!(value["results"][1]["outcome"]["failure"]["kind"], "agent_not_found");
    }

    #[test]
    fn test_chain_report_fallback_text() {
        let report = ChainReport {
            question: "q".to_string(),
            first: StageReport {
                stage: ChainStage::First,
                agent: "health_agent".to_string(),
                input: "q".to_string(),
                outcome: StepOutcome::Success("Rehab advised.".to_string()),
            },
            second: Some(StageReport {
                stage: ChainStage::Second,
                agent: "rag_agent".to_string(),
                input: "Context: Rehab advised.".to_string(),
                outcome: StepOutcome::Failure(StepFailure::Timeout { after_ms: 100 }),
            }),
            answer: None,
            fallback: Some("stage 2 (rag_agent) failed: timeout".to_string()),
            elapsed: Duration::ZERO,
        };
        let text = format_chain_report(&report, OutputFormat::Text);
        assert!(text.contains("== stage 1 (health_agent) ==\nRehab advised."));
        assert!(text.contains("[failed: timeout]"));
        assert!(text.contains("No final answer. stage 2 (rag_agent) failed: timeout"));
    }

    #[test]
    fn test_discovery_text_marks_skipped() {
        let reports = vec![
            EndpointReport {
                endpoint: "http://a".to_string(),
                agents: vec!["rag_agent".to_string()],
                error: None,
            },
            EndpointReport {
                endpoint: "http://b".to_string(),
                agents: vec![],
                error: Some("connection refused".to_string()),
            },
        ];
        let descriptions = vec![("rag_agent".to_string(), "policies".to_string())];
        let text = format_discovery(&reports, &descriptions, OutputFormat::Text);
        assert!(text.contains("http://a\n  rag_agent: policies\n"));
        assert!(text.contains("http://b\n  skipped: connection refused\n"));
    }
}
