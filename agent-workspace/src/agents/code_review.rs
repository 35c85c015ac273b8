//! Pedagogical code review agent: generates a plausible student solution
//! for an assignment prompt, then reviews the generated code with an
//! emphasis on learning rather than correctness alone.

use agent_workspace_sdk::{
    async_trait, params, AgentDefinition, AgentDescriptor, Artifact, ReviewFinding, ReviewReport,
    SampleCode, StageBinding, StageExecutor, StageSchema, WorkspaceResult,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::keyword;

/// Config schema for the code review workspace
#[derive(Debug, Clone, AgentDefinition)]
#[agent(
    id = "code-review",
    name = "Pedagogical Code Review Agent",
    description = "Explore how to review code with an emphasis on learning, not only correctness."
)]
pub struct CodeReviewConfig {
    /// Assignment the generated student code should answer
    #[field(
        label = "Assignment prompt",
        description = "Assignment the sample student code is generated for"
    )]
    pub assignment: String,

    /// Language the sample is written in
    #[field(
        label = "Language",
        description = "Language of the generated sample",
        type = "select",
        options = "Python|JavaScript",
        default = "Python"
    )]
    pub language: String,

    /// How many deliberate mistakes to seed into the sample
    #[field(
        label = "Mistakes level",
        description = "Deliberate mistakes to seed into the generated code (0-3)",
        type = "number",
        min = "0",
        max = "3",
        default = "1"
    )]
    pub mistakes_level: u32,
}

impl CodeReviewConfig {
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        Self {
            assignment: params::text(params, "assignment").to_string(),
            language: params::text(params, "language").to_string(),
            mistakes_level: params::number(params, "mistakes_level", 1) as u32,
        }
    }
}

/// Build the code review agent descriptor
pub fn descriptor() -> AgentDescriptor {
    AgentDescriptor {
        metadata: CodeReviewConfig::metadata(),
        fields: CodeReviewConfig::fields(),
        stages: vec![
            StageBinding {
                schema: StageSchema {
                    index: 0,
                    key: "generate".to_string(),
                    name: "Generate sample code".to_string(),
                    description: "Write a plausible student solution for the assignment"
                        .to_string(),
                    requires: vec![],
                },
                executor: Arc::new(GenerateSampleCodeExecutor::default()),
                check: None,
            },
            StageBinding {
                schema: StageSchema {
                    index: 1,
                    key: "review".to_string(),
                    name: "Review code".to_string(),
                    description: "Review the generated code with pedagogical notes".to_string(),
                    requires: vec![0],
                },
                executor: Arc::new(ReviewGeneratedCodeExecutor::default()),
                check: None,
            },
        ],
    }
}

/// Code-generation stage
pub struct GenerateSampleCodeExecutor {
    pub latency: Duration,
}

impl Default for GenerateSampleCodeExecutor {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(1200),
        }
    }
}

#[async_trait]
impl StageExecutor for GenerateSampleCodeExecutor {
    async fn run(
        &self,
        params: HashMap<String, String>,
        _inputs: Vec<Artifact>,
    ) -> WorkspaceResult<Artifact> {
        tokio::time::sleep(self.latency).await;
        let config = CodeReviewConfig::from_params(&params);
        Ok(Artifact::SampleCode(generate_sample(&config)))
    }
}

/// Deterministic student solution seeded with `mistakes_level` mistakes.
///
/// Level 1 leaves a debugging print in; level 2 also shadows a built-in;
/// level 3 also introduces an off-by-one over the input.
pub fn generate_sample(config: &CodeReviewConfig) -> SampleCode {
    let keywords = keyword::extract(&config.assignment);
    let subject = keywords
        .first()
        .map(|k| k.as_str())
        .unwrap_or("solution")
        .to_string();
    let level = config.mistakes_level.min(3);

    let source = match config.language.as_str() {
        "JavaScript" => {
            let mut lines = vec![
                format!("// {}", config.assignment.trim()),
                format!("function {}(values) {{", subject),
                "  let total = 0;".to_string(),
            ];
            if level >= 3 {
                lines.push("  for (let i = 0; i < values.length - 1; i++) {".to_string());
            } else {
                lines.push("  for (let i = 0; i < values.length; i++) {".to_string());
            }
            lines.push("    total += values[i];".to_string());
            lines.push("  }".to_string());
            if level >= 2 {
                lines.push("  var sum = total;".to_string());
            }
            if level >= 1 {
                lines.push("  console.log(total);".to_string());
            }
            lines.push("  return total;".to_string());
            lines.push("}".to_string());
            lines.join("\n")
        }
        _ => {
            let mut lines = vec![
                format!("# {}", config.assignment.trim()),
                format!("def {}(values):", subject),
                "    total = 0".to_string(),
            ];
            if level >= 3 {
                lines.push("    for value in values[:-1]:".to_string());
            } else {
                lines.push("    for value in values:".to_string());
            }
            lines.push("        total += value".to_string());
            if level >= 2 {
                lines.push("    sum = total".to_string());
            }
            if level >= 1 {
                lines.push("    print(total)".to_string());
            }
            lines.push("    return total".to_string());
            lines.join("\n")
        }
    };

    SampleCode {
        language: config.language.clone(),
        source,
    }
}

/// Review stage; requires the generated code artifact
pub struct ReviewGeneratedCodeExecutor {
    pub latency: Duration,
}

impl Default for ReviewGeneratedCodeExecutor {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(1400),
        }
    }
}

#[async_trait]
impl StageExecutor for ReviewGeneratedCodeExecutor {
    async fn run(
        &self,
        _params: HashMap<String, String>,
        inputs: Vec<Artifact>,
    ) -> WorkspaceResult<Artifact> {
        tokio::time::sleep(self.latency).await;
        let Some(code) = inputs.first().and_then(|a| a.as_sample_code()) else {
            return Err("code artifact is missing".into());
        };
        Ok(Artifact::Review(review_sample(code)))
    }
}

/// Scan the sample for the seeded mistake patterns and phrase each finding
/// as a teaching note
pub fn review_sample(code: &SampleCode) -> ReviewReport {
    let mut findings = Vec::new();

    for (i, line) in code.source.lines().enumerate() {
        let line_no = i + 1;
        if line.contains("print(") || line.contains("console.log(") {
            findings.push(ReviewFinding {
                line: Some(line_no),
                note: "Leftover debugging output. Ask the student what they were checking here \
                       and how a test could check it instead."
                    .to_string(),
            });
        }
        if line.trim_start().starts_with("sum =") || line.contains("var sum =") {
            findings.push(ReviewFinding {
                line: Some(line_no),
                note: "This name shadows a built-in. A good moment to talk about naming and the \
                       standard library."
                    .to_string(),
            });
        }
        if line.contains("[:-1]") || line.contains("length - 1") {
            findings.push(ReviewFinding {
                line: Some(line_no),
                note: "The loop skips the final element. Walk through the bounds with a \
                       two-element input."
                    .to_string(),
            });
        }
    }

    findings.push(ReviewFinding {
        line: None,
        note: "Strength to call out: one function, one responsibility, and a clear accumulator \
               pattern."
            .to_string(),
    });

    ReviewReport {
        summary: format!(
            "{} note(s) for this {} submission",
            findings.len(),
            code.language
        ),
        findings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(level: u32, language: &str) -> CodeReviewConfig {
        CodeReviewConfig {
            assignment: "Sum the sequence of numbers".to_string(),
            language: language.to_string(),
            mistakes_level: level,
        }
    }

    #[test]
    fn mistake_levels_accumulate() {
        let clean = generate_sample(&config(0, "Python")).source;
        assert!(!clean.contains("print("));

        let level1 = generate_sample(&config(1, "Python")).source;
        assert!(level1.contains("print("));
        assert!(!level1.contains("sum ="));

        let level3 = generate_sample(&config(3, "Python")).source;
        assert!(level3.contains("print("));
        assert!(level3.contains("sum ="));
        assert!(level3.contains("[:-1]"));
    }

    #[test]
    fn function_name_comes_from_the_prompt() {
        let sample = generate_sample(&config(0, "Python"));
        assert!(sample.source.contains("def sum(values):") || sample.source.contains("def "));
    }

    #[test]
    fn review_finds_each_seeded_mistake() {
        let sample = generate_sample(&config(3, "Python"));
        let report = review_sample(&sample);
        // Three seeded mistakes plus the closing strength note
        assert_eq!(report.findings.len(), 4);
        assert!(report.summary.contains("Python"));
    }

    #[test]
    fn clean_code_still_gets_a_strength_note() {
        let sample = generate_sample(&config(0, "JavaScript"));
        let report = review_sample(&sample);
        assert_eq!(report.findings.len(), 1);
        assert!(report.findings[0].line.is_none());
    }
}
