use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::models::Enrichment;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Anything that turns a prompt into free text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<GeminiContent>,
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Gemini API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("Gemini API error: {} - {}", status, error_text);
        }

        let gemini_response = response
            .json::<GeminiResponse>()
            .await
            .context("Failed to parse Gemini API response")?;

        let text: String = gemini_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .context("Gemini API returned no candidates")?;

        Ok(text)
    }
}

pub fn build_prompt(headline: &str) -> String {
    format!(
        r#"You are a News Specialist.

Task:
1. Summarize the news headline in 2-3 lines in Hinglish.
2. Suggest relevant tags for the news (general categories like Politics, Economy, Technology, Environment, etc.).
3. Create a reporter-style explanation in Hinglish:
   - Explain background of the issue.
   - Explain key terms, abbreviations, and organisations.
   - Tone should be like a news reporter giving context.

4. Create a crisp 30-second hook-based script for social media:
   - Start with a strong hook in Hinglish.
   - Explain the issue in simple terms.
   - Keep it engaging, short, and clear.

Format:

Summary: <summary>
Tags: <tags>

Reporter_Explanation:
<content>

Hook_30s:
<content>

Headline:
{}
"#,
        headline
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    None,
    Explanation,
    Hook,
}

#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Summary(&'a str),
    Tags(&'a str),
    Explanation(&'a str),
    Hook(&'a str),
    Body(&'a str),
}

const SUMMARY_LABEL: &str = "summary:";
const TAGS_LABEL: &str = "tags:";
const EXPLANATION_LABEL: &str = "reporter_explanation:";
const HOOK_LABEL: &str = "hook_30s:";

/// Case-insensitive label match, returning the trimmed text after the colon
fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let head = line.get(..label.len())?;
    if head.eq_ignore_ascii_case(label) {
        Some(line[label.len()..].trim())
    } else {
        None
    }
}

fn classify(line: &str) -> Line<'_> {
    if let Some(rest) = strip_label(line, SUMMARY_LABEL) {
        Line::Summary(rest)
    } else if let Some(rest) = strip_label(line, TAGS_LABEL) {
        Line::Tags(rest)
    } else if let Some(rest) = strip_label(line, EXPLANATION_LABEL) {
        Line::Explanation(rest)
    } else if let Some(rest) = strip_label(line, HOOK_LABEL) {
        Line::Hook(rest)
    } else {
        Line::Body(line)
    }
}

fn append_line(buf: &mut String, line: &str) {
    buf.push_str(line);
    buf.push('\n');
}

/// Split a model reply into its four labeled sections
pub fn parse_sections(text: &str) -> Enrichment {
    let mut out = Enrichment::default();
    let mut state = Capture::None;

    for raw in text.trim().lines() {
        let line = raw.trim();

        state = match (state, classify(line)) {
            (_, Line::Summary(rest)) => {
                out.summary = rest.to_string();
                Capture::None
            }
            (_, Line::Tags(rest)) => {
                out.tags = rest.to_string();
                Capture::None
            }
            (_, Line::Explanation(rest)) => {
                out.reporter_explanation.clear();
                if !rest.is_empty() {
                    append_line(&mut out.reporter_explanation, rest);
                }
                Capture::Explanation
            }
            (_, Line::Hook(rest)) => {
                out.hook_script.clear();
                if !rest.is_empty() {
                    append_line(&mut out.hook_script, rest);
                }
                Capture::Hook
            }
            (Capture::Explanation, Line::Body(body)) => {
                append_line(&mut out.reporter_explanation, body);
                Capture::Explanation
            }
            (Capture::Hook, Line::Body(body)) => {
                append_line(&mut out.hook_script, body);
                Capture::Hook
            }
            (Capture::None, Line::Body(_)) => Capture::None,
        };
    }

    out.reporter_explanation = out.reporter_explanation.trim().to_string();
    out.hook_script = out.hook_script.trim().to_string();
    out
}

pub struct Summarizer<'a> {
    generator: &'a dyn TextGenerator,
}

impl<'a> Summarizer<'a> {
    pub fn new(generator: &'a dyn TextGenerator) -> Self {
        Self { generator }
    }

    /// Generate enrichment for a headline. Failures yield empty fields.
    pub async fn summarize_and_tag(&self, headline: &str) -> Enrichment {
        match self.generator.generate(&build_prompt(headline)).await {
            Ok(text) => parse_sections(&text),
            Err(e) => {
                error!(error = %e, headline, "❌ Gemini error");
                Enrichment::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const REPLY: &str = "\
Summary: Sarkar ne naya bill pass kiya.
Tags: Politics, Economy

Reporter_Explanation:
Yeh bill kaafi time se pending tha.

RBI ne bhi iska support kiya.

Hook_30s:
Kya aapko pata hai?
Aaj Parliament mein bada faisla hua!
";

    #[test]
    fn test_parse_well_formed_reply() {
        let parsed = parse_sections(REPLY);
        assert_eq!(parsed.summary, "Sarkar ne naya bill pass kiya.");
        assert_eq!(parsed.tags, "Politics, Economy");
        assert_eq!(
            parsed.reporter_explanation,
            "Yeh bill kaafi time se pending tha.\n\nRBI ne bhi iska support kiya."
        );
        assert_eq!(
            parsed.hook_script,
            "Kya aapko pata hai?\nAaj Parliament mein bada faisla hua!"
        );
    }

    #[test]
    fn test_missing_sections_are_empty() {
        let parsed = parse_sections("Summary: only this\n");
        assert_eq!(parsed.summary, "only this");
        assert_eq!(parsed.tags, "");
        assert_eq!(parsed.reporter_explanation, "");
        assert_eq!(parsed.hook_script, "");
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        let parsed = parse_sections("SUMMARY: a\ntags: b\nREPORTER_EXPLANATION:\nc\nhook_30S:\nd");
        assert_eq!(parsed.summary, "a");
        assert_eq!(parsed.tags, "b");
        assert_eq!(parsed.reporter_explanation, "c");
        assert_eq!(parsed.hook_script, "d");
    }

    #[test]
    fn test_preamble_lines_are_dropped() {
        let parsed = parse_sections("Sure! Here is the output.\n\nSummary: s\nTags: t");
        assert_eq!(parsed.summary, "s");
        assert_eq!(parsed.tags, "t");
        assert!(parsed.reporter_explanation.is_empty());
    }

    #[test]
    fn test_single_line_label_ends_capture() {
        let parsed = parse_sections("Hook_30s:\nline one\nTags: late tags\nstray line");
        assert_eq!(parsed.hook_script, "line one");
        assert_eq!(parsed.tags, "late tags");
    }

    #[test]
    fn test_inline_text_on_multiline_label() {
        let parsed = parse_sections("Reporter_Explanation: first\nsecond");
        assert_eq!(parsed.reporter_explanation, "first\nsecond");
    }

    #[test]
    fn test_summary_keeps_text_after_first_colon() {
        let parsed = parse_sections("Summary: Budget 2026: kya badla?");
        assert_eq!(parsed.summary, "Budget 2026: kya badla?");
    }

    #[test]
    fn test_repeated_label_replaces_section() {
        let parsed = parse_sections("Hook_30s:\nold\nHook_30s:\nnew");
        assert_eq!(parsed.hook_script, "new");
    }

    #[test]
    fn test_non_ascii_line_is_not_a_label() {
        let parsed = parse_sections("Reporter_Explanation:\nसारांश: यह एक परीक्षण है");
        assert_eq!(parsed.reporter_explanation, "सारांश: यह एक परीक्षण है");
    }

    #[test]
    fn test_prompt_ends_with_headline() {
        let prompt = build_prompt("ISRO launches new satellite");
        assert!(prompt.contains("Reporter_Explanation:"));
        assert!(prompt.trim_end().ends_with("ISRO launches new satellite"));
    }

    struct Canned(Result<String, String>, Mutex<Vec<String>>);

    #[async_trait]
    impl TextGenerator for Canned {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.1.lock().unwrap().push(prompt.to_string());
            self.0.clone().map_err(anyhow::Error::msg)
        }
    }

    #[tokio::test]
    async fn test_summarize_and_tag_parses_reply() {
        let generator = Canned(Ok(REPLY.to_string()), Mutex::new(Vec::new()));
        let enrichment = Summarizer::new(&generator)
            .summarize_and_tag("Parliament passes bill")
            .await;
        assert_eq!(enrichment.tags, "Politics, Economy");
        let prompts = generator.1.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Parliament passes bill"));
    }

    #[tokio::test]
    async fn test_summarize_and_tag_fails_closed() {
        let generator = Canned(Err("401 unauthorized".to_string()), Mutex::new(Vec::new()));
        let enrichment = Summarizer::new(&generator).summarize_and_tag("anything").await;
        assert_eq!(enrichment, Enrichment::default());
    }
}
