// Lectern Content Generator
// Copyright (c) 2026 The Lectern Authors
//
// Asks the chat-completions model for a JSON-shaped slide deck and
// parses the reply leniently. Model failures, network failures and
// malformed JSON all degrade to a fixed fallback deck so the caller
// always gets a usable lecture.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::{LectureRequest, Slide, SlideType};

/// Seam over the LLM so tests can substitute a scripted double.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Production backend: OpenAI-compatible chat completions (Qwen via
/// DashScope in the default configuration).
pub struct QwenBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl QwenBackend {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.llm_base_url.clone(),
            api_key: config.llm_api_key.clone(),
            model: config.llm_model.clone(),
        }
    }
}

#[async_trait]
impl ChatBackend for QwenBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let endpoint = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let payload = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "stream": false,
        });

        let resp = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(anyhow!("LLM API error: {}", resp.status()));
        }

        let body: Value = resp.json().await?;
        body["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("LLM reply had no message content"))
    }
}

pub struct ContentGenerator {
    backend: Box<dyn ChatBackend>,
}

impl ContentGenerator {
    pub fn new(config: &Config) -> Self {
        Self {
            backend: Box::new(QwenBackend::new(config)),
        }
    }

    pub fn with_backend(backend: Box<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// Generate the slide deck for a lecture request. Never fails: any
    /// backend or parse problem falls back to a minimal local deck.
    pub async fn generate_lecture(&self, request: &LectureRequest) -> Vec<Slide> {
        let prompt = build_lecture_prompt(request);

        let reply = match self.backend.complete(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("[CONTENT] LLM call failed, using fallback deck: {}", e);
                return fallback_slides(&request.topic);
            }
        };

        match extract_json(&reply).and_then(parse_slides) {
            Some(slides) => {
                info!("[CONTENT] Parsed {} slides from model reply", slides.len());
                slides
            }
            None => {
                warn!("[CONTENT] Could not parse slides from model reply, using fallback deck");
                fallback_slides(&request.topic)
            }
        }
    }

    /// Plain text completion. Errors degrade to an error-text reply
    /// rather than propagating.
    pub async fn generate_text(&self, prompt: &str) -> String {
        match self.backend.complete(prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("[CONTENT] Text generation failed: {}", e);
                format!("Error generating text: {e}")
            }
        }
    }
}

fn build_lecture_prompt(request: &LectureRequest) -> String {
    let mut addon_lines = String::new();
    if request.add_ons.code_examples {
        addon_lines.push_str(
            "- Include a \"code_example\" field with a short runnable snippet on relevant slides\n",
        );
    }
    if request.add_ons.exercises {
        addon_lines.push_str(
            "- Include an \"exercise\" field with a small practice task on relevant slides\n",
        );
    }
    if request.add_ons.qa {
        addon_lines.push_str(
            "- End with a slide of type \"qa\" containing likely questions and answers\n",
        );
    }
    if request.add_ons.visuals {
        addon_lines
            .push_str("- Make every image_prompt rich enough to render a standalone visual\n");
    }

    format!(
        r#"You are an expert educational content creator. Create a comprehensive lecture presentation on the topic: "{topic}".

Requirements:
- Duration: {duration} minutes
- Difficulty: {difficulty}
- Target audience: {audience}
- Tone: {tone}
- Create 5-8 slides maximum
- Each slide should have a clear title, content, image prompt, and a detailed script for that specific slide
{addons}
Please provide your response in the following JSON format:
{{
    "slides": [
        {{
            "slide_number": 1,
            "title": "Introduction to [Topic]",
            "content": "Brief content for this slide...",
            "image_prompt": "Professional slide showing introduction to [topic], clean design, educational style",
            "slide_type": "title",
            "script": "Welcome everyone! Today we're going to explore [topic]..."
        }}
    ]
}}

Important guidelines:
- Each script should be 2-3 sentences that naturally flow from the previous slide
- Make the script conversational and engaging for the target audience
- Each script should explain the content shown on that specific slide
- Make sure each image_prompt is descriptive and suitable for generating educational slides
- The script should feel like natural speech, not written text"#,
        topic = request.topic,
        duration = request.duration_minutes,
        difficulty = request.difficulty_level,
        audience = request.target_audience,
        tone = request.tone,
        addons = addon_lines,
    )
}

/// Models wrap their JSON in prose or markdown fences; take everything
/// between the first `{` and the last `}`.
fn extract_json(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&reply[start..=end])
}

/// Lenient slide parsing: optional fields default to empty, list-typed
/// content is flattened into one text block.
fn parse_slides(payload: &str) -> Option<Vec<Slide>> {
    let value: Value = serde_json::from_str(payload).ok()?;
    let raw_slides = value.get("slides")?.as_array()?;

    let mut slides = Vec::with_capacity(raw_slides.len());
    for (i, raw) in raw_slides.iter().enumerate() {
        let slide_type = raw
            .get("slide_type")
            .cloned()
            .and_then(|v| serde_json::from_value::<SlideType>(v).ok())
            .unwrap_or_default();

        slides.push(Slide {
            slide_number: raw
                .get("slide_number")
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(i as u32 + 1),
            title: string_field(raw, "title"),
            content: flatten_content(raw.get("content")),
            image_prompt: string_field(raw, "image_prompt"),
            slide_type,
            script: string_field(raw, "script"),
            code_example: optional_field(raw, "code_example"),
            exercise: optional_field(raw, "exercise"),
        });
    }

    if slides.is_empty() {
        None
    } else {
        Some(slides)
    }
}

fn string_field(raw: &Value, key: &str) -> String {
    raw.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn optional_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

fn flatten_content(content: Option<&Value>) -> String {
    match content {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => format!("- {s}"),
                other => format!("- {other}"),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Local two-slide deck used whenever the model cannot be reached or
/// its reply cannot be parsed.
pub fn fallback_slides(topic: &str) -> Vec<Slide> {
    vec![
        Slide {
            slide_number: 1,
            title: format!("Introduction to {topic}"),
            content: format!(
                "Welcome to our lecture on {topic}. This presentation will cover the key concepts and provide you with a comprehensive understanding."
            ),
            image_prompt: format!(
                "Professional slide showing introduction to {topic}, clean design, educational style"
            ),
            slide_type: SlideType::Title,
            script: format!(
                "Welcome everyone! Today we're going to explore {topic}. This is an exciting field that has many applications in our daily lives. Let me start by explaining what {topic} is and why it matters to you."
            ),
            code_example: None,
            exercise: None,
        },
        Slide {
            slide_number: 2,
            title: format!("Key Concepts of {topic}"),
            content: format!(
                "Let's explore the main concepts related to {topic} and understand their importance."
            ),
            image_prompt: format!(
                "Infographic showing key concepts of {topic}, modern design, clear typography"
            ),
            slide_type: SlideType::Content,
            script: format!(
                "Now let's dive into the key concepts of {topic}. The first important concept we need to understand is the fundamental principles. This is crucial because it forms the foundation for everything else we'll learn today."
            ),
            code_example: None,
            exercise: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingBackend;

    #[async_trait]
    impl ChatBackend for FailingBackend {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Err(anyhow!("connection refused"))
        }
    }

    struct CannedBackend(String);

    #[async_trait]
    impl ChatBackend for CannedBackend {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    fn request(topic: &str) -> LectureRequest {
        serde_json::from_value(serde_json::json!({ "topic": topic })).unwrap()
    }

    #[tokio::test]
    async fn test_backend_failure_falls_back_to_local_deck() {
        let generator = ContentGenerator::with_backend(Box::new(FailingBackend));
        let slides = generator.generate_lecture(&request("Loops")).await;
        assert!(!slides.is_empty());
        assert_eq!(slides[0].slide_type, SlideType::Title);
        assert_eq!(slides[0].title, "Introduction to Loops");
    }

    #[tokio::test]
    async fn test_fenced_reply_is_parsed() {
        let reply = r#"Sure! Here is your lecture:
```json
{"slides": [
  {"slide_number": 1, "title": "Intro", "content": "hello", "image_prompt": "p",
   "slide_type": "title", "script": "Welcome."},
  {"slide_number": 2, "title": "Concepts", "content": ["one", "two"],
   "slide_type": "content", "script": "Next."}
]}
```
Hope that helps!"#;
        let generator = ContentGenerator::with_backend(Box::new(CannedBackend(reply.into())));
        let slides = generator.generate_lecture(&request("X")).await;
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0].title, "Intro");
        // List content is flattened to bullet lines.
        assert_eq!(slides[1].content, "- one\n- two");
        // Missing optional field defaults to empty, not an error.
        assert_eq!(slides[1].image_prompt, "");
    }

    #[tokio::test]
    async fn test_out_of_range_slide_number_uses_position() {
        // A slide_number beyond u32 must not wrap; it falls back to the
        // slide's position, like a missing one.
        let reply = r#"{"slides": [
  {"slide_number": 4294967296, "title": "A", "content": "c", "image_prompt": "p",
   "slide_type": "content", "script": "s"},
  {"title": "B", "content": "c", "image_prompt": "p",
   "slide_type": "content", "script": "s"}
]}"#;
        let generator = ContentGenerator::with_backend(Box::new(CannedBackend(reply.into())));
        let slides = generator.generate_lecture(&request("X")).await;
        assert_eq!(slides[0].slide_number, 1);
        assert_eq!(slides[1].slide_number, 2);
    }

    #[tokio::test]
    async fn test_garbage_reply_falls_back() {
        let generator =
            ContentGenerator::with_backend(Box::new(CannedBackend("no json here".into())));
        let slides = generator.generate_lecture(&request("Graphs")).await;
        assert_eq!(slides.len(), 2);
        assert!(slides[0].title.contains("Graphs"));
    }

    #[tokio::test]
    async fn test_generate_text_degrades_to_error_string() {
        let generator = ContentGenerator::with_backend(Box::new(FailingBackend));
        let text = generator.generate_text("hi").await;
        assert!(text.starts_with("Error generating text:"));
    }

    #[test]
    fn test_extract_json_bounds() {
        assert_eq!(extract_json("x {\"a\": 1} y"), Some("{\"a\": 1}"));
        assert_eq!(extract_json("no braces"), None);
        assert_eq!(extract_json("} {"), None);
    }

    #[test]
    fn test_prompt_mentions_addons_only_when_enabled() {
        let mut req = request("Loops");
        assert!(!build_lecture_prompt(&req).contains("code_example\" field"));
        req.add_ons.code_examples = true;
        assert!(build_lecture_prompt(&req).contains("code_example"));
    }
}
