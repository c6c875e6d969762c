// Lectern Data Model
// Copyright (c) 2026 The Lectern Authors

use serde::{Deserialize, Serialize};

use crate::pipeline::jobs::JobRecord;

/// One unit of lecture content. Immutable once created; consumed in
/// order by the image and video submission stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    pub slide_number: u32,
    pub title: String,
    pub content: String,
    pub image_prompt: String,
    pub slide_type: SlideType,
    pub script: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideType {
    Title,
    Content,
    /// Wrap-up slide. Some models emit "conclusion" for the same thing.
    #[serde(alias = "conclusion")]
    Summary,
    Qa,
}

impl Default for SlideType {
    fn default() -> Self {
        SlideType::Content
    }
}

/// Optional generated-content toggles for a lecture request.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AddOns {
    pub code_examples: bool,
    pub visuals: bool,
    pub exercises: bool,
    pub qa: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LectureRequest {
    pub topic: String,
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    #[serde(default = "default_difficulty")]
    pub difficulty_level: String,
    #[serde(default = "default_audience")]
    pub target_audience: String,
    #[serde(default = "default_tone")]
    pub tone: String,
    #[serde(default)]
    pub add_ons: AddOns,
}

impl LectureRequest {
    /// Request with default audience, tone and add-ons, as used by the
    /// topic query endpoint.
    pub fn for_topic(topic: String, duration_minutes: u32, difficulty_level: String) -> Self {
        Self {
            topic,
            duration_minutes,
            difficulty_level,
            target_audience: default_audience(),
            tone: default_tone(),
            add_ons: AddOns::default(),
        }
    }
}

fn default_duration() -> u32 {
    10
}

fn default_difficulty() -> String {
    "beginner".to_string()
}

fn default_audience() -> String {
    "students".to_string()
}

fn default_tone() -> String {
    "friendly".to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct LectureResponse {
    pub status: i32,
    pub topic: String,
    pub duration_minutes: u32,
    pub tone: String,
    pub slides: Vec<Slide>,
    pub total_slides: usize,
    pub markdown_content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextPrompt {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedTextResponse {
    pub status: i32,
    pub text: String,
}

/// Body for the full video pipeline: a rendered lecture document plus an
/// optional presenter portrait override.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptAndImageRequest {
    pub text: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateImageResponse {
    pub status: i32,
    pub result: Vec<JobRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lecture_request_defaults() {
        let request: LectureRequest =
            serde_json::from_str(r#"{"topic": "Loops", "duration_minutes": 4}"#).unwrap();
        assert_eq!(request.topic, "Loops");
        assert_eq!(request.duration_minutes, 4);
        assert_eq!(request.difficulty_level, "beginner");
        assert_eq!(request.tone, "friendly");
        assert!(!request.add_ons.code_examples);
        assert!(!request.add_ons.qa);
    }

    #[test]
    fn test_slide_type_serde() {
        assert_eq!(
            serde_json::to_string(&SlideType::Title).unwrap(),
            "\"title\""
        );
        // "conclusion" is accepted as an input alias for summary.
        let parsed: SlideType = serde_json::from_str("\"conclusion\"").unwrap();
        assert_eq!(parsed, SlideType::Summary);
        assert_eq!(
            serde_json::to_string(&SlideType::Summary).unwrap(),
            "\"summary\""
        );
    }

    #[test]
    fn test_slide_optional_fields_default() {
        let slide: Slide = serde_json::from_str(
            r#"{
                "slide_number": 1,
                "title": "Intro",
                "content": "Welcome",
                "image_prompt": "Clean title slide",
                "slide_type": "title",
                "script": "Hello everyone"
            }"#,
        )
        .unwrap();
        assert!(slide.code_example.is_none());
        assert!(slide.exercise.is_none());
    }
}
