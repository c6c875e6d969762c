// Lectern Higgsfield Vendor Client
// Copyright (c) 2026 The Lectern Authors
//
// Thin reqwest wrapper over the Higgsfield job APIs: text2image for
// slide visuals, speak/veo3 for talking-presenter videos, and job-sets
// for status. Both job kinds implement `MediaVendor` so the generic
// poll driver can run them.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::pipeline::jobs::MediaVendor;

/// Fixed layout prompt for presenter-style explainer videos: slide on
/// the left, fixed webcam-style avatar on the right, narration synced
/// to the slide script.
const PRESENTER_PROMPT: &str = "You are generating a professional presentation-style explainer video. \
Inputs: Image A is the presenter's face or half-body portrait; Image B is a presentation slide. \
Layout requirements: 16:9 horizontal video; the slide must fill 75-80% of the left side with full \
clarity and no cropping of text; the presenter appears on the right side as a fixed webcam avatar, \
approximately 20-25% of the width, vertically centered, with clean separation from the slide. \
Motion: the presenter should appear naturally alive with subtle head motion, eye blinks and light \
expression, without distortion; no camera zoom, no transitions. If narration is provided, sync mouth \
motion and pacing to it. Style: modern educational keynote, neutral lighting, realistic color, \
no effects, particles, borders, watermarks or fake UI elements. \
Output: 1080p 16:9 MP4, ready to serve directly as a lecture preview.";

pub struct HiggsfieldClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    secret: String,
}

impl HiggsfieldClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.hf_base_url.trim_end_matches('/').to_string(),
            api_key: config.hf_api_key.clone(),
            secret: config.hf_secret.clone(),
        }
    }

    /// Image-generation vendor; `avatar` is included as an input image
    /// when present so the slide can feature the presenter.
    pub fn image_jobs(&self, avatar: Option<String>) -> ImageJobs<'_> {
        ImageJobs {
            client: self,
            avatar,
        }
    }

    /// Video-generation vendor for talking-presenter clips.
    pub fn video_jobs(&self) -> VideoJobs<'_> {
        VideoJobs { client: self }
    }

    /// POST a job request; returns the job-set id, or `None` when the
    /// vendor rejects the submission.
    async fn submit_job(&self, path: &str, params: Value) -> Result<Option<String>> {
        let url = format!("{}{path}", self.base_url);
        let resp = self
            .client
            .post(&url)
            .header("hf-api-key", &self.api_key)
            .header("hf-secret", &self.secret)
            .json(&json!({ "params": params }))
            .send()
            .await?;

        if !resp.status().is_success() {
            warn!("[HF] Submission to {} rejected: {}", path, resp.status());
            return Ok(None);
        }

        let body: Value = resp.json().await?;
        Ok(body
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    /// Fetch a job-set and return the result URL if its first job is
    /// completed. `result_key` selects the nested result variant
    /// ("min" for images, "raw" for videos). Anything else, including
    /// vendor-reported errors, reads as still pending.
    async fn job_url(&self, job_set_id: &str, result_key: &str) -> Result<Option<String>> {
        let url = format!("{}/v1/job-sets/{job_set_id}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .header("hf-api-key", &self.api_key)
            .header("hf-secret", &self.secret)
            .send()
            .await?;

        if !resp.status().is_success() {
            debug!("[HF] Status fetch for {} returned {}", job_set_id, resp.status());
            return Ok(None);
        }

        let body: Value = resp.json().await?;
        let Some(first) = body.get("jobs").and_then(Value::as_array).and_then(|j| j.first())
        else {
            return Ok(None);
        };

        if first.get("status").and_then(Value::as_str) != Some("completed") {
            return Ok(None);
        }

        Ok(first["results"][result_key]["url"]
            .as_str()
            .map(str::to_string))
    }
}

pub struct ImageJobs<'a> {
    client: &'a HiggsfieldClient,
    avatar: Option<String>,
}

#[async_trait]
impl MediaVendor for ImageJobs<'_> {
    type Item = String;

    async fn submit(&self, prompt: &String) -> Result<Option<String>> {
        let input_images: Vec<&str> = self.avatar.as_deref().into_iter().collect();
        self.client
            .submit_job(
                "/v1/text2image/nano-banana",
                json!({
                    "prompt": prompt,
                    "aspect_ratio": "4:3",
                    "input_images": input_images,
                }),
            )
            .await
    }

    async fn check(&self, job_id: &str) -> Result<Option<String>> {
        self.client.job_url(job_id, "min").await
    }
}

/// Work item for one talking-presenter clip: the finished slide image
/// plus the narration script spoken over it.
#[derive(Debug, Clone)]
pub struct VideoClip {
    pub image_url: String,
    pub script: String,
}

pub struct VideoJobs<'a> {
    client: &'a HiggsfieldClient,
}

#[async_trait]
impl MediaVendor for VideoJobs<'_> {
    type Item = VideoClip;

    async fn submit(&self, clip: &VideoClip) -> Result<Option<String>> {
        self.client
            .submit_job(
                "/v1/speak/veo3",
                json!({
                    "model": "veo-3-fast",
                    "prompt": PRESENTER_PROMPT,
                    "quality": "basic",
                    "input_image": {
                        "type": "image_url",
                        "image_url": clip.image_url,
                    },
                    "aspect_ratio": "16:9",
                    "audio_prompt": clip.script,
                    "enhance_prompt": true,
                }),
            )
            .await
    }

    async fn check(&self, job_id: &str) -> Result<Option<String>> {
        self.client.job_url(job_id, "raw").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presenter_prompt_constraints() {
        assert!(PRESENTER_PROMPT.contains("16:9"));
        assert!(PRESENTER_PROMPT.contains("webcam avatar"));
        assert!(PRESENTER_PROMPT.contains("no camera zoom"));
    }

    #[test]
    fn test_image_params_shape() {
        // The avatar variant carries the portrait as an input image.
        let avatar = Some("https://cdn.example/face.jpg".to_string());
        let input_images: Vec<&str> = avatar.as_deref().into_iter().collect();
        let params = json!({
            "prompt": "a slide",
            "aspect_ratio": "4:3",
            "input_images": input_images,
        });
        assert_eq!(params["input_images"][0], "https://cdn.example/face.jpg");

        let none: Option<String> = None;
        let empty: Vec<&str> = none.as_deref().into_iter().collect();
        assert!(empty.is_empty());
    }
}
