// Lectern HTTP Surface
// Copyright (c) 2026 The Lectern Authors
//
// Request/response endpoints over the pipeline. Handlers block for the
// full generation run before responding; there is no cross-request
// state beyond the shared clients.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::{
    GenerateImageResponse, GeneratedTextResponse, LectureRequest, LectureResponse,
    PromptAndImageRequest, TextPrompt,
};
use crate::pipeline::assembler::Assembler;
use crate::pipeline::content::ContentGenerator;
use crate::pipeline::higgsfield::{HiggsfieldClient, VideoClip};
use crate::pipeline::jobs::{resolved_urls, run_jobs, PollPolicy};
use crate::pipeline::markdown;

pub struct AppState {
    pub config: Config,
    pub content: ContentGenerator,
    pub higgsfield: HiggsfieldClient,
    pub poll_policy: PollPolicy,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            content: ContentGenerator::new(&config),
            higgsfield: HiggsfieldClient::new(&config),
            poll_policy: PollPolicy::default(),
            config,
        }
    }
}

pub type SharedState = Arc<AppState>;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/generate-text", post(generate_text))
        .route("/generate-lecture", post(generate_lecture))
        .route("/lecture/:topic", get(lecture_by_topic))
        .route("/generate-image", post(generate_image))
        .route("/generate-image-with-avatar", post(generate_image_with_avatar))
        .route("/generate-video", post(generate_video))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

pub async fn start_server(port: u16, state: SharedState) -> anyhow::Result<()> {
    let app = router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("🚀 Lectern server {}", bind_banner(&addr));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Startup banner: the bound address, plus the loopback URL when the
/// bind address itself is unreachable from a browser.
fn bind_banner(addr: &SocketAddr) -> String {
    if addr.ip().is_unspecified() {
        format!(
            "listening on {} (local: http://127.0.0.1:{})",
            addr,
            addr.port()
        )
    } else {
        format!("listening on http://{addr}")
    }
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Hello World" }))
}

async fn generate_text(
    State(state): State<SharedState>,
    Json(prompt): Json<TextPrompt>,
) -> Json<GeneratedTextResponse> {
    let text = state.content.generate_text(&prompt.text).await;
    Json(GeneratedTextResponse { status: 1, text })
}

async fn generate_lecture(
    State(state): State<SharedState>,
    Json(request): Json<LectureRequest>,
) -> Json<LectureResponse> {
    Json(build_lecture(&state, request).await)
}

#[derive(Deserialize)]
struct LectureQuery {
    #[serde(default = "default_query_duration")]
    duration: u32,
    #[serde(default = "default_query_difficulty")]
    difficulty: String,
}

fn default_query_duration() -> u32 {
    10
}

fn default_query_difficulty() -> String {
    "beginner".to_string()
}

/// Convenience wrapper: `GET /lecture/{topic}?duration=10&difficulty=beginner`.
async fn lecture_by_topic(
    State(state): State<SharedState>,
    Path(topic): Path<String>,
    Query(query): Query<LectureQuery>,
) -> Json<LectureResponse> {
    let request = LectureRequest::for_topic(topic, query.duration, query.difficulty);
    Json(build_lecture(&state, request).await)
}

async fn build_lecture(state: &AppState, request: LectureRequest) -> LectureResponse {
    info!("[SERVER] Generating lecture on '{}'", request.topic);
    let slides = state.content.generate_lecture(&request).await;
    let markdown_content = markdown::format_lecture(&request.topic, &slides);

    LectureResponse {
        status: 1,
        topic: request.topic,
        duration_minutes: request.duration_minutes,
        tone: request.tone,
        total_slides: slides.len(),
        slides,
        markdown_content,
    }
}

async fn generate_image(
    State(state): State<SharedState>,
    Json(prompt): Json<TextPrompt>,
) -> Json<GenerateImageResponse> {
    let vendor = state.higgsfield.image_jobs(None);
    let records = run_jobs(&vendor, &[prompt.text], &state.poll_policy).await;
    Json(GenerateImageResponse { status: 1, result: records })
}

async fn generate_image_with_avatar(
    State(state): State<SharedState>,
    Json(prompt): Json<TextPrompt>,
) -> Json<GenerateImageResponse> {
    let vendor = state
        .higgsfield
        .image_jobs(Some(state.config.avatar_url.clone()));
    let records = run_jobs(&vendor, &[prompt.text], &state.poll_policy).await;
    Json(GenerateImageResponse { status: 1, result: records })
}

/// Full pipeline: lecture document -> slide images -> talking-presenter
/// clips -> one merged MP4 streamed back to the caller.
async fn generate_video(
    State(state): State<SharedState>,
    Json(request): Json<PromptAndImageRequest>,
) -> Response {
    let slides = markdown::parse_markdown(&request.text);
    if slides.is_empty() {
        return pipeline_error("document contained no slide sections");
    }
    info!("[SERVER] Video pipeline started for {} slides", slides.len());

    let avatar = request
        .avatar
        .clone()
        .unwrap_or_else(|| state.config.avatar_url.clone());

    // Stage 1: one image job per slide.
    let image_vendor = state.higgsfield.image_jobs(Some(avatar));
    let prompts: Vec<String> = slides.iter().map(|s| s.image_prompt.clone()).collect();
    let image_records = run_jobs(&image_vendor, &prompts, &state.poll_policy).await;

    // Stage 2: one video job per resolved image, narrated by the
    // matching slide's script. Slide order is preserved.
    let clips: Vec<VideoClip> = slides
        .iter()
        .zip(image_records.iter())
        .filter_map(|(slide, record)| {
            record.url().map(|url| VideoClip {
                image_url: url.to_string(),
                script: slide.script.clone(),
            })
        })
        .collect();
    if clips.is_empty() {
        return pipeline_error("no slide images were generated");
    }

    let video_vendor = state.higgsfield.video_jobs();
    let video_records = run_jobs(&video_vendor, &clips, &state.poll_policy).await;
    let urls = resolved_urls(&video_records);
    if urls.is_empty() {
        return pipeline_error("no slide videos were generated");
    }
    if urls.len() < slides.len() {
        warn!(
            "[SERVER] Only {}/{} slides made it into the final video",
            urls.len(),
            slides.len()
        );
    }

    // Stage 3: download and merge.
    let assembler = Assembler::new(&state.config.output_dir);
    let output = state.config.output_dir.join("merged.mp4");
    match assembler.assemble(&urls, &output).await {
        Ok(path) => match tokio::fs::read(&path).await {
            Ok(bytes) => (
                [
                    (header::CONTENT_TYPE, "video/mp4"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"lecture_video.mp4\"",
                    ),
                ],
                bytes,
            )
                .into_response(),
            Err(e) => pipeline_error(&format!("merged video unreadable: {e}")),
        },
        Err(e) => pipeline_error(&format!("failed to create merged video: {e}")),
    }
}

/// Assembly failures surface as a status-flag JSON body, not a 5xx.
fn pipeline_error(message: &str) -> Response {
    error!("[SERVER] Pipeline failed: {}", message);
    (
        StatusCode::OK,
        Json(json!({ "status": 0, "error": message })),
    )
        .into_response()
}
