// Lectern Core Library
// Copyright (c) 2026 The Lectern Authors
//
// Orchestration backend for AI-generated lecture videos: a chat model
// writes the slides, an image vendor draws them, a video vendor makes
// each slide a talking-presenter clip, and FFmpeg merges the clips.

pub mod config;
pub mod models;
pub mod pipeline;
pub mod server;
