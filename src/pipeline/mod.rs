// Lectern Generation Pipeline
// Copyright (c) 2026 The Lectern Authors
//
// topic -> slides -> markdown -> per-slide images -> per-slide videos
// -> merged lecture video. Data flows strictly forward.

pub mod assembler;
pub mod content;
pub mod higgsfield;
pub mod jobs;
pub mod markdown;
