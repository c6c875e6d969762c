// Lectern Markdown Formatter
// Copyright (c) 2026 The Lectern Authors
//
// Forward direction renders a slide deck into a human-readable lecture
// document; the reverse direction reconstructs slides from such a
// document. The round trip is lossy: code examples and exercises are
// rendered inline and cannot be recovered as structured fields.

use regex::Regex;

use crate::models::{Slide, SlideType};

/// Over-long bullet descriptions are cut at this budget.
const DESCRIPTION_BUDGET: usize = 200;

/// Render a slide deck as a structured markdown lecture document.
pub fn format_lecture(topic: &str, slides: &[Slide]) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push(format!("# {topic}"));

    let intro: Vec<&Slide> = slides
        .iter()
        .filter(|s| s.slide_type == SlideType::Title || s.slide_number == 1)
        .collect();
    let content: Vec<&Slide> = slides
        .iter()
        .filter(|s| s.slide_type == SlideType::Content && s.slide_number > 1)
        .collect();
    let conclusion: Vec<&Slide> = slides
        .iter()
        .filter(|s| s.slide_type == SlideType::Summary)
        .collect();
    let qa: Vec<&Slide> = slides
        .iter()
        .filter(|s| s.slide_type == SlideType::Qa)
        .collect();

    if !intro.is_empty() {
        parts.push("## Introduction".to_string());
        for slide in &intro {
            if !slide.script.is_empty() {
                parts.push(slide.script.clone());
            }
            if !slide.content.is_empty() && slide.content != slide.script {
                parts.push(slide.content.clone());
            }
        }
    }

    if !content.is_empty() {
        parts.push("## Main Content".to_string());

        let first_script = &content[0].script;
        if !first_script.is_empty() {
            let intro_sentence = first_sentence(first_script);
            parts.push(format!("{intro_sentence} Let's look at the key aspects:"));
        }

        for slide in &content {
            let concept = slide.title.replace("Slide ", "").trim().to_string();

            // Skip bullets whose concept just restates the topic.
            if !topic.to_lowercase().contains(&concept.to_lowercase()) {
                if let Some(description) = slide_description(slide) {
                    parts.push(format!("- **{concept}**: {}", truncate(&description)));
                }
            }

            if let Some(code) = slide.code_example.as_deref().filter(|c| !c.trim().is_empty()) {
                let code = code.trim();
                parts.push("**Code Example:**".to_string());
                parts.push(format!("```{}\n{}\n```", detect_language(code), code));
            }

            if let Some(exercise) = slide.exercise.as_deref().filter(|e| !e.trim().is_empty()) {
                parts.push(format!("**Practice Exercise:** {exercise}"));
            }
        }
    }

    parts.push("## Brief Summary".to_string());
    if conclusion.is_empty() {
        parts.push(format!(
            "In this lecture, we have covered the essential concepts of {topic}. \
             This knowledge will help you further study the material and apply it \
             in practical situations."
        ));
    } else {
        for slide in &conclusion {
            if !slide.script.is_empty() {
                parts.push(slide.script.clone());
            } else if !slide.content.is_empty() {
                parts.push(slide.content.clone());
            }
        }
    }

    parts.push("## Key Findings".to_string());
    let points = extract_key_points(slides, topic);
    parts.push(
        points
            .iter()
            .map(|p| format!("- {p}"))
            .collect::<Vec<_>>()
            .join("\n"),
    );

    if !qa.is_empty() {
        parts.push("## Questions & Answers".to_string());
        for slide in &qa {
            let body = slide.content.trim();
            if body.is_empty() {
                continue;
            }
            let mut lines: Vec<String> = Vec::new();
            for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
                if line.starts_with("Q:") || line.starts_with("Question:") || line.starts_with("Q.")
                {
                    lines.push(format!("**{line}**"));
                } else {
                    lines.push(line.to_string());
                }
            }
            parts.push(lines.join("\n"));
        }
    }

    let mut doc = parts.join("\n\n");
    doc.push('\n');
    doc
}

/// Heuristic key takeaways: one per distinct content-slide concept, plus
/// practice points, padded with generic filler up to three and capped at
/// five.
fn extract_key_points(slides: &[Slide], topic: &str) -> Vec<String> {
    let mut points: Vec<String> = Vec::new();

    for slide in slides {
        if slide.slide_type == SlideType::Title
            || slide.slide_type == SlideType::Qa
            || slide.slide_number == 1
        {
            continue;
        }
        let concept = slide.title.replace("Slide ", "").trim().to_string();
        if concept.len() > 3 && !topic.to_lowercase().contains(&concept.to_lowercase()) {
            let point = format!("Understanding {}", concept.to_lowercase());
            if !points.contains(&point) {
                points.push(point);
            }
        }
    }

    if slides.iter().any(|s| s.code_example.is_some()) {
        points.push("Practice with the provided code examples".to_string());
    }
    if slides.iter().any(|s| s.exercise.is_some()) {
        points.push("Complete the practice exercises to reinforce learning".to_string());
    }

    if points.len() < 3 {
        let generic = [
            "Review and reinforce the core concepts discussed",
            "Apply learned principles through hands-on practice",
            "Explore additional resources for deeper understanding",
        ];
        for point in generic {
            if points.len() >= 5 {
                break;
            }
            if !points.iter().any(|p| p == point) {
                points.push(point.to_string());
            }
        }
    }

    points.truncate(5);
    points
}

/// Parse a lecture document back into slides. Sections are delimited by
/// second-level headers; `Script:`, `Image:` and `Key takeaway:` lines
/// are recognized annotations. Slides are numbered in document order.
pub fn parse_markdown(text: &str) -> Vec<Slide> {
    let script_re = Regex::new(r"(?i)^\**\s*script:\**\s*(.+)$").unwrap();
    let image_re = Regex::new(r"(?i)^\**\s*image:\**\s*(.+)$").unwrap();
    let takeaway_re = Regex::new(r"(?i)^\**\s*key takeaway:\**\s*(.+)$").unwrap();

    // Split the document into (header, body) sections.
    let mut sections: Vec<(String, Vec<String>)> = Vec::new();
    for line in text.lines() {
        if let Some(header) = line.strip_prefix("## ") {
            sections.push((header.trim().to_string(), Vec::new()));
        } else if let Some((_, body)) = sections.last_mut() {
            body.push(line.to_string());
        }
    }

    let mut slides = Vec::with_capacity(sections.len());
    for (index, (header, body)) in sections.iter().enumerate() {
        let mut script = None;
        let mut image_prompt = None;
        let mut takeaways: Vec<String> = Vec::new();
        let mut content_lines: Vec<String> = Vec::new();

        for line in body.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
            if let Some(cap) = script_re.captures(line) {
                script = Some(cap[1].trim_end_matches("**").trim().to_string());
            } else if let Some(cap) = image_re.captures(line) {
                image_prompt = Some(cap[1].trim_end_matches("**").trim().to_string());
            } else if let Some(cap) = takeaway_re.captures(line) {
                takeaways.push(cap[1].trim_end_matches("**").trim().to_string());
            } else {
                content_lines.push(line.to_string());
            }
        }

        if !takeaways.is_empty() {
            content_lines.extend(takeaways);
        }
        let content = content_lines.join("\n");

        slides.push(Slide {
            slide_number: index as u32 + 1,
            title: header.clone(),
            // Sections without an explicit script are narrated from
            // their body text.
            script: script.unwrap_or_else(|| content.clone()),
            image_prompt: image_prompt.unwrap_or_else(|| {
                format!("Professional slide illustrating {header}, clean design, educational style")
            }),
            slide_type: classify_header(header),
            content,
            code_example: None,
            exercise: None,
        });
    }

    slides
}

fn classify_header(header: &str) -> SlideType {
    let header = header.to_lowercase();
    if header.starts_with("introduction") {
        SlideType::Title
    } else if header.starts_with("brief summary")
        || header.starts_with("summary")
        || header.starts_with("conclusion")
    {
        SlideType::Summary
    } else if header.starts_with("question") {
        SlideType::Qa
    } else {
        SlideType::Content
    }
}

fn first_sentence(text: &str) -> String {
    match text.split('.').next() {
        Some(s) if !s.is_empty() => format!("{}.", s.trim()),
        _ => text.to_string(),
    }
}

/// First meaningful content line, else the first script sentence.
fn slide_description(slide: &Slide) -> Option<String> {
    for line in slide.content.lines() {
        let clean = line.trim().trim_start_matches(['-', '•']).trim();
        if clean.len() > 10 {
            return Some(clean.to_string());
        }
    }
    if !slide.script.is_empty() {
        return Some(first_sentence(&slide.script));
    }
    None
}

fn truncate(description: &str) -> String {
    if description.chars().count() > DESCRIPTION_BUDGET {
        let cut: String = description.chars().take(DESCRIPTION_BUDGET - 3).collect();
        format!("{cut}...")
    } else {
        description.to_string()
    }
}

fn detect_language(code: &str) -> &'static str {
    if code.contains("def ") || code.contains("import ") {
        "python"
    } else if code.contains("public class") || code.contains("System.out") {
        "java"
    } else {
        "javascript"
    }
}
