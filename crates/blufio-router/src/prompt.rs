// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tier-aware system prompt adaptation.
//!
//! Small local models (T1) get a trimmed prompt: operational sections such as
//! tool and heartbeat instructions are removed, boilerplate is stripped, and
//! oversized prompts are reduced to the core persona. Mid tiers get light
//! cleanup, T3 sees the prompt untouched, and T4 gets an extra preamble
//! asking for careful reasoning.
//!
//! Section removal matches normalized headers exactly. A user-authored
//! section whose title merely resembles a removed one (`## Tools I Love`)
//! survives.

use serde::Serialize;

use crate::tier::ModelTier;

/// Tier-appropriate prompt variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdaptedPrompt {
    /// `None` exactly when the tier is T0.
    pub system_prompt: Option<String>,
    /// Text to place ahead of the user's message.
    pub user_preamble: Option<String>,
    pub tier: ModelTier,
    pub was_adapted: bool,
}

/// Normalized section titles removed for T1.
const STRIPPED_SECTIONS: &[&str] = &[
    "tools",
    "memory",
    "workspace",
    "memory workspace",
    "memory and workspace",
    "heartbeats",
    "group chats",
    "reactions",
    "react like a human",
];

/// Header words marking a section as part of the core persona.
const CORE_TOPICS: &[&str] = &["core truths", "coach", "who you are", "role", "vibe"];

const BOILERPLATE: &[&str] = &[
    "Don't ask permission. Just do it.",
    "Don\u{2019}t ask permission. Just do it.",
    "Be resourceful before asking.",
    "This file is yours to evolve. As you learn who you are, update it.",
    "If you change this file, tell the user.",
];

/// T1 prompts longer than this are reduced to the core persona.
const CORE_PERSONA_THRESHOLD: usize = 3200;

const T1_SUFFIX: &str = "Keep replies concise: plain text only, no markdown, under 200 words.";

const T4_PREAMBLE: &str = "Think carefully before answering. Weigh the trade-offs, \
consider edge cases, and explain your reasoning where it matters.";

/// Adapt a system prompt for the given tier. Pure and total.
pub fn adapt(system_prompt: &str, tier: ModelTier) -> AdaptedPrompt {
    match tier {
        ModelTier::T0 => AdaptedPrompt {
            system_prompt: None,
            user_preamble: None,
            tier,
            was_adapted: true,
        },
        ModelTier::T1 => AdaptedPrompt {
            system_prompt: Some(compact_for_local(system_prompt)),
            user_preamble: None,
            tier,
            was_adapted: true,
        },
        ModelTier::T2 => {
            let cleaned = collapse_blank_lines(&strip_boilerplate(system_prompt));
            let was_adapted = cleaned != system_prompt;
            AdaptedPrompt {
                system_prompt: Some(cleaned),
                user_preamble: None,
                tier,
                was_adapted,
            }
        }
        ModelTier::T3 => AdaptedPrompt {
            system_prompt: Some(system_prompt.to_string()),
            user_preamble: None,
            tier,
            was_adapted: false,
        },
        ModelTier::T4 => AdaptedPrompt {
            system_prompt: Some(system_prompt.to_string()),
            user_preamble: Some(T4_PREAMBLE.to_string()),
            tier,
            was_adapted: true,
        },
    }
}

fn compact_for_local(prompt: &str) -> String {
    let mut text = collapse_blank_lines(&strip_boilerplate(&strip_sections(prompt)));
    if text.chars().count() > CORE_PERSONA_THRESHOLD {
        text = collapse_blank_lines(&core_persona(&text));
    }

    let body = text.trim_end();
    if body.is_empty() {
        T1_SUFFIX.to_string()
    } else {
        format!("{body}\n\n{T1_SUFFIX}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Keeping,
    Skipping,
}

/// Tracks fenced code blocks so `#` lines inside them are not headers.
///
/// A fence opens on a run of three or more backticks or tildes followed only
/// by an info string, and closes on a bare run of the same character at
/// least as long. ```` ```sh ls``` ```` on one line is inline code.
#[derive(Default)]
struct FenceTracker {
    open: Option<(char, usize)>,
}

impl FenceTracker {
    /// Returns the header title if `line` is a markdown header outside a fence.
    fn header<'a>(&mut self, line: &'a str) -> Option<&'a str> {
        let trimmed = line.trim_start();
        let marker = fence_marker(trimmed);

        if let Some((fence, len)) = self.open {
            if let Some((c, n, rest)) = marker
                && c == fence
                && n >= len
                && rest.trim().is_empty()
            {
                self.open = None;
            }
            return None;
        }

        if let Some((c, n, info)) = marker
            && is_info_string(c, info)
        {
            self.open = Some((c, n));
            return None;
        }
        header_title(trimmed)
    }
}

/// Leading run of three or more backticks or tildes, and the rest of the line.
fn fence_marker(trimmed: &str) -> Option<(char, usize, &str)> {
    let c = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
    let n = trimmed.chars().take_while(|&x| x == c).count();
    (n >= 3).then(|| (c, n, &trimmed[n..]))
}

fn is_info_string(fence: char, info: &str) -> bool {
    match fence {
        '`' => !info.contains('`'),
        _ => !info.contains("~~~"),
    }
}

fn header_title(trimmed: &str) -> Option<&str> {
    let hashes = trimmed.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &trimmed[hashes..];
    if rest.is_empty() {
        return Some(rest);
    }
    rest.starts_with([' ', '\t']).then_some(rest.trim())
}

/// Lowercase, replace everything but letters and digits with spaces, and
/// collapse whitespace. Emoji and punctuation disappear.
fn normalize_header(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_sections(prompt: &str) -> String {
    let mut state = ScanState::Keeping;
    let mut fences = FenceTracker::default();
    let mut kept = Vec::new();

    for line in prompt.split('\n') {
        if let Some(title) = fences.header(line) {
            state = if STRIPPED_SECTIONS.contains(&normalize_header(title).as_str()) {
                ScanState::Skipping
            } else {
                ScanState::Keeping
            };
        }
        if state == ScanState::Keeping {
            kept.push(line);
        }
    }

    kept.join("\n")
}

fn strip_boilerplate(prompt: &str) -> String {
    BOILERPLATE
        .iter()
        .fold(prompt.to_string(), |text, phrase| text.replace(phrase, ""))
}

/// Replace every run of two or more blank lines with a single empty line.
///
/// A lone blank line is left byte-for-byte intact.
fn collapse_blank_lines(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        if lines[i].trim().is_empty() {
            let run = lines[i..].iter().take_while(|l| l.trim().is_empty()).count();
            out.push(if run >= 2 { "" } else { lines[i] });
            i += run;
        } else {
            out.push(lines[i]);
            i += 1;
        }
    }
    out.join("\n")
}

struct Section<'a> {
    title: Option<String>,
    lines: Vec<&'a str>,
}

fn split_sections(text: &str) -> Vec<Section<'_>> {
    let mut fences = FenceTracker::default();
    let mut sections = vec![Section {
        title: None,
        lines: Vec::new(),
    }];

    for line in text.split('\n') {
        if let Some(title) = fences.header(line) {
            sections.push(Section {
                title: Some(normalize_header(title)),
                lines: Vec::new(),
            });
        }
        if let Some(current) = sections.last_mut() {
            current.lines.push(line);
        }
    }

    sections
}

fn is_core_topic(title: &str) -> bool {
    let padded = format!(" {title} ");
    CORE_TOPICS
        .iter()
        .any(|topic| padded.contains(&format!(" {topic} ")))
}

/// Keep the first non-blank section and every core-topic section, in order.
fn core_persona(text: &str) -> String {
    let sections = split_sections(text);
    let first = sections
        .iter()
        .position(|s| s.lines.iter().any(|l| !l.trim().is_empty()));

    sections
        .iter()
        .enumerate()
        .filter(|(i, s)| {
            Some(*i) == first || s.title.as_deref().is_some_and(is_core_topic)
        })
        .flat_map(|(_, s)| s.lines.iter().copied())
        .collect::<Vec<_>>()
        .join("\n")
}
