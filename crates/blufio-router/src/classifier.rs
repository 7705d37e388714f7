// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic intent classification.
//!
//! Estimates how much model capability a message needs using pattern and
//! length heuristics only. No LLM pre-call, no network, no latency.
//!
//! The rules live in an ordered table of [`Stage`]s. Stages are evaluated
//! front to back by a single fold and the first stage that reaches a verdict
//! wins, so the table order *is* the classification contract. Every rule that
//! was evaluated is recorded in the result's signal trace; stages after the
//! deciding one leave no trace.

use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// How much model capability a message is estimated to need.
///
/// Ordered by required capability, except [`Explicit`](Self::Explicit),
/// which signals that the user asked for a specific model and the router
/// should bypass tier selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentComplexity {
    /// Greetings, acks, emoji. No model call needed.
    Trivial,
    /// Single-fact lookups, definitions, reminders.
    Simple,
    /// General conversation and moderate Q&A.
    Standard,
    /// Multi-step reasoning, code, trade-off analysis.
    Complex,
    /// Long-form expert work: system design interviews, deep dives.
    Flagship,
    /// The message names a model to use.
    Explicit,
}

impl std::fmt::Display for IntentComplexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntentComplexity::Trivial => write!(f, "trivial"),
            IntentComplexity::Simple => write!(f, "simple"),
            IntentComplexity::Standard => write!(f, "standard"),
            IntentComplexity::Complex => write!(f, "complex"),
            IntentComplexity::Flagship => write!(f, "flagship"),
            IntentComplexity::Explicit => write!(f, "explicit"),
        }
    }
}

/// One evaluated rule in the classification trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationSignal {
    /// Rule name, unique across the whole table.
    pub name: &'static str,
    /// Weight the rule contributes when matched.
    pub weight: f32,
    /// Whether the rule matched this message.
    pub matched: bool,
}

/// Result of classifying a message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    /// The classified intent.
    pub intent: IntentComplexity,
    /// Confidence in the classification (0.0-1.0).
    pub confidence: f32,
    /// Human-readable reason for the classification. Never empty.
    pub reason: &'static str,
    /// Every rule evaluated, in evaluation order.
    pub signals: Vec<ClassificationSignal>,
}

/// Whether a rule inspects text with a regex or computes over message features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Pattern,
    Heuristic,
}

type HeuristicFn = fn(&Features<'_>, &Fold) -> bool;

enum Test {
    /// Regex source, matched against the lowercased message.
    Pattern(&'static str),
    Heuristic(HeuristicFn),
}

/// A named, weighted rule descriptor.
struct Rule {
    name: &'static str,
    weight: f32,
    test: Test,
}

impl Rule {
    const fn pattern(name: &'static str, weight: f32, source: &'static str) -> Self {
        Self {
            name,
            weight,
            test: Test::Pattern(source),
        }
    }

    const fn heuristic(name: &'static str, weight: f32, f: HeuristicFn) -> Self {
        Self {
            name,
            weight,
            test: Test::Heuristic(f),
        }
    }

    fn kind(&self) -> RuleKind {
        match self.test {
            Test::Pattern(_) => RuleKind::Pattern,
            Test::Heuristic(_) => RuleKind::Heuristic,
        }
    }

    fn matches(&self, features: &Features<'_>, fold: &Fold) -> bool {
        match self.test {
            // A pattern that failed to compile never matches.
            Test::Pattern(_) => COMPILED
                .get(self.name)
                .is_some_and(|re| re.is_match(&features.lower)),
            Test::Heuristic(f) => f(features, fold),
        }
    }
}

type Verdict = (IntentComplexity, f32, &'static str);

enum Decision {
    /// The first matching rule decides; later rules in the stage are not evaluated.
    FirstMatch {
        intent: IntentComplexity,
        confidence: f32,
        reason: &'static str,
    },
    /// Every rule is evaluated and matched weights are summed.
    Accumulate {
        verdict: fn(f32) -> Option<Verdict>,
        /// Later stages read this stage's score through [`Fold::complex_score`].
        records_complex_score: bool,
    },
}

struct Stage {
    name: &'static str,
    decision: Decision,
    rules: &'static [Rule],
}

/// Precomputed message features shared by all rules.
struct Features<'a> {
    text: &'a str,
    lower: String,
    chars: usize,
    words: usize,
    question_marks: usize,
}

impl<'a> Features<'a> {
    fn new(message: &'a str) -> Self {
        let text = message.trim();
        Self {
            text,
            lower: text.to_lowercase(),
            chars: text.chars().count(),
            words: text.split_whitespace().count(),
            question_marks: text.matches('?').count(),
        }
    }
}

/// State carried through the stage fold.
#[derive(Default)]
struct Fold {
    signals: Vec<ClassificationSignal>,
    complex_score: f32,
}

/// Tolerance for comparing summed f32 weights against thresholds.
const SCORE_EPSILON: f32 = 1e-4;

const FLAGSHIP_WEIGHT: f32 = 0.4;
const COMPLEX_WEIGHT: f32 = 0.25;
const COMPLEX_THRESHOLD: f32 = 0.5;

fn flagship_verdict(score: f32) -> Option<Verdict> {
    (score > 0.0).then(|| {
        (
            IntentComplexity::Flagship,
            (0.6 + score).min(0.95),
            "flagship-level request",
        )
    })
}

fn complex_verdict(score: f32) -> Option<Verdict> {
    (score + SCORE_EPSILON >= COMPLEX_THRESHOLD).then(|| {
        (
            IntentComplexity::Complex,
            (0.5 + score * 0.4).min(0.9),
            "complex task indicators",
        )
    })
}

fn is_empty(f: &Features<'_>, _: &Fold) -> bool {
    f.text.is_empty()
}

/// Variation selector-16 and the combining enclosing keycap.
const KEYCAP_MARKS: [char; 2] = ['\u{FE0F}', '\u{20E3}'];

/// True when no letter or digit appears outside a keycap sequence such as
/// `1\u{FE0F}\u{20E3}`.
fn is_emoji_only(f: &Features<'_>, _: &Fold) -> bool {
    let mut chars = f.text.chars().peekable();
    let mut saw_non_ascii = false;
    while let Some(c) = chars.next() {
        if !c.is_ascii() {
            saw_non_ascii = true;
        }
        let keycap_base = matches!(c, '0'..='9' | '#' | '*')
            && chars.peek().is_some_and(|next| KEYCAP_MARKS.contains(next));
        if c.is_alphanumeric() && !keycap_base {
            return false;
        }
    }
    saw_non_ascii
}

fn is_short_statement(f: &Features<'_>, _: &Fold) -> bool {
    f.chars < 10 && f.question_marks == 0
}

fn over_100_words(f: &Features<'_>, _: &Fold) -> bool {
    f.words > 100
}

fn over_50_words(f: &Features<'_>, _: &Fold) -> bool {
    f.words > 50 && f.words <= 100
}

fn has_code_block(f: &Features<'_>, _: &Fold) -> bool {
    f.text.contains("```")
}

fn has_multiple_questions(f: &Features<'_>, _: &Fold) -> bool {
    f.question_marks >= 2
}

fn is_short_and_plain(f: &Features<'_>, fold: &Fold) -> bool {
    f.words <= 15 && fold.complex_score + SCORE_EPSILON < COMPLEX_WEIGHT
}

fn always(_: &Features<'_>, _: &Fold) -> bool {
    true
}

static STAGES: &[Stage] = &[
    Stage {
        name: "empty",
        decision: Decision::FirstMatch {
            intent: IntentComplexity::Trivial,
            confidence: 1.0,
            reason: "empty message",
        },
        rules: &[Rule::heuristic("empty", 1.0, is_empty)],
    },
    Stage {
        name: "explicit_model",
        decision: Decision::FirstMatch {
            intent: IntentComplexity::Explicit,
            confidence: 1.0,
            reason: "explicit model request",
        },
        rules: &[
            Rule::pattern(
                "slash_model_command",
                1.0,
                r"^/(?:model|models|use|switch)\s+\S+",
            ),
            Rule::pattern(
                "slash_model_shortcut",
                1.0,
                r"^/(?:opus|sonnet|haiku|gpt[\w.-]*|gemini|llama|qwen|local)\b",
            ),
            Rule::pattern(
                "use_named_model",
                1.0,
                // The whole message must be the request: an optional polite
                // lead, the verb and model, then at most a short scope tail.
                concat!(
                    r"^(?:(?:please|pls|ok|okay|hey|so|now)[\s,]+)*",
                    r"(?:(?:can|could|would|will)\s+(?:you|we)\s+(?:please\s+)?|let'?s\s+|i\s+want\s+(?:you\s+)?to\s+|i'?d\s+like\s+(?:you\s+)?to\s+)?",
                    r"(?:use|switch\s+to|switch\s+over\s+to|change\s+to)\s+(?:the\s+)?(?:model\s+)?",
                    r"(?:opus|sonnet|haiku|claude[\w.-]*|gpt-?[\w.-]*|o[134](?:-mini)?|gemini[\w.-]*|llama[\w.:-]*|qwen[\w.:-]*|mistral[\w.:-]*|deepseek[\w.:-]*)\b",
                    r"(?:\s+model)?",
                    r"(?:\s+(?:instead|now|please|again|from\s+now\s+on|going\s+forward|for\s+(?:this|that|now|me|the\s+rest|the\s+next|a\s+(?:bit|while))\b[^?]*))?",
                    r"[\s!.,?]*$",
                ),
            ),
        ],
    },
    Stage {
        name: "trivial_pattern",
        decision: Decision::FirstMatch {
            intent: IntentComplexity::Trivial,
            confidence: 0.95,
            reason: "greeting or acknowledgement",
        },
        rules: &[
            Rule::pattern(
                "greeting",
                1.0,
                r"^(?:hi|hello|hey|heya|hiya|yo|sup|howdy|hola|gm|morning|good\s+(?:morning|afternoon|evening))(?:\s+there)?[\s!.,~]*$",
            ),
            Rule::pattern(
                "acknowledgement",
                1.0,
                r"^(?:ok|okay|k|kk|sure|cool|nice|great|awesome|perfect|noted|got\s+it|sounds\s+good|thanks|thank\s+you|thanks\s+a\s+lot|thank\s+you\s+so\s+much|thx|ty|cheers|lol|haha+|np|no\s+problem|no\s+worries)[\s!.,~]*$",
            ),
            Rule::pattern(
                "yes_no",
                1.0,
                r"^(?:yes|no|yep|yup|nope|yeah|yea|nah|y|n|of\s+course)[\s!.,~]*$",
            ),
            Rule::pattern(
                "farewell",
                1.0,
                r"^(?:bye|bye\s+bye|goodbye|see\s+ya|see\s+you|later|cya|good\s+night|gn|night)[\s!.,~]*$",
            ),
            Rule::heuristic("emoji_only", 1.0, is_emoji_only),
        ],
    },
    Stage {
        name: "short_message",
        decision: Decision::FirstMatch {
            intent: IntentComplexity::Trivial,
            confidence: 0.8,
            reason: "short message without a question",
        },
        rules: &[Rule::heuristic("short_statement", 1.0, is_short_statement)],
    },
    Stage {
        name: "flagship",
        decision: Decision::Accumulate {
            verdict: flagship_verdict,
            records_complex_score: false,
        },
        rules: &[
            Rule::pattern("mock_interview", FLAGSHIP_WEIGHT, r"\bmock[\s-]+interview"),
            Rule::pattern(
                "full_system_design",
                FLAGSHIP_WEIGHT,
                r"\bfull(?:[\s-]+blown)?\s+system\s+design",
            ),
            Rule::pattern(
                "design_from_scratch",
                FLAGSHIP_WEIGHT,
                r"\b(?:design|architect|build)\b.{0,80}?\bfrom\s+scratch\b",
            ),
            Rule::pattern(
                "architecture_review",
                FLAGSHIP_WEIGHT,
                r"\barchitecture\s+review",
            ),
            Rule::pattern("deep_dive", FLAGSHIP_WEIGHT, r"\bdeep[\s-]?dive"),
            Rule::pattern(
                "comprehensive_analysis",
                FLAGSHIP_WEIGHT,
                r"\bcomprehensive\s+(?:analysis|review|breakdown)",
            ),
            Rule::pattern(
                "explain_in_depth",
                FLAGSHIP_WEIGHT,
                r"\bexplain\b.{0,80}?\bin[\s-]depth\b",
            ),
            Rule::pattern(
                "paper_review",
                FLAGSHIP_WEIGHT,
                r"\b(?:research\s+)?paper\s+review\b|\breview\s+(?:this|the|a|my)\s+(?:research\s+)?paper\b",
            ),
            Rule::pattern("rfc", FLAGSHIP_WEIGHT, r"\brfcs?\b"),
        ],
    },
    Stage {
        name: "complex",
        decision: Decision::Accumulate {
            verdict: complex_verdict,
            records_complex_score: true,
        },
        rules: &[
            Rule::pattern("system_design", COMPLEX_WEIGHT, r"\bsystem\s+design\b"),
            Rule::pattern("code_review", COMPLEX_WEIGHT, r"\bcode\s+review\b"),
            Rule::pattern("refactor", COMPLEX_WEIGHT, r"\brefactor"),
            Rule::pattern("debug", COMPLEX_WEIGHT, r"\bdebug"),
            Rule::pattern("implement", COMPLEX_WEIGHT, r"\bimplement"),
            Rule::pattern("optimize", COMPLEX_WEIGHT, r"\boptimi[sz]"),
            Rule::pattern("trade_offs", COMPLEX_WEIGHT, r"\btrade[\s-]?offs?\b"),
            Rule::pattern("pros_cons", COMPLEX_WEIGHT, r"\bpros\s+(?:and|&)\s+cons\b"),
            Rule::pattern(
                "compare_contrast",
                COMPLEX_WEIGHT,
                r"\b(?:compare|comparing|comparison|contrast)\b",
            ),
            Rule::pattern("step_by_step", COMPLEX_WEIGHT, r"\bstep[\s-]by[\s-]step\b"),
            Rule::pattern("explain_how_why", COMPLEX_WEIGHT, r"\bexplain\s+(?:how|why|when)\b"),
            Rule::pattern(
                "what_would_happen",
                COMPLEX_WEIGHT,
                r"\bwhat\s+would\s+happen\s+if\b",
            ),
            Rule::pattern("long_code_fence", COMPLEX_WEIGHT, r"(?s)```.{50,}?```"),
            Rule::pattern(
                "technical_jargon",
                COMPLEX_WEIGHT,
                r"\b(?:gradient\s+descent|backprop(?:agation)?|transformers?|attention\s+mechanism|embeddings?|fine[\s-]?tun(?:e|ing)|overfitting|regularization|kubernetes|k8s|terraform|microservices?|distributed\s+systems?|load\s+balanc(?:er|ing)|sharding|consensus|throughput|race\s+condition)\b",
            ),
            Rule::heuristic("word_count_over_100", 0.3, over_100_words),
            Rule::heuristic("word_count_over_50", 0.15, over_50_words),
            Rule::heuristic("code_block", 0.3, has_code_block),
            Rule::heuristic("multiple_questions", 0.2, has_multiple_questions),
            Rule::pattern("numbered_list", 0.15, r"(?m)^\s*\d+[.)]\s+\S"),
        ],
    },
    Stage {
        name: "simple_pattern",
        decision: Decision::FirstMatch {
            intent: IntentComplexity::Simple,
            confidence: 0.8,
            reason: "simple lookup pattern",
        },
        rules: &[
            Rule::pattern(
                "what_is",
                1.0,
                r"^(?:what|who)(?:\s+is|\s+are|\s+was|'s|’s)\s+\S",
            ),
            Rule::pattern("define", 1.0, r"\b(?:define|definition\s+of|meaning\s+of)\b"),
            Rule::pattern("how_does_work", 1.0, r"\bhow\s+does\b.{0,60}?\bwork\b"),
            Rule::pattern(
                "time_date",
                1.0,
                r"\bwhat\s+(?:time|day|date)\b|\b(?:today'?s|current)\s+(?:date|time)\b|\bwhat'?s\s+the\s+(?:time|date)\b",
            ),
            Rule::pattern(
                "reminder",
                1.0,
                r"\bremind\s+me\b|\bset\s+(?:a|an)\s+(?:reminder|alarm|timer)\b",
            ),
            Rule::pattern("translate_convert", 1.0, r"\b(?:translate|convert)\b"),
        ],
    },
    Stage {
        name: "short_low_complexity",
        decision: Decision::FirstMatch {
            intent: IntentComplexity::Simple,
            confidence: 0.7,
            reason: "short message without complexity signals",
        },
        rules: &[Rule::heuristic("short_and_plain", 1.0, is_short_and_plain)],
    },
    Stage {
        name: "default",
        decision: Decision::FirstMatch {
            intent: IntentComplexity::Standard,
            confidence: 0.6,
            reason: "no decisive signals",
        },
        rules: &[Rule::heuristic("default", 1.0, always)],
    },
];

/// Compiled patterns keyed by rule name. Patterns that fail to compile are
/// logged and left out, which makes their rule never match.
static COMPILED: LazyLock<HashMap<&'static str, Regex>> = LazyLock::new(|| {
    let mut compiled = HashMap::new();
    for rule in STAGES.iter().flat_map(|s| s.rules) {
        if let Test::Pattern(source) = rule.test {
            match Regex::new(source) {
                Ok(re) => {
                    compiled.insert(rule.name, re);
                }
                Err(e) => warn!(rule = rule.name, error = %e, "classifier pattern failed to compile"),
            }
        }
    }
    compiled
});

impl Stage {
    fn evaluate(&self, features: &Features<'_>, fold: &mut Fold) -> Option<Verdict> {
        match self.decision {
            Decision::FirstMatch {
                intent,
                confidence,
                reason,
            } => {
                for rule in self.rules {
                    let matched = rule.matches(features, fold);
                    fold.signals.push(ClassificationSignal {
                        name: rule.name,
                        weight: rule.weight,
                        matched,
                    });
                    if matched {
                        return Some((intent, confidence, reason));
                    }
                }
                None
            }
            Decision::Accumulate {
                verdict,
                records_complex_score,
            } => {
                let mut score = 0.0_f32;
                for rule in self.rules {
                    let matched = rule.matches(features, fold);
                    if matched {
                        score += rule.weight;
                    }
                    fold.signals.push(ClassificationSignal {
                        name: rule.name,
                        weight: rule.weight,
                        matched,
                    });
                }
                if records_complex_score {
                    fold.complex_score = score;
                }
                verdict(score)
            }
        }
    }
}

/// Verdict used if the table ever ends without a decision.
const FALLBACK_VERDICT: Verdict = (IntentComplexity::Standard, 0.6, "no decisive signals");

/// Classify a message's intent complexity.
///
/// Pure, deterministic and total: any input, including empty or pathological
/// text, yields a result with confidence in `[0, 1]` and a non-empty reason.
pub fn classify(message: &str) -> ClassificationResult {
    let features = Features::new(message);

    let outcome = STAGES.iter().try_fold(Fold::default(), |mut fold, stage| {
        match stage.evaluate(&features, &mut fold) {
            Some(verdict) => ControlFlow::Break((verdict, fold)),
            None => ControlFlow::Continue(fold),
        }
    });

    let ((intent, confidence, reason), fold) = match outcome {
        ControlFlow::Break(decided) => decided,
        ControlFlow::Continue(fold) => (FALLBACK_VERDICT, fold),
    };

    ClassificationResult {
        intent,
        confidence: confidence.clamp(0.0, 1.0),
        reason,
        signals: fold.signals,
    }
}

/// Stage names in evaluation order.
pub fn stage_names() -> Vec<&'static str> {
    STAGES.iter().map(|s| s.name).collect()
}

/// Rule names and kinds for a stage, in evaluation order.
pub fn stage_rules(stage: &str) -> Vec<(&'static str, RuleKind)> {
    STAGES
        .iter()
        .find(|s| s.name == stage)
        .map(|s| s.rules.iter().map(|r| (r.name, r.kind())).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn matched_names(result: &ClassificationResult) -> Vec<&'static str> {
        result
            .signals
            .iter()
            .filter(|s| s.matched)
            .map(|s| s.name)
            .collect()
    }

    #[test]
    fn stage_order_is_fixed() {
        assert_eq!(
            stage_names(),
            vec![
                "empty",
                "explicit_model",
                "trivial_pattern",
                "short_message",
                "flagship",
                "complex",
                "simple_pattern",
                "short_low_complexity",
                "default",
            ]
        );
    }

    #[test]
    fn rule_names_are_unique() {
        let mut seen = HashSet::new();
        for rule in STAGES.iter().flat_map(|s| s.rules) {
            assert!(seen.insert(rule.name), "duplicate rule name {}", rule.name);
        }
    }

    #[test]
    fn every_pattern_compiles() {
        let patterns = STAGES
            .iter()
            .flat_map(|s| s.rules)
            .filter(|r| r.kind() == RuleKind::Pattern)
            .count();
        assert_eq!(COMPILED.len(), patterns);
    }

    #[test]
    fn stage_rules_reports_kinds() {
        let rules = stage_rules("complex");
        assert!(rules.contains(&("refactor", RuleKind::Pattern)));
        assert!(rules.contains(&("code_block", RuleKind::Heuristic)));
        assert!(stage_rules("nope").is_empty());
    }

    #[test]
    fn empty_message_is_trivial() {
        for msg in ["", "   ", "\n\t"] {
            let r = classify(msg);
            assert_eq!(r.intent, IntentComplexity::Trivial);
            assert_eq!(r.confidence, 1.0);
            assert_eq!(r.signals.len(), 1);
            assert_eq!(r.signals[0].name, "empty");
        }
    }

    #[test]
    fn greetings_are_trivial() {
        for msg in ["hi", "Hello!", "hey there", "thanks", "Thank you so much!", "bye", "yes", "Nope."] {
            let r = classify(msg);
            assert_eq!(r.intent, IntentComplexity::Trivial, "{msg}");
            assert_eq!(r.confidence, 0.95, "{msg}");
        }
    }

    #[test]
    fn emoji_only_is_trivial() {
        for msg in [
            "👍",
            "🔥🔥🔥",
            "❤️ 🙏",
            "🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉",
            "1\u{FE0F}\u{20E3}2\u{FE0F}\u{20E3}3\u{FE0F}\u{20E3}4\u{FE0F}\u{20E3}5\u{FE0F}\u{20E3}",
            "#\u{FE0F}\u{20E3} 7\u{20E3} 🔟",
        ] {
            let r = classify(msg);
            assert_eq!(r.intent, IntentComplexity::Trivial, "{msg}");
            assert!(matched_names(&r).contains(&"emoji_only"), "{msg}");
        }
    }

    #[test]
    fn bare_digits_are_not_keycaps() {
        let r = classify("12345 🎉 67890");
        assert!(!matched_names(&r).contains(&"emoji_only"));
    }

    #[test]
    fn slash_model_command_is_explicit() {
        let r = classify("/model opus");
        assert_eq!(r.intent, IntentComplexity::Explicit);
        assert_eq!(r.confidence, 1.0);
        assert_eq!(matched_names(&r), vec!["slash_model_command"]);

        assert_eq!(classify("/opus review this").intent, IntentComplexity::Explicit);
        assert_eq!(
            classify("Please switch to Sonnet for the rest of this").intent,
            IntentComplexity::Explicit
        );
        assert_eq!(
            classify("can you use gpt-4o for this one").intent,
            IntentComplexity::Explicit
        );
    }

    #[test]
    fn model_names_in_prose_are_not_explicit() {
        for msg in [
            "switch to haiku format for the poem",
            "how do I use gpt-4 with python",
            "what happens when you switch to llama.cpp on a laptop?",
            "I read that teams use claude for code review",
        ] {
            assert_ne!(classify(msg).intent, IntentComplexity::Explicit, "{msg}");
        }
    }

    #[test]
    fn polite_model_requests_are_explicit() {
        for msg in [
            "use opus",
            "Okay, switch to haiku.",
            "could you please use sonnet instead",
            "let's switch over to gemini-2.5-pro from now on",
        ] {
            let r = classify(msg);
            assert_eq!(r.intent, IntentComplexity::Explicit, "{msg}");
            assert_eq!(matched_names(&r), vec!["use_named_model"], "{msg}");
        }
    }

    #[test]
    fn use_without_model_name_is_not_explicit() {
        let r = classify("should I use a hashmap or a btreemap here");
        assert_ne!(r.intent, IntentComplexity::Explicit);
    }

    #[test]
    fn short_statement_is_trivial() {
        let r = classify("ok cool");
        assert_eq!(r.intent, IntentComplexity::Trivial);
        assert_eq!(r.confidence, 0.8);
        assert_eq!(r.signals.last().map(|s| s.name), Some("short_statement"));
    }

    #[test]
    fn short_question_is_not_trivial() {
        let r = classify("why?");
        assert_eq!(r.intent, IntentComplexity::Simple);
        assert_eq!(r.confidence, 0.7);
    }

    #[test]
    fn flagship_request() {
        let r = classify(
            "let's do a full system design mock interview for a recommendation system from scratch",
        );
        assert_eq!(r.intent, IntentComplexity::Flagship);
        assert_eq!(r.confidence, 0.95);
        let matched = matched_names(&r);
        assert!(matched.contains(&"mock_interview"));
        assert!(matched.contains(&"full_system_design"));
        assert!(matched.contains(&"design_from_scratch"));
        // The complex stage is never reached.
        assert!(r.signals.iter().all(|s| s.name != "system_design"));
    }

    #[test]
    fn single_flagship_keyword_confidence() {
        let r = classify("can we do a deep dive on how postgres handles vacuum");
        assert_eq!(r.intent, IntentComplexity::Flagship);
        // 0.6 + 0.4 is capped at 0.95.
        assert_eq!(r.confidence, 0.95);
        assert_eq!(matched_names(&r), vec!["deep_dive"]);
    }

    #[test]
    fn complex_keywords_accumulate() {
        let r = classify("Can you do a code review of my refactor and walk me through the trade-offs?");
        assert_eq!(r.intent, IntentComplexity::Complex);
        assert!((r.confidence - 0.8).abs() < 1e-5);
    }

    #[test]
    fn single_complex_keyword_is_not_enough() {
        let r = classify("please refactor this function name to something clearer for readers");
        assert_ne!(r.intent, IntentComplexity::Complex);
    }

    #[test]
    fn code_block_is_complex() {
        let r = classify(
            "can you fix this?\n```\nfn main() {\n    let v: Vec<u32> = Vec::new();\n    println!(\"{}\", v[0]);\n}\n```",
        );
        assert_eq!(r.intent, IntentComplexity::Complex);
        let matched = matched_names(&r);
        assert!(matched.contains(&"code_block"));
        assert!(matched.contains(&"long_code_fence"));
    }

    #[test]
    fn simple_patterns() {
        for msg in [
            "what is SGD?",
            "define entropy",
            "how does a bloom filter work?",
            "what time is it in Tokyo?",
            "remind me to call mom at 5",
            "translate good morning to French",
        ] {
            let r = classify(msg);
            assert_eq!(r.intent, IntentComplexity::Simple, "{msg}");
            assert_eq!(r.confidence, 0.8, "{msg}");
        }
    }

    #[test]
    fn trace_stops_at_deciding_rule() {
        let r = classify("what is SGD?");
        let last = r.signals.last().expect("signals");
        assert_eq!(last.name, "what_is");
        assert!(last.matched);
        assert!(r.signals.iter().all(|s| s.name != "short_and_plain"));
        assert!(r.signals.iter().all(|s| s.name != "default"));
        assert_eq!(r.signals[0].name, "empty");
    }

    #[test]
    fn long_plain_message_is_standard() {
        let r = classify(
            "I'd like to talk about my weekend plans with my family and see what you think about them overall",
        );
        assert_eq!(r.intent, IntentComplexity::Standard);
        assert_eq!(r.confidence, 0.6);
        assert_eq!(r.signals.last().map(|s| s.name), Some("default"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify("HELLO").intent, IntentComplexity::Trivial);
        assert_eq!(
            classify("WHAT IS a monad").intent,
            IntentComplexity::Simple
        );
    }

    #[test]
    fn intent_display() {
        assert_eq!(IntentComplexity::Trivial.to_string(), "trivial");
        assert_eq!(IntentComplexity::Flagship.to_string(), "flagship");
        assert_eq!(IntentComplexity::Explicit.to_string(), "explicit");
    }
}
