//! Discovery prompts per focus area
//!
//! A prompt file `<prompts_dir>/<file>` with a `## User Prompt` section
//! overrides the built-in template for its focus area.

use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::models::FocusArea;

lazy_static! {
    static ref USER_PROMPT_SECTION: Regex =
        Regex::new(r"(?is)##\s*User Prompt\s*\n(.*)").expect("valid user prompt regex");
}

/// Evaluation profile of a focus area
#[derive(Debug, Clone, Copy)]
pub struct FocusAreaProfile {
    pub area: FocusArea,
    pub name: &'static str,
    pub evaluation_criteria: &'static str,
    pub prompt_file: &'static str,
}

impl FocusAreaProfile {
    /// Profile for a focus area
    pub fn for_area(area: FocusArea) -> Self {
        match area {
            FocusArea::VoiceAiUx => Self {
                area,
                name: area.display_name(),
                evaluation_criteria: "\
- Latency benchmarks (target: sub-200ms voice-to-voice)
- Interruption handling and VAD (Voice Activity Detection) implementation
- WebRTC/streaming architecture details
- SDK availability and async streaming support
",
                prompt_file: "voice_ai_prompt.md",
            },
            FocusArea::AgentOrchestration => Self {
                area,
                name: area.display_name(),
                evaluation_criteria: "\
- BKG/Knowledge Graph integration capabilities
- Tool chaining patterns and workflow composition
- State persistence and checkpoint/recovery mechanisms
- Human-in-the-loop specifications
",
                prompt_file: "agent_orchestration_prompt.md",
            },
            FocusArea::DurableRuntime => Self {
                area,
                name: area.display_name(),
                evaluation_criteria: "\
- Durability guarantees and SLAs
- Cold-start benchmarks (target: <100ms)
- Checkpoint/recovery specifications
- Fault tolerance and automatic retry mechanisms
",
                prompt_file: "durable_runtime_prompt.md",
            },
        }
    }

    /// Profiles for every known focus area in radar order
    pub fn all() -> Vec<Self> {
        FocusArea::all().into_iter().map(Self::for_area).collect()
    }

    /// Location of the external prompt file
    pub fn prompt_path(&self, prompts_dir: &Path) -> PathBuf {
        prompts_dir.join(self.prompt_file)
    }

    /// Built-in discovery prompt
    pub fn discovery_prompt(&self) -> String {
        let focus_area = self.area.as_str();
        let focus_area_name = self.name;
        let evaluation_criteria = self.evaluation_criteria;

        format!(
            r#"Using your real-time knowledge of X/Twitter discussions and tech news from the past 7 days,
SEARCH for and ANALYZE tools related to {focus_area}.

STEP 1 - DISCOVER:
Search your knowledge for tools being discussed in the {focus_area_name} space.
Look for announcements, releases, technical discussions, and trending topics.

STEP 2 - CLASSIFY each discovered tool as SIGNAL or NOISE:

SIGNAL criteria (worth evaluating):
- Has published benchmarks or performance data
- Shows production usage or real case studies
- Provides specific technical architecture details
- Has active technical community discussion

NOISE criteria (skip):
- Uses marketing language without substance
- No benchmarks or only vague claims
- Pre-announcement hype or vaporware
- Engagement farming without technical depth

For {focus_area_name}, specifically evaluate:
{evaluation_criteria}

Return a JSON array with 2-4 tools (mix of signal and noise). Format:
[
  {{
    "tool_name": "string",
    "classification": "signal" or "noise",
    "confidence_score": 1-100,
    "technical_insight": "specific technical details you found",
    "signal_evidence": ["evidence1", "evidence2"],
    "noise_indicators": ["indicator1", "indicator2"],
    "architectural_verdict": true or false
  }}
]

IMPORTANT: Return ONLY the JSON array, no other text."#
        )
    }
}

/// Extract the `## User Prompt` section of a prompt document
pub fn extract_user_prompt(content: &str) -> Option<String> {
    USER_PROMPT_SECTION
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|prompt| !prompt.is_empty())
}

/// Load the external prompt for a profile, if one is usable
pub fn load_external_prompt(profile: &FocusAreaProfile, prompts_dir: &Path) -> Option<String> {
    let path = profile.prompt_path(prompts_dir);

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Prompt file not found");
            return None;
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read prompt file");
            return None;
        }
    };

    let prompt = extract_user_prompt(&content);
    match &prompt {
        Some(prompt) => debug!(
            focus_area = profile.area.as_str(),
            chars = prompt.len(),
            "Loaded external prompt"
        ),
        None => warn!(path = %path.display(), "No '## User Prompt' section in prompt file"),
    }
    prompt
}

/// Prompt for a focus area: the external file if present, else the template
pub fn build_prompt(profile: &FocusAreaProfile, prompts_dir: &Path) -> String {
    match load_external_prompt(profile, prompts_dir) {
        Some(prompt) => {
            info!(focus_area = profile.area.as_str(), "Using external prompt");
            prompt
        }
        None => {
            info!(focus_area = profile.area.as_str(), "Using inline template");
            profile.discovery_prompt()
        }
    }
}
