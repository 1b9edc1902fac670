//! Sample radar used for local development and demos

use anyhow::Result;

use super::TrendRepository;
use crate::models::{Classification, Trend};

/// Radar date of the sample data
pub const SEED_DATE: &str = "2026-01-30";

const SEED_TIMESTAMP: &str = "2026-01-30T08:00:00Z";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The six sample trends, one signal and one noise per focus area
pub fn seed_trends() -> Vec<Trend> {
    vec![
        Trend {
            focus_area: "voice_ai_ux".to_string(),
            tool_name: "LiveKit Agents".to_string(),
            classification: Classification::Signal,
            confidence_score: 92,
            technical_insight: "Sub-200ms voice-to-voice latency with WebRTC. Supports interruption \
                handling via VAD (Voice Activity Detection). Native Python SDK with async \
                streaming. Published benchmarks show P95 latency <250ms."
                .to_string(),
            signal_evidence: strings(&[
                "Published latency benchmarks",
                "Production usage at scale (Daily.co integration)",
                "Open-source with active technical community",
            ]),
            noise_indicators: vec![],
            architectural_verdict: true,
            timestamp: SEED_TIMESTAMP.to_string(),
        },
        Trend {
            focus_area: "voice_ai_ux".to_string(),
            tool_name: "VoiceHype AI".to_string(),
            classification: Classification::Noise,
            confidence_score: 85,
            technical_insight: "Claims 'revolutionary conversational AI' but provides no latency \
                benchmarks. Demo video only, no SDK or architecture documentation available."
                .to_string(),
            signal_evidence: vec![],
            noise_indicators: strings(&[
                "No published benchmarks",
                "Marketing language ('revolutionary', 'human-like')",
                "Demo-only, no production evidence",
            ]),
            architectural_verdict: false,
            timestamp: SEED_TIMESTAMP.to_string(),
        },
        Trend {
            focus_area: "agent_orchestration".to_string(),
            tool_name: "LangGraph".to_string(),
            classification: Classification::Signal,
            confidence_score: 87,
            technical_insight: "Graph-based agent orchestration with built-in state persistence. \
                Supports cyclic workflows and human-in-the-loop patterns. Native integration with \
                LangChain tools. Checkpoint API enables workflow recovery."
                .to_string(),
            signal_evidence: strings(&[
                "Detailed architecture documentation",
                "Production case studies (multiple enterprises)",
                "Active GitHub with technical discussions",
            ]),
            noise_indicators: vec![],
            architectural_verdict: true,
            timestamp: SEED_TIMESTAMP.to_string(),
        },
        Trend {
            focus_area: "agent_orchestration".to_string(),
            tool_name: "AutoAgent Pro".to_string(),
            classification: Classification::Noise,
            confidence_score: 78,
            technical_insight: "Promises 'fully autonomous agents' but lacks integration \
                documentation. Roadmap-heavy announcements without shipping history."
                .to_string(),
            signal_evidence: vec![],
            noise_indicators: strings(&[
                "AGI-adjacent marketing claims",
                "No integration specifications",
                "Roadmap announcements without releases",
            ]),
            architectural_verdict: false,
            timestamp: SEED_TIMESTAMP.to_string(),
        },
        Trend {
            focus_area: "durable_runtime".to_string(),
            tool_name: "Temporal.io".to_string(),
            classification: Classification::Signal,
            confidence_score: 94,
            technical_insight: "Workflow durability with automatic retries and state recovery. \
                Cold-start ~50ms for cached workers. Supports long-running workflows (days/weeks) \
                with checkpoint persistence. Published SLAs for cloud offering."
                .to_string(),
            signal_evidence: strings(&[
                "Published cold-start benchmarks",
                "SLA documentation for durability guarantees",
                "Enterprise production usage (Netflix, Snap)",
            ]),
            noise_indicators: vec![],
            architectural_verdict: true,
            timestamp: SEED_TIMESTAMP.to_string(),
        },
        Trend {
            focus_area: "durable_runtime".to_string(),
            tool_name: "InfiniScale Runtime".to_string(),
            classification: Classification::Noise,
            confidence_score: 81,
            technical_insight: "Claims 'infinite scale with zero cold starts' but provides no \
                benchmark data. Private beta with waitlist, no architecture documentation."
                .to_string(),
            signal_evidence: vec![],
            noise_indicators: strings(&[
                "Impossible claims ('zero cold starts')",
                "No published benchmarks",
                "Waitlist-only, no technical docs",
            ]),
            architectural_verdict: false,
            timestamp: SEED_TIMESTAMP.to_string(),
        },
    ]
}

/// Insert the sample radar, skipping trends that already exist
///
/// Returns the number of trends inserted.
pub fn seed(repo: &dyn TrendRepository) -> Result<usize> {
    let mut inserted = 0;
    for trend in seed_trends() {
        if repo.insert(SEED_DATE, &trend)? {
            inserted += 1;
        }
    }

    tracing::info!(inserted, radar_date = SEED_DATE, "Seed data applied");
    Ok(inserted)
}
