//! Plain terminal rendering of controller state. Every function returns
//! lines; printing is left to the caller.

use geminizer::activity::{ActivityStatus, AgentActivityRecord};
use geminizer::config::Config;
use geminizer::dashboard::{DashboardView, HealthBand, PerformanceBand};
use geminizer::demo::{CommandCategory, DemoOutcome, ExpertExchange, ProfessionalPose};
use geminizer::gateway::types::{AgentDetails, ExpertReply, HistoryEntry, ProfessionalAnalysis};
use geminizer::generation::GenerationResult;
use geminizer::safety::{SafetySnapshot, SafetyStatus};
use geminizer::session::Session;
use geminizer::ui::style;

pub fn activity_line(record: &AgentActivityRecord) -> String {
    let marker = match record.status {
        ActivityStatus::Completed => style::success("✓"),
        ActivityStatus::Pending => style::dim("…"),
    };
    format!(
        "  {marker} {} {} {}",
        style::accent(&record.display_name),
        style::dim(&record.role_description),
        style::dim(record.timestamp.format("%H:%M:%S")),
    )
}

pub fn safety(snapshot: &SafetySnapshot) -> Vec<String> {
    let mut lines = Vec::new();
    match snapshot.status {
        SafetyStatus::Idle => lines.push(style::dim("Nothing to screen.")),
        SafetyStatus::Checking => lines.push(style::dim("Checking...")),
        SafetyStatus::Safe => lines.push(style::success("✓ Prompt passed safety screening")),
        SafetyStatus::Unsafe => {
            lines.push(style::warning("⚠ Prompt flagged by safety screening"));
            for issue in &snapshot.issues {
                lines.push(format!("  - {}", style::warning(issue)));
            }
            if !snapshot.recovery_suggestions.is_empty() {
                lines.push(style::label("Suggestions:"));
                for suggestion in &snapshot.recovery_suggestions {
                    lines.push(format!("  → {suggestion}"));
                }
            }
        }
        SafetyStatus::Error => lines.push(style::failure(format!(
            "Safety check failed: {}",
            snapshot.error.as_deref().unwrap_or("unknown error")
        ))),
    }
    lines
}

pub fn generation(result: &GenerationResult) -> Vec<String> {
    vec![
        style::header("Generation complete"),
        format!("  {} {}", style::label("Request:"), style::value(&result.request_id)),
        format!("  {} {} bytes", style::label("Image:  "), result.image_data.len()),
        format!("  {}", style::label("Enriched prompt:")),
        format!("    {}", result.enriched_prompt),
    ]
}

pub fn history(entries: &[HistoryEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec![style::dim("No past generations.")];
    }
    let mut lines = vec![style::header(format!("History ({})", entries.len()))];
    for entry in entries {
        lines.push(format!(
            "  {} {} {}",
            style::value(&entry.id),
            style::dim(entry.created_at.format("%Y-%m-%d %H:%M")),
            entry.prompt
        ));
        if !entry.options.is_empty() {
            let options: Vec<String> = entry
                .options
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect();
            lines.push(format!("      {}", style::dim(options.join(", "))));
        }
    }
    lines
}

pub fn demo(outcome: &DemoOutcome) -> Vec<String> {
    let mut lines = vec![style::header("Live AI demonstration")];
    lines.extend(outcome.activity.iter().map(activity_line));
    match &outcome.sample {
        Ok(sample) => {
            lines.push(String::new());
            lines.push(format!("  {} {}", style::label("Input:   "), sample.original_input));
            lines.push(format!("  {} {}", style::label("Enhanced:"), sample.enhanced_prompt));
            lines.push(format!(
                "  {} {} ({:+}% vs baseline)",
                style::label("Quality: "),
                style::score(sample.quality_score),
                sample.quality_uplift_percent()
            ));
            if let Some(agents) = sample.agents_used {
                lines.push(format!("  {} {agents}", style::label("Agents:  ")));
            }
            if let Some(time) = &sample.processing_time {
                lines.push(format!("  {} {time}", style::label("Time:    ")));
            }
            for improvement in &sample.improvements {
                lines.push(format!("  {} {improvement}", style::success("+")));
            }
        }
        Err(err) => lines.push(style::failure(format!("Demo sample unavailable: {err}"))),
    }
    lines
}

pub fn poses(poses: &[ProfessionalPose]) -> Vec<String> {
    let mut lines = vec![style::header("Professional poses")];
    for pose in poses {
        lines.push(format!(
            "  {} {}",
            style::accent(pose.key),
            style::value(pose.name)
        ));
        lines.push(format!("      {}", style::dim(pose.description)));
    }
    lines
}

pub fn analysis(result: &ProfessionalAnalysis) -> Vec<String> {
    let detail = &result.analysis;
    let mut lines = vec![
        style::header("Professional analysis"),
        format!("  {} {}", style::label("Quality:"), style::score(detail.quality_score)),
        format!(
            "  {} {}",
            style::label("Pose:   "),
            detail.detected_pose.as_deref().unwrap_or("Custom Pose")
        ),
    ];
    for improvement in &detail.improvements {
        lines.push(format!("  {} {improvement}", style::success("+")));
    }
    lines.push(format!("  {}", style::label("Enhanced prompt:")));
    lines.push(format!("    {}", result.enhanced_prompt));
    lines
}

pub fn expert(reply: &ExpertReply, recent: &[ExpertExchange]) -> Vec<String> {
    let mut lines = vec![reply.message.clone()];
    if !reply.suggestions.is_empty() {
        lines.push(style::label("Suggestions:"));
        for suggestion in &reply.suggestions {
            lines.push(format!("  → {suggestion}"));
        }
    }
    if let Some(last) = recent.last() {
        lines.push(style::dim(format!(
            "sent \"{}\" at {}",
            last.command,
            last.timestamp.format("%H:%M:%S")
        )));
    }
    lines
}

pub fn command_library() -> Vec<String> {
    let mut lines = Vec::new();
    for category in CommandCategory::ALL {
        lines.push(style::header(category));
        for command in category.commands() {
            lines.push(format!("  {command}"));
        }
    }
    lines
}

pub fn status(view: &DashboardView) -> Vec<String> {
    let Some(status) = &view.status else {
        return vec![style::failure(format!(
            "AI status unavailable: {}",
            view.last_error.as_deref().unwrap_or("no data yet")
        ))];
    };

    let mut lines = vec![
        style::header("AI system status"),
        format!(
            "  {} {} ({})",
            style::label("Health:     "),
            style::score(status.overall_health),
            HealthBand::classify(status.overall_health)
        ),
        format!(
            "  {} {} ({})",
            style::label("Performance:"),
            style::score(status.average_performance),
            PerformanceBand::classify(status.average_performance)
        ),
        format!("  {} {}", style::label("Load:       "), style::score(status.system_load)),
        format!(
            "  {} {}/{}",
            style::label("Agents:     "),
            status.agents_used,
            status.total_agents
        ),
    ];
    if let Some(uptime) = &status.uptime {
        lines.push(format!("  {} {uptime}", style::label("Uptime:     ")));
    }
    for (id, agent) in &status.agents {
        let activity = if agent.is_active {
            style::success("active")
        } else {
            style::dim("idle")
        };
        lines.push(format!(
            "  {} {} {} health {} perf {}",
            style::accent(id),
            agent.name,
            activity,
            style::score(agent.health),
            style::score(agent.performance)
        ));
    }
    if let Some(error) = &view.last_error {
        lines.push(style::warning(format!("Last poll failed: {error}")));
    }
    lines
}

pub fn agent(id: &str, details: &AgentDetails) -> Vec<String> {
    let mut lines = vec![style::header(format!("Agent {id}"))];
    for (key, value) in &details.agent {
        let rendered = value
            .as_str()
            .map_or_else(|| value.to_string(), ToString::to_string);
        lines.push(format!("  {} {rendered}", style::label(format!("{key}:"))));
    }
    if let Some(timestamp) = details.timestamp {
        lines.push(style::dim(format!("as of {}", timestamp.to_rfc3339())));
    }
    lines
}

pub fn session(session: Option<&Session>) -> Vec<String> {
    match session {
        Some(session) => {
            let name = session
                .identity
                .display_name
                .as_deref()
                .unwrap_or(&session.identity.username);
            vec![format!(
                "Signed in as {} ({})",
                style::value(name),
                session.identity.username
            )]
        }
        None => vec![style::dim("Not signed in.")],
    }
}

pub fn config(config: &Config) -> Vec<String> {
    let mut lines = vec![
        style::header("Geminizer configuration"),
        format!("  {} {}", style::label("Config:   "), config.config_path.display()),
        format!("  {} {}", style::label("Service:  "), config.service.base_url),
        format!(
            "  {} {}s (connect {}s)",
            style::label("Timeout:  "),
            config.service.request_timeout_secs,
            config.service.connect_timeout_secs
        ),
        format!(
            "  {} {}ms debounce, gate {}",
            style::label("Safety:   "),
            config.safety.debounce_ms,
            if config.safety.gate_generation { "on" } else { "off" }
        ),
        format!(
            "  {} every {}s",
            style::label("Dashboard:"),
            config.dashboard.poll_interval_secs
        ),
        format!("  {} {}", style::label("Export:   "), config.export_dir().display()),
        format!("  {}", style::label("Default options:")),
    ];
    for (key, value) in &config.generation.default_options {
        lines.push(format!("    {key} = {value}"));
    }
    lines.push(format!("  {}", style::label("Activity stages:")));
    for stage in &config.activity.stages {
        lines.push(format!("    {:>6}ms {}", stage.offset_ms, stage.name));
    }
    lines
}
