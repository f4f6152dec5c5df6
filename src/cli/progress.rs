// src/cli/progress.rs — Terminal progress renderer for the refine loop

use crate::core::types::ProgressEvent;

/// Build a progress callback that writes formatted output to stderr.
///
/// All progress output goes to stderr so stdout remains clean for the essay.
/// Returns a closure suitable for `Orchestrator::with_progress()`.
pub fn terminal_progress() -> impl Fn(ProgressEvent) + Send + Sync + 'static {
    move |event| eprintln!("{}", format_event(&event))
}

/// One line of progress text per event.
pub fn format_event(event: &ProgressEvent) -> String {
    match event {
        ProgressEvent::CycleStart {
            cycle,
            iteration_count,
            max_iterations,
        } => format!(
            "[cycle {}] scoring (revisions {}/{})",
            cycle, iteration_count, max_iterations
        ),
        ProgressEvent::DimensionScored {
            dimension,
            score,
            elapsed_ms,
        } => format!("  {:<9} {:>4.1}  ({}ms)", dimension.as_str(), score, elapsed_ms),
        ProgressEvent::Aggregated {
            avg_score,
            threshold,
        } => format!(
            "  average   {:>4.2}  (threshold {})",
            avg_score,
            format_threshold(*threshold)
        ),
        ProgressEvent::Decision { decision } => format!("[gate] {}", decision),
        ProgressEvent::Revised {
            iteration_count,
            essay_chars,
        } => format!(
            "[revise] draft {} ready ({} chars)",
            iteration_count, essay_chars
        ),
        ProgressEvent::Complete {
            avg_score,
            iteration_count,
            tokens_used,
        } => format!(
            "[done] score={:.2} revisions={} tokens={}",
            avg_score, iteration_count, tokens_used
        ),
    }
}

/// Render a threshold, showing `none` for the unbounded free tier.
pub fn format_threshold(threshold: f64) -> String {
    if threshold.is_finite() {
        format!("{:.1}", threshold)
    } else {
        "none".to_string()
    }
}
