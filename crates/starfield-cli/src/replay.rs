//! Fixed-rate headless replay of a timed input script

use anyhow::{bail, Result};
use serde::Serialize;
use starfield_core::{SelectionOutcome, Universe, UniverseView};
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info};

use crate::script::{ScriptAction, ScriptEvent};

/// Frame clock and output cadence
#[derive(Debug, Clone, Copy)]
pub struct ReplayOptions {
    pub fps: u32,
    /// Emit every nth frame; frames with input or a clear are always emitted
    pub every: u64,
}

impl ReplayOptions {
    pub fn frame_duration(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.fps))
    }
}

/// One JSON line of replay output
#[derive(Debug, Serialize)]
pub struct ReplayLine {
    pub frame: u64,
    pub t_ms: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleared: Option<String>,
    #[serde(flatten)]
    pub view: UniverseView,
}

#[derive(Debug, Default, PartialEq)]
pub struct ReplaySummary {
    pub frames: u64,
    pub lines: u64,
    pub accepted: u64,
    pub ignored: u64,
}

/// Drive `universe` frame by frame until the script is exhausted and no
/// flight holds input. Each frame applies due input, then advances the
/// clock, mirroring the scene's frame order.
pub fn run(
    universe: &mut Universe,
    events: &[ScriptEvent],
    options: ReplayOptions,
    out: &mut impl Write,
) -> Result<ReplaySummary> {
    if options.fps == 0 {
        bail!("--fps must be at least 1");
    }
    let every = options.every.max(1);
    let step = options.frame_duration();

    let mut summary = ReplaySummary::default();
    let mut now = Duration::ZERO;
    let mut next = 0;

    info!(events = events.len(), fps = options.fps, "Starting replay");

    loop {
        let mut inputs = Vec::new();
        while let Some(event) = events.get(next) {
            if Duration::from_millis(event.at_ms) > now {
                break;
            }
            inputs.push(apply(universe, &event.action, &mut summary));
            next += 1;
        }

        let cleared = universe.tick(step).map(|reason| format!("{:?}", reason));
        now += step;
        summary.frames += 1;

        if !inputs.is_empty() || cleared.is_some() || summary.frames % every == 0 {
            let line = ReplayLine {
                frame: summary.frames,
                t_ms: now.as_millis() as u64,
                inputs,
                cleared,
                view: universe.view(),
            };
            serde_json::to_writer(&mut *out, &line)?;
            writeln!(out)?;
            summary.lines += 1;
        }

        if next >= events.len() && !universe.is_animating() {
            break;
        }
    }

    info!(
        frames = summary.frames,
        accepted = summary.accepted,
        ignored = summary.ignored,
        "Replay finished"
    );
    Ok(summary)
}

fn apply(universe: &mut Universe, action: &ScriptAction, summary: &mut ReplaySummary) -> String {
    let outcome = match *action {
        ScriptAction::Search { index } => universe.select_via_search(index),
        ScriptAction::Click { index } => universe.select_via_click(index),
        ScriptAction::Cancel => {
            universe.cancel();
            return "cancel".to_string();
        }
        ScriptAction::Communities { ref communities } => {
            universe.replace_communities(communities);
            return format!("communities({})", communities.len());
        }
    };

    if let SelectionOutcome::Ignored(reason) = outcome {
        debug!(?action, ?reason, "Scripted selection ignored");
        summary.ignored += 1;
    } else {
        summary.accepted += 1;
    }
    format!("{}: {:?}", action.label(), outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_script;
    use starfield_core::{CommunityRecord, UniverseConfig, UniverseKind};

    fn universe(n: usize) -> Universe {
        let mut universe = Universe::new(UniverseKind::Home, UniverseConfig::default());
        let records: Vec<_> = (0..n)
            .map(|i| CommunityRecord::new(i.to_string(), format!("Community {}", i)))
            .collect();
        universe.replace_communities(&records);
        universe
    }

    fn lines(out: &[u8]) -> Vec<serde_json::Value> {
        String::from_utf8_lossy(out)
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_search_replay_releases_input_at_spin_end() {
        let mut universe = universe(4);
        let events = parse_script(r#"[{"at_ms": 0, "action": "search", "index": 3}]"#).unwrap();
        let mut out = Vec::new();

        let options = ReplayOptions { fps: 100, every: 1000 };
        let summary = run(&mut universe, &events, options, &mut out).unwrap();

        assert_eq!(summary.accepted, 1);
        assert_eq!(summary.frames, 370);

        let lines = lines(&out);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["selected_index"], 3);
        assert_eq!(lines[0]["is_animating"], true);
        assert_eq!(lines[1]["t_ms"], 3700);
        assert_eq!(lines[1]["is_animating"], false);
        assert!(lines[1]["cleared"].is_string());
    }

    #[test]
    fn test_input_during_flight_is_ignored() {
        let mut universe = universe(4);
        let events = parse_script(
            r#"[
                {"at_ms": 0, "action": "click", "index": 1},
                {"at_ms": 300, "action": "click", "index": 2},
                {"at_ms": 2000, "action": "click", "index": 1}
            ]"#,
        )
        .unwrap();
        let mut out = Vec::new();

        let options = ReplayOptions { fps: 100, every: 50 };
        let summary = run(&mut universe, &events, options, &mut out).unwrap();

        // The second click lands mid-flight, the third toggles off
        assert_eq!(summary.accepted, 2);
        assert_eq!(summary.ignored, 1);
        assert_eq!(universe.view().selected_index, None);
    }

    #[test]
    fn test_refresh_and_cancel_from_script() {
        let mut universe = universe(5);
        let events = parse_script(
            r#"[
                {"at_ms": 0, "action": "click", "index": 4},
                {"at_ms": 1500, "action": "communities", "communities": [{"id": 1, "name": "One"}]},
                {"at_ms": 1600, "action": "search", "index": 0},
                {"at_ms": 1700, "action": "cancel"}
            ]"#,
        )
        .unwrap();
        let mut out = Vec::new();

        let options = ReplayOptions { fps: 100, every: 1000 };
        run(&mut universe, &events, options, &mut out).unwrap();

        let lines = lines(&out);
        let refreshed = lines
            .iter()
            .find(|line| line["inputs"][0] == "communities(1)")
            .unwrap();
        assert_eq!(refreshed["selected_index"], serde_json::Value::Null);

        let last = lines.last().unwrap();
        assert_eq!(last["inputs"][0], "cancel");
        assert_eq!(last["is_animating"], false);
        assert_eq!(last["selected_index"], serde_json::Value::Null);
    }

    #[test]
    fn test_zero_fps_is_rejected() {
        let mut universe = universe(1);
        let options = ReplayOptions { fps: 0, every: 1 };
        assert!(run(&mut universe, &[], options, &mut Vec::new()).is_err());
    }
}
