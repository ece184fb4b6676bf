// Copyright 2026 Shoplens Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Scroll-driven show/hide for docked bars.
//!
//! The controller turns a stream of scroll offsets into a binary
//! visible/hidden signal: it ignores jitter below the noise threshold,
//! always shows the bar near the top of the list, flips on direction
//! changes, and recovers to visible once scrolling has been idle for the
//! configured timeout.
//!
//! Time is supplied by the caller as a [`Duration`] on a monotonic
//! timeline, so the controller runs the same under a UI event loop, a
//! recorded trace, or a unit test.

use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    Hidden,
}

impl Visibility {
    fn level(self) -> f32 {
        match self {
            Visibility::Visible => 1.0,
            Visibility::Hidden => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cause {
    Direction,
    NearTop,
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub at: Duration,
    pub offset: f64,
    pub from: Visibility,
    pub to: Visibility,
    pub cause: Cause,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollConfig {
    pub noise_threshold: f64,
    pub top_threshold: f64,
    pub idle_timeout: Duration,
    pub animation: Duration,
}

impl ScrollConfig {
    /// Bottom navigation bar on the feed screens.
    pub fn bottom_bar() -> Self {
        Self {
            noise_threshold: 5.0,
            top_threshold: 50.0,
            idle_timeout: Duration::from_millis(1000),
            animation: Duration::from_millis(200),
        }
    }

    /// Tab bar on the seller feed.
    pub fn tab_bar() -> Self {
        Self {
            idle_timeout: Duration::from_millis(1500),
            animation: Duration::from_millis(250),
            ..Self::bottom_bar()
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self::bottom_bar()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScrollStats {
    pub samples: usize,
    pub accepted: usize,
    pub ignored: usize,
    pub near_top: usize,
    pub idle_fired: usize,
}

/// Single-shot deadline. Arming replaces any pending deadline, so at most
/// one is ever outstanding.
#[derive(Debug, Clone, Copy, Default)]
struct IdleTimer {
    deadline: Option<Duration>,
}

impl IdleTimer {
    fn arm(&mut self, deadline: Duration) {
        self.deadline = Some(deadline);
    }

    fn cancel(&mut self) {
        self.deadline = None;
    }

    fn fire(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Animation {
    from: f32,
    to: f32,
    start: Duration,
}

impl Animation {
    fn settled(level: f32) -> Self {
        Self {
            from: level,
            to: level,
            start: Duration::ZERO,
        }
    }

    fn value_at(&self, now: Duration, length: Duration) -> f32 {
        if length.is_zero() {
            return self.to;
        }
        let elapsed = now.saturating_sub(self.start);
        let t = (elapsed.as_secs_f32() / length.as_secs_f32()).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }
}

#[derive(Debug)]
pub struct ScrollVisibilityController {
    config: ScrollConfig,
    visibility: Visibility,
    direction: Direction,
    last_offset: f64,
    last_seen: Duration,
    timer: IdleTimer,
    animation: Animation,
    stats: ScrollStats,
    disposed: bool,
}

impl ScrollVisibilityController {
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            config,
            visibility: Visibility::Visible,
            direction: Direction::Up,
            last_offset: 0.0,
            last_seen: Duration::ZERO,
            timer: IdleTimer::default(),
            animation: Animation::settled(Visibility::Visible.level()),
            stats: ScrollStats::default(),
            disposed: false,
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn last_offset(&self) -> f64 {
        self.last_offset
    }

    pub fn pending_deadline(&self) -> Option<Duration> {
        self.timer.deadline
    }

    pub fn stats(&self) -> ScrollStats {
        self.stats
    }

    /// Animated level for rendering: 1.0 fully shown, 0.0 fully hidden.
    pub fn progress(&self, now: Duration) -> f32 {
        self.animation.value_at(now, self.config.animation)
    }

    /// Feeds one scroll sample. An idle timeout that expired before `at` is
    /// applied first, so the result may hold up to two transitions.
    pub fn on_sample(&mut self, offset: f64, at: Duration) -> Vec<Transition> {
        let mut transitions = Vec::new();
        if self.disposed {
            return transitions;
        }
        let at = at.max(self.last_seen);
        transitions.extend(self.poll(at));
        self.last_seen = at;
        self.stats.samples += 1;

        let delta = offset - self.last_offset;

        if offset <= self.config.top_threshold {
            self.stats.near_top += 1;
            self.last_offset = offset;
            self.direction = Direction::Up;
            self.timer.cancel();
            transitions.extend(self.set_visibility(Visibility::Visible, Cause::NearTop, at));
            return transitions;
        }

        if delta.abs() < self.config.noise_threshold {
            self.stats.ignored += 1;
            return transitions;
        }

        self.stats.accepted += 1;
        self.last_offset = offset;
        let direction = if delta > 0.0 {
            Direction::Down
        } else {
            Direction::Up
        };
        if direction != self.direction {
            self.direction = direction;
            let target = match direction {
                Direction::Down => Visibility::Hidden,
                Direction::Up => Visibility::Visible,
            };
            transitions.extend(self.set_visibility(target, Cause::Direction, at));
        }
        self.timer.arm(at + self.config.idle_timeout);

        transitions
    }

    /// Fires the idle timer if its deadline has passed by `now`.
    pub fn poll(&mut self, now: Duration) -> Option<Transition> {
        if self.disposed {
            return None;
        }
        let deadline = self.timer.deadline?;
        if !self.timer.fire(now) {
            return None;
        }
        self.stats.idle_fired += 1;
        self.last_seen = self.last_seen.max(now);
        // Stamped with the deadline, not the later observation time.
        self.set_visibility(Visibility::Visible, Cause::Idle, deadline)
    }

    /// Cancels the pending idle timer; later samples and polls are no-ops.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.timer.cancel();
        self.disposed = true;
        debug!(offset = self.last_offset, "scroll controller disposed");
    }

    fn set_visibility(
        &mut self,
        target: Visibility,
        cause: Cause,
        at: Duration,
    ) -> Option<Transition> {
        if self.visibility == target {
            return None;
        }
        let current = self.animation.value_at(at, self.config.animation);
        self.animation = Animation {
            from: current,
            to: target.level(),
            start: at,
        };
        let transition = Transition {
            at,
            offset: self.last_offset,
            from: self.visibility,
            to: target,
            cause,
        };
        self.visibility = target;
        debug!(
            at_ms = at.as_millis() as u64,
            offset = self.last_offset,
            to = ?target,
            cause = ?cause,
            "visibility changed"
        );
        Some(transition)
    }
}

impl Drop for ScrollVisibilityController {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// One recorded scroll callback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub t_ms: u64,
    pub offset: f64,
}

/// Parses a JSONL trace. Blank lines and `#` comments are skipped; samples
/// must not go back in time.
pub fn parse_trace(text: &str) -> Result<Vec<Sample>> {
    let mut samples: Vec<Sample> = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let sample: Sample = serde_json::from_str(line)
            .map_err(|err| anyhow::anyhow!("trace line {}: {err}", idx + 1))?;
        if !sample.offset.is_finite() {
            anyhow::bail!("trace line {}: offset must be finite", idx + 1);
        }
        if let Some(prev) = samples.last() {
            if sample.t_ms < prev.t_ms {
                anyhow::bail!(
                    "trace line {}: t_ms {} is earlier than previous {}",
                    idx + 1,
                    sample.t_ms,
                    prev.t_ms
                );
            }
        }
        samples.push(sample);
    }
    Ok(samples)
}

#[derive(Debug, Clone)]
pub struct Replay {
    pub transitions: Vec<Transition>,
    pub final_visibility: Visibility,
    pub final_progress: f32,
    pub stats: ScrollStats,
    pub end: Duration,
}

/// Runs `samples` through a fresh controller. With `settle`, the clock is
/// advanced by one idle timeout past the last sample so recovery shows up.
pub fn replay(config: ScrollConfig, samples: &[Sample], settle: bool) -> Replay {
    let mut controller = ScrollVisibilityController::new(config);
    let mut transitions = Vec::new();
    let mut end = Duration::ZERO;
    for sample in samples {
        end = Duration::from_millis(sample.t_ms);
        transitions.extend(controller.on_sample(sample.offset, end));
    }
    if settle {
        end += config.idle_timeout;
        transitions.extend(controller.poll(end));
    }
    let final_visibility = controller.visibility();
    let final_progress = controller.progress(end);
    let stats = controller.stats();
    debug!(
        direction = ?controller.direction(),
        offset = controller.last_offset(),
        pending_ms = ?controller.pending_deadline().map(|d| d.as_millis() as u64),
        transitions = transitions.len(),
        "replay finished"
    );
    controller.dispose();
    Replay {
        transitions,
        final_visibility,
        final_progress,
        stats,
        end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn scroll_down(controller: &mut ScrollVisibilityController) -> Duration {
        let mut at = Duration::ZERO;
        for (step, offset) in (0..=1000).step_by(20).enumerate() {
            at = ms(step as u64 * 16);
            controller.on_sample(offset as f64, at);
        }
        at
    }

    #[test]
    fn starts_visible_at_top() {
        let controller = ScrollVisibilityController::new(ScrollConfig::bottom_bar());
        assert_eq!(controller.visibility(), Visibility::Visible);
        assert_eq!(controller.direction(), Direction::Up);
        assert_eq!(controller.last_offset(), 0.0);
        assert_eq!(controller.pending_deadline(), None);
        assert_eq!(controller.progress(Duration::ZERO), 1.0);
    }

    #[test]
    fn downward_scroll_hides_then_idle_restores() {
        let mut controller = ScrollVisibilityController::new(ScrollConfig::bottom_bar());
        let mut hidden_at = None;
        for (step, offset) in (0..=1000).step_by(20).enumerate() {
            controller.on_sample(offset as f64, ms(step as u64 * 16));
            if hidden_at.is_none() && controller.visibility() == Visibility::Hidden {
                hidden_at = Some(offset);
            }
        }
        let hidden_at = hidden_at.expect("bar hides while scrolling down");
        assert!(hidden_at < 1000);
        assert_eq!(hidden_at, 60);

        let last = ms(50 * 16);
        assert_eq!(controller.poll(last + ms(999)), None);
        assert_eq!(controller.visibility(), Visibility::Hidden);
        let restored = controller.poll(last + ms(1000)).expect("idle fires");
        assert_eq!(restored.cause, Cause::Idle);
        assert_eq!(restored.to, Visibility::Visible);
        assert_eq!(controller.visibility(), Visibility::Visible);
        assert_eq!(controller.pending_deadline(), None);
    }

    #[test]
    fn near_top_forces_visible() {
        let mut controller = ScrollVisibilityController::new(ScrollConfig::bottom_bar());
        let at = scroll_down(&mut controller);
        assert_eq!(controller.visibility(), Visibility::Hidden);

        let transitions = controller.on_sample(50.0, at + ms(16));
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].cause, Cause::NearTop);
        assert_eq!(controller.visibility(), Visibility::Visible);
        assert_eq!(controller.last_offset(), 50.0);
        assert_eq!(controller.pending_deadline(), None);
    }

    #[test]
    fn scrolling_down_after_top_hides_again() {
        let mut controller = ScrollVisibilityController::new(ScrollConfig::bottom_bar());
        controller.on_sample(200.0, ms(0));
        assert_eq!(controller.visibility(), Visibility::Hidden);
        controller.on_sample(30.0, ms(16));
        assert_eq!(controller.visibility(), Visibility::Visible);
        assert_eq!(controller.direction(), Direction::Up);

        let transitions = controller.on_sample(300.0, ms(32));
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].cause, Cause::Direction);
        assert_eq!(controller.visibility(), Visibility::Hidden);
    }

    #[test]
    fn near_top_wins_over_noise() {
        let mut controller = ScrollVisibilityController::new(ScrollConfig::bottom_bar());
        controller.on_sample(30.0, ms(0));
        controller.on_sample(32.0, ms(16));
        assert_eq!(controller.last_offset(), 32.0);
        assert_eq!(controller.visibility(), Visibility::Visible);
    }

    #[test]
    fn jitter_below_threshold_is_ignored() {
        let mut controller = ScrollVisibilityController::new(ScrollConfig::bottom_bar());
        controller.on_sample(200.0, ms(0));
        assert_eq!(controller.visibility(), Visibility::Hidden);
        let deadline = controller.pending_deadline();

        let transitions = controller.on_sample(197.0, ms(16));
        assert!(transitions.is_empty());
        assert_eq!(controller.visibility(), Visibility::Hidden);
        assert_eq!(controller.last_offset(), 200.0);
        assert_eq!(controller.pending_deadline(), deadline);
        assert_eq!(controller.stats().ignored, 1);
    }

    #[test]
    fn reversing_upward_shows_bar() {
        let mut controller = ScrollVisibilityController::new(ScrollConfig::bottom_bar());
        controller.on_sample(300.0, ms(0));
        assert_eq!(controller.visibility(), Visibility::Hidden);
        let transitions = controller.on_sample(280.0, ms(16));
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].cause, Cause::Direction);
        assert_eq!(controller.visibility(), Visibility::Visible);
        assert_eq!(controller.direction(), Direction::Up);
    }

    #[test]
    fn each_accepted_sample_rearms_single_timer() {
        let mut controller = ScrollVisibilityController::new(ScrollConfig::bottom_bar());
        controller.on_sample(100.0, ms(0));
        assert_eq!(controller.pending_deadline(), Some(ms(1000)));
        controller.on_sample(140.0, ms(600));
        assert_eq!(controller.pending_deadline(), Some(ms(1600)));

        assert_eq!(controller.poll(ms(1000)), None);
        assert_eq!(controller.visibility(), Visibility::Hidden);
        assert!(controller.poll(ms(1600)).is_some());
        assert_eq!(controller.poll(ms(5000)), None);
        assert_eq!(controller.stats().idle_fired, 1);
    }

    #[test]
    fn expired_timer_fires_before_next_sample() {
        let mut controller = ScrollVisibilityController::new(ScrollConfig::bottom_bar());
        controller.on_sample(100.0, ms(0));
        let transitions = controller.on_sample(400.0, ms(3000));
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].cause, Cause::Idle);
        assert_eq!(transitions[0].at, ms(1000));
        assert_eq!(controller.visibility(), Visibility::Visible);
    }

    #[test]
    fn tab_bar_waits_longer() {
        let mut controller = ScrollVisibilityController::new(ScrollConfig::tab_bar());
        controller.on_sample(400.0, ms(0));
        assert!(controller.poll(ms(1000)).is_none());
        assert_eq!(controller.visibility(), Visibility::Hidden);
        assert!(controller.poll(ms(1500)).is_some());
    }

    #[test]
    fn dispose_cancels_and_silences() {
        let mut controller = ScrollVisibilityController::new(ScrollConfig::bottom_bar());
        controller.on_sample(400.0, ms(0));
        controller.dispose();
        assert_eq!(controller.pending_deadline(), None);
        assert_eq!(controller.poll(ms(5000)), None);
        assert!(controller.on_sample(10.0, ms(6000)).is_empty());
        assert_eq!(controller.visibility(), Visibility::Hidden);
    }

    #[test]
    fn progress_interpolates_and_retargets() {
        let mut controller = ScrollVisibilityController::new(ScrollConfig::bottom_bar());
        controller.on_sample(400.0, ms(1000));
        assert_eq!(controller.progress(ms(1000)), 1.0);
        assert!((controller.progress(ms(1100)) - 0.5).abs() < 1e-6);
        assert_eq!(controller.progress(ms(1200)), 0.0);

        controller.on_sample(300.0, ms(1300));
        controller.on_sample(400.0, ms(1350));
        let mid = controller.progress(ms(1350));
        assert!((mid - 0.25).abs() < 1e-6, "mid-flight value was {mid}");
        assert_eq!(controller.progress(ms(1550)), 0.0);
    }

    #[test]
    fn parse_trace_skips_comments_and_rejects_time_travel() {
        let samples = parse_trace("# scroll\n{\"t_ms\":0,\"offset\":0}\n\n{\"t_ms\":16,\"offset\":20.5}\n")
            .expect("parse");
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].offset, 20.5);

        let err = parse_trace("{\"t_ms\":32,\"offset\":0}\n{\"t_ms\":16,\"offset\":5}\n").unwrap_err();
        assert!(err.to_string().contains("trace line 2"));
    }

    #[test]
    fn replay_settles_to_visible() {
        let samples: Vec<Sample> = (0..=50)
            .map(|step| Sample {
                t_ms: step * 16,
                offset: (step * 20) as f64,
            })
            .collect();
        let replay = replay(ScrollConfig::bottom_bar(), &samples, true);
        let causes: Vec<Cause> = replay.transitions.iter().map(|t| t.cause).collect();
        assert_eq!(causes, vec![Cause::Direction, Cause::Idle]);
        assert_eq!(replay.transitions[0].offset, 60.0);
        assert_eq!(replay.transitions[0].at, ms(48));
        assert_eq!(replay.final_visibility, Visibility::Visible);
        assert_eq!(replay.end, ms(800 + 1000));
        assert_eq!(replay.stats.samples, 51);
        assert_eq!(replay.stats.near_top, 3);
    }
}
