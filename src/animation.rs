//! Per-element animation queues
//!
//! Every element a widget styles gets a track: a committed style, at most one
//! running tween and a FIFO of pending ones. Tweens complete in timestamp
//! order through `pop_due`; the caller runs the completion job and then calls
//! `resume` so a job can restyle the element before the next queued tween
//! captures its starting values.

use std::collections::{HashMap, VecDeque};
use std::f64::consts::PI;

use crate::stage::Style;
use crate::types::Millis;

/// Numeric properties a tween can target; `None` leaves a property alone
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Props {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub opacity: Option<f64>,
}

impl Props {
    pub fn opacity(opacity: f64) -> Self {
        Self {
            opacity: Some(opacity),
            ..Self::default()
        }
    }

    /// Every numeric property of `style`
    pub fn from_style(style: &Style) -> Self {
        Self {
            left: Some(style.left),
            top: Some(style.top),
            width: Some(style.width),
            height: Some(style.height),
            opacity: Some(style.opacity),
        }
    }

    fn apply(&self, style: &mut Style) {
        if let Some(left) = self.left {
            style.left = left;
        }
        if let Some(top) = self.top {
            style.top = top;
        }
        if let Some(width) = self.width {
            style.width = width;
        }
        if let Some(height) = self.height {
            style.height = height;
        }
        if let Some(opacity) = self.opacity {
            style.opacity = opacity;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Motion {
    Animate(Props),
    /// Display the element at opacity 0 and tween to 1
    FadeIn,
    /// Tween to opacity 0, then hide and restore opacity 1
    FadeOut,
}

#[derive(Debug)]
struct Pending<J> {
    motion: Motion,
    duration: Millis,
    on_done: Option<J>,
}

#[derive(Debug)]
struct Tween<J> {
    from: Style,
    to: Style,
    start: Millis,
    duration: Millis,
    seq: u64,
    on_done: Option<J>,
}

impl<J> Tween<J> {
    fn end(&self) -> Millis {
        self.start.saturating_add(self.duration)
    }

    /// Style at `now`, eased with the usual "swing" curve
    fn sample(&self, now: Millis) -> Style {
        if self.duration == 0 || now >= self.end() {
            return self.from_for_display(1.0);
        }
        let progress = now.saturating_sub(self.start) as f64 / self.duration as f64;
        let eased = 0.5 - (progress * PI).cos() / 2.0;
        self.from_for_display(eased)
    }

    fn from_for_display(&self, eased: f64) -> Style {
        let lerp = |a: f64, b: f64| a + (b - a) * eased;
        Style {
            left: lerp(self.from.left, self.to.left),
            top: lerp(self.from.top, self.to.top),
            width: lerp(self.from.width, self.to.width),
            height: lerp(self.from.height, self.to.height),
            opacity: lerp(self.from.opacity, self.to.opacity),
            ..self.from.clone()
        }
    }
}

#[derive(Debug)]
struct Track<J> {
    style: Style,
    current: Option<Tween<J>>,
    queue: VecDeque<Pending<J>>,
}

/// A tween that ran to completion
#[derive(Debug)]
pub struct Finished<J> {
    pub element_id: String,
    pub at: Millis,
    pub job: Option<J>,
}

#[derive(Debug)]
pub struct Animator<J> {
    tracks: HashMap<String, Track<J>>,
    next_seq: u64,
}

impl<J> Default for Animator<J> {
    fn default() -> Self {
        Self {
            tracks: HashMap::new(),
            next_seq: 0,
        }
    }
}

impl<J> Animator<J> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, element_id: &str, style: Style) {
        self.tracks.insert(
            element_id.to_string(),
            Track {
                style,
                current: None,
                queue: VecDeque::new(),
            },
        );
    }

    /// Committed style (start values while a tween runs)
    pub fn style(&self, element_id: &str) -> Option<&Style> {
        self.tracks.get(element_id).map(|track| &track.style)
    }

    pub fn is_animating(&self, element_id: &str) -> bool {
        self.tracks
            .get(element_id)
            .is_some_and(|track| track.current.is_some() || !track.queue.is_empty())
    }

    /// Number of tweens waiting behind the running one
    pub fn queued(&self, element_id: &str) -> usize {
        self.tracks.get(element_id).map_or(0, |track| track.queue.len())
    }

    /// Set style immediately
    ///
    /// The change also lands in a running tween's endpoints, so properties the
    /// tween does not animate (colors) survive its completion.
    pub fn css(&mut self, element_id: &str, change: impl Fn(&mut Style)) {
        if let Some(track) = self.tracks.get_mut(element_id) {
            change(&mut track.style);
            if let Some(tween) = track.current.as_mut() {
                change(&mut tween.from);
                change(&mut tween.to);
            }
        }
    }

    /// Append a tween; it starts at `now` if the element is idle
    pub fn enqueue(
        &mut self,
        now: Millis,
        element_id: &str,
        motion: Motion,
        duration: Millis,
        on_done: Option<J>,
    ) {
        let Some(track) = self.tracks.get_mut(element_id) else {
            return;
        };
        track.queue.push_back(Pending {
            motion,
            duration,
            on_done,
        });
        if track.current.is_none() && track.queue.len() == 1 {
            Self::start_next(track, now, &mut self.next_seq);
        }
    }

    /// Start the next queued tween if the element is idle
    pub fn resume(&mut self, now: Millis, element_id: &str) {
        if let Some(track) = self.tracks.get_mut(element_id)
            && track.current.is_none()
        {
            Self::start_next(track, now, &mut self.next_seq);
        }
    }

    fn start_next(track: &mut Track<J>, now: Millis, next_seq: &mut u64) {
        let Some(pending) = track.queue.pop_front() else {
            return;
        };
        let mut from = track.style.clone();
        let mut to = from.clone();
        let mut duration = pending.duration;

        match pending.motion {
            Motion::Animate(props) => props.apply(&mut to),
            Motion::FadeIn => {
                if !from.displayed {
                    from.displayed = true;
                    from.opacity = 0.0;
                    track.style = from.clone();
                }
                to.displayed = true;
                to.opacity = 1.0;
            }
            Motion::FadeOut => {
                if from.displayed {
                    to.opacity = 0.0;
                } else {
                    // already hidden, completes at once
                    duration = 0;
                }
            }
        }

        let fade_out = matches!(pending.motion, Motion::FadeOut);
        if fade_out {
            // shown until the tween ends, then hidden at full opacity
            to.displayed = false;
        }

        *next_seq += 1;
        track.current = Some(Tween {
            from,
            to,
            start: now,
            duration,
            seq: *next_seq,
            on_done: pending.on_done,
        });
    }

    /// Stop the running tween and drop the queue
    ///
    /// With `jump_to_end` the element takes the tween's final style, otherwise
    /// it freezes where it is. Completion jobs of stopped tweens are dropped.
    pub fn stop(&mut self, now: Millis, element_id: &str, jump_to_end: bool) {
        let Some(track) = self.tracks.get_mut(element_id) else {
            return;
        };
        track.queue.clear();
        if let Some(tween) = track.current.take() {
            track.style = if jump_to_end {
                Self::final_style(&tween)
            } else {
                tween.sample(now)
            };
        }
    }

    fn final_style(tween: &Tween<J>) -> Style {
        let mut style = tween.to.clone();
        if !style.displayed {
            style.opacity = 1.0;
        }
        style
    }

    /// Earliest end time among running tweens
    pub fn next_deadline(&self) -> Option<Millis> {
        self.tracks
            .values()
            .filter_map(|track| track.current.as_ref().map(Tween::end))
            .min()
    }

    /// Complete the earliest running tween that ends at or before `now`
    pub fn pop_due(&mut self, now: Millis) -> Option<Finished<J>> {
        let (element_id, _) = self
            .tracks
            .iter()
            .filter_map(|(id, track)| {
                track
                    .current
                    .as_ref()
                    .filter(|tween| tween.end() <= now)
                    .map(|tween| (id, (tween.end(), tween.seq)))
            })
            .min_by_key(|(_, key)| *key)?;
        let element_id = element_id.clone();

        let track = self.tracks.get_mut(&element_id)?;
        let tween = track.current.take()?;
        track.style = Self::final_style(&tween);
        Some(Finished {
            element_id,
            at: tween.end(),
            job: tween.on_done,
        })
    }

    /// Interpolated styles of every running tween
    pub fn frame(&self, now: Millis) -> Vec<(&str, Style)> {
        self.tracks
            .iter()
            .filter_map(|(id, track)| {
                track
                    .current
                    .as_ref()
                    .map(|tween| (id.as_str(), tween.sample(now)))
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }
}
