//! Step sequencer — the pattern grid and the millisecond step clock.
//!
//! The sequencer only decides *when* a step boundary has passed and which
//! cells are set. Triggering voices is left to the caller, which owns the
//! voice bank.

use serde::{Deserialize, Serialize};

use crate::params::NUM_VOICES;

/// Steps per pattern.
pub const NUM_STEPS: usize = 16;

/// One cell of the pattern grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerStep {
    pub note: u8,
    pub active: bool,
    pub velocity: u8,
    /// Replaces the voice's note length when this step fires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u8>,
}

impl Default for SequencerStep {
    fn default() -> Self {
        SequencerStep {
            note: 60,
            active: false,
            velocity: 127,
            length: None,
        }
    }
}

/// Transport state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
}

/// Duration of one sixteenth-note step in milliseconds.
///
/// `swing` is accepted so callers recompute on swing changes, but steps
/// stay straight: even/odd asymmetry is not applied yet.
pub fn step_duration_ms(tempo: u16, _swing: u8) -> u64 {
    let tempo = tempo.max(1) as u64;
    60_000 / tempo / 4
}

/// Grid of `NUM_VOICES` × `NUM_STEPS` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepGrid {
    cells: [[SequencerStep; NUM_STEPS]; NUM_VOICES],
}

impl StepGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, voice: usize, step: usize) -> Option<&SequencerStep> {
        self.cells.get(voice)?.get(step)
    }

    fn get_mut(&mut self, voice: usize, step: usize) -> Option<&mut SequencerStep> {
        self.cells.get_mut(voice)?.get_mut(step)
    }

    pub fn set(&mut self, voice: usize, step: usize, note: u8, active: bool) {
        if let Some(cell) = self.get_mut(voice, step) {
            cell.note = note.min(127);
            cell.active = active;
        }
    }

    pub fn clear(&mut self, voice: usize, step: usize) {
        if let Some(cell) = self.get_mut(voice, step) {
            cell.active = false;
        }
    }

    pub fn toggle(&mut self, voice: usize, step: usize) {
        if let Some(cell) = self.get_mut(voice, step) {
            cell.active = !cell.active;
        }
    }

    pub fn set_velocity(&mut self, voice: usize, step: usize, velocity: i32) {
        if let Some(cell) = self.get_mut(voice, step) {
            cell.velocity = velocity.clamp(0, 127) as u8;
        }
    }

    pub fn set_length(&mut self, voice: usize, step: usize, length: Option<i32>) {
        if let Some(cell) = self.get_mut(voice, step) {
            cell.length = length.map(|l| l.clamp(0, 127) as u8);
        }
    }

    pub fn is_active(&self, voice: usize, step: usize) -> bool {
        self.get(voice, step).is_some_and(|c| c.active)
    }

    /// Active cells of one step column, as `(voice, cell)`.
    pub fn column(&self, step: usize) -> impl Iterator<Item = (usize, &SequencerStep)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(voice, row)| row.get(step).filter(|c| c.active).map(|c| (voice, c)))
    }

    pub fn clear_all(&mut self) {
        for row in self.cells.iter_mut() {
            for cell in row.iter_mut() {
                cell.active = false;
            }
        }
    }
}

/// Pattern grid plus transport and step clock.
#[derive(Debug, Clone)]
pub struct Sequencer {
    grid: StepGrid,
    state: TransportState,
    current_step: usize,
    last_step_ms: u64,
    step_duration_ms: u64,
}

impl Sequencer {
    pub fn new(tempo: u16, swing: u8) -> Self {
        Sequencer {
            grid: StepGrid::new(),
            state: TransportState::Stopped,
            current_step: 0,
            last_step_ms: 0,
            step_duration_ms: step_duration_ms(tempo, swing),
        }
    }

    pub fn grid(&self) -> &StepGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut StepGrid {
        &mut self.grid
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn step_duration(&self) -> u64 {
        self.step_duration_ms
    }

    pub fn recompute_timing(&mut self, tempo: u16, swing: u8) {
        self.step_duration_ms = step_duration_ms(tempo, swing);
    }

    /// Start (or restart) from step 0 with `now_ms` as the clock baseline.
    pub fn start(&mut self, now_ms: u64) {
        self.state = TransportState::Playing;
        self.current_step = 0;
        self.last_step_ms = now_ms;
    }

    pub fn stop(&mut self) {
        self.state = TransportState::Stopped;
    }

    /// Advance the clock. Returns the new step index when a step boundary
    /// has elapsed since the last advance.
    pub fn tick(&mut self, now_ms: u64) -> Option<usize> {
        if self.state != TransportState::Playing {
            return None;
        }
        if now_ms.saturating_sub(self.last_step_ms) < self.step_duration_ms {
            return None;
        }
        self.current_step = (self.current_step + 1) % NUM_STEPS;
        self.last_step_ms = now_ms;
        Some(self.current_step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_duration_is_sixteenths() {
        assert_eq!(step_duration_ms(120, 0), 125);
        assert_eq!(step_duration_ms(60, 0), 250);
        assert_eq!(step_duration_ms(200, 0), 75);
        assert_eq!(step_duration_ms(120, 127), 125);
    }

    #[test]
    fn grid_set_clear_toggle() {
        let mut grid = StepGrid::new();
        grid.set(1, 4, 64, true);
        assert!(grid.is_active(1, 4));
        assert_eq!(grid.get(1, 4).unwrap().note, 64);
        grid.clear(1, 4);
        assert!(!grid.is_active(1, 4));
        assert_eq!(grid.get(1, 4).unwrap().note, 64);
        grid.toggle(1, 4);
        assert!(grid.is_active(1, 4));
    }

    #[test]
    fn grid_ignores_out_of_range() {
        let mut grid = StepGrid::new();
        grid.set(NUM_VOICES, 0, 60, true);
        grid.set(0, NUM_STEPS, 60, true);
        grid.toggle(9, 99);
        grid.set_velocity(0, NUM_STEPS, 10);
        assert_eq!(grid, StepGrid::new());
        assert!(!grid.is_active(NUM_VOICES, 0));
        assert!(!grid.is_active(0, NUM_STEPS));
        assert!(grid.get(0, NUM_STEPS).is_none());
    }

    #[test]
    fn column_lists_active_voices() {
        let mut grid = StepGrid::new();
        grid.set(0, 3, 60, true);
        grid.set(2, 3, 67, true);
        grid.set(1, 4, 62, true);
        let voices: Vec<usize> = grid.column(3).map(|(v, _)| v).collect();
        assert_eq!(voices, vec![0, 2]);
        assert_eq!(grid.column(NUM_STEPS).count(), 0);
    }

    #[test]
    fn step_clamps() {
        let mut grid = StepGrid::new();
        grid.set_velocity(0, 0, 300);
        grid.set_length(0, 0, Some(-4));
        let cell = grid.get(0, 0).unwrap();
        assert_eq!(cell.velocity, 127);
        assert_eq!(cell.length, Some(0));
    }

    #[test]
    fn tick_only_while_playing() {
        let mut seq = Sequencer::new(120, 0);
        assert_eq!(seq.tick(10_000), None);
        seq.start(1000);
        assert!(seq.is_playing());
        assert_eq!(seq.tick(1124), None);
        assert_eq!(seq.tick(1125), Some(1));
        assert_eq!(seq.tick(1200), None);
        assert_eq!(seq.tick(1250), Some(2));
        seq.stop();
        assert_eq!(seq.tick(5000), None);
        assert_eq!(seq.state(), TransportState::Stopped);
    }

    #[test]
    fn step_index_wraps() {
        let mut seq = Sequencer::new(120, 0);
        seq.start(0);
        let mut now = 0;
        for _ in 0..NUM_STEPS {
            now += seq.step_duration();
            assert!(seq.tick(now).is_some());
        }
        assert_eq!(seq.current_step(), 0);
    }

    #[test]
    fn restart_resets_step() {
        let mut seq = Sequencer::new(120, 0);
        seq.start(0);
        seq.tick(125);
        seq.tick(250);
        assert_eq!(seq.current_step(), 2);
        seq.start(300);
        assert_eq!(seq.current_step(), 0);
        assert_eq!(seq.tick(424), None);
    }
}
