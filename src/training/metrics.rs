use std::collections::VecDeque;

use crate::game::{Power, ALL_POWERS, NUM_POWERS};

/// Outcome of a single episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeResult {
    pub episode: usize,
    /// Phases processed.
    pub turns: usize,
    /// Supply centres per power at the end, indexed by `Power::index`.
    pub final_centers: [usize; NUM_POWERS],
    /// Empty unless the engine finished the game.
    pub winners: Vec<Power>,
    /// `false` when the turn limit stopped the game.
    pub finished: bool,
}

/// Rolling statistics over recent episodes plus lifetime win counts.
pub struct TrainingMetrics {
    episode_results: VecDeque<EpisodeResult>,
    update_losses: VecDeque<f32>,
    capacity: usize,
    total_episodes: usize,
    win_counts: [usize; NUM_POWERS],
}

impl TrainingMetrics {
    pub fn with_capacity(capacity: usize) -> Self {
        TrainingMetrics {
            episode_results: VecDeque::with_capacity(capacity),
            update_losses: VecDeque::with_capacity(capacity),
            capacity,
            total_episodes: 0,
            win_counts: [0; NUM_POWERS],
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn record_episode(&mut self, result: EpisodeResult) {
        self.total_episodes += 1;
        for power in &result.winners {
            self.win_counts[power.index()] += 1;
        }
        self.episode_results.push_back(result);
        if self.episode_results.len() > self.capacity {
            self.episode_results.pop_front();
        }
    }

    pub fn record_update(&mut self, loss: f32) {
        self.update_losses.push_back(loss);
        if self.update_losses.len() > self.capacity {
            self.update_losses.pop_front();
        }
    }

    fn recent(&self, last_n: usize) -> impl Iterator<Item = &EpisodeResult> {
        self.episode_results.iter().rev().take(last_n)
    }

    fn window(&self, last_n: usize) -> usize {
        self.episode_results.len().min(last_n)
    }

    /// Share of the last N episodes in which `power` was among the winners.
    pub fn win_rate(&self, power: Power, last_n: usize) -> f32 {
        let n = self.window(last_n);
        if n == 0 {
            return 0.0;
        }
        let wins = self
            .recent(n)
            .filter(|r| r.winners.contains(&power))
            .count();
        wins as f32 / n as f32
    }

    pub fn win_rates(&self, last_n: usize) -> [f32; NUM_POWERS] {
        let mut rates = [0.0; NUM_POWERS];
        for power in ALL_POWERS {
            rates[power.index()] = self.win_rate(power, last_n);
        }
        rates
    }

    /// Share of the last N episodes cut off by the turn limit.
    pub fn unfinished_rate(&self, last_n: usize) -> f32 {
        let n = self.window(last_n);
        if n == 0 {
            return 0.0;
        }
        let unfinished = self.recent(n).filter(|r| !r.finished).count();
        unfinished as f32 / n as f32
    }

    /// Average loss over the last N updates.
    pub fn average_loss(&self, last_n: usize) -> f32 {
        let n = self.update_losses.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let sum: f32 = self.update_losses.iter().rev().take(n).sum();
        sum / n as f32
    }

    /// Average number of phases over the last N episodes.
    pub fn average_game_length(&self, last_n: usize) -> f32 {
        let n = self.window(last_n);
        if n == 0 {
            return 0.0;
        }
        let total: usize = self.recent(n).map(|r| r.turns).sum();
        total as f32 / n as f32
    }

    /// Mean final supply-centre count per power over the last N episodes.
    pub fn average_centers(&self, last_n: usize) -> [f32; NUM_POWERS] {
        let n = self.window(last_n);
        let mut avg = [0.0; NUM_POWERS];
        if n == 0 {
            return avg;
        }
        for result in self.recent(n) {
            for (a, &c) in avg.iter_mut().zip(result.final_centers.iter()) {
                *a += c as f32;
            }
        }
        for a in &mut avg {
            *a /= n as f32;
        }
        avg
    }

    /// Lifetime win count per power. Shared wins count for every winner.
    pub fn win_counts(&self) -> [usize; NUM_POWERS] {
        self.win_counts
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn last_result(&self) -> Option<&EpisodeResult> {
        self.episode_results.back()
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::new()
    }
}
