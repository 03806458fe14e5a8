//! Scoring: diminishing points per attempt, chooser bonuses, end-of-round
//! pity/penalty adjustments and the ranked leaderboard.

use super::Effects;
use crate::protocol::ServerMessage;
use crate::types::*;

/// Points for correct guesses on attempts 1..=6
const TURN_POINT_TABLE: [i64; 6] = [1000, 800, 600, 400, 300, 200];
const TURN_MIN_POINTS: i64 = 100;
const CHOOSER_BONUS_RATIO: f64 = 0.5;
const CHOOSER_PITY_BONUS: i64 = 200;
const CHOOSER_TOO_EASY_PENALTY: i64 = 200;

/// Diminishing point table indexed by attempt number. Past the table the
/// value keeps dropping by 100 per attempt, floored at 100.
pub fn points_for_attempt(attempt: u32) -> i64 {
    if attempt <= 1 {
        return TURN_POINT_TABLE[0];
    }
    if (attempt as usize) <= TURN_POINT_TABLE.len() {
        return TURN_POINT_TABLE[attempt as usize - 1];
    }
    let deduction = (attempt as i64 - TURN_POINT_TABLE.len() as i64) * 100;
    (TURN_POINT_TABLE[TURN_POINT_TABLE.len() - 1] - deduction).max(TURN_MIN_POINTS)
}

impl Room {
    /// Record a correct guess. No-op if the player is already marked
    /// correct this round. Ends the round once every guesser is correct,
    /// otherwise forces the turn onward.
    pub fn award_points(&mut self, player_id: &PlayerId, fx: &mut Effects) {
        if self.guessed_correct.contains(player_id) {
            return;
        }
        self.guessed_correct.insert(player_id.clone());

        let attempt = self.attempt_number(player_id);
        let points = points_for_attempt(attempt);
        self.correct_guess_order.push(player_id.clone());

        let stats = self.stats.entry(player_id.clone()).or_default();
        stats.score += points;
        stats.correct_guesses += 1;
        stats.total_turn_count += attempt;
        if attempt == 1 {
            stats.first_turn_wins += 1;
        }

        fx.room(ServerMessage::SystemMessage {
            text: format!(
                "✅ {} guessed correctly on turn {} and earned {} pts!",
                self.player_name(player_id),
                attempt,
                points
            ),
        });

        if let Some(chooser_id) = self.chooser_id.clone() {
            let bonus = (points as f64 * CHOOSER_BONUS_RATIO).round() as i64;
            let chooser_stats = self.stats.entry(chooser_id.clone()).or_default();
            chooser_stats.score += bonus;
            chooser_stats.chooser_bonus += bonus;
            if bonus > 0 {
                fx.room(ServerMessage::SystemMessage {
                    text: format!(
                        "🎯 {} gains {} bonus pts as chooser.",
                        self.player_name(&chooser_id),
                        bonus
                    ),
                });
            }
        }

        let total_guessers = self.guesser_count();
        if self.guessed_correct.len() >= total_guessers || total_guessers == 0 {
            fx.room(ServerMessage::SystemMessage {
                text: "🏁 Everyone guessed correctly!".to_string(),
            });
            self.finish_round(fx);
        } else {
            self.advance_turn(true, fx);
        }
    }

    /// Flat chooser adjustment at round completion: pity bonus when nobody
    /// scored, penalty when everybody did. Applied exactly once per round.
    pub(crate) fn apply_chooser_round_adjustments(
        &mut self,
        total_guessers: usize,
        guessed_count: usize,
        fx: &mut Effects,
    ) {
        let Some(chooser_id) = self.chooser_id.clone() else {
            return;
        };
        if total_guessers == 0 {
            return;
        }

        let adjustment = if guessed_count == 0 {
            CHOOSER_PITY_BONUS
        } else if guessed_count == total_guessers {
            -CHOOSER_TOO_EASY_PENALTY
        } else {
            return;
        };

        self.stats.entry(chooser_id.clone()).or_default().score += adjustment;

        let text = if adjustment > 0 {
            format!(
                "🎁 {} receives a {} pt pity bonus.",
                self.player_name(&chooser_id),
                adjustment
            )
        } else {
            format!(
                "⚖️ {} loses {} pts (too easy!).",
                self.player_name(&chooser_id),
                -adjustment
            )
        };
        fx.room(ServerMessage::SystemMessage { text });
    }

    /// Ranked leaderboard. Five-key total order: score desc, average
    /// attempts-to-correct asc (no correct guess sorts last), first-attempt
    /// wins desc, chooser bonus desc, join index asc.
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        let mut ranked: Vec<(LeaderboardEntry, f64, usize)> = self
            .players
            .iter()
            .map(|p| {
                let stats = self.stats.get(&p.id).cloned().unwrap_or_default();
                let avg = stats.avg_turn();
                let entry = LeaderboardEntry {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    score: stats.score,
                    correct_guesses: stats.correct_guesses,
                    avg_turn: avg,
                    first_turn_wins: stats.first_turn_wins,
                    chooser_bonus: stats.chooser_bonus,
                };
                (entry, avg.unwrap_or(f64::INFINITY), self.join_index(&p.id))
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.0.score
                .cmp(&a.0.score)
                .then_with(|| a.1.total_cmp(&b.1))
                .then_with(|| b.0.first_turn_wins.cmp(&a.0.first_turn_wins))
                .then_with(|| b.0.chooser_bonus.cmp(&a.0.chooser_bonus))
                .then_with(|| a.2.cmp(&b.2))
        });

        ranked.into_iter().map(|(entry, _, _)| entry).collect()
    }
}
