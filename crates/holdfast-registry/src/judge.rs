//! Pluggable answer scoring.
//!
//! The registry manages rooms and sessions; it deliberately knows
//! nothing about what makes an answer right. An [`AnswerJudge`] is the
//! seam where game rules plug in: the registry hands it each submitted
//! answer and applies whatever the verdict says.

use holdfast_protocol::{Room, SessionToken};

/// The outcome of judging one submitted answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verdict {
    /// Points to add to the submitting player's score. Zero means no
    /// score change and no score broadcast.
    pub score_delta: i64,
    /// When `true`, the game is over: the room moves to FINISHED and
    /// final scores are broadcast.
    pub game_over: bool,
}

/// Scores submitted answers for a room.
///
/// Implementations may keep their own per-room state (current
/// question, who answered already). Called from the registry actor, so
/// invocations are serialized.
pub trait AnswerJudge: Send + 'static {
    /// Judges one answer from `player` in `room`.
    fn judge(
        &mut self,
        room: &Room,
        player: &SessionToken,
        answer: &str,
    ) -> Verdict;
}

/// The default judge: accepts every answer without scoring. Rooms
/// using it never finish on their own; they end when players leave.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoScoring;

impl AnswerJudge for NoScoring {
    fn judge(
        &mut self,
        _room: &Room,
        _player: &SessionToken,
        _answer: &str,
    ) -> Verdict {
        Verdict::default()
    }
}
