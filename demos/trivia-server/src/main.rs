//! A small trivia server: rooms, reconnection, and a fixed question
//! list. First correct answer per question scores; the game ends when
//! the questions run out.
//!
//! Run it, then point clients at `ws://127.0.0.1:3001` (override with
//! `HOLDFAST_ADDR`). The wire protocol is plain JSON text frames.

use std::collections::HashMap;

use holdfast::HoldfastServer;
use holdfast::protocol::{Room, RoomCode, SessionToken};
use holdfast::registry::{AnswerJudge, Verdict};
use tracing_subscriber::EnvFilter;

const POINTS_PER_ANSWER: i64 = 100;

/// Walks each room through a shared question list. Progress is keyed
/// by room code; a wrong answer scores nothing and does not advance.
struct TriviaJudge {
    questions: Vec<(&'static str, &'static str)>,
    progress: HashMap<RoomCode, usize>,
}

impl TriviaJudge {
    fn new() -> Self {
        Self {
            questions: vec![
                ("What planet is known as the red planet?", "mars"),
                ("How many sides does a hexagon have?", "6"),
                ("What is the largest ocean on Earth?", "pacific"),
            ],
            progress: HashMap::new(),
        }
    }
}

impl AnswerJudge for TriviaJudge {
    fn judge(
        &mut self,
        room: &Room,
        _player: &SessionToken,
        answer: &str,
    ) -> Verdict {
        let index = self.progress.entry(room.code.clone()).or_insert(0);
        let Some((_, expected)) = self.questions.get(*index) else {
            return Verdict {
                score_delta: 0,
                game_over: true,
            };
        };

        if answer.trim().eq_ignore_ascii_case(expected) {
            *index += 1;
            Verdict {
                score_delta: POINTS_PER_ANSWER,
                game_over: *index >= self.questions.len(),
            }
        } else {
            Verdict::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("HOLDFAST_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3001".to_string());

    let server = HoldfastServer::builder()
        .bind(&addr)
        .build(TriviaJudge::new())
        .await?;
    tracing::info!(addr = %server.local_addr()?, "trivia server listening");

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
        }
    }
    Ok(())
}
