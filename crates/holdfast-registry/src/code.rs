//! Room code generation.

use holdfast_protocol::RoomCode;
use rand::Rng;

/// Characters usable in a room code. Ambiguous glyphs (0/O, 1/I) are
/// excluded because codes are read aloud and typed by hand.
const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of every room code.
pub(crate) const CODE_LEN: usize = 4;

/// Generates a random room code not currently in use.
///
/// `in_use` is the caller's collision check against live rooms. With a
/// 32-character alphabet there are over a million 4-character codes,
/// so retries are rare at any realistic room count.
pub(crate) fn generate_room_code<F>(in_use: F) -> RoomCode
where
    F: Fn(&RoomCode) -> bool,
{
    let mut rng = rand::rng();
    loop {
        let code: String = (0..CODE_LEN)
            .map(|_| {
                ALPHABET[rng.random_range(0..ALPHABET.len())] as char
            })
            .collect();
        let code = RoomCode::new(code);
        if !in_use(&code) {
            return code;
        }
    }
}
