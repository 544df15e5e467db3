use rand::Rng;

/// Alphabet for shareable room codes. Uppercase alphanumeric with the
/// easily-confused glyphs (0/O, 1/I/L) removed, since codes get read aloud
/// and typed from phone screens.
const CODE_ALPHABET: &str = "ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Length of a shareable room code.
pub const ROOM_CODE_LENGTH: usize = 6;

/// Draw a room code from the given random source.
///
/// The source is injected so callers that need reproducible codes (collision
/// tests, seeded tooling) can pass a seeded RNG; production callers use
/// [`generate_room_code`].
pub fn generate_room_code_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let alphabet = CODE_ALPHABET.as_bytes();
    (0..ROOM_CODE_LENGTH)
        .map(|_| char::from(alphabet[rng.gen_range(0..alphabet.len())]))
        .collect()
}

/// Draw a room code from the thread-local RNG.
pub fn generate_room_code() -> String {
    generate_room_code_with(&mut rand::thread_rng())
}

/// Validate room code format: exactly [`ROOM_CODE_LENGTH`] ASCII characters
/// from the code alphabet (case-insensitive).
#[must_use]
pub fn is_valid_room_code(code: &str) -> bool {
    code.len() == ROOM_CODE_LENGTH
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() && CODE_ALPHABET.contains(c.to_ascii_uppercase()))
}

/// Normalize room code (uppercase, trimmed)
#[must_use]
pub fn normalize_room_code(code: &str) -> String {
    code.trim().to_uppercase()
}
