use rand::Rng;

/// Symbols used for generated codes; 0/O and 1/I are left out so codes
/// survive being read aloud or retyped
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub const CODE_LENGTH: usize = 6;

/// Generates a random game code. Uniqueness against the store is not checked.
pub fn generate_game_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Whether `code` looks like something `generate_game_code` could produce
pub fn is_generated_format(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| CODE_ALPHABET.contains(&b))
}
