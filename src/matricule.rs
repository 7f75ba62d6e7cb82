use rand::Rng;

pub const PREFIX: &str = "ELV-";
const LOWEST: u32 = 100_000;
const HIGHEST: u32 = 999_999;

/// Draws `ELV-` plus six digits. No collision check happens here; callers
/// that need uniqueness compare against what they already hold.
pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{}{}", PREFIX, rng.gen_range(LOWEST..=HIGHEST))
}

pub fn is_well_formed(s: &str) -> bool {
    s.strip_prefix(PREFIX)
        .map(|digits| digits.len() == 6 && digits.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}
