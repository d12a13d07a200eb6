//! Hiding a short message inside ordinary text with zero-width characters.
//!
//! The message is base64 encoded and every two bits become one invisible
//! character. Those characters are slotted in right after whitespace of a
//! cover text: the first [`SEED_SLOTS`] slots hold a 16-bit seed, and the
//! seed shuffles the order in which the remaining slots receive the
//! payload. Whatever does not fit is appended after the cover text.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Symbols for the bit pairs `00`, `01`, `10` and `11`.
const ZERO_WIDTH: [char; 4] = ['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}'];

pub const SEED_SLOTS: usize = 8;

#[derive(Debug, Error, PartialEq)]
pub enum StegoError {
    #[error("cover text needs at least {needed} whitespace characters, found {found}")]
    CoverTooShort { needed: usize, found: usize },
    #[error("nothing to hide")]
    EmptyMessage,
    #[error("no hidden message found")]
    NoPayload,
    #[error("hidden message is corrupt: {0}")]
    Corrupt(String),
    #[error("cover text garbles the hidden message")]
    Unrecoverable
}

pub type StegoResult<T> = Result<T, StegoError>;

fn symbol_value(c: char) -> Option<u8> {
    ZERO_WIDTH.iter().position(|&zw| zw == c).map(|pos| pos as u8)
}

fn is_symbol(c: &char) -> bool {
    symbol_value(*c).is_some()
}

fn to_symbols(bytes: &[u8]) -> Vec<char> {
    bytes.iter()
        .flat_map(|&byte| [6u8, 4, 2, 0].map(|shift| ZERO_WIDTH[((byte >> shift) & 0b11) as usize]))
        .collect()
}

fn seed_symbols(seed: u16) -> Vec<char> {
    to_symbols(&seed.to_be_bytes())
}

/// Slots are the char indices directly following a whitespace character.
fn insertion_points(chars: &[char]) -> Vec<usize> {
    chars.iter().enumerate()
        .filter(|(_, c)| c.is_whitespace())
        .map(|(i, _)| i + 1)
        .collect()
}

fn shuffled_slots(seed: u16, count: usize) -> Vec<usize> {
    let mut slots: Vec<usize> = (0..count).collect();
    // output files depend on this order, so the generator must stay fixed
    slots.shuffle(&mut ChaCha8Rng::seed_from_u64(seed as u64));
    slots
}

pub fn hide(cover: &str, message: &str, seed: u16) -> StegoResult<String> {
    if message.is_empty() {
        return Err(StegoError::EmptyMessage);
    }
    let chars: Vec<char> = cover.chars().collect();
    let points = insertion_points(&chars);
    if points.len() < SEED_SLOTS {
        return Err(StegoError::CoverTooShort { needed: SEED_SLOTS, found: points.len() });
    }

    let payload = to_symbols(STANDARD.encode(message).as_bytes());
    let mut inserts: BTreeMap<usize, char> = points.iter().copied().zip(seed_symbols(seed)).collect();

    let remaining = &points[SEED_SLOTS..];
    let (placed, tail) = payload.split_at(payload.len().min(remaining.len()));
    for (symbol, slot) in placed.iter().zip(shuffled_slots(seed, remaining.len())) {
        inserts.insert(remaining[slot], *symbol);
    }
    debug!("hid {} symbols in text, {} appended", placed.len(), tail.len());

    let mut out = String::with_capacity(cover.len() + 3 * (payload.len() + SEED_SLOTS));
    for i in 0..=chars.len() {
        if let Some(symbol) = inserts.get(&i) {
            out.push(*symbol);
        }
        if let Some(c) = chars.get(i) {
            out.push(*c);
        }
    }
    out.extend(tail);
    Ok(out)
}

pub fn reveal(stego: &str) -> StegoResult<String> {
    let chars: Vec<char> = stego.chars().collect();
    let points = insertion_points(&chars);
    if points.len() < SEED_SLOTS {
        return Err(StegoError::NoPayload);
    }
    let symbol_at = |point: usize| chars.get(point).copied().filter(is_symbol);

    let seed = points[..SEED_SLOTS].iter()
        .map(|&point| symbol_at(point).and_then(symbol_value).unwrap_or(0) as u16)
        .fold(0u16, |seed, pair| (seed << 2) | pair);

    let remaining = &points[SEED_SLOTS..];
    let mut payload: Vec<char> = shuffled_slots(seed, remaining.len())
        .into_iter()
        .filter_map(|slot| symbol_at(remaining[slot]))
        .collect();

    let all_symbols: Vec<char> = chars.iter().copied().filter(is_symbol).collect();
    let tail_len = all_symbols.len().saturating_sub(SEED_SLOTS + payload.len());
    payload.extend_from_slice(&all_symbols[all_symbols.len() - tail_len..]);

    if payload.is_empty() {
        return Err(StegoError::NoPayload);
    }

    let encoded: Vec<u8> = payload.chunks_exact(4)
        .map(|quad| quad.iter()
            .filter_map(|&c| symbol_value(c))
            .fold(0u8, |byte, pair| (byte << 2) | pair))
        .collect();
    let decoded = STANDARD.decode(&encoded).map_err(|err| StegoError::Corrupt(err.to_string()))?;
    String::from_utf8(decoded).map_err(|err| StegoError::Corrupt(err.to_string()))
}

/// Like [`hide`], but reads the message back out of the result and fails
/// unless it comes back intact.
pub fn hide_verified(cover: &str, message: &str, seed: u16) -> StegoResult<String> {
    let hidden = hide(cover, message, seed)?;
    match reveal(&hidden) {
        Ok(recovered) if recovered == message => Ok(hidden),
        _ => Err(StegoError::Unrecoverable)
    }
}

/// The cover text with every hidden symbol removed.
pub fn strip(stego: &str) -> String {
    stego.chars().filter(|c| !is_symbol(c)).collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    const URL: &str = "https://www.youtube.com/watch?v=uTJ-7oPkcg4";

    #[fixture]
    fn cover() -> String {
        "Pea fanongo ai a Kitea oku iai ae pango i Hahake, pea mole ai o alu ki Hahake ke kumi kiai.\n\
         Pea au atu ae pango fefine ko Kitea, oku fai ae huo maala ae pango tangata ko Tapu.\n".repeat(20)
    }

    #[rstest]
    fn hide_and_reveal(cover: String) {
        let stego = hide(&cover, URL, 0xBEEF).unwrap();
        assert_ne!(stego, cover);
        assert_eq!(strip(&stego), cover);
        assert_eq!(reveal(&stego).unwrap(), URL);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(u16::MAX)]
    fn any_seed(cover: String, #[case] seed: u16) {
        let stego = hide(&cover, URL, seed).unwrap();
        assert_eq!(reveal(&stego).unwrap(), URL);
    }

    #[rstest]
    fn overflow_goes_to_the_end() {
        let cover = "a b c d e f g h i j k";
        let stego = hide(cover, URL, 42).unwrap();
        assert!(stego.starts_with('a'));
        assert!(stego.ends_with(|c: char| is_symbol(&c)));
        assert_eq!(strip(&stego), cover);
        assert_eq!(reveal(&stego).unwrap(), URL);
    }

    #[rstest]
    fn trailing_whitespace_cover() {
        let cover = "one two three four five six seven eight nine ten \n";
        let stego = hide(cover, "hi", 7).unwrap();
        assert_eq!(reveal(&stego).unwrap(), "hi");
    }

    #[rstest]
    fn verified_hide(cover: String) {
        assert_eq!(hide_verified(&cover, URL, 9).unwrap(), hide(&cover, URL, 9).unwrap());
    }

    #[rstest]
    fn stray_symbols_in_cover_are_caught(cover: String) {
        let tainted = format!("{}end\u{200C}\u{200C}\u{200C}\u{200C}", cover);
        assert_eq!(hide_verified(&tainted, URL, 9), Err(StegoError::Unrecoverable));
    }

    #[test]
    fn slot_order_is_fixed_per_seed() {
        assert_eq!(shuffled_slots(1234, 40), shuffled_slots(1234, 40));
        assert_ne!(shuffled_slots(1, 40), shuffled_slots(2, 40));

        let mut sorted = shuffled_slots(1234, 40);
        sorted.sort();
        assert_eq!(sorted, (0..40).collect::<Vec<_>>());
    }

    #[rstest]
    fn cover_too_short() {
        assert_eq!(hide("too short", URL, 1), Err(StegoError::CoverTooShort { needed: SEED_SLOTS, found: 1 }));
    }

    #[rstest]
    fn empty_message(cover: String) {
        assert_eq!(hide(&cover, "", 1), Err(StegoError::EmptyMessage));
    }

    #[rstest]
    fn plain_text_has_nothing(cover: String) {
        assert_eq!(reveal(&cover), Err(StegoError::NoPayload));
        assert_eq!(reveal("short"), Err(StegoError::NoPayload));
    }

    #[test]
    fn symbols_encode_bit_pairs() {
        // 0b00_01_10_11
        assert_eq!(to_symbols(&[0x1B]), vec!['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}']);
        assert_eq!(seed_symbols(0).len(), SEED_SLOTS);
    }
}
