//! Typo generation from QWERTY key adjacency

use rand::seq::SliceRandom;
use rand::Rng;

/// Physical neighbours of each letter on a US QWERTY layout
const QWERTY_NEIGHBOURS: [(char, &[char]); 26] = [
    ('q', &['w', 'a', 's']),
    ('w', &['q', 'e', 'a', 's', 'd']),
    ('e', &['w', 'r', 's', 'd', 'f']),
    ('r', &['e', 't', 'd', 'f', 'g']),
    ('t', &['r', 'y', 'f', 'g', 'h']),
    ('y', &['t', 'u', 'g', 'h', 'j']),
    ('u', &['y', 'i', 'h', 'j', 'k']),
    ('i', &['u', 'o', 'j', 'k', 'l']),
    ('o', &['i', 'p', 'k', 'l']),
    ('p', &['o', 'l']),
    ('a', &['q', 'w', 's', 'z']),
    ('s', &['w', 'e', 'a', 'd', 'z', 'x']),
    ('d', &['e', 'r', 's', 'f', 'x', 'c']),
    ('f', &['r', 't', 'd', 'g', 'c', 'v']),
    ('g', &['t', 'y', 'f', 'h', 'v', 'b']),
    ('h', &['y', 'u', 'g', 'j', 'b', 'n']),
    ('j', &['u', 'i', 'h', 'k', 'n', 'm']),
    ('k', &['i', 'o', 'j', 'l', 'm']),
    ('l', &['o', 'p', 'k']),
    ('z', &['a', 's', 'x']),
    ('x', &['s', 'd', 'z', 'c']),
    ('c', &['d', 'f', 'x', 'v']),
    ('v', &['f', 'g', 'c', 'b']),
    ('b', &['g', 'h', 'v', 'n']),
    ('n', &['h', 'j', 'b', 'm']),
    ('m', &['j', 'k', 'n']),
];

pub fn neighbours(ch: char) -> Option<&'static [char]> {
    let lower = ch.to_ascii_lowercase();
    QWERTY_NEIGHBOURS
        .iter()
        .find(|(key, _)| *key == lower)
        .map(|(_, keys)| *keys)
}

/// The key a finger would plausibly hit instead of `intended`.
///
/// Letters map to a random neighbour in the same case; anything else to
/// the next code point (or itself at the end of the range).
pub fn wrong_key<R: Rng + ?Sized>(intended: char, rng: &mut R) -> char {
    match neighbours(intended).and_then(|keys| keys.choose(rng)) {
        Some(&wrong) if intended.is_uppercase() => wrong.to_ascii_uppercase(),
        Some(&wrong) => wrong,
        None => char::from_u32(intended as u32 + 1).unwrap_or(intended),
    }
}

/// Index of the character to fumble in `word`, if it is long enough
pub fn typo_index<R: Rng + ?Sized>(word: &str, rng: &mut R) -> Option<usize> {
    let len = word.chars().count();
    (len >= 2).then(|| rng.gen_range(0..len))
}
