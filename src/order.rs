//! Presentation order for a deck.

use rand::Rng;

/// Return a uniformly shuffled copy of `items` (Fisher–Yates).
///
/// The input slice is left untouched so a session never aliases the list it
/// was built from.
pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut shuffled = items.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.random_range(0..=i);
        shuffled.swap(i, j);
    }
    shuffled
}
