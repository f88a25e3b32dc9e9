//! Uniform random pick over eligible concerts.

use rand::Rng;

use crate::concerts::types::Concert;

/// Whether a concert can be picked under an optional price ceiling.
///
/// With a ceiling, only concerts that list a price at or below it qualify.
pub fn is_eligible(concert: &Concert, max_price: Option<f64>) -> bool {
    match max_price {
        None => true,
        Some(ceiling) => concert.price().is_some_and(|price| price <= ceiling),
    }
}

/// Pick one eligible concert uniformly at random.
///
/// Returns `None` when there are no candidates or none pass the price filter.
pub fn pick_random<R>(candidates: Vec<Concert>, max_price: Option<f64>, rng: &mut R) -> Option<Concert>
where
    R: Rng + ?Sized,
{
    let mut eligible: Vec<Concert> = candidates
        .into_iter()
        .filter(|c| is_eligible(c, max_price))
        .collect();

    if eligible.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..eligible.len());
    Some(eligible.swap_remove(index))
}
