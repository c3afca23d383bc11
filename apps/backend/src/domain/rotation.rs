//! Turn rotation over the fixed seating order.
//!
//! Players keep their original order for the whole match. "Next active after
//! X" walks forward circularly from X's seat, skipping eliminated players. X
//! itself may be eliminated; its seat is still the starting point.

use crate::domain::ids::PlayerId;
use crate::domain::player::Player;

/// Seat index of `id`, if seated.
pub fn seat_of(players: &[Player], id: &PlayerId) -> Option<usize> {
    players.iter().position(|p| &p.id == id)
}

/// Ids of non-eliminated players in seating order.
pub fn active_players(players: &[Player]) -> Vec<PlayerId> {
    players
        .iter()
        .filter(|p| !p.is_eliminated())
        .map(|p| p.id.clone())
        .collect()
}

/// Next non-eliminated player strictly after `from`, wrapping around.
///
/// Returns `from` itself only when it is the sole active player, and `None`
/// when nobody is active or `from` is not seated.
pub fn next_active_after(players: &[Player], from: &PlayerId) -> Option<PlayerId> {
    let start = seat_of(players, from)?;
    let n = players.len();
    (1..=n)
        .map(|step| &players[(start + step) % n])
        .find(|p| !p.is_eliminated())
        .map(|p| p.id.clone())
}
