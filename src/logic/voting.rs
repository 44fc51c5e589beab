//! Voting: apply a ballot to the head pair, advance rounds, undo the last vote.

use crate::logic::pairing::generate_pairs;
use crate::models::{
    Ballot, Tournament, TournamentError, TournamentPhase, VoteRecord, DRAW_POINTS, WIN_POINTS,
};

/// Vote on the current pair.
///
/// A win gives the winner +2, a draw gives both entries +1. The pair is dequeued and
/// recorded for undo. When the round's queue runs dry the next round is paired from the
/// updated scores, or the tournament finishes after the last round.
pub fn vote(tournament: &mut Tournament, ballot: Ballot) -> Result<(), TournamentError> {
    if tournament.phase() != TournamentPhase::InRound {
        return Err(TournamentError::InvalidState);
    }
    let pair = tournament
        .pairs
        .front()
        .cloned()
        .ok_or(TournamentError::InvalidState)?;

    let record = match ballot {
        Ballot::Win(title) => {
            let winner = pair
                .get(&title)
                .cloned()
                .ok_or(TournamentError::WinnerNotInPair(title))?;
            tournament.add_points(&winner.title, WIN_POINTS);
            VoteRecord {
                pair,
                winner: Some(winner),
                is_draw: false,
                round: tournament.current_round,
            }
        }
        Ballot::Draw => {
            tournament.add_points(&pair.first.title, DRAW_POINTS);
            tournament.add_points(&pair.second.title, DRAW_POINTS);
            VoteRecord {
                pair,
                winner: None,
                is_draw: true,
                round: tournament.current_round,
            }
        }
    };
    log::debug!(
        "Round {}: {} vs {} -> {}",
        record.round,
        record.pair.first.title,
        record.pair.second.title,
        record
            .winner
            .as_ref()
            .map(|w| w.title.as_str())
            .unwrap_or("draw")
    );
    tournament.history.push(record);
    tournament.pairs.pop_front();
    tournament.round_pairs_voted += 1;

    if tournament.pairs.is_empty() {
        advance_round(tournament);
    }
    Ok(())
}

/// Called when the current round has no pairs left: pair the next round or finish.
fn advance_round(tournament: &mut Tournament) {
    if tournament.current_round >= tournament.rounds {
        tournament.finished = true;
        log::info!("Tournament finished after {} rounds", tournament.current_round);
        return;
    }
    tournament.current_round += 1;
    let pairs = generate_pairs(&tournament.entries, &tournament.scores);
    tournament.round_pair_total = pairs.len();
    tournament.round_pairs_voted = 0;
    tournament.pairs = pairs.into();
    if tournament.pairs.is_empty() {
        tournament.finished = true;
    }
    log::info!(
        "Round {} of {}: {} pairs",
        tournament.current_round,
        tournament.rounds,
        tournament.round_pair_total
    );
}

/// Undo the most recent vote: reverse its points and put its pair back at the head.
///
/// A round advance triggered by that vote is not rolled back; the restored pair is
/// counted into the current round instead. Undoing the final vote reopens voting.
pub fn undo_last_vote(tournament: &mut Tournament) -> Result<(), TournamentError> {
    let record = tournament
        .history
        .pop()
        .ok_or(TournamentError::InvalidState)?;

    for (title, delta) in record.deltas() {
        tournament.add_points(title, -delta);
    }

    if record.round == tournament.current_round && tournament.round_pairs_voted > 0 {
        tournament.round_pairs_voted -= 1;
    } else {
        tournament.round_pair_total += 1;
    }
    tournament.pairs.push_front(record.pair);
    tournament.finished = false;
    Ok(())
}
