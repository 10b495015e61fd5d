use super::score::{score_round, tally_votes, top_voted};
use super::AppState;
use crate::error::RoomError;
use crate::prompt::{pick_category, PromptSet, StaticPrompts};
use crate::protocol::ServerMessage;
use crate::types::*;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

/// When every current player has answered, reveal all answers (unmatched to
/// roles) and open voting. Called on each answer and on disconnects, so the
/// threshold tracks live membership.
pub(super) fn reveal_if_complete(room: &mut Room) -> Option<ServerMessage> {
    if room.phase != RoundPhase::AnswerCollection
        || room.players.is_empty()
        || room.answers.len() != room.players.len()
    {
        return None;
    }

    room.phase = RoundPhase::RevealAnswers;
    // Reveal in join order
    let answers: Vec<Answer> = room
        .players
        .iter()
        .filter_map(|p| room.answers.get(&p.id).cloned())
        .collect();
    let msg = ServerMessage::RevealAnswers {
        answers,
        question: room.current_prompt.clone(),
    };
    room.phase = RoundPhase::VoteCollection;
    Some(msg)
}

/// When every current player has voted, resolve the accusation outcome,
/// score the round, and fold the deltas into the cumulative totals.
pub(super) fn resolve_votes_if_complete(
    room: &mut Room,
) -> Option<(ServerMessage, ServerMessage)> {
    if room.phase != RoundPhase::VoteCollection
        || room.players.is_empty()
        || room.votes.len() != room.players.len()
    {
        return None;
    }

    let tally = tally_votes(&room.votes);
    let top = top_voted(&tally);
    let results = ServerMessage::VoteResults {
        question: room.current_prompt.clone(),
        votes_by_player: room.votes.clone(),
        top_voted: top,
        impostors: room.last_impostors.clone(),
        tally,
    };

    let deltas = score_round(
        &room.players,
        &room.last_impostors,
        &room.votes,
        room.settings.impostor_mode,
    );
    let mut totals = HashMap::new();
    for player in &room.players {
        let delta = deltas.get(&player.name).copied().unwrap_or(0);
        let total = room.scores.entry(player.id.clone()).or_insert(0);
        *total += delta;
        totals.insert(player.name.clone(), *total);
    }

    room.phase = RoundPhase::ScoreReveal;
    Some((results, ServerMessage::ScoreUpdate { totals, deltas }))
}

impl AppState {
    /// Start a round: assign roles, fetch prompts, deliver exactly one
    /// prompt privately to each player. Host-only; valid only between
    /// rounds. Wrong-state requests are silent no-ops, precondition
    /// failures go back to the requester alone.
    pub async fn start_round(&self, conn_id: &str) -> Result<(), RoomError> {
        let code = match self.room_of(conn_id).await {
            Some(code) => code,
            None => return Ok(()),
        };

        let (category, impostor_count) = {
            let mut rooms = self.rooms.write().await;
            let room = match rooms.get_mut(&code) {
                Some(room) => room,
                None => return Ok(()),
            };
            if !room.is_host(conn_id) {
                return Err(RoomError::NotAuthorized);
            }
            if !matches!(room.phase, RoundPhase::Idle | RoundPhase::ScoreReveal) {
                return Ok(());
            }
            if room.players.len() < MIN_PLAYERS {
                return Err(RoomError::InsufficientPlayers(MIN_PLAYERS));
            }

            // Full reset of any prior round
            room.answers.clear();
            room.votes.clear();
            room.last_impostors.clear();
            room.current_prompt.clear();
            room.phase = RoundPhase::RoleAssignment;

            let impostor_count = match room.settings.impostor_mode {
                ImpostorMode::One => 1,
                ImpostorMode::Variable => rand::rng().random_range(0..room.players.len()),
            };
            (pick_category(), impostor_count)
        };

        // Provider round-trip happens outside the registry lock
        let set = self.fetch_prompt_set(category, impostor_count).await;
        let base = set.base;
        let mut variants = set.variants.into_iter();

        let mut rooms = self.rooms.write().await;
        let room = match rooms.get_mut(&code) {
            Some(room) => room,
            None => return Ok(()),
        };
        if room.phase != RoundPhase::RoleAssignment {
            return Ok(());
        }
        if room.players.is_empty() {
            room.phase = RoundPhase::Idle;
            return Ok(());
        }

        // Membership may have shifted while the provider ran
        let impostor_count = impostor_count.min(room.players.len());

        // First `impostor_count` seats impostor, then an unbiased shuffle
        let mut impostor_seats = vec![true; impostor_count];
        impostor_seats.resize(room.players.len(), false);
        impostor_seats.shuffle(&mut rand::rng());

        room.last_impostors = room
            .players
            .iter()
            .zip(&impostor_seats)
            .filter(|(_, seat)| **seat)
            .map(|(p, _)| p.name.clone())
            .collect();
        room.current_prompt = base.clone();

        room.phase = RoundPhase::PromptDispatch;
        // Variants are consumed without replacement; any shortfall degrades
        // that seat to the base prompt
        let deliveries: Vec<(ConnId, String)> = room
            .players
            .iter()
            .zip(&impostor_seats)
            .map(|(p, seat)| {
                let text = if *seat {
                    variants.next().unwrap_or_else(|| base.clone())
                } else {
                    base.clone()
                };
                (p.id.clone(), text)
            })
            .collect();
        room.phase = RoundPhase::AnswerCollection;

        tracing::info!(
            "Round started in {}: {} players, {} impostor(s), category '{}'",
            code,
            room.players.len(),
            impostor_count,
            category
        );
        drop(rooms);

        for (conn, text) in deliveries {
            self.send_to(&conn, ServerMessage::Prompt { text }).await;
        }
        Ok(())
    }

    /// Record (or overwrite) a player's answer. No immediate ack; the
    /// arrival of the last needed answer triggers the reveal inline.
    pub async fn submit_answer(&self, conn_id: &str, text: String) {
        let code = match self.room_of(conn_id).await {
            Some(code) => code,
            None => return,
        };

        let mut rooms = self.rooms.write().await;
        let room = match rooms.get_mut(&code) {
            Some(room) => room,
            None => return,
        };
        if room.phase != RoundPhase::AnswerCollection {
            return;
        }
        let name = match room.player(conn_id) {
            Some(player) => player.name.clone(),
            None => return,
        };
        room.answers.insert(conn_id.to_string(), Answer { name, text });

        if let Some(msg) = reveal_if_complete(room) {
            let room = room.clone();
            drop(rooms);
            self.broadcast_room(&room, msg).await;
        }
    }

    /// Record a player's accusations, keyed by display name; an empty list
    /// is an abstention. The last needed ballot resolves the round inline.
    pub async fn submit_vote(&self, conn_id: &str, accused: Vec<String>) {
        let code = match self.room_of(conn_id).await {
            Some(code) => code,
            None => return,
        };

        let mut rooms = self.rooms.write().await;
        let room = match rooms.get_mut(&code) {
            Some(room) => room,
            None => return,
        };
        if room.phase != RoundPhase::VoteCollection {
            return;
        }
        let name = match room.player(conn_id) {
            Some(player) => player.name.clone(),
            None => return,
        };
        room.votes.insert(name, accused);

        if let Some((results, scores)) = resolve_votes_if_complete(room) {
            let room = room.clone();
            drop(rooms);
            self.broadcast_room(&room, results).await;
            self.broadcast_room(&room, scores).await;
        }
    }

    /// Ask the configured provider for a prompt set; any failure degrades to
    /// the built-in banks rather than failing the round.
    async fn fetch_prompt_set(&self, category: &str, impostor_count: usize) -> PromptSet {
        match self.prompts.generate(category, impostor_count).await {
            Ok(set) if !set.base.trim().is_empty() => set,
            Ok(_) => {
                tracing::warn!("Prompt provider returned an empty base prompt, using fallback");
                StaticPrompts::pick(category, impostor_count)
            }
            Err(e) => {
                tracing::warn!("Prompt provider failed ({}), using fallback", e);
                StaticPrompts::pick(category, impostor_count)
            }
        }
    }
}
