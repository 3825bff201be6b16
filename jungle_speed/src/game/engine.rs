//! Jungle Speed game state machine.
//!
//! [`GameEngine`] owns every card in play and is driven by five external
//! events (join, leave, start, draw, grab) plus the deferred cooldown clear
//! that follows each grab. It never blocks and never touches the network;
//! callers serialize access to it (see [`crate::table`]).

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::mem;
use thiserror::Error;

use super::constants::{MAX_PLAYERS, MIN_PLAYERS};
use super::entities::{Card, Deck, Phase, Player, PlayerId, PlayerName, Rank};
use super::views::{GameStateView, PlayerView};

/// Errors from seat management and starting a round.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum UserError {
    #[error("game is full")]
    CapacityReached,
    #[error("need 2+ players")]
    NotEnoughPlayers,
    #[error("player already joined")]
    UserAlreadyExists,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum DrawError {
    #[error("game not in progress")]
    NotInProgress,
    #[error("bottle grab cooldown active")]
    CooldownActive,
    #[error("not your turn")]
    NotYourTurn,
    #[error("no cards left")]
    EmptyDeck,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum GrabError {
    #[error("game not in progress")]
    NotInProgress,
    #[error("player not found")]
    PlayerNotFound,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DrawOutcome {
    Drew,
    Won { winner: PlayerId },
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GrabKind {
    Correct,
    Penalty,
}

/// Identifies the cooldown started by one grab. Only the ticket of the most
/// recent grab in the current round can clear the cooldown.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CooldownTicket {
    round: u64,
    generation: u64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GrabResolution {
    pub kind: GrabKind,
    pub cooldown: CooldownTicket,
}

#[derive(Debug, Default)]
pub struct GameEngine {
    players: Vec<Player>,
    phase: Phase,
    current_player_idx: usize,
    bank: Vec<Card>,
    grab_window_open: bool,
    grab_cooldown_active: bool,
    /// Joker reveals already claimed by a grab, keyed by who revealed them.
    consumed_jokers: HashSet<(PlayerId, Card)>,
    round: u64,
    cooldown_generation: u64,
}

impl GameEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&mut self, id: PlayerId, name: PlayerName) -> Result<(), UserError> {
        if self.players.len() >= MAX_PLAYERS {
            return Err(UserError::CapacityReached);
        }
        if self.contains_player(&id) {
            return Err(UserError::UserAlreadyExists);
        }
        info!("{name} ({id}) joined");
        self.players.push(Player::new(id, name));
        Ok(())
    }

    /// Removes a seat. Unknown ids are ignored.
    pub fn leave(&mut self, id: &PlayerId) {
        let Some(seat) = self.seat_of(id) else {
            return;
        };
        let player = self.players.remove(seat);
        self.consumed_jokers.retain(|(owner, _)| owner != id);
        info!("{} ({id}) left", player.name);

        if seat < self.current_player_idx {
            self.current_player_idx -= 1;
        }
        if self.current_player_idx >= self.players.len() {
            self.current_player_idx = 0;
        }

        if self.phase == Phase::Playing {
            if self.players.len() < MIN_PLAYERS {
                info!("round abandoned with {} player(s) left", self.players.len());
                self.phase = Phase::Waiting;
                self.grab_window_open = false;
            } else {
                // The departed face-up card may have been what opened the window.
                self.grab_window_open &= self.has_rank_match() || self.has_unconsumed_joker();
            }
        }
    }

    /// Shuffles a fresh deck and deals a new round.
    pub fn start_game(&mut self) -> Result<(), UserError> {
        let mut deck = Deck::default();
        deck.shuffle();
        self.start_game_with_deck(deck)
    }

    /// Deals `deck` as-is: seat `i` gets the `i`th contiguous chunk, and the
    /// last card of each chunk is drawn first.
    pub fn start_game_with_deck(&mut self, deck: Deck) -> Result<(), UserError> {
        if self.players.len() < MIN_PLAYERS {
            return Err(UserError::NotEnoughPlayers);
        }

        let hands = deck.deal(self.players.len());
        for (player, hand) in self.players.iter_mut().zip(hands) {
            player.reset(hand);
        }

        self.bank.clear();
        self.consumed_jokers.clear();
        self.grab_window_open = false;
        self.grab_cooldown_active = false;
        self.current_player_idx = 0;
        self.phase = Phase::Playing;
        self.round += 1;

        info!(
            "round {} dealt to {} players, {} cards each",
            self.round,
            self.players.len(),
            self.players[0].draw_deck.len()
        );
        Ok(())
    }

    pub fn draw(&mut self, id: &PlayerId) -> Result<DrawOutcome, DrawError> {
        if self.phase != Phase::Playing {
            return Err(DrawError::NotInProgress);
        }
        if self.grab_cooldown_active {
            return Err(DrawError::CooldownActive);
        }
        let seat = self.current_player_idx;
        let player = &mut self.players[seat];
        if &player.id != id {
            return Err(DrawError::NotYourTurn);
        }
        let Some(card) = player.draw_deck.pop() else {
            return Err(DrawError::EmptyDeck);
        };

        if let Some(displaced) = player.active_card.replace(card) {
            player.used_stack.push(displaced);
            self.consumed_jokers.remove(&(id.clone(), displaced));
        }
        let exhausted = player.draw_deck.is_empty() && player.used_stack.is_empty();
        debug!("{} drew {card}", player.name);

        self.grab_window_open = self.has_rank_match() || self.has_unconsumed_joker();
        self.current_player_idx = (seat + 1) % self.players.len();

        if exhausted {
            info!("{id} has no cards left and wins round {}", self.round);
            self.phase = Phase::Finished;
            return Ok(DrawOutcome::Won { winner: id.clone() });
        }
        Ok(DrawOutcome::Drew)
    }

    /// Resolves a grab and starts the cooldown. The returned ticket must be
    /// handed back to [`GameEngine::clear_cooldown`] once the cooldown period
    /// has elapsed.
    pub fn grab_bottle(&mut self, id: &PlayerId) -> Result<GrabResolution, GrabError> {
        if self.phase != Phase::Playing {
            return Err(GrabError::NotInProgress);
        }
        let grabber = self.seat_of(id).ok_or(GrabError::PlayerNotFound)?;

        self.grab_cooldown_active = true;
        self.cooldown_generation += 1;
        let cooldown = CooldownTicket {
            round: self.round,
            generation: self.cooldown_generation,
        };

        let kind = if !self.grab_window_open {
            self.collect_penalty(grabber);
            GrabKind::Penalty
        } else if self.has_unconsumed_joker() {
            let used = mem::take(&mut self.players[grabber].used_stack);
            self.bank.extend(used);
            let revealed: Vec<(PlayerId, Card)> = self
                .players
                .iter()
                .filter_map(|p| p.active_card.filter(Card::is_joker).map(|c| (p.id.clone(), c)))
                .collect();
            self.consumed_jokers.extend(revealed);
            self.current_player_idx = grabber;
            GrabKind::Correct
        } else {
            let matched = self.matched_seats();
            if matched.contains(&grabber) {
                for seat in matched.into_iter().filter(|&seat| seat != grabber) {
                    let used = mem::take(&mut self.players[seat].used_stack);
                    self.players[grabber].prepend_to_deck(used);
                }
                if !self.bank.is_empty() {
                    let bank = mem::take(&mut self.bank);
                    self.players[grabber].prepend_to_deck(bank);
                }
                self.current_player_idx = grabber;
                GrabKind::Correct
            } else {
                self.collect_penalty(grabber);
                GrabKind::Penalty
            }
        };

        self.grab_window_open = false;
        debug!("{id} grabbed the bottle: {kind:?}");
        Ok(GrabResolution { kind, cooldown })
    }

    /// Ends the cooldown started by the grab that issued `ticket`. Tickets
    /// from an earlier round, or superseded by a later grab, are ignored.
    /// The grab window is left as-is; the next draw recomputes it.
    pub fn clear_cooldown(&mut self, ticket: CooldownTicket) -> bool {
        if ticket.round != self.round
            || ticket.generation != self.cooldown_generation
            || !self.grab_cooldown_active
        {
            debug!("ignoring stale cooldown ticket {ticket:?}");
            return false;
        }
        self.grab_cooldown_active = false;
        true
    }

    pub fn snapshot(&self) -> GameStateView {
        GameStateView {
            phase: self.phase,
            players: self
                .players
                .iter()
                .map(|p| PlayerView {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    draw_deck_count: p.draw_deck.len(),
                    used_stack_count: p.used_stack.len(),
                    active_card: p.active_card,
                })
                .collect(),
            current_player_index: self.current_player_idx,
            bank_count: self.bank.len(),
            grab_window_open: self.grab_window_open,
            grab_cooldown_active: self.grab_cooldown_active,
        }
    }

    /// Every other player's used stack goes under the grabber's draw deck.
    fn collect_penalty(&mut self, grabber: usize) {
        for seat in 0..self.players.len() {
            if seat == grabber {
                continue;
            }
            let used = mem::take(&mut self.players[seat].used_stack);
            self.players[grabber].prepend_to_deck(used);
        }
    }

    /// Face-up cards in seat order.
    pub fn active_cards(&self) -> Vec<(&PlayerId, Card)> {
        self.players
            .iter()
            .filter_map(|p| p.active_card.map(|card| (&p.id, card)))
            .collect()
    }

    /// Groups face-up cards by rank, keeping groups in order of first
    /// appearance.
    fn rank_groups(&self) -> Vec<(Rank, Vec<usize>)> {
        let mut groups: Vec<(Rank, Vec<usize>)> = vec![];
        for (seat, player) in self.players.iter().enumerate() {
            let Some(card) = player.active_card else {
                continue;
            };
            match groups.iter_mut().find(|(rank, _)| *rank == card.rank) {
                Some((_, seats)) => seats.push(seat),
                None => groups.push((card.rank, vec![seat])),
            }
        }
        groups
    }

    pub fn has_rank_match(&self) -> bool {
        self.rank_groups().iter().any(|(_, seats)| seats.len() > 1)
    }

    fn matched_seats(&self) -> Vec<usize> {
        self.rank_groups()
            .into_iter()
            .map(|(_, seats)| seats)
            .find(|seats| seats.len() > 1)
            .unwrap_or_default()
    }

    /// Players in the first group of face-up cards sharing a rank.
    pub fn matched_players(&self) -> Vec<PlayerId> {
        self.matched_seats()
            .into_iter()
            .map(|seat| self.players[seat].id.clone())
            .collect()
    }

    pub fn has_unconsumed_joker(&self) -> bool {
        self.active_cards().into_iter().any(|(id, card)| {
            card.is_joker() && !self.consumed_jokers.contains(&(id.clone(), card))
        })
    }

    pub fn contains_player(&self, id: &PlayerId) -> bool {
        self.seat_of(id).is_some()
    }

    fn seat_of(&self, id: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| &p.id == id)
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_player_idx(&self) -> usize {
        self.current_player_idx
    }

    pub fn current_player(&self) -> Option<&Player> {
        match self.phase {
            Phase::Playing => self.players.get(self.current_player_idx),
            _ => None,
        }
    }

    pub fn bank(&self) -> &[Card] {
        &self.bank
    }

    pub fn grab_window_open(&self) -> bool {
        self.grab_window_open
    }

    pub fn grab_cooldown_active(&self) -> bool {
        self.grab_cooldown_active
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    /// Every card currently held by a player or sitting in the bank.
    pub fn cards_in_play(&self) -> Vec<Card> {
        let mut cards: Vec<Card> = self.bank.clone();
        for player in &self.players {
            cards.extend(&player.draw_deck);
            cards.extend(&player.used_stack);
            cards.extend(player.active_card);
        }
        cards
    }
}
