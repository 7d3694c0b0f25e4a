use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::dispatch::{self, Connection};
use crate::error::GameError;
use crate::protocol::{
    ChatRecord, ClientMessage, GameStatus, PlayerInfo, RoomSummary, ServerMessage, Stroke,
    WordOptions,
};
use crate::words::{self, GameConfig};

pub type RoomId = Uuid;
pub type PlayerId = Uuid;

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub is_admin: bool,
    pub connection: Connection,
}

impl Player {
    pub fn info(&self) -> PlayerInfo {
        PlayerInfo {
            player_id: self.id,
            player_name: self.name.clone(),
            is_admin: self.is_admin,
        }
    }
}

/// Round state of a room.
///
/// The drawer is only known while a round is being set up or played, and the
/// secret word only exists while a round is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomStatus {
    Idle,
    RoundSetup { drawer: PlayerId },
    RoundActive { drawer: PlayerId, word: String },
    /// The drawer left before the round was over.
    RoundAborted,
    /// Every player has had a drawing turn.
    GameComplete,
}

impl RoomStatus {
    pub fn drawer(&self) -> Option<PlayerId> {
        match self {
            RoomStatus::RoundSetup { drawer } | RoomStatus::RoundActive { drawer, .. } => {
                Some(*drawer)
            }
            _ => None,
        }
    }

    pub fn word(&self) -> Option<&str> {
        match self {
            RoomStatus::RoundActive { word, .. } => Some(word),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RoomStatus::Idle => "IDLE",
            RoomStatus::RoundSetup { .. } => "ROUND_SETUP",
            RoomStatus::RoundActive { .. } => "ROUND_ACTIVE",
            RoomStatus::RoundAborted => "ROUND_ABORTED",
            RoomStatus::GameComplete => "GAME_COMPLETE",
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RoomStatus::Idle => "idle",
            RoomStatus::RoundSetup { .. } => "choosing a word",
            RoomStatus::RoundActive { .. } => "mid-round",
            RoomStatus::RoundAborted => "aborted",
            RoomStatus::GameComplete => "finished",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub room_name: String,
    pub status: &'static str,
    pub players: Vec<PlayerInfo>,
    pub drawing_player_id: Option<PlayerId>,
}

/// A game room and the rules that drive it.
///
/// Every operation either applies completely, pushing its notifications to
/// the affected players, or returns an error and leaves the room untouched.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    name: String,
    config: Arc<GameConfig>,
    status: RoomStatus,
    /// In join order, which is also the drawing order.
    players: Vec<Player>,
    drawn_player_ids: HashSet<PlayerId>,
    admin_assigned: bool,
}

impl Room {
    pub fn new(id: RoomId, name: String, config: Arc<GameConfig>) -> Self {
        Self {
            id,
            name,
            config,
            status: RoomStatus::Idle,
            players: Vec::new(),
            drawn_player_ids: HashSet::new(),
            admin_assigned: false,
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn status(&self) -> &RoomStatus {
        &self.status
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, player_id: PlayerId) -> Result<&Player, GameError> {
        self.players
            .iter()
            .find(|p| p.id == player_id)
            .ok_or(GameError::UnknownPlayer(player_id))
    }

    pub fn drawing_player_id(&self) -> Option<PlayerId> {
        self.status.drawer()
    }

    pub fn current_word(&self) -> Option<&str> {
        self.status.word()
    }

    pub fn has_drawn(&self, player_id: PlayerId) -> bool {
        self.drawn_player_ids.contains(&player_id)
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            room_id: self.id,
            room_name: self.name.clone(),
        }
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.id,
            room_name: self.name.clone(),
            status: self.status.label(),
            players: self.players.iter().map(Player::info).collect(),
            drawing_player_id: self.status.drawer(),
        }
    }

    /// Routes a decoded client message to the matching operation.
    pub fn apply(&mut self, player_id: PlayerId, message: ClientMessage) -> Result<(), GameError> {
        match message {
            ClientMessage::StartGame => self.start_game(player_id),
            ClientMessage::ChooseWord(word) => self.choose_word(player_id, word),
            ClientMessage::Chat(text) => self.chat(player_id, text.into_text()),
            ClientMessage::Guess(text) => self.guess(player_id, text.into_text()),
            ClientMessage::Draw(stroke) => self.stream(player_id, stroke),
        }
    }

    /// Adds a player. Only the first player to ever join becomes admin.
    pub fn join(
        &mut self,
        name: String,
        is_admin_requested: bool,
        connection: Connection,
    ) -> PlayerInfo {
        let is_admin = !self.admin_assigned;
        self.admin_assigned = true;
        if is_admin_requested && !is_admin {
            debug!(room_id = %self.id, "ignoring admin request from {name}");
        }

        let player = Player {
            id: Uuid::new_v4(),
            name,
            is_admin,
            connection,
        };
        let info = player.info();
        info!(room_id = %self.id, player_id = %player.id, is_admin, "{} joined", player.name);

        dispatch::send_to(&player, &ServerMessage::PlayerCreated(info.clone()));
        dispatch::send_to(
            &player,
            &ServerMessage::admin(format!("Welcome, {}!!", player.name)),
        );
        dispatch::broadcast(
            &self.players,
            &ServerMessage::admin(format!("{} joined the party!!", player.name)),
            None,
        );

        self.players.push(player);
        info
    }

    /// Hands the next drawing turn to the earliest joined player who has not
    /// drawn yet, or completes the game when there is none.
    pub fn start_game(&mut self, player_id: PlayerId) -> Result<(), GameError> {
        self.player(player_id)?;
        if matches!(
            self.status,
            RoomStatus::RoundSetup { .. } | RoomStatus::GameComplete
        ) {
            return Err(GameError::CannotStart(self.status.clone()));
        }

        let Some(index) = self
            .players
            .iter()
            .position(|p| !self.drawn_player_ids.contains(&p.id))
        else {
            info!(room_id = %self.id, "every player has drawn, game complete");
            self.status = RoomStatus::GameComplete;
            dispatch::broadcast(
                &self.players,
                &ServerMessage::GameStatus(GameStatus::Complete),
                None,
            );
            return Ok(());
        };

        let drawer = &self.players[index];
        let drawer_id = drawer.id;
        self.drawn_player_ids.insert(drawer_id);
        self.status = RoomStatus::RoundSetup { drawer: drawer_id };
        info!(room_id = %self.id, player_id = %drawer_id, "round started");

        dispatch::broadcast(
            &self.players,
            &ServerMessage::GameStatus(GameStatus::Started),
            None,
        );
        let options = self.config.word_options(&mut rand::thread_rng());
        dispatch::send_to(
            drawer,
            &ServerMessage::WordOptions(WordOptions { words: options }),
        );
        dispatch::send_to(drawer, &ServerMessage::DrawingPlayer(drawer_id));
        dispatch::broadcast(
            &self.players,
            &ServerMessage::PlayerChoosingWord(format!("{} is choosing the word…", drawer.name)),
            Some(drawer_id),
        );
        Ok(())
    }

    pub fn choose_word(&mut self, player_id: PlayerId, word: String) -> Result<(), GameError> {
        let player = self.player(player_id)?;
        match self.status {
            RoomStatus::RoundSetup { drawer } if drawer == player_id => {}
            RoomStatus::RoundSetup { .. } => return Err(GameError::NotDrawer("choose the word")),
            _ => return Err(GameError::NoWordToChoose),
        }
        if word.trim().is_empty() {
            return Err(GameError::EmptyWord);
        }

        let clue = words::mask(&word);
        dispatch::send_to(player, &ServerMessage::GameWord(word.clone()));
        dispatch::broadcast(
            &self.players,
            &ServerMessage::GameWordClue(clue),
            Some(player_id),
        );
        debug!(room_id = %self.id, player_id = %player_id, "word chosen");
        self.status = RoomStatus::RoundActive {
            drawer: player_id,
            word,
        };
        Ok(())
    }

    /// Forwards a stroke from the drawer to everyone else.
    pub fn stream(&self, player_id: PlayerId, stroke: Stroke) -> Result<(), GameError> {
        self.player(player_id)?;
        match self.status {
            RoomStatus::RoundActive { drawer, .. } if drawer == player_id => {}
            RoomStatus::RoundActive { .. } => return Err(GameError::NotDrawer("draw")),
            _ => return Err(GameError::NoActiveRound),
        }
        dispatch::broadcast(&self.players, &ServerMessage::Draw(stroke), Some(player_id));
        Ok(())
    }

    pub fn chat(&self, player_id: PlayerId, text: String) -> Result<(), GameError> {
        let sender = self.player(player_id)?;
        dispatch::broadcast(
            &self.players,
            &ServerMessage::Chat(ChatRecord::new(sender.name.as_str(), text)),
            None,
        );
        Ok(())
    }

    /// Checks a guess against the secret word.
    ///
    /// A hit is announced to the others without repeating the word, a miss is
    /// shown to everyone as an ordinary chat message.
    pub fn guess(&self, player_id: PlayerId, text: String) -> Result<(), GameError> {
        let sender = self.player(player_id)?;
        let RoomStatus::RoundActive { drawer, word } = &self.status else {
            return Err(GameError::NoActiveRound);
        };
        if *drawer == player_id {
            return Err(GameError::DrawerGuess);
        }

        let echo = ServerMessage::Chat(ChatRecord::new(sender.name.as_str(), text.as_str()));
        if text != *word {
            dispatch::broadcast(&self.players, &echo, None);
            return Ok(());
        }

        info!(room_id = %self.id, player_id = %player_id, "word guessed");
        dispatch::broadcast(
            &self.players,
            &ServerMessage::admin(format!("Player {} guessed the word", sender.name)),
            Some(player_id),
        );
        dispatch::send_to(sender, &echo);
        Ok(())
    }

    /// Removes a player. A drawer leaving mid-round aborts the round.
    pub fn disconnect(&mut self, player_id: PlayerId) -> Result<Player, GameError> {
        let index = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(GameError::UnknownPlayer(player_id))?;
        let player = self.players.remove(index);
        info!(room_id = %self.id, player_id = %player_id, "{} left", player.name);

        dispatch::broadcast(
            &self.players,
            &ServerMessage::admin(format!("{} left the party!!", player.name)),
            None,
        );

        if self.status.drawer() == Some(player_id) {
            info!(room_id = %self.id, "drawer left, round aborted");
            self.status = RoomStatus::RoundAborted;
            dispatch::broadcast(
                &self.players,
                &ServerMessage::GameStatus(GameStatus::RoundAborted),
                None,
            );
        }
        Ok(player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::ws::Message;
    use serde_json::{json, Value};
    use tokio::sync::mpsc::UnboundedReceiver;

    struct Client {
        id: PlayerId,
        info: PlayerInfo,
        rx: UnboundedReceiver<Message>,
    }

    impl Client {
        fn drain(&mut self) -> Vec<Value> {
            let mut messages = Vec::new();
            while let Ok(Message::Text(text)) = self.rx.try_recv() {
                messages.push(serde_json::from_str(&text).unwrap());
            }
            messages
        }
    }

    fn room() -> Room {
        Room::new(
            Uuid::new_v4(),
            "Art Night".to_string(),
            Arc::new(GameConfig::default()),
        )
    }

    fn join(room: &mut Room, name: &str, is_admin: bool) -> Client {
        let (connection, rx) = dispatch::connection();
        let info = room.join(name.to_string(), is_admin, connection);
        Client {
            id: info.player_id,
            info,
            rx,
        }
    }

    fn stroke(body: Value) -> Stroke {
        serde_json::from_value(body).unwrap()
    }

    fn of_type<'a>(messages: &'a [Value], tag: &str) -> Vec<&'a Value> {
        messages
            .iter()
            .filter(|m| m["message_type"] == tag)
            .map(|m| &m["message"])
            .collect()
    }

    /// Alice and Bob in a room where Alice has chosen "Laptop".
    fn active_round() -> (Room, Client, Client) {
        let mut room = room();
        let mut alice = join(&mut room, "Alice", false);
        let mut bob = join(&mut room, "Bob", false);
        room.start_game(alice.id).unwrap();
        room.choose_word(alice.id, "Laptop".into()).unwrap();
        alice.drain();
        bob.drain();
        (room, alice, bob)
    }

    fn assert_word_invariant(room: &Room) {
        assert_eq!(
            room.current_word().is_some(),
            matches!(room.status(), RoomStatus::RoundActive { .. })
        );
    }

    #[test]
    fn first_player_is_the_only_admin() {
        let mut room = room();
        let alice = join(&mut room, "Alice", false);
        let bob = join(&mut room, "Bob", true);

        assert!(alice.info.is_admin);
        assert!(!bob.info.is_admin);
        assert_eq!(room.players().iter().filter(|p| p.is_admin).count(), 1);
    }

    #[test]
    fn admin_is_not_reassigned_after_the_first_player_leaves() {
        let mut room = room();
        let alice = join(&mut room, "Alice", false);
        room.disconnect(alice.id).unwrap();
        let carol = join(&mut room, "Carol", true);

        assert!(!carol.info.is_admin);
    }

    #[test]
    fn join_greets_the_new_player_and_tells_the_others() {
        let mut room = room();
        let mut alice = join(&mut room, "Alice", false);
        let mut bob = join(&mut room, "Bob", false);

        let alice_msgs = alice.drain();
        assert_eq!(alice_msgs[0]["message_type"], "PLAYER_CREATED");
        assert_eq!(alice_msgs[0]["message"]["player_name"], "Alice");
        assert_eq!(alice_msgs[0]["message"]["is_admin"], true);
        let admin: Vec<_> = of_type(&alice_msgs, "ADMIN_MESSAGE")
            .into_iter()
            .map(|m| m["message"].as_str().unwrap())
            .collect();
        assert_eq!(admin, vec!["Welcome, Alice!!", "Bob joined the party!!"]);

        let bob_msgs = bob.drain();
        assert_eq!(bob_msgs[0]["message_type"], "PLAYER_CREATED");
        assert_eq!(
            bob_msgs[0]["message"]["player_id"],
            bob.id.to_string().as_str()
        );
        let admin: Vec<_> = of_type(&bob_msgs, "ADMIN_MESSAGE")
            .into_iter()
            .map(|m| m["message"].as_str().unwrap())
            .collect();
        assert_eq!(admin, vec!["Welcome, Bob!!"]);
    }

    #[test]
    fn start_game_offers_words_to_the_first_undrawn_player() {
        let mut room = room();
        let mut alice = join(&mut room, "Alice", false);
        let mut bob = join(&mut room, "Bob", false);
        alice.drain();
        bob.drain();

        room.start_game(bob.id).unwrap();

        assert_eq!(room.drawing_player_id(), Some(alice.id));
        assert!(room.has_drawn(alice.id));
        assert_eq!(room.status().label(), "ROUND_SETUP");
        assert_word_invariant(&room);

        let alice_msgs = alice.drain();
        assert_eq!(of_type(&alice_msgs, "GAME_STATUS"), vec!["STARTED"]);
        let options = of_type(&alice_msgs, "CHOOSE_WORD");
        assert_eq!(options.len(), 1);
        assert_eq!(options[0]["words"].as_array().unwrap().len(), 3);
        assert_eq!(
            of_type(&alice_msgs, "DRAWING_PLAYER"),
            vec![alice.id.to_string().as_str()]
        );
        assert!(of_type(&alice_msgs, "PLAYER_CHOOSING_WORD").is_empty());

        let bob_msgs = bob.drain();
        assert_eq!(of_type(&bob_msgs, "GAME_STATUS"), vec!["STARTED"]);
        assert!(of_type(&bob_msgs, "CHOOSE_WORD").is_empty());
        assert!(of_type(&bob_msgs, "DRAWING_PLAYER").is_empty());
        assert_eq!(
            of_type(&bob_msgs, "PLAYER_CHOOSING_WORD"),
            vec!["Alice is choosing the word…"]
        );
    }

    #[test]
    fn starting_twice_before_a_word_is_chosen_does_nothing() {
        let mut room = room();
        let mut alice = join(&mut room, "Alice", false);
        let mut bob = join(&mut room, "Bob", false);
        room.start_game(alice.id).unwrap();
        alice.drain();
        bob.drain();

        let result = room.start_game(alice.id);

        assert_eq!(
            result,
            Err(GameError::CannotStart(RoomStatus::RoundSetup { drawer: alice.id }))
        );
        assert_eq!(room.drawing_player_id(), Some(alice.id));
        assert!(!room.has_drawn(bob.id));
        assert!(alice.drain().is_empty());
        assert!(bob.drain().is_empty());
    }

    #[test]
    fn chosen_word_is_masked_for_guessers() {
        let mut room = room();
        let mut alice = join(&mut room, "Alice", false);
        let mut bob = join(&mut room, "Bob", false);
        room.start_game(alice.id).unwrap();
        alice.drain();
        bob.drain();

        room.choose_word(alice.id, "Laptop".into()).unwrap();

        assert_eq!(room.current_word(), Some("Laptop"));
        assert_word_invariant(&room);
        let alice_msgs = alice.drain();
        assert_eq!(of_type(&alice_msgs, "GAME_WORD"), vec!["Laptop"]);
        assert!(of_type(&alice_msgs, "GAME_WORD_CLUE").is_empty());
        let bob_msgs = bob.drain();
        assert_eq!(of_type(&bob_msgs, "GAME_WORD_CLUE"), vec!["______"]);
        assert!(of_type(&bob_msgs, "GAME_WORD").is_empty());
    }

    #[test]
    fn only_the_drawer_chooses_the_word() {
        let mut room = room();
        let alice = join(&mut room, "Alice", false);
        let mut bob = join(&mut room, "Bob", false);

        assert_eq!(
            room.choose_word(alice.id, "Pen".into()),
            Err(GameError::NoWordToChoose)
        );

        room.start_game(alice.id).unwrap();
        bob.drain();
        assert_eq!(
            room.choose_word(bob.id, "Pen".into()),
            Err(GameError::NotDrawer("choose the word"))
        );
        assert_eq!(room.choose_word(alice.id, "  ".into()), Err(GameError::EmptyWord));
        assert_eq!(room.status().label(), "ROUND_SETUP");
        assert_eq!(room.current_word(), None);
        assert!(bob.drain().is_empty());
    }

    #[test]
    fn correct_guess_is_announced_without_the_word() {
        let (mut room, mut alice, mut bob) = active_round();
        let mut carol = join(&mut room, "Carol", false);
        alice.drain();
        carol.drain();

        room.guess(bob.id, "Laptop".into()).unwrap();

        for watcher in [&mut alice, &mut carol] {
            let msgs = watcher.drain();
            assert_eq!(msgs.len(), 1);
            assert_eq!(msgs[0]["message_type"], "ADMIN_MESSAGE");
            assert_eq!(msgs[0]["message"]["message"], "Player Bob guessed the word");
            assert!(!msgs[0].to_string().contains("Laptop"));
        }

        let bob_msgs = bob.drain();
        assert_eq!(bob_msgs.len(), 1);
        assert_eq!(bob_msgs[0]["message_type"], "CHAT");
        assert_eq!(bob_msgs[0]["message"]["sender"], "Bob");
        assert_eq!(bob_msgs[0]["message"]["message"], "Laptop");

        // Guessing does not end the round.
        assert_eq!(room.current_word(), Some("Laptop"));
    }

    #[test]
    fn wrong_guess_is_plain_chat_for_everyone() {
        let (room, mut alice, mut bob) = active_round();

        room.guess(bob.id, "Lapto".into()).unwrap();

        for client in [&mut alice, &mut bob] {
            let msgs = client.drain();
            assert_eq!(msgs.len(), 1);
            assert_eq!(msgs[0]["message_type"], "CHAT");
            assert_eq!(msgs[0]["message"]["sender"], "Bob");
            assert_eq!(msgs[0]["message"]["message"], "Lapto");
        }
    }

    #[test]
    fn guesses_are_case_sensitive_and_untrimmed() {
        let (room, mut alice, bob) = active_round();

        room.guess(bob.id, "laptop".into()).unwrap();
        room.guess(bob.id, "Laptop ".into()).unwrap();

        let msgs = alice.drain();
        assert_eq!(of_type(&msgs, "CHAT").len(), 2);
        assert!(of_type(&msgs, "ADMIN_MESSAGE").is_empty());
    }

    #[test]
    fn guessing_needs_an_active_round() {
        let mut room = room();
        let alice = join(&mut room, "Alice", false);
        let bob = join(&mut room, "Bob", false);
        assert_eq!(room.guess(bob.id, "Pen".into()), Err(GameError::NoActiveRound));

        room.start_game(alice.id).unwrap();
        assert_eq!(room.guess(bob.id, "Pen".into()), Err(GameError::NoActiveRound));

        room.choose_word(alice.id, "Pen".into()).unwrap();
        assert_eq!(room.guess(alice.id, "Pen".into()), Err(GameError::DrawerGuess));
    }

    #[test]
    fn chat_is_echoed_to_everyone_in_any_status() {
        let mut room = room();
        let mut alice = join(&mut room, "Alice", false);
        let mut bob = join(&mut room, "Bob", false);
        alice.drain();
        bob.drain();

        room.chat(bob.id, "hi all".into()).unwrap();

        for client in [&mut alice, &mut bob] {
            let msgs = client.drain();
            assert_eq!(of_type(&msgs, "CHAT")[0]["message"], "hi all");
            assert_eq!(of_type(&msgs, "CHAT")[0]["sender"], "Bob");
        }
    }

    #[test]
    fn strokes_reach_everyone_but_the_drawer_in_order() {
        let (room, mut alice, mut bob) = active_round();
        let first = json!({"start_x": 0.0, "start_y": 0.0, "end_x": 1.5, "end_y": 1.5});
        let second = json!({"start_x": 1.5, "start_y": 1.5, "end_x": 3.0, "end_y": 2.0});

        room.stream(alice.id, stroke(first.clone())).unwrap();
        room.stream(alice.id, stroke(second.clone())).unwrap();

        assert!(alice.drain().is_empty());
        let received: Vec<Value> = of_type(&bob.drain(), "DRAW")
            .into_iter()
            .cloned()
            .collect();
        assert_eq!(received, vec![first, second]);
    }

    #[test]
    fn strokes_are_forwarded_untouched() {
        let (mut room, mut alice, mut bob) = active_round();
        let body = json!({
            "start_x": 1,
            "start_y": 2,
            "end_x": 3,
            "end_y": 4,
            "color": "red",
            "width": 5
        });

        room.apply(alice.id, ClientMessage::Draw(stroke(body.clone())))
            .unwrap();

        assert!(alice.drain().is_empty());
        let received = bob.drain();
        let draws = of_type(&received, "DRAW");
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0], &body);
        assert!(draws[0]["start_x"].is_u64());
        assert_eq!(draws[0]["color"], "red");
    }

    #[test]
    fn only_the_drawer_may_stream() {
        let (room, mut alice, bob) = active_round();
        let line = stroke(json!({"start_x": 0, "start_y": 0, "end_x": 1, "end_y": 1}));

        assert_eq!(room.stream(bob.id, line), Err(GameError::NotDrawer("draw")));
        assert!(alice.drain().is_empty());
    }

    #[test]
    fn turns_rotate_until_the_game_is_complete() {
        let (mut room, mut alice, bob) = active_round();

        room.start_game(alice.id).unwrap();
        assert_eq!(room.drawing_player_id(), Some(bob.id));
        assert_word_invariant(&room);
        room.choose_word(bob.id, "Pen".into()).unwrap();
        alice.drain();

        room.start_game(alice.id).unwrap();
        assert_eq!(room.status(), &RoomStatus::GameComplete);
        assert_eq!(room.drawing_player_id(), None);
        assert_word_invariant(&room);
        assert_eq!(of_type(&alice.drain(), "GAME_STATUS"), vec!["COMPLETE"]);

        assert_eq!(
            room.start_game(alice.id),
            Err(GameError::CannotStart(RoomStatus::GameComplete))
        );
        assert!(alice.drain().is_empty());
    }

    #[test]
    fn drawer_leaving_aborts_the_round() {
        let (mut room, alice, mut bob) = active_round();
        let mut carol = join(&mut room, "Carol", false);
        bob.drain();

        room.disconnect(alice.id).unwrap();

        assert_eq!(room.status(), &RoomStatus::RoundAborted);
        assert_eq!(room.drawing_player_id(), None);
        assert_word_invariant(&room);
        let bob_msgs = bob.drain();
        assert_eq!(
            of_type(&bob_msgs, "ADMIN_MESSAGE")[0]["message"],
            "Alice left the party!!"
        );
        assert_eq!(of_type(&bob_msgs, "GAME_STATUS"), vec!["ROUND_ABORTED"]);
        assert_eq!(room.guess(bob.id, "Laptop".into()), Err(GameError::NoActiveRound));

        // The next round goes to the earliest player who has not drawn.
        carol.drain();
        room.start_game(carol.id).unwrap();
        assert_eq!(room.drawing_player_id(), Some(bob.id));
    }

    #[test]
    fn guesser_leaving_keeps_the_round() {
        let (mut room, mut alice, bob) = active_round();

        room.disconnect(bob.id).unwrap();

        assert_eq!(room.current_word(), Some("Laptop"));
        assert_eq!(room.players().len(), 1);
        let msgs = alice.drain();
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0]["message"]["message"], "Bob left the party!!");
    }

    #[test]
    fn strangers_are_rejected() {
        let (mut room, _alice, _bob) = active_round();
        let stranger = Uuid::new_v4();

        assert_eq!(room.chat(stranger, "hi".into()), Err(GameError::UnknownPlayer(stranger)));
        assert_eq!(room.start_game(stranger), Err(GameError::UnknownPlayer(stranger)));
        assert!(matches!(
            room.disconnect(stranger),
            Err(GameError::UnknownPlayer(_))
        ));
        assert_eq!(room.players().len(), 2);
    }

    #[test]
    fn apply_routes_client_messages() {
        let mut room = room();
        let mut alice = join(&mut room, "Alice", false);
        let mut bob = join(&mut room, "Bob", false);

        room.apply(alice.id, ClientMessage::StartGame).unwrap();
        room.apply(alice.id, ClientMessage::ChooseWord("Pen".into())).unwrap();
        alice.drain();
        bob.drain();
        room.apply(
            bob.id,
            ClientMessage::Guess(crate::protocol::ChatText::Plain("Pen".into())),
        )
        .unwrap();

        assert_eq!(
            of_type(&alice.drain(), "ADMIN_MESSAGE")[0]["message"],
            "Player Bob guessed the word"
        );
    }
}
