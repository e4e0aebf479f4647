//! UI state of the lottery page and the events that move it.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::{error::GatewayError, gateway::TxReceipt, units};

pub const PENDING_MESSAGE: &str = "Waiting on transaction success...";
pub const ENTERED_MESSAGE: &str = "You have been entered! :)";

/// Status line shown under the entry form.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EntryMessage {
    #[default]
    Empty,
    Pending,
    Entered,
    Failed(GatewayError),
}

impl fmt::Display for EntryMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryMessage::Empty => Ok(()),
            EntryMessage::Pending => f.write_str(PENDING_MESSAGE),
            EntryMessage::Entered => f.write_str(ENTERED_MESSAGE),
            EntryMessage::Failed(err) => write!(f, "{}", err),
        }
    }
}

/// Results of the four contract reads done on mount.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LotterySnapshot {
    pub players: Vec<String>,
    pub total_players: String,
    /// Pot in wei.
    pub balance: u128,
    pub winner: String,
}

/// Everything the page shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LotteryState {
    pub players: Vec<String>,
    /// Count as reported by the contract; not reconciled with `players`.
    pub total_players: String,
    #[serde(serialize_with = "serialize_display")]
    pub balance: u128,
    pub entry_value: String,
    #[serde(serialize_with = "serialize_display")]
    pub entry_message: EntryMessage,
    pub winner: String,
}

/// A named state transition.
#[derive(Debug, Clone)]
pub enum ViewEvent {
    Loaded(LotterySnapshot),
    EntryChanged(String),
    SubmitStarted,
    SubmitSucceeded(TxReceipt),
    SubmitFailed(GatewayError),
}

impl ViewEvent {
    /// Event name pushed to WebSocket clients.
    pub fn kind(&self) -> &'static str {
        match self {
            ViewEvent::Loaded(_) => "lottery:loaded",
            ViewEvent::EntryChanged(_) => "entry:changed",
            ViewEvent::SubmitStarted => "entry:pending",
            ViewEvent::SubmitSucceeded(_) => "entry:succeeded",
            ViewEvent::SubmitFailed(_) => "entry:failed",
        }
    }
}

impl LotteryState {
    /// Apply one transition. Pure: the next state depends only on `self` and `event`.
    pub fn apply(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::Loaded(snapshot) => {
                self.players = snapshot.players;
                self.total_players = snapshot.total_players;
                self.balance = snapshot.balance;
                self.winner = snapshot.winner;
            }
            ViewEvent::EntryChanged(value) => self.entry_value = value,
            ViewEvent::SubmitStarted => self.entry_message = EntryMessage::Pending,
            ViewEvent::SubmitSucceeded(_) => self.entry_message = EntryMessage::Entered,
            ViewEvent::SubmitFailed(err) => self.entry_message = EntryMessage::Failed(err),
        }
    }

    /// Pot in ether, derived on every call.
    pub fn display_balance(&self) -> String {
        units::from_wei(self.balance)
    }
}

fn serialize_display<T: fmt::Display, S: Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(value)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn receipt() -> TxReceipt {
        TxReceipt {
            transaction_hash: "0x01".into(),
            block_number: Some(1),
            status: true,
        }
    }

    #[test]
    fn starts_empty() {
        let state = LotteryState::default();
        assert_eq!(state.entry_message, EntryMessage::Empty);
        assert_eq!(state.entry_message.to_string(), "");
        assert_eq!(state.display_balance(), "0");
    }

    #[test]
    fn loaded_keeps_values_verbatim() {
        let mut state = LotteryState::default();
        state.apply(ViewEvent::Loaded(LotterySnapshot {
            players: vec!["0xB".into(), "0xA".into(), "0xB".into()],
            total_players: "2".into(),
            balance: 30_000_000_000_000_000,
            winner: "0xC".into(),
        }));

        assert_eq!(state.players, vec!["0xB", "0xA", "0xB"]);
        assert_eq!(state.total_players, "2");
        assert_eq!(state.display_balance(), "0.03");
        assert_eq!(state.winner, "0xC");
    }

    #[test]
    fn message_walks_pending_then_terminal() {
        let mut state = LotteryState::default();

        state.apply(ViewEvent::SubmitStarted);
        assert_eq!(state.entry_message.to_string(), PENDING_MESSAGE);

        state.apply(ViewEvent::SubmitSucceeded(receipt()));
        assert_eq!(state.entry_message.to_string(), ENTERED_MESSAGE);

        state.apply(ViewEvent::SubmitStarted);
        assert_eq!(state.entry_message, EntryMessage::Pending);

        state.apply(ViewEvent::SubmitFailed(GatewayError::NoAccount));
        assert_eq!(state.entry_message, EntryMessage::Failed(GatewayError::NoAccount));

        state.apply(ViewEvent::SubmitStarted);
        assert_eq!(state.entry_message, EntryMessage::Pending);
    }

    #[test]
    fn entry_changes_leave_message_alone() {
        let mut state = LotteryState::default();
        state.apply(ViewEvent::SubmitSucceeded(receipt()));
        state.apply(ViewEvent::EntryChanged("0.5".into()));
        assert_eq!(state.entry_value, "0.5");
        assert_eq!(state.entry_message, EntryMessage::Entered);
    }

    #[test]
    fn serializes_camel_case_with_display_fields() {
        let mut state = LotteryState::default();
        state.apply(ViewEvent::Loaded(LotterySnapshot {
            players: vec!["0xA".into()],
            total_players: "1".into(),
            balance: 10_000_000_000_000_000,
            winner: String::new(),
        }));
        state.apply(ViewEvent::SubmitStarted);

        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            json!({
                "players": ["0xA"],
                "totalPlayers": "1",
                "balance": "10000000000000000",
                "entryValue": "",
                "entryMessage": PENDING_MESSAGE,
                "winner": ""
            })
        );
    }
}
