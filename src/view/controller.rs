//! The view controller: owns the page state, loads it from the contract on
//! mount, and runs the entry flow on submit.

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};

use super::{
    render::{render, Theme, ViewNode},
    state::{LotterySnapshot, LotteryState, ViewEvent},
};
use crate::{
    error::GatewayError,
    gateway::{EntryRequest, LotteryGateway, TxReceipt, WalletProvider},
    units,
};

pub struct ViewController<G, W> {
    gateway: G,
    wallet: W,
    state: Mutex<LotteryState>,
    /// Broadcast channel for WebSocket events.
    event_tx: broadcast::Sender<String>,
}

impl<G: LotteryGateway, W: WalletProvider> ViewController<G, W> {
    pub fn new(gateway: G, wallet: W, event_tx: broadcast::Sender<String>) -> Arc<Self> {
        Arc::new(Self {
            gateway,
            wallet,
            state: Mutex::new(LotteryState::default()),
            event_tx,
        })
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> LotteryState {
        self.state.lock().await.clone()
    }

    pub async fn render(&self, theme: Theme) -> ViewNode {
        render(&*self.state.lock().await, theme)
    }

    /// Read players, player count, pot and last winner concurrently and store
    /// them together. Any read failure is returned as is and leaves the state
    /// untouched.
    pub async fn initialize(&self) -> Result<(), GatewayError> {
        let (players, total_players, balance, winner) = tokio::try_join!(
            self.gateway.view_players(),
            self.gateway.total_players(),
            self.gateway.balance(self.gateway.contract_address()),
            self.gateway.curr_winner(),
        )?;

        tracing::debug!(
            players = players.len(),
            total_players = %total_players,
            balance = balance,
            "lottery state loaded"
        );

        self.dispatch(ViewEvent::Loaded(LotterySnapshot {
            players,
            total_players,
            balance,
            winner,
        }))
        .await;
        Ok(())
    }

    /// Mirror the form input.
    pub async fn set_entry_value(&self, value: String) {
        self.dispatch(ViewEvent::EntryChanged(value)).await;
    }

    /// Enter the lottery with `entered_amount` ether from the wallet's first account.
    ///
    /// Only a failure to list the wallet's accounts is returned; everything
    /// after the status turns pending ends up in the status message.
    pub async fn on_submit(&self, entered_amount: &str) -> Result<(), GatewayError> {
        let accounts = self.wallet.accounts().await?;

        self.dispatch(ViewEvent::SubmitStarted).await;

        match self.send_entry(accounts, entered_amount).await {
            Ok(receipt) => {
                tracing::info!(
                    tx_hash = %receipt.transaction_hash,
                    block = ?receipt.block_number,
                    "entered the lottery"
                );
                self.dispatch(ViewEvent::SubmitSucceeded(receipt)).await;
            }
            Err(e) => {
                tracing::warn!(error = %e, amount = %entered_amount, "entry failed");
                self.dispatch(ViewEvent::SubmitFailed(e)).await;
            }
        }
        Ok(())
    }

    async fn send_entry(
        &self,
        accounts: Vec<String>,
        entered_amount: &str,
    ) -> Result<TxReceipt, GatewayError> {
        let value = units::to_wei(entered_amount)?;
        let from = accounts.into_iter().next().ok_or(GatewayError::NoAccount)?;
        self.gateway.enter(EntryRequest { from, value }).await
    }

    async fn dispatch(&self, event: ViewEvent) {
        let mut message = serde_json::json!({ "type": event.kind() });
        match &event {
            ViewEvent::EntryChanged(value) => message["entryValue"] = value.as_str().into(),
            ViewEvent::SubmitSucceeded(receipt) => {
                message["transactionHash"] = receipt.transaction_hash.as_str().into()
            }
            ViewEvent::SubmitFailed(err) => message["error"] = err.to_string().into(),
            ViewEvent::Loaded(_) | ViewEvent::SubmitStarted => {}
        }

        self.state.lock().await.apply(event);

        // No subscribers is fine.
        let _ = self.event_tx.send(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::VecDeque, sync::Mutex as StdMutex};

    use serde_json::json;
    use tokio::sync::oneshot;

    use super::*;
    use crate::view::state::{EntryMessage, ENTERED_MESSAGE, PENDING_MESSAGE};

    const CONTRACT: &str = "0x00000000000000000000000000000000000000aa";
    const ALICE: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    type Outcome = Result<TxReceipt, GatewayError>;

    #[derive(Default)]
    struct FakeGateway {
        players: Vec<String>,
        total_players: String,
        balance: u128,
        winner: String,
        failing_read: Option<GatewayError>,
        balance_queries: StdMutex<Vec<String>>,
        entries: StdMutex<Vec<EntryRequest>>,
        outcomes: StdMutex<VecDeque<oneshot::Receiver<Outcome>>>,
    }

    impl FakeGateway {
        /// Queue the outcome of the next `enter` call; resolve it through the sender.
        fn script_entry(&self) -> oneshot::Sender<Outcome> {
            let (tx, rx) = oneshot::channel();
            self.outcomes.lock().unwrap().push_back(rx);
            tx
        }

        fn entry_count(&self) -> usize {
            self.entries.lock().unwrap().len()
        }
    }

    impl LotteryGateway for FakeGateway {
        async fn view_players(&self) -> Result<Vec<String>, GatewayError> {
            Ok(self.players.clone())
        }

        async fn total_players(&self) -> Result<String, GatewayError> {
            match &self.failing_read {
                Some(err) => Err(err.clone()),
                None => Ok(self.total_players.clone()),
            }
        }

        async fn curr_winner(&self) -> Result<String, GatewayError> {
            Ok(self.winner.clone())
        }

        async fn balance(&self, address: &str) -> Result<u128, GatewayError> {
            self.balance_queries.lock().unwrap().push(address.to_string());
            Ok(self.balance)
        }

        async fn enter(&self, request: EntryRequest) -> Result<TxReceipt, GatewayError> {
            self.entries.lock().unwrap().push(request);
            let outcome = self.outcomes.lock().unwrap().pop_front();
            match outcome {
                Some(rx) => rx
                    .await
                    .unwrap_or_else(|_| Err(GatewayError::NetworkFailure("dropped".into()))),
                None => Ok(receipt("0xfeed")),
            }
        }

        fn contract_address(&self) -> &str {
            CONTRACT
        }
    }

    struct FakeWallet {
        accounts: Result<Vec<String>, GatewayError>,
    }

    impl FakeWallet {
        fn with(accounts: &[&str]) -> Self {
            Self {
                accounts: Ok(accounts.iter().map(|a| a.to_string()).collect()),
            }
        }
    }

    impl WalletProvider for FakeWallet {
        async fn accounts(&self) -> Result<Vec<String>, GatewayError> {
            self.accounts.clone()
        }
    }

    fn receipt(hash: &str) -> TxReceipt {
        TxReceipt {
            transaction_hash: hash.into(),
            block_number: Some(7),
            status: true,
        }
    }

    fn controller(
        gateway: FakeGateway,
        wallet: FakeWallet,
    ) -> Arc<ViewController<FakeGateway, FakeWallet>> {
        let (event_tx, _) = broadcast::channel(16);
        ViewController::new(gateway, wallet, event_tx)
    }

    #[tokio::test]
    async fn initialize_stores_reads_verbatim() {
        let gateway = FakeGateway {
            players: vec!["0xA".into(), "0xB".into()],
            total_players: "3".into(),
            balance: 20_000_000_000_000_000,
            winner: "0xC".into(),
            ..Default::default()
        };
        let ctl = controller(gateway, FakeWallet::with(&[ALICE]));

        ctl.initialize().await.unwrap();

        let state = ctl.state().await;
        assert_eq!(state.players, vec!["0xA", "0xB"]);
        assert_eq!(state.total_players, "3");
        assert_eq!(state.balance, 20_000_000_000_000_000);
        assert_eq!(state.winner, "0xC");
        assert_eq!(
            *ctl.gateway.balance_queries.lock().unwrap(),
            vec![CONTRACT.to_string()]
        );
        let text = ctl.render(Theme::Plain).await.text_content();
        assert!(text.contains("There are currently 3 players"));
    }

    #[tokio::test]
    async fn failed_read_propagates_and_keeps_state() {
        let gateway = FakeGateway {
            players: vec!["0xA".into()],
            failing_read: Some(GatewayError::NetworkFailure("connection refused".into())),
            ..Default::default()
        };
        let ctl = controller(gateway, FakeWallet::with(&[ALICE]));

        let err = ctl.initialize().await.unwrap_err();
        assert_eq!(err, GatewayError::NetworkFailure("connection refused".into()));
        assert_eq!(ctl.state().await, LotteryState::default());
    }

    #[tokio::test]
    async fn submit_converts_amount_and_uses_first_account() {
        let ctl = controller(FakeGateway::default(), FakeWallet::with(&[ALICE, "0xB0b"]));

        ctl.on_submit("0.01").await.unwrap();

        assert_eq!(
            *ctl.gateway.entries.lock().unwrap(),
            vec![EntryRequest {
                from: ALICE.into(),
                value: 10_000_000_000_000_000,
            }]
        );
        let state = ctl.state().await;
        assert_eq!(state.entry_message, EntryMessage::Entered);
        assert_eq!(state.entry_message.to_string(), ENTERED_MESSAGE);
    }

    #[tokio::test]
    async fn pending_is_shown_while_the_entry_is_in_flight() {
        let ctl = controller(FakeGateway::default(), FakeWallet::with(&[ALICE]));
        let resolve = ctl.gateway.script_entry();
        let mut events = ctl.event_tx.subscribe();

        let submit = ctl.on_submit("1");
        let observe = async {
            while ctl.gateway.entry_count() == 0 {
                tokio::task::yield_now().await;
            }
            assert_eq!(ctl.state().await.entry_message.to_string(), PENDING_MESSAGE);
            resolve.send(Ok(receipt("0x01"))).unwrap();
        };
        let (result, ()) = tokio::join!(submit, observe);
        result.unwrap();

        let message = ctl.state().await.entry_message.to_string();
        assert_eq!(message, ENTERED_MESSAGE);
        assert!(!message.contains(PENDING_MESSAGE));

        let pending: serde_json::Value =
            serde_json::from_str(&events.recv().await.unwrap()).unwrap();
        assert_eq!(pending, json!({ "type": "entry:pending" }));
        let done: serde_json::Value =
            serde_json::from_str(&events.recv().await.unwrap()).unwrap();
        assert_eq!(done, json!({ "type": "entry:succeeded", "transactionHash": "0x01" }));
    }

    #[tokio::test]
    async fn rejection_is_rendered_with_its_code() {
        let ctl = controller(FakeGateway::default(), FakeWallet::with(&[ALICE]));
        ctl.gateway
            .script_entry()
            .send(Err(GatewayError::from_rpc_error(json!({ "code": 4001 }))))
            .unwrap();

        ctl.on_submit("0.01").await.unwrap();

        let state = ctl.state().await;
        assert!(matches!(
            state.entry_message,
            EntryMessage::Failed(GatewayError::UserRejected { .. })
        ));
        assert!(state.entry_message.to_string().contains("4001"));
        assert!(ctl.render(Theme::Card).await.text_content().contains("4001"));
    }

    #[tokio::test]
    async fn bad_amount_fails_without_sending() {
        let ctl = controller(FakeGateway::default(), FakeWallet::with(&[ALICE]));

        ctl.on_submit("lots").await.unwrap();

        assert_eq!(ctl.gateway.entry_count(), 0);
        assert!(matches!(
            ctl.state().await.entry_message,
            EntryMessage::Failed(GatewayError::InvalidAmount(_))
        ));
    }

    #[tokio::test]
    async fn empty_wallet_fails_without_sending() {
        let ctl = controller(FakeGateway::default(), FakeWallet::with(&[]));

        ctl.on_submit("0.01").await.unwrap();

        assert_eq!(ctl.gateway.entry_count(), 0);
        assert_eq!(
            ctl.state().await.entry_message,
            EntryMessage::Failed(GatewayError::NoAccount)
        );
    }

    #[tokio::test]
    async fn wallet_failure_propagates_before_pending() {
        let wallet = FakeWallet {
            accounts: Err(GatewayError::NetworkFailure("wallet offline".into())),
        };
        let ctl = controller(FakeGateway::default(), wallet);

        let err = ctl.on_submit("0.01").await.unwrap_err();

        assert_eq!(err, GatewayError::NetworkFailure("wallet offline".into()));
        assert_eq!(ctl.state().await.entry_message, EntryMessage::Empty);
    }

    #[tokio::test]
    async fn overlapping_submissions_last_resolution_wins() {
        let ctl = controller(FakeGateway::default(), FakeWallet::with(&[ALICE]));
        let first = ctl.gateway.script_entry();
        let second = ctl.gateway.script_entry();

        let resolve = async {
            while ctl.gateway.entry_count() < 2 {
                tokio::task::yield_now().await;
            }
            second.send(Ok(receipt("0x02"))).unwrap();
            while ctl.state().await.entry_message != EntryMessage::Entered {
                tokio::task::yield_now().await;
            }
            first
                .send(Err(GatewayError::from_rpc_error(json!({ "code": 4001 }))))
                .unwrap();
        };
        let (a, b, ()) = tokio::join!(ctl.on_submit("0.01"), ctl.on_submit("0.02"), resolve);
        a.unwrap();
        b.unwrap();

        assert!(ctl.state().await.entry_message.to_string().contains("4001"));
    }

    #[tokio::test]
    async fn entry_value_mirrors_input() {
        let ctl = controller(FakeGateway::default(), FakeWallet::with(&[ALICE]));
        ctl.set_entry_value("0.25".into()).await;
        assert_eq!(ctl.state().await.entry_value, "0.25");
    }
}
