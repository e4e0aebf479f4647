//! Browser front-end for a single on-chain lottery: shows the players, the pot
//! and the last winner, and enters the lottery from a wallet account.

pub mod chain;
pub mod error;
pub mod gateway;
pub mod routes;
pub mod state;
pub mod units;
pub mod view;

pub use error::GatewayError;
pub use gateway::{EntryRequest, LotteryGateway, TxReceipt, WalletProvider};
