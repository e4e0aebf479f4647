pub mod controller;
pub mod render;
pub mod state;

pub use controller::ViewController;
pub use render::{render, render_page, Theme, ViewNode};
pub use state::{EntryMessage, LotterySnapshot, LotteryState, ViewEvent};
