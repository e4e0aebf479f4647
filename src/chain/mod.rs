pub mod abi;
mod lottery_contract;
pub mod rpc;
mod wallet;

pub use lottery_contract::LotteryContract;
pub use rpc::RpcClient;
pub use wallet::NodeWallet;
