pub mod balance;
pub mod orders;
pub mod payouts;
pub mod render;
pub mod view;

pub use balance::fetch_balance;
pub use orders::fetch_sold_orders;
pub use payouts::{fetch_payouts, PayoutRequester};
pub use render::{render, WalletScreen};
pub use view::{ViewState, WalletSnapshot, WalletTab, WalletView};
