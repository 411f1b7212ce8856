pub mod config;
pub mod currency;
pub mod lifecycle;
pub mod logging;

pub use config::WalletConfig;
pub use currency::Currency;
pub use lifecycle::Clearable;
