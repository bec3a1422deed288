pub mod executor;
pub mod transfer;

pub use executor::{spawn_transfer, TransferPayload};
pub use transfer::{Transfer, TransferStatus};
