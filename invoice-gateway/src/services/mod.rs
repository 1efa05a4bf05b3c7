pub mod ledger;
pub mod qr;
