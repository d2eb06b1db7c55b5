pub mod autoswap;
pub mod config;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod oracle;
pub mod price;
pub mod token;

pub mod proto {
    pub mod v1 {
        tonic::include_proto!("ledger_gateway.v1");
    }
}
