use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context as _, Result};
use tonic::transport::Server;
use tonic::{Request, Response, Status};

use oracle_autoswap::ledger::gateway::{ACCOUNT_ID_METADATA, NETWORK_METADATA, PRIVATE_KEY_METADATA};
use oracle_autoswap::proto::v1 as pb;
use pb::contract_gateway_server::{ContractGateway, ContractGatewayServer};
use pb::contract_value::Kind;

use super::port::get_available_port;
use super::wait::wait_for;

#[derive(Debug, Clone, PartialEq)]
pub struct SeenRequest {
    pub rpc: &'static str,
    pub contract_id: String,
    pub function: String,
    pub params: Vec<pb::ContractValue>,
    pub gas: u64,
    pub account_id: String,
    pub private_key: String,
    pub network: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stall {
    // No RPC ever answers.
    Everything,
    // Queries and submissions answer; receipts never do.
    Receipts,
}

#[derive(Clone, Default)]
pub struct FakeGateway {
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    receipts: Arc<Mutex<Vec<(String, String)>>>,
    owner: Arc<Mutex<Option<String>>>,
    prices: Arc<Mutex<HashMap<String, String>>>,
    call_delay: Duration,
    stall: Option<Stall>,
}

pub const FIXED_PRICE: &str = "6123000";
pub const FIXED_OWNER: &str = "0x00000000000000000000000000000000000003E8";
pub const REVERTING_FUNCTION: &str = "revertingFn";

fn metadata<T>(request: &Request<T>, key: &str) -> Result<String, Status> {
    request
        .metadata()
        .get(key)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| Status::unauthenticated(format!("missing {key}")))
}

fn param(params: &[pb::ContractValue], index: usize) -> Result<&Kind, Status> {
    params
        .get(index)
        .and_then(|v| v.kind.as_ref())
        .ok_or_else(|| Status::invalid_argument(format!("missing param {index}")))
}

impl FakeGateway {
    pub fn stalling(stall: Stall) -> Self {
        Self {
            stall: Some(stall),
            ..Self::default()
        }
    }

    pub fn with_call_delay(delay: Duration) -> Self {
        Self {
            call_delay: delay,
            ..Self::default()
        }
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn functions(&self) -> Vec<String> {
        self.seen().into_iter().map(|r| r.function).collect()
    }

    pub fn price(&self, token: &str) -> Option<String> {
        self.prices.lock().unwrap().get(token).cloned()
    }

    fn record<T>(
        &self,
        rpc: &'static str,
        request: &Request<T>,
        contract_id: &str,
        function: &str,
        params: &[pb::ContractValue],
        gas: u64,
    ) -> Result<(), Status> {
        let seen = SeenRequest {
            rpc,
            contract_id: contract_id.to_string(),
            function: function.to_string(),
            params: params.to_vec(),
            gas,
            account_id: metadata(request, ACCOUNT_ID_METADATA)?,
            private_key: metadata(request, PRIVATE_KEY_METADATA)?,
            network: metadata(request, NETWORK_METADATA)?,
        };
        self.seen.lock().unwrap().push(seen);
        Ok(())
    }

    fn apply(&self, function: &str, params: &[pb::ContractValue]) -> Result<(), Status> {
        match function {
            "transferOwnership" => {
                let Kind::Address(to) = param(params, 0)? else {
                    return Err(Status::invalid_argument("newOwner must be an address"));
                };
                *self.owner.lock().unwrap() = Some(to.clone());
            }
            "setPrice" => {
                let (Kind::Address(token), Kind::Uint256(price)) =
                    (param(params, 0)?, param(params, 1)?)
                else {
                    return Err(Status::invalid_argument("expected (address, uint256)"));
                };
                self.prices.lock().unwrap().insert(token.clone(), price.clone());
            }
            "setPrices" => {
                let (Kind::AddressArray(tokens), Kind::Uint256Array(prices)) =
                    (param(params, 0)?, param(params, 1)?)
                else {
                    return Err(Status::invalid_argument("expected (address[], uint256[])"));
                };
                if tokens.values.len() != prices.values.len() {
                    return Err(Status::invalid_argument("length mismatch"));
                }
                let mut stored = self.prices.lock().unwrap();
                for (token, price) in tokens.values.iter().zip(&prices.values) {
                    stored.insert(token.clone(), price.clone());
                }
            }
            "resetAllPrices" => self.prices.lock().unwrap().clear(),
            _ => {}
        }
        Ok(())
    }

    pub async fn spawn(&self) -> Result<String> {
        let port = get_available_port().context("select gateway port")?;
        let addr: SocketAddr = format!("127.0.0.1:{port}").parse()?;

        let svc = ContractGatewayServer::new(self.clone());
        tokio::spawn(async move {
            if let Err(err) = Server::builder().add_service(svc).serve(addr).await {
                eprintln!("fake gateway stopped: {err}");
            }
        });

        let url = format!("http://{addr}");
        wait_for("fake gateway listening", Duration::from_secs(10), || async move {
            Ok(std::net::TcpStream::connect(addr).ok().map(|_| ()))
        })
        .await?;
        Ok(url)
    }
}

#[tonic::async_trait]
impl ContractGateway for FakeGateway {
    async fn call_contract(
        &self,
        request: Request<pb::CallContractRequest>,
    ) -> Result<Response<pb::CallContractResponse>, Status> {
        if self.stall == Some(Stall::Everything) {
            std::future::pending::<()>().await;
        }
        let req = request.get_ref().clone();
        self.record(
            "CallContract",
            &request,
            &req.contract_id,
            &req.function,
            &req.params,
            req.gas,
        )?;
        if !self.call_delay.is_zero() {
            tokio::time::sleep(self.call_delay).await;
        }

        let kind = match req.function.as_str() {
            "getPrice" => {
                let Kind::Address(token) = param(&req.params, 0)? else {
                    return Err(Status::invalid_argument("token must be an address"));
                };
                Kind::Uint256(self.price(token).unwrap_or_else(|| FIXED_PRICE.to_string()))
            }
            "owner" => Kind::Address(
                self.owner
                    .lock()
                    .unwrap()
                    .clone()
                    .unwrap_or_else(|| FIXED_OWNER.to_string()),
            ),
            "nextOrderId" => Kind::Uint256("1".to_string()),
            other => return Err(Status::not_found(format!("unknown function {other}"))),
        };

        Ok(Response::new(pb::CallContractResponse {
            values: vec![pb::ContractValue { kind: Some(kind) }],
        }))
    }

    async fn execute_contract(
        &self,
        request: Request<pb::ExecuteContractRequest>,
    ) -> Result<Response<pb::ExecuteContractResponse>, Status> {
        if self.stall == Some(Stall::Everything) {
            std::future::pending::<()>().await;
        }
        let req = request.get_ref().clone();
        self.record(
            "ExecuteContract",
            &request,
            &req.contract_id,
            &req.function,
            &req.params,
            req.gas,
        )?;

        let status = if req.function == REVERTING_FUNCTION {
            "CONTRACT_REVERT_EXECUTED"
        } else {
            self.apply(&req.function, &req.params)?;
            "SUCCESS"
        };

        let mut receipts = self.receipts.lock().unwrap();
        let transaction_id = format!("0.0.1001@1700000000.{:09}", receipts.len() + 1);
        receipts.push((transaction_id.clone(), status.to_string()));

        Ok(Response::new(pb::ExecuteContractResponse { transaction_id }))
    }

    async fn get_receipt(
        &self,
        request: Request<pb::GetReceiptRequest>,
    ) -> Result<Response<pb::Receipt>, Status> {
        if self.stall.is_some() {
            std::future::pending::<()>().await;
        }
        let transaction_id = request.into_inner().transaction_id;
        let status = self
            .receipts
            .lock()
            .unwrap()
            .iter()
            .find(|(id, _)| *id == transaction_id)
            .map(|(_, status)| status.clone())
            .ok_or_else(|| Status::not_found("unknown transaction"))?;

        Ok(Response::new(pb::Receipt {
            transaction_id,
            status,
        }))
    }
}
