use std::future::Future;
use std::time::Duration;

use alloy_primitives::U256;
use anyhow::{Context as _, Result};
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::{Channel, Endpoint};
use tonic::{Request, Response, Status};

use super::{ContractClient, ContractValue, ExecutionReceipt, RECEIPT_SUCCESS, Returns};
use crate::config::{LedgerConfig, OperatorCredentials};
use crate::error::DecodeError;
use crate::proto::v1 as pb;
use pb::contract_gateway_client::ContractGatewayClient;
use pb::contract_value::Kind;

pub const ACCOUNT_ID_METADATA: &str = "x-operator-account-id";
pub const PRIVATE_KEY_METADATA: &str = "x-operator-key";
pub const NETWORK_METADATA: &str = "x-ledger-network";

#[derive(Clone)]
pub struct GatewayContractClient {
    client: ContractGatewayClient<Channel>,
    operator: OperatorCredentials,
    network: String,
    request_timeout: Duration,
    receipt_timeout: Duration,
}

impl GatewayContractClient {
    pub async fn connect(ledger: &LedgerConfig) -> Result<Self> {
        let url = &ledger.gateway_url;
        let channel = Endpoint::from_shared(url.clone())
            .with_context(|| format!("invalid ledger gateway url {url}"))?
            .connect_timeout(ledger.request_timeout)
            .connect()
            .await
            .with_context(|| format!("connect ledger gateway {url}"))?;

        Ok(Self {
            client: ContractGatewayClient::new(channel),
            operator: ledger.operator.clone(),
            network: ledger.network.clone(),
            request_timeout: ledger.request_timeout,
            receipt_timeout: ledger.receipt_timeout,
        })
    }

    fn request<T>(&self, message: T) -> Result<Request<T>> {
        let mut request = Request::new(message);
        let metadata = request.metadata_mut();
        metadata.insert(
            ACCOUNT_ID_METADATA,
            ascii_metadata(&self.operator.account_id).context("operator account id")?,
        );
        metadata.insert(
            PRIVATE_KEY_METADATA,
            ascii_metadata(self.operator.private_key()).context("operator private key")?,
        );
        metadata.insert(
            NETWORK_METADATA,
            ascii_metadata(&self.network).context("ledger network")?,
        );
        Ok(request)
    }
}

async fn with_deadline<T>(
    limit: Duration,
    rpc: String,
    pending: impl Future<Output = Result<Response<T>, Status>>,
) -> Result<T> {
    match tokio::time::timeout(limit, pending).await {
        Ok(resp) => Ok(resp.context(rpc)?.into_inner()),
        Err(_) => anyhow::bail!("{rpc} timed out after {}ms", limit.as_millis()),
    }
}

fn ascii_metadata(value: &str) -> Result<MetadataValue<Ascii>> {
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("value is not valid gRPC metadata"))
}

impl ContractClient for GatewayContractClient {
    async fn call(
        &self,
        contract_id: &str,
        function: &str,
        params: Vec<ContractValue>,
        gas: u64,
    ) -> Result<Returns> {
        let request = self.request(pb::CallContractRequest {
            contract_id: contract_id.to_string(),
            function: function.to_string(),
            params: params.iter().map(value_to_proto).collect(),
            gas,
        })?;

        let mut client = self.client.clone();
        let resp = with_deadline(
            self.request_timeout,
            format!("CallContract {function}"),
            client.call_contract(request),
        )
        .await?;

        let values = resp
            .values
            .into_iter()
            .map(value_from_proto)
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("decode {function} result"))?;
        Ok(Returns::new(values))
    }

    async fn execute(
        &self,
        contract_id: &str,
        function: &str,
        params: Vec<ContractValue>,
        gas: u64,
    ) -> Result<ExecutionReceipt> {
        let mut client = self.client.clone();

        let request = self.request(pb::ExecuteContractRequest {
            contract_id: contract_id.to_string(),
            function: function.to_string(),
            params: params.iter().map(value_to_proto).collect(),
            gas,
        })?;
        let transaction_id = with_deadline(
            self.request_timeout,
            format!("ExecuteContract {function}"),
            client.execute_contract(request),
        )
        .await?
        .transaction_id;

        let request = self.request(pb::GetReceiptRequest {
            transaction_id: transaction_id.clone(),
        })?;
        let receipt = with_deadline(
            self.receipt_timeout,
            format!("GetReceipt {transaction_id}"),
            client.get_receipt(request),
        )
        .await?;

        anyhow::ensure!(
            receipt.status == RECEIPT_SUCCESS,
            "{function} failed: transaction_id={transaction_id} status={}",
            receipt.status
        );

        Ok(ExecutionReceipt {
            transaction_id,
            status: receipt.status,
        })
    }
}

pub fn value_to_proto(value: &ContractValue) -> pb::ContractValue {
    let kind = match value {
        ContractValue::Address(a) => Kind::Address(a.clone()),
        ContractValue::Uint256(v) => Kind::Uint256(v.to_string()),
        ContractValue::Bool(b) => Kind::BoolValue(*b),
        ContractValue::String(s) => Kind::StringValue(s.clone()),
        ContractValue::AddressArray(values) => Kind::AddressArray(pb::AddressList {
            values: values.clone(),
        }),
        ContractValue::Uint256Array(values) => Kind::Uint256Array(pb::Uint256List {
            values: values.iter().map(U256::to_string).collect(),
        }),
    };
    pb::ContractValue { kind: Some(kind) }
}

pub fn value_from_proto(value: pb::ContractValue) -> Result<ContractValue, DecodeError> {
    Ok(match value.kind.ok_or(DecodeError::Unset)? {
        Kind::Address(a) => ContractValue::Address(a),
        Kind::Uint256(v) => ContractValue::Uint256(parse_uint(&v)?),
        Kind::BoolValue(b) => ContractValue::Bool(b),
        Kind::StringValue(s) => ContractValue::String(s),
        Kind::AddressArray(list) => ContractValue::AddressArray(list.values),
        Kind::Uint256Array(list) => ContractValue::Uint256Array(
            list.values
                .iter()
                .map(|v| parse_uint(v))
                .collect::<Result<_, _>>()?,
        ),
    })
}

fn parse_uint(value: &str) -> Result<U256, DecodeError> {
    U256::from_str_radix(value, 10).map_err(|_| DecodeError::InvalidUint(value.to_string()))
}
