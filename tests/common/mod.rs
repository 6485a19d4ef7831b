#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use alloy::{
    network::Ethereum,
    providers::{RootProvider, mock::Asserter},
    rpc::client::RpcClient,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde_json::Value;
use tokio::net::TcpListener;
use transcript_scanner::robust_provider::{RobustProvider, RobustProviderBuilder};

/// A [`RobustProvider`] without retries answering from `asserter`, one response per RPC call.
pub async fn mocked_ledger(asserter: &Asserter) -> anyhow::Result<RobustProvider<Ethereum>> {
    let root = RootProvider::new(RpcClient::mocked(asserter.clone()));
    Ok(RobustProviderBuilder::fragile(root).build().await?)
}

type Documents = Arc<HashMap<String, Value>>;

/// Local HTTP gateway serving JSON documents under `/ipfs/{cid}`. Unknown CIDs answer `404`.
pub struct LocalGateway {
    pub base: String,
}

impl LocalGateway {
    pub async fn serve(documents: impl IntoIterator<Item = (&'static str, Value)>) -> anyhow::Result<Self> {
        let documents: Documents =
            Arc::new(documents.into_iter().map(|(cid, doc)| (cid.to_owned(), doc)).collect());
        let app = Router::new().route("/ipfs/{cid}", get(document)).with_state(documents);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let base = format!("http://{}", listener.local_addr()?);
        tokio::spawn(async move { axum::serve(listener, app).await });

        Ok(Self { base })
    }
}

async fn document(
    State(documents): State<Documents>,
    Path(cid): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    documents.get(&cid).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}
