#![allow(dead_code)]

use axum::Router;
use regions_contract::{
    config::Settings,
    regions::RegionsClient,
    stub::{self, StubState, REGIONS_PATH},
};

/// Serves `router` on an ephemeral port and returns its base address.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub async fn stub_client() -> RegionsClient {
    let base = spawn(stub::router(StubState::default())).await;
    client_for(format!("{base}{REGIONS_PATH}"))
}

pub fn client_for(url: String) -> RegionsClient {
    RegionsClient::new(Settings::default().with_base_url(url)).unwrap()
}
