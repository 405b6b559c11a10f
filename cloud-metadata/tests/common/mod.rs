//! Hand-written metadata servers for behaviours httpmock can't reproduce.
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::time::sleep;

pub const AZURE_VM_RESPONSE: &str = r#"{
    "compute": {
        "location": "westus",
        "name": "examplevmname",
        "resourceGroupName": "macikgo-test-may-23",
        "subscriptionId": "xxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxx",
        "vmId": "02aab8a4-74ef-476e-8182-f6d2ba4166a6",
        "vmSize": "Standard_A3",
        "zone": ""
    },
    "network": {
        "interface": []
    }
}"#;

pub const AWS_VM_RESPONSE: &str = r#"{
    "accountId": "123456789012",
    "availabilityZone": "us-west-2b",
    "instanceId": "i-1234567890abcdef0",
    "instanceType": "t2.micro",
    "region": "us-west-2"
}"#;

async fn bind() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Reads the request head so the client is not reset on close.
async fn read_request(stream: &mut TcpStream) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
}

fn response_head(content_length: usize) -> String {
    format!(
        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {content_length}\r\n\r\n"
    )
}

/// Accepts connections and answers with `body` only after `delay`.
pub async fn slow_server(delay: Duration, body: &'static str) -> SocketAddr {
    let (listener, addr) = bind().await;
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                read_request(&mut stream).await;
                sleep(delay).await;
                let _ = stream.write_all(response_head(body.len()).as_bytes()).await;
                let _ = stream.write_all(body.as_bytes()).await;
            });
        }
    });
    addr
}

/// Sends the response head and the first half of `body`, then stalls.
///
/// The receiver resolves once the client has closed the connection.
pub async fn stalling_server(body: &'static str) -> (SocketAddr, oneshot::Receiver<()>) {
    serve_once(body, body.len() / 2).await
}

/// Sends the full response and keeps the connection open from its side.
///
/// The receiver resolves once the client has closed the connection.
pub async fn keep_alive_server(body: &'static str) -> (SocketAddr, oneshot::Receiver<()>) {
    serve_once(body, body.len()).await
}

async fn serve_once(body: &'static str, sent: usize) -> (SocketAddr, oneshot::Receiver<()>) {
    let (listener, addr) = bind().await;
    let (closed_tx, closed_rx) = oneshot::channel();
    tokio::spawn(async move {
        let Ok((mut stream, _)) = listener.accept().await else {
            return;
        };
        read_request(&mut stream).await;
        let _ = stream.write_all(response_head(body.len()).as_bytes()).await;
        let _ = stream.write_all(&body.as_bytes()[..sent]).await;

        let mut buf = [0u8; 64];
        loop {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(_) => continue,
            }
        }
        let _ = closed_tx.send(());
    });
    (addr, closed_rx)
}

/// Address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let (listener, addr) = bind().await;
    drop(listener);
    addr
}
