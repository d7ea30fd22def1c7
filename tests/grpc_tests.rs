//! Full runs over real TLS gRPC against an in-process WalletUnlocker.
//!
//! The stand-in serves the same `/lnrpc.WalletUnlocker/*` paths lnd does,
//! records what arrived on the wire (metadata included) and answers with a
//! configurable status.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use lnboot::core::consts::rpc;
use lnboot::lnrpc::{InitWalletRequest, InitWalletResponse, UnlockWalletRequest, UnlockWalletResponse};
use lnboot::{Bootstrap, BootstrapConfig, Outcome};
use tempfile::TempDir;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::codegen::*;
use tonic::server::{Grpc, NamedService, UnaryService};
use tonic::transport::{Identity, Server, ServerTlsConfig};
use tonic::{Code, Status};

const PASSWORD: &str = "correct horse battery staple";

#[derive(Debug, Clone, PartialEq)]
struct Received {
    path: &'static str,
    macaroon: Option<String>,
    password: Vec<u8>,
    mnemonic: Vec<String>,
}

#[derive(Clone, Default)]
struct FakeUnlocker {
    received: Arc<Mutex<Vec<Received>>>,
    unlock_error: Option<(Code, &'static str)>,
}

impl FakeUnlocker {
    fn failing_unlock(code: Code, message: &'static str) -> Self {
        Self { unlock_error: Some((code, message)), ..Self::default() }
    }

    fn received(&self) -> Vec<Received> { self.received.lock().unwrap().clone() }

    fn record<T>(&self, path: &'static str, request: &tonic::Request<T>, password: &[u8], mnemonic: &[String]) {
        let macaroon = request
            .metadata()
            .get(rpc::MACAROON_METADATA_KEY)
            .map(|v| v.to_str().expect("ascii macaroon").to_string());
        self.received.lock().unwrap().push(Received {
            path,
            macaroon,
            password: password.to_vec(),
            mnemonic: mnemonic.to_vec(),
        });
    }
}

struct InitWalletSvc(FakeUnlocker);

impl UnaryService<InitWalletRequest> for InitWalletSvc {
    type Response = InitWalletResponse;
    type Future = BoxFuture<tonic::Response<Self::Response>, Status>;

    fn call(&mut self, request: tonic::Request<InitWalletRequest>) -> Self::Future {
        let unlocker = self.0.clone();
        Box::pin(async move {
            let body = request.get_ref();
            unlocker.record(rpc::INIT_WALLET_PATH, &request, &body.wallet_password, &body.cipher_seed_mnemonic);
            Ok(tonic::Response::new(InitWalletResponse { admin_macaroon: vec![2, 0] }))
        })
    }
}

struct UnlockWalletSvc(FakeUnlocker);

impl UnaryService<UnlockWalletRequest> for UnlockWalletSvc {
    type Response = UnlockWalletResponse;
    type Future = BoxFuture<tonic::Response<Self::Response>, Status>;

    fn call(&mut self, request: tonic::Request<UnlockWalletRequest>) -> Self::Future {
        let unlocker = self.0.clone();
        Box::pin(async move {
            unlocker.record(rpc::UNLOCK_WALLET_PATH, &request, &request.get_ref().wallet_password, &[]);
            match unlocker.unlock_error {
                Some((code, message)) => Err(Status::new(code, message)),
                None => Ok(tonic::Response::new(UnlockWalletResponse {})),
            }
        })
    }
}

impl<B> Service<http::Request<B>> for FakeUnlocker
where
    B: Body + Send + 'static,
    B::Error: Into<StdError> + Send + 'static,
{
    type Response = http::Response<tonic::body::BoxBody>;
    type Error = std::convert::Infallible;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let unlocker = self.clone();
        match req.uri().path() {
            rpc::INIT_WALLET_PATH => Box::pin(async move {
                let mut grpc = Grpc::new(tonic::codec::ProstCodec::default());
                Ok(grpc.unary(InitWalletSvc(unlocker), req).await)
            }),
            rpc::UNLOCK_WALLET_PATH => Box::pin(async move {
                let mut grpc = Grpc::new(tonic::codec::ProstCodec::default());
                Ok(grpc.unary(UnlockWalletSvc(unlocker), req).await)
            }),
            _ => Box::pin(async move {
                Ok(http::Response::builder()
                    .status(200)
                    .header("grpc-status", Code::Unimplemented as i32)
                    .header(http::header::CONTENT_TYPE, tonic::metadata::GRPC_CONTENT_TYPE)
                    .body(empty_body())
                    .unwrap())
            }),
        }
    }
}

impl NamedService for FakeUnlocker {
    const NAME: &'static str = rpc::UNLOCKER_SERVICE;
}

fn init_crypto() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// Serves `unlocker` over TLS on an ephemeral loopback port.
async fn spawn_lnd(unlocker: FakeUnlocker, cert: &rcgen::CertifiedKey) -> SocketAddr {
    init_crypto();
    let identity = Identity::from_pem(cert.cert.pem(), cert.key_pair.serialize_pem());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let router = Server::builder()
        .tls_config(ServerTlsConfig::new().identity(identity))
        .expect("server tls")
        .add_service(unlocker);
    tokio::spawn(router.serve_with_incoming(TcpListenerStream::new(listener)));
    addr
}

struct Node {
    dir: TempDir,
    cert: rcgen::CertifiedKey,
}

impl Node {
    fn new() -> Self {
        let cert = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).expect("rcgen");
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join("tls.cert"), cert.cert.pem()).expect("write cert");
        Self { dir, cert }
    }

    fn with_macaroon(self) -> Self {
        std::fs::write(self.macaroon_path(), admin_macaroon()).expect("write macaroon");
        self
    }

    fn macaroon_path(&self) -> PathBuf { self.dir.path().join("admin.macaroon") }

    fn config(&self, addr: SocketAddr) -> BootstrapConfig {
        BootstrapConfig::new(self.dir.path().join("tls.cert"), self.macaroon_path())
            .with_rpc_address(addr.to_string())
            .with_tls_domain("localhost")
            .with_connect_timeout(std::time::Duration::from_secs(5))
            .with_password(PASSWORD)
            .with_mnemonic("w1 w2 w3")
    }
}

/// v2: identifier "0", no caveats, 32-byte signature
fn admin_macaroon() -> Vec<u8> {
    let mut raw = vec![2u8, 2, 1, b'0', 0, 0, 6, 32];
    raw.extend_from_slice(&[0x5a; 32]);
    raw
}

#[tokio::test]
async fn test_unlocker_gone_on_the_wire_is_already_unlocked() {
    let node = Node::new().with_macaroon();
    let lnd = FakeUnlocker::failing_unlock(Code::Unimplemented, rpc::UNKNOWN_UNLOCKER_DESC);
    let addr = spawn_lnd(lnd.clone(), &node.cert).await;

    let report = Bootstrap::new(node.config(addr)).run().await.expect("run");
    assert_eq!(report.outcome, Outcome::AlreadyUnlocked);

    let received = lnd.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].path, rpc::UNLOCK_WALLET_PATH);
    assert_eq!(received[0].macaroon.as_deref(), Some(hex::encode(admin_macaroon()).as_str()));
    assert_eq!(received[0].password, PASSWORD.as_bytes());
}

#[tokio::test]
async fn test_unlock_over_the_wire() {
    let node = Node::new().with_macaroon();
    let lnd = FakeUnlocker::default();
    let addr = spawn_lnd(lnd.clone(), &node.cert).await;

    let report = Bootstrap::new(node.config(addr)).run().await.expect("run");
    assert_eq!(report.outcome, Outcome::Unlocked);
    assert!(lnd.received()[0].macaroon.is_some());
}

#[tokio::test]
async fn test_wrong_passphrase_status_is_reported() {
    let node = Node::new().with_macaroon();
    let lnd = FakeUnlocker::failing_unlock(Code::Unknown, "invalid passphrase for master public key");
    let addr = spawn_lnd(lnd, &node.cert).await;

    let report = Bootstrap::new(node.config(addr)).run().await.expect("run");
    assert_eq!(
        report.outcome,
        Outcome::Failed(
            "cannot unlock wallet: rpc error: code = Unknown desc = invalid passphrase for master public key".into()
        )
    );
}

#[tokio::test]
async fn test_init_sends_no_macaroon() {
    // certificate on disk, no macaroon yet: the init path with a pinned cert
    let node = Node::new();
    let lnd = FakeUnlocker::default();
    let addr = spawn_lnd(lnd.clone(), &node.cert).await;

    let report = Bootstrap::new(node.config(addr)).run().await.expect("run");
    assert_eq!(report.outcome, Outcome::Created);

    let received = lnd.received();
    assert_eq!(
        received,
        vec![Received {
            path: rpc::INIT_WALLET_PATH,
            macaroon: None,
            password: PASSWORD.as_bytes().to_vec(),
            mnemonic: vec!["w1".into(), "w2".into(), "w3".into()],
        }]
    );
    assert!(!node.macaroon_path().exists(), "the returned admin macaroon is not written");
}
