//! lnrpc.WalletUnlocker - the two calls this client needs.
//!
//! Hand-maintained in tonic-build's output shape so the crate builds without
//! `protoc`. Field tags follow lnd's `walletunlocker.proto`.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InitWalletRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub wallet_password: ::prost::alloc::vec::Vec<u8>,
    #[prost(string, repeated, tag = "2")]
    pub cipher_seed_mnemonic: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(bytes = "vec", tag = "3")]
    pub aezeed_passphrase: ::prost::alloc::vec::Vec<u8>,
    #[prost(int32, tag = "4")]
    pub recovery_window: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InitWalletResponse {
    #[prost(bytes = "vec", tag = "1")]
    pub admin_macaroon: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UnlockWalletRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub wallet_password: ::prost::alloc::vec::Vec<u8>,
    #[prost(int32, tag = "2")]
    pub recovery_window: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UnlockWalletResponse {}

pub mod wallet_unlocker_client {
    use tonic::codegen::http::Uri;
    use tonic::codegen::*;

    use crate::core::consts::rpc;

    #[derive(Debug, Clone)]
    pub struct WalletUnlockerClient<T> {
        inner: tonic::client::Grpc<T>,
    }

    impl<T> WalletUnlockerClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + std::marker::Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + std::marker::Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }

        pub fn with_origin(inner: T, origin: Uri) -> Self {
            let inner = tonic::client::Grpc::with_origin(inner, origin);
            Self { inner }
        }

        pub async fn init_wallet(
            &mut self,
            request: impl tonic::IntoRequest<super::InitWalletRequest>,
        ) -> std::result::Result<tonic::Response<super::InitWalletResponse>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| tonic::Status::unknown(format!("Service was not ready: {}", e.into())))?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(rpc::INIT_WALLET_PATH);
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new(rpc::UNLOCKER_SERVICE, rpc::INIT_WALLET));
            self.inner.unary(req, path, codec).await
        }

        pub async fn unlock_wallet(
            &mut self,
            request: impl tonic::IntoRequest<super::UnlockWalletRequest>,
        ) -> std::result::Result<tonic::Response<super::UnlockWalletResponse>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| tonic::Status::unknown(format!("Service was not ready: {}", e.into())))?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(rpc::UNLOCK_WALLET_PATH);
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new(rpc::UNLOCKER_SERVICE, rpc::UNLOCK_WALLET));
            self.inner.unary(req, path, codec).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_init_request_wire_tags() {
        let req = InitWalletRequest {
            wallet_password: b"pw".to_vec(),
            cipher_seed_mnemonic: vec!["a".into(), "b".into()],
            ..Default::default()
        };
        // tag 1 bytes "pw", tag 2 string "a", tag 2 string "b"
        assert_eq!(req.encode_to_vec(), vec![0x0a, 2, b'p', b'w', 0x12, 1, b'a', 0x12, 1, b'b']);
    }

    #[test]
    fn test_unlock_request_wire_tags() {
        let req = UnlockWalletRequest { wallet_password: b"pw".to_vec(), recovery_window: 250 };
        // tag 1 bytes, tag 2 varint 250
        assert_eq!(req.encode_to_vec(), vec![0x0a, 2, b'p', b'w', 0x10, 0xfa, 0x01]);
    }
}
