//! Mutual-TLS transport sockets for inbound mesh traffic.
//!
//! Certificates are never inlined: the downstream TLS context references SDS
//! secrets by name, and the certificate provider decides those names for each
//! proxy identity.

use std::sync::Arc;

use envoy_types::pb::envoy::config::core::v3::{
    transport_socket::ConfigType as TransportSocketConfigType, TransportSocket,
};
use envoy_types::pb::envoy::extensions::transport_sockets::tls::v3::{
    common_tls_context::ValidationContextType, CommonTlsContext, DownstreamTlsContext,
    SdsSecretConfig, TlsParameters,
};
use envoy_types::pb::google::protobuf::{Any, BoolValue};

use crate::config::MeshConfig;
use crate::mesh::MeshService;
use crate::xds::resources::{
    ads_config_source, encode_any, DOWNSTREAM_TLS_CONTEXT_TYPE_URL, TLS_TRANSPORT_SOCKET_NAME,
};
use crate::{Error, Result};

/// SDS secret names backing a proxy's TLS context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdsSecretNames {
    /// Serving certificate and key presented to downstream peers
    pub certificate: String,
    /// Trust bundle used to validate downstream client certificates
    pub validation_context: String,
}

/// Supplies certificate material, keyed by proxy identity
pub trait CertificateProvider: Send + Sync {
    fn secret_names(&self, proxy: &MeshService) -> Result<SdsSecretNames>;
}

/// Names secrets after the service they belong to, e.g. `service-cert:default/bookstore`
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshCertificateProvider;

impl MeshCertificateProvider {
    pub const SERVICE_CERT_PREFIX: &'static str = "service-cert";
    pub const INBOUND_ROOT_CERT_PREFIX: &'static str = "root-cert-for-mtls-inbound";
}

impl CertificateProvider for MeshCertificateProvider {
    fn secret_names(&self, proxy: &MeshService) -> Result<SdsSecretNames> {
        if proxy.namespace.is_empty() || proxy.name.is_empty() {
            return Err(Error::certificate(
                proxy.to_string(),
                "cannot name certificates for an incomplete service identity",
            ));
        }

        Ok(SdsSecretNames {
            certificate: format!("{}:{}", Self::SERVICE_CERT_PREFIX, proxy),
            validation_context: format!("{}:{}", Self::INBOUND_ROOT_CERT_PREFIX, proxy),
        })
    }
}

/// Produces the transport security for inbound mesh chains
pub trait TransportSecurityFactory: Send + Sync {
    /// TLS context that terminates mTLS for `proxy` and requires a client certificate
    fn downstream_tls_context(&self, proxy: &MeshService) -> Result<DownstreamTlsContext>;

    /// Build and serialize the TLS context into its opaque payload
    fn typed_config(&self, proxy: &MeshService) -> Result<Any> {
        let context = self.downstream_tls_context(proxy)?;
        encode_any(DOWNSTREAM_TLS_CONTEXT_TYPE_URL, &context, &proxy.to_string())
    }
}

/// Wrap a serialized TLS context in the TLS transport socket envelope
pub fn tls_transport_socket(typed_config: Any) -> TransportSocket {
    TransportSocket {
        name: TLS_TRANSPORT_SOCKET_NAME.to_string(),
        config_type: Some(TransportSocketConfigType::TypedConfig(typed_config)),
    }
}

fn sds_secret_config(name: String) -> SdsSecretConfig {
    SdsSecretConfig { name, sds_config: Some(ads_config_source()) }
}

/// Transport security backed by SDS secrets from a certificate provider
#[derive(Clone)]
pub struct MeshTransportSecurityFactory {
    config: Arc<MeshConfig>,
    certificates: Arc<dyn CertificateProvider>,
}

impl MeshTransportSecurityFactory {
    pub fn new(config: Arc<MeshConfig>, certificates: Arc<dyn CertificateProvider>) -> Self {
        Self { config, certificates }
    }

    fn tls_params(&self) -> TlsParameters {
        TlsParameters {
            tls_minimum_protocol_version: self.config.tls.min_protocol_version.as_proto(),
            tls_maximum_protocol_version: self.config.tls.max_protocol_version.as_proto(),
            ..Default::default()
        }
    }
}

impl std::fmt::Debug for MeshTransportSecurityFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshTransportSecurityFactory").field("tls", &self.config.tls).finish()
    }
}

impl TransportSecurityFactory for MeshTransportSecurityFactory {
    fn downstream_tls_context(&self, proxy: &MeshService) -> Result<DownstreamTlsContext> {
        let secrets = self.certificates.secret_names(proxy)?;

        let common = CommonTlsContext {
            tls_params: Some(self.tls_params()),
            tls_certificate_sds_secret_configs: vec![sds_secret_config(secrets.certificate)],
            validation_context_type: Some(ValidationContextType::ValidationContextSdsSecretConfig(
                sds_secret_config(secrets.validation_context),
            )),
            ..Default::default()
        };

        Ok(DownstreamTlsContext {
            common_tls_context: Some(common),
            require_client_certificate: Some(BoolValue { value: true }),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TlsProtocolVersion;
    use prost::Message;

    fn factory() -> MeshTransportSecurityFactory {
        MeshTransportSecurityFactory::new(
            Arc::new(MeshConfig::default()),
            Arc::new(MeshCertificateProvider),
        )
    }

    #[test]
    fn test_certificate_names_scoped_to_proxy() {
        let names =
            MeshCertificateProvider.secret_names(&MeshService::new("default", "bookstore")).unwrap();
        assert_eq!(names.certificate, "service-cert:default/bookstore");
        assert_eq!(names.validation_context, "root-cert-for-mtls-inbound:default/bookstore");
    }

    #[test]
    fn test_certificate_provider_rejects_incomplete_identity() {
        let result = MeshCertificateProvider.secret_names(&MeshService::new("", "bookstore"));
        assert!(matches!(result, Err(Error::Certificate { .. })));
    }

    #[test]
    fn test_downstream_context_requires_client_certificate() {
        let proxy = MeshService::new("default", "bookstore");
        let context = factory().downstream_tls_context(&proxy).unwrap();

        assert_eq!(context.require_client_certificate, Some(BoolValue { value: true }));

        let common = context.common_tls_context.expect("common tls context");
        assert_eq!(common.tls_certificate_sds_secret_configs.len(), 1);
        assert_eq!(common.tls_certificate_sds_secret_configs[0].name, "service-cert:default/bookstore");

        match common.validation_context_type {
            Some(ValidationContextType::ValidationContextSdsSecretConfig(sds)) => {
                assert_eq!(sds.name, "root-cert-for-mtls-inbound:default/bookstore");
                assert!(sds.sds_config.is_some());
            }
            other => panic!("expected SDS validation context, got {:?}", other),
        }

        let params = common.tls_params.expect("tls params");
        assert_eq!(params.tls_minimum_protocol_version, TlsProtocolVersion::Tls12.as_proto());
        assert_eq!(params.tls_maximum_protocol_version, TlsProtocolVersion::Tls13.as_proto());
    }

    #[test]
    fn test_contexts_differ_per_proxy() {
        let factory = factory();
        let bookstore = factory.downstream_tls_context(&MeshService::new("default", "bookstore"));
        let bookbuyer = factory.downstream_tls_context(&MeshService::new("default", "bookbuyer"));
        assert_ne!(bookstore.unwrap(), bookbuyer.unwrap());
    }

    #[test]
    fn test_typed_config_and_socket_envelope() {
        let proxy = MeshService::new("default", "bookstore");
        let any = factory().typed_config(&proxy).unwrap();
        assert_eq!(any.type_url, DOWNSTREAM_TLS_CONTEXT_TYPE_URL);
        let decoded = DownstreamTlsContext::decode(any.value.as_slice()).unwrap();
        assert_eq!(decoded.require_client_certificate, Some(BoolValue { value: true }));

        let socket = tls_transport_socket(any);
        assert_eq!(socket.name, TLS_TRANSPORT_SOCKET_NAME);
        assert!(matches!(socket.config_type, Some(TransportSocketConfigType::TypedConfig(_))));
    }
}
