//! Integration tests for the dataplane gateway client using wiremock
//!
//! These tests verify the client and the reconcilers against mocked gateway
//! endpoints, ensuring proper handling of status codes, `retval` failures and
//! the exact calls issued.

use serde_json::json;
use std::time::Duration;
use vppstate::facts::{get_query, FactCollector};
use vppstate::reconcile::{bridge_domain, vhost_user, BridgeDomainSpec, PassOptions, ReconcileError, State, VhostUserSpec};
use vppstate::vpp::{Dataplane, TransportError, VppClient};
use wiremock::matchers::{bearer_token, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> VppClient {
    VppClient::new(&server.uri(), Some("test-token".to_string()), Duration::from_secs(5))
        .expect("client should build")
}

async fn mount_version(server: &MockServer, version: &str) {
    Mock::given(method("POST"))
        .and(path("/api/show_version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "retval": 0,
            "program": "vpe",
            "version": version,
            "build_date": "2023-10-26T13:47:04"
        })))
        .mount(server)
        .await;
}

/// Test module for the gateway client
mod client_tests {
    use super::*;

    /// Test successful call sends the bearer token and parses the reply
    #[tokio::test]
    async fn test_show_version_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/show_version"))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "retval": 0,
                "version": "23.10-release"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let version = client(&server).show_version().await.unwrap();
        assert_eq!(version, "23.10-release");
    }

    /// Test dump records decode with unknown fields ignored
    #[tokio::test]
    async fn test_bridge_domain_dump_decodes_records() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/bridge_domain_dump"))
            .and(body_json(json!({})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"bd_id": 1, "flood": true, "bd_tag": "Hello world", "bvi_sw_if_index": 4294967295u32, "sw_if_details": []},
                {"bd_id": 2813, "learn": true}
            ])))
            .mount(&server)
            .await;

        let domains = client(&server).bridge_domain_dump().await.unwrap();
        assert_eq!(domains.len(), 2);
        assert_eq!(domains[0].bd_tag, "Hello world");
        assert!(domains[0].flood);
        assert_eq!(domains[1].bd_id, 2813);
    }

    /// Test a dump answered with a failing retval
    #[tokio::test]
    async fn test_dump_with_failing_retval() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/sw_interface_vhost_user_dump"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"retval": -126})))
            .mount(&server)
            .await;

        let err = client(&server).sw_interface_vhost_user_dump().await.unwrap_err();
        assert_eq!(err.retval(), Some(-126));
    }

    /// Test non-2xx status maps to a status error with a hint
    #[tokio::test]
    async fn test_404_returns_status_error() {
        let server = MockServer::start().await;

        let err = client(&server).show_version().await.unwrap_err();
        match err {
            TransportError::Status { status, hint, .. } => {
                assert_eq!(status, 404);
                assert!(hint.contains("not known"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    /// Test 401 response indicates authentication failure
    #[tokio::test]
    async fn test_401_returns_unauthorized() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/bridge_domain_dump"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let err = client(&server).bridge_domain_dump().await.unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 401, .. }));
        assert!(err.to_string().contains("token"));
    }

    /// Test an undecodable body
    #[tokio::test]
    async fn test_invalid_json_returns_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/show_version"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let err = client(&server).show_version().await.unwrap_err();
        assert!(matches!(err, TransportError::Decode { .. }));
    }

    /// Test generic dumps return the raw record list
    #[tokio::test]
    async fn test_generic_dump() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/teib_dump"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"@type": "teib_details"}])))
            .mount(&server)
            .await;

        let query = get_query("teib_dump").unwrap();
        let reply = client(&server).dump(&query).await.unwrap();
        assert_eq!(reply.as_array().unwrap().len(), 1);
    }
}

/// Test module for reconciliation over the gateway
mod reconcile_tests {
    use super::*;

    /// Test the create scenario issues exactly the expected call
    #[tokio::test]
    async fn test_bridge_domain_create_over_http() {
        let server = MockServer::start().await;
        mount_version(&server, "23.10-release").await;

        Mock::given(method("POST"))
            .and(path("/api/bridge_domain_dump"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/bridge_domain_add_del_v2"))
            .and(body_json(json!({
                "bd_id": 1,
                "flood": true,
                "uu_flood": true,
                "forward": false,
                "learn": true,
                "arp_term": false,
                "bd_tag": "Hello world",
                "is_add": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"retval": 0, "bd_id": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let spec = BridgeDomainSpec {
            bd: Some(1),
            bd_tag: Some("Hello world".to_string()),
            ..BridgeDomainSpec::default()
        };
        let outcome = bridge_domain::reconcile(&client(&server), &spec, &PassOptions::default())
            .await
            .unwrap();

        assert!(outcome.changed);
        assert_eq!(outcome.message, "Bridge domain 1 configured successfully");
    }

    /// Test a rejected create surfaces the catalog entry
    #[tokio::test]
    async fn test_bridge_domain_rejected_over_http() {
        let server = MockServer::start().await;
        mount_version(&server, "22.10-release").await;

        Mock::given(method("POST"))
            .and(path("/api/bridge_domain_dump"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/bridge_domain_add_del"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"retval": -119})))
            .expect(1)
            .mount(&server)
            .await;

        let spec = BridgeDomainSpec {
            bd: Some(5),
            ..BridgeDomainSpec::default()
        };
        let err = bridge_domain::reconcile(&client(&server), &spec, &PassOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ReconcileError::Rejected { .. }));
        assert!(err.to_string().contains("(BD_ALREADY_EXISTS -119)"));
    }

    /// Test a failing version call is reported through the catalog
    #[tokio::test]
    async fn test_failing_version_call_over_http() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/show_version"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"retval": -126})))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/bridge_domain_dump"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let spec = BridgeDomainSpec {
            bd: Some(1),
            ..BridgeDomainSpec::default()
        };
        let err = bridge_domain::reconcile(&client(&server), &spec, &PassOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.entry().map(|e| e.name), Some("UNSUPPORTED"));
        assert!(err.to_string().contains("(UNSUPPORTED -126)"));
    }

    /// Test a dry run never reaches the mutating endpoint
    #[tokio::test]
    async fn test_vhost_user_dry_run_over_http() {
        let server = MockServer::start().await;
        let sockets = tempfile::tempdir().unwrap();
        mount_version(&server, "23.10-release").await;

        Mock::given(method("POST"))
            .and(path("/api/sw_interface_vhost_user_dump"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/create_vhost_user_if_v2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"retval": 0, "sw_if_index": 1})))
            .expect(0)
            .mount(&server)
            .await;

        let options = PassOptions {
            dry_run: true,
            socket_dir: sockets.path().to_path_buf(),
        };
        let outcome = vhost_user::reconcile(&client(&server), &VhostUserSpec::new("example.sock"), &options)
            .await
            .unwrap();

        assert!(outcome.changed);
        assert_eq!(outcome.sw_if_index, None);
    }

    /// Test delete over the gateway
    #[tokio::test]
    async fn test_vhost_user_delete_over_http() {
        let server = MockServer::start().await;
        let sockets = tempfile::tempdir().unwrap();
        let sock = sockets.path().join("a.sock").to_string_lossy().into_owned();

        Mock::given(method("POST"))
            .and(path("/api/sw_interface_vhost_user_dump"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"sw_if_index": 4, "interface_name": "VirtualEthernet0/0/3", "sock_filename": sock, "is_server": false}
            ])))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/delete_vhost_user_if"))
            .and(body_json(json!({"sw_if_index": 4})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"retval": 0})))
            .expect(1)
            .mount(&server)
            .await;

        let spec = VhostUserSpec {
            state: State::Absent,
            ..VhostUserSpec::new("a.sock")
        };
        let options = PassOptions {
            dry_run: false,
            socket_dir: sockets.path().to_path_buf(),
        };
        let outcome = vhost_user::reconcile(&client(&server), &spec, &options)
            .await
            .unwrap();

        assert!(outcome.changed);
        assert_eq!(outcome.sw_if_index, Some(4));
    }

    /// Test facts skip failing queries and keep the rest
    #[tokio::test]
    async fn test_facts_over_http() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/bridge_domain_dump"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "@type": "bridge_domain_details",
                "bd_id": 1, "flood": true, "uu_flood": true, "forward": false, "learn": true,
                "arp_term": false, "arp_ufwd": false, "mac_age": 0, "bd_tag": "Hello world",
                "n_sw_ifs": 0, "sw_if_details": []
            }])))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/ip_table_dump"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let queries = vec![
            get_query("ip_table_dump").unwrap(),
            get_query("bridge_domain_dump").unwrap(),
        ];
        let dataplane = client(&server);
        let report = FactCollector::new(&dataplane).report(&queries).await.unwrap();

        assert!(!report.changed);
        assert_eq!(report.facts.len(), 1);
        assert_eq!(report.facts["vpp_bridge_domain_dump"][0]["bd_tag"], json!("Hello world"));
        assert_eq!(report.facts["vpp_bridge_domain_dump"][0]["flood"], json!("True"));
    }
}
