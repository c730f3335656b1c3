#![allow(clippy::unwrap_used)]
// Integration tests for `ConsoleClient` / `ConsoleSession` using wiremock.

use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ncmdump_api::{
    ColumnLayout, ConsoleClient, ConsoleSession, DEFAULT_PAGE_SIZE, Error, ExtractionMode,
    TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

const LOGIN: &str = "/Orion/Login.aspx";
const NODES: &str = "/Orion/NCM/Services/ConfigManagement.asmx/GetNodesPaged";
const COUNT: &str = "/Orion/NCM/Services/ConfigManagement.asmx/GetConfigsTotalRows";
const CONFIGS: &str = "/Orion/NCM/Services/ConfigManagement.asmx/GetConfigsPaged";
const EDIT: &str = "/Orion/NCM/Resources/Configs/EditConfig.aspx";
const EXPORT: &str = "/Orion/NCM/Resources/NCMConfigDetails/ConfigExporter.ashx";

fn client(server: &MockServer) -> ConsoleClient {
    let base_url = Url::parse(&server.uri()).unwrap();
    ConsoleClient::new(base_url, &TransportConfig::default()).unwrap()
}

fn password() -> SecretString {
    "s3cret".to_string().into()
}

async fn mount_login_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(LOGIN))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", "/Orion/NCM/ConfigurationManagement.aspx")
                .append_header("Set-Cookie", "ASP.NET_SessionId=sess1; path=/; HttpOnly")
                .append_header("Set-Cookie", ".ASPXAUTH=TICKET42; path=/; HttpOnly"),
        )
        .mount(server)
        .await;
}

async fn session(server: &MockServer) -> ConsoleSession {
    mount_login_ok(server).await;
    client(server).login("admin", &password()).await.unwrap()
}

fn node_row(id: Value, name: &str, vendor: &str) -> Value {
    let mut row = vec![Value::Null; 27];
    row[0] = id;
    row[2] = json!(name);
    row[3] = json!("10.0.0.1");
    row[17] = json!("ISR4321");
    row[18] = json!(vendor);
    row[23] = json!("Porto");
    row[26] = json!("Portugal");
    Value::Array(row)
}

// ── Login ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_captures_first_hop_cookies() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LOGIN))
        .and(query_param("ReturnUrl", "/Orion/NCM/ConfigurationManagement.aspx"))
        .and(body_string_contains("ctl00%24BodyContent%24Username=admin"))
        .and(body_string_contains("ctl00%24BodyContent%24Password=s3cret"))
        .and(body_string_contains("__EVENTTARGET="))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", "/Orion/NCM/ConfigurationManagement.aspx")
                .append_header("Set-Cookie", ".ASPXAUTH=TICKET42; path=/; HttpOnly"),
        )
        .expect(1)
        .mount(&server)
        .await;

    // The redirect target must never be requested.
    Mock::given(method("GET"))
        .and(path("/Orion/NCM/ConfigurationManagement.aspx"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let session = client(&server).login("admin", &password()).await.unwrap();

    let cookies = session.credentials().cookies();
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0].name, ".ASPXAUTH");
    assert_eq!(cookies[0].value, "TICKET42");
}

#[tokio::test]
async fn test_login_without_auth_cookie_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LOGIN))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("Set-Cookie", "ASP.NET_SessionId=anon; path=/")
                .set_body_string("<html>Login failed</html>"),
        )
        .mount(&server)
        .await;

    let result = client(&server).login("admin", &password()).await;

    match result {
        Err(ref err @ Error::Authentication { ref message }) => {
            assert!(err.is_auth_failure());
            assert!(message.contains("ASPXAUTH"), "unexpected message: {message}");
        }
        Err(other) => panic!("expected Authentication error, got: {other:?}"),
        Ok(_) => panic!("expected Authentication error, got a session"),
    }
}

#[tokio::test]
async fn test_login_connection_refused_is_transport_error() {
    let base_url = Url::parse("http://127.0.0.1:9/").unwrap();
    let client = ConsoleClient::new(base_url, &TransportConfig::default()).unwrap();

    let result = client.login("admin", &password()).await;

    assert!(
        matches!(result, Err(Error::Transport(_))),
        "expected Transport error"
    );
}

// ── Inventory ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_inventory_decodes_rows() {
    let server = MockServer::start().await;
    let session = session(&server).await;

    Mock::given(method("POST"))
        .and(path(NODES))
        .and(query_param("start", "0"))
        .and(query_param("limit", "1000"))
        .and(query_param("sort", "LastTransferDate"))
        .and(query_param("dir", "DESC"))
        .and(header("X-Requested-With", "XMLHttpRequest"))
        .and(header("User-Agent", "NCM Dump"))
        .and(header("Cookie", "ASP.NET_SessionId=sess1; .ASPXAUTH=TICKET42"))
        .and(body_json(json!({
            "groupingQueryString": "",
            "showSelectedOnly": "False",
            "colToSearch": "Nodes.Caption",
            "searchTerm": "",
            "clientOffset": 240
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "d": {
                "DataTable": {
                    "Columns": ["NodeID", "Status", "Caption", "IP"],
                    "Rows": [
                        node_row(json!("5"), "RouterA", "Cisco"),
                        node_row(json!(6), "SwitchB", "Juniper")
                    ]
                },
                "TotalRows": 2
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let inventory = session
        .fetch_inventory(&ColumnLayout::default(), DEFAULT_PAGE_SIZE)
        .await
        .unwrap();

    assert_eq!(inventory.nodes.len(), 2);
    assert_eq!(inventory.declared_total.as_deref(), Some("2"));
    assert_eq!(inventory.nodes[0].id, "5");
    assert_eq!(inventory.nodes[0].name, "RouterA");
    assert_eq!(inventory.nodes[0].vendor, "Cisco");
    assert_eq!(inventory.nodes[1].id, "6");
    assert_eq!(inventory.nodes[1].country, "Portugal");
    assert!(!inventory.is_truncated());
}

#[tokio::test]
async fn test_fetch_inventory_without_data_table_is_error() {
    let server = MockServer::start().await;
    let session = session(&server).await;

    Mock::given(method("POST"))
        .and(path(NODES))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "d": null })))
        .mount(&server)
        .await;

    let result = session
        .fetch_inventory(&ColumnLayout::default(), DEFAULT_PAGE_SIZE)
        .await;

    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_fetch_inventory_http_error() {
    let server = MockServer::start().await;
    let session = session(&server).await;

    Mock::given(method("POST"))
        .and(path(NODES))
        .respond_with(ResponseTemplate::new(500).set_body_string("Server Error"))
        .mount(&server)
        .await;

    let result = session
        .fetch_inventory(&ColumnLayout::default(), DEFAULT_PAGE_SIZE)
        .await;

    match result {
        Err(Error::Http { status, ref message }) => {
            assert_eq!(status, 500);
            assert!(message.contains("Server Error"));
        }
        other => panic!("expected Http error, got: {other:?}"),
    }
}

// ── Metadata ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_config_count_numeric_and_string() {
    let server = MockServer::start().await;
    let session = session(&server).await;

    Mock::given(method("POST"))
        .and(path(COUNT))
        .and(body_json(json!({ "nodeId": "5" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "d": 5.0 })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(COUNT))
        .and(body_json(json!({ "nodeId": "6" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "d": "5" })))
        .mount(&server)
        .await;

    assert_eq!(session.config_count("5").await.unwrap(), "5");
    assert_eq!(session.config_count("6").await.unwrap(), "5");
}

#[tokio::test]
async fn test_config_file_id_first_row() {
    let server = MockServer::start().await;
    let session = session(&server).await;

    Mock::given(method("POST"))
        .and(path(CONFIGS))
        .and(query_param("sort", "Name"))
        .and(query_param("dir", "ASC"))
        .and(body_json(json!({
            "nodeId": "5",
            "start": "1",
            "showAllConfigs": "FALSE",
            "clientOffset": "240"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "d": { "DataTable": { "Columns": ["ConfigID"], "Rows": [["9a8b-77"], ["ffff-00"]] }, "TotalRows": 2 }
        })))
        .mount(&server)
        .await;

    assert_eq!(session.config_file_id("5").await.unwrap(), "9a8b-77");
}

#[tokio::test]
async fn test_config_file_id_empty_table() {
    let server = MockServer::start().await;
    let session = session(&server).await;

    Mock::given(method("POST"))
        .and(path(CONFIGS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "d": { "DataTable": { "Columns": ["ConfigID"], "Rows": [] }, "TotalRows": 0 }
        })))
        .mount(&server)
        .await;

    let err = session.config_file_id("5").await.unwrap_err();
    assert!(err.is_empty_table(), "expected EmptyTable, got: {err:?}");
}

// ── Extraction ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_config_body_edit_mode() {
    let server = MockServer::start().await;
    let session = session(&server).await;

    Mock::given(method("GET"))
        .and(path(EDIT))
        .and(query_param("ConfigID", "9a8b-77"))
        .and(header("Cookie", "ASP.NET_SessionId=sess1; .ASPXAUTH=TICKET42"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><form><textarea name=\"ctl00$cfg\" readonly>hostname R1\n!\n</textarea></form></html>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(EXPORT))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let text = session
        .config_body("9a8b-77", ExtractionMode::Edit)
        .await
        .unwrap();
    assert_eq!(text, "hostname R1\n!\n");
}

#[tokio::test]
async fn test_config_body_export_mode_wraps_id_in_braces() {
    let server = MockServer::start().await;
    let session = session(&server).await;

    Mock::given(method("GET"))
        .and(path(EXPORT))
        .and(query_param("configID", "{9a8b-77}"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<textarea rows=\"30\">set interfaces ge-0/0/0\n</textarea>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(EDIT))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let text = session
        .config_body("9a8b-77", ExtractionMode::Export)
        .await
        .unwrap();
    assert_eq!(text, "set interfaces ge-0/0/0\n");
}

#[tokio::test]
async fn test_config_body_without_textarea_is_empty() {
    let server = MockServer::start().await;
    let session = session(&server).await;

    Mock::given(method("GET"))
        .and(path(EDIT))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><p>gone</p></html>"))
        .mount(&server)
        .await;

    let text = session
        .config_body("9a8b-77", ExtractionMode::Edit)
        .await
        .unwrap();
    assert!(text.is_empty());
}
