//! Screen flows over HTTP against the stub registration service.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::{Reply, TestHarness};
use zkauth::display::FieldKind;
use zkauth::testing::address_of;
use zkauth::workflow::{CopySlot, ListContent, VerifyField, VerifyPanel};
use zkauth::{RegistryService, RequestState, Submission, UploadFile};

fn upload_body(poseidon_hash: &str, author_address: &str) -> String {
    format!(
        r#"{{"id":1,"filename":"report.pdf","fileType":"application/pdf","fileSize":2097152,
            "poseidonHash":"{poseidon_hash}","authorAddress":"{author_address}",
            "starknetTxHash":"0x5151","createdAt":"2024-05-01T10:00:00","message":"ok"}}"#
    )
}

fn record_json(id: u64, registered: bool) -> String {
    format!(
        r#"{{"id":{id},"filename":"file-{id}.txt","fileType":"text/plain","fileSize":2048,
            "poseidonHash":"0x{id:064x}","authorAddress":"{}",
            "starknetTxHash":"0x{id:062x}ff","createdAt":"2024-05-01T10:00:00",
            "isRegistered":{registered},"starknetExplorerUrl":"https://sepolia.starkscan.co/tx/0x{id:062x}ff"}}"#,
        address_of('7')
    )
}

#[tokio::test]
async fn test_upload_registers_and_clears_form() {
    let harness = TestHarness::setup().await.expect("Failed to setup harness");
    let author = address_of('a');
    harness
        .server()
        .reply("POST", "/upload", Reply::ok(upload_body("0x1234", &author)));

    let screen = harness.workflow().upload_screen();
    screen
        .select_file(UploadFile::new(
            "report.pdf",
            Some("application/pdf".to_string()),
            vec![1u8; 2 * 1024 * 1024],
        ))
        .unwrap();
    screen.set_author_address(author.clone());

    assert_eq!(screen.submit().await, Submission::Completed);

    let view = screen.view();
    let success = view.success.expect("success panel");
    assert_eq!(success.poseidon_hash, "0x1234");
    assert_eq!(success.author_address, author);
    assert_eq!(success.message, "ok");
    assert!(view.selected_file.is_none());
    assert!(view.author_address.is_empty());

    let requests = harness.server().requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/api/v1/files/upload");
    assert!(request
        .header("content-type")
        .unwrap()
        .starts_with("multipart/form-data"));
    let body = request.body_text();
    assert!(body.contains(r#"name="file"; filename="report.pdf""#));
    assert!(body.contains(r#"name="authorAddress""#));
    assert!(body.contains(&author));
}

#[tokio::test]
async fn test_upload_shows_service_error() {
    let harness = TestHarness::setup().await.expect("Failed to setup harness");
    harness.server().reply(
        "POST",
        "/upload",
        Reply::status(400, r#"{"error":"File with this hash already exists"}"#),
    );

    let screen = harness.workflow().upload_screen();
    screen
        .select_file(UploadFile::new("a.txt", None, b"hello".to_vec()))
        .unwrap();
    screen.set_author_address(address_of('b'));
    screen.submit().await;

    let view = screen.view();
    assert_eq!(
        view.error.as_deref(),
        Some("File with this hash already exists")
    );
    assert!(view.selected_file.is_some());
}

#[tokio::test]
async fn test_upload_without_error_field_uses_default() {
    let harness = TestHarness::setup().await.expect("Failed to setup harness");
    harness
        .server()
        .reply("POST", "/upload", Reply::status(500, "<html>oops</html>"));

    let screen = harness.workflow().upload_screen();
    screen
        .select_file(UploadFile::new("a.txt", None, b"hello".to_vec()))
        .unwrap();
    screen.set_author_address(address_of('b'));
    screen.submit().await;

    assert_eq!(screen.view().error.as_deref(), Some("Upload failed"));
}

#[tokio::test]
async fn test_invalid_address_sends_nothing() {
    let harness = TestHarness::setup().await.expect("Failed to setup harness");

    let screen = harness.workflow().upload_screen();
    screen
        .select_file(UploadFile::new("a.txt", None, b"hello".to_vec()))
        .unwrap();
    screen.set_author_address(format!("0x{}", "a".repeat(63)));

    assert!(matches!(screen.submit().await, Submission::Rejected(_)));
    assert!(harness.server().requests().is_empty());
}

#[tokio::test]
async fn test_verify_found() {
    let harness = TestHarness::setup().await.expect("Failed to setup harness");
    harness.server().reply(
        "GET",
        "/verify/0xabc",
        Reply::ok(r#"{"isRegistered":true,"poseidonHash":"0xabc","authorAddress":"0xdef","filename":"a.txt"}"#),
    );

    let screen = harness.workflow().verify_screen();
    screen.set_query("0xabc");
    screen.submit().await;

    let Some(VerifyPanel::Verified(details)) = screen.view().result else {
        panic!("expected verified panel, got {:?}", screen.view());
    };
    assert_eq!(details.filename, "a.txt");
    assert_eq!(details.author_address, "0xdef");
    assert_eq!(details.file_size, "Unknown");
    assert!(details.explorer_url.is_none());

    assert!(screen.copy(VerifyField::Address));
    assert_eq!(harness.clipboard().last().as_deref(), Some("0xdef"));
}

#[tokio::test]
async fn test_verify_not_found_echoes_hash() {
    let harness = TestHarness::setup().await.expect("Failed to setup harness");
    harness.server().reply(
        "GET",
        "/verify/0xabc",
        Reply::ok(r#"{"isRegistered":false,"poseidonHash":"0xabc"}"#),
    );

    let screen = harness.workflow().verify_screen();
    screen.set_query("0xabc");
    screen.submit().await;

    let view = screen.view();
    assert!(view.error.is_none());
    assert!(matches!(
        view.result,
        Some(VerifyPanel::NotFound { ref poseidon_hash, .. }) if poseidon_hash == "0xabc"
    ));
}

#[tokio::test]
async fn test_verify_accepts_registered_alias() {
    let harness = TestHarness::setup().await.expect("Failed to setup harness");
    harness.server().reply(
        "GET",
        "/verify/0x01",
        Reply::ok(r#"{"registered":true,"poseidonHash":"0x01","authorAddress":"0xdef","filename":"b.txt"}"#),
    );

    let screen = harness.workflow().verify_screen();
    screen.set_query("0x01");
    screen.submit().await;

    assert!(matches!(screen.view().result, Some(VerifyPanel::Verified(_))));
}

#[tokio::test]
async fn test_verify_non_success_is_hard_error() {
    let harness = TestHarness::setup().await.expect("Failed to setup harness");
    harness.server().reply(
        "GET",
        "/verify/0xabc",
        Reply::status(404, r#"{"error":"not found"}"#),
    );

    let screen = harness.workflow().verify_screen();
    screen.set_query("0xabc");
    screen.submit().await;

    let view = screen.view();
    assert_eq!(view.error.as_deref(), Some("Verification failed"));
    assert!(view.result.is_none());
}

#[tokio::test]
async fn test_verify_unparseable_body_is_error() {
    let harness = TestHarness::setup().await.expect("Failed to setup harness");
    harness
        .server()
        .reply("GET", "/verify/0xabc", Reply::ok(r#"{"filename":"a.txt"}"#));

    let screen = harness.workflow().verify_screen();
    screen.set_query("0xabc");
    screen.submit().await;

    assert_eq!(screen.view().error.as_deref(), Some("Verification failed"));
}

#[tokio::test]
async fn test_verify_path_is_escaped_as_one_segment() {
    let harness = TestHarness::setup().await.expect("Failed to setup harness");

    let screen = harness.workflow().verify_screen();
    screen.set_query("0xab/c");
    screen.submit().await;

    let requests = harness.server().requests();
    assert_eq!(requests[0].path, "/api/v1/files/verify/0xab%2Fc");
    assert_eq!(screen.view().error.as_deref(), Some("Verification failed"));
}

#[tokio::test]
async fn test_list_empty_state() {
    let harness = TestHarness::setup().await.expect("Failed to setup harness");
    harness.server().reply("GET", "/all", Reply::ok("[]"));

    let screen = harness.workflow().list_screen();
    screen.activate().await;

    assert_eq!(screen.view().content, ListContent::Empty);
}

#[tokio::test]
async fn test_list_renders_cards_in_service_order() {
    let harness = TestHarness::setup().await.expect("Failed to setup harness");
    let body = format!(
        "[{},{},{}]",
        record_json(3, true),
        record_json(1, false),
        record_json(2, true)
    );
    harness.server().reply("GET", "/all", Reply::ok(body));

    let screen = harness.workflow().list_screen();
    screen.activate().await;

    let ListContent::Cards(cards) = screen.view().content else {
        panic!("expected cards");
    };
    assert_eq!(cards.iter().map(|c| c.id).collect::<Vec<_>>(), vec![3, 1, 2]);
    assert_eq!(cards[0].hash.text, format!("0x{}...{}", "0".repeat(8), "00000003"));
    assert_eq!(cards[0].size, "0.00 MB");
    assert_eq!(cards[0].registered_at.as_deref(), Some("5/1/2024"));
    // Unregistered records carry no author or transaction.
    assert!(!cards[1].registered);
    assert!(cards[1].tx.is_none());
    assert!(cards[1].author.full.is_empty());

    assert!(screen.toggle(2, FieldKind::TxHash));
    let ListContent::Cards(cards) = screen.view().content else {
        panic!("expected cards");
    };
    let tx = cards[2].tx.as_ref().unwrap();
    assert!(tx.expanded);
    assert_eq!(tx.text, tx.full);

    assert!(screen.copy(3, CopySlot::MainHash));
    assert_eq!(
        harness.clipboard().last(),
        Some(format!("0x{:064x}", 3))
    );
}

#[tokio::test]
async fn test_list_transport_failure_then_retry() {
    let harness = TestHarness::setup().await.expect("Failed to setup harness");
    harness.server().reply("GET", "/all", Reply::Abort);
    harness
        .server()
        .reply("GET", "/all", Reply::ok(format!("[{}]", record_json(1, true))));

    let screen = harness.workflow().list_screen();
    screen.activate().await;

    let view = screen.view();
    let ListContent::Failed { message } = &view.content else {
        panic!("expected failure, got {view:?}");
    };
    assert!(!message.is_empty());
    assert!(view.to_string().contains("[Retry]"));

    assert_eq!(screen.retry().await, Submission::Completed);
    assert!(matches!(screen.view().content, ListContent::Cards(ref cards) if cards.len() == 1));

    let paths: Vec<String> = harness
        .server()
        .requests()
        .into_iter()
        .map(|r| r.path)
        .collect();
    assert_eq!(paths, vec!["/api/v1/files/all", "/api/v1/files/all"]);
}

#[tokio::test]
async fn test_list_unreachable_service() {
    let workflow = TestHarness::unreachable_workflow()
        .await
        .expect("Failed to build workflow");

    let screen = workflow.list_screen();
    screen.activate().await;

    assert!(matches!(screen.state(), RequestState::Settled(Err(_))));
    assert!(matches!(screen.view().content, ListContent::Failed { .. }));
}

#[tokio::test]
async fn test_list_service_error_is_generic() {
    let harness = TestHarness::setup().await.expect("Failed to setup harness");
    harness.server().reply(
        "GET",
        "/all",
        Reply::status(500, r#"{"error":"database down"}"#),
    );

    let screen = harness.workflow().list_screen();
    screen.activate().await;

    assert_eq!(
        screen.view().content,
        ListContent::Failed {
            message: "Failed to fetch files".to_string()
        }
    );
}

#[tokio::test]
async fn test_author_files() {
    let harness = TestHarness::setup().await.expect("Failed to setup harness");
    let author = address_of('7');
    harness.server().reply(
        "GET",
        &format!("/author/{author}"),
        Reply::ok(format!("[{}]", record_json(4, true))),
    );

    let screen = harness.workflow().author_screen(&author).unwrap();
    screen.activate().await;

    let view = screen.view();
    assert_eq!(view.title, "Files by 0x77777777...77777777");
    let ListContent::Cards(cards) = view.content else {
        panic!("expected cards");
    };
    assert_eq!(cards[0].author.full, author);
}

#[tokio::test]
async fn test_health() {
    let harness = TestHarness::setup().await.expect("Failed to setup harness");
    harness.server().reply(
        "GET",
        "/health",
        Reply::ok(r#"{"status":"UP","service":"ZK File Authentication Service"}"#),
    );

    let status = harness.workflow().service().health().await.unwrap();
    assert!(status.is_up());
    assert_eq!(status.service, "ZK File Authentication Service");
}
