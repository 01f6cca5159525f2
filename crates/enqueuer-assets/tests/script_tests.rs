//! Script registration, localization and tag rendering against a recording host.

use std::sync::Arc;

use enqueuer_assets::prelude::*;
use enqueuer_assets::{AssetType, Settings};
use enqueuer_test_utils::MockHost;
use serde_json::json;

fn setup() -> (Arc<MockHost>, AssetServer) {
    enqueuer_core::logging::try_init_for_tests();
    let host = Arc::new(MockHost::new());
    let server = AssetServer::new(host.clone());
    (host, server)
}

fn path(path: &str) -> AssetConfig {
    AssetConfig::new().path(path)
}

fn localize_block(object: &str, data: &str) -> String {
    format!(
        "<script type='text/javascript'>\n/* <![CDATA[ */\nvar {} = {};\n/* ]]> */\n</script>\n",
        object, data
    )
}

fn inline_block(code: &str) -> String {
    format!("<script type='text/javascript'>\n{}\n</script>\n", code)
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_construct_defaults() {
    let (_host, server) = setup();
    let foo = server.scripts().construct("foo", &AssetConfig::new()).unwrap();

    let script = foo.read();
    assert_eq!(script.asset().version(), "1.0.0");
    assert_eq!(script.asset().area_name(), "front");
    assert!(!script.footer());
    assert!(!script.is_async());
    assert!(!script.is_defer());
    assert!(script.localized().is_empty());
}

#[test]
fn test_construct_with_settings() {
    let host = Arc::new(MockHost::new());
    let server = AssetServer::with_settings(host.clone(), Settings::new().default_version("2.0"));

    server.scripts().queue("foo", &path("/fixtures/foo.js")).unwrap();
    server.fire(Area::Front).unwrap();

    assert_eq!(
        host.print_scripts(),
        "<script type='text/javascript' src='http://example.org/fixtures/foo.js?ver=2.0'></script>\n"
    );
}

#[test]
fn test_construct_requires_name() {
    let (_host, server) = setup();
    let err = server.scripts().queue("", &path("/fixtures/foo.js")).unwrap_err();
    assert!(matches!(err, AssetError::MissingName { kind: "script" }));
}

// ============================================================================
// Immediate host calls
// ============================================================================

#[test]
fn test_enqueue() {
    let (host, server) = setup();
    server
        .scripts()
        .construct("bar", &path("/fixtures/bar.js"))
        .unwrap()
        .enqueue()
        .unwrap();

    assert_eq!(
        host.print_scripts(),
        "<script type='text/javascript' src='http://example.org/fixtures/bar.js?ver=1.0.0'></script>\n"
    );
}

#[test]
fn test_footer() {
    let (host, server) = setup();
    server
        .scripts()
        .construct("bar", &path("/fixtures/bar.js"))
        .unwrap()
        .footer()
        .enqueue()
        .unwrap();

    assert_eq!(host.print_head_scripts(), "");
    assert!(host.print_footer_scripts().contains("src='http://example.org/fixtures/bar.js?ver=1.0.0'"));
}

#[test]
fn test_localize() {
    let (host, server) = setup();
    server
        .scripts()
        .construct("foo", &path("/fixtures/foo.js"))
        .unwrap()
        .localize("foo", json!({ "foo": "bar" }))
        .enqueue()
        .unwrap();

    let mut expected = localize_block("foo", r#"{"foo":"bar"}"#);
    expected.push_str("<script type='text/javascript' src='http://example.org/fixtures/foo.js?ver=1.0.0'></script>\n");
    assert_eq!(host.print_scripts(), expected);
}

#[test]
fn test_localize_producer() {
    let (_host, server) = setup();
    let foo = server.scripts().construct("foo", &AssetConfig::new()).unwrap();

    foo.localize("data", Deferred::from_fn(|| json!({ "nonce": "abc" })));
    assert_eq!(foo.read().localized().get("data"), Some(&json!({ "nonce": "abc" })));

    foo.localize("data", json!([1, 2]));
    assert_eq!(foo.read().localized().len(), 1);
    assert_eq!(foo.read().localized().get("data"), Some(&json!([1, 2])));
}

#[test]
fn test_inline_after() {
    let (host, server) = setup();
    let code = "console.log(\"hello world\");";
    server
        .scripts()
        .construct("foo", &path("/fixtures/foo.js"))
        .unwrap()
        .inline(code)
        .enqueue()
        .unwrap();

    let mut expected = String::from(
        "<script type='text/javascript' src='http://example.org/fixtures/foo.js?ver=1.0.0'></script>\n",
    );
    expected.push_str(&inline_block(code));
    assert_eq!(host.print_scripts(), expected);
}

#[test]
fn test_inline_before() {
    let (host, server) = setup();
    let code = "var ready = false;";
    server
        .scripts()
        .construct("foo", &path("/fixtures/foo.js"))
        .unwrap()
        .inline_at(code, Position::Before)
        .enqueue()
        .unwrap();

    let mut expected = inline_block(code);
    expected.push_str("<script type='text/javascript' src='http://example.org/fixtures/foo.js?ver=1.0.0'></script>\n");
    assert_eq!(host.print_scripts(), expected);
}

#[test]
fn test_empty_inline_is_not_attached() {
    let (host, server) = setup();
    server
        .scripts()
        .construct("foo", &path("/fixtures/foo.js"))
        .unwrap()
        .inline("")
        .enqueue()
        .unwrap();

    assert!(host
        .calls_for("foo")
        .iter()
        .all(|call| !matches!(call, enqueuer_test_utils::HostCall::AddInline { .. })));
}

#[test]
fn test_defer() {
    let (host, server) = setup();
    server
        .scripts()
        .construct("foo", &path("/fixtures/foo.js"))
        .unwrap()
        .defer()
        .enqueue()
        .unwrap();

    assert_eq!(
        host.print_scripts(),
        "<script type='text/javascript' defer=\"defer\" src='http://example.org/fixtures/foo.js?ver=1.0.0'></script>\n"
    );
}

#[test]
fn test_async() {
    let (host, server) = setup();
    server
        .scripts()
        .construct("foo", &path("/fixtures/foo.js"))
        .unwrap()
        .asynchronous()
        .enqueue()
        .unwrap();

    assert_eq!(
        host.print_scripts(),
        "<script type='text/javascript' async=\"async\" src='http://example.org/fixtures/foo.js?ver=1.0.0'></script>\n"
    );
}

#[test]
fn test_defer_wins_over_async() {
    let (host, server) = setup();
    server
        .scripts()
        .construct("foo", &path("/fixtures/foo.js").is_async(true).defer(true))
        .unwrap()
        .enqueue()
        .unwrap();

    let printed = host.print_scripts();
    assert!(printed.contains("defer=\"defer\""));
    assert!(!printed.contains("async"));
}

#[test]
fn test_filter_only_rewrites_own_tag() {
    let (host, server) = setup();
    server
        .scripts()
        .construct("foo", &path("/fixtures/foo.js"))
        .unwrap()
        .defer()
        .enqueue()
        .unwrap();
    server
        .scripts()
        .construct("bar", &path("/fixtures/bar.js"))
        .unwrap()
        .enqueue()
        .unwrap();

    let printed = host.print_scripts();
    assert!(printed.contains("<script type='text/javascript' src='http://example.org/fixtures/bar.js?ver=1.0.0'></script>"));
    assert_eq!(printed.matches("defer=\"defer\"").count(), 1);
}

#[test]
fn test_is() {
    let (_host, server) = setup();
    let foo = server.scripts().construct("foo", &path("/fixtures/foo.js")).unwrap();
    assert!(!foo.is(Status::Registered));

    foo.register().unwrap();
    assert!(foo.is(Status::Registered));
    assert!(!foo.is(Status::Enqueued));

    foo.enqueue().unwrap();
    assert!(foo.is(Status::Enqueued));
}

#[test]
fn test_register_then_enqueue_reuses_registration() {
    let (host, server) = setup();
    let foo = server.scripts().construct("foo", &path("/fixtures/foo.js")).unwrap();
    foo.register().unwrap().enqueue().unwrap();

    let names: Vec<_> = host
        .calls_for("foo")
        .into_iter()
        .map(|call| match call {
            enqueuer_test_utils::HostCall::Register(_) => "register",
            enqueuer_test_utils::HostCall::EnqueueRegistered { .. } => "enqueue_registered",
            enqueuer_test_utils::HostCall::Enqueue(_) => "enqueue",
            _ => "other",
        })
        .collect();
    assert_eq!(names, vec!["register", "enqueue_registered"]);
}

#[test]
fn test_deregister_and_dequeue_are_separate() {
    let (_host, server) = setup();
    let foo = server.scripts().construct("foo", &path("/fixtures/foo.js")).unwrap();
    foo.enqueue().unwrap();

    foo.dequeue().unwrap();
    assert!(!foo.is(Status::Enqueued));
    assert!(foo.is(Status::Registered));
    assert!(server.scripts().has("foo"));

    foo.deregister().unwrap();
    assert!(!foo.is(Status::Registered));
    assert!(!server.scripts().has("foo"));
}

// ============================================================================
// Deferred lifecycle
// ============================================================================

#[test]
fn test_add() {
    let (host, server) = setup();
    server.scripts().add("bar", &path("/fixtures/bar.js")).unwrap();
    assert_eq!(host.call_count(), 0);

    server.fire(Area::Front).unwrap();
    assert!(server.scripts().is("bar", Status::Registered));
    assert!(!server.scripts().is("bar", Status::Enqueued));
}

#[test]
fn test_queue() {
    let (host, server) = setup();
    server.scripts().queue("bar", &path("/fixtures/bar.js")).unwrap();
    server.fire(Area::Front).unwrap();

    assert!(server.scripts().is("bar", Status::Registered));
    assert!(server.scripts().is("bar", Status::Enqueued));
    assert_eq!(host.queued_names(AssetType::Script), vec!["bar"]);
}

#[test]
fn test_load() {
    let (host, server) = setup();
    let jquery = server.scripts().load("jquery").unwrap();
    assert_eq!(jquery.read().asset().raw_path(), "");

    server.fire(Area::Front).unwrap();
    assert!(server.scripts().is("jquery", Status::Enqueued));
    assert_eq!(host.definition(AssetType::Script, "jquery").unwrap().version, "1.0.0");
}

#[test]
fn test_get_and_chain() {
    let (host, server) = setup();
    server.scripts().add("foo", &path("/fixtures/foo.js")).unwrap();

    let foo = server.scripts().get("foo").unwrap();
    foo.inline("console.log(\"hello world\");")
        .position(Position::Before)
        .localize("variable", json!({ "foo": "bar" }))
        .footer()
        .path("/fixtures/foo/bar.js")
        .area("login")
        .asynchronous()
        .do_enqueue(None)
        .unwrap();

    server.fire(Area::Login).unwrap();

    let mut expected = localize_block("variable", r#"{"foo":"bar"}"#);
    expected.push_str(&inline_block("console.log(\"hello world\");"));
    expected.push_str(
        "<script type='text/javascript' async=\"async\" src='http://example.org/fixtures/foo/bar.js?ver=1.0.0'></script>\n",
    );
    assert_eq!(host.print_footer_scripts(), expected);
    assert_eq!(host.print_head_scripts(), "");
}

#[test]
fn test_remove() {
    let (_host, server) = setup();
    server.scripts().queue("foo", &path("/fixtures/foo.js")).unwrap();
    server.fire(Area::Front).unwrap();

    assert!(server.scripts().remove("foo").unwrap());
    assert!(!server.scripts().is("foo", Status::Registered));
    assert!(!server.scripts().is("foo", Status::Enqueued));
    assert!(!server.scripts().has("foo"));
}

#[test]
fn test_scripts_and_styles_are_separate() {
    let (host, server) = setup();
    server.scripts().queue("foo", &path("/fixtures/foo.js")).unwrap();
    server.styles().queue("foo", &path("/fixtures/foo.css")).unwrap();
    server.fire(Area::Front).unwrap();

    assert!(server.scripts().remove("foo").unwrap());
    assert!(server.styles().is("foo", Status::Enqueued));
    assert!(host.print_styles().contains("id='foo-css'"));
    assert_eq!(host.print_scripts(), "");
}
