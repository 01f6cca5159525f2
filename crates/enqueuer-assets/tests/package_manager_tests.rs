//! Package catalog lookups feeding the package store.

use std::sync::Arc;

use enqueuer_assets::prelude::*;
use enqueuer_assets::{AssetType, CatalogEntry, PackageDefinition};
use enqueuer_test_utils::MockHost;

fn setup() -> (Arc<MockHost>, AssetServer) {
    enqueuer_core::logging::try_init_for_tests();
    let host = Arc::new(MockHost::new());
    let server = AssetServer::new(host.clone());
    (host, server)
}

struct Chosen;

impl PackageDefinition for Chosen {
    fn name(&self) -> &str {
        "chosen"
    }

    fn config(&self) -> PackageConfig {
        PackageConfig::new()
            .version("1.8.7")
            .script_path("/fixtures/chosen.js")
            .style_path("/fixtures/chosen.css")
    }
}

#[test]
fn test_register_does_not_touch_assets() {
    let (host, server) = setup();
    server
        .package_manager()
        .register("jquery", PackageConfig::new().script_path("/fixtures/jquery.js"));

    assert!(server.package_manager().has("jquery"));
    assert!(!server.packages().has("jquery"));
    assert!(!server.scripts().has("jquery"));

    server.fire(Area::Front).unwrap();
    assert_eq!(host.call_count(), 0);
}

#[test]
fn test_add_catalogued() {
    let (_host, server) = setup();
    let manager = server.package_manager();
    manager.register(
        "jquery",
        PackageConfig::new()
            .script_path("/fixtures/jquery.js")
            .style_path("/fixtures/jquery.css"),
    );

    manager.add("jquery", PackageConfig::new()).unwrap();
    server.fire(Area::Front).unwrap();

    assert!(server.scripts().is("jquery", Status::Registered));
    assert!(server.styles().is("jquery", Status::Registered));
    assert!(!server.scripts().is("jquery", Status::Enqueued));
}

#[test]
fn test_queue_definition() {
    let (host, server) = setup();
    let manager = server.package_manager();
    manager.register_definition(&Chosen).unwrap();
    assert!(matches!(manager.get("chosen"), Some(CatalogEntry::Package(_))));

    manager.queue("chosen", PackageConfig::new()).unwrap();
    server.fire(Area::Front).unwrap();

    assert_eq!(
        host.print_scripts(),
        "<script type='text/javascript' src='http://example.org/fixtures/chosen.js?ver=1.8.7'></script>\n"
    );
    assert!(host.print_styles().contains("href='http://example.org/fixtures/chosen.css?ver=1.8.7'"));
}

#[test]
fn test_queue_many_with_shared_config() {
    let (host, server) = setup();
    let manager = server.package_manager();
    manager
        .queue_many(
            [
                ("vue", PackageConfig::new().script_path("vue.js")),
                ("react", PackageConfig::new().script_path("react.js").version("18.2")),
            ],
            &PackageConfig::new().base("/vendor").version("3.0"),
        )
        .unwrap();
    server.fire(Area::Front).unwrap();

    assert_eq!(manager.count(), 2);
    assert_eq!(host.definition(AssetType::Script, "vue").unwrap().src, "/vendor/vue.js");
    assert_eq!(host.definition(AssetType::Script, "vue").unwrap().version, "3.0");
    assert_eq!(host.definition(AssetType::Script, "react").unwrap().version, "18.2");
}

#[test]
fn test_add_many_then_unregister() {
    let (_host, server) = setup();
    let manager = server.package_manager();
    manager
        .add_many(
            [
                ("bootstrap", PackageConfig::new().style_path("/bootstrap.css")),
                ("select2", PackageConfig::new().style_path("/select2.css")),
            ],
            &PackageConfig::new().area(Area::Admin),
        )
        .unwrap();

    server.fire(Area::Admin).unwrap();
    assert!(server.styles().is("bootstrap", Status::Registered));

    assert_eq!(manager.unregister_many(["bootstrap", "select2"]), 2);
    assert_eq!(manager.count(), 0);
    assert!(server.packages().has("bootstrap"));
}
