//! End-to-end scenarios for the storage gateway over an in-memory host.

use proptest::prelude::*;
use webstash_testkit::prelude::*;

#[test]
fn each_backend_round_trips_the_sample_image() {
    init_tracing();

    for capability in BackendCapability::PREFERENCE_ORDER {
        let test = TestGateway::only(capability);
        let image = sample_png();

        block_on(async {
            assert_eq!(
                test.save_tracked("image.jpg", &image).await,
                Some(capability),
                "{capability} should accept the image"
            );
            let (served_by, read) = test.read_tracked("image.jpg").await.expect("image read back");
            assert_eq!(served_by, capability);
            assert_eq!(read.data(), image.data());
        });
        assert!(test.sink.is_empty(), "{capability} warned: {:?}", test.sink.warnings());
    }
}

#[test]
fn fallback_chain_walks_every_backend() {
    init_tracing();
    let host = MemoryHost::new();

    for (config, expected) in fallback_chain() {
        let test = TestGateway::with_host(host.clone(), config);
        block_on(async {
            assert_eq!(
                test.save_tracked("image.jpg", &sample_png()).await,
                Some(expected)
            );
            let read = test.read("image.jpg").await.expect("image read back");
            assert_eq!(&read.data()[..], SAMPLE_PNG, "read back after saving to {expected}");
        });
    }
}

#[test]
fn nothing_wanted_touches_no_surface() {
    let test = TestGateway::new(GatewayConfig::new().wanted(CapabilityMap::none()));

    block_on(async {
        assert!(!test.save("image.jpg", sample_png()).await);
        assert!(test.read("image.jpg").await.is_none());
    });
    assert_eq!(test.host.total_calls(), 0);
    assert!(test.sink.is_empty());
}

#[test]
fn nothing_supported_touches_no_surface() {
    let test = TestGateway::with_host(MemoryHost::bare(), GatewayConfig::default());

    assert!(test.support().is_empty());
    block_on(async {
        assert!(!test.save_text("note", "hello").await);
        assert_eq!(test.read_text("note").await.ok(), Some(None));
    });
    assert_eq!(test.host.total_calls(), 0);
}

#[test]
fn blocked_backend_is_skipped_transparently() {
    init_tracing();
    let test = TestGateway::new(GatewayConfig::default());
    test.host.inject(BackendCapability::FileHandle, Fault::Access);
    test.host.inject(BackendCapability::IndexedRecord, Fault::Write);

    block_on(async {
        assert_eq!(
            test.save_tracked("image.jpg", &sample_png()).await,
            Some(BackendCapability::PersistentKv)
        );
    });

    let warnings = test.sink.warnings();
    assert_eq!(
        test.sink.backends(),
        vec![BackendCapability::FileHandle, BackendCapability::IndexedRecord]
    );
    assert!(warnings.iter().all(|w| w.operation == Operation::Save));
    assert!(warnings.iter().all(|w| !w.not_found));
}

#[test]
fn read_reports_absent_backends_before_the_hit() {
    let test = TestGateway::new(GatewayConfig::default());
    let session_only = test.sibling(GatewayConfig::only(BackendCapability::SessionKv));

    block_on(async {
        assert!(session_only.save_text("note", "from session").await);
        let (served_by, _) = test.read_tracked("note").await.expect("note read back");
        assert_eq!(served_by, BackendCapability::SessionKv);
    });

    let warnings = test.sink.warnings();
    assert_eq!(
        test.sink.backends(),
        vec![
            BackendCapability::FileHandle,
            BackendCapability::IndexedRecord,
            BackendCapability::PersistentKv,
        ]
    );
    assert!(warnings.iter().all(|w| w.not_found && w.operation == Operation::Read));
}

#[test]
fn every_backend_failing_yields_false_and_none() {
    let test = TestGateway::new(GatewayConfig::default());
    for capability in BackendCapability::PREFERENCE_ORDER {
        test.host.inject(capability, Fault::Access);
    }

    block_on(async {
        assert!(!test.save("image.jpg", sample_png()).await);
        assert!(test.read("image.jpg").await.is_none());
    });
    assert_eq!(test.sink.len(), 10);
    assert_eq!(test.host.total_calls(), 10);
}

#[test]
fn reconfiguring_with_the_same_options_is_idempotent() {
    let test = TestGateway::new(GatewayConfig::default());
    let again = test.sibling(GatewayConfig::default());

    assert_eq!(test.support(), again.support());
    assert_eq!(test.wanted(), again.wanted());
    assert_eq!(test.eligible(), again.eligible());

    block_on(async {
        assert!(test.save_text("note", "first").await);
        assert_eq!(again.read_text("note").await.ok().flatten().as_deref(), Some("first"));
    });
}

#[test]
fn locators_expire_on_reload() {
    for capability in [
        BackendCapability::PersistentKv,
        BackendCapability::SessionKv,
        BackendCapability::Cookie,
    ] {
        let test = TestGateway::only(capability);

        block_on(async {
            assert!(test.save("image.jpg", sample_png()).await);
            assert!(test.read("image.jpg").await.is_some());

            test.host.reload();
            assert!(test.read("image.jpg").await.is_none());
        });

        let warnings = test.sink.warnings();
        assert_eq!(warnings.len(), 1, "{capability}");
        assert!(!warnings[0].not_found, "{capability}: {}", warnings[0].message);
    }
}

#[test]
fn durable_backends_survive_reload() {
    for capability in [BackendCapability::FileHandle, BackendCapability::IndexedRecord] {
        let test = TestGateway::only(capability);

        block_on(async {
            assert!(test.save("image.jpg", sample_png()).await);
            test.host.reload();
            assert_eq!(
                test.read("image.jpg").await.map(|p| p.size()),
                Some(SAMPLE_PNG.len() as u64)
            );
        });
    }
}

#[test]
fn record_schema_is_created_once() {
    let test = TestGateway::only(BackendCapability::IndexedRecord);

    block_on(async {
        for i in 0..3 {
            assert!(test.save_text(&format!("note-{i}"), "body").await);
        }
        assert!(test.read("note-0").await.is_some());
    });
    assert_eq!(test.host.record_upgrades("fileStorage"), 1);
}

#[test]
fn directory_in_the_way_falls_through() {
    let test = TestGateway::new(
        GatewayConfig::only(BackendCapability::FileHandle).want_indexed_record(true),
    );
    test.host.add_directory("image.jpg");

    block_on(async {
        assert_eq!(
            test.save_tracked("image.jpg", &sample_png()).await,
            Some(BackendCapability::IndexedRecord)
        );
    });
    assert_eq!(test.sink.backends(), vec![BackendCapability::FileHandle]);
}

#[test]
fn silent_file_writer_falls_through() {
    let test = TestGateway::new(
        GatewayConfig::only(BackendCapability::FileHandle).want_indexed_record(true),
    );
    test.host.inject(BackendCapability::FileHandle, Fault::SilentWrite);

    block_on(async {
        assert_eq!(
            test.save_tracked("image.jpg", &sample_png()).await,
            Some(BackendCapability::IndexedRecord)
        );
    });

    let warnings = test.sink.warnings();
    assert_eq!(test.sink.backends(), vec![BackendCapability::FileHandle]);
    assert!(warnings[0].message.contains("without signalling completion"));
}

#[test]
fn quota_denial_falls_through() {
    let host = MemoryHost::new().with_file_quota(512);
    let test = TestGateway::with_host(
        host,
        GatewayConfig::only(BackendCapability::FileHandle).want_persistent_kv(true),
    );

    block_on(async {
        assert_eq!(
            test.save_tracked("image.jpg", &sample_png()).await,
            Some(BackendCapability::PersistentKv)
        );
    });
    assert_eq!(test.host.last_quota_request(), Some(1024 * 1024));
    assert_eq!(test.sink.len(), 1);
}

#[test]
fn cookie_is_scoped_to_the_configured_path() {
    let test = TestGateway::new(
        GatewayConfig::only(BackendCapability::Cookie).cookie_path("/app"),
    );

    block_on(async {
        assert!(test.save_text("session", "token").await);
    });
    assert_eq!(test.host.cookie_path("session").as_deref(), Some("/app"));
}

#[test]
fn text_round_trips_through_the_default_order() {
    let served_by = with_gateway(GatewayConfig::default(), |test| {
        block_on(async {
            assert!(test.save_text("greeting.txt", "héllo").await);
            assert_eq!(
                test.read_text("greeting.txt").await.ok().flatten().as_deref(),
                Some("héllo")
            );
            test.read_tracked("greeting.txt").await.map(|(backend, _)| backend)
        })
    });
    assert_eq!(served_by, Some(BackendCapability::FileHandle));
}

#[test]
fn invalid_text_is_a_decode_error() {
    let test = TestGateway::only(BackendCapability::IndexedRecord);

    block_on(async {
        assert!(test.save("blob", vec![0xff, 0xfe, 0xfd]).await);
        assert!(test.read_text("blob").await.is_err());
    });
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn any_payload_round_trips_through_its_backend(
        name in name_strategy(),
        payload in payload_strategy(),
        capability in capability_strategy(),
    ) {
        let test = TestGateway::only(capability);

        let saved = block_on(test.save(&name, payload.clone()));
        prop_assert!(saved);

        let read = block_on(test.read(&name)).expect("payload read back");
        prop_assert_eq!(read.data(), payload.data());
    }

    #[test]
    fn eligible_backends_follow_preference_order(wanted in capability_map_strategy()) {
        let test = TestGateway::new(GatewayConfig::new().wanted(wanted));
        let eligible = test.eligible();

        let mut sorted = eligible.clone();
        sorted.sort();
        prop_assert_eq!(&eligible, &sorted);
        prop_assert!(eligible.iter().all(|c| wanted.get(*c)));
    }
}
