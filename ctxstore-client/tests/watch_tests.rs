mod common;

use common::{assert_quiet, next, recorder, Harness};
use ctxstore_backend::KeyValueBackend;
use ctxstore_client::SubscriptionMux;
use ctxstore_rpc::{RpcError, RpcNotification, StorageChanged};
use ctxstore_schema::slots::{ActionConfig, Prompt, Theme};
use ctxstore_types::ContextKind;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

// ── Seeding ─────────────────────────────────────────────────────

#[tokio::test]
async fn watch_seeds_with_default_when_empty() {
    let harness = Harness::start();
    let popup = harness.client(ContextKind::Popup);
    let (callback, mut rx) = recorder::<Theme>();

    let _sub = popup.storage().theme().watch(callback).await.unwrap();
    assert_eq!(next(&mut rx).await, Theme::Light);
    assert_quiet(&mut rx).await;
}

#[tokio::test]
async fn watch_seeds_with_current_value() {
    let harness = Harness::start();
    harness.backend.set("theme", json!("dark")).await.unwrap();
    let popup = harness.client(ContextKind::Popup);
    let (callback, mut rx) = recorder::<Theme>();

    let _sub = popup.storage().theme().watch(callback).await.unwrap();
    assert_eq!(next(&mut rx).await, Theme::Dark);
}

#[tokio::test]
async fn watch_seed_is_delivered_before_watch_returns() {
    let harness = Harness::start();
    let popup = harness.client(ContextKind::Popup);
    let (callback, mut rx) = recorder::<Theme>();

    let _sub = popup.storage().theme().watch(callback).await.unwrap();
    assert_eq!(rx.try_recv().unwrap(), Theme::Light);
}

// ── Fan-out ─────────────────────────────────────────────────────

#[tokio::test]
async fn two_watchers_in_one_context_both_see_every_change() {
    let harness = Harness::start();
    let content = harness.client(ContextKind::Content);
    let theme = content.storage().theme();
    let (first, mut first_rx) = recorder::<Theme>();
    let (second, mut second_rx) = recorder::<Theme>();

    let _a = theme.watch(first).await.unwrap();
    let _b = theme.watch(second).await.unwrap();
    assert_eq!(next(&mut first_rx).await, Theme::Light);
    assert_eq!(next(&mut second_rx).await, Theme::Light);

    theme.set(&Theme::Dark).await.unwrap();
    theme.set(&Theme::Light).await.unwrap();

    for rx in [&mut first_rx, &mut second_rx] {
        assert_eq!(next(rx).await, Theme::Dark);
        assert_eq!(next(rx).await, Theme::Light);
    }
}

#[tokio::test]
async fn one_handler_per_context() {
    let harness = Harness::start();
    let content = harness.client(ContextKind::Content);
    assert!(!content.mux().is_installed());
    assert!(!content.channel().has_handler(StorageChanged::NAME));

    let (a, _a_rx) = recorder::<Theme>();
    let (b, _b_rx) = recorder::<Vec<Prompt>>();
    let _sa = content.storage().theme().watch(a).await.unwrap();
    let _sb = content.storage().prompts().watch(b).await.unwrap();

    assert!(content.mux().is_installed());
    assert!(content.channel().has_handler(StorageChanged::NAME));
    assert_eq!(content.mux().watched_keys(), vec!["prompts", "theme"]);
}

#[tokio::test]
async fn changes_to_other_keys_are_not_delivered() {
    let harness = Harness::start();
    let popup = harness.client(ContextKind::Popup);
    let (callback, mut rx) = recorder::<Theme>();
    let _sub = popup.storage().theme().watch(callback).await.unwrap();
    assert_eq!(next(&mut rx).await, Theme::Light);

    popup.storage().prompts().set(&Vec::new()).await.unwrap();
    assert_quiet(&mut rx).await;
}

#[tokio::test]
async fn removal_delivers_default() {
    let harness = Harness::start();
    let popup = harness.client(ContextKind::Popup);
    let theme = popup.storage().theme();
    theme.set(&Theme::Dark).await.unwrap();

    let (callback, mut rx) = recorder::<Theme>();
    let _sub = theme.watch(callback).await.unwrap();
    assert_eq!(next(&mut rx).await, Theme::Dark);

    theme.remove().await.unwrap();
    assert_eq!(next(&mut rx).await, Theme::Light);
}

#[tokio::test]
async fn undecodable_change_delivers_default() {
    let harness = Harness::start();
    let popup = harness.client(ContextKind::Popup);
    let (callback, mut rx) = recorder::<Theme>();
    let _sub = popup.storage().theme().watch(callback).await.unwrap();
    assert_eq!(next(&mut rx).await, Theme::Light);

    harness.backend.set("theme", json!("dark")).await.unwrap();
    assert_eq!(next(&mut rx).await, Theme::Dark);
    harness.backend.set("theme", json!(7)).await.unwrap();
    assert_eq!(next(&mut rx).await, Theme::Light);
}

#[tokio::test]
async fn raw_watch_sees_absent_as_none() {
    let harness = Harness::start();
    let popup = harness.client(ContextKind::Popup);
    let (callback, mut rx) = recorder::<Option<Value>>();

    let _sub = popup.mux().watch_raw("scratch", callback).await.unwrap();
    assert_eq!(next(&mut rx).await, None);

    popup.remote().set("scratch", json!([1])).await.unwrap();
    assert_eq!(next(&mut rx).await, Some(json!([1])));
    popup.remote().remove("scratch").await.unwrap();
    assert_eq!(next(&mut rx).await, None);
}

#[tokio::test]
async fn repeated_reset_broadcasts_once() {
    let harness = Harness::start();
    let content = harness.client(ContextKind::Content);
    let popup = harness.client(ContextKind::Popup);
    let (callback, mut rx) = recorder::<ActionConfig>();

    let _sub = content.storage().action_config().watch(callback).await.unwrap();
    let seed = next(&mut rx).await;

    popup.storage().action_config().reset().await.unwrap();
    assert_eq!(next(&mut rx).await, seed);

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    popup.storage().action_config().reset().await.unwrap();
    assert_quiet(&mut rx).await;
}

#[tokio::test]
async fn second_mux_on_one_channel_refuses_to_watch() {
    let harness = Harness::start();
    let popup = harness.client(ContextKind::Popup);
    let (callback, _rx) = recorder::<Option<Value>>();
    let _sub = popup.mux().watch_raw("theme", callback).await.unwrap();

    let rival = SubscriptionMux::new(popup.channel().clone());
    let (callback, _rx) = recorder::<Option<Value>>();
    let err = rival.watch_raw("theme", callback).await.unwrap_err();

    assert!(matches!(err, RpcError::DuplicateHandler(_)));
    assert!(!rival.is_installed());
    assert_eq!(rival.subscriber_count("theme"), 0);
}

// ── Unsubscribe ─────────────────────────────────────────────────

#[tokio::test]
async fn unsubscribed_callback_receives_nothing_more() {
    let harness = Harness::start();
    let content = harness.client(ContextKind::Content);
    let theme = content.storage().theme();
    let (gone, mut gone_rx) = recorder::<Theme>();
    let (kept, mut kept_rx) = recorder::<Theme>();

    let gone_sub = theme.watch(gone).await.unwrap();
    let _kept_sub = theme.watch(kept).await.unwrap();
    assert_eq!(next(&mut gone_rx).await, Theme::Light);
    assert_eq!(next(&mut kept_rx).await, Theme::Light);

    gone_sub.unsubscribe();
    theme.set(&Theme::Dark).await.unwrap();

    assert_eq!(next(&mut kept_rx).await, Theme::Dark);
    assert_quiet(&mut gone_rx).await;
}

#[tokio::test]
async fn last_unsubscribe_drops_the_key() {
    let harness = Harness::start();
    let popup = harness.client(ContextKind::Popup);
    let theme = popup.storage().theme();
    let (a, _a_rx) = recorder::<Theme>();
    let (b, _b_rx) = recorder::<Theme>();

    let first = theme.watch(a).await.unwrap();
    let second = theme.watch(b).await.unwrap();
    assert_eq!(popup.mux().subscriber_count("theme"), 2);

    first.unsubscribe();
    assert_eq!(popup.mux().subscriber_count("theme"), 1);
    second.unsubscribe();
    assert_eq!(popup.mux().subscriber_count("theme"), 0);
    assert!(popup.mux().watched_keys().is_empty());
}

#[tokio::test]
async fn dropping_the_guard_unsubscribes() {
    let harness = Harness::start();
    let popup = harness.client(ContextKind::Popup);
    let (callback, mut rx) = recorder::<Theme>();

    {
        let _sub = popup.storage().theme().watch(callback).await.unwrap();
        assert_eq!(next(&mut rx).await, Theme::Light);
    }
    assert_eq!(popup.mux().subscriber_count("theme"), 0);

    popup.storage().theme().set(&Theme::Dark).await.unwrap();
    assert_quiet(&mut rx).await;
}

#[tokio::test]
async fn detached_watch_stays_registered() {
    let harness = Harness::start();
    let popup = harness.client(ContextKind::Popup);
    let (callback, mut rx) = recorder::<Theme>();

    let sub = popup.storage().theme().watch(callback).await.unwrap();
    assert_eq!(sub.key(), "theme");
    sub.detach();
    assert_eq!(next(&mut rx).await, Theme::Light);

    popup.storage().theme().set(&Theme::Dark).await.unwrap();
    assert_eq!(next(&mut rx).await, Theme::Dark);
    assert_eq!(popup.mux().subscriber_count("theme"), 1);
}

#[tokio::test]
async fn panicking_watcher_does_not_stop_others() {
    let harness = Harness::start();
    let popup = harness.client(ContextKind::Popup);
    let theme = popup.storage().theme();
    let (callback, mut rx) = recorder::<Theme>();

    let _bad = theme
        .watch(|t: Theme| {
            if t == Theme::Dark {
                panic!("watcher bug");
            }
        })
        .await
        .unwrap();
    let _good = theme.watch(callback).await.unwrap();
    assert_eq!(next(&mut rx).await, Theme::Light);

    theme.set(&Theme::Dark).await.unwrap();
    assert_eq!(next(&mut rx).await, Theme::Dark);
    theme.set(&Theme::Light).await.unwrap();
    assert_eq!(next(&mut rx).await, Theme::Light);
}
