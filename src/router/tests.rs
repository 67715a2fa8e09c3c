use std::sync::{Arc, Mutex};

use super::*;
use crate::host::testing::RecordingHost;
use crate::host::{SurfaceHost, ViewerId};
use crate::item::ItemSignature;
use crate::logging::Logger;
use crate::logging::testing::CaptureSink;
use crate::screen::ScreenBehavior;

type Calls = Arc<Mutex<Vec<(String, Option<ClickKind>)>>>;

/// Recording behavior; the const parameter gives each test screen its own type.
struct Tracked<const N: usize> {
    calls: Calls,
}

impl<const N: usize> ScreenBehavior for Tracked<N> {
    fn on_item_click(
        &self,
        screen: &ScreenDefinition,
        click: &ItemClick,
        event: &mut ClickEvent,
    ) -> HookResult {
        self.calls
            .lock()
            .unwrap()
            .push((screen.name().to_string(), Some(click.kind)));
        event.mark_handled();
        Ok(())
    }

    fn on_item_interact(
        &self,
        screen: &ScreenDefinition,
        _viewer: &ViewerId,
        event: &mut InteractEvent,
    ) -> HookResult {
        self.calls
            .lock()
            .unwrap()
            .push((screen.name().to_string(), None));
        event.mark_handled();
        Ok(())
    }
}

struct Failing;

impl ScreenBehavior for Failing {
    fn on_item_interact(
        &self,
        _screen: &ScreenDefinition,
        _viewer: &ViewerId,
        _event: &mut InteractEvent,
    ) -> HookResult {
        Err(HookError::msg("boom"))
    }
}

struct Panicking;

impl ScreenBehavior for Panicking {
    fn on_item_interact(
        &self,
        _screen: &ScreenDefinition,
        _viewer: &ViewerId,
        _event: &mut InteractEvent,
    ) -> HookResult {
        panic!("hook exploded");
    }
}

/// Click hook that restocks its own slot, exercising re-entrant mutation.
struct Restock;

impl ScreenBehavior for Restock {
    fn on_item_click(
        &self,
        screen: &ScreenDefinition,
        click: &ItemClick,
        event: &mut ClickEvent,
    ) -> HookResult {
        let mut restocked = click.item.clone();
        restocked.quantity += 1;
        screen.add_item(click.slot, restocked)?;
        event.mark_handled();
        Ok(())
    }
}

fn diamond() -> ItemSignature {
    ItemSignature::new("diamond", 1)
}

fn viewer(id: &str) -> Option<ViewerId> {
    Some(ViewerId::from(id))
}

fn tracked<const N: usize>(
    registry: &ScreenRegistry,
    calls: &Calls,
    name: &str,
    display: Option<&str>,
) -> Arc<ScreenDefinition> {
    let calls = Arc::clone(calls);
    registry
        .get_or_create::<Tracked<N>, _>(|| {
            ScreenDefinition::new(9, name, display, Tracked::<N> { calls })
        })
        .unwrap()
}

#[test]
fn subscriptions_run_last_and_skip_handled() {
    let subs = EventRouter::subscriptions();
    assert_eq!(subs[0].category, EventCategory::Interact);
    assert_eq!(subs[1].category, EventCategory::Click);
    assert!(subs.iter().all(|sub| sub.priority == EventPriority::Last));
    assert!(subs.iter().all(|sub| sub.ignore_handled));
}

#[test]
fn shop_scenario_open_then_left_click() {
    let registry = ScreenRegistry::new();
    let calls = Calls::default();
    let shop = tracked::<0>(&registry, &calls, "shop", None);
    assert_eq!(shop.display_name().unwrap(), "shop");

    shop.add_item(0, diamond()).unwrap();
    let recorder = Arc::new(RecordingHost::default());
    let host: Arc<dyn SurfaceHost> = recorder.clone();
    let handle = shop.open(&host, &ViewerId::from("V1")).unwrap();
    assert_eq!(recorder.creates(), vec![(9, "shop".to_string())]);
    assert_eq!(host.list_viewers(handle).unwrap(), vec![ViewerId::from("V1")]);

    let router = EventRouter::new(registry.clone());
    let mut event = ClickEvent::new(viewer("V1"), Some(diamond()), 0, "shop");
    let report = router.on_click(&mut event);

    assert_eq!(report.matched, vec!["shop"]);
    assert!(report.is_clean());
    assert!(event.is_handled());
    assert_eq!(
        *calls.lock().unwrap(),
        vec![("shop".to_string(), Some(ClickKind::Left))]
    );
}

#[test]
fn shared_display_name_only_hits_slot_owner() {
    let registry = ScreenRegistry::new();
    let calls = Calls::default();
    let first = tracked::<1>(&registry, &calls, "menu_a", Some("menu"));
    let second = tracked::<2>(&registry, &calls, "menu_b", Some("menu"));
    first.add_item(3, diamond()).unwrap();
    second.add_item(4, diamond()).unwrap();

    let router = EventRouter::new(registry);
    let mut event = ClickEvent::new(viewer("V1"), Some(diamond()), 3, "menu")
        .with_modifiers(ClickModifiers::right().with_shift());
    let report = router.on_click(&mut event);

    assert_eq!(report.matched, vec!["menu_a"]);
    assert_eq!(
        *calls.lock().unwrap(),
        vec![("menu_a".to_string(), Some(ClickKind::ShiftRight))]
    );
}

#[test]
fn title_match_alone_can_select_both_screens() {
    let registry = ScreenRegistry::new();
    let calls = Calls::default();
    let first = tracked::<1>(&registry, &calls, "menu_a", Some("menu"));
    let second = tracked::<2>(&registry, &calls, "menu_b", Some("menu"));
    first.add_item(3, diamond()).unwrap();
    second.add_item(3, diamond()).unwrap();

    let router = EventRouter::new(registry);
    let mut event = ClickEvent::new(viewer("V1"), Some(diamond()), 3, "menu");
    let report = router.on_click(&mut event);
    assert_eq!(report.matched, vec!["menu_a", "menu_b"]);
}

#[test]
fn surface_handle_disambiguates_identical_screens() {
    let registry = ScreenRegistry::new();
    let calls = Calls::default();
    let first = tracked::<1>(&registry, &calls, "menu_a", Some("menu"));
    let second = tracked::<2>(&registry, &calls, "menu_b", Some("menu"));
    first.add_item(3, diamond()).unwrap();
    second.add_item(3, diamond()).unwrap();

    let host: Arc<dyn SurfaceHost> = Arc::new(RecordingHost::default());
    first.open(&host, &ViewerId::from("V1")).unwrap();
    let handle = second.open(&host, &ViewerId::from("V2")).unwrap();

    let router = EventRouter::new(registry);
    let mut event =
        ClickEvent::new(viewer("V2"), Some(diamond()), 3, "unrelated title").with_surface(handle);
    let report = router.on_click(&mut event);
    assert_eq!(report.matched, vec!["menu_b"]);
}

#[test]
fn click_matches_on_internal_name_too() {
    let registry = ScreenRegistry::new();
    let calls = Calls::default();
    let screen = tracked::<3>(&registry, &calls, "warp", Some("Warps"));
    screen.add_item(0, diamond()).unwrap();

    let router = EventRouter::new(registry);
    let mut by_name = ClickEvent::new(viewer("V1"), Some(diamond()), 0, "warp");
    assert_eq!(router.on_click(&mut by_name).invoked(), 1);

    let mut wrong_item =
        ClickEvent::new(viewer("V1"), Some(ItemSignature::new("diamond", 2)), 0, "Warps");
    assert_eq!(router.on_click(&mut wrong_item).invoked(), 0);
    assert!(!wrong_item.is_handled());
}

#[test]
fn click_skips_for_missing_inputs() {
    let registry = ScreenRegistry::new();
    let router = EventRouter::new(registry.clone());

    let mut no_screens = ClickEvent::new(viewer("V1"), Some(diamond()), 0, "shop");
    assert_eq!(router.on_click(&mut no_screens).skipped, Some(SkipReason::NoScreens));

    let calls = Calls::default();
    tracked::<0>(&registry, &calls, "shop", None).add_item(0, diamond()).unwrap();

    let mut air = ClickEvent::new(viewer("V1"), Some(ItemSignature::new("air", 1)), 0, "shop");
    assert_eq!(router.on_click(&mut air).skipped, Some(SkipReason::NoItem));

    let mut nothing = ClickEvent::new(viewer("V1"), None, 0, "shop");
    assert_eq!(router.on_click(&mut nothing).skipped, Some(SkipReason::NoItem));

    let mut nobody = ClickEvent::new(None, Some(diamond()), 0, "shop");
    assert_eq!(router.on_click(&mut nobody).skipped, Some(SkipReason::NoViewer));

    let mut handled = ClickEvent::new(viewer("V1"), Some(diamond()), 0, "shop");
    handled.mark_handled();
    assert_eq!(router.on_click(&mut handled).skipped, Some(SkipReason::AlreadyHandled));

    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn interact_invokes_every_valid_opener() {
    let registry = ScreenRegistry::new();
    let calls = Calls::default();
    let open_any = tracked::<1>(&registry, &calls, "any", None);
    let compass_only = tracked::<2>(&registry, &calls, "compass", None);
    let clock_only = tracked::<3>(&registry, &calls, "clock", None);
    compass_only
        .set_opener(ItemSignature::new("compass", 1).with_label("Menu"))
        .unwrap();
    clock_only
        .set_opener(ItemSignature::new("clock", 1).with_label("Menu"))
        .unwrap();
    assert!(open_any.opener().unwrap().is_none());

    let router = EventRouter::new(registry);
    let held = ItemSignature::new("compass", 1).with_label("menu");
    let mut event = InteractEvent::new("V1", Some(held));
    let report = router.on_interact(&mut event);

    assert_eq!(report.matched, vec!["any", "compass"]);
    assert!(event.is_handled());
}

#[test]
fn interact_skips_empty_hand_and_empty_registry() {
    let registry = ScreenRegistry::new();
    let router = EventRouter::new(registry.clone());

    let mut no_screens = InteractEvent::new("V1", Some(diamond()));
    assert_eq!(router.on_interact(&mut no_screens).skipped, Some(SkipReason::NoScreens));

    let calls = Calls::default();
    tracked::<0>(&registry, &calls, "shop", None);
    let mut empty_hand = InteractEvent::new("V1", None);
    assert_eq!(router.on_interact(&mut empty_hand).skipped, Some(SkipReason::NoItem));
    assert!(!empty_hand.is_handled());
}

#[test]
fn failing_hooks_do_not_stop_dispatch() {
    let sink = CaptureSink::default();
    let mut config = RouterConfig::default().with_logger(Logger::new(sink.clone()));
    config.enable_metrics();

    let registry = ScreenRegistry::new();
    registry
        .get_or_create::<Failing, _>(|| ScreenDefinition::new(9, "failing", None, Failing))
        .unwrap();
    registry
        .get_or_create::<Panicking, _>(|| ScreenDefinition::new(9, "panicking", None, Panicking))
        .unwrap();
    let calls = Calls::default();
    tracked::<0>(&registry, &calls, "healthy", None);

    let router = EventRouter::with_config(registry.clone(), config);
    let mut event = InteractEvent::new("V1", Some(diamond()));
    let report = router.on_interact(&mut event);

    assert_eq!(report.matched, vec!["failing", "panicking", "healthy"]);
    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.failures[0].screen, "failing");
    assert!(report.failures[1].error.contains("hook exploded"));
    assert_eq!(*calls.lock().unwrap(), vec![("healthy".to_string(), None)]);
    assert_eq!(registry.len(), 3);

    assert_eq!(sink.at_level(LogLevel::Warn).len(), 2);
    let metrics = router.config().metrics_handle().unwrap();
    let snapshot = metrics.lock().unwrap().snapshot();
    assert_eq!(snapshot.interact_events, 1);
    assert_eq!(snapshot.hooks_invoked, 3);
    assert_eq!(snapshot.hook_failures, 2);
}

#[test]
fn hooks_may_mutate_their_screen() {
    let registry = ScreenRegistry::new();
    let screen = registry
        .get_or_create::<Restock, _>(|| ScreenDefinition::new(9, "restock", None, Restock))
        .unwrap();
    screen.add_item(2, diamond()).unwrap();

    let router = EventRouter::new(registry);
    let mut event = ClickEvent::new(viewer("V1"), Some(diamond()), 2, "restock");
    let report = router.on_click(&mut event);

    assert!(report.is_clean());
    assert_eq!(
        screen.item_at(2).unwrap(),
        Some(ItemSignature::new("diamond", 2))
    );
}

#[test]
fn removed_screen_is_no_longer_routed() {
    let registry = ScreenRegistry::new();
    let calls = Calls::default();
    let shop = tracked::<0>(&registry, &calls, "shop", None);
    shop.add_item(0, diamond()).unwrap();
    assert!(shop.remove());

    let router = EventRouter::new(registry.clone());
    let mut event = ClickEvent::new(viewer("V1"), Some(diamond()), 0, "shop");
    assert_eq!(router.on_click(&mut event).skipped, Some(SkipReason::NoScreens));
    assert!(registry.list().is_empty());

    let host: Arc<dyn SurfaceHost> = Arc::new(RecordingHost::default());
    assert!(shop.open(&host, &ViewerId::from("V1")).is_ok());
}
