use frame_gestures::actions::{
    ActionKey, ActionOption, ActionResolver, BuiltinAction, CustomUrl, ExecutionSite,
    PendingAction, ResolveError, ScrollKind,
};
use frame_gestures::mouse_gestures::{GestureBinding, GestureTable};

fn resolver(bindings: &[(&str, &str)]) -> ActionResolver {
    let table = GestureTable::new(
        bindings
            .iter()
            .map(|(gesture, action)| GestureBinding::new(*gesture, *action))
            .collect(),
    );
    let custom_urls = vec![
        CustomUrl {
            id: "Google".into(),
            url: "https://google.com/search?q={}".into(),
        },
        CustomUrl {
            id: "Home".into(),
            url: "https://example.com/".into(),
        },
        CustomUrl {
            id: "Broken".into(),
            url: "not a url {}".into(),
        },
    ];
    ActionResolver::new(table, custom_urls)
}

fn gesture(arrows: &str) -> PendingAction {
    PendingAction {
        key: ActionKey::Gesture(arrows.into()),
        option: ActionOption::default(),
    }
}

#[test]
fn exact_gesture_resolves_to_its_action() {
    let resolver = resolver(&[("←↑", "upsertbookmark"), ("←", "back")]);
    let resolved = resolver.resolve(&gesture("←↑"), "").unwrap().unwrap();
    assert_eq!(resolved.builtin, BuiltinAction::UpsertBookmark);
    assert_eq!(resolved.request.action, "upsertbookmark");
    assert_eq!(resolved.request.text, None);
}

#[test]
fn unconfigured_gesture_resolves_to_nothing() {
    let resolver = resolver(&[("←↑", "upsertbookmark")]);
    assert_eq!(resolver.resolve(&gesture("↓↓↓"), "").unwrap(), None);
    assert_eq!(resolver.resolve(&gesture("←"), "").unwrap(), None);
    assert_eq!(resolver.resolve(&gesture(""), "").unwrap(), None);
}

#[test]
fn first_binding_wins() {
    let resolver = resolver(&[("→", "nexttab"), ("→", "closetab")]);
    assert_eq!(resolver.table().match_action("→"), Some("nexttab"));
}

#[test]
fn invalid_gesture_strings_are_dropped_from_the_table() {
    let resolver = resolver(&[("RL", "back"), ("→Click ", "openlinkinnewtab")]);
    assert_eq!(resolver.table().bindings().len(), 1);
    assert_eq!(
        resolver.table().match_action("→Click "),
        Some("openlinkinnewtab")
    );
}

#[test]
fn named_shortcuts_bypass_the_table() {
    let resolver = resolver(&[]);
    let pending = PendingAction {
        key: ActionKey::Named("reloadtab".into()),
        option: ActionOption::default(),
    };
    let resolved = resolver.resolve(&pending, "").unwrap().unwrap();
    assert_eq!(resolved.builtin, BuiltinAction::ReloadTab);

    let unknown = PendingAction {
        key: ActionKey::Named("teleport".into()),
        option: ActionOption::default(),
    };
    assert_eq!(resolver.resolve(&unknown, "").unwrap(), None);
}

#[test]
fn custom_url_substitutes_selection() {
    let resolver = resolver(&[("→↓", "customurl:Google")]);
    let resolved = resolver.resolve(&gesture("→↓"), "cats").unwrap().unwrap();
    assert_eq!(resolved.builtin, BuiltinAction::OpenUrl);
    assert_eq!(resolved.request.action, "openurl");
    assert_eq!(
        resolved.request.url.as_deref(),
        Some("https://google.com/search?q=cats")
    );
    assert_eq!(resolved.request.text.as_deref(), Some("cats"));
}

#[test]
fn custom_url_encodes_selection() {
    let resolver = resolver(&[]);
    assert_eq!(
        resolver.expand_custom_url("Google", "black & white").unwrap(),
        "https://google.com/search?q=black%20%26%20white"
    );
}

#[test]
fn custom_url_without_placeholder_ignores_selection() {
    let resolver = resolver(&[]);
    assert_eq!(
        resolver.expand_custom_url("Home", "").unwrap(),
        "https://example.com/"
    );
}

#[test]
fn custom_url_failures_are_reported() {
    let resolver = resolver(&[
        ("↓", "customurl:Google"),
        ("↑", "customurl:Gone"),
        ("←", "customurl:Broken"),
    ]);
    assert_eq!(
        resolver.resolve(&gesture("↓"), "").unwrap_err(),
        ResolveError::MissingSelection {
            id: "Google".into()
        }
    );
    assert_eq!(
        resolver.resolve(&gesture("↑"), "cats").unwrap_err(),
        ResolveError::UnknownTemplate { id: "Gone".into() }
    );
    assert!(matches!(
        resolver.resolve(&gesture("←"), "cats").unwrap_err(),
        ResolveError::InvalidUrl { .. }
    ));
}

#[test]
fn resolution_carries_the_captured_target() {
    let resolver = resolver(&[("↓", "openlinkinnewtab")]);
    let pending = PendingAction {
        key: ActionKey::Gesture("↓".into()),
        option: ActionOption {
            url: Some("https://example.com/a".into()),
            prevent_context_menu: true,
            ..ActionOption::default()
        },
    };
    let resolved = resolver.resolve(&pending, "").unwrap().unwrap();
    assert_eq!(resolved.request.url.as_deref(), Some("https://example.com/a"));
    assert!(resolved.request.prevent_context_menu);
}

#[test]
fn execution_sites() {
    assert_eq!(BuiltinAction::CopyText.site(), ExecutionSite::Frame);
    assert_eq!(
        BuiltinAction::ScrollBottom.site(),
        ExecutionSite::Scroll(ScrollKind::Bottom)
    );
    assert_eq!(BuiltinAction::CloseTab.site(), ExecutionSite::Authority);
    assert_eq!(BuiltinAction::GotoPreviousTabLoop.site(), ExecutionSite::Authority);
}
