use anyhow::{anyhow, Context};
use frame_gestures::actions::ScrollMetrics;
use frame_gestures::background::{Background, MockBrowser, TabBinding};
use frame_gestures::frames::FrameId;
use frame_gestures::logging;
use frame_gestures::mouse_gestures::GestureEvent;
use frame_gestures::page::{FrameOutput, Page};
use frame_gestures::settings::Settings;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

const WINDOW: u32 = 1;

#[derive(Debug, Deserialize)]
struct Scenario {
    url: String,
    /// Extra tabs opened before the page's own tab.
    #[serde(default)]
    background_tabs: usize,
    #[serde(default)]
    frames: Vec<ChildFrame>,
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct ChildFrame {
    parent: FrameId,
    url: String,
    #[serde(default)]
    embedder: Vec<ScrollMetrics>,
}

#[derive(Debug, Deserialize)]
struct Step {
    frame: FrameId,
    event: GestureEvent,
}

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let usage = "usage: frame_gestures <settings.json> <scenario.json>";
    let settings_path = args.next().ok_or_else(|| anyhow!(usage))?;
    let scenario_path = args.next().ok_or_else(|| anyhow!(usage))?;

    let settings = Settings::load(&settings_path)
        .with_context(|| format!("loading settings from {settings_path}"))?;
    logging::init(settings.debug_logging);

    let content = std::fs::read_to_string(&scenario_path)
        .with_context(|| format!("reading scenario {scenario_path}"))?;
    let scenario: Scenario = serde_json::from_str(&content)?;

    let mut browser = MockBrowser::new();
    for _ in 0..scenario.background_tabs {
        browser.open_tab(WINDOW);
    }
    let tab = browser.open_tab(WINDOW);
    let background = Arc::new(Mutex::new(Background::new(
        browser,
        settings.history_size(),
    )));
    let host = TabBinding::new(Arc::clone(&background), WINDOW, tab);

    let mut page = Page::new(settings, &scenario.url, Box::new(host));
    for frame in scenario.frames {
        page.add_frame(frame.parent, &frame.url, frame.embedder)?;
    }
    page.pump();

    let mut outputs: BTreeMap<FrameId, Vec<FrameOutput>> = BTreeMap::new();
    for step in &scenario.steps {
        page.dispatch(step.frame, &step.event)?;
        page.pump();
        for id in page.frame_ids() {
            outputs.entry(id).or_default().extend(page.take_outputs(id));
        }
    }

    let background = background
        .lock()
        .map_err(|_| anyhow!("background lock poisoned"))?;
    let commands: Vec<_> = background
        .browser()
        .commands()
        .iter()
        .map(|(window, tab, command)| json!({ "window": window, "tab": tab, "command": command }))
        .collect();
    let report = json!({
        "outputs": outputs,
        "commands": commands,
        "history": background.history().history(WINDOW),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
