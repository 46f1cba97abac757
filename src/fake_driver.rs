// In-memory `Driver` used by the unit tests.
//
// There is no CSS/XPath engine: tests bind each locator to the nodes it
// should return, either at document level or under a parent node. Nodes can
// appear, become visible or load their document after a delay measured on
// tokio's clock, so the tests run with `start_paused = true`.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

use crate::driver::Driver;
use crate::errors::{ProbeError, Result};
use crate::locator::Locator;
use crate::scripts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FakeElement(pub usize);

/// What happens when a node is clicked (natively or by script)
#[derive(Debug, Clone)]
pub enum Effect {
    Show(FakeElement),
    Hide(FakeElement),
    Toggle(FakeElement),
    SetText(FakeElement, String),
    Detach(FakeElement),
    /// Replace the current window's URL and title
    Navigate(String, String),
    /// Open a new window at this URL
    OpenWindow(String),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub text: String,
    pub attributes: HashMap<String, String>,
    pub displayed: bool,
    pub enabled: bool,
    pub obscured: bool,
    pub attached: bool,
    pub value: String,
    window: usize,
    present_at: Instant,
    visible_at: Instant,
    on_click: Vec<Effect>,
}

#[derive(Debug, Clone)]
struct Window {
    url: String,
    title: String,
}

struct Binding {
    scope: Option<FakeElement>,
    locator: Locator,
    node: FakeElement,
}

struct State {
    nodes: Vec<Node>,
    bindings: Vec<Binding>,
    windows: Vec<Window>,
    current: usize,
    ready_at: Option<Instant>,
    log: Vec<String>,
    fail_screenshot: bool,
}

pub struct FakeDriver {
    state: RefCell<State>,
    quit: Rc<Cell<bool>>,
}

impl FakeDriver {
    pub fn new(url: &str, title: &str) -> Self {
        Self {
            state: RefCell::new(State {
                nodes: Vec::new(),
                bindings: Vec::new(),
                windows: vec![Window {
                    url: url.to_string(),
                    title: title.to_string(),
                }],
                current: 0,
                ready_at: Some(Instant::now()),
                log: Vec::new(),
                fail_screenshot: false,
            }),
            quit: Rc::new(Cell::new(false)),
        }
    }

    /// Add a displayed, enabled node with the given text to the current window
    pub fn add(&self, text: &str) -> FakeElement {
        let mut state = self.state.borrow_mut();
        let now = Instant::now();
        let window = state.current;
        state.nodes.push(Node {
            text: text.to_string(),
            attributes: HashMap::new(),
            displayed: true,
            enabled: true,
            obscured: false,
            attached: true,
            value: String::new(),
            window,
            present_at: now,
            visible_at: now,
            on_click: Vec::new(),
        });
        FakeElement(state.nodes.len() - 1)
    }

    /// Add a node and bind it to `locator` at document level
    pub fn add_bound(&self, locator: &Locator, text: &str) -> FakeElement {
        let el = self.add(text);
        self.bind(locator, el);
        el
    }

    /// Add a node and bind it to `locator` under `parent`
    pub fn add_within(&self, parent: FakeElement, locator: &Locator, text: &str) -> FakeElement {
        let el = self.add(text);
        self.bind_within(parent, locator, el);
        el
    }

    pub fn bind(&self, locator: &Locator, node: FakeElement) {
        self.state.borrow_mut().bindings.push(Binding {
            scope: None,
            locator: locator.clone(),
            node,
        });
    }

    pub fn bind_within(&self, parent: FakeElement, locator: &Locator, node: FakeElement) {
        self.state.borrow_mut().bindings.push(Binding {
            scope: Some(parent),
            locator: locator.clone(),
            node,
        });
    }

    pub fn update(&self, el: FakeElement, f: impl FnOnce(&mut Node)) {
        f(&mut self.state.borrow_mut().nodes[el.0]);
    }

    pub fn node(&self, el: FakeElement) -> Node {
        self.state.borrow().nodes[el.0].clone()
    }

    /// Node enters the DOM `delay` from now
    pub fn appear_after(&self, el: FakeElement, delay: Duration) {
        let at = Instant::now() + delay;
        self.update(el, |n| {
            n.present_at = at;
            n.visible_at = at;
        });
    }

    /// Node is in the DOM now but only becomes displayed after `delay`
    pub fn show_after(&self, el: FakeElement, delay: Duration) {
        let at = Instant::now() + delay;
        self.update(el, |n| n.visible_at = at);
    }

    pub fn on_click(&self, el: FakeElement, effects: Vec<Effect>) {
        self.update(el, |n| n.on_click = effects);
    }

    pub fn set_attribute(&self, el: FakeElement, name: &str, value: &str) {
        self.update(el, |n| {
            n.attributes.insert(name.to_string(), value.to_string());
        });
    }

    /// `document.readyState` reports "complete" after `delay`; `None` never
    pub fn document_ready_after(&self, delay: Option<Duration>) {
        self.state.borrow_mut().ready_at = delay.map(|d| Instant::now() + d);
    }

    pub fn open_window(&self, url: &str) {
        self.state.borrow_mut().windows.push(Window {
            url: url.to_string(),
            title: String::new(),
        });
    }

    pub fn fail_screenshots(&self) {
        self.state.borrow_mut().fail_screenshot = true;
    }

    /// Actions performed so far, e.g. `click:3`, `js_click:5`, `scroll:5`
    pub fn log(&self) -> Vec<String> {
        self.state.borrow().log.clone()
    }

    pub fn current_window(&self) -> usize {
        self.state.borrow().current
    }

    /// Shared flag flipped by `quit`, observable after the driver is consumed
    pub fn quit_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.quit)
    }

    fn live(&self, el: &FakeElement) -> Result<Node> {
        let state = self.state.borrow();
        let node = &state.nodes[el.0];
        if !node.attached || node.present_at > Instant::now() {
            return Err(ProbeError::StaleElement(format!("node {}", el.0)));
        }
        Ok(node.clone())
    }

    fn visible(node: &Node) -> bool {
        node.displayed && node.visible_at <= Instant::now()
    }

    fn matches(&self, scope: Option<FakeElement>, locator: &Locator) -> Vec<FakeElement> {
        let state = self.state.borrow();
        let now = Instant::now();
        state
            .bindings
            .iter()
            .filter(|b| b.scope == scope && &b.locator == locator)
            .map(|b| b.node)
            .filter(|el| {
                let node = &state.nodes[el.0];
                node.attached && node.present_at <= now && node.window == state.current
            })
            .collect()
    }

    fn apply(&self, el: FakeElement, kind: &str) {
        let effects = {
            let mut state = self.state.borrow_mut();
            state.log.push(format!("{}:{}", kind, el.0));
            state.nodes[el.0].on_click.clone()
        };

        let mut state = self.state.borrow_mut();
        for effect in effects {
            match effect {
                Effect::Show(t) => state.nodes[t.0].displayed = true,
                Effect::Hide(t) => state.nodes[t.0].displayed = false,
                Effect::Toggle(t) => {
                    let node = &mut state.nodes[t.0];
                    node.displayed = !node.displayed;
                }
                Effect::SetText(t, text) => state.nodes[t.0].text = text,
                Effect::Detach(t) => state.nodes[t.0].attached = false,
                Effect::Navigate(url, title) => {
                    let current = state.current;
                    state.windows[current] = Window { url, title };
                }
                Effect::OpenWindow(url) => state.windows.push(Window {
                    url,
                    title: String::new(),
                }),
            }
        }
    }
}

impl Driver for FakeDriver {
    type Element = FakeElement;
    type Window = usize;

    async fn goto(&self, url: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let current = state.current;
        state.windows[current].url = url.to_string();
        state.log.push(format!("goto:{}", url));
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let state = self.state.borrow();
        Ok(state.windows[state.current].url.clone())
    }

    async fn title(&self) -> Result<String> {
        let state = self.state.borrow();
        Ok(state.windows[state.current].title.clone())
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<FakeElement>> {
        Ok(self.matches(None, locator))
    }

    async fn find_all_within(
        &self,
        parent: &FakeElement,
        locator: &Locator,
    ) -> Result<Vec<FakeElement>> {
        self.live(parent)?;
        Ok(self.matches(Some(*parent), locator))
    }

    async fn execute(&self, script: &str, args: &[&FakeElement]) -> Result<Value> {
        match script {
            scripts::CLICK => {
                let el = *args[0];
                self.live(&el)?;
                self.apply(el, "js_click");
                Ok(Value::Null)
            }
            scripts::SCROLL_INTO_VIEW => {
                let el = *args[0];
                self.live(&el)?;
                self.state.borrow_mut().log.push(format!("scroll:{}", el.0));
                Ok(Value::Null)
            }
            scripts::IS_OBSCURED => Ok(Value::Bool(self.live(args[0])?.obscured)),
            scripts::READY_STATE => {
                let ready = self
                    .state
                    .borrow()
                    .ready_at
                    .is_some_and(|at| at <= Instant::now());
                Ok(Value::from(if ready { "complete" } else { "loading" }))
            }
            other => {
                self.state.borrow_mut().log.push(format!("script:{}", other));
                Ok(Value::Null)
            }
        }
    }

    async fn window_handles(&self) -> Result<Vec<usize>> {
        Ok((0..self.state.borrow().windows.len()).collect())
    }

    async fn switch_to_window(&self, window: &usize) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if *window >= state.windows.len() {
            return Err(ProbeError::WebDriver(format!("no such window: {}", window)));
        }
        state.current = *window;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        if self.state.borrow().fail_screenshot {
            return Err(ProbeError::WebDriver("screenshot unavailable".into()));
        }
        Ok(b"\x89PNG\r\n\x1a\nfake".to_vec())
    }

    async fn quit(self) -> Result<()> {
        self.quit.set(true);
        Ok(())
    }

    async fn text(&self, element: &FakeElement) -> Result<String> {
        let node = self.live(element)?;
        // Rendered text only, like WebDriver's "Get Element Text"
        Ok(if Self::visible(&node) {
            node.text
        } else {
            String::new()
        })
    }

    async fn attribute(&self, element: &FakeElement, name: &str) -> Result<Option<String>> {
        Ok(self.live(element)?.attributes.get(name).cloned())
    }

    async fn is_displayed(&self, element: &FakeElement) -> Result<bool> {
        Ok(Self::visible(&self.live(element)?))
    }

    async fn is_enabled(&self, element: &FakeElement) -> Result<bool> {
        Ok(self.live(element)?.enabled)
    }

    async fn click(&self, element: &FakeElement) -> Result<()> {
        let node = self.live(element)?;
        if !Self::visible(&node) || node.obscured {
            return Err(ProbeError::ElementNotInteractable(format!(
                "element click intercepted on node {}",
                element.0
            )));
        }
        self.apply(*element, "click");
        Ok(())
    }

    async fn clear(&self, element: &FakeElement) -> Result<()> {
        self.live(element)?;
        self.update(*element, |n| n.value.clear());
        Ok(())
    }

    async fn send_keys(&self, element: &FakeElement, text: &str) -> Result<()> {
        self.live(element)?;
        self.update(*element, |n| n.value.push_str(text));
        Ok(())
    }

    async fn hover(&self, element: &FakeElement) -> Result<()> {
        self.live(element)?;
        self.state
            .borrow_mut()
            .log
            .push(format!("hover:{}", element.0));
        Ok(())
    }
}
