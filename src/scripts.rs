// JavaScript snippets executed through `Driver::execute`.
// `arguments[0]` is always the target element where one is taken.

/// Click through the page's script engine, bypassing occlusion checks
pub const CLICK: &str = "arguments[0].click();";

/// Centre the element in the viewport
pub const SCROLL_INTO_VIEW: &str =
    "arguments[0].scrollIntoView({block: 'center', behavior: 'smooth'});";

pub const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";

pub const READY_STATE: &str = "return document.readyState;";

/// True when another element sits on top of the target's centre point
pub const IS_OBSCURED: &str = r#"
    const el = arguments[0];
    const rect = el.getBoundingClientRect();
    const top = document.elementFromPoint(
        rect.left + rect.width / 2,
        rect.top + rect.height / 2
    );
    return !!top && top !== el && !el.contains(top);
"#;

pub fn scroll_by(pixels: i64) -> String {
    format!("window.scrollBy(0, {});", pixels)
}
