use anyhow::Result;
use headless_chrome::{Element, Tab};

/// True when the element takes up space and is not hidden by CSS.
const VISIBLE_JS: &str = r#"function() {
  const s = window.getComputedStyle(this);
  const boxed = this.offsetWidth > 0 || this.offsetHeight > 0 || this.getClientRects().length > 0;
  return boxed && s.display !== 'none' && s.visibility !== 'hidden' && s.opacity !== '0';
}"#;

/// Empties an input and lets the page's framework see the change.
const CLEAR_JS: &str = r#"function() {
  this.value = '';
  this.dispatchEvent(new Event('input', { bubbles: true }));
}"#;

/// Get the current page URL.
pub fn get_current_url(tab: &Tab) -> Result<String> {
    let result = tab.evaluate("window.location.href", false)?;
    Ok(result
        .value
        .and_then(|v| v.as_str().map(String::from))
        .unwrap_or_default())
}

/// Get the current page title.
pub fn get_page_title(tab: &Tab) -> Result<String> {
    let result = tab.evaluate("document.title", false)?;
    Ok(result
        .value
        .and_then(|v| v.as_str().map(String::from))
        .unwrap_or_default())
}

pub fn is_displayed(element: &Element<'_>) -> Result<bool> {
    let result = element.call_js_fn(VISIBLE_JS, vec![], false)?;
    Ok(result.value.and_then(|v| v.as_bool()).unwrap_or(false))
}

pub fn clear_input(element: &Element<'_>) -> Result<()> {
    element.call_js_fn(CLEAR_JS, vec![], false)?;
    Ok(())
}
