use async_trait::async_trait;
use chromiumoxide::element::Element as CrElement;

use crate::classify::FieldDescriptor;
use crate::driver::{FieldHandle, FormHandle};
use crate::error::{Error, Result};

const SUBMIT_SELECTOR: &str = r#"button[type="submit"], input[type="submit"]"#;

const DESCRIBE_JS: &str = "function() {
    return JSON.stringify({
        tag: this.tagName.toLowerCase(),
        type: this.getAttribute('type'),
        name: this.getAttribute('name'),
        placeholder: this.getAttribute('placeholder'),
        id: this.getAttribute('id')
    });
}";

/// Assign `value` through the prototype's setter so framework-controlled
/// inputs see the change, then fire `input` and `change`.
fn set_value_js(value: &str) -> Result<String> {
    let value_js = serde_json::to_string(value)?;
    Ok(format!(
        r#"function() {{
            const proto = Object.getPrototypeOf(this);
            const desc = Object.getOwnPropertyDescriptor(proto, 'value');
            if (desc && desc.set) {{
                desc.set.call(this, {value_js});
            }} else {{
                this.value = {value_js};
            }}
            this.dispatchEvent(new Event('input', {{ bubbles: true }}));
            this.dispatchEvent(new Event('change', {{ bubbles: true }}));
        }}"#
    ))
}

/// Wrapper around a chromiumoxide Element. Serves as both form and field handle.
pub struct Element {
    inner: CrElement,
}

impl Element {
    pub(crate) fn new(inner: CrElement) -> Self {
        Self { inner }
    }

    /// Click this element (scrolls into view first).
    pub async fn click(&self) -> Result<()> {
        self.inner.click().await?;
        Ok(())
    }

    /// Find all child elements matching the given CSS selector.
    pub async fn find_elements(&self, selector: &str) -> Result<Vec<Element>> {
        let els = self.inner.find_elements(selector).await?;
        Ok(els.into_iter().map(Element::new).collect())
    }

    /// Run a JS function with `this` bound to the element and return its
    /// string result.
    async fn call_for_string(&self, function: &str) -> Result<String> {
        let returns = self.inner.call_js_fn(function, false).await?;
        returns
            .result
            .value
            .and_then(|v| v.as_str().map(String::from))
            .ok_or_else(|| Error::JsError("function returned no string".into()))
    }

    async fn call_void(&self, function: &str) -> Result<()> {
        self.inner.call_js_fn(function, false).await?;
        Ok(())
    }
}

#[async_trait]
impl FormHandle for Element {
    type Field = Element;

    async fn contains(&self, selector: &str) -> Result<bool> {
        Ok(!self.find_elements(selector).await?.is_empty())
    }

    async fn fields(&self) -> Result<Vec<Element>> {
        self.find_elements("input, textarea").await
    }

    async fn has_submit_control(&self) -> Result<bool> {
        self.contains(SUBMIT_SELECTOR).await
    }

    async fn click_submit(&self) -> Result<()> {
        let el = self
            .inner
            .find_element(SUBMIT_SELECTOR)
            .await
            .map_err(|e| Error::ElementNotFound(e.to_string()))?;
        el.click().await?;
        Ok(())
    }
}

#[async_trait]
impl FieldHandle for Element {
    async fn describe(&self) -> Result<FieldDescriptor> {
        let json = self.call_for_string(DESCRIBE_JS).await?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Focus and set the value in one step, replacing any previous content.
    /// Elements without a layout box fail at the scroll step.
    async fn fill(&self, value: &str) -> Result<()> {
        self.inner.scroll_into_view().await?;
        self.inner.focus().await?;
        self.call_void(&set_value_js(value)?).await
    }
}
