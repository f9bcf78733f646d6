// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Injected element scripts.
//!
//! Element lookup runs inside the page so that CSS, role+name and label
//! locators share one implementation. Every script evaluates to a non-null
//! JSON value so the result always deserializes.

use dp_portal::Locator;
use serde::Deserialize;

/// Helpers shared by every element script.
const PRELUDE: &str = r#"
const norm = t => (t || '').replace(/\s+/g, ' ').trim();
const visible = el => !!el && !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length);
const IMPLICIT = {
  link: 'a[href]',
  button: 'button, input[type=button], input[type=submit]',
  textbox: 'input:not([type]), input[type=text], textarea',
  combobox: 'select',
};
const accessibleName = el => norm(el.getAttribute('aria-label') || el.innerText || el.value || el.textContent);
const byCss = sel => Array.from(document.querySelectorAll(sel)).find(visible) || null;
const byRole = (role, name) => {
  const sel = `[role="${role}"]` + (IMPLICIT[role] ? ', ' + IMPLICIT[role] : '');
  return Array.from(document.querySelectorAll(sel)).filter(visible).find(el => accessibleName(el) === name) || null;
};
const byLabel = text => {
  for (const label of document.querySelectorAll('label')) {
    if (norm(label.innerText) !== text) continue;
    const control = label.control || (label.htmlFor && document.getElementById(label.htmlFor));
    if (visible(control)) return control;
  }
  return Array.from(document.querySelectorAll('[aria-label]')).filter(visible).find(el => norm(el.getAttribute('aria-label')) === text) || null;
};
"#;

fn js_string(value: &str) -> String {
    // serde_json string escaping is valid JavaScript string literal syntax
    serde_json::Value::String(value.to_string()).to_string()
}

fn find_expr(locator: Locator) -> String {
    match locator {
        Locator::Css(css) => format!("byCss({})", js_string(css)),
        Locator::Role { role, name } => format!("byRole({}, {})", js_string(role), js_string(name)),
        Locator::Label(label) => format!("byLabel({})", js_string(label)),
    }
}

fn wrap(locator: Locator, body: &str) -> String {
    format!("(() => {{ {} const el = {}; {} }})()", PRELUDE, find_expr(locator), body)
}

/// Evaluates to `true` when the element is present and visible.
pub(super) fn exists(locator: Locator) -> String {
    wrap(locator, "return el !== null;")
}

#[derive(Debug, Deserialize)]
pub(super) struct TextLookup {
    pub found: bool,
    #[serde(default)]
    pub text: String,
}

/// Evaluates to a [`TextLookup`].
pub(super) fn text(locator: Locator) -> String {
    wrap(
        locator,
        "return el === null ? { found: false, text: '' } : { found: true, text: norm(el.innerText || el.textContent) };",
    )
}

/// Evaluates to `true` when the element was found and clicked.
pub(super) fn click(locator: Locator) -> String {
    wrap(
        locator,
        "if (el === null) return false; el.scrollIntoView({ block: 'center' }); el.click(); return true;",
    )
}

/// Evaluates to `true` when the element was found and filled.
pub(super) fn fill(locator: Locator, value: &str) -> String {
    let body = format!(
        "if (el === null) return false;
         el.scrollIntoView({{ block: 'center' }});
         el.focus();
         const proto = el instanceof HTMLTextAreaElement ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype;
         const setter = Object.getOwnPropertyDescriptor(proto, 'value').set;
         setter.call(el, {});
         el.dispatchEvent(new Event('input', {{ bubbles: true }}));
         el.dispatchEvent(new Event('change', {{ bubbles: true }}));
         el.blur();
         return true;",
        js_string(value)
    );
    wrap(locator, &body)
}

/// Result of [`select`].
pub(super) const SELECTED: &str = "selected";
pub(super) const MISSING_ELEMENT: &str = "missing-element";
pub(super) const MISSING_OPTION: &str = "missing-option";

/// Evaluates to one of [`SELECTED`], [`MISSING_ELEMENT`], [`MISSING_OPTION`].
pub(super) fn select(locator: Locator, label: &str) -> String {
    let body = format!(
        "if (el === null) return '{missing_element}';
         const wanted = {label};
         const option = Array.from(el.options || []).find(o => norm(o.label || o.textContent) === wanted);
         if (!option) return '{missing_option}';
         el.value = option.value;
         el.dispatchEvent(new Event('input', {{ bubbles: true }}));
         el.dispatchEvent(new Event('change', {{ bubbles: true }}));
         return '{selected}';",
        missing_element = MISSING_ELEMENT,
        missing_option = MISSING_OPTION,
        selected = SELECTED,
        label = js_string(label),
    );
    wrap(locator, &body)
}

pub(super) const READY_STATE: &str = "document.readyState";

#[cfg(test)]
#[path = "script_tests.rs"]
mod tests;
