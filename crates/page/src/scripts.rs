//! Injected-script builders
//!
//! Every DOM-querying primitive evaluates a self-contained expression in
//! the page context and reads back a JSON-safe value. Scripts that need
//! caller input are arrow functions applied to exactly one argument
//! literal produced by serde_json - caller text never touches the script
//! source, so quoting in a description or selector cannot break out of
//! the expression.
//!
//! Every script catches its own failures and resolves to the documented
//! empty default: a hostile or malformed page must degrade the result,
//! never abort the session.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::locator::LocateArgs;

/// Wrap `source` (an arrow function) into an expression applying it to
/// `args` serialized as a JSON literal.
fn apply<T: Serialize>(source: &str, args: &T) -> Result<String> {
    let literal = serde_json::to_string(args)?;
    Ok(format!("({source})({literal});"))
}

/// Walks every `<form>`, collecting nested control metadata.
/// Resolves to `[]` on any page-side failure.
pub const EXTRACT_FORMS: &str = r##"(() => {
  try {
    return Array.from(document.querySelectorAll('form')).map((form) => ({
      action: form.action || '',
      method: form.method || 'get',
      inputs: Array.from(form.querySelectorAll('input, select, textarea, button')).map((input) => ({
        type: input.type || input.tagName.toLowerCase(),
        name: input.name || input.id || '',
        placeholder: input.placeholder || '',
        value: input.value || '',
        required: input.required || false,
        disabled: input.disabled || false
      }))
    }));
  } catch (e) {
    return [];
  }
})();"##;

/// Walks every `<table>` into a header row plus body rows of trimmed
/// cell text. Resolves to `[]` on failure.
pub const EXTRACT_TABLES: &str = r##"(() => {
  try {
    return Array.from(document.querySelectorAll('table')).map((table) => {
      const rows = Array.from(table.querySelectorAll('tr')).map((row) =>
        Array.from(row.querySelectorAll('th, td')).map((cell) => cell.innerText.trim())
      );
      const caption = table.querySelector('caption');
      return {
        headers: rows[0] || [],
        data: rows.slice(1),
        caption: caption ? caption.innerText : ''
      };
    });
  } catch (e) {
    return [];
  }
})();"##;

/// Reader-mode extraction: scores candidate containers by text density
/// (text length over link+image count), sanitizes a clone of the winner,
/// and resolves relative URLs. Resolves to the empty shape on failure.
pub const EXTRACT_READABLE: &str = r##"(() => {
  try {
    const pick = (selector) => {
      const el = document.querySelector(selector);
      return el && el.content ? el.content : '';
    };
    const meta = {
      title: pick('meta[property="og:title"], meta[name="twitter:title"]') || document.title || '',
      description: pick('meta[property="og:description"], meta[name="description"], meta[name="twitter:description"]'),
      image: pick('meta[property="og:image"], meta[name="twitter:image"]')
    };

    const candidates = Array.from(
      document.querySelectorAll('article, main, #content, .content, .post, .entry, .article')
    );
    const score = (el) => {
      const text = (el.innerText || '').trim();
      const links = el.querySelectorAll('a').length + 1;
      const imgs = el.querySelectorAll('img').length + 1;
      return text.length / (links + imgs);
    };
    let root = document.body;
    let best = score(root);
    for (const el of candidates) {
      const s = score(el);
      if (s > best) { best = s; root = el; }
    }

    const cloned = root.cloneNode(true);
    const walker = document.createTreeWalker(cloned, NodeFilter.SHOW_ELEMENT, null);
    const doomed = [];
    let node;
    while ((node = walker.nextNode())) {
      if (['SCRIPT', 'STYLE', 'IFRAME', 'NOSCRIPT'].includes(node.tagName)) {
        doomed.push(node);
        continue;
      }
      for (const attr of Array.from(node.attributes || [])) {
        const name = attr.name.toLowerCase();
        if (name.startsWith('on') || name === 'srcdoc') node.removeAttribute(attr.name);
      }
    }
    doomed.forEach((el) => el.remove());

    const absolute = (value) => {
      try { return new URL(value, location.href).href; } catch (e) { return ''; }
    };
    cloned.querySelectorAll('a[href]').forEach((a) => {
      const href = absolute(a.getAttribute('href'));
      if (href) a.setAttribute('href', href);
    });
    cloned.querySelectorAll('img[src]').forEach((img) => {
      const src = absolute(img.getAttribute('src'));
      if (src) img.setAttribute('src', src);
    });

    const links = Array.from(root.querySelectorAll('a[href]')).slice(0, 200)
      .map((a) => ({
        text: (a.innerText || '').trim().slice(0, 160),
        href: absolute(a.getAttribute('href'))
      }))
      .filter((link) => link.href);
    const images = Array.from(root.querySelectorAll('img[src]')).slice(0, 50)
      .map((img) => ({
        src: absolute(img.getAttribute('src')),
        alt: (img.getAttribute('alt') || '').slice(0, 160)
      }))
      .filter((image) => image.src);

    return {
      title: meta.title,
      html: '<div>' + cloned.innerHTML + '</div>',
      text: (root.innerText || '').slice(0, 200000),
      links: links,
      images: images,
      meta: meta
    };
  } catch (e) {
    return { title: '', html: '', text: '', links: [], images: [], meta: {} };
  }
})();"##;

/// Arguments for [`wait_for_element`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitArgs {
    pub selector: String,
    pub timeout_ms: u64,
}

const WAIT_FOR_ELEMENT: &str = r##"(args) => new Promise((resolve) => {
  const probe = () => document.querySelector(args.selector);
  try {
    if (probe()) return resolve(true);
    const observer = new MutationObserver(() => {
      if (probe()) { observer.disconnect(); resolve(true); }
    });
    observer.observe(document.body || document.documentElement, { childList: true, subtree: true });
    setTimeout(() => { observer.disconnect(); resolve(false); }, args.timeoutMs);
  } catch (e) {
    resolve(false);
  }
})"##;

/// Resolves `true` as soon as the selector matches (watching DOM
/// mutations), `false` at the timeout. A selector the engine rejects
/// also resolves `false`.
pub fn wait_for_element(args: &WaitArgs) -> Result<String> {
    apply(WAIT_FOR_ELEMENT, args)
}

const LOCATE_ELEMENT: &str = r##"(args) => new Promise((resolve) => {
  const desc = (args.description || '').toLowerCase();
  const tokens = desc.split(/\s+/).filter(Boolean);
  const deadline = Date.now() + args.timeoutMs;

  const clickable = () =>
    Array.from(document.querySelectorAll('button, a, input, [role="button"]'));

  const byStrategy = (name) => {
    switch (name) {
      case 'text-content': {
        const hit = clickable().find((el) =>
          (el.textContent || '').toLowerCase().includes(desc));
        return hit || null;
      }
      case 'placeholder': {
        const hit = Array.from(document.querySelectorAll('input, textarea')).find((el) =>
          (el.placeholder || '').toLowerCase().includes(desc));
        return hit || null;
      }
      case 'aria-label': {
        const hit = Array.from(document.querySelectorAll('[aria-label]')).find((el) =>
          (el.getAttribute('aria-label') || '').toLowerCase().includes(desc));
        return hit || null;
      }
      case 'title-attr': {
        const hit = Array.from(document.querySelectorAll('[title]')).find((el) =>
          (el.getAttribute('title') || '').toLowerCase().includes(desc));
        return hit || null;
      }
      case 'fuzzy-text': {
        let bestEl = null;
        let bestScore = 0;
        for (const el of clickable()) {
          const text = ((el.textContent || '') + ' ' + (el.value || '')).toLowerCase();
          if (!text.trim()) continue;
          let matched = 0;
          for (const token of tokens) {
            if (text.includes(token)) matched += 1;
          }
          if (matched > bestScore) { bestScore = matched; bestEl = el; }
        }
        return bestScore > 0 ? bestEl : null;
      }
      default:
        return null;
    }
  };

  const describe = (el) => ({
    tagName: el.tagName,
    textContent: (el.textContent || '').trim().slice(0, 200),
    placeholder: el.placeholder || '',
    type: el.type || '',
    className: typeof el.className === 'string' ? el.className : '',
    id: el.id || ''
  });

  const fillField = (text) => {
    const fields = Array.from(document.querySelectorAll('input, textarea'));
    const field = fields.find((input) => {
      const label = input.labels && input.labels[0]
        ? (input.labels[0].textContent || '').toLowerCase()
        : '';
      return (input.placeholder || '').toLowerCase().includes(desc)
        || label.includes(desc)
        || (input.name || '').toLowerCase().includes(desc)
        || (input.id || '').toLowerCase().includes(desc);
    });
    if (!field) return null;
    field.focus();
    field.value = text;
    field.dispatchEvent(new Event('input', { bubbles: true }));
    field.dispatchEvent(new Event('change', { bubbles: true }));
    return field;
  };

  const act = (el) => {
    if (args.action.kind === 'click') {
      el.click();
      return el;
    }
    if (args.action.kind === 'type') {
      return fillField(args.action.text);
    }
    return el;
  };

  const attempt = () => {
    try {
      for (const strategy of args.strategies) {
        const el = byStrategy(strategy);
        if (el) {
          const acted = act(el);
          if (acted) {
            resolve({ found: true, element: describe(acted) });
            return;
          }
          break;
        }
      }
    } catch (e) {}
    if (Date.now() >= deadline) {
      resolve({ found: false, error: 'no element matched the description' });
      return;
    }
    setTimeout(attempt, 100);
  };

  attempt();
})"##;

/// Multi-strategy fuzzy locate, retried every 100 ms until match or
/// timeout, optionally performing a click or fill on the match. Resolves
/// a [`LocateOutcome`](crate::types::LocateOutcome)-shaped object.
pub fn locate_element(args: &LocateArgs) -> Result<String> {
    apply(LOCATE_ELEMENT, args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::{Action, LocateArgs};

    #[test]
    fn locate_script_embeds_args_as_json_literal() {
        let args = LocateArgs::locate(r#"say "hi" & <click>'em"#, 10_000);
        let script = locate_element(&args).unwrap();

        let literal = serde_json::to_string(&args).unwrap();
        assert!(script.contains(&literal));
        // The hostile description only appears in escaped form.
        assert!(script.contains(r#"say \"hi\""#));
        assert!(!script.contains(r#""say "hi""#));
        assert!(script.ends_with(");"));
    }

    #[test]
    fn wait_script_carries_selector_and_timeout() {
        let script = wait_for_element(&WaitArgs {
            selector: "#never-exists".into(),
            timeout_ms: 50,
        })
        .unwrap();

        assert!(script.contains("MutationObserver"));
        assert!(script.contains(r##""selector":"#never-exists""##));
        assert!(script.contains(r#""timeoutMs":50"#));
    }

    #[test]
    fn quoted_selector_cannot_escape_the_literal() {
        let script = wait_for_element(&WaitArgs {
            selector: r#"a[href="x"] '); alert(1); ('"#.into(),
            timeout_ms: 5_000,
        })
        .unwrap();

        // One argument literal, quoting handled by the JSON encoder.
        assert!(script.contains(r#"a[href=\"x\"]"#));
        assert!(!script.contains(r#"href="x""#));
    }

    #[test]
    fn extraction_scripts_are_self_invoking() {
        for script in [EXTRACT_FORMS, EXTRACT_TABLES, EXTRACT_READABLE] {
            assert!(script.starts_with("(() =>"));
            assert!(script.ends_with(")();"));
            assert!(script.contains("catch"));
        }
    }

    #[test]
    fn locate_script_actions_switch_on_kind() {
        let click = locate_element(&LocateArgs::locate("submit", 1_000).with_action(Action::Click))
            .unwrap();
        assert!(click.contains(r#""action":{"kind":"click"}"#));

        let typed = locate_element(
            &LocateArgs::locate("email", 1_000).with_action(Action::Type {
                text: "user@example.test".into(),
            }),
        )
        .unwrap();
        assert!(typed.contains(r#""kind":"type""#));
        assert!(typed.contains("user@example.test"));
    }
}
