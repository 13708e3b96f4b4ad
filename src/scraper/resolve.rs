//! First-match-wins evaluation of selector fallback chains.

use tracing::{debug, trace};

use crate::browser::{PageElement, Query};
use crate::error::Result;

/// The winning selector of a chain and the elements it matched.
#[derive(Debug)]
pub struct Matched<'s, E> {
    pub selector: &'s str,
    /// Index of `selector` within the chain it was resolved from.
    pub position: usize,
    pub elements: Vec<E>,
}

/// Which matched element(s) [`extract_text`] reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    /// Only the element at this index.
    Nth(usize),
    /// The first acceptable element at or after this index.
    From(usize),
}

/// Evaluate `chain` in order and return the first non-empty match set.
///
/// Selectors after the winner are never evaluated. A selector that fails to
/// evaluate counts as matching nothing.
pub async fn first_match<'s, Q: Query>(
    scope: &Q,
    chain: &[&'s str],
) -> Option<Matched<'s, Q::Element>> {
    for (position, &selector) in chain.iter().enumerate() {
        match scope.query(selector).await {
            Ok(elements) if !elements.is_empty() => {
                trace!(selector, count = elements.len(), "selector matched");
                return Some(Matched {
                    selector,
                    position,
                    elements,
                });
            }
            Ok(_) => trace!(selector, "selector matched nothing"),
            Err(e) => debug!(selector, error = %e, "selector failed, treating as no match"),
        }
    }
    None
}

/// Walk `chain` with [`first_match`] until the picked text is accepted.
///
/// When the winning selector's text is rejected, resolution resumes with the
/// selectors after it. Errors reading element text are returned as-is.
pub async fn extract_text<Q, T>(
    scope: &Q,
    chain: &[&str],
    pick: Pick,
    accept: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>>
where
    Q: Query,
{
    let mut rest = chain;
    while let Some(matched) = first_match(scope, rest).await {
        let candidates = match pick {
            Pick::Nth(i) => matched.elements.get(i..=i).unwrap_or_default(),
            Pick::From(i) => matched.elements.get(i..).unwrap_or_default(),
        };
        for element in candidates {
            let text = element.text().await?;
            if let Some(value) = accept(text.trim()) {
                debug!(selector = matched.selector, "extracted value");
                return Ok(Some(value));
            }
        }
        rest = &rest[matched.position + 1..];
    }
    Ok(None)
}
