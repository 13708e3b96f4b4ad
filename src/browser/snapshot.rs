//! An in-memory browser over fixed HTML pages.
//!
//! Pages are registered up front by URL, from strings or saved files. Contexts
//! behave like browser tabs: each has its own current document, and closing
//! one drops it. The binary uses it to replay a saved listing page offline.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use ::scraper::{ElementRef, Html, Selector};
use async_trait::async_trait;
use itertools::Itertools;
use tracing::debug;

use crate::browser::{Browser, PageElement, Query};
use crate::error::{Result, TipsError};

/// Handle to one tab of a [`SnapshotBrowser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotContext(u32);

#[derive(Debug)]
struct Tab {
    context: SnapshotContext,
    url: Option<String>,
    document: Option<Rc<Html>>,
}

#[derive(Debug)]
pub struct SnapshotBrowser {
    pages: HashMap<String, String>,
    broken: HashSet<String>,
    tabs: Vec<Tab>,
    active: Option<SnapshotContext>,
    next_context: u32,
    history: Vec<String>,
}

impl SnapshotBrowser {
    /// A browser with a single blank tab and no pages.
    pub fn new() -> Self {
        let first = SnapshotContext(0);
        Self {
            pages: HashMap::new(),
            broken: HashSet::new(),
            tabs: vec![Tab {
                context: first,
                url: None,
                document: None,
            }],
            active: Some(first),
            next_context: 1,
            history: vec![],
        }
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Register a page saved to disk, served under `url`.
    pub fn with_page_file(self, url: &str, path: &Path) -> Result<Self> {
        let html = std::fs::read_to_string(path).map_err(|e| TipsError::PageFile {
            path: path.display().to_string(),
            source: e,
        })?;
        debug!(url, path = %path.display(), "registered saved page");
        Ok(self.with_page(url, &html))
    }

    /// Register a page whose elements fail as soon as their text or
    /// attributes are read, like a document that is replaced mid-scrape.
    pub fn with_broken_page(mut self, url: &str, html: &str) -> Self {
        self.broken.insert(url.to_string());
        self.with_page(url, html)
    }

    /// Number of contexts currently open.
    pub fn open_contexts(&self) -> usize {
        self.tabs.len()
    }

    /// Every URL navigated to, in order.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    fn active_tab(&self) -> Result<&Tab> {
        let active = self.active.ok_or(TipsError::ContextNotFound)?;
        self.tabs
            .iter()
            .find(|t| t.context == active)
            .ok_or(TipsError::ContextNotFound)
    }

    fn active_tab_mut(&mut self) -> Result<&mut Tab> {
        let active = self.active.ok_or(TipsError::ContextNotFound)?;
        self.tabs
            .iter_mut()
            .find(|t| t.context == active)
            .ok_or(TipsError::ContextNotFound)
    }
}

impl Default for SnapshotBrowser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl Query for SnapshotBrowser {
    type Element = SnapshotElement;

    async fn query(&self, selector: &str) -> Result<Vec<SnapshotElement>> {
        let tab = self.active_tab()?;
        let Some(document) = &tab.document else {
            return Ok(vec![]);
        };
        let broken = tab.url.as_ref().is_some_and(|u| self.broken.contains(u));
        let selector = Selector::parse(selector)?;
        Ok(document
            .select(&selector)
            .filter_map(|e| SnapshotElement::new(document, &e, broken))
            .collect())
    }
}

#[async_trait(?Send)]
impl Browser for SnapshotBrowser {
    type Context = SnapshotContext;

    async fn navigate(&mut self, url: &str) -> Result<()> {
        let html = self
            .pages
            .get(url)
            .ok_or_else(|| TipsError::PageNotFound {
                url: url.to_string(),
            })?;
        let document = Rc::new(Html::parse_document(html));
        let tab = self.active_tab_mut()?;
        tab.url = Some(url.to_string());
        tab.document = Some(document);
        self.history.push(url.to_string());
        debug!(url, "loaded snapshot page");
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, _timeout: Duration) -> Result<()> {
        if self.query(selector).await?.is_empty() {
            return Err(TipsError::Timeout {
                selector: selector.to_string(),
            });
        }
        Ok(())
    }

    async fn current_context(&self) -> Result<SnapshotContext> {
        self.active.ok_or(TipsError::ContextNotFound)
    }

    async fn open_context(&mut self) -> Result<SnapshotContext> {
        let context = SnapshotContext(self.next_context);
        self.next_context += 1;
        self.tabs.push(Tab {
            context,
            url: None,
            document: None,
        });
        Ok(context)
    }

    async fn switch_context(&mut self, context: &SnapshotContext) -> Result<()> {
        if !self.tabs.iter().any(|t| t.context == *context) {
            return Err(TipsError::ContextNotFound);
        }
        self.active = Some(*context);
        Ok(())
    }

    async fn close_context(&mut self, context: &SnapshotContext) -> Result<()> {
        let position = self
            .tabs
            .iter()
            .position(|t| t.context == *context)
            .ok_or(TipsError::ContextNotFound)?;
        self.tabs.remove(position);
        if self.active == Some(*context) {
            self.active = None;
        }
        Ok(())
    }

    async fn quit(self) -> Result<()> {
        Ok(())
    }
}

/// An element of a [`SnapshotBrowser`] page, addressed by its position in the document.
#[derive(Debug, Clone)]
pub struct SnapshotElement {
    document: Rc<Html>,
    index: usize,
    broken: bool,
}

impl SnapshotElement {
    fn new(document: &Rc<Html>, element: &ElementRef, broken: bool) -> Option<Self> {
        let index = document
            .tree
            .nodes()
            .filter(|n| n.value().is_element())
            .position(|n| n.id() == element.id())?;
        Some(Self {
            document: Rc::clone(document),
            index,
            broken,
        })
    }

    fn element(&self) -> Result<ElementRef<'_>> {
        if self.broken {
            return Err(TipsError::StaleElement {
                context: format!("element #{} of a detached document", self.index),
            });
        }
        self.document
            .tree
            .nodes()
            .filter_map(ElementRef::wrap)
            .nth(self.index)
            .ok_or_else(|| TipsError::StaleElement {
                context: format!("element #{}", self.index),
            })
    }
}

#[async_trait(?Send)]
impl Query for SnapshotElement {
    type Element = SnapshotElement;

    async fn query(&self, selector: &str) -> Result<Vec<SnapshotElement>> {
        let selector = Selector::parse(selector)?;
        let element = self.element()?;
        Ok(element
            .select(&selector)
            .filter_map(|e| SnapshotElement::new(&self.document, &e, self.broken))
            .collect())
    }
}

#[async_trait(?Send)]
impl PageElement for SnapshotElement {
    async fn text(&self) -> Result<String> {
        let element = self.element()?;
        Ok(element
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .join(" "))
    }

    async fn attr(&self, name: &str) -> Result<Option<String>> {
        let element = self.element()?;
        Ok(element.value().attr(name).map(str::to_string))
    }

    fn key(&self) -> String {
        format!("{:p}#{}", Rc::as_ptr(&self.document), self.index)
    }
}
