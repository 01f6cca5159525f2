//! Mock implementation of the host platform for testing.
//!
//! This module provides a host that keeps registration state in memory, records
//! every call and prints tags the way the platform does, so tests can assert on
//! both state and output.

use std::fmt;

use enqueuer_assets::{
    AssetDefinition, AssetType, Host, HostResult, Placement, Position, Status, Tag, TagFilter,
};
use enqueuer_core::alloc::{HashMap, HashSet, IndexMap, IndexSet};
use parking_lot::Mutex;
use serde_json::Value;

/// Records a host call for verification in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Register(AssetDefinition),
    Enqueue(AssetDefinition),
    EnqueueRegistered {
        kind: AssetType,
        name: String,
    },
    Deregister {
        kind: AssetType,
        name: String,
    },
    Dequeue {
        kind: AssetType,
        name: String,
    },
    AddInline {
        kind: AssetType,
        name: String,
        code: String,
        position: Position,
    },
    Localize {
        name: String,
        object: String,
        data: Value,
    },
    AddTagFilter {
        kind: AssetType,
    },
}

impl HostCall {
    /// The asset name the call is about, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            HostCall::Register(def) | HostCall::Enqueue(def) => Some(&def.name),
            HostCall::EnqueueRegistered { name, .. }
            | HostCall::Deregister { name, .. }
            | HostCall::Dequeue { name, .. }
            | HostCall::AddInline { name, .. }
            | HostCall::Localize { name, .. } => Some(name),
            HostCall::AddTagFilter { .. } => None,
        }
    }
}

/// Error returned for assets marked with [`MockHost::fail_on`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockHostError {
    pub call: &'static str,
    pub name: String,
}

impl fmt::Display for MockHostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mock host refused {} of '{}'", self.call, self.name)
    }
}

impl std::error::Error for MockHostError {}

/// Host-side tables of one asset kind.
#[derive(Default, Clone)]
struct KindState {
    registered: IndexMap<String, AssetDefinition>,
    queue: IndexSet<String>,
    inline: HashMap<String, Vec<(Position, String)>>,
    filters: Vec<TagFilter>,
}

impl KindState {
    /// Queued assets with their registered dependencies first.
    fn ordered(&self) -> Vec<AssetDefinition> {
        let mut visited = HashSet::new();
        let mut out = Vec::new();
        for name in &self.queue {
            self.visit(name, &mut visited, &mut out);
        }
        out
    }

    fn visit(&self, name: &str, visited: &mut HashSet<String>, out: &mut Vec<AssetDefinition>) {
        if !visited.insert(name.to_string()) {
            return;
        }
        let Some(def) = self.registered.get(name) else {
            return;
        };
        for dep in &def.deps {
            self.visit(dep, visited, out);
        }
        out.push(def.clone());
    }

    fn inline_at(&self, name: &str, position: Option<Position>) -> Option<String> {
        let codes: Vec<&str> = self
            .inline
            .get(name)?
            .iter()
            .filter(|(pos, _)| position.is_none_or(|wanted| *pos == wanted))
            .map(|(_, code)| code.as_str())
            .collect();
        (!codes.is_empty()).then(|| codes.join("\n"))
    }
}

/// In-memory host for tests.
///
/// Methods take `&self`; state sits behind `Mutex`es so the host can be shared
/// with an [`AssetServer`](enqueuer_assets::AssetServer) as `Arc<dyn Host>`.
///
/// # Example
///
/// ```rust
/// use enqueuer_assets::{AssetDefinition, AssetType, Host, Placement, Status};
/// use enqueuer_test_utils::MockHost;
///
/// let host = MockHost::new();
/// host.enqueue(&AssetDefinition {
///     kind: AssetType::Script,
///     name: "bar".to_string(),
///     src: "/fixtures/bar.js".to_string(),
///     deps: Vec::new(),
///     version: "1.0.0".to_string(),
///     placement: Placement::Footer(false),
/// })
/// .unwrap();
///
/// assert!(host.status(AssetType::Script, "bar", Status::Enqueued));
/// assert_eq!(
///     host.print_scripts(),
///     "<script type='text/javascript' src='http://example.org/fixtures/bar.js?ver=1.0.0'></script>\n"
/// );
/// ```
pub struct MockHost {
    /// Recorded calls for verification
    calls: Mutex<Vec<HostCall>>,
    scripts: Mutex<KindState>,
    styles: Mutex<KindState>,
    /// Localized objects per script, by object name
    localized: Mutex<IndexMap<String, IndexMap<String, Value>>>,
    /// Asset names whose register/enqueue calls fail
    failing: Mutex<HashSet<String>>,
    base_url: String,
}

impl MockHost {
    pub fn new() -> Self {
        Self::with_base_url("http://example.org")
    }

    /// Create a host that prefixes relative sources with `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            scripts: Mutex::new(KindState::default()),
            styles: Mutex::new(KindState::default()),
            localized: Mutex::new(IndexMap::default()),
            failing: Mutex::new(HashSet::new()),
            base_url: base_url.into(),
        }
    }

    fn state(&self, kind: AssetType) -> &Mutex<KindState> {
        match kind {
            AssetType::Script => &self.scripts,
            AssetType::Style => &self.styles,
        }
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().push(call);
    }

    fn check(&self, call: &'static str, name: &str) -> HostResult<()> {
        if self.failing.lock().contains(name) {
            return Err(Box::new(MockHostError {
                call,
                name: name.to_string(),
            }));
        }
        Ok(())
    }

    /// Make every later register/enqueue of `name` fail.
    pub fn fail_on(&self, name: &str) {
        self.failing.lock().insert(name.to_string());
    }

    /// Get a copy of all recorded calls.
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().clone()
    }

    /// Recorded calls about `name`.
    pub fn calls_for(&self, name: &str) -> Vec<HostCall> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.name() == Some(name))
            .cloned()
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Clear recorded calls (useful between test steps).
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Count register calls.
    pub fn count_registers(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, HostCall::Register(_)))
            .count()
    }

    /// Count enqueue calls, with or without a definition.
    pub fn count_enqueues(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, HostCall::Enqueue(_) | HostCall::EnqueueRegistered { .. }))
            .count()
    }

    /// Number of tag filters attached for `kind`.
    pub fn count_tag_filters(&self, kind: AssetType) -> usize {
        self.state(kind).lock().filters.len()
    }

    /// The definition the host holds for `name`.
    pub fn definition(&self, kind: AssetType, name: &str) -> Option<AssetDefinition> {
        self.state(kind).lock().registered.get(name).cloned()
    }

    pub fn registered_names(&self, kind: AssetType) -> Vec<String> {
        self.state(kind).lock().registered.keys().cloned().collect()
    }

    pub fn queued_names(&self, kind: AssetType) -> Vec<String> {
        self.state(kind).lock().queue.iter().cloned().collect()
    }

    /// Forget every asset, payload, filter and recorded call.
    pub fn reset(&self) {
        self.calls.lock().clear();
        *self.scripts.lock() = KindState::default();
        *self.styles.lock() = KindState::default();
        self.localized.lock().clear();
        self.failing.lock().clear();
    }

    /// Absolute source URL with the version appended.
    fn href(&self, def: &AssetDefinition) -> String {
        let src = &def.src;
        let mut href = if src.starts_with("http://") || src.starts_with("https://") || src.starts_with("//") {
            src.clone()
        } else if src.starts_with('/') {
            format!("{}{}", self.base_url, src)
        } else {
            format!("{}/{}", self.base_url, src)
        };

        if !def.version.is_empty() {
            let separator = if href.contains('?') { '&' } else { '?' };
            href.push(separator);
            href.push_str("ver=");
            href.push_str(&def.version);
        }
        href
    }

    fn apply_filters(filters: &[TagFilter], html: String, handle: &str, href: &str, media: Option<&str>) -> String {
        filters.iter().fold(html, |html, filter| {
            filter(&Tag {
                html: &html,
                handle,
                href,
                media,
            })
        })
    }

    /// Print every queued style, dependencies first.
    pub fn print_styles(&self) -> String {
        let state = self.styles.lock().clone();
        let mut out = String::new();

        for def in state.ordered() {
            let media = match &def.placement {
                Placement::Media(media) => media.clone(),
                Placement::Footer(_) => "all".to_string(),
            };
            let href = self.href(&def);
            let html = format!(
                "<link rel='stylesheet' id='{}-css'  href='{}' type='text/css' media='{}' />\n",
                def.name, href, media
            );
            out.push_str(&Self::apply_filters(&state.filters, html, &def.name, &href, Some(&media)));

            if let Some(code) = state.inline_at(&def.name, None) {
                out.push_str(&format!(
                    "<style id='{}-inline-css' type='text/css'>\n{}\n</style>\n",
                    def.name, code
                ));
            }
        }
        out
    }

    /// Print every queued script, head and footer.
    pub fn print_scripts(&self) -> String {
        self.print_scripts_where(|_| true)
    }

    /// Print queued scripts placed in the head.
    pub fn print_head_scripts(&self) -> String {
        self.print_scripts_where(|footer| !footer)
    }

    /// Print queued scripts placed in the footer.
    pub fn print_footer_scripts(&self) -> String {
        self.print_scripts_where(|footer| footer)
    }

    fn print_scripts_where(&self, placed: impl Fn(bool) -> bool) -> String {
        let state = self.scripts.lock().clone();
        let localized = self.localized.lock().clone();
        let mut out = String::new();

        for def in state.ordered() {
            let footer = matches!(def.placement, Placement::Footer(true));
            if !placed(footer) {
                continue;
            }

            if let Some(objects) = localized.get(&def.name).filter(|objects| !objects.is_empty()) {
                out.push_str("<script type='text/javascript'>\n/* <![CDATA[ */\n");
                for (object, data) in objects {
                    out.push_str(&format!("var {} = {};\n", object, data));
                }
                out.push_str("/* ]]> */\n</script>\n");
            }

            if let Some(code) = state.inline_at(&def.name, Some(Position::Before)) {
                out.push_str(&format!("<script type='text/javascript'>\n{}\n</script>\n", code));
            }

            let href = self.href(&def);
            let html = format!("<script type='text/javascript' src='{}'></script>\n", href);
            out.push_str(&Self::apply_filters(&state.filters, html, &def.name, &href, None));

            if let Some(code) = state.inline_at(&def.name, Some(Position::After)) {
                out.push_str(&format!("<script type='text/javascript'>\n{}\n</script>\n", code));
            }
        }
        out
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MockHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockHost")
            .field("base_url", &self.base_url)
            .field("scripts", &self.queued_names(AssetType::Script))
            .field("styles", &self.queued_names(AssetType::Style))
            .field("calls", &self.call_count())
            .finish()
    }
}

impl Host for MockHost {
    fn register(&self, asset: &AssetDefinition) -> HostResult<()> {
        self.record(HostCall::Register(asset.clone()));
        self.check("register", &asset.name)?;
        self.state(asset.kind)
            .lock()
            .registered
            .entry(asset.name.clone())
            .or_insert_with(|| asset.clone());
        Ok(())
    }

    fn enqueue(&self, asset: &AssetDefinition) -> HostResult<()> {
        self.record(HostCall::Enqueue(asset.clone()));
        self.check("enqueue", &asset.name)?;
        let mut state = self.state(asset.kind).lock();
        state
            .registered
            .entry(asset.name.clone())
            .or_insert_with(|| asset.clone());
        state.queue.insert(asset.name.clone());
        Ok(())
    }

    fn enqueue_registered(&self, kind: AssetType, name: &str) -> HostResult<()> {
        self.record(HostCall::EnqueueRegistered {
            kind,
            name: name.to_string(),
        });
        self.check("enqueue", name)?;
        self.state(kind).lock().queue.insert(name.to_string());
        Ok(())
    }

    fn deregister(&self, kind: AssetType, name: &str) -> HostResult<()> {
        self.record(HostCall::Deregister {
            kind,
            name: name.to_string(),
        });
        {
            let mut state = self.state(kind).lock();
            state.registered.shift_remove(name);
            state.inline.remove(name);
        }
        if kind == AssetType::Script {
            self.localized.lock().shift_remove(name);
        }
        Ok(())
    }

    fn dequeue(&self, kind: AssetType, name: &str) -> HostResult<()> {
        self.record(HostCall::Dequeue {
            kind,
            name: name.to_string(),
        });
        self.state(kind).lock().queue.shift_remove(name);
        Ok(())
    }

    fn status(&self, kind: AssetType, name: &str, status: Status) -> bool {
        let state = self.state(kind).lock();
        match status {
            Status::Registered => state.registered.contains_key(name),
            Status::Enqueued => state.queue.contains(name),
        }
    }

    fn add_inline(&self, kind: AssetType, name: &str, code: &str, position: Position) -> HostResult<()> {
        self.record(HostCall::AddInline {
            kind,
            name: name.to_string(),
            code: code.to_string(),
            position,
        });
        self.state(kind)
            .lock()
            .inline
            .entry(name.to_string())
            .or_default()
            .push((position, code.to_string()));
        Ok(())
    }

    fn localize(&self, name: &str, object: &str, data: &Value) -> HostResult<()> {
        self.record(HostCall::Localize {
            name: name.to_string(),
            object: object.to_string(),
            data: data.clone(),
        });
        self.localized
            .lock()
            .entry(name.to_string())
            .or_default()
            .insert(object.to_string(), data.clone());
        Ok(())
    }

    fn add_tag_filter(&self, kind: AssetType, filter: TagFilter) -> HostResult<()> {
        self.record(HostCall::AddTagFilter { kind });
        self.state(kind).lock().filters.push(filter);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn style(name: &str, src: &str, deps: &[&str]) -> AssetDefinition {
        AssetDefinition {
            kind: AssetType::Style,
            name: name.to_string(),
            src: src.to_string(),
            deps: deps.iter().map(|dep| dep.to_string()).collect(),
            version: "1.0.0".to_string(),
            placement: Placement::Media("screen".to_string()),
        }
    }

    #[test]
    fn test_register_then_enqueue() {
        let host = MockHost::new();
        host.register(&style("foo", "/fixtures/foo.css", &[])).unwrap();

        assert!(host.status(AssetType::Style, "foo", Status::Registered));
        assert!(!host.status(AssetType::Style, "foo", Status::Enqueued));
        assert!(!host.status(AssetType::Script, "foo", Status::Registered));
        assert_eq!(host.print_styles(), "");

        host.enqueue_registered(AssetType::Style, "foo").unwrap();
        assert!(host.status(AssetType::Style, "foo", Status::Enqueued));
        assert_eq!(host.count_registers(), 1);
        assert_eq!(host.count_enqueues(), 1);
    }

    #[test]
    fn test_dependencies_print_first() {
        let host = MockHost::new();
        host.register(&style("base", "/fixtures/base.css", &[])).unwrap();
        host.enqueue(&style("theme", "https://cdn.example.org/theme.css", &["base", "missing"]))
            .unwrap();

        let expected = concat!(
            "<link rel='stylesheet' id='base-css'  href='http://example.org/fixtures/base.css?ver=1.0.0' type='text/css' media='screen' />\n",
            "<link rel='stylesheet' id='theme-css'  href='https://cdn.example.org/theme.css?ver=1.0.0' type='text/css' media='screen' />\n",
        );
        assert_eq!(host.print_styles(), expected);
    }

    #[test]
    fn test_filters_and_inline() {
        let host = MockHost::new();
        host.enqueue(&style("foo", "/fixtures/foo.css", &[])).unwrap();
        host.add_inline(AssetType::Style, "foo", "a { color: blue; }", Position::After)
            .unwrap();
        host.add_tag_filter(
            AssetType::Style,
            Arc::new(|tag: &Tag<'_>| tag.html.replace("stylesheet", "preload")),
        )
        .unwrap();

        let printed = host.print_styles();
        assert!(printed.starts_with("<link rel='preload' id='foo-css'"));
        assert!(printed.ends_with("<style id='foo-inline-css' type='text/css'>\na { color: blue; }\n</style>\n"));
    }

    #[test]
    fn test_fail_on() {
        let host = MockHost::new();
        host.fail_on("broken");

        let err = host.register(&style("broken", "/broken.css", &[])).unwrap_err();
        assert_eq!(err.to_string(), "mock host refused register of 'broken'");
        assert!(!host.status(AssetType::Style, "broken", Status::Registered));
        assert_eq!(host.calls_for("broken").len(), 1);
    }

    #[test]
    fn test_reset() {
        let host = MockHost::new();
        host.enqueue(&style("foo", "/fixtures/foo.css", &[])).unwrap();
        host.reset();

        assert_eq!(host.call_count(), 0);
        assert!(host.queued_names(AssetType::Style).is_empty());
    }
}
