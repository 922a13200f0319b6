use super::cache::PackageDescriptorCache;
use super::descriptor::{PackageDescriptor, PackageError, PackageTab, UpdateServer, ANY_VERSION};
use channel::{event_channel, send_or_log, ChannelConfig, EventReceiver, EventSender};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use studio_runtime::{BackgroundTask, TaskContext};

/// Where a list model gets its package names from.
pub trait PackageNameSource: Send + Sync {
    fn fetch_package_names(&self) -> Result<Vec<String>, PackageError>;

    /// Post filter applied to the resolved names before they are published.
    fn modify_package_list(&self, _names: &mut Vec<String>) {}

    /// When false, the model only fetches until the first fetch succeeded.
    fn refresh_always(&self) -> bool {
        false
    }
}

/// Names published by the update server for one tab.
pub struct TabSource {
    server: Arc<dyn UpdateServer>,
    tab: PackageTab,
}

impl TabSource {
    pub fn new(server: Arc<dyn UpdateServer>, tab: PackageTab) -> Self {
        Self { server, tab }
    }

    pub fn tab(&self) -> PackageTab {
        self.tab
    }
}

impl PackageNameSource for TabSource {
    fn fetch_package_names(&self) -> Result<Vec<String>, PackageError> {
        self.server.package_names(self.tab)
    }

    fn refresh_always(&self) -> bool {
        self.tab.is_account_dependent()
    }
}

/// Change notifications for whoever renders the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEvent {
    ContentsChanged { index0: usize, index1: usize },
    IntervalAdded { index0: usize, index1: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListEntry {
    Loading { completed: u8 },
    NoPackages,
    Package(Arc<PackageDescriptor>),
}

impl fmt::Display for ListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListEntry::Loading { completed } => write!(f, "Loading... ({completed}%)"),
            ListEntry::NoPackages => f.write_str("No packages available"),
            ListEntry::Package(descriptor) => write!(f, "{descriptor}"),
        }
    }
}

#[derive(Debug)]
enum FetchUpdate {
    Progress(u8),
    Resolved(Vec<String>),
    Failed(String),
    Done,
}

const FETCH_TASK_NAME: &str = "fetching_updates";

fn report_progress(context: &TaskContext, updates: &EventSender<FetchUpdate>, percent: u8) {
    context.set_progress(percent);
    send_or_log(updates, FetchUpdate::Progress(percent), "fetch progress");
}

/// Marks the task progress complete however the fetch exits.
struct ProgressComplete<'a>(&'a TaskContext);

impl Drop for ProgressComplete<'_> {
    fn drop(&mut self) {
        self.0.set_progress(100);
    }
}

fn fetch(
    context: &TaskContext,
    source: &dyn PackageNameSource,
    cache: &PackageDescriptorCache,
    version_selector: &str,
    updates: &EventSender<FetchUpdate>,
) {
    let _complete = ProgressComplete(context);
    report_progress(context, updates, 5);
    let names = match source.fetch_package_names() {
        Ok(names) => names,
        Err(err) => {
            log::error!("Failed to fetch package names: {err}");
            send_or_log(updates, FetchUpdate::Failed(err.to_string()), "fetch failure");
            return;
        }
    };
    if context.is_cancelled() {
        return;
    }
    report_progress(context, updates, 25);

    let total = names.len();
    let mut resolved = Vec::with_capacity(total);
    for (index, name) in names.into_iter().enumerate() {
        if context.is_cancelled() {
            return;
        }
        let found = cache.get_package_info(&name, version_selector).is_some();
        let percent = 30 + 70 * (index + 1) / total;
        report_progress(context, updates, percent.min(100) as u8);
        if found {
            resolved.push(name);
        }
    }
    source.modify_package_list(&mut resolved);
    if context.is_cancelled() {
        return;
    }
    send_or_log(updates, FetchUpdate::Resolved(resolved), "fetch result");
}

/// Displayable list of package ids, refreshed by at most one background fetch.
///
/// Everything the renderer can observe changes only inside [`Self::poll`],
/// [`Self::wait_idle`], [`Self::add`] and [`Self::notify_updated`], so all of
/// it happens on the thread owning the model.
pub struct PackageListModel {
    source: Arc<dyn PackageNameSource>,
    cache: Arc<PackageDescriptorCache>,
    version_selector: String,
    names: Vec<String>,
    fetching: bool,
    completed: u8,
    updated_once: bool,
    last_error: Option<String>,
    task: Option<BackgroundTask<()>>,
    updates_tx: EventSender<FetchUpdate>,
    updates_rx: EventReceiver<FetchUpdate>,
    events: Option<EventSender<ListEvent>>,
}

impl PackageListModel {
    pub fn new(source: Arc<dyn PackageNameSource>, cache: Arc<PackageDescriptorCache>) -> Self {
        let (updates_tx, updates_rx) = event_channel(&ChannelConfig::unbounded());
        Self {
            source,
            cache,
            version_selector: ANY_VERSION.to_string(),
            names: Vec::new(),
            fetching: false,
            completed: 0,
            updated_once: false,
            last_error: None,
            task: None,
            updates_tx,
            updates_rx,
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventSender<ListEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn with_version_selector(mut self, version_selector: &str) -> Self {
        self.version_selector = version_selector.to_string();
        self
    }

    /// Creates an event channel for this model and returns its receiving end.
    pub fn subscribe(&mut self, config: &ChannelConfig) -> EventReceiver<ListEvent> {
        let (tx, rx) = event_channel(config);
        self.events = Some(tx);
        rx
    }

    pub fn should_update(&self) -> bool {
        self.source.refresh_always() || !self.updated_once
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching
    }

    pub fn completed(&self) -> u8 {
        self.completed
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn package_names(&self) -> &[String] {
        &self.names
    }

    /// Returns whether a fetch was started.
    pub fn update(&mut self) -> Result<bool, PackageError> {
        if self.fetching || !self.should_update() {
            return Ok(false);
        }
        self.start_fetch()?;
        Ok(true)
    }

    /// Starts a fetch even if the list is already current, unless one is running.
    pub fn force_update(&mut self) -> Result<bool, PackageError> {
        if self.fetching {
            return Ok(false);
        }
        self.start_fetch()?;
        Ok(true)
    }

    fn start_fetch(&mut self) -> Result<(), PackageError> {
        let source = self.source.clone();
        let cache = self.cache.clone();
        let version_selector = self.version_selector.clone();
        let updates = self.updates_tx.clone();
        let done = self.updates_tx.clone();

        let task = BackgroundTask::spawn_with_completion(
            FETCH_TASK_NAME,
            move |context| fetch(context, source.as_ref(), &cache, &version_selector, &updates),
            move || send_or_log(&done, FetchUpdate::Done, "fetch completion"),
        )?;
        self.fetching = true;
        self.completed = 0;
        self.last_error = None;
        self.task = Some(task);
        Ok(())
    }

    /// Requests cancellation of the running fetch; the list keeps its content.
    pub fn cancel(&self) {
        if let Some(task) = self.task.as_ref().filter(|task| !task.is_finished()) {
            task.cancel();
        }
    }

    /// Applies pending worker updates and returns how many were applied.
    pub fn poll(&mut self) -> usize {
        let updates = self.updates_rx.drain();
        let count = updates.len();
        for update in updates {
            self.apply(update);
        }
        count
    }

    /// Applies worker updates until no fetch is running or `timeout` elapsed.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.fetching {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.updates_rx.recv_timeout(remaining) {
                Ok(Some(update)) => self.apply(update),
                Ok(None) => break,
                Err(err) => {
                    log::error!("fetch update channel closed: {err}");
                    break;
                }
            }
        }
        !self.fetching
    }

    fn apply(&mut self, update: FetchUpdate) {
        match update {
            FetchUpdate::Progress(percent) => {
                self.completed = percent;
                self.emit_contents_changed();
            }
            FetchUpdate::Resolved(names) => {
                if self.task.as_ref().is_some_and(|task| task.is_cancelled()) {
                    log::debug!("discarding result of cancelled fetch");
                    return;
                }
                self.names = names;
                self.updated_once = true;
            }
            FetchUpdate::Failed(message) => {
                self.last_error = Some(message);
            }
            FetchUpdate::Done => {
                if let Some(mut task) = self.task.take() {
                    if let Err(err) = task.join() {
                        log::error!("{err}");
                        self.last_error = Some(err.to_string());
                    }
                }
                self.fetching = false;
                self.completed = 100;
                self.emit_contents_changed();
            }
        }
    }

    fn emit_contents_changed(&self) {
        let index1 = self.names.len().max(1);
        self.emit(ListEvent::ContentsChanged { index0: 0, index1 });
    }

    fn emit(&self, event: ListEvent) {
        let Some(events) = &self.events else {
            return;
        };
        if let Err(err) = events.try_send(event) {
            log::warn!("dropping list event {event:?}: {err}");
        }
    }

    /// One placeholder row while fetching or when empty.
    pub fn size(&self) -> usize {
        if self.fetching {
            1
        } else {
            self.names.len().max(1)
        }
    }

    pub fn element_at(&self, index: usize) -> Option<ListEntry> {
        if self.fetching {
            return (index == 0).then_some(ListEntry::Loading {
                completed: self.completed,
            });
        }
        if self.names.is_empty() {
            return (index == 0).then_some(ListEntry::NoPackages);
        }
        let name = self.names.get(index)?;
        self.cache
            .get_package_info(name, &self.version_selector)
            .map(ListEntry::Package)
    }

    pub fn add(&mut self, descriptor: PackageDescriptor) {
        let package_id = descriptor.package_id.clone();
        self.cache.insert(descriptor, &self.version_selector);
        self.names.push(package_id);
        let index = self.names.len() - 1;
        self.emit(ListEvent::IntervalAdded {
            index0: index,
            index1: index,
        });
    }

    /// Returns false when the package is not in the list.
    pub fn notify_updated(&self, descriptor: &PackageDescriptor) -> bool {
        match self.names.iter().position(|n| *n == descriptor.package_id) {
            Some(index) => {
                self.emit(ListEvent::ContentsChanged {
                    index0: index,
                    index1: index,
                });
                true
            }
            None => false,
        }
    }
}

impl Drop for PackageListModel {
    fn drop(&mut self) {
        self.cancel();
    }
}
