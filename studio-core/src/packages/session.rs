use super::cache::PackageDescriptorCache;
use super::descriptor::{PackageDescriptor, PackageError, PackageTab, UpdateServer};
use super::list_model::{ListEvent, PackageListModel, TabSource};
use channel::{ChannelConfig, EventReceiver};
use std::collections::BTreeMap;
use std::sync::Arc;

struct TabModel {
    model: PackageListModel,
    events: EventReceiver<ListEvent>,
}

/// One list model per tab over a shared descriptor cache, plus the set of
/// packages the user picked for installation.
pub struct UpdateSession {
    cache: Arc<PackageDescriptorCache>,
    tabs: BTreeMap<PackageTab, TabModel>,
    selected: Vec<Arc<PackageDescriptor>>,
}

impl UpdateSession {
    /// Descriptors whose id appears in `preselected` start out selected.
    pub fn new(
        server: Arc<dyn UpdateServer>,
        descriptors: &[PackageDescriptor],
        preselected: &[String],
        config: &ChannelConfig,
    ) -> Self {
        let cache = Arc::new(PackageDescriptorCache::new(server.clone()));
        let tabs = PackageTab::ALL
            .into_iter()
            .map(|tab| {
                let source = Arc::new(TabSource::new(server.clone(), tab));
                let mut model = PackageListModel::new(source, cache.clone());
                let events = model.subscribe(config);
                (tab, TabModel { model, events })
            })
            .collect();

        let mut session = Self {
            cache,
            tabs,
            selected: Vec::new(),
        };
        for id in preselected {
            for descriptor in descriptors.iter().filter(|d| d.package_id == *id) {
                session.set_selected_for_installation(descriptor, true);
            }
        }
        session
    }

    pub fn cache(&self) -> &Arc<PackageDescriptorCache> {
        &self.cache
    }

    pub fn model(&self, tab: PackageTab) -> Option<&PackageListModel> {
        self.tabs.get(&tab).map(|t| &t.model)
    }

    pub fn model_mut(&mut self, tab: PackageTab) -> Option<&mut PackageListModel> {
        self.tabs.get_mut(&tab).map(|t| &mut t.model)
    }

    /// Events emitted by the model of `tab` since the last call.
    pub fn take_events(&self, tab: PackageTab) -> Vec<ListEvent> {
        self.tabs
            .get(&tab)
            .map(|t| t.events.drain())
            .unwrap_or_default()
    }

    /// Starts the fetch of a tab the first time it is shown.
    pub fn select_tab(&mut self, tab: PackageTab) -> Result<bool, PackageError> {
        match self.model_mut(tab) {
            Some(model) => model.update(),
            None => Ok(false),
        }
    }

    /// Refreshes every tab whose content depends on the account.
    pub fn account_changed(&mut self) -> Result<usize, PackageError> {
        let mut started = 0;
        for (tab, entry) in self.tabs.iter_mut() {
            if tab.is_account_dependent() && entry.model.force_update()? {
                started += 1;
            }
        }
        Ok(started)
    }

    pub fn poll_all(&mut self) -> usize {
        self.tabs.values_mut().map(|t| t.model.poll()).sum()
    }

    pub fn set_selected_for_installation(&mut self, descriptor: &PackageDescriptor, selected: bool) {
        let position = self
            .selected
            .iter()
            .position(|d| d.package_id == descriptor.package_id);
        match (position, selected) {
            (None, true) => {
                log::debug!("selected {} for installation", descriptor.package_id);
                self.selected.push(Arc::new(descriptor.clone()));
            }
            (Some(index), false) => {
                self.selected.remove(index);
            }
            _ => {}
        }
    }

    pub fn is_selected_for_installation(&self, descriptor: &PackageDescriptor) -> bool {
        self.selected
            .iter()
            .any(|d| d.package_id == descriptor.package_id)
    }

    /// Selected packages in the order they were selected.
    pub fn installation_list(&self) -> Vec<Arc<PackageDescriptor>> {
        self.selected.clone()
    }
}
