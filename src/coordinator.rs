use crate::config::{AutoCheckout, Settings};
use crate::fatal;
use crate::host::Host;
use crate::scm::{Outcome, Scm, WorkspaceRoot};
use crate::tf::{self, Backend};
use anyhow::{Context, Result};

/// an installed reaction to files about to be saved
#[derive(Debug, PartialEq, Eq)]
struct SaveSubscription {
    policy: AutoCheckout,
}

impl SaveSubscription {
    fn install(policy: AutoCheckout, host: &impl Host) -> Self {
        host.log(&format!("auto checkout policy installed: {policy:?}"));
        Self { policy }
    }

    fn dispose(self, host: &impl Host) {
        host.log(&format!("auto checkout policy disposed: {:?}", self.policy));
    }

    fn on_will_save<B: Backend, H: Host>(&self, scm: &Scm<B, H>, path: &str) -> Option<Outcome> {
        match self.policy {
            AutoCheckout::OnSave => Some(scm.checkout(path, false)),
            AutoCheckout::Off => None,
        }
    }
}

/// owns the source control engine and the auto-checkout subscription for
/// the lifetime of an activated workspace
pub struct Coordinator<B, H> {
    scm: Option<Scm<B, H>>,
    subscription: Option<SaveSubscription>,
    settings: Settings,
}

impl<B: Backend, H: Host> Coordinator<B, H> {
    /// activate on a workspace: detect the mapping, install the auto-checkout
    /// policy and load the initial change list
    ///
    /// nothing is created when the root is not a mapped workspace
    pub fn init(backend: B, host: H, root: WorkspaceRoot, settings: Settings) -> Result<Self> {
        backend
            .run(&tf::workfold_args(root.as_str()))
            .with_context(|| format!("no tfvc workspace detected at {}", root.as_str()))?;
        host.log("tfvc workspace detected");

        let subscription = SaveSubscription::install(settings.auto_checkout, &host);
        let coordinator = Self {
            scm: Some(Scm::new(backend, host, root, settings.checkin_comment)),
            subscription: Some(subscription),
            settings,
        };
        coordinator.scm().refresh();

        Ok(coordinator)
    }

    pub fn scm(&self) -> &Scm<B, H> {
        match &self.scm {
            Some(scm) => scm,
            None => fatal!("source control used before initialisation"),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// apply changed settings; a changed auto-checkout policy replaces the
    /// previous subscription, which is disposed first
    pub fn apply_settings(&mut self, settings: Settings) {
        let Some(scm) = self.scm.as_mut() else {
            fatal!("settings applied before initialisation");
        };

        scm.set_comment_policy(settings.checkin_comment);

        if settings.auto_checkout != self.settings.auto_checkout {
            if let Some(previous) = self.subscription.take() {
                previous.dispose(scm.host());
            }
            self.subscription = Some(SaveSubscription::install(
                settings.auto_checkout,
                scm.host(),
            ));
        }

        self.settings = settings;
    }

    /// a document is about to be written; `None` when no policy reacts to saves
    pub fn on_will_save(&self, path: &str) -> Option<Outcome> {
        let scm = self.scm();
        self.subscription
            .as_ref()
            .and_then(|subscription| subscription.on_will_save(scm, path))
    }

    /// files were saved, created, deleted or renamed
    pub fn on_files_changed(&self) -> Outcome {
        self.scm().refresh()
    }

    pub fn teardown(mut self) {
        if let Some(scm) = self.scm.take() {
            if let Some(subscription) = self.subscription.take() {
                subscription.dispose(scm.host());
            }
            scm.host().log("source control deactivated");
        }
    }
}
