//! Handling of recognised-but-unsupported input
//!
//! The parser always accepts these sequences; the policy only decides
//! whether they leave a trace in the log.

/// Input category of an unsupported sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Control,
    Escape,
    Csi,
    Osc,
    Dcs,
}

/// What to do with an unsupported sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    /// Accept and discard silently
    #[default]
    Discard,
    /// Accept, discard and log at debug level
    Trace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnhandledPolicy {
    pub control: Disposition,
    pub escape: Disposition,
    pub csi: Disposition,
    pub osc: Disposition,
    pub dcs: Disposition,
}

impl UnhandledPolicy {
    /// Same disposition for every category
    pub fn uniform(disposition: Disposition) -> Self {
        Self {
            control: disposition,
            escape: disposition,
            csi: disposition,
            osc: disposition,
            dcs: disposition,
        }
    }

    pub fn disposition(&self, category: Category) -> Disposition {
        match category {
            Category::Control => self.control,
            Category::Escape => self.escape,
            Category::Csi => self.csi,
            Category::Osc => self.osc,
            Category::Dcs => self.dcs,
        }
    }

    /// Report an unsupported sequence according to the policy
    pub fn unhandled(&self, category: Category, describe: impl FnOnce() -> String) {
        if self.disposition(category) == Disposition::Trace {
            log::debug!("Unhandled {:?}: {}", category, describe());
        }
    }
}
