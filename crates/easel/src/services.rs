//! Collaborators shared by every handler and behavior.

use std::fmt;

use crate::{
    config::{AppConfig, Router},
    factory::ElementFactory,
    layout::{ConnectionDocking, CroppingDocking, Layouter, ManhattanLayouter, StraightLayouter},
    semantics::{KindSemantics, Semantics},
};

/// Read-only services handed to commands through [`Scope`](crate::command::Scope).
pub struct Services {
    config: AppConfig,
    layouter: Box<dyn Layouter>,
    docking: Box<dyn ConnectionDocking>,
    semantics: Box<dyn Semantics>,
    factory: ElementFactory,
}

impl Services {
    /// Services with the layouter, docking and semantics the configuration selects.
    pub fn from_config(config: AppConfig) -> Self {
        let layouter: Box<dyn Layouter> = match config.layout().router() {
            Router::Straight => Box::new(StraightLayouter),
            Router::Manhattan => Box::new(ManhattanLayouter::new(config.layout().max_bends())),
        };
        let semantics = Box::new(KindSemantics::from_config(config.semantics()));
        let factory = ElementFactory::new(&config);
        Self {
            config,
            layouter,
            docking: Box::new(CroppingDocking),
            semantics,
            factory,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn layouter(&self) -> &dyn Layouter {
        self.layouter.as_ref()
    }

    pub fn docking(&self) -> &dyn ConnectionDocking {
        self.docking.as_ref()
    }

    pub fn semantics(&self) -> &dyn Semantics {
        self.semantics.as_ref()
    }

    pub fn factory(&self) -> &ElementFactory {
        &self.factory
    }

    pub(crate) fn set_layouter(&mut self, layouter: Box<dyn Layouter>) {
        self.layouter = layouter;
    }

    pub(crate) fn set_docking(&mut self, docking: Box<dyn ConnectionDocking>) {
        self.docking = docking;
    }

    pub(crate) fn set_semantics(&mut self, semantics: Box<dyn Semantics>) {
        self.semantics = semantics;
    }
}

impl Default for Services {
    fn default() -> Self {
        Self::from_config(AppConfig::default())
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("config", &self.config)
            .field("factory", &self.factory)
            .finish_non_exhaustive()
    }
}
