//! Easel - the editing core of a diagram editor.
//!
//! Every change to the element graph goes through a named command on a
//! [`command::CommandStack`], which records it for undo and redo and lets
//! behaviors intercept it at each stage of its pipeline.
//!
//! [`Modeler`] bundles a diagram, the services the commands need and a
//! command stack with the built-in handlers and default behaviors. Its
//! editing operations come from the [`modeling::Modeling`] trait.
//!
//! # Examples
//!
//! ```rust
//! use easel::{Modeler, config::AppConfig, modeling::Modeling};
//! use easel_core::geometry::Point;
//!
//! let mut modeler = Modeler::builder(AppConfig::default())
//!     .build()
//!     .expect("valid configuration");
//! let root = modeler.diagram().current_root();
//!
//! let task = modeler
//!     .create_shape("Task", Point::new(200.0, 150.0), root)
//!     .expect("created");
//! assert!(modeler.diagram().contains(task));
//!
//! modeler.undo().expect("undone");
//! assert!(!modeler.diagram().contains(task));
//! ```

pub mod behaviors;
pub mod command;
pub mod config;
pub mod factory;
pub mod handlers;
pub mod layout;
pub mod modeling;
pub mod semantics;
pub mod services;

mod error;

pub use easel_core::{diagram, element, geometry, identifier, ids};

pub use error::EaselError;

use log::{debug, info};

use easel_core::{diagram::Diagram, identifier::Id};

use command::{CommandStack, Context, ElementsChanged, Outcome, Verdict};
use config::AppConfig;
use layout::{ConnectionDocking, Layouter};
use modeling::Modeling;
use semantics::Semantics;
use services::Services;

/// Id and type of the root a [`Modeler`] starts with unless told otherwise.
const DEFAULT_ROOT: (&str, &str) = ("Process_1", "Process");

/// A diagram together with the command stack editing it.
pub struct Modeler {
    diagram: Diagram,
    services: Services,
    stack: CommandStack,
}

impl Modeler {
    /// A builder for a modeler using `config`.
    pub fn builder(config: AppConfig) -> ModelerBuilder {
        ModelerBuilder::new(config)
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn config(&self) -> &AppConfig {
        self.services.config()
    }

    pub fn stack(&self) -> &CommandStack {
        &self.stack
    }

    /// The command stack, for registering further handlers and behaviors.
    pub fn stack_mut(&mut self) -> &mut CommandStack {
        &mut self.stack
    }

    /// Executes `name` as a new undo step.
    ///
    /// # Errors
    ///
    /// Any error of the command; nothing it applied remains.
    pub fn execute(&mut self, name: &str, context: impl Into<Context>) -> Result<Outcome, EaselError> {
        self.stack
            .execute(&mut self.diagram, &self.services, name, context.into())
    }

    /// Asks the guards whether `name` may run, without running it.
    ///
    /// # Errors
    ///
    /// [`EaselError::HandlerNotFound`] for an unknown command.
    pub fn can_execute(&self, name: &str, context: &Context) -> Result<Verdict, EaselError> {
        self.stack
            .can_execute(&self.diagram, &self.services, name, context)
    }

    /// Undoes the last step. Returns `false` when there is nothing to undo.
    ///
    /// # Errors
    ///
    /// Any error raised while reverting.
    pub fn undo(&mut self) -> Result<bool, EaselError> {
        self.stack.undo(&mut self.diagram, &self.services)
    }

    /// Redoes the last undone step. Returns `false` when there is nothing to redo.
    ///
    /// # Errors
    ///
    /// Any error raised while replaying.
    pub fn redo(&mut self) -> Result<bool, EaselError> {
        self.stack.redo(&mut self.diagram, &self.services)
    }

    pub fn can_undo(&self) -> bool {
        self.stack.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.stack.can_redo()
    }

    /// Drops the history, e.g. after loading another document.
    pub fn clear(&mut self) {
        self.stack.clear(&self.diagram);
    }

    /// Subscribes to change notifications.
    pub fn on_changed<F>(&mut self, listener: F)
    where
        F: FnMut(&ElementsChanged, &Diagram) + 'static,
    {
        self.stack.on_changed(listener);
    }

    pub fn into_diagram(self) -> Diagram {
        self.diagram
    }
}

impl Modeling for Modeler {
    fn execute_command(&mut self, name: &str, context: Context) -> Result<(), EaselError> {
        match self.execute(name, context)? {
            Outcome::Executed => Ok(()),
            Outcome::Denied => Err(EaselError::Denied {
                command: name.to_string(),
            }),
        }
    }

    fn parts(&mut self) -> (&mut Diagram, &Services) {
        (&mut self.diagram, &self.services)
    }
}

/// Builder for [`Modeler`].
///
/// The layouter, docking and semantics default to what the configuration
/// selects.
pub struct ModelerBuilder {
    config: AppConfig,
    layouter: Option<Box<dyn Layouter>>,
    docking: Option<Box<dyn ConnectionDocking>>,
    semantics: Option<Box<dyn Semantics>>,
    default_behaviors: bool,
    root: (Id, Id),
    diagram: Option<Diagram>,
}

impl ModelerBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            layouter: None,
            docking: None,
            semantics: None,
            default_behaviors: true,
            root: (Id::new(DEFAULT_ROOT.0), Id::new(DEFAULT_ROOT.1)),
            diagram: None,
        }
    }

    pub fn with_layouter(mut self, layouter: impl Layouter + 'static) -> Self {
        self.layouter = Some(Box::new(layouter));
        self
    }

    pub fn with_docking(mut self, docking: impl ConnectionDocking + 'static) -> Self {
        self.docking = Some(Box::new(docking));
        self
    }

    pub fn with_semantics(mut self, semantics: impl Semantics + 'static) -> Self {
        self.semantics = Some(Box::new(semantics));
        self
    }

    /// Registers only the handlers; no rules, labels or attachment support.
    pub fn without_default_behaviors(mut self) -> Self {
        self.default_behaviors = false;
        self
    }

    /// Id and type of the root of a fresh diagram.
    pub fn with_root(mut self, id: Id, type_name: Id) -> Self {
        self.root = (id, type_name);
        self
    }

    /// Edits `diagram` instead of a fresh one.
    pub fn with_diagram(mut self, diagram: Diagram) -> Self {
        self.diagram = Some(diagram);
        self
    }

    /// Builds the modeler.
    ///
    /// # Errors
    ///
    /// [`EaselError::Config`] for an unusable configuration, or a model
    /// error if the root id is claimed by another element.
    pub fn build(self) -> Result<Modeler, EaselError> {
        self.config.validate()?;

        let mut diagram = match self.diagram {
            Some(diagram) => diagram,
            None => Diagram::new(self.root.0, self.root.1),
        };
        let root = diagram.current_root();
        if diagram.ids().assigned(root).is_none() {
            diagram.ids_mut().claim(root, root)?;
        }

        let mut stack = CommandStack::new();
        handlers::register_all(&mut stack);
        if self.default_behaviors {
            behaviors::register_defaults(&mut stack, &self.config);
        }

        let mut services = Services::from_config(self.config);
        if let Some(layouter) = self.layouter {
            services.set_layouter(layouter);
        }
        if let Some(docking) = self.docking {
            services.set_docking(docking);
        }
        if let Some(semantics) = self.semantics {
            services.set_semantics(semantics);
        }

        info!(root:%, default_behaviors = self.default_behaviors; "Modeler ready");
        debug!(services:?; "Modeler services");
        Ok(Modeler {
            diagram,
            services,
            stack,
        })
    }
}

impl Default for ModelerBuilder {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}
