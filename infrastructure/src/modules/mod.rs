//! Loadable modules: language model backends and tools

mod catalog;

pub use catalog::{
    LoadError, ModelConstructor, ModuleCatalog, ModuleContext, ModuleKind, ToolConstructor,
};
