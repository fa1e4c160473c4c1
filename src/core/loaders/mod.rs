pub mod context;
pub mod fabric;
pub mod forge;
pub mod installer;
pub mod neoforge;
pub mod quilt;

pub use context::InstallContext;
pub use installer::{
    detect_loader, installed_patch_version, remove_patch, Installer, InstallerEntry,
    LoaderInstaller, LoaderKind,
};
