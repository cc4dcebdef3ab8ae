use std::sync::Arc;

use anyhow::Context;
use jvmrt::runtime::{Config, Vm, VmBuilder};

use crate::app::VmOptions;

/// Resolve the configuration from `--config` and `--class-path`.
pub fn load_config(opts: &VmOptions) -> anyhow::Result<Config> {
    let config = match &opts.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to read configuration: {}", path.display()))?,
        None => Config::default(),
    };
    if opts.class_path.is_empty() {
        return Ok(config);
    }
    Ok(config.with_class_path(opts.class_path.iter().cloned()))
}

/// Build and boot a VM for the given options.
pub fn build_vm(opts: &VmOptions) -> anyhow::Result<Arc<Vm>> {
    let config = load_config(opts)?;
    anyhow::ensure!(
        !config.class_path.is_empty(),
        "no class path: pass --class-path or a --config with class_path entries"
    );
    VmBuilder::new()
        .config(config)
        .build()
        .context("failed to initialize the VM")
}

/// `com.example.Main` -> `com/example/Main`
pub fn binary_name(class: &str) -> String {
    class.trim_end_matches(".class").replace('.', "/")
}
