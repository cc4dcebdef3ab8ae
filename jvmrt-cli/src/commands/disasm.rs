use jvmrt::runtime::{init_class_paths, ClassPath};

use crate::{
    app::VmOptions,
    commands::common::{binary_name, load_config},
};

/// Print the listing of the first class path entry holding `class`.
///
/// Only the class path is opened; no VM is booted.
pub fn run(opts: &VmOptions, class: &str) -> anyhow::Result<()> {
    let config = load_config(opts)?;
    let class_paths: Vec<Box<dyn ClassPath>> = init_class_paths(&config.class_path)?;
    let name = binary_name(class);

    for class_path in &class_paths {
        if let Some(file) = class_path.search(&name)? {
            print!("{}", jvmrt::disassembler::disassemble(&file));
            return Ok(());
        }
    }
    anyhow::bail!("class not found: {name}")
}
