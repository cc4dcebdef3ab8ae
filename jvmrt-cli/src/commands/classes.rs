use serde::Serialize;

use crate::{
    app::{GlobalOptions, VmOptions},
    commands::common::build_vm,
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
struct ClassEntry {
    name: String,
    kind: String,
    state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    super_class: Option<String>,
}

#[derive(Debug, Serialize)]
struct ClassesOutput {
    classes: Vec<ClassEntry>,
    count: usize,
}

pub fn run(vm_opts: &VmOptions, state: Option<&str>, opts: &GlobalOptions) -> anyhow::Result<()> {
    let vm = build_vm(vm_opts)?;

    let classes: Vec<ClassEntry> = vm
        .registry()
        .classes()
        .filter(|class| state.is_none_or(|state| class.state().to_string().eq_ignore_ascii_case(state)))
        .map(|class| ClassEntry {
            name: class.name().replace('/', "."),
            kind: format!("{:?}", class.kind()),
            state: class.state().to_string(),
            super_class: class.super_name().map(|name| name.replace('/', ".")),
        })
        .collect();

    let output = ClassesOutput {
        count: classes.len(),
        classes,
    };

    print_output(&output, opts, |out| {
        let mut tw = TabWriter::new(vec![
            ("Name", Align::Left),
            ("Kind", Align::Left),
            ("State", Align::Left),
            ("Super", Align::Left),
        ]);
        for class in &out.classes {
            tw.row(vec![
                class.name.clone(),
                class.kind.clone(),
                class.state.clone(),
                class.super_class.clone().unwrap_or_default(),
            ]);
        }
        tw.print();
        println!("\n{} classes", out.count);
    })
}
