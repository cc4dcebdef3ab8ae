use std::time::Instant;

use jvmrt::{
    runtime::{InstanceRef, Thread, ThreadResult, Value},
    Error,
};
use serde::Serialize;

use crate::{
    app::{GlobalOptions, VmOptions},
    commands::common::{binary_name, build_vm},
    output::print_output,
};

#[derive(Debug, Serialize)]
struct ThreadReport {
    name: String,
    daemon: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    exception: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stack_trace: Vec<String>,
}

#[derive(Debug, Serialize)]
struct RunOutput {
    main: String,
    boot_ms: u128,
    loaded_classes: usize,
    threads: Vec<ThreadReport>,
}

pub fn run(vm_opts: &VmOptions, main: &str, args: &[String], opts: &GlobalOptions) -> anyhow::Result<()> {
    let started = Instant::now();
    let vm = build_vm(vm_opts)?;
    let boot_ms = started.elapsed().as_millis();
    let loaded_classes = vm.registry().len();

    if !opts.json {
        println!("-> VM initialized!({boot_ms} ms)");
        println!("-> Loaded classes: {loaded_classes}");
        println!("-> Execute main method...");
    }

    let class = binary_name(main);
    match vm.exec_main(&class, args) {
        Ok(()) => {}
        Err(Error::ClassNotFound(name)) => anyhow::bail!("class not found: {name}"),
        Err(Error::Exception(throwable)) => {
            eprintln!("[VM] unhandled exception in thread 'main': {}", throwable.describe());
            for line in trace_lines(&throwable) {
                eprintln!("{line}");
            }
            anyhow::bail!("initialization of {class} failed");
        }
        Err(error) => return Err(error.into()),
    }

    let mut threads = Vec::new();
    for result in vm.executor().results() {
        let report = report(result, !opts.json);
        threads.push(report);
    }

    if !opts.json {
        println!("Finished all non-daemon threads");
    }

    let output = RunOutput {
        main: class,
        boot_ms,
        loaded_classes,
        threads,
    };
    print_output(&output, opts, |_| {})
}

/// Print how a thread ended (unless `print` is off) and describe it for JSON output
fn report(result: ThreadResult, print: bool) -> ThreadReport {
    let ThreadResult { mut thread, error } = result;
    let name = thread.name();
    let mut report = ThreadReport {
        name: name.clone(),
        daemon: thread.handle().is_daemon(),
        exception: None,
        error: None,
        stack_trace: Vec::new(),
    };

    match error {
        None => {}
        Some(Error::Exception(throwable)) => {
            report.exception = Some(throwable.describe());
            report.stack_trace = trace_lines(&throwable);
            if print {
                eprintln!("[VM] unhandled exception in thread '{name}': {}", throwable.describe());
                if !print_stack_trace(&mut thread, &throwable) {
                    for line in &report.stack_trace {
                        eprintln!("{line}");
                    }
                }
            }
        }
        Some(error) => {
            if print {
                eprintln!("[VM] occurred error in thread '{name}': {error}");
            }
            report.error = Some(error.to_string());
        }
    }
    report
}

/// Let the program print the trace through its own `printStackTrace()`, when it has one
fn print_stack_trace(thread: &mut Thread, throwable: &InstanceRef) -> bool {
    let Ok(Some((class, method))) = throwable.class().resolve_method("printStackTrace", "()V") else {
        return false;
    };
    thread
        .invoke(class, method, vec![Value::Reference(throwable.clone())])
        .is_ok()
}

fn trace_lines(throwable: &InstanceRef) -> Vec<String> {
    throwable
        .stack_trace()
        .unwrap_or_default()
        .iter()
        .map(|element| format!("\t{element}"))
        .collect()
}
