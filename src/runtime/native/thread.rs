//! Bindings for `java/lang/Thread`.
//!
//! `start0` is where runtime threads come from: it creates the [`ThreadHandle`] for the
//! program's thread object, attaches it as the object's runtime data and hands `run()` to
//! the VM's executor.

use std::{sync::Arc, time::Duration};

use log::debug;

use crate::{
    runtime::{
        native::{int_arg, long_arg, non_null_arg, NativeRegistry},
        Frame, InstanceRef, Thread, ThreadHandle, Value, VmData,
    },
    Error, Result,
};

/// Registers the `java/lang/Thread` bindings with `natives`
pub fn register(natives: &NativeRegistry) {
    natives.register("java/lang/Thread", "currentThread", "()Ljava/lang/Thread;", |thread, _| {
        Ok(Some(Value::from_ref(thread.object().cloned())))
    });
    natives.register("java/lang/Thread", "isAlive", "()Z", thread_is_alive);
    natives.register("java/lang/Thread", "start0", "()V", thread_start);
    natives.register("java/lang/Thread", "sleep", "(J)V", thread_sleep);
    natives.register("java/lang/Thread", "interrupt0", "()V", thread_interrupt);
    natives.register("java/lang/Thread", "isInterrupted", "(Z)Z", thread_is_interrupted);
    natives.register("java/lang/Thread", "holdsLock", "(Ljava/lang/Object;)Z", thread_holds_lock);
    natives.register("java/lang/Thread", "setPriority0", "(I)V", |_, args| {
        int_arg(&args, 1)?;
        Ok(None)
    });
    natives.register("java/lang/Thread", "setNativeName", "(Ljava/lang/String;)V", thread_set_native_name);
    natives.register("java/lang/Thread", "yield", "()V", |_, _| {
        std::thread::yield_now();
        Ok(None)
    });
}

fn handle_of(object: &InstanceRef) -> Option<Arc<ThreadHandle>> {
    object.as_thread().cloned()
}

fn thread_is_alive(thread: &mut Thread, args: Vec<Value>) -> Result<Option<Value>> {
    let object = non_null_arg(thread, &args, 0)?;
    let alive = handle_of(&object).is_some_and(|handle| handle.is_alive());
    Ok(Some(Value::from_bool(alive)))
}

/// Start a runtime thread executing `run()` of the receiver.
///
/// The name comes from the object's `name` field and the daemon flag from `daemon`, when the
/// class declares them.
fn thread_start(thread: &mut Thread, args: Vec<Value>) -> Result<Option<Value>> {
    let object = non_null_arg(thread, &args, 0)?;
    if object.as_thread().is_some() {
        return Err(thread
            .vm()
            .raise(thread, "java/lang/IllegalThreadStateException", None));
    }

    let daemon = matches!(object.field("daemon", "Z"), Ok(Value::Int(flag)) if flag != 0);
    let name = match object.field("name", "Ljava/lang/String;") {
        Ok(Value::Reference(name)) => name.string_value(),
        _ => None,
    };
    let handle = ThreadHandle::new(name.as_deref().unwrap_or("Thread"), false, daemon);
    if name.is_none() {
        handle.set_name(&format!("Thread-{}", handle.id().value()));
    }

    if !object.set_vm_data(VmData::Thread(handle.clone())) {
        return Err(thread
            .vm()
            .raise(thread, "java/lang/IllegalThreadStateException", None));
    }

    let (class, method) = object
        .class()
        .resolve_method("run", "()V")?
        .ok_or_else(|| Error::MethodNotFound {
            class: object.class().name().to_string(),
            name: "run".to_string(),
            descriptor: "()V".to_string(),
        })?;

    let vm = Arc::clone(thread.vm());
    let mut started = Thread::new(Arc::clone(&vm), handle);
    started.set_object(object.clone());

    debug!(
        "Thread {} starts {} ({})",
        thread.name(),
        started.name(),
        if daemon { "daemon" } else { "non-daemon" }
    );
    vm.executor()
        .start(started, Frame::with_args(class, method, vec![Value::Reference(object)]))?;
    Ok(None)
}

fn thread_sleep(thread: &mut Thread, args: Vec<Value>) -> Result<Option<Value>> {
    let millis = long_arg(&args, 0)?;
    let Ok(millis) = u64::try_from(millis) else {
        return Err(thread.vm().raise(
            thread,
            "java/lang/IllegalArgumentException",
            Some("timeout value is negative"),
        ));
    };
    thread.sleep(Duration::from_millis(millis))?;
    Ok(None)
}

fn thread_interrupt(thread: &mut Thread, args: Vec<Value>) -> Result<Option<Value>> {
    let object = non_null_arg(thread, &args, 0)?;
    if let Some(handle) = handle_of(&object) {
        handle.interrupt();
    }
    Ok(None)
}

/// `isInterrupted(boolean clear)`; `Thread.interrupted()` passes `true`
fn thread_is_interrupted(thread: &mut Thread, args: Vec<Value>) -> Result<Option<Value>> {
    let object = non_null_arg(thread, &args, 0)?;
    let clear = int_arg(&args, 1)? != 0;
    let interrupted = handle_of(&object).is_some_and(|handle| handle.interrupts().check(clear));
    Ok(Some(Value::from_bool(interrupted)))
}

fn thread_holds_lock(thread: &mut Thread, args: Vec<Value>) -> Result<Option<Value>> {
    let object = non_null_arg(thread, &args, 0)?;
    Ok(Some(Value::from_bool(object.monitor().holds(thread.id()))))
}

fn thread_set_native_name(thread: &mut Thread, args: Vec<Value>) -> Result<Option<Value>> {
    let object = non_null_arg(thread, &args, 0)?;
    let name = non_null_arg(thread, &args, 1)?;
    if let (Some(handle), Some(name)) = (handle_of(&object), name.string_value()) {
        handle.set_name(&name);
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::{
        classfile::{Bytecode, ClassWriter, FieldAccessFlags as F, MethodAccessFlags as M},
        disassembler::opcodes::*,
        runtime::{MemoryClassPath, Value},
        test::{add_class, body, build_vm, call_static, default_constructor, thrown},
    };

    /// `demo/Worker extends Thread` running `run`, and `demo/Main` with a static `test` built
    /// by `test` and a static `result()I` reading `Worker.result`
    fn program(
        path: &MemoryClassPath,
        run: Bytecode,
        descriptor: &str,
        test: impl FnOnce(&mut Bytecode),
    ) {
        let mut worker = ClassWriter::new("demo/Worker", Some("java/lang/Thread"));
        worker
            .field(F::PUBLIC | F::STATIC | F::VOLATILE, "result", "I")
            .method(M::PUBLIC, "<init>", "()V", default_constructor("java/lang/Thread"))
            .unwrap()
            .method(M::PUBLIC, "run", "()V", run)
            .unwrap();
        add_class(path, &worker);

        let mut main = ClassWriter::new("demo/Main", Some("java/lang/Object"));
        main.method(M::PUBLIC | M::STATIC, "test", descriptor, body(test))
            .unwrap()
            .method(M::PUBLIC | M::STATIC, "result", "()I", body(|code| {
                code.field_op(GETSTATIC, "demo/Worker", "result", "I")
                    .op(IRETURN);
            }))
            .unwrap();
        add_class(path, &main);
    }

    fn new_worker(code: &mut Bytecode) -> &mut Bytecode {
        code.class_op(NEW, "demo/Worker")
            .op(DUP)
            .invoke(INVOKESPECIAL, "demo/Worker", "<init>", "()V")
    }

    #[test]
    fn start_and_join() {
        let vm = build_vm(|path| {
            let run = body(|code| {
                code.iconst(7)
                    .field_op(PUTSTATIC, "demo/Worker", "result", "I")
                    .op(RETURN);
            });
            program(path, run, "()I", |code| {
                new_worker(code)
                    .op(ASTORE_0)
                    .op(ALOAD_0)
                    .invoke(INVOKEVIRTUAL, "demo/Worker", "start", "()V")
                    .op(ALOAD_0)
                    .invoke(INVOKEVIRTUAL, "demo/Worker", "join", "()V")
                    .op(ALOAD_0)
                    .invoke(INVOKEVIRTUAL, "demo/Worker", "isAlive", "()Z")
                    .iconst(100)
                    .op(IMUL)
                    .field_op(GETSTATIC, "demo/Worker", "result", "I")
                    .op(IADD)
                    .op(IRETURN)
                    .max_locals(1);
            });
        });

        let value = call_static(&vm, "demo/Main", "test", "()I", vec![]).unwrap();
        assert_eq!(value, Some(Value::Int(7)));

        let results = vm.executor().await_all();
        assert_eq!(results.len(), 1);
        assert!(results[0].error.is_none());
        assert!(results[0].thread.name().starts_with("Thread-"));
    }

    #[test]
    fn named_daemon_threads() {
        let vm = build_vm(|path| {
            let run = body(|code| {
                code.op(RETURN);
            });
            program(path, run, "()Ljava/lang/Thread;", |code| {
                new_worker(code)
                    .op(DUP)
                    .op(ICONST_1)
                    .invoke(INVOKEVIRTUAL, "demo/Worker", "setDaemon", "(Z)V")
                    .op(DUP)
                    .ldc_string("background")
                    .invoke(INVOKEVIRTUAL, "demo/Worker", "setName", "(Ljava/lang/String;)V")
                    .op(DUP)
                    .invoke(INVOKEVIRTUAL, "demo/Worker", "start", "()V")
                    .op(ARETURN);
            });
        });

        let Some(Value::Reference(worker)) = call_static(&vm, "demo/Main", "test", "()Ljava/lang/Thread;", vec![]).unwrap()
        else {
            panic!("expected the worker object");
        };
        let handle = worker.as_thread().unwrap();
        assert_eq!(handle.name(), "background");
        assert!(handle.is_daemon());
        assert!(!handle.is_main());
    }

    #[test]
    fn interrupting_a_sleeping_worker() {
        let vm = build_vm(|path| {
            let mut run = Bytecode::new();
            let (start, end, handler) = (run.label(), run.label(), run.label());
            run.bind(start)
                .lconst(60_000)
                .invoke(INVOKESTATIC, "java/lang/Thread", "sleep", "(J)V")
                .iconst(1)
                .field_op(PUTSTATIC, "demo/Worker", "result", "I")
                .op(RETURN)
                .bind(end)
                .bind(handler)
                .op(POP)
                .iconst(2)
                .field_op(PUTSTATIC, "demo/Worker", "result", "I")
                .op(RETURN)
                .handler(start, end, handler, Some("java/lang/InterruptedException"));

            program(path, run, "()Ljava/lang/Thread;", |code| {
                new_worker(code)
                    .op(DUP)
                    .invoke(INVOKEVIRTUAL, "demo/Worker", "start", "()V")
                    .op(ARETURN);
            });
        });

        let Some(Value::Reference(worker)) = call_static(&vm, "demo/Main", "test", "()Ljava/lang/Thread;", vec![]).unwrap()
        else {
            panic!("expected the worker object");
        };
        let handle = worker.as_thread().unwrap().clone();
        while handle.interrupts().watcher_count() == 0 {
            std::thread::sleep(Duration::from_millis(1));
        }
        handle.interrupt();

        let results = vm.executor().await_all();
        assert_eq!(results.len(), 1);
        assert!(results[0].error.is_none());

        let value = call_static(&vm, "demo/Main", "result", "()I", vec![]).unwrap();
        assert_eq!(value, Some(Value::Int(2)));
    }

    #[test]
    fn threads_start_once() {
        let vm = build_vm(|path| {
            let run = body(|code| {
                code.op(RETURN);
            });
            program(path, run, "()V", |code| {
                code.invoke(INVOKESTATIC, "java/lang/Thread", "currentThread", "()Ljava/lang/Thread;")
                    .invoke(INVOKEVIRTUAL, "java/lang/Thread", "start", "()V")
                    .op(RETURN);
            });
        });

        let error = call_static(&vm, "demo/Main", "test", "()V", vec![]).unwrap_err();
        assert_eq!(thrown(&error).unwrap().0, "java/lang/IllegalThreadStateException");
    }

    #[test]
    fn current_thread_is_main() {
        let vm = build_vm(|path| {
            let run = body(|code| {
                code.op(RETURN);
            });
            program(path, run, "()Ljava/lang/String;", |code| {
                code.invoke(INVOKESTATIC, "java/lang/Thread", "currentThread", "()Ljava/lang/Thread;")
                    .invoke(INVOKEVIRTUAL, "java/lang/Thread", "getName", "()Ljava/lang/String;")
                    .op(ARETURN);
            });
        });

        let Some(Value::Reference(name)) = call_static(&vm, "demo/Main", "test", "()Ljava/lang/String;", vec![]).unwrap()
        else {
            panic!("expected a name");
        };
        assert_eq!(name.string_value().as_deref(), Some("main"));
    }

    #[test]
    fn negative_sleep_is_rejected() {
        let vm = build_vm(|path| {
            let run = body(|code| {
                code.op(RETURN);
            });
            program(path, run, "()V", |code| {
                code.lconst(-1)
                    .invoke(INVOKESTATIC, "java/lang/Thread", "sleep", "(J)V")
                    .op(RETURN);
            });
        });

        let error = call_static(&vm, "demo/Main", "test", "()V", vec![]).unwrap_err();
        assert_eq!(
            thrown(&error),
            Some((
                "java/lang/IllegalArgumentException".to_string(),
                Some("timeout value is negative".to_string())
            ))
        );
    }
}
