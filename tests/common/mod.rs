//! Fixtures shared by the integration tests and benchmarks.
//!
//! Builds a small `java/lang` with [`ClassWriter`]: the classes the VM creates or raises on
//! its own plus a `Thread` that can be started and joined.
#![allow(dead_code)]

use std::sync::Arc;

use jvmrt::{
    classfile::{Bytecode, ClassFile, ClassWriter, FieldAccessFlags as F, MethodAccessFlags as M},
    disassembler::opcodes::*,
    runtime::{MemoryClassPath, Thread, ThreadHandle, Value, Vm, VmBuilder},
    Error, Result,
};

/// A method body assembled by `build`
pub fn body(build: impl FnOnce(&mut Bytecode)) -> Bytecode {
    let mut code = Bytecode::new();
    build(&mut code);
    code
}

/// `<init>()V` delegating to the no-argument constructor of `super_class`
pub fn constructor(super_class: &str) -> Bytecode {
    body(|code| {
        code.op(ALOAD_0)
            .invoke(INVOKESPECIAL, super_class, "<init>", "()V")
            .op(RETURN);
    })
}

/// Serialize `writer` into `path` under its own class name
pub fn add(path: &MemoryClassPath, writer: &ClassWriter) {
    let bytes = writer.to_bytes().unwrap();
    let name = ClassFile::parse(&bytes).unwrap().this_class().to_string();
    path.add(&name, bytes);
}

/// Define `name` extending `super_class`, with a default constructor
pub fn define(path: &MemoryClassPath, name: &str, super_class: &str, build: impl FnOnce(&mut ClassWriter)) {
    let mut writer = ClassWriter::new(name, Some(super_class));
    writer
        .method(M::PUBLIC, "<init>", "()V", constructor(super_class))
        .unwrap();
    build(&mut writer);
    add(path, &writer);
}

fn throwable(path: &MemoryClassPath, name: &str, super_class: &str) {
    define(path, name, super_class, |writer| {
        writer
            .method(
                M::PUBLIC,
                "<init>",
                "(Ljava/lang/String;)V",
                body(|code| {
                    code.op(ALOAD_0)
                        .op(ALOAD_1)
                        .invoke(INVOKESPECIAL, super_class, "<init>", "(Ljava/lang/String;)V")
                        .op(RETURN);
                }),
            )
            .unwrap();
    });
}

/// The core library every test VM starts from
pub fn core_library() -> MemoryClassPath {
    let path = MemoryClassPath::new();

    let mut object = ClassWriter::new("java/lang/Object", None);
    object
        .method(M::PUBLIC, "<init>", "()V", body(|code| {
            code.op(RETURN);
        }))
        .unwrap()
        .native_method(M::PUBLIC, "hashCode", "()I")
        .native_method(M::PUBLIC | M::FINAL, "notify", "()V")
        .native_method(M::PUBLIC | M::FINAL, "notifyAll", "()V")
        .native_method(M::PUBLIC | M::FINAL, "wait", "(J)V");
    add(&path, &object);

    define(&path, "java/lang/String", "java/lang/Object", |writer| {
        writer.field(F::PRIVATE | F::FINAL, "value", "[C");
    });
    define(&path, "java/lang/Class", "java/lang/Object", |_| {});
    define(&path, "java/lang/System", "java/lang/Object", |writer| {
        writer.native_method(M::PUBLIC | M::STATIC, "nanoTime", "()J");
    });

    define(&path, "java/lang/Thread", "java/lang/Object", |writer| {
        let mut join = Bytecode::new();
        let (check, finished) = (join.label(), join.label());
        join.bind(check)
            .op(ALOAD_0)
            .invoke(INVOKEVIRTUAL, "java/lang/Thread", "isAlive", "()Z")
            .jump(IFEQ, finished)
            .op(ALOAD_0)
            .op(LCONST_0)
            .invoke(INVOKEVIRTUAL, "java/lang/Object", "wait", "(J)V")
            .jump(GOTO, check)
            .bind(finished)
            .op(RETURN);

        writer
            .field(F::PRIVATE | F::VOLATILE, "name", "Ljava/lang/String;")
            .field(F::PRIVATE, "daemon", "Z")
            .method(M::PUBLIC, "run", "()V", body(|code| {
                code.op(RETURN);
            }))
            .unwrap()
            .method(M::PUBLIC | M::SYNCHRONIZED, "start", "()V", body(|code| {
                code.op(ALOAD_0)
                    .invoke(INVOKESPECIAL, "java/lang/Thread", "start0", "()V")
                    .op(RETURN);
            }))
            .unwrap()
            .method(M::PUBLIC | M::FINAL, "setDaemon", "(Z)V", body(|code| {
                code.op(ALOAD_0)
                    .op(ILOAD_1)
                    .field_op(PUTFIELD, "java/lang/Thread", "daemon", "Z")
                    .op(RETURN);
            }))
            .unwrap()
            .method(M::PUBLIC | M::FINAL | M::SYNCHRONIZED, "join", "()V", join)
            .unwrap()
            .native_method(M::PUBLIC | M::STATIC, "currentThread", "()Ljava/lang/Thread;")
            .native_method(M::PUBLIC | M::FINAL, "isAlive", "()Z")
            .native_method(M::PRIVATE, "start0", "()V")
            .native_method(M::PUBLIC | M::STATIC, "sleep", "(J)V")
            .native_method(M::PUBLIC | M::STATIC, "holdsLock", "(Ljava/lang/Object;)Z");
    });

    define(&path, "java/lang/Throwable", "java/lang/Object", |writer| {
        writer
            .field(F::PRIVATE, "detailMessage", "Ljava/lang/String;")
            .method(
                M::PUBLIC,
                "<init>",
                "(Ljava/lang/String;)V",
                body(|code| {
                    code.op(ALOAD_0)
                        .invoke(INVOKESPECIAL, "java/lang/Object", "<init>", "()V")
                        .op(ALOAD_0)
                        .op(ALOAD_1)
                        .field_op(PUTFIELD, "java/lang/Throwable", "detailMessage", "Ljava/lang/String;")
                        .op(RETURN);
                }),
            )
            .unwrap();
    });

    for (name, super_class) in [
        ("java/lang/Exception", "java/lang/Throwable"),
        ("java/lang/Error", "java/lang/Throwable"),
        ("java/lang/RuntimeException", "java/lang/Exception"),
        ("java/lang/InterruptedException", "java/lang/Exception"),
        ("java/lang/NullPointerException", "java/lang/RuntimeException"),
        ("java/lang/ArithmeticException", "java/lang/RuntimeException"),
        ("java/lang/IllegalArgumentException", "java/lang/RuntimeException"),
        ("java/lang/IllegalThreadStateException", "java/lang/IllegalArgumentException"),
        ("java/lang/IllegalMonitorStateException", "java/lang/RuntimeException"),
        ("java/lang/VirtualMachineError", "java/lang/Error"),
        ("java/lang/StackOverflowError", "java/lang/VirtualMachineError"),
    ] {
        throwable(&path, name, super_class);
    }

    path
}

/// Boot a VM on the core library plus the classes `extra` adds
pub fn vm_with(extra: impl FnOnce(&MemoryClassPath)) -> Arc<Vm> {
    let path = core_library();
    extra(&path);
    VmBuilder::new().class_path(path).build().unwrap()
}

/// A fresh non-daemon runtime thread that is not registered with the executor
pub fn runtime_thread(vm: &Arc<Vm>, name: &str) -> Thread {
    Thread::new(Arc::clone(vm), ThreadHandle::new(name, false, false))
}

/// Run static `name` of `class` to completion on `thread`
pub fn call(thread: &mut Thread, class: &str, name: &str, descriptor: &str, args: Vec<Value>) -> Result<Option<Value>> {
    let vm = Arc::clone(thread.vm());
    let class = vm.initialized_class(thread, class)?;
    let method = class
        .declared_method(name, descriptor)
        .cloned()
        .ok_or_else(|| Error::MethodNotFound {
            class: class.name().to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        })?;
    thread.invoke(class, method, args)
}

/// Read static `int` field `name` of an initialized class
pub fn static_int(vm: &Arc<Vm>, class: &str, name: &str) -> i32 {
    let class = vm.registry().resolve(class).unwrap();
    let (owner, field) = class.resolve_field(name, "I").unwrap().unwrap();
    owner.get_static(&field).unwrap().as_int().unwrap()
}
