//! Shared fixtures for unit tests.
//!
//! [`core_library`] assembles a miniature `java/lang` with [`ClassWriter`]: just enough of
//! `Object`, `String`, `Thread`, `Throwable` and the exceptions the VM raises for bytecode
//! to run against the default native bindings.

use std::sync::Arc;

use crate::{
    classfile::{
        Bytecode, ClassAccessFlags as C, ClassFile, ClassWriter, FieldAccessFlags as F,
        MethodAccessFlags as M,
    },
    disassembler::opcodes::*,
    runtime::{MemoryClassPath, Thread, Value, Vm, VmBuilder},
    Error, Result,
};

/// Serialize `writer` into `path` under its own class name
pub fn add_class(path: &MemoryClassPath, writer: &ClassWriter) {
    let bytes = writer.to_bytes().unwrap();
    let name = ClassFile::parse(&bytes).unwrap().this_class().to_string();
    path.add(&name, bytes);
}

fn define(path: &MemoryClassPath, name: &str, super_class: Option<&str>, build: impl FnOnce(&mut ClassWriter)) {
    let mut writer = ClassWriter::new(name, super_class);
    let file = name.rsplit('/').next().unwrap_or(name);
    writer.source_file(&format!("{file}.java"));
    build(&mut writer);
    add_class(path, &writer);
}

fn interface(path: &MemoryClassPath, name: &str, build: impl FnOnce(&mut ClassWriter)) {
    define(path, name, Some("java/lang/Object"), |writer| {
        writer.access_flags(C::PUBLIC | C::INTERFACE | C::ABSTRACT);
        build(writer);
    });
}

/// A method body assembled by `build`
pub fn body(build: impl FnOnce(&mut Bytecode)) -> Bytecode {
    let mut code = Bytecode::new();
    build(&mut code);
    code
}

/// `<init>()V` delegating to the no-argument constructor of `super_class`
pub fn default_constructor(super_class: &str) -> Bytecode {
    body(|code| {
        code.op(ALOAD_0)
            .invoke(INVOKESPECIAL, super_class, "<init>", "()V")
            .op(RETURN);
    })
}

fn throwable_class(path: &MemoryClassPath, name: &str, super_class: &str) {
    define(path, name, Some(super_class), |writer| {
        writer
            .method(M::PUBLIC, "<init>", "()V", default_constructor(super_class))
            .unwrap()
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

/// The miniature class library every test VM boots from
pub fn core_library() -> MemoryClassPath {
    let path = MemoryClassPath::new();

    define(&path, "java/lang/Object", None, |writer| {
        let mut equals = Bytecode::new();
        let different = equals.label();
        equals
            .op(ALOAD_0)
            .op(ALOAD_1)
            .jump(IF_ACMPNE, different)
            .op(ICONST_1)
            .op(IRETURN)
            .bind(different)
            .op(ICONST_0)
            .op(IRETURN);

        writer
            .method(M::PUBLIC, "<init>", "()V", body(|code| {
                code.op(RETURN);
            }))
            .unwrap()
            .native_method(M::PUBLIC, "hashCode", "()I")
            .native_method(M::PUBLIC | M::FINAL, "getClass", "()Ljava/lang/Class;")
            .native_method(M::PROTECTED, "clone", "()Ljava/lang/Object;")
            .native_method(M::PUBLIC | M::FINAL, "notify", "()V")
            .native_method(M::PUBLIC | M::FINAL, "notifyAll", "()V")
            .native_method(M::PUBLIC | M::FINAL, "wait", "(J)V")
            .method(
                M::PUBLIC | M::FINAL,
                "wait",
                "()V",
                body(|code| {
                    code.op(ALOAD_0)
                        .op(LCONST_0)
                        .invoke(INVOKEVIRTUAL, "java/lang/Object", "wait", "(J)V")
                        .op(RETURN);
                }),
            )
            .unwrap()
            .method(M::PUBLIC, "equals", "(Ljava/lang/Object;)Z", equals)
            .unwrap();
    });

    interface(&path, "java/io/Serializable", |_| {});
    interface(&path, "java/lang/Cloneable", |_| {});
    interface(&path, "java/lang/Runnable", |writer| {
        writer.abstract_method(M::PUBLIC, "run", "()V");
    });

    define(&path, "java/lang/String", Some("java/lang/Object"), |writer| {
        writer
            .access_flags(C::PUBLIC | C::FINAL | C::SUPER)
            .interface("java/io/Serializable")
            .field(F::PRIVATE | F::FINAL, "value", "[C")
            .method(M::PUBLIC, "<init>", "()V", default_constructor("java/lang/Object"))
            .unwrap()
            .method(
                M::PUBLIC,
                "length",
                "()I",
                body(|code| {
                    code.op(ALOAD_0)
                        .field_op(GETFIELD, "java/lang/String", "value", "[C")
                        .op(ARRAYLENGTH)
                        .op(IRETURN);
                }),
            )
            .unwrap()
            .method(
                M::PUBLIC,
                "charAt",
                "(I)C",
                body(|code| {
                    code.op(ALOAD_0)
                        .field_op(GETFIELD, "java/lang/String", "value", "[C")
                        .op(ILOAD_1)
                        .op(CALOAD)
                        .op(IRETURN);
                }),
            )
            .unwrap()
            .native_method(M::PUBLIC, "intern", "()Ljava/lang/String;");
    });

    define(&path, "java/lang/Class", Some("java/lang/Object"), |writer| {
        writer
            .access_flags(C::PUBLIC | C::FINAL | C::SUPER)
            .method(M::PRIVATE, "<init>", "()V", default_constructor("java/lang/Object"))
            .unwrap()
            .native_method(
                M::STATIC,
                "getPrimitiveClass",
                "(Ljava/lang/String;)Ljava/lang/Class;",
            )
            .native_method(M::PRIVATE | M::STATIC, "desiredAssertionStatus0", "(Ljava/lang/Class;)Z")
            .native_method(M::PUBLIC, "isInterface", "()Z")
            .native_method(M::PUBLIC, "isArray", "()Z")
            .native_method(M::PUBLIC, "isPrimitive", "()Z")
            .native_method(M::PRIVATE, "getName0", "()Ljava/lang/String;")
            .method(
                M::PUBLIC,
                "getName",
                "()Ljava/lang/String;",
                body(|code| {
                    code.op(ALOAD_0)
                        .invoke(INVOKESPECIAL, "java/lang/Class", "getName0", "()Ljava/lang/String;")
                        .op(ARETURN);
                }),
            )
            .unwrap();
    });

    define(&path, "java/lang/System", Some("java/lang/Object"), |writer| {
        writer
            .access_flags(C::PUBLIC | C::FINAL | C::SUPER)
            .native_method(
                M::PUBLIC | M::STATIC,
                "arraycopy",
                "(Ljava/lang/Object;ILjava/lang/Object;II)V",
            )
            .native_method(M::PUBLIC | M::STATIC, "currentTimeMillis", "()J")
            .native_method(M::PUBLIC | M::STATIC, "nanoTime", "()J")
            .native_method(M::PUBLIC | M::STATIC, "identityHashCode", "(Ljava/lang/Object;)I");
    });

    define(&path, "java/lang/Thread", Some("java/lang/Object"), |writer| {
        let mut run = Bytecode::new();
        let done = run.label();
        run.op(ALOAD_0)
            .field_op(GETFIELD, "java/lang/Thread", "target", "Ljava/lang/Runnable;")
            .jump(IFNULL, done)
            .op(ALOAD_0)
            .field_op(GETFIELD, "java/lang/Thread", "target", "Ljava/lang/Runnable;")
            .invoke(INVOKEINTERFACE, "java/lang/Runnable", "run", "()V")
            .bind(done)
            .op(RETURN);

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
            .interface("java/lang/Runnable")
            .field(F::PRIVATE | F::VOLATILE, "name", "Ljava/lang/String;")
            .field(F::PRIVATE, "daemon", "Z")
            .field(F::PRIVATE, "target", "Ljava/lang/Runnable;")
            .method(M::PUBLIC, "<init>", "()V", default_constructor("java/lang/Object"))
            .unwrap()
            .method(
                M::PUBLIC,
                "<init>",
                "(Ljava/lang/Runnable;)V",
                body(|code| {
                    code.op(ALOAD_0)
                        .invoke(INVOKESPECIAL, "java/lang/Object", "<init>", "()V")
                        .op(ALOAD_0)
                        .op(ALOAD_1)
                        .field_op(PUTFIELD, "java/lang/Thread", "target", "Ljava/lang/Runnable;")
                        .op(RETURN);
                }),
            )
            .unwrap()
            .method(M::PUBLIC, "run", "()V", run)
            .unwrap()
            .method(
                M::PUBLIC | M::SYNCHRONIZED,
                "start",
                "()V",
                body(|code| {
                    code.op(ALOAD_0)
                        .invoke(INVOKESPECIAL, "java/lang/Thread", "start0", "()V")
                        .op(RETURN);
                }),
            )
            .unwrap()
            .method(
                M::PUBLIC | M::FINAL,
                "setDaemon",
                "(Z)V",
                body(|code| {
                    code.op(ALOAD_0)
                        .op(ILOAD_1)
                        .field_op(PUTFIELD, "java/lang/Thread", "daemon", "Z")
                        .op(RETURN);
                }),
            )
            .unwrap()
            .method(
                M::PUBLIC | M::FINAL,
                "setName",
                "(Ljava/lang/String;)V",
                body(|code| {
                    code.op(ALOAD_0)
                        .op(ALOAD_1)
                        .field_op(PUTFIELD, "java/lang/Thread", "name", "Ljava/lang/String;")
                        .op(RETURN);
                }),
            )
            .unwrap()
            .method(
                M::PUBLIC | M::FINAL,
                "getName",
                "()Ljava/lang/String;",
                body(|code| {
                    code.op(ALOAD_0)
                        .field_op(GETFIELD, "java/lang/Thread", "name", "Ljava/lang/String;")
                        .op(ARETURN);
                }),
            )
            .unwrap()
            .method(M::PUBLIC | M::FINAL | M::SYNCHRONIZED, "join", "()V", join)
            .unwrap()
            .method(
                M::PUBLIC,
                "interrupt",
                "()V",
                body(|code| {
                    code.op(ALOAD_0)
                        .invoke(INVOKESPECIAL, "java/lang/Thread", "interrupt0", "()V")
                        .op(RETURN);
                }),
            )
            .unwrap()
            .method(
                M::PUBLIC,
                "isInterrupted",
                "()Z",
                body(|code| {
                    code.op(ALOAD_0)
                        .op(ICONST_0)
                        .invoke(INVOKESPECIAL, "java/lang/Thread", "isInterrupted", "(Z)Z")
                        .op(IRETURN);
                }),
            )
            .unwrap()
            .method(
                M::PUBLIC | M::STATIC,
                "interrupted",
                "()Z",
                body(|code| {
                    code.invoke(INVOKESTATIC, "java/lang/Thread", "currentThread", "()Ljava/lang/Thread;")
                        .op(ICONST_1)
                        .invoke(INVOKESPECIAL, "java/lang/Thread", "isInterrupted", "(Z)Z")
                        .op(IRETURN);
                }),
            )
            .unwrap()
            .native_method(M::PUBLIC | M::STATIC, "currentThread", "()Ljava/lang/Thread;")
            .native_method(M::PUBLIC | M::FINAL, "isAlive", "()Z")
            .native_method(M::PRIVATE, "start0", "()V")
            .native_method(M::PUBLIC | M::STATIC, "sleep", "(J)V")
            .native_method(M::PRIVATE, "interrupt0", "()V")
            .native_method(M::PRIVATE, "isInterrupted", "(Z)Z")
            .native_method(M::PUBLIC | M::STATIC, "holdsLock", "(Ljava/lang/Object;)Z")
            .native_method(M::PUBLIC | M::STATIC, "yield", "()V");
    });

    define(&path, "java/lang/Throwable", Some("java/lang/Object"), |writer| {
        writer
            .interface("java/io/Serializable")
            .field(F::PRIVATE, "detailMessage", "Ljava/lang/String;")
            .method(
                M::PUBLIC,
                "<init>",
                "()V",
                body(|code| {
                    code.op(ALOAD_0)
                        .invoke(INVOKESPECIAL, "java/lang/Object", "<init>", "()V")
                        .op(ALOAD_0)
                        .invoke(INVOKEVIRTUAL, "java/lang/Throwable", "fillInStackTrace", "()Ljava/lang/Throwable;")
                        .op(POP)
                        .op(RETURN);
                }),
            )
            .unwrap()
            .method(
                M::PUBLIC,
                "<init>",
                "(Ljava/lang/String;)V",
                body(|code| {
                    code.op(ALOAD_0)
                        .invoke(INVOKESPECIAL, "java/lang/Object", "<init>", "()V")
                        .op(ALOAD_0)
                        .invoke(INVOKEVIRTUAL, "java/lang/Throwable", "fillInStackTrace", "()Ljava/lang/Throwable;")
                        .op(POP)
                        .op(ALOAD_0)
                        .op(ALOAD_1)
                        .field_op(PUTFIELD, "java/lang/Throwable", "detailMessage", "Ljava/lang/String;")
                        .op(RETURN);
                }),
            )
            .unwrap()
            .method(
                M::PUBLIC | M::SYNCHRONIZED,
                "fillInStackTrace",
                "()Ljava/lang/Throwable;",
                body(|code| {
                    code.op(ALOAD_0)
                        .op(ICONST_0)
                        .invoke(INVOKESPECIAL, "java/lang/Throwable", "fillInStackTrace", "(I)Ljava/lang/Throwable;")
                        .op(ARETURN);
                }),
            )
            .unwrap()
            .method(
                M::PUBLIC,
                "getMessage",
                "()Ljava/lang/String;",
                body(|code| {
                    code.op(ALOAD_0)
                        .field_op(GETFIELD, "java/lang/Throwable", "detailMessage", "Ljava/lang/String;")
                        .op(ARETURN);
                }),
            )
            .unwrap()
            .native_method(M::PRIVATE, "fillInStackTrace", "(I)Ljava/lang/Throwable;")
            .native_method(M::empty(), "getStackTraceDepth", "()I")
            .native_method(M::empty(), "getStackTraceElement", "(I)Ljava/lang/StackTraceElement;");
    });

    for (name, super_class) in [
        ("java/lang/Exception", "java/lang/Throwable"),
        ("java/lang/Error", "java/lang/Throwable"),
        ("java/lang/RuntimeException", "java/lang/Exception"),
        ("java/lang/InterruptedException", "java/lang/Exception"),
        ("java/lang/CloneNotSupportedException", "java/lang/Exception"),
        ("java/io/IOException", "java/lang/Exception"),
        ("java/lang/NullPointerException", "java/lang/RuntimeException"),
        ("java/lang/ArithmeticException", "java/lang/RuntimeException"),
        ("java/lang/ClassCastException", "java/lang/RuntimeException"),
        ("java/lang/ArrayStoreException", "java/lang/RuntimeException"),
        ("java/lang/NegativeArraySizeException", "java/lang/RuntimeException"),
        ("java/lang/IllegalMonitorStateException", "java/lang/RuntimeException"),
        ("java/lang/IllegalArgumentException", "java/lang/RuntimeException"),
        ("java/lang/IllegalThreadStateException", "java/lang/IllegalArgumentException"),
        ("java/lang/IndexOutOfBoundsException", "java/lang/RuntimeException"),
        ("java/lang/ArrayIndexOutOfBoundsException", "java/lang/IndexOutOfBoundsException"),
        ("java/lang/LinkageError", "java/lang/Error"),
        ("java/lang/IncompatibleClassChangeError", "java/lang/LinkageError"),
        ("java/lang/AbstractMethodError", "java/lang/IncompatibleClassChangeError"),
        ("java/lang/InstantiationError", "java/lang/IncompatibleClassChangeError"),
        ("java/lang/VirtualMachineError", "java/lang/Error"),
        ("java/lang/StackOverflowError", "java/lang/VirtualMachineError"),
    ] {
        throwable_class(&path, name, super_class);
    }

    define(&path, "java/lang/StackTraceElement", Some("java/lang/Object"), |writer| {
        writer
            .access_flags(C::PUBLIC | C::FINAL | C::SUPER)
            .field(F::PRIVATE, "declaringClass", "Ljava/lang/String;")
            .field(F::PRIVATE, "methodName", "Ljava/lang/String;")
            .field(F::PRIVATE, "fileName", "Ljava/lang/String;")
            .field(F::PRIVATE, "lineNumber", "I")
            .method(
                M::PUBLIC,
                "getLineNumber",
                "()I",
                body(|code| {
                    code.op(ALOAD_0)
                        .field_op(GETFIELD, "java/lang/StackTraceElement", "lineNumber", "I")
                        .op(IRETURN);
                }),
            )
            .unwrap();
    });

    path
}

/// Boot a VM from [`core_library`] plus whatever `extra` adds
pub fn build_vm(extra: impl FnOnce(&MemoryClassPath)) -> Arc<Vm> {
    let path = core_library();
    extra(&path);
    VmBuilder::new().class_path(path).build().unwrap()
}

/// Run static `name` of `class` to completion on a fresh main thread
pub fn call_static(vm: &Arc<Vm>, class: &str, name: &str, descriptor: &str, args: Vec<Value>) -> Result<Option<Value>> {
    let mut thread = vm.main_thread()?;
    call_static_on(&mut thread, class, name, descriptor, args)
}

/// Run static `name` of `class` to completion on `thread`
pub fn call_static_on(
    thread: &mut Thread,
    class: &str,
    name: &str,
    descriptor: &str,
    args: Vec<Value>,
) -> Result<Option<Value>> {
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

/// Class name and message of the Java exception carried by `error`
pub fn thrown(error: &Error) -> Option<(String, Option<String>)> {
    let Error::Exception(throwable) = error else {
        return None;
    };
    let message = match throwable.field("detailMessage", "Ljava/lang/String;") {
        Ok(Value::Reference(message)) => message.string_value(),
        _ => None,
    };
    Some((throwable.class().name().to_string(), message))
}
