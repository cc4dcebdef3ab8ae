//! Bindings for `java/lang`: `Object`, `System`, `Runtime`, `String`, `Class` and
//! `Throwable`.

use std::{
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use crate::{
    runtime::{
        native::{int_arg, long_arg, monitor_result, non_null_arg, ref_arg, NativeRegistry},
        ClassRef, Instance, Thread, Value, VmData,
    },
    Error, Result,
};

/// Registers the `java/lang` bindings with `natives`
pub fn register(natives: &NativeRegistry) {
    natives.register("java/lang/Object", "hashCode", "()I", object_hash_code);
    natives.register("java/lang/Object", "getClass", "()Ljava/lang/Class;", object_get_class);
    natives.register("java/lang/Object", "clone", "()Ljava/lang/Object;", object_clone);
    natives.register("java/lang/Object", "notify", "()V", object_notify);
    natives.register("java/lang/Object", "notifyAll", "()V", object_notify_all);
    natives.register("java/lang/Object", "wait", "(J)V", object_wait);

    natives.register(
        "java/lang/System",
        "arraycopy",
        "(Ljava/lang/Object;ILjava/lang/Object;II)V",
        system_arraycopy,
    );
    natives.register("java/lang/System", "currentTimeMillis", "()J", system_current_time_millis);
    natives.register("java/lang/System", "nanoTime", "()J", system_nano_time);
    natives.register(
        "java/lang/System",
        "identityHashCode",
        "(Ljava/lang/Object;)I",
        system_identity_hash_code,
    );
    natives.register("java/lang/Runtime", "availableProcessors", "()I", |_, _| {
        let processors = std::thread::available_parallelism().map_or(1, |count| count.get());
        Ok(Some(Value::Int(i32::try_from(processors).unwrap_or(i32::MAX))))
    });

    natives.register("java/lang/String", "intern", "()Ljava/lang/String;", string_intern);

    natives.register(
        "java/lang/Class",
        "getPrimitiveClass",
        "(Ljava/lang/String;)Ljava/lang/Class;",
        class_get_primitive_class,
    );
    natives.register(
        "java/lang/Class",
        "desiredAssertionStatus0",
        "(Ljava/lang/Class;)Z",
        |_, _| Ok(Some(Value::from_bool(false))),
    );
    natives.register("java/lang/Class", "isInterface", "()Z", |thread, args| {
        class_flag(thread, &args, |class| class.is_interface())
    });
    natives.register("java/lang/Class", "isArray", "()Z", |thread, args| {
        class_flag(thread, &args, |class| class.is_array())
    });
    natives.register("java/lang/Class", "isPrimitive", "()Z", |thread, args| {
        class_flag(thread, &args, |class| class.is_primitive())
    });
    natives.register("java/lang/Class", "getName0", "()Ljava/lang/String;", class_get_name);

    natives.register(
        "java/lang/Throwable",
        "fillInStackTrace",
        "(I)Ljava/lang/Throwable;",
        throwable_fill_in_stack_trace,
    );
    natives.register("java/lang/Throwable", "getStackTraceDepth", "()I", throwable_stack_trace_depth);
    natives.register(
        "java/lang/Throwable",
        "getStackTraceElement",
        "(I)Ljava/lang/StackTraceElement;",
        throwable_stack_trace_element,
    );
}

fn object_hash_code(thread: &mut Thread, args: Vec<Value>) -> Result<Option<Value>> {
    let object = non_null_arg(thread, &args, 0)?;
    Ok(Some(Value::Int(thread.vm().identity_hash(&object))))
}

fn object_get_class(thread: &mut Thread, args: Vec<Value>) -> Result<Option<Value>> {
    let object = non_null_arg(thread, &args, 0)?;
    let mirror = thread.vm().class_mirror(object.class())?;
    Ok(Some(Value::Reference(mirror)))
}

/// Shallow copy; arrays and `Cloneable` objects only
fn object_clone(thread: &mut Thread, args: Vec<Value>) -> Result<Option<Value>> {
    let object = non_null_arg(thread, &args, 0)?;
    if !object.is_array() && !object.class().is_assignable_to("java/lang/Cloneable")? {
        let message = object.class().name().replace('/', ".");
        return Err(thread
            .vm()
            .raise(thread, "java/lang/CloneNotSupportedException", Some(&message)));
    }
    Ok(Some(Value::Reference(object.shallow_copy())))
}

fn object_notify(thread: &mut Thread, args: Vec<Value>) -> Result<Option<Value>> {
    let object = non_null_arg(thread, &args, 0)?;
    monitor_result(thread, object.monitor().notify(thread.id()))?;
    Ok(None)
}

fn object_notify_all(thread: &mut Thread, args: Vec<Value>) -> Result<Option<Value>> {
    let object = non_null_arg(thread, &args, 0)?;
    monitor_result(thread, object.monitor().notify_all(thread.id()))?;
    Ok(None)
}

/// `Object.wait(long)`: zero waits without timeout
fn object_wait(thread: &mut Thread, args: Vec<Value>) -> Result<Option<Value>> {
    let object = non_null_arg(thread, &args, 0)?;
    let millis = long_arg(&args, 1)?;
    let Ok(millis) = u64::try_from(millis) else {
        return Err(thread.vm().raise(
            thread,
            "java/lang/IllegalArgumentException",
            Some("timeout value is negative"),
        ));
    };
    let timeout = (millis > 0).then(|| Duration::from_millis(millis));

    let handle = thread.handle().clone();
    let target = Arc::clone(&object);
    let watcher = handle.interrupts().watch_with(move || target.monitor().wake_waiters());
    let waited = object.monitor().wait(thread.id(), timeout, Some(&watcher));
    let interrupted = handle.interrupts().unwatch(watcher);

    monitor_result(thread, waited.map(|_| ()))?;
    if interrupted {
        return Err(thread.vm().raise(thread, "java/lang/InterruptedException", None));
    }
    Ok(None)
}

/// `System.arraycopy`, with the source range copied out before the destination is written
fn system_arraycopy(thread: &mut Thread, args: Vec<Value>) -> Result<Option<Value>> {
    let source = non_null_arg(thread, &args, 0)?;
    let source_pos = int_arg(&args, 1)?;
    let target = non_null_arg(thread, &args, 2)?;
    let target_pos = int_arg(&args, 3)?;
    let length = int_arg(&args, 4)?;

    let (Some(source_component), Some(target_component)) = (
        source.class().component_descriptor(),
        target.class().component_descriptor(),
    ) else {
        return Err(thread.vm().raise(
            thread,
            "java/lang/ArrayStoreException",
            Some("arraycopy: argument type mismatch"),
        ));
    };

    let primitive = |descriptor: &str| !matches!(descriptor.as_bytes().first(), Some(b'L' | b'['));
    if (primitive(source_component) || primitive(target_component)) && source_component != target_component {
        let message = format!(
            "arraycopy: type mismatch: can not copy {} into {}",
            source.class().name(),
            target.class().name()
        );
        return Err(thread
            .vm()
            .raise(thread, "java/lang/ArrayStoreException", Some(&message)));
    }

    let out_of_bounds = |which: &str, position: i32, array: &Instance| -> Option<String> {
        let end = i64::from(position) + i64::from(length);
        let len = i64::try_from(array.len()).unwrap_or(i64::MAX);
        if position < 0 {
            Some(format!("arraycopy: {which} index {position} out of bounds for length {len}"))
        } else if end > len {
            Some(format!("arraycopy: last {which} index {end} out of bounds for length {len}"))
        } else {
            None
        }
    };
    let violation = if length < 0 {
        Some(format!("arraycopy: length {length} is negative"))
    } else {
        out_of_bounds("source", source_pos, &source).or_else(|| out_of_bounds("destination", target_pos, &target))
    };
    if let Some(message) = violation {
        return Err(thread
            .vm()
            .raise(thread, "java/lang/ArrayIndexOutOfBoundsException", Some(&message)));
    }

    // Bounds were checked above, so the casts can not wrap
    let (source_pos, target_pos, length) = (source_pos as usize, target_pos as usize, length as usize);
    let elements: Vec<Value> = source.slots()[source_pos..source_pos + length].to_vec();

    if !primitive(target_component) {
        let target_class = crate::runtime::class_name_of(target_component).unwrap_or(target_component);
        for element in &elements {
            if let Value::Reference(element) = element {
                if !element.class().is_assignable_to(target_class)? {
                    let message = format!(
                        "arraycopy: element type mismatch: {} is not a {}",
                        element.class().name(),
                        target_class
                    );
                    return Err(thread
                        .vm()
                        .raise(thread, "java/lang/ArrayStoreException", Some(&message)));
                }
            }
        }
    }

    target.slots()[target_pos..target_pos + length].clone_from_slice(&elements);
    Ok(None)
}

fn system_current_time_millis(_thread: &mut Thread, _args: Vec<Value>) -> Result<Option<Value>> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX));
    Ok(Some(Value::Long(millis)))
}

fn system_nano_time(thread: &mut Thread, _args: Vec<Value>) -> Result<Option<Value>> {
    let nanos = i64::try_from(thread.vm().uptime().as_nanos()).unwrap_or(i64::MAX);
    Ok(Some(Value::Long(nanos)))
}

fn system_identity_hash_code(thread: &mut Thread, args: Vec<Value>) -> Result<Option<Value>> {
    let hash = match ref_arg(&args, 0)? {
        Some(object) => thread.vm().identity_hash(&object),
        None => 0,
    };
    Ok(Some(Value::Int(hash)))
}

fn string_intern(thread: &mut Thread, args: Vec<Value>) -> Result<Option<Value>> {
    let string = non_null_arg(thread, &args, 0)?;
    let text = thread.vm().rust_string(&string)?;
    Ok(Some(Value::Reference(thread.vm().intern(&text)?)))
}

fn class_get_primitive_class(thread: &mut Thread, args: Vec<Value>) -> Result<Option<Value>> {
    let name = non_null_arg(thread, &args, 0)?;
    let name = thread.vm().rust_string(&name)?;
    let class = thread.vm().registry().resolve(&name)?;
    if !class.is_primitive() {
        return Err(Error::ClassNotFound(name));
    }
    Ok(Some(Value::Reference(thread.vm().class_mirror(&class)?)))
}

fn mirrored_class(thread: &Thread, args: &[Value]) -> Result<ClassRef> {
    let mirror = non_null_arg(thread, args, 0)?;
    mirror.as_class().cloned().ok_or_else(|| Error::TypeMismatch {
        expected: "java/lang/Class",
        found: mirror.class().name().to_string(),
    })
}

fn class_flag(
    thread: &Thread,
    args: &[Value],
    flag: impl FnOnce(&ClassRef) -> bool,
) -> Result<Option<Value>> {
    let class = mirrored_class(thread, args)?;
    Ok(Some(Value::from_bool(flag(&class))))
}

fn class_get_name(thread: &mut Thread, args: Vec<Value>) -> Result<Option<Value>> {
    let class = mirrored_class(thread, &args)?;
    let name = thread.vm().java_string(&class.name().replace('/', "."))?;
    Ok(Some(Value::Reference(name)))
}

/// Capture the stack of the calling thread into the throwable.
///
/// Frames of `fillInStackTrace` itself and of the constructors of the throwable are left out,
/// so the trace starts where the object was created.
fn throwable_fill_in_stack_trace(thread: &mut Thread, args: Vec<Value>) -> Result<Option<Value>> {
    let throwable = non_null_arg(thread, &args, 0)?;
    let mut trace = thread.stack_trace();

    let skip = thread
        .frames()
        .iter()
        .rev()
        .take_while(|frame| {
            let method = &frame.method().name;
            method == "fillInStackTrace"
                || (method == "<init>"
                    && throwable
                        .class()
                        .is_subclass_of(frame.class().name())
                        .unwrap_or(false))
        })
        .count();
    trace.drain(..skip.min(trace.len()));

    throwable.set_vm_data(VmData::Trace(trace));
    Ok(Some(Value::Reference(throwable)))
}

fn throwable_stack_trace_depth(thread: &mut Thread, args: Vec<Value>) -> Result<Option<Value>> {
    let throwable = non_null_arg(thread, &args, 0)?;
    let depth = throwable.stack_trace().map_or(0, <[_]>::len);
    Ok(Some(Value::Int(i32::try_from(depth).unwrap_or(i32::MAX))))
}

/// Materialize one captured entry as a `java/lang/StackTraceElement`
fn throwable_stack_trace_element(thread: &mut Thread, args: Vec<Value>) -> Result<Option<Value>> {
    let throwable = non_null_arg(thread, &args, 0)?;
    let index = int_arg(&args, 1)?;
    let element = usize::try_from(index)
        .ok()
        .and_then(|index| throwable.stack_trace().and_then(|trace| trace.get(index)))
        .cloned();
    let Some(element) = element else {
        let message = format!("Index {index} out of bounds for stack trace");
        return Err(thread
            .vm()
            .raise(thread, "java/lang/IndexOutOfBoundsException", Some(&message)));
    };

    let vm = Arc::clone(thread.vm());
    let object = vm.new_object(thread, "java/lang/StackTraceElement")?;
    let string = |text: &str| vm.java_string(text).map(Value::Reference);

    object.set_field("declaringClass", "Ljava/lang/String;", string(&element.class.replace('/', "."))?)?;
    object.set_field("methodName", "Ljava/lang/String;", string(&element.method)?)?;
    let file = match &element.file {
        Some(file) => string(file)?,
        None => Value::Null,
    };
    object.set_field("fileName", "Ljava/lang/String;", file)?;
    let line = match (element.native, element.line) {
        (true, _) => -2,
        (false, Some(line)) => i32::from(line),
        (false, None) => -1,
    };
    object.set_field("lineNumber", "I", Value::Int(line))?;

    Ok(Some(Value::Reference(object)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        classfile::{Bytecode, ClassWriter, MethodAccessFlags},
        disassembler::opcodes::*,
        runtime::{Value, Vm},
        test::{add_class, body, build_vm, call_static, call_static_on, thrown},
        Result,
    };

    fn program(descriptor: &str, build: impl FnOnce(&mut Bytecode)) -> Arc<Vm> {
        build_vm(|path| {
            let mut writer = ClassWriter::new("demo/Natives", Some("java/lang/Object"));
            writer
                .method(
                    MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
                    "test",
                    descriptor,
                    body(build),
                )
                .unwrap();
            add_class(path, &writer);
        })
    }

    fn run(descriptor: &str, build: impl FnOnce(&mut Bytecode)) -> Result<Option<Value>> {
        call_static(&program(descriptor, build), "demo/Natives", "test", descriptor, vec![])
    }

    /// Class and message of the exception `build` throws, read while its VM is still alive
    fn raised(build: impl FnOnce(&mut Bytecode)) -> (String, Option<String>) {
        let vm = program("()V", build);
        let error = call_static(&vm, "demo/Natives", "test", "()V", vec![]).unwrap_err();
        thrown(&error).unwrap()
    }

    fn int_array(code: &mut Bytecode, values: &[i32]) {
        code.iconst(values.len() as i32).op(NEWARRAY).u8(10);
        for (index, value) in values.iter().enumerate() {
            code.op(DUP).iconst(index as i32).iconst(*value).op(IASTORE);
        }
    }

    #[test]
    fn hash_code_is_identity_hash() {
        let value = run("()I", |code| {
            code.class_op(NEW, "java/lang/Object")
                .op(DUP)
                .invoke(INVOKEVIRTUAL, "java/lang/Object", "hashCode", "()I")
                .op(SWAP)
                .invoke(INVOKESTATIC, "java/lang/System", "identityHashCode", "(Ljava/lang/Object;)I")
                .op(ISUB)
                .op(IRETURN);
        })
        .unwrap();
        assert_eq!(value, Some(Value::Int(0)));

        let value = run("()I", |code| {
            code.op(ACONST_NULL)
                .invoke(INVOKESTATIC, "java/lang/System", "identityHashCode", "(Ljava/lang/Object;)I")
                .op(IRETURN);
        })
        .unwrap();
        assert_eq!(value, Some(Value::Int(0)));
    }

    #[test]
    fn arraycopy_handles_overlap() {
        // int[] a = {0, 1, 2, 3, 4}; System.arraycopy(a, 0, a, 1, 3); return a[3];
        let value = run("()I", |code| {
            int_array(code, &[0, 1, 2, 3, 4]);
            code.op(ASTORE_0)
                .op(ALOAD_0)
                .op(ICONST_0)
                .op(ALOAD_0)
                .op(ICONST_1)
                .op(ICONST_3)
                .invoke(
                    INVOKESTATIC,
                    "java/lang/System",
                    "arraycopy",
                    "(Ljava/lang/Object;ILjava/lang/Object;II)V",
                )
                .op(ALOAD_0)
                .op(ICONST_3)
                .op(IALOAD)
                .op(IRETURN)
                .max_locals(1);
        })
        .unwrap();
        assert_eq!(value, Some(Value::Int(2)));
    }

    #[test]
    fn arraycopy_errors() {
        let copy = |build: &dyn Fn(&mut Bytecode)| {
            raised(|code| {
                build(code);
                code.invoke(
                    INVOKESTATIC,
                    "java/lang/System",
                    "arraycopy",
                    "(Ljava/lang/Object;ILjava/lang/Object;II)V",
                )
                .op(RETURN);
            })
        };

        let (class, _) = copy(&|code| {
            code.op(ACONST_NULL).op(ICONST_0);
            int_array(code, &[1]);
            code.op(ICONST_0).op(ICONST_1);
        });
        assert_eq!(class, "java/lang/NullPointerException");

        let (class, message) = copy(&|code| {
            int_array(code, &[1, 2]);
            code.op(ICONST_1);
            int_array(code, &[0, 0]);
            code.op(ICONST_0).op(ICONST_2);
        });
        assert_eq!(class, "java/lang/ArrayIndexOutOfBoundsException");
        assert_eq!(
            message.as_deref(),
            Some("arraycopy: last source index 3 out of bounds for length 2")
        );

        let (class, _) = copy(&|code| {
            int_array(code, &[1]);
            code.op(ICONST_0).op(ICONST_1).op(NEWARRAY).u8(11); // long[]
            code.op(ICONST_0).op(ICONST_1);
        });
        assert_eq!(class, "java/lang/ArrayStoreException");

        let (class, _) = copy(&|code| {
            code.op(ICONST_1)
                .class_op(ANEWARRAY, "java/lang/Object")
                .op(DUP)
                .op(ICONST_0)
                .class_op(NEW, "java/lang/Object")
                .op(AASTORE)
                .op(ICONST_0)
                .op(ICONST_1)
                .class_op(ANEWARRAY, "java/lang/String")
                .op(ICONST_0)
                .op(ICONST_1);
        });
        assert_eq!(class, "java/lang/ArrayStoreException");
    }

    #[test]
    fn clone_copies_arrays_only_when_cloneable() {
        // int[] a = {5}; int[] b = a.clone(); b[0] = 6; return a[0];
        let value = run("()I", |code| {
            int_array(code, &[5]);
            code.op(DUP)
                .invoke(INVOKEVIRTUAL, "java/lang/Object", "clone", "()Ljava/lang/Object;")
                .class_op(CHECKCAST, "[I")
                .op(ICONST_0)
                .iconst(6)
                .op(IASTORE)
                .op(ICONST_0)
                .op(IALOAD)
                .op(IRETURN);
        })
        .unwrap();
        assert_eq!(value, Some(Value::Int(5)));

        let thrown = raised(|code| {
            code.class_op(NEW, "java/lang/Object")
                .invoke(INVOKEVIRTUAL, "java/lang/Object", "clone", "()Ljava/lang/Object;")
                .op(POP)
                .op(RETURN);
        });
        assert_eq!(
            thrown,
            (
                "java/lang/CloneNotSupportedException".to_string(),
                Some("java.lang.Object".to_string())
            )
        );
    }

    #[test]
    fn class_mirrors() {
        let value = run("()Ljava/lang/String;", |code| {
            code.ldc_string("text")
                .invoke(INVOKEVIRTUAL, "java/lang/Object", "getClass", "()Ljava/lang/Class;")
                .invoke(INVOKEVIRTUAL, "java/lang/Class", "getName", "()Ljava/lang/String;")
                .op(ARETURN);
        })
        .unwrap();
        let Some(Value::Reference(name)) = value else {
            panic!("expected a string, got {value:?}");
        };
        assert_eq!(name.string_value().as_deref(), Some("java.lang.String"));

        // the mirror of a class is unique
        let value = run("()I", |code| {
            let same = code.label();
            code.ldc_class("java/lang/String")
                .ldc_string("text")
                .invoke(INVOKEVIRTUAL, "java/lang/Object", "getClass", "()Ljava/lang/Class;")
                .jump(IF_ACMPEQ, same)
                .op(ICONST_0)
                .op(IRETURN)
                .bind(same)
                .op(ICONST_1)
                .op(IRETURN);
        })
        .unwrap();
        assert_eq!(value, Some(Value::Int(1)));

        let value = run("()I", |code| {
            code.ldc_string("int")
                .invoke(
                    INVOKESTATIC,
                    "java/lang/Class",
                    "getPrimitiveClass",
                    "(Ljava/lang/String;)Ljava/lang/Class;",
                )
                .invoke(INVOKEVIRTUAL, "java/lang/Class", "isPrimitive", "()Z")
                .ldc_class("java/lang/Runnable")
                .invoke(INVOKEVIRTUAL, "java/lang/Class", "isInterface", "()Z")
                .op(IADD)
                .ldc_class("[I")
                .invoke(INVOKEVIRTUAL, "java/lang/Class", "isArray", "()Z")
                .op(IADD)
                .op(IRETURN);
        })
        .unwrap();
        assert_eq!(value, Some(Value::Int(3)));
    }

    #[test]
    fn intern_returns_the_literal() {
        let value = run("()I", |code| {
            let same = code.label();
            code.ldc_string("abc")
                .invoke(INVOKEVIRTUAL, "java/lang/String", "intern", "()Ljava/lang/String;")
                .ldc_string("abc")
                .jump(IF_ACMPEQ, same)
                .op(ICONST_0)
                .op(IRETURN)
                .bind(same)
                .op(ICONST_1)
                .op(IRETURN);
        })
        .unwrap();
        assert_eq!(value, Some(Value::Int(1)));
    }

    #[test]
    fn monitor_misuse_raises() {
        let thrown = raised(|code| {
            code.class_op(NEW, "java/lang/Object")
                .invoke(INVOKEVIRTUAL, "java/lang/Object", "notify", "()V")
                .op(RETURN);
        });
        assert_eq!(
            thrown,
            (
                "java/lang/IllegalMonitorStateException".to_string(),
                Some("current thread is not owner".to_string())
            )
        );

        let (class, message) = raised(|code| {
            code.class_op(NEW, "java/lang/Object")
                .lconst(-1)
                .invoke(INVOKEVIRTUAL, "java/lang/Object", "wait", "(J)V")
                .op(RETURN);
        });
        assert_eq!(class, "java/lang/IllegalArgumentException");
        assert_eq!(message.as_deref(), Some("timeout value is negative"));
    }

    #[test]
    fn timed_wait_returns() {
        let value = run("()I", |code| {
            code.class_op(NEW, "java/lang/Object")
                .op(ASTORE_0)
                .op(ALOAD_0)
                .op(MONITORENTER)
                .op(ALOAD_0)
                .lconst(5)
                .invoke(INVOKEVIRTUAL, "java/lang/Object", "wait", "(J)V")
                .op(ALOAD_0)
                .invoke(INVOKESTATIC, "java/lang/Thread", "holdsLock", "(Ljava/lang/Object;)Z")
                .op(ALOAD_0)
                .op(MONITOREXIT)
                .op(IRETURN)
                .max_locals(1);
        })
        .unwrap();
        assert_eq!(value, Some(Value::Int(1)));
    }

    #[test]
    fn untimed_wait_ends_on_interrupt() {
        let vm = program("()V", |code| {
            code.class_op(NEW, "java/lang/Object")
                .op(ASTORE_0)
                .op(ALOAD_0)
                .op(MONITORENTER)
                .op(ALOAD_0)
                .op(LCONST_0)
                .invoke(INVOKEVIRTUAL, "java/lang/Object", "wait", "(J)V")
                .op(RETURN)
                .max_locals(1);
        });
        let mut thread = vm.main_thread().unwrap();
        let handle = thread.handle().clone();
        let interrupter = std::thread::spawn(move || {
            while handle.interrupts().watcher_count() == 0 {
                std::thread::sleep(std::time::Duration::from_millis(1));
            }
            handle.interrupt();
        });

        let error = call_static_on(&mut thread, "demo/Natives", "test", "()V", vec![]).unwrap_err();
        interrupter.join().unwrap();
        assert_eq!(thrown(&error).unwrap().0, "java/lang/InterruptedException");
        assert!(!thread.handle().interrupts().is_interrupted());
    }

    #[test]
    fn stack_trace_elements() {
        let value = run("()I", |code| {
            code.line(7)
                .class_op(NEW, "java/lang/Exception")
                .op(DUP)
                .invoke(INVOKESPECIAL, "java/lang/Exception", "<init>", "()V")
                .op(DUP)
                .invoke(INVOKEVIRTUAL, "java/lang/Throwable", "getStackTraceDepth", "()I")
                .op(SWAP)
                .op(ICONST_0)
                .invoke(
                    INVOKEVIRTUAL,
                    "java/lang/Throwable",
                    "getStackTraceElement",
                    "(I)Ljava/lang/StackTraceElement;",
                )
                .invoke(INVOKEVIRTUAL, "java/lang/StackTraceElement", "getLineNumber", "()I")
                .iconst(100)
                .op(IMUL)
                .op(IADD)
                .op(IRETURN);
        })
        .unwrap();
        assert_eq!(value, Some(Value::Int(701)));

        let (class, _) = raised(|code| {
            code.class_op(NEW, "java/lang/Exception")
                .op(DUP)
                .invoke(INVOKESPECIAL, "java/lang/Exception", "<init>", "()V")
                .iconst(5)
                .invoke(
                    INVOKEVIRTUAL,
                    "java/lang/Throwable",
                    "getStackTraceElement",
                    "(I)Ljava/lang/StackTraceElement;",
                )
                .op(POP)
                .op(RETURN);
        });
        assert_eq!(class, "java/lang/IndexOutOfBoundsException");
    }

    #[test]
    fn clocks_advance() {
        let value = run("()J", |code| {
            code.invoke(INVOKESTATIC, "java/lang/System", "nanoTime", "()J")
                .invoke(INVOKESTATIC, "java/lang/System", "nanoTime", "()J")
                .op(LSUB)
                .op(LRETURN);
        })
        .unwrap()
        .unwrap();
        assert!(value.as_long().unwrap() <= 0);

        let millis = run("()J", |code| {
            code.invoke(INVOKESTATIC, "java/lang/System", "currentTimeMillis", "()J")
                .op(LRETURN);
        })
        .unwrap()
        .unwrap();
        assert!(millis.as_long().unwrap() > 1_600_000_000_000);
    }
}
