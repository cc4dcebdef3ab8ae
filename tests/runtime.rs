//! Integration tests for the concurrent behavior of the runtime.
//!
//! Every test boots a VM on the miniature core library from `common` and drives it from
//! several OS threads, either directly through runtime threads or through the executor.

mod common;

use std::{
    sync::{Arc, Barrier},
    thread,
    time::Duration,
};

use common::{body, call, define, runtime_thread, static_int, vm_with};
use jvmrt::{
    classfile::{Constant, FieldAccessFlags as F, MethodAccessFlags as M},
    disassembler::opcodes::*,
    prelude::*,
    runtime::Frame,
};

const STATIC: MethodAccessFlags = MethodAccessFlags::PUBLIC.union(MethodAccessFlags::STATIC);

fn counter(path: &MemoryClassPath) {
    define(path, "demo/Counter", "java/lang/Object", |writer| {
        writer
            .field(F::PUBLIC | F::STATIC, "runs", "I")
            .method(STATIC, "bump", "()V", body(|code| {
                code.field_op(GETSTATIC, "demo/Counter", "runs", "I")
                    .op(ICONST_1)
                    .op(IADD)
                    .field_op(PUTSTATIC, "demo/Counter", "runs", "I")
                    .op(RETURN);
            }))
            .unwrap();
    });
}

#[test]
fn static_initializer_runs_once_across_threads() {
    let vm = vm_with(|path| {
        counter(path);
        define(path, "demo/Slow", "java/lang/Object", |writer| {
            writer
                .method(M::STATIC, "<clinit>", "()V", body(|code| {
                    code.invoke(INVOKESTATIC, "demo/Counter", "bump", "()V")
                        .lconst(50)
                        .invoke(INVOKESTATIC, "java/lang/Thread", "sleep", "(J)V")
                        .op(RETURN);
                }))
                .unwrap();
        });
    });

    let barrier = Arc::new(Barrier::new(8));
    let workers: Vec<_> = (0..8)
        .map(|index| {
            let vm = Arc::clone(&vm);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut runtime = runtime_thread(&vm, &format!("init-{index}"));
                barrier.wait();
                vm.initialized_class(&mut runtime, "demo/Slow").map(|class| class.state())
            })
        })
        .collect();

    for worker in workers {
        assert_eq!(worker.join().unwrap().unwrap(), ClassState::Initialized);
    }
    assert_eq!(static_int(&vm, "demo/Counter", "runs"), 1);

    // terminal states short-circuit
    let mut runtime = runtime_thread(&vm, "late");
    let slow = vm.registry().resolve("demo/Slow").unwrap();
    assert_eq!(slow.initialize(&mut runtime).unwrap(), ClassState::Initialized);
    assert_eq!(static_int(&vm, "demo/Counter", "runs"), 1);
}

#[test]
fn self_referential_initializer_does_not_deadlock() {
    let vm = vm_with(|path| {
        define(path, "demo/Selfish", "java/lang/Object", |writer| {
            writer
                .constant_field(F::PUBLIC | F::STATIC | F::FINAL, "BASE", "I", Constant::Integer(41))
                .unwrap()
                .field(F::PUBLIC | F::STATIC, "cached", "I")
                .method(STATIC, "next", "()I", body(|code| {
                    code.field_op(GETSTATIC, "demo/Selfish", "BASE", "I")
                        .op(ICONST_1)
                        .op(IADD)
                        .op(IRETURN);
                }))
                .unwrap()
                .method(M::STATIC, "<clinit>", "()V", body(|code| {
                    code.invoke(INVOKESTATIC, "demo/Selfish", "next", "()I")
                        .field_op(PUTSTATIC, "demo/Selfish", "cached", "I")
                        .op(RETURN);
                }))
                .unwrap();
        });
    });

    let mut runtime = runtime_thread(&vm, "main");
    let class = vm.initialized_class(&mut runtime, "demo/Selfish").unwrap();
    assert_eq!(class.state(), ClassState::Initialized);
    assert_eq!(static_int(&vm, "demo/Selfish", "cached"), 42);
}

#[test]
fn failed_super_initialization_is_terminal() {
    let vm = vm_with(|path| {
        counter(path);
        define(path, "demo/Base", "java/lang/Object", |writer| {
            writer
                .method(M::STATIC, "<clinit>", "()V", body(|code| {
                    code.invoke(INVOKESTATIC, "demo/Counter", "bump", "()V")
                        .class_op(NEW, "java/lang/RuntimeException")
                        .op(DUP)
                        .ldc_string("base")
                        .invoke(INVOKESPECIAL, "java/lang/RuntimeException", "<init>", "(Ljava/lang/String;)V")
                        .op(ATHROW);
                }))
                .unwrap();
        });
        define(path, "demo/Child", "demo/Base", |_| {});
        define(path, "demo/Sibling", "demo/Base", |_| {});
    });

    let mut runtime = runtime_thread(&vm, "main");
    let error = vm.initialized_class(&mut runtime, "demo/Child").unwrap_err();
    let thrown = error.exception().unwrap();
    assert_eq!(thrown.describe(), "java.lang.RuntimeException: base");

    let error = vm.initialized_class(&mut runtime, "demo/Sibling").unwrap_err();
    assert!(matches!(error, Error::InitializationFailed(ref name) if name == "demo/Base"));
    let error = vm.initialized_class(&mut runtime, "demo/Child").unwrap_err();
    assert!(matches!(error, Error::InitializationFailed(ref name) if name == "demo/Child"));

    for name in ["demo/Base", "demo/Child", "demo/Sibling"] {
        let class = vm.registry().get(name).unwrap();
        assert_eq!(class.state(), ClassState::FailedInitialization, "{name}");
    }
    assert_eq!(static_int(&vm, "demo/Counter", "runs"), 1);
}

#[test]
fn synchronized_methods_serialize_updates() {
    let vm = vm_with(|path| {
        counter(path);
        define(path, "demo/Shared", "java/lang/Object", |writer| {
            let mut work = Bytecode::new();
            let (check, done) = (work.label(), work.label());
            work.bind(check)
                .op(ILOAD_0)
                .jump(IFLE, done)
                .invoke(INVOKESTATIC, "demo/Shared", "bump", "()V")
                .op(IINC)
                .u8(0)
                .u8(0xFF)
                .jump(GOTO, check)
                .bind(done)
                .op(RETURN);

            writer
                .method(STATIC | M::SYNCHRONIZED, "bump", "()V", body(|code| {
                    code.invoke(INVOKESTATIC, "demo/Counter", "bump", "()V")
                        .op(RETURN);
                }))
                .unwrap()
                .method(STATIC, "work", "(I)V", work)
                .unwrap();
        });
    });

    let workers: Vec<_> = (0..4)
        .map(|index| {
            let vm = Arc::clone(&vm);
            thread::spawn(move || {
                let mut runtime = runtime_thread(&vm, &format!("worker-{index}"));
                call(&mut runtime, "demo/Shared", "work", "(I)V", vec![Value::Int(500)])
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap().unwrap();
    }
    assert_eq!(static_int(&vm, "demo/Counter", "runs"), 2000);
}

#[test]
fn monitor_of_a_throwing_synchronized_method_is_released() {
    let vm = vm_with(|path| {
        define(path, "demo/Locked", "java/lang/Object", |writer| {
            writer
                .method(STATIC | M::SYNCHRONIZED, "explode", "()V", body(|code| {
                    code.op(ICONST_1).op(ICONST_0).op(IDIV).op(POP).op(RETURN);
                }))
                .unwrap();
        });
    });

    let mut runtime = runtime_thread(&vm, "main");
    let error = call(&mut runtime, "demo/Locked", "explode", "()V", vec![]).unwrap_err();
    assert_eq!(error.exception().unwrap().class().name(), "java/lang/ArithmeticException");

    let class = vm.registry().resolve("demo/Locked").unwrap();
    let mirror = vm.class_mirror(&class).unwrap();
    let contender = thread::spawn(move || {
        let id = ThreadId::next();
        let acquired = mirror.monitor().enter(id, 1_000);
        if acquired {
            mirror.monitor().exit(id).unwrap();
        }
        acquired
    });
    assert!(contender.join().unwrap());
}

#[test]
fn throwing_synchronized_instance_method_releases_its_receiver() {
    let vm = vm_with(|path| {
        define(path, "demo/Guarded", "java/lang/Object", |writer| {
            writer
                .method(M::PUBLIC | M::SYNCHRONIZED, "explode", "()V", body(|code| {
                    code.op(ICONST_1).op(ICONST_0).op(IDIV).op(POP).op(RETURN);
                }))
                .unwrap();
        });
    });

    let mut runtime = runtime_thread(&vm, "main");
    let receiver = vm.new_object(&mut runtime, "demo/Guarded").unwrap();
    let error = call(
        &mut runtime,
        "demo/Guarded",
        "explode",
        "()V",
        vec![Value::Reference(receiver.clone())],
    )
    .unwrap_err();
    assert_eq!(error.exception().unwrap().class().name(), "java/lang/ArithmeticException");
    assert_eq!(receiver.monitor().owner(), None);
    assert_eq!(receiver.monitor().hold_count(), 0);
    assert_eq!(runtime.depth(), 0);

    let contender = thread::spawn(move || {
        let id = ThreadId::next();
        let acquired = receiver.monitor().enter(id, 1_000);
        if acquired {
            receiver.monitor().exit(id).unwrap();
        }
        acquired
    });
    assert!(contender.join().unwrap());
}

#[test]
fn sleeping_initializer_reports_its_own_failure() {
    let vm = vm_with(|path| {
        define(path, "demo/Flaky", "java/lang/Object", |writer| {
            writer
                .method(M::STATIC, "<clinit>", "()V", body(|code| {
                    code.lconst(100)
                        .invoke(INVOKESTATIC, "java/lang/Thread", "sleep", "(J)V")
                        .op(ICONST_1)
                        .op(ICONST_0)
                        .op(IDIV)
                        .op(POP)
                        .op(RETURN);
                }))
                .unwrap();
        });
    });

    let barrier = Arc::new(Barrier::new(4));
    let workers: Vec<_> = (0..4)
        .map(|index| {
            let vm = Arc::clone(&vm);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut runtime = runtime_thread(&vm, &format!("init-{index}"));
                barrier.wait();
                vm.initialized_class(&mut runtime, "demo/Flaky").map(|class| class.state())
            })
        })
        .collect();

    let (mut arithmetic, mut failed) = (0, 0);
    for worker in workers {
        match worker.join().unwrap() {
            Err(Error::Exception(thrown)) => {
                assert_eq!(thrown.describe(), "java.lang.ArithmeticException: / by zero");
                arithmetic += 1;
            }
            Err(Error::InitializationFailed(name)) => {
                assert_eq!(name, "demo/Flaky");
                failed += 1;
            }
            other => panic!("unexpected initialization outcome: {other:?}"),
        }
    }
    assert_eq!((arithmetic, failed), (1, 3));
    let class = vm.registry().resolve("demo/Flaky").unwrap();
    assert_eq!(class.state(), ClassState::FailedInitialization);
}

#[test]
fn daemons_do_not_hold_the_program_open() {
    let vm = vm_with(|path| {
        define(path, "demo/Tasks", "java/lang/Object", |writer| {
            writer
                .method(STATIC, "forever", "()V", body(|code| {
                    let top = code.label();
                    code.bind(top)
                        .lconst(5)
                        .invoke(INVOKESTATIC, "java/lang/Thread", "sleep", "(J)V")
                        .jump(GOTO, top);
                }))
                .unwrap()
                .method(STATIC, "briefly", "()V", body(|code| {
                    code.lconst(20)
                        .invoke(INVOKESTATIC, "java/lang/Thread", "sleep", "(J)V")
                        .op(RETURN);
                }))
                .unwrap();
        });
    });

    let mut main = runtime_thread(&vm, "setup");
    let class = vm.initialized_class(&mut main, "demo/Tasks").unwrap();
    let forever = class.declared_method("forever", "()V").unwrap().clone();
    let briefly = class.declared_method("briefly", "()V").unwrap().clone();

    for index in 0..3 {
        let daemon = Thread::new(Arc::clone(&vm), ThreadHandle::new(&format!("daemon-{index}"), false, true));
        vm.executor()
            .start(daemon, Frame::new(class.clone(), forever.clone()))
            .unwrap();
    }
    vm.executor()
        .start(runtime_thread(&vm, "worker"), Frame::new(class, briefly))
        .unwrap();

    let results = vm.executor().await_all();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].thread.name(), "worker");
    assert!(vm.executor().is_closed());
    assert_eq!(vm.executor().daemons(), 3);
}

#[test]
fn main_joins_its_workers() {
    let vm = vm_with(|path| {
        counter(path);
        define(path, "demo/Worker", "java/lang/Thread", |writer| {
            writer
                .method(M::PUBLIC, "run", "()V", body(|code| {
                    code.invoke(INVOKESTATIC, "demo/Main", "bump", "()V")
                        .op(RETURN);
                }))
                .unwrap();
        });
        define(path, "demo/Main", "java/lang/Object", |writer| {
            // Worker[] workers = new Worker[3]; start all, then join all
            let mut main = Bytecode::new();
            let (start, started, join, joined) = (main.label(), main.label(), main.label(), main.label());
            main.op(ICONST_3)
                .class_op(ANEWARRAY, "demo/Worker")
                .op(ASTORE_1)
                .op(ICONST_0)
                .op(ISTORE_2)
                .bind(start)
                .op(ILOAD_2)
                .op(ICONST_3)
                .jump(IF_ICMPGE, started)
                .op(ALOAD_1)
                .op(ILOAD_2)
                .class_op(NEW, "demo/Worker")
                .op(DUP)
                .invoke(INVOKESPECIAL, "demo/Worker", "<init>", "()V")
                .op(DUP_X2)
                .op(AASTORE)
                .invoke(INVOKEVIRTUAL, "demo/Worker", "start", "()V")
                .op(IINC)
                .u8(2)
                .u8(1)
                .jump(GOTO, start)
                .bind(started)
                .op(ICONST_0)
                .op(ISTORE_2)
                .bind(join)
                .op(ILOAD_2)
                .op(ICONST_3)
                .jump(IF_ICMPGE, joined)
                .op(ALOAD_1)
                .op(ILOAD_2)
                .op(AALOAD)
                .invoke(INVOKEVIRTUAL, "demo/Worker", "join", "()V")
                .op(IINC)
                .u8(2)
                .u8(1)
                .jump(GOTO, join)
                .bind(joined)
                .field_op(GETSTATIC, "demo/Counter", "runs", "I")
                .field_op(PUTSTATIC, "demo/Main", "seen", "I")
                .op(RETURN)
                .max_locals(3);

            writer
                .field(F::PUBLIC | F::STATIC, "seen", "I")
                .method(STATIC | M::SYNCHRONIZED, "bump", "()V", body(|code| {
                    code.invoke(INVOKESTATIC, "demo/Counter", "bump", "()V")
                        .op(RETURN);
                }))
                .unwrap()
                .method(STATIC, "main", "([Ljava/lang/String;)V", main)
                .unwrap();
        });
    });

    vm.exec_main("demo/Main", &[]).unwrap();
    let results = vm.executor().await_all();
    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|result| result.error.is_none()));
    assert_eq!(static_int(&vm, "demo/Main", "seen"), 3);
}

#[test]
fn interrupt_wakes_a_sleeping_runtime_thread() {
    let vm = vm_with(|path| {
        define(path, "demo/Sleeper", "java/lang/Object", |writer| {
            writer
                .method(STATIC, "nap", "()V", body(|code| {
                    code.lconst(60_000)
                        .invoke(INVOKESTATIC, "java/lang/Thread", "sleep", "(J)V")
                        .op(RETURN);
                }))
                .unwrap();
        });
    });

    let mut sleeper = runtime_thread(&vm, "sleeper");
    let handle = sleeper.handle().clone();
    let napping = thread::spawn(move || call(&mut sleeper, "demo/Sleeper", "nap", "()V", vec![]));

    while handle.interrupts().watcher_count() == 0 {
        thread::sleep(Duration::from_millis(1));
    }
    handle.interrupt();

    let error = napping.join().unwrap().unwrap_err();
    assert_eq!(
        error.exception().unwrap().class().name(),
        "java/lang/InterruptedException"
    );
    assert!(!handle.interrupts().is_interrupted());
}
