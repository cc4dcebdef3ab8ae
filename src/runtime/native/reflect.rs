//! Bindings for reflective construction.

use crate::{
    classfile::FieldType,
    runtime::{
        native::{non_null_arg, ref_arg, NativeRegistry},
        Instance, Thread, Value,
    },
    Error, Result,
};

/// Registers the reflection bindings with `natives`
pub fn register(natives: &NativeRegistry) {
    natives.register(
        "sun/reflect/NativeConstructorAccessorImpl",
        "newInstance0",
        "(Ljava/lang/reflect/Constructor;[Ljava/lang/Object;)Ljava/lang/Object;",
        new_instance,
    );
}

/// Allocate an object of the constructor's class and run the constructor on it.
///
/// The constructor object names its class through `clazz` and the constructor through
/// `slot`, the declaration index of the method. Primitive parameters are unboxed from the
/// `value` field of their wrapper objects.
fn new_instance(thread: &mut Thread, args: Vec<Value>) -> Result<Option<Value>> {
    let constructor = non_null_arg(thread, &args, 0)?;
    let arguments = ref_arg(&args, 1)?;

    let class = match constructor.field("clazz", "Ljava/lang/Class;")? {
        Value::Reference(mirror) => mirror.as_class().cloned(),
        _ => None,
    }
    .ok_or_else(|| Error::Error("Constructor without declaring class".to_string()))?;
    let slot = constructor.field("slot", "I")?.as_int()?;
    let method = usize::try_from(slot)
        .ok()
        .and_then(|slot| class.method_by_index(slot))
        .filter(|method| method.name == "<init>")
        .cloned()
        .ok_or_else(|| Error::MethodNotFound {
            class: class.name().to_string(),
            name: "<init>".to_string(),
            descriptor: format!("#{slot}"),
        })?;

    let boxed = match &arguments {
        Some(array) => array.slots().clone(),
        None => Vec::new(),
    };
    if boxed.len() != method.signature.parameters.len() {
        let message = "wrong number of arguments";
        return Err(thread
            .vm()
            .raise(thread, "java/lang/IllegalArgumentException", Some(message)));
    }

    class.ensure_initialized(thread)?;
    let object = Instance::new(class.clone())?;

    let mut call = Vec::with_capacity(boxed.len() + 1);
    call.push(Value::Reference(object.clone()));
    for (parameter, value) in method.signature.parameters.iter().zip(boxed) {
        call.push(unbox(thread, parameter, value)?);
    }

    thread.invoke(class, method, call)?;
    Ok(Some(Value::Reference(object)))
}

fn unbox(thread: &Thread, parameter: &FieldType, value: Value) -> Result<Value> {
    if parameter.is_reference() {
        return Ok(value);
    }
    match value {
        Value::Reference(wrapper) => wrapper.field("value", &parameter.to_string()),
        _ => Err(thread
            .vm()
            .raise(thread, "java/lang/IllegalArgumentException", Some("argument type mismatch"))),
    }
}
