//! Bindings for `java/io`.

use std::io::Write;

use crate::{
    runtime::{
        native::{int_arg, non_null_arg, NativeRegistry},
        Thread, Value,
    },
    Error, Result,
};

/// Registers the `java/io` bindings with `natives`
pub fn register(natives: &NativeRegistry) {
    natives.register("java/io/FileOutputStream", "writeBytes", "([BIIZ)V", file_output_write_bytes);
}

/// `FileOutputStream.writeBytes(byte[], int, int, boolean)` for the standard output and
/// error descriptors
fn file_output_write_bytes(thread: &mut Thread, args: Vec<Value>) -> Result<Option<Value>> {
    let stream = non_null_arg(thread, &args, 0)?;
    let bytes = non_null_arg(thread, &args, 1)?;
    let offset = int_arg(&args, 2)?;
    let length = int_arg(&args, 3)?;

    let fd = match stream.field("fd", "Ljava/io/FileDescriptor;")? {
        Value::Reference(descriptor) => descriptor.field("fd", "I")?.as_int()?,
        _ => return Err(thread.vm().raise(thread, "java/lang/NullPointerException", None)),
    };

    let total = bytes.len();
    let range = usize::try_from(offset)
        .ok()
        .zip(usize::try_from(length).ok())
        .and_then(|(offset, length)| Some(offset..offset.checked_add(length)?))
        .filter(|range| range.end <= total);
    let Some(range) = range else {
        let message = format!("Range [{offset}, {offset} + {length}) out of bounds for length {total}");
        return Err(thread
            .vm()
            .raise(thread, "java/lang/IndexOutOfBoundsException", Some(&message)));
    };

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    let data = bytes.slots()[range]
        .iter()
        .map(|value| value.as_int().map(|byte| byte as u8))
        .collect::<Result<Vec<u8>>>()?;

    let written = match fd {
        1 => {
            let mut out = std::io::stdout().lock();
            out.write_all(&data).and_then(|()| out.flush())
        }
        2 => {
            let mut out = std::io::stderr().lock();
            out.write_all(&data).and_then(|()| out.flush())
        }
        other => return Err(Error::Unsupported(format!("write to file descriptor {other}"))),
    };

    if let Err(error) = written {
        let message = error.to_string();
        return Err(thread.vm().raise(thread, "java/io/IOException", Some(&message)));
    }
    Ok(None)
}
