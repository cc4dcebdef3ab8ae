//! Heap objects.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, OnceLock},
};

use crate::{
    runtime::{ClassRef, Monitor, StackTraceElement, ThreadHandle, Value},
    Error, Result,
};

/// A shared reference to a heap object
pub type InstanceRef = Arc<Instance>;

/// Runtime data attached to special objects.
///
/// Set at most once per object.
#[derive(Debug, Clone)]
pub enum VmData {
    /// The class represented by a `java/lang/Class` mirror
    Class(ClassRef),
    /// The runtime thread behind a `java/lang/Thread` object
    Thread(Arc<ThreadHandle>),
    /// Stack trace captured for a throwable
    Trace(Vec<StackTraceElement>),
}

/// An object or array.
///
/// Objects store their instance fields in a flat slot array indexed by the slot ids the
/// class assigned; arrays store their elements in the same storage.
pub struct Instance {
    class: ClassRef,
    slots: Mutex<Vec<Value>>,
    monitor: Monitor,
    vm_data: OnceLock<VmData>,
}

impl Instance {
    /// Allocate an object with every field at its default value.
    ///
    /// # Errors
    /// Returns an error if the instance field slots of `class` can not be assigned.
    pub fn new(class: ClassRef) -> Result<InstanceRef> {
        let template = class.instance_template()?;
        Ok(Arc::new(Instance {
            class,
            slots: Mutex::new(template),
            monitor: Monitor::new(),
            vm_data: OnceLock::new(),
        }))
    }

    /// Allocate an array of `class` holding `elements`
    #[must_use]
    pub fn new_array(class: ClassRef, elements: Vec<Value>) -> InstanceRef {
        Arc::new(Instance {
            class,
            slots: Mutex::new(elements),
            monitor: Monitor::new(),
            vm_data: OnceLock::new(),
        })
    }

    /// Field-by-field copy with a fresh monitor and no runtime data (`Object.clone`)
    #[must_use]
    pub fn shallow_copy(&self) -> InstanceRef {
        let slots = lock!(self.slots).clone();
        Instance::new_array(self.class.clone(), slots)
    }

    /// The runtime class
    #[must_use]
    pub fn class(&self) -> &ClassRef {
        &self.class
    }

    /// The intrinsic lock of this object
    #[must_use]
    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    /// True if this object is an array
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.class.is_array()
    }

    /// Read the field or element at `slot`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a slot outside of the storage.
    pub fn get(&self, slot: usize) -> Result<Value> {
        lock!(self.slots).get(slot).cloned().ok_or(Error::OutOfBounds)
    }

    /// Write the field or element at `slot`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a slot outside of the storage.
    pub fn set(&self, slot: usize, value: Value) -> Result<()> {
        match lock!(self.slots).get_mut(slot) {
            Some(target) => {
                *target = value;
                Ok(())
            }
            None => Err(Error::OutOfBounds),
        }
    }

    /// Number of slots: the element count for arrays, the instance field count otherwise
    #[must_use]
    pub fn len(&self) -> usize {
        lock!(self.slots).len()
    }

    /// True if the object has no slots
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Direct access to the slot storage, used by bulk array operations
    pub fn slots(&self) -> MutexGuard<'_, Vec<Value>> {
        lock!(self.slots)
    }

    /// Read a field by name and descriptor, resolved from the runtime class.
    ///
    /// # Errors
    /// Returns [`Error::FieldNotFound`] if the class hierarchy has no such instance field.
    pub fn field(&self, name: &str, descriptor: &str) -> Result<Value> {
        let slot = self.field_slot(name, descriptor)?;
        self.get(slot)
    }

    /// Write a field by name and descriptor.
    ///
    /// # Errors
    /// Returns [`Error::FieldNotFound`] if the class hierarchy has no such instance field.
    pub fn set_field(&self, name: &str, descriptor: &str, value: Value) -> Result<()> {
        let slot = self.field_slot(name, descriptor)?;
        self.set(slot, value)
    }

    fn field_slot(&self, name: &str, descriptor: &str) -> Result<usize> {
        match self.class.resolve_field(name, descriptor)? {
            Some((_, field)) if !field.is_static() => field.slot(),
            _ => Err(Error::FieldNotFound {
                class: self.class.name().to_string(),
                name: name.to_string(),
                descriptor: descriptor.to_string(),
            }),
        }
    }

    /// Runtime data attached to this object
    #[must_use]
    pub fn vm_data(&self) -> Option<&VmData> {
        self.vm_data.get()
    }

    /// Attach runtime data; returns false if data was already attached
    pub fn set_vm_data(&self, data: VmData) -> bool {
        self.vm_data.set(data).is_ok()
    }

    /// The class represented by this `java/lang/Class` mirror
    #[must_use]
    pub fn as_class(&self) -> Option<&ClassRef> {
        match self.vm_data.get() {
            Some(VmData::Class(class)) => Some(class),
            _ => None,
        }
    }

    /// The runtime thread behind this `java/lang/Thread` object
    #[must_use]
    pub fn as_thread(&self) -> Option<&Arc<ThreadHandle>> {
        match self.vm_data.get() {
            Some(VmData::Thread(thread)) => Some(thread),
            _ => None,
        }
    }

    /// Captured stack trace of a throwable
    #[must_use]
    pub fn stack_trace(&self) -> Option<&[StackTraceElement]> {
        match self.vm_data.get() {
            Some(VmData::Trace(trace)) => Some(trace),
            _ => None,
        }
    }

    /// Decode a `java/lang/String` through its `value` character array
    #[must_use]
    pub fn string_value(&self) -> Option<String> {
        let Ok(Value::Reference(chars)) = self.field("value", "[C") else {
            return None;
        };
        let units: Vec<u16> = chars
            .slots()
            .iter()
            .map(|unit| match unit {
                Value::Int(code) => *code as u16,
                _ => 0,
            })
            .collect();
        Some(String::from_utf16_lossy(&units))
    }

    /// `ClassName: message` rendering of a throwable, `ClassName` for any other object
    #[must_use]
    pub fn describe(&self) -> String {
        let name = self.class.name().replace('/', ".");
        let message = match self.field("detailMessage", "Ljava/lang/String;") {
            Ok(Value::Reference(message)) => message.string_value(),
            _ => None,
        };

        match message {
            Some(message) => format!("{name}: {message}"),
            None => name,
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class.name())
            .field("slots", &self.len())
            .finish_non_exhaustive()
    }
}
