//! Linked classes.
//!
//! A [`Class`] is the link-time view of a loaded type: declared fields and methods, static
//! storage, the lazily linked super class and interfaces, the instance field slot layout and
//! the initialization state machine.
//!
//! # Resolution order
//!
//! Field and method resolution deliberately walk the hierarchy in different orders:
//!
//! - fields: own fields, then the *direct* interfaces in declaration order, then the super
//!   class (recursively)
//! - methods: own methods, then the super class chain, and only if that fails the
//!   interfaces (recursively through their own supers)
//!
//! Until a class is initialized its super class and interfaces are not linked yet; lookups
//! then resolve them by name through the registry, without initializing them.
//!
//! # Initialization
//!
//! [`Class::initialize`] implements the state machine
//! `NotInitialized -> Initializing -> Initialized | FailedInitialization`. The state is read
//! lock free on the fast path; transitions happen under the class lock, and everybody
//! waiting for an initialization in progress is woken when it ends. The initializing thread
//! itself may re-enter and observes `Initializing`.

use std::sync::{
    atomic::{AtomicU8, Ordering},
    Arc, Condvar, Mutex, OnceLock, Weak,
};

use log::{debug, warn};
use strum::{Display, EnumIter, FromRepr};

use crate::{
    classfile::{
        ClassAccessFlags, ClassFile, Code, Constant, ConstantPool, FieldAccessFlags, FieldInfo,
        FieldType, MethodAccessFlags, MethodDescriptor, MethodInfo, CLASS_INITIALIZER,
    },
    runtime::{ClassRegistry, InstanceRef, Thread, ThreadId, Value},
    Error, Result,
};

/// A shared reference to a linked class
pub type ClassRef = Arc<Class>;
/// A shared reference to a field of a class
pub type FieldRef = Arc<Field>;
/// A shared reference to a method of a class
pub type MethodRef = Arc<Method>;

/// Initialization state of a class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr, EnumIter)]
#[repr(u8)]
pub enum ClassState {
    /// Loaded, static initializer not run yet
    NotInitialized,
    /// A thread is running the initialization pass
    Initializing,
    /// Ready for use
    Initialized,
    /// The initialization pass failed; the class can never be used
    FailedInitialization,
}

impl ClassState {
    /// True for the states no transition leaves
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, ClassState::Initialized | ClassState::FailedInitialization)
    }
}

/// Well-known classes the runtime special cases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialClassId {
    /// Any other class
    Unknown,
    /// `java/lang/Object`
    Object,
    /// `java/lang/String`
    String,
    /// `java/lang/Class`
    Class,
    /// `java/lang/Thread`
    Thread,
}

impl SpecialClassId {
    /// Identify a class by its binary name
    #[must_use]
    pub fn from_name(name: &str) -> SpecialClassId {
        match name {
            "java/lang/Object" => SpecialClassId::Object,
            "java/lang/String" => SpecialClassId::String,
            "java/lang/Class" => SpecialClassId::Class,
            "java/lang/Thread" => SpecialClassId::Thread,
            _ => SpecialClassId::Unknown,
        }
    }

    /// True for classes without special treatment
    #[must_use]
    pub fn is_unknown(self) -> bool {
        self == SpecialClassId::Unknown
    }
}

/// Origin of a class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    /// Decoded from a class file
    Regular,
    /// Synthesized array class, named by its descriptor (`[I`, `[Ljava/lang/String;`)
    Array,
    /// Synthesized primitive class (`int`, `boolean`, ...)
    Primitive,
}

/// A field of a linked class.
#[derive(Debug)]
pub struct Field {
    /// Field name
    pub name: String,
    /// Field descriptor
    pub descriptor: String,
    /// Parsed descriptor
    pub field_type: FieldType,
    /// Access flags
    pub access_flags: FieldAccessFlags,
    /// Constant pool index of the `ConstantValue` attribute
    pub constant_value: Option<u16>,
    /// Declaration index in the class file
    pub index: usize,
    slot: OnceLock<usize>,
}

impl Field {
    fn from_info(info: &FieldInfo) -> Field {
        Field {
            name: info.name.clone(),
            descriptor: info.descriptor.clone(),
            field_type: info.field_type.clone(),
            access_flags: info.access_flags,
            constant_value: info.constant_value,
            index: info.index,
            slot: OnceLock::new(),
        }
    }

    /// True for static fields
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.access_flags.contains(FieldAccessFlags::STATIC)
    }

    /// Storage slot: index into the static storage of the declaring class for static
    /// fields, into the flat instance storage otherwise.
    ///
    /// # Errors
    /// Returns an error for instance fields whose class has not assigned slots yet.
    pub fn slot(&self) -> Result<usize> {
        self.slot.get().copied().ok_or_else(|| {
            Error::Error(format!("Slot of field {}:{} is not assigned", self.name, self.descriptor))
        })
    }
}

/// A method of a linked class.
#[derive(Debug)]
pub struct Method {
    /// Method name
    pub name: String,
    /// Method descriptor
    pub descriptor: String,
    /// Parsed descriptor
    pub signature: MethodDescriptor,
    /// Access flags
    pub access_flags: MethodAccessFlags,
    /// Body, absent for native and abstract methods
    pub code: Option<Code>,
    /// Declaration index in the class file
    pub index: usize,
}

impl Method {
    fn from_info(info: &MethodInfo) -> Method {
        Method {
            name: info.name.clone(),
            descriptor: info.descriptor.clone(),
            signature: info.signature.clone(),
            access_flags: info.access_flags,
            code: info.code.clone(),
            index: info.index,
        }
    }

    /// True for static methods
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::STATIC)
    }

    /// True for native methods
    #[must_use]
    pub fn is_native(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::NATIVE)
    }

    /// True for abstract methods
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::ABSTRACT)
    }

    /// True for synchronized methods
    #[must_use]
    pub fn is_synchronized(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::SYNCHRONIZED)
    }

    /// Number of argument values, including the receiver of instance methods
    #[must_use]
    pub fn arg_count(&self) -> usize {
        self.signature.parameters.len() + usize::from(!self.is_static())
    }

    /// Number of local variable slots the arguments occupy
    #[must_use]
    pub fn arg_slots(&self) -> usize {
        self.signature.parameter_slots() + usize::from(!self.is_static())
    }

    /// The method body
    ///
    /// # Errors
    /// Returns an error for native and abstract methods.
    pub fn code(&self) -> Result<&Code> {
        self.code
            .as_ref()
            .ok_or_else(|| Error::Error(format!("Method {}{} has no code", self.name, self.descriptor)))
    }
}

#[derive(Debug)]
struct InitCell {
    state: ClassState,
    initializer: Option<ThreadId>,
}

/// A linked class.
pub struct Class {
    name: String,
    id: SpecialClassId,
    kind: ClassKind,
    access_flags: ClassAccessFlags,
    super_name: Option<String>,
    interface_names: Vec<String>,
    pool: ConstantPool,
    fields: Vec<FieldRef>,
    methods: Vec<MethodRef>,
    source_file: Option<String>,
    registry: Weak<ClassRegistry>,

    state: AtomicU8,
    init: Mutex<InitCell>,
    init_cond: Condvar,

    super_class: OnceLock<ClassRef>,
    interfaces: OnceLock<Vec<ClassRef>>,

    slot_lock: Mutex<()>,
    template: OnceLock<Vec<Value>>,
    statics: Mutex<Vec<Value>>,
    mirror: OnceLock<InstanceRef>,
}

impl Class {
    /// Build a class from a decoded class file
    #[must_use]
    pub fn from_file(file: ClassFile, registry: Weak<ClassRegistry>) -> Class {
        let fields: Vec<FieldRef> = file.fields().iter().map(|f| Arc::new(Field::from_info(f))).collect();
        let mut statics = Vec::new();
        for field in fields.iter().filter(|f| f.is_static()) {
            let _ = field.slot.set(statics.len());
            statics.push(Value::default_for(&field.field_type));
        }

        Class {
            name: file.this_class().to_string(),
            id: SpecialClassId::from_name(file.this_class()),
            kind: ClassKind::Regular,
            access_flags: file.access_flags(),
            super_name: file.super_class().map(str::to_string),
            interface_names: file.interfaces().to_vec(),
            fields,
            methods: file.methods().iter().map(|m| Arc::new(Method::from_info(m))).collect(),
            source_file: file.source_file().map(str::to_string),
            pool: file.constant_pool().clone(),
            registry,
            state: AtomicU8::new(ClassState::NotInitialized as u8),
            init: Mutex::new(InitCell {
                state: ClassState::NotInitialized,
                initializer: None,
            }),
            init_cond: Condvar::new(),
            super_class: OnceLock::new(),
            interfaces: OnceLock::new(),
            slot_lock: Mutex::new(()),
            template: OnceLock::new(),
            statics: Mutex::new(statics),
            mirror: OnceLock::new(),
        }
    }

    fn synthetic(name: &str, kind: ClassKind, registry: Weak<ClassRegistry>) -> Class {
        Class {
            name: name.to_string(),
            id: SpecialClassId::Unknown,
            kind,
            access_flags: ClassAccessFlags::PUBLIC | ClassAccessFlags::FINAL | ClassAccessFlags::ABSTRACT,
            super_name: None,
            interface_names: Vec::new(),
            pool: ConstantPool::from_entries(Vec::new()),
            fields: Vec::new(),
            methods: Vec::new(),
            source_file: None,
            registry,
            state: AtomicU8::new(ClassState::Initialized as u8),
            init: Mutex::new(InitCell {
                state: ClassState::Initialized,
                initializer: None,
            }),
            init_cond: Condvar::new(),
            super_class: OnceLock::new(),
            interfaces: OnceLock::from(Vec::new()),
            slot_lock: Mutex::new(()),
            template: OnceLock::from(Vec::new()),
            statics: Mutex::new(Vec::new()),
            mirror: OnceLock::new(),
        }
    }

    /// Synthesize the array class named by `descriptor`, linked to `object`
    #[must_use]
    pub fn array(descriptor: &str, object: ClassRef, registry: Weak<ClassRegistry>) -> Class {
        let mut class = Self::synthetic(descriptor, ClassKind::Array, registry);
        class.super_name = Some(object.name().to_string());
        class.interface_names = vec!["java/lang/Cloneable".to_string(), "java/io/Serializable".to_string()];
        let _ = class.super_class.set(object);
        class
    }

    /// Synthesize the primitive class `name`
    #[must_use]
    pub fn primitive(name: &str, registry: Weak<ClassRegistry>) -> Class {
        Self::synthetic(name, ClassKind::Primitive, registry)
    }

    /// Binary name, e.g. `java/lang/String` or `[I`
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Special identity used for fast-path checks
    #[must_use]
    pub fn id(&self) -> SpecialClassId {
        self.id
    }

    /// Origin of the class
    #[must_use]
    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    /// True for array classes
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.kind == ClassKind::Array
    }

    /// True for primitive classes
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        self.kind == ClassKind::Primitive
    }

    /// True for interfaces
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.access_flags.contains(ClassAccessFlags::INTERFACE)
    }

    /// Class access flags
    #[must_use]
    pub fn access_flags(&self) -> ClassAccessFlags {
        self.access_flags
    }

    /// Name of the super class
    #[must_use]
    pub fn super_name(&self) -> Option<&str> {
        self.super_name.as_deref()
    }

    /// Names of the directly implemented interfaces
    #[must_use]
    pub fn interface_names(&self) -> &[String] {
        &self.interface_names
    }

    /// Descriptor of the element type of an array class, e.g. `I` for `[I`
    #[must_use]
    pub fn component_descriptor(&self) -> Option<&str> {
        if self.is_array() {
            self.name.get(1..)
        } else {
            None
        }
    }

    /// The constant pool
    #[must_use]
    pub fn constant_pool(&self) -> &ConstantPool {
        &self.pool
    }

    /// Declared fields
    #[must_use]
    pub fn fields(&self) -> &[FieldRef] {
        &self.fields
    }

    /// Declared methods
    #[must_use]
    pub fn methods(&self) -> &[MethodRef] {
        &self.methods
    }

    /// Source file name, if recorded
    #[must_use]
    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    /// A declared field
    #[must_use]
    pub fn declared_field(&self, name: &str, descriptor: &str) -> Option<&FieldRef> {
        self.fields
            .iter()
            .find(|f| f.name == name && f.descriptor == descriptor)
    }

    /// A declared method
    #[must_use]
    pub fn declared_method(&self, name: &str, descriptor: &str) -> Option<&MethodRef> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.descriptor == descriptor)
    }

    /// The method at declaration index `index`
    #[must_use]
    pub fn method_by_index(&self, index: usize) -> Option<&MethodRef> {
        self.methods.iter().find(|m| m.index == index)
    }

    /// The `java/lang/Class` mirror, once created
    #[must_use]
    pub fn mirror(&self) -> Option<&InstanceRef> {
        self.mirror.get()
    }

    /// Attach the mirror; returns the mirror that won if another thread was faster
    pub fn set_mirror(&self, mirror: InstanceRef) -> InstanceRef {
        self.mirror.get_or_init(|| mirror).clone()
    }

    fn registry(&self) -> Result<Arc<ClassRegistry>> {
        self.registry
            .upgrade()
            .ok_or_else(|| Error::Error("Class registry has been dropped".to_string()))
    }

    /// The linked super class, if initialization has linked it already
    #[must_use]
    pub fn linked_super(&self) -> Option<&ClassRef> {
        self.super_class.get()
    }

    /// The linked interfaces, if initialization has linked them already
    #[must_use]
    pub fn linked_interfaces(&self) -> Option<&[ClassRef]> {
        self.interfaces.get().map(Vec::as_slice)
    }

    /// The super class; resolved by name (not initialized) if not linked yet.
    ///
    /// # Errors
    /// Returns resolution errors of the super class.
    pub fn super_class(&self) -> Result<Option<ClassRef>> {
        if let Some(linked) = self.super_class.get() {
            return Ok(Some(linked.clone()));
        }
        match &self.super_name {
            Some(name) => Ok(Some(self.registry()?.resolve(name)?)),
            None => Ok(None),
        }
    }

    /// The direct interfaces; resolved by name (not initialized) if not linked yet.
    ///
    /// # Errors
    /// Returns resolution errors of the interfaces.
    pub fn interfaces(&self) -> Result<Vec<ClassRef>> {
        if let Some(linked) = self.interfaces.get() {
            return Ok(linked.clone());
        }
        let registry = self.registry()?;
        self.interface_names
            .iter()
            .map(|name| registry.resolve(name))
            .collect()
    }

    /// Resolve a field: own fields, direct interfaces, then the super class.
    ///
    /// # Errors
    /// Returns resolution errors of classes in the hierarchy.
    pub fn resolve_field(self: &Arc<Self>, name: &str, descriptor: &str) -> Result<Option<(ClassRef, FieldRef)>> {
        if let Some(field) = self.declared_field(name, descriptor) {
            return Ok(Some((self.clone(), field.clone())));
        }

        for interface in self.interfaces()? {
            if let Some(field) = interface.declared_field(name, descriptor) {
                let field = field.clone();
                return Ok(Some((interface, field)));
            }
        }

        match self.super_class()? {
            Some(super_class) => super_class.resolve_field(name, descriptor),
            None => Ok(None),
        }
    }

    /// Resolve a method: own methods, the super class chain, then the interfaces.
    ///
    /// # Errors
    /// Returns resolution errors of classes in the hierarchy.
    pub fn resolve_method(self: &Arc<Self>, name: &str, descriptor: &str) -> Result<Option<(ClassRef, MethodRef)>> {
        if let Some(method) = self.declared_method(name, descriptor) {
            return Ok(Some((self.clone(), method.clone())));
        }

        if let Some(super_class) = self.super_class()? {
            if let Some(found) = super_class.resolve_method(name, descriptor)? {
                return Ok(Some(found));
            }
        }

        for interface in self.interfaces()? {
            if let Some(found) = interface.resolve_method(name, descriptor)? {
                return Ok(Some(found));
            }
        }

        Ok(None)
    }

    /// True if this class is `name` or inherits from it through the super class chain
    ///
    /// # Errors
    /// Returns resolution errors of classes in the hierarchy.
    pub fn is_subclass_of(&self, name: &str) -> Result<bool> {
        if self.name == name {
            return Ok(true);
        }
        match self.super_class()? {
            Some(super_class) => super_class.is_subclass_of(name),
            None => Ok(false),
        }
    }

    /// True if values of this class can be assigned to variables of type `target`.
    ///
    /// Covers the super class chain, all (transitively) implemented interfaces and array
    /// covariance; arrays are `Cloneable` and `Serializable`.
    ///
    /// # Errors
    /// Returns resolution errors of classes in the hierarchy.
    pub fn is_assignable_to(&self, target: &str) -> Result<bool> {
        if self.name == target {
            return Ok(true);
        }

        if let Some(component) = self.component_descriptor() {
            if matches!(target, "java/lang/Object" | "java/lang/Cloneable" | "java/io/Serializable") {
                return Ok(true);
            }
            let Some(target_component) = target.strip_prefix('[') else {
                return Ok(false);
            };
            return match (class_name_of(component), class_name_of(target_component)) {
                (Some(source), Some(target)) if is_reference(component) && is_reference(target_component) => {
                    self.registry()?.resolve(source)?.is_assignable_to(target)
                }
                _ => Ok(component == target_component),
            };
        }

        if let Some(super_class) = self.super_class()? {
            if super_class.is_assignable_to(target)? {
                return Ok(true);
            }
        }
        for interface in self.interfaces()? {
            if interface.is_assignable_to(target)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Assign instance field slots, memoized.
    ///
    /// Slots are contiguous across the inheritance chain: the first own instance field of a
    /// class takes the slot after the last one of its super class. Returns the total number
    /// of instance slots including inherited ones.
    ///
    /// # Errors
    /// Returns resolution errors of the super class chain.
    pub fn assign_instance_slots(&self) -> Result<usize> {
        if let Some(template) = self.template.get() {
            return Ok(template.len());
        }

        let _guard = lock!(self.slot_lock);
        if let Some(template) = self.template.get() {
            return Ok(template.len());
        }

        let mut template = match self.super_class()? {
            Some(super_class) => super_class.instance_template()?,
            None => Vec::new(),
        };
        for field in self.fields.iter().filter(|f| !f.is_static()) {
            let _ = field.slot.set(template.len());
            template.push(Value::default_for(&field.field_type));
        }

        let total = template.len();
        debug!("Assigned {} instance slots for {}", total, self.name);
        let _ = self.template.set(template);
        Ok(total)
    }

    /// Total number of instance slots, assigning them if necessary
    ///
    /// # Errors
    /// Returns resolution errors of the super class chain.
    pub fn total_instance_slots(&self) -> Result<usize> {
        self.assign_instance_slots()
    }

    /// Default values of all instance slots
    ///
    /// # Errors
    /// Returns resolution errors of the super class chain.
    pub fn instance_template(&self) -> Result<Vec<Value>> {
        self.assign_instance_slots()?;
        Ok(self.template.get().cloned().unwrap_or_default())
    }

    /// Read a static field of this class
    ///
    /// # Errors
    /// Returns an error if `field` is not a static field of this class.
    pub fn get_static(&self, field: &Field) -> Result<Value> {
        let slot = field.slot()?;
        lock!(self.statics).get(slot).cloned().ok_or(Error::OutOfBounds)
    }

    /// Write a static field of this class
    ///
    /// # Errors
    /// Returns an error if `field` is not a static field of this class.
    pub fn set_static(&self, field: &Field, value: Value) -> Result<()> {
        let slot = field.slot()?;
        match lock!(self.statics).get_mut(slot) {
            Some(target) => {
                *target = value;
                Ok(())
            }
            None => Err(Error::OutOfBounds),
        }
    }

    /// Current initialization state
    #[must_use]
    pub fn state(&self) -> ClassState {
        ClassState::from_repr(self.state.load(Ordering::Acquire)).unwrap_or(ClassState::NotInitialized)
    }

    /// Drive the initialization state machine on behalf of `thread`.
    ///
    /// Returns the state observed at the end: a terminal state, or `Initializing` when
    /// `thread` is itself running the initialization pass. The first caller of a failing
    /// pass receives the underlying error; the class is `FailedInitialization` from then on.
    ///
    /// # Errors
    /// Returns the error that made the initialization pass fail.
    pub fn initialize(self: &Arc<Self>, thread: &mut Thread) -> Result<ClassState> {
        let state = self.state();
        if state.is_terminal() {
            return Ok(state);
        }

        let mut cell = lock!(self.init);
        match cell.state {
            ClassState::NotInitialized => {
                cell.state = ClassState::Initializing;
                cell.initializer = Some(thread.id());
                self.state.store(ClassState::Initializing as u8, Ordering::Release);
                drop(cell);

                debug!("Initializing {} on thread {}", self.name, thread.id());
                let result = self.run_initializer(thread);
                let state = if result.is_ok() {
                    ClassState::Initialized
                } else {
                    ClassState::FailedInitialization
                };

                let mut cell = lock!(self.init);
                cell.state = state;
                cell.initializer = None;
                self.state.store(state as u8, Ordering::Release);
                self.init_cond.notify_all();
                drop(cell);

                match result {
                    Ok(()) => {
                        debug!("Initialized {}", self.name);
                        Ok(state)
                    }
                    Err(error) => {
                        warn!("Initialization of {} failed: {}", self.name, error);
                        Err(error)
                    }
                }
            }
            ClassState::Initializing => {
                if cell.initializer == Some(thread.id()) {
                    return Ok(ClassState::Initializing);
                }
                while cell.state == ClassState::Initializing {
                    cell = cond_wait!(self.init_cond, cell);
                }
                Ok(cell.state)
            }
            other => Ok(other),
        }
    }

    /// Initialize the class and fail unless it is usable.
    ///
    /// # Errors
    /// Returns the error of a failing initialization pass, or
    /// [`Error::InitializationFailed`] for a class that failed before.
    pub fn ensure_initialized(self: &Arc<Self>, thread: &mut Thread) -> Result<()> {
        match self.initialize(thread)? {
            ClassState::FailedInitialization => Err(Error::InitializationFailed(self.name.clone())),
            _ => Ok(()),
        }
    }

    fn run_initializer(self: &Arc<Self>, thread: &mut Thread) -> Result<()> {
        self.assign_instance_slots()?;

        for field in self.fields.iter().filter(|f| f.is_static()) {
            let Some(index) = field.constant_value else {
                continue;
            };
            let value = match self.pool.get(index)? {
                Constant::Integer(value) => Value::Int(*value),
                Constant::Long(value) => Value::Long(*value),
                Constant::Float(value) => Value::Float(*value),
                Constant::Double(value) => Value::Double(*value),
                Constant::String { .. } => {
                    let text = self.pool.string(index)?;
                    Value::Reference(thread.vm().intern(text)?)
                }
                other => {
                    return Err(malformed_error!(
                        "Invalid constant value {:?} for {}.{}",
                        other,
                        self.name,
                        field.name
                    ))
                }
            };
            self.set_static(field, value)?;
        }

        if let Some(name) = &self.super_name {
            let super_class = self.registry()?.resolve(name)?;
            super_class.ensure_initialized(thread)?;
            let _ = self.super_class.set(super_class);
        }

        let registry = self.registry()?;
        let mut interfaces = Vec::with_capacity(self.interface_names.len());
        for name in &self.interface_names {
            let interface = registry.resolve(name)?;
            interface.ensure_initialized(thread)?;
            interfaces.push(interface);
        }
        let _ = self.interfaces.set(interfaces);

        if let Some(clinit) = self.declared_method(CLASS_INITIALIZER, "()V") {
            thread.invoke(self.clone(), clinit.clone(), Vec::new())?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

fn is_reference(descriptor: &str) -> bool {
    descriptor.starts_with('L') || descriptor.starts_with('[')
}

/// Class name denoted by a field descriptor: `Lfoo/Bar;` -> `foo/Bar`, `[I` -> `[I`,
/// primitives map to their primitive class names.
#[must_use]
pub fn class_name_of(descriptor: &str) -> Option<&str> {
    if let Some(name) = descriptor.strip_prefix('L') {
        return name.strip_suffix(';');
    }
    if descriptor.starts_with('[') {
        return Some(descriptor);
    }
    Some(match descriptor {
        "B" => "byte",
        "C" => "char",
        "D" => "double",
        "F" => "float",
        "I" => "int",
        "J" => "long",
        "S" => "short",
        "Z" => "boolean",
        "V" => "void",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_round_trips_through_repr() {
        use strum::IntoEnumIterator;
        for state in ClassState::iter() {
            assert_eq!(ClassState::from_repr(state as u8), Some(state));
        }
        assert!(ClassState::Initialized.is_terminal());
        assert!(ClassState::FailedInitialization.is_terminal());
        assert!(!ClassState::Initializing.is_terminal());
        assert_eq!(ClassState::FailedInitialization.to_string(), "FailedInitialization");
    }

    #[test]
    fn special_ids() {
        assert_eq!(SpecialClassId::from_name("java/lang/Thread"), SpecialClassId::Thread);
        assert!(SpecialClassId::from_name("demo/Main").is_unknown());
    }

    #[test]
    fn descriptor_class_names() {
        assert_eq!(class_name_of("Ljava/lang/String;"), Some("java/lang/String"));
        assert_eq!(class_name_of("[[I"), Some("[[I"));
        assert_eq!(class_name_of("Z"), Some("boolean"));
        assert_eq!(class_name_of("Q"), None);
    }
}
