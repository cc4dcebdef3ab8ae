//! Class registry and resolver.
//!
//! The [`ClassRegistry`] owns every linked class of one virtual machine. Classes are loaded
//! on first reference: [`ClassRegistry::resolve`] searches the class path entries in order,
//! decodes the first hit exactly once (even under concurrent requests for the same name) and
//! memoizes the result. Array and primitive classes are synthesized on demand.
//!
//! # Thread Safety
//!
//! - The name index is a `DashMap`; a miss is decoded while holding the map entry, so
//!   concurrent callers for the same name observe one decode.
//! - The load order is an append-only `boxcar::Vec`, readable while other threads load.
//! - Array classes resolve `java/lang/Object` and their component class *before* taking the
//!   entry of their own name, so loading never re-enters a locked shard.

use std::sync::{Arc, Weak};

use dashmap::{mapref::entry::Entry, DashMap};
use log::debug;
use rayon::prelude::*;

use crate::{
    runtime::{class::class_name_of, Class, ClassPath, ClassRef, FieldRef, MethodRef},
    Error, Result,
};

/// Names of the primitive classes
pub const PRIMITIVE_CLASSES: [&str; 9] = [
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];

/// Registry of the loaded classes of one virtual machine.
pub struct ClassRegistry {
    me: Weak<ClassRegistry>,
    class_paths: Vec<Box<dyn ClassPath>>,
    classes: DashMap<String, ClassRef>,
    load_order: boxcar::Vec<ClassRef>,
}

impl ClassRegistry {
    /// Create a registry that loads from `class_paths`, searched in order
    #[must_use]
    pub fn new(class_paths: Vec<Box<dyn ClassPath>>) -> Arc<ClassRegistry> {
        Arc::new_cyclic(|me| ClassRegistry {
            me: me.clone(),
            class_paths,
            classes: DashMap::new(),
            load_order: boxcar::Vec::new(),
        })
    }

    /// The class path entries
    #[must_use]
    pub fn class_paths(&self) -> &[Box<dyn ClassPath>] {
        &self.class_paths
    }

    /// A class that has already been loaded
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ClassRef> {
        self.classes.get(name).map(|class| class.clone())
    }

    /// Resolve `name` to its linked class, loading it on first reference.
    ///
    /// The class is not initialized.
    ///
    /// # Errors
    /// Returns [`Error::ClassNotFound`] if no class path entry provides the class, and
    /// decoding errors of the class file that does.
    pub fn resolve(&self, name: &str) -> Result<ClassRef> {
        if let Some(class) = self.classes.get(name) {
            return Ok(class.clone());
        }

        let object = match name.strip_prefix('[') {
            Some(component) => {
                let component = class_name_of(component)
                    .ok_or_else(|| malformed_error!("Invalid array class name {}", name))?;
                self.resolve(component)?;
                Some(self.resolve("java/lang/Object")?)
            }
            None => None,
        };

        match self.classes.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let class = Arc::new(self.load(name, object)?);
                entry.insert(class.clone());
                self.load_order.push(class.clone());
                debug!("Loaded class {} ({:?})", name, class.kind());
                Ok(class)
            }
        }
    }

    fn load(&self, name: &str, object: Option<ClassRef>) -> Result<Class> {
        if let Some(object) = object {
            return Ok(Class::array(name, object, self.me.clone()));
        }
        if PRIMITIVE_CLASSES.contains(&name) {
            return Ok(Class::primitive(name, self.me.clone()));
        }

        for path in &self.class_paths {
            if let Some(file) = path.search(name)? {
                if file.this_class() != name {
                    return Err(malformed_error!(
                        "{} in {} declares class {}",
                        name,
                        path.describe(),
                        file.this_class()
                    ));
                }
                return Ok(Class::from_file(file, self.me.clone()));
            }
        }

        Err(Error::ClassNotFound(name.to_string()))
    }

    /// Load `names` in parallel, skipping classes the class path does not provide.
    ///
    /// Returns the number of classes found.
    ///
    /// # Errors
    /// Returns the first error other than [`Error::ClassNotFound`].
    pub fn preload(&self, names: &[&str]) -> Result<usize> {
        let found = names
            .par_iter()
            .map(|name| match self.resolve(name) {
                Ok(_) => Ok(1),
                Err(Error::ClassNotFound(_)) => Ok(0),
                Err(error) => Err(error),
            })
            .collect::<Result<Vec<usize>>>()?;
        Ok(found.into_iter().sum())
    }

    /// Resolve a field starting at class `class`.
    ///
    /// # Errors
    /// Returns [`Error::FieldNotFound`] if the hierarchy has no such field, and resolution
    /// errors of the classes in it.
    pub fn resolve_field(&self, class: &str, name: &str, descriptor: &str) -> Result<(ClassRef, FieldRef)> {
        self.resolve(class)?
            .resolve_field(name, descriptor)?
            .ok_or_else(|| Error::FieldNotFound {
                class: class.to_string(),
                name: name.to_string(),
                descriptor: descriptor.to_string(),
            })
    }

    /// Resolve a method starting at class `class`.
    ///
    /// # Errors
    /// Returns [`Error::MethodNotFound`] if the hierarchy has no such method, and resolution
    /// errors of the classes in it.
    pub fn resolve_method(&self, class: &str, name: &str, descriptor: &str) -> Result<(ClassRef, MethodRef)> {
        self.resolve(class)?
            .resolve_method(name, descriptor)?
            .ok_or_else(|| Error::MethodNotFound {
                class: class.to_string(),
                name: name.to_string(),
                descriptor: descriptor.to_string(),
            })
    }

    /// Number of loaded classes
    #[must_use]
    pub fn len(&self) -> usize {
        self.load_order.count()
    }

    /// True if nothing has been loaded yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Loaded classes in load order
    pub fn classes(&self) -> impl Iterator<Item = &ClassRef> {
        self.load_order.iter().map(|(_, class)| class)
    }
}

impl std::fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("class_paths", &self.class_paths)
            .field("loaded", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        thread,
    };

    use super::*;
    use crate::{
        classfile::{ClassAccessFlags, ClassFile, ClassWriter, FieldAccessFlags, MethodAccessFlags},
        runtime::{ClassKind, ClassState, MemoryClassPath},
        test::core_library,
    };

    fn registry_with(extra: impl FnOnce(&MemoryClassPath)) -> Arc<ClassRegistry> {
        let path = core_library();
        extra(&path);
        ClassRegistry::new(vec![Box::new(path)])
    }

    fn add(path: &MemoryClassPath, writer: &ClassWriter) {
        let bytes = writer.to_bytes().unwrap();
        let name = ClassFile::parse(&bytes).unwrap().this_class().to_string();
        path.add(&name, bytes);
    }

    #[derive(Debug)]
    struct CountingClassPath {
        inner: MemoryClassPath,
        searches: AtomicUsize,
    }

    impl ClassPath for CountingClassPath {
        fn search(&self, name: &str) -> Result<Option<ClassFile>> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            self.inner.search(name)
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    #[test]
    fn resolve_is_memoized() {
        let registry = registry_with(|_| {});
        let first = registry.resolve("java/lang/Object").unwrap();
        let second = registry.resolve("java/lang/Object").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
        assert_eq!(first.state(), ClassState::NotInitialized);
        assert!(registry.get("java/lang/String").is_none());
    }

    #[test]
    fn missing_class() {
        let registry = registry_with(|_| {});
        assert!(matches!(
            registry.resolve("demo/Missing"),
            Err(Error::ClassNotFound(name)) if name == "demo/Missing"
        ));
        assert!(matches!(
            registry.resolve("[Ldemo/Missing;"),
            Err(Error::ClassNotFound(_))
        ));
    }

    #[test]
    fn concurrent_resolve_decodes_once() {
        let counting = Arc::new(CountingClassPath {
            inner: core_library(),
            searches: AtomicUsize::new(0),
        });

        #[derive(Debug)]
        struct Shared(Arc<CountingClassPath>);
        impl ClassPath for Shared {
            fn search(&self, name: &str) -> Result<Option<ClassFile>> {
                self.0.search(name)
            }
            fn describe(&self) -> String {
                self.0.describe()
            }
        }

        let registry = ClassRegistry::new(vec![Box::new(Shared(counting.clone()))]);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || registry.resolve("java/lang/Thread").unwrap())
            })
            .collect();
        let classes: Vec<ClassRef> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(classes.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
        assert_eq!(counting.searches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn synthetic_classes() {
        let registry = registry_with(|_| {});

        let ints = registry.resolve("[I").unwrap();
        assert_eq!(ints.kind(), ClassKind::Array);
        assert_eq!(ints.state(), ClassState::Initialized);
        assert_eq!(ints.super_name(), Some("java/lang/Object"));
        assert_eq!(ints.component_descriptor(), Some("I"));
        assert!(ints.is_assignable_to("java/lang/Object").unwrap());
        assert!(ints.is_assignable_to("java/lang/Cloneable").unwrap());
        assert!(!ints.is_assignable_to("[J").unwrap());

        let int = registry.resolve("int").unwrap();
        assert!(int.is_primitive());
        assert!(int.super_class().unwrap().is_none());

        let strings = registry.resolve("[Ljava/lang/String;").unwrap();
        assert!(strings.is_assignable_to("[Ljava/lang/Object;").unwrap());
        assert!(!strings.is_assignable_to("[Ljava/lang/Thread;").unwrap());
        assert!(registry.resolve("[[Ljava/lang/String;").unwrap().is_assignable_to("[[Ljava/lang/Object;").unwrap());
    }

    #[test]
    fn field_resolution_prefers_interfaces_over_super() {
        let registry = registry_with(|path| {
            let mut iface = ClassWriter::new("demo/I", Some("java/lang/Object"));
            iface
                .access_flags(ClassAccessFlags::PUBLIC | ClassAccessFlags::INTERFACE | ClassAccessFlags::ABSTRACT)
                .field(FieldAccessFlags::PUBLIC | FieldAccessFlags::STATIC, "f", "I");
            add(path, &iface);

            let mut base = ClassWriter::new("demo/Base", Some("java/lang/Object"));
            base.field(FieldAccessFlags::PUBLIC | FieldAccessFlags::STATIC, "f", "I");
            add(path, &base);

            let mut derived = ClassWriter::new("demo/Derived", Some("demo/Base"));
            derived.interface("demo/I");
            add(path, &derived);

            let mut plain = ClassWriter::new("demo/Plain", Some("java/lang/Object"));
            plain.interface("demo/I");
            add(path, &plain);
        });

        let (owner, field) = registry.resolve_field("demo/Derived", "f", "I").unwrap();
        assert_eq!(owner.name(), "demo/I");
        assert_eq!(field.name, "f");

        let (owner, _) = registry.resolve_field("demo/Plain", "f", "I").unwrap();
        assert_eq!(owner.name(), "demo/I");

        let (owner, _) = registry.resolve_field("demo/Base", "f", "I").unwrap();
        assert_eq!(owner.name(), "demo/Base");

        assert!(matches!(
            registry.resolve_field("demo/Derived", "g", "I"),
            Err(Error::FieldNotFound { .. })
        ));
    }

    #[test]
    fn method_resolution_prefers_super_over_interfaces() {
        let registry = registry_with(|path| {
            let mut iface = ClassWriter::new("demo/Runner", Some("java/lang/Object"));
            iface
                .access_flags(ClassAccessFlags::PUBLIC | ClassAccessFlags::INTERFACE | ClassAccessFlags::ABSTRACT)
                .abstract_method(MethodAccessFlags::PUBLIC | MethodAccessFlags::ABSTRACT, "run", "()V")
                .abstract_method(MethodAccessFlags::PUBLIC | MethodAccessFlags::ABSTRACT, "only", "()V");
            add(path, &iface);

            let mut base = ClassWriter::new("demo/Base", Some("java/lang/Object"));
            base.native_method(MethodAccessFlags::PUBLIC | MethodAccessFlags::NATIVE, "run", "()V");
            add(path, &base);

            let mut derived = ClassWriter::new("demo/Derived", Some("demo/Base"));
            derived.interface("demo/Runner");
            add(path, &derived);
        });

        let (owner, method) = registry.resolve_method("demo/Derived", "run", "()V").unwrap();
        assert_eq!(owner.name(), "demo/Base");
        assert!(method.is_native());

        let (owner, method) = registry.resolve_method("demo/Derived", "only", "()V").unwrap();
        assert_eq!(owner.name(), "demo/Runner");
        assert!(method.is_abstract());

        assert!(matches!(
            registry.resolve_method("demo/Derived", "missing", "()V"),
            Err(Error::MethodNotFound { .. })
        ));
    }

    #[test]
    fn slots_are_contiguous_across_the_hierarchy() {
        let registry = registry_with(|path| {
            let mut base = ClassWriter::new("demo/Point", Some("java/lang/Object"));
            base.field(FieldAccessFlags::PRIVATE, "x", "I")
                .field(FieldAccessFlags::STATIC, "count", "I")
                .field(FieldAccessFlags::PRIVATE, "y", "J");
            add(path, &base);

            let mut derived = ClassWriter::new("demo/Point3", Some("demo/Point"));
            derived.field(FieldAccessFlags::PRIVATE, "z", "D");
            add(path, &derived);
        });

        let derived = registry.resolve("demo/Point3").unwrap();
        assert_eq!(derived.assign_instance_slots().unwrap(), 3);
        assert_eq!(derived.assign_instance_slots().unwrap(), 3);

        let base = registry.get("demo/Point").unwrap();
        assert_eq!(base.declared_field("x", "I").unwrap().slot().unwrap(), 0);
        assert_eq!(base.declared_field("y", "J").unwrap().slot().unwrap(), 1);
        assert_eq!(base.declared_field("count", "I").unwrap().slot().unwrap(), 0);
        assert_eq!(derived.declared_field("z", "D").unwrap().slot().unwrap(), 2);

        let template = derived.instance_template().unwrap();
        assert_eq!(template[1], crate::runtime::Value::Long(0));
        assert_eq!(template[2], crate::runtime::Value::Double(0.0));
    }

    #[test]
    fn concurrent_slot_assignment_agrees() {
        let registry = registry_with(|path| {
            let mut base = ClassWriter::new("demo/A", Some("java/lang/Object"));
            for name in ["a", "b", "c"] {
                base.field(FieldAccessFlags::PUBLIC, name, "I");
            }
            add(path, &base);

            let mut derived = ClassWriter::new("demo/B", Some("demo/A"));
            for name in ["d", "e"] {
                derived.field(FieldAccessFlags::PUBLIC, name, "I");
            }
            add(path, &derived);
        });

        let class = registry.resolve("demo/B").unwrap();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let class = class.clone();
                thread::spawn(move || class.assign_instance_slots().unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 5);
        }

        let mut slots: Vec<usize> = ["d", "e"]
            .iter()
            .map(|name| class.declared_field(name, "I").unwrap().slot().unwrap())
            .collect();
        slots.sort_unstable();
        assert_eq!(slots, vec![3, 4]);
    }

    #[test]
    fn preload_tolerates_missing_classes() {
        let registry = registry_with(|_| {});
        let found = registry
            .preload(&["java/lang/Object", "java/lang/String", "java/lang/Nope"])
            .unwrap();
        assert_eq!(found, 2);
        let names: Vec<&str> = registry.classes().map(|class| class.name()).collect();
        assert!(names.contains(&"java/lang/String"));
    }
}
