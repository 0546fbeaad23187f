//! Class hierarchy model
//!
//! The fingerprinting core never reads bytecode itself. A front end dumps the
//! analyzed unit as a [`ClassHierarchy`]: every class with its superclass and
//! declared methods, and for each method its access flags and type references.
//! The hierarchy decides which types are internal to the unit (and therefore
//! renamed freely by obfuscators) and which are external framework types.

use crate::access::{self, AccessFlags};
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Package prefixes whose unresolved types are treated as external
pub const DEFAULT_FRAMEWORK_PACKAGES: &[&str] = &[
    "java",
    "javax",
    "android",
    "dalvik",
    "kotlin",
    "org.w3c",
    "org.xml",
    "org.json",
    "org.apache.http",
];

/// Type reference in internal descriptor form, e.g. `I`, `[B` or
/// `Landroid/content/Context`. A trailing `;` is accepted and stripped.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TypeRef(String);

impl TypeRef {
    pub fn new(descriptor: impl Into<String>) -> Self {
        let raw: String = descriptor.into();
        let trimmed = raw.trim();
        Self(trimmed.strip_suffix(';').unwrap_or(trimmed).to_string())
    }

    /// Object type for a dotted class name, e.g. `com.foo.Bar`
    pub fn object(class_name: &str) -> Self {
        Self(format!("L{}", class_name.replace('.', "/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self.0.as_str(),
            "Z" | "B" | "C" | "S" | "I" | "J" | "F" | "D" | "V"
        )
    }

    pub fn is_array(&self) -> bool {
        self.0.starts_with('[')
    }

    /// Innermost element type of an array, or the type itself
    pub fn element_type(&self) -> TypeRef {
        TypeRef(self.0.trim_start_matches('[').to_string())
    }

    /// Dotted class name of an object type (arrays resolve to their element)
    pub fn class_name(&self) -> Option<String> {
        let element = self.element_type();
        element
            .0
            .strip_prefix('L')
            .filter(|name| !name.is_empty())
            .map(|name| name.replace('/', "."))
    }
}

impl From<String> for TypeRef {
    fn from(s: String) -> Self {
        TypeRef::new(s)
    }
}

impl From<TypeRef> for String {
    fn from(t: TypeRef) -> Self {
        t.0
    }
}

impl From<&str> for TypeRef {
    fn from(s: &str) -> Self {
        TypeRef::new(s)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({})", self.0)
    }
}

/// A declared method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    /// Missing flags mean package-private, as in the class file format
    #[serde(
        default = "package_private",
        deserialize_with = "access::deserialize_lenient"
    )]
    pub access: AccessFlags,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default, alias = "synthetic")]
    pub is_bridge_or_synthetic: bool,
    /// Formal parameters, without the implicit receiver
    #[serde(default, alias = "params")]
    pub parameter_types: Vec<TypeRef>,
    #[serde(alias = "returns")]
    pub return_type: TypeRef,
}

impl MethodInfo {
    pub fn new(name: impl Into<String>, access: AccessFlags) -> Self {
        Self {
            name: name.into(),
            access,
            is_static: false,
            is_bridge_or_synthetic: false,
            parameter_types: Vec::new(),
            return_type: TypeRef::new("V"),
        }
    }

    pub fn with_params<I, T>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeRef>,
    {
        self.parameter_types = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn returning(mut self, ty: impl Into<TypeRef>) -> Self {
        self.return_type = ty.into();
        self
    }

    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn synthetic(mut self) -> Self {
        self.is_bridge_or_synthetic = true;
        self
    }

    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }

    /// Plain (non-fuzzy) descriptor, e.g. `(ILandroid/content/Context)V`
    pub fn descriptor(&self) -> String {
        let params: String = self.parameter_types.iter().map(TypeRef::as_str).collect();
        format!("({}){}", params, self.return_type)
    }

    /// Human-readable signature kept in the most verbose trees
    pub fn signature(&self, class: &ClassInfo) -> String {
        format!("{}.{}{}", class.name, self.name, self.descriptor())
    }
}

/// A class of the analyzed unit or one of its dependencies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    /// Fully qualified dotted name, inner classes separated by `$`
    pub name: String,
    #[serde(default)]
    pub superclass: Option<String>,
    /// Part of the analyzed unit (as opposed to a resolved dependency)
    #[serde(default = "default_true", alias = "app")]
    pub is_app_class: bool,
    #[serde(default)]
    pub methods: Vec<MethodInfo>,
}

fn default_true() -> bool {
    true
}

fn package_private() -> AccessFlags {
    AccessFlags::PACKAGE_PRIVATE
}

impl ClassInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
            is_app_class: true,
            methods: Vec::new(),
        }
    }

    pub fn with_superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn with_method(mut self, method: MethodInfo) -> Self {
        self.methods.push(method);
        self
    }

    pub fn external(mut self) -> Self {
        self.is_app_class = false;
        self
    }

    /// Declaring package, empty for the default package
    pub fn package_name(&self) -> &str {
        crate::pkg::parse_package(&self.name)
    }

    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn is_inner_class(&self) -> bool {
        self.simple_name().contains('$')
    }

    /// Anonymous classes end in a numeric `$` segment, e.g. `Foo$1`
    pub fn is_anonymous(&self) -> bool {
        self.is_inner_class()
            && self
                .simple_name()
                .rsplit('$')
                .next()
                .is_some_and(is_numeric_segment)
    }

    /// Anonymous class nested in another anonymous class, e.g. `Foo$1$2`
    pub fn is_anonymous_in_anonymous(&self) -> bool {
        let segments: Vec<&str> = self.simple_name().split('$').collect();
        segments.len() >= 3
            && is_numeric_segment(segments[segments.len() - 1])
            && is_numeric_segment(segments[segments.len() - 2])
    }

    /// Name of the directly enclosing class for inner classes
    pub fn enclosing_class_name(&self) -> Option<&str> {
        if !self.is_inner_class() {
            return None;
        }
        self.name.rfind('$').map(|idx| &self.name[..idx])
    }

    /// Generated resource classes (`R`, `R$id`, `BuildConfig`)
    pub fn is_resource_class(&self) -> bool {
        let simple = self.simple_name();
        simple == "R" || simple.starts_with("R$") || simple == "BuildConfig"
    }

    /// Classes that belong in fingerprints: app code that is not generated resources
    pub fn is_fingerprintable(&self) -> bool {
        self.is_app_class && !self.is_resource_class()
    }
}

fn is_numeric_segment(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Serialized form of a class dump
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HierarchyDocument {
    /// Package declared by the unit's manifest, if any
    #[serde(default)]
    pub package_name: Option<String>,
    #[serde(default)]
    pub classes: Vec<ClassInfo>,
}

/// Indexed set of classes with internal/external type classification
#[derive(Debug, Clone)]
pub struct ClassHierarchy {
    classes: Vec<ClassInfo>,
    index: HashMap<String, usize>,
    package_name: Option<String>,
    framework_packages: Vec<String>,
}

impl ClassHierarchy {
    pub fn new(classes: Vec<ClassInfo>) -> Self {
        let mut index = HashMap::with_capacity(classes.len());
        for (i, class) in classes.iter().enumerate() {
            if index.insert(class.name.clone(), i).is_some() {
                tracing::warn!("Duplicate class {} in hierarchy, keeping last", class.name);
            }
        }
        Self {
            classes,
            index,
            package_name: None,
            framework_packages: DEFAULT_FRAMEWORK_PACKAGES
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }

    pub fn with_package_name(mut self, package_name: Option<String>) -> Self {
        self.package_name = package_name.filter(|p| !p.is_empty());
        self
    }

    pub fn with_framework_packages(mut self, packages: Vec<String>) -> Self {
        self.framework_packages = packages;
        self
    }

    pub fn from_document(doc: HierarchyDocument) -> Self {
        Self::new(doc.classes).with_package_name(doc.package_name)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ApiError> {
        let doc: HierarchyDocument = serde_json::from_str(json)
            .map_err(|e| ApiError::HierarchyError(format!("Failed to parse class dump: {}", e)))?;
        Ok(Self::from_document(doc))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ApiError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ApiError::HierarchyError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    pub fn classes(&self) -> &[ClassInfo] {
        &self.classes
    }

    /// Classes that take part in fingerprinting
    pub fn app_classes(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.iter().filter(|c| c.is_fingerprintable())
    }

    pub fn lookup(&self, class_name: &str) -> Option<&ClassInfo> {
        self.index.get(class_name).map(|&i| &self.classes[i])
    }

    pub fn package_name(&self) -> Option<&str> {
        self.package_name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Whether `ty` is defined inside the analyzed unit.
    ///
    /// Primitives are external. Known classes are internal when they are app
    /// classes. Unknown classes are internal unless they live under one of the
    /// framework packages, so types of unresolved dependencies are normalized too.
    pub fn is_internal(&self, ty: &TypeRef) -> bool {
        let Some(class_name) = ty.class_name() else {
            return false;
        };
        match self.lookup(&class_name) {
            Some(class) => class.is_app_class,
            None => !self
                .framework_packages
                .iter()
                .any(|prefix| crate::pkg::is_sub_package(&class_name, prefix)),
        }
    }
}
