//! Class hierarchy builders shared by the integration tests

use libsift::access::AccessFlags;
use libsift::hierarchy::{ClassHierarchy, ClassInfo, MethodInfo};
use libsift::profile::{AppProfile, LibProfile, LibraryCategory, LibraryDescription};
use libsift::tree::Verboseness;

/// Class with one public method per parameter list
pub fn class(name: &str, param_lists: &[&[&str]]) -> ClassInfo {
    param_lists
        .iter()
        .enumerate()
        .fold(ClassInfo::new(name), |class, (i, params)| {
            class.with_method(
                MethodInfo::new(format!("m{}", i), AccessFlags::PUBLIC).with_params(params.iter().copied()),
            )
        })
}

pub fn library(name: &str, version: &str, classes: Vec<ClassInfo>) -> LibProfile {
    LibProfile::create(
        &ClassHierarchy::new(classes),
        LibraryDescription::new(name, LibraryCategory::Utilities).with_version(version),
        Verboseness::Normal,
    )
    .expect("library profile")
}

pub fn app(classes: Vec<ClassInfo>) -> AppProfile {
    AppProfile::create(&ClassHierarchy::new(classes), Verboseness::Normal)
}

/// Two packages `<root>.a` (two classes) and `<root>.b` (one class)
pub fn scenario_classes(root: &str) -> Vec<ClassInfo> {
    vec![
        class(&format!("{}.a.Client", root), &[&["I"], &["I", "J"]]),
        class(&format!("{}.a.Request", root), &[&["Ljava/lang/String;"]]),
        class(&format!("{}.b.Cache", root), &[&["[B"], &["Z", "Z"]]),
    ]
}

/// Unrelated application code
pub fn app_code() -> Vec<ClassInfo> {
    vec![
        class("de.example.app.MainActivity", &[&["Landroid/os/Bundle;"]]),
        class("de.example.app.Settings", &[&["D", "D", "D"]]),
    ]
}
