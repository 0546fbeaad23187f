//! Package names and package trees.

mod tree;
mod utils;

pub use tree::{
    PackageTree, PackageTreeNode, ShapeMatch, AMBIGUOUS_NAMESPACES, MAX_PACKAGE_DEPTH, ROOT_NAME,
};
pub use utils::{
    is_sub_package, package_depth, parent_package, parse_package, relationship, segments,
    sub_package_of_depth, Relationship,
};
