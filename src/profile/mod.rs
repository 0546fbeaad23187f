//! Library and application profiles and their match results

pub mod description;
pub mod library;
pub mod result;

pub use description::{LibraryCategory, LibraryDescription, SecurityAdvisory, DATE_FORMAT};
pub use library::{compare_profiles, unique_libraries, version_compare, AppProfile, LibProfile};
pub use result::{
    ConfigResult, HTreeMatch, MatchLevel, MatchSummary, ProfileMatch, SimScore, MATCH_HTREE_FULL,
    MATCH_HTREE_NONE, MATCH_HTREE_NO_ROOT_PCKG,
};
