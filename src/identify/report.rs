//! Identification report: text table and JSON summary

use crate::profile::{MatchLevel, MatchSummary, ProfileMatch, SecurityAdvisory};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Number of libraries per [`MatchLevel`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCounts {
    pub all_configs: usize,
    pub some_configs: usize,
    pub partial: usize,
    pub none: usize,
    pub timed_out: usize,
}

impl fmt::Display for LevelCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} full matches, {} matches in some configs, {} partial matches, {} not found",
            self.all_configs, self.some_configs, self.partial, self.none
        )?;
        if self.timed_out > 0 {
            write!(f, " ({} timed out)", self.timed_out)?;
        }
        Ok(())
    }
}

/// Serializable report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportJson {
    pub app_package: Option<String>,
    pub elapsed_ms: u64,
    pub counts: LevelCounts,
    pub libraries: Vec<MatchSummary>,
}

/// Matches of one identification run in catalog order
#[derive(Debug, Clone)]
pub struct IdentificationReport {
    app_package: Option<String>,
    matches: Vec<ProfileMatch>,
    elapsed: Duration,
}

impl IdentificationReport {
    pub fn new(app_package: Option<String>, matches: Vec<ProfileMatch>, elapsed: Duration) -> Self {
        Self {
            app_package,
            matches,
            elapsed,
        }
    }

    pub fn matches(&self) -> &[ProfileMatch] {
        &self.matches
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn by_level(&self, level: MatchLevel) -> impl Iterator<Item = &ProfileMatch> {
        self.matches
            .iter()
            .filter(move |m| m.classification() == level)
    }

    pub fn counts(&self) -> LevelCounts {
        let mut counts = LevelCounts::default();
        for m in &self.matches {
            match m.classification() {
                MatchLevel::AllConfigs => counts.all_configs += 1,
                MatchLevel::SomeConfigs => counts.some_configs += 1,
                MatchLevel::Partial => counts.partial += 1,
                MatchLevel::None => counts.none += 1,
            }
            if m.timed_out {
                counts.timed_out += 1;
            }
        }
        counts
    }

    pub fn to_json(&self) -> ReportJson {
        ReportJson {
            app_package: self.app_package.clone(),
            elapsed_ms: self.elapsed.as_millis() as u64,
            counts: self.counts(),
            libraries: self.matches.iter().map(ProfileMatch::summary).collect(),
        }
    }

    /// Human readable report of every library that matched at least partially
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{}\n\n", "Identified libraries".bold().underline()));
        if let Some(ref pkg) = self.app_package {
            out.push_str(&format!("  App package: {}\n", pkg));
        }
        out.push_str(&format!("  Libraries checked: {}\n", self.matches.len()));
        out.push_str(&format!("  Duration: {} ms\n\n", self.elapsed.as_millis()));

        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Library", "Version", "Category", "Match", "Score", "Root package", "Notes"]);
        let mut rows = 0;
        for level in [MatchLevel::AllConfigs, MatchLevel::SomeConfigs, MatchLevel::Partial] {
            for m in self.by_level(level) {
                let description = &m.lib().description;
                let best = m.highest_score();
                table.add_row(vec![
                    description.name.clone(),
                    description.version_or_placeholder().to_string(),
                    description.category.to_string(),
                    level.to_string(),
                    best.map(|r| format!("{:.4}", r.score.value()))
                        .unwrap_or_else(|| "-".to_string()),
                    best.and_then(|r| r.root_package.clone())
                        .or_else(|| m.lib().root_package())
                        .unwrap_or_else(|| "-".to_string()),
                    notes(m),
                ]);
                rows += 1;
            }
        }
        if rows == 0 {
            out.push_str("  No library found.\n\n");
        } else {
            out.push_str(&format!("{}\n\n", table));
        }
        out.push_str(&format!("  {}\n", self.counts()));
        out
    }
}

fn notes(m: &ProfileMatch) -> String {
    let mut notes = Vec::new();
    if m.is_deprecated {
        notes.push("outdated".to_string());
    }
    if m.is_lib_obfuscated() {
        notes.push("obfuscated".to_string());
    }
    if m.lib_root_package_present {
        notes.push("root package present".to_string());
    }
    match m.lib().description.security_advisory() {
        Some(SecurityAdvisory::Vulnerable) => notes.push("security issue".to_string()),
        Some(SecurityAdvisory::Fix) => notes.push("security fix".to_string()),
        None => {}
    }
    notes.join(", ")
}
