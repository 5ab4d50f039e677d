use super::{CompileOutcome, Stats};
use crate::common::{ERROR, PARTY, SUCCESS, WARNING};
use std::fmt::Write;

/// How much of the stats is shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatsPreset {
    Development,
    /// Includes the compilation hash.
    Production,
}

/// Presents compile outcomes on the console.
#[derive(Clone, Copy, Debug)]
pub struct Reporter {
    preset: StatsPreset,
    /// What is being compiled, e.g. "DLL". Unnamed for the app itself.
    subject: Option<&'static str>,
}

impl Reporter {
    pub fn new(preset: StatsPreset) -> Self {
        Self {
            preset,
            subject: None,
        }
    }

    pub fn with_subject(mut self, subject: &'static str) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn failed_title(&self) -> String {
        match self.subject {
            Some(subject) => format!("Failed to compile {subject}"),
            None => "Failed to compile".into(),
        }
    }

    pub fn warnings_title(&self) -> String {
        match self.subject {
            Some(subject) => format!("{subject} compiled with warnings."),
            None => "Compiled with warnings.".into(),
        }
    }

    pub fn success_title(&self) -> String {
        match self.subject {
            Some(subject) => format!("{subject} compilation successful {PARTY}"),
            None => format!("Compilation successful {PARTY}"),
        }
    }

    /// Report an outcome.
    pub fn report(&self, outcome: &CompileOutcome) {
        match outcome {
            CompileOutcome::FatalError(err) => {
                tracing::error!("{}{}", ERROR, self.failed_title());
                tracing::error!("{err:?}");
            }
            CompileOutcome::CompileErrors(errors) => {
                tracing::error!("{}{}", ERROR, self.failed_title());
                for error in errors {
                    eprintln!("{error}\n");
                }
            }
            CompileOutcome::Success {
                has_warnings,
                stats,
            } => {
                println!("{}", self.render(stats));
                if *has_warnings {
                    for warning in &stats.warnings {
                        eprintln!("{warning}\n");
                    }
                    tracing::warn!("{}{}", WARNING, self.warnings_title());
                } else {
                    tracing::info!("{}{}", SUCCESS, self.success_title());
                }
            }
        }
    }

    /// Render the stats summary: hash, version, timing and the asset table.
    pub fn render(&self, stats: &Stats) -> String {
        let mut out = String::new();
        if self.preset == StatsPreset::Production {
            if let Some(hash) = &stats.hash {
                let _ = writeln!(out, "Hash: {hash}");
            }
        }
        if let Some(version) = &stats.version {
            let _ = writeln!(out, "Version: webpack {version}");
        }
        if let Some(duration) = stats.duration() {
            let _ = writeln!(out, "Time: {}", humantime::format_duration(duration));
        }

        if !stats.assets.is_empty() {
            let width = stats
                .assets
                .iter()
                .map(|asset| asset.name.len())
                .max()
                .unwrap_or_default()
                .max("Asset".len());
            let _ = writeln!(out, "{:>width$}  {:>10}  Chunk Names", "Asset", "Size");
            for asset in &stats.assets {
                let _ = writeln!(
                    out,
                    "{:>width$}  {:>10}  {}",
                    asset.name,
                    format_size(asset.size),
                    asset.chunk_names.join(", ")
                );
            }
        }

        out
    }
}

/// Format a byte count the way the bundler does.
pub fn format_size(size: u64) -> String {
    const UNITS: [&str; 4] = ["bytes", "kB", "MB", "GB"];
    if size == 0 {
        return "0 bytes".into();
    }
    let mut exponent = 0;
    let mut threshold = 1000u64;
    while exponent < UNITS.len() - 1 && size >= threshold {
        exponent += 1;
        threshold = threshold.saturating_mul(1000);
    }
    if exponent == 0 {
        return format!("{size} bytes");
    }
    let scaled = size as f64 / 1000f64.powi(exponent as i32);
    format!("{} {}", (scaled * 100.0).round() / 100.0, UNITS[exponent])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Asset;
    use rstest::rstest;

    fn stats() -> Stats {
        Stats {
            hash: Some("4f1c0a".into()),
            time: Some(1250),
            version: Some("2.7.0".into()),
            assets: vec![Asset {
                name: "app.js".into(),
                size: 123_456,
                chunk_names: vec!["app".into()],
            }],
            ..Default::default()
        }
    }

    #[rstest]
    #[case(0, "0 bytes")]
    #[case(999, "999 bytes")]
    #[case(1_000, "1 kB")]
    #[case(123_456, "123.46 kB")]
    #[case(2_500_000, "2.5 MB")]
    fn sizes(#[case] size: u64, #[case] expected: &str) {
        assert_eq!(format_size(size), expected);
    }

    #[test]
    fn production_shows_the_hash() {
        let text = Reporter::new(StatsPreset::Production).render(&stats());
        assert!(text.starts_with("Hash: 4f1c0a\n"));
        assert!(text.contains("Time: 1s 250ms"));
        assert!(text.contains("123.46 kB"));
    }

    #[test]
    fn development_hides_the_hash() {
        let text = Reporter::new(StatsPreset::Development).render(&stats());
        assert!(!text.contains("Hash:"));
        assert!(text.contains("Version: webpack 2.7.0"));
    }

    #[test]
    fn titles_name_the_subject() {
        let app = Reporter::new(StatsPreset::Production);
        assert_eq!(app.failed_title(), "Failed to compile");
        assert_eq!(app.warnings_title(), "Compiled with warnings.");

        let dll = Reporter::new(StatsPreset::Development).with_subject("DLL");
        assert_eq!(dll.failed_title(), "Failed to compile DLL");
        assert_eq!(dll.warnings_title(), "DLL compiled with warnings.");
        assert!(dll.success_title().starts_with("DLL compilation successful"));
    }
}
