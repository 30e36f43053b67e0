use anyhow::{bail, Result};

use crate::domain::{parse_manifest, Manifest};

pub struct ManifestController;

impl ManifestController {
    pub fn new() -> Self {
        Self
    }

    /// Fails when the manifest contains invalid lines, after listing them.
    pub async fn manifest(&self, path: String) -> Result<String> {
        let text = tokio::fs::read_to_string(&path).await?;
        let manifest = parse_manifest(&text);
        let report = self.format_manifest(&path, &manifest);

        if !manifest.is_valid() {
            bail!("{}\n{} invalid line(s) in {}", report, manifest.issues.len(), path);
        }
        Ok(report)
    }

    fn format_manifest(&self, path: &str, manifest: &Manifest) -> String {
        let mut output = format!(
            "{}: {} requirement(s)\n",
            path,
            manifest.requirements.len()
        );

        for (section, requirements) in manifest.sections() {
            output.push_str(&format!("\n[{}]\n", section.unwrap_or("unlabelled")));
            for requirement in requirements {
                output.push_str(&format!("  {}\n", requirement));
            }
        }

        if !manifest.issues.is_empty() {
            output.push_str("\nInvalid lines:\n");
            for issue in &manifest.issues {
                output.push_str(&format!("  {}\n", issue));
            }
        }

        output
    }
}

impl Default for ManifestController {
    fn default() -> Self {
        Self::new()
    }
}
