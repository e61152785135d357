use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

use crate::chart::spec::ChartSpec;
use crate::{ReportError, Result};

/// Invokes the external chart conversion engine.
///
/// The engine binary and its conversion script are explicit construction
/// parameters; nothing is located relative to the installed crate. The
/// serialized spec is written next to the expected output image, the
/// engine is invoked with fixed arguments and the spec file is removed
/// again whether or not the invocation succeeded.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    engine: PathBuf,
    script: PathBuf,
    output_dir: PathBuf,
    scale: f64,
    width: u32,
}

impl ChartRenderer {
    pub fn new(engine: impl Into<PathBuf>, script: impl Into<PathBuf>) -> Result<Self> {
        let engine = engine.into();
        if !engine.exists() {
            return Err(ReportError::Config(format!(
                "chart engine not found at {}",
                engine.display()
            )));
        }
        Ok(Self {
            engine,
            script: script.into(),
            output_dir: std::env::temp_dir(),
            scale: 2.5,
            width: crate::chart::spec::DEFAULT_WIDTH,
        })
    }

    /// Directory receiving spec files and rendered images.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Render `spec` to an image file and return its path.
    ///
    /// Work files are named from the process id and a digest of the
    /// serialized spec, so concurrent report runs do not collide.
    pub fn render(&self, spec: &ChartSpec) -> Result<PathBuf> {
        let json = serde_json::to_string(spec)?;
        let stem = format!("{}_{:x}", std::process::id(), md5::compute(&json));
        let infile = self.output_dir.join(format!("{}.json", stem));
        let outfile = self.output_dir.join(format!("{}.jpg", stem));

        fs::write(&infile, json)?;
        let status = self.invoke(&infile, &outfile);
        // spec file is removed on success and failure alike
        fs::remove_file(&infile).ok();

        let status = status?;
        if !status.success() {
            return Err(ReportError::Render(format!(
                "chart engine exited with {}",
                status
            )));
        }
        if !outfile.exists() {
            return Err(ReportError::Render(format!(
                "chart engine produced no output at {}",
                outfile.display()
            )));
        }
        Ok(outfile)
    }

    fn invoke(&self, infile: &Path, outfile: &Path) -> Result<std::process::ExitStatus> {
        debug!(
            engine = %self.engine.display(),
            infile = %infile.display(),
            "invoking chart engine"
        );
        let status = Command::new(&self.engine)
            .arg(&self.script)
            .arg("-infile")
            .arg(infile)
            .arg("-outfile")
            .arg(outfile)
            .arg("-scale")
            .arg(self.scale.to_string())
            .arg("-width")
            .arg(self.width.to_string())
            .status()?;
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::series::{Extraction, Series};
    use crate::db::Value;
    use tempfile::TempDir;

    fn spec() -> ChartSpec {
        ChartSpec::line(
            Some("t".into()),
            800,
            false,
            Extraction {
                categories: vec!["d1".into()],
                series: vec![Series {
                    name: "A".into(),
                    data: vec![Value::from(1)],
                }],
            },
        )
    }

    fn write_script(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("convert.sh");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_missing_engine_is_config_error() {
        let err = ChartRenderer::new("/no/such/engine", "convert.js").unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn test_render_produces_image_and_cleans_spec_file() {
        let dir = TempDir::new().unwrap();
        // stand-in engine: copies the spec file to the output path
        let script = write_script(&dir, "cp \"$2\" \"$4\"\n");

        let renderer = ChartRenderer::new("/bin/sh", script)
            .unwrap()
            .output_dir(dir.path());
        let outfile = renderer.render(&spec()).unwrap();

        assert!(outfile.exists());
        assert_eq!(outfile.extension().unwrap(), "jpg");
        let leftover: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map(|x| x == "json").unwrap_or(false))
            .collect();
        assert!(leftover.is_empty(), "spec file not cleaned up");
    }

    #[test]
    fn test_nonzero_exit_is_render_error() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "exit 3\n");

        let renderer = ChartRenderer::new("/bin/sh", script)
            .unwrap()
            .output_dir(dir.path());
        let err = renderer.render(&spec()).unwrap_err();
        assert!(matches!(err, ReportError::Render(_)));
    }

    #[test]
    fn test_missing_output_is_render_error() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "exit 0\n");

        let renderer = ChartRenderer::new("/bin/sh", script)
            .unwrap()
            .output_dir(dir.path());
        let err = renderer.render(&spec()).unwrap_err();
        match err {
            ReportError::Render(msg) => assert!(msg.contains("no output")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
