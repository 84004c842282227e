//! Reporter eligibility checks and gated dispatch.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, info, instrument};

use crate::core::availability::AvailabilityCache;
use crate::core::output::format_command_line;
use crate::core::types::LaunchRequest;
use crate::io::config::ReporterConfig;
use crate::io::fs::{assert_file_exists, create_empty_file_if_missing, is_binary_file};
use crate::io::limiter::{LaunchCircuitBreaker, LaunchLimiter};
use crate::io::process::{CommandSpec, ProcessSpawner, SystemSpawner};
use crate::io::sink::{OutputSink, StdoutSink};
use crate::launch::{LaunchOutcome, strategy_for};

/// One external diff program.
#[derive(Debug)]
pub struct Reporter {
    name: String,
    exe: Option<PathBuf>,
    image_capable: bool,
    availability: AvailabilityCache,
}

impl Reporter {
    pub fn new(name: impl Into<String>, exe: Option<PathBuf>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            bail!("Argument name missing");
        }
        Ok(Self {
            name,
            exe,
            image_capable: false,
            availability: AvailabilityCache::default(),
        })
    }

    pub fn from_config(cfg: &ReporterConfig) -> Result<Self> {
        Ok(Self::new(&cfg.name, cfg.exe.clone())?.with_image_diff(cfg.image_capable))
    }

    pub fn with_image_diff(mut self, image_capable: bool) -> Self {
        self.image_capable = image_capable;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exe(&self) -> Option<&Path> {
        self.exe.as_deref()
    }

    pub fn can_image_diff(&self) -> bool {
        self.image_capable
    }

    /// Whether the executable exists. Probed on first call only.
    pub fn is_available(&self) -> bool {
        self.availability.resolve(|| {
            let found = self.exe.as_deref().is_some_and(Path::exists);
            debug!(reporter = %self.name, found, "resolved reporter executable");
            found
        })
    }

    /// Image-capable reporters handle anything; others only text.
    pub fn can_handle(&self, is_binary: bool) -> bool {
        self.image_capable || !is_binary
    }

    /// Whether this reporter can show a diff for `path`.
    ///
    /// `path` must exist.
    pub fn can_report_on(&self, path: &Path) -> Result<bool> {
        assert_file_exists(path)?;
        if !self.is_available() {
            return Ok(false);
        }
        if self.image_capable {
            return Ok(true);
        }
        let is_binary = is_binary_file(path)?;
        Ok(self.can_handle(is_binary))
    }
}

/// Dispatches reporter launches through a shared limiter.
pub struct ReporterGate {
    limiter: Arc<dyn LaunchLimiter>,
    spawner: Arc<dyn ProcessSpawner>,
    sink: Arc<dyn OutputSink>,
}

impl ReporterGate {
    pub fn new(
        limiter: Arc<dyn LaunchLimiter>,
        spawner: Arc<dyn ProcessSpawner>,
        sink: Arc<dyn OutputSink>,
    ) -> Self {
        Self {
            limiter,
            spawner,
            sink,
        }
    }

    /// Gate that spawns real processes, prints their output, and allows
    /// `max_launches` detached launches.
    pub fn system(max_launches: u32) -> Self {
        Self::new(
            Arc::new(LaunchCircuitBreaker::new(max_launches)),
            Arc::new(SystemSpawner),
            Arc::new(StdoutSink),
        )
    }

    /// Launch `reporter` on the request's file pair.
    ///
    /// Detached launches are subject to the limiter; blocking launches bypass
    /// it. A failing reporter is not an error: its stderr is reported instead.
    #[instrument(skip_all, fields(reporter = %reporter.name(), block = request.block_until_exit))]
    pub fn dispatch(&self, reporter: &Reporter, request: &LaunchRequest) -> Result<LaunchOutcome> {
        let exe = reporter
            .exe()
            .ok_or_else(|| anyhow!("reporter {} has no executable path", reporter.name()))?;

        if !request.block_until_exit
            && self.limiter.check(
                &request.approved_path,
                &request.received_path,
                &request.process_options,
            )
        {
            debug!("launch suppressed by limiter");
            return Ok(LaunchOutcome::Suppressed);
        }

        create_empty_file_if_missing(&request.approved_path).with_context(|| {
            format!(
                "prepare approved file {}",
                request.approved_path.display()
            )
        })?;

        let spec = CommandSpec {
            exe: exe.to_path_buf(),
            args: request.args(),
            options: request.process_options.clone(),
        };
        info!("{}", format_command_line(&exe.display().to_string(), &spec.args));

        let strategy = strategy_for(request.block_until_exit);
        Ok(strategy.launch(self.spawner.as_ref(), &spec, self.sink.clone()))
    }
}
