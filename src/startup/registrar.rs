use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Launch agent record written to the descriptor file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LaunchDescriptor {
    pub label: String,
    pub program_arguments: Vec<String>,
    pub run_at_load: bool,
    pub keep_alive: bool,
}

/// Run-at-login toggle. The descriptor file existing is the whole state.
#[derive(Debug, Clone)]
pub struct StartupRegistrar {
    descriptor_path: PathBuf,
    label: String,
    program: PathBuf,
}

impl StartupRegistrar {
    pub fn new(descriptor_path: impl Into<PathBuf>, label: &str, program: impl Into<PathBuf>) -> Self {
        Self {
            descriptor_path: descriptor_path.into(),
            label: label.to_string(),
            program: program.into(),
        }
    }

    /// `~/Library/LaunchAgents/<app_id>.plist`, launching this executable.
    pub fn for_current_user(app_id: &str) -> Result<Self> {
        let home = dirs::home_dir().ok_or(Error::NoHomeDir)?;
        let program = std::env::current_exe().map_err(Error::CurrentExe)?;
        Ok(Self::new(Self::default_descriptor_path(&home, app_id), app_id, program))
    }

    pub fn default_descriptor_path(home: &Path, app_id: &str) -> PathBuf {
        home.join("Library")
            .join("LaunchAgents")
            .join(format!("{}.plist", app_id))
    }

    pub fn descriptor_path(&self) -> &Path {
        &self.descriptor_path
    }

    pub fn is_enabled(&self) -> bool {
        self.descriptor_path.exists()
    }

    /// Write the descriptor, replacing any existing one.
    pub fn enable(&self) -> Result<()> {
        if let Some(parent) = self.descriptor_path.parent() {
            fs::create_dir_all(parent)?;
        }
        plist::to_file_xml(&self.descriptor_path, &self.descriptor())?;
        info!("Run at startup enabled: {}", self.descriptor_path.display());
        Ok(())
    }

    /// Remove the descriptor. Already absent is fine.
    pub fn disable(&self) -> Result<()> {
        match fs::remove_file(&self.descriptor_path) {
            Ok(()) => {
                info!("Run at startup disabled: {}", self.descriptor_path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Flip the toggle and return the new state.
    pub fn toggle(&self) -> Result<bool> {
        if self.is_enabled() {
            self.disable()?;
            Ok(false)
        } else {
            self.enable()?;
            Ok(true)
        }
    }

    fn descriptor(&self) -> LaunchDescriptor {
        LaunchDescriptor {
            label: self.label.clone(),
            program_arguments: vec![self.program.to_string_lossy().into_owned()],
            run_at_load: true,
            keep_alive: false,
        }
    }
}
