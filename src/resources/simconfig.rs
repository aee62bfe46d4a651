//! Simulation configuration.
//!
//! Settings loaded from an INI file. Defaults are safe for startup; values
//! missing from the file keep their defaults.
//!
//! # Configuration File Format
//!
//! ```ini
//! [simulation]
//! timestep_hz = 60
//! max_steps_per_frame = 5
//! time_scale = 1.0
//!
//! [map]
//! path = ./assets/maps/level.json
//! ```

use std::path::{Path, PathBuf};

use configparser::ini::Ini;
use log::info;

use crate::error::SimError;

const DEFAULT_TIMESTEP_HZ: u32 = 60;
const DEFAULT_MAX_STEPS_PER_FRAME: u32 = 5;
const DEFAULT_TIME_SCALE: f32 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Fixed simulation rate in passes per second.
    pub timestep_hz: u32,
    /// Upper bound on passes run by a single `advance` call.
    pub max_steps_per_frame: u32,
    /// Multiplier applied to the fixed timestep.
    pub time_scale: f32,
    /// Tile map to load, if any.
    pub map_path: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SimConfig {
    pub fn new() -> Self {
        Self {
            timestep_hz: DEFAULT_TIMESTEP_HZ,
            max_steps_per_frame: DEFAULT_MAX_STEPS_PER_FRAME,
            time_scale: DEFAULT_TIME_SCALE,
            map_path: None,
        }
    }

    /// Fixed timestep in seconds.
    pub fn timestep(&self) -> f32 {
        1.0 / self.timestep_hz as f32
    }

    /// Load and validate configuration from an INI file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let mut config = Self::new();
        let mut ini = Ini::new();
        ini.load(path).map_err(|e| {
            SimError::config(format!("failed to load config {}: {e}", path.display()))
        })?;
        config.apply(&ini)?;
        config.validate()?;

        info!(
            "Loaded config {}: {} Hz, max {} steps/frame, time scale {}, map {:?}",
            path.display(),
            config.timestep_hz,
            config.max_steps_per_frame,
            config.time_scale,
            config.map_path
        );
        Ok(config)
    }

    /// Parse configuration from INI text.
    pub fn from_ini_str(text: &str) -> Result<Self, SimError> {
        let mut config = Self::new();
        let mut ini = Ini::new();
        ini.read(text.to_string())
            .map_err(|e| SimError::config(format!("failed to parse config: {e}")))?;
        config.apply(&ini)?;
        config.validate()?;
        Ok(config)
    }

    fn apply(&mut self, ini: &Ini) -> Result<(), SimError> {
        // [simulation] section
        if let Some(hz) = ini
            .getuint("simulation", "timestep_hz")
            .map_err(SimError::config)?
        {
            self.timestep_hz = narrow("timestep_hz", hz)?;
        }
        if let Some(steps) = ini
            .getuint("simulation", "max_steps_per_frame")
            .map_err(SimError::config)?
        {
            self.max_steps_per_frame = narrow("max_steps_per_frame", steps)?;
        }
        if let Some(scale) = ini
            .getfloat("simulation", "time_scale")
            .map_err(SimError::config)?
        {
            self.time_scale = scale as f32;
        }

        // [map] section
        if let Some(path) = ini.get("map", "path") {
            self.map_path = Some(PathBuf::from(path));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.timestep_hz == 0 {
            return Err(SimError::config("timestep_hz must be positive"));
        }
        if self.max_steps_per_frame == 0 {
            return Err(SimError::config("max_steps_per_frame must be positive"));
        }
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            return Err(SimError::config(format!(
                "time_scale must be a non-negative number, got {}",
                self.time_scale
            )));
        }
        Ok(())
    }

    /// Write the configuration back out as INI.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        let path = path.as_ref();
        let mut ini = Ini::new();
        ini.set("simulation", "timestep_hz", Some(self.timestep_hz.to_string()));
        ini.set(
            "simulation",
            "max_steps_per_frame",
            Some(self.max_steps_per_frame.to_string()),
        );
        ini.set("simulation", "time_scale", Some(self.time_scale.to_string()));
        if let Some(map) = &self.map_path {
            ini.set("map", "path", Some(map.display().to_string()));
        }
        ini.write(path).map_err(|e| {
            SimError::config(format!("failed to save config {}: {e}", path.display()))
        })?;
        info!("Saved config to {:?}", path);
        Ok(())
    }
}

fn narrow(key: &str, value: u64) -> Result<u32, SimError> {
    u32::try_from(value).map_err(|_| SimError::config(format!("{key} = {value} is too large")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timestep_hz, 60);
        assert!((config.timestep() - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn missing_values_keep_defaults() {
        let config = SimConfig::from_ini_str("[simulation]\ntimestep_hz = 30\n").unwrap();
        assert_eq!(config.timestep_hz, 30);
        assert_eq!(config.max_steps_per_frame, 5);
        assert_eq!(config.map_path, None);
    }

    #[test]
    fn zero_rate_is_rejected() {
        let err = SimConfig::from_ini_str("[simulation]\ntimestep_hz = 0\n").unwrap_err();
        assert!(matches!(err, SimError::Configuration(_)));
    }

    #[test]
    fn values_past_u32_are_rejected_not_wrapped() {
        // 2^32 + 60 would wrap to 60.
        let err = SimConfig::from_ini_str("[simulation]\ntimestep_hz = 4294967356\n").unwrap_err();
        assert!(matches!(err, SimError::Configuration(_)));
        let err = SimConfig::from_ini_str("[simulation]\nmax_steps_per_frame = 4294967296\n")
            .unwrap_err();
        assert!(matches!(err, SimError::Configuration(_)));
    }

    #[test]
    fn negative_time_scale_is_rejected() {
        let config = SimConfig {
            time_scale: -1.0,
            ..SimConfig::new()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_number_is_rejected() {
        let err =
            SimConfig::from_ini_str("[simulation]\nmax_steps_per_frame = lots\n").unwrap_err();
        assert!(matches!(err, SimError::Configuration(_)));
    }

    #[test]
    fn load_from_file_reads_all_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[simulation]\ntimestep_hz = 120\nmax_steps_per_frame = 3\ntime_scale = 0.5\n\n[map]\npath = level.json"
        )
        .unwrap();
        let config = SimConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.timestep_hz, 120);
        assert_eq!(config.max_steps_per_frame, 3);
        assert!((config.time_scale - 0.5).abs() < 1e-6);
        assert_eq!(config.map_path, Some(PathBuf::from("level.json")));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.ini");
        let config = SimConfig {
            timestep_hz: 50,
            max_steps_per_frame: 2,
            time_scale: 2.0,
            map_path: Some(PathBuf::from("maps/a.json")),
        };
        config.save_to_file(&path).unwrap();
        assert_eq!(SimConfig::load_from_file(&path).unwrap(), config);
    }
}
