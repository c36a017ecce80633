mod error;
mod types;

pub use error::{Error, Result};
pub use types::{AutoNegative, Config, Controller, Service, Session};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.session.pos_seed_neighbors == 0 {
		return Err(Error::Validation {
			message: "session.pos_seed_neighbors must be greater than zero.".to_string(),
		});
	}
	if !cfg.controller.expire_check_seconds.is_finite() {
		return Err(Error::Validation {
			message: "controller.expire_check_seconds must be a finite number.".to_string(),
		});
	}
	if cfg.controller.expire_check_seconds <= 0.0 {
		return Err(Error::Validation {
			message: "controller.expire_check_seconds must be greater than zero.".to_string(),
		});
	}
	if !cfg.controller.session_timeout_seconds.is_finite() {
		return Err(Error::Validation {
			message: "controller.session_timeout_seconds must be a finite number.".to_string(),
		});
	}
	if cfg.controller.session_timeout_seconds < 0.0 {
		return Err(Error::Validation {
			message: "controller.session_timeout_seconds must be zero or greater.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let log_level = cfg.service.log_level.trim();

	if log_level.len() != cfg.service.log_level.len() {
		cfg.service.log_level = log_level.to_string();
	}
}
